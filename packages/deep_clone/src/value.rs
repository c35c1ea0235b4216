use std::fmt;
use std::rc::Rc;
use std::time::SystemTime;

use crate::{
    Callable, DataView, ElementType, ErrorData, MapData, Object, ObjectKind, Pattern, Properties,
    Record, Sequence, SetData, TypedArray,
};

/// A dynamically typed value.
///
/// Primitive values are immutable and copied freely. Structured values are held through an
/// [`Object`] handle, so cloning a `Value` with [`Clone::clone`] only copies the handle and both
/// copies refer to the same object. Use [`clone_value()`][crate::clone_value] or a
/// [`Cloner`][crate::Cloner] for a structural copy.
///
/// # Example
///
/// ```
/// use deep_clone::Value;
///
/// let point = Value::record();
/// point.set("x", 1.0);
/// point.set("y", 2.0);
///
/// assert_eq!(point.get("x").as_number(), Some(1.0));
/// assert!(point.get("z").is_undefined());
/// ```
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub enum Value {
    /// The absence of any value. This is the default.
    #[default]
    Undefined,

    /// An explicit "no value" marker.
    Null,

    /// A boolean.
    Bool(bool),

    /// A double precision number.
    Number(f64),

    /// An arbitrary precision integer, limited here to the `i128` range.
    BigInt(i128),

    /// An immutable string.
    String(Rc<str>),

    /// A unique symbol, only equal to itself.
    Symbol(Symbol),

    /// A reference to a structured value.
    Object(Object),
}

impl Value {
    /// Creates an empty record.
    #[must_use]
    pub fn record() -> Self {
        Self::from_kind(ObjectKind::Record(Record::default()))
    }

    /// Creates an empty record that shares `prototype` as its prototype.
    ///
    /// Property lookups through [`get()`][Self::get] fall back to the prototype chain. The
    /// prototype is fixed at creation, which keeps prototype chains acyclic.
    #[must_use]
    pub fn record_with_prototype(prototype: Object) -> Self {
        Self::from_kind(ObjectKind::Record(Record::with_prototype(Some(prototype))))
    }

    /// Creates a sequence holding the given elements.
    #[must_use]
    pub fn sequence(elements: impl IntoIterator<Item = Self>) -> Self {
        Self::from_kind(ObjectKind::Sequence(Sequence {
            elements: elements.into_iter().collect(),
            properties: Properties::default(),
        }))
    }

    /// Creates an empty key-ordered map.
    #[must_use]
    pub fn map() -> Self {
        Self::from_kind(ObjectKind::Map(MapData::default()))
    }

    /// Creates an empty set.
    #[must_use]
    pub fn set_collection() -> Self {
        Self::from_kind(ObjectKind::Set(SetData::default()))
    }

    /// Creates a point-in-time value.
    #[must_use]
    pub fn date(instant: SystemTime) -> Self {
        Self::from_kind(ObjectKind::Date(instant))
    }

    /// Creates a pattern matcher from its source text and flags.
    ///
    /// The pattern is stored as written; it is not compiled.
    #[must_use]
    pub fn regexp(source: impl Into<String>, flags: impl Into<String>) -> Self {
        Self::from_kind(ObjectKind::RegExp(Pattern {
            source: source.into(),
            flags: flags.into(),
        }))
    }

    /// Creates an error value with the given kind name and message and an empty trace.
    #[must_use]
    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::from_kind(ObjectKind::Error(ErrorData {
            name: name.into(),
            message: message.into(),
            ..ErrorData::default()
        }))
    }

    /// Creates a raw binary buffer owning `bytes`.
    #[must_use]
    pub fn array_buffer(bytes: impl Into<Vec<u8>>) -> Self {
        Self::from_kind(ObjectKind::ArrayBuffer(bytes.into()))
    }

    /// Creates a typed view of `length` elements over `buffer`, starting at `byte_offset`.
    ///
    /// # Panics
    ///
    /// Panics if `buffer` is not an array buffer or if the view does not fit inside it.
    #[must_use]
    pub fn typed_array(
        element: ElementType,
        buffer: Object,
        byte_offset: usize,
        length: usize,
    ) -> Self {
        let byte_length = length
            .checked_mul(element.size())
            .expect("typed array byte length overflows usize");
        assert_view_fits(&buffer, byte_offset, byte_length);

        Self::from_kind(ObjectKind::TypedArray(TypedArray {
            element,
            buffer,
            byte_offset,
            length,
        }))
    }

    /// Creates an untyped byte-range view over `buffer`.
    ///
    /// # Panics
    ///
    /// Panics if `buffer` is not an array buffer or if the view does not fit inside it.
    #[must_use]
    pub fn data_view(buffer: Object, byte_offset: usize, byte_length: usize) -> Self {
        assert_view_fits(&buffer, byte_offset, byte_length);

        Self::from_kind(ObjectKind::DataView(DataView {
            buffer,
            byte_offset,
            byte_length,
        }))
    }

    /// Creates a callable value.
    ///
    /// The callable receives the `this` value it was invoked on and the call arguments.
    #[must_use]
    pub fn function(function: impl Fn(&Self, &[Self]) -> Self + 'static) -> Self {
        Self::from_kind(ObjectKind::Function(Callable::new(function)))
    }

    /// Creates an empty weakly-keyed map. Its contents are never observable.
    #[must_use]
    pub fn weak_map() -> Self {
        Self::from_kind(ObjectKind::WeakMap)
    }

    /// Creates an empty weakly-held set. Its contents are never observable.
    #[must_use]
    pub fn weak_set() -> Self {
        Self::from_kind(ObjectKind::WeakSet)
    }

    /// Creates a value of a type that is opaque to this crate, identified only by its name.
    #[must_use]
    pub fn host(type_name: impl Into<Rc<str>>) -> Self {
        Self::from_kind(ObjectKind::Host(type_name.into()))
    }

    /// Creates a new unique symbol.
    #[must_use]
    pub fn symbol(description: impl Into<Rc<str>>) -> Self {
        Self::Symbol(Symbol::new(description))
    }

    fn from_kind(kind: ObjectKind) -> Self {
        Self::Object(Object::new(kind))
    }

    /// Whether this is [`Value::Undefined`].
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Whether this is [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this is [`Value::Undefined`] or [`Value::Null`].
    #[must_use]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// The referenced object, if this is a structured value.
    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// The number, if this is a number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    /// The boolean, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The string contents, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Reads a named property, following the prototype chain of records.
    ///
    /// Returns [`Value::Undefined`] if the property does not exist or this is not an object.
    #[must_use]
    pub fn get(&self, key: impl Into<PropertyKey>) -> Self {
        self.as_object()
            .map_or(Self::Undefined, |object| object.get(&key.into()))
    }

    /// Writes a named property.
    ///
    /// Has no effect unless this is a record, a sequence or an error.
    pub fn set(&self, key: impl Into<PropertyKey>, value: impl Into<Self>) {
        if let Some(object) = self.as_object() {
            object.set(key, value);
        }
    }

    /// Whether two values refer to the same object.
    ///
    /// Always `false` if either value is not an object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Equality as used for map keys and set members: primitives compare by value (with `NaN`
    /// equal to itself and both zeroes equal), symbols and objects compare by identity.
    #[must_use]
    pub fn same_value_zero(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => (a.is_nan() && b.is_nan()) || a.eq(b),
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

fn assert_view_fits(buffer: &Object, byte_offset: usize, byte_length: usize) {
    let buffer_length = buffer
        .byte_length()
        .expect("views can only be created over an array buffer");
    let end = byte_offset
        .checked_add(byte_length)
        .expect("view end offset overflows usize");

    assert!(
        end <= buffer_length,
        "view of {byte_length} bytes at offset {byte_offset} does not fit in a buffer of {buffer_length} bytes"
    );
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value.into())
    }
}

impl From<Symbol> for Value {
    fn from(value: Symbol) -> Self {
        Self::Symbol(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

/// A unique value usable as a property key, equal only to itself.
///
/// Clones of a `Symbol` are the same symbol.
#[derive(Clone)]
pub struct Symbol {
    // Each symbol owns this allocation, which is what gives it its identity.
    data: Rc<SymbolData>,
}

struct SymbolData {
    description: Rc<str>,
}

impl Symbol {
    /// Creates a new symbol, distinct from every other symbol.
    #[must_use]
    pub fn new(description: impl Into<Rc<str>>) -> Self {
        Self {
            data: Rc::new(SymbolData {
                description: description.into(),
            }),
        }
    }

    /// The description given when the symbol was created.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.data.description
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl Eq for Symbol {}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description())
    }
}

/// The key of a named property: either a string or a [`Symbol`].
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum PropertyKey {
    /// A string key.
    String(Rc<str>),

    /// A symbol key.
    Symbol(Symbol),
}

impl From<&str> for PropertyKey {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for PropertyKey {
    fn from(value: String) -> Self {
        Self::String(value.into())
    }
}

impl From<Symbol> for PropertyKey {
    fn from(value: Symbol) -> Self {
        Self::Symbol(value)
    }
}

impl From<&Symbol> for PropertyKey {
    fn from(value: &Symbol) -> Self {
        Self::Symbol(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_compare_by_value() {
        assert!(Value::from(1.5).same_value_zero(&Value::from(1.5)));
        assert!(Value::Number(f64::NAN).same_value_zero(&Value::Number(f64::NAN)));
        assert!(Value::Number(0.0).same_value_zero(&Value::Number(-0.0)));
        assert!(Value::from("a").same_value_zero(&Value::from("a")));
        assert!(!Value::from("a").same_value_zero(&Value::from(1)));
        assert!(!Value::Undefined.same_value_zero(&Value::Null));
    }

    #[test]
    fn objects_compare_by_identity() {
        let a = Value::record();
        let b = Value::record();

        assert!(a.same_value_zero(&a.clone()));
        assert!(!a.same_value_zero(&b));
        assert!(a.ptr_eq(&a.clone()));
        assert!(!Value::Null.ptr_eq(&Value::Null));
    }

    #[test]
    fn symbols_are_unique() {
        let a = Symbol::new("tag");
        let b = Symbol::new("tag");

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.description(), "tag");
        assert_ne!(PropertyKey::from(&a), PropertyKey::from(&b));
    }

    #[test]
    fn symbols_with_shared_description_are_distinct() {
        let description: Rc<str> = "tag".into();
        let a = Symbol::new(Rc::clone(&description));
        let b = Symbol::new(description);

        assert_ne!(a, b);
        assert_eq!(a.description(), b.description());

        let record = Value::record();
        record.set(&a, 1);
        record.set(&b, 2);
        assert_eq!(record.get(&a).as_number(), Some(1.0));
        assert_eq!(record.get(&b).as_number(), Some(2.0));
    }

    #[test]
    fn get_on_primitive_is_undefined() {
        assert!(Value::from(3).get("x").is_undefined());
        Value::from(3).set("x", 1);
    }

    #[test]
    #[should_panic(expected = "does not fit in a buffer of 4 bytes")]
    fn typed_array_must_fit_buffer() {
        let Value::Object(buffer) = Value::array_buffer(vec![0_u8; 4]) else {
            unreachable!()
        };

        _ = Value::typed_array(ElementType::Float64, buffer, 0, 1);
    }

    #[test]
    #[should_panic(expected = "views can only be created over an array buffer")]
    fn data_view_requires_buffer() {
        let Value::Object(record) = Value::record() else {
            unreachable!()
        };

        _ = Value::data_view(record, 0, 0);
    }
}
