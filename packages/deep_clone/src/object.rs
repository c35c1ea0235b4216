use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::time::SystemTime;

use crate::{DataView, PropertyKey, TypedArray, Value};

/// A shared handle to a structured value.
///
/// Cloning the handle does not copy the object: all clones refer to the same object and observe
/// each other's changes. Object identity is the identity of the allocation behind the handle,
/// compared with [`ptr_eq()`][Self::ptr_eq].
///
/// The handle uses interior mutability, so objects can be modified through a shared reference.
/// This type is single-threaded.
#[derive(Clone)]
pub struct Object {
    inner: Rc<RefCell<ObjectKind>>,
}

impl Object {
    /// Wraps `kind` in a new object with its own identity.
    #[must_use]
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            inner: Rc::new(RefCell::new(kind)),
        }
    }

    /// Whether both handles refer to the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// An identity token for the object, stable for as long as the object is alive.
    #[must_use]
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.inner).addr()
    }

    /// Borrows the object contents.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently mutably borrowed.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, ObjectKind> {
        self.inner.borrow()
    }

    /// Mutably borrows the object contents.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, ObjectKind> {
        self.inner.borrow_mut()
    }

    /// The name of the object's kind, such as `"Record"` or `"Map"`. For host objects this is the
    /// host type name.
    #[must_use]
    pub fn type_name(&self) -> Rc<str> {
        self.borrow().type_name()
    }

    /// Whether the object can be invoked.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        matches!(*self.borrow(), ObjectKind::Function(_))
    }

    /// Reads a named property, following the prototype chain of records.
    ///
    /// Returns [`Value::Undefined`] if the property does not exist.
    #[must_use]
    pub fn get(&self, key: &PropertyKey) -> Value {
        let mut current = self.clone();

        loop {
            let next = {
                let kind = current.borrow();

                if let Some(value) = kind.properties().and_then(|p| p.get(key)) {
                    return value.clone();
                }

                match &*kind {
                    ObjectKind::Record(record) => record.prototype.clone(),
                    _ => None,
                }
            };

            match next {
                Some(prototype) => current = prototype,
                None => return Value::Undefined,
            }
        }
    }

    /// Writes an own named property.
    ///
    /// Has no effect unless the object is a record, a sequence or an error.
    pub fn set(&self, key: impl Into<PropertyKey>, value: impl Into<Value>) {
        if let Some(properties) = self.borrow_mut().properties_mut() {
            properties.insert(key.into(), value.into());
        }
    }

    /// Appends an element. Has no effect unless the object is a sequence.
    pub fn push(&self, value: impl Into<Value>) {
        if let ObjectKind::Sequence(sequence) = &mut *self.borrow_mut() {
            sequence.elements.push(value.into());
        }
    }

    /// Inserts or replaces a map entry. Has no effect unless the object is a map.
    pub fn insert_entry(&self, key: impl Into<Value>, value: impl Into<Value>) {
        if let ObjectKind::Map(map) = &mut *self.borrow_mut() {
            map.insert(key.into(), value.into());
        }
    }

    /// Adds a set member if not already present. Has no effect unless the object is a set.
    pub fn add_member(&self, value: impl Into<Value>) {
        if let ObjectKind::Set(set) = &mut *self.borrow_mut() {
            set.insert(value.into());
        }
    }

    /// Invokes the object with `this` as the execution context.
    ///
    /// Returns `None` without doing anything if the object is not callable.
    pub fn call(&self, this: &Value, args: &[Value]) -> Option<Value> {
        // The borrow must end before the call, as the callable may access this very object.
        let callable = match &*self.borrow() {
            ObjectKind::Function(callable) => callable.clone(),
            _ => return None,
        };

        Some(callable.call(this, args))
    }

    /// The byte length of the object if it is an array buffer.
    #[must_use]
    pub fn byte_length(&self) -> Option<usize> {
        match &*self.borrow() {
            ObjectKind::ArrayBuffer(bytes) => Some(bytes.len()),
            _ => None,
        }
    }
}

impl fmt::Debug for Object {
    // Objects may refer to themselves, so we only print the identity and kind.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Object");
        debug.field("identity", &format_args!("{:#x}", self.identity()));

        match self.inner.try_borrow() {
            Ok(kind) => debug.field("type", &kind.type_name()),
            Err(_) => debug.field("type", &"<borrowed>"),
        };

        debug.finish()
    }
}

/// The contents of an [`Object`], one variant per supported kind of structured value.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum ObjectKind {
    /// A plain key-value container.
    Record(Record),

    /// An ordered sequence of elements.
    Sequence(Sequence),

    /// An insertion-ordered map with arbitrary keys.
    Map(MapData),

    /// An insertion-ordered set of unique members.
    Set(SetData),

    /// A point in time.
    Date(SystemTime),

    /// A pattern matcher.
    RegExp(Pattern),

    /// An error with a message and trace.
    Error(ErrorData),

    /// A raw binary buffer.
    ArrayBuffer(Vec<u8>),

    /// A typed view over a binary buffer.
    TypedArray(TypedArray),

    /// An untyped byte-range view over a binary buffer.
    DataView(DataView),

    /// A callable.
    Function(Callable),

    /// A weakly-keyed map whose contents are not observable.
    WeakMap,

    /// A weakly-held set whose contents are not observable.
    WeakSet,

    /// A value of a type not known to this crate, identified by name.
    Host(Rc<str>),
}

impl ObjectKind {
    /// The name of this kind. For host objects this is the host type name.
    #[must_use]
    pub fn type_name(&self) -> Rc<str> {
        let name = match self {
            Self::Record(_) => "Record",
            Self::Sequence(_) => "Sequence",
            Self::Map(_) => "Map",
            Self::Set(_) => "Set",
            Self::Date(_) => "Date",
            Self::RegExp(_) => "RegExp",
            Self::Error(_) => "Error",
            Self::ArrayBuffer(_) => "ArrayBuffer",
            Self::TypedArray(view) => view.element.type_name(),
            Self::DataView(_) => "DataView",
            Self::Function(_) => "Function",
            Self::WeakMap => "WeakMap",
            Self::WeakSet => "WeakSet",
            Self::Host(name) => return Rc::clone(name),
        };

        name.into()
    }

    /// The named properties of this object, for kinds that carry them.
    #[must_use]
    pub fn properties(&self) -> Option<&Properties> {
        match self {
            Self::Record(record) => Some(&record.properties),
            Self::Sequence(sequence) => Some(&sequence.properties),
            Self::Error(error) => Some(&error.properties),
            _ => None,
        }
    }

    /// The named properties of this object, for kinds that carry them.
    #[must_use]
    pub fn properties_mut(&mut self) -> Option<&mut Properties> {
        match self {
            Self::Record(record) => Some(&mut record.properties),
            Self::Sequence(sequence) => Some(&mut sequence.properties),
            Self::Error(error) => Some(&mut error.properties),
            _ => None,
        }
    }
}

/// Named properties in insertion order.
#[derive(Clone, Debug, Default)]
pub struct Properties {
    entries: Vec<(PropertyKey, Value)>,
}

impl Properties {
    /// The value of a property, if present.
    #[must_use]
    pub fn get(&self, key: &PropertyKey) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Inserts a property or replaces its value, keeping the original insertion position.
    pub fn insert(&mut self, key: PropertyKey, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Removes a property, returning its value if it was present.
    pub fn remove(&mut self, key: &PropertyKey) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// The properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&PropertyKey, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// The number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A plain key-value container with an optional shared prototype.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct Record {
    /// The record this one inherits properties from, if any.
    pub prototype: Option<Object>,

    /// The own properties of the record.
    pub properties: Properties,
}

impl Record {
    pub(crate) fn with_prototype(prototype: Option<Object>) -> Self {
        Self {
            prototype,
            properties: Properties::default(),
        }
    }
}

/// An ordered sequence of elements, optionally carrying extra named properties.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct Sequence {
    /// The elements in order.
    pub elements: Vec<Value>,

    /// Named properties attached to the sequence in addition to its elements.
    pub properties: Properties,
}

/// The entries of a map, in insertion order.
///
/// Keys are compared with [`Value::same_value_zero()`].
#[derive(Clone, Debug, Default)]
pub struct MapData {
    entries: Vec<(Value, Value)>,
}

impl MapData {
    /// The value stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.same_value_zero(key))
            .map(|(_, v)| v)
    }

    /// Inserts an entry or replaces the value of an existing one.
    pub fn insert(&mut self, key: Value, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| k.same_value_zero(&key)) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// The entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// The number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The members of a set, in insertion order.
///
/// Members are compared with [`Value::same_value_zero()`].
#[derive(Clone, Debug, Default)]
pub struct SetData {
    members: Vec<Value>,
}

impl SetData {
    /// Whether `value` is a member.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.members.iter().any(|m| m.same_value_zero(value))
    }

    /// Adds `value` unless it is already a member. Returns whether it was added.
    pub fn insert(&mut self, value: Value) -> bool {
        if self.contains(&value) {
            return false;
        }

        self.members.push(value);
        true
    }

    /// The members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.members.iter()
    }

    /// The number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// The source text and flags of a pattern matcher.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct Pattern {
    /// The pattern source text.
    pub source: String,

    /// The pattern flags, such as `"gi"`.
    pub flags: String,
}

/// The contents of an error value.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct ErrorData {
    /// The error kind name, such as `"TypeError"`.
    pub name: String,

    /// The error message.
    pub message: String,

    /// The captured trace, as text.
    pub stack: String,

    /// The error that caused this one, if any.
    pub cause: Option<Value>,

    /// Additional named properties.
    pub properties: Properties,
}

/// A callable stored in a [`Value`].
///
/// Clones of a `Callable` share the same underlying function.
#[derive(Clone)]
pub struct Callable {
    function: Rc<dyn Fn(&Value, &[Value]) -> Value>,
}

impl Callable {
    /// Wraps a function receiving the `this` value and the call arguments.
    pub fn new(function: impl Fn(&Value, &[Value]) -> Value + 'static) -> Self {
        Self {
            function: Rc::new(function),
        }
    }

    /// Invokes the function.
    pub fn call(&self, this: &Value, args: &[Value]) -> Value {
        (self.function)(this, args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable").finish_non_exhaustive()
    }
}
