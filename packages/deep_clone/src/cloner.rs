use std::rc::Rc;

use crate::diagnostics;
use crate::{
    CloneError, CloneGraph, Diagnostics, ErrorData, MapData, Object, ObjectKind, Properties,
    Record, Sequence, SetData, TypedArray, Value,
};

/// Whether a clone copies nested structure or shares it with the original.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum CloneDepth {
    /// Nested structured values are cloned recursively. This is the default.
    #[default]
    Deep,

    /// Only the top-level container is copied; nested values are shared with the original.
    Shallow,
}

impl CloneDepth {
    /// Whether this is [`CloneDepth::Deep`].
    #[must_use]
    pub fn is_deep(self) -> bool {
        self == Self::Deep
    }
}

impl From<bool> for CloneDepth {
    /// `true` selects a deep clone, `false` a shallow one.
    fn from(deep: bool) -> Self {
        if deep { Self::Deep } else { Self::Shallow }
    }
}

/// Clones a value with default settings and the given depth.
///
/// Objects of unsupported kinds are replaced with [`Value::Null`] and a diagnostic is reported.
/// Use [`Cloner`] to suppress the diagnostic or to get an error instead.
///
/// # Example
///
/// ```
/// use deep_clone::{Value, clone_value};
///
/// let inner = Value::record();
/// let outer = Value::record();
/// outer.set("inner", inner.clone());
///
/// let deep = clone_value(&outer, true);
/// assert!(!deep.get("inner").ptr_eq(&inner));
///
/// let shallow = clone_value(&outer, false);
/// assert!(shallow.get("inner").ptr_eq(&inner));
/// ```
#[must_use]
pub fn clone_value(value: &Value, depth: impl Into<CloneDepth>) -> Value {
    Cloner::new().depth(depth).clone_value(value)
}

/// Produces structural copies of values.
///
/// Each clone operation tracks which objects it has already copied, so self-references and
/// objects reachable through several paths are copied exactly once and the clone has the same
/// shape of sharing as the original. The tracking is local to each operation.
///
/// | Kind | Deep | Shallow |
/// |------|------|---------|
/// | primitives | returned unchanged | returned unchanged |
/// | record, sequence | new container, members cloned | new container, members shared |
/// | map, set | new collection, keys/values/members cloned | new collection, contents shared |
/// | date, pattern | independent copy | independent copy |
/// | error | copy, cause cloned | copy, cause shared |
/// | buffer, typed view, byte view | independent storage | same object |
/// | function | same object | same object |
/// | weak map, weak set | new empty collection | new empty collection |
/// | host | unsupported | unsupported |
///
/// # Example
///
/// ```
/// use deep_clone::{CloneDepth, Cloner, Diagnostics, Value};
///
/// let cloner = Cloner::new()
///     .depth(CloneDepth::Deep)
///     .diagnostics(Diagnostics::Suppress);
///
/// let list = Value::sequence([Value::from(1), Value::host("Socket")]);
/// let copy = cloner.clone_value(&list);
///
/// assert!(cloner.try_clone(&list).is_err());
/// assert!(!copy.ptr_eq(&list));
/// ```
#[derive(Clone, Copy, Debug, Default)]
#[must_use]
pub struct Cloner {
    depth: CloneDepth,
    diagnostics: Diagnostics,
}

impl Cloner {
    /// Creates a cloner that performs deep clones and reports diagnostics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether clones are deep or shallow.
    pub fn depth(mut self, depth: impl Into<CloneDepth>) -> Self {
        self.depth = depth.into();
        self
    }

    /// Sets whether diagnostics are reported for unsupported values.
    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Clones `value`, replacing every object of an unsupported kind with [`Value::Null`].
    ///
    /// The replacement happens at the position of the unsupported object, so the rest of the
    /// structure is still cloned. This never fails.
    #[must_use]
    pub fn clone_value(&self, value: &Value) -> Value {
        let mut traversal = Traversal::new(self.diagnostics, OnUnsupported::Replace);

        match traversal.run(value, self.depth) {
            Ok(clone) => clone,
            Err(_) => unreachable!("replacing unsupported objects never produces an error"),
        }
    }

    /// Clones `value`, failing if it contains any object of an unsupported kind.
    ///
    /// No diagnostic is reported in this mode; the error describes the problem.
    ///
    /// # Errors
    ///
    /// Returns [`CloneError::Unsupported`] naming the first unsupported object encountered.
    pub fn try_clone(&self, value: &Value) -> Result<Value, CloneError> {
        Traversal::new(self.diagnostics, OnUnsupported::Fail).run(value, self.depth)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum OnUnsupported {
    Replace,
    Fail,
}

/// State of one top-level clone operation.
///
/// Containers are cloned in two steps. The clone is created empty and registered right away,
/// then its members are copied when it is taken off the pending stack. Nesting depth therefore
/// costs heap space instead of call stack.
#[derive(Debug)]
struct Traversal {
    graph: CloneGraph,
    pending: Vec<Pending>,
    diagnostics: Diagnostics,
    on_unsupported: OnUnsupported,
}

/// A registered container clone whose members still have to be copied into it.
#[derive(Debug)]
struct Pending {
    clone: Object,
    contents: Contents,
    depth: CloneDepth,
}

#[derive(Debug)]
enum Contents {
    Properties(Properties),
    Sequence(Sequence),
    Map(MapData),
    Set(SetData),
    Error {
        cause: Option<Value>,
        properties: Properties,
    },
}

impl Traversal {
    fn new(diagnostics: Diagnostics, on_unsupported: OnUnsupported) -> Self {
        Self {
            graph: CloneGraph::new(),
            pending: Vec::new(),
            diagnostics,
            on_unsupported,
        }
    }

    fn run(&mut self, value: &Value, depth: CloneDepth) -> Result<Value, CloneError> {
        let clone = self.value(value, depth)?;

        while let Some(pending) = self.pending.pop() {
            self.populate(pending)?;
        }

        Ok(clone)
    }

    fn value(&mut self, value: &Value, depth: CloneDepth) -> Result<Value, CloneError> {
        match value {
            Value::Object(object) => self.object(object, depth),
            primitive => Ok(primitive.clone()),
        }
    }

    /// Copies a value nested inside a container that is being cloned.
    fn member(&mut self, value: &Value, depth: CloneDepth) -> Result<Value, CloneError> {
        match depth {
            CloneDepth::Deep => self.value(value, CloneDepth::Deep),
            CloneDepth::Shallow => Ok(value.clone()),
        }
    }

    fn object(&mut self, original: &Object, depth: CloneDepth) -> Result<Value, CloneError> {
        // This must come before any other work, as it is what terminates cycles.
        if let Some(clone) = self.graph.get(original) {
            return Ok(clone.into());
        }

        if is_shared(&original.borrow(), depth) {
            return Ok(original.clone().into());
        }

        // We work from a snapshot so that no borrow of the original is held afterwards.
        let snapshot = original.borrow().clone();

        let (empty, contents) = match snapshot {
            ObjectKind::Record(record) => (
                ObjectKind::Record(Record::with_prototype(record.prototype)),
                Contents::Properties(record.properties),
            ),
            ObjectKind::Sequence(sequence) => (
                ObjectKind::Sequence(Sequence::default()),
                Contents::Sequence(sequence),
            ),
            ObjectKind::Map(map) => (ObjectKind::Map(MapData::default()), Contents::Map(map)),
            ObjectKind::Set(set) => (ObjectKind::Set(SetData::default()), Contents::Set(set)),
            ObjectKind::Error(error) => (
                ObjectKind::Error(ErrorData {
                    name: error.name,
                    message: error.message,
                    stack: error.stack,
                    ..ErrorData::default()
                }),
                Contents::Error {
                    cause: error.cause,
                    properties: error.properties,
                },
            ),
            ObjectKind::TypedArray(view) => {
                // The buffer may have been shortened or replaced since the view was created.
                let Some(bytes) = view.bytes() else {
                    return self.unsupported(original.type_name());
                };
                let buffer = Object::new(ObjectKind::ArrayBuffer(bytes));

                return Ok(self
                    .register(
                        original,
                        ObjectKind::TypedArray(TypedArray {
                            element: view.element,
                            buffer,
                            byte_offset: 0,
                            length: view.length,
                        }),
                    )
                    .into());
            }
            ObjectKind::DataView(mut view) => {
                if view.bytes().is_none() {
                    return self.unsupported(original.type_name());
                }

                view.buffer = self.buffer(&view.buffer);
                return Ok(self.register(original, ObjectKind::DataView(view)).into());
            }
            kind @ (ObjectKind::Date(_)
            | ObjectKind::RegExp(_)
            | ObjectKind::ArrayBuffer(_)
            | ObjectKind::WeakMap
            | ObjectKind::WeakSet) => return Ok(self.register(original, kind).into()),
            ObjectKind::Function(_) => unreachable!("functions are always shared"),
            ObjectKind::Host(type_name) => return self.unsupported(type_name),
        };

        let clone = self.register(original, empty);

        self.pending.push(Pending {
            clone: clone.clone(),
            contents,
            depth,
        });

        Ok(clone.into())
    }

    fn populate(&mut self, pending: Pending) -> Result<(), CloneError> {
        let Pending {
            clone,
            contents,
            depth,
        } = pending;

        match contents {
            Contents::Properties(properties) => self.copy_properties(&properties, &clone, depth),
            Contents::Sequence(sequence) => {
                for element in &sequence.elements {
                    let element = self.member(element, depth)?;
                    clone.push(element);
                }

                self.copy_properties(&sequence.properties, &clone, depth)
            }
            Contents::Map(map) => {
                for (key, value) in map.iter() {
                    let key = self.member(key, depth)?;
                    let value = self.member(value, depth)?;
                    clone.insert_entry(key, value);
                }

                Ok(())
            }
            Contents::Set(set) => {
                for member in set.iter() {
                    let member = self.member(member, depth)?;
                    clone.add_member(member);
                }

                Ok(())
            }
            Contents::Error { cause, properties } => {
                if let Some(cause) = &cause {
                    let cause = self.member(cause, depth)?;

                    if let ObjectKind::Error(data) = &mut *clone.borrow_mut() {
                        data.cause = Some(cause);
                    }
                }

                self.copy_properties(&properties, &clone, depth)
            }
        }
    }

    /// Copies the whole backing buffer of a view, reusing an existing copy of it if the same
    /// buffer was already cloned in this operation.
    fn buffer(&mut self, original: &Object) -> Object {
        if let Some(clone) = self.graph.get(original) {
            return clone;
        }

        let kind = original.borrow().clone();
        self.register(original, kind)
    }

    fn copy_properties(
        &mut self,
        properties: &Properties,
        clone: &Object,
        depth: CloneDepth,
    ) -> Result<(), CloneError> {
        for (key, value) in properties.iter() {
            let value = self.member(value, depth)?;
            clone.set(key.clone(), value);
        }

        Ok(())
    }

    fn register(&mut self, original: &Object, kind: ObjectKind) -> Object {
        let clone = Object::new(kind);
        self.graph.insert(original, clone.clone());
        clone
    }

    fn unsupported(&self, type_name: Rc<str>) -> Result<Value, CloneError> {
        match self.on_unsupported {
            OnUnsupported::Fail => Err(CloneError::Unsupported { type_name }),
            OnUnsupported::Replace => {
                diagnostics::unsupported_type(self.diagnostics, &type_name);
                Ok(Value::Null)
            }
        }
    }
}

/// Whether the object itself is the result of cloning it at the given depth.
fn is_shared(kind: &ObjectKind, depth: CloneDepth) -> bool {
    match kind {
        ObjectKind::Function(_) => true,
        ObjectKind::ArrayBuffer(_) | ObjectKind::TypedArray(_) | ObjectKind::DataView(_) => {
            !depth.is_deep()
        }
        _ => false,
    }
}
