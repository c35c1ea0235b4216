use std::fmt;

use deep_clone::{CloneDepth, Diagnostics, ObjectKind, Value};

/// What kind of factory source a pool manufactures its instances from.
///
/// This is informational only. It reports how a pool was configured and has no effect on pool
/// behavior.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum FactoryKind {
    /// Instances are produced by invoking a constructor.
    Callable,

    /// Instances are clones of a sequence.
    Sequence,

    /// Instances are clones of a record or another structured value.
    Record,

    /// The source is none of the above.
    Unknown,
}

impl FactoryKind {
    /// Classifies a dynamically typed factory source.
    ///
    /// Functions are callable, sequences are sequences, every other object is a record and
    /// primitive values are unknown.
    ///
    /// # Example
    ///
    /// ```
    /// use cache_pool::FactoryKind;
    /// use deep_clone::Value;
    ///
    /// assert_eq!(FactoryKind::of(&Value::record()), FactoryKind::Record);
    /// assert_eq!(FactoryKind::of(&Value::sequence([Value::Null])), FactoryKind::Sequence);
    /// assert_eq!(FactoryKind::of(&Value::from(42)), FactoryKind::Unknown);
    /// ```
    #[must_use]
    pub fn of(source: &Value) -> Self {
        let Some(object) = source.as_object() else {
            return Self::Unknown;
        };

        match &*object.borrow() {
            ObjectKind::Function(_) => Self::Callable,
            ObjectKind::Sequence(_) => Self::Sequence,
            _ => Self::Record,
        }
    }

    /// The conventional lowercase name of the kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Callable => "function",
            Self::Sequence => "array",
            Self::Record => "object",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FactoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Types whose values can serve as the prototype that a pool clones its instances from.
///
/// # Example
///
/// ```
/// use cache_pool::{FactoryKind, Replicate};
/// use deep_clone::{CloneDepth, Diagnostics};
///
/// let prototype = vec![1, 2, 3];
/// let copy = prototype.replicate(CloneDepth::Deep, Diagnostics::Report);
///
/// assert_eq!(copy, prototype);
/// assert_eq!(prototype.factory_kind(), FactoryKind::Sequence);
/// ```
pub trait Replicate: Sized {
    /// Produces a new instance from the prototype `self`.
    ///
    /// Types that distinguish deep and shallow copies honor `depth`. Advisory diagnostics about
    /// the copy are reported only if `diagnostics` says so.
    #[must_use]
    fn replicate(&self, depth: CloneDepth, diagnostics: Diagnostics) -> Self;

    /// The kind of factory source this prototype represents.
    fn factory_kind(&self) -> FactoryKind {
        FactoryKind::Unknown
    }
}

impl Replicate for String {
    fn replicate(&self, _depth: CloneDepth, _diagnostics: Diagnostics) -> Self {
        self.clone()
    }
}

impl<T: Clone> Replicate for Vec<T> {
    fn replicate(&self, _depth: CloneDepth, _diagnostics: Diagnostics) -> Self {
        self.clone()
    }

    fn factory_kind(&self) -> FactoryKind {
        FactoryKind::Sequence
    }
}

/// Manufactures new instances for a pool. The variant is chosen once, when the pool is
/// configured.
pub(crate) enum InstanceFactory<T> {
    Constructor(Box<dyn FnMut() -> T>),
    Prototype {
        prototype: T,
        replicate: fn(&T, CloneDepth, Diagnostics) -> T,
        kind: FactoryKind,
    },
}

impl<T> InstanceFactory<T> {
    pub(crate) fn constructor(constructor: impl FnMut() -> T + 'static) -> Self {
        Self::Constructor(Box::new(constructor))
    }

    pub(crate) fn prototype(prototype: T) -> Self
    where
        T: Replicate,
    {
        let kind = prototype.factory_kind();

        Self::Prototype {
            prototype,
            replicate: T::replicate,
            kind,
        }
    }

    pub(crate) fn create(&mut self, depth: CloneDepth, diagnostics: Diagnostics) -> T {
        match self {
            Self::Constructor(constructor) => constructor(),
            Self::Prototype {
                prototype,
                replicate,
                ..
            } => replicate(prototype, depth, diagnostics),
        }
    }

    pub(crate) fn kind(&self) -> FactoryKind {
        match self {
            Self::Constructor(_) => FactoryKind::Callable,
            Self::Prototype { kind, .. } => *kind,
        }
    }
}

impl<T> fmt::Debug for InstanceFactory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceFactory")
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}
