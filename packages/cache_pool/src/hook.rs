use std::fmt;
use std::rc::Rc;

use deep_clone::Value;

/// A lifecycle callback that a [`CachePool`][crate::CachePool] invokes on an instance when it is
/// created, acquired from the pool or released back to it.
///
/// Hooks are optional. A hook that cannot be applied to the instance it is dispatched on, such as
/// a named method the instance does not have, is silently skipped.
///
/// # Example
///
/// ```
/// use cache_pool::Hook;
///
/// let clear: Hook<Vec<u8>> = Hook::callable(|buffer: &mut Vec<u8>, _| buffer.clear());
///
/// let mut buffer = vec![1, 2, 3];
/// clear.dispatch(&mut buffer, &[]);
/// assert!(buffer.is_empty());
/// ```
#[non_exhaustive]
pub enum Hook<T> {
    /// Nothing is invoked. This is the default.
    None,

    /// The instance itself is invoked, if it is callable.
    ///
    /// See [`HookTarget::call_self()`].
    CallSelf,

    /// The method of the instance with this name is invoked, if it has one.
    ///
    /// See [`HookTarget::call_method()`].
    Method(String),

    /// The function is invoked with the instance and the arguments.
    Callable(Rc<dyn Fn(&mut T, &[Value])>),
}

impl<T> Hook<T> {
    /// Creates a hook that invokes `function` with the instance and the hook arguments.
    pub fn callable(function: impl Fn(&mut T, &[Value]) + 'static) -> Self {
        Self::Callable(Rc::new(function))
    }

    /// Creates a hook that invokes the method `name` of the instance.
    pub fn method(name: impl Into<String>) -> Self {
        Self::Method(name.into())
    }

    /// Whether dispatching this hook never does anything.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl<T: HookTarget> Hook<T> {
    /// Invokes the hook on `target` with `args`.
    ///
    /// Does nothing if the hook is [`Hook::None`] or if `target` cannot be invoked the way the
    /// hook requires.
    pub fn dispatch(&self, target: &mut T, args: &[Value]) {
        match self {
            Self::None => {}
            Self::CallSelf => {
                target.call_self(args);
            }
            Self::Method(name) => {
                target.call_method(name, args);
            }
            Self::Callable(function) => function(target, args),
        }
    }
}

impl<T> Default for Hook<T> {
    fn default() -> Self {
        Self::None
    }
}

impl<T> Clone for Hook<T> {
    fn clone(&self) -> Self {
        match self {
            Self::None => Self::None,
            Self::CallSelf => Self::CallSelf,
            Self::Method(name) => Self::Method(name.clone()),
            Self::Callable(function) => Self::Callable(Rc::clone(function)),
        }
    }
}

impl<T> fmt::Debug for Hook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::CallSelf => f.write_str("CallSelf"),
            Self::Method(name) => f.debug_tuple("Method").field(name).finish(),
            Self::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

impl<T> From<&str> for Hook<T> {
    fn from(name: &str) -> Self {
        Self::method(name)
    }
}

impl<T> From<String> for Hook<T> {
    fn from(name: String) -> Self {
        Self::Method(name)
    }
}

impl<T> From<bool> for Hook<T> {
    /// `true` invokes the instance itself, `false` invokes nothing.
    fn from(call_self: bool) -> Self {
        if call_self { Self::CallSelf } else { Self::None }
    }
}

/// The hooks of one pool.
pub(crate) struct Hooks<T> {
    pub(crate) on_acquire: Hook<T>,
    pub(crate) on_release: Hook<T>,
    pub(crate) on_create: Hook<T>,
}

impl<T> fmt::Debug for Hooks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_acquire", &self.on_acquire)
            .field("on_release", &self.on_release)
            .field("on_create", &self.on_create)
            .finish()
    }
}

/// Capabilities of a pooled type that [`Hook::CallSelf`] and [`Hook::Method`] rely on.
///
/// Both methods return whether anything was invoked. The default implementations invoke nothing,
/// so implementing the trait with an empty body is enough for types that only use
/// [`Hook::Callable`] hooks.
///
/// # Example
///
/// ```
/// use cache_pool::{Hook, HookTarget};
/// use deep_clone::Value;
///
/// #[derive(Default)]
/// struct Connection {
///     open: bool,
/// }
///
/// impl HookTarget for Connection {
///     fn call_method(&mut self, name: &str, _args: &[Value]) -> bool {
///         match name {
///             "close" => self.open = false,
///             _ => return false,
///         }
///
///         true
///     }
/// }
///
/// let mut connection = Connection { open: true };
/// Hook::method("close").dispatch(&mut connection, &[]);
/// assert!(!connection.open);
/// ```
pub trait HookTarget {
    /// Invokes the instance itself with `args`, if it is callable.
    fn call_self(&mut self, _args: &[Value]) -> bool {
        false
    }

    /// Invokes the method `name` of the instance with `args`, if it has one.
    fn call_method(&mut self, _name: &str, _args: &[Value]) -> bool {
        false
    }
}

impl HookTarget for String {}

impl<T> HookTarget for Vec<T> {}

impl HookTarget for Box<dyn FnMut(&[Value])> {
    fn call_self(&mut self, args: &[Value]) -> bool {
        self(args);
        true
    }
}
