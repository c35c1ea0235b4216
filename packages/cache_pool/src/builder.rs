use std::any::type_name;
use std::fmt;

use deep_clone::{CloneDepth, Diagnostics};

use crate::{CachePool, Hook, HookTarget, Hooks, InstanceFactory, Replicate, SizeInput, size};

/// Builder for creating an instance of [`CachePool`].
///
/// A pool needs a factory source, set with either [`constructor()`][1] or [`prototype()`][2].
/// Everything else is optional:
///
/// * the initial capacity defaults to 1;
/// * the maximum capacity defaults to unbounded;
/// * hooks default to doing nothing, with the creation hook defaulting to the acquire hook;
/// * prototypes are cloned shallowly unless [`deep_copy()`][3] says otherwise.
///
/// # Examples
///
/// ```
/// use cache_pool::CachePool;
///
/// let pool = CachePool::builder()
///     .constructor(|| Vec::<u8>::with_capacity(1024))
///     .initial_capacity(4)
///     .max_capacity(16)
///     .build();
///
/// assert_eq!(pool.capacity(), 4);
/// assert_eq!(pool.available(), 4);
/// assert_eq!(pool.max_capacity(), 16);
/// ```
///
/// [1]: Self::constructor
/// [2]: Self::prototype
/// [3]: Self::deep_copy
#[must_use]
pub struct CachePoolBuilder<T> {
    factory: Option<InstanceFactory<T>>,
    initial_capacity: SizeInput,
    max_capacity: SizeInput,
    on_acquire: Hook<T>,
    on_release: Hook<T>,
    on_create: Option<Hook<T>>,
    depth: CloneDepth,
    diagnostics: Diagnostics,
}

impl<T> fmt::Debug for CachePoolBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachePoolBuilder")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("factory", &self.factory)
            .field("initial_capacity", &self.initial_capacity)
            .field("max_capacity", &self.max_capacity)
            .field("on_acquire", &self.on_acquire)
            .field("on_release", &self.on_release)
            .field("on_create", &self.on_create)
            .field("depth", &self.depth)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

impl<T> CachePoolBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            factory: None,
            initial_capacity: SizeInput::Unspecified,
            max_capacity: SizeInput::Unspecified,
            on_acquire: Hook::None,
            on_release: Hook::None,
            on_create: None,
            depth: CloneDepth::Shallow,
            diagnostics: Diagnostics::Report,
        }
    }

    /// Manufactures instances by invoking `constructor`.
    ///
    /// Replaces any previously set factory source.
    pub fn constructor(mut self, constructor: impl FnMut() -> T + 'static) -> Self {
        self.factory = Some(InstanceFactory::constructor(constructor));
        self
    }

    /// Manufactures instances by replicating `prototype`.
    ///
    /// Replaces any previously set factory source.
    ///
    /// # Examples
    ///
    /// ```
    /// use cache_pool::CachePool;
    /// use deep_clone::Value;
    ///
    /// let template = Value::record();
    /// template.set("hits", 0);
    ///
    /// let mut pool = CachePool::builder().prototype(template.clone()).build();
    /// let item = pool.acquire();
    ///
    /// assert_eq!(item.get("hits").as_number(), Some(0.0));
    /// assert!(!item.ptr_eq(&template));
    /// ```
    pub fn prototype(mut self, prototype: T) -> Self
    where
        T: Replicate,
    {
        self.factory = Some(InstanceFactory::prototype(prototype));
        self
    }

    /// Sets the number of instances created when the pool is built, and restored by
    /// [`reset()`][CachePool::reset].
    ///
    /// An invalid value is reported as a diagnostic and replaced with 1.
    pub fn initial_capacity(mut self, capacity: impl Into<SizeInput>) -> Self {
        self.initial_capacity = capacity.into();
        self
    }

    /// Sets the maximum capacity of the pool. Zero means unbounded.
    ///
    /// An invalid value is reported as a diagnostic and replaced with unbounded. If the initial
    /// capacity exceeds a bounded maximum, the pool is built unbounded.
    pub fn max_capacity(mut self, capacity: impl Into<SizeInput>) -> Self {
        self.max_capacity = capacity.into();
        self
    }

    /// Sets the hook dispatched on each instance handed out by the pool.
    pub fn on_acquire(mut self, hook: impl Into<Hook<T>>) -> Self {
        self.on_acquire = hook.into();
        self
    }

    /// Sets the hook dispatched on each instance given back to the pool.
    pub fn on_release(mut self, hook: impl Into<Hook<T>>) -> Self {
        self.on_release = hook.into();
        self
    }

    /// Sets the hook dispatched on each instance the pool creates to fill its slots.
    ///
    /// Defaults to the [acquire hook][Self::on_acquire].
    pub fn on_create(mut self, hook: impl Into<Hook<T>>) -> Self {
        self.on_create = Some(hook.into());
        self
    }

    /// Sets whether prototypes are cloned deeply (`true`) or shallowly (`false`, the default).
    pub fn deep_copy(mut self, deep: bool) -> Self {
        self.depth = CloneDepth::from(deep);
        self
    }

    /// Sets whether the pool reports advisory diagnostics.
    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Builds the cache pool with the specified configuration, filling its initial capacity.
    ///
    /// # Panics
    ///
    /// Panics if no factory source was set.
    #[must_use]
    pub fn build(self) -> CachePool<T>
    where
        T: HookTarget,
    {
        let Some(factory) = self.factory else {
            panic!("a cache pool needs a constructor or a prototype to create instances from");
        };

        let initial_capacity =
            match size::validate(self.diagnostics, "initial capacity", &self.initial_capacity) {
                Ok(Some(capacity)) => capacity,
                Ok(None) | Err(_) => 1,
            };

        let max_capacity =
            match size::validate(self.diagnostics, "max capacity", &self.max_capacity) {
                Ok(Some(max)) if max >= initial_capacity => max,
                _ => 0,
            };

        let on_create = self
            .on_create
            .unwrap_or_else(|| self.on_acquire.clone());

        let hooks = Hooks {
            on_acquire: self.on_acquire,
            on_release: self.on_release,
            on_create,
        };

        CachePool::new_inner(
            factory,
            initial_capacity,
            max_capacity,
            hooks,
            self.depth,
            self.diagnostics,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let pool = CachePool::builder().constructor(String::new).build();

        assert_eq!(pool.capacity(), 1);
        assert_eq!(pool.available(), 1);
        assert_eq!(pool.max_capacity(), 0);
        assert!(!pool.is_bounded());
        assert!(!pool.deep_copy());
    }

    #[test]
    #[should_panic(expected = "needs a constructor or a prototype")]
    fn missing_factory_panics() {
        drop(CachePool::<String>::builder().build());
    }

    #[test]
    fn invalid_initial_capacity_falls_back_to_one() {
        let pool = CachePool::builder()
            .constructor(String::new)
            .initial_capacity(-3)
            .diagnostics(Diagnostics::Suppress)
            .build();

        assert_eq!(pool.capacity(), 1);
        assert_eq!(pool.initial_capacity(), 1);
    }

    #[test]
    fn zero_initial_capacity_is_allowed() {
        let pool = CachePool::builder()
            .constructor(String::new)
            .initial_capacity(0)
            .build();

        assert_eq!(pool.capacity(), 0);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn initial_above_max_is_unbounded() {
        let pool = CachePool::builder()
            .constructor(String::new)
            .initial_capacity(8)
            .max_capacity(4)
            .build();

        assert_eq!(pool.capacity(), 8);
        assert_eq!(pool.max_capacity(), 0);
        assert_eq!(pool.initial_max_capacity(), 0);
    }

    #[test]
    fn invalid_max_capacity_is_unbounded() {
        let pool = CachePool::builder()
            .constructor(String::new)
            .max_capacity("lots")
            .diagnostics(Diagnostics::Suppress)
            .build();

        assert_eq!(pool.max_capacity(), 0);
    }

    #[test]
    fn fractional_capacities_are_floored() {
        let pool = CachePool::builder()
            .constructor(String::new)
            .initial_capacity(2.7)
            .max_capacity(9.9)
            .build();

        assert_eq!(pool.capacity(), 2);
        assert_eq!(pool.max_capacity(), 9);
    }

    #[test]
    fn create_hook_defaults_to_acquire_hook() {
        let pool = CachePool::builder()
            .constructor(String::new)
            .initial_capacity(2)
            .on_acquire(Hook::callable(|s: &mut String, _| s.push('a')))
            .build();

        assert_eq!(pool.peek_available(), vec!["a", "a"]);
    }

    #[test]
    fn explicit_create_hook_wins() {
        let pool = CachePool::builder()
            .constructor(String::new)
            .initial_capacity(2)
            .on_acquire(Hook::callable(|s: &mut String, _| s.push('a')))
            .on_create(Hook::callable(|s: &mut String, _| s.push('c')))
            .build();

        assert_eq!(pool.peek_available(), vec!["c", "c"]);
    }

    #[test]
    fn debug_output_names_item_type() {
        let builder = CachePool::<String>::builder().deep_copy(true);

        let output = format!("{builder:?}");
        assert!(output.contains("alloc::string::String"));
        assert!(output.contains("Deep"));
    }
}
