use std::any::type_name;
use std::fmt;

use deep_clone::{CloneDepth, Diagnostics, Value};
use tracing::trace;

use crate::{CachePoolBuilder, FactoryKind, HookTarget, Hooks, InstanceFactory, SizeInput, size};

/// An elastic pool of reusable instances of `T`.
///
/// The pool keeps recycled instances in a stack of slots. [`acquire()`][1] takes the topmost
/// ready instance, creating a new one if the pool has none left, and [`release()`][2] puts an
/// instance back on top. Hooks configured on the [builder][3] are dispatched on each instance as
/// it is created, acquired or released.
///
/// # Capacity
///
/// The pool tracks three numbers:
///
/// * [`capacity()`][4] is the number of slots in the pool;
/// * [`available()`][5] is the number of slots holding a ready instance, always at the bottom of
///   the stack and never more than the capacity;
/// * [`max_capacity()`][6] bounds the capacity, with zero meaning unbounded.
///
/// Releasing an instance when every slot is full grows the capacity by one, up to the maximum.
/// Once the maximum is reached, released instances are dropped. The capacity can also be changed
/// explicitly with [`expand()`][7], [`shrink()`][8] and [`set_capacity()`][9].
///
/// Invalid sizes (negative, non-numeric) passed to any resizing operation leave the pool
/// unchanged and are reported as a diagnostic. Fractional sizes are floored.
///
/// # Thread safety
///
/// The pool is single-threaded. It is `!Send` and `!Sync` when its hooks or factory are, which is
/// always the case for pools of [`Value`]s.
///
/// # Example
///
/// ```
/// use cache_pool::{CachePool, Hook};
///
/// let mut pool = CachePool::builder()
///     .constructor(String::new)
///     .initial_capacity(2)
///     .on_release(Hook::callable(|s: &mut String, _| s.clear()))
///     .build();
///
/// let mut greeting = pool.acquire();
/// greeting.push_str("hello");
/// assert_eq!(pool.available(), 1);
///
/// pool.release(greeting);
/// assert_eq!(pool.available(), 2);
///
/// // The release hook cleared the string before it was stored.
/// assert!(pool.acquire().is_empty());
/// ```
///
/// [1]: Self::acquire
/// [2]: Self::release
/// [3]: Self::builder
/// [4]: Self::capacity
/// [5]: Self::available
/// [6]: Self::max_capacity
/// [7]: Self::expand
/// [8]: Self::shrink
/// [9]: Self::set_capacity
pub struct CachePool<T> {
    /// One entry per slot. Slots below `available` hold an instance, the rest are empty.
    store: Vec<Option<T>>,

    /// Number of ready instances, which is also the index of the next slot to fill.
    available: usize,

    /// Zero means unbounded.
    max_capacity: usize,

    initial_capacity: usize,
    initial_max_capacity: usize,

    factory: InstanceFactory<T>,
    hooks: Hooks<T>,
    depth: CloneDepth,
    diagnostics: Diagnostics,
}

impl<T> fmt::Debug for CachePool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachePool")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("capacity", &self.capacity())
            .field("available", &self.available)
            .field("max_capacity", &self.max_capacity)
            .field("initial_capacity", &self.initial_capacity)
            .field("initial_max_capacity", &self.initial_max_capacity)
            .field("factory", &self.factory)
            .field("hooks", &self.hooks)
            .field("depth", &self.depth)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

impl CachePool<Value> {
    /// Creates a pool of empty records with the default configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use cache_pool::{CachePool, FactoryKind};
    ///
    /// let mut pool = CachePool::new();
    ///
    /// assert_eq!(pool.capacity(), 1);
    /// assert_eq!(pool.factory_kind(), FactoryKind::Record);
    ///
    /// let record = pool.acquire();
    /// assert!(record.as_object().is_some());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::builder().prototype(Value::record()).build()
    }
}

impl Default for CachePool<Value> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CachePool<T> {
    /// Starts building a new [`CachePool`].
    ///
    /// # Example
    ///
    /// ```
    /// use cache_pool::CachePool;
    ///
    /// let pool = CachePool::builder()
    ///     .constructor(|| [0_u8; 64].to_vec())
    ///     .initial_capacity(3)
    ///     .build();
    ///
    /// assert_eq!(pool.capacity(), 3);
    /// ```
    pub fn builder() -> CachePoolBuilder<T> {
        CachePoolBuilder::new()
    }

    /// The number of slots in the pool.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.store.len()
    }

    /// The maximum number of slots in the pool, or zero if unbounded.
    #[must_use]
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Whether the capacity of the pool is bounded.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.max_capacity > 0
    }

    /// The number of ready instances in the pool.
    #[must_use]
    pub fn available(&self) -> usize {
        self.available
    }

    /// The capacity the pool was built with, restored by [`reset()`][Self::reset].
    #[must_use]
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// The maximum capacity the pool was built with, restored by [`reset()`][Self::reset].
    #[must_use]
    pub fn initial_max_capacity(&self) -> usize {
        self.initial_max_capacity
    }

    /// Whether instances are deep clones of the prototype.
    #[must_use]
    pub fn deep_copy(&self) -> bool {
        self.depth.is_deep()
    }

    /// What kind of factory source the pool creates instances from.
    #[must_use]
    pub fn factory_kind(&self) -> FactoryKind {
        self.factory.kind()
    }

    /// Creates a new instance from the factory source.
    ///
    /// The pool itself is not changed and no hook is dispatched.
    #[must_use]
    pub fn instantiate(&mut self) -> T {
        self.factory.create(self.depth, self.diagnostics)
    }

    /// Puts `item` into the next free slot, growing the store if every slot is in use.
    fn push_available(&mut self, item: T) {
        match self.store.get_mut(self.available) {
            Some(slot) => *slot = Some(item),
            None => self.store.push(Some(item)),
        }

        self.available = self
            .available
            .checked_add(1)
            .expect("the available count cannot exceed the length of a Vec");
    }

    fn pop_available(&mut self) -> Option<T> {
        self.available = self.available.checked_sub(1)?;

        self.store.get_mut(self.available).and_then(Option::take)
    }

    fn truncate(&mut self, capacity: usize) {
        self.store.truncate(capacity);
        self.available = self.available.min(capacity);
    }

    #[cfg(test)]
    pub(crate) fn peek_available(&self) -> Vec<&T> {
        self.store
            .iter()
            .take(self.available)
            .flatten()
            .collect()
    }
}

impl<T: HookTarget> CachePool<T> {
    pub(crate) fn new_inner(
        factory: InstanceFactory<T>,
        initial_capacity: usize,
        max_capacity: usize,
        hooks: Hooks<T>,
        depth: CloneDepth,
        diagnostics: Diagnostics,
    ) -> Self {
        let mut pool = Self {
            store: Vec::with_capacity(initial_capacity),
            available: 0,
            max_capacity,
            initial_capacity,
            initial_max_capacity: max_capacity,
            factory,
            hooks,
            depth,
            diagnostics,
        };

        pool.fill_to(initial_capacity);
        pool
    }

    /// Creates instances, dispatching the creation hook on each, until `available` reaches `end`.
    fn fill_to(&mut self, end: usize) {
        while self.available < end {
            let mut item = self.instantiate();
            self.hooks.on_create.dispatch(&mut item, &[]);
            self.push_available(item);
        }
    }

    /// Takes an instance from the pool, creating a new one if none is available.
    ///
    /// The acquire hook is dispatched on the instance without arguments.
    #[must_use]
    pub fn acquire(&mut self) -> T {
        self.acquire_with(&[])
    }

    /// Takes an instance from the pool, creating a new one if none is available.
    ///
    /// The acquire hook is dispatched on the instance with `args`. A newly created instance does
    /// not receive the creation hook, only the acquire hook.
    ///
    /// # Example
    ///
    /// ```
    /// use cache_pool::{CachePool, Hook};
    /// use deep_clone::Value;
    ///
    /// let mut pool = CachePool::builder()
    ///     .constructor(String::new)
    ///     .on_acquire(Hook::callable(|s: &mut String, args: &[Value]| {
    ///         if let Some(text) = args.first().and_then(Value::as_str) {
    ///             s.push_str(text);
    ///         }
    ///     }))
    ///     .on_create(Hook::None)
    ///     .build();
    ///
    /// assert_eq!(pool.acquire_with(&[Value::from("ready")]), "ready");
    /// ```
    #[must_use]
    pub fn acquire_with(&mut self, args: &[Value]) -> T {
        let mut item = match self.pop_available() {
            Some(item) => item,
            None => self.instantiate(),
        };

        self.hooks.on_acquire.dispatch(&mut item, args);
        item
    }

    /// Gives an instance back to the pool.
    ///
    /// Returns whether the pool kept the instance. See [`release_with()`][Self::release_with].
    pub fn release(&mut self, item: T) -> bool {
        self.release_with(item, &[])
    }

    /// Gives an instance back to the pool, dispatching the release hook on it with `args`.
    ///
    /// If every slot holds an instance, the capacity grows by one to make room. If the pool is
    /// bounded and already holds its maximum number of available instances, the instance is
    /// dropped instead.
    ///
    /// Returns whether the pool kept the instance.
    ///
    /// # Example
    ///
    /// ```
    /// use cache_pool::CachePool;
    ///
    /// let mut pool = CachePool::builder()
    ///     .constructor(String::new)
    ///     .initial_capacity(1)
    ///     .max_capacity(1)
    ///     .build();
    ///
    /// let extra = pool.instantiate();
    /// assert!(!pool.release(extra));
    /// assert_eq!(pool.available(), 1);
    /// ```
    pub fn release_with(&mut self, mut item: T, args: &[Value]) -> bool {
        self.hooks.on_release.dispatch(&mut item, args);

        if self.is_bounded() && self.available >= self.max_capacity {
            trace!(
                max_capacity = self.max_capacity,
                "cache pool is full, dropping released instance"
            );
            return false;
        }

        self.push_available(item);
        true
    }

    /// Gives an instance back to the pool if there is one. Does nothing for `None`.
    ///
    /// Returns whether the pool kept an instance.
    pub fn release_optional(&mut self, item: Option<T>, args: &[Value]) -> bool {
        match item {
            Some(item) => self.release_with(item, args),
            None => false,
        }
    }

    /// Restores the pool to the state it was built in.
    ///
    /// All instances in the pool are dropped, the initial capacity and maximum capacity are
    /// restored and the pool is filled with new instances, dispatching the creation hook on each.
    pub fn reset(&mut self) {
        self.max_capacity = self.initial_max_capacity;
        self.store.clear();
        self.available = 0;
        self.fill_to(self.initial_capacity);

        trace!(capacity = self.capacity(), "cache pool reset");
    }

    /// Adds `delta` slots to the pool and fills `delta` more slots with new instances.
    ///
    /// Without a `delta`, or with zero, the pool grows by a quarter of its capacity, rounded
    /// down. Both the capacity and the number of available instances are clamped to the maximum
    /// capacity. The creation hook is dispatched on each new instance.
    ///
    /// # Example
    ///
    /// ```
    /// use cache_pool::{CachePool, SizeInput};
    ///
    /// let mut pool = CachePool::builder()
    ///     .constructor(String::new)
    ///     .initial_capacity(8)
    ///     .build();
    ///
    /// pool.expand(SizeInput::Unspecified);
    /// assert_eq!(pool.capacity(), 10);
    /// assert_eq!(pool.available(), 10);
    ///
    /// pool.expand(-1);
    /// assert_eq!(pool.capacity(), 10);
    /// ```
    pub fn expand(&mut self, delta: impl Into<SizeInput>) {
        let Ok(requested) = size::validate(self.diagnostics, "expand", &delta.into()) else {
            return;
        };

        #[expect(
            clippy::integer_division,
            reason = "the default growth is a quarter of the capacity, rounded down"
        )]
        let delta = match requested {
            Some(delta) if delta > 0 => delta,
            _ => self.capacity() / 4,
        };

        let mut capacity = self.capacity().saturating_add(delta);
        let mut filled = self.available.saturating_add(delta);

        if self.is_bounded() {
            capacity = capacity.min(self.max_capacity);
            filled = filled.min(self.max_capacity);
        }

        self.store.resize_with(capacity, || None);
        self.fill_to(filled);

        trace!(
            delta,
            capacity = self.capacity(),
            available = self.available,
            "cache pool expanded"
        );
    }

    /// Removes `delta` slots from the pool.
    ///
    /// No more slots than there are available instances are removed. Without a `delta`, or with
    /// zero, every empty slot is removed so the capacity equals the number of available
    /// instances. If the new capacity is below the number of available instances, the excess
    /// instances are dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use cache_pool::{CachePool, SizeInput};
    ///
    /// let mut pool = CachePool::builder()
    ///     .constructor(String::new)
    ///     .initial_capacity(4)
    ///     .build();
    ///
    /// pool.set_capacity(10);
    /// assert_eq!(pool.available(), 4);
    ///
    /// pool.shrink(SizeInput::Unspecified);
    /// assert_eq!(pool.capacity(), 4);
    ///
    /// pool.shrink(3);
    /// assert_eq!(pool.capacity(), 1);
    /// assert_eq!(pool.available(), 1);
    /// ```
    pub fn shrink(&mut self, delta: impl Into<SizeInput>) {
        let Ok(requested) = size::validate(self.diagnostics, "shrink", &delta.into()) else {
            return;
        };

        let removed = match requested {
            Some(delta) if delta > 0 => delta.min(self.available),
            _ => self
                .capacity()
                .checked_sub(self.available)
                .expect("the available count never exceeds the capacity"),
        };

        let capacity = self
            .capacity()
            .checked_sub(removed)
            .expect("no more slots than the capacity are ever removed");

        self.truncate(capacity);

        trace!(
            removed,
            capacity = self.capacity(),
            available = self.available,
            "cache pool shrunk"
        );
    }

    /// Sets the number of slots in the pool, clamped to the maximum capacity.
    ///
    /// New slots are empty. Instances in removed slots are dropped.
    pub fn set_capacity(&mut self, capacity: impl Into<SizeInput>) {
        let Ok(mut capacity) =
            size::validate_required(self.diagnostics, "capacity", &capacity.into())
        else {
            return;
        };

        if self.is_bounded() {
            capacity = capacity.min(self.max_capacity);
        }

        if capacity < self.capacity() {
            self.truncate(capacity);
        } else {
            self.store.resize_with(capacity, || None);
        }

        trace!(capacity, available = self.available, "cache pool capacity set");
    }

    /// Sets the maximum number of slots in the pool. Zero, or no value, makes the pool unbounded.
    ///
    /// If the pool is larger than the new maximum, it is shrunk to it and instances in removed
    /// slots are dropped.
    pub fn set_max_capacity(&mut self, max_capacity: impl Into<SizeInput>) {
        let Ok(requested) = size::validate(self.diagnostics, "max capacity", &max_capacity.into())
        else {
            return;
        };

        self.max_capacity = requested.unwrap_or(0);

        if self.is_bounded() && self.capacity() > self.max_capacity {
            self.truncate(self.max_capacity);
        }

        trace!(
            max_capacity = self.max_capacity,
            capacity = self.capacity(),
            "cache pool max capacity set"
        );
    }
}
