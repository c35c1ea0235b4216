#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! An elastic object pool that recycles instances and dispatches lifecycle hooks on them.
//!
//! A [`CachePool`] amortizes the cost of creating instances by keeping released instances for
//! later reuse. Instances are manufactured either by a constructor or by cloning a prototype,
//! and the pool grows and shrinks within configurable bounds.
//!
//! # Features
//!
//! - **Recycling**: [`acquire()`][CachePool::acquire] hands out a ready instance, creating one
//!   only when the pool has none left; [`release()`][CachePool::release] keeps the instance for
//!   reuse.
//! - **Lifecycle hooks**: a [`Hook`] is dispatched on instances as they are created, acquired
//!   and released. A hook may invoke a closure, a named method of the instance or the instance
//!   itself.
//! - **Prototypes**: instances can be deep or shallow clones of a prototype value, using the
//!   cycle-safe cloning of the [`deep_clone`] package.
//! - **Elastic capacity**: the pool can be expanded, shrunk or resized explicitly, optionally up
//!   to a maximum capacity.
//! - **Forgiving sizes**: invalid sizes are reported and ignored, fractional sizes are floored.
//!
//! # Example
//!
//! ```rust
//! use cache_pool::{CachePool, Hook};
//! use deep_clone::Value;
//!
//! let particle = Value::record();
//! particle.set("x", 0.0);
//! particle.set(
//!     "reset",
//!     Value::function(|this, _| {
//!         this.set("x", 0.0);
//!         Value::Undefined
//!     }),
//! );
//!
//! let mut pool = CachePool::builder()
//!     .prototype(particle)
//!     .initial_capacity(10)
//!     .max_capacity(20)
//!     .on_release("reset")
//!     .build();
//!
//! let moving = pool.acquire();
//! moving.set("x", 12.5);
//!
//! pool.release(moving);
//!
//! let recycled = pool.acquire();
//! assert_eq!(recycled.get("x").as_number(), Some(0.0));
//! ```
//!
//! # Diagnostics
//!
//! Rejected and floored sizes are reported as `tracing` events with the
//! `cache_pool::diagnostics` target. Use [`CachePoolBuilder::diagnostics()`] to suppress them.

mod builder;
mod cache_pool;
mod diagnostics;
mod factory;
mod hook;
mod size;
mod value;

pub use builder::*;
pub use cache_pool::*;
pub use deep_clone::{CloneDepth, Diagnostics};
pub use factory::FactoryKind;
pub(crate) use factory::InstanceFactory;
pub use factory::Replicate;
pub(crate) use hook::Hooks;
pub use hook::{Hook, HookTarget};
pub use size::{InvalidSize, Resolution, SizeInput};
