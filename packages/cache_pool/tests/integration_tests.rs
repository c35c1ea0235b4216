//! Integration tests for the `cache_pool` package.
//!
//! These tests exercise pools of dynamically typed values through the public API, covering
//! capacity management, hook dispatch and prototype cloning.

use std::cell::Cell;
use std::rc::Rc;

use cache_pool::{CachePool, Diagnostics, FactoryKind, Hook, SizeInput};
use deep_clone::Value;

fn records(initial: usize, max: usize) -> CachePool<Value> {
    CachePool::builder()
        .prototype(Value::record())
        .initial_capacity(initial)
        .max_capacity(max)
        .diagnostics(Diagnostics::Suppress)
        .build()
}

#[test]
fn resizing_with_fractional_and_clamped_sizes() {
    let mut pool = records(5, 10);
    assert_eq!(pool.max_capacity(), 10);

    pool.set_max_capacity(15.5);
    assert_eq!(pool.max_capacity(), 15);

    pool.set_capacity(100);
    assert_eq!(pool.capacity(), 15);
    assert_eq!(pool.available(), 5);

    pool.set_capacity(0);
    assert_eq!(pool.capacity(), 0);
    assert_eq!(pool.available(), 0);
}

#[test]
fn default_expand_of_full_pool() {
    let mut pool = records(5, 0);

    pool.expand(SizeInput::Unspecified);

    assert_eq!(pool.capacity(), 6);
    assert_eq!(pool.available(), 6);
}

#[test]
fn shrink_of_full_pool_beyond_its_size() {
    let mut pool = records(15, 0);
    assert_eq!(pool.available(), 15);

    pool.shrink(100);

    assert_eq!(pool.available(), 0);
    assert_eq!(pool.capacity(), 0);
}

#[test]
fn set_capacity_matches_bound() {
    for requested in [0_usize, 1, 3, 7, 8, 20] {
        let mut bounded = records(2, 8);
        bounded.set_capacity(requested);
        assert_eq!(bounded.capacity(), requested.min(8));

        let mut unbounded = records(2, 0);
        unbounded.set_capacity(requested);
        assert_eq!(unbounded.capacity(), requested);
    }
}

#[test]
fn invalid_sizes_leave_state_unchanged() {
    let mut pool = records(3, 6);
    let _held = pool.acquire();

    let inputs = [
        SizeInput::from(-1_i32),
        SizeInput::from(-0.25),
        SizeInput::from(f64::NAN),
        SizeInput::from("three"),
        SizeInput::from(&Value::record()),
    ];

    for input in inputs {
        pool.expand(input.clone());
        pool.shrink(input.clone());
        pool.set_capacity(input.clone());
        pool.set_max_capacity(input);

        assert_eq!(pool.capacity(), 3);
        assert_eq!(pool.available(), 2);
        assert_eq!(pool.max_capacity(), 6);
    }
}

#[test]
fn acquire_then_release_restores_available() {
    let mut pool = records(6, 10);

    let borrowed: Vec<_> = (0..4).map(|_| pool.acquire()).collect();
    assert_eq!(pool.available(), 2);

    for item in borrowed {
        assert!(pool.release(item));
    }

    assert_eq!(pool.available(), 6);
}

#[test]
fn exhausted_pool_still_hands_out_instances() {
    let mut pool = records(1, 1);

    let first = pool.acquire();
    let second = pool.acquire();
    let third = pool.acquire();

    assert_eq!(pool.available(), 0);
    for item in [&first, &second, &third] {
        assert_eq!(
            item.as_object().map(|object| object.type_name()).as_deref(),
            Some("Record")
        );
    }
    assert!(!first.ptr_eq(&second));
    assert!(!second.ptr_eq(&third));
}

#[test]
fn full_bounded_pool_drops_released_instances() {
    let mut pool = records(3, 3);
    assert_eq!(pool.available(), 3);

    for _ in 0..5 {
        assert!(!pool.release(Value::record()));
        assert_eq!(pool.available(), 3);
    }

    assert!(!pool.release_optional(None, &[]));
    assert_eq!(pool.capacity(), 3);
}

#[test]
fn named_method_hooks_are_dispatched_with_args() {
    let prototype = Value::record();
    prototype.set("state", "new");
    prototype.set(
        "init",
        Value::function(|this, args| {
            let label = args.first().and_then(Value::as_str).unwrap_or("in use");
            this.set("state", label);
            Value::Undefined
        }),
    );
    prototype.set(
        "clean",
        Value::function(|this, _| {
            this.set("state", "clean");
            Value::Undefined
        }),
    );

    let mut pool = CachePool::builder()
        .prototype(prototype)
        .initial_capacity(1)
        .on_acquire("init")
        .on_release("clean")
        .on_create(Hook::None)
        .build();

    let item = pool.acquire_with(&[Value::from("rendering")]);
    assert_eq!(item.get("state").as_str(), Some("rendering"));

    pool.release(item);
    let item = pool.acquire();
    assert_eq!(item.get("state").as_str(), Some("in use"));

    pool.release_with(item.clone(), &[]);
    assert_eq!(item.get("state").as_str(), Some("clean"));
}

#[test]
fn missing_named_method_is_silently_skipped() {
    let mut pool = CachePool::builder()
        .prototype(Value::record())
        .on_acquire("does_not_exist")
        .build();

    let item = pool.acquire();
    assert!(item.get("does_not_exist").is_undefined());
}

#[test]
fn call_self_hook_invokes_function_instances() {
    let calls = Rc::new(Cell::new(0_usize));
    let counter = Rc::clone(&calls);

    let instance = Value::function(move |_, _| {
        counter.set(counter.get().wrapping_add(1));
        Value::Undefined
    });

    let mut pool = CachePool::builder()
        .constructor(move || instance.clone())
        .initial_capacity(2)
        .on_acquire(true)
        .build();

    // Both initial instances received the creation hook, which defaults to the acquire hook.
    assert_eq!(calls.get(), 2);

    let item = pool.acquire();
    assert_eq!(calls.get(), 3);

    pool.release(item);
    assert_eq!(calls.get(), 3);
}

#[test]
fn callable_hook_receives_instance_and_args() {
    let mut pool = CachePool::builder()
        .prototype(Value::record())
        .on_release(Hook::callable(|item: &mut Value, args: &[Value]| {
            item.set("released_with", u32::try_from(args.len()).unwrap());
        }))
        .build();

    let item = pool.acquire();
    pool.release_with(item, &[Value::Null, Value::from(1)]);

    let item = pool.acquire();
    assert_eq!(item.get("released_with").as_number(), Some(2.0));
}

#[test]
fn deep_copy_pool_shares_nothing_with_prototype() {
    let nested = Value::record();
    let prototype = Value::record();
    prototype.set("nested", nested.clone());

    let mut deep = CachePool::builder()
        .prototype(prototype.clone())
        .deep_copy(true)
        .build();
    let mut shallow = CachePool::builder().prototype(prototype.clone()).build();

    let deep_item = deep.acquire();
    let shallow_item = shallow.acquire();

    assert!(!deep_item.ptr_eq(&prototype));
    assert!(!deep_item.get("nested").ptr_eq(&nested));

    assert!(!shallow_item.ptr_eq(&prototype));
    assert!(shallow_item.get("nested").ptr_eq(&nested));
}

#[test]
fn constructor_function_prototype_builds_instances() {
    let constructor = Value::function(|this, _| {
        this.set("kind", "particle");
        Value::Undefined
    });

    let mut pool = CachePool::builder().prototype(constructor).build();
    assert_eq!(pool.factory_kind(), FactoryKind::Callable);

    let item = pool.acquire();
    assert_eq!(item.get("kind").as_str(), Some("particle"));
}

#[test]
fn sequence_prototype() {
    let mut pool = CachePool::builder()
        .prototype(Value::sequence([Value::from(1), Value::from(2)]))
        .build();

    assert_eq!(pool.factory_kind(), FactoryKind::Sequence);
    assert_eq!(
        pool.acquire().as_object().map(|object| object.type_name()).as_deref(),
        Some("Sequence")
    );
}

#[test]
fn reset_recreates_initial_instances() {
    let created = Rc::new(Cell::new(0_usize));
    let counter = Rc::clone(&created);

    let mut pool = CachePool::builder()
        .prototype(Value::record())
        .initial_capacity(4)
        .max_capacity(8)
        .on_create(Hook::callable(move |item: &mut Value, _| {
            counter.set(counter.get().wrapping_add(1));
            item.set("generation", u32::try_from(counter.get()).unwrap());
        }))
        .build();

    let kept = pool.acquire();
    pool.set_max_capacity(0);
    pool.set_capacity(30);
    pool.expand(6);

    pool.reset();

    assert_eq!(pool.capacity(), 4);
    assert_eq!(pool.available(), 4);
    assert_eq!(pool.max_capacity(), 8);
    assert_eq!(created.get(), 14);

    let fresh = pool.acquire();
    assert!(fresh.get("generation").as_number() > kept.get("generation").as_number());
}

#[test]
fn default_pool_hands_out_records() {
    let mut pool = CachePool::default();

    assert_eq!(pool.capacity(), 1);
    assert!(!pool.deep_copy());

    let item = pool.acquire();
    item.set("x", 1);
    pool.release(item);

    assert_eq!(pool.available(), 1);
}
