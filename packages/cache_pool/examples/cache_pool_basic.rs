//! Example demonstrating the lifecycle of instances in a cache pool.
//!
//! Instances are manufactured from a prototype, reset by a named method when they are released
//! and resized with the elastic capacity operations. Diagnostics for rejected sizes are printed
//! by the installed `tracing` subscriber.

use cache_pool::{CachePool, SizeInput};
use deep_clone::Value;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Cache Pool Lifecycle ===\n");

    let bullet = Value::record();
    bullet.set("x", 0.0);
    bullet.set("active", false);
    bullet.set(
        "fire",
        Value::function(|this, args| {
            this.set("x", args.first().and_then(Value::as_number).unwrap_or(0.0));
            this.set("active", true);
            Value::Undefined
        }),
    );
    bullet.set(
        "recycle",
        Value::function(|this, _| {
            this.set("active", false);
            Value::Undefined
        }),
    );

    let mut pool = CachePool::builder()
        .prototype(bullet)
        .initial_capacity(4)
        .max_capacity(8)
        .on_acquire("fire")
        .on_release("recycle")
        .on_create("recycle")
        .build();

    report("Built", &pool);

    let mut in_flight = Vec::new();
    for x in [10.0, 20.0, 30.0, 40.0, 50.0, 60.0] {
        in_flight.push(pool.acquire_with(&[Value::from(x)]));
    }
    report("After firing six bullets", &pool);

    for bullet in in_flight.drain(..) {
        println!(
            "Recycling bullet at x={:?}",
            bullet.get("x").as_number().unwrap_or_default()
        );
        pool.release(bullet);
    }
    report("After recycling all bullets", &pool);

    pool.expand(SizeInput::Unspecified);
    report("After default expansion", &pool);

    pool.shrink(3);
    report("After shrinking by three", &pool);

    // Rejected with a diagnostic, the pool does not change.
    pool.expand(-2);
    // Floored with a diagnostic.
    pool.set_capacity(5.75);
    report("After setting capacity to 5.75", &pool);

    pool.reset();
    report("After reset", &pool);
}

fn report(stage: &str, pool: &CachePool<Value>) {
    println!(
        "{stage}: capacity={}, available={}, max_capacity={}",
        pool.capacity(),
        pool.available(),
        pool.max_capacity()
    );
}
