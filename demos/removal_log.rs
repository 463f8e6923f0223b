//! Runs the cache with its logging collaborators wired up and the
//! background timers at demonstration settings. Watch one entry get
//! force-evicted per tick and the stats report land every interval.

use std::thread;
use std::time::Duration;

use lfukit::builder::LfuCacheBuilder;
use lfukit::listener::LoggingRemovalListener;

fn main() {
    tracing_subscriber::fmt::init();

    let cache = LfuCacheBuilder::new()
        .max_entries(3)
        .eviction_interval(Duration::from_secs(1))
        .stats_interval(Duration::from_secs(2))
        .removal_listener(LoggingRemovalListener)
        .try_build()
        .expect("valid configuration");

    cache.put(1u32, "one".to_string());
    cache.put(2, "two".to_string());
    cache.put(3, "three".to_string());
    cache.put(3, "THREE".to_string()); // logs an Updated removal
    cache.put(4, "four".to_string()); // logs an Evicted removal

    thread::sleep(Duration::from_secs(5));
    cache.close();

    let stats = cache.stats();
    println!(
        "evictions={} average_put_nanos={:.0}",
        stats.eviction_count, stats.average_put_nanos
    );
}
