use std::time::Duration;

use lfukit::builder::LfuCacheBuilder;

fn main() {
    let cache = LfuCacheBuilder::new()
        .max_entries(2)
        .eviction_interval(Duration::from_secs(3600))
        .stats_interval(Duration::from_secs(3600))
        .try_build()
        .expect("valid configuration");

    cache.put("a", "alpha".to_string());
    cache.put("b", "beta".to_string());

    cache.get(&"a");
    cache.put("c", "gamma".to_string());

    println!("contains a? {}", cache.get(&"a").is_some());
    println!("contains b? {}", cache.get(&"b").is_some());
    cache.close();
}

// Expected output:
// contains a? true
// contains b? false
//
// Explanation: capacity=2; "a" is accessed before inserting "c", so "b" is evicted.
