use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;

use graphschema::{AllocatorConfig, NameAllocator};
use serde_json::json;

#[test]
fn test_alias_and_param_formats() {
    let allocator = NameAllocator::new();
    assert_eq!(allocator.alias("Person"), "person_0");
    assert_eq!(allocator.alias("WorksAt"), "works_at_1");
    assert_eq!(allocator.param("person_0", "name"), "param_person_0_name_2");
    assert_eq!(allocator.issued(), 3);
}

#[test]
fn test_same_type_gets_distinct_aliases() {
    let allocator = NameAllocator::new();
    let a = allocator.alias("Person");
    let b = allocator.alias("Person");
    assert_ne!(a, b);
}

#[test]
fn test_reset_restarts_sequence() {
    let allocator = NameAllocator::new();
    allocator.alias("Person");
    allocator.reset();
    assert_eq!(allocator.alias("Person"), "person_0");
}

#[test]
fn test_uncached_params_are_always_fresh() {
    let allocator = NameAllocator::new();
    let a = allocator.param_for_value("p", "name", &json!("Alice"));
    let b = allocator.param_for_value("p", "name", &json!("Alice"));
    assert_ne!(a, b);
    assert_eq!(allocator.cached_entries(), 0);
}

#[test]
fn test_cache_reuses_identical_bindings() {
    let allocator = NameAllocator::with_cache(NonZeroUsize::new(2).unwrap());
    let a = allocator.param_for_value("p", "name", &json!("Alice"));
    let b = allocator.param_for_value("p", "name", &json!("Alice"));
    let c = allocator.param_for_value("p", "name", &json!("Bob"));
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(allocator.cached_entries(), 2);
}

#[test]
fn test_cache_is_bounded() {
    let allocator = NameAllocator::with_cache(NonZeroUsize::new(2).unwrap());
    let first = allocator.param_for_value("p", "n", &json!(1));
    allocator.param_for_value("p", "n", &json!(2));
    allocator.param_for_value("p", "n", &json!(3));
    assert_eq!(allocator.cached_entries(), 2);
    let again = allocator.param_for_value("p", "n", &json!(1));
    assert_ne!(first, again, "evicted entry must be minted anew");
}

#[test]
fn test_from_config() {
    let disabled = NameAllocator::from_config(&AllocatorConfig {
        param_cache_capacity: Some(0),
    });
    disabled.param_for_value("p", "n", &json!(1));
    assert_eq!(disabled.cached_entries(), 0);

    let enabled = NameAllocator::from_config(&AllocatorConfig {
        param_cache_capacity: Some(8),
    });
    enabled.param_for_value("p", "n", &json!(1));
    assert_eq!(enabled.cached_entries(), 1);
}

#[test]
fn test_concurrent_allocation_never_collides() {
    let allocator = Arc::new(NameAllocator::new());
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let allocator = Arc::clone(&allocator);
            thread::spawn(move || {
                (0..500)
                    .map(|_| allocator.param(&format!("w{worker}"), "x"))
                    .map(|name| name.rsplit('_').next().unwrap().to_string())
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    let mut counters = HashSet::new();
    for handle in handles {
        for counter in handle.join().unwrap() {
            assert!(counters.insert(counter), "counter issued twice");
        }
    }
    assert_eq!(counters.len(), 8 * 500);
    assert_eq!(allocator.issued(), 8 * 500);
}
