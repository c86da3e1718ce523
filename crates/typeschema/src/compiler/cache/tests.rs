// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//! Tests for SchemaCache.

use super::*;
use crate::schema::SchemaOptions;
use crate::types::RecordBuilder;
use std::sync::Barrier;
use std::thread;

fn entry(name: &str) -> (SchemaKey, Arc<Schema>) {
    let record = RecordBuilder::new(name).build();
    let ty = TypeDesc::record(&record);
    let base = Arc::clone(BaseSchema::default_base());
    let schema = Schema::new(
        ty.clone(),
        record,
        Arc::clone(&base),
        Vec::new(),
        Vec::new(),
        SchemaOptions::default(),
        Vec::new(),
    );
    (SchemaKey::new(&ty, &base), Arc::new(schema))
}

fn small_cache(capacity: usize) -> SchemaCache {
    SchemaCache::new(CacheConfig::default().with_capacity(capacity))
}

#[test]
fn cache_hit_and_miss_paths() {
    let cache = small_cache(4);
    let (key, schema) = entry("City");

    assert!(cache.get(&key).is_none());
    let stored = cache.insert(key.clone(), Arc::clone(&schema));
    assert!(Arc::ptr_eq(&stored, &schema));

    let same = cache.get(&key).unwrap();
    assert!(Arc::ptr_eq(&same, &schema));

    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
}

#[test]
fn insert_keeps_first_schema() {
    let cache = small_cache(4);
    let (key, first) = entry("City");
    cache.insert(key.clone(), Arc::clone(&first));

    let (_, second) = entry("Other");
    let stored = cache.insert(key, second);
    assert!(Arc::ptr_eq(&stored, &first));
    assert_eq!(cache.len(), 1);
}

#[test]
fn keys_distinguish_base_schemas() {
    let record = RecordBuilder::new("City").build();
    let ty = TypeDesc::record(&record);
    let custom = BaseSchema::builder("Custom").build();
    let default_key = SchemaKey::new(&ty, BaseSchema::default_base());
    let custom_key = SchemaKey::new(&ty, &custom);
    assert_ne!(default_key, custom_key);
    assert_eq!(default_key, SchemaKey::new(&ty, BaseSchema::default_base()));
}

#[test]
fn eviction_respects_capacity() {
    let cache = small_cache(2);
    let entries: Vec<_> = ["A", "B", "C"].iter().map(|n| entry(n)).collect();
    for (key, schema) in &entries {
        cache.insert(key.clone(), Arc::clone(schema));
    }

    assert_eq!(cache.len(), 2);
    assert!(cache.peek(&entries[0].0).is_none());
    assert!(cache.peek(&entries[2].0).is_some());
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn pin_prevents_eviction() {
    let cache = small_cache(2);
    let (pinned_key, pinned) = entry("Pinned");
    cache.insert(pinned_key.clone(), Arc::clone(&pinned));
    cache.pin(pinned_key.clone());

    for name in ["A", "B", "C"] {
        let (key, schema) = entry(name);
        cache.insert(key, schema);
    }

    let value = cache.peek(&pinned_key).unwrap();
    assert!(Arc::ptr_eq(&value, &pinned));

    cache.clear();
    assert_eq!(cache.len(), 1);
    assert!(cache.unpin(&pinned_key));
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn full_of_pins_does_not_cache() {
    let cache = small_cache(1);
    let (key, schema) = entry("Pinned");
    cache.insert(key.clone(), schema);
    cache.pin(key.clone());

    let (other_key, other) = entry("Other");
    let returned = cache.insert(other_key.clone(), Arc::clone(&other));
    assert!(Arc::ptr_eq(&returned, &other));
    assert!(cache.peek(&other_key).is_none());
    assert!(cache.peek(&key).is_some());
}

#[test]
fn concurrent_hits_are_cheap() {
    let cache = Arc::new(small_cache(8));
    let entries: Arc<Vec<_>> = Arc::new(["A", "B", "C", "D"].iter().map(|n| entry(n)).collect());
    for (key, schema) in entries.iter() {
        cache.insert(key.clone(), Arc::clone(schema));
    }

    let barrier = Arc::new(Barrier::new(8));
    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = Arc::clone(&cache);
        let entries = Arc::clone(&entries);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..100 {
                let idx = fastrand::usize(..4);
                let (key, schema) = &entries[idx];
                let found = cache.get(key).unwrap();
                assert!(Arc::ptr_eq(&found, schema));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = cache.stats();
    assert_eq!(stats.hits, 800);
    assert_eq!(stats.misses, 0);
}
