// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Concurrent LRU cache of compiled schemas.
//!
//! Compiling a record type against a base schema is done once per
//! `(type, base)` pair; later requests are served from an in-memory LRU.
//! Returning the cached `Arc` keeps schema identity stable, so nested
//! fields of independently compiled records share their targets. A
//! secondary dashmap tracks pinned entries that are never evicted.

use crate::config::CacheConfig;
use crate::schema::{BaseSchema, Schema};
use crate::types::TypeDesc;
use dashmap::DashSet;
use lru::LruCache;
use parking_lot::RwLock;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

/// Identifies a compiled schema: the compiled type and the base schema.
/// Caller locals are not part of the key.
#[derive(Clone, Debug)]
pub struct SchemaKey {
    ty: TypeDesc,
    base: Arc<BaseSchema>,
}

impl SchemaKey {
    pub fn new(ty: &TypeDesc, base: &Arc<BaseSchema>) -> Self {
        Self {
            ty: ty.clone(),
            base: Arc::clone(base),
        }
    }

    pub fn ty(&self) -> &TypeDesc {
        &self.ty
    }
}

impl PartialEq for SchemaKey {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && Arc::ptr_eq(&self.base, &other.base)
    }
}

impl Eq for SchemaKey {}

impl Hash for SchemaKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ty.hash(state);
        std::ptr::hash(Arc::as_ptr(&self.base), state);
    }
}

/// Cache hit/miss statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct LookupStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// LRU-based concurrent cache for compiled schemas.
pub struct SchemaCache {
    inner: RwLock<LruCache<SchemaKey, Arc<Schema>>>,
    pinned: DashSet<SchemaKey>,
    stats: RwLock<LookupStats>,
}

impl SchemaCache {
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: RwLock::new(LruCache::new(config.capacity)),
            pinned: DashSet::new(),
            stats: RwLock::new(LookupStats::default()),
        }
    }

    /// The process-wide cache used by [`crate::class_schema`].
    pub fn global() -> &'static SchemaCache {
        static GLOBAL: OnceLock<SchemaCache> = OnceLock::new();
        GLOBAL.get_or_init(|| SchemaCache::new(CacheConfig::default()))
    }

    /// Look up a schema, marking it most recently used.
    pub fn get(&self, key: &SchemaKey) -> Option<Arc<Schema>> {
        let hit = self.inner.write().get(key).map(Arc::clone);
        match &hit {
            Some(_) => self.record_hit(),
            None => self.record_miss(),
        }
        hit
    }

    /// Look up without touching recency or statistics.
    pub fn peek(&self, key: &SchemaKey) -> Option<Arc<Schema>> {
        self.inner.read().peek(key).map(Arc::clone)
    }

    /// Insert unless the key is already present; returns the cached schema.
    ///
    /// When every slot holds a pinned schema the new one is returned
    /// without being cached.
    pub fn insert(&self, key: SchemaKey, schema: Arc<Schema>) -> Arc<Schema> {
        let mut cache = self.inner.write();
        if let Some(existing) = cache.get(&key) {
            return Arc::clone(existing);
        }
        if cache.len() >= cache.cap().get() && !self.free_slot(&mut cache) {
            log::debug!(
                "[schema-cache] all {} slots pinned, not caching {}",
                cache.cap(),
                key.ty
            );
            return schema;
        }
        cache.put(key, Arc::clone(&schema));
        schema
    }

    /// Never evict the schema stored under `key`.
    pub fn pin(&self, key: SchemaKey) {
        self.pinned.insert(key);
    }

    pub fn unpin(&self, key: &SchemaKey) -> bool {
        self.pinned.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().cap().get()
    }

    /// Drop every unpinned entry.
    pub fn clear(&self) {
        let mut cache = self.inner.write();
        let keep: Vec<(SchemaKey, Arc<Schema>)> = cache
            .iter()
            .filter(|(k, _)| self.pinned.contains(*k))
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect();
        cache.clear();
        for (k, v) in keep.into_iter().rev() {
            cache.put(k, v);
        }
    }

    #[must_use]
    pub fn stats(&self) -> LookupStats {
        *self.stats.read()
    }

    fn free_slot(&self, cache: &mut LruCache<SchemaKey, Arc<Schema>>) -> bool {
        if cache.len() < cache.cap().get() {
            return true;
        }

        let attempts = cache.len();
        for _ in 0..attempts {
            if let Some((old_key, old_value)) = cache.pop_lru() {
                if self.pinned.contains(&old_key) {
                    cache.put(old_key, old_value);
                } else {
                    log::debug!("[schema-cache] evicted {}", old_key.ty);
                    self.stats.write().evictions += 1;
                    return true;
                }
            } else {
                break;
            }
        }

        false
    }

    fn record_hit(&self) {
        let mut stats = self.stats.write();
        stats.hits = stats.hits.saturating_add(1);
    }

    fn record_miss(&self) {
        let mut stats = self.stats.write();
        stats.misses = stats.misses.saturating_add(1);
    }
}

#[cfg(test)]
mod tests;
