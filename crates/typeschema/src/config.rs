// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compiler configuration - single source of truth.
//!
//! - **Level 1 (Static)**: compile-time constants (cache size, attribute name)
//! - **Level 2 (Dynamic)**: [`CacheConfig`], overridable from the environment
//!
//! ```ignore
//! use typeschema::config::CacheConfig;
//!
//! // TYPESCHEMA_CACHE_CAPACITY=64 overrides the default
//! let config = CacheConfig::default().with_capacity(256);
//! ```

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Default number of compiled schemas kept by the cross-invocation LRU cache.
pub const DEFAULT_SCHEMA_CACHE_CAPACITY: usize = 1024;

/// Environment variable overriding [`DEFAULT_SCHEMA_CACHE_CAPACITY`].
pub const CACHE_CAPACITY_ENV: &str = "TYPESCHEMA_CACHE_CAPACITY";

/// Name of the lazily computed class attribute holding a record's schema.
pub const SCHEMA_ATTRIBUTE: &str = "Schema";

/// Key under which record-level validation errors are reported.
pub const SCHEMA_ERROR_KEY: &str = "_schema";

/// Sizing of a [`SchemaCache`](crate::compiler::SchemaCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of unpinned schemas kept before LRU eviction.
    pub capacity: NonZeroUsize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let capacity = std::env::var(CACHE_CAPACITY_ENV)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .and_then(NonZeroUsize::new)
            .or(NonZeroUsize::new(DEFAULT_SCHEMA_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self { capacity }
    }
}

impl CacheConfig {
    /// Override the capacity. Zero is ignored.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        if let Some(capacity) = NonZeroUsize::new(capacity) {
            self.capacity = capacity;
        } else {
            log::warn!("[typeschema] ignoring zero schema cache capacity");
        }
        self
    }
}
