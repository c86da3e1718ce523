// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema options block

use serde::{Deserialize, Serialize};

/// What `load` does with input keys that match no field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unknown {
    /// Report each unknown key as an error
    #[default]
    Raise,
    /// Drop unknown keys
    Exclude,
    /// Keep unknown keys in the loaded data
    Include,
}

/// Per-schema options. A record's block replaces its base schema's block
/// as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaOptions {
    /// Unknown key policy
    pub unknown: Unknown,

    /// Fields left out of the schema entirely
    pub exclude: Vec<String>,

    /// Fields never dumped
    pub load_only: Vec<String>,

    /// Fields never loaded
    pub dump_only: Vec<String>,
}

impl SchemaOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the unknown key policy
    #[must_use]
    pub fn unknown(mut self, policy: Unknown) -> Self {
        self.unknown = policy;
        self
    }

    /// Exclude a field
    #[must_use]
    pub fn exclude(mut self, field: impl Into<String>) -> Self {
        self.exclude.push(field.into());
        self
    }

    /// Mark a field load-only
    #[must_use]
    pub fn load_only(mut self, field: impl Into<String>) -> Self {
        self.load_only.push(field.into());
        self
    }

    /// Mark a field dump-only
    #[must_use]
    pub fn dump_only(mut self, field: impl Into<String>) -> Self {
        self.dump_only.push(field.into());
        self
    }
}
