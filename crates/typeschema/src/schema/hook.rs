// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Named processing hooks run around field (de)serialization.

use crate::fields::ValidationError;
use crate::value::{Value, ValueMap};
use serde_json::{Map, Value as Json};
use std::fmt;
use std::sync::Arc;

pub type PreLoadFn = Arc<dyn Fn(Json) -> Result<Json, ValidationError> + Send + Sync>;
pub type PostLoadFn = Arc<dyn Fn(ValueMap) -> Result<ValueMap, ValidationError> + Send + Sync>;
pub type PreDumpFn = Arc<dyn Fn(Value) -> Result<Value, ValidationError> + Send + Sync>;
pub type PostDumpFn =
    Arc<dyn Fn(Map<String, Json>) -> Result<Map<String, Json>, ValidationError> + Send + Sync>;
pub type ValidatesSchemaFn = Arc<dyn Fn(&ValueMap) -> Result<(), ValidationError> + Send + Sync>;

/// When a hook runs and what it sees.
#[derive(Clone)]
pub enum HookKind {
    /// Raw input, before any field runs.
    PreLoad(PreLoadFn),
    /// Loaded attributes, before the record is constructed.
    PostLoad(PostLoadFn),
    /// The value about to be dumped.
    PreDump(PreDumpFn),
    /// Dumped output object.
    PostDump(PostDumpFn),
    /// Whole-record check after every field loaded cleanly. Plain messages
    /// are reported under `_schema`.
    ValidatesSchema(ValidatesSchemaFn),
}

/// A hook with the name it is registered under. Names identify hooks
/// across a base schema and the records compiled against it.
#[derive(Clone)]
pub struct Hook {
    name: String,
    kind: HookKind,
}

impl Hook {
    pub fn pre_load(
        name: impl Into<String>,
        f: impl Fn(Json) -> Result<Json, ValidationError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind: HookKind::PreLoad(Arc::new(f)),
        }
    }

    pub fn post_load(
        name: impl Into<String>,
        f: impl Fn(ValueMap) -> Result<ValueMap, ValidationError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind: HookKind::PostLoad(Arc::new(f)),
        }
    }

    pub fn pre_dump(
        name: impl Into<String>,
        f: impl Fn(Value) -> Result<Value, ValidationError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind: HookKind::PreDump(Arc::new(f)),
        }
    }

    pub fn post_dump(
        name: impl Into<String>,
        f: impl Fn(Map<String, Json>) -> Result<Map<String, Json>, ValidationError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind: HookKind::PostDump(Arc::new(f)),
        }
    }

    pub fn validates_schema(
        name: impl Into<String>,
        f: impl Fn(&ValueMap) -> Result<(), ValidationError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind: HookKind::ValidatesSchema(Arc::new(f)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &HookKind {
        &self.kind
    }

    fn stage(&self) -> &'static str {
        match self.kind {
            HookKind::PreLoad(_) => "pre_load",
            HookKind::PostLoad(_) => "post_load",
            HookKind::PreDump(_) => "pre_dump",
            HookKind::PostDump(_) => "post_dump",
            HookKind::ValidatesSchema(_) => "validates_schema",
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} hook {}>", self.stage(), self.name)
    }
}

/// Overlay `hooks` onto `base`: a same-named hook replaces the inherited
/// one in place, new names are appended.
pub(crate) fn overlay(base: &mut Vec<Hook>, hooks: &[Hook]) {
    for hook in hooks {
        match base.iter_mut().find(|h| h.name == hook.name) {
            Some(slot) => *slot = hook.clone(),
            None => base.push(hook.clone()),
        }
    }
}
