// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name resolution for forward references.
//!
//! A [`Module`] is the global namespace a record was defined in. A
//! [`Namespace`] is an explicit set of caller-supplied local names, used
//! for records defined inside function bodies.

use crate::types::{ContainerKind, TypeDesc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A named global namespace.
pub struct Module {
    name: String,
    items: RwLock<HashMap<String, TypeDesc>>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            items: RwLock::new(HashMap::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind `name`, replacing any previous binding.
    pub fn define(&self, name: &str, ty: TypeDesc) {
        if self.items.write().insert(name.to_string(), ty).is_some() {
            log::debug!("[module:{}] rebinding {}", self.name, name);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<TypeDesc> {
        self.items.read().get(name).cloned()
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<module {}>", self.name)
    }
}

/// Caller-supplied local names.
#[derive(Clone, Debug, Default)]
pub struct Namespace {
    items: HashMap<String, TypeDesc>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: &str, ty: impl Into<TypeDesc>) -> Self {
        self.insert(name, ty);
        self
    }

    pub fn insert(&mut self, name: &str, ty: impl Into<TypeDesc>) {
        self.items.insert(name.to_string(), ty.into());
    }

    pub fn get(&self, name: &str) -> Option<&TypeDesc> {
        self.items.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Names that resolve without any namespace.
pub fn builtin(name: &str) -> Option<TypeDesc> {
    Some(match name {
        "int" => TypeDesc::int(),
        "float" => TypeDesc::float(),
        "str" => TypeDesc::str(),
        "bool" => TypeDesc::bool(),
        "datetime" => TypeDesc::datetime(),
        "date" => TypeDesc::date(),
        "time" => TypeDesc::time(),
        "timedelta" => TypeDesc::timedelta(),
        "Decimal" => TypeDesc::decimal(),
        "UUID" => TypeDesc::uuid(),
        "Any" => TypeDesc::Any,
        "None" => TypeDesc::None,
        "list" | "List" => TypeDesc::bare(ContainerKind::List),
        "dict" | "Dict" | "Mapping" => TypeDesc::bare(ContainerKind::Mapping),
        "set" | "Set" => TypeDesc::bare(ContainerKind::Set),
        "frozenset" | "FrozenSet" => TypeDesc::bare(ContainerKind::FrozenSet),
        "tuple" | "Tuple" => TypeDesc::bare(ContainerKind::Tuple),
        "Sequence" => TypeDesc::bare(ContainerKind::Sequence),
        _ => return None,
    })
}
