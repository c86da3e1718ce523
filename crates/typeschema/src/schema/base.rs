// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Base schemas: the pluggable parent every compiled schema derives from.
//!
//! A base schema contributes three things to each schema compiled against
//! it: the type table that maps leaf and container types to field classes,
//! hooks, and a default options block. Base schemas chain to a parent; a
//! lookup that misses falls through to the parent.

use super::hook::{self, Hook};
use super::SchemaOptions;
use crate::fields::{FieldClass, Scalar};
use crate::types::{ContainerKind, PrimitiveKind, TypeKey};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

pub struct BaseSchema {
    name: String,
    parent: Option<Arc<BaseSchema>>,
    type_mapping: HashMap<TypeKey, FieldClass>,
    hooks: Vec<Hook>,
    options: Option<SchemaOptions>,
}

impl BaseSchema {
    /// Builder for a base schema whose parent is the default base.
    pub fn builder(name: impl Into<String>) -> BaseSchemaBuilder {
        BaseSchemaBuilder {
            name: name.into(),
            parent: Some(Arc::clone(Self::default_base())),
            type_mapping: HashMap::new(),
            hooks: Vec::new(),
            options: None,
        }
    }

    /// The process-wide default base.
    pub fn default_base() -> &'static Arc<BaseSchema> {
        static DEFAULT: OnceLock<Arc<BaseSchema>> = OnceLock::new();
        DEFAULT.get_or_init(|| {
            Arc::new(BaseSchema {
                name: "Schema".to_string(),
                parent: None,
                type_mapping: default_type_mapping(),
                hooks: Vec::new(),
                options: None,
            })
        })
    }

    /// `None` means the default base.
    pub(crate) fn resolve(base: Option<&Arc<BaseSchema>>) -> Arc<BaseSchema> {
        base.map_or_else(|| Arc::clone(Self::default_base()), Arc::clone)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<BaseSchema>> {
        self.parent.as_ref()
    }

    /// Field class mapped to `key`, searching up the parent chain.
    pub fn field_class(&self, key: &TypeKey) -> Option<FieldClass> {
        match self.type_mapping.get(key) {
            Some(class) => Some(class.clone()),
            None => self.parent.as_ref()?.field_class(key),
        }
    }

    /// Hooks declared on this base only.
    pub fn own_hooks(&self) -> &[Hook] {
        &self.hooks
    }

    /// Hooks inherited along the chain, root-most first.
    pub fn hooks_chain(&self) -> Vec<Hook> {
        let mut out = self
            .parent
            .as_ref()
            .map(|p| p.hooks_chain())
            .unwrap_or_default();
        hook::overlay(&mut out, &self.hooks);
        out
    }

    /// Nearest options block along the chain.
    pub fn options(&self) -> Option<&SchemaOptions> {
        self.options
            .as_ref()
            .or_else(|| self.parent.as_ref()?.options())
    }
}

impl fmt::Debug for BaseSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseSchema")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name.clone()))
            .field("types", &self.type_mapping.len())
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Builder for [`BaseSchema`].
pub struct BaseSchemaBuilder {
    name: String,
    parent: Option<Arc<BaseSchema>>,
    type_mapping: HashMap<TypeKey, FieldClass>,
    hooks: Vec<Hook>,
    options: Option<SchemaOptions>,
}

impl BaseSchemaBuilder {
    /// Derive from `parent` instead of the default base.
    pub fn parent(mut self, parent: &Arc<BaseSchema>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Map `key` to `class`, shadowing the parent's entry.
    pub fn field_class(mut self, key: TypeKey, class: FieldClass) -> Self {
        self.type_mapping.insert(key, class);
        self
    }

    pub fn hook(mut self, hook: Hook) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn options(mut self, options: SchemaOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn build(self) -> Arc<BaseSchema> {
        Arc::new(BaseSchema {
            name: self.name,
            parent: self.parent,
            type_mapping: self.type_mapping,
            hooks: self.hooks,
            options: self.options,
        })
    }
}

/// Leaf and container classes of the default base. `Any` is absent, so
/// it falls through to a nullable raw field unless a base maps it.
fn default_type_mapping() -> HashMap<TypeKey, FieldClass> {
    let scalars = [
        (PrimitiveKind::Int, Scalar::Integer),
        (PrimitiveKind::Float, Scalar::Float),
        (PrimitiveKind::Str, Scalar::String),
        (PrimitiveKind::Bool, Scalar::Boolean),
        (PrimitiveKind::DateTime, Scalar::DateTime),
        (PrimitiveKind::Date, Scalar::Date),
        (PrimitiveKind::Time, Scalar::Time),
        (PrimitiveKind::TimeDelta, Scalar::TimeDelta),
        (PrimitiveKind::Decimal, Scalar::Decimal),
        (PrimitiveKind::Uuid, Scalar::Uuid),
    ];
    let containers = [
        (ContainerKind::List, FieldClass::list()),
        (ContainerKind::Sequence, FieldClass::sequence()),
        (ContainerKind::Set, FieldClass::set()),
        (ContainerKind::FrozenSet, FieldClass::frozenset()),
        (ContainerKind::Tuple, FieldClass::tuple()),
        (ContainerKind::Mapping, FieldClass::dict()),
    ];

    let mut table: HashMap<TypeKey, FieldClass> = scalars
        .into_iter()
        .map(|(kind, scalar)| (TypeKey::Primitive(kind), FieldClass::scalar(scalar)))
        .collect();
    table.extend(
        containers
            .into_iter()
            .map(|(kind, class)| (TypeKey::Container(kind), class)),
    );
    table
}
