// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for record and enum definitions.

use crate::fields::FieldMetadata;
use crate::schema::{BaseSchema, Hook, SchemaOptions};
use crate::types::{
    ConstructError, Constructor, EnumDef, FieldDef, Module, RecordDef, RecordShape, TypeDesc,
    TypeVar,
};
use crate::value::{Value, ValueMap};
use std::sync::{Arc, OnceLock, Weak};

/// Builder for creating [`RecordDef`] instances.
///
/// ```ignore
/// let point = RecordBuilder::new("Point")
///     .field("x", TypeDesc::float())
///     .field_with_default("y", TypeDesc::float(), 0.0)
///     .with_schema()
///     .build();
/// let schema = point.schema()?;
/// ```
pub struct RecordBuilder {
    name: String,
    shape: RecordShape,
    type_params: Vec<TypeVar>,
    bases: Vec<TypeDesc>,
    fields: Vec<FieldDef>,
    hooks: Vec<Hook>,
    options: Option<SchemaOptions>,
    module: Option<Arc<Module>>,
    constructor: Option<Constructor>,
    schema_attribute: Option<Option<Arc<BaseSchema>>>,
}

impl RecordBuilder {
    /// Create a new builder for a dataclass-shaped record.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: RecordShape::Dataclass,
            type_params: Vec::new(),
            bases: Vec::new(),
            fields: Vec::new(),
            hooks: Vec::new(),
            options: None,
            module: None,
            constructor: None,
            schema_attribute: None,
        }
    }

    /// Plain annotated class instead of a dataclass.
    pub fn annotated(mut self) -> Self {
        self.shape = RecordShape::Annotated;
        self
    }

    /// Register the record in `module` under its name.
    pub fn module(mut self, module: &Arc<Module>) -> Self {
        self.module = Some(Arc::clone(module));
        self
    }

    /// Declare a type parameter (`class Box(Generic[T])`).
    pub fn type_param(mut self, tv: &TypeVar) -> Self {
        self.type_params.push(tv.clone());
        self
    }

    /// Add a base: a record or a parametrized record.
    pub fn base(mut self, base: impl Into<TypeDesc>) -> Self {
        self.bases.push(base.into());
        self
    }

    /// Add a required field.
    pub fn field(mut self, name: impl Into<String>, ty: impl Into<TypeDesc>) -> Self {
        self.fields.push(FieldDef::new(name, ty));
        self
    }

    /// Add a field with a static default.
    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        ty: impl Into<TypeDesc>,
        default: impl Into<Value>,
    ) -> Self {
        self.fields.push(FieldDef::new(name, ty).with_default(default));
        self
    }

    /// Add a field whose default is produced by `factory`.
    pub fn field_with_factory(
        mut self,
        name: impl Into<String>,
        ty: impl Into<TypeDesc>,
        factory: impl Fn() -> Value + Send + Sync + 'static,
    ) -> Self {
        self.fields.push(FieldDef::new(name, ty).with_factory(factory));
        self
    }

    /// Add a field with per-field metadata.
    pub fn field_with_metadata(
        mut self,
        name: impl Into<String>,
        ty: impl Into<TypeDesc>,
        metadata: FieldMetadata,
    ) -> Self {
        self.fields
            .push(FieldDef::new(name, ty).with_metadata(metadata));
        self
    }

    /// Add a fully specified field.
    pub fn field_def(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Attach a record-level hook.
    pub fn hook(mut self, hook: Hook) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Attach the record's schema options block.
    pub fn options(mut self, options: SchemaOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Replace the generated constructor.
    pub fn constructor(
        mut self,
        ctor: impl Fn(ValueMap) -> Result<ValueMap, ConstructError> + Send + Sync + 'static,
    ) -> Self {
        self.constructor = Some(Arc::new(ctor));
        self
    }

    /// Attach a lazy `Schema` attribute compiled against the default base.
    pub fn with_schema(mut self) -> Self {
        self.schema_attribute = Some(None);
        self
    }

    /// Attach a lazy `Schema` attribute compiled against `base`.
    pub fn with_schema_base(mut self, base: &Arc<BaseSchema>) -> Self {
        self.schema_attribute = Some(Some(Arc::clone(base)));
        self
    }

    /// Build the record definition.
    pub fn build(self) -> Arc<RecordDef> {
        let module = self.module.as_ref().map_or_else(Weak::new, Arc::downgrade);
        let def = Arc::new(RecordDef {
            name: self.name,
            shape: self.shape,
            type_params: self.type_params,
            bases: self.bases,
            fields: self.fields,
            hooks: self.hooks,
            options: self.options,
            module,
            constructor: self.constructor,
            ancestors: OnceLock::new(),
            schema_attr: OnceLock::new(),
        });
        if let Some(base) = self.schema_attribute {
            def.install_schema_attribute(base);
        }
        if let Some(module) = &self.module {
            module.define(def.name(), TypeDesc::Record(Arc::clone(&def)));
        }
        def
    }
}

/// Builder for creating [`EnumDef`] instances.
pub struct EnumBuilder {
    name: String,
    members: Vec<(String, Value)>,
    module: Option<Arc<Module>>,
}

impl EnumBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            module: None,
        }
    }

    /// Add a member.
    pub fn member(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.push((name.into(), value.into()));
        self
    }

    pub fn module(mut self, module: &Arc<Module>) -> Self {
        self.module = Some(Arc::clone(module));
        self
    }

    pub fn build(self) -> Arc<EnumDef> {
        let def = Arc::new(EnumDef::new(self.name, self.members));
        if let Some(module) = &self.module {
            module.define(def.name(), TypeDesc::Enum(Arc::clone(&def)));
        }
        def
    }
}
