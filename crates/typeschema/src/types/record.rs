// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record definitions: named aggregates of typed, ordered fields.

use crate::compiler::{self, SchemaError};
use crate::fields::FieldMetadata;
use crate::lazy::LazyAttribute;
use crate::schema::{BaseSchema, Hook, Schema, SchemaOptions};
use crate::types::{Module, TypeDesc, TypeVar};
use crate::value::{Record, Value, ValueMap};
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};
use thiserror::Error;

/// How instances of a record are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// Generated keyword constructor that fills defaults.
    Dataclass,
    /// Plain class with annotated attributes: a blank instance receives
    /// the loaded values one attribute at a time.
    Annotated,
}

/// Failure while constructing a record from loaded values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructError {
    #[error("{record}() missing required arguments: {}", .names.join(", "))]
    MissingArguments { record: String, names: Vec<String> },
    #[error("{record}() got an unexpected keyword argument '{name}'")]
    UnexpectedArgument { record: String, name: String },
    #[error("{record}(): {reason}")]
    Rejected { record: String, reason: String },
}

impl ConstructError {
    /// Error raised by a custom constructor.
    pub fn rejected(record: &str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            record: record.to_string(),
            reason: reason.into(),
        }
    }
}

/// Custom constructor: receives the keyword arguments, returns the
/// attribute values of the new instance.
pub type Constructor = Arc<dyn Fn(ValueMap) -> Result<ValueMap, ConstructError> + Send + Sync>;

/// A zero-argument callable producing a fresh default.
#[derive(Clone)]
pub struct DefaultFactory(Arc<dyn Fn() -> Value + Send + Sync>);

impl DefaultFactory {
    pub fn new(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self) -> Value {
        (self.0)()
    }
}

/// A field default: a static value or a factory called on each use.
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    Factory(DefaultFactory),
}

impl DefaultValue {
    pub fn value(v: impl Into<Value>) -> Self {
        Self::Value(v.into())
    }

    pub fn factory(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self::Factory(DefaultFactory::new(f))
    }

    /// Produce the default (calls the factory).
    pub fn resolve(&self) -> Value {
        match self {
            Self::Value(v) => v.clone(),
            Self::Factory(f) => f.call(),
        }
    }

    pub fn is_factory(&self) -> bool {
        matches!(self, Self::Factory(_))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Factory(_) => None,
        }
    }
}

impl PartialEq for DefaultValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Factory(a), Self::Factory(b)) => Arc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{}", v.repr()),
            Self::Factory(_) => f.write_str("<factory>"),
        }
    }
}

/// One declared field.
#[derive(Clone, Debug)]
pub struct FieldDef {
    name: String,
    ty: TypeDesc,
    default: Option<DefaultValue>,
    metadata: FieldMetadata,
    init: bool,
    class_var: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeDesc>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            default: None,
            metadata: FieldMetadata::default(),
            init: true,
            class_var: false,
        }
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    #[must_use]
    pub fn with_factory(mut self, f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default = Some(DefaultValue::factory(f));
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: FieldMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Exclude from the constructor (and therefore from the schema).
    #[must_use]
    pub fn no_init(mut self) -> Self {
        self.init = false;
        self
    }

    /// Class-level constant, never a field.
    #[must_use]
    pub fn class_var(mut self) -> Self {
        self.class_var = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeDesc {
        &self.ty
    }

    pub fn default(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    pub fn metadata(&self) -> &FieldMetadata {
        &self.metadata
    }

    pub fn is_init(&self) -> bool {
        self.init
    }

    pub fn is_class_var(&self) -> bool {
        self.class_var
    }

    pub(crate) fn with_type(&self, ty: TypeDesc) -> Self {
        Self {
            ty,
            ..self.clone()
        }
    }
}

/// The lazily computed `Schema` attribute of a decorated record.
pub(crate) struct SchemaAttribute {
    pub(crate) base: Option<Arc<BaseSchema>>,
    pub(crate) lazy: LazyAttribute<Arc<Schema>>,
}

/// A record type.
pub struct RecordDef {
    pub(crate) name: String,
    pub(crate) shape: RecordShape,
    pub(crate) type_params: Vec<TypeVar>,
    pub(crate) bases: Vec<TypeDesc>,
    pub(crate) fields: Vec<FieldDef>,
    pub(crate) hooks: Vec<Hook>,
    pub(crate) options: Option<SchemaOptions>,
    pub(crate) module: Weak<Module>,
    pub(crate) constructor: Option<Constructor>,
    pub(crate) ancestors: OnceLock<Vec<Arc<RecordDef>>>,
    pub(crate) schema_attr: OnceLock<SchemaAttribute>,
}

impl RecordDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> RecordShape {
        self.shape
    }

    /// Fields declared on this record, excluding inherited ones.
    pub fn own_fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn bases(&self) -> &[TypeDesc] {
        &self.bases
    }

    pub fn hooks(&self) -> &[Hook] {
        &self.hooks
    }

    pub fn options(&self) -> Option<&SchemaOptions> {
        self.options.as_ref()
    }

    pub fn module(&self) -> Option<Arc<Module>> {
        self.module.upgrade()
    }

    /// Declared type parameters, or when none are declared, the free type
    /// variables of the parametrized bases in order of first appearance.
    pub fn parameters(&self) -> Vec<TypeVar> {
        if !self.type_params.is_empty() {
            return self.type_params.clone();
        }
        let mut out: Vec<TypeVar> = Vec::new();
        for base in &self.bases {
            for tv in base.free_typevars() {
                if !out.contains(&tv) {
                    out.push(tv);
                }
            }
        }
        out
    }

    pub fn is_generic(&self) -> bool {
        !self.parameters().is_empty()
    }

    /// Linearized precedence list of the bases (the record itself excluded).
    /// Depth-first, left to right; a class reached twice keeps its last slot.
    pub fn strict_ancestors(&self) -> &[Arc<RecordDef>] {
        self.ancestors.get_or_init(|| {
            let mut seq: Vec<Arc<RecordDef>> = Vec::new();
            for base in &self.bases {
                if let Some(def) = base.record_origin() {
                    seq.push(Arc::clone(def));
                    seq.extend(def.strict_ancestors().iter().cloned());
                }
            }
            let mut out = Vec::with_capacity(seq.len());
            for (i, def) in seq.iter().enumerate() {
                if !seq[i + 1..].iter().any(|later| Arc::ptr_eq(later, def)) {
                    out.push(Arc::clone(def));
                }
            }
            out
        })
    }

    /// The record followed by its linearized bases.
    pub fn ancestors(self: &Arc<Self>) -> Vec<Arc<RecordDef>> {
        let mut out = vec![Arc::clone(self)];
        out.extend(self.strict_ancestors().iter().cloned());
        out
    }

    /// All fields, base-most first. A redeclared field keeps the position
    /// of its first declaration and takes the most derived definition.
    pub fn all_fields(self: &Arc<Self>) -> Vec<FieldDef> {
        let mut out: Vec<FieldDef> = Vec::new();
        for ancestor in self.ancestors().iter().rev() {
            for field in &ancestor.fields {
                match out.iter_mut().find(|f| f.name == field.name) {
                    Some(slot) => *slot = field.clone(),
                    None => out.push(field.clone()),
                }
            }
        }
        out.retain(|f| !f.class_var);
        out
    }

    /// Build an instance from keyword arguments.
    pub fn instantiate(self: &Arc<Self>, kwargs: ValueMap) -> Result<Record, ConstructError> {
        if self.shape == RecordShape::Annotated {
            let mut record = Record::new(Arc::clone(self), ValueMap::new());
            for (name, value) in kwargs {
                record.set(name, value);
            }
            return Ok(record);
        }

        if let Some(ctor) = &self.constructor {
            return Ok(Record::new(Arc::clone(self), ctor(kwargs)?));
        }

        let mut kwargs = kwargs;
        let mut values = ValueMap::new();
        let mut missing = Vec::new();
        for field in self.all_fields() {
            if field.init {
                if let Some(v) = kwargs.remove(&field.name) {
                    values.insert(field.name, v);
                    continue;
                }
            }
            match &field.default {
                Some(default) => {
                    values.insert(field.name.clone(), default.resolve());
                }
                None if field.init => missing.push(field.name.clone()),
                None => {}
            }
        }

        if !missing.is_empty() {
            return Err(ConstructError::MissingArguments {
                record: self.name.clone(),
                names: missing,
            });
        }
        if let Some(unexpected) = kwargs.keys().next() {
            return Err(ConstructError::UnexpectedArgument {
                record: self.name.clone(),
                name: unexpected.to_string(),
            });
        }
        Ok(Record::new(Arc::clone(self), values))
    }

    /// Build an instance, panicking on failure. Test convenience.
    #[cfg(test)]
    pub(crate) fn make(self: &Arc<Self>, kwargs: Vec<(&str, Value)>) -> Record {
        self.instantiate(kwargs.into_iter().collect())
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// The record's schema. Decorated records compute it once and keep it;
    /// plain records go through the compiler's cache on every call.
    pub fn schema(self: &Arc<Self>) -> Result<Arc<Schema>, SchemaError> {
        match self.schema_attr.get() {
            Some(attr) => attr
                .lazy
                .get_or_try_init(|| compiler::class_schema(self, attr.base.as_ref()))
                .map(Arc::clone),
            None => compiler::class_schema(self, None),
        }
    }

    /// True once a lazy `Schema` attribute has been attached.
    pub fn has_schema_attribute(&self) -> bool {
        self.schema_attr.get().is_some()
    }

    pub(crate) fn install_schema_attribute(&self, base: Option<Arc<BaseSchema>>) -> bool {
        let attr = SchemaAttribute {
            base,
            lazy: LazyAttribute::new(&self.name, crate::config::SCHEMA_ATTRIBUTE),
        };
        self.schema_attr.set(attr).is_ok()
    }

    /// The attribute's value if it was already computed against `base`.
    pub(crate) fn computed_schema(&self, base: &Arc<BaseSchema>) -> Option<Arc<Schema>> {
        let attr = self.schema_attr.get()?;
        let attr_base = BaseSchema::resolve(attr.base.as_ref());
        if !Arc::ptr_eq(&attr_base, base) {
            return None;
        }
        attr.lazy.get().cloned()
    }
}

impl fmt::Debug for RecordDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<record {}>", self.name)
    }
}
