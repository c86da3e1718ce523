// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field primitives: the runtime (de)serializer nodes a compiled schema is
//! made of.
//!
//! A [`Field`] pairs a [`FieldKind`] (what shape of data it handles) with
//! [`FieldOptions`] (nullability, defaults, validators, data key). Field
//! kinds nest: collections hold an item field, unions hold one field per
//! member type, nested fields point at another schema.
//!
//! Fields are built through a [`FieldClass`], the unit a base schema's
//! type table maps types to.

mod class;
mod collection;
pub mod error;
mod metadata;
mod nested;
mod scalar;
mod union;
mod validate;

pub use class::{FieldBuilder, FieldClass, FieldCodec};
pub use error::{DumpError, ErrorMessages, LoadError, ValidationError};
pub use metadata::{FieldMetadata, FieldOptions};
pub use nested::SchemaRef;
pub use scalar::Scalar;
pub use validate::{PredicateFn, Validator};

use crate::types::{EnumDef, TypeDesc};
use crate::value::Value;
use error::messages;
use serde_json::Value as Json;
use std::fmt;
use std::sync::Arc;

/// How a load walks nested data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LoadContext {
    /// Missing required fields are not errors.
    pub(crate) partial: bool,
    /// Nested records are constructed; otherwise they stay maps.
    pub(crate) construct: bool,
}

impl LoadContext {
    pub(crate) const LOAD: Self = Self {
        partial: false,
        construct: true,
    };

    pub(crate) fn to_dict(partial: bool) -> Self {
        Self {
            partial,
            construct: false,
        }
    }
}

/// What a field (de)serializes.
#[derive(Clone)]
pub enum FieldKind {
    Scalar(Scalar),
    List(Box<Field>),
    /// Homogeneous sequence, loaded as a tuple.
    Sequence(Box<Field>),
    Set(Box<Field>),
    FrozenSet(Box<Field>),
    /// Fixed-length heterogeneous tuple.
    Tuple(Vec<Field>),
    Dict {
        keys: Box<Field>,
        values: Box<Field>,
    },
    Enum {
        def: Arc<EnumDef>,
        by_value: bool,
    },
    Nested(SchemaRef),
    /// Candidate member types, tried in order.
    Union(Vec<(TypeDesc, Field)>),
    Custom(Arc<dyn FieldCodec>),
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{}", s.name()),
            Self::List(item) => write!(f, "List({item:?})"),
            Self::Sequence(item) => write!(f, "Sequence({item:?})"),
            Self::Set(item) => write!(f, "Set({item:?})"),
            Self::FrozenSet(item) => write!(f, "FrozenSet({item:?})"),
            Self::Tuple(items) => f.debug_tuple("Tuple").field(items).finish(),
            Self::Dict { keys, values } => write!(f, "Dict({keys:?}, {values:?})"),
            Self::Enum { def, by_value } => write!(f, "Enum({}, by_value={by_value})", def.name()),
            Self::Nested(schema) => write!(f, "Nested({schema:?})"),
            Self::Union(members) => {
                write!(f, "Union(")?;
                for (i, (ty, field)) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "({ty}, {field:?})")?;
                }
                f.write_str(")")
            }
            Self::Custom(codec) => write!(f, "Custom({})", codec.name()),
        }
    }
}

/// A runtime field node.
#[derive(Clone)]
pub struct Field {
    class: Arc<str>,
    kind: FieldKind,
    opts: FieldOptions,
}

impl Field {
    pub fn new(class: impl Into<Arc<str>>, kind: FieldKind, opts: FieldOptions) -> Self {
        Self {
            class: class.into(),
            kind,
            opts,
        }
    }

    /// Name of the field class that built this node.
    pub fn class_name(&self) -> &str {
        &self.class
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn options(&self) -> &FieldOptions {
        &self.opts
    }

    pub(crate) fn options_mut(&mut self) -> &mut FieldOptions {
        &mut self.opts
    }

    pub fn is_required(&self) -> bool {
        self.opts.required
    }

    pub fn allows_none(&self) -> bool {
        self.opts.allow_none
    }

    /// Key used in serialized data for the attribute `name`.
    pub fn data_key<'a>(&'a self, name: &'a str) -> &'a str {
        self.opts.data_key.as_deref().unwrap_or(name)
    }

    /// Member fields of a union node.
    pub fn union_members(&self) -> Option<&[(TypeDesc, Field)]> {
        match &self.kind {
            FieldKind::Union(members) => Some(members),
            _ => None,
        }
    }

    /// Item field of a homogeneous collection.
    pub fn inner(&self) -> Option<&Field> {
        match &self.kind {
            FieldKind::List(item)
            | FieldKind::Sequence(item)
            | FieldKind::Set(item)
            | FieldKind::FrozenSet(item) => Some(item),
            _ => None,
        }
    }

    /// Load one value, constructing nested records.
    pub fn deserialize(&self, json: &Json) -> Result<Value, LoadError> {
        self.deserialize_in(json, LoadContext::LOAD)
    }

    pub(crate) fn deserialize_in(&self, json: &Json, ctx: LoadContext) -> Result<Value, LoadError> {
        if json.is_null() {
            return if self.opts.allow_none {
                Ok(Value::Null)
            } else {
                Err(ValidationError::new(messages::NULL).into())
            };
        }
        let value = match &self.kind {
            FieldKind::Scalar(scalar) => scalar.load(json, self.opts.strict)?,
            FieldKind::List(item) => collection::load_list(item, json, ctx)?,
            FieldKind::Sequence(item) => Value::Tuple(collection::load_items(item, json, ctx)?),
            FieldKind::Set(item) => Value::set_of(collection::load_items(item, json, ctx)?),
            FieldKind::FrozenSet(item) => {
                Value::frozenset_of(collection::load_items(item, json, ctx)?)
            }
            FieldKind::Tuple(items) => collection::load_tuple(items, json, ctx)?,
            FieldKind::Dict { keys, values } => collection::load_dict(keys, values, json, ctx)?,
            FieldKind::Enum { def, by_value } => load_enum(def, *by_value, json)?,
            FieldKind::Nested(schema) => schema.get()?.load_nested(json, ctx)?,
            FieldKind::Union(members) => union::deserialize(members, json, ctx)?,
            FieldKind::Custom(codec) => codec.deserialize(json)?,
        };
        self.validate(&value)?;
        Ok(value)
    }

    /// Load a mapping key: the JSON key text as a string first, then as
    /// JSON (`"12"` becomes `12` for an integer key field).
    pub(crate) fn deserialize_key(&self, key: &str, ctx: LoadContext) -> Result<Value, LoadError> {
        let as_text = Json::String(key.to_string());
        match self.deserialize_in(&as_text, ctx) {
            Ok(value) => Ok(value),
            Err(LoadError::Validation(first)) => match serde_json::from_str::<Json>(key) {
                Ok(parsed) if !parsed.is_string() => self
                    .deserialize_in(&parsed, ctx)
                    .map_err(|_| LoadError::Validation(first)),
                _ => Err(LoadError::Validation(first)),
            },
            Err(other) => Err(other),
        }
    }

    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let failures: Vec<String> = self
            .opts
            .validators
            .iter()
            .filter_map(|v| v.check(value).err())
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::from_messages(ErrorMessages::List(failures)))
        }
    }

    /// Dump one value.
    pub fn serialize(&self, value: &Value) -> Result<Json, DumpError> {
        if value.is_null() {
            return Ok(Json::Null);
        }
        match &self.kind {
            FieldKind::Scalar(scalar) => scalar.dump(value),
            FieldKind::List(item)
            | FieldKind::Sequence(item)
            | FieldKind::Set(item)
            | FieldKind::FrozenSet(item) => collection::dump_items(item, value),
            FieldKind::Tuple(items) => collection::dump_tuple(items, value),
            FieldKind::Dict { keys, values } => collection::dump_dict(keys, values, value),
            FieldKind::Enum { def, by_value } => dump_enum(def, *by_value, value),
            FieldKind::Nested(schema) => schema.get()?.dump_nested(value),
            FieldKind::Union(members) => union::serialize(members, value),
            FieldKind::Custom(codec) => codec.serialize(value),
        }
    }

    /// Serialize a mapping key into JSON object key text.
    pub(crate) fn serialize_key(&self, key: &Value) -> Result<String, DumpError> {
        Ok(match self.serialize(key)? {
            Json::String(s) => s,
            other => other.to_string(),
        })
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(kind={:?}, required={}, allow_none={}",
            self.class, self.kind, self.opts.required, self.opts.allow_none
        )?;
        if let Some(default) = &self.opts.load_default {
            write!(f, ", load_default={default:?}")?;
        }
        if let Some(default) = &self.opts.dump_default {
            write!(f, ", dump_default={default:?}")?;
        }
        if !self.opts.validators.is_empty() {
            write!(f, ", validate={:?}", self.opts.validators)?;
        }
        f.write_str(")")
    }
}

fn load_enum(def: &Arc<EnumDef>, by_value: bool, json: &Json) -> Result<Value, ValidationError> {
    let member = if by_value {
        def.by_value(&Value::from_json(json))
    } else {
        json.as_str().and_then(|name| def.member(name))
    };
    match member {
        Some(m) => Ok(Value::Enum(m)),
        None if by_value => Err(ValidationError::new(format!(
            "Must be one of: {}.",
            def.values()
        ))),
        None => Err(ValidationError::new(format!(
            "Must be one of: {}.",
            def.names()
        ))),
    }
}

fn dump_enum(def: &Arc<EnumDef>, by_value: bool, value: &Value) -> Result<Json, DumpError> {
    match value.as_enum() {
        Some(m) if m.belongs_to(def) => Ok(if by_value {
            m.value().to_json()
        } else {
            Json::String(m.name().to_string())
        }),
        _ => Err(DumpError::mismatch(def.name(), value)),
    }
}
