// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compiled schemas and the base schemas they derive from.

mod base;
pub(crate) mod hook;
mod options;

pub use base::{BaseSchema, BaseSchemaBuilder};
pub use hook::{
    Hook, HookKind, PostDumpFn, PostLoadFn, PreDumpFn, PreLoadFn, ValidatesSchemaFn,
};
pub use options::{SchemaOptions, Unknown};

use crate::compiler::CompileWarning;
use crate::config::SCHEMA_ERROR_KEY;
use crate::fields::error::{messages, ErrorCollector};
use crate::fields::{
    DumpError, ErrorMessages, Field, LoadContext, LoadError, ValidationError,
};
use crate::types::{RecordDef, TypeDesc};
use crate::value::{Value, ValueMap};
use serde_json::{Map, Value as Json};
use std::fmt;
use std::sync::Arc;

/// A compiled load/dump schema for one record type.
///
/// Built by [`crate::class_schema`]; shared through the schema cache, so
/// two compilations of the same type against the same base yield the same
/// `Arc<Schema>`.
pub struct Schema {
    name: String,
    ty: TypeDesc,
    record: Arc<RecordDef>,
    base: Arc<BaseSchema>,
    fields: Vec<(String, Field)>,
    hooks: Vec<Hook>,
    options: SchemaOptions,
    warnings: Vec<CompileWarning>,
}

impl Schema {
    /// Excluded fields are dropped; load-only and dump-only names are
    /// folded into the field options.
    pub(crate) fn new(
        ty: TypeDesc,
        record: Arc<RecordDef>,
        base: Arc<BaseSchema>,
        fields: Vec<(String, Field)>,
        hooks: Vec<Hook>,
        options: SchemaOptions,
        warnings: Vec<CompileWarning>,
    ) -> Self {
        let fields = fields
            .into_iter()
            .filter(|(name, _)| !options.exclude.contains(name))
            .map(|(name, mut field)| {
                let opts = field.options_mut();
                opts.load_only |= options.load_only.contains(&name);
                opts.dump_only |= options.dump_only.contains(&name);
                (name, field)
            })
            .collect();
        Self {
            name: record.name().to_string(),
            ty,
            record,
            base,
            fields,
            hooks,
            options,
            warnings,
        }
    }

    /// Name of the record the schema was compiled from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The compiled type: a record or a parametrized generic record.
    pub fn ty(&self) -> &TypeDesc {
        &self.ty
    }

    pub fn record(&self) -> &Arc<RecordDef> {
        &self.record
    }

    pub fn base_schema(&self) -> &Arc<BaseSchema> {
        &self.base
    }

    /// Fields in declaration order, keyed by attribute name.
    pub fn fields(&self) -> &[(String, Field)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn hooks(&self) -> &[Hook] {
        &self.hooks
    }

    pub fn hook(&self, name: &str) -> Option<&Hook> {
        self.hooks.iter().find(|h| h.name() == name)
    }

    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Best-effort fallbacks taken while compiling this schema.
    pub fn warnings(&self) -> &[CompileWarning] {
        &self.warnings
    }

    /// Load one record from JSON.
    pub fn load(&self, data: &Json) -> Result<Value, LoadError> {
        self.load_nested(data, LoadContext::LOAD)
    }

    /// Load a JSON array of records. Failures are keyed by index.
    pub fn load_many(&self, data: &Json) -> Result<Vec<Value>, LoadError> {
        let Some(items) = data.as_array() else {
            return Err(schema_error(messages::INVALID_INPUT).into());
        };
        let mut errors = ErrorCollector::default();
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match self.load(item) {
                Ok(value) => out.push(value),
                Err(LoadError::Validation(e)) => errors.add(i.to_string(), e),
                Err(other) => return Err(other),
            }
        }
        errors.into_result()?;
        Ok(out)
    }

    /// Load without constructing records. With `partial`, missing fields
    /// are not errors, here and in every nested schema.
    pub fn load_to_dict(&self, data: &Json, partial: bool) -> Result<ValueMap, LoadError> {
        self.load_fields(data, LoadContext::to_dict(partial))
    }

    /// Parse JSON text, then [`Schema::load`].
    pub fn loads(&self, text: &str) -> Result<Value, LoadError> {
        let data: Json = serde_json::from_str(text)?;
        self.load(&data)
    }

    pub(crate) fn load_nested(&self, data: &Json, ctx: LoadContext) -> Result<Value, LoadError> {
        let attrs = self.load_fields(data, ctx)?;
        if !ctx.construct {
            return Ok(Value::Map(
                attrs
                    .into_iter()
                    .map(|(k, v)| (Value::Str(k), v))
                    .collect(),
            ));
        }
        Ok(Value::Record(self.record.instantiate(attrs)?))
    }

    fn load_fields(&self, data: &Json, ctx: LoadContext) -> Result<ValueMap, LoadError> {
        let mut data = data.clone();
        for hook in &self.hooks {
            if let HookKind::PreLoad(f) = hook.kind() {
                data = f(data).map_err(wrap_schema_error)?;
            }
        }
        let Some(object) = data.as_object() else {
            return Err(schema_error(messages::INVALID_INPUT).into());
        };

        let mut errors = ErrorCollector::default();
        let mut attrs = ValueMap::new();
        let mut consumed: Vec<&str> = Vec::with_capacity(self.fields.len());
        for (name, field) in &self.fields {
            if field.options().dump_only {
                continue;
            }
            let key = field.data_key(name);
            consumed.push(key);
            match object.get(key) {
                Some(raw) => match field.deserialize_in(raw, ctx) {
                    Ok(value) => {
                        attrs.insert(name.clone(), value);
                    }
                    Err(LoadError::Validation(e)) => errors.add(key, e),
                    Err(other) => return Err(other),
                },
                None if ctx.partial => {}
                None => match &field.options().load_default {
                    Some(default) => {
                        attrs.insert(name.clone(), default.resolve());
                    }
                    None if field.is_required() => {
                        errors.add(key, ValidationError::new(messages::REQUIRED));
                    }
                    None => {}
                },
            }
        }

        for (key, raw) in object {
            if consumed.contains(&key.as_str()) {
                continue;
            }
            match self.options.unknown {
                Unknown::Raise => {
                    errors.add(key.clone(), ValidationError::new(messages::UNKNOWN));
                }
                Unknown::Include => {
                    attrs.insert(key.clone(), Value::from_json(raw));
                }
                Unknown::Exclude => {}
            }
        }

        if errors.is_empty() {
            for hook in &self.hooks {
                if let HookKind::ValidatesSchema(f) = hook.kind() {
                    if let Err(e) = f(&attrs) {
                        errors.add_schema_error(e);
                    }
                }
            }
        }
        errors.into_result()?;

        for hook in &self.hooks {
            if let HookKind::PostLoad(f) = hook.kind() {
                attrs = f(attrs).map_err(wrap_schema_error)?;
            }
        }
        Ok(attrs)
    }

    /// Dump one record (or string-keyed map) to a JSON object.
    pub fn dump(&self, value: &Value) -> Result<Json, DumpError> {
        self.dump_nested(value)
    }

    pub fn dump_many(&self, values: &[Value]) -> Result<Json, DumpError> {
        let mut out = Vec::with_capacity(values.len());
        for (i, value) in values.iter().enumerate() {
            out.push(
                self.dump(value)
                    .map_err(|e| DumpError::in_field(i.to_string(), e))?,
            );
        }
        Ok(Json::Array(out))
    }

    /// [`Schema::dump`] rendered as JSON text.
    pub fn dumps(&self, value: &Value) -> Result<String, DumpError> {
        self.dump(value).map(|json| json.to_string())
    }

    pub(crate) fn dump_nested(&self, value: &Value) -> Result<Json, DumpError> {
        let mut value = value.clone();
        for hook in &self.hooks {
            if let HookKind::PreDump(f) = hook.kind() {
                value = f(value)?;
            }
        }

        let attrs: Vec<(String, Value)> = match value {
            Value::Record(record) => record
                .into_fields()
                .into_iter()
                .collect(),
            Value::Map(entries) => entries
                .into_iter()
                .filter_map(|(k, v)| match k {
                    Value::Str(k) => Some((k, v)),
                    _ => None,
                })
                .collect(),
            other => return Err(DumpError::mismatch(self.name.as_str(), &other)),
        };

        let mut out = Map::with_capacity(self.fields.len());
        for (name, field) in &self.fields {
            if field.options().load_only {
                continue;
            }
            let attr = attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v);
            let dumped = match (attr, &field.options().dump_default) {
                (Some(v), _) => field.serialize(v),
                (None, Some(default)) => field.serialize(&default.resolve()),
                (None, None) => continue,
            };
            let dumped = dumped.map_err(|e| DumpError::in_field(name.as_str(), e))?;
            out.insert(field.data_key(name).to_string(), dumped);
        }

        for hook in &self.hooks {
            if let HookKind::PostDump(f) = hook.kind() {
                out = f(out)?;
            }
        }
        Ok(Json::Object(out))
    }
}

fn schema_error(message: &str) -> ValidationError {
    ValidationError::keyed(SCHEMA_ERROR_KEY, ValidationError::new(message))
}

/// Hook failures surface like record-level validation errors.
fn wrap_schema_error(error: ValidationError) -> LoadError {
    match error.messages() {
        ErrorMessages::Keyed(_) => error.into(),
        _ => ValidationError::keyed(SCHEMA_ERROR_KEY, error).into(),
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("base", &self.base.name())
            .field("fields", &self.fields)
            .finish()
    }
}
