// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record type → compiled schema.

use super::field::FieldCompiler;
use super::resolver::{resolve_typevars, resolved_fields, TypeVarBindings};
use super::{CompileWarning, Future, SchemaCache, SchemaError, SchemaKey};
use crate::fields::Field;
use crate::schema::{hook, BaseSchema, Hook, Schema, SchemaOptions};
use crate::types::{FieldDef, RecordDef, RecordShape, TypeDesc};
use std::sync::Arc;

impl FieldCompiler {
    /// Compile `ty` (a record or a parametrized generic record) against
    /// the active base, reusing cached and already computed schemas.
    pub fn schema(&mut self, ty: &TypeDesc) -> Result<Arc<Schema>, SchemaError> {
        let record = match ty {
            TypeDesc::Record(def) | TypeDesc::Generic { origin: def, .. } => Arc::clone(def),
            TypeDesc::Opaque(name) => {
                return Err(SchemaError::invalid_class(name, "It has no fields."));
            }
            other => {
                return Err(SchemaError::invalid_class(
                    &other.to_string(),
                    "It is not a record type.",
                ));
            }
        };

        if let TypeDesc::Record(def) = ty {
            if let Some(schema) = def.computed_schema(&self.base) {
                return Ok(schema);
            }
        }

        let key = SchemaKey::new(ty, &self.base);
        if let Some(schema) = SchemaCache::global().get(&key) {
            return Ok(schema);
        }
        if let Some(schema) = self.seen.get(&key).and_then(|f| f.result().ok()) {
            return Ok(Arc::clone(schema));
        }

        let future = Arc::new(Future::new());
        self.seen.insert(key.clone(), Arc::clone(&future));
        log::debug!("[compiler] compiling {ty} against {}", self.base.name());

        let outer_warnings = std::mem::take(&mut self.warnings);
        let built = self.build(ty, &record);
        let warnings = std::mem::replace(&mut self.warnings, outer_warnings);

        let schema = Arc::new(built?.finish(warnings));
        future.set_result(Arc::clone(&schema))?;
        self.completed.push((key, Arc::clone(&schema)));
        Ok(schema)
    }

    fn build(&mut self, ty: &TypeDesc, record: &Arc<RecordDef>) -> Result<Parts, SchemaError> {
        let bindings = self.bindings_for(ty)?;
        let declared = resolved_fields(record, &bindings, &self.locals)?;
        if record.shape() == RecordShape::Annotated {
            check_annotated(record, &declared)?;
            CompileWarning::CoercedAnnotatedClass {
                record: record.name().to_string(),
            }
            .emit(&mut self.warnings);
        }

        let outer = self.ambient.replace(bindings);
        self.scope.push(Arc::clone(record));
        let fields = self.compile_fields(&declared);
        self.scope.pop();
        self.ambient = outer;

        let ancestors = record.ancestors();
        let mut hooks = self.base.hooks_chain();
        for ancestor in ancestors.iter().rev() {
            hook::overlay(&mut hooks, ancestor.hooks());
        }
        let options = ancestors
            .iter()
            .find_map(|a| a.options())
            .or_else(|| self.base.options())
            .cloned()
            .unwrap_or_default();

        Ok(Parts {
            ty: ty.clone(),
            record: Arc::clone(record),
            base: Arc::clone(&self.base),
            fields: fields?,
            hooks,
            options,
        })
    }

    fn compile_fields(
        &mut self,
        declared: &[FieldDef],
    ) -> Result<Vec<(String, Field)>, SchemaError> {
        let mut fields = Vec::with_capacity(declared.len());
        for def in declared.iter().filter(|f| f.is_init()) {
            let field = self.compile(def.ty(), def.default(), def.metadata().clone())?;
            fields.push((def.name().to_string(), field));
        }
        Ok(fields)
    }

    /// Bindings are computed once per type and compilation.
    fn bindings_for(&mut self, ty: &TypeDesc) -> Result<Arc<TypeVarBindings>, SchemaError> {
        if let Some(bindings) = self.bindings.get(ty) {
            return Ok(Arc::clone(bindings));
        }
        let bindings = Arc::new(resolve_typevars(ty, &self.locals)?);
        self.bindings.insert(ty.clone(), Arc::clone(&bindings));
        Ok(bindings)
    }
}

/// A plain annotated class is coerced only if the result would be a valid
/// dataclass.
fn check_annotated(record: &RecordDef, fields: &[FieldDef]) -> Result<(), SchemaError> {
    if fields.is_empty() {
        return Err(SchemaError::invalid_class(record.name(), "It has no fields."));
    }
    let mut seen_default = false;
    for field in fields.iter().filter(|f| f.is_init()) {
        match field.default() {
            Some(_) => seen_default = true,
            None if seen_default => {
                return Err(SchemaError::invalid_class(
                    record.name(),
                    format!("non-default argument '{}' follows default argument", field.name()),
                ));
            }
            None => {}
        }
    }
    Ok(())
}

struct Parts {
    ty: TypeDesc,
    record: Arc<RecordDef>,
    base: Arc<BaseSchema>,
    fields: Vec<(String, Field)>,
    hooks: Vec<Hook>,
    options: SchemaOptions,
}

impl Parts {
    fn finish(self, warnings: Vec<CompileWarning>) -> Schema {
        Schema::new(
            self.ty,
            self.record,
            self.base,
            self.fields,
            self.hooks,
            self.options,
            warnings,
        )
    }
}
