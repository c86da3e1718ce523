// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptor → runtime field.
//!
//! [`FieldCompiler`] holds the state of one compilation: the active base
//! schema, caller locals, the in-progress schema placeholders, the schemas
//! finished so far, and the type-variable bindings of the record whose
//! fields are being compiled. Nested records recurse through the same
//! compiler, so a cycle finds its placeholder instead of recursing.

use super::resolver::{lookup_name, TypeVarBindings};
use super::{CompileWarning, Future, SchemaCache, SchemaError, SchemaKey};
use crate::fields::{Field, FieldClass, FieldKind, FieldMetadata, FieldOptions, SchemaRef, Validator};
use crate::schema::{BaseSchema, Schema};
use crate::types::{builtin, ContainerKind, DefaultValue, Namespace, RecordDef, TypeDesc, TypeKey};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub struct FieldCompiler {
    pub(super) base: Arc<BaseSchema>,
    pub(super) locals: Namespace,
    /// Placeholders published before a record's fields are compiled.
    pub(super) seen: HashMap<SchemaKey, Arc<Future<Arc<Schema>>>>,
    /// Schemas built by this compilation, cached once it succeeds.
    pub(super) completed: Vec<(SchemaKey, Arc<Schema>)>,
    pub(super) bindings: HashMap<TypeDesc, Arc<TypeVarBindings>>,
    /// Bindings of the record currently being compiled.
    pub(super) ambient: Option<Arc<TypeVarBindings>>,
    /// Records currently being compiled, innermost last.
    pub(super) scope: Vec<Arc<RecordDef>>,
    pub(super) warnings: Vec<CompileWarning>,
}

impl FieldCompiler {
    /// `None` selects the default base schema.
    pub fn new(base: Option<&Arc<BaseSchema>>) -> Self {
        Self {
            base: BaseSchema::resolve(base),
            locals: Namespace::new(),
            seen: HashMap::new(),
            completed: Vec::new(),
            bindings: HashMap::new(),
            ambient: None,
            scope: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Names visible to forward references in addition to module globals.
    #[must_use]
    pub fn with_locals(mut self, locals: Namespace) -> Self {
        self.locals = locals;
        self
    }

    pub fn base_schema(&self) -> &Arc<BaseSchema> {
        &self.base
    }

    /// Warnings raised while compiling top-level fields. Warnings raised
    /// inside a nested record stay with that record's schema.
    pub fn warnings(&self) -> &[CompileWarning] {
        &self.warnings
    }

    /// Compile one field.
    pub fn compile(
        &mut self,
        ty: &TypeDesc,
        default: Option<&DefaultValue>,
        metadata: FieldMetadata,
    ) -> Result<Field, SchemaError> {
        let mut metadata = metadata;
        if let Some(field) = metadata.field.take() {
            return Ok(field);
        }

        match default {
            Some(default) => {
                metadata
                    .dump_default
                    .get_or_insert_with(|| default.clone());
                if metadata.required != Some(true) {
                    metadata
                        .load_default
                        .get_or_insert_with(|| default.clone());
                }
            }
            None => {
                metadata.required.get_or_insert(!ty.is_optional());
            }
        }

        self.dispatch(ty, default, metadata)
    }

    fn dispatch(
        &mut self,
        ty: &TypeDesc,
        default: Option<&DefaultValue>,
        mut metadata: FieldMetadata,
    ) -> Result<Field, SchemaError> {
        if let TypeDesc::TypeVar(tv) = ty {
            let bound = self
                .ambient
                .as_ref()
                .and_then(|bindings| bindings.find(tv))
                .ok_or_else(|| SchemaError::UnboundTypeParameter {
                    name: tv.name().to_string(),
                })?;
            return self.dispatch(&bound, default, metadata);
        }

        if let TypeDesc::ForwardRef(name) = ty {
            let resolved = self.lookup_forward(name)?;
            return self.dispatch(&resolved, default, metadata);
        }

        if let TypeDesc::Container { kind, args } = ty {
            return self.container(ty, *kind, args, &metadata);
        }

        if let Some(key) = ty.type_key() {
            if let Some(class) = self.base.field_class(&key) {
                return class.instantiate(Vec::new(), FieldOptions::from_metadata(&metadata));
            }
        }

        match ty {
            TypeDesc::Any => {
                metadata.allow_none.get_or_insert(true);
                FieldClass::raw().instantiate(Vec::new(), FieldOptions::from_metadata(&metadata))
            }
            TypeDesc::Literal(values) => {
                let validator = match values.as_slice() {
                    [] => return Err(SchemaError::unrecognized(ty)),
                    [single] => Validator::equal(single.clone()),
                    many => Validator::one_of(many.to_vec()),
                };
                metadata.validators.insert(0, validator);
                FieldClass::raw().instantiate(Vec::new(), FieldOptions::from_metadata(&metadata))
            }
            TypeDesc::Final(Some(inner)) => self.dispatch(inner, default, metadata),
            TypeDesc::Final(None) => {
                let inferred = match default {
                    Some(DefaultValue::Value(value)) => {
                        let inferred = runtime_type(value);
                        CompileWarning::FinalInferredFromDefault {
                            inferred: inferred.clone(),
                        }
                        .emit(&mut self.warnings);
                        inferred
                    }
                    Some(DefaultValue::Factory(_)) => {
                        CompileWarning::FinalFromFactory.emit(&mut self.warnings);
                        TypeDesc::Any
                    }
                    None => {
                        CompileWarning::FinalWithoutType.emit(&mut self.warnings);
                        TypeDesc::Any
                    }
                };
                self.dispatch(&inferred, default, metadata)
            }
            TypeDesc::Union(members) => self.union(ty, members, default, metadata),
            TypeDesc::NewType(alias) => {
                let call_site = std::mem::take(&mut metadata.validators);
                metadata.merge_missing(alias.metadata());
                metadata.validators = alias.metadata().validators.clone();
                metadata.validators.extend(call_site);
                metadata
                    .description
                    .get_or_insert_with(|| alias.name().to_string());

                if let Some(field) = metadata.field.take() {
                    return Ok(field);
                }
                match alias.field_class() {
                    Some(class) => {
                        class.instantiate(Vec::new(), FieldOptions::from_metadata(&metadata))
                    }
                    None => self.dispatch(alias.supertype(), default, metadata),
                }
            }
            TypeDesc::Enum(def) => Ok(Field::new(
                "Enum",
                FieldKind::Enum {
                    def: Arc::clone(def),
                    by_value: metadata.by_value.unwrap_or(false),
                },
                FieldOptions::from_metadata(&metadata),
            )),
            TypeDesc::Record(_) | TypeDesc::Generic { .. } | TypeDesc::Opaque(_) => {
                let target = self.nested(ty)?;
                Ok(Field::new(
                    "Nested",
                    FieldKind::Nested(target),
                    FieldOptions::from_metadata(&metadata),
                ))
            }
            _ => Err(SchemaError::unrecognized(ty)),
        }
    }

    fn container(
        &mut self,
        ty: &TypeDesc,
        kind: ContainerKind,
        args: &[TypeDesc],
        metadata: &FieldMetadata,
    ) -> Result<Field, SchemaError> {
        let (key, arity) = match kind {
            ContainerKind::VarTuple => (ContainerKind::Sequence, 1),
            ContainerKind::Tuple if args.is_empty() => (ContainerKind::Sequence, 1),
            ContainerKind::Tuple => (ContainerKind::Tuple, args.len()),
            other => (other, other.arity().unwrap_or(0)),
        };
        if args.len() > arity {
            return Err(SchemaError::TypeArity {
                name: kind.name().to_string(),
                expected: arity,
                found: args.len(),
            });
        }
        let class = self
            .base
            .field_class(&TypeKey::Container(key))
            .ok_or_else(|| SchemaError::unrecognized(ty))?;

        let mut inner = Vec::with_capacity(arity);
        for i in 0..arity {
            let arg = args.get(i).unwrap_or(&TypeDesc::Any);
            inner.push(self.compile(arg, None, FieldMetadata::new())?);
        }
        class.instantiate(inner, FieldOptions::from_metadata(metadata))
    }

    fn union(
        &mut self,
        ty: &TypeDesc,
        members: &[TypeDesc],
        default: Option<&DefaultValue>,
        mut metadata: FieldMetadata,
    ) -> Result<Field, SchemaError> {
        let mut flat = Vec::with_capacity(members.len());
        flatten_union(members, &mut flat);
        let optional = flat.iter().any(|m| matches!(m, TypeDesc::None));
        flat.retain(|m| !matches!(m, TypeDesc::None));

        if optional {
            metadata.allow_none.get_or_insert(true);
            metadata
                .dump_default
                .get_or_insert_with(|| DefaultValue::Value(Value::Null));
            if metadata.required != Some(true) {
                metadata
                    .load_default
                    .get_or_insert_with(|| DefaultValue::Value(Value::Null));
            }
            metadata.required.get_or_insert(false);
        }

        match flat.as_slice() {
            [] => Err(SchemaError::unrecognized(ty)),
            [single] => self.dispatch(single, default, metadata),
            many => {
                let mut fields = Vec::with_capacity(many.len());
                for member in many {
                    let field = self.compile(member, None, FieldMetadata::new().with_required(true))?;
                    fields.push((member.clone(), field));
                }
                Ok(Field::new(
                    "Union",
                    FieldKind::Union(fields),
                    FieldOptions::from_metadata(&metadata),
                ))
            }
        }
    }

    /// Target of a nested field. Records carrying a lazy schema attribute
    /// are referenced without forcing it.
    fn nested(&mut self, ty: &TypeDesc) -> Result<SchemaRef, SchemaError> {
        if let TypeDesc::Record(record) = ty {
            if record.has_schema_attribute() {
                return Ok(SchemaRef::Lazy(Arc::clone(record)));
            }
        }

        let key = SchemaKey::new(ty, &self.base);
        if let Some(future) = self.seen.get(&key) {
            return Ok(match future.result() {
                Ok(schema) => SchemaRef::Resolved(Arc::clone(schema)),
                Err(_) => {
                    log::debug!("[compiler] cycle through {ty}, deferring");
                    SchemaRef::Pending(Arc::clone(future))
                }
            });
        }
        self.schema(ty).map(SchemaRef::Resolved)
    }

    fn lookup_forward(&self, name: &str) -> Result<TypeDesc, SchemaError> {
        let found = match self.scope.last() {
            Some(record) => lookup_name(name, record, record, &self.locals),
            None => self.locals.get(name).cloned().or_else(|| builtin(name)),
        };
        found.ok_or_else(|| SchemaError::UnresolvedForwardRef {
            name: name.to_string(),
            record: self
                .scope
                .last()
                .map_or_else(|| "<field>".to_string(), |r| r.name().to_string()),
        })
    }

    /// Cache the schemas this compilation produced.
    pub(crate) fn publish(&mut self) {
        let cache = SchemaCache::global();
        for (key, schema) in self.completed.drain(..) {
            cache.insert(key, schema);
        }
    }
}

fn flatten_union(members: &[TypeDesc], out: &mut Vec<TypeDesc>) {
    for member in members {
        match member {
            TypeDesc::Union(inner) => flatten_union(inner, out),
            other if !out.contains(other) => out.push(other.clone()),
            _ => {}
        }
    }
}

/// The declared type a value is an instance of.
fn runtime_type(value: &Value) -> TypeDesc {
    match value {
        Value::Null => TypeDesc::Any,
        Value::Bool(_) => TypeDesc::bool(),
        Value::Int(_) => TypeDesc::int(),
        Value::Float(_) => TypeDesc::float(),
        Value::Str(_) => TypeDesc::str(),
        Value::Decimal(_) => TypeDesc::decimal(),
        Value::Uuid(_) => TypeDesc::uuid(),
        Value::Date(_) => TypeDesc::date(),
        Value::Time(_) => TypeDesc::time(),
        Value::DateTime(_) => TypeDesc::datetime(),
        Value::Duration(_) => TypeDesc::timedelta(),
        Value::List(_) => TypeDesc::bare(ContainerKind::List),
        Value::Tuple(_) => TypeDesc::bare(ContainerKind::Tuple),
        Value::Set(_) => TypeDesc::bare(ContainerKind::Set),
        Value::FrozenSet(_) => TypeDesc::bare(ContainerKind::FrozenSet),
        Value::Map(_) => TypeDesc::bare(ContainerKind::Mapping),
        Value::Enum(member) => TypeDesc::Enum(Arc::clone(member.enum_def())),
        Value::Record(record) => TypeDesc::Record(Arc::clone(record.class())),
    }
}
