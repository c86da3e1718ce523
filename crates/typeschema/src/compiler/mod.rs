// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema compiler.
//!
//! # Architecture
//!
//! ```text
//! class_schema(ty, base)
//!   -> SchemaCache::global()          cross-call LRU, keyed by (type, base)
//!   -> FieldCompiler::schema()        per-call placeholders (Future) + bindings
//!        -> resolver                  type variables and forward references
//!        -> FieldCompiler::compile()  one runtime Field per declared field
//!             -> schema() again for nested records
//! ```
//!
//! A top-level call holds a process-wide re-entrant lock for its duration.
//! The schemas it builds reach the global cache only once the whole call
//! has succeeded.

mod cache;
mod class;
mod error;
mod field;
mod future;
pub mod resolver;
mod warning;

pub use cache::{LookupStats, SchemaCache, SchemaKey};
pub use error::SchemaError;
pub use field::FieldCompiler;
pub use future::{Future, InvalidStateError};
pub use resolver::TypeVarBindings;
pub use warning::CompileWarning;

use crate::fields::{Field, FieldMetadata};
use crate::schema::{BaseSchema, Schema};
use crate::types::{DefaultValue, Namespace, RecordDef, TypeDesc};
use parking_lot::ReentrantMutex;
use std::sync::{Arc, OnceLock};

fn compile_lock() -> &'static ReentrantMutex<()> {
    static LOCK: OnceLock<ReentrantMutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| ReentrantMutex::new(()))
}

/// Compile `ty`, a record or a parametrized generic record, into a schema.
///
/// `base` defaults to [`BaseSchema::default_base`]. Repeated calls with the
/// same type and base return the same `Arc<Schema>` while it stays cached.
///
/// ```ignore
/// let city = RecordBuilder::new("City")
///     .field("name", TypeDesc::str())
///     .build();
/// let schema = class_schema(&city, None)?;
/// let value = schema.load(&json!({"name": "Paris"}))?;
/// ```
pub fn class_schema(
    ty: impl Into<TypeDesc>,
    base: Option<&Arc<BaseSchema>>,
) -> Result<Arc<Schema>, SchemaError> {
    class_schema_in(ty, base, &Namespace::new())
}

/// [`class_schema`] with caller locals visible to forward references.
/// Locals are not part of the cache key.
pub fn class_schema_in(
    ty: impl Into<TypeDesc>,
    base: Option<&Arc<BaseSchema>>,
    locals: &Namespace,
) -> Result<Arc<Schema>, SchemaError> {
    let ty = ty.into();
    let _guard = compile_lock().lock();
    let mut compiler = FieldCompiler::new(base).with_locals(locals.clone());
    let schema = compiler.schema(&ty)?;
    compiler.publish();
    Ok(schema)
}

/// Compile a single field outside any record.
///
/// ```ignore
/// let field = field_for_schema(TypeDesc::optional(TypeDesc::int()), None, FieldMetadata::new(), None)?;
/// assert!(!field.is_required());
/// ```
pub fn field_for_schema(
    ty: impl Into<TypeDesc>,
    default: Option<DefaultValue>,
    metadata: FieldMetadata,
    base: Option<&Arc<BaseSchema>>,
) -> Result<Field, SchemaError> {
    let ty = ty.into();
    let _guard = compile_lock().lock();
    let mut compiler = FieldCompiler::new(base);
    let field = compiler.compile(&ty, default.as_ref(), metadata)?;
    compiler.publish();
    Ok(field)
}

/// Attach a lazy `Schema` attribute to a record compiled against `base`.
///
/// Parametrized generic aliases are rejected: the attribute belongs to the
/// record class. A record that already has the attribute keeps it.
pub fn add_schema(
    ty: &TypeDesc,
    base: Option<Arc<BaseSchema>>,
) -> Result<Arc<RecordDef>, SchemaError> {
    match ty {
        TypeDesc::Record(record) => {
            if !record.install_schema_attribute(base) {
                log::debug!("[compiler] {} already has a schema attribute", record.name());
            }
            Ok(Arc::clone(record))
        }
        TypeDesc::Generic { .. } => Err(SchemaError::GenericAlias {
            name: ty.to_string(),
        }),
        other => Err(SchemaError::invalid_class(
            &other.to_string(),
            "It is not a record type.",
        )),
    }
}
