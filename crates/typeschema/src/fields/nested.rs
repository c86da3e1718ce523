// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::compiler::{Future, SchemaError};
use crate::schema::Schema;
use crate::types::RecordDef;
use std::fmt;
use std::sync::Arc;

/// Target of a nested field.
///
/// Inside a cycle the target is still being compiled when the field is
/// built, so the field keeps the placeholder and reads it at load/dump
/// time. Records carrying a lazy `Schema` attribute are referenced without
/// forcing it.
#[derive(Clone)]
pub enum SchemaRef {
    Resolved(Arc<Schema>),
    Pending(Arc<Future<Arc<Schema>>>),
    Lazy(Arc<RecordDef>),
}

impl SchemaRef {
    /// The target schema. Forces a lazy attribute on first use.
    pub fn get(&self) -> Result<Arc<Schema>, SchemaError> {
        match self {
            Self::Resolved(schema) => Ok(Arc::clone(schema)),
            Self::Pending(future) => Ok(Arc::clone(future.result()?)),
            Self::Lazy(record) => record.schema(),
        }
    }

    /// True when both references lead to the same schema object.
    pub fn same_target(&self, other: &SchemaRef) -> bool {
        match (self.get(), other.get()) {
            (Ok(a), Ok(b)) => Arc::ptr_eq(&a, &b),
            _ => false,
        }
    }
}

impl fmt::Debug for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(schema) => write!(f, "{}", schema.name()),
            Self::Pending(future) => match future.result() {
                Ok(schema) => write!(f, "{}", schema.name()),
                Err(_) => f.write_str("<pending>"),
            },
            Self::Lazy(record) => write!(f, "{}.Schema", record.name()),
        }
    }
}
