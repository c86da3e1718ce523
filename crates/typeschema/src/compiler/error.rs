// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::future::InvalidStateError;
use crate::lazy::AttributeError;
use thiserror::Error;

/// Compile-time failure: the type cannot be turned into a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Not a record, or a record that cannot be coerced into one.
    #[error("{name} is not a dataclass and cannot be turned into one. {reason}")]
    InvalidClass { name: String, reason: String },

    /// No rule of the field compiler applies.
    #[error("{ty} is not a recognized field type")]
    UnrecognizedFieldType { ty: String },

    /// Fields whose type mentions a type variable no ancestor binds.
    #[error("{record} has unbound fields: {}", .fields.join(", "))]
    UnboundTypeVar { record: String, fields: Vec<String> },

    /// A bare type variable compiled outside any generic record.
    #[error("type variable {name} is not bound")]
    UnboundTypeParameter { name: String },

    #[error("{name} expects {expected} type arguments, got {found}")]
    TypeArity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),

    #[error("name '{name}' is not defined (in {record})")]
    UnresolvedForwardRef { name: String, record: String },

    /// Schemas attach to record classes, not to parametrized aliases.
    #[error("cannot attach a schema to the generic alias {name}")]
    GenericAlias { name: String },

    #[error(transparent)]
    RecursiveEvaluation(#[from] AttributeError),
}

impl SchemaError {
    pub(crate) fn invalid_class(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidClass {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unrecognized(ty: &impl std::fmt::Display) -> Self {
        Self::UnrecognizedFieldType { ty: ty.to_string() }
    }

    /// True for both unbound type variable variants.
    pub fn is_unbound_typevar(&self) -> bool {
        matches!(
            self,
            Self::UnboundTypeVar { .. } | Self::UnboundTypeParameter { .. }
        )
    }
}
