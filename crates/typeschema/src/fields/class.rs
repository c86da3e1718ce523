// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::error::{DumpError, ValidationError};
use super::{Field, FieldKind, FieldOptions, Scalar};
use crate::compiler::SchemaError;
use crate::value::Value;
use serde_json::Value as Json;
use std::fmt;
use std::sync::Arc;

/// User-supplied leaf codec, wrapped by [`FieldKind::Custom`].
pub trait FieldCodec: Send + Sync {
    fn name(&self) -> &str;

    fn serialize(&self, value: &Value) -> Result<Json, DumpError>;

    fn deserialize(&self, json: &Json) -> Result<Value, ValidationError>;
}

/// Builds a field from its inner fields (collection items, mapping key and
/// value) and resolved options.
pub type FieldBuilder =
    Arc<dyn Fn(Vec<Field>, FieldOptions) -> Result<Field, SchemaError> + Send + Sync>;

/// A field constructor, the value side of a base schema's type table.
#[derive(Clone)]
pub struct FieldClass {
    name: Arc<str>,
    build: FieldBuilder,
}

impl FieldClass {
    pub fn new(
        name: impl Into<Arc<str>>,
        build: impl Fn(Vec<Field>, FieldOptions) -> Result<Field, SchemaError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            build: Arc::new(build),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instantiate(&self, inner: Vec<Field>, opts: FieldOptions) -> Result<Field, SchemaError> {
        (self.build)(inner, opts)
    }

    /// Leaf field class.
    pub fn scalar(kind: Scalar) -> Self {
        let name: Arc<str> = Arc::from(kind.name());
        let class = Arc::clone(&name);
        Self::new(name, move |inner, opts| {
            expect_arity(&class, &inner, 0)?;
            Ok(Field::new(Arc::clone(&class), FieldKind::Scalar(kind), opts))
        })
    }

    /// Leaf field class backed by `codec`.
    pub fn codec(codec: Arc<dyn FieldCodec>) -> Self {
        let name: Arc<str> = Arc::from(codec.name());
        let class = Arc::clone(&name);
        Self::new(name, move |_, opts| {
            Ok(Field::new(
                Arc::clone(&class),
                FieldKind::Custom(Arc::clone(&codec)),
                opts,
            ))
        })
    }

    pub fn raw() -> Self {
        Self::scalar(Scalar::Raw)
    }

    pub fn url() -> Self {
        Self::scalar(Scalar::Url)
    }

    pub fn email() -> Self {
        Self::scalar(Scalar::Email)
    }

    pub fn list() -> Self {
        Self::homogeneous("List", FieldKind::List)
    }

    pub fn sequence() -> Self {
        Self::homogeneous("Sequence", FieldKind::Sequence)
    }

    pub fn set() -> Self {
        Self::homogeneous("Set", FieldKind::Set)
    }

    pub fn frozenset() -> Self {
        Self::homogeneous("FrozenSet", FieldKind::FrozenSet)
    }

    fn homogeneous(name: &'static str, wrap: fn(Box<Field>) -> FieldKind) -> Self {
        Self::new(name, move |inner, opts| {
            expect_arity(name, &inner, 1)?;
            let item = inner.into_iter().next().map(Box::new);
            match item {
                Some(item) => Ok(Field::new(name, wrap(item), opts)),
                None => Err(arity_error(name, 1, 0)),
            }
        })
    }

    /// Fixed-length tuple; takes any number of item fields.
    pub fn tuple() -> Self {
        Self::new("Tuple", |inner, opts| {
            Ok(Field::new("Tuple", FieldKind::Tuple(inner), opts))
        })
    }

    pub fn dict() -> Self {
        Self::new("Dict", |inner, opts| {
            expect_arity("Dict", &inner, 2)?;
            let mut inner = inner.into_iter().map(Box::new);
            match (inner.next(), inner.next()) {
                (Some(keys), Some(values)) => {
                    Ok(Field::new("Dict", FieldKind::Dict { keys, values }, opts))
                }
                _ => Err(arity_error("Dict", 2, 0)),
            }
        })
    }
}

fn arity_error(name: &str, expected: usize, found: usize) -> SchemaError {
    SchemaError::TypeArity {
        name: name.to_string(),
        expected,
        found,
    }
}

fn expect_arity(name: &str, inner: &[Field], expected: usize) -> Result<(), SchemaError> {
    if inner.len() == expected {
        Ok(())
    } else {
        Err(arity_error(name, expected, inner.len()))
    }
}

impl fmt::Debug for FieldClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<field class {}>", self.name)
    }
}
