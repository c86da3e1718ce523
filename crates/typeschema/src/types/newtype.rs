// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Named aliases that carry field construction options.

use crate::fields::{FieldClass, FieldMetadata, Validator};
use crate::types::TypeDesc;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A named wrapper around a supertype (`UserId = NewType("UserId", int)`).
///
/// The alias may carry field metadata (validators, defaults, a pre-built
/// field) and a field class. Call-site metadata wins over the alias's own,
/// except validators, which are concatenated alias-first.
pub struct NewTypeDef {
    name: String,
    supertype: TypeDesc,
    metadata: FieldMetadata,
    field_class: Option<FieldClass>,
}

impl NewTypeDef {
    /// The second argument is the wrapped type.
    pub fn new(name: impl Into<String>, supertype: TypeDesc) -> Self {
        Self {
            name: name.into(),
            supertype,
            metadata: FieldMetadata::default(),
            field_class: None,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: FieldMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.metadata.validators.push(validator);
        self
    }

    /// Build fields with `class` instead of recursing into the supertype.
    #[must_use]
    pub fn with_field_class(mut self, class: FieldClass) -> Self {
        self.field_class = Some(class);
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn supertype(&self) -> &TypeDesc {
        &self.supertype
    }

    pub fn metadata(&self) -> &FieldMetadata {
        &self.metadata
    }

    pub fn field_class(&self) -> Option<&FieldClass> {
        self.field_class.as_ref()
    }
}

impl fmt::Debug for NewTypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NewType({}, {})", self.name, self.supertype)
    }
}

/// `str` validated as a URL.
pub fn url() -> TypeDesc {
    static URL: OnceLock<Arc<NewTypeDef>> = OnceLock::new();
    let def = URL.get_or_init(|| {
        NewTypeDef::new("Url", TypeDesc::str())
            .with_field_class(FieldClass::url())
            .build()
    });
    TypeDesc::NewType(Arc::clone(def))
}

/// `str` validated as an e-mail address.
pub fn email() -> TypeDesc {
    static EMAIL: OnceLock<Arc<NewTypeDef>> = OnceLock::new();
    let def = EMAIL.get_or_init(|| {
        NewTypeDef::new("Email", TypeDesc::str())
            .with_field_class(FieldClass::email())
            .build()
    });
    TypeDesc::NewType(Arc::clone(def))
}
