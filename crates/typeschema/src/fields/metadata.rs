// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{Field, Validator};
use crate::types::DefaultValue;
use crate::value::Value;

/// Per-field options attached to a declaration. Every option is optional;
/// the field compiler fills in what is left unset.
#[derive(Clone, Debug, Default)]
pub struct FieldMetadata {
    /// Pre-built field, used as is.
    pub field: Option<Field>,
    pub required: Option<bool>,
    pub allow_none: Option<bool>,
    pub load_default: Option<DefaultValue>,
    pub dump_default: Option<DefaultValue>,
    pub validators: Vec<Validator>,
    pub data_key: Option<String>,
    pub description: Option<String>,
    pub load_only: Option<bool>,
    pub dump_only: Option<bool>,
    pub strict: Option<bool>,
    /// Enum fields: (de)serialize members by value instead of by name.
    pub by_value: Option<bool>,
}

impl FieldMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.field = Some(field);
        self
    }

    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    #[must_use]
    pub fn with_allow_none(mut self, allow_none: bool) -> Self {
        self.allow_none = Some(allow_none);
        self
    }

    #[must_use]
    pub fn with_load_default(mut self, value: impl Into<Value>) -> Self {
        self.load_default = Some(DefaultValue::value(value));
        self
    }

    #[must_use]
    pub fn with_dump_default(mut self, value: impl Into<Value>) -> Self {
        self.dump_default = Some(DefaultValue::value(value));
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    #[must_use]
    pub fn with_data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_load_only(mut self, load_only: bool) -> Self {
        self.load_only = Some(load_only);
        self
    }

    #[must_use]
    pub fn with_dump_only(mut self, dump_only: bool) -> Self {
        self.dump_only = Some(dump_only);
        self
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    #[must_use]
    pub fn with_by_value(mut self, by_value: bool) -> Self {
        self.by_value = Some(by_value);
        self
    }

    /// Fill every unset option from `other`. Validators are left alone.
    pub fn merge_missing(&mut self, other: &FieldMetadata) {
        fn fill<T: Clone>(slot: &mut Option<T>, from: &Option<T>) {
            if slot.is_none() {
                slot.clone_from(from);
            }
        }
        fill(&mut self.field, &other.field);
        fill(&mut self.required, &other.required);
        fill(&mut self.allow_none, &other.allow_none);
        fill(&mut self.load_default, &other.load_default);
        fill(&mut self.dump_default, &other.dump_default);
        fill(&mut self.data_key, &other.data_key);
        fill(&mut self.description, &other.description);
        fill(&mut self.load_only, &other.load_only);
        fill(&mut self.dump_only, &other.dump_only);
        fill(&mut self.strict, &other.strict);
        fill(&mut self.by_value, &other.by_value);
    }
}

/// Resolved construction options of a runtime field.
#[derive(Clone, Debug, Default)]
pub struct FieldOptions {
    pub required: bool,
    pub allow_none: bool,
    pub load_default: Option<DefaultValue>,
    pub dump_default: Option<DefaultValue>,
    pub validators: Vec<Validator>,
    pub data_key: Option<String>,
    pub description: Option<String>,
    pub load_only: bool,
    pub dump_only: bool,
    pub strict: bool,
}

impl FieldOptions {
    /// Unset flags are false, except `allow_none`, which follows a
    /// `None` load default.
    pub fn from_metadata(metadata: &FieldMetadata) -> Self {
        let null_default = metadata
            .load_default
            .as_ref()
            .and_then(DefaultValue::as_value)
            .is_some_and(Value::is_null);
        Self {
            required: metadata.required.unwrap_or(false),
            allow_none: metadata.allow_none.unwrap_or(null_default),
            load_default: metadata.load_default.clone(),
            dump_default: metadata.dump_default.clone(),
            validators: metadata.validators.clone(),
            data_key: metadata.data_key.clone(),
            description: metadata.description.clone(),
            load_only: metadata.load_only.unwrap_or(false),
            dump_only: metadata.dump_only.unwrap_or(false),
            strict: metadata.strict.unwrap_or(false),
        }
    }
}
