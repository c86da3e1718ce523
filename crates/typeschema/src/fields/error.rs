// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Load/dump errors raised by compiled fields and schemas.

use crate::compiler::SchemaError;
use crate::types::ConstructError;
use serde_json::Value as Json;
use std::fmt;
use thiserror::Error;

/// Standard messages, worded like the reference field library.
pub mod messages {
    pub const REQUIRED: &str = "Missing data for required field.";
    pub const NULL: &str = "Field may not be null.";
    pub const UNKNOWN: &str = "Unknown field.";
    pub const INVALID_INPUT: &str = "Invalid input type.";
}

/// Nested error messages: a list of strings, a keyed map of nested
/// messages (field names, collection indices), or the per-candidate
/// failures of a union.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorMessages {
    List(Vec<String>),
    Keyed(Vec<(String, ErrorMessages)>),
    Candidates(Vec<ErrorMessages>),
}

impl ErrorMessages {
    /// Combine two message sets reported under the same key.
    fn merge(self, other: ErrorMessages) -> ErrorMessages {
        match (self, other) {
            (Self::List(mut a), Self::List(b)) => {
                a.extend(b);
                Self::List(a)
            }
            (Self::Keyed(mut a), Self::Keyed(b)) => {
                for (key, msgs) in b {
                    insert_keyed(&mut a, key, msgs);
                }
                Self::Keyed(a)
            }
            (Self::Candidates(mut a), Self::Candidates(b)) => {
                a.extend(b);
                Self::Candidates(a)
            }
            (a, b) => Self::Candidates(vec![a, b]),
        }
    }

    /// Messages nested under `key`, if this is a keyed set.
    pub fn get(&self, key: &str) -> Option<&ErrorMessages> {
        match self {
            Self::Keyed(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, m)| m),
            _ => None,
        }
    }

    /// Flat list of messages, if this is a plain list.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Json {
        match self {
            Self::List(items) => Json::Array(items.iter().cloned().map(Json::String).collect()),
            Self::Keyed(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Candidates(items) => Json::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

fn insert_keyed(entries: &mut Vec<(String, ErrorMessages)>, key: String, msgs: ErrorMessages) {
    match entries.iter().position(|(k, _)| *k == key) {
        Some(pos) => {
            let (_, existing) = entries.remove(pos);
            entries.insert(pos, (key, existing.merge(msgs)));
        }
        None => entries.push((key, msgs)),
    }
}

/// Data failed a compiled field's runtime checks.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    messages: ErrorMessages,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            messages: ErrorMessages::List(vec![message.into()]),
        }
    }

    pub fn from_messages(messages: ErrorMessages) -> Self {
        Self { messages }
    }

    /// Nest `error` under `key`.
    pub fn keyed(key: impl Into<String>, error: ValidationError) -> Self {
        Self {
            messages: ErrorMessages::Keyed(vec![(key.into(), error.messages)]),
        }
    }

    /// Aggregate the failures of every union candidate.
    pub fn candidates(errors: Vec<ValidationError>) -> Self {
        Self {
            messages: ErrorMessages::Candidates(errors.into_iter().map(|e| e.messages).collect()),
        }
    }

    pub fn messages(&self) -> &ErrorMessages {
        &self.messages
    }

    pub fn into_messages(self) -> ErrorMessages {
        self.messages
    }

    /// Messages rendered as JSON, e.g. `{"name": ["Missing data for required field."]}`.
    pub fn messages_json(&self) -> Json {
        self.messages.to_json()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages_json())
    }
}

impl std::error::Error for ValidationError {}

/// Accumulates keyed errors while a schema walks its fields.
#[derive(Debug, Default)]
pub(crate) struct ErrorCollector {
    entries: Vec<(String, ErrorMessages)>,
}

impl ErrorCollector {
    pub(crate) fn add(&mut self, key: impl Into<String>, error: ValidationError) {
        insert_keyed(&mut self.entries, key.into(), error.messages);
    }

    /// Merge a record-level error: plain lists land under `_schema`.
    pub(crate) fn add_schema_error(&mut self, error: ValidationError) {
        match error.messages {
            ErrorMessages::Keyed(entries) => {
                for (key, msgs) in entries {
                    insert_keyed(&mut self.entries, key, msgs);
                }
            }
            other => insert_keyed(
                &mut self.entries,
                crate::config::SCHEMA_ERROR_KEY.to_string(),
                other,
            ),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_result(self) -> Result<(), ValidationError> {
        if self.entries.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::from_messages(ErrorMessages::Keyed(
                self.entries,
            )))
        }
    }
}

/// Failure of a `load` call.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// A lazily referenced nested schema failed to compile.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Construct(#[from] ConstructError),
    #[error("invalid JSON input: {0}")]
    Parse(#[from] serde_json::Error),
}

impl LoadError {
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }
}

/// Failure of a `dump` call.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("expected {expected}, got {found}")]
    TypeMismatch { expected: String, found: String },
    #[error(
        "unable to serialize value with any of the fields in the union: [{}]",
        join_failures(.failures)
    )]
    Union { failures: Vec<DumpError> },
    #[error("{field}: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<DumpError>,
    },
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl DumpError {
    pub(crate) fn mismatch(expected: impl Into<String>, found: &crate::value::Value) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.type_name().to_string(),
        }
    }

    pub(crate) fn in_field(field: impl Into<String>, source: DumpError) -> Self {
        Self::Field {
            field: field.into(),
            source: Box::new(source),
        }
    }
}

fn join_failures(failures: &[DumpError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collector_merges_same_key() {
        let mut errors = ErrorCollector::default();
        errors.add("a", ValidationError::new("first"));
        errors.add("a", ValidationError::new("second"));
        errors.add_schema_error(ValidationError::new("never valid"));
        let err = errors.into_result().unwrap_err();
        assert_eq!(
            err.messages_json(),
            json!({"a": ["first", "second"], "_schema": ["never valid"]})
        );
    }

    #[test]
    fn test_keyed_schema_error_merges_at_top_level() {
        let mut errors = ErrorCollector::default();
        errors.add_schema_error(ValidationError::keyed("x", ValidationError::new("bad")));
        let err = errors.into_result().unwrap_err();
        assert_eq!(err.messages_json(), json!({"x": ["bad"]}));
    }

    #[test]
    fn test_candidates() {
        let err = ValidationError::candidates(vec![
            ValidationError::new("Not a valid integer."),
            ValidationError::new("Not a valid string."),
        ]);
        assert_eq!(
            err.messages_json(),
            json!([["Not a valid integer."], ["Not a valid string."]])
        );
    }

    #[test]
    fn test_dump_error_display() {
        let err = DumpError::Union {
            failures: vec![
                DumpError::TypeMismatch {
                    expected: "int".into(),
                    found: "str".into(),
                },
                DumpError::TypeMismatch {
                    expected: "bool".into(),
                    found: "str".into(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "unable to serialize value with any of the fields in the union: \
             [expected int, got str; expected bool, got str]"
        );
    }
}
