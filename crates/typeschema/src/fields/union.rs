// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Union node: one candidate field per member type, tried in order.

use super::error::{DumpError, LoadError, ValidationError};
use super::{Field, LoadContext};
use crate::types::{typecheck, TypeDesc};
use crate::value::Value;
use serde_json::Value as Json;

/// First member whose type accepts `value` serializes it.
pub(super) fn serialize(members: &[(TypeDesc, Field)], value: &Value) -> Result<Json, DumpError> {
    let mut failures = Vec::new();
    for (ty, field) in members {
        if !typecheck::conforms(value, ty) {
            failures.push(DumpError::mismatch(ty.to_string(), value));
            continue;
        }
        match field.serialize(value) {
            Ok(json) => return Ok(json),
            Err(e) => failures.push(e),
        }
    }
    Err(DumpError::Union { failures })
}

/// First member whose own load succeeds and whose result has the member's
/// type wins. Otherwise every candidate's messages are reported.
pub(super) fn deserialize(
    members: &[(TypeDesc, Field)],
    json: &Json,
    ctx: LoadContext,
) -> Result<Value, LoadError> {
    let mut errors = Vec::new();
    for (ty, field) in members {
        match field.deserialize_in(json, ctx) {
            Ok(value) if accepts(&value, ty, ctx) => return Ok(value),
            Ok(value) => errors.push(ValidationError::new(format!(
                "expected {ty}, got {}",
                value.type_name()
            ))),
            Err(LoadError::Validation(e)) => errors.push(e),
            Err(other) => return Err(other),
        }
    }
    Err(ValidationError::candidates(errors).into())
}

/// Nested records stay maps when the load does not construct them.
fn accepts(value: &Value, ty: &TypeDesc, ctx: LoadContext) -> bool {
    if !ctx.construct && ty.record_origin().is_some() {
        return matches!(value, Value::Map(_));
    }
    typecheck::conforms(value, ty)
}
