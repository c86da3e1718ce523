// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Collection nodes: homogeneous sequences and sets, fixed tuples, mappings.
//!
//! Item failures are collected rather than short-circuited and reported
//! under the item's index (or, for mappings, under the key).

use super::error::{DumpError, ErrorMessages, LoadError, ValidationError};
use super::{Field, LoadContext};
use crate::value::Value;
use serde_json::{Map, Value as Json};

const NOT_A_LIST: &str = "Not a valid list.";
const NOT_A_TUPLE: &str = "Not a valid tuple.";
const NOT_A_MAPPING: &str = "Not a valid mapping type.";

/// Index-keyed error accumulator. Compile errors abort immediately.
#[derive(Default)]
struct ItemErrors(Vec<(String, ErrorMessages)>);

impl ItemErrors {
    fn take<T>(&mut self, key: String, result: Result<T, LoadError>) -> Result<Option<T>, LoadError> {
        match result {
            Ok(v) => Ok(Some(v)),
            Err(LoadError::Validation(e)) => {
                self.0.push((key, e.into_messages()));
                Ok(None)
            }
            Err(other) => Err(other),
        }
    }

    fn finish<T>(self, value: T) -> Result<T, LoadError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError::from_messages(ErrorMessages::Keyed(self.0)).into())
        }
    }
}

fn as_array<'a>(json: &'a Json, message: &str) -> Result<&'a Vec<Json>, LoadError> {
    json.as_array()
        .ok_or_else(|| ValidationError::new(message).into())
}

pub(super) fn load_items(item: &Field, json: &Json, ctx: LoadContext) -> Result<Vec<Value>, LoadError> {
    let array = as_array(json, NOT_A_LIST)?;
    let mut errors = ItemErrors::default();
    let mut out = Vec::with_capacity(array.len());
    for (i, element) in array.iter().enumerate() {
        if let Some(v) = errors.take(i.to_string(), item.deserialize_in(element, ctx))? {
            out.push(v);
        }
    }
    errors.finish(out)
}

pub(super) fn load_list(item: &Field, json: &Json, ctx: LoadContext) -> Result<Value, LoadError> {
    load_items(item, json, ctx).map(Value::List)
}

pub(super) fn load_tuple(items: &[Field], json: &Json, ctx: LoadContext) -> Result<Value, LoadError> {
    let array = as_array(json, NOT_A_TUPLE)?;
    if array.len() != items.len() {
        return Err(ValidationError::new(NOT_A_TUPLE).into());
    }
    let mut errors = ItemErrors::default();
    let mut out = Vec::with_capacity(items.len());
    for (i, (field, element)) in items.iter().zip(array).enumerate() {
        if let Some(v) = errors.take(i.to_string(), field.deserialize_in(element, ctx))? {
            out.push(v);
        }
    }
    errors.finish(Value::Tuple(out))
}

pub(super) fn load_dict(
    keys: &Field,
    values: &Field,
    json: &Json,
    ctx: LoadContext,
) -> Result<Value, LoadError> {
    let object = json
        .as_object()
        .ok_or_else(|| LoadError::from(ValidationError::new(NOT_A_MAPPING)))?;
    let mut errors = ItemErrors::default();
    let mut out = Vec::with_capacity(object.len());
    for (raw_key, raw_value) in object {
        let mut entry = ItemErrors::default();
        let key = entry.take("key".to_string(), keys.deserialize_key(raw_key, ctx))?;
        let value = entry.take("value".to_string(), values.deserialize_in(raw_value, ctx))?;
        match (key, value) {
            (Some(k), Some(v)) => out.push((k, v)),
            _ => errors.0.push((raw_key.clone(), ErrorMessages::Keyed(entry.0))),
        }
    }
    errors.finish(Value::Map(out))
}

pub(super) fn dump_items(item: &Field, value: &Value) -> Result<Json, DumpError> {
    let items = value
        .as_slice()
        .ok_or_else(|| DumpError::mismatch("list", value))?;
    let mut out = Vec::with_capacity(items.len());
    for (i, element) in items.iter().enumerate() {
        out.push(
            item.serialize(element)
                .map_err(|e| DumpError::in_field(i.to_string(), e))?,
        );
    }
    Ok(Json::Array(out))
}

pub(super) fn dump_tuple(items: &[Field], value: &Value) -> Result<Json, DumpError> {
    let elements = match value {
        Value::Tuple(v) | Value::List(v) if v.len() == items.len() => v,
        other => return Err(DumpError::mismatch(format!("tuple of {}", items.len()), other)),
    };
    let mut out = Vec::with_capacity(items.len());
    for (i, (field, element)) in items.iter().zip(elements).enumerate() {
        out.push(
            field
                .serialize(element)
                .map_err(|e| DumpError::in_field(i.to_string(), e))?,
        );
    }
    Ok(Json::Array(out))
}

pub(super) fn dump_dict(keys: &Field, values: &Field, value: &Value) -> Result<Json, DumpError> {
    let Value::Map(entries) = value else {
        return Err(DumpError::mismatch("dict", value));
    };
    let mut out = Map::with_capacity(entries.len());
    for (k, v) in entries {
        let key = keys.serialize_key(k)?;
        let dumped = values
            .serialize(v)
            .map_err(|e| DumpError::in_field(key.clone(), e))?;
        out.insert(key, dumped);
    }
    Ok(Json::Object(out))
}
