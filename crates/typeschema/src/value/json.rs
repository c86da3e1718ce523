// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic JSON bridging used by raw (passthrough) fields.

use super::Value;
use serde_json::{Map, Number, Value as Json};

/// Format shared by the datetime field and the raw JSON rendering.
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M:%S%.f";

impl Value {
    /// Structural conversion from JSON: objects become string-keyed maps,
    /// arrays become lists, integral numbers become `Int`.
    pub fn from_json(json: &Json) -> Self {
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Self::Str(s.clone()),
            Json::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Json::Object(obj) => Self::Map(
                obj.iter()
                    .map(|(k, v)| (Self::Str(k.clone()), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Best-effort JSON rendering. Non-finite floats become `null`.
    pub fn to_json(&self) -> Json {
        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::from(*i),
            Self::Float(f) => float_to_json(*f),
            Self::Str(s) => Json::String(s.clone()),
            Self::Decimal(d) => Json::String(d.to_string()),
            Self::Uuid(u) => Json::String(u.hyphenated().to_string()),
            Self::Date(d) => Json::String(d.format(DATE_FORMAT).to_string()),
            Self::Time(t) => Json::String(t.format(TIME_FORMAT).to_string()),
            Self::DateTime(dt) => Json::String(dt.format(DATETIME_FORMAT).to_string()),
            Self::Duration(d) => duration_to_json(d),
            Self::List(items) | Self::Tuple(items) | Self::Set(items) | Self::FrozenSet(items) => {
                Json::Array(items.iter().map(Self::to_json).collect())
            }
            Self::Map(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (key_to_string(k), v.to_json()))
                    .collect::<Map<_, _>>(),
            ),
            Self::Enum(m) => Json::String(m.name().to_string()),
            Self::Record(r) => Json::Object(
                r.fields()
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

pub(crate) fn float_to_json(f: f64) -> Json {
    Number::from_f64(f).map_or(Json::Null, Json::Number)
}

/// Whole seconds as an integer, fractional seconds as a float.
pub(crate) fn duration_to_json(d: &chrono::Duration) -> Json {
    let secs = d.num_seconds();
    let nanos = (*d - chrono::Duration::seconds(secs))
        .num_nanoseconds()
        .unwrap_or(0);
    if nanos == 0 {
        Json::from(secs)
    } else {
        float_to_json(secs as f64 + nanos as f64 / 1e9)
    }
}

/// JSON object keys are strings: strings pass through, scalars use their JSON text.
pub(crate) fn key_to_string(key: &Value) -> String {
    match key {
        Value::Str(s) => s.clone(),
        other => match other.to_json() {
            Json::String(s) => s,
            json => json.to_string(),
        },
    }
}
