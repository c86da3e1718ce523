// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Leaf fields: numbers, strings, temporal values, identifiers.

use super::error::{DumpError, ValidationError};
use super::validate::{is_email, is_url};
use crate::value::json::{duration_to_json, float_to_json, DATETIME_FORMAT, DATE_FORMAT, TIME_FORMAT};
use crate::value::{Decimal, Value};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value as Json;
use uuid::Uuid;

/// Leaf field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// Passthrough: any JSON in, structural value out.
    Raw,
    Integer,
    Float,
    String,
    Boolean,
    DateTime,
    Date,
    Time,
    TimeDelta,
    Decimal,
    Uuid,
    Url,
    Email,
}

impl Scalar {
    /// Field class name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Raw => "Raw",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::String => "String",
            Self::Boolean => "Boolean",
            Self::DateTime => "DateTime",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::TimeDelta => "TimeDelta",
            Self::Decimal => "Decimal",
            Self::Uuid => "UUID",
            Self::Url => "Url",
            Self::Email => "Email",
        }
    }

    fn invalid(self) -> &'static str {
        match self {
            Self::Raw => "Invalid value.",
            Self::Integer => "Not a valid integer.",
            Self::Float | Self::Decimal => "Not a valid number.",
            Self::String => "Not a valid string.",
            Self::Boolean => "Not a valid boolean.",
            Self::DateTime => "Not a valid datetime.",
            Self::Date => "Not a valid date.",
            Self::Time => "Not a valid time.",
            Self::TimeDelta => "Not a valid period of time.",
            Self::Uuid => "Not a valid UUID.",
            Self::Url => "Not a valid URL.",
            Self::Email => "Not a valid email address.",
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Self::Raw => "any",
            Self::Integer => "int",
            Self::Float => "float",
            Self::String | Self::Url | Self::Email => "str",
            Self::Boolean => "bool",
            Self::DateTime => "datetime",
            Self::Date => "date",
            Self::Time => "time",
            Self::TimeDelta => "timedelta",
            Self::Decimal => "Decimal",
            Self::Uuid => "UUID",
        }
    }

    pub(crate) fn load(self, json: &Json, strict: bool) -> Result<Value, ValidationError> {
        self.try_load(json, strict)
            .ok_or_else(|| ValidationError::new(self.invalid()))
    }

    fn try_load(self, json: &Json, strict: bool) -> Option<Value> {
        match self {
            Self::Raw => Some(Value::from_json(json)),
            Self::Integer => {
                let Json::Number(n) = json else {
                    return None;
                };
                if let Some(i) = n.as_i64() {
                    return Some(Value::Int(i));
                }
                let f = n.as_f64()?;
                let integral = f.fract() == 0.0 && f.abs() < i64::MAX as f64;
                (!strict && integral).then_some(Value::Int(f as i64))
            }
            Self::Float => json.as_f64().map(Value::Float),
            Self::String => json.as_str().map(|s| Value::Str(s.to_string())),
            Self::Boolean => json.as_bool().map(Value::Bool),
            Self::DateTime => parse_datetime(json.as_str()?).map(Value::DateTime),
            Self::Date => NaiveDate::parse_from_str(json.as_str()?, DATE_FORMAT)
                .ok()
                .map(Value::Date),
            Self::Time => parse_time(json.as_str()?).map(Value::Time),
            Self::TimeDelta => parse_seconds(json).map(Value::Duration),
            Self::Decimal => {
                let text = match json {
                    Json::Number(n) => n.to_string(),
                    Json::String(s) => s.clone(),
                    _ => return None,
                };
                parse_decimal(&text).map(Value::Decimal)
            }
            Self::Uuid => Uuid::parse_str(json.as_str()?).ok().map(Value::Uuid),
            Self::Url => json
                .as_str()
                .filter(|s| is_url(s))
                .map(|s| Value::Str(s.to_string())),
            Self::Email => json
                .as_str()
                .filter(|s| is_email(s))
                .map(|s| Value::Str(s.to_string())),
        }
    }

    pub(crate) fn dump(self, value: &Value) -> Result<Json, DumpError> {
        let json = match (self, value) {
            (Self::Raw, v) => v.to_json(),
            (Self::Integer, Value::Int(i)) => Json::from(*i),
            (Self::Integer, Value::Float(f)) if f.fract() == 0.0 => Json::from(*f as i64),
            (Self::Float, Value::Int(i)) => float_to_json(*i as f64),
            (Self::Float, Value::Float(f)) => float_to_json(*f),
            (Self::Float, Value::Decimal(d)) => d.to_f64().map_or(Json::Null, float_to_json),
            (Self::String | Self::Url | Self::Email, Value::Str(s)) => Json::String(s.clone()),
            (Self::Boolean, Value::Bool(b)) => Json::Bool(*b),
            (Self::DateTime, Value::DateTime(dt)) => {
                Json::String(dt.format(DATETIME_FORMAT).to_string())
            }
            (Self::Date, Value::Date(d)) => Json::String(d.format(DATE_FORMAT).to_string()),
            (Self::Time, Value::Time(t)) => Json::String(t.format(TIME_FORMAT).to_string()),
            (Self::TimeDelta, Value::Duration(d)) => duration_to_json(d),
            (Self::Decimal, Value::Decimal(d)) => Json::String(d.to_string()),
            (Self::Decimal, Value::Int(i)) => Json::String(i.to_string()),
            (Self::Uuid, Value::Uuid(u)) => Json::String(u.hyphenated().to_string()),
            (kind, other) => return Err(DumpError::mismatch(kind.expected(), other)),
        };
        Ok(json)
    }
}

/// Plain notation first, then exponent notation (`1e21`, `1.5E-3`).
fn parse_decimal(text: &str) -> Option<Decimal> {
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc()))
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

fn parse_seconds(json: &Json) -> Option<Duration> {
    let Json::Number(n) = json else {
        return None;
    };
    if let Some(secs) = n.as_i64() {
        return Duration::try_seconds(secs);
    }
    let secs = n.as_f64()?;
    if !secs.is_finite() {
        return None;
    }
    let micros = (secs * 1e6).round();
    if micros.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(Duration::microseconds(micros as i64))
}
