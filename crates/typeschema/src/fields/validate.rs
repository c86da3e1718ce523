// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value validators run after a field has deserialized its input.

use crate::value::Value;
use regex::Regex;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Predicate validator signature.
pub type PredicateFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A check applied to a loaded value.
#[derive(Clone)]
pub enum Validator {
    /// Value must equal the given one (strict, no cross-type equality).
    Equal(Value),
    /// Value must be one of the given choices.
    OneOf(Vec<Value>),
    /// Numeric bounds, inclusive.
    Range { min: Option<f64>, max: Option<f64> },
    /// Length bounds for strings and collections, inclusive.
    Length { min: Option<usize>, max: Option<usize> },
    /// Arbitrary predicate with its failure message.
    Predicate { message: String, check: PredicateFn },
}

impl Validator {
    pub fn equal(value: impl Into<Value>) -> Self {
        Self::Equal(value.into())
    }

    pub fn one_of(choices: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::OneOf(choices.into_iter().map(Into::into).collect())
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Self::Range { min, max }
    }

    pub fn length(min: Option<usize>, max: Option<usize>) -> Self {
        Self::Length { min, max }
    }

    pub fn predicate(
        message: impl Into<String>,
        check: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::Predicate {
            message: message.into(),
            check: Arc::new(check),
        }
    }

    /// Run the check, returning the failure message.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Self::Equal(expected) => {
                if value == expected {
                    Ok(())
                } else {
                    Err(format!("Must be equal to {expected}."))
                }
            }
            Self::OneOf(choices) => {
                if choices.contains(value) {
                    Ok(())
                } else {
                    let text = choices
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    Err(format!("Must be one of: {text}."))
                }
            }
            Self::Range { min, max } => {
                let Some(n) = value.as_f64() else {
                    return Err("Not a valid number.".to_string());
                };
                let too_low = min.is_some_and(|m| n < m);
                let too_high = max.is_some_and(|m| n > m);
                if !too_low && !too_high {
                    return Ok(());
                }
                Err(match (min, max) {
                    (Some(lo), Some(hi)) => format!(
                        "Must be greater than or equal to {lo} and less than or equal to {hi}."
                    ),
                    (Some(lo), None) => format!("Must be greater than or equal to {lo}."),
                    (None, Some(hi)) => format!("Must be less than or equal to {hi}."),
                    (None, None) => return Ok(()),
                })
            }
            Self::Length { min, max } => {
                let Some(len) = value.len() else {
                    return Err("Object has no length.".to_string());
                };
                if let (Some(lo), Some(hi)) = (min, max) {
                    if len < *lo || len > *hi {
                        return Err(format!("Length must be between {lo} and {hi}."));
                    }
                }
                if let Some(lo) = min.filter(|lo| len < *lo) {
                    return Err(format!("Shorter than minimum length {lo}."));
                }
                if let Some(hi) = max.filter(|hi| len > *hi) {
                    return Err(format!("Longer than maximum length {hi}."));
                }
                Ok(())
            }
            Self::Predicate { message, check } => {
                if check(value) {
                    Ok(())
                } else {
                    Err(message.clone())
                }
            }
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal(v) => write!(f, "Equal({})", v.repr()),
            Self::OneOf(choices) => {
                let text = choices.iter().map(Value::repr).collect::<Vec<_>>().join(", ");
                write!(f, "OneOf([{text}])")
            }
            Self::Range { min, max } => write!(f, "Range(min={min:?}, max={max:?})"),
            Self::Length { min, max } => write!(f, "Length(min={min:?}, max={max:?})"),
            Self::Predicate { message, .. } => write!(f, "Predicate({message:?})"),
        }
    }
}

const URL_PATTERN: &str = r"(?i)^(?:[a-z0-9.+-]*)://(?:[^\s:@/]+(?::[^\s:@/]*)?@)?(?:(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}\.?|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}|\[[0-9a-f:.]+\])(?::\d{1,5})?(?:[/?#]\S*)?$";

const EMAIL_PATTERN: &str = r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$";

/// Compile `pattern` once. A pattern that fails to compile matches nothing.
fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("[validate] invalid pattern: {e}");
            None
        }
    })
    .as_ref()
}

pub(crate) fn is_url(s: &str) -> bool {
    static URL: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&URL, URL_PATTERN).is_some_and(|re| re.is_match(s))
}

pub(crate) fn is_email(s: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&EMAIL, EMAIL_PATTERN).is_some_and(|re| re.is_match(s))
}
