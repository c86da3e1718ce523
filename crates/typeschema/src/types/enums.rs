// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enumerations: closed sets of named constants.

use crate::value::{EnumMember, Value};
use std::fmt;
use std::sync::Arc;

/// An enumeration type.
pub struct EnumDef {
    name: String,
    members: Vec<(String, Value)>,
}

impl EnumDef {
    pub(crate) fn new(name: String, members: Vec<(String, Value)>) -> Self {
        Self { name, members }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[(String, Value)] {
        &self.members
    }

    /// Look a member up by name.
    pub fn member(self: &Arc<Self>, name: &str) -> Option<EnumMember> {
        let index = self.members.iter().position(|(n, _)| n == name)?;
        Some(EnumMember::new(Arc::clone(self), index))
    }

    /// Look a member up by value.
    pub fn by_value(self: &Arc<Self>, value: &Value) -> Option<EnumMember> {
        let index = self.members.iter().position(|(_, v)| v == value)?;
        Some(EnumMember::new(Arc::clone(self), index))
    }

    pub(crate) fn names(&self) -> String {
        self.members
            .iter()
            .map(|(n, _)| n.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn values(&self) -> String {
        self.members
            .iter()
            .map(|(_, v)| v.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Debug for EnumDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<enum {}>", self.name)
    }
}
