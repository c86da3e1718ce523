// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # typeschema - type-directed load/dump schemas
//!
//! Declare record types once, with ordinary type descriptors, and derive a
//! schema that validates and loads JSON into records and dumps records back
//! to JSON. Generics, forward references, unions, literals, new-type
//! aliases, and cyclic record graphs are supported.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use serde_json::json;
//! use typeschema::types::{RecordBuilder, TypeDesc};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let city = RecordBuilder::new("City")
//!     .field("name", TypeDesc::str())
//!     .field("population", TypeDesc::optional(TypeDesc::int()))
//!     .with_schema()
//!     .build();
//!
//! let schema = city.schema()?;
//! let paris = schema.load(&json!({"name": "Paris", "population": 2_100_000}))?;
//! assert_eq!(schema.dump(&paris)?, json!({"name": "Paris", "population": 2_100_000}));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +-------------------------------------------------------------------+
//! |  types      RecordDef / TypeDesc / EnumDef / NewTypeDef / Module  |
//! +-------------------------------------------------------------------+
//! |  compiler   class_schema -> resolver -> FieldCompiler -> cache    |
//! +-------------------------------------------------------------------+
//! |  schema     Schema (load, dump, hooks, options) + BaseSchema      |
//! +-------------------------------------------------------------------+
//! |  fields     Field nodes: scalars, collections, unions, nested     |
//! +-------------------------------------------------------------------+
//! |  value      Value / Record / Decimal, JSON bridging               |
//! +-------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RecordDef`] | A record type: ordered typed fields, bases, hooks |
//! | [`TypeDesc`] | The declared type of a field |
//! | [`Schema`] | Compiled load/dump schema for one record type |
//! | [`BaseSchema`] | Pluggable parent: type table, hooks, options |
//! | [`Field`] | Runtime (de)serializer node |

/// Schema compiler: `class_schema`, `field_for_schema`, TypeVar resolution, cache.
pub mod compiler;
/// Constants and cache configuration.
pub mod config;
/// Runtime field nodes, validators, and load/dump errors.
pub mod fields;
/// Thread-safe compute-once attribute with recursion detection.
pub mod lazy;
/// Compiled schemas and base schemas.
pub mod schema;
/// Type model: descriptors, records, enums, aliases, namespaces.
pub mod types;
/// In-memory values.
pub mod value;

pub use compiler::{
    add_schema, class_schema, class_schema_in, field_for_schema, CompileWarning, SchemaError,
};
pub use fields::{DumpError, Field, FieldMetadata, LoadError, ValidationError, Validator};
pub use schema::{BaseSchema, Hook, Schema, SchemaOptions, Unknown};
pub use types::{
    EnumBuilder, EnumDef, Module, Namespace, NewTypeDef, RecordBuilder, RecordDef, TypeDesc,
    TypeVar,
};
pub use value::{Record, Value, ValueMap};
