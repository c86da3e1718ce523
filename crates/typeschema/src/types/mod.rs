// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type model: descriptors, record/enum/alias definitions, name resolution.

mod builder;
mod descriptor;
mod enums;
mod module;
mod newtype;
mod record;
pub mod typecheck;

pub use builder::{EnumBuilder, RecordBuilder};
pub use descriptor::{ContainerKind, PrimitiveKind, TypeDesc, TypeKey, TypeVar};
pub use enums::EnumDef;
pub use module::{builtin, Module, Namespace};
pub use newtype::{email, url, NewTypeDef};
pub use record::{
    ConstructError, Constructor, DefaultFactory, DefaultValue, FieldDef, RecordDef, RecordShape,
};
