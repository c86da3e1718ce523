// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type-compatibility check used by union fields.

use crate::types::{ContainerKind, PrimitiveKind, TypeDesc};
use crate::value::Value;

/// Check that `value` is an instance of `ty`.
///
/// Ints are accepted where floats are expected; bools are not ints.
/// Records match by ancestry, generic arguments are not checked.
pub fn conforms(value: &Value, ty: &TypeDesc) -> bool {
    match ty {
        TypeDesc::Any | TypeDesc::Opaque(_) | TypeDesc::TypeVar(_) => true,
        TypeDesc::None => value.is_null(),
        TypeDesc::Primitive(kind) => primitive(value, *kind),
        TypeDesc::Container { kind, args } => container(value, *kind, args),
        TypeDesc::Union(members) => members.iter().any(|m| conforms(value, m)),
        TypeDesc::Literal(values) => values.contains(value),
        TypeDesc::Final(None) => true,
        TypeDesc::Final(Some(inner)) => conforms(value, inner),
        TypeDesc::Enum(def) => value.as_enum().is_some_and(|m| m.belongs_to(def)),
        TypeDesc::NewType(def) => conforms(value, def.supertype()),
        TypeDesc::Record(def) | TypeDesc::Generic { origin: def, .. } => {
            value.as_record().is_some_and(|r| r.is_instance_of(def))
        }
        TypeDesc::ForwardRef(_) => false,
    }
}

fn primitive(value: &Value, kind: PrimitiveKind) -> bool {
    matches!(
        (kind, value),
        (PrimitiveKind::Int, Value::Int(_))
            | (PrimitiveKind::Float, Value::Float(_) | Value::Int(_))
            | (PrimitiveKind::Str, Value::Str(_))
            | (PrimitiveKind::Bool, Value::Bool(_))
            | (PrimitiveKind::DateTime, Value::DateTime(_))
            | (PrimitiveKind::Date, Value::Date(_))
            | (PrimitiveKind::Time, Value::Time(_))
            | (PrimitiveKind::TimeDelta, Value::Duration(_))
            | (PrimitiveKind::Decimal, Value::Decimal(_))
            | (PrimitiveKind::Uuid, Value::Uuid(_))
    )
}

fn arg(args: &[TypeDesc], i: usize) -> &TypeDesc {
    args.get(i).unwrap_or(&TypeDesc::Any)
}

fn all(items: &[Value], ty: &TypeDesc) -> bool {
    items.iter().all(|v| conforms(v, ty))
}

fn container(value: &Value, kind: ContainerKind, args: &[TypeDesc]) -> bool {
    match (kind, value) {
        (ContainerKind::List, Value::List(items))
        | (ContainerKind::Set, Value::Set(items))
        | (ContainerKind::FrozenSet, Value::FrozenSet(items)) => all(items, arg(args, 0)),
        (ContainerKind::Sequence | ContainerKind::VarTuple, Value::List(items) | Value::Tuple(items)) => {
            all(items, arg(args, 0))
        }
        (ContainerKind::Tuple, Value::Tuple(items)) if args.is_empty() => {
            all(items, &TypeDesc::Any)
        }
        (ContainerKind::Tuple, Value::Tuple(items)) => {
            items.len() == args.len() && items.iter().zip(args).all(|(v, t)| conforms(v, t))
        }
        (ContainerKind::Mapping, Value::Map(entries)) => entries
            .iter()
            .all(|(k, v)| conforms(k, arg(args, 0)) && conforms(v, arg(args, 1))),
        _ => false,
    }
}
