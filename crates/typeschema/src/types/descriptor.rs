// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors: the classified shape of a declared field type.

use crate::compiler::SchemaError;
use crate::types::{EnumDef, NewTypeDef, RecordDef};
use crate::value::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Atomic types with a 1:1 field kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Int,
    Float,
    Str,
    Bool,
    DateTime,
    Date,
    Time,
    TimeDelta,
    Decimal,
    Uuid,
}

impl PrimitiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Bool => "bool",
            Self::DateTime => "datetime",
            Self::Date => "date",
            Self::Time => "time",
            Self::TimeDelta => "timedelta",
            Self::Decimal => "Decimal",
            Self::Uuid => "UUID",
        }
    }
}

/// Builtin generic containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    List,
    Sequence,
    Set,
    FrozenSet,
    /// Fixed arity, one argument per position.
    Tuple,
    /// `Tuple[T, ...]`: homogeneous, variable length.
    VarTuple,
    Mapping,
}

impl ContainerKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::List => "List",
            Self::Sequence => "Sequence",
            Self::Set => "Set",
            Self::FrozenSet => "FrozenSet",
            Self::Tuple | Self::VarTuple => "Tuple",
            Self::Mapping => "Mapping",
        }
    }

    /// Number of type arguments, `None` for fixed-arity tuples.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Self::List | Self::Sequence | Self::Set | Self::FrozenSet | Self::VarTuple => Some(1),
            Self::Mapping => Some(2),
            Self::Tuple => None,
        }
    }
}

static NEXT_TYPEVAR_ID: AtomicU64 = AtomicU64::new(1);

/// A symbolic type placeholder. Two `TypeVar::new("T")` calls yield two
/// distinct variables; identity, not name, decides equality.
#[derive(Clone)]
pub struct TypeVar {
    name: Arc<str>,
    id: u64,
}

impl TypeVar {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            id: NEXT_TYPEVAR_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for TypeVar {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeVar {}

impl Hash for TypeVar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~{}", self.name)
    }
}

/// Key into a base schema's type → field-class table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Any,
    Primitive(PrimitiveKind),
    Container(ContainerKind),
    /// A plain class known by name only.
    Opaque(Arc<str>),
}

/// What shape of data lives in a field.
#[derive(Clone)]
pub enum TypeDesc {
    Any,
    /// The explicit "absent" marker, only meaningful inside a union.
    None,
    Primitive(PrimitiveKind),
    Container {
        kind: ContainerKind,
        args: Vec<TypeDesc>,
    },
    Union(Vec<TypeDesc>),
    Literal(Vec<Value>),
    Final(Option<Box<TypeDesc>>),
    Enum(Arc<EnumDef>),
    NewType(Arc<NewTypeDef>),
    Record(Arc<RecordDef>),
    /// A generic record bound to type arguments, e.g. `Box[int]`.
    Generic {
        origin: Arc<RecordDef>,
        args: Vec<TypeDesc>,
    },
    TypeVar(TypeVar),
    /// A string annotation, resolved by name at compile time.
    ForwardRef(String),
    /// A plain class with no field declarations.
    Opaque(Arc<str>),
}

impl TypeDesc {
    pub fn int() -> Self {
        Self::Primitive(PrimitiveKind::Int)
    }

    pub fn float() -> Self {
        Self::Primitive(PrimitiveKind::Float)
    }

    pub fn str() -> Self {
        Self::Primitive(PrimitiveKind::Str)
    }

    pub fn bool() -> Self {
        Self::Primitive(PrimitiveKind::Bool)
    }

    pub fn datetime() -> Self {
        Self::Primitive(PrimitiveKind::DateTime)
    }

    pub fn date() -> Self {
        Self::Primitive(PrimitiveKind::Date)
    }

    pub fn time() -> Self {
        Self::Primitive(PrimitiveKind::Time)
    }

    pub fn timedelta() -> Self {
        Self::Primitive(PrimitiveKind::TimeDelta)
    }

    pub fn decimal() -> Self {
        Self::Primitive(PrimitiveKind::Decimal)
    }

    pub fn uuid() -> Self {
        Self::Primitive(PrimitiveKind::Uuid)
    }

    /// A container with no type arguments (every argument is `Any`).
    pub fn bare(kind: ContainerKind) -> Self {
        Self::Container {
            kind,
            args: Vec::new(),
        }
    }

    pub fn list(item: Self) -> Self {
        Self::Container {
            kind: ContainerKind::List,
            args: vec![item],
        }
    }

    pub fn sequence(item: Self) -> Self {
        Self::Container {
            kind: ContainerKind::Sequence,
            args: vec![item],
        }
    }

    pub fn set(item: Self) -> Self {
        Self::Container {
            kind: ContainerKind::Set,
            args: vec![item],
        }
    }

    pub fn frozenset(item: Self) -> Self {
        Self::Container {
            kind: ContainerKind::FrozenSet,
            args: vec![item],
        }
    }

    pub fn tuple(items: Vec<Self>) -> Self {
        Self::Container {
            kind: ContainerKind::Tuple,
            args: items,
        }
    }

    /// `Tuple[item, ...]`
    pub fn var_tuple(item: Self) -> Self {
        Self::Container {
            kind: ContainerKind::VarTuple,
            args: vec![item],
        }
    }

    pub fn mapping(key: Self, value: Self) -> Self {
        Self::Container {
            kind: ContainerKind::Mapping,
            args: vec![key, value],
        }
    }

    /// `Optional[inner]`, i.e. `Union[inner, None]`.
    pub fn optional(inner: Self) -> Self {
        Self::Union(vec![inner, Self::None])
    }

    pub fn union(members: Vec<Self>) -> Self {
        Self::Union(members)
    }

    pub fn literal(values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::Literal(values.into_iter().map(Into::into).collect())
    }

    pub fn final_of(inner: Self) -> Self {
        Self::Final(Some(Box::new(inner)))
    }

    /// Bare `Final`: the type is inferred from the field default.
    pub fn final_untyped() -> Self {
        Self::Final(None)
    }

    pub fn record(def: &Arc<RecordDef>) -> Self {
        Self::Record(Arc::clone(def))
    }

    pub fn generic(origin: &Arc<RecordDef>, args: Vec<Self>) -> Self {
        Self::Generic {
            origin: Arc::clone(origin),
            args,
        }
    }

    pub fn enumeration(def: &Arc<EnumDef>) -> Self {
        Self::Enum(Arc::clone(def))
    }

    pub fn newtype(def: &Arc<NewTypeDef>) -> Self {
        Self::NewType(Arc::clone(def))
    }

    pub fn var(tv: &TypeVar) -> Self {
        Self::TypeVar(tv.clone())
    }

    pub fn forward(name: &str) -> Self {
        Self::ForwardRef(name.to_string())
    }

    pub fn opaque(name: &str) -> Self {
        Self::Opaque(Arc::from(name))
    }

    /// True for `None` and for unions with a `None` member, looking through
    /// new-type aliases.
    pub fn is_optional(&self) -> bool {
        match self {
            Self::None => true,
            Self::Union(members) => members.iter().any(Self::is_optional),
            Self::NewType(nt) => nt.supertype().is_optional(),
            _ => false,
        }
    }

    /// The record whose fields this type enumerates, if any.
    pub fn record_origin(&self) -> Option<&Arc<RecordDef>> {
        match self {
            Self::Record(def) | Self::Generic { origin: def, .. } => Some(def),
            _ => None,
        }
    }

    /// Exact-match key for the base-type table.
    pub fn type_key(&self) -> Option<TypeKey> {
        match self {
            Self::Any => Some(TypeKey::Any),
            Self::Primitive(kind) => Some(TypeKey::Primitive(*kind)),
            Self::Opaque(name) => Some(TypeKey::Opaque(Arc::clone(name))),
            _ => None,
        }
    }

    /// Type variables in order of first appearance.
    pub fn free_typevars(&self) -> Vec<TypeVar> {
        fn walk(ty: &TypeDesc, out: &mut Vec<TypeVar>) {
            match ty {
                TypeDesc::TypeVar(tv) => {
                    if !out.contains(tv) {
                        out.push(tv.clone());
                    }
                }
                TypeDesc::Container { args, .. }
                | TypeDesc::Union(args)
                | TypeDesc::Generic { args, .. } => {
                    for arg in args {
                        walk(arg, out);
                    }
                }
                TypeDesc::Final(Some(inner)) => walk(inner, out),
                _ => {}
            }
        }

        let mut out = Vec::new();
        walk(self, &mut out);
        out
    }

    /// Pre-order rewrite. `f` returns `Some(replacement)` to replace a node
    /// (its children are not visited) or `None` to descend into it.
    pub fn try_rewrite<E>(
        &self,
        f: &mut dyn FnMut(&TypeDesc) -> Result<Option<TypeDesc>, E>,
    ) -> Result<TypeDesc, E> {
        if let Some(replaced) = f(self)? {
            return Ok(replaced);
        }
        Ok(match self {
            Self::Container { kind, args } => Self::Container {
                kind: *kind,
                args: rewrite_all(args, f)?,
            },
            Self::Union(members) => Self::Union(rewrite_all(members, f)?),
            Self::Generic { origin, args } => Self::Generic {
                origin: Arc::clone(origin),
                args: rewrite_all(args, f)?,
            },
            Self::Final(Some(inner)) => Self::Final(Some(Box::new(inner.try_rewrite(f)?))),
            other => other.clone(),
        })
    }

    /// Replace type variables found in `lookup`, leaving the others in place.
    pub fn substitute(&self, lookup: &dyn Fn(&TypeVar) -> Option<TypeDesc>) -> TypeDesc {
        let result: Result<TypeDesc, std::convert::Infallible> =
            self.try_rewrite(&mut |ty: &TypeDesc| match ty {
                TypeDesc::TypeVar(tv) => Ok(lookup(tv)),
                _ => Ok(None),
            });
        match result {
            Ok(ty) => ty,
            Err(never) => match never {},
        }
    }

    /// Bind the free type variables of a partially parametrized alias, in
    /// order of first appearance (`Alias = Pair[int, T]; Alias[str]`).
    pub fn parametrize(&self, args: Vec<TypeDesc>) -> Result<TypeDesc, SchemaError> {
        let params = match self {
            Self::Record(def) => {
                let params = def.parameters();
                if params.len() != args.len() {
                    return Err(SchemaError::TypeArity {
                        name: def.name().to_string(),
                        expected: params.len(),
                        found: args.len(),
                    });
                }
                return Ok(Self::Generic {
                    origin: Arc::clone(def),
                    args,
                });
            }
            _ => self.free_typevars(),
        };
        if params.len() != args.len() {
            return Err(SchemaError::TypeArity {
                name: self.to_string(),
                expected: params.len(),
                found: args.len(),
            });
        }
        let bound: Vec<(TypeVar, TypeDesc)> = params.into_iter().zip(args).collect();
        Ok(self.substitute(&|tv| {
            bound
                .iter()
                .find(|(param, _)| param == tv)
                .map(|(_, arg)| arg.clone())
        }))
    }
}

fn rewrite_all<E>(
    args: &[TypeDesc],
    f: &mut dyn FnMut(&TypeDesc) -> Result<Option<TypeDesc>, E>,
) -> Result<Vec<TypeDesc>, E> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        out.push(arg.try_rewrite(&mut *f)?);
    }
    Ok(out)
}

impl PartialEq for TypeDesc {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Any, Self::Any) | (Self::None, Self::None) => true,
            (Self::Primitive(a), Self::Primitive(b)) => a == b,
            (
                Self::Container { kind: k1, args: a1 },
                Self::Container { kind: k2, args: a2 },
            ) => k1 == k2 && a1 == a2,
            (Self::Union(a), Self::Union(b)) => a == b,
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Final(a), Self::Final(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => Arc::ptr_eq(a, b),
            (Self::NewType(a), Self::NewType(b)) => Arc::ptr_eq(a, b),
            (Self::Record(a), Self::Record(b)) => Arc::ptr_eq(a, b),
            (
                Self::Generic {
                    origin: o1,
                    args: a1,
                },
                Self::Generic {
                    origin: o2,
                    args: a2,
                },
            ) => Arc::ptr_eq(o1, o2) && a1 == a2,
            (Self::TypeVar(a), Self::TypeVar(b)) => a == b,
            (Self::ForwardRef(a), Self::ForwardRef(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for TypeDesc {}

impl Hash for TypeDesc {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Any | Self::None => {}
            Self::Primitive(kind) => kind.hash(state),
            Self::Container { kind, args } => {
                kind.hash(state);
                args.hash(state);
            }
            Self::Union(members) => members.hash(state),
            Self::Literal(values) => values.hash(state),
            Self::Final(inner) => inner.hash(state),
            Self::Enum(def) => (Arc::as_ptr(def) as usize).hash(state),
            Self::NewType(def) => (Arc::as_ptr(def) as usize).hash(state),
            Self::Record(def) => (Arc::as_ptr(def) as usize).hash(state),
            Self::Generic { origin, args } => {
                (Arc::as_ptr(origin) as usize).hash(state);
                args.hash(state);
            }
            Self::TypeVar(tv) => tv.hash(state),
            Self::ForwardRef(name) => name.hash(state),
            Self::Opaque(name) => name.hash(state),
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(items: &[TypeDesc]) -> String {
            items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        }

        match self {
            Self::Any => f.write_str("Any"),
            Self::None => f.write_str("None"),
            Self::Primitive(kind) => f.write_str(kind.name()),
            Self::Container { kind, args } if args.is_empty() => f.write_str(kind.name()),
            Self::Container {
                kind: ContainerKind::VarTuple,
                args,
            } => write!(f, "Tuple[{}, ...]", join(args)),
            Self::Container { kind, args } => write!(f, "{}[{}]", kind.name(), join(args)),
            Self::Union(members) => write!(f, "Union[{}]", join(members)),
            Self::Literal(values) => {
                let body = values.iter().map(Value::repr).collect::<Vec<_>>().join(", ");
                write!(f, "Literal[{body}]")
            }
            Self::Final(None) => f.write_str("Final"),
            Self::Final(Some(inner)) => write!(f, "Final[{inner}]"),
            Self::Enum(def) => f.write_str(def.name()),
            Self::NewType(def) => f.write_str(def.name()),
            Self::Record(def) => f.write_str(def.name()),
            Self::Generic { origin, args } => write!(f, "{}[{}]", origin.name(), join(args)),
            Self::TypeVar(tv) => write!(f, "~{}", tv.name()),
            Self::ForwardRef(name) => write!(f, "'{name}'"),
            Self::Opaque(name) => f.write_str(name),
        }
    }
}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDesc({self})")
    }
}

impl From<PrimitiveKind> for TypeDesc {
    fn from(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }
}

impl From<&Arc<RecordDef>> for TypeDesc {
    fn from(def: &Arc<RecordDef>) -> Self {
        Self::Record(Arc::clone(def))
    }
}

impl From<Arc<RecordDef>> for TypeDesc {
    fn from(def: Arc<RecordDef>) -> Self {
        Self::Record(def)
    }
}

impl From<&Arc<EnumDef>> for TypeDesc {
    fn from(def: &Arc<EnumDef>) -> Self {
        Self::Enum(Arc::clone(def))
    }
}

impl From<&Arc<NewTypeDef>> for TypeDesc {
    fn from(def: &Arc<NewTypeDef>) -> Self {
        Self::NewType(Arc::clone(def))
    }
}

impl From<&TypeVar> for TypeDesc {
    fn from(tv: &TypeVar) -> Self {
        Self::TypeVar(tv.clone())
    }
}

impl From<&TypeDesc> for TypeDesc {
    fn from(ty: &TypeDesc) -> Self {
        ty.clone()
    }
}
