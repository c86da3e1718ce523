// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-variable binding along an inheritance chain.
//!
//! Every ancestor that takes type parameters gets one [`Future`] per
//! parameter. Ancestors are walked from the most basic to the most derived
//! one; a parametrized base either sets the parent's futures directly
//! (concrete argument) or links them to the child's own parameters, which
//! are settled once the whole chain has been seen.

use super::{Future, SchemaError};
use crate::types::{builtin, FieldDef, Namespace, RecordDef, TypeDesc, TypeVar};
use std::fmt;
use std::sync::Arc;

type Binding = Arc<Future<TypeDesc>>;

/// Per-ancestor map from declared type parameters to their bound types.
#[derive(Default)]
pub struct TypeVarBindings {
    classes: Vec<(Arc<RecordDef>, Vec<(TypeVar, Binding)>)>,
}

impl TypeVarBindings {
    /// Parameters of `record` with their futures, empty if it takes none.
    pub fn for_class(&self, record: &Arc<RecordDef>) -> &[(TypeVar, Binding)] {
        self.classes
            .iter()
            .find(|(def, _)| Arc::ptr_eq(def, record))
            .map_or(&[][..], |(_, params)| params.as_slice())
    }

    /// The type bound to `tv` as a parameter of `record`, if set.
    pub fn get(&self, record: &Arc<RecordDef>, tv: &TypeVar) -> Option<TypeDesc> {
        self.for_class(record)
            .iter()
            .find(|(param, _)| param == tv)
            .and_then(|(_, binding)| binding.result().ok().cloned())
    }

    /// The type bound to `tv` in any ancestor.
    pub fn find(&self, tv: &TypeVar) -> Option<TypeDesc> {
        self.classes
            .iter()
            .flat_map(|(_, params)| params.iter())
            .find(|(param, binding)| param == tv && binding.done())
            .and_then(|(_, binding)| binding.result().ok().cloned())
    }

    pub fn is_empty(&self) -> bool {
        self.classes.iter().all(|(_, params)| params.is_empty())
    }

    fn ensure(&mut self, record: &Arc<RecordDef>) -> Vec<(TypeVar, Binding)> {
        if let Some((_, params)) = self.classes.iter().find(|(def, _)| Arc::ptr_eq(def, record)) {
            return params.clone();
        }
        let params: Vec<(TypeVar, Binding)> = record
            .parameters()
            .into_iter()
            .map(|tv| (tv, Arc::new(Future::new())))
            .collect();
        self.classes.push((Arc::clone(record), params.clone()));
        params
    }
}

impl fmt::Debug for TypeVarBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (record, params) in &self.classes {
            for (tv, binding) in params {
                map.entry(&format_args!("{}.{}", record.name(), tv.name()), binding);
            }
        }
        map.finish()
    }
}

/// A parent parameter waiting on the child's parameters.
struct Link {
    target: Binding,
    template: TypeDesc,
    scope: Arc<RecordDef>,
}

/// Bind the type parameters of every ancestor of `ty`, a record or a
/// parametrized generic record.
pub fn resolve_typevars(ty: &TypeDesc, locals: &Namespace) -> Result<TypeVarBindings, SchemaError> {
    let mut bindings = TypeVarBindings::default();
    let Some(origin) = ty.record_origin() else {
        return Ok(bindings);
    };

    let mut links = Vec::new();
    for ancestor in origin.ancestors().iter().rev() {
        bindings.ensure(ancestor);
        for base in ancestor.bases() {
            let TypeDesc::Generic { origin: parent, args } = base else {
                continue;
            };
            let params = bindings.ensure(parent);
            check_arity(parent, &params, args)?;
            for ((_, target), arg) in params.iter().zip(args) {
                let arg = resolve_forward_refs(arg, ancestor, origin, locals)?;
                if arg.free_typevars().is_empty() {
                    bind(target, arg);
                } else {
                    links.push(Link {
                        target: Arc::clone(target),
                        template: arg,
                        scope: Arc::clone(ancestor),
                    });
                }
            }
        }
    }

    if let TypeDesc::Generic { args, .. } = ty {
        let params = bindings.ensure(origin);
        check_arity(origin, &params, args)?;
        for ((_, target), arg) in params.iter().zip(args) {
            let arg = resolve_forward_refs(arg, origin, origin, locals)?;
            if arg.free_typevars().is_empty() {
                bind(target, arg);
            }
        }
    }

    settle(&bindings, links);
    log::debug!("[resolver] {ty}: {bindings:?}");
    Ok(bindings)
}

fn check_arity(
    record: &RecordDef,
    params: &[(TypeVar, Binding)],
    args: &[TypeDesc],
) -> Result<(), SchemaError> {
    if params.len() == args.len() {
        Ok(())
    } else {
        Err(SchemaError::TypeArity {
            name: record.name().to_string(),
            expected: params.len(),
            found: args.len(),
        })
    }
}

/// First binding wins; a diamond reaching the same parameter twice keeps it.
fn bind(target: &Binding, ty: TypeDesc) {
    if let Ok(existing) = target.result() {
        if existing != &ty {
            log::debug!("[resolver] keeping {existing}, ignoring {ty}");
        }
        return;
    }
    let _ = target.set_result(ty);
}

/// Propagate child bindings into linked parent parameters until nothing
/// changes. Links still open afterwards leave their parameter unbound.
fn settle(bindings: &TypeVarBindings, mut links: Vec<Link>) {
    loop {
        let before = links.len();
        let mut open = Vec::with_capacity(before);
        for link in links {
            let ty = link.template.substitute(&|tv| bindings.get(&link.scope, tv));
            if ty.free_typevars().is_empty() {
                bind(&link.target, ty);
            } else {
                open.push(link);
            }
        }
        links = open;
        if links.is_empty() || links.len() == before {
            break;
        }
    }
}

/// Resolve a name used in a forward reference: caller locals, then the
/// compiled record and the declaring record by name, then the declaring
/// record's module, then builtins.
pub(crate) fn lookup_name(
    name: &str,
    declaring: &Arc<RecordDef>,
    record: &Arc<RecordDef>,
    locals: &Namespace,
) -> Option<TypeDesc> {
    if let Some(ty) = locals.get(name) {
        return Some(ty.clone());
    }
    if name == record.name() {
        return Some(TypeDesc::record(record));
    }
    if name == declaring.name() {
        return Some(TypeDesc::record(declaring));
    }
    declaring
        .module()
        .and_then(|module| module.lookup(name))
        .or_else(|| builtin(name))
}

/// Replace every forward reference inside `ty`.
pub(crate) fn resolve_forward_refs(
    ty: &TypeDesc,
    declaring: &Arc<RecordDef>,
    record: &Arc<RecordDef>,
    locals: &Namespace,
) -> Result<TypeDesc, SchemaError> {
    ty.try_rewrite(&mut |node: &TypeDesc| match node {
        TypeDesc::ForwardRef(name) => lookup_name(name, declaring, record, locals)
            .map(Some)
            .ok_or_else(|| SchemaError::UnresolvedForwardRef {
                name: name.clone(),
                record: record.name().to_string(),
            }),
        _ => Ok(None),
    })
}

/// Fields of `record` in declaration order with forward references resolved
/// and type variables replaced by their bindings.
///
/// Fails with [`SchemaError::UnboundTypeVar`] naming every field whose type
/// still mentions a type variable.
pub fn resolved_fields(
    record: &Arc<RecordDef>,
    bindings: &TypeVarBindings,
    locals: &Namespace,
) -> Result<Vec<FieldDef>, SchemaError> {
    let mut slots: Vec<(FieldDef, bool)> = Vec::new();
    for ancestor in record.ancestors().iter().rev() {
        for field in ancestor.own_fields() {
            let ty = resolve_forward_refs(field.ty(), ancestor, record, locals)?;
            let ty = ty.substitute(&|tv| bindings.get(ancestor, tv));
            let unbound = !ty.free_typevars().is_empty();
            let resolved = (field.with_type(ty), unbound);
            match slots.iter_mut().find(|(f, _)| f.name() == field.name()) {
                Some(slot) => *slot = resolved,
                None => slots.push(resolved),
            }
        }
    }
    slots.retain(|(field, _)| !field.is_class_var());

    let unbound: Vec<String> = slots
        .iter()
        .filter(|(_, unbound)| *unbound)
        .map(|(field, _)| field.name().to_string())
        .collect();
    if !unbound.is_empty() {
        return Err(SchemaError::UnboundTypeVar {
            record: record.name().to_string(),
            fields: unbound,
        });
    }
    Ok(slots.into_iter().map(|(field, _)| field).collect())
}
