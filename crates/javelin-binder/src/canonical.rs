//! Canonicalization.
//!
//! A member type must be named through the class that declares it. Imports
//! that reach a nested type through an inheriting qualifier are diagnosed
//! (but still resolve), and bound types are rewritten so every member
//! segment hangs off its declaring class with the inherited instantiation
//! substituted in.

use std::rc::Rc;

use javelin_types::{
    erase, subst, ArrayTy, ClassSymbol, ClassTy, IntersectionTy, Mapping, MethodInfo, MethodTy,
    SimpleClassTy, TyVarOwner, TyVarSymbol, Type, TypeView, WildTy,
};

use crate::diag::{DiagSink, ErrorKind};
use crate::env::Env;
use crate::import::UnitScopes;
use crate::lookup::{LookupKey, Scope};
use crate::preprocess::PreUnit;
use crate::resolve::{resolve_member, Origin};

/// Validates single-type imports against the canonical-name rule.
pub(crate) fn check_imports(
    units: &[PreUnit],
    unit_scopes: &[Rc<UnitScopes>],
    header_env: &dyn Env<dyn javelin_types::HeaderView>,
    diags: &DiagSink,
) {
    for (unit, scopes) in units.iter().zip(unit_scopes) {
        let origin = Origin {
            package: unit.package.clone(),
            class: None,
        };
        for import in &unit.imports {
            if import.wildcard {
                continue;
            }
            let Some(hit) = scopes
                .tli_scope
                .lookup(&LookupKey::new(import.name.clone()))
            else {
                continue;
            };
            let mut sym = hit.sym;
            for ident in hit.remaining {
                let Some(child) =
                    resolve_member(header_env, &origin, &sym, ident.as_str())
                else {
                    // A trailing member that is not a type can still be a
                    // legal static member import.
                    break;
                };
                if child != sym.nested(ident.as_str()) {
                    let owner = child.binary_name();
                    let owner = &owner[..owner.rfind('$').unwrap_or(owner.len())];
                    diags.error(
                        unit.file,
                        ident.pos,
                        ErrorKind::NonCanonicalImport,
                        format!(
                            "non-canonical import of {}; {} is declared in {}",
                            ident.as_str(),
                            ident.as_str(),
                            ClassSymbol::new(owner).dotted(),
                        ),
                    );
                }
                sym = child;
            }
        }
    }
}

/// Rewrites `ty` so member segments are anchored on their declaring class.
pub(crate) fn canonicalize_type(env: &dyn Env<dyn TypeView>, ty: &Type) -> Type {
    match ty {
        Type::Class(class) => Type::Class(canonicalize_class_ty(env, class)),
        Type::Array(array) => Type::Array(ArrayTy {
            elem: Box::new(canonicalize_type(env, &array.elem)),
            annos: array.annos.clone(),
        }),
        Type::Wild(wild) => Type::Wild(match wild {
            WildTy::Unbound { annos } => WildTy::Unbound {
                annos: annos.clone(),
            },
            WildTy::Upper { bound, annos } => WildTy::Upper {
                bound: Box::new(canonicalize_type(env, bound)),
                annos: annos.clone(),
            },
            WildTy::Lower { bound, annos } => WildTy::Lower {
                bound: Box::new(canonicalize_type(env, bound)),
                annos: annos.clone(),
            },
        }),
        Type::Intersection(i) => Type::Intersection(IntersectionTy {
            bounds: i.bounds.iter().map(|b| canonicalize_type(env, b)).collect(),
        }),
        Type::Method(m) => Type::Method(Box::new(MethodTy {
            typarams: m.typarams.clone(),
            return_type: canonicalize_type(env, &m.return_type),
            receiver: m.receiver.as_ref().map(|r| canonicalize_type(env, r)),
            params: m.params.iter().map(|p| canonicalize_type(env, p)).collect(),
            thrown: m.thrown.iter().map(|t| canonicalize_type(env, t)).collect(),
        })),
        _ => ty.clone(),
    }
}

fn canonicalize_class_ty(env: &dyn Env<dyn TypeView>, class: &ClassTy) -> ClassTy {
    let mut chain: Vec<SimpleClassTy> = Vec::with_capacity(class.classes.len());
    for (idx, segment) in class.classes.iter().enumerate() {
        let canon_segment = SimpleClassTy {
            sym: segment.sym.clone(),
            targs: segment
                .targs
                .iter()
                .map(|t| canonicalize_type(env, t))
                .collect(),
            annos: segment.annos.clone(),
        };
        if idx == 0 {
            chain.push(canon_segment);
            continue;
        }
        // The member segment's symbol names its declaring class; re-anchor
        // when the qualifier chain reaches it only through inheritance.
        let declarer = owner_of(&segment.sym);
        let base = chain.last().expect("non-empty chain").sym.clone();
        if declarer.as_ref() != Some(&base) {
            if let Some(declarer) = declarer {
                let base_ty = ClassTy {
                    classes: chain.clone(),
                };
                if let Some(instantiation) = as_super(env, &base_ty, &declarer) {
                    chain = instantiation.classes;
                }
            }
        }
        chain.push(canon_segment);
    }
    ClassTy { classes: chain }
}

fn owner_of(sym: &ClassSymbol) -> Option<ClassSymbol> {
    sym.binary_name()
        .rfind('$')
        .map(|idx| ClassSymbol::new(&sym.binary_name()[..idx]))
}

/// The instantiation of `target` as a supertype of `ty`, with all
/// intermediate substitutions composed. A raw instantiation erases.
pub fn as_super(env: &dyn Env<dyn TypeView>, ty: &ClassTy, target: &ClassSymbol) -> Option<ClassTy> {
    let mut seen = std::collections::HashSet::new();
    as_super_inner(env, ty, target, &mut seen)
}

fn as_super_inner(
    env: &dyn Env<dyn TypeView>,
    ty: &ClassTy,
    target: &ClassSymbol,
    seen: &mut std::collections::HashSet<ClassSymbol>,
) -> Option<ClassTy> {
    if ty.leaf_sym() == target {
        return Some(ty.clone());
    }
    // Guard against supertype cycles the hierarchy phase could not break
    // (a corrupt classpath).
    if !seen.insert(ty.leaf_sym().clone()) {
        return None;
    }
    let view = env.get(ty.leaf_sym())?;
    let raw = ty.is_raw() && !view.type_parameters().is_empty();
    let mapping: Mapping = view
        .type_parameters()
        .iter()
        .map(|(sym, _)| sym.clone())
        .zip(ty.leaf().targs.iter().cloned())
        .collect();

    let supers = view
        .superclass_type()
        .into_iter()
        .chain(view.interface_types().iter())
        .cloned()
        .collect::<Vec<_>>();
    for super_ty in supers {
        let Type::Class(super_class) = super_ty else {
            continue;
        };
        let instantiated = if raw {
            ClassTy::non_generic(super_class.leaf_sym().clone())
        } else {
            match subst(&Type::Class(super_class), &mapping) {
                Type::Class(c) => c,
                _ => continue,
            }
        };
        if let Some(found) = as_super_inner(env, &instantiated, target, seen) {
            return Some(found);
        }
    }
    None
}

/// The type of `method` viewed as a member of the instantiation `ty`:
/// substitutes the declaring class's type parameters; a raw instantiation
/// erases instead.
pub fn as_member_of(env: &dyn Env<dyn TypeView>, ty: &ClassTy, method: &MethodInfo) -> MethodTy {
    let method_ty = method.as_method_ty();
    let owner = &method.sym.owner;
    let Some(instantiation) = as_super(env, ty, owner) else {
        return method_ty;
    };
    let Some(owner_view) = env.get(owner) else {
        return method_ty;
    };
    let typarams = owner_view.type_parameters();
    if typarams.is_empty() {
        return method_ty;
    }
    if instantiation.leaf().targs.is_empty() {
        // Raw use erases the member's type.
        let first_bound = bound_lookup(env);
        return MethodTy {
            typarams: Vec::new(),
            return_type: erase(&method_ty.return_type, &first_bound),
            receiver: method_ty.receiver.as_ref().map(|r| erase(r, &first_bound)),
            params: method_ty.params.iter().map(|p| erase(p, &first_bound)).collect(),
            thrown: method_ty.thrown.iter().map(|t| erase(t, &first_bound)).collect(),
        };
    }
    let mapping: Mapping = typarams
        .iter()
        .map(|(sym, _)| sym.clone())
        .zip(instantiation.leaf().targs.iter().cloned())
        .collect();
    MethodTy {
        typarams: method_ty.typarams.clone(),
        return_type: subst(&method_ty.return_type, &mapping),
        receiver: method_ty.receiver.as_ref().map(|r| subst(r, &mapping)),
        params: method_ty.params.iter().map(|p| subst(p, &mapping)).collect(),
        thrown: method_ty.thrown.iter().map(|t| subst(t, &mapping)).collect(),
    }
}

/// Looks up the leading declared bound of a type variable through the
/// environment, for erasure.
pub(crate) fn bound_lookup<'e>(
    env: &'e dyn Env<dyn TypeView>,
) -> impl Fn(&TyVarSymbol) -> Option<Type> + 'e {
    move |sym: &TyVarSymbol| {
        let owner_class = match &sym.owner {
            TyVarOwner::Class(c) => c.clone(),
            TyVarOwner::Method(m) => m.owner.clone(),
        };
        let view = env.get(&owner_class)?;
        let info = match &sym.owner {
            TyVarOwner::Class(_) => view
                .type_parameters()
                .iter()
                .find(|(s, _)| s == sym)
                .map(|(_, info)| info.clone()),
            TyVarOwner::Method(m) => view
                .methods()
                .iter()
                .find(|method| &method.sym == m)
                .and_then(|method| {
                    method
                        .typarams
                        .iter()
                        .find(|(s, _)| s == sym)
                        .map(|(_, info)| info.clone())
                }),
        }?;
        Some(info.upper_bound.first_bound())
    }
}
