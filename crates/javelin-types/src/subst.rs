//! Type-variable substitution.

use std::collections::HashMap;

use crate::sym::TyVarSymbol;
use crate::ty::{ArrayTy, ClassTy, IntersectionTy, MethodTy, SimpleClassTy, Type, WildTy};

pub type Mapping = HashMap<TyVarSymbol, Type>;

/// Applies `mapping` recursively to `ty`. Unmapped type variables are left
/// in place, so an empty mapping is the identity.
pub fn subst(ty: &Type, mapping: &Mapping) -> Type {
    if mapping.is_empty() {
        return ty.clone();
    }
    match ty {
        Type::TyVar(tv) => match mapping.get(&tv.sym) {
            Some(replacement) => replacement.clone(),
            None => ty.clone(),
        },
        Type::Class(c) => Type::Class(ClassTy {
            classes: c
                .classes
                .iter()
                .map(|s| SimpleClassTy {
                    sym: s.sym.clone(),
                    targs: s.targs.iter().map(|t| subst(t, mapping)).collect(),
                    annos: s.annos.clone(),
                })
                .collect(),
        }),
        Type::Array(a) => Type::Array(ArrayTy {
            elem: Box::new(subst(&a.elem, mapping)),
            annos: a.annos.clone(),
        }),
        Type::Wild(w) => Type::Wild(match w {
            WildTy::Unbound { annos } => WildTy::Unbound {
                annos: annos.clone(),
            },
            WildTy::Upper { bound, annos } => WildTy::Upper {
                bound: Box::new(subst(bound, mapping)),
                annos: annos.clone(),
            },
            WildTy::Lower { bound, annos } => WildTy::Lower {
                bound: Box::new(subst(bound, mapping)),
                annos: annos.clone(),
            },
        }),
        Type::Intersection(i) => Type::Intersection(IntersectionTy {
            bounds: i.bounds.iter().map(|b| subst(b, mapping)).collect(),
        }),
        Type::Method(m) => Type::Method(Box::new(MethodTy {
            typarams: m.typarams.clone(),
            return_type: subst(&m.return_type, mapping),
            receiver: m.receiver.as_ref().map(|r| subst(r, mapping)),
            params: m.params.iter().map(|p| subst(p, mapping)).collect(),
            thrown: m.thrown.iter().map(|t| subst(t, mapping)).collect(),
        })),
        Type::Prim(_) | Type::Error(_) | Type::Void | Type::None => ty.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::ClassSymbol;
    use crate::ty::TyVarTy;

    #[test]
    fn empty_mapping_is_identity() {
        let sym = TyVarSymbol::class_owned(ClassSymbol::new("C"), "T");
        let ty = Type::Class(ClassTy {
            classes: vec![SimpleClassTy {
                sym: ClassSymbol::new("java/util/List"),
                targs: vec![Type::TyVar(TyVarTy {
                    sym,
                    annos: Vec::new(),
                })],
                annos: Vec::new(),
            }],
        });
        assert_eq!(subst(&ty, &Mapping::new()), ty);
    }

    #[test]
    fn substitutes_nested_args() {
        let t = TyVarSymbol::class_owned(ClassSymbol::new("java/util/List"), "T");
        let ty = Type::Class(ClassTy {
            classes: vec![SimpleClassTy {
                sym: ClassSymbol::new("java/util/List"),
                targs: vec![Type::TyVar(TyVarTy {
                    sym: t.clone(),
                    annos: Vec::new(),
                })],
                annos: Vec::new(),
            }],
        });
        let mut mapping = Mapping::new();
        mapping.insert(t, Type::string());
        let got = subst(&ty, &mapping);
        match got {
            Type::Class(c) => assert_eq!(c.classes[0].targs, vec![Type::string()]),
            other => panic!("expected class type, got {other:?}"),
        }
    }
}
