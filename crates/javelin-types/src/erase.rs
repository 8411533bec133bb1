//! Type erasure.

use crate::sym::TyVarSymbol;
use crate::ty::{ArrayTy, ClassTy, MethodTy, Type, WildTy};

/// Erases `ty`: class types drop their type arguments (collapsing the
/// enclosing chain to the leaf), type variables erase to the erasure of
/// their first bound, arrays erase componentwise, primitives are fixed
/// points.
///
/// `first_bound` supplies the leading declared bound of a type variable;
/// returning `None` falls back to `Object`.
pub fn erase(ty: &Type, first_bound: &dyn Fn(&TyVarSymbol) -> Option<Type>) -> Type {
    match ty {
        Type::Class(c) => Type::Class(ClassTy::non_generic(c.leaf_sym().clone())),
        Type::Array(a) => Type::Array(ArrayTy {
            elem: Box::new(erase(&a.elem, first_bound)),
            annos: a.annos.clone(),
        }),
        Type::TyVar(tv) => {
            let bound = first_bound(&tv.sym).unwrap_or_else(Type::object);
            erase(&bound, first_bound)
        }
        Type::Wild(w) => match w {
            WildTy::Unbound { .. } => Type::object(),
            WildTy::Upper { bound, .. } | WildTy::Lower { bound, .. } => {
                erase(bound, first_bound)
            }
        },
        Type::Intersection(i) => erase(&i.first_bound(), first_bound),
        Type::Method(m) => Type::Method(Box::new(MethodTy {
            typarams: Vec::new(),
            return_type: erase(&m.return_type, first_bound),
            receiver: m.receiver.as_ref().map(|r| erase(r, first_bound)),
            params: m.params.iter().map(|p| erase(p, first_bound)).collect(),
            thrown: m.thrown.iter().map(|t| erase(t, first_bound)).collect(),
        })),
        Type::Prim(_) | Type::Error(_) | Type::Void | Type::None => ty.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::{ClassSymbol, TyVarSymbol};
    use crate::ty::{PrimKind, SimpleClassTy, TyVarTy};

    fn no_bounds(_: &TyVarSymbol) -> Option<Type> {
        None
    }

    #[test]
    fn erases_type_args() {
        let list = ClassSymbol::new("java/util/List");
        let ty = Type::Class(ClassTy {
            classes: vec![SimpleClassTy {
                sym: list.clone(),
                targs: vec![Type::string()],
                annos: Vec::new(),
            }],
        });
        assert_eq!(
            erase(&ty, &no_bounds),
            Type::Class(ClassTy::non_generic(list))
        );
    }

    #[test]
    fn tyvar_erases_to_object_without_bounds() {
        let sym = TyVarSymbol::class_owned(ClassSymbol::new("C"), "T");
        let ty = Type::TyVar(TyVarTy {
            sym,
            annos: Vec::new(),
        });
        assert_eq!(erase(&ty, &no_bounds), Type::object());
    }

    #[test]
    fn erasure_is_idempotent() {
        let ty = Type::Array(ArrayTy {
            elem: Box::new(Type::prim(PrimKind::Int)),
            annos: Vec::new(),
        });
        let once = erase(&ty, &no_bounds);
        assert_eq!(erase(&once, &no_bounds), once);
    }
}
