//! Constant arithmetic: numeric promotion, compile-time coercion, and the
//! operator table.
//!
//! Pure value-level machinery; the tree-walking evaluator lives with the
//! constant phase. Floating-point work uses Rust's IEEE-754 semantics
//! directly, which are already strict (no extended-precision
//! intermediates).

use javelin_syntax::{BinOp, UnOp};
use javelin_types::{Const, PrimKind};

/// How a constant operation fails.
///
/// `Operand` is a diagnostic (mismatched operand types); `NonConst` quietly
/// makes the surrounding initializer non-constant (integer division by
/// zero, reference casts, and the like).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpErr {
    Operand,
    NonConst,
}

/// Unary numeric promotion: `byte`, `short`, and `char` promote to `int`.
pub(crate) fn unary_promote(value: Const) -> Const {
    match value {
        Const::Byte(v) => Const::Int(v as i32),
        Const::Short(v) => Const::Int(v as i32),
        Const::Char(v) => Const::Int(v as i32),
        other => other,
    }
}

pub(crate) fn apply_unary(op: UnOp, value: Const) -> Result<Const, OpErr> {
    match op {
        UnOp::Not => match value {
            Const::Boolean(v) => Ok(Const::Boolean(!v)),
            _ => Err(OpErr::Operand),
        },
        UnOp::BitNot => match unary_promote(value) {
            Const::Int(v) => Ok(Const::Int(!v)),
            Const::Long(v) => Ok(Const::Long(!v)),
            _ => Err(OpErr::Operand),
        },
        UnOp::Plus => match unary_promote(value) {
            v @ (Const::Int(_) | Const::Long(_) | Const::Float(_) | Const::Double(_)) => Ok(v),
            _ => Err(OpErr::Operand),
        },
        UnOp::Neg => match unary_promote(value) {
            Const::Int(v) => Ok(Const::Int(v.wrapping_neg())),
            Const::Long(v) => Ok(Const::Long(v.wrapping_neg())),
            Const::Float(v) => Ok(Const::Float(-v)),
            Const::Double(v) => Ok(Const::Double(-v)),
            _ => Err(OpErr::Operand),
        },
    }
}

pub(crate) fn apply_binary(op: BinOp, lhs: Const, rhs: Const) -> Result<Const, OpErr> {
    match op {
        BinOp::AndAnd => logical(lhs, rhs, |a, b| a && b),
        BinOp::OrOr => logical(lhs, rhs, |a, b| a || b),
        BinOp::Add => {
            if matches!(lhs, Const::String(_)) || matches!(rhs, Const::String(_)) {
                let a = lhs.to_concat_string().ok_or(OpErr::Operand)?;
                let b = rhs.to_concat_string().ok_or(OpErr::Operand)?;
                return Ok(Const::String(a + &b));
            }
            arithmetic(op, lhs, rhs)
        }
        BinOp::Sub | BinOp::Mult | BinOp::Div | BinOp::Mod => arithmetic(op, lhs, rhs),
        BinOp::Shl | BinOp::Shr | BinOp::UShr => shift(op, lhs, rhs),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => comparison(op, lhs, rhs),
        BinOp::Eq | BinOp::Ne => equality(op, lhs, rhs),
        BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor => bitwise(op, lhs, rhs),
    }
}

fn logical(lhs: Const, rhs: Const, f: impl Fn(bool, bool) -> bool) -> Result<Const, OpErr> {
    match (lhs, rhs) {
        (Const::Boolean(a), Const::Boolean(b)) => Ok(Const::Boolean(f(a, b))),
        _ => Err(OpErr::Operand),
    }
}

fn arithmetic(op: BinOp, lhs: Const, rhs: Const) -> Result<Const, OpErr> {
    match binary_promote(lhs, rhs)? {
        Promoted::Int(a, b) => {
            let out = match op {
                BinOp::Add => a.wrapping_add(b),
                BinOp::Sub => a.wrapping_sub(b),
                BinOp::Mult => a.wrapping_mul(b),
                BinOp::Div if b == 0 => return Err(OpErr::NonConst),
                BinOp::Div => a.wrapping_div(b),
                BinOp::Mod if b == 0 => return Err(OpErr::NonConst),
                BinOp::Mod => a.wrapping_rem(b),
                _ => return Err(OpErr::Operand),
            };
            Ok(Const::Int(out))
        }
        Promoted::Long(a, b) => {
            let out = match op {
                BinOp::Add => a.wrapping_add(b),
                BinOp::Sub => a.wrapping_sub(b),
                BinOp::Mult => a.wrapping_mul(b),
                BinOp::Div if b == 0 => return Err(OpErr::NonConst),
                BinOp::Div => a.wrapping_div(b),
                BinOp::Mod if b == 0 => return Err(OpErr::NonConst),
                BinOp::Mod => a.wrapping_rem(b),
                _ => return Err(OpErr::Operand),
            };
            Ok(Const::Long(out))
        }
        Promoted::Float(a, b) => {
            let out = match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mult => a * b,
                BinOp::Div => a / b,
                BinOp::Mod => a % b,
                _ => return Err(OpErr::Operand),
            };
            Ok(Const::Float(out))
        }
        Promoted::Double(a, b) => {
            let out = match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mult => a * b,
                BinOp::Div => a / b,
                BinOp::Mod => a % b,
                _ => return Err(OpErr::Operand),
            };
            Ok(Const::Double(out))
        }
    }
}

/// Shifts promote each operand independently; the right-hand side is masked
/// to 5 bits for an `int` left-hand side and 6 for `long`, whatever its own
/// type.
fn shift(op: BinOp, lhs: Const, rhs: Const) -> Result<Const, OpErr> {
    let rhs = match unary_promote(rhs) {
        Const::Int(v) => v as i64,
        Const::Long(v) => v,
        _ => return Err(OpErr::Operand),
    };
    match unary_promote(lhs) {
        Const::Int(v) => {
            let s = (rhs & 0x1f) as u32;
            Ok(Const::Int(match op {
                BinOp::Shl => v.wrapping_shl(s),
                BinOp::Shr => v.wrapping_shr(s),
                BinOp::UShr => ((v as u32) >> s) as i32,
                _ => return Err(OpErr::Operand),
            }))
        }
        Const::Long(v) => {
            let s = (rhs & 0x3f) as u32;
            Ok(Const::Long(match op {
                BinOp::Shl => v.wrapping_shl(s),
                BinOp::Shr => v.wrapping_shr(s),
                BinOp::UShr => ((v as u64) >> s) as i64,
                _ => return Err(OpErr::Operand),
            }))
        }
        _ => Err(OpErr::Operand),
    }
}

fn comparison(op: BinOp, lhs: Const, rhs: Const) -> Result<Const, OpErr> {
    let out = match binary_promote(lhs, rhs)? {
        Promoted::Int(a, b) => compare(op, a.partial_cmp(&b)),
        Promoted::Long(a, b) => compare(op, a.partial_cmp(&b)),
        Promoted::Float(a, b) => compare(op, a.partial_cmp(&b)),
        Promoted::Double(a, b) => compare(op, a.partial_cmp(&b)),
    };
    Ok(Const::Boolean(out))
}

fn compare(op: BinOp, ordering: Option<std::cmp::Ordering>) -> bool {
    use std::cmp::Ordering::*;
    match (op, ordering) {
        (_, None) => false, // NaN comparisons
        (BinOp::Lt, Some(Less)) => true,
        (BinOp::Le, Some(Less | Equal)) => true,
        (BinOp::Gt, Some(Greater)) => true,
        (BinOp::Ge, Some(Greater | Equal)) => true,
        _ => false,
    }
}

fn equality(op: BinOp, lhs: Const, rhs: Const) -> Result<Const, OpErr> {
    let eq = match (&lhs, &rhs) {
        // String equality folds by content at compile time.
        (Const::String(a), Const::String(b)) => a == b,
        (Const::Boolean(a), Const::Boolean(b)) => a == b,
        _ => match binary_promote(lhs, rhs)? {
            Promoted::Int(a, b) => a == b,
            Promoted::Long(a, b) => a == b,
            Promoted::Float(a, b) => a == b,
            Promoted::Double(a, b) => a == b,
        },
    };
    Ok(Const::Boolean(if op == BinOp::Eq { eq } else { !eq }))
}

fn bitwise(op: BinOp, lhs: Const, rhs: Const) -> Result<Const, OpErr> {
    if let (Const::Boolean(a), Const::Boolean(b)) = (&lhs, &rhs) {
        return Ok(Const::Boolean(match op {
            BinOp::BitAnd => a & b,
            BinOp::BitOr => a | b,
            BinOp::BitXor => a ^ b,
            _ => return Err(OpErr::Operand),
        }));
    }
    match binary_promote(lhs, rhs)? {
        Promoted::Int(a, b) => Ok(Const::Int(match op {
            BinOp::BitAnd => a & b,
            BinOp::BitOr => a | b,
            BinOp::BitXor => a ^ b,
            _ => return Err(OpErr::Operand),
        })),
        Promoted::Long(a, b) => Ok(Const::Long(match op {
            BinOp::BitAnd => a & b,
            BinOp::BitOr => a | b,
            BinOp::BitXor => a ^ b,
            _ => return Err(OpErr::Operand),
        })),
        _ => Err(OpErr::Operand),
    }
}

enum Promoted {
    Int(i32, i32),
    Long(i64, i64),
    Float(f32, f32),
    Double(f64, f64),
}

/// Binary numeric promotion: double, else float, else long, else int.
fn binary_promote(lhs: Const, rhs: Const) -> Result<Promoted, OpErr> {
    let a = unary_promote(lhs);
    let b = unary_promote(rhs);
    let kind = |v: &Const| v.kind().filter(|k| k.is_numeric()).ok_or(OpErr::Operand);
    let (ka, kb) = (kind(&a)?, kind(&b)?);
    if ka == PrimKind::Double || kb == PrimKind::Double {
        Ok(Promoted::Double(as_f64(&a)?, as_f64(&b)?))
    } else if ka == PrimKind::Float || kb == PrimKind::Float {
        Ok(Promoted::Float(as_f64(&a)? as f32, as_f64(&b)? as f32))
    } else if ka == PrimKind::Long || kb == PrimKind::Long {
        Ok(Promoted::Long(as_i64(&a)?, as_i64(&b)?))
    } else {
        Ok(Promoted::Int(as_i64(&a)? as i32, as_i64(&b)? as i32))
    }
}

fn as_i64(value: &Const) -> Result<i64, OpErr> {
    match value {
        Const::Int(v) => Ok(*v as i64),
        Const::Long(v) => Ok(*v),
        _ => Err(OpErr::Operand),
    }
}

fn as_f64(value: &Const) -> Result<f64, OpErr> {
    match value {
        Const::Int(v) => Ok(*v as f64),
        Const::Long(v) => Ok(*v as f64),
        Const::Float(v) => Ok(*v as f64),
        Const::Double(v) => Ok(*v),
        _ => Err(OpErr::Operand),
    }
}

/// Compile-time coercion to `target`, with two's-complement wrapping on
/// narrowing and saturating float-to-integral conversion. `boolean`,
/// `String`, and `null` coerce only to themselves.
pub(crate) fn coerce(value: &Const, target: PrimKind) -> Result<Const, OpErr> {
    match target {
        PrimKind::Boolean => match value {
            Const::Boolean(_) => Ok(value.clone()),
            _ => Err(OpErr::NonConst),
        },
        PrimKind::String => match value {
            Const::String(_) => Ok(value.clone()),
            _ => Err(OpErr::NonConst),
        },
        PrimKind::Null => match value {
            Const::Null => Ok(Const::Null),
            _ => Err(OpErr::NonConst),
        },
        _ => {
            let source = match value {
                Const::Byte(v) => Num::I(*v as i64),
                Const::Short(v) => Num::I(*v as i64),
                Const::Int(v) => Num::I(*v as i64),
                Const::Long(v) => Num::I(*v),
                Const::Char(v) => Num::I(*v as i64),
                Const::Float(v) => Num::F(*v as f64),
                Const::Double(v) => Num::F(*v),
                _ => return Err(OpErr::NonConst),
            };
            Ok(match (target, source) {
                (PrimKind::Byte, Num::I(v)) => Const::Byte(v as i8),
                (PrimKind::Byte, Num::F(v)) => Const::Byte(v as i32 as i8),
                (PrimKind::Short, Num::I(v)) => Const::Short(v as i16),
                (PrimKind::Short, Num::F(v)) => Const::Short(v as i32 as i16),
                (PrimKind::Char, Num::I(v)) => Const::Char(v as u16),
                (PrimKind::Char, Num::F(v)) => Const::Char(v as i32 as u16),
                (PrimKind::Int, Num::I(v)) => Const::Int(v as i32),
                (PrimKind::Int, Num::F(v)) => Const::Int(v as i32),
                (PrimKind::Long, Num::I(v)) => Const::Long(v),
                (PrimKind::Long, Num::F(v)) => Const::Long(v as i64),
                (PrimKind::Float, Num::I(v)) => Const::Float(v as f32),
                (PrimKind::Float, Num::F(v)) => Const::Float(v as f32),
                (PrimKind::Double, Num::I(v)) => Const::Double(v as f64),
                (PrimKind::Double, Num::F(v)) => Const::Double(v),
                _ => return Err(OpErr::NonConst),
            })
        }
    }
}

enum Num {
    I(i64),
    F(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_widens_small_ints() {
        assert_eq!(unary_promote(Const::Byte(-1)), Const::Int(-1));
        assert_eq!(unary_promote(Const::Char(b'a' as u16)), Const::Int(97));
        assert_eq!(unary_promote(Const::Long(1)), Const::Long(1));
    }

    #[test]
    fn arithmetic_follows_binary_promotion() {
        assert_eq!(
            apply_binary(BinOp::Add, Const::Byte(1), Const::Long(2)).unwrap(),
            Const::Long(3)
        );
        assert_eq!(
            apply_binary(BinOp::Mult, Const::Int(3), Const::Double(0.5)).unwrap(),
            Const::Double(1.5)
        );
    }

    #[test]
    fn integer_overflow_wraps() {
        assert_eq!(
            apply_binary(BinOp::Add, Const::Int(i32::MAX), Const::Int(1)).unwrap(),
            Const::Int(i32::MIN)
        );
        assert_eq!(
            apply_unary(UnOp::Neg, Const::Int(i32::MIN)).unwrap(),
            Const::Int(i32::MIN)
        );
    }

    #[test]
    fn division_by_zero_is_not_constant() {
        assert_eq!(
            apply_binary(BinOp::Div, Const::Int(1), Const::Int(0)),
            Err(OpErr::NonConst)
        );
        assert_eq!(
            apply_binary(BinOp::Mod, Const::Long(1), Const::Long(0)),
            Err(OpErr::NonConst)
        );
        // IEEE division just produces infinity.
        assert_eq!(
            apply_binary(BinOp::Div, Const::Double(1.0), Const::Double(0.0)).unwrap(),
            Const::Double(f64::INFINITY)
        );
    }

    #[test]
    fn shift_masks_by_left_operand_width() {
        assert_eq!(
            apply_binary(BinOp::Shl, Const::Int(1), Const::Int(33)).unwrap(),
            Const::Int(2)
        );
        assert_eq!(
            apply_binary(BinOp::Shl, Const::Long(1), Const::Int(33)).unwrap(),
            Const::Long(1 << 33)
        );
        assert_eq!(
            apply_binary(BinOp::UShr, Const::Int(-1), Const::Int(28)).unwrap(),
            Const::Int(0xf)
        );
    }

    #[test]
    fn string_concat_and_equality() {
        assert_eq!(
            apply_binary(
                BinOp::Add,
                Const::String("x=".to_string()),
                Const::Int(42)
            )
            .unwrap(),
            Const::String("x=42".to_string())
        );
        assert_eq!(
            apply_binary(
                BinOp::Eq,
                Const::String("a".to_string()),
                Const::String("a".to_string())
            )
            .unwrap(),
            Const::Boolean(true)
        );
    }

    #[test]
    fn boolean_operand_mismatch_is_an_error() {
        assert_eq!(
            apply_binary(BinOp::Add, Const::Int(1), Const::Boolean(true)),
            Err(OpErr::Operand)
        );
        assert_eq!(
            apply_binary(BinOp::AndAnd, Const::Int(1), Const::Boolean(true)),
            Err(OpErr::Operand)
        );
    }

    #[test]
    fn narrowing_coercion_wraps() {
        assert_eq!(coerce(&Const::Int(300), PrimKind::Byte).unwrap(), Const::Byte(44));
        assert_eq!(
            coerce(&Const::Long(1 << 32), PrimKind::Int).unwrap(),
            Const::Int(0)
        );
        assert_eq!(
            coerce(&Const::Double(1e30), PrimKind::Int).unwrap(),
            Const::Int(i32::MAX)
        );
        assert_eq!(
            coerce(&Const::Double(2.9), PrimKind::Int).unwrap(),
            Const::Int(2)
        );
    }

    #[test]
    fn boolean_and_string_coerce_only_to_themselves() {
        assert_eq!(
            coerce(&Const::Int(1), PrimKind::Boolean),
            Err(OpErr::NonConst)
        );
        assert_eq!(
            coerce(&Const::String("s".to_string()), PrimKind::Int),
            Err(OpErr::NonConst)
        );
        assert!(coerce(&Const::Boolean(true), PrimKind::Boolean).is_ok());
    }
}
