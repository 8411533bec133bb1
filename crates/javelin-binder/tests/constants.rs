//! Constant evaluation, end to end.

mod common;

use common::Fixture;
use javelin_binder::ErrorKind;
use javelin_types::Const;
use pretty_assertions::assert_eq;

fn constant(fixture: &Fixture, decl: &str, field: &str) -> Option<Const> {
    let units = fixture.bind_ok(&[("C.java", decl)]);
    units
        .classes
        .iter()
        .find_map(|(_, class)| class.fields.iter().find(|f| f.sym.name.as_str() == field))
        .map(|f| f.constant.clone())
        .expect("field")
}

#[test]
fn arithmetic_and_promotion() {
    let fixture = Fixture::new();
    assert_eq!(
        constant(&fixture, "class C { static final int X = 1 + 2 * 3 - 4 % 3; }", "X"),
        Some(Const::Int(6))
    );
    assert_eq!(
        constant(
            &fixture,
            "class C { static final long X = 1 + 2L; }",
            "X"
        ),
        Some(Const::Long(3))
    );
    assert_eq!(
        constant(
            &fixture,
            "class C { static final double X = 1 / 2.0; }",
            "X"
        ),
        Some(Const::Double(0.5))
    );
}

#[test]
fn narrowing_initializer_coerces_to_declared_type() {
    let fixture = Fixture::new();
    assert_eq!(
        constant(&fixture, "class C { static final byte X = (byte) 300; }", "X"),
        Some(Const::Byte(44))
    );
    assert_eq!(
        constant(&fixture, "class C { static final char X = 'a' + 1; }", "X"),
        Some(Const::Char(b'b' as u16))
    );
    assert_eq!(
        constant(&fixture, "class C { static final short X = 1; }", "X"),
        Some(Const::Short(1))
    );
}

#[test]
fn hex_octal_binary_and_underscores() {
    let fixture = Fixture::new();
    assert_eq!(
        constant(
            &fixture,
            "class C { static final int X = 0xFF | 0b1_0000_0000 | 010; }",
            "X"
        ),
        Some(Const::Int(0xff | 0x100 | 8))
    );
}

#[test]
fn shifts_mask_the_right_operand() {
    let fixture = Fixture::new();
    assert_eq!(
        constant(&fixture, "class C { static final int X = 1 << 33; }", "X"),
        Some(Const::Int(2))
    );
    assert_eq!(
        constant(
            &fixture,
            "class C { static final long X = 1L << 33; }",
            "X"
        ),
        Some(Const::Long(1 << 33))
    );
    assert_eq!(
        constant(&fixture, "class C { static final int X = -8 >>> 1; }", "X"),
        Some(Const::Int(((-8i32 as u32) >> 1) as i32))
    );
}

#[test]
fn conditional_takes_the_chosen_branch() {
    let fixture = Fixture::new();
    assert_eq!(
        constant(
            &fixture,
            "class C { static final int X = 1 < 2 ? 10 : 20; }",
            "X"
        ),
        Some(Const::Int(10))
    );
    assert_eq!(
        constant(
            &fixture,
            "class C { static final String X = \"a\" == \"a\" ? \"y\" : \"n\"; }",
            "X"
        ),
        Some(Const::String("y".to_string()))
    );
}

#[test]
fn division_by_zero_records_no_value() {
    let fixture = Fixture::new();
    assert_eq!(
        constant(&fixture, "class C { static final int X = 1 / 0; }", "X"),
        None
    );
    assert_eq!(
        constant(&fixture, "class C { static final int X = 1 % 0; }", "X"),
        None
    );
}

#[test]
fn non_constant_initializers_record_no_value() {
    let fixture = Fixture::new();
    // Not static.
    assert_eq!(
        constant(&fixture, "class C { final int X = 1; static final int Y = 2; }", "X"),
        None
    );
    // Reference cast other than String.
    assert_eq!(
        constant(
            &fixture,
            "class C { static final Object X = (Object) \"s\"; }",
            "X"
        ),
        None
    );
    // String cast of a string stays constant.
    assert_eq!(
        constant(
            &fixture,
            "class C { static final String X = (String) \"s\"; }",
            "X"
        ),
        Some(Const::String("s".to_string()))
    );
}

#[test]
fn cross_class_references() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[
        ("A.java", "package p; public class A { public static final int BASE = 10; }"),
        (
            "B.java",
            "package q; class B { static final int X = p.A.BASE * 2; }",
        ),
    ]);
    let b = units.class("q/B").unwrap();
    assert_eq!(b.fields[0].constant, Some(Const::Int(20)));
}

#[test]
fn reference_cycles_are_not_constant() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[(
        "C.java",
        "class C { static final int A = B; static final int B = A; }",
    )]);
    let c = units.class("C").unwrap();
    assert_eq!(c.fields[0].constant, None);
    assert_eq!(c.fields[1].constant, None);
}

#[test]
fn static_member_imports() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[
        (
            "K.java",
            "package k; public class K { public static final int ONE = 1;\n\
             \u{20} static final int HIDDEN = 9;\n\
             \u{20} public static final int TWO = 2; }",
        ),
        (
            "U.java",
            "package u;\nimport static k.K.ONE;\nimport static k.K.*;\n\
             class U { static final int X = ONE + TWO; }",
        ),
    ]);
    let u = units.class("u/U").unwrap();
    assert_eq!(u.fields[0].constant, Some(Const::Int(3)));
}

#[test]
fn on_demand_static_imports_skip_private() {
    let fixture = Fixture::new();
    let err = fixture.bind_err(&[
        (
            "K.java",
            "package k; public class K { private static final int SECRET = 1; }",
        ),
        (
            "U.java",
            "package u;\nimport static k.K.*;\nclass U { static final int X = SECRET; }",
        ),
    ]);
    assert_eq!(err.kinds(), vec![ErrorKind::CannotResolve]);
}

#[test]
fn unresolved_constant_reference_is_diagnosed() {
    let fixture = Fixture::new();
    let err = fixture.bind_err(&[("C.java", "class C { static final int X = NOPE; }")]);
    assert_eq!(err.kinds(), vec![ErrorKind::CannotResolve]);
}

#[test]
fn mismatched_operands_are_diagnosed() {
    let fixture = Fixture::new();
    let err = fixture.bind_err(&[(
        "C.java",
        "class C { static final boolean X = true && 1; }",
    )]);
    assert_eq!(err.kinds(), vec![ErrorKind::OperandType]);
}

#[test]
fn lexical_lookup_sees_enclosing_classes() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[(
        "O.java",
        "class Outer { static final int BASE = 5;\n\
         \u{20} static class Inner { static final int X = BASE + 1; } }",
    )]);
    let inner = units.class("Outer$Inner").unwrap();
    assert_eq!(inner.fields[0].constant, Some(Const::Int(6)));
}

#[test]
fn string_equality_folds_by_content() {
    let fixture = Fixture::new();
    assert_eq!(
        constant(
            &fixture,
            "class C { static final boolean X = (\"a\" + \"b\") == \"ab\"; }",
            "X"
        ),
        Some(Const::Boolean(true))
    );
}

#[test]
fn float_evaluation_is_ieee() {
    let fixture = Fixture::new();
    assert_eq!(
        constant(
            &fixture,
            "class C { static final double X = 0.1 + 0.2; }",
            "X"
        ),
        Some(Const::Double(0.1 + 0.2))
    );
    assert_eq!(
        constant(
            &fixture,
            "class C { static final float X = 1e30f * 1e30f; }",
            "X"
        ),
        Some(Const::Float(f32::INFINITY))
    );
}
