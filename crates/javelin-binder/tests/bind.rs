//! End-to-end binding scenarios.

use std::path::PathBuf;
use std::rc::Rc;

mod common;

use common::Fixture;
use javelin_binder::{as_member_of, bind, BindOptions, Env, ErrorKind, SourceFile};
use javelin_classpath::Classpath;
use javelin_types::{
    ClassKind, ClassSymbol, ClassTy, Const, FieldSymbol, PrimKind, Type, TypeView,
    ACC_DEPRECATED, ACC_SEALED,
};
use pretty_assertions::assert_eq;

#[test]
fn missing_supertype_is_a_single_cannot_resolve() {
    let fixture = Fixture::new();
    let text = "package a; class A extends NoSuch {}";
    let err = fixture.bind_err(&[("A.java", text)]);
    assert_eq!(err.kinds(), vec![ErrorKind::CannotResolve]);
    let diag = &err.diagnostics[0];
    assert_eq!(u32::from(diag.pos) as usize, text.find("NoSuch").unwrap());
    let rendered = err.to_string();
    assert!(rendered.contains("A.java:1: error: could not resolve NoSuch"));
    assert!(rendered.lines().last().unwrap().trim_end().ends_with('^'));
}

#[test]
fn duplicate_annotation_argument() {
    let fixture = Fixture::new();
    let text = "@interface Anno { int v() default 0; }\n@Anno(v=1, v=2) class T {}";
    let err = fixture.bind_err(&[("T.java", text)]);
    assert_eq!(err.kinds(), vec![ErrorKind::InvalidAnnotationArgument]);
    let second = text.rfind("v=2").unwrap();
    assert_eq!(u32::from(err.diagnostics[0].pos) as usize, second);
}

#[test]
fn constant_folding_and_concatenation() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[(
        "C.java",
        "class C { static final int X = 42;\n          static final String S = \"x=\" + X + \"!\"; }",
    )]);
    let c = units.class("C").unwrap();
    let x = c.fields.iter().find(|f| f.sym.name.as_str() == "X").unwrap();
    assert_eq!(x.constant, Some(Const::Int(42)));
    let s = c.fields.iter().find(|f| f.sym.name.as_str() == "S").unwrap();
    assert_eq!(s.constant, Some(Const::String("x=42!".to_string())));
}

#[test]
fn enum_constant_reference_in_annotation() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[(
        "T.java",
        "enum E { A, B }\n@interface AA { E value(); }\n@AA(E.A) class T {}",
    )]);
    let t = units.class("T").unwrap();
    assert_eq!(t.annotations.len(), 1);
    let anno = &t.annotations[0];
    assert_eq!(anno.sym, ClassSymbol::new("AA"));
    assert_eq!(
        anno.value("value"),
        Some(&Const::EnumConstant(FieldSymbol::new(
            ClassSymbol::new("E"),
            "A"
        )))
    );
}

#[test]
fn hierarchy_cycle_is_diagnosed_once() {
    let fixture = Fixture::new();
    let err = fixture.bind_err(&[("AB.java", "class A extends B {} class B extends A {}")]);
    assert_eq!(err.kinds(), vec![ErrorKind::CycleInClassHierarchy]);
    let message = &err.diagnostics[0].message;
    assert!(
        message.contains("cycle in class hierarchy"),
        "unexpected message: {message}"
    );
    assert!(message.contains("A") && message.contains("B"));
}

#[test]
fn generic_member_signature_substitutes() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[(
        "L.java",
        "interface List<T> { T get(int i); }\nclass StringList implements List<String> {}",
    )]);
    let string_list = units.class("StringList").unwrap();
    let iface = &string_list.interface_types[0];
    let Type::Class(iface) = iface else {
        panic!("expected class type, got {iface:?}");
    };
    assert_eq!(iface.leaf_sym(), &ClassSymbol::new("List"));
    assert_eq!(iface.leaf().targs, vec![Type::string()]);

    let list = units.class("List").unwrap();
    let get = list
        .methods
        .iter()
        .find(|m| m.sym.name.as_str() == "get")
        .unwrap();
    let env = units.env();
    let viewed = as_member_of(
        &env,
        &ClassTy::non_generic(ClassSymbol::new("StringList")),
        get,
    );
    assert_eq!(viewed.return_type, Type::string());
    assert_eq!(viewed.params, vec![Type::prim(PrimKind::Int)]);
}

#[test]
fn first_match_wins_across_providers() {
    // The same binary name on the bootclasspath and the classpath: the
    // bootclasspath version (with the marker field) must win.
    let dir = tempfile::tempdir().unwrap();
    let boot_jar = dir.path().join("boot.jar");
    let cp_jar = dir.path().join("cp.jar");
    let mut boot_classes = javelin_testkit::minimal_jdk_classes();
    boot_classes.push((
        "dup/Dup.class".to_string(),
        javelin_testkit::ClassBuilder::new(0x0001, "dup/Dup")
            .field(0x0019, "FROM_BOOT", "I")
            .finish(),
    ));
    javelin_testkit::write_jar(&boot_jar, &boot_classes).unwrap();
    javelin_testkit::write_jar(
        &cp_jar,
        &[(
            "dup/Dup.class".to_string(),
            javelin_testkit::ClassBuilder::new(0x0001, "dup/Dup")
                .field(0x0019, "FROM_CP", "I")
                .finish(),
        )],
    )
    .unwrap();

    let boot = Rc::new(Classpath::open(&[boot_jar]).unwrap());
    let cp = Rc::new(Classpath::open(&[cp_jar]).unwrap());
    let sources = vec![SourceFile {
        path: "U.java".to_string(),
        text: "package b; class Use extends dup.Dup {}".to_string(),
    }];
    let units = bind(&sources, boot, cp, &BindOptions::default()).unwrap();
    let use_class = units.class("b/Use").unwrap();
    assert_eq!(use_class.superclass, Some(ClassSymbol::new("dup/Dup")));

    let env = units.env();
    let dup = env.get(&ClassSymbol::new("dup/Dup")).unwrap();
    assert!(dup.field("FROM_BOOT").is_some());
    assert!(dup.field("FROM_CP").is_none());
}

#[test]
fn sources_shadow_the_classpath() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[(
        "S.java",
        "package java.lang; class Number { public static final int MARKER = 1; }",
    ), (
        "U.java",
        "class Use extends java.lang.Number {}",
    )]);
    let env = units.env();
    let number = env.get(&ClassSymbol::new("java/lang/Number")).unwrap();
    assert!(number.field("MARKER").is_some());
}

#[test]
fn inner_scope_shadows_outer() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[
        ("BX.java", "package b; public class X { public static final int WHICH = 2; }"),
        ("AX.java", "package a; class X { static final int WHICH = 1; }"),
        (
            "AC.java",
            "package a;\nimport b.X;\nclass C { static final int GOT = X.WHICH; X field; }",
        ),
    ]);
    // The single-type import shadows the same-package class.
    let c = units.class("a/C").unwrap();
    let got = c.fields.iter().find(|f| f.sym.name.as_str() == "GOT").unwrap();
    assert_eq!(got.constant, Some(Const::Int(2)));
    let field = c.fields.iter().find(|f| f.sym.name.as_str() == "field").unwrap();
    assert_eq!(field.ty.class_sym(), Some(&ClassSymbol::new("b/X")));
}

#[test]
fn member_types_shadow_imports() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[
        ("BX.java", "package b; public class X {}"),
        (
            "AC.java",
            "package a;\nimport b.X;\nclass C { class X {} X field; }",
        ),
    ]);
    let c = units.class("a/C").unwrap();
    let field = c.fields.iter().find(|f| f.sym.name.as_str() == "field").unwrap();
    assert_eq!(field.ty.class_sym(), Some(&ClassSymbol::new("a/C$X")));
}

#[test]
fn nested_types_resolve_through_owners() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[(
        "O.java",
        "package p;\nclass Outer { static class Inner { static class Leaf {} } }\n\
         class Use { p.Outer.Inner.Leaf leaf; }",
    )]);
    let use_class = units.class("p/Use").unwrap();
    let leaf = &use_class.fields[0];
    assert_eq!(
        leaf.ty.class_sym(),
        Some(&ClassSymbol::new("p/Outer$Inner$Leaf"))
    );
}

#[test]
fn type_parameter_as_qualifier_is_rejected() {
    let fixture = Fixture::new();
    let err = fixture.bind_err(&[("C.java", "class C<U> { U.I field; }")]);
    assert_eq!(err.kinds(), vec![ErrorKind::TypeParameterQualifier]);
}

#[test]
fn duplicate_top_level_declaration() {
    let fixture = Fixture::new();
    let err = fixture.bind_err(&[
        ("A1.java", "package a; class Same {}"),
        ("A2.java", "package a; class Same {}"),
    ]);
    assert_eq!(err.kinds(), vec![ErrorKind::DuplicateDeclaration]);
}

#[test]
fn non_canonical_import_is_diagnosed() {
    let fixture = Fixture::new();
    let err = fixture.bind_err(&[
        (
            "P.java",
            "package p; public class Parent { public static class Nested {} }\n",
        ),
        ("C.java", "package p; public class Child extends Parent {}"),
        (
            "U.java",
            "package q;\nimport p.Child.Nested;\nclass Use { Nested n; }",
        ),
    ]);
    assert_eq!(err.kinds(), vec![ErrorKind::NonCanonicalImport]);
}

#[test]
fn deprecated_annotation_and_javadoc() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[(
        "D.java",
        "@Deprecated class ByAnno {}\n/** @deprecated */ class ByDoc {}\nclass Not {}",
    )]);
    assert_ne!(units.class("ByAnno").unwrap().access & ACC_DEPRECATED, 0);
    assert_ne!(units.class("ByDoc").unwrap().access & ACC_DEPRECATED, 0);
    assert_eq!(units.class("Not").unwrap().access & ACC_DEPRECATED, 0);
    // Only the annotation contributes the runtime-visible annotation.
    assert_eq!(units.class("ByAnno").unwrap().annotations.len(), 1);
    assert!(units.class("ByDoc").unwrap().annotations.is_empty());
}

#[test]
fn sealed_classes_record_permits() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[(
        "S.java",
        "public sealed class Shape permits Circle, Square {}\n\
         final class Circle extends Shape {}\n\
         final class Square extends Shape {}",
    )]);
    let shape = units.class("Shape").unwrap();
    assert_ne!(shape.access & ACC_SEALED, 0);
    assert_eq!(
        shape.permits,
        vec![ClassSymbol::new("Circle"), ClassSymbol::new("Square")]
    );
}

#[test]
fn records_get_components_accessors_and_ctor() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[("P.java", "record Point(int x, int y) {}")]);
    let point = units.class("Point").unwrap();
    assert_eq!(point.kind, ClassKind::Record);
    assert_eq!(point.superclass, Some(ClassSymbol::new("java/lang/Record")));
    assert_eq!(point.fields.len(), 2);
    let accessor_names: Vec<&str> = point
        .methods
        .iter()
        .map(|m| m.sym.name.as_str())
        .collect();
    assert!(accessor_names.contains(&"<init>"));
    assert!(accessor_names.contains(&"x"));
    assert!(accessor_names.contains(&"y"));
}

#[test]
fn enums_get_values_and_value_of() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[("E.java", "enum E { A, B }")]);
    let e = units.class("E").unwrap();
    assert_eq!(e.kind, ClassKind::Enum);
    let names: Vec<&str> = e.methods.iter().map(|m| m.sym.name.as_str()).collect();
    assert!(names.contains(&"values"));
    assert!(names.contains(&"valueOf"));
    // The superclass instantiation is Enum<E>.
    let Some(Type::Class(superclass)) = &e.superclass_type else {
        panic!("expected class supertype");
    };
    assert_eq!(superclass.leaf_sym(), &ClassSymbol::new("java/lang/Enum"));
    assert_eq!(
        superclass.leaf().targs,
        vec![Type::Class(ClassTy::non_generic(ClassSymbol::new("E")))]
    );
}

#[test]
fn module_info_binds_with_implicit_java_base() {
    let fixture = Fixture::new();
    let sources = vec![
        SourceFile {
            path: "module-info.java".to_string(),
            text: "module com.example { exports com.example; }".to_string(),
        },
        SourceFile {
            path: "A.java".to_string(),
            text: "package com.example; public class A {}".to_string(),
        },
    ];
    let empty = Rc::new(Classpath::open(&[]).unwrap());
    let options = BindOptions {
        module_version: Some("1.2.3".to_string()),
        ..BindOptions::default()
    };
    let units = bind(&sources, fixture.boot.clone(), empty, &options).unwrap();
    assert_eq!(units.modules.len(), 1);
    let module = &units.modules[0];
    assert_eq!(module.name.as_str(), "com.example");
    assert_eq!(module.version.as_deref(), Some("1.2.3"));
    assert!(module
        .requires
        .iter()
        .any(|r| r.module.as_str() == "java.base"));
    assert_eq!(module.exports[0].package, "com.example");
}

#[test]
fn classpath_archives_are_exposed_for_lowering() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[("A.java", "class A {}")]);
    // Lowering can reach classes the binder itself never touched.
    assert!(units
        .bootclasspath
        .lookup(&ClassSymbol::new("java/lang/String"))
        .is_some());
    let file = PathBuf::from("nonexistent.jar");
    assert!(Classpath::open(&[file]).is_err());
}
