//! Annotation binding, metadata, and semantic queries.

mod common;

use common::Fixture;
use javelin_binder::{element_values_with_defaults, inherited_annotations, ErrorKind};
use javelin_core::Name;
use javelin_types::{
    AnnoInfo, ClassSymbol, ClassValue, Const, ElementType, RetentionPolicy, Type,
};
use pretty_assertions::assert_eq;

#[test]
fn defaults_fill_at_query_time() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[(
        "T.java",
        "@interface Anno { int a(); int b() default 7; String c() default \"x\"; }\n\
         @Anno(a = 1) class T {}",
    )]);
    let t = units.class("T").unwrap();
    let anno = &t.annotations[0];
    // Stored values hold exactly what was written.
    assert_eq!(anno.values, vec![(Name::new("a"), Const::Int(1))]);

    let env = units.env();
    let filled = element_values_with_defaults(&env, anno);
    assert_eq!(
        filled,
        vec![
            (Name::new("a"), Const::Int(1)),
            (Name::new("b"), Const::Int(7)),
            (Name::new("c"), Const::String("x".to_string())),
        ]
    );

    // Applying defaults to an already-filled annotation is the identity.
    let refilled = element_values_with_defaults(
        &env,
        &AnnoInfo {
            sym: anno.sym.clone(),
            pos: anno.pos,
            values: filled.clone(),
        },
    );
    assert_eq!(refilled, filled);
}

#[test]
fn missing_required_argument() {
    let fixture = Fixture::new();
    let err = fixture.bind_err(&[(
        "T.java",
        "@interface Anno { int v(); }\n@Anno class T {}",
    )]);
    assert_eq!(err.kinds(), vec![ErrorKind::MissingAnnotationArgument]);
}

#[test]
fn unknown_element_is_diagnosed() {
    let fixture = Fixture::new();
    let err = fixture.bind_err(&[(
        "T.java",
        "@interface Anno { int v() default 0; }\n@Anno(w = 1) class T {}",
    )]);
    assert_eq!(err.kinds(), vec![ErrorKind::CannotResolveElement]);
    assert!(err.diagnostics[0]
        .message
        .contains("could not resolve element w() in Anno"));
}

#[test]
fn not_an_annotation() {
    let fixture = Fixture::new();
    let err = fixture.bind_err(&[(
        "T.java",
        "class NotAnno {}\n@NotAnno class T {}",
    )]);
    assert_eq!(err.kinds(), vec![ErrorKind::NotAnAnnotation]);
    assert!(err.diagnostics[0].message.contains("NotAnno is not an annotation"));
}

#[test]
fn duplicate_non_repeatable_annotation() {
    let fixture = Fixture::new();
    let err = fixture.bind_err(&[(
        "T.java",
        "@interface M {}\n@M @M class T {}",
    )]);
    assert_eq!(err.kinds(), vec![ErrorKind::NotRepeatable]);
}

#[test]
fn repeatable_annotations_are_allowed() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[(
        "T.java",
        "@interface Container { M[] value(); }\n\
         @java.lang.annotation.Repeatable(Container.class)\n\
         @interface M {}\n\
         @M @M class T {}",
    )]);
    let t = units.class("T").unwrap();
    // Both occurrences survive; the container is synthesized downstream.
    assert_eq!(t.annotations.len(), 2);
    let m = units.class("M").unwrap();
    assert_eq!(
        m.annotation_metadata.as_ref().unwrap().repeatable,
        Some(ClassSymbol::new("Container"))
    );
}

#[test]
fn implicit_value_and_array_shorthand() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[(
        "T.java",
        "@interface Anno { int[] value(); }\n@Anno(1) class T {}\n@Anno({2, 3}) class U {}",
    )]);
    assert_eq!(
        units.class("T").unwrap().annotations[0].value("value"),
        Some(&Const::Array(vec![Const::Int(1)]))
    );
    assert_eq!(
        units.class("U").unwrap().annotations[0].value("value"),
        Some(&Const::Array(vec![Const::Int(2), Const::Int(3)]))
    );
}

#[test]
fn class_literal_values() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[(
        "T.java",
        "@interface Anno { Class value(); }\n@Anno(String.class) class T {}",
    )]);
    let value = units.class("T").unwrap().annotations[0].value("value").cloned();
    assert_eq!(value, Some(Const::Class(ClassValue(Type::string()))));
}

#[test]
fn nested_annotation_values() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[(
        "T.java",
        "@interface Inner { int n() default 0; }\n\
         @interface Outer { Inner inner(); }\n\
         @Outer(inner = @Inner(n = 4)) class T {}",
    )]);
    let outer = &units.class("T").unwrap().annotations[0];
    let Some(Const::Annotation(inner)) = outer.value("inner") else {
        panic!("expected nested annotation");
    };
    assert_eq!(inner.sym, ClassSymbol::new("Inner"));
    assert_eq!(inner.value("n"), Some(&Const::Int(4)));
}

#[test]
fn null_argument_is_invalid() {
    let fixture = Fixture::new();
    let err = fixture.bind_err(&[(
        "T.java",
        "@interface Anno { String v(); }\n@Anno(v = null) class T {}",
    )]);
    assert_eq!(err.kinds(), vec![ErrorKind::InvalidAnnotationArgument]);
}

#[test]
fn retention_and_target_metadata() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[(
        "T.java",
        "import java.lang.annotation.*;\n\
         @Retention(RetentionPolicy.RUNTIME)\n\
         @Target({ElementType.TYPE, ElementType.METHOD})\n\
         @interface M {}",
    )]);
    let metadata = units
        .class("M")
        .unwrap()
        .annotation_metadata
        .clone()
        .unwrap();
    assert_eq!(metadata.retention, RetentionPolicy::Runtime);
    assert_eq!(
        metadata.targets,
        Some(vec![ElementType::Type, ElementType::Method])
    );
    assert!(!metadata.inherited);
}

#[test]
fn target_mismatch_is_diagnosed() {
    let fixture = Fixture::new();
    let err = fixture.bind_err(&[(
        "T.java",
        "import java.lang.annotation.*;\n\
         @Target(ElementType.METHOD) @interface M {}\n\
         @M class T {}",
    )]);
    assert_eq!(err.kinds(), vec![ErrorKind::AnnotationTargetMismatch]);
}

#[test]
fn inherited_annotations_walk_the_superclass_chain() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[(
        "T.java",
        "import java.lang.annotation.*;\n\
         @Inherited @interface Marked {}\n\
         @interface Plain {}\n\
         @Marked @Plain class Base {}\n\
         class Derived extends Base {}",
    )]);
    let env = units.env();

    // Direct queries do not walk.
    assert!(units.class("Derived").unwrap().annotations.is_empty());

    let inherited = inherited_annotations(&env, &ClassSymbol::new("Derived"));
    let names: Vec<&str> = inherited
        .iter()
        .map(|a| a.sym.binary_name())
        .collect();
    assert_eq!(names, vec!["Marked"]);

    // The base class sees both of its direct annotations.
    let base = inherited_annotations(&env, &ClassSymbol::new("Base"));
    assert_eq!(base.len(), 2);
}

#[test]
fn annotation_default_values_are_bound() {
    let fixture = Fixture::new();
    let units = fixture.bind_ok(&[(
        "T.java",
        "enum E { A, B }\n@interface Anno { E e() default E.B; int[] xs() default {1, 2}; }",
    )]);
    let anno = units.class("Anno").unwrap();
    let e = anno.methods.iter().find(|m| m.sym.name.as_str() == "e").unwrap();
    assert_eq!(
        e.default_value,
        Some(Const::EnumConstant(javelin_types::FieldSymbol::new(
            ClassSymbol::new("E"),
            "B"
        )))
    );
    let xs = anno.methods.iter().find(|m| m.sym.name.as_str() == "xs").unwrap();
    assert_eq!(
        xs.default_value,
        Some(Const::Array(vec![Const::Int(1), Const::Int(2)]))
    );
}
