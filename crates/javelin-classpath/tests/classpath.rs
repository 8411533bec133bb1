//! Classpath indexing and lazy materialization.

use std::rc::Rc;

use javelin_classpath::{Classpath, ClasspathError};
use javelin_testkit::{write_jar, AnnoSpec, ClassBuilder, ConstSpec, ElemSpec};
use javelin_types::{
    ClassKind, ClassSymbol, Const, PrimKind, RetentionPolicy, Type, TypeView, WildTy,
};
use pretty_assertions::assert_eq;

const ACC_PUBLIC: u16 = 0x0001;
const ACC_STATIC: u16 = 0x0008;
const ACC_FINAL: u16 = 0x0010;
const ACC_INTERFACE: u16 = 0x0200;
const ACC_ABSTRACT: u16 = 0x0400;
const ACC_ANNOTATION: u16 = 0x2000;

fn open(entries: &[(String, Vec<u8>)]) -> (tempfile::TempDir, Rc<Classpath>) {
    let dir = tempfile::tempdir().unwrap();
    let jar = dir.path().join("test.jar");
    write_jar(&jar, entries).unwrap();
    let cp = Rc::new(Classpath::open(&[jar]).unwrap());
    (dir, cp)
}

#[test]
fn unreadable_archive_fails_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("bogus.jar");
    std::fs::write(&bogus, b"not a zip archive").unwrap();
    let err = Classpath::open(&[bogus.clone()]).unwrap_err();
    match err {
        ClasspathError::Archive { path, .. } => assert_eq!(path, bogus),
        other => panic!("expected archive error, got {other:?}"),
    }
}

#[test]
fn unparseable_class_is_silently_absent() {
    let (_dir, cp) = open(&[
        ("good/A.class".to_string(), ClassBuilder::new(ACC_PUBLIC, "good/A").finish()),
        ("bad/B.class".to_string(), vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0]),
    ]);
    // Both names are indexed; only the good one materializes.
    assert!(cp.contains(&ClassSymbol::new("good/A")));
    assert!(cp.contains(&ClassSymbol::new("bad/B")));
    assert!(cp.lookup(&ClassSymbol::new("good/A")).is_some());
    assert!(cp.lookup(&ClassSymbol::new("bad/B")).is_none());
    // The failure is memoized, not retried.
    assert!(cp.lookup(&ClassSymbol::new("bad/B")).is_none());
}

#[test]
fn materialization_is_memoized() {
    let (_dir, cp) = open(&[(
        "p/A.class".to_string(),
        ClassBuilder::new(ACC_PUBLIC, "p/A").finish(),
    )]);
    let first = cp.lookup(&ClassSymbol::new("p/A")).unwrap();
    let second = cp.lookup(&ClassSymbol::new("p/A")).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn first_archive_wins_within_a_classpath() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.jar");
    let second = dir.path().join("second.jar");
    write_jar(
        &first,
        &[(
            "p/A.class".to_string(),
            ClassBuilder::new(ACC_PUBLIC, "p/A")
                .field(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, "FIRST", "I")
                .finish(),
        )],
    )
    .unwrap();
    write_jar(
        &second,
        &[(
            "p/A.class".to_string(),
            ClassBuilder::new(ACC_PUBLIC, "p/A")
                .field(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, "SECOND", "I")
                .finish(),
        )],
    )
    .unwrap();
    let cp = Classpath::open(&[first, second]).unwrap();
    let a = cp.lookup(&ClassSymbol::new("p/A")).unwrap();
    assert!(a.field("FIRST").is_some());
    assert!(a.field("SECOND").is_none());
}

#[test]
fn constant_values_are_retyped_by_descriptor() {
    let (_dir, cp) = open(&[(
        "p/K.class".to_string(),
        ClassBuilder::new(ACC_PUBLIC, "p/K")
            .const_field(ACC_STATIC | ACC_FINAL, "BOOL", "Z", ConstSpec::Int(1))
            .const_field(ACC_STATIC | ACC_FINAL, "BYTE", "B", ConstSpec::Int(-2))
            .const_field(ACC_STATIC | ACC_FINAL, "SHORT", "S", ConstSpec::Int(300))
            .const_field(ACC_STATIC | ACC_FINAL, "CHAR", "C", ConstSpec::Int(65))
            .const_field(ACC_STATIC | ACC_FINAL, "INT", "I", ConstSpec::Int(42))
            .const_field(ACC_STATIC | ACC_FINAL, "LONG", "J", ConstSpec::Long(1 << 40))
            .const_field(ACC_STATIC | ACC_FINAL, "FLOAT", "F", ConstSpec::Float(1.5))
            .const_field(ACC_STATIC | ACC_FINAL, "DOUBLE", "D", ConstSpec::Double(2.5))
            .const_field(
                ACC_STATIC | ACC_FINAL,
                "STR",
                "Ljava/lang/String;",
                ConstSpec::Str("hi".to_string()),
            )
            .finish(),
    )]);
    let k = cp.lookup(&ClassSymbol::new("p/K")).unwrap();
    let get = |name: &str| k.field(name).unwrap().constant.clone().unwrap();
    assert_eq!(get("BOOL"), Const::Boolean(true));
    assert_eq!(get("BYTE"), Const::Byte(-2));
    assert_eq!(get("SHORT"), Const::Short(300));
    assert_eq!(get("CHAR"), Const::Char(65));
    assert_eq!(get("INT"), Const::Int(42));
    assert_eq!(get("LONG"), Const::Long(1 << 40));
    assert_eq!(get("FLOAT"), Const::Float(1.5));
    assert_eq!(get("DOUBLE"), Const::Double(2.5));
    assert_eq!(get("STR"), Const::String("hi".to_string()));
}

#[test]
fn generic_signatures_translate_into_the_type_ir() {
    let (_dir, cp) = open(&[(
        "p/Box.class".to_string(),
        ClassBuilder::new(ACC_PUBLIC, "p/Box")
            .signature("<T:Ljava/lang/Number;>Ljava/lang/Object;Ljava/lang/Comparable<TT;>;")
            .generic_method(
                ACC_PUBLIC,
                "get",
                "(I)Ljava/lang/Object;",
                "(I)TT;",
            )
            .generic_method(
                ACC_PUBLIC,
                "wild",
                "()Ljava/util/List;",
                "()Ljava/util/List<+Ljava/lang/Number;>;",
            )
            .finish(),
    )]);
    let class = cp.lookup(&ClassSymbol::new("p/Box")).unwrap();
    assert_eq!(class.type_parameters.len(), 1);
    let (tv, info) = &class.type_parameters[0];
    assert_eq!(tv.name.as_str(), "T");
    assert_eq!(
        info.upper_bound.first_bound().class_sym(),
        Some(&ClassSymbol::new("java/lang/Number"))
    );

    let iface = &class.interface_types[0];
    let Type::Class(iface) = iface else {
        panic!("expected class type");
    };
    assert_eq!(iface.leaf_sym(), &ClassSymbol::new("java/lang/Comparable"));
    assert!(matches!(iface.leaf().targs[0], Type::TyVar(_)));

    let get = class.methods.iter().find(|m| m.sym.name.as_str() == "get").unwrap();
    assert!(matches!(get.return_type, Type::TyVar(_)));
    assert_eq!(get.params[0].ty, Type::prim(PrimKind::Int));

    let wild = class.methods.iter().find(|m| m.sym.name.as_str() == "wild").unwrap();
    let Type::Class(list) = &wild.return_type else {
        panic!("expected class return");
    };
    assert!(matches!(
        list.leaf().targs[0],
        Type::Wild(WildTy::Upper { .. })
    ));
}

#[test]
fn inner_class_records_shape_owners_and_children() {
    let (_dir, cp) = open(&[
        (
            "p/Outer.class".to_string(),
            ClassBuilder::new(ACC_PUBLIC, "p/Outer")
                .inner_class("p/Outer$Inner", Some("p/Outer"), Some("Inner"), ACC_PUBLIC | ACC_STATIC)
                .finish(),
        ),
        (
            "p/Outer$Inner.class".to_string(),
            ClassBuilder::new(ACC_PUBLIC, "p/Outer$Inner")
                .inner_class("p/Outer$Inner", Some("p/Outer"), Some("Inner"), ACC_PUBLIC | ACC_STATIC)
                .finish(),
        ),
    ]);
    let outer = cp.lookup(&ClassSymbol::new("p/Outer")).unwrap();
    assert_eq!(
        outer.children.get("Inner"),
        Some(&ClassSymbol::new("p/Outer$Inner"))
    );
    let inner = cp.lookup(&ClassSymbol::new("p/Outer$Inner")).unwrap();
    assert_eq!(inner.owner, Some(ClassSymbol::new("p/Outer")));
    // The InnerClasses record supplies the declaration-level access bits.
    assert_ne!(inner.access & u32::from(ACC_STATIC), 0);
}

#[test]
fn annotation_classes_carry_metadata() {
    let retention = AnnoSpec {
        type_descriptor: "Ljava/lang/annotation/Retention;".to_string(),
        elements: vec![(
            "value".to_string(),
            ElemSpec::EnumConst {
                type_descriptor: "Ljava/lang/annotation/RetentionPolicy;".to_string(),
                name: "RUNTIME".to_string(),
            },
        )],
    };
    let (_dir, cp) = open(&[(
        "p/M.class".to_string(),
        ClassBuilder::new(
            ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT | ACC_ANNOTATION,
            "p/M",
        )
        .interface("java/lang/annotation/Annotation")
        .annotation(retention)
        .annotation(AnnoSpec::marker("Ljava/lang/annotation/Inherited;"))
        .annotation_method(
            ACC_PUBLIC | ACC_ABSTRACT,
            "value",
            "()I",
            Some(ElemSpec::Int(3)),
        )
        .finish(),
    )]);
    let m = cp.lookup(&ClassSymbol::new("p/M")).unwrap();
    assert_eq!(m.kind, ClassKind::Annotation);
    let metadata = m.annotation_metadata.clone().unwrap();
    assert_eq!(metadata.retention, RetentionPolicy::Runtime);
    assert!(metadata.inherited);
    assert_eq!(
        m.methods[0].default_value,
        Some(Const::Int(3))
    );
}

#[test]
fn synthetic_profile_annotations_are_dropped() {
    let (_dir, cp) = open(&[(
        "p/A.class".to_string(),
        ClassBuilder::new(ACC_PUBLIC, "p/A")
            .annotation(AnnoSpec::marker("Ljdk/Profile+Annotation;"))
            .annotation(AnnoSpec::marker("Lp/Real;"))
            .finish(),
    )]);
    let a = cp.lookup(&ClassSymbol::new("p/A")).unwrap();
    assert_eq!(a.annotations.len(), 1);
    assert_eq!(a.annotations[0].sym, ClassSymbol::new("p/Real"));
}

#[test]
fn ct_sym_release_views_select_by_label() {
    let dir = tempfile::tempdir().unwrap();
    let ct_sym = dir.path().join("ct.sym");
    write_jar(
        &ct_sym,
        &[
            (
                "89A/java.base/java/lang/Object.sig".to_string(),
                ClassBuilder::new(ACC_PUBLIC, "java/lang/Object")
                    .super_class(None)
                    .finish(),
            ),
            (
                "A/java.base/java/lang/NewInTen.sig".to_string(),
                ClassBuilder::new(ACC_PUBLIC, "java/lang/NewInTen").finish(),
            ),
        ],
    )
    .unwrap();

    let eight = Classpath::open_ct_sym(&ct_sym, 8).unwrap();
    assert!(eight.contains(&ClassSymbol::new("java/lang/Object")));
    assert!(!eight.contains(&ClassSymbol::new("java/lang/NewInTen")));
    assert!(eight.lookup(&ClassSymbol::new("java/lang/Object")).is_some());

    let ten = Classpath::open_ct_sym(&ct_sym, 10).unwrap();
    assert!(ten.contains(&ClassSymbol::new("java/lang/Object")));
    assert!(ten.contains(&ClassSymbol::new("java/lang/NewInTen")));

    assert!(matches!(
        Classpath::open_ct_sym(&ct_sym, 40),
        Err(ClasspathError::Release(40))
    ));
}
