//! Round trips through the test emitter.

use javelin_classfile::{ClassFile, PoolConstant, RawConst, RawElementValue};
use javelin_testkit::{AnnoSpec, ClassBuilder, ConstSpec, ElemSpec};
use pretty_assertions::assert_eq;

const ACC_PUBLIC: u16 = 0x0001;
const ACC_STATIC: u16 = 0x0008;
const ACC_FINAL: u16 = 0x0010;

#[test]
fn class_shape_round_trips() {
    let bytes = ClassBuilder::new(ACC_PUBLIC | ACC_FINAL, "p/Sample")
        .super_class(Some("p/Base"))
        .interface("p/I1")
        .interface("p/I2")
        .signature("Lp/Base;Lp/I1;Lp/I2;")
        .field(ACC_PUBLIC, "plain", "I")
        .method(ACC_PUBLIC, "run", "()V")
        .finish();
    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.this_class, "p/Sample");
    assert_eq!(class.super_class.as_deref(), Some("p/Base"));
    assert_eq!(class.interfaces, vec!["p/I1", "p/I2"]);
    assert_eq!(class.signature.as_deref(), Some("Lp/Base;Lp/I1;Lp/I2;"));
    assert_eq!(class.fields.len(), 1);
    assert_eq!(class.methods[0].name, "run");
    assert_eq!(class.methods[0].descriptor, "()V");
}

#[test]
fn constant_values_stay_raw_in_the_pool_form() {
    // boolean/byte/short/char constants are Integer pool entries; re-typing
    // by descriptor happens a layer up.
    let bytes = ClassBuilder::new(ACC_PUBLIC, "p/K")
        .const_field(ACC_STATIC | ACC_FINAL, "FLAG", "Z", ConstSpec::Int(1))
        .const_field(
            ACC_STATIC | ACC_FINAL,
            "NAME",
            "Ljava/lang/String;",
            ConstSpec::Str("k".to_string()),
        )
        .finish();
    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.fields[0].constant, Some(PoolConstant::Int(1)));
    assert_eq!(
        class.fields[1].constant,
        Some(PoolConstant::String("k".to_string()))
    );
}

#[test]
fn annotations_with_element_values() {
    let bytes = ClassBuilder::new(ACC_PUBLIC, "p/A")
        .annotation(AnnoSpec {
            type_descriptor: "Lp/M;".to_string(),
            elements: vec![
                ("n".to_string(), ElemSpec::Int(7)),
                (
                    "names".to_string(),
                    ElemSpec::Array(vec![
                        ElemSpec::Str("a".to_string()),
                        ElemSpec::Str("b".to_string()),
                    ]),
                ),
                ("cls".to_string(), ElemSpec::ClassDesc("Lp/A;".to_string())),
                (
                    "nested".to_string(),
                    ElemSpec::Anno(AnnoSpec::marker("Lp/N;")),
                ),
            ],
        })
        .finish();
    let class = ClassFile::parse(&bytes).unwrap();
    let anno = &class.annotations[0];
    assert_eq!(anno.internal_name(), Some("p/M"));
    assert_eq!(
        anno.elements[0],
        ("n".to_string(), RawElementValue::Const(RawConst::Int(7)))
    );
    let RawElementValue::Array(values) = &anno.elements[1].1 else {
        panic!("expected array element");
    };
    assert_eq!(values.len(), 2);
    assert_eq!(
        anno.elements[2].1,
        RawElementValue::Class("Lp/A;".to_string())
    );
    assert!(matches!(
        anno.elements[3].1,
        RawElementValue::Annotation(_)
    ));
}

#[test]
fn permitted_subclasses_and_inner_classes() {
    let bytes = ClassBuilder::new(ACC_PUBLIC, "p/Sealed")
        .permitted_subclass("p/A")
        .permitted_subclass("p/B")
        .inner_class("p/Sealed$X", Some("p/Sealed"), Some("X"), ACC_PUBLIC)
        .finish();
    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.permitted_subclasses, vec!["p/A", "p/B"]);
    assert_eq!(class.inner_classes.len(), 1);
    assert_eq!(class.inner_classes[0].inner_name.as_deref(), Some("X"));
}

#[test]
fn truncated_input_is_rejected() {
    let bytes = ClassBuilder::new(ACC_PUBLIC, "p/A").finish();
    assert!(ClassFile::parse(&bytes[..bytes.len() - 3]).is_err());
    assert!(ClassFile::parse(&[0xDE, 0xAD, 0xBE, 0xEF]).is_err());
}
