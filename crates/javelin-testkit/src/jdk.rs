//! A minimal synthetic JDK: just enough of `java.lang` and
//! `java.lang.annotation` for the binder's implicit references.

use crate::emit::{ClassBuilder, ElemSpec};

const ACC_PUBLIC: u16 = 0x0001;
const ACC_STATIC: u16 = 0x0008;
const ACC_FINAL: u16 = 0x0010;
const ACC_INTERFACE: u16 = 0x0200;
const ACC_ABSTRACT: u16 = 0x0400;
const ACC_ANNOTATION: u16 = 0x2000;
const ACC_ENUM: u16 = 0x4000;

const PUBLIC_IFACE: u16 = ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT;
const PUBLIC_ANNO: u16 = ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT | ACC_ANNOTATION;
const ENUM_CONST: u16 = ACC_PUBLIC | ACC_STATIC | ACC_FINAL | ACC_ENUM;

pub fn minimal_jdk_classes() -> Vec<(String, Vec<u8>)> {
    let mut out = Vec::new();

    let mut class = |name: &str, bytes: Vec<u8>| {
        out.push((format!("{name}.class"), bytes));
    };

    class(
        "java/lang/Object",
        ClassBuilder::new(ACC_PUBLIC, "java/lang/Object")
            .super_class(None)
            .method(ACC_PUBLIC, "toString", "()Ljava/lang/String;")
            .method(ACC_PUBLIC, "hashCode", "()I")
            .method(ACC_PUBLIC, "equals", "(Ljava/lang/Object;)Z")
            .finish(),
    );
    class(
        "java/lang/String",
        ClassBuilder::new(ACC_PUBLIC | ACC_FINAL, "java/lang/String")
            .interface("java/lang/CharSequence")
            .method(ACC_PUBLIC, "length", "()I")
            .finish(),
    );
    class(
        "java/lang/CharSequence",
        ClassBuilder::new(PUBLIC_IFACE, "java/lang/CharSequence")
            .super_class(None)
            .finish(),
    );
    class(
        "java/lang/Number",
        ClassBuilder::new(ACC_PUBLIC | ACC_ABSTRACT, "java/lang/Number").finish(),
    );
    class(
        "java/lang/Comparable",
        ClassBuilder::new(PUBLIC_IFACE, "java/lang/Comparable")
            .super_class(None)
            .signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
            .generic_method(
                ACC_PUBLIC | ACC_ABSTRACT,
                "compareTo",
                "(Ljava/lang/Object;)I",
                "(TT;)I",
            )
            .finish(),
    );
    class(
        "java/lang/Class",
        ClassBuilder::new(ACC_PUBLIC | ACC_FINAL, "java/lang/Class")
            .signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
            .finish(),
    );
    class(
        "java/lang/Enum",
        ClassBuilder::new(ACC_PUBLIC | ACC_ABSTRACT, "java/lang/Enum")
            .signature("<E:Ljava/lang/Enum<TE;>;>Ljava/lang/Object;Ljava/lang/Comparable<TE;>;")
            .interface("java/lang/Comparable")
            .method(ACC_PUBLIC | ACC_FINAL, "name", "()Ljava/lang/String;")
            .method(ACC_PUBLIC | ACC_FINAL, "ordinal", "()I")
            .finish(),
    );
    class(
        "java/lang/Record",
        ClassBuilder::new(ACC_PUBLIC | ACC_ABSTRACT, "java/lang/Record").finish(),
    );
    class(
        "java/lang/Throwable",
        ClassBuilder::new(ACC_PUBLIC, "java/lang/Throwable").finish(),
    );
    class(
        "java/lang/Exception",
        ClassBuilder::new(ACC_PUBLIC, "java/lang/Exception")
            .super_class(Some("java/lang/Throwable"))
            .finish(),
    );
    class(
        "java/lang/RuntimeException",
        ClassBuilder::new(ACC_PUBLIC, "java/lang/RuntimeException")
            .super_class(Some("java/lang/Exception"))
            .finish(),
    );
    class(
        "java/io/IOException",
        ClassBuilder::new(ACC_PUBLIC, "java/io/IOException")
            .super_class(Some("java/lang/Exception"))
            .finish(),
    );
    class(
        "java/lang/Deprecated",
        ClassBuilder::new(PUBLIC_ANNO, "java/lang/Deprecated")
            .super_class(None)
            .interface("java/lang/annotation/Annotation")
            .annotation_method(
                ACC_PUBLIC | ACC_ABSTRACT,
                "since",
                "()Ljava/lang/String;",
                Some(ElemSpec::Str(String::new())),
            )
            .annotation_method(
                ACC_PUBLIC | ACC_ABSTRACT,
                "forRemoval",
                "()Z",
                Some(ElemSpec::Boolean(false)),
            )
            .finish(),
    );

    class(
        "java/lang/annotation/Annotation",
        ClassBuilder::new(PUBLIC_IFACE, "java/lang/annotation/Annotation")
            .super_class(None)
            .finish(),
    );
    class(
        "java/lang/annotation/Retention",
        ClassBuilder::new(PUBLIC_ANNO, "java/lang/annotation/Retention")
            .super_class(None)
            .interface("java/lang/annotation/Annotation")
            .annotation_method(
                ACC_PUBLIC | ACC_ABSTRACT,
                "value",
                "()Ljava/lang/annotation/RetentionPolicy;",
                None,
            )
            .finish(),
    );
    class(
        "java/lang/annotation/Target",
        ClassBuilder::new(PUBLIC_ANNO, "java/lang/annotation/Target")
            .super_class(None)
            .interface("java/lang/annotation/Annotation")
            .annotation_method(
                ACC_PUBLIC | ACC_ABSTRACT,
                "value",
                "()[Ljava/lang/annotation/ElementType;",
                None,
            )
            .finish(),
    );
    class(
        "java/lang/annotation/Repeatable",
        ClassBuilder::new(PUBLIC_ANNO, "java/lang/annotation/Repeatable")
            .super_class(None)
            .interface("java/lang/annotation/Annotation")
            .annotation_method(
                ACC_PUBLIC | ACC_ABSTRACT,
                "value",
                "()Ljava/lang/Class;",
                None,
            )
            .finish(),
    );
    class(
        "java/lang/annotation/Inherited",
        ClassBuilder::new(PUBLIC_ANNO, "java/lang/annotation/Inherited")
            .super_class(None)
            .interface("java/lang/annotation/Annotation")
            .finish(),
    );

    let retention_policy = ClassBuilder::new(
        ACC_PUBLIC | ACC_FINAL | ACC_ENUM,
        "java/lang/annotation/RetentionPolicy",
    )
    .super_class(Some("java/lang/Enum"))
    .field(ENUM_CONST, "SOURCE", "Ljava/lang/annotation/RetentionPolicy;")
    .field(ENUM_CONST, "CLASS", "Ljava/lang/annotation/RetentionPolicy;")
    .field(ENUM_CONST, "RUNTIME", "Ljava/lang/annotation/RetentionPolicy;")
    .finish();
    class("java/lang/annotation/RetentionPolicy", retention_policy);

    let mut element_type = ClassBuilder::new(
        ACC_PUBLIC | ACC_FINAL | ACC_ENUM,
        "java/lang/annotation/ElementType",
    )
    .super_class(Some("java/lang/Enum"));
    for name in [
        "TYPE",
        "FIELD",
        "METHOD",
        "PARAMETER",
        "CONSTRUCTOR",
        "LOCAL_VARIABLE",
        "ANNOTATION_TYPE",
        "PACKAGE",
        "TYPE_PARAMETER",
        "TYPE_USE",
        "MODULE",
        "RECORD_COMPONENT",
    ] {
        element_type = element_type.field(ENUM_CONST, name, "Ljava/lang/annotation/ElementType;");
    }
    class("java/lang/annotation/ElementType", element_type.finish());

    out
}
