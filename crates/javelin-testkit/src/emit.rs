//! A small class-file emitter.
//!
//! Covers exactly the attribute surface the reader understands: signatures,
//! constant values, annotations with element values, annotation defaults,
//! inner classes, and permitted subclasses. Test data is ASCII, so UTF-8
//! constants are written verbatim.

use std::collections::HashMap;

const MAJOR_VERSION: u16 = 61; // Java 17

#[derive(Default)]
struct Pool {
    bytes: Vec<u8>,
    count: u16,
    utf8s: HashMap<String, u16>,
    classes: HashMap<String, u16>,
}

impl Pool {
    fn next_index(&mut self, wide: bool) -> u16 {
        let index = self.count + 1;
        self.count += if wide { 2 } else { 1 };
        index
    }

    fn utf8(&mut self, text: &str) -> u16 {
        if let Some(&idx) = self.utf8s.get(text) {
            return idx;
        }
        let idx = self.next_index(false);
        self.bytes.push(1);
        self.bytes.extend((text.len() as u16).to_be_bytes());
        self.bytes.extend(text.as_bytes());
        self.utf8s.insert(text.to_string(), idx);
        idx
    }

    fn class(&mut self, name: &str) -> u16 {
        if let Some(&idx) = self.classes.get(name) {
            return idx;
        }
        let name_idx = self.utf8(name);
        let idx = self.next_index(false);
        self.bytes.push(7);
        self.bytes.extend(name_idx.to_be_bytes());
        self.classes.insert(name.to_string(), idx);
        idx
    }

    fn int(&mut self, value: i32) -> u16 {
        let idx = self.next_index(false);
        self.bytes.push(3);
        self.bytes.extend(value.to_be_bytes());
        idx
    }

    fn float(&mut self, value: f32) -> u16 {
        let idx = self.next_index(false);
        self.bytes.push(4);
        self.bytes.extend(value.to_bits().to_be_bytes());
        idx
    }

    fn long(&mut self, value: i64) -> u16 {
        let idx = self.next_index(true);
        self.bytes.push(5);
        self.bytes.extend(value.to_be_bytes());
        idx
    }

    fn double(&mut self, value: f64) -> u16 {
        let idx = self.next_index(true);
        self.bytes.push(6);
        self.bytes.extend(value.to_bits().to_be_bytes());
        idx
    }

    fn string(&mut self, value: &str) -> u16 {
        let utf8 = self.utf8(value);
        let idx = self.next_index(false);
        self.bytes.push(8);
        self.bytes.extend(utf8.to_be_bytes());
        idx
    }
}

/// A `ConstantValue` payload.
#[derive(Debug, Clone)]
pub enum ConstSpec {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
}

/// An annotation element value.
#[derive(Debug, Clone)]
pub enum ElemSpec {
    Int(i32),
    Boolean(bool),
    Str(String),
    EnumConst { type_descriptor: String, name: String },
    ClassDesc(String),
    Anno(AnnoSpec),
    Array(Vec<ElemSpec>),
}

#[derive(Debug, Clone)]
pub struct AnnoSpec {
    pub type_descriptor: String,
    pub elements: Vec<(String, ElemSpec)>,
}

impl AnnoSpec {
    pub fn marker(type_descriptor: &str) -> AnnoSpec {
        AnnoSpec {
            type_descriptor: type_descriptor.to_string(),
            elements: Vec::new(),
        }
    }
}

struct FieldSpec {
    access: u16,
    name: String,
    descriptor: String,
    signature: Option<String>,
    constant: Option<ConstSpec>,
    annotations: Vec<AnnoSpec>,
}

struct MethodSpec {
    access: u16,
    name: String,
    descriptor: String,
    signature: Option<String>,
    default: Option<ElemSpec>,
    annotations: Vec<AnnoSpec>,
}

struct InnerSpec {
    inner: String,
    outer: Option<String>,
    inner_name: Option<String>,
    access: u16,
}

pub struct ClassBuilder {
    access: u16,
    name: String,
    super_class: Option<String>,
    interfaces: Vec<String>,
    signature: Option<String>,
    fields: Vec<FieldSpec>,
    methods: Vec<MethodSpec>,
    annotations: Vec<AnnoSpec>,
    inner_classes: Vec<InnerSpec>,
    permitted: Vec<String>,
}

impl ClassBuilder {
    pub fn new(access: u16, name: &str) -> ClassBuilder {
        ClassBuilder {
            access,
            name: name.to_string(),
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            signature: None,
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
            inner_classes: Vec::new(),
            permitted: Vec::new(),
        }
    }

    pub fn super_class(mut self, name: Option<&str>) -> Self {
        self.super_class = name.map(str::to_string);
        self
    }

    pub fn interface(mut self, name: &str) -> Self {
        self.interfaces.push(name.to_string());
        self
    }

    pub fn signature(mut self, sig: &str) -> Self {
        self.signature = Some(sig.to_string());
        self
    }

    pub fn annotation(mut self, anno: AnnoSpec) -> Self {
        self.annotations.push(anno);
        self
    }

    pub fn permitted_subclass(mut self, name: &str) -> Self {
        self.permitted.push(name.to_string());
        self
    }

    pub fn inner_class(
        mut self,
        inner: &str,
        outer: Option<&str>,
        inner_name: Option<&str>,
        access: u16,
    ) -> Self {
        self.inner_classes.push(InnerSpec {
            inner: inner.to_string(),
            outer: outer.map(str::to_string),
            inner_name: inner_name.map(str::to_string),
            access,
        });
        self
    }

    pub fn field(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        self.fields.push(FieldSpec {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: None,
            constant: None,
            annotations: Vec::new(),
        });
        self
    }

    pub fn const_field(
        mut self,
        access: u16,
        name: &str,
        descriptor: &str,
        constant: ConstSpec,
    ) -> Self {
        self.fields.push(FieldSpec {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: None,
            constant: Some(constant),
            annotations: Vec::new(),
        });
        self
    }

    pub fn annotated_field(
        mut self,
        access: u16,
        name: &str,
        descriptor: &str,
        annotations: Vec<AnnoSpec>,
    ) -> Self {
        self.fields.push(FieldSpec {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: None,
            constant: None,
            annotations,
        });
        self
    }

    pub fn method(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        self.methods.push(MethodSpec {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: None,
            default: None,
            annotations: Vec::new(),
        });
        self
    }

    pub fn generic_method(mut self, access: u16, name: &str, descriptor: &str, sig: &str) -> Self {
        self.methods.push(MethodSpec {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: Some(sig.to_string()),
            default: None,
            annotations: Vec::new(),
        });
        self
    }

    pub fn annotation_method(
        mut self,
        access: u16,
        name: &str,
        descriptor: &str,
        default: Option<ElemSpec>,
    ) -> Self {
        self.methods.push(MethodSpec {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: None,
            default,
            annotations: Vec::new(),
        });
        self
    }

    pub fn finish(self) -> Vec<u8> {
        let mut pool = Pool::default();
        let mut body = Vec::new();

        body.extend(self.access.to_be_bytes());
        let this_idx = pool.class(&self.name);
        body.extend(this_idx.to_be_bytes());
        let super_idx = match &self.super_class {
            Some(name) => pool.class(name),
            None => 0,
        };
        body.extend(super_idx.to_be_bytes());

        body.extend((self.interfaces.len() as u16).to_be_bytes());
        for iface in &self.interfaces {
            let idx = pool.class(iface);
            body.extend(idx.to_be_bytes());
        }

        body.extend((self.fields.len() as u16).to_be_bytes());
        for field in &self.fields {
            body.extend(field.access.to_be_bytes());
            let name_idx = pool.utf8(&field.name);
            body.extend(name_idx.to_be_bytes());
            let desc_idx = pool.utf8(&field.descriptor);
            body.extend(desc_idx.to_be_bytes());

            let mut attrs: Vec<(u16, Vec<u8>)> = Vec::new();
            if let Some(sig) = &field.signature {
                let sig_idx = pool.utf8(sig);
                attrs.push((pool.utf8("Signature"), sig_idx.to_be_bytes().to_vec()));
            }
            if let Some(constant) = &field.constant {
                let value_idx = match constant {
                    ConstSpec::Int(v) => pool.int(*v),
                    ConstSpec::Long(v) => pool.long(*v),
                    ConstSpec::Float(v) => pool.float(*v),
                    ConstSpec::Double(v) => pool.double(*v),
                    ConstSpec::Str(v) => pool.string(v),
                };
                attrs.push((pool.utf8("ConstantValue"), value_idx.to_be_bytes().to_vec()));
            }
            if !field.annotations.is_empty() {
                let payload = annotation_list(&mut pool, &field.annotations);
                attrs.push((pool.utf8("RuntimeVisibleAnnotations"), payload));
            }
            write_attrs(&mut body, &attrs);
        }

        body.extend((self.methods.len() as u16).to_be_bytes());
        for method in &self.methods {
            body.extend(method.access.to_be_bytes());
            let name_idx = pool.utf8(&method.name);
            body.extend(name_idx.to_be_bytes());
            let desc_idx = pool.utf8(&method.descriptor);
            body.extend(desc_idx.to_be_bytes());

            let mut attrs: Vec<(u16, Vec<u8>)> = Vec::new();
            if let Some(sig) = &method.signature {
                let sig_idx = pool.utf8(sig);
                attrs.push((pool.utf8("Signature"), sig_idx.to_be_bytes().to_vec()));
            }
            if let Some(default) = &method.default {
                let mut payload = Vec::new();
                element_value(&mut pool, default, &mut payload);
                attrs.push((pool.utf8("AnnotationDefault"), payload));
            }
            if !method.annotations.is_empty() {
                let payload = annotation_list(&mut pool, &method.annotations);
                attrs.push((pool.utf8("RuntimeVisibleAnnotations"), payload));
            }
            write_attrs(&mut body, &attrs);
        }

        let mut attrs: Vec<(u16, Vec<u8>)> = Vec::new();
        if let Some(sig) = &self.signature {
            let sig_idx = pool.utf8(sig);
            attrs.push((pool.utf8("Signature"), sig_idx.to_be_bytes().to_vec()));
        }
        if !self.annotations.is_empty() {
            let payload = annotation_list(&mut pool, &self.annotations);
            attrs.push((pool.utf8("RuntimeVisibleAnnotations"), payload));
        }
        if !self.inner_classes.is_empty() {
            let mut payload = Vec::new();
            payload.extend((self.inner_classes.len() as u16).to_be_bytes());
            for inner in &self.inner_classes {
                let inner_idx = pool.class(&inner.inner);
                payload.extend(inner_idx.to_be_bytes());
                let outer_idx = match &inner.outer {
                    Some(name) => pool.class(name),
                    None => 0,
                };
                payload.extend(outer_idx.to_be_bytes());
                let name_idx = match &inner.inner_name {
                    Some(name) => pool.utf8(name),
                    None => 0,
                };
                payload.extend(name_idx.to_be_bytes());
                payload.extend(inner.access.to_be_bytes());
            }
            attrs.push((pool.utf8("InnerClasses"), payload));
        }
        if !self.permitted.is_empty() {
            let mut payload = Vec::new();
            payload.extend((self.permitted.len() as u16).to_be_bytes());
            for name in &self.permitted {
                let idx = pool.class(name);
                payload.extend(idx.to_be_bytes());
            }
            attrs.push((pool.utf8("PermittedSubclasses"), payload));
        }
        write_attrs(&mut body, &attrs);

        let mut out = Vec::new();
        out.extend(0xCAFE_BABEu32.to_be_bytes());
        out.extend(0u16.to_be_bytes());
        out.extend(MAJOR_VERSION.to_be_bytes());
        out.extend((pool.count + 1).to_be_bytes());
        out.extend(&pool.bytes);
        out.extend(&body);
        out
    }
}

fn write_attrs(body: &mut Vec<u8>, attrs: &[(u16, Vec<u8>)]) {
    body.extend((attrs.len() as u16).to_be_bytes());
    for (name_idx, payload) in attrs {
        body.extend(name_idx.to_be_bytes());
        body.extend((payload.len() as u32).to_be_bytes());
        body.extend(payload);
    }
}

fn annotation_list(pool: &mut Pool, annotations: &[AnnoSpec]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend((annotations.len() as u16).to_be_bytes());
    for anno in annotations {
        annotation(pool, anno, &mut out);
    }
    out
}

fn annotation(pool: &mut Pool, anno: &AnnoSpec, out: &mut Vec<u8>) {
    let type_idx = pool.utf8(&anno.type_descriptor);
    out.extend(type_idx.to_be_bytes());
    out.extend((anno.elements.len() as u16).to_be_bytes());
    for (name, value) in &anno.elements {
        let name_idx = pool.utf8(name);
        out.extend(name_idx.to_be_bytes());
        element_value(pool, value, out);
    }
}

fn element_value(pool: &mut Pool, value: &ElemSpec, out: &mut Vec<u8>) {
    match value {
        ElemSpec::Int(v) => {
            out.push(b'I');
            let idx = pool.int(*v);
            out.extend(idx.to_be_bytes());
        }
        ElemSpec::Boolean(v) => {
            out.push(b'Z');
            let idx = pool.int(i32::from(*v));
            out.extend(idx.to_be_bytes());
        }
        ElemSpec::Str(v) => {
            out.push(b's');
            let idx = pool.utf8(v);
            out.extend(idx.to_be_bytes());
        }
        ElemSpec::EnumConst {
            type_descriptor,
            name,
        } => {
            out.push(b'e');
            let type_idx = pool.utf8(type_descriptor);
            out.extend(type_idx.to_be_bytes());
            let name_idx = pool.utf8(name);
            out.extend(name_idx.to_be_bytes());
        }
        ElemSpec::ClassDesc(descriptor) => {
            out.push(b'c');
            let idx = pool.utf8(descriptor);
            out.extend(idx.to_be_bytes());
        }
        ElemSpec::Anno(anno) => {
            out.push(b'@');
            annotation(pool, anno, out);
        }
        ElemSpec::Array(values) => {
            out.push(b'[');
            out.extend((values.len() as u16).to_be_bytes());
            for value in values {
                element_value(pool, value, out);
            }
        }
    }
}
