//! The class-file model.

use crate::anno::{parse_annotation_list, RawAnnotation, RawElementValue};
use crate::bytes::ByteReader;
use crate::error::{ClassFileError, Result};
use crate::pool::{ConstPool, PoolEntry};

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    /// Internal name, e.g. `java/util/Map$Entry`.
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub signature: Option<String>,
    pub annotations: Vec<RawAnnotation>,
    pub inner_classes: Vec<InnerClassRec>,
    pub permitted_subclasses: Vec<String>,
    pub is_record: bool,
    pub is_deprecated: bool,
    pub fields: Vec<RawField>,
    pub methods: Vec<RawMethod>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InnerClassRec {
    pub inner_class: String,
    pub outer_class: Option<String>,
    pub inner_name: Option<String>,
    pub access_flags: u16,
}

#[derive(Debug, Clone)]
pub struct RawField {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub constant: Option<PoolConstant>,
    pub annotations: Vec<RawAnnotation>,
    pub is_deprecated: bool,
}

#[derive(Debug, Clone)]
pub struct RawMethod {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub exceptions: Vec<String>,
    pub annotation_default: Option<RawElementValue>,
    pub annotations: Vec<RawAnnotation>,
    pub is_deprecated: bool,
}

/// A `ConstantValue` payload before re-typing against the declared
/// descriptor: the pool stores `boolean`, `byte`, `short`, and `char`
/// constants as ints.
#[derive(Debug, Clone, PartialEq)]
pub enum PoolConstant {
    Int(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    String(String),
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::new(bytes);
        let magic = r.take_u32()?;
        if magic != 0xCAFE_BABE {
            return Err(ClassFileError::BadMagic(magic));
        }
        let minor_version = r.take_u16()?;
        let major_version = r.take_u16()?;
        let pool = ConstPool::parse(&mut r)?;

        let access_flags = r.take_u16()?;
        let this_class = pool.class_name(r.take_u16()?)?.to_string();
        let super_index = r.take_u16()?;
        let super_class = if super_index == 0 {
            None
        } else {
            Some(pool.class_name(super_index)?.to_string())
        };

        let interface_count = r.take_u16()? as usize;
        let mut interfaces = Vec::with_capacity(interface_count);
        for _ in 0..interface_count {
            interfaces.push(pool.class_name(r.take_u16()?)?.to_string());
        }

        let field_count = r.take_u16()? as usize;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            fields.push(parse_field(&mut r, &pool)?);
        }

        let method_count = r.take_u16()? as usize;
        let mut methods = Vec::with_capacity(method_count);
        for _ in 0..method_count {
            methods.push(parse_method(&mut r, &pool)?);
        }

        let mut class = ClassFile {
            minor_version,
            major_version,
            access_flags,
            this_class,
            super_class,
            interfaces,
            signature: None,
            annotations: Vec::new(),
            inner_classes: Vec::new(),
            permitted_subclasses: Vec::new(),
            is_record: false,
            is_deprecated: false,
            fields,
            methods,
        };

        let attr_count = r.take_u16()? as usize;
        for _ in 0..attr_count {
            let name_index = r.take_u16()?;
            let len = r.take_u32()? as usize;
            let payload = r.take_slice(len)?;
            let name = pool.utf8(name_index)?;
            let mut sub = ByteReader::new(payload);
            match name {
                "Signature" => {
                    class.signature = Some(pool.utf8(sub.take_u16()?)?.to_string());
                }
                "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                    class
                        .annotations
                        .extend(parse_annotation_list(&mut sub, &pool)?);
                }
                "InnerClasses" => {
                    let count = sub.take_u16()? as usize;
                    for _ in 0..count {
                        let inner_index = sub.take_u16()?;
                        let outer_index = sub.take_u16()?;
                        let name_index = sub.take_u16()?;
                        let inner_access = sub.take_u16()?;
                        class.inner_classes.push(InnerClassRec {
                            inner_class: pool.class_name(inner_index)?.to_string(),
                            outer_class: if outer_index == 0 {
                                None
                            } else {
                                Some(pool.class_name(outer_index)?.to_string())
                            },
                            inner_name: if name_index == 0 {
                                None
                            } else {
                                Some(pool.utf8(name_index)?.to_string())
                            },
                            access_flags: inner_access,
                        });
                    }
                }
                "PermittedSubclasses" => {
                    let count = sub.take_u16()? as usize;
                    for _ in 0..count {
                        class
                            .permitted_subclasses
                            .push(pool.class_name(sub.take_u16()?)?.to_string());
                    }
                }
                "Record" => {
                    class.is_record = true;
                }
                "Deprecated" => {
                    class.is_deprecated = true;
                }
                _ => {}
            }
        }

        r.finish()?;
        Ok(class)
    }
}

fn parse_field(r: &mut ByteReader<'_>, pool: &ConstPool) -> Result<RawField> {
    let access_flags = r.take_u16()?;
    let name = pool.utf8(r.take_u16()?)?.to_string();
    let descriptor = pool.utf8(r.take_u16()?)?.to_string();

    let mut field = RawField {
        access_flags,
        name,
        descriptor,
        signature: None,
        constant: None,
        annotations: Vec::new(),
        is_deprecated: false,
    };

    let attr_count = r.take_u16()? as usize;
    for _ in 0..attr_count {
        let name_index = r.take_u16()?;
        let len = r.take_u32()? as usize;
        let payload = r.take_slice(len)?;
        let mut sub = ByteReader::new(payload);
        match pool.utf8(name_index)? {
            "Signature" => {
                field.signature = Some(pool.utf8(sub.take_u16()?)?.to_string());
            }
            "ConstantValue" => {
                let index = sub.take_u16()?;
                field.constant = Some(match pool.entry(index)? {
                    PoolEntry::Int(v) => PoolConstant::Int(*v),
                    PoolEntry::Float(v) => PoolConstant::Float(*v),
                    PoolEntry::Long(v) => PoolConstant::Long(*v),
                    PoolEntry::Double(v) => PoolConstant::Double(*v),
                    PoolEntry::StringRef(_) => PoolConstant::String(pool.string(index)?),
                    _ => return Err(ClassFileError::BadAttribute("ConstantValue")),
                });
            }
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                field
                    .annotations
                    .extend(parse_annotation_list(&mut sub, pool)?);
            }
            "Deprecated" => {
                field.is_deprecated = true;
            }
            _ => {}
        }
    }
    Ok(field)
}

fn parse_method(r: &mut ByteReader<'_>, pool: &ConstPool) -> Result<RawMethod> {
    let access_flags = r.take_u16()?;
    let name = pool.utf8(r.take_u16()?)?.to_string();
    let descriptor = pool.utf8(r.take_u16()?)?.to_string();

    let mut method = RawMethod {
        access_flags,
        name,
        descriptor,
        signature: None,
        exceptions: Vec::new(),
        annotation_default: None,
        annotations: Vec::new(),
        is_deprecated: false,
    };

    let attr_count = r.take_u16()? as usize;
    for _ in 0..attr_count {
        let name_index = r.take_u16()?;
        let len = r.take_u32()? as usize;
        let payload = r.take_slice(len)?;
        let mut sub = ByteReader::new(payload);
        match pool.utf8(name_index)? {
            "Signature" => {
                method.signature = Some(pool.utf8(sub.take_u16()?)?.to_string());
            }
            "Exceptions" => {
                let count = sub.take_u16()? as usize;
                for _ in 0..count {
                    method
                        .exceptions
                        .push(pool.class_name(sub.take_u16()?)?.to_string());
                }
            }
            "AnnotationDefault" => {
                method.annotation_default = Some(RawElementValue::parse(&mut sub, pool)?);
            }
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                method
                    .annotations
                    .extend(parse_annotation_list(&mut sub, pool)?);
            }
            "Deprecated" => {
                method.is_deprecated = true;
            }
            _ => {}
        }
    }
    Ok(method)
}
