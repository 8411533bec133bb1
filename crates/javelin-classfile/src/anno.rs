//! Runtime-visible and -invisible annotation attributes.

use crate::bytes::ByteReader;
use crate::error::{ClassFileError, Result};
use crate::pool::ConstPool;

/// An annotation as encoded in a class file: a type descriptor plus
/// name/value element pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAnnotation {
    pub type_descriptor: String,
    pub elements: Vec<(String, RawElementValue)>,
}

impl RawAnnotation {
    /// The annotation type's internal name, when the descriptor is the
    /// usual `LClassName;` shape.
    pub fn internal_name(&self) -> Option<&str> {
        self.type_descriptor
            .strip_prefix('L')
            .and_then(|rest| rest.strip_suffix(';'))
    }

    pub(crate) fn parse(r: &mut ByteReader<'_>, pool: &ConstPool) -> Result<Self> {
        let type_descriptor = pool.utf8(r.take_u16()?)?.to_string();
        let count = r.take_u16()? as usize;
        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
            let name = pool.utf8(r.take_u16()?)?.to_string();
            elements.push((name, RawElementValue::parse(r, pool)?));
        }
        Ok(Self {
            type_descriptor,
            elements,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawElementValue {
    Const(RawConst),
    Enum {
        type_descriptor: String,
        const_name: String,
    },
    /// A class literal, as a descriptor (`Ljava/lang/String;`, `I`, `V`).
    Class(String),
    Annotation(Box<RawAnnotation>),
    Array(Vec<RawElementValue>),
}

/// A primitive or string element value, already re-typed by its tag.
/// `Char` is a UTF-16 code unit, matching the constant model upstream.
#[derive(Debug, Clone, PartialEq)]
pub enum RawConst {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Char(u16),
    Float(f32),
    Double(f64),
    String(String),
}

impl RawElementValue {
    pub(crate) fn parse(r: &mut ByteReader<'_>, pool: &ConstPool) -> Result<Self> {
        let tag = r.take_u8()?;
        Ok(match tag {
            // The int-family tags share an Integer pool entry and re-type it.
            b'B' => RawElementValue::Const(RawConst::Byte(pool.int(r.take_u16()?)? as i8)),
            b'C' => RawElementValue::Const(RawConst::Char(pool.int(r.take_u16()?)? as u16)),
            b'S' => RawElementValue::Const(RawConst::Short(pool.int(r.take_u16()?)? as i16)),
            b'I' => RawElementValue::Const(RawConst::Int(pool.int(r.take_u16()?)?)),
            b'Z' => RawElementValue::Const(RawConst::Boolean(pool.int(r.take_u16()?)? != 0)),
            b'J' => {
                let index = r.take_u16()?;
                match pool.entry(index)? {
                    crate::pool::PoolEntry::Long(v) => {
                        RawElementValue::Const(RawConst::Long(*v))
                    }
                    _ => return Err(ClassFileError::BadAttribute("element_value")),
                }
            }
            b'F' => {
                let index = r.take_u16()?;
                match pool.entry(index)? {
                    crate::pool::PoolEntry::Float(v) => {
                        RawElementValue::Const(RawConst::Float(*v))
                    }
                    _ => return Err(ClassFileError::BadAttribute("element_value")),
                }
            }
            b'D' => {
                let index = r.take_u16()?;
                match pool.entry(index)? {
                    crate::pool::PoolEntry::Double(v) => {
                        RawElementValue::Const(RawConst::Double(*v))
                    }
                    _ => return Err(ClassFileError::BadAttribute("element_value")),
                }
            }
            b's' => {
                RawElementValue::Const(RawConst::String(pool.utf8(r.take_u16()?)?.to_string()))
            }
            b'e' => {
                let type_descriptor = pool.utf8(r.take_u16()?)?.to_string();
                let const_name = pool.utf8(r.take_u16()?)?.to_string();
                RawElementValue::Enum {
                    type_descriptor,
                    const_name,
                }
            }
            b'c' => RawElementValue::Class(pool.utf8(r.take_u16()?)?.to_string()),
            b'@' => RawElementValue::Annotation(Box::new(RawAnnotation::parse(r, pool)?)),
            b'[' => {
                let count = r.take_u16()? as usize;
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    values.push(RawElementValue::parse(r, pool)?);
                }
                RawElementValue::Array(values)
            }
            _ => return Err(ClassFileError::BadAttribute("element_value")),
        })
    }
}

pub(crate) fn parse_annotation_list(
    r: &mut ByteReader<'_>,
    pool: &ConstPool,
) -> Result<Vec<RawAnnotation>> {
    let count = r.take_u16()? as usize;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(RawAnnotation::parse(r, pool)?);
    }
    Ok(out)
}
