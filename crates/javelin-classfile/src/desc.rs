//! Field and method descriptors.

use crate::error::{ClassFileError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDesc {
    Prim(Base),
    /// The internal (slash-and-dollar) name of a class.
    Object(String),
    Array(Box<FieldDesc>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDesc {
    pub params: Vec<FieldDesc>,
    /// `None` for `void`.
    pub ret: Option<FieldDesc>,
}

pub fn parse_field_desc(desc: &str) -> Result<FieldDesc> {
    let mut cursor = Cursor::new(desc);
    let ty = cursor.field_type()?;
    cursor.finish()?;
    Ok(ty)
}

pub fn parse_method_desc(desc: &str) -> Result<MethodDesc> {
    let mut cursor = Cursor::new(desc);
    cursor.expect(b'(')?;
    let mut params = Vec::new();
    while cursor.peek() != Some(b')') {
        params.push(cursor.field_type()?);
    }
    cursor.expect(b')')?;
    let ret = if cursor.peek() == Some(b'V') {
        cursor.bump();
        None
    } else {
        Some(cursor.field_type()?)
    };
    cursor.finish()?;
    Ok(MethodDesc { params, ret })
}

pub(crate) struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    pub(crate) fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    pub(crate) fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, b: u8) -> Result<()> {
        if self.bump() == Some(b) {
            Ok(())
        } else {
            Err(self.bad())
        }
    }

    pub(crate) fn finish(&self) -> Result<()> {
        if self.pos == self.text.len() {
            Ok(())
        } else {
            Err(self.bad())
        }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos == self.text.len()
    }

    pub(crate) fn bad(&self) -> ClassFileError {
        ClassFileError::BadDescriptor(self.text.to_string())
    }

    pub(crate) fn bad_signature(&self) -> ClassFileError {
        ClassFileError::BadSignature(self.text.to_string())
    }

    pub(crate) fn base(&mut self) -> Option<Base> {
        let base = match self.peek()? {
            b'B' => Base::Byte,
            b'C' => Base::Char,
            b'D' => Base::Double,
            b'F' => Base::Float,
            b'I' => Base::Int,
            b'J' => Base::Long,
            b'S' => Base::Short,
            b'Z' => Base::Boolean,
            _ => return None,
        };
        self.bump();
        Some(base)
    }

    /// An identifier segment, stopping at descriptor/signature structure
    /// characters.
    pub(crate) fn segment(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b'/' | b';' | b'<' | b'>' | b'.' | b':') {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.bad_signature());
        }
        Ok(self.text[start..self.pos].to_string())
    }

    /// A slash-joined identifier run (`java/util/Map`), stopping at every
    /// structure character except `/`.
    pub(crate) fn qualified(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b';' | b'<' | b'>' | b'.' | b':') {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.bad_signature());
        }
        Ok(self.text[start..self.pos].to_string())
    }

    fn field_type(&mut self) -> Result<FieldDesc> {
        if let Some(base) = self.base() {
            return Ok(FieldDesc::Prim(base));
        }
        match self.bump() {
            Some(b'L') => {
                let start = self.pos;
                loop {
                    match self.bump() {
                        Some(b';') => break,
                        Some(_) => continue,
                        None => return Err(self.bad()),
                    }
                }
                Ok(FieldDesc::Object(self.text[start..self.pos - 1].to_string()))
            }
            Some(b'[') => Ok(FieldDesc::Array(Box::new(self.field_type()?))),
            _ => Err(self.bad()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_descriptors() {
        assert_eq!(parse_field_desc("J").unwrap(), FieldDesc::Prim(Base::Long));
        assert_eq!(
            parse_field_desc("[[Ljava/lang/String;").unwrap(),
            FieldDesc::Array(Box::new(FieldDesc::Array(Box::new(FieldDesc::Object(
                "java/lang/String".to_string()
            )))))
        );
        assert!(parse_field_desc("Ljava/lang/String").is_err());
    }

    #[test]
    fn method_descriptors() {
        let desc = parse_method_desc("(ILjava/util/List;)V").unwrap();
        assert_eq!(desc.params.len(), 2);
        assert_eq!(desc.ret, None);

        let desc = parse_method_desc("()[B").unwrap();
        assert_eq!(
            desc.ret,
            Some(FieldDesc::Array(Box::new(FieldDesc::Prim(Base::Byte))))
        );
    }
}
