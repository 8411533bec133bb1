//! Identifier names.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use smol_str::SmolStr;

/// An identifier: a Java simple name, package segment, or module-name part.
///
/// Names deref to `str`, so string methods and comparisons apply directly;
/// the [`SmolStr`] backing keeps the short names this compiler traffics in
/// inline, and cloning one never allocates.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(SmolStr);

impl Name {
    #[inline]
    pub fn new(text: impl AsRef<str>) -> Name {
        Name(SmolStr::new(text))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Name {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Name {
        Name::new(text)
    }
}

impl From<String> for Name {
    fn from(text: String) -> Name {
        Name::new(text)
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        **self == *other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        **self == **other
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.as_str())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derefs_to_str() {
        let name = Name::new("value");
        assert_eq!(name.len(), 5);
        assert!(!name.is_empty());
        assert!(name.starts_with("val"));
        assert_eq!(name, "value");
    }

    #[test]
    fn map_lookups_borrow_str() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(Name::new("Inner"), 1);
        assert_eq!(map.get("Inner"), Some(&1));
    }
}
