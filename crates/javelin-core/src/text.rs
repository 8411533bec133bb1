//! Line/column bookkeeping for diagnostics.

use text_size::TextSize;

/// Maps byte offsets to one-based line numbers and the text of each line.
///
/// Built once per source file when an error needs rendering; lookups are a
/// binary search over line start offsets.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Byte offset of the first character of each line.
    starts: Vec<u32>,
    len: u32,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0u32];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i as u32 + 1);
            }
        }
        Self {
            starts,
            len: text.len() as u32,
        }
    }

    /// One-based line number containing `pos`.
    pub fn line(&self, pos: TextSize) -> u32 {
        let offset: u32 = pos.into();
        let offset = offset.min(self.len);
        match self.starts.binary_search(&offset) {
            Ok(idx) => idx as u32 + 1,
            Err(idx) => idx as u32,
        }
    }

    /// Zero-based column of `pos` within its line, in bytes.
    pub fn column(&self, pos: TextSize) -> u32 {
        let offset: u32 = pos.into();
        let offset = offset.min(self.len);
        let line = self.line(pos) as usize - 1;
        offset - self.starts[line]
    }

    /// The text of the one-based line `line`, without its terminator.
    pub fn line_text<'a>(&self, text: &'a str, line: u32) -> &'a str {
        let idx = line as usize - 1;
        let start = self.starts[idx] as usize;
        let end = self
            .starts
            .get(idx + 1)
            .map(|&s| s as usize)
            .unwrap_or(text.len());
        text[start..end].trim_end_matches(['\n', '\r'])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_and_column() {
        let text = "ab\ncd\n\nef";
        let map = LineMap::new(text);
        assert_eq!(map.line(TextSize::from(0)), 1);
        assert_eq!(map.line(TextSize::from(2)), 1);
        assert_eq!(map.line(TextSize::from(3)), 2);
        assert_eq!(map.column(TextSize::from(4)), 1);
        assert_eq!(map.line(TextSize::from(6)), 3);
        assert_eq!(map.line(TextSize::from(8)), 4);
        assert_eq!(map.line_text(text, 2), "cd");
        assert_eq!(map.line_text(text, 4), "ef");
    }
}
