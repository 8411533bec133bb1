//! The lexer.
//!
//! Lexes the whole file, including the bodies the parser later skips.
//! Doc comments are not tokens; a `@deprecated` tag in a doc comment sets a
//! flag on the token that follows it, which is all the header level needs.

use javelin_core::Name;
use text_size::{TextRange, TextSize};

use crate::parser::{ParseError, ParseErrorKind};
use crate::token::{Keyword, Token, TokenKind};
use crate::version::LanguageVersion;

pub fn lex(text: &str, version: LanguageVersion) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        text,
        bytes: text.as_bytes(),
        pos: 0,
        version,
    };
    lexer.run()
}

struct Lexer<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    version: LanguageVersion,
}

impl<'a> Lexer<'a> {
    fn run(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let deprecated_doc = self.skip_trivia()?;
            let start = self.pos;
            if self.at_eof() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    range: TextRange::empty(TextSize::from(start as u32)),
                    deprecated_doc,
                });
                return Ok(tokens);
            }
            let kind = self.next_kind()?;
            tokens.push(Token {
                kind,
                range: TextRange::new(
                    TextSize::from(start as u32),
                    TextSize::from(self.pos as u32),
                ),
                deprecated_doc,
            });
        }
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> u8 {
        self.bytes.get(self.pos).copied().unwrap_or(0)
    }

    fn peek_at(&self, n: usize) -> u8 {
        self.bytes.get(self.pos + n).copied().unwrap_or(0)
    }

    fn bump(&mut self) -> u8 {
        let b = self.peek();
        self.pos += 1;
        b
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == b {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn err(&self, pos: usize, message: impl Into<String>) -> ParseError {
        ParseError {
            kind: ParseErrorKind::UnexpectedInput,
            pos: TextSize::from(pos as u32),
            message: message.into(),
        }
    }

    /// Skips whitespace and comments; returns whether a doc comment with an
    /// `@deprecated` tag immediately precedes the next token.
    fn skip_trivia(&mut self) -> Result<bool, ParseError> {
        let mut deprecated = false;
        loop {
            match self.peek() {
                b' ' | b'\t' | b'\r' | b'\n' | 0x0c => {
                    self.pos += 1;
                }
                b'/' if self.peek_at(1) == b'/' => {
                    while !self.at_eof() && self.peek() != b'\n' {
                        self.pos += 1;
                    }
                }
                b'/' if self.peek_at(1) == b'*' => {
                    let start = self.pos;
                    self.pos += 2;
                    let is_doc = self.peek() == b'*' && self.peek_at(1) != b'/';
                    let body_start = self.pos;
                    loop {
                        if self.at_eof() {
                            return Err(self.err(start, "unterminated comment"));
                        }
                        if self.peek() == b'*' && self.peek_at(1) == b'/' {
                            break;
                        }
                        self.pos += 1;
                    }
                    if is_doc {
                        deprecated = self.text[body_start..self.pos].contains("@deprecated");
                    }
                    self.pos += 2;
                }
                _ => return Ok(deprecated),
            }
        }
    }

    fn next_kind(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        let c = self.peek_char();
        if is_ident_start(c) {
            return Ok(self.lex_word());
        }
        if c.is_ascii_digit() {
            return self.lex_number();
        }
        match self.bump() {
            b'\'' => self.lex_char(start),
            b'"' => self.lex_string(start),
            b'(' => Ok(TokenKind::LParen),
            b')' => Ok(TokenKind::RParen),
            b'{' => Ok(TokenKind::LBrace),
            b'}' => Ok(TokenKind::RBrace),
            b'[' => Ok(TokenKind::LBracket),
            b']' => Ok(TokenKind::RBracket),
            b';' => Ok(TokenKind::Semi),
            b',' => Ok(TokenKind::Comma),
            b'@' => Ok(TokenKind::At),
            b'~' => Ok(TokenKind::Tilde),
            b'?' => Ok(TokenKind::Question),
            b'.' => {
                if self.peek() == b'.' && self.peek_at(1) == b'.' {
                    self.pos += 2;
                    Ok(TokenKind::Ellipsis)
                } else if self.peek().is_ascii_digit() {
                    // A fraction-first float like `.5`.
                    self.pos = start;
                    self.lex_number()
                } else {
                    Ok(TokenKind::Dot)
                }
            }
            b':' => Ok(if self.eat(b':') {
                TokenKind::ColonColon
            } else {
                TokenKind::Colon
            }),
            b'=' => Ok(if self.eat(b'=') {
                TokenKind::EqEq
            } else {
                TokenKind::Assign
            }),
            b'!' => Ok(if self.eat(b'=') {
                TokenKind::NotEq
            } else {
                TokenKind::Bang
            }),
            b'+' => Ok(if self.eat(b'+') {
                TokenKind::PlusPlus
            } else if self.eat(b'=') {
                TokenKind::OpAssign
            } else {
                TokenKind::Plus
            }),
            b'-' => Ok(if self.eat(b'-') {
                TokenKind::MinusMinus
            } else if self.eat(b'=') {
                TokenKind::OpAssign
            } else if self.eat(b'>') {
                TokenKind::Arrow
            } else {
                TokenKind::Minus
            }),
            b'*' => Ok(if self.eat(b'=') {
                TokenKind::OpAssign
            } else {
                TokenKind::Star
            }),
            b'/' => Ok(if self.eat(b'=') {
                TokenKind::OpAssign
            } else {
                TokenKind::Slash
            }),
            b'%' => Ok(if self.eat(b'=') {
                TokenKind::OpAssign
            } else {
                TokenKind::Percent
            }),
            b'^' => Ok(if self.eat(b'=') {
                TokenKind::OpAssign
            } else {
                TokenKind::Caret
            }),
            b'&' => Ok(if self.eat(b'&') {
                TokenKind::AmpAmp
            } else if self.eat(b'=') {
                TokenKind::OpAssign
            } else {
                TokenKind::Amp
            }),
            b'|' => Ok(if self.eat(b'|') {
                TokenKind::BarBar
            } else if self.eat(b'=') {
                TokenKind::OpAssign
            } else {
                TokenKind::Bar
            }),
            b'<' => Ok(if self.eat(b'=') {
                TokenKind::Le
            } else if self.peek() == b'<' {
                self.pos += 1;
                if self.eat(b'=') {
                    TokenKind::OpAssign
                } else {
                    TokenKind::Shl
                }
            } else {
                TokenKind::Lt
            }),
            // `>` is always a single token so the parser can close nested
            // type arguments; adjacent `>`s recombine into shifts there.
            b'>' => Ok(if self.peek() == b'=' && self.peek_at(1) != b'=' {
                self.pos += 1;
                TokenKind::Ge
            } else {
                TokenKind::Gt
            }),
            _ => Err(self.err(start, format!("unexpected input: {c:?}"))),
        }
    }

    fn peek_char(&self) -> char {
        self.text[self.pos..].chars().next().unwrap_or('\0')
    }

    fn lex_word(&mut self) -> TokenKind {
        let start = self.pos;
        let mut chars = self.text[self.pos..].char_indices();
        let mut end = self.text.len();
        while let Some((idx, c)) = chars.next() {
            if idx == 0 {
                continue;
            }
            if !is_ident_continue(c) {
                end = self.pos + idx;
                break;
            }
        }
        if let Some((idx, c)) = self.text[self.pos..].char_indices().next() {
            debug_assert!(idx == 0 && is_ident_start(c));
        }
        let text = &self.text[start..end];
        self.pos = end;
        match Keyword::from_str(text) {
            Some(kw) => TokenKind::Kw(kw),
            None => TokenKind::Ident(Name::new(text)),
        }
    }

    fn lex_number(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        if self.peek() == b'0' && matches!(self.peek_at(1), b'x' | b'X') {
            self.pos += 2;
            let digits = self.take_digits(16, start)?;
            return self.finish_int(u64_from_radix(&digits, 16, self, start)?, start);
        }
        if self.peek() == b'0' && matches!(self.peek_at(1), b'b' | b'B') {
            self.pos += 2;
            let digits = self.take_digits(2, start)?;
            return self.finish_int(u64_from_radix(&digits, 2, self, start)?, start);
        }

        // Decimal, octal, or floating point.
        let int_digits = self.take_digits(10, start).unwrap_or_default();
        let mut is_float = false;
        if self.peek() == b'.' && (self.peek_at(1).is_ascii_digit() || int_digits.is_empty()) {
            is_float = true;
            self.pos += 1;
            let _ = self.take_digits(10, start);
        } else if self.peek() == b'.' && !self.peek_at(1).is_ascii_alphabetic() {
            // `1.` style literal; the dot is part of the number unless it
            // starts a member select like `1 .toString()` (not constant
            // territory anyway).
            is_float = true;
            self.pos += 1;
        }
        if matches!(self.peek(), b'e' | b'E') {
            is_float = true;
            self.pos += 1;
            if matches!(self.peek(), b'+' | b'-') {
                self.pos += 1;
            }
            self.take_digits(10, start)?;
        }

        match self.peek() {
            b'f' | b'F' => {
                self.pos += 1;
                let text = clean(&self.text[start..self.pos - 1]);
                let value: f64 = text
                    .parse()
                    .map_err(|_| self.err(start, "invalid float literal"))?;
                Ok(TokenKind::FloatLit { value, float: true })
            }
            b'd' | b'D' => {
                self.pos += 1;
                let text = clean(&self.text[start..self.pos - 1]);
                let value: f64 = text
                    .parse()
                    .map_err(|_| self.err(start, "invalid double literal"))?;
                Ok(TokenKind::FloatLit {
                    value,
                    float: false,
                })
            }
            _ if is_float => {
                let text = clean(&self.text[start..self.pos]);
                let value: f64 = text
                    .parse()
                    .map_err(|_| self.err(start, "invalid double literal"))?;
                Ok(TokenKind::FloatLit {
                    value,
                    float: false,
                })
            }
            _ => {
                let text = clean(&self.text[start..self.pos]);
                let value = if text.len() > 1 && text.starts_with('0') {
                    u64::from_str_radix(&text[1..], 8)
                        .map_err(|_| self.err(start, "invalid octal literal"))?
                } else {
                    text.parse::<u64>()
                        .map_err(|_| self.err(start, "integer literal out of range"))?
                };
                self.finish_int(value, start)
            }
        }
    }

    fn finish_int(&mut self, value: u64, _start: usize) -> Result<TokenKind, ParseError> {
        let long = matches!(self.peek(), b'l' | b'L');
        if long {
            self.pos += 1;
        }
        Ok(TokenKind::IntLit { value, long })
    }

    fn take_digits(&mut self, radix: u32, start: usize) -> Result<String, ParseError> {
        let mut out = String::new();
        loop {
            let b = self.peek();
            if b == b'_' {
                self.pos += 1;
                continue;
            }
            if (b as char).is_digit(radix) {
                out.push(b as char);
                self.pos += 1;
                continue;
            }
            break;
        }
        if out.is_empty() {
            return Err(self.err(start, "malformed numeric literal"));
        }
        Ok(out)
    }

    fn lex_char(&mut self, start: usize) -> Result<TokenKind, ParseError> {
        let unit = match self.peek() {
            b'\\' => self.lex_escape(start)?,
            b'\'' => return Err(self.err(start, "empty char literal")),
            _ => {
                let c = self.peek_char();
                self.pos += c.len_utf8();
                let mut units = [0u16; 2];
                let encoded = c.encode_utf16(&mut units);
                if encoded.len() != 1 {
                    return Err(self.err(start, "char literal out of range"));
                }
                encoded[0]
            }
        };
        if !self.eat(b'\'') {
            return Err(self.err(start, "unterminated char literal"));
        }
        Ok(TokenKind::CharLit(unit))
    }

    fn lex_string(&mut self, start: usize) -> Result<TokenKind, ParseError> {
        if self.peek() == b'"' && self.peek_at(1) == b'"' {
            self.pos += 2;
            return self.lex_text_block(start);
        }
        let mut out = String::new();
        loop {
            match self.peek() {
                0 if self.at_eof() => return Err(self.err(start, "unterminated string literal")),
                b'"' => {
                    self.pos += 1;
                    return Ok(TokenKind::StringLit(out));
                }
                b'\n' => return Err(self.err(start, "unterminated string literal")),
                b'\\' => {
                    let unit = self.lex_escape(start)?;
                    push_utf16_unit(&mut out, unit);
                }
                _ => {
                    let c = self.peek_char();
                    self.pos += c.len_utf8();
                    out.push(c);
                }
            }
        }
    }

    fn lex_text_block(&mut self, start: usize) -> Result<TokenKind, ParseError> {
        if !self.version.supports_text_blocks() {
            return Err(ParseError {
                kind: ParseErrorKind::FeatureNotSupported,
                pos: TextSize::from(start as u32),
                message: format!(
                    "text blocks are not supported at language level {}",
                    self.version.level()
                ),
            });
        }
        // Skip the rest of the opening line.
        while !self.at_eof() && self.bump() != b'\n' {}
        let body_start = self.pos;
        let body_end;
        loop {
            if self.at_eof() {
                return Err(self.err(start, "unterminated text block"));
            }
            if self.peek() == b'"' && self.peek_at(1) == b'"' && self.peek_at(2) == b'"' {
                body_end = self.pos;
                self.pos += 3;
                break;
            }
            self.pos += 1;
        }
        let raw = &self.text[body_start..body_end];
        Ok(TokenKind::StringLit(strip_text_block(raw)))
    }

    fn lex_escape(&mut self, start: usize) -> Result<u16, ParseError> {
        debug_assert_eq!(self.peek(), b'\\');
        self.pos += 1;
        let b = self.bump();
        Ok(match b {
            b'b' => 0x0008,
            b't' => b'\t' as u16,
            b'n' => b'\n' as u16,
            b'f' => 0x000c,
            b'r' => b'\r' as u16,
            b's' => b' ' as u16,
            b'"' => b'"' as u16,
            b'\'' => b'\'' as u16,
            b'\\' => b'\\' as u16,
            b'u' => {
                // Unicode escapes may stack any number of `u`s.
                while self.peek() == b'u' {
                    self.pos += 1;
                }
                let mut value = 0u32;
                for _ in 0..4 {
                    let d = (self.bump() as char)
                        .to_digit(16)
                        .ok_or_else(|| self.err(start, "invalid unicode escape"))?;
                    value = value * 16 + d;
                }
                value as u16
            }
            b'0'..=b'7' => {
                let mut value = (b - b'0') as u32;
                for _ in 0..2 {
                    match self.peek() {
                        d @ b'0'..=b'7' if value * 8 + (d - b'0') as u32 <= 0o377 => {
                            value = value * 8 + (d - b'0') as u32;
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                value as u16
            }
            _ => return Err(self.err(start, "invalid escape sequence")),
        })
    }
}

fn clean(text: &str) -> String {
    text.chars().filter(|&c| c != '_').collect()
}

fn u64_from_radix(
    digits: &str,
    radix: u32,
    lexer: &Lexer<'_>,
    start: usize,
) -> Result<u64, ParseError> {
    u64::from_str_radix(digits, radix).map_err(|_| lexer.err(start, "integer literal out of range"))
}

fn push_utf16_unit(out: &mut String, unit: u16) {
    out.push(char::from_u32(unit as u32).unwrap_or(char::REPLACEMENT_CHARACTER));
}

/// Removes the incidental leading whitespace of a text block body.
fn strip_text_block(raw: &str) -> String {
    let lines: Vec<&str> = raw.split('\n').collect();
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    let mut out = Vec::with_capacity(lines.len());
    for line in &lines {
        let trimmed = if line.len() >= indent { &line[indent..] } else { "" };
        out.push(trimmed.trim_end_matches('\r'));
    }
    // The newline before the closing delimiter is not part of the value.
    if out.last().is_some_and(|l| l.trim().is_empty()) {
        out.pop();
        let mut s = out.join("\n");
        s.push('\n');
        return s;
    }
    out.join("\n")
}

fn is_ident_start(c: char) -> bool {
    unicode_ident::is_xid_start(c) || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    unicode_ident::is_xid_continue(c) || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        lex(text, LanguageVersion::LATEST)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn words_and_punct() {
        let toks = kinds("class Foo<T> { }");
        assert_eq!(
            toks,
            vec![
                TokenKind::Kw(Keyword::Class),
                TokenKind::Ident(Name::new("Foo")),
                TokenKind::Lt,
                TokenKind::Ident(Name::new("T")),
                TokenKind::Gt,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numeric_literals() {
        assert_eq!(
            kinds("42 0x10 0b101 010 1_000_000L"),
            vec![
                TokenKind::IntLit {
                    value: 42,
                    long: false
                },
                TokenKind::IntLit {
                    value: 16,
                    long: false
                },
                TokenKind::IntLit {
                    value: 5,
                    long: false
                },
                TokenKind::IntLit {
                    value: 8,
                    long: false
                },
                TokenKind::IntLit {
                    value: 1_000_000,
                    long: true
                },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn float_literals() {
        assert_eq!(
            kinds("1.5 2f 3.0d 1e3"),
            vec![
                TokenKind::FloatLit {
                    value: 1.5,
                    float: false
                },
                TokenKind::FloatLit {
                    value: 2.0,
                    float: true
                },
                TokenKind::FloatLit {
                    value: 3.0,
                    float: false
                },
                TokenKind::FloatLit {
                    value: 1000.0,
                    float: false
                },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn char_and_string_escapes() {
        assert_eq!(
            kinds(r#"'\n' "a\tb" 'A'"#),
            vec![
                TokenKind::CharLit(b'\n' as u16),
                TokenKind::StringLit("a\tb".to_string()),
                TokenKind::CharLit(0x41),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn adjacent_gt_stays_split() {
        assert_eq!(
            kinds("Map<String, List<String>>"),
            vec![
                TokenKind::Ident(Name::new("Map")),
                TokenKind::Lt,
                TokenKind::Ident(Name::new("String")),
                TokenKind::Comma,
                TokenKind::Ident(Name::new("List")),
                TokenKind::Lt,
                TokenKind::Ident(Name::new("String")),
                TokenKind::Gt,
                TokenKind::Gt,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn deprecated_doc_flag() {
        let toks = lex(
            "/** @deprecated gone */ class A {} class B {}",
            LanguageVersion::LATEST,
        )
        .unwrap();
        assert!(toks[0].deprecated_doc);
        assert!(!toks[3].deprecated_doc);
    }

    #[test]
    fn text_block() {
        let toks = kinds("\"\"\"\n  hello\n  world\n  \"\"\"");
        assert_eq!(
            toks,
            vec![
                TokenKind::StringLit("hello\nworld\n".to_string()),
                TokenKind::Eof
            ]
        );
    }
}
