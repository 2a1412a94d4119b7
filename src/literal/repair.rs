//! Pass 5: structural repair.
//!
//! Walks the token stream with a container stack, dropping stray commas and
//! replacing any array that cannot be bounded with `[]`. Anomalies outside
//! arrays are passed through untouched for the strict parser to report.

use super::error::{ParseWarning, UnboundedReason};
use super::scanner::{scan, SegmentKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tok<'a> {
    Punct(u8),
    Space(&'a str),
    Bare(&'a str),
    Str(&'a str),
    Stray(&'a str),
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    tok: Tok<'a>,
    offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Key,
    Colon,
    Value,
    Comma,
}

#[derive(Debug)]
enum Frame {
    Array {
        offset: usize,
        out_start: usize,
        expect_element: bool,
        pending_comma: Option<(usize, usize)>,
    },
    Object {
        offset: usize,
        expect: Expect,
        pending_comma: Option<(usize, usize)>,
    },
}

/// Repair `src`, returning the new buffer and what was changed.
pub(crate) fn repair_structure(src: &str) -> (String, Vec<ParseWarning>) {
    let tokens = tokenize(src);
    let mut repairer = Repairer {
        out: String::with_capacity(src.len()),
        frames: Vec::new(),
        warnings: Vec::new(),
    };

    let mut idx = 0;
    while idx < tokens.len() {
        match repairer.feed(&tokens[idx]) {
            Ok(()) => idx += 1,
            Err(reason) => {
                let close = matching_close(&tokens, idx);
                repairer.replace_top_array(reason);
                idx = close + 1;
            }
        }
    }
    repairer.close_open_frames();

    (repairer.out, repairer.warnings)
}

fn tokenize(src: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    for segment in scan(src) {
        match segment.kind {
            SegmentKind::Str { .. } => tokens.push(Token {
                tok: Tok::Str(segment.text),
                offset: segment.offset,
            }),
            SegmentKind::StrayQuote => tokens.push(Token {
                tok: Tok::Stray(segment.text),
                offset: segment.offset,
            }),
            SegmentKind::Comment => tokens.push(Token {
                tok: Tok::Space(segment.text),
                offset: segment.offset,
            }),
            SegmentKind::Code => tokenize_code(segment.text, segment.offset, &mut tokens),
        }
    }
    tokens
}

fn tokenize_code<'a>(code: &'a str, base: usize, tokens: &mut Vec<Token<'a>>) {
    let bytes = code.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        let b = bytes[i];
        let tok = if matches!(b, b'{' | b'}' | b'[' | b']' | b',' | b':') {
            i += 1;
            Tok::Punct(b)
        } else if b.is_ascii_whitespace() {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            Tok::Space(&code[start..i])
        } else {
            while i < bytes.len()
                && !bytes[i].is_ascii_whitespace()
                && !matches!(bytes[i], b'{' | b'}' | b'[' | b']' | b',' | b':')
            {
                i += 1;
            }
            Tok::Bare(&code[start..i])
        };
        tokens.push(Token {
            tok,
            offset: base + start,
        });
    }
}

/// Index of the `]` closing the array that contains token `from`, or the last
/// token when the array never closes.
fn matching_close(tokens: &[Token<'_>], from: usize) -> usize {
    let mut depth = 1usize;
    for (j, token) in tokens.iter().enumerate().skip(from) {
        match token.tok {
            Tok::Punct(b'[') => depth += 1,
            Tok::Punct(b']') => {
                depth -= 1;
                if depth == 0 {
                    return j;
                }
            }
            _ => {}
        }
    }
    tokens.len().saturating_sub(1)
}

struct Repairer {
    out: String,
    frames: Vec<Frame>,
    warnings: Vec<ParseWarning>,
}

impl Repairer {
    fn feed(&mut self, token: &Token<'_>) -> Result<(), UnboundedReason> {
        match self.frames.last() {
            Some(Frame::Array { .. }) => self.feed_array(token),
            Some(Frame::Object { .. }) => {
                self.feed_object(token);
                Ok(())
            }
            None => {
                self.feed_top_level(token);
                Ok(())
            }
        }
    }

    fn feed_top_level(&mut self, token: &Token<'_>) {
        match token.tok {
            Tok::Punct(b'[') => self.open_array(token.offset),
            Tok::Punct(b'{') => self.open_object(token.offset),
            _ => self.emit(token),
        }
    }

    fn feed_array(&mut self, token: &Token<'_>) -> Result<(), UnboundedReason> {
        let Some(Frame::Array {
            expect_element,
            pending_comma,
            ..
        }) = self.frames.last_mut()
        else {
            return Ok(());
        };

        match token.tok {
            Tok::Space(text) => self.out.push_str(text),
            Tok::Punct(b',') => {
                if *expect_element {
                    self.warnings.push(ParseWarning::EmptySlot {
                        offset: token.offset,
                    });
                } else {
                    *expect_element = true;
                    *pending_comma = Some((self.out.len(), token.offset));
                    self.out.push(',');
                }
            }
            Tok::Punct(b']') => {
                self.drop_trailing_comma();
                self.out.push(']');
                self.frames.pop();
                self.value_done();
            }
            Tok::Punct(b'}') | Tok::Punct(b':') => return Err(UnboundedReason::MisplacedDelimiter),
            Tok::Punct(open @ (b'[' | b'{')) => {
                if !*expect_element {
                    return Err(UnboundedReason::MissingComma);
                }
                *expect_element = false;
                *pending_comma = None;
                if open == b'[' {
                    self.open_array(token.offset);
                } else {
                    self.open_object(token.offset);
                }
            }
            Tok::Str(text) => {
                if !*expect_element {
                    return Err(UnboundedReason::MissingComma);
                }
                *expect_element = false;
                *pending_comma = None;
                self.out.push_str(text);
            }
            Tok::Bare(text) => {
                if !is_scalar(text) {
                    return Err(UnboundedReason::PartialElement);
                }
                if !*expect_element {
                    return Err(UnboundedReason::MissingComma);
                }
                *expect_element = false;
                *pending_comma = None;
                self.out.push_str(text);
            }
            Tok::Stray(_) => return Err(UnboundedReason::UnterminatedString),
            Tok::Punct(_) => self.emit(token),
        }
        Ok(())
    }

    fn feed_object(&mut self, token: &Token<'_>) {
        let Some(Frame::Object {
            expect,
            pending_comma,
            ..
        }) = self.frames.last_mut()
        else {
            return;
        };

        match token.tok {
            Tok::Punct(b',') => match *expect {
                Expect::Comma => {
                    *expect = Expect::Key;
                    *pending_comma = Some((self.out.len(), token.offset));
                    self.out.push(',');
                }
                Expect::Key => self.warnings.push(ParseWarning::EmptySlot {
                    offset: token.offset,
                }),
                _ => self.out.push(','),
            },
            Tok::Punct(b'}') => {
                self.drop_trailing_comma();
                self.out.push('}');
                self.frames.pop();
                self.value_done();
            }
            Tok::Punct(b':') => {
                if *expect == Expect::Colon {
                    *expect = Expect::Value;
                }
                self.out.push(':');
            }
            Tok::Punct(b'[') => {
                *pending_comma = None;
                self.open_array(token.offset);
            }
            Tok::Punct(b'{') => {
                *pending_comma = None;
                self.open_object(token.offset);
            }
            Tok::Str(text) => {
                *pending_comma = None;
                *expect = match *expect {
                    Expect::Key => Expect::Colon,
                    _ => Expect::Comma,
                };
                self.out.push_str(text);
            }
            Tok::Bare(text) if *expect == Expect::Key && is_identifier(text) => {
                *pending_comma = None;
                *expect = Expect::Colon;
                self.warnings.push(ParseWarning::UnquotedKey {
                    offset: token.offset,
                    key: text.to_string(),
                });
                self.out.push('"');
                self.out.push_str(text);
                self.out.push('"');
            }
            Tok::Bare(text) => {
                *pending_comma = None;
                if *expect == Expect::Value {
                    *expect = Expect::Comma;
                }
                self.out.push_str(text);
            }
            _ => self.emit(token),
        }
    }

    fn open_array(&mut self, offset: usize) {
        self.frames.push(Frame::Array {
            offset,
            out_start: self.out.len(),
            expect_element: true,
            pending_comma: None,
        });
        self.out.push('[');
    }

    fn open_object(&mut self, offset: usize) {
        self.frames.push(Frame::Object {
            offset,
            expect: Expect::Key,
            pending_comma: None,
        });
        self.out.push('{');
    }

    fn emit(&mut self, token: &Token<'_>) {
        match token.tok {
            Tok::Punct(b) => self.out.push(b as char),
            Tok::Space(text) | Tok::Bare(text) | Tok::Str(text) | Tok::Stray(text) => {
                self.out.push_str(text)
            }
        }
    }

    /// A complete value was written into the top frame
    fn value_done(&mut self) {
        match self.frames.last_mut() {
            Some(Frame::Array { expect_element, .. }) => *expect_element = false,
            Some(Frame::Object { expect, .. }) => {
                if *expect == Expect::Value {
                    *expect = Expect::Comma;
                }
            }
            None => {}
        }
    }

    fn drop_trailing_comma(&mut self) {
        let pending = match self.frames.last_mut() {
            Some(Frame::Array { pending_comma, .. }) | Some(Frame::Object { pending_comma, .. }) => {
                pending_comma.take()
            }
            None => None,
        };
        if let Some((out_pos, offset)) = pending {
            self.out.remove(out_pos);
            self.warnings.push(ParseWarning::TrailingComma { offset });
        }
    }

    /// Replace the array on top of the stack with `[]`
    fn replace_top_array(&mut self, reason: UnboundedReason) {
        if let Some(Frame::Array {
            offset, out_start, ..
        }) = self.frames.pop()
        {
            self.out.truncate(out_start);
            self.out.push_str("[]");
            self.warnings
                .push(ParseWarning::UnboundedArray { offset, reason });
            self.value_done();
        }
    }

    fn close_open_frames(&mut self) {
        while let Some(frame) = self.frames.last() {
            match frame {
                Frame::Array { .. } => self.replace_top_array(UnboundedReason::Unclosed),
                Frame::Object { offset, .. } => {
                    let offset = *offset;
                    self.drop_trailing_comma();
                    self.out.push('}');
                    self.frames.pop();
                    self.warnings.push(ParseWarning::UnclosedObject { offset });
                    self.value_done();
                }
            }
        }
    }
}

fn is_scalar(text: &str) -> bool {
    matches!(text, "true" | "false" | "null") || is_json_number(text)
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// JSON number grammar: `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`
fn is_json_number(text: &str) -> bool {
    let b = text.as_bytes();
    let digits = |mut i: usize| {
        while b.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut i = 0;
    if b.first() == Some(&b'-') {
        i += 1;
    }
    match b.get(i) {
        Some(b'0') => i += 1,
        Some(c) if c.is_ascii_digit() => i = digits(i),
        _ => return false,
    }
    if b.get(i) == Some(&b'.') {
        let end = digits(i + 1);
        if end == i + 1 {
            return false;
        }
        i = end;
    }
    if matches!(b.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(b.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let end = digits(i);
        if end == i {
            return false;
        }
        i = end;
    }
    i == b.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repaired(src: &str) -> String {
        repair_structure(src).0
    }

    #[test]
    fn test_json_numbers() {
        for ok in ["0", "-1", "12.5", "1e-05", "-0.25E+3", "230"] {
            assert!(is_json_number(ok), "{ok}");
        }
        for bad in ["", "-", "1.", ".5", "01", "1e", "1.2.3", "abc", "+3"] {
            assert!(!is_json_number(bad), "{bad}");
        }
    }

    #[test]
    fn test_trailing_and_double_commas() {
        let (out, warnings) = repair_structure(r#"{"a": [1,, 2, ], "b": 3,}"#);
        assert_eq!(out, r#"{"a": [1, 2, ], "b": 3}"#.replace(", ]", " ]"));
        assert_eq!(warnings.len(), 3);
        assert!(serde_json::from_str::<serde_json::Value>(&out).is_ok());
    }

    #[test]
    fn test_leading_comma() {
        assert_eq!(repaired("[,1,2]"), "[1,2]");
        assert_eq!(repaired("{,\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn test_partial_element_empties_array() {
        let (out, warnings) = repair_structure(r#"{"a": [1, 2., 3], "b": [4]}"#);
        assert_eq!(out, r#"{"a": [], "b": [4]}"#);
        assert!(matches!(
            warnings[0],
            ParseWarning::UnboundedArray {
                reason: UnboundedReason::PartialElement,
                ..
            }
        ));
    }

    #[test]
    fn test_stray_quote_empties_innermost_array() {
        let out = repaired(r#"{"a": [[1, 2], [3, "x]], "b": 1}"#);
        assert_eq!(out, r#"{"a": [[1, 2], []], "b": 1}"#);
    }

    #[test]
    fn test_unclosed_containers() {
        let (out, warnings) = repair_structure(r#"{"a": [1, 2"#);
        assert_eq!(out, r#"{"a": []}"#);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_missing_comma_empties_array() {
        assert_eq!(repaired("{\"a\": [1 2]}"), "{\"a\": []}");
    }

    #[test]
    fn test_unquoted_key() {
        let (out, warnings) = repair_structure("{timex: [1]}");
        assert_eq!(out, "{\"timex\": [1]}");
        assert!(matches!(warnings[0], ParseWarning::UnquotedKey { .. }));
    }

    #[test]
    fn test_well_formed_json_unchanged() {
        let src = r#"{"a": [1, 2.5, -3e2], "b": {"c": null, "d": "x, ]"}, "e": []}"#;
        let (out, warnings) = repair_structure(src);
        assert_eq!(out, src);
        assert!(warnings.is_empty());
    }
}
