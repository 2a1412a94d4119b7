use std::fmt;

/// Characters of context kept on each side of a format error
pub const CONTEXT_RADIUS: usize = 50;

/// The document could not be parsed even after every recovery pass.
///
/// `offset`, `line` and `column` refer to the repaired buffer handed to the
/// strict parser, which is also where `context` is cut from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Format error at byte {offset} (line {line}, column {column}): {message} near `{context}`")]
pub struct FormatError {
    /// Byte offset of the failure
    pub offset: usize,
    /// 1-based line of the failure
    pub line: usize,
    /// 1-based column of the failure
    pub column: usize,
    /// Strict parser message
    pub message: String,
    /// Up to ~100 characters centered on the failure point
    pub context: String,
}

impl FormatError {
    pub(crate) fn from_json(buffer: &str, error: &serde_json::Error) -> Self {
        let line = error.line();
        let column = error.column();
        let offset = offset_of(buffer, line, column);
        Self {
            offset,
            line,
            column,
            message: strip_position(&error.to_string()),
            context: context_window(buffer, offset, CONTEXT_RADIUS),
        }
    }
}

/// Why an array segment was replaced by `[]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnboundedReason {
    /// A quote inside the array never closed
    UnterminatedString,
    /// An element is not a complete value (`1.`, `-`, bare word)
    PartialElement,
    /// Two elements with no separating comma
    MissingComma,
    /// `:` or `}` where an element was expected
    MisplacedDelimiter,
    /// Input ended before the closing `]`
    Unclosed,
}

impl fmt::Display for UnboundedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UnboundedReason::UnterminatedString => "unterminated string",
            UnboundedReason::PartialElement => "dangling partial element",
            UnboundedReason::MissingComma => "missing comma between elements",
            UnboundedReason::MisplacedDelimiter => "misplaced delimiter",
            UnboundedReason::Unclosed => "unclosed at end of input",
        };
        f.write_str(text)
    }
}

/// A malformation that was repaired instead of failing the document.
///
/// Offsets point into the buffer entering the structural repair pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// Comma before a closing bracket or brace was dropped
    TrailingComma {
        /// Byte offset of the comma
        offset: usize,
    },
    /// Empty slot (`,,` or leading comma) was dropped
    EmptySlot {
        /// Byte offset of the comma
        offset: usize,
    },
    /// Array could not be bounded and was replaced by `[]`
    UnboundedArray {
        /// Byte offset of the opening bracket
        offset: usize,
        /// What went wrong
        reason: UnboundedReason,
    },
    /// Object left open at end of input was closed
    UnclosedObject {
        /// Byte offset of the opening brace
        offset: usize,
    },
    /// Bare identifier used as an object key was quoted
    UnquotedKey {
        /// Byte offset of the key
        offset: usize,
        /// The key
        key: String,
    },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::TrailingComma { offset } => {
                write!(f, "dropped trailing comma at byte {}", offset)
            }
            ParseWarning::EmptySlot { offset } => {
                write!(f, "dropped empty array slot at byte {}", offset)
            }
            ParseWarning::UnboundedArray { offset, reason } => {
                write!(f, "array at byte {} replaced with [] ({})", offset, reason)
            }
            ParseWarning::UnclosedObject { offset } => {
                write!(f, "closed unterminated object opened at byte {}", offset)
            }
            ParseWarning::UnquotedKey { offset, key } => {
                write!(f, "quoted bare key '{}' at byte {}", key, offset)
            }
        }
    }
}

/// Byte offset of a 1-based (line, column) position
fn offset_of(buffer: &str, line: usize, column: usize) -> usize {
    let line_start: usize = buffer
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(buffer.len())
}

/// Cut at most `radius` characters on each side of `offset`
pub(crate) fn context_window(buffer: &str, offset: usize, radius: usize) -> String {
    let mut offset = offset.min(buffer.len());
    while !buffer.is_char_boundary(offset) {
        offset -= 1;
    }
    let start = buffer[..offset]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(offset);
    let end = buffer[offset..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| offset + i)
        .unwrap_or(buffer.len());
    buffer[start..end].to_string()
}

/// serde_json appends " at line X column Y"; the position is kept separately
fn strip_position(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}
