//! Quote/escape/comment-aware scanner shared by every recovery pass.
//!
//! The scanner splits a buffer into [`Segment`]s. Each pass rewrites only the
//! segment kinds it cares about and reassembles the buffer, so all passes agree
//! on where strings and comments begin and end.

/// Kind of a scanned segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SegmentKind {
    /// Structure, numbers, bare words and whitespace
    Code,
    /// A bounded string literal, quotes included
    Str {
        /// Opening/closing quote byte (`'` or `"`)
        quote: u8,
    },
    /// `#` or `//` comment, up to but excluding the newline
    Comment,
    /// An opening quote with no acceptable close
    StrayQuote,
}

/// One contiguous piece of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
    /// Byte offset of `text` in the scanned buffer
    pub offset: usize,
}

/// Enclosing container, which decides what may follow a closing quote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    TopLevel,
    Array,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Comment,
}

/// Scan `src` into segments. Concatenating every segment's text yields `src`.
pub(crate) fn scan(src: &str) -> Vec<Segment<'_>> {
    let bytes = src.as_bytes();
    let mut segments = Vec::new();
    let mut stack: Vec<Context> = Vec::new();
    let mut state = State::Code;
    let mut run_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match state {
            State::Comment => {
                if b == b'\n' {
                    push(&mut segments, src, SegmentKind::Comment, run_start, i);
                    run_start = i;
                    state = State::Code;
                }
                i += 1;
            }
            State::Code => match b {
                b'\'' | b'"' => {
                    if b == b'\'' && is_contraction(src, i) {
                        i += 1;
                        continue;
                    }
                    let context = stack.last().copied().unwrap_or(Context::TopLevel);
                    push(&mut segments, src, SegmentKind::Code, run_start, i);
                    match find_close(src, i, b, context) {
                        Some(close) => {
                            push(&mut segments, src, SegmentKind::Str { quote: b }, i, close + 1);
                            i = close + 1;
                        }
                        None => {
                            push(&mut segments, src, SegmentKind::StrayQuote, i, i + 1);
                            i += 1;
                        }
                    }
                    run_start = i;
                }
                b'#' => {
                    push(&mut segments, src, SegmentKind::Code, run_start, i);
                    run_start = i;
                    state = State::Comment;
                    i += 1;
                }
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    push(&mut segments, src, SegmentKind::Code, run_start, i);
                    run_start = i;
                    state = State::Comment;
                    i += 2;
                }
                b'[' => {
                    stack.push(Context::Array);
                    i += 1;
                }
                b'{' => {
                    stack.push(Context::Object);
                    i += 1;
                }
                b']' | b'}' => {
                    stack.pop();
                    i += 1;
                }
                _ => i += 1,
            },
        }
    }

    let tail_kind = match state {
        State::Code => SegmentKind::Code,
        State::Comment => SegmentKind::Comment,
    };
    push(&mut segments, src, tail_kind, run_start, bytes.len());
    segments
}

fn push<'a>(
    segments: &mut Vec<Segment<'a>>,
    src: &'a str,
    kind: SegmentKind,
    start: usize,
    end: usize,
) {
    if end > start {
        segments.push(Segment {
            kind,
            text: &src[start..end],
            offset: start,
        });
    }
}

/// Rebuild a buffer from segments, letting `rewrite` replace any of them.
pub(crate) fn rewrite<F>(src: &str, mut rewrite: F) -> String
where
    F: FnMut(&Segment<'_>, &mut String),
{
    let mut out = String::with_capacity(src.len() + src.len() / 16);
    for segment in scan(src) {
        rewrite(&segment, &mut out);
    }
    out
}

/// An apostrophe with a letter on both sides (`don't`) is never a quote.
fn is_contraction(src: &str, at: usize) -> bool {
    let before = src[..at].chars().next_back();
    let after = src[at + 1..].chars().next();
    matches!((before, after), (Some(b), Some(a)) if b.is_alphabetic() && a.is_alphabetic())
}

/// Find the closing quote for the string opened at `open`.
///
/// A candidate close is accepted only when the next non-whitespace byte is a
/// delimiter legal in `context`. Inside an array the string may not extend past
/// an unescaped `]`.
fn find_close(src: &str, open: usize, quote: u8, context: Context) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut j = open + 1;
    while j < bytes.len() {
        let b = bytes[j];
        if b == b'\\' {
            j += 2;
            continue;
        }
        if b == quote {
            if quote == b'\'' && is_contraction(src, j) {
                j += 1;
                continue;
            }
            if closes_in(bytes, j + 1, context) {
                return Some(j);
            }
        } else if b == b']' && context == Context::Array {
            return None;
        }
        j += 1;
    }
    None
}

fn closes_in(bytes: &[u8], from: usize, context: Context) -> bool {
    let next = bytes[from.min(bytes.len())..]
        .iter()
        .copied()
        .find(|b| !b.is_ascii_whitespace());
    match (context, next) {
        (_, None) => true,
        (_, Some(b'#' | b'/')) => true,
        (Context::TopLevel, _) => true,
        (Context::Array, Some(b)) => matches!(b, b',' | b']'),
        (Context::Object, Some(b)) => matches!(b, b':' | b',' | b'}'),
    }
}
