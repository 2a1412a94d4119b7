//! Text-level recovery passes 1-4. Each pass is a pure `&str -> String`.

use super::scanner::{rewrite, SegmentKind};

/// Pass 1: replace literal words outside strings.
///
/// `True`/`False`/`None` become JSON literals; `NaN` and (signed) infinities
/// become `null` since JSON cannot express them.
pub(crate) fn substitute_literals(src: &str) -> String {
    rewrite(src, |segment, out| match segment.kind {
        SegmentKind::Code => substitute_words(segment.text, out),
        _ => out.push_str(segment.text),
    })
}

fn substitute_words(code: &str, out: &mut String) {
    let mut chars = code.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if !is_word_char(c) {
            out.push(c);
            continue;
        }
        let mut end = start + c.len_utf8();
        while let Some(&(i, next)) = chars.peek() {
            if !is_word_char(next) {
                break;
            }
            end = i + next.len_utf8();
            chars.next();
        }
        let word = &code[start..end];
        match word {
            "True" => out.push_str("true"),
            "False" => out.push_str("false"),
            "None" | "NaN" | "nan" => out.push_str("null"),
            "Infinity" | "inf" => {
                if out.ends_with('-') || out.ends_with('+') {
                    out.pop();
                }
                out.push_str("null");
            }
            _ => out.push_str(word),
        }
    }
}

/// Word characters for literal matching. `.` is included so that `1.5e3`
/// stays one word and `inf` inside a longer token never matches.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// Pass 2: drop `#` and `//` comments.
pub(crate) fn strip_comments(src: &str) -> String {
    rewrite(src, |segment, out| {
        if segment.kind != SegmentKind::Comment {
            out.push_str(segment.text);
        }
    })
}

/// Pass 3: rewrite single-quoted strings as double-quoted strings.
pub(crate) fn normalize_quotes(src: &str) -> String {
    rewrite(src, |segment, out| match segment.kind {
        SegmentKind::Str { quote: b'\'' } => {
            let body = &segment.text[1..segment.text.len() - 1];
            out.push('"');
            let mut chars = body.chars().peekable();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => match chars.next() {
                        Some('\'') => out.push('\''),
                        Some(escaped) => {
                            out.push('\\');
                            out.push(escaped);
                        }
                        None => out.push_str("\\\\"),
                    },
                    '"' => out.push_str("\\\""),
                    _ => out.push(c),
                }
            }
            out.push('"');
        }
        _ => out.push_str(segment.text),
    })
}

/// Pass 4: escape raw control characters inside strings.
pub(crate) fn escape_control_chars(src: &str) -> String {
    rewrite(src, |segment, out| match segment.kind {
        SegmentKind::Str { .. } => {
            for c in segment.text.chars() {
                match c {
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
                    c => out.push(c),
                }
            }
        }
        _ => out.push_str(segment.text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_on_word_boundaries() {
        assert_eq!(
            substitute_literals("{'a': True, 'b': None, 'c': False}"),
            "{'a': true, 'b': null, 'c': false}"
        );
        assert_eq!(substitute_literals("[Truer, NoneSuch]"), "[Truer, NoneSuch]");
        assert_eq!(substitute_literals("[1.0, -Infinity, NaN]"), "[1.0, null, null]");
    }

    #[test]
    fn test_literals_inside_strings_untouched() {
        assert_eq!(
            substitute_literals("{'title': 'True North'}"),
            "{'title': 'True North'}"
        );
    }

    #[test]
    fn test_strip_comments() {
        let src = "{'a': 1, # trailing note\n 'b': '#2' // more\n}";
        assert_eq!(strip_comments(src), "{'a': 1, \n 'b': '#2' \n}");
    }

    #[test]
    fn test_normalize_quotes() {
        assert_eq!(normalize_quotes("{'a': 'b'}"), "{\"a\": \"b\"}");
        assert_eq!(
            normalize_quotes("{'a': 'say \"hi\"'}"),
            "{\"a\": \"say \\\"hi\\\"\"}"
        );
        assert_eq!(normalize_quotes("{'a': 'it\\'s'}"), "{\"a\": \"it's\"}");
        assert_eq!(normalize_quotes("{'a': 'don't'}"), "{\"a\": \"don't\"}");
    }

    #[test]
    fn test_escape_control_chars() {
        assert_eq!(
            escape_control_chars("{\"notes\": \"line1\nline2\tx\"}"),
            "{\"notes\": \"line1\\nline2\\tx\"}"
        );
        assert_eq!(escape_control_chars("{\n\"a\": 1\n}"), "{\n\"a\": 1\n}");
    }
}
