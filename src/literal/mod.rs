//! # Tolerant Literal-Record Parser
//!
//! Roast logs exported by third-party tools are written in a loose literal
//! syntax: `True`/`False`/`None` literals, single-quoted strings, `#` comments,
//! trailing commas and, occasionally, arrays truncated mid-element. This module
//! turns such a document into a [`serde_json::Value`] tree.
//!
//! The text goes through ordered recovery passes before a strict parse:
//!
//! 1. literal substitution (`True` -> `true`, `None`/`NaN` -> `null`)
//! 2. comment stripping
//! 3. quote normalization
//! 4. control-character escaping inside strings
//! 5. structural repair (trailing/double commas, unboundable arrays -> `[]`)
//! 6. strict parse with `serde_json`
//!
//! Every pass is driven by the same quote/escape/comment-aware scanner, so a
//! `#` inside a string is never taken for a comment and a `'` in `don't` never
//! opens a string.
//!
//! ## Example
//!
//! ```rust
//! use roastline::literal::parse_document;
//!
//! let doc = parse_document("{'timex': [0, 1, 2,], 'title': 'Batch #4', 'flag': True}")?;
//! assert_eq!(doc.value["timex"].as_array().map(Vec::len), Some(3));
//! assert_eq!(doc.value["title"], "Batch #4");
//! assert_eq!(doc.warnings.len(), 1);
//! # Ok::<(), roastline::literal::FormatError>(())
//! ```

mod error;
mod passes;
mod repair;
mod scanner;

pub use error::{FormatError, ParseWarning, UnboundedReason, CONTEXT_RADIUS};


use log::{debug, warn};
use serde_json::Value;

/// Result of a successful parse
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Parsed tree
    pub value: Value,
    /// Malformations that were repaired
    pub warnings: Vec<ParseWarning>,
}

/// Parse a literal-record document.
///
/// Recoverable malformations are repaired and reported as warnings. Only a
/// buffer that still fails the strict parse after every pass is an error.
pub fn parse_document(text: &str) -> Result<ParsedDocument, FormatError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let buffer = passes::substitute_literals(text);
    let buffer = passes::strip_comments(&buffer);
    let buffer = passes::normalize_quotes(&buffer);
    let buffer = passes::escape_control_chars(&buffer);
    let (buffer, warnings) = repair::repair_structure(&buffer);

    for warning in &warnings {
        debug!("Repaired document: {}", warning);
    }

    match serde_json::from_str::<Value>(&buffer) {
        Ok(value) => Ok(ParsedDocument { value, warnings }),
        Err(e) => {
            let error = FormatError::from_json(&buffer, &e);
            warn!("Document failed strict parse: {}", error.message);
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_python_style_document() {
        let src = r#"
{'timex': [0.0, 2.0, 4.0],  # seconds
 'temp2': [180.5, 175.0, 172.25],
 'temp1': [220.0, 221.0, 222.0,],
 'flag': True, 'other': None,
 'title': 'Ethiopia "Guji" don't rush',
 'roastingnotes': 'line one
line two',
}"#;
        let doc = parse_document(src).unwrap();
        assert_eq!(doc.value["timex"].as_array().unwrap().len(), 3);
        assert_eq!(doc.value["flag"], Value::Bool(true));
        assert_eq!(doc.value["other"], Value::Null);
        assert_eq!(doc.value["title"], "Ethiopia \"Guji\" don't rush");
        assert_eq!(doc.value["roastingnotes"], "line one\nline two");
        assert_eq!(doc.warnings.len(), 2);
    }

    #[test]
    fn test_unterminated_quote_empties_only_that_array() {
        let src = "{'extraname1': ['Fan', 'Heat], 'timex': [0, 1, 2], 'title': 'ok'}";
        let doc = parse_document(src).unwrap();
        assert_eq!(doc.value["extraname1"], Value::Array(vec![]));
        assert_eq!(doc.value["timex"].as_array().unwrap().len(), 3);
        assert_eq!(doc.value["title"], "ok");
        assert!(doc.warnings.iter().any(|w| matches!(
            w,
            ParseWarning::UnboundedArray {
                reason: UnboundedReason::UnterminatedString,
                ..
            }
        )));
    }

    #[test]
    fn test_truncated_document_recovers() {
        let doc = parse_document("{'timex': [0, 1, 2], 'temp2': [180.0, 17").unwrap();
        assert_eq!(doc.value["timex"].as_array().unwrap().len(), 3);
        assert_eq!(doc.value["temp2"], Value::Array(vec![]));
    }

    #[test]
    fn test_bom_is_ignored() {
        let doc = parse_document("\u{feff}{\"a\": 1}").unwrap();
        assert_eq!(doc.value["a"], 1);
    }

    #[test]
    fn test_format_error_carries_position_and_context() {
        let src = format!("{{\"a\": {}, \"b\": @@@, \"c\": 1}}", "1".repeat(200));
        let err = parse_document(&src).unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.offset > 200);
        assert!(err.context.contains("@@@"));
        assert!(err.context.chars().count() <= 2 * CONTEXT_RADIUS);
    }

    #[test]
    fn test_empty_document_is_format_error() {
        assert!(parse_document("").is_err());
        assert!(parse_document("   # only a comment\n").is_err());
    }

    proptest! {
        #[test]
        fn prop_never_panics(src in "\\PC{0,200}") {
            let _ = parse_document(&src);
        }

        #[test]
        fn prop_never_panics_on_structural_soup(src in "[\\[\\]{},:'\"#a0-9. \n\\\\]{0,120}") {
            let _ = parse_document(&src);
        }

        #[test]
        fn prop_strict_json_is_identity(
            values in proptest::collection::vec(-1.0e6f64..1.0e6, 0..40),
            title in "[a-zA-Z0-9 ,:#'\\]\\[]{0,30}",
        ) {
            let doc = serde_json::json!({"timex": values, "title": title});
            let text = serde_json::to_string(&doc).unwrap();
            let parsed = parse_document(&text).unwrap();
            prop_assert_eq!(parsed.value, doc);
            prop_assert!(parsed.warnings.is_empty());
        }
    }
}
