use serde_json::{Map, Value};

use crate::document::{self, type_name, REQUIRED_ARRAYS};

use super::{ValidationCheck, ValidationReport};

/// Required parallel arrays: present, typed as arrays, non-empty.
///
/// Returns true when all three pass, which gates the length and milestone checks.
pub(crate) fn check_required_arrays(doc: &Map<String, Value>, report: &mut ValidationReport) -> bool {
    let mut all_present = true;

    for key in REQUIRED_ARRAYS {
        let name = format!("Required array '{}'", key);
        let check = match doc.get(key) {
            None => ValidationCheck::failed(name, "missing"),
            Some(Value::Array(values)) if values.is_empty() => {
                ValidationCheck::failed(name, "array is empty")
            }
            Some(Value::Array(values)) => {
                report.add_check(ValidationCheck::ok(format!("{} ({} values)", name, values.len())));
                continue;
            }
            Some(other) => ValidationCheck::failed(
                name,
                format!("expected an array, found {}", type_name(other)),
            ),
        };
        all_present = false;
        report.add_check(check);
    }

    all_present
}

/// Parallel arrays of unequal length are truncated to the shortest.
pub(crate) fn check_lengths(doc: &Map<String, Value>, report: &mut ValidationReport) {
    let lengths: Vec<(&str, usize)> = REQUIRED_ARRAYS
        .iter()
        .map(|key| (*key, document::array(doc, key).map_or(0, Vec::len)))
        .collect();
    let min = lengths.iter().map(|(_, len)| *len).min().unwrap_or(0);
    let max = lengths.iter().map(|(_, len)| *len).max().unwrap_or(0);

    if min == max {
        report.add_check(ValidationCheck::ok("Parallel array lengths"));
    } else {
        let listed: Vec<String> = lengths
            .iter()
            .map(|(key, len)| format!("{}={}", key, len))
            .collect();
        report.add_check(ValidationCheck::warning(
            "Parallel array lengths",
            format!("unequal lengths ({}); truncated to {}", listed.join(", "), min),
        ));
    }
}

/// Every element numeric and finite.
///
/// `NaN`, `Infinity` and `None` readings arrive here as `null` and fail like
/// any other non-numeric element.
pub(crate) fn check_numeric(doc: &Map<String, Value>, report: &mut ValidationReport) {
    for key in REQUIRED_ARRAYS {
        let Some(values) = document::array(doc, key) else {
            continue;
        };
        let name = format!("Numeric values in '{}'", key);

        let mut first_bad: Option<(usize, &Value)> = None;
        let mut bad = 0usize;
        for (i, value) in values.iter().enumerate() {
            if document::finite(value).is_some() {
                continue;
            }
            bad += 1;
            first_bad.get_or_insert((i, value));
        }

        let check = match first_bad {
            Some((index, value)) => ValidationCheck::failed(
                name,
                format!(
                    "{} non-numeric element(s), first at index {} ({})",
                    bad,
                    index,
                    type_name(value)
                ),
            ),
            None => ValidationCheck::ok(name),
        };
        report.add_check(check);
    }
}
