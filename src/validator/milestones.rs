use serde_json::{Map, Value};

use crate::document::{self, type_name, MILESTONE_INDEX, MILESTONE_SLOTS, REQUIRED_ARRAYS, TIME};

use super::{ValidationCheck, ValidationReport};

/// Milestone index array: cardinality, bounds, chronology.
pub(crate) fn check_milestones(doc: &Map<String, Value>, report: &mut ValidationReport) {
    let slots = match doc.get(MILESTONE_INDEX) {
        None => {
            report.add_check(ValidationCheck::ok("Milestone index (none recorded)"));
            return;
        }
        Some(Value::Array(slots)) => slots,
        Some(other) => {
            report.add_check(ValidationCheck::warning(
                "Milestone index cardinality",
                format!("expected an array, found {}; milestones ignored", type_name(other)),
            ));
            return;
        }
    };

    if slots.len() == MILESTONE_SLOTS {
        report.add_check(ValidationCheck::ok("Milestone index cardinality"));
    } else {
        report.add_check(ValidationCheck::warning(
            "Milestone index cardinality",
            format!("expected {} slots, found {}", MILESTONE_SLOTS, slots.len()),
        ));
    }

    let sample_count = REQUIRED_ARRAYS
        .iter()
        .map(|key| document::array(doc, key).map_or(0, Vec::len))
        .min()
        .unwrap_or(0);
    let times = document::numbers(doc, TIME);

    let mut out_of_range = Vec::new();
    let mut in_range = Vec::new();
    for (kind, index) in document::milestone_indices(doc) {
        if index >= sample_count {
            out_of_range.push(format!("{} (index {})", kind, index));
        } else if let Some(Some(time)) = times.get(index) {
            in_range.push((kind, *time));
        }
    }

    if out_of_range.is_empty() {
        report.add_check(ValidationCheck::ok("Milestone index bounds"));
    } else {
        report.add_check(ValidationCheck::warning(
            "Milestone index bounds",
            format!(
                "{} past the last sample (max index {}); dropped",
                out_of_range.join(", "),
                sample_count.saturating_sub(1)
            ),
        ));
    }

    let inversions: Vec<String> = in_range
        .windows(2)
        .filter(|pair| pair[1].1 < pair[0].1)
        .map(|pair| format!("{} before {}", pair[1].0, pair[0].0))
        .collect();
    if inversions.is_empty() {
        report.add_check(ValidationCheck::ok("Milestone chronology"));
    } else {
        report.add_check(ValidationCheck::warning(
            "Milestone chronology",
            inversions.join(", "),
        ));
    }
}
