use serde_json::{Map, Value};

use crate::document::{self, TIME};

use super::{ValidationCheck, ValidationReport};

/// Time axis non-negative and non-decreasing.
///
/// Offending samples are dropped by the transformer, so this only warns.
pub(crate) fn check_time_axis(doc: &Map<String, Value>, report: &mut ValidationReport) {
    if document::array(doc, TIME).is_none() {
        return;
    }
    let times = document::numbers(doc, TIME);

    let mut negative = 0usize;
    let mut backwards = 0usize;
    let mut latest: Option<f64> = None;
    for t in times.into_iter().flatten() {
        if t < 0.0 {
            negative += 1;
            continue;
        }
        match latest {
            Some(prev) if t < prev => backwards += 1,
            _ => latest = Some(t),
        }
    }

    if negative == 0 && backwards == 0 {
        report.add_check(ValidationCheck::ok("Time axis monotonic"));
        return;
    }

    let mut problems = Vec::new();
    if negative > 0 {
        problems.push(format!("{} negative", negative));
    }
    if backwards > 0 {
        problems.push(format!("{} out of order", backwards));
    }
    report.add_check(ValidationCheck::warning(
        "Time axis monotonic",
        format!("{} sample time(s) will be dropped", problems.join(", ")),
    ));
}
