use serde_json::{Map, Value};

use crate::document::{
    self, type_name, EXTRA_TEMP1, EXTRA_TEMP2, EXTRA_TIME, MODE, SPECIAL_EVENTS, SPECIAL_EVENTS_TYPE,
    SPECIAL_EVENTS_VALUE, WEIGHT,
};
use crate::model::TemperatureUnit;

use super::{ValidationCheck, ValidationReport};

/// Unit indicator is `C` or `F` when present.
pub(crate) fn check_unit(doc: &Map<String, Value>, report: &mut ValidationReport) {
    let Some(mode) = doc.get(MODE) else {
        return;
    };
    let parsed = mode.as_str().map(str::parse::<TemperatureUnit>);
    let check = match parsed {
        Some(Ok(unit)) => ValidationCheck::ok(format!("Temperature unit ({})", unit)),
        Some(Err(_)) | None => ValidationCheck::warning(
            "Temperature unit",
            format!("unrecognized unit {}; Celsius assumed", mode),
        ),
    };
    report.add_check(check);
}

/// Weight is `[in, out, unit]`.
pub(crate) fn check_weight(doc: &Map<String, Value>, report: &mut ValidationReport) {
    let Some(weight) = doc.get(WEIGHT) else {
        return;
    };
    let well_formed = match weight.as_array().map(Vec::as_slice) {
        Some([w_in, w_out, unit]) => {
            document::finite(w_in).is_some() && document::finite(w_out).is_some() && unit.is_string()
        }
        _ => false,
    };
    if well_formed {
        report.add_check(ValidationCheck::ok("Weight"));
    } else {
        report.add_check(ValidationCheck::warning(
            "Weight",
            format!("expected [in, out, unit], found {}; ignored", weight),
        ));
    }
}

/// Every auxiliary device has as many values per channel as time points.
pub(crate) fn check_auxiliary_channels(doc: &Map<String, Value>, report: &mut ValidationReport) {
    let times = document::nested(doc, EXTRA_TIME);
    if times.is_empty() {
        return;
    }
    let temp1 = document::nested(doc, EXTRA_TEMP1);
    let temp2 = document::nested(doc, EXTRA_TEMP2);

    let mut mismatched = Vec::new();
    for (device, t) in times.iter().enumerate() {
        for (key, channel) in [(EXTRA_TEMP1, &temp1), (EXTRA_TEMP2, &temp2)] {
            let len = channel.get(device).map_or(0, |values| values.len());
            if len != t.len() {
                mismatched.push(format!("device {} {}={} vs {}={}", device, key, len, EXTRA_TIME, t.len()));
            }
        }
    }

    if mismatched.is_empty() {
        report.add_check(ValidationCheck::ok(format!("Auxiliary channels ({} devices)", times.len())));
    } else {
        report.add_check(ValidationCheck::warning(
            "Auxiliary channels",
            format!("{}; truncated", mismatched.join(", ")),
        ));
    }
}

/// Special event index/type/value arrays pair up.
pub(crate) fn check_special_events(doc: &Map<String, Value>, report: &mut ValidationReport) {
    let Some(indices) = doc.get(SPECIAL_EVENTS) else {
        return;
    };
    let Some(indices) = indices.as_array() else {
        report.add_check(ValidationCheck::warning(
            "Special events",
            format!("expected an array, found {}; ignored", type_name(indices)),
        ));
        return;
    };

    let types = document::array(doc, SPECIAL_EVENTS_TYPE).map_or(0, Vec::len);
    let values = document::array(doc, SPECIAL_EVENTS_VALUE).map_or(0, Vec::len);
    if types == indices.len() && values == indices.len() {
        report.add_check(ValidationCheck::ok(format!("Special events ({})", indices.len())));
    } else {
        report.add_check(ValidationCheck::warning(
            "Special events",
            format!(
                "{}={}, {}={}, {}={}; truncated",
                SPECIAL_EVENTS,
                indices.len(),
                SPECIAL_EVENTS_TYPE,
                types,
                SPECIAL_EVENTS_VALUE,
                values
            ),
        ));
    }
}
