//! Field names of the import document and typed accessors over the parsed tree.

use serde_json::{Map, Value};

use crate::model::MilestoneKind;

/// Sample times in seconds
pub const TIME: &str = "timex";
/// Primary (bean) temperature channel
pub const PRIMARY: &str = "temp2";
/// Secondary (environment) temperature channel
pub const SECONDARY: &str = "temp1";
/// 8-slot milestone index array
pub const MILESTONE_INDEX: &str = "timeindex";
/// Temperature unit indicator (`C` or `F`)
pub const MODE: &str = "mode";
/// Roast title
pub const TITLE: &str = "title";
/// Roasting machine descriptor
pub const ROASTER_TYPE: &str = "roastertype";
/// `[in, out, unit]` batch weights
pub const WEIGHT: &str = "weight";
/// Notes taken while roasting
pub const ROASTING_NOTES: &str = "roastingnotes";
/// Notes taken while cupping
pub const CUPPING_NOTES: &str = "cuppingnotes";
/// Bean description
pub const BEANS: &str = "beans";
/// Ambient temperature
pub const AMBIENT: &str = "ambientTemp";

/// Per-device sample times of auxiliary channels
pub const EXTRA_TIME: &str = "extratimex";
/// Per-device first channel values
pub const EXTRA_TEMP1: &str = "extratemp1";
/// Per-device second channel values
pub const EXTRA_TEMP2: &str = "extratemp2";
/// Per-device first channel names
pub const EXTRA_NAME1: &str = "extraname1";
/// Per-device second channel names
pub const EXTRA_NAME2: &str = "extraname2";

/// Sample indices of special events
pub const SPECIAL_EVENTS: &str = "specialevents";
/// Event type number of each special event
pub const SPECIAL_EVENTS_TYPE: &str = "specialeventstype";
/// Encoded value of each special event
pub const SPECIAL_EVENTS_VALUE: &str = "specialeventsvalue";
/// Names of the special event types
pub const EVENT_TYPES: &str = "etypes";

/// The three parallel arrays every document must carry
pub const REQUIRED_ARRAYS: [&str; 3] = [TIME, PRIMARY, SECONDARY];

/// Expected cardinality of the milestone index array
pub const MILESTONE_SLOTS: usize = 8;

/// Number of special event types (four named channels plus an untyped slot)
pub const SPECIAL_EVENT_TYPES: usize = 5;

/// Type names used when `etypes` is missing
pub const DEFAULT_EVENT_TYPES: [&str; SPECIAL_EVENT_TYPES] = ["Air", "Drum", "Damper", "Burner", "--"];

/// JSON type name for messages
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Finite `f64` view of a JSON number
pub(crate) fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

/// Integer view of a JSON number, rejecting fractional values
pub(crate) fn integer(value: &Value) -> Option<i64> {
    match value.as_i64() {
        Some(i) => Some(i),
        None => value
            .as_f64()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64),
    }
}

/// Array field, if present and an array
pub(crate) fn array<'a>(doc: &'a Map<String, Value>, key: &str) -> Option<&'a Vec<Value>> {
    doc.get(key).and_then(Value::as_array)
}

/// Numeric array field; `None` elements are non-numeric or null entries
pub(crate) fn numbers(doc: &Map<String, Value>, key: &str) -> Vec<Option<f64>> {
    array(doc, key)
        .map(|values| values.iter().map(finite).collect())
        .unwrap_or_default()
}

/// Non-empty string field
pub(crate) fn text(doc: &Map<String, Value>, key: &str) -> Option<String> {
    doc.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Array of arrays field (one inner array per auxiliary device)
pub(crate) fn nested<'a>(doc: &'a Map<String, Value>, key: &str) -> Vec<&'a Vec<Value>> {
    array(doc, key)
        .map(|outer| outer.iter().filter_map(Value::as_array).collect())
        .unwrap_or_default()
}

/// Set milestone slots as `(kind, sample index)`.
///
/// Index 0, negative or non-integer entries mean "not recorded" and are
/// skipped. Slots past the eighth are ignored. Bounds are not checked here.
pub(crate) fn milestone_indices(doc: &Map<String, Value>) -> Vec<(MilestoneKind, usize)> {
    let Some(slots) = array(doc, MILESTONE_INDEX) else {
        return Vec::new();
    };
    slots
        .iter()
        .take(MILESTONE_SLOTS)
        .enumerate()
        .filter_map(|(slot, value)| {
            let index = integer(value).filter(|i| *i > 0)?;
            let kind = MilestoneKind::from_slot(slot)?;
            Some((kind, usize::try_from(index).ok()?))
        })
        .collect()
}
