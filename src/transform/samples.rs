use serde_json::{Map, Value};

use crate::document::{self, MODE, PRIMARY, REQUIRED_ARRAYS, SECONDARY, TIME};
use crate::model::{round_to, Provenance, RoastId, TemperatureSample, TemperatureUnit};

/// Full-resolution samples of a document
#[derive(Debug)]
pub(crate) struct Timeline {
    /// Samples that survived time filtering, in source order
    pub samples: Vec<TemperatureSample>,
    /// Source row -> position in `samples`; `None` when the row was dropped
    pub positions: Vec<Option<usize>>,
}

/// Unit indicator of the document, with a note when it is unrecognized
pub(crate) fn source_unit(doc: &Map<String, Value>) -> (TemperatureUnit, Option<String>) {
    match doc.get(MODE) {
        None => (TemperatureUnit::Celsius, None),
        Some(mode) => match mode.as_str().map(str::parse::<TemperatureUnit>) {
            Some(Ok(unit)) => (unit, None),
            _ => (
                TemperatureUnit::Celsius,
                Some(format!("unrecognized unit {}; Celsius assumed", mode)),
            ),
        },
    }
}

/// Convert a reading to Celsius at the configured precision
pub(crate) fn normalize(value: f64, unit: TemperatureUnit, precision: u32) -> f64 {
    round_to(unit.to_celsius(value), precision)
}

/// Build samples from the parallel arrays.
///
/// Arrays are truncated to the shortest. Rows with a missing or negative time,
/// or a time earlier than the previous kept row, are dropped.
pub(crate) fn build_timeline(
    doc: &Map<String, Value>,
    roast_id: &RoastId,
    provenance: Provenance,
    unit: TemperatureUnit,
    precision: u32,
    ambient: Option<f64>,
    notes: &mut Vec<String>,
) -> Timeline {
    let times = document::numbers(doc, TIME);
    let primary = document::numbers(doc, PRIMARY);
    let secondary = document::numbers(doc, SECONDARY);

    let lengths = [times.len(), primary.len(), secondary.len()];
    let count = lengths.iter().copied().min().unwrap_or(0);
    if lengths.iter().any(|len| *len != count) {
        notes.push(format!(
            "parallel arrays {:?} of lengths {:?} truncated to {} samples",
            REQUIRED_ARRAYS, lengths, count
        ));
    }

    let mut samples = Vec::with_capacity(count);
    let mut positions = Vec::with_capacity(count);
    let mut dropped = 0usize;
    let mut latest = f64::NEG_INFINITY;

    for i in 0..count {
        let time = match times[i] {
            Some(t) if t >= 0.0 && t >= latest => t,
            _ => {
                dropped += 1;
                positions.push(None);
                continue;
            }
        };
        latest = time;
        positions.push(Some(samples.len()));
        samples.push(
            TemperatureSample::new(
                roast_id.clone(),
                time,
                primary[i].map(|v| normalize(v, unit, precision)),
                secondary[i].map(|v| normalize(v, unit, precision)),
                provenance,
            )
            .with_ambient(ambient),
        );
    }

    if dropped > 0 {
        notes.push(format!(
            "{} sample(s) with a missing, negative or out-of-order time dropped",
            dropped
        ));
    }

    Timeline { samples, positions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SampleQuality;
    use serde_json::json;

    fn build(doc: Value) -> (Timeline, Vec<String>) {
        let mut notes = Vec::new();
        let (unit, _) = source_unit(doc.as_object().unwrap());
        let timeline = build_timeline(
            doc.as_object().unwrap(),
            &RoastId::new("t").unwrap(),
            Provenance::Imported,
            unit,
            1,
            None,
            &mut notes,
        );
        (timeline, notes)
    }

    #[test]
    fn test_fahrenheit_is_converted_and_rounded() {
        let (timeline, notes) = build(json!({
            "mode": "F",
            "timex": [0, 1],
            "temp2": [212.0, 400.0],
            "temp1": [32.0, 451.0],
        }));
        assert!(notes.is_empty());
        let s = &timeline.samples;
        assert_eq!(s[0].primary, Some(100.0));
        assert_eq!(s[0].secondary, Some(0.0));
        assert_eq!(s[1].primary, Some(204.4));
        assert_eq!(s[1].secondary, Some(232.8));
    }

    #[test]
    fn test_truncates_to_shortest() {
        let (timeline, notes) = build(json!({
            "timex": (0..10).collect::<Vec<_>>(),
            "temp2": vec![150.0; 10],
            "temp1": vec![200.0; 7],
        }));
        assert_eq!(timeline.samples.len(), 7);
        assert_eq!(timeline.positions.len(), 7);
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_bad_times_dropped() {
        let (timeline, notes) = build(json!({
            "timex": [0, 5, 3, -1, 10],
            "temp2": [1, 2, 3, 4, 500],
            "temp1": [1, 2, 3, 4, 5],
        }));
        let times: Vec<f64> = timeline.samples.iter().map(|s| s.time_s).collect();
        assert_eq!(times, vec![0.0, 5.0, 10.0]);
        assert_eq!(timeline.positions, vec![Some(0), Some(1), None, None, Some(2)]);
        assert_eq!(timeline.samples[2].quality, SampleQuality::OutOfRange);
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_unknown_unit() {
        let (unit, note) = source_unit(json!({"mode": "K"}).as_object().unwrap());
        assert_eq!(unit, TemperatureUnit::Celsius);
        assert!(note.is_some());
    }
}
