use serde_json::{Map, Value};

use crate::analytics::nearest_primary;
use crate::document::{
    self, DEFAULT_EVENT_TYPES, EVENT_TYPES, EXTRA_NAME1, EXTRA_NAME2, EXTRA_TEMP1, EXTRA_TEMP2,
    EXTRA_TIME, SPECIAL_EVENTS, SPECIAL_EVENTS_TYPE, SPECIAL_EVENTS_VALUE, SPECIAL_EVENT_TYPES,
};
use crate::model::{
    round_to, Event, MilestoneMark, MilestoneSet, Provenance, RoastId, AUX_CHANNEL_TYPE_BASE,
};

use super::samples::Timeline;

/// Subcategory of events decoded from the document's special event table
pub const SPECIAL_EVENT_SUBCATEGORY: &str = "special_event";

/// Subcategory of events sampled from auxiliary devices
pub const AUXILIARY_SUBCATEGORY: &str = "auxiliary_device";

/// Resolved milestones plus their events and the sample positions they sit on
pub(crate) struct ResolvedMilestones {
    pub set: MilestoneSet,
    pub events: Vec<Event>,
    pub positions: Vec<usize>,
}

/// Resolve the 8-slot milestone index array against the timeline.
pub(crate) fn resolve_milestones(
    doc: &Map<String, Value>,
    timeline: &Timeline,
    roast_id: &RoastId,
    provenance: Provenance,
    notes: &mut Vec<String>,
) -> ResolvedMilestones {
    let mut resolved = ResolvedMilestones {
        set: MilestoneSet::new(),
        events: Vec::new(),
        positions: Vec::new(),
    };

    for (kind, index) in document::milestone_indices(doc) {
        let position = match timeline.positions.get(index) {
            None => {
                notes.push(format!(
                    "milestone {} index {} past the last sample; dropped",
                    kind, index
                ));
                continue;
            }
            Some(None) => {
                notes.push(format!(
                    "milestone {} points at a dropped sample; dropped",
                    kind
                ));
                continue;
            }
            Some(Some(position)) => *position,
        };

        let time_s = timeline.samples[position].time_s;
        let temperature = nearest_primary(&timeline.samples, time_s);
        resolved
            .set
            .set(kind, MilestoneMark::at_seconds(time_s, temperature));
        resolved
            .events
            .push(Event::milestone(roast_id.clone(), kind, time_s, provenance));
        resolved.positions.push(position);
    }

    resolved
}

/// Control events from auxiliary device channels.
///
/// Each device contributes two channels. Only value changes are emitted, so
/// the carry-forward reconstruction sees the same state with fewer rows.
pub(crate) fn auxiliary_events(
    doc: &Map<String, Value>,
    roast_id: &RoastId,
    provenance: Provenance,
) -> Vec<Event> {
    let times = document::nested(doc, EXTRA_TIME);
    let channels = [
        (document::nested(doc, EXTRA_TEMP1), EXTRA_NAME1),
        (document::nested(doc, EXTRA_TEMP2), EXTRA_NAME2),
    ];

    let mut events = Vec::new();
    for (device, device_times) in times.iter().enumerate() {
        for (channel, (values, name_key)) in channels.iter().enumerate() {
            let Some(values) = values.get(device) else {
                continue;
            };
            let name = auxiliary_name(doc, name_key, device, channel);
            let type_code = AUX_CHANNEL_TYPE_BASE + (2 * device + channel) as i32;

            let mut previous: Option<f64> = None;
            for (t, v) in device_times.iter().zip(values.iter()) {
                let (Some(t), Some(v)) = (document::finite(t), document::finite(v)) else {
                    continue;
                };
                if t < 0.0 || previous == Some(v) {
                    continue;
                }
                previous = Some(v);
                events.push(
                    Event::control(roast_id.clone(), name.clone(), t, type_code, v, provenance)
                        .with_subcategory(AUXILIARY_SUBCATEGORY),
                );
            }
        }
    }
    events
}

fn auxiliary_name(doc: &Map<String, Value>, key: &str, device: usize, channel: usize) -> String {
    document::array(doc, key)
        .and_then(|names| names.get(device))
        .and_then(Value::as_str)
        .map(channel_name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("extra{}_{}", device, channel + 1))
}

/// Control events from the special event table.
///
/// Values are stored encoded as `v / 10 + 1`; the decoded setting is
/// `(v - 1) * 10`. Special events are entered by the operator.
pub(crate) fn special_events(
    doc: &Map<String, Value>,
    timeline: &Timeline,
    roast_id: &RoastId,
    provenance: Provenance,
    notes: &mut Vec<String>,
) -> Vec<Event> {
    let (Some(indices), Some(types), Some(values)) = (
        document::array(doc, SPECIAL_EVENTS),
        document::array(doc, SPECIAL_EVENTS_TYPE),
        document::array(doc, SPECIAL_EVENTS_VALUE),
    ) else {
        return Vec::new();
    };
    let type_names = event_type_names(doc);

    let mut skipped = 0usize;
    let mut events = Vec::new();
    for ((index, kind), value) in indices.iter().zip(types).zip(values) {
        let position = document::integer(index)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| timeline.positions.get(i).copied().flatten());
        let type_code = document::integer(kind).filter(|k| (0..SPECIAL_EVENT_TYPES as i64).contains(k));
        let raw = document::finite(value);

        let (Some(position), Some(type_code), Some(raw)) = (position, type_code, raw) else {
            skipped += 1;
            continue;
        };
        let channel = &type_names[type_code as usize];
        events.push(
            Event::control(
                roast_id.clone(),
                channel.clone(),
                timeline.samples[position].time_s,
                type_code as i32,
                round_to((raw - 1.0) * 10.0, 1),
                provenance,
            )
            .with_subcategory(SPECIAL_EVENT_SUBCATEGORY)
            .user_generated(),
        );
    }

    if skipped > 0 {
        notes.push(format!(
            "{} special event(s) with an invalid index, type or value skipped",
            skipped
        ));
    }
    events
}

fn event_type_names(doc: &Map<String, Value>) -> Vec<String> {
    let names = document::array(doc, EVENT_TYPES);
    (0..SPECIAL_EVENT_TYPES)
        .map(|i| {
            let name = names
                .and_then(|n| n.get(i))
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_EVENT_TYPES[i]);
            match channel_name(name) {
                n if n.is_empty() || n == "--" => "event".to_string(),
                n => n,
            }
        })
        .collect()
}

/// Symbolic channel name: trimmed, lowercase, inner whitespace as `_`
pub(crate) fn channel_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventCategory, MilestoneKind, TemperatureUnit};
    use crate::transform::samples::build_timeline;
    use serde_json::json;

    fn rid() -> RoastId {
        RoastId::new("ev").unwrap()
    }

    fn timeline(doc: &Map<String, Value>) -> Timeline {
        build_timeline(doc, &rid(), Provenance::Imported, TemperatureUnit::Celsius, 1, None, &mut Vec::new())
    }

    fn doc() -> Value {
        json!({
            "timex": [0, 10, 20, 30, 40, 50],
            "temp2": [200, 150, 160, 170, 185, 200],
            "temp1": [220, 210, 215, 225, 230, 235],
            "timeindex": [0, 2, 4, 0, 0, 0, 9, 0],
        })
    }

    #[test]
    fn test_milestones_resolved_and_out_of_range_dropped() {
        let doc = doc();
        let fields = doc.as_object().unwrap();
        let mut notes = Vec::new();
        let resolved = resolve_milestones(fields, &timeline(fields), &rid(), Provenance::Imported, &mut notes);

        assert_eq!(resolved.set.len(), 2);
        assert_eq!(resolved.set.time_s(MilestoneKind::DryEnd), Some(20.0));
        assert_eq!(resolved.set.fc_start.unwrap().temperature, Some(185.0));
        assert_eq!(resolved.set.drop, None);
        assert_eq!(resolved.events.len(), 2);
        assert!(resolved.events.iter().all(|e| e.category == EventCategory::Milestone && e.value.is_none()));
        assert_eq!(resolved.positions, vec![2, 4]);
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_auxiliary_channels_emit_changes_only() {
        let mut doc = doc();
        doc["extratimex"] = json!([[0, 10, 20, 30]]);
        doc["extratemp1"] = json!([[5, 5, 8, 8]]);
        doc["extratemp2"] = json!([[40, 60]]);
        doc["extraname1"] = json!(["Fan Speed"]);
        doc["extraname2"] = json!([""]);
        let events = auxiliary_events(doc.as_object().unwrap(), &rid(), Provenance::Imported);

        let fan: Vec<_> = events.iter().filter(|e| e.channel == "fan_speed").collect();
        assert_eq!(fan.len(), 2);
        assert_eq!(fan[1].time_s, 20.0);
        assert_eq!(fan[1].value.as_deref(), Some("8"));
        assert_eq!(fan[0].type_code, 200);

        let second: Vec<_> = events.iter().filter(|e| e.channel == "extra0_2").collect();
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].type_code, 201);
        assert!(events.iter().all(|e| e.automatic && !e.user_generated));
    }

    #[test]
    fn test_special_events_decoded() {
        let mut doc = doc();
        doc["specialevents"] = json!([1, 3, 99, 4]);
        doc["specialeventstype"] = json!([0, 3, 3, 7]);
        doc["specialeventsvalue"] = json!([6.0, 8.5, 2.0, 1.0]);
        doc["etypes"] = json!(["Air", "Drum", "Damper", "Burner", "--"]);
        let fields = doc.as_object().unwrap();
        let mut notes = Vec::new();
        let events = special_events(fields, &timeline(fields), &rid(), Provenance::Imported, &mut notes);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].channel, "air");
        assert_eq!(events[0].time_s, 10.0);
        assert_eq!(events[0].numeric_value(), Some(50.0));
        assert_eq!(events[1].channel, "burner");
        assert_eq!(events[1].numeric_value(), Some(75.0));
        assert_eq!(events[1].type_code, 3);
        assert!(events.iter().all(|e| e.user_generated && !e.automatic));
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_channel_name() {
        assert_eq!(channel_name("  Fan  Speed "), "fan_speed");
        assert_eq!(channel_name("Burner"), "burner");
    }
}
