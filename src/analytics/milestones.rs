use crate::model::{Event, MilestoneMark, MilestoneSet, TemperatureSample};

/// Build a [`MilestoneSet`] from stored milestone events.
///
/// Events are matched by channel name (synonyms included), falling back to
/// the milestone type code. Events are applied in slice order, so a later
/// event for the same milestone overwrites an earlier one.
pub fn extract_milestones(events: &[Event], samples: &[TemperatureSample]) -> MilestoneSet {
    let mut set = MilestoneSet::new();
    for event in events {
        if let Some(kind) = event.milestone_kind() {
            let temperature = nearest_primary(samples, event.time_s);
            set.set(kind, MilestoneMark::at_seconds(event.time_s, temperature));
        }
    }
    set
}

/// Primary temperature of the sample nearest in time to `time_s`.
///
/// `samples` must be sorted by time. Samples without a primary reading are
/// skipped; ties go to the earlier sample.
pub fn nearest_primary(samples: &[TemperatureSample], time_s: f64) -> Option<f64> {
    let split = samples.partition_point(|s| s.time_s < time_s);

    let before = samples[..split]
        .iter()
        .rev()
        .find_map(|s| s.primary.map(|p| (s.time_s, p)));
    let after = samples[split..]
        .iter()
        .find_map(|s| s.primary.map(|p| (s.time_s, p)));

    match (before, after) {
        (Some((tb, pb)), Some((ta, pa))) => {
            if (time_s - tb) <= (ta - time_s) {
                Some(pb)
            } else {
                Some(pa)
            }
        }
        (Some((_, p)), None) | (None, Some((_, p))) => Some(p),
        (None, None) => None,
    }
}
