use std::collections::BTreeMap;

use crate::model::{round_to, MilestoneKind, MilestoneSet, PhaseMetrics};

/// Compute the phase breakdown of a roast.
///
/// The start anchor is charge, else `first_sample_s`. The end anchor is drop,
/// else cool, else `as_of_s` (the current time for a roast in progress, the
/// last sample for a finished document). A phase whose boundaries are missing
/// or inverted reports 0%.
pub fn phase_metrics(
    milestones: &MilestoneSet,
    first_sample_s: Option<f64>,
    as_of_s: Option<f64>,
) -> PhaseMetrics {
    let start = milestones.time_s(MilestoneKind::Charge).or(first_sample_s);
    let end = milestones
        .time_s(MilestoneKind::Drop)
        .or_else(|| milestones.time_s(MilestoneKind::Cool))
        .or(as_of_s);

    let relative = |kind: MilestoneKind| Some(milestones.time_s(kind)? - start?);
    let relative_times: BTreeMap<MilestoneKind, f64> = milestones
        .iter()
        .filter_map(|(kind, _)| relative(kind).map(|t| (kind, t)))
        .collect();

    let mut metrics = PhaseMetrics {
        start_s: start,
        end_s: end,
        turning_point_s: relative(MilestoneKind::DryEnd),
        first_crack_s: relative(MilestoneKind::FcStart),
        relative_times,
        ..PhaseMetrics::default()
    };

    let (Some(start), Some(end)) = (start, end) else {
        return metrics;
    };
    let total = end - start;
    if total <= 0.0 {
        return metrics;
    }
    metrics.total_duration_s = total;

    let dry_end = milestones.time_s(MilestoneKind::DryEnd);
    let fc_start = milestones.time_s(MilestoneKind::FcStart);

    let share = |from: Option<f64>, to: Option<f64>| -> f64 {
        match (from, to) {
            (Some(a), Some(b)) if start <= a && a <= b && b <= end => round_to((b - a) / total * 100.0, 2),
            _ => 0.0,
        }
    };
    metrics.drying_pct = share(Some(start), dry_end);
    metrics.maillard_pct = share(dry_end, fc_start);
    metrics.development_pct = share(fc_start, Some(end));

    metrics
}
