use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed set of named roast milestones, in positional slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    /// Beans loaded, roast clock start
    Charge,
    /// End of drying (alias `maillard`)
    DryEnd,
    /// First crack start
    FcStart,
    /// First crack end
    FcEnd,
    /// Second crack start
    ScStart,
    /// Second crack end
    ScEnd,
    /// Beans leave the drum
    Drop,
    /// Cooling finished (alias `end`)
    Cool,
}

impl MilestoneKind {
    /// All milestones in slot order
    pub const ALL: [MilestoneKind; 8] = [
        MilestoneKind::Charge,
        MilestoneKind::DryEnd,
        MilestoneKind::FcStart,
        MilestoneKind::FcEnd,
        MilestoneKind::ScStart,
        MilestoneKind::ScEnd,
        MilestoneKind::Drop,
        MilestoneKind::Cool,
    ];

    /// Position in the fixed 8-slot index array
    pub fn slot(&self) -> usize {
        *self as usize
    }

    /// Milestone at a slot position
    pub fn from_slot(slot: usize) -> Option<Self> {
        Self::ALL.get(slot).copied()
    }

    /// Canonical symbolic name
    pub fn name(&self) -> &'static str {
        match self {
            MilestoneKind::Charge => "charge",
            MilestoneKind::DryEnd => "dry_end",
            MilestoneKind::FcStart => "fc_start",
            MilestoneKind::FcEnd => "fc_end",
            MilestoneKind::ScStart => "sc_start",
            MilestoneKind::ScEnd => "sc_end",
            MilestoneKind::Drop => "drop",
            MilestoneKind::Cool => "cool",
        }
    }

    /// Resolve a symbolic name, accepting the `maillard` and `end` synonyms
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "charge" => Some(MilestoneKind::Charge),
            "dry_end" | "maillard" => Some(MilestoneKind::DryEnd),
            "fc_start" => Some(MilestoneKind::FcStart),
            "fc_end" => Some(MilestoneKind::FcEnd),
            "sc_start" => Some(MilestoneKind::ScStart),
            "sc_end" => Some(MilestoneKind::ScEnd),
            "drop" => Some(MilestoneKind::Drop),
            "cool" | "end" => Some(MilestoneKind::Cool),
            _ => None,
        }
    }
}

impl fmt::Display for MilestoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Time and nearest primary temperature of one milestone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MilestoneMark {
    /// Milliseconds since the start of recording
    pub time_ms: i64,
    /// Primary temperature of the nearest sample
    pub temperature: Option<f64>,
}

impl MilestoneMark {
    /// Mark at `time_s` seconds
    pub fn at_seconds(time_s: f64, temperature: Option<f64>) -> Self {
        Self {
            time_ms: (time_s * 1000.0).round() as i64,
            temperature,
        }
    }

    /// Time in seconds
    pub fn time_s(&self) -> f64 {
        self.time_ms as f64 / 1000.0
    }
}

/// Resolved milestones of one roast. Unset fields mean "not recorded".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MilestoneSet {
    /// Charge
    pub charge: Option<MilestoneMark>,
    /// Dry end / turning into Maillard
    pub dry_end: Option<MilestoneMark>,
    /// First crack start
    pub fc_start: Option<MilestoneMark>,
    /// First crack end
    pub fc_end: Option<MilestoneMark>,
    /// Second crack start
    pub sc_start: Option<MilestoneMark>,
    /// Second crack end
    pub sc_end: Option<MilestoneMark>,
    /// Drop
    pub drop: Option<MilestoneMark>,
    /// Cool end
    pub cool: Option<MilestoneMark>,
}

impl MilestoneSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a milestone by kind
    pub fn get(&self, kind: MilestoneKind) -> Option<MilestoneMark> {
        match kind {
            MilestoneKind::Charge => self.charge,
            MilestoneKind::DryEnd => self.dry_end,
            MilestoneKind::FcStart => self.fc_start,
            MilestoneKind::FcEnd => self.fc_end,
            MilestoneKind::ScStart => self.sc_start,
            MilestoneKind::ScEnd => self.sc_end,
            MilestoneKind::Drop => self.drop,
            MilestoneKind::Cool => self.cool,
        }
    }

    /// Set (or overwrite) a milestone
    pub fn set(&mut self, kind: MilestoneKind, mark: MilestoneMark) {
        let slot = match kind {
            MilestoneKind::Charge => &mut self.charge,
            MilestoneKind::DryEnd => &mut self.dry_end,
            MilestoneKind::FcStart => &mut self.fc_start,
            MilestoneKind::FcEnd => &mut self.fc_end,
            MilestoneKind::ScStart => &mut self.sc_start,
            MilestoneKind::ScEnd => &mut self.sc_end,
            MilestoneKind::Drop => &mut self.drop,
            MilestoneKind::Cool => &mut self.cool,
        };
        *slot = Some(mark);
    }

    /// Time in seconds of a milestone
    pub fn time_s(&self, kind: MilestoneKind) -> Option<f64> {
        self.get(kind).map(|m| m.time_s())
    }

    /// Set milestones in slot order
    pub fn iter(&self) -> impl Iterator<Item = (MilestoneKind, MilestoneMark)> + '_ {
        MilestoneKind::ALL
            .iter()
            .filter_map(move |&kind| self.get(kind).map(|mark| (kind, mark)))
    }

    /// Number of set milestones
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// True when no milestone is set
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synonyms() {
        assert_eq!(MilestoneKind::from_name("maillard"), Some(MilestoneKind::DryEnd));
        assert_eq!(MilestoneKind::from_name("END"), Some(MilestoneKind::Cool));
        assert_eq!(MilestoneKind::from_name("turning_point"), None);
    }

    #[test]
    fn test_slot_order() {
        for (i, kind) in MilestoneKind::ALL.iter().enumerate() {
            assert_eq!(kind.slot(), i);
            assert_eq!(MilestoneKind::from_slot(i), Some(*kind));
        }
        assert_eq!(MilestoneKind::from_slot(8), None);
    }

    #[test]
    fn test_set_and_iterate() {
        let mut set = MilestoneSet::new();
        assert!(set.is_empty());
        set.set(MilestoneKind::Drop, MilestoneMark::at_seconds(540.0, Some(210.0)));
        set.set(MilestoneKind::Charge, MilestoneMark::at_seconds(0.0, Some(200.0)));

        let kinds: Vec<_> = set.iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![MilestoneKind::Charge, MilestoneKind::Drop]);
        assert_eq!(set.get(MilestoneKind::Drop).unwrap().time_ms, 540_000);
        assert_eq!(set.time_s(MilestoneKind::Drop), Some(540.0));
    }
}
