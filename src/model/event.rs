use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{MilestoneKind, ModelError, Provenance, RoastId};

/// Type-code base for synthesized milestone events (`base + slot`)
pub const MILESTONE_TYPE_BASE: i32 = 100;

/// Type-code base for auxiliary device channels (`base + 2 * device + channel`)
pub const AUX_CHANNEL_TYPE_BASE: i32 = 200;

/// Broad event classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Named instantaneous roast milestone (charge, first crack, drop...)
    Milestone,
    /// Operator or controller setting on a continuous channel (fan, heat...)
    Control,
    /// Notification emitted by the roasting machine itself
    Machine,
}

impl EventCategory {
    /// Category as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Milestone => "milestone",
            EventCategory::Control => "control",
            EventCategory::Machine => "machine",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "milestone" => Ok(EventCategory::Milestone),
            "control" => Ok(EventCategory::Control),
            "machine" => Ok(EventCategory::Machine),
            other => Err(ModelError::UnknownCategory(other.to_string())),
        }
    }
}

/// A discrete roast event.
///
/// Values are string-encoded so machine events can carry arbitrary payloads;
/// control values are numbers rendered as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Owning roast
    pub roast_id: RoastId,
    /// Seconds since the start of recording
    pub time_s: f64,
    /// Numeric type code
    pub type_code: i32,
    /// String-encoded value (null for milestones)
    pub value: Option<String>,
    /// Symbolic channel name (`fc_start`, `fan`, ...)
    pub channel: String,
    /// Broad category
    pub category: EventCategory,
    /// Free-form subcategory
    pub subcategory: Option<String>,
    /// Entered by a person
    pub user_generated: bool,
    /// Emitted by automation
    pub automatic: bool,
    /// Origin of this record
    pub provenance: Provenance,
}

impl Event {
    /// Milestone event with a null value
    pub fn milestone(
        roast_id: RoastId,
        kind: MilestoneKind,
        time_s: f64,
        provenance: Provenance,
    ) -> Self {
        Self {
            roast_id,
            time_s,
            type_code: MILESTONE_TYPE_BASE + kind.slot() as i32,
            value: None,
            channel: kind.name().to_string(),
            category: EventCategory::Milestone,
            subcategory: Some("roast_phase".to_string()),
            user_generated: false,
            automatic: false,
            provenance,
        }
    }

    /// Control event carrying a numeric setting
    pub fn control(
        roast_id: RoastId,
        channel: impl Into<String>,
        time_s: f64,
        type_code: i32,
        value: f64,
        provenance: Provenance,
    ) -> Self {
        Self {
            roast_id,
            time_s,
            type_code,
            value: Some(format_value(value)),
            channel: channel.into(),
            category: EventCategory::Control,
            subcategory: None,
            user_generated: false,
            automatic: true,
            provenance,
        }
    }

    /// Set the subcategory
    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    /// Mark the event as entered by a person
    pub fn user_generated(mut self) -> Self {
        self.user_generated = true;
        self.automatic = false;
        self
    }

    /// Numeric interpretation of the value, if it has one
    pub fn numeric_value(&self) -> Option<f64> {
        self.value
            .as_deref()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    /// Milestone kind of a milestone event: by channel name (synonyms
    /// included), else by type code
    pub fn milestone_kind(&self) -> Option<MilestoneKind> {
        if self.category != EventCategory::Milestone {
            return None;
        }
        MilestoneKind::from_name(&self.channel).or_else(|| {
            self.type_code
                .checked_sub(MILESTONE_TYPE_BASE)
                .and_then(|slot| usize::try_from(slot).ok())
                .and_then(MilestoneKind::from_slot)
        })
    }
}

/// Render a control value without trailing zeros (`5`, `7.5`)
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
