use serde::{Deserialize, Serialize};

/// Lower bound accepted by the coordinate inputs.
pub const COORD_MIN: f64 = -1000.0;
/// Upper bound accepted by the coordinate inputs.
pub const COORD_MAX: f64 = 1000.0;
/// Step applied by the TUI spin fields.
pub const COORD_STEP: f64 = 0.1;
/// Fixed precision of the coordinate inputs.
pub const COORD_DECIMALS: u32 = 2;

/// Round a coordinate to the precision the input layer works with.
pub fn round_coordinate(v: f64) -> f64 {
    let scale = 10f64.powi(COORD_DECIMALS as i32);
    let rounded = (v * scale).round() / scale;
    // Avoid rendering "-0.0" for tiny negative inputs that round to zero.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Raw values collected by a presentation layer, not yet validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRequest {
    pub target_map: String,
    pub target_x: f64,
    pub target_y: f64,
}

impl GoalRequest {
    pub fn new(target_map: impl Into<String>, target_x: f64, target_y: f64) -> Self {
        Self {
            target_map: target_map.into(),
            target_x,
            target_y,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    pub secs: u32,
    pub nsecs: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub seq: u32,
    pub stamp: Stamp,
    pub frame_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalId {
    pub stamp: Stamp,
    pub id: String,
}

/// The `goal` section of the action goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigateToGoal {
    pub target_x: f64,
    pub target_y: f64,
    pub target_map: String,
}

/// A validated action goal. Only `goal::build` constructs one, so `target_map`
/// is always non-empty and trimmed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalMessage {
    header: Header,
    goal_id: GoalId,
    goal: NavigateToGoal,
}

impl GoalMessage {
    pub(crate) fn from_parts(goal: NavigateToGoal) -> Self {
        Self {
            header: Header::default(),
            goal_id: GoalId::default(),
            goal,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn goal_id(&self) -> &GoalId {
        &self.goal_id
    }

    pub fn goal(&self) -> &NavigateToGoal {
        &self.goal
    }

    pub fn target_map(&self) -> &str {
        &self.goal.target_map
    }

    pub fn target_x(&self) -> f64 {
        self.goal.target_x
    }

    pub fn target_y(&self) -> f64 {
        self.goal.target_y
    }
}

/// Result of one dispatch attempt. `Sent` only acknowledges that the publisher
/// was launched, not that anything consumed the goal. A dry run that builds a
/// valid payload is also `Sent`; `DispatchReport::published` tells the two apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Sent,
    Failed(String),
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent)
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Sent => None,
            DispatchOutcome::Failed(reason) => Some(reason),
        }
    }
}

/// Everything known about one user action, for presentation layers.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub timestamp_utc: String,
    pub request: GoalRequest,
    pub topic: String,
    pub message_type: String,
    /// Serialized goal, absent when validation failed before a message existed.
    pub payload: Option<String>,
    pub dry_run: bool,
    /// True only when a publisher was actually launched; always false for dry runs.
    pub published: bool,
    pub outcome: DispatchOutcome,
}

pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into())
}
