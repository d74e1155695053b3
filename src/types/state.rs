//! Session state and the results of controller operations

use serde::{Deserialize, Serialize};

use super::Position;

/// Which of the three screens the hunt is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HuntStatus {
    #[default]
    NotStarted,
    InProgress,
    Finished,
}

/// Everything the UI needs to render the hunt.
///
/// `current_index` stays below the course length while the hunt is in progress.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub status: HuntStatus,
    pub current_index: usize,
    pub last_position: Option<Position>,
    pub in_zone: bool,
    pub last_error: Option<String>,

    /// Distance from `last_position` to the current checkpoint
    pub last_distance_m: Option<f64>,
}

impl SessionState {
    pub fn is_in_progress(&self) -> bool {
        self.status == HuntStatus::InProgress
    }

    pub fn is_finished(&self) -> bool {
        self.status == HuntStatus::Finished
    }
}

/// Outcome of measuring a fix against a checkpoint zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneCheck {
    pub distance_m: f64,
    pub in_zone: bool,
}

impl ZoneCheck {
    /// The zone boundary is inclusive.
    pub fn evaluate(distance_m: f64, radius_m: f64) -> Self {
        Self { distance_m, in_zone: distance_m <= radius_m }
    }
}

/// Outcome of the player pressing "arrived"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Not in the zone, or the hunt is not in progress
    Ignored,

    /// Moved on to the checkpoint at this index
    Next(usize),

    /// The last checkpoint was reached
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_boundary_is_inclusive() {
        assert!(ZoneCheck::evaluate(50.0, 50.0).in_zone);
        assert!(ZoneCheck::evaluate(49.999, 50.0).in_zone);
        assert!(!ZoneCheck::evaluate(50.0001, 50.0).in_zone);
    }

    #[test]
    fn default_state_is_not_started() {
        let state = SessionState::default();
        assert_eq!(state.status, HuntStatus::NotStarted);
        assert_eq!(state.current_index, 0);
        assert!(!state.in_zone);
        assert!(state.last_position.is_none());
        assert!(state.last_error.is_none());
    }
}
