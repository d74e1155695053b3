//! Checkpoints and the ordered course they form

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{Position, ZoneCheck};
use crate::{HuntError, Result};

/// A named geographic target with a proximity radius and an unlock clue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub name: String,
    pub lat: f64,
    pub lng: f64,

    /// Zone radius in meters; older course files call it `radius`
    #[serde(alias = "radius")]
    pub radius_m: f64,

    #[serde(default)]
    pub clue: String,
}

impl Checkpoint {
    /// Create a new checkpoint
    pub fn new(
        name: impl Into<String>,
        lat: f64,
        lng: f64,
        radius_m: f64,
        clue: impl Into<String>,
    ) -> Self {
        Self { name: name.into(), lat, lng, radius_m, clue: clue.into() }
    }

    /// Center of the zone
    pub fn position(&self) -> Position {
        Position::new(self.lat, self.lng)
    }

    /// Measure `position` against this checkpoint's zone.
    pub fn check(&self, position: &Position) -> ZoneCheck {
        ZoneCheck::evaluate(self.position().distance_to(position), self.radius_m)
    }

    fn validate(&self, index: usize) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(HuntError::config(format!("checkpoint {} has no name", index)));
        }
        if !self.position().is_on_globe() {
            return Err(HuntError::config(format!(
                "checkpoint '{}' has invalid coordinates ({}, {})",
                self.name, self.lat, self.lng
            )));
        }
        if !self.radius_m.is_finite() || self.radius_m <= 0.0 {
            return Err(HuntError::config(format!(
                "checkpoint '{}' has invalid radius {}",
                self.name, self.radius_m
            )));
        }
        Ok(())
    }
}

/// Validated, non-empty, immutable sequence of checkpoints.
///
/// Cloning is cheap; clones share the same checkpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    checkpoints: Arc<[Checkpoint]>,
}

impl Course {
    /// Build a course, rejecting empty lists and malformed checkpoints.
    pub fn new(checkpoints: Vec<Checkpoint>) -> Result<Self> {
        if checkpoints.is_empty() {
            return Err(HuntError::config("a course needs at least one checkpoint"));
        }
        for (index, checkpoint) in checkpoints.iter().enumerate() {
            checkpoint.validate(index)?;
        }
        Ok(Self { checkpoints: checkpoints.into() })
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Checkpoint> {
        self.checkpoints.get(index)
    }

    /// Index of the final checkpoint
    pub fn last_index(&self) -> usize {
        self.checkpoints.len() - 1
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.checkpoints.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cathedral() -> Checkpoint {
        Checkpoint::new("Cathedral", 43.70313, 7.26608, 50.0, "Shall we begin?")
    }

    #[test]
    fn empty_course_is_rejected() {
        let err = Course::new(vec![]).unwrap_err();
        assert!(matches!(err, HuntError::Config { .. }));
    }

    #[test]
    fn malformed_checkpoints_are_rejected() {
        let mut bad_radius = cathedral();
        bad_radius.radius_m = 0.0;
        assert!(Course::new(vec![bad_radius]).is_err());

        let mut bad_lat = cathedral();
        bad_lat.lat = 123.0;
        assert!(Course::new(vec![bad_lat]).is_err());

        let mut nameless = cathedral();
        nameless.name = "  ".into();
        assert!(Course::new(vec![nameless]).is_err());

        let mut nan_radius = cathedral();
        nan_radius.radius_m = f64::NAN;
        assert!(Course::new(vec![nan_radius]).is_err());
    }

    #[test]
    fn course_keeps_order() {
        let second = Checkpoint::new("Homebox", 43.706803, 7.2844832, 50.0, "");
        let course = Course::new(vec![cathedral(), second]).unwrap();
        assert_eq!(course.len(), 2);
        assert_eq!(course.last_index(), 1);
        assert_eq!(course.get(1).map(|c| c.name.as_str()), Some("Homebox"));
        assert!(course.get(2).is_none());
        assert!(!course.is_empty());
    }

    #[test]
    fn check_at_center_is_in_zone() {
        let checkpoint = cathedral();
        let check = checkpoint.check(&checkpoint.position());
        assert_eq!(check.distance_m, 0.0);
        assert!(check.in_zone);
    }

    #[test]
    fn legacy_radius_key_is_accepted() {
        let yaml = "name: Place Rossetti\nlat: 43.6971832\nlng: 7.2762796\nradius: 100\n";
        let checkpoint: Checkpoint = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(checkpoint.radius_m, 100.0);
        assert!(checkpoint.clue.is_empty());
    }
}
