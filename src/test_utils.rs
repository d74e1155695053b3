//! Test utilities: synthetic courses, coordinate helpers and fixture lookup
//!
//! Shared by unit tests, integration tests and benchmarks.

#![cfg(any(test, feature = "benchmark"))]

use std::path::{Path, PathBuf};

use crate::geo::EARTH_RADIUS_M;
use crate::types::{Checkpoint, Course, Position};

/// Error returned when a required fixture cannot be located.
#[derive(Debug, Clone)]
pub struct FixtureError {
    message: String,
}

impl std::fmt::Display for FixtureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FixtureError {}

/// The `test-data/` directory of this crate
pub fn test_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data")
}

/// Resolve a path under `test-data/`, failing with a readable message if it is missing.
pub fn require_fixture<P: AsRef<Path>>(relative: P) -> Result<PathBuf, FixtureError> {
    let path = test_data_dir().join(relative.as_ref());
    if path.exists() {
        Ok(path)
    } else {
        Err(FixtureError { message: format!("Missing test fixture: {}", path.display()) })
    }
}

/// Point `meters` due north of `from` along the meridian.
pub fn north_of(from: &Position, meters: f64) -> Position {
    let delta_lat = (meters / EARTH_RADIUS_M).to_degrees();
    Position::new(from.lat + delta_lat, from.lng)
}

/// Point `meters` due east of `from`, accurate for short hops.
pub fn east_of(from: &Position, meters: f64) -> Position {
    let delta_lng = (meters / (EARTH_RADIUS_M * from.lat.to_radians().cos())).to_degrees();
    Position::new(from.lat, from.lng + delta_lng)
}

/// Three checkpoints roughly a kilometer apart with 50/50/100 m zones.
pub fn three_checkpoint_course() -> Course {
    let first = Position::new(48.8584, 2.2945);
    let second = north_of(&first, 1_000.0);
    let third = east_of(&second, 1_000.0);

    Course::new(vec![
        Checkpoint::new("Alpha", first.lat, first.lng, 50.0, "Start under the tower"),
        Checkpoint::new("Bravo", second.lat, second.lng, 50.0, "Head north"),
        Checkpoint::new("Charlie", third.lat, third.lng, 100.0, "Then east"),
    ])
    .expect("synthetic course is valid")
}
