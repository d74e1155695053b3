//! Replay provider for recorded walks
//!
//! A recorded track is a YAML list of fixes and failures captured from a real
//! device, replayed at a fixed cadence:
//!
//! ```yaml
//! interval_ms: 1000
//! points:
//!   - { lat: 43.70313, lng: 7.26608 }
//!   - { error: "signal lost" }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, info, trace};

use crate::provider::{LocationProvider, PositionFeed};
use crate::types::{LocationEvent, Position, WatchOptions};
use crate::{HuntError, Result};

fn default_interval_ms() -> u64 {
    1000
}

/// One recorded callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackPoint {
    Fix { lat: f64, lng: f64 },
    Error { error: String },
}

impl From<&TrackPoint> for LocationEvent {
    fn from(point: &TrackPoint) -> Self {
        match point {
            TrackPoint::Fix { lat, lng } => LocationEvent::Fix(Position::new(*lat, *lng)),
            TrackPoint::Error { error } => LocationEvent::Error(error.clone()),
        }
    }
}

/// A recorded walk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedTrack {
    /// Time between callbacks at 1x speed
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    pub points: Vec<TrackPoint>,
}

impl RecordedTrack {
    /// Parse a track from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let track: RecordedTrack = serde_yaml_ng::from_str(yaml).map_err(|e| HuntError::Parse {
            context: "recorded track".to_string(),
            details: e.to_string(),
        })?;
        track.validate()?;
        Ok(track)
    }

    /// Load a track from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| HuntError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    fn validate(&self) -> Result<()> {
        if self.points.is_empty() {
            return Err(HuntError::config("recorded track has no points"));
        }
        if self.interval_ms == 0 {
            return Err(HuntError::config("recorded track interval must be positive"));
        }
        Ok(())
    }
}

/// Replay provider that plays back a [`RecordedTrack`]
///
/// All feeds share one cursor: re-subscribing after a checkpoint change picks
/// up where the previous feed stopped, like a real walk would.
#[derive(Debug)]
pub struct ReplayProvider {
    points: Arc<[TrackPoint]>,
    cursor: Arc<AtomicUsize>,
    interval: Duration,

    /// Playback speed multiplier (1.0 = as recorded)
    speed: f64,
}

impl ReplayProvider {
    /// Create a replay provider from a parsed track
    pub fn new(track: RecordedTrack) -> Result<Self> {
        track.validate()?;
        info!(
            "Loaded recorded track: {} points every {}ms",
            track.points.len(),
            track.interval_ms
        );
        Ok(Self {
            points: track.points.into(),
            cursor: Arc::new(AtomicUsize::new(0)),
            interval: Duration::from_millis(track.interval_ms),
            speed: 1.0,
        })
    }

    /// Load and replay a track file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(RecordedTrack::from_file(path)?)
    }

    /// Set playback speed
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = if speed.is_finite() { speed.clamp(0.1, 100.0) } else { 1.0 };
        debug!("Playback speed set to {}x", self.speed);
    }

    /// Current playback speed
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Index of the next point to be delivered
    pub fn position(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    /// Total number of recorded points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Every point has been delivered
    pub fn is_exhausted(&self) -> bool {
        self.position() >= self.points.len()
    }

    fn pacing(&self) -> Duration {
        self.interval.div_f64(self.speed)
    }
}

impl LocationProvider for ReplayProvider {
    type Feed = ReplayFeed;

    fn watch(&mut self, options: &WatchOptions) -> Result<ReplayFeed> {
        debug!(
            position = self.position(),
            high_accuracy = options.high_accuracy,
            "Replay feed opened"
        );
        Ok(ReplayFeed {
            points: Arc::clone(&self.points),
            cursor: Arc::clone(&self.cursor),
            pacing: self.pacing(),
            ticker: None,
        })
    }
}

/// Feed for one [`ReplayProvider`] subscription
#[derive(Debug)]
pub struct ReplayFeed {
    points: Arc<[TrackPoint]>,
    cursor: Arc<AtomicUsize>,
    pacing: Duration,
    ticker: Option<Interval>,
}

#[async_trait::async_trait]
impl PositionFeed for ReplayFeed {
    async fn next_event(&mut self) -> Option<LocationEvent> {
        if self.cursor.load(Ordering::SeqCst) >= self.points.len() {
            debug!("Reached end of recorded track");
            return None;
        }

        let pacing = self.pacing;
        let ticker = self.ticker.get_or_insert_with(|| {
            let mut ticker = interval(pacing);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        ticker.tick().await;

        // Advance only after the wait so a cancelled feed does not lose a point
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        let point = self.points.get(index)?;
        trace!("Replaying point {}/{}", index + 1, self.points.len());
        Some(LocationEvent::from(point))
    }
}
