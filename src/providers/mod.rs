//! Location provider implementations

pub mod manual;
pub mod replay;

pub use manual::{ManualFeed, ManualHandle, ManualProvider};
pub use replay::{RecordedTrack, ReplayFeed, ReplayProvider, TrackPoint};
