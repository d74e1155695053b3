//! Core types for the hunt.
//!
//! - [`Checkpoint`] and [`Course`] describe where the player has to go
//! - [`Position`] and [`LocationEvent`] are what the location service reports
//! - [`SessionState`] is the single record the controller owns
//! - [`WatchOptions`] are handed to the provider when subscribing
//!
//! ```rust
//! use geohunt::types::{Checkpoint, Course, Position};
//!
//! let course = Course::new(vec![
//!     Checkpoint::new("Cathedral", 43.70313, 7.26608, 50.0, "Shall we begin?"),
//! ])?;
//!
//! let check = course.get(0).unwrap().check(&Position::new(43.70320, 7.26610));
//! assert!(check.in_zone);
//! # Ok::<(), geohunt::HuntError>(())
//! ```

mod checkpoint;
mod event;
mod options;
mod position;
mod state;

pub use checkpoint::{Checkpoint, Course};
pub use event::LocationEvent;
pub use options::WatchOptions;
pub use position::Position;
pub use state::{HuntStatus, Progress, SessionState, ZoneCheck};
