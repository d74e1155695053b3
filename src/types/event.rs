//! Events delivered by a position feed

use serde::{Deserialize, Serialize};

use super::Position;

/// One callback from the location service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocationEvent {
    /// A new position fix
    Fix(Position),

    /// The service failed; the message is the platform's, possibly empty
    Error(String),
}

impl LocationEvent {
    /// Shorthand for a fix event
    pub fn fix(lat: f64, lng: f64) -> Self {
        LocationEvent::Fix(Position::new(lat, lng))
    }

    /// Shorthand for an error event
    pub fn error(message: impl Into<String>) -> Self {
        LocationEvent::Error(message.into())
    }
}
