//! Options passed to a location provider when subscribing

use serde::{Deserialize, Serialize};

/// Subscription options for a position feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchOptions {
    /// Ask the platform for its most accurate fixes (GPS over network location)
    pub high_accuracy: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self { high_accuracy: true }
    }
}
