//! Error types for the treasure hunt engine.
//!
//! Only one kind of error ever reaches the player: [`HuntError::LocationUnavailable`].
//! It is surfaced as inline text through the session state and never aborts a hunt.
//! The remaining variants cover loading courses and recorded tracks.
//!
//! ## Recovery
//!
//! ```rust
//! use geohunt::HuntError;
//!
//! let error = HuntError::location_unavailable("User denied Geolocation");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for hunt operations.
pub type Result<T, E = HuntError> = std::result::Result<T, E>;

/// Text shown when the location service fails without saying why.
pub const LOCATION_FALLBACK_MESSAGE: &str = "Permission denied or position unavailable. \
     Check your location settings and try again.";

/// Main error type for hunt operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HuntError {
    #[error("Location unavailable: {message}")]
    LocationUnavailable { message: String },

    #[error("Invalid hunt configuration: {reason}")]
    Config { reason: String },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("File error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HuntError {
    /// Returns whether the player can fix this by retrying.
    ///
    /// Nothing in the crate retries automatically; this only drives what the UI offers.
    pub fn is_retryable(&self) -> bool {
        match self {
            HuntError::LocationUnavailable { .. } => true,
            HuntError::Config { .. } => false,
            HuntError::Parse { .. } => false,
            HuntError::File { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            HuntError::LocationUnavailable { .. } => vec![
                "Allow location access for this app",
                "Move outdoors for a better signal",
                "Enable high-accuracy location on the device",
            ],
            HuntError::Config { .. } => vec![
                "Check that the course has at least one checkpoint",
                "Verify latitudes are within [-90, 90] and longitudes within [-180, 180]",
                "Use a positive radius for every checkpoint",
            ],
            HuntError::Parse { .. } => vec![
                "Check the YAML syntax of the file",
                "Compare the file against the bundled samples in test-data/",
            ],
            HuntError::File { .. } => vec![
                "Check the file exists and is readable",
                "Check file permissions",
            ],
        }
    }

    /// The text to show the player for this error.
    ///
    /// Location failures are prefixed and fall back to a generic explanation when
    /// the platform gave no message. Other errors use their `Display` form.
    pub fn user_message(&self) -> String {
        match self {
            HuntError::LocationUnavailable { message } => location_error_text(message),
            other => other.to_string(),
        }
    }

    /// Helper constructor for location failures.
    pub fn location_unavailable(message: impl Into<String>) -> Self {
        HuntError::LocationUnavailable { message: message.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn config(reason: impl Into<String>) -> Self {
        HuntError::Config { reason: reason.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        HuntError::File { path, source }
    }
}

/// Build the banner text for a raw location-service message.
pub(crate) fn location_error_text(message: &str) -> String {
    let message = message.trim();
    if message.is_empty() {
        format!("Location error: {}", LOCATION_FALLBACK_MESSAGE)
    } else {
        format!("Location error: {}", message)
    }
}

impl From<std::io::Error> for HuntError {
    fn from(err: std::io::Error) -> Self {
        HuntError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<serde_yaml_ng::Error> for HuntError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        HuntError::Parse { context: "YAML".to_string(), details: err.to_string() }
    }
}
