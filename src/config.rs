//! Hunt configuration
//!
//! Courses are YAML files listing the checkpoints in order, plus the options
//! handed to the location provider:
//!
//! ```yaml
//! title: "Chasse au Trésor : Nice"
//! watch:
//!   high_accuracy: true
//! checkpoints:
//!   - name: "Homebox"
//!     lat: 43.706803
//!     lng: 7.2844832
//!     radius_m: 50
//!     clue: "T'as bien arrivé !"
//! ```
//!
//! Course files are often edited by hand and pasted from other tools, so stray
//! control characters and a leading byte-order mark are stripped before parsing.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::types::{Checkpoint, Course, WatchOptions};
use crate::{HuntError, Result};

fn default_title() -> String {
    "Treasure hunt".to_string()
}

/// A course and the options to run it with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HuntConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub watch: WatchOptions,

    pub checkpoints: Vec<Checkpoint>,
}

impl HuntConfig {
    /// Parse a configuration from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cleaned = clean_yaml(yaml)?;
        let config: HuntConfig = serde_yaml_ng::from_str(&cleaned).map_err(|e| {
            HuntError::Parse { context: "hunt configuration".to_string(), details: e.to_string() }
        })?;
        debug!(
            title = %config.title,
            checkpoints = config.checkpoints.len(),
            "Parsed hunt configuration"
        );
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading course: {}", path.display());
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| HuntError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    /// Validate the checkpoints into a [`Course`]
    pub fn course(&self) -> Result<Course> {
        Course::new(self.checkpoints.clone())
    }

    /// Serialize back to YAML
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

/// The walk through Nice the app shipped with.
impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            title: "Chasse au Trésor : Nice".to_string(),
            watch: WatchOptions::default(),
            checkpoints: vec![
                Checkpoint::new(
                    "Départ - Cathédrale - Vielle Ville",
                    43.70313,
                    7.26608,
                    50.0,
                    "On commence le test ?",
                ),
                Checkpoint::new("Homebox", 43.706803, 7.2844832, 50.0, "T'as bien arrivé !"),
                Checkpoint::new(
                    "Place Rossetti",
                    43.6971832,
                    7.2762796,
                    100.0,
                    "Bienvenue à la casa !",
                ),
            ],
        }
    }
}

/// Drop a byte-order mark and control characters other than `\n`, `\r` and `\t`.
fn clean_yaml(yaml: &str) -> Result<String> {
    let yaml = yaml.strip_prefix('\u{feff}').unwrap_or(yaml);
    let cleaned: String = yaml
        .chars()
        .filter(|ch| !matches!(ch, '\x00'..='\x08' | '\x0B'..='\x0C' | '\x0E'..='\x1F' | '\x7F'))
        .collect();

    if cleaned.trim().is_empty() {
        return Err(HuntError::Parse {
            context: "hunt configuration".to_string(),
            details: "file is empty".to_string(),
        });
    }
    Ok(cleaned)
}
