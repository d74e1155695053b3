//! Location-based treasure hunt engine.
//!
//! A hunt is an ordered list of checkpoints, each with a zone radius. The player's
//! live position is compared against the current checkpoint with the haversine
//! formula; once inside the zone they can move on to the next one.
//!
//! # Features
//!
//! - **State machine**: [`HuntController`] is pure and synchronous, easy to test
//! - **Explicit subscriptions**: [`HuntSession`] holds one location feed while the
//!   hunt runs and replaces it whenever the checkpoint changes
//! - **Pluggable sources**: push platform callbacks through [`ManualProvider`] or
//!   replay a recorded walk with [`ReplayProvider`]
//! - **Screen model**: [`Screen`] projects the state onto three screens
//!
//! ## Example (host-pushed positions)
//!
//! ```rust,no_run
//! use geohunt::{GeoHunt, HuntConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> geohunt::Result<()> {
//!     let (mut session, handle) = GeoHunt::manual(&HuntConfig::default())?;
//!     session.start();
//!
//!     // Forward the platform's geolocation callback
//!     handle.push_fix(43.70313, 7.26608);
//!     session.next_event().await;
//!
//!     if session.state().in_zone {
//!         session.advance();
//!     }
//!     println!("{}", session.screen());
//!     Ok(())
//! }
//! ```

mod error;
pub mod geo;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

pub mod config;
pub mod controller;
pub mod driver;
pub mod provider;
pub mod providers;
pub mod session;
pub mod view;

pub use error::*;
pub use types::*;

pub use config::HuntConfig;
pub use controller::HuntController;
pub use driver::{Driver, Subscription};
pub use geo::haversine_distance;
pub use provider::{LocationProvider, PositionFeed};
pub use providers::{ManualHandle, ManualProvider, RecordedTrack, ReplayProvider};
pub use session::HuntSession;
pub use view::{HuntingView, Screen};

/// Entry point for building hunt sessions.
pub struct GeoHunt;

impl GeoHunt {
    /// Session fed by positions pushed through the returned handle.
    ///
    /// Use this when the host already receives location callbacks from its platform.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the course is empty or has invalid checkpoints.
    pub fn manual(config: &HuntConfig) -> Result<(HuntSession<ManualProvider>, ManualHandle)> {
        let (provider, handle) = ManualProvider::new();
        Ok((HuntSession::from_config(config, provider)?, handle))
    }

    /// Session replaying a recorded track file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The track file cannot be read or parsed
    /// - The track has no points
    /// - The course is invalid
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use geohunt::{GeoHunt, HuntConfig};
    ///
    /// # fn main() -> geohunt::Result<()> {
    /// let config = HuntConfig::from_file("course.yaml")?;
    /// let session = GeoHunt::replay(&config, "walk.yaml", 10.0)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn replay<P: AsRef<std::path::Path>>(
        config: &HuntConfig,
        track: P,
        speed: f64,
    ) -> Result<HuntSession<ReplayProvider>> {
        let mut provider = ReplayProvider::open(track)?;
        provider.set_speed(speed);
        HuntSession::from_config(config, provider)
    }
}
