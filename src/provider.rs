//! Provider traits for location sources

use crate::Result;
use crate::types::{LocationEvent, WatchOptions};

/// A live stream of location callbacks for one subscription
///
/// Feeds are owned by the driver task spawned for a
/// [`Subscription`](crate::driver::Subscription) and dropped when it is released.
#[async_trait::async_trait]
pub trait PositionFeed: Send + 'static {
    /// Wait for the next callback
    ///
    /// Returns:
    /// - `Some(LocationEvent::Fix(_))` - New position available
    /// - `Some(LocationEvent::Error(_))` - The service failed; more events may follow
    /// - `None` - The source has ended and will deliver nothing more
    ///
    /// Each feed paces itself: a platform feed waits on the OS, a replay
    /// sleeps between recorded points.
    async fn next_event(&mut self) -> Option<LocationEvent>;
}

/// A source of position feeds: the platform's location service, a recorded
/// track, or a host pushing events by hand.
pub trait LocationProvider: Send {
    type Feed: PositionFeed;

    /// Acquire a new feed.
    ///
    /// Errors are treated as [`HuntError::LocationUnavailable`](crate::HuntError)
    /// and shown to the player; they never end the hunt.
    fn watch(&mut self, options: &WatchOptions) -> Result<Self::Feed>;
}
