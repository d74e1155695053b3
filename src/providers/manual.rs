//! Host-pushed provider
//!
//! Embedding hosts that receive location callbacks from their own platform
//! (a browser's geolocation watch, a mobile OS service) forward them through a
//! [`ManualHandle`]. Only subscriptions live at the moment of the push see an
//! event, matching how a platform watch behaves.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::provider::{LocationProvider, PositionFeed};
use crate::types::{LocationEvent, WatchOptions};
use crate::Result;

const CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Default)]
struct WatchLog {
    count: AtomicUsize,
    last_options: Mutex<Option<WatchOptions>>,
}

/// Provider whose events are pushed through a [`ManualHandle`]
#[derive(Debug)]
pub struct ManualProvider {
    events: broadcast::Sender<LocationEvent>,
    log: Arc<WatchLog>,
}

/// Sending side of a [`ManualProvider`]
#[derive(Debug, Clone)]
pub struct ManualHandle {
    events: broadcast::Sender<LocationEvent>,
    log: Arc<WatchLog>,
}

impl ManualProvider {
    /// Create a provider and the handle that feeds it
    pub fn new() -> (Self, ManualHandle) {
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);
        let log = Arc::new(WatchLog::default());
        let handle = ManualHandle { events: events.clone(), log: Arc::clone(&log) };
        (Self { events, log }, handle)
    }
}

impl LocationProvider for ManualProvider {
    type Feed = ManualFeed;

    fn watch(&mut self, options: &WatchOptions) -> Result<ManualFeed> {
        self.log.count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.log.last_options.lock() {
            *last = Some(*options);
        }
        debug!(high_accuracy = options.high_accuracy, "Manual feed opened");
        Ok(ManualFeed { events: self.events.subscribe() })
    }
}

impl ManualHandle {
    /// Push a position fix. Returns how many live subscriptions received it.
    pub fn push_fix(&self, lat: f64, lng: f64) -> usize {
        self.push(LocationEvent::fix(lat, lng))
    }

    /// Push a location failure. Returns how many live subscriptions received it.
    pub fn push_error(&self, message: impl Into<String>) -> usize {
        self.push(LocationEvent::error(message))
    }

    /// Push any event
    pub fn push(&self, event: LocationEvent) -> usize {
        self.events.send(event).unwrap_or(0)
    }

    /// Number of feeds currently open
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Number of times a feed was acquired
    pub fn watch_count(&self) -> usize {
        self.log.count.load(Ordering::SeqCst)
    }

    /// Options passed to the most recent `watch`
    pub fn last_options(&self) -> Option<WatchOptions> {
        self.log.last_options.lock().ok().and_then(|last| *last)
    }
}

/// Feed for one [`ManualProvider`] subscription
#[derive(Debug)]
pub struct ManualFeed {
    events: broadcast::Receiver<LocationEvent>,
}

#[async_trait::async_trait]
impl PositionFeed for ManualFeed {
    async fn next_event(&mut self) -> Option<LocationEvent> {
        loop {
            match self.events.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Manual feed lagged, {} events skipped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
