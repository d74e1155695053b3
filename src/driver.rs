//! Driver spawns and manages the task behind a location subscription

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::provider::PositionFeed;
use crate::types::LocationEvent;

type EventRequest = oneshot::Sender<LocationEvent>;

/// A live location subscription
///
/// The driver task reads its feed only when [`Subscription::recv`] asks for an
/// event, so nothing is pulled from the feed ahead of the consumer. Releasing
/// (or dropping) the subscription cancels the task; no event from this feed is
/// observed afterwards and the feed is left exactly where the consumer stopped.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    target: usize,
    requests: mpsc::Sender<EventRequest>,
    cancel: CancellationToken,
}

impl Subscription {
    /// Sequence number, unique within the session that acquired it
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Checkpoint index this subscription was acquired for
    pub fn target(&self) -> usize {
        self.target
    }

    /// Wait for the next event; `None` once the feed has ended.
    ///
    /// Cancel-safe: an event fetched for an abandoned call is kept for the next one.
    pub async fn recv(&mut self) -> Option<LocationEvent> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.requests.send(reply_tx).await.ok()?;
        reply_rx.await.ok()
    }

    /// Token cancelled when this subscription is released
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Unsubscribe.
    ///
    /// The work happens in `Drop`, so letting a subscription go out of scope
    /// unsubscribes too.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!(id = self.id, target = self.target, "Releasing location subscription");
        self.cancel.cancel();
    }
}

/// Driver spawns the task that owns a position feed
pub struct Driver;

impl Driver {
    /// Spawn a forwarding task for `feed`.
    ///
    /// Events are fetched one at a time, on request, so callbacks are handled
    /// strictly in sequence. Must be called from within a tokio runtime.
    pub fn spawn<F>(feed: F, id: u64, target: usize) -> Subscription
    where
        F: PositionFeed,
    {
        let (request_tx, request_rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        tokio::spawn(async move {
            Self::feed_task(feed, request_rx, cancel_task, id).await;
        });

        info!(id, target, "Location subscription acquired");
        Subscription { id, target, requests: request_tx, cancel }
    }

    async fn feed_task<F>(
        mut feed: F,
        mut requests: mpsc::Receiver<EventRequest>,
        cancel: CancellationToken,
        id: u64,
    ) where
        F: PositionFeed,
    {
        let mut fixes = 0u64;
        let mut errors = 0u64;
        let mut pending: Option<LocationEvent> = None;

        loop {
            // Cancellation wins over anything that is ready at the same time
            let reply = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(id, "Feed task cancelled");
                    break;
                }
                reply = requests.recv() => reply,
            };
            let Some(reply) = reply else {
                debug!(id, "Subscription dropped, shutting down");
                break;
            };

            let event = match pending.take() {
                Some(event) => event,
                None => {
                    let event = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            debug!(id, "Feed task cancelled during read");
                            break;
                        }
                        event = feed.next_event() => event,
                    };
                    let Some(event) = event else {
                        info!(id, "Position feed ended");
                        break;
                    };

                    match &event {
                        LocationEvent::Fix(position) => {
                            fixes += 1;
                            trace!(id, "Fix {}: {}", fixes, position);
                        }
                        LocationEvent::Error(message) => {
                            errors += 1;
                            debug!(id, "Location error {}: {}", errors, message);
                        }
                    }
                    event
                }
            };

            if let Err(event) = reply.send(event) {
                trace!(id, "Request abandoned, holding event for the next one");
                pending = Some(event);
            }
        }

        debug!(id, fixes, errors, "Feed task ended");
    }
}
