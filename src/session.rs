//! Hunt session: a controller wired to a location provider

use futures::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info};

use crate::config::HuntConfig;
use crate::controller::HuntController;
use crate::driver::{Driver, Subscription};
use crate::provider::LocationProvider;
use crate::types::{Course, LocationEvent, Progress, SessionState, WatchOptions};
use crate::view::Screen;
use crate::Result;

/// Runs a hunt against a live location provider
///
/// Keeps exactly one subscription while the hunt is in progress, keyed on the
/// current checkpoint: it is acquired on start, replaced whenever the index
/// changes, and released when the hunt finishes or the session is dropped.
/// Every state change is published to observers of [`HuntSession::watch_state`].
///
/// Methods that may acquire a subscription spawn a task and must be called from
/// within a tokio runtime.
pub struct HuntSession<P: LocationProvider> {
    controller: HuntController,
    provider: P,
    options: WatchOptions,
    subscription: Option<Subscription>,
    subscriptions_acquired: u64,
    state_tx: watch::Sender<SessionState>,
}

impl<P: LocationProvider> HuntSession<P> {
    /// Create a session in the `NotStarted` state
    pub fn new(course: Course, provider: P, options: WatchOptions) -> Self {
        let controller = HuntController::new(course);
        let (state_tx, _) = watch::channel(controller.state().clone());
        Self {
            controller,
            provider,
            options,
            subscription: None,
            subscriptions_acquired: 0,
            state_tx,
        }
    }

    /// Create a session from a loaded configuration
    pub fn from_config(config: &HuntConfig, provider: P) -> Result<Self> {
        Ok(Self::new(config.course()?, provider, config.watch))
    }

    pub fn state(&self) -> &SessionState {
        self.controller.state()
    }

    pub fn controller(&self) -> &HuntController {
        &self.controller
    }

    pub fn course(&self) -> &Course {
        self.controller.course()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Screen to show for the current state
    pub fn screen(&self) -> Screen {
        Screen::from_state(self.controller.course(), self.controller.state())
    }

    /// Whether a location subscription is currently held
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Id of the held subscription, if any
    pub fn subscription_id(&self) -> Option<u64> {
        self.subscription.as_ref().map(Subscription::id)
    }

    /// Receiver that always holds the latest state
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// State snapshots as a stream, starting with the current one
    pub fn state_updates(&self) -> impl Stream<Item = SessionState> + 'static {
        WatchStream::new(self.state_tx.subscribe())
    }

    /// Start the hunt and subscribe to positions.
    pub fn start(&mut self) -> bool {
        let started = self.controller.start();
        self.sync();
        started
    }

    /// The player pressed "arrived".
    pub fn advance(&mut self) -> Progress {
        let progress = self.controller.advance();
        self.sync();
        progress
    }

    /// Restart from the first checkpoint.
    pub fn restart(&mut self) {
        self.controller.restart();
        self.sync();
    }

    /// Wait for the next location callback and apply it.
    ///
    /// Returns the event that was applied, or `None` when there is no
    /// subscription or its feed has ended.
    pub async fn next_event(&mut self) -> Option<LocationEvent> {
        let subscription = self.subscription.as_mut()?;
        match subscription.recv().await {
            Some(event) => {
                self.apply(&event);
                Some(event)
            }
            None => {
                info!("Location feed ended");
                self.subscription = None;
                None
            }
        }
    }

    /// Release the subscription without changing the hunt state.
    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.release();
        }
    }

    fn apply(&mut self, event: &LocationEvent) {
        match event {
            LocationEvent::Fix(position) => {
                self.controller.on_position_update(position.lat, position.lng);
            }
            LocationEvent::Error(message) => self.controller.on_position_error(message),
        }
        self.publish();
    }

    /// Bring the subscription in line with the controller, then publish.
    fn sync(&mut self) {
        let target = self.controller.watch_target();
        let held = self.subscription.as_ref().map(Subscription::target);

        if target != held {
            self.stop();
            if let Some(index) = target {
                self.acquire(index);
            }
        }
        self.publish();
    }

    fn acquire(&mut self, index: usize) {
        match self.provider.watch(&self.options) {
            Ok(feed) => {
                self.subscriptions_acquired += 1;
                self.subscription = Some(Driver::spawn(feed, self.subscriptions_acquired, index));
            }
            Err(error) => self.controller.on_subscribe_error(&error),
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.controller.state().clone());
    }
}

impl<P: LocationProvider> Drop for HuntSession<P> {
    fn drop(&mut self) {
        debug!("Dropping hunt session");
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PositionFeed;
    use crate::providers::{ManualHandle, ManualProvider};
    use crate::test_utils::{north_of, three_checkpoint_course};
    use crate::HuntError;
    use crate::types::HuntStatus;

    fn session() -> (HuntSession<ManualProvider>, ManualHandle) {
        let (provider, handle) = ManualProvider::new();
        (HuntSession::new(three_checkpoint_course(), provider, WatchOptions::default()), handle)
    }

    fn target(session: &HuntSession<ManualProvider>) -> crate::types::Position {
        session.controller().current_checkpoint().unwrap().position()
    }

    #[tokio::test]
    async fn subscribes_only_while_in_progress() {
        let (mut session, handle) = session();
        assert!(!session.is_subscribed());
        assert!(session.next_event().await.is_none());

        session.start();
        assert!(session.is_subscribed());
        assert_eq!(handle.watch_count(), 1);
        assert_eq!(handle.last_options(), Some(WatchOptions::default()));
    }

    #[tokio::test]
    async fn index_change_replaces_subscription() {
        let (mut session, handle) = session();
        session.start();
        let first = session.subscription_id();

        let here = target(&session);
        handle.push_fix(here.lat, here.lng);
        session.next_event().await.unwrap();
        assert!(session.state().in_zone);

        // Restarting on the first checkpoint keeps the same subscription
        session.restart();
        assert_eq!(session.subscription_id(), first);
        assert_eq!(session.advance(), Progress::Ignored);
        assert_eq!(session.subscription_id(), first);

        handle.push_fix(here.lat, here.lng);
        session.next_event().await.unwrap();
        assert_eq!(session.advance(), Progress::Next(1));
        assert_eq!(session.state().current_index, 1);
        assert_ne!(session.subscription_id(), first);
        assert_eq!(handle.watch_count(), 2);
    }

    #[tokio::test]
    async fn finishing_releases_subscription() {
        let (mut session, handle) = session();
        session.start();

        for _ in 0..3 {
            let here = target(&session);
            handle.push_fix(here.lat, here.lng);
            session.next_event().await.unwrap();
            session.advance();
        }

        assert_eq!(session.state().status, HuntStatus::Finished);
        assert!(!session.is_subscribed());

        session.restart();
        assert!(session.is_subscribed());
        assert_eq!(session.state().current_index, 0);
        assert_eq!(handle.watch_count(), 4);
    }

    #[tokio::test]
    async fn errors_become_banner_text() {
        let (mut session, handle) = session();
        session.start();
        handle.push_error("User denied Geolocation");
        session.next_event().await.unwrap();
        assert_eq!(
            session.state().last_error.as_deref(),
            Some("Location error: User denied Geolocation")
        );
        assert!(session.is_subscribed());
    }

    #[tokio::test]
    async fn state_is_published_to_watchers() {
        let (mut session, handle) = session();
        let mut watcher = session.watch_state();
        assert_eq!(watcher.borrow().status, HuntStatus::NotStarted);

        session.start();
        assert!(watcher.has_changed().unwrap());
        assert_eq!(watcher.borrow_and_update().status, HuntStatus::InProgress);

        let far = north_of(&target(&session), 2_000.0);
        handle.push_fix(far.lat, far.lng);
        session.next_event().await.unwrap();
        assert_eq!(watcher.borrow_and_update().last_position, Some(far));
    }

    struct FailingProvider(fn() -> HuntError);

    struct NeverFeed;

    #[async_trait::async_trait]
    impl PositionFeed for NeverFeed {
        async fn next_event(&mut self) -> Option<LocationEvent> {
            None
        }
    }

    impl LocationProvider for FailingProvider {
        type Feed = NeverFeed;

        fn watch(&mut self, _options: &WatchOptions) -> Result<NeverFeed> {
            Err((self.0)())
        }
    }

    #[tokio::test]
    async fn subscribe_failure_is_not_fatal() {
        let provider =
            FailingProvider(|| HuntError::location_unavailable("Location services are disabled"));
        let mut session =
            HuntSession::new(three_checkpoint_course(), provider, WatchOptions::default());
        assert!(session.start());
        assert_eq!(session.state().status, HuntStatus::InProgress);
        assert!(!session.is_subscribed());
        assert_eq!(
            session.state().last_error.as_deref(),
            Some("Location error: Location services are disabled")
        );
    }

    #[tokio::test]
    async fn non_location_subscribe_failure_reads_as_itself() {
        let provider = FailingProvider(|| HuntError::config("replay speed out of range"));
        let mut session =
            HuntSession::new(three_checkpoint_course(), provider, WatchOptions::default());
        session.start();
        assert_eq!(
            session.state().last_error.as_deref(),
            Some("Invalid hunt configuration: replay speed out of range")
        );
    }
}
