//! Hunt state machine
//!
//! [`HuntController`] owns the course and the single [`SessionState`] record. It is
//! synchronous and knows nothing about where positions come from; [`HuntSession`]
//! feeds it events and keeps the location subscription in step with
//! [`HuntController::watch_target`].
//!
//! [`HuntSession`]: crate::session::HuntSession

use tracing::{debug, info, trace, warn};

use crate::HuntError;
use crate::error::location_error_text;
use crate::types::{Checkpoint, Course, HuntStatus, Position, Progress, SessionState, ZoneCheck};

/// Drives progression through a [`Course`]
#[derive(Debug, Clone)]
pub struct HuntController {
    course: Course,
    state: SessionState,
}

impl HuntController {
    /// Create a controller in the `NotStarted` state
    pub fn new(course: Course) -> Self {
        Self { course, state: SessionState::default() }
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The checkpoint the player is heading for, or the last one reached once finished.
    pub fn current_checkpoint(&self) -> Option<&Checkpoint> {
        match self.state.status {
            HuntStatus::NotStarted => None,
            HuntStatus::InProgress | HuntStatus::Finished => {
                self.course.get(self.state.current_index)
            }
        }
    }

    /// Index the location subscription should be keyed on.
    ///
    /// `Some` exactly while the hunt is in progress. A change of value means the
    /// current subscription must be released and, if still `Some`, re-acquired.
    pub fn watch_target(&self) -> Option<usize> {
        self.state.is_in_progress().then_some(self.state.current_index)
    }

    /// Begin the hunt at the first checkpoint. Returns false if already started.
    pub fn start(&mut self) -> bool {
        if self.state.status != HuntStatus::NotStarted {
            debug!(status = ?self.state.status, "start ignored");
            return false;
        }
        self.state.status = HuntStatus::InProgress;
        self.state.current_index = 0;
        info!(checkpoints = self.course.len(), "Hunt started");
        true
    }

    /// Apply a position fix.
    ///
    /// Updates the zone flag against the current checkpoint and clears any
    /// location error. Never touches the index or the status. Returns `None` when
    /// the fix was ignored.
    pub fn on_position_update(&mut self, lat: f64, lng: f64) -> Option<ZoneCheck> {
        if !self.state.is_in_progress() {
            trace!("fix ignored, hunt not in progress");
            return None;
        }

        let position = Position::new(lat, lng);
        if !position.is_finite() {
            warn!(lat, lng, "Ignoring non-finite position fix");
            return None;
        }

        let checkpoint = self.course.get(self.state.current_index)?;
        let check = checkpoint.check(&position);

        trace!(
            "Fix {} is {:.1}m from '{}' (radius {}m)",
            position, check.distance_m, checkpoint.name, checkpoint.radius_m
        );
        if check.in_zone != self.state.in_zone {
            debug!(
                checkpoint = %checkpoint.name,
                distance_m = check.distance_m,
                in_zone = check.in_zone,
                "Zone membership changed"
            );
        }

        self.state.in_zone = check.in_zone;
        self.state.last_error = None;
        self.state.last_position = Some(position);
        self.state.last_distance_m = Some(check.distance_m);

        Some(check)
    }

    /// Record a location failure as a user-facing message.
    ///
    /// Leaves the zone flag and the index alone.
    pub fn on_position_error(&mut self, message: &str) {
        if !self.state.is_in_progress() {
            trace!("location error ignored, hunt not in progress");
            return;
        }
        warn!("Location unavailable: {}", message);
        self.state.last_error = Some(location_error_text(message));
    }

    /// Record a failure to subscribe to positions.
    ///
    /// Uses the error's own user-facing text, so only genuine location failures
    /// read as a location error.
    pub fn on_subscribe_error(&mut self, error: &HuntError) {
        if !self.state.is_in_progress() {
            trace!("subscribe error ignored, hunt not in progress");
            return;
        }
        warn!("Could not subscribe to positions: {}", error);
        self.state.last_error = Some(error.user_message());
    }

    /// The player pressed "arrived".
    ///
    /// Only effective while in progress and inside the current zone.
    pub fn advance(&mut self) -> Progress {
        if !self.state.is_in_progress() || !self.state.in_zone {
            debug!(
                status = ?self.state.status,
                in_zone = self.state.in_zone,
                "advance ignored"
            );
            return Progress::Ignored;
        }

        if self.state.current_index >= self.course.last_index() {
            self.state.status = HuntStatus::Finished;
            info!("Hunt finished at checkpoint {}", self.state.current_index + 1);
            return Progress::Finished;
        }

        self.state.current_index += 1;
        self.state.in_zone = false;
        self.state.last_distance_m = None;
        info!(
            "Checkpoint {}/{} unlocked",
            self.state.current_index + 1,
            self.course.len()
        );
        Progress::Next(self.state.current_index)
    }

    /// Back to the first checkpoint, in progress, outside any zone.
    ///
    /// The last position and error stay until the next fix or failure replaces them.
    pub fn restart(&mut self) {
        self.state.status = HuntStatus::InProgress;
        self.state.current_index = 0;
        self.state.in_zone = false;
        self.state.last_distance_m = None;
        info!("Hunt restarted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{north_of, three_checkpoint_course};

    fn started() -> HuntController {
        let mut controller = HuntController::new(three_checkpoint_course());
        assert!(controller.start());
        controller
    }

    fn step_into_zone(controller: &mut HuntController) {
        let target = controller.current_checkpoint().unwrap().position();
        let check = controller.on_position_update(target.lat, target.lng).unwrap();
        assert!(check.in_zone);
    }

    #[test]
    fn start_moves_to_first_checkpoint() {
        let mut controller = HuntController::new(three_checkpoint_course());
        assert_eq!(controller.watch_target(), None);
        assert!(controller.current_checkpoint().is_none());

        assert!(controller.start());
        assert_eq!(controller.state().status, HuntStatus::InProgress);
        assert_eq!(controller.state().current_index, 0);
        assert_eq!(controller.watch_target(), Some(0));

        // Second start is a no-op
        assert!(!controller.start());
    }

    #[test]
    fn fixes_before_start_are_ignored() {
        let mut controller = HuntController::new(three_checkpoint_course());
        assert!(controller.on_position_update(43.70313, 7.26608).is_none());
        controller.on_position_error("denied");
        assert_eq!(controller.state(), &SessionState::default());
    }

    #[test]
    fn three_checkpoint_scenario() {
        let mut controller = started();

        step_into_zone(&mut controller);
        assert!(controller.state().in_zone);

        assert_eq!(controller.advance(), Progress::Next(1));
        assert_eq!(controller.state().current_index, 1);
        assert!(!controller.state().in_zone);

        let far = north_of(&controller.current_checkpoint().unwrap().position(), 5_000.0);
        let check = controller.on_position_update(far.lat, far.lng).unwrap();
        assert!(!check.in_zone);
        assert!(!controller.state().in_zone);

        assert_eq!(controller.advance(), Progress::Ignored);
        assert_eq!(controller.state().current_index, 1);
    }

    #[test]
    fn advance_requires_zone() {
        let mut controller = started();
        assert_eq!(controller.advance(), Progress::Ignored);
        assert_eq!(controller.state().current_index, 0);
    }

    #[test]
    fn advancing_past_last_checkpoint_finishes() {
        let mut controller = started();
        for expected in 1..3 {
            step_into_zone(&mut controller);
            assert_eq!(controller.advance(), Progress::Next(expected));
        }
        step_into_zone(&mut controller);
        assert_eq!(controller.advance(), Progress::Finished);

        assert_eq!(controller.state().status, HuntStatus::Finished);
        assert_eq!(controller.state().current_index, 2);
        assert_eq!(controller.watch_target(), None);

        // Finished hunts ignore further input
        assert_eq!(controller.advance(), Progress::Ignored);
        assert!(controller.on_position_update(0.0, 0.0).is_none());
    }

    #[test]
    fn restart_after_finish() {
        let mut controller = started();
        for _ in 0..3 {
            step_into_zone(&mut controller);
            controller.advance();
        }
        assert!(controller.state().is_finished());

        controller.restart();
        assert_eq!(controller.state().status, HuntStatus::InProgress);
        assert_eq!(controller.state().current_index, 0);
        assert!(!controller.state().in_zone);
        assert_eq!(controller.watch_target(), Some(0));
    }

    #[test]
    fn boundary_distance_counts_as_inside() {
        let center = Position::new(43.70313, 7.26608);
        let edge = north_of(&center, 50.0);
        let radius = center.distance_to(&edge);

        let course = Course::new(vec![Checkpoint::new("Edge", center.lat, center.lng, radius, "")])
            .unwrap();
        let mut controller = HuntController::new(course);
        controller.start();

        let check = controller.on_position_update(edge.lat, edge.lng).unwrap();
        assert_eq!(check.distance_m, radius);
        assert!(check.in_zone);
    }

    #[test]
    fn errors_do_not_touch_progress() {
        let mut controller = started();
        step_into_zone(&mut controller);

        controller.on_position_error("User denied Geolocation");
        let state = controller.state();
        assert!(state.in_zone);
        assert_eq!(state.current_index, 0);
        assert_eq!(state.last_error.as_deref(), Some("Location error: User denied Geolocation"));

        // The next fix clears the banner
        let target = controller.current_checkpoint().unwrap().position();
        controller.on_position_update(target.lat, target.lng);
        assert!(controller.state().last_error.is_none());
    }

    #[test]
    fn blank_error_uses_fallback_text() {
        let mut controller = started();
        controller.on_position_error("");
        let banner = controller.state().last_error.clone().unwrap();
        assert!(banner.contains(crate::LOCATION_FALLBACK_MESSAGE));
    }

    #[test]
    fn subscribe_errors_keep_their_own_wording() {
        let mut controller = started();

        controller.on_subscribe_error(&HuntError::config("course has no checkpoints"));
        assert_eq!(
            controller.state().last_error.as_deref(),
            Some("Invalid hunt configuration: course has no checkpoints")
        );

        controller.on_subscribe_error(&HuntError::location_unavailable("GPS is off"));
        assert_eq!(controller.state().last_error.as_deref(), Some("Location error: GPS is off"));
    }

    #[test]
    fn non_finite_fix_is_ignored() {
        let mut controller = started();
        assert!(controller.on_position_update(f64::NAN, 7.0).is_none());
        assert!(controller.state().last_position.is_none());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Start,
            Fix(f64, f64),
            FixAtTarget,
            Error,
            Advance,
            Restart,
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                Just(Op::Start),
                (43.69f64..43.71, 7.26f64..7.29).prop_map(|(lat, lng)| Op::Fix(lat, lng)),
                Just(Op::FixAtTarget),
                Just(Op::Error),
                Just(Op::Advance),
                Just(Op::Restart),
            ]
        }

        proptest! {
            #[test]
            fn invariants_hold_for_any_sequence(ops in prop::collection::vec(op(), 0..60)) {
                let mut controller = HuntController::new(three_checkpoint_course());
                let len = controller.course().len();

                for op in ops {
                    let before = controller.state().clone();
                    match op {
                        Op::Start => { controller.start(); }
                        Op::Fix(lat, lng) => {
                            controller.on_position_update(lat, lng);
                            prop_assert_eq!(controller.state().status, before.status);
                            prop_assert_eq!(controller.state().current_index, before.current_index);
                        }
                        Op::FixAtTarget => {
                            if let Some(target) = controller.current_checkpoint().map(|c| c.position()) {
                                controller.on_position_update(target.lat, target.lng);
                            }
                            prop_assert_eq!(controller.state().status, before.status);
                            prop_assert_eq!(controller.state().current_index, before.current_index);
                        }
                        Op::Error => {
                            controller.on_position_error("signal lost");
                            prop_assert_eq!(controller.state().in_zone, before.in_zone);
                            prop_assert_eq!(controller.state().current_index, before.current_index);
                        }
                        Op::Advance => {
                            let progress = controller.advance();
                            if !(before.in_zone && before.is_in_progress()) {
                                prop_assert_eq!(progress, Progress::Ignored);
                                prop_assert_eq!(controller.state(), &before);
                            }
                        }
                        Op::Restart => {
                            controller.restart();
                            prop_assert_eq!(controller.state().current_index, 0);
                            prop_assert!(!controller.state().in_zone);
                        }
                    }

                    if controller.state().is_in_progress() {
                        prop_assert!(controller.state().current_index < len);
                    }
                }
            }
        }
    }
}
