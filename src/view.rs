//! Screen model for host UIs
//!
//! Presentation-neutral projection of [`SessionState`]: a host renders one of
//! three screens and never needs to inspect the state machine directly.

use serde::Serialize;
use std::fmt;

use crate::types::{Course, HuntStatus, SessionState};

/// What the player should see
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Screen {
    /// Before the hunt: ask for location access and offer "start"
    Welcome,

    /// Heading for a checkpoint
    Hunting(HuntingView),

    /// All checkpoints reached: offer "play again"
    Finished,
}

/// Contents of the in-progress screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HuntingView {
    /// 1-based step number
    pub step: usize,
    pub total: usize,
    pub name: String,
    pub clue: String,

    /// Show the "I'm here" action; otherwise the "get closer" hint
    pub can_advance: bool,

    /// "You are here" coordinates, five decimals
    pub position_label: Option<String>,
    pub distance_m: Option<f64>,
    pub error_banner: Option<String>,
}

impl Screen {
    pub fn from_state(course: &Course, state: &SessionState) -> Self {
        match state.status {
            HuntStatus::NotStarted => Screen::Welcome,
            HuntStatus::Finished => Screen::Finished,
            HuntStatus::InProgress => match course.get(state.current_index) {
                Some(checkpoint) => Screen::Hunting(HuntingView {
                    step: state.current_index + 1,
                    total: course.len(),
                    name: checkpoint.name.clone(),
                    clue: checkpoint.clue.clone(),
                    can_advance: state.in_zone,
                    position_label: state.last_position.map(|p| p.to_string()),
                    distance_m: state.last_distance_m,
                    error_banner: state.last_error.clone(),
                }),
                // Unreachable while the controller upholds its index invariant
                None => Screen::Finished,
            },
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Welcome => {
                writeln!(f, "Welcome to the treasure hunt!")?;
                writeln!(f, "Turn on location and get close to each place to unlock the next step.")?;
                write!(f, "[Start the hunt]")
            }
            Screen::Finished => {
                writeln!(f, "Congratulations! You finished the treasure hunt.")?;
                write!(f, "[Play again]")
            }
            Screen::Hunting(view) => {
                writeln!(f, "Step {}/{}: {}", view.step, view.total, view.name)?;
                if !view.clue.is_empty() {
                    writeln!(f, "{}", view.clue)?;
                }
                if view.can_advance {
                    write!(f, "[I'm here]")?;
                } else {
                    write!(f, "Get closer to the place to unlock the next step...")?;
                }
                if let Some(label) = &view.position_label {
                    write!(f, "\nYour position: {}", label)?;
                    if let Some(distance) = view.distance_m {
                        write!(f, " ({:.0} m away)", distance)?;
                    }
                }
                if let Some(banner) = &view.error_banner {
                    write!(f, "\n! {}", banner)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::HuntController;
    use crate::test_utils::three_checkpoint_course;

    #[test]
    fn screens_follow_status() {
        let mut controller = HuntController::new(three_checkpoint_course());
        let screen = |c: &HuntController| Screen::from_state(c.course(), c.state());
        assert_eq!(screen(&controller), Screen::Welcome);

        controller.start();
        let Screen::Hunting(view) = screen(&controller) else {
            panic!("expected hunting screen");
        };
        assert_eq!((view.step, view.total), (1, 3));
        assert_eq!(view.name, "Alpha");
        assert!(!view.can_advance);
        assert!(view.position_label.is_none());

        for _ in 0..3 {
            let here = controller.current_checkpoint().unwrap().position();
            controller.on_position_update(here.lat, here.lng);
            controller.advance();
        }
        assert_eq!(screen(&controller), Screen::Finished);
    }

    #[test]
    fn hunting_screen_shows_position_and_banner() {
        let mut controller = HuntController::new(three_checkpoint_course());
        controller.start();
        let here = controller.current_checkpoint().unwrap().position();
        controller.on_position_update(here.lat, here.lng);
        controller.on_position_error("timeout");

        let screen = Screen::from_state(controller.course(), controller.state());
        let text = screen.to_string();
        assert!(text.contains("Step 1/3: Alpha"));
        assert!(text.contains("[I'm here]"));
        assert!(text.contains("Your position: 48.85840, 2.29450 (0 m away)"));
        assert!(text.contains("! Location error: timeout"));
    }
}
