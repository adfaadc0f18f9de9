//! Detectors module - one finite-state machine per exercise
//!
//! Each detector owns its configuration, an explicit state value and a
//! repetition log. The transition itself is a free `step` function over
//! `(&config, &mut state, sample, timestamp)` so single transitions can be
//! tested without a frame stream.

mod broad_jump;
mod pullup;
mod pushup;
mod rep;
mod shuttle_run;
mod sit_reach;
mod situp;
mod vertical_jump;

use serde::{Deserialize, Serialize};

use crate::activity::Activity;
use crate::pose::Frame;

pub use broad_jump::{BroadJumpConfig, BroadJumpDetector, BroadJumpState};
pub use pullup::{PullupConfig, PullupDetector, PullupState};
pub use pushup::{PushupConfig, PushupDetector, PushupState};
pub use rep::{Attempt, AttemptPolicy, RepEvent, RepLog, RepMetrics, RepStatus, SessionSummary};
pub use shuttle_run::{ShuttleRunConfig, ShuttleRunDetector, ShuttleRunState};
pub use sit_reach::{SitAndReachConfig, SitAndReachDetector, SitAndReachState};
pub use situp::{SitupConfig, SitupDetector, SitupState};
pub use vertical_jump::{VerticalJumpConfig, VerticalJumpDetector, VerticalJumpState};

/// Detector state names shown by the live overlay
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Up,
    Down,
    Waiting,
    Grounded,
    Airborne,
    Forward,
    Backward,
    Tracking,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Up => "up",
            Phase::Down => "down",
            Phase::Waiting => "waiting",
            Phase::Grounded => "grounded",
            Phase::Airborne => "airborne",
            Phase::Forward => "forward",
            Phase::Backward => "backward",
            Phase::Tracking => "tracking",
        }
    }
}

/// In-progress values for live feedback
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveReading {
    /// Latest smoothed signal (degrees, normalized position or reach)
    pub signal: f64,
    /// Extremum tracked for the movement in progress, if any
    pub extremum: Option<f64>,
    /// Seconds spent in the current dip / flight, zero when idle
    pub elapsed: f64,
}

/// Common contract of all exercise detectors
///
/// `process` must be called at most once per frame, with non-decreasing
/// timestamps. Noisy or out-of-range input never errors; it simply causes
/// no transition.
pub trait RepDetector {
    fn activity(&self) -> Activity;

    /// Feed one frame, returning the full repetition log so far
    fn process(&mut self, frame: &Frame) -> &[RepEvent];

    fn reps(&self) -> &[RepEvent];

    fn phase(&self) -> Phase;

    /// Live values for the overlay, with `now` in the frame timebase
    fn live(&self, now: f64) -> LiveReading;

    /// Discard state and log, keeping configuration
    fn reset(&mut self);

    /// Headline metric for the session (best jump, furthest reach...)
    fn best(&self) -> Option<f64> {
        None
    }

    fn correct_count(&self) -> usize {
        self.reps().iter().filter(|r| r.correct).count()
    }

    fn incorrect_count(&self) -> usize {
        self.reps().iter().filter(|r| !r.correct).count()
    }

    fn total_count(&self) -> usize {
        self.reps().len()
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary::new(self.activity(), self.reps(), self.best())
    }
}
