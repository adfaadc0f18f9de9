//! Pull-up detection from head height and elbow extension
//!
//! The nose position on the first frame is the hanging baseline. A rep
//! starts once the head rises above it and ends when the arms are
//! extended again with the head back near the baseline.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::rep::{Attempt, AttemptPolicy, RepEvent, RepLog, RepMetrics};
use super::{LiveReading, Phase, RepDetector};
use crate::activity::Activity;
use crate::config::{check_finite, check_non_negative, check_window};
use crate::error::Result;
use crate::pose::{Frame, NOSE};
use crate::signal::{above, at_least, at_most, SmoothingBuffer};

/// Pull-up thresholds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullupConfig {
    /// Frames in the elbow angle moving average
    pub smoothing_window: usize,
    /// Head rise above baseline that starts a rep, and the band the head
    /// must return to for it to end (normalized frame height)
    pub start_rise: f64,
    /// Head rise needed for the chin to clear the bar (normalized)
    pub min_head_lift: f64,
    /// Elbow angle counted as full extension at the bottom (degrees)
    pub extension_angle: f64,
    /// Minimum rep duration (seconds)
    pub min_duration: f64,
    pub policy: AttemptPolicy,
}

impl Default for PullupConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 3,
            start_rise: 0.01,
            min_head_lift: 0.05,
            extension_angle: 160.0,
            min_duration: 0.1,
            policy: AttemptPolicy::RecordAll,
        }
    }
}

impl PullupConfig {
    pub fn validate(&self) -> Result<()> {
        check_window("pullup.smoothing_window", self.smoothing_window)?;
        check_non_negative("pullup.start_rise", self.start_rise)?;
        check_non_negative("pullup.min_head_lift", self.min_head_lift)?;
        check_finite("pullup.extension_angle", self.extension_angle)?;
        check_non_negative("pullup.min_duration", self.min_duration)
    }
}

/// Mutable pull-up state, written only by [`step`]
#[derive(Clone, Debug)]
pub struct PullupState {
    phase: Phase,
    angle: SmoothingBuffer,
    current_angle: f64,
    /// Nose height on the first frame
    baseline: Option<f64>,
    start: f64,
    /// Highest head position (smallest y) of the rep in progress
    min_head_y: f64,
    /// Widest elbow angle of the rep in progress
    max_angle: f64,
}

impl PullupState {
    pub fn new(config: &PullupConfig) -> Self {
        Self {
            phase: Phase::Waiting,
            angle: SmoothingBuffer::new(config.smoothing_window),
            current_angle: 0.0,
            baseline: None,
            start: 0.0,
            min_head_y: f64::INFINITY,
            max_angle: 0.0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    pub fn current_angle(&self) -> f64 {
        self.current_angle
    }

    pub fn elapsed(&self, now: f64) -> f64 {
        match self.phase {
            Phase::Up => (now - self.start).max(0.0),
            _ => 0.0,
        }
    }
}

/// Advance the pull-up machine by one frame's raw nose height and mean
/// elbow angle
pub fn step(
    config: &PullupConfig,
    state: &mut PullupState,
    head_y: f64,
    elbow_angle: f64,
    timestamp: f64,
) -> Option<Attempt> {
    let angle = state.angle.add(elbow_angle);
    state.current_angle = angle;
    let baseline = *state.baseline.get_or_insert(head_y);
    let start_line = baseline - config.start_rise;

    match state.phase {
        Phase::Up => {
            state.min_head_y = state.min_head_y.min(head_y);
            state.max_angle = state.max_angle.max(angle);

            if !(above(angle, config.extension_angle) && at_least(head_y, start_line)) {
                return None;
            }

            state.phase = Phase::Waiting;
            let duration = timestamp - state.start;
            let head_lift = baseline - state.min_head_y;
            let max_angle = std::mem::replace(&mut state.max_angle, 0.0);
            state.min_head_y = f64::INFINITY;
            debug!(head_lift, max_angle, duration, "pull-up: back to hang");

            let chin_over_bar = at_least(head_lift, config.min_head_lift);
            let full_extension = at_least(max_angle, config.extension_angle);
            let good_duration = at_least(duration, config.min_duration);
            Some(Attempt {
                start: state.start,
                end: timestamp,
                metrics: RepMetrics {
                    angle: Some(max_angle),
                    head_lift: Some(head_lift),
                    ..RepMetrics::default()
                },
                correct: chin_over_bar && full_extension && good_duration,
            })
        }
        _ => {
            if at_most(head_y, start_line) {
                state.phase = Phase::Up;
                state.start = timestamp;
                state.min_head_y = head_y;
                state.max_angle = angle;
                debug!(head_y, baseline, "pull-up: pulling");
            }
            None
        }
    }
}

/// Pull-up counter
#[derive(Clone, Debug)]
pub struct PullupDetector {
    config: PullupConfig,
    state: PullupState,
    log: RepLog,
}

impl PullupDetector {
    pub fn new(config: PullupConfig) -> Self {
        let state = PullupState::new(&config);
        Self {
            config,
            state,
            log: RepLog::new(),
        }
    }

    pub fn config(&self) -> &PullupConfig {
        &self.config
    }

    pub fn state(&self) -> &PullupState {
        &self.state
    }
}

impl Default for PullupDetector {
    fn default() -> Self {
        Self::new(PullupConfig::default())
    }
}

impl RepDetector for PullupDetector {
    fn activity(&self) -> Activity {
        Activity::PullUp
    }

    fn process(&mut self, frame: &Frame) -> &[RepEvent] {
        let head_y = f64::from(frame.landmark(NOSE).y);
        let elbow_angle = frame.mean_elbow_angle();
        if !head_y.is_finite() || !elbow_angle.is_finite() {
            trace!(t = frame.timestamp(), "pull-up: non-finite frame skipped");
            return self.log.events();
        }
        let attempt = step(
            &self.config,
            &mut self.state,
            head_y,
            elbow_angle,
            frame.timestamp(),
        );
        if let Some(attempt) = attempt {
            self.log.submit(attempt, self.config.policy);
        }
        self.log.events()
    }

    fn reps(&self) -> &[RepEvent] {
        self.log.events()
    }

    fn phase(&self) -> Phase {
        self.state.phase
    }

    fn live(&self, now: f64) -> LiveReading {
        LiveReading {
            signal: self.state.current_angle,
            extremum: (self.state.phase == Phase::Up).then_some(self.state.max_angle),
            elapsed: self.state.elapsed(now),
        }
    }

    fn reset(&mut self) {
        self.state = PullupState::new(&self.config);
        self.log.clear();
    }
}
