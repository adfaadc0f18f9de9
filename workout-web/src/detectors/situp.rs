//! Sit-up detection with an adaptive extremum
//!
//! Camera angles make absolute elbow thresholds unreliable for sit-ups, so
//! the machine follows the running extremum instead: the peak while up,
//! the trough while down. A transition fires once the smoothed angle has
//! moved `min_change` degrees back from that extremum.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::rep::{Attempt, AttemptPolicy, RepEvent, RepLog, RepMetrics};
use super::{LiveReading, Phase, RepDetector};
use crate::activity::Activity;
use crate::config::{check_non_negative, check_window};
use crate::error::Result;
use crate::pose::Frame;
use crate::signal::{at_least, SmoothingBuffer};

/// Sit-up thresholds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitupConfig {
    pub smoothing_window: usize,
    /// Swing away from the last extremum that flips the phase (degrees)
    pub min_change: f64,
    /// Minimum rep duration (seconds)
    pub min_duration: f64,
    /// Minimum angle range covered for a correct rep (degrees)
    pub min_range: f64,
    pub policy: AttemptPolicy,
}

impl Default for SitupConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 5,
            min_change: 15.0,
            min_duration: 0.3,
            min_range: 30.0,
            policy: AttemptPolicy::RecordAll,
        }
    }
}

impl SitupConfig {
    pub fn validate(&self) -> Result<()> {
        check_window("situp.smoothing_window", self.smoothing_window)?;
        check_non_negative("situp.min_change", self.min_change)?;
        check_non_negative("situp.min_duration", self.min_duration)?;
        check_non_negative("situp.min_range", self.min_range)
    }
}

/// Mutable sit-up state, written only by [`step`]
#[derive(Clone, Debug)]
pub struct SitupState {
    phase: Phase,
    angle: SmoothingBuffer,
    current_angle: f64,
    /// Peak while up, trough while down; `None` before the first frame
    extremum: Option<f64>,
    dip_start: f64,
    /// Angle range seen since the previous rep ended
    min_angle: f64,
    max_angle: f64,
}

impl SitupState {
    pub fn new(config: &SitupConfig) -> Self {
        Self {
            phase: Phase::Up,
            angle: SmoothingBuffer::new(config.smoothing_window),
            current_angle: 0.0,
            extremum: None,
            dip_start: 0.0,
            min_angle: 0.0,
            max_angle: 0.0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn extremum(&self) -> Option<f64> {
        self.extremum
    }

    pub fn current_angle(&self) -> f64 {
        self.current_angle
    }

    pub fn dip_time(&self, now: f64) -> f64 {
        match self.phase {
            Phase::Down => (now - self.dip_start).max(0.0),
            _ => 0.0,
        }
    }

    fn restart_range(&mut self, angle: f64) {
        self.extremum = Some(angle);
        self.min_angle = angle;
        self.max_angle = angle;
    }
}

/// Advance the sit-up machine by one raw mean elbow angle
pub fn step(
    config: &SitupConfig,
    state: &mut SitupState,
    elbow_angle: f64,
    timestamp: f64,
) -> Option<Attempt> {
    let angle = state.angle.add(elbow_angle);
    state.current_angle = angle;

    let Some(extremum) = state.extremum else {
        state.restart_range(angle);
        return None;
    };
    state.min_angle = state.min_angle.min(angle);
    state.max_angle = state.max_angle.max(angle);

    match state.phase {
        Phase::Down => {
            if !at_least(angle - extremum, config.min_change) {
                state.extremum = Some(extremum.min(angle));
                return None;
            }

            state.phase = Phase::Up;
            let duration = timestamp - state.dip_start;
            let range = state.max_angle - state.min_angle;
            let min_angle = state.min_angle;
            state.restart_range(angle);
            debug!(angle, range, duration, "sit-up: up");

            Some(Attempt {
                start: state.dip_start,
                end: timestamp,
                metrics: RepMetrics {
                    angle: Some(min_angle),
                    range_of_motion: Some(range),
                    ..RepMetrics::default()
                },
                correct: at_least(duration, config.min_duration)
                    && at_least(range, config.min_range),
            })
        }
        _ => {
            if at_least(extremum - angle, config.min_change) {
                state.phase = Phase::Down;
                state.dip_start = timestamp;
                state.extremum = Some(angle);
                debug!(angle, from = extremum, "sit-up: down");
            } else {
                state.extremum = Some(extremum.max(angle));
            }
            None
        }
    }
}

/// Sit-up counter
#[derive(Clone, Debug)]
pub struct SitupDetector {
    config: SitupConfig,
    state: SitupState,
    log: RepLog,
}

impl SitupDetector {
    pub fn new(config: SitupConfig) -> Self {
        let state = SitupState::new(&config);
        Self {
            config,
            state,
            log: RepLog::new(),
        }
    }

    pub fn config(&self) -> &SitupConfig {
        &self.config
    }

    pub fn state(&self) -> &SitupState {
        &self.state
    }
}

impl Default for SitupDetector {
    fn default() -> Self {
        Self::new(SitupConfig::default())
    }
}

impl RepDetector for SitupDetector {
    fn activity(&self) -> Activity {
        Activity::SitUp
    }

    fn process(&mut self, frame: &Frame) -> &[RepEvent] {
        let elbow_angle = frame.mean_elbow_angle();
        if !elbow_angle.is_finite() {
            trace!(t = frame.timestamp(), "sit-up: non-finite frame skipped");
            return self.log.events();
        }
        if let Some(attempt) = step(&self.config, &mut self.state, elbow_angle, frame.timestamp()) {
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
            extremum: self.state.extremum,
            elapsed: self.state.dip_time(now),
        }
    }

    fn reset(&mut self) {
        self.state = SitupState::new(&self.config);
        self.log.clear();
    }
}
