//! Push-up detection from the mean elbow angle
//!
//! Separate down/up angles give hysteresis, and a minimum interval between
//! reps debounces double counts on the way up. Every rep that passes the
//! debounce is logged; depth and dip duration only decide `correct`.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::rep::{Attempt, AttemptPolicy, RepEvent, RepLog, RepMetrics};
use super::{LiveReading, Phase, RepDetector};
use crate::activity::Activity;
use crate::config::{check_finite, check_non_negative, check_window};
use crate::error::{Result, WorkoutError};
use crate::pose::Frame;
use crate::signal::{at_least, at_most, SmoothingBuffer};

/// Push-up thresholds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushupConfig {
    /// Frames in the elbow angle moving average
    pub smoothing_window: usize,
    /// Smoothed angle at or below which the body is down (degrees)
    pub down_angle: f64,
    /// Smoothed angle at or above which the body is back up (degrees)
    pub up_angle: f64,
    /// Minimum time spent down for a correct rep (seconds)
    pub min_dip_duration: f64,
    /// Up-transitions closer than this to the previous rep are ignored (seconds)
    pub min_rep_interval: f64,
    pub policy: AttemptPolicy,
}

impl Default for PushupConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 5,
            down_angle: 90.0,
            up_angle: 110.0,
            min_dip_duration: 0.2,
            min_rep_interval: 0.3,
            policy: AttemptPolicy::RecordAll,
        }
    }
}

impl PushupConfig {
    pub fn validate(&self) -> Result<()> {
        check_window("pushup.smoothing_window", self.smoothing_window)?;
        check_finite("pushup.down_angle", self.down_angle)?;
        check_finite("pushup.up_angle", self.up_angle)?;
        check_non_negative("pushup.min_dip_duration", self.min_dip_duration)?;
        check_non_negative("pushup.min_rep_interval", self.min_rep_interval)?;
        if self.up_angle <= self.down_angle {
            return Err(WorkoutError::invalid_config(format!(
                "pushup.up_angle ({}) must be greater than pushup.down_angle ({})",
                self.up_angle, self.down_angle
            )));
        }
        Ok(())
    }
}

/// Mutable push-up state, written only by [`step`]
#[derive(Clone, Debug)]
pub struct PushupState {
    phase: Phase,
    angle: SmoothingBuffer,
    current_angle: f64,
    dip_start: f64,
    /// Deepest smoothed angle of the dip in progress
    min_angle: f64,
    last_rep: Option<f64>,
}

impl PushupState {
    pub fn new(config: &PushupConfig) -> Self {
        Self {
            phase: Phase::Up,
            angle: SmoothingBuffer::new(config.smoothing_window),
            current_angle: 180.0,
            dip_start: 0.0,
            min_angle: 180.0,
            last_rep: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Latest smoothed elbow angle
    pub fn current_angle(&self) -> f64 {
        self.current_angle
    }

    /// Deepest angle of the dip in progress
    pub fn min_angle(&self) -> Option<f64> {
        (self.phase == Phase::Down).then_some(self.min_angle)
    }

    pub fn dip_time(&self, now: f64) -> f64 {
        match self.phase {
            Phase::Down => (now - self.dip_start).max(0.0),
            _ => 0.0,
        }
    }
}

/// Advance the push-up machine by one raw mean elbow angle
pub fn step(
    config: &PushupConfig,
    state: &mut PushupState,
    elbow_angle: f64,
    timestamp: f64,
) -> Option<Attempt> {
    let angle = state.angle.add(elbow_angle);
    state.current_angle = angle;

    match state.phase {
        Phase::Down => {
            state.min_angle = state.min_angle.min(angle);
            if !at_least(angle, config.up_angle) {
                return None;
            }

            state.phase = Phase::Up;
            let min_angle = std::mem::replace(&mut state.min_angle, 180.0);
            let dip_duration = timestamp - state.dip_start;
            debug!(angle, dip_duration, "push-up: up");

            if let Some(last) = state.last_rep {
                if !at_least(timestamp - last, config.min_rep_interval) {
                    trace!(since_last = timestamp - last, "push-up: debounced");
                    return None;
                }
            }
            state.last_rep = Some(timestamp);

            let good_depth = at_most(min_angle, config.down_angle);
            let good_duration = at_least(dip_duration, config.min_dip_duration);
            Some(Attempt {
                start: state.dip_start,
                end: timestamp,
                metrics: RepMetrics {
                    angle: Some(min_angle),
                    ..RepMetrics::default()
                },
                correct: good_depth && good_duration,
            })
        }
        _ => {
            if at_most(angle, config.down_angle) {
                state.phase = Phase::Down;
                state.dip_start = timestamp;
                state.min_angle = angle;
                debug!(angle, "push-up: down");
            }
            None
        }
    }
}

/// Push-up counter
#[derive(Clone, Debug)]
pub struct PushupDetector {
    config: PushupConfig,
    state: PushupState,
    log: RepLog,
}

impl PushupDetector {
    pub fn new(config: PushupConfig) -> Self {
        let state = PushupState::new(&config);
        Self {
            config,
            state,
            log: RepLog::new(),
        }
    }

    pub fn config(&self) -> &PushupConfig {
        &self.config
    }

    pub fn state(&self) -> &PushupState {
        &self.state
    }
}

impl Default for PushupDetector {
    fn default() -> Self {
        Self::new(PushupConfig::default())
    }
}

impl RepDetector for PushupDetector {
    fn activity(&self) -> Activity {
        Activity::PushUp
    }

    fn process(&mut self, frame: &Frame) -> &[RepEvent] {
        let elbow_angle = frame.mean_elbow_angle();
        if !elbow_angle.is_finite() {
            trace!(t = frame.timestamp(), "push-up: non-finite frame skipped");
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
            extremum: self.state.min_angle(),
            elapsed: self.state.dip_time(now),
        }
    }

    fn reset(&mut self) {
        self.state = PushupState::new(&self.config);
        self.log.clear();
    }
}
