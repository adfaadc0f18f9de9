//! Vertical jump detection from hip height
//!
//! The first smoothed hip-midpoint height is the standing baseline.
//! Liftoff and landing use separate distances from it (hysteresis).
//! Jump height is the normalized rise converted to pixels, then metres.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::rep::{Attempt, AttemptPolicy, RepEvent, RepLog, RepMetrics};
use super::{LiveReading, Phase, RepDetector};
use crate::activity::Activity;
use crate::config::{check_non_negative, check_window};
use crate::error::Result;
use crate::pose::{Frame, LEFT_HIP, RIGHT_HIP};
use crate::signal::{at_least, at_most, SmoothingBuffer};

/// Vertical jump thresholds and calibration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerticalJumpConfig {
    pub smoothing_window: usize,
    /// Rise above baseline that counts as liftoff (normalized frame height)
    pub liftoff_rise: f64,
    /// Distance from baseline within which the jumper has landed
    pub landing_tolerance: f64,
    /// Frame height in pixels used to de-normalize the rise
    pub frame_height_px: f64,
    /// Calibration factor from pixels to metres
    pub metres_per_px: f64,
    /// Minimum jump height for a correct rep (metres)
    pub min_height: f64,
    /// Minimum flight time for a correct rep (seconds)
    pub min_air_time: f64,
    pub policy: AttemptPolicy,
}

impl Default for VerticalJumpConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 5,
            liftoff_rise: 0.02,
            landing_tolerance: 0.005,
            frame_height_px: 1080.0,
            metres_per_px: 0.0026,
            min_height: 0.05,
            min_air_time: 0.15,
            policy: AttemptPolicy::RecordAll,
        }
    }
}

impl VerticalJumpConfig {
    pub fn validate(&self) -> Result<()> {
        check_window("vertical_jump.smoothing_window", self.smoothing_window)?;
        check_non_negative("vertical_jump.liftoff_rise", self.liftoff_rise)?;
        check_non_negative("vertical_jump.landing_tolerance", self.landing_tolerance)?;
        check_non_negative("vertical_jump.frame_height_px", self.frame_height_px)?;
        check_non_negative("vertical_jump.metres_per_px", self.metres_per_px)?;
        check_non_negative("vertical_jump.min_height", self.min_height)?;
        check_non_negative("vertical_jump.min_air_time", self.min_air_time)
    }

    /// Convert a normalized rise into metres
    pub fn to_metres(&self, rise: f64) -> f64 {
        rise * self.frame_height_px * self.metres_per_px
    }
}

/// Mutable vertical jump state, written only by [`step`]
#[derive(Clone, Debug)]
pub struct VerticalJumpState {
    phase: Phase,
    hip: SmoothingBuffer,
    current_y: f64,
    baseline: Option<f64>,
    /// Highest hip position (smallest y) of the flight in progress
    peak_y: f64,
    air_start: f64,
    max_height: Option<f64>,
}

impl VerticalJumpState {
    pub fn new(config: &VerticalJumpConfig) -> Self {
        Self {
            phase: Phase::Grounded,
            hip: SmoothingBuffer::new(config.smoothing_window),
            current_y: 0.0,
            baseline: None,
            peak_y: 0.0,
            air_start: 0.0,
            max_height: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    /// Best jump height so far in metres, valid or not
    pub fn max_height(&self) -> Option<f64> {
        self.max_height
    }

    pub fn air_time(&self, now: f64) -> f64 {
        match self.phase {
            Phase::Airborne => (now - self.air_start).max(0.0),
            _ => 0.0,
        }
    }
}

/// Advance the vertical jump machine by one raw hip-midpoint height
pub fn step(
    config: &VerticalJumpConfig,
    state: &mut VerticalJumpState,
    hip_y: f64,
    timestamp: f64,
) -> Option<Attempt> {
    let y = state.hip.add(hip_y);
    state.current_y = y;
    let baseline = *state.baseline.get_or_insert(y);

    match state.phase {
        Phase::Airborne => {
            state.peak_y = state.peak_y.min(y);
            if !at_least(y, baseline - config.landing_tolerance) {
                return None;
            }

            state.phase = Phase::Grounded;
            let height = config.to_metres(baseline - state.peak_y);
            let air_time = timestamp - state.air_start;
            state.max_height = Some(state.max_height.map_or(height, |best| best.max(height)));
            debug!(height, air_time, "vertical jump: landed");

            Some(Attempt {
                start: state.air_start,
                end: timestamp,
                metrics: RepMetrics {
                    height: Some(height),
                    ..RepMetrics::default()
                },
                correct: at_least(height, config.min_height)
                    && at_least(air_time, config.min_air_time),
            })
        }
        _ => {
            if at_most(y, baseline - config.liftoff_rise) {
                state.phase = Phase::Airborne;
                state.peak_y = y;
                state.air_start = timestamp;
                debug!(y, baseline, "vertical jump: liftoff");
            }
            None
        }
    }
}

/// Vertical jump counter
#[derive(Clone, Debug)]
pub struct VerticalJumpDetector {
    config: VerticalJumpConfig,
    state: VerticalJumpState,
    log: RepLog,
}

impl VerticalJumpDetector {
    pub fn new(config: VerticalJumpConfig) -> Self {
        let state = VerticalJumpState::new(&config);
        Self {
            config,
            state,
            log: RepLog::new(),
        }
    }

    pub fn config(&self) -> &VerticalJumpConfig {
        &self.config
    }

    pub fn state(&self) -> &VerticalJumpState {
        &self.state
    }
}

impl Default for VerticalJumpDetector {
    fn default() -> Self {
        Self::new(VerticalJumpConfig::default())
    }
}

impl RepDetector for VerticalJumpDetector {
    fn activity(&self) -> Activity {
        Activity::VerticalJump
    }

    fn process(&mut self, frame: &Frame) -> &[RepEvent] {
        let hip_y = frame.mean_y(&[LEFT_HIP, RIGHT_HIP]);
        if !hip_y.is_finite() {
            trace!(t = frame.timestamp(), "vertical jump: non-finite frame skipped");
            return self.log.events();
        }
        if let Some(attempt) = step(&self.config, &mut self.state, hip_y, frame.timestamp()) {
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
        let extremum = match (self.state.phase, self.state.baseline) {
            (Phase::Airborne, Some(baseline)) => {
                Some(self.config.to_metres(baseline - self.state.peak_y))
            }
            _ => None,
        };
        LiveReading {
            signal: self.state.current_y,
            extremum,
            elapsed: self.state.air_time(now),
        }
    }

    fn reset(&mut self) {
        self.state = VerticalJumpState::new(&self.config);
        self.log.clear();
    }

    fn best(&self) -> Option<f64> {
        self.state.max_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::fixtures::PoseBuilder;

    fn unsmoothed() -> VerticalJumpConfig {
        VerticalJumpConfig {
            smoothing_window: 1,
            ..VerticalJumpConfig::default()
        }
    }

    #[test]
    fn clean_jump_is_correct() {
        let config = unsmoothed();
        let mut state = VerticalJumpState::new(&config);
        assert!(step(&config, &mut state, 0.60, 0.0).is_none());
        assert!(step(&config, &mut state, 0.55, 0.1).is_none());
        assert_eq!(state.phase(), Phase::Airborne);
        assert!(step(&config, &mut state, 0.50, 0.2).is_none());
        assert!(step(&config, &mut state, 0.58, 0.3).is_none());
        let attempt = step(&config, &mut state, 0.598, 0.4).unwrap();

        // 0.10 of 1080 px at 2.6 mm/px
        let height = attempt.metrics.height.unwrap();
        assert!((height - 0.2808).abs() < 1e-6);
        assert!(attempt.correct);
        assert!((attempt.end - attempt.start - 0.3).abs() < 1e-9);
        assert_eq!(state.phase(), Phase::Grounded);
    }

    #[test]
    fn hop_with_short_flight_is_incorrect() {
        let config = unsmoothed();
        let mut state = VerticalJumpState::new(&config);
        step(&config, &mut state, 0.60, 0.0);
        step(&config, &mut state, 0.55, 0.05);
        let attempt = step(&config, &mut state, 0.60, 0.10).unwrap();
        assert!(!attempt.correct);
    }

    #[test]
    fn small_dip_below_liftoff_is_ignored() {
        let config = unsmoothed();
        let mut state = VerticalJumpState::new(&config);
        step(&config, &mut state, 0.60, 0.0);
        step(&config, &mut state, 0.59, 0.1);
        step(&config, &mut state, 0.585, 0.2);
        assert_eq!(state.phase(), Phase::Grounded);
    }

    #[test]
    fn best_tracks_highest_jump() {
        let mut detector = VerticalJumpDetector::new(unsmoothed());
        let jumps: [(f64, f32); 8] = [
            (0.0, 0.60),
            (0.1, 0.55),
            (0.3, 0.52),
            (0.5, 0.60),
            (1.0, 0.60),
            (1.1, 0.50),
            (1.3, 0.45),
            (1.5, 0.60),
        ];
        for (t, y) in jumps {
            detector.process(&PoseBuilder::standing().hip_y(y).at(t));
        }
        assert_eq!(detector.total_count(), 2);
        let best = detector.best().unwrap();
        let second = detector.reps()[1].metrics.height.unwrap();
        assert!((best - second).abs() < 1e-12);
        assert!(second > detector.reps()[0].metrics.height.unwrap());
        assert_eq!(detector.summary().best, Some(best));
    }
}
