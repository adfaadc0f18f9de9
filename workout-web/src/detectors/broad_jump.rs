//! Vertical broad jump detection from ankle height and position
//!
//! Takeoff is a sudden rise of the smoothed ankle midpoint relative to the
//! oldest sample still in the smoothing window. That oldest sample is kept
//! as the ground level for the rest of the flight. Distance is the
//! horizontal travel of the raw ankle midpoint between takeoff and landing.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::rep::{Attempt, AttemptPolicy, RepEvent, RepLog, RepMetrics};
use super::{LiveReading, Phase, RepDetector};
use crate::activity::Activity;
use crate::config::{check_non_negative, check_window};
use crate::error::Result;
use crate::pose::{Frame, LEFT_ANKLE, RIGHT_ANKLE};
use crate::signal::{above, at_least, SmoothingBuffer};

const ANKLES: [usize; 2] = [LEFT_ANKLE, RIGHT_ANKLE];

/// Broad jump thresholds and calibration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadJumpConfig {
    pub smoothing_window: usize,
    /// Ankle rise within the window that counts as takeoff (normalized)
    pub rise_threshold: f64,
    /// Minimum horizontal travel for a correct jump (normalized width, unscaled)
    pub min_distance: f64,
    /// Minimum flight time for a correct jump (seconds)
    pub min_air_time: f64,
    /// Minimum ankle rise for a correct jump (normalized)
    pub min_height: f64,
    /// Distance above the takeoff ground level that counts as landed (normalized)
    pub landing_band: f64,
    /// Quiet period after a landing before the next takeoff (seconds)
    pub min_jump_interval: f64,
    /// Calibration applied to the reported distance
    pub distance_scale: f64,
    pub policy: AttemptPolicy,
}

impl Default for BroadJumpConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 5,
            rise_threshold: 0.03,
            min_distance: 0.05,
            min_air_time: 0.2,
            min_height: 0.015,
            landing_band: 0.015,
            min_jump_interval: 1.0,
            distance_scale: 1.0,
            policy: AttemptPolicy::RecordAll,
        }
    }
}

impl BroadJumpConfig {
    pub fn validate(&self) -> Result<()> {
        check_window("broad_jump.smoothing_window", self.smoothing_window)?;
        check_non_negative("broad_jump.rise_threshold", self.rise_threshold)?;
        check_non_negative("broad_jump.min_distance", self.min_distance)?;
        check_non_negative("broad_jump.min_air_time", self.min_air_time)?;
        check_non_negative("broad_jump.min_height", self.min_height)?;
        check_non_negative("broad_jump.landing_band", self.landing_band)?;
        check_non_negative("broad_jump.min_jump_interval", self.min_jump_interval)?;
        check_non_negative("broad_jump.distance_scale", self.distance_scale)
    }
}

/// Mutable broad jump state, written only by [`step`]
#[derive(Clone, Debug)]
pub struct BroadJumpState {
    phase: Phase,
    ankle_y: SmoothingBuffer,
    current_y: f64,
    /// Ankle height at takeoff, held until landing
    ground_y: f64,
    takeoff_x: f64,
    peak_y: f64,
    air_start: f64,
    /// Landing time of the previous jump
    last_jump: Option<f64>,
    longest: Option<f64>,
}

impl BroadJumpState {
    pub fn new(config: &BroadJumpConfig) -> Self {
        Self {
            phase: Phase::Grounded,
            ankle_y: SmoothingBuffer::new(config.smoothing_window),
            current_y: 0.0,
            ground_y: 0.0,
            takeoff_x: 0.0,
            peak_y: 0.0,
            air_start: 0.0,
            last_jump: None,
            longest: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Longest valid jump so far (scaled)
    pub fn longest(&self) -> Option<f64> {
        self.longest
    }

    pub fn air_time(&self, now: f64) -> f64 {
        match self.phase {
            Phase::Airborne => (now - self.air_start).max(0.0),
            _ => 0.0,
        }
    }

    fn ready(&self, config: &BroadJumpConfig, timestamp: f64) -> bool {
        self.last_jump
            .map_or(true, |last| at_least(timestamp - last, config.min_jump_interval))
    }
}

/// Advance the broad jump machine by one frame's raw ankle midpoint
pub fn step(
    config: &BroadJumpConfig,
    state: &mut BroadJumpState,
    ankle_y: f64,
    ankle_x: f64,
    timestamp: f64,
) -> Option<Attempt> {
    let reference = state.ankle_y.oldest();
    let y = state.ankle_y.add(ankle_y);
    state.current_y = y;

    match state.phase {
        Phase::Airborne => {
            state.peak_y = state.peak_y.min(y);
            if !at_least(y, state.ground_y - config.landing_band) {
                return None;
            }

            state.phase = Phase::Grounded;
            state.last_jump = Some(timestamp);
            let travel = (ankle_x - state.takeoff_x).abs();
            let distance = travel * config.distance_scale;
            let height = state.ground_y - state.peak_y;
            let air_time = timestamp - state.air_start;
            let correct = at_least(travel, config.min_distance)
                && at_least(air_time, config.min_air_time)
                && at_least(height, config.min_height);
            if correct {
                state.longest = Some(state.longest.map_or(distance, |best| best.max(distance)));
            }
            debug!(distance, height, air_time, correct, "broad jump: landed");

            Some(Attempt {
                start: state.air_start,
                end: timestamp,
                metrics: RepMetrics {
                    distance: Some(distance),
                    height: Some(height),
                    ..RepMetrics::default()
                },
                correct,
            })
        }
        _ => {
            let Some(ground) = reference else {
                return None;
            };
            if !above(ground - y, config.rise_threshold) {
                return None;
            }
            if !state.ready(config, timestamp) {
                trace!(t = timestamp, "broad jump: takeoff inside jump interval");
                return None;
            }

            state.phase = Phase::Airborne;
            state.ground_y = ground;
            state.takeoff_x = ankle_x;
            state.peak_y = y;
            state.air_start = timestamp;
            debug!(ground, y, "broad jump: takeoff");
            None
        }
    }
}

/// Broad jump counter
#[derive(Clone, Debug)]
pub struct BroadJumpDetector {
    config: BroadJumpConfig,
    state: BroadJumpState,
    log: RepLog,
}

impl BroadJumpDetector {
    pub fn new(config: BroadJumpConfig) -> Self {
        let state = BroadJumpState::new(&config);
        Self {
            config,
            state,
            log: RepLog::new(),
        }
    }

    pub fn config(&self) -> &BroadJumpConfig {
        &self.config
    }

    pub fn state(&self) -> &BroadJumpState {
        &self.state
    }
}

impl Default for BroadJumpDetector {
    fn default() -> Self {
        Self::new(BroadJumpConfig::default())
    }
}

impl RepDetector for BroadJumpDetector {
    fn activity(&self) -> Activity {
        Activity::BroadJump
    }

    fn process(&mut self, frame: &Frame) -> &[RepEvent] {
        let ankle_y = frame.mean_y(&ANKLES);
        let ankle_x = frame.mean_x(&ANKLES);
        if !ankle_y.is_finite() || !ankle_x.is_finite() {
            trace!(t = frame.timestamp(), "broad jump: non-finite frame skipped");
            return self.log.events();
        }
        let attempt = step(
            &self.config,
            &mut self.state,
            ankle_y,
            ankle_x,
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
            signal: self.state.current_y,
            extremum: (self.state.phase == Phase::Airborne)
                .then(|| self.state.ground_y - self.state.peak_y),
            elapsed: self.state.air_time(now),
        }
    }

    fn reset(&mut self) {
        self.state = BroadJumpState::new(&self.config);
        self.log.clear();
    }

    fn best(&self) -> Option<f64> {
        self.state.longest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::fixtures::PoseBuilder;

    fn unsmoothed() -> BroadJumpConfig {
        BroadJumpConfig {
            smoothing_window: 1,
            ..BroadJumpConfig::default()
        }
    }

    /// (t, ankle_y, ankle_x)
    fn run(
        config: &BroadJumpConfig,
        samples: &[(f64, f64, f64)],
    ) -> (BroadJumpState, Vec<Attempt>) {
        let mut state = BroadJumpState::new(config);
        let attempts = samples
            .iter()
            .filter_map(|&(t, y, x)| step(config, &mut state, y, x, t))
            .collect();
        (state, attempts)
    }

    fn jump(t0: f64, from_x: f64, to_x: f64) -> Vec<(f64, f64, f64)> {
        vec![
            (t0, 0.90, from_x),
            (t0 + 0.1, 0.90, from_x),
            (t0 + 0.2, 0.85, from_x),
            (t0 + 0.3, 0.80, (from_x + to_x) / 2.0),
            (t0 + 0.4, 0.88, to_x),
            (t0 + 0.5, 0.90, to_x),
        ]
    }

    #[test]
    fn long_jump_is_correct() {
        let config = unsmoothed();
        let (state, attempts) = run(&config, &jump(0.0, 0.2, 0.6));
        assert_eq!(attempts.len(), 1);
        let rep = &attempts[0];
        assert!(rep.correct);
        assert!((rep.metrics.distance.unwrap() - 0.4).abs() < 1e-9);
        assert!((rep.metrics.height.unwrap() - 0.10).abs() < 1e-9);
        assert!((rep.start - 0.2).abs() < 1e-9);
        assert!((rep.end - 0.5).abs() < 1e-9);
        assert_eq!(state.phase(), Phase::Grounded);
        assert_eq!(state.longest(), rep.metrics.distance);
    }

    #[test]
    fn jump_in_place_is_incorrect() {
        let config = unsmoothed();
        let (state, attempts) = run(&config, &jump(0.0, 0.5, 0.52));
        assert_eq!(attempts.len(), 1);
        assert!(!attempts[0].correct);
        assert_eq!(state.longest(), None);
    }

    #[test]
    fn slow_drift_is_not_takeoff() {
        let config = unsmoothed();
        let samples: Vec<(f64, f64, f64)> = (0..20)
            .map(|i| (f64::from(i) * 0.1, 0.9 - f64::from(i) * 0.01, 0.5))
            .collect();
        let (state, attempts) = run(&config, &samples);
        assert!(attempts.is_empty());
        assert_eq!(state.phase(), Phase::Grounded);
    }

    #[test]
    fn second_takeoff_waits_for_jump_interval() {
        let config = unsmoothed();
        let mut samples = jump(0.0, 0.2, 0.6);
        // Landed at 0.5; a takeoff at 1.2 is too soon
        samples.extend(jump(1.0, 0.6, 0.9));
        let (_, attempts) = run(&config, &samples);
        assert_eq!(attempts.len(), 1);

        let mut samples = jump(0.0, 0.2, 0.6);
        samples.extend(jump(1.4, 0.6, 0.9));
        let (state, attempts) = run(&config, &samples);
        assert_eq!(attempts.len(), 2);
        assert!((state.longest().unwrap() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn landing_does_not_depend_on_min_height() {
        let config = BroadJumpConfig {
            min_height: 0.0,
            ..unsmoothed()
        };
        config.validate().unwrap();
        // Lands slightly above the takeoff ground level
        let samples = [
            (0.0, 0.900, 0.2),
            (0.1, 0.900, 0.2),
            (0.2, 0.850, 0.2),
            (0.3, 0.800, 0.4),
            (0.5, 0.899, 0.6),
            (2.0, 0.900, 0.6),
            (2.1, 0.850, 0.6),
            (2.3, 0.800, 0.8),
            (2.5, 0.899, 1.0),
        ];
        let (state, attempts) = run(&config, &samples);
        assert_eq!(attempts.len(), 2);
        assert!(attempts.iter().all(|a| a.correct));
        assert_eq!(state.phase(), Phase::Grounded);
    }

    #[test]
    fn landing_band_sets_landing_height() {
        let config = BroadJumpConfig {
            landing_band: 0.0,
            ..unsmoothed()
        };
        let samples = [
            (0.0, 0.90, 0.2),
            (0.1, 0.90, 0.2),
            (0.2, 0.85, 0.2),
            (0.3, 0.80, 0.4),
            (0.4, 0.89, 0.6),
        ];
        let (state, attempts) = run(&config, &samples);
        assert!(attempts.is_empty());
        assert_eq!(state.phase(), Phase::Airborne);

        let mut config = config;
        config.landing_band = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn distance_scale_calibrates_output() {
        let config = BroadJumpConfig {
            distance_scale: 2.5,
            ..unsmoothed()
        };
        let (_, attempts) = run(&config, &jump(0.0, 0.2, 0.6));
        assert!(attempts[0].correct);
        assert!((attempts[0].metrics.distance.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn detector_reads_ankles() {
        let mut detector = BroadJumpDetector::new(unsmoothed());
        for (t, y, x) in jump(0.0, 0.3, 0.6) {
            detector.process(&PoseBuilder::standing().feet(x as f32, y as f32).at(t));
        }
        assert_eq!(detector.total_count(), 1);
        assert_eq!(detector.correct_count(), 1);
        let best = detector.best().unwrap();
        assert!((best - 0.3).abs() < 1e-5);
    }
}
