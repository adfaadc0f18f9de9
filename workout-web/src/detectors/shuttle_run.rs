//! Shuttle run turn counting from horizontal foot position
//!
//! The smoothed mean x of both ankles and foot indices is compared with the
//! position at the last movement frame. Movement beyond the threshold votes
//! for a direction; a direction is confirmed only after `confirm_frames`
//! consecutive identical votes. Each confirmed reversal is one turn, and a
//! leg is measured between the furthest points reached before each turn.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::rep::{Attempt, AttemptPolicy, RepEvent, RepLog, RepMetrics};
use super::{LiveReading, Phase, RepDetector};
use crate::activity::Activity;
use crate::config::{check_non_negative, check_window};
use crate::error::{Result, WorkoutError};
use crate::pose::{Frame, LEFT_ANKLE, LEFT_FOOT_INDEX, RIGHT_ANKLE, RIGHT_FOOT_INDEX};
use crate::signal::{above, SmoothingBuffer};

const FEET: [usize; 4] = [LEFT_ANKLE, RIGHT_ANKLE, LEFT_FOOT_INDEX, RIGHT_FOOT_INDEX];

/// Shuttle run thresholds and calibration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShuttleRunConfig {
    pub smoothing_window: usize,
    /// Horizontal movement per frame that counts as travel (normalized width)
    pub movement_threshold: f64,
    /// Consecutive same-direction frames needed to confirm a direction
    pub confirm_frames: usize,
    /// Metres per normalized frame width
    pub metres_per_unit: f64,
}

impl Default for ShuttleRunConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 5,
            movement_threshold: 0.005,
            confirm_frames: 3,
            metres_per_unit: 10.0,
        }
    }
}

impl ShuttleRunConfig {
    pub fn validate(&self) -> Result<()> {
        check_window("shuttle_run.smoothing_window", self.smoothing_window)?;
        check_non_negative("shuttle_run.movement_threshold", self.movement_threshold)?;
        check_non_negative("shuttle_run.metres_per_unit", self.metres_per_unit)?;
        if self.confirm_frames == 0 {
            return Err(WorkoutError::invalid_config(
                "shuttle_run.confirm_frames must be at least 1",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn phase(self) -> Phase {
        match self {
            Direction::Forward => Phase::Forward,
            Direction::Backward => Phase::Backward,
        }
    }

    /// The position further along this direction
    fn further(self, a: f64, b: f64) -> f64 {
        match self {
            Direction::Forward => a.max(b),
            Direction::Backward => a.min(b),
        }
    }
}

/// Mutable shuttle run state, written only by [`step`]
#[derive(Clone, Debug)]
pub struct ShuttleRunState {
    feet: SmoothingBuffer,
    current_x: f64,
    /// Smoothed x at the last frame that moved past the threshold
    last_x: Option<f64>,
    /// Turn point the current leg started from (or the first frame)
    origin_x: f64,
    /// Furthest x reached in the confirmed direction
    turn_x: f64,
    /// Time of the previous turn, or of the first confirmed direction
    leg_start: Option<f64>,
    direction: Option<Direction>,
    votes: VecDeque<Direction>,
    total_distance: f64,
}

impl ShuttleRunState {
    pub fn new(config: &ShuttleRunConfig) -> Self {
        Self {
            feet: SmoothingBuffer::new(config.smoothing_window),
            current_x: 0.0,
            last_x: None,
            origin_x: 0.0,
            turn_x: 0.0,
            leg_start: None,
            direction: None,
            votes: VecDeque::with_capacity(config.confirm_frames),
            total_distance: 0.0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.direction.map_or(Phase::Waiting, Direction::phase)
    }

    /// Calibrated distance covered across all completed legs
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Calibrated distance of the leg in progress
    pub fn leg_distance(&self, config: &ShuttleRunConfig) -> f64 {
        match self.direction {
            Some(_) => (self.turn_x - self.origin_x).abs() * config.metres_per_unit,
            None => 0.0,
        }
    }
}

/// Advance the shuttle run machine by one raw foot-midpoint x
pub fn step(
    config: &ShuttleRunConfig,
    state: &mut ShuttleRunState,
    feet_x: f64,
    timestamp: f64,
) -> Option<Attempt> {
    let x = state.feet.add(feet_x);
    state.current_x = x;

    let Some(last_x) = state.last_x else {
        state.last_x = Some(x);
        state.origin_x = x;
        return None;
    };

    let delta = x - last_x;
    if !above(delta.abs(), config.movement_threshold) {
        return None;
    }
    state.last_x = Some(x);

    let vote = if delta > 0.0 {
        Direction::Forward
    } else {
        Direction::Backward
    };
    if state.direction == Some(vote) {
        state.turn_x = vote.further(state.turn_x, x);
    }
    state.votes.push_back(vote);
    while state.votes.len() > config.confirm_frames {
        state.votes.pop_front();
    }
    if state.votes.len() < config.confirm_frames || state.votes.iter().any(|&d| d != vote) {
        return None;
    }

    let previous = state.direction.replace(vote);
    match previous {
        Some(previous) if previous != vote => {
            let distance = (state.turn_x - state.origin_x).abs() * config.metres_per_unit;
            let start = state.leg_start.unwrap_or(timestamp);
            state.origin_x = state.turn_x;
            state.turn_x = x;
            state.leg_start = Some(timestamp);
            state.total_distance += distance;
            debug!(distance, from = ?previous, to = ?vote, "shuttle run: turn");

            Some(Attempt {
                start,
                end: timestamp,
                metrics: RepMetrics {
                    distance: Some(distance),
                    ..RepMetrics::default()
                },
                correct: true,
            })
        }
        Some(_) => None,
        None => {
            state.turn_x = x;
            state.leg_start = Some(timestamp);
            debug!(direction = ?vote, "shuttle run: moving");
            None
        }
    }
}

/// Shuttle run turn counter
#[derive(Clone, Debug)]
pub struct ShuttleRunDetector {
    config: ShuttleRunConfig,
    state: ShuttleRunState,
    log: RepLog,
}

impl ShuttleRunDetector {
    pub fn new(config: ShuttleRunConfig) -> Self {
        let state = ShuttleRunState::new(&config);
        Self {
            config,
            state,
            log: RepLog::new(),
        }
    }

    pub fn config(&self) -> &ShuttleRunConfig {
        &self.config
    }

    pub fn state(&self) -> &ShuttleRunState {
        &self.state
    }
}

impl Default for ShuttleRunDetector {
    fn default() -> Self {
        Self::new(ShuttleRunConfig::default())
    }
}

impl RepDetector for ShuttleRunDetector {
    fn activity(&self) -> Activity {
        Activity::ShuttleRun
    }

    fn process(&mut self, frame: &Frame) -> &[RepEvent] {
        let feet_x = frame.mean_x(&FEET);
        if !feet_x.is_finite() {
            trace!(t = frame.timestamp(), "shuttle run: non-finite frame skipped");
            return self.log.events();
        }
        if let Some(attempt) = step(&self.config, &mut self.state, feet_x, frame.timestamp()) {
            // Turns are always valid
            self.log.submit(attempt, AttemptPolicy::RecordAll);
        }
        self.log.events()
    }

    fn reps(&self) -> &[RepEvent] {
        self.log.events()
    }

    fn phase(&self) -> Phase {
        self.state.phase()
    }

    fn live(&self, now: f64) -> LiveReading {
        LiveReading {
            signal: self.state.current_x,
            extremum: Some(self.state.leg_distance(&self.config)),
            elapsed: self.state.leg_start.map_or(0.0, |start| (now - start).max(0.0)),
        }
    }

    fn reset(&mut self) {
        self.state = ShuttleRunState::new(&self.config);
        self.log.clear();
    }

    fn best(&self) -> Option<f64> {
        Some(self.state.total_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::fixtures::PoseBuilder;

    fn unsmoothed() -> ShuttleRunConfig {
        ShuttleRunConfig {
            smoothing_window: 1,
            ..ShuttleRunConfig::default()
        }
    }

    fn run(config: &ShuttleRunConfig, xs: &[f64]) -> (ShuttleRunState, Vec<Attempt>) {
        let mut state = ShuttleRunState::new(config);
        let attempts = xs
            .iter()
            .enumerate()
            .filter_map(|(i, &x)| step(config, &mut state, x, i as f64 * 0.1))
            .collect();
        (state, attempts)
    }

    #[test]
    fn three_forward_then_three_back_is_one_turn() {
        let config = unsmoothed();
        let (state, attempts) = run(&config, &[0.5, 0.52, 0.54, 0.56, 0.54, 0.52, 0.50]);
        assert_eq!(attempts.len(), 1);
        assert_eq!(state.phase(), Phase::Backward);
        // Out to 0.56 and back: the leg ends at the turn point
        let distance = attempts[0].metrics.distance.unwrap();
        assert!((distance - 0.6).abs() < 1e-9);
        assert!((state.total_distance() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn two_back_frames_do_not_confirm() {
        let config = unsmoothed();
        let (state, attempts) = run(&config, &[0.5, 0.52, 0.54, 0.56, 0.54, 0.52]);
        assert!(attempts.is_empty());
        assert_eq!(state.phase(), Phase::Forward);
    }

    #[test]
    fn sub_threshold_drift_is_ignored() {
        let config = unsmoothed();
        let xs: Vec<f64> = (0..20).map(|i| 0.5 + f64::from(i % 2) * 0.004).collect();
        let (state, attempts) = run(&config, &xs);
        assert!(attempts.is_empty());
        assert_eq!(state.phase(), Phase::Waiting);
    }

    #[test]
    fn distance_is_measured_between_turns() {
        let config = unsmoothed();
        let mut xs = vec![0.1];
        xs.extend((1..=8).map(|i| 0.1 + f64::from(i) * 0.1)); // out to 0.9
        xs.extend((1..=8).map(|i| 0.9 - f64::from(i) * 0.1)); // back to 0.1
        xs.extend((1..=3).map(|i| 0.1 + f64::from(i) * 0.1)); // turn again
        let (state, attempts) = run(&config, &xs);
        assert_eq!(attempts.len(), 2);

        // Each leg runs between the turn points at 0.1 and 0.9, whatever
        // the confirmation lag
        let first = attempts[0].metrics.distance.unwrap();
        assert!((first - 8.0).abs() < 1e-6);
        let second = attempts[1].metrics.distance.unwrap();
        assert!((second - 8.0).abs() < 1e-6);
        assert!((state.total_distance() - 16.0).abs() < 1e-6);
    }

    #[test]
    fn leg_in_progress_reads_from_last_turn() {
        let config = unsmoothed();
        let (state, attempts) = run(&config, &[0.2, 0.3, 0.4, 0.5, 0.6, 0.5, 0.4, 0.3, 0.2]);
        assert_eq!(attempts.len(), 1);
        assert!((attempts[0].metrics.distance.unwrap() - 4.0).abs() < 1e-6);
        // Turned at 0.6, now back at 0.2
        assert!((state.leg_distance(&config) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn detector_reports_turns_from_frames() {
        let mut detector = ShuttleRunDetector::new(unsmoothed());
        for (i, x) in [0.3_f32, 0.35, 0.4, 0.45, 0.4, 0.35, 0.3].into_iter().enumerate() {
            detector.process(&PoseBuilder::standing().feet(x, 0.9).at(i as f64 * 0.1));
        }
        assert_eq!(detector.total_count(), 1);
        assert_eq!(detector.correct_count(), 1);
        assert_eq!(detector.phase(), Phase::Backward);
    }
}
