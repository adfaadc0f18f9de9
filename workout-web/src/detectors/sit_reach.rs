//! Sit-and-reach: furthest forward reach of the hands past the feet
//!
//! There are no reps here. The detector keeps one running record that is
//! replaced every time the smoothed reach sets a new maximum.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::rep::{RepEvent, RepMetrics, RepStatus};
use super::{LiveReading, Phase, RepDetector};
use crate::activity::Activity;
use crate::config::{check_non_negative, check_window};
use crate::error::Result;
use crate::pose::{Frame, LEFT_FOOT_INDEX, LEFT_WRIST, RIGHT_FOOT_INDEX, RIGHT_WRIST};
use crate::signal::{above, SmoothingBuffer};

/// Sit-and-reach calibration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitAndReachConfig {
    pub smoothing_window: usize,
    /// Calibration from normalized reach to metres
    pub metres_per_unit: f64,
}

impl Default for SitAndReachConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 5,
            metres_per_unit: 2.6,
        }
    }
}

impl SitAndReachConfig {
    pub fn validate(&self) -> Result<()> {
        check_window("sit_and_reach.smoothing_window", self.smoothing_window)?;
        check_non_negative("sit_and_reach.metres_per_unit", self.metres_per_unit)
    }
}

/// Mutable sit-and-reach state, written only by [`step`]
#[derive(Clone, Debug)]
pub struct SitAndReachState {
    reach: SmoothingBuffer,
    current_reach: f64,
    /// Furthest smoothed reach so far (normalized); hands behind the feet
    /// never count
    max_reach: f64,
    session_start: Option<f64>,
    record: Option<RepEvent>,
}

impl SitAndReachState {
    pub fn new(config: &SitAndReachConfig) -> Self {
        Self {
            reach: SmoothingBuffer::new(config.smoothing_window),
            current_reach: 0.0,
            max_reach: 0.0,
            session_start: None,
            record: None,
        }
    }

    pub fn max_reach(&self) -> f64 {
        self.max_reach
    }

    pub fn record(&self) -> Option<&RepEvent> {
        self.record.as_ref()
    }
}

/// Advance the reach tracker by one raw hands-minus-feet offset
///
/// Returns `true` when the record was replaced.
pub fn step(
    config: &SitAndReachConfig,
    state: &mut SitAndReachState,
    offset: f64,
    timestamp: f64,
) -> bool {
    let start = *state.session_start.get_or_insert(timestamp);
    let reach = state.reach.add(offset);
    state.current_reach = reach;

    if !above(reach, state.max_reach) {
        return false;
    }

    state.max_reach = reach;
    let metres = reach * config.metres_per_unit;
    debug!(reach = metres, "sit-and-reach: new best");
    state.record = Some(RepEvent {
        seq: 1,
        start,
        end: timestamp,
        duration: timestamp - start,
        metrics: RepMetrics {
            reach: Some(metres),
            ..RepMetrics::default()
        },
        correct: true,
        status: RepStatus::RunningBest,
    });
    true
}

/// Sit-and-reach tracker
#[derive(Clone, Debug)]
pub struct SitAndReachDetector {
    config: SitAndReachConfig,
    state: SitAndReachState,
}

impl SitAndReachDetector {
    pub fn new(config: SitAndReachConfig) -> Self {
        let state = SitAndReachState::new(&config);
        Self { config, state }
    }

    pub fn config(&self) -> &SitAndReachConfig {
        &self.config
    }

    pub fn state(&self) -> &SitAndReachState {
        &self.state
    }
}

impl Default for SitAndReachDetector {
    fn default() -> Self {
        Self::new(SitAndReachConfig::default())
    }
}

impl RepDetector for SitAndReachDetector {
    fn activity(&self) -> Activity {
        Activity::SitAndReach
    }

    fn process(&mut self, frame: &Frame) -> &[RepEvent] {
        let hands = frame.mean_x(&[LEFT_WRIST, RIGHT_WRIST]);
        let feet = frame.mean_x(&[LEFT_FOOT_INDEX, RIGHT_FOOT_INDEX]);
        let offset = hands - feet;
        if !offset.is_finite() {
            trace!(t = frame.timestamp(), "sit-and-reach: non-finite frame skipped");
            return self.reps();
        }
        step(&self.config, &mut self.state, offset, frame.timestamp());
        self.reps()
    }

    fn reps(&self) -> &[RepEvent] {
        self.state.record.as_slice()
    }

    fn phase(&self) -> Phase {
        Phase::Tracking
    }

    fn live(&self, now: f64) -> LiveReading {
        LiveReading {
            signal: self.state.current_reach * self.config.metres_per_unit,
            extremum: Some(self.state.max_reach * self.config.metres_per_unit),
            elapsed: self.state.session_start.map_or(0.0, |start| (now - start).max(0.0)),
        }
    }

    fn reset(&mut self) {
        self.state = SitAndReachState::new(&self.config);
    }

    fn best(&self) -> Option<f64> {
        self.state
            .record
            .as_ref()
            .and_then(|record| record.metrics.reach)
    }
}
