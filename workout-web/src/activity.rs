//! Activities and the detector factory
//!
//! Activity names come from the workout catalogue as free text ("Knee
//! Push-ups", "Standing Vertical Jump"...). [`Activity::from_name`] maps
//! them onto a detector by keyword; anything unrecognized counts push-ups.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DetectorConfig;
use crate::detectors::{
    BroadJumpDetector, LiveReading, Phase, PullupDetector, PushupDetector, RepDetector, RepEvent,
    ShuttleRunDetector, SitAndReachDetector, SitupDetector, VerticalJumpDetector,
};
use crate::error::{Result, WorkoutError};
use crate::pose::Frame;

/// Supported exercises
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    PushUp,
    PullUp,
    SitUp,
    VerticalJump,
    BroadJump,
    ShuttleRun,
    SitAndReach,
}

impl Activity {
    pub const ALL: [Activity; 7] = [
        Activity::PushUp,
        Activity::PullUp,
        Activity::SitUp,
        Activity::VerticalJump,
        Activity::BroadJump,
        Activity::ShuttleRun,
        Activity::SitAndReach,
    ];

    /// Canonical identifier, identical to the serde form
    pub fn name(&self) -> &'static str {
        match self {
            Activity::PushUp => "push_up",
            Activity::PullUp => "pull_up",
            Activity::SitUp => "sit_up",
            Activity::VerticalJump => "vertical_jump",
            Activity::BroadJump => "broad_jump",
            Activity::ShuttleRun => "shuttle_run",
            Activity::SitAndReach => "sit_and_reach",
        }
    }

    /// Resolve a free-text activity name by keyword
    ///
    /// Order matters: "broad jump" must be tested before "vertical jump"
    /// since the catalogue calls it "Vertical Broad Jump".
    pub fn from_name(name: &str) -> Self {
        let name = name.to_lowercase();
        let has = |keyword: &str| name.contains(keyword);

        if has("push") {
            Activity::PushUp
        } else if has("pull") || has("chin") {
            Activity::PullUp
        } else if has("sit-up") || has("situp") || has("sit up") {
            Activity::SitUp
        } else if has("broad") && has("jump") {
            Activity::BroadJump
        } else if has("vertical") && has("jump") {
            Activity::VerticalJump
        } else if has("shuttle") {
            Activity::ShuttleRun
        } else if has("sit") && has("reach") {
            Activity::SitAndReach
        } else {
            debug!(name = %name, "unrecognized activity, counting push-ups");
            Activity::PushUp
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activity {
    type Err = WorkoutError;

    /// Canonical names only; use [`Activity::from_name`] for free text
    fn from_str(s: &str) -> Result<Self> {
        Activity::ALL
            .into_iter()
            .find(|activity| activity.name() == s)
            .ok_or_else(|| WorkoutError::UnknownActivity(s.to_string()))
    }
}

// ============================================================================
// DETECTOR FACTORY
// ============================================================================

/// Any exercise detector
#[derive(Clone, Debug)]
pub enum Detector {
    PushUp(PushupDetector),
    PullUp(PullupDetector),
    SitUp(SitupDetector),
    VerticalJump(VerticalJumpDetector),
    BroadJump(BroadJumpDetector),
    ShuttleRun(ShuttleRunDetector),
    SitAndReach(SitAndReachDetector),
}

macro_rules! dispatch {
    ($self:expr, $d:ident => $body:expr) => {
        match $self {
            Detector::PushUp($d) => $body,
            Detector::PullUp($d) => $body,
            Detector::SitUp($d) => $body,
            Detector::VerticalJump($d) => $body,
            Detector::BroadJump($d) => $body,
            Detector::ShuttleRun($d) => $body,
            Detector::SitAndReach($d) => $body,
        }
    };
}

impl Detector {
    /// Build the detector for `activity` from an already validated config
    pub fn for_activity(activity: Activity, config: &DetectorConfig) -> Self {
        match activity {
            Activity::PushUp => Detector::PushUp(PushupDetector::new(config.pushup.clone())),
            Activity::PullUp => Detector::PullUp(PullupDetector::new(config.pullup.clone())),
            Activity::SitUp => Detector::SitUp(SitupDetector::new(config.situp.clone())),
            Activity::VerticalJump => {
                Detector::VerticalJump(VerticalJumpDetector::new(config.vertical_jump.clone()))
            }
            Activity::BroadJump => {
                Detector::BroadJump(BroadJumpDetector::new(config.broad_jump.clone()))
            }
            Activity::ShuttleRun => {
                Detector::ShuttleRun(ShuttleRunDetector::new(config.shuttle_run.clone()))
            }
            Activity::SitAndReach => {
                Detector::SitAndReach(SitAndReachDetector::new(config.sit_and_reach.clone()))
            }
        }
    }

    /// Build the detector for a free-text activity name
    pub fn from_name(name: &str, config: &DetectorConfig) -> Self {
        Self::for_activity(Activity::from_name(name), config)
    }

    /// Validate `config`, then build the detector for `activity`
    pub fn with_config(activity: Activity, config: &DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::for_activity(activity, config))
    }
}

impl RepDetector for Detector {
    fn activity(&self) -> Activity {
        dispatch!(self, d => d.activity())
    }

    fn process(&mut self, frame: &Frame) -> &[RepEvent] {
        dispatch!(self, d => d.process(frame))
    }

    fn reps(&self) -> &[RepEvent] {
        dispatch!(self, d => d.reps())
    }

    fn phase(&self) -> Phase {
        dispatch!(self, d => d.phase())
    }

    fn live(&self, now: f64) -> LiveReading {
        dispatch!(self, d => d.live(now))
    }

    fn reset(&mut self) {
        dispatch!(self, d => d.reset())
    }

    fn best(&self) -> Option<f64> {
        dispatch!(self, d => d.best())
    }
}
