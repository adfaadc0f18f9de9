//! Repetition events and the append-only log every detector keeps

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::activity::Activity;
use crate::error::Result;

/// What to do with a completed movement that failed validation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptPolicy {
    /// Log every attempt; the `correct` flag carries the verdict
    #[default]
    RecordAll,
    /// Drop attempts that fail validation
    ValidOnly,
}

impl AttemptPolicy {
    pub fn admits(self, correct: bool) -> bool {
        match self {
            AttemptPolicy::RecordAll => true,
            AttemptPolicy::ValidOnly => correct,
        }
    }
}

/// How a logged event came to be
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepStatus {
    /// A finished repetition
    Completed,
    /// The current best of a continuous tracker (Sit-and-Reach)
    RunningBest,
}

/// Activity-dependent measurements; unset fields are omitted from JSON
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RepMetrics {
    /// Extremum elbow angle in degrees (deepest for push-ups and sit-ups,
    /// most extended for pull-ups)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    /// Elbow angle range covered during the rep, degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_of_motion: Option<f64>,
    /// Head rise above the hanging baseline, normalized frame height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_lift: Option<f64>,
    /// Jump height (metres for vertical jump, frame height for broad jump)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Calibrated horizontal distance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Calibrated forward reach
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reach: Option<f64>,
}

/// A completed movement, before policy and sequencing
#[derive(Clone, Debug, PartialEq)]
pub struct Attempt {
    pub start: f64,
    pub end: f64,
    pub metrics: RepMetrics,
    pub correct: bool,
}

/// One logged repetition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepEvent {
    /// 1-based, gapless
    pub seq: u32,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    pub metrics: RepMetrics,
    pub correct: bool,
    pub status: RepStatus,
}

impl RepEvent {
    pub(crate) fn from_attempt(seq: u32, attempt: Attempt, status: RepStatus) -> Self {
        Self {
            seq,
            start: attempt.start,
            end: attempt.end,
            duration: attempt.end - attempt.start,
            metrics: attempt.metrics,
            correct: attempt.correct,
            status,
        }
    }
}

/// Append-only repetition log
#[derive(Clone, Debug, Default)]
pub struct RepLog {
    events: Vec<RepEvent>,
}

impl RepLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `policy` and append the attempt with the next sequence number
    pub fn submit(&mut self, attempt: Attempt, policy: AttemptPolicy) -> Option<&RepEvent> {
        if !policy.admits(attempt.correct) {
            trace!(start = attempt.start, end = attempt.end, "invalid attempt dropped");
            return None;
        }
        let seq = u32::try_from(self.events.len() + 1).unwrap_or(u32::MAX);
        let event = RepEvent::from_attempt(seq, attempt, RepStatus::Completed);
        debug!(seq, correct = event.correct, duration = event.duration, "rep logged");
        self.events.push(event);
        self.events.last()
    }

    pub fn events(&self) -> &[RepEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn correct_count(&self) -> usize {
        self.events.iter().filter(|e| e.correct).count()
    }

    pub fn incorrect_count(&self) -> usize {
        self.events.iter().filter(|e| !e.correct).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Session result handed to persistence / notification layers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub activity: Activity,
    pub total_reps: usize,
    pub correct_reps: usize,
    pub incorrect_reps: usize,
    /// Headline metric for the activity, if it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best: Option<f64>,
    pub reps: Vec<RepEvent>,
}

impl SessionSummary {
    pub fn new(activity: Activity, reps: &[RepEvent], best: Option<f64>) -> Self {
        let correct_reps = reps.iter().filter(|r| r.correct).count();
        Self {
            activity,
            total_reps: reps.len(),
            correct_reps,
            incorrect_reps: reps.len() - correct_reps,
            best,
            reps: reps.to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
