//! Pose landmarks and frames
//!
//! Frames arrive from MediaPipe Pose (in the browser, via the bridge) as
//! 33 normalized landmarks. The index convention below must match the
//! upstream model exactly; nothing here remaps joints.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkoutError};
use crate::signal::elbow_angle;

// ============================================================================
// LANDMARK INDICES (MediaPipe Pose - 33 total)
// ============================================================================

pub const LANDMARK_COUNT: usize = 33;

pub const NOSE: usize = 0;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;
pub const LEFT_FOOT_INDEX: usize = 31;
pub const RIGHT_FOOT_INDEX: usize = 32;

/// Values per landmark in a flat array without visibility (x, y, z)
const STRIDE_XYZ: usize = 3;
/// Values per landmark in a flat array with visibility (x, y, z, v)
const STRIDE_XYZV: usize = 4;

// ============================================================================
// LANDMARK DATA STRUCTURE
// ============================================================================

/// A single 3D landmark point (normalized coordinates)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32, // 0-1 normalized
    pub y: f32, // 0-1 normalized, grows downwards
    pub z: f32, // Relative depth
    /// Detection confidence, when the model reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Image-plane position widened for signal math
    pub fn xy(&self) -> (f64, f64) {
        (f64::from(self.x), f64::from(self.y))
    }
}

/// One sampled instant: all 33 landmarks plus a timestamp in seconds
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    landmarks: [Landmark; LANDMARK_COUNT],
    timestamp: f64,
}

impl Frame {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT], timestamp: f64) -> Self {
        Self {
            landmarks,
            timestamp,
        }
    }

    /// Decode a flat Float32Array from JavaScript
    ///
    /// Accepts 99 values (33 × x, y, z) or 132 values (33 × x, y, z, visibility).
    pub fn from_flat(data: &[f32], timestamp: f64) -> Result<Self> {
        let stride = match data.len() {
            n if n == LANDMARK_COUNT * STRIDE_XYZ => STRIDE_XYZ,
            n if n == LANDMARK_COUNT * STRIDE_XYZV => STRIDE_XYZV,
            len => return Err(WorkoutError::FrameLength { len }),
        };

        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        for (landmark, chunk) in landmarks.iter_mut().zip(data.chunks_exact(stride)) {
            *landmark = Landmark {
                x: chunk[0],
                y: chunk[1],
                z: chunk[2],
                visibility: chunk.get(3).copied(),
            };
        }

        Ok(Self::new(landmarks, timestamp))
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }

    /// Landmark at a MediaPipe index
    ///
    /// # Panics
    /// If `index >= LANDMARK_COUNT`. Callers use the constants in this module.
    pub fn landmark(&self, index: usize) -> &Landmark {
        &self.landmarks[index]
    }

    /// Mean x of the given landmarks
    pub fn mean_x(&self, indices: &[usize]) -> f64 {
        let sum: f64 = indices.iter().map(|&i| f64::from(self.landmarks[i].x)).sum();
        sum / indices.len().max(1) as f64
    }

    /// Mean y of the given landmarks
    pub fn mean_y(&self, indices: &[usize]) -> f64 {
        let sum: f64 = indices.iter().map(|&i| f64::from(self.landmarks[i].y)).sum();
        sum / indices.len().max(1) as f64
    }

    /// Average of the left and right elbow angles in degrees
    pub fn mean_elbow_angle(&self) -> f64 {
        let left = elbow_angle(
            self.landmarks[LEFT_SHOULDER].xy(),
            self.landmarks[LEFT_ELBOW].xy(),
            self.landmarks[LEFT_WRIST].xy(),
        );
        let right = elbow_angle(
            self.landmarks[RIGHT_SHOULDER].xy(),
            self.landmarks[RIGHT_ELBOW].xy(),
            self.landmarks[RIGHT_WRIST].xy(),
        );
        (left + right) / 2.0
    }
}
