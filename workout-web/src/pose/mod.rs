//! Pose module - landmark frames from the upstream pose estimator
//!
//! Re-exports only. All logic in submodules.

mod landmarks;

#[cfg(test)]
pub(crate) mod fixtures;

pub use landmarks::{
    Frame, Landmark, LANDMARK_COUNT, LEFT_ANKLE, LEFT_ELBOW, LEFT_FOOT_INDEX, LEFT_HIP,
    LEFT_SHOULDER, LEFT_WRIST, NOSE, RIGHT_ANKLE, RIGHT_ELBOW, RIGHT_FOOT_INDEX, RIGHT_HIP,
    RIGHT_SHOULDER, RIGHT_WRIST,
};
