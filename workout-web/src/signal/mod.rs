//! Signal module - smoothing, joint geometry and threshold comparisons
//!
//! Re-exports only. All logic in submodules.

mod angles;
mod smoothing;
mod threshold;

pub use angles::{elbow_angle, joint_angle, ANGLE_EPSILON};
pub use smoothing::SmoothingBuffer;
pub use threshold::{above, at_least, at_most, below, THRESHOLD_EPSILON};
