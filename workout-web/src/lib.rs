//! Workout Web - exercise repetition detection from pose landmarks
//!
//! Entry point for the library and the WASM module. Only contains:
//! - Module declarations
//! - Re-exports of the public API
//! - The wasm_bindgen start hook (feature `wasm`)
//!
//! ```
//! use workout_web::{Activity, Detector, DetectorConfig, RepDetector};
//!
//! let detector = Detector::from_name("Knee Push-ups", &DetectorConfig::default());
//! assert_eq!(detector.activity(), Activity::PushUp);
//! assert_eq!(detector.total_count(), 0);
//! ```

pub mod activity;
pub mod config;
pub mod detectors;
pub mod error;
pub mod pose;
pub mod signal;

#[cfg(feature = "wasm")]
mod bridge;

pub use activity::{Activity, Detector};
pub use config::DetectorConfig;
pub use detectors::{
    Attempt, AttemptPolicy, LiveReading, Phase, RepDetector, RepEvent, RepMetrics, RepStatus,
    SessionSummary,
};
pub use error::{Result, WorkoutError};
pub use pose::{Frame, Landmark, LANDMARK_COUNT};
pub use signal::SmoothingBuffer;

#[cfg(feature = "wasm")]
pub use bridge::WorkoutSession;

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when WASM module loads
#[cfg(feature = "wasm")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}
