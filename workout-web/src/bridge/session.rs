//! Workout session exported to JavaScript
//!
//! The page owns one `WorkoutSession` per workout and feeds it the flat
//! Float32Array MediaPipe produces for every video frame:
//!
//! ```js
//! const session = new WorkoutSession("Knee Push-ups");
//! const reps = session.process(landmarks, video.currentTime);
//! ```

use wasm_bindgen::prelude::*;

use crate::activity::Detector;
use crate::config::DetectorConfig;
use crate::detectors::RepDetector;
use crate::error::WorkoutError;
use crate::pose::Frame;

impl From<WorkoutError> for JsValue {
    fn from(err: WorkoutError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Detector plus log for one workout
#[wasm_bindgen]
pub struct WorkoutSession {
    detector: Detector,
}

#[wasm_bindgen]
impl WorkoutSession {
    /// Detector for a free-text activity name with default thresholds
    #[wasm_bindgen(constructor)]
    pub fn new(activity_name: &str) -> WorkoutSession {
        Self {
            detector: Detector::from_name(activity_name, &DetectorConfig::default()),
        }
    }

    /// Detector with thresholds from a TOML document; throws on bad config
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(activity_name: &str, config_toml: &str) -> Result<WorkoutSession, JsValue> {
        let config = DetectorConfig::from_toml_str(config_toml)?;
        Ok(Self {
            detector: Detector::from_name(activity_name, &config),
        })
    }

    /// Feed one frame (timestamp in seconds), returning the total rep count
    pub fn process(&mut self, landmarks: &[f32], timestamp: f64) -> Result<u32, JsValue> {
        let frame = match Frame::from_flat(landmarks, timestamp) {
            Ok(frame) => frame,
            Err(err) => {
                web_sys::console::warn_1(&err.to_string().into());
                return Err(err.into());
            }
        };
        let total = self.detector.process(&frame).len();
        Ok(u32::try_from(total).unwrap_or(u32::MAX))
    }

    /// Same as `process`, stamped with the wall clock
    #[wasm_bindgen(js_name = processNow)]
    pub fn process_now(&mut self, landmarks: &[f32]) -> Result<u32, JsValue> {
        self.process(landmarks, js_sys::Date::now() / 1000.0)
    }

    /// Canonical activity identifier ("push_up", "broad_jump"...)
    pub fn activity(&self) -> String {
        self.detector.activity().name().to_string()
    }

    pub fn phase(&self) -> String {
        self.detector.phase().name().to_string()
    }

    /// Latest smoothed signal of the detector
    #[wasm_bindgen(js_name = liveSignal)]
    pub fn live_signal(&self) -> f64 {
        self.detector.live(0.0).signal
    }

    /// Extremum of the movement in progress, if any
    #[wasm_bindgen(js_name = liveExtremum)]
    pub fn live_extremum(&self) -> Option<f64> {
        self.detector.live(0.0).extremum
    }

    /// Seconds spent in the current dip or flight at `now`
    #[wasm_bindgen(js_name = liveElapsed)]
    pub fn live_elapsed(&self, now: f64) -> f64 {
        self.detector.live(now).elapsed
    }

    #[wasm_bindgen(js_name = correctCount)]
    pub fn correct_count(&self) -> u32 {
        u32::try_from(self.detector.correct_count()).unwrap_or(u32::MAX)
    }

    #[wasm_bindgen(js_name = incorrectCount)]
    pub fn incorrect_count(&self) -> u32 {
        u32::try_from(self.detector.incorrect_count()).unwrap_or(u32::MAX)
    }

    /// Session summary as JSON for the persistence layer
    #[wasm_bindgen(js_name = summaryJson)]
    pub fn summary_json(&self) -> Result<String, JsValue> {
        Ok(self.detector.summary().to_json()?)
    }

    pub fn reset(&mut self) {
        self.detector.reset();
    }
}
