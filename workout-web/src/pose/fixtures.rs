//! Synthetic poses for detector unit tests

use super::*;

/// Builds frames from a neutral standing pose, one joint group at a time
#[derive(Clone)]
pub(crate) struct PoseBuilder {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl PoseBuilder {
    /// Upright, arms straight down, feet together at the centre
    pub(crate) fn standing() -> Self {
        let mut landmarks = [Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        landmarks[NOSE] = Landmark::new(0.5, 0.2, 0.0);
        landmarks[LEFT_HIP] = Landmark::new(0.45, 0.55, 0.0);
        landmarks[RIGHT_HIP] = Landmark::new(0.55, 0.55, 0.0);
        landmarks[LEFT_ANKLE] = Landmark::new(0.45, 0.9, 0.0);
        landmarks[RIGHT_ANKLE] = Landmark::new(0.55, 0.9, 0.0);
        landmarks[LEFT_FOOT_INDEX] = Landmark::new(0.45, 0.92, 0.0);
        landmarks[RIGHT_FOOT_INDEX] = Landmark::new(0.55, 0.92, 0.0);
        Self { landmarks }.elbow_angle(180.0)
    }

    /// Bend both elbows to `degrees` (shoulder straight above the elbow)
    pub(crate) fn elbow_angle(mut self, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        for (shoulder, elbow, wrist, x) in [
            (LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST, 0.4_f64),
            (RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST, 0.6_f64),
        ] {
            self.landmarks[shoulder] = Landmark::new(x as f32, 0.3, 0.0);
            self.landmarks[elbow] = Landmark::new(x as f32, 0.5, 0.0);
            self.landmarks[wrist] =
                Landmark::new((x + 0.2 * sin) as f32, (0.5 - 0.2 * cos) as f32, 0.0);
        }
        self
    }

    pub(crate) fn nose_y(mut self, y: f32) -> Self {
        self.landmarks[NOSE].y = y;
        self
    }

    /// Both hips at height `y`
    pub(crate) fn hip_y(mut self, y: f32) -> Self {
        self.landmarks[LEFT_HIP].y = y;
        self.landmarks[RIGHT_HIP].y = y;
        self
    }

    /// Ankles and foot indices centred on `x`, ankles at height `y`
    pub(crate) fn feet(mut self, x: f32, y: f32) -> Self {
        self.landmarks[LEFT_ANKLE] = Landmark::new(x - 0.05, y, 0.0);
        self.landmarks[RIGHT_ANKLE] = Landmark::new(x + 0.05, y, 0.0);
        self.landmarks[LEFT_FOOT_INDEX] = Landmark::new(x - 0.05, y + 0.02, 0.0);
        self.landmarks[RIGHT_FOOT_INDEX] = Landmark::new(x + 0.05, y + 0.02, 0.0);
        self
    }

    /// Both wrists at horizontal position `x`
    pub(crate) fn hands_x(mut self, x: f32) -> Self {
        self.landmarks[LEFT_WRIST].x = x;
        self.landmarks[RIGHT_WRIST].x = x;
        self
    }

    pub(crate) fn at(&self, timestamp: f64) -> Frame {
        Frame::new(self.landmarks, timestamp)
    }
}
