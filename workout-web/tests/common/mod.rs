//! Pose construction shared by the integration tests.
#![allow(dead_code)]

use workout_web::pose::{
    LEFT_ANKLE, LEFT_ELBOW, LEFT_FOOT_INDEX, LEFT_HIP, LEFT_SHOULDER, LEFT_WRIST, NOSE,
    RIGHT_ANKLE, RIGHT_ELBOW, RIGHT_FOOT_INDEX, RIGHT_HIP, RIGHT_SHOULDER, RIGHT_WRIST,
};
use workout_web::{Frame, Landmark, LANDMARK_COUNT};

/// A full-body pose edited one joint group at a time.
#[derive(Clone)]
pub struct Pose {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl Pose {
    /// Standing upright, arms straight, feet together at the centre.
    pub fn standing() -> Self {
        let mut landmarks = [Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        landmarks[NOSE] = Landmark::new(0.5, 0.2, 0.0);
        landmarks[LEFT_HIP] = Landmark::new(0.45, 0.55, 0.0);
        landmarks[RIGHT_HIP] = Landmark::new(0.55, 0.55, 0.0);
        Self { landmarks }.feet(0.5, 0.9).arms(180.0)
    }

    /// Both elbows bent to `degrees`.
    pub fn arms(mut self, degrees: f64) -> Self {
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

    pub fn nose(mut self, y: f32) -> Self {
        self.landmarks[NOSE].y = y;
        self
    }

    pub fn hips(mut self, y: f32) -> Self {
        self.landmarks[LEFT_HIP].y = y;
        self.landmarks[RIGHT_HIP].y = y;
        self
    }

    /// Feet centred on `x` with ankles at height `y`.
    pub fn feet(mut self, x: f32, y: f32) -> Self {
        self.landmarks[LEFT_ANKLE] = Landmark::new(x - 0.05, y, 0.0);
        self.landmarks[RIGHT_ANKLE] = Landmark::new(x + 0.05, y, 0.0);
        self.landmarks[LEFT_FOOT_INDEX] = Landmark::new(x - 0.05, y + 0.02, 0.0);
        self.landmarks[RIGHT_FOOT_INDEX] = Landmark::new(x + 0.05, y + 0.02, 0.0);
        self
    }

    pub fn hands(mut self, x: f32) -> Self {
        self.landmarks[LEFT_WRIST].x = x;
        self.landmarks[RIGHT_WRIST].x = x;
        self
    }

    pub fn frame(&self, timestamp: f64) -> Frame {
        Frame::new(self.landmarks, timestamp)
    }

    /// The layout MediaPipe hands to the page: x, y, z, visibility per landmark.
    pub fn flat(&self) -> Vec<f32> {
        self.landmarks
            .iter()
            .flat_map(|l| [l.x, l.y, l.z, 1.0])
            .collect()
    }
}

/// Push-up ramp: 180° down to 60° over 0.3 s and back over 0.3 s, then held.
pub fn pushup_ramp(t0: f64) -> Vec<(f64, f64)> {
    (0..=30)
        .map(|k| {
            let angle = if k <= 10 {
                180.0 - 12.0 * f64::from(k)
            } else if k <= 20 {
                60.0 + 12.0 * f64::from(k - 10)
            } else {
                180.0
            };
            (t0 + f64::from(k) * 0.03, angle)
        })
        .collect()
}
