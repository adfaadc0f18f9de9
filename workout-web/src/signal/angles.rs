//! Joint angle calculation using dot product
//!
//! Calculates the angle at a vertex joint using the vectors
//! vertex→a and vertex→c (e.g. elbow→shoulder and elbow→wrist).

/// Added to the magnitude product so degenerate (zero-length) limbs
/// produce a finite angle instead of NaN.
pub const ANGLE_EPSILON: f64 = 1e-9;

/// Calculate the angle at `vertex` in degrees, in `[0, 180]`
///
/// Uses dot product formula: cos(θ) = (v1 · v2) / (|v1| × |v2| + ε)
pub fn joint_angle(a: (f64, f64), vertex: (f64, f64), c: (f64, f64)) -> f64 {
    let v1 = (a.0 - vertex.0, a.1 - vertex.1);
    let v2 = (c.0 - vertex.0, c.1 - vertex.1);

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    let cos_angle = (dot / (mag1 * mag2 + ANGLE_EPSILON)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

/// Calculate elbow angle in degrees
///
/// - 90° = arm bent at a right angle
/// - 180° = fully straight (arm extended)
pub fn elbow_angle(shoulder: (f64, f64), elbow: (f64, f64), wrist: (f64, f64)) -> f64 {
    joint_angle(shoulder, elbow, wrist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn right_angle_between_axes() {
        let angle = joint_angle((1.0, 0.0), (0.0, 0.0), (0.0, 1.0));
        assert_abs_diff_eq!(angle, 90.0, epsilon = 0.01);
    }

    #[test]
    fn straight_arm() {
        let angle = elbow_angle((0.0, 0.0), (0.5, 0.0), (1.0, 0.0));
        assert_abs_diff_eq!(angle, 180.0, epsilon = 0.01);
    }

    #[test]
    fn folded_arm() {
        let angle = elbow_angle((0.0, 0.0), (0.5, 0.0), (0.1, 0.0));
        assert_abs_diff_eq!(angle, 0.0, epsilon = 0.01);
    }

    #[test]
    fn degenerate_vector_is_finite() {
        let angle = joint_angle((0.3, 0.3), (0.3, 0.3), (0.8, 0.1));
        assert!(angle.is_finite());
        assert_abs_diff_eq!(angle, 90.0, epsilon = 0.01);
    }

    #[test]
    fn symmetric_in_outer_points() {
        let a = (0.2, 0.7);
        let v = (0.5, 0.5);
        let c = (0.9, 0.6);
        assert_abs_diff_eq!(joint_angle(a, v, c), joint_angle(c, v, a), epsilon = 1e-12);
    }
}
