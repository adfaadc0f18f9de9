//! Epsilon-tolerant threshold comparisons
//!
//! Timestamps and smoothed signals are sums of floats, so a dip that is
//! "exactly" 0.2 s long can come out as 0.19999999999999998. All detector
//! comparisons go through these helpers so boundary cases resolve the same
//! way everywhere.

/// Fixed tolerance for threshold and duration comparisons
pub const THRESHOLD_EPSILON: f64 = 1e-9;

/// `value >= limit`, tolerating rounding just below the limit
#[inline]
pub fn at_least(value: f64, limit: f64) -> bool {
    value >= limit - THRESHOLD_EPSILON
}

/// `value <= limit`, tolerating rounding just above the limit
#[inline]
pub fn at_most(value: f64, limit: f64) -> bool {
    value <= limit + THRESHOLD_EPSILON
}

/// `value > limit`, ignoring rounding noise at the limit
#[inline]
pub fn above(value: f64, limit: f64) -> bool {
    value > limit + THRESHOLD_EPSILON
}

/// `value < limit`, ignoring rounding noise at the limit
#[inline]
pub fn below(value: f64, limit: f64) -> bool {
    value < limit - THRESHOLD_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_at_boundary_counts_as_reached() {
        let dip = 0.51 - 0.31;
        assert!(at_least(dip, 0.2));
        assert!(at_most(0.1 + 0.2, 0.3));
    }

    #[test]
    fn strict_comparisons_ignore_noise() {
        assert!(!above(0.1 + 0.2, 0.3));
        assert!(!below(0.3, 0.1 + 0.2));
        assert!(above(0.31, 0.3));
        assert!(below(0.29, 0.3));
    }

    #[test]
    fn nan_never_passes() {
        assert!(!at_least(f64::NAN, 0.0));
        assert!(!at_most(f64::NAN, 0.0));
        assert!(!above(f64::NAN, 0.0));
        assert!(!below(f64::NAN, 0.0));
    }
}
