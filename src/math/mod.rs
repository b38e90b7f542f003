pub mod intersect_2d;
pub mod intersect_3d;
pub mod polygon_2d;

/// 2D point type (surface parameter space).
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Parametric confusion: two parameters closer than this are the same parameter.
pub const PARAM_TOLERANCE: f64 = 1e-9;

/// Point confusion: two 3D points closer than this are the same point.
pub const CONFUSION: f64 = 1e-7;

/// Wraps `value` into `[start, start + period)`.
#[must_use]
pub fn wrap_periodic(value: f64, start: f64, period: f64) -> f64 {
    if period <= 0.0 || !value.is_finite() {
        return value;
    }
    let wrapped = start + (value - start).rem_euclid(period);
    // rem_euclid may round up to exactly `period` for tiny negative offsets
    if wrapped >= start + period {
        start
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    #[test]
    fn wrap_inside_range_is_identity() {
        assert!((wrap_periodic(1.0, 0.0, TAU) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn wrap_negative_angle() {
        let w = wrap_periodic(-0.5, 0.0, TAU);
        assert!((w - (TAU - 0.5)).abs() < 1e-12);
    }

    #[test]
    fn wrap_above_period() {
        let w = wrap_periodic(TAU + 0.25, 0.0, TAU);
        assert!((w - 0.25).abs() < 1e-12);
    }

    #[test]
    fn wrap_without_period_keeps_value() {
        assert!((wrap_periodic(42.0, 0.0, 0.0) - 42.0).abs() < TOLERANCE);
    }
}
