//! Planar geometry helpers used by the steering code.
//!
//! All angles are in **degrees**, rotations are counter-clockwise for
//! positive angles. Every function is pure and returns new vectors.

use crate::error::GeometryError;
use nalgebra::{Rotation2, Vector2};

/// 2D vector in arena coordinates.
pub type Vec2 = Vector2<f64>;

/// Result of [`oriented_angle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedAngle {
    /// Angle carrying the rotation sign (`unsigned * orientation`).
    pub signed: f64,

    /// Unoriented angle in [0, 180].
    pub unsigned: f64,

    /// Sign of det([v1; v2]): +1 counter-clockwise, -1 clockwise, 0 colinear.
    pub orientation: i8,
}

/// Returns `v / |v|`.
///
/// # Errors
/// [`GeometryError::ZeroLength`] when `|v| == 0` or the length is not finite.
pub fn normalize(v: Vec2) -> Result<Vec2, GeometryError> {
    let norm = v.norm();
    if norm == 0.0 || !norm.is_finite() {
        return Err(GeometryError::ZeroLength);
    }
    Ok(v / norm)
}

/// Unoriented angle between two vectors in degrees, in [0, 180].
///
/// The cosine is clamped to [-1, 1] before `acos` so rounding overshoot on
/// (anti)parallel vectors cannot produce NaN.
pub fn angle_between(v1: Vec2, v2: Vec2) -> Result<f64, GeometryError> {
    let n1 = v1.norm();
    let n2 = v2.norm();
    if n1 == 0.0 || n2 == 0.0 || !n1.is_finite() || !n2.is_finite() {
        return Err(GeometryError::ZeroLength);
    }
    let cos = (v1.dot(&v2) / (n1 * n2)).clamp(-1.0, 1.0);
    Ok(cos.acos().to_degrees())
}

/// Angle from `v1` to `v2` together with its rotation sign.
///
/// Colinear vectors report orientation 0 and therefore a signed angle of 0,
/// whether they point the same way (unsigned 0) or opposite ways
/// (unsigned 180).
pub fn oriented_angle(v1: Vec2, v2: Vec2) -> Result<OrientedAngle, GeometryError> {
    let unsigned = angle_between(v1, v2)?;
    let det = v1.x * v2.y - v1.y * v2.x;

    let orientation: i8 = if det > 0.0 {
        1
    } else if det < 0.0 {
        -1
    } else {
        0
    };

    if orientation == 0 {
        // Snap colinear pairs so acos rounding never leaks through.
        let unsigned = if v1.dot(&v2) >= 0.0 { 0.0 } else { 180.0 };
        return Ok(OrientedAngle {
            signed: 0.0,
            unsigned,
            orientation,
        });
    }

    Ok(OrientedAngle {
        signed: unsigned * f64::from(orientation),
        unsigned,
        orientation,
    })
}

/// Rotates `v` counter-clockwise by `degrees`.
pub fn rotate(v: Vec2, degrees: f64) -> Vec2 {
    Rotation2::new(degrees.to_radians()) * v
}

/// Euclidean distance between two points.
pub fn distance(a: Vec2, b: Vec2) -> f64 {
    (a - b).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_unit_length() {
        let v = normalize(Vec2::new(3.0, 4.0)).unwrap();
        assert_relative_eq!(v.x, 0.6, epsilon = 1e-12);
        assert_relative_eq!(v.y, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_zero_vector_fails() {
        assert_eq!(normalize(Vec2::zeros()), Err(GeometryError::ZeroLength));
        assert_eq!(
            normalize(Vec2::new(f64::NAN, 1.0)),
            Err(GeometryError::ZeroLength)
        );
    }

    #[test]
    fn test_angle_between_basic() {
        let a = angle_between(Vec2::new(1.0, 0.0), Vec2::new(0.0, 2.0)).unwrap();
        assert_relative_eq!(a, 90.0, epsilon = 1e-9);

        let b = angle_between(Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0)).unwrap();
        assert_relative_eq!(b, 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_angle_between_clamps_overshoot() {
        // Nearly parallel vectors whose cosine rounds above 1.
        let v = Vec2::new(0.1, 0.7);
        let a = angle_between(v, v * 3.0).unwrap();
        assert!(a.is_finite());
        assert!(a < 1e-5);
    }

    #[test]
    fn test_angle_between_zero_vector_fails() {
        assert!(angle_between(Vec2::zeros(), Vec2::new(1.0, 0.0)).is_err());
    }

    #[test]
    fn test_oriented_angle_same_vector() {
        let v = Vec2::new(0.3, -0.7);
        let o = oriented_angle(v, v).unwrap();
        assert_eq!(o.signed, 0.0);
        assert_eq!(o.unsigned, 0.0);
        assert_eq!(o.orientation, 0);
    }

    #[test]
    fn test_oriented_angle_opposite_vector() {
        let v = Vec2::new(0.3, -0.7);
        let o = oriented_angle(v, -v).unwrap();
        assert_eq!(o.unsigned, 180.0);
        assert_eq!(o.orientation, 0);
        assert_eq!(o.signed, 0.0);
    }

    #[test]
    fn test_oriented_angle_sign_convention() {
        let x = Vec2::new(1.0, 0.0);

        let ccw = oriented_angle(x, Vec2::new(0.0, 1.0)).unwrap();
        assert_eq!(ccw.orientation, 1);
        assert_relative_eq!(ccw.signed, 90.0, epsilon = 1e-9);

        let cw = oriented_angle(x, Vec2::new(1.0, -1.0)).unwrap();
        assert_eq!(cw.orientation, -1);
        assert_relative_eq!(cw.signed, -45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let r = rotate(Vec2::new(1.0, 0.0), 90.0);
        assert_relative_eq!(r.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(r.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_zero_is_identity() {
        let v = Vec2::new(-2.5, 7.25);
        assert_eq!(rotate(v, 0.0), v);
    }

    #[test]
    fn test_distance() {
        assert_relative_eq!(
            distance(Vec2::new(1.0, 1.0), Vec2::new(4.0, 5.0)),
            5.0,
            epsilon = 1e-12
        );
    }

    proptest! {
        #[test]
        fn prop_rotation_is_invertible(
            x in -1e3f64..1e3,
            y in -1e3f64..1e3,
            deg in -720.0f64..720.0,
        ) {
            let v = Vec2::new(x, y);
            let back = rotate(rotate(v, deg), -deg);
            prop_assert!((back - v).norm() <= 1e-9 * (1.0 + v.norm()));
        }

        #[test]
        fn prop_rotation_preserves_length(
            x in -1e3f64..1e3,
            y in -1e3f64..1e3,
            deg in -360.0f64..360.0,
        ) {
            let v = Vec2::new(x, y);
            prop_assert!((rotate(v, deg).norm() - v.norm()).abs() <= 1e-9 * (1.0 + v.norm()));
        }

        #[test]
        fn prop_signed_angle_rotates_onto_target(deg in -179.0f64..179.0) {
            prop_assume!(deg.abs() > 1e-3);
            let v = Vec2::new(1.0, 0.0);
            let o = oriented_angle(v, rotate(v, deg)).unwrap();
            prop_assert!((o.signed - deg).abs() < 1e-6);
        }
    }
}
