use std::cmp::Ordering;

use nalgebra as na;

/// Library-wide absolute tolerance for geometric equality and degeneracy
/// tests.
pub const GLOBAL_EPSILON: f64 = 1e-8;

pub type Point<const D: usize> = na::Point<f64, D>;
pub type Point2 = na::Point2<f64>;
pub type Point3 = na::Point3<f64>;

pub type Vector<const D: usize> = na::SVector<f64, D>;
pub type Vector2 = na::Vector2<f64>;
pub type Vector3 = na::Vector3<f64>;

/// Whether the two points are closer than `GLOBAL_EPSILON`.
pub fn inexact_equal<const D: usize>(point0: &Point<D>, point1: &Point<D>) -> bool {
    na::distance_squared(point0, point1) <= GLOBAL_EPSILON * GLOBAL_EPSILON
}

/// Coordinate-by-coordinate ordering, first axis most significant.
pub fn lexicographic_cmp<const D: usize>(point0: &Point<D>, point1: &Point<D>) -> Ordering {
    for d in 0..D {
        match point0[d].partial_cmp(&point1[d]) {
            Some(Ordering::Equal) | None => continue,
            Some(ordering) => return ordering,
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inexact_equality_uses_the_global_tolerance() {
        let point = Point2::new(0.0, 0.0);
        assert!(inexact_equal(&point, &Point2::new(GLOBAL_EPSILON / 2.0, 0.0)));
        assert!(!inexact_equal(&point, &Point2::new(3.0 * GLOBAL_EPSILON, 0.0)));
    }

    #[test]
    fn lexicographic_order_prefers_first_axis() {
        let low = Point3::new(0.0, 9.0, 9.0);
        let high = Point3::new(1.0, 0.0, 0.0);
        assert_eq!(lexicographic_cmp(&low, &high), Ordering::Less);
        assert_eq!(lexicographic_cmp(&high, &high), Ordering::Equal);
    }
}
