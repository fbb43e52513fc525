use nalgebra as na;
use serde::{Deserialize, Serialize};

use super::basic_objects::Ray;
use super::point::{Point, Vector};

/// Axis-aligned box, empty until the first point is added.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox<const D: usize> {
    min: Point<D>,
    max: Point<D>,
}

impl<const D: usize> Default for BoundingBox<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize> BoundingBox<D> {
    pub fn new() -> Self {
        Self {
            min: Point::from([f64::INFINITY; D]),
            max: Point::from([f64::NEG_INFINITY; D]),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point<D>>) -> Self {
        let mut bbox = Self::new();
        for point in points {
            bbox.add_point(&point);
        }
        bbox
    }

    pub fn min(&self) -> &Point<D> {
        &self.min
    }

    pub fn max(&self) -> &Point<D> {
        &self.max
    }

    pub fn is_empty(&self) -> bool {
        (0..D).any(|d| self.min[d] > self.max[d])
    }

    pub fn add_point(&mut self, point: &Point<D>) {
        for d in 0..D {
            self.min[d] = self.min[d].min(point[d]);
            self.max[d] = self.max[d].max(point[d]);
        }
    }

    pub fn add_box(&mut self, other: &BoundingBox<D>) {
        self.add_point(&other.min);
        self.add_point(&other.max);
    }

    pub fn union(&self, other: &BoundingBox<D>) -> BoundingBox<D> {
        let mut merged = self.clone();
        merged.add_box(other);
        merged
    }

    pub fn extends(&mut self, margin: f64) {
        for d in 0..D {
            self.min[d] -= margin;
            self.max[d] += margin;
        }
    }

    pub fn contains(&self, point: &Point<D>) -> bool {
        (0..D).all(|d| point[d] >= self.min[d] && point[d] <= self.max[d])
    }

    pub fn intersects(&self, other: &BoundingBox<D>) -> bool {
        (0..D).all(|d| self.min[d] <= other.max[d] && self.max[d] >= other.min[d])
    }

    pub fn center(&self) -> Point<D> {
        na::center(&self.min, &self.max)
    }

    pub fn diagonal(&self) -> Vector<D> {
        self.max - self.min
    }

    /// Distance from `point` to the box surface; zero inside.
    pub fn distance_to_point(&self, point: &Point<D>) -> f64 {
        let mut squared = 0.0;
        for d in 0..D {
            let gap = (self.min[d] - point[d]).max(0.0).max(point[d] - self.max[d]);
            squared += gap * gap;
        }
        squared.sqrt()
    }

    /// Slab test against a ray.
    pub fn intersects_ray(&self, ray: &Ray<D>) -> bool {
        let mut t_min = 0.0_f64;
        let mut t_max = f64::INFINITY;
        for d in 0..D {
            let origin = ray.origin()[d];
            let direction = ray.direction()[d];
            if direction.abs() < f64::MIN_POSITIVE {
                if origin < self.min[d] || origin > self.max[d] {
                    return false;
                }
                continue;
            }
            let inverse = 1.0 / direction;
            let mut t0 = (self.min[d] - origin) * inverse;
            let mut t1 = (self.max[d] - origin) * inverse;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::{Point2, Vector2};

    #[test]
    fn grows_with_points_and_boxes() {
        let mut bbox = BoundingBox::<2>::new();
        assert!(bbox.is_empty());
        bbox.add_point(&Point2::new(1.0, 2.0));
        bbox.add_point(&Point2::new(-1.0, 0.0));
        assert_eq!(bbox.min(), &Point2::new(-1.0, 0.0));
        assert_eq!(bbox.max(), &Point2::new(1.0, 2.0));
        assert_eq!(bbox.center(), Point2::new(0.0, 1.0));

        let other = BoundingBox::from_points([Point2::new(4.0, 4.0)]);
        let merged = bbox.union(&other);
        assert!(merged.contains(&Point2::new(3.0, 3.0)));
        assert!(!bbox.intersects(&other));
    }

    #[test]
    fn point_distance_is_zero_inside() {
        let bbox = BoundingBox::from_points([Point2::new(0.0, 0.0), Point2::new(2.0, 2.0)]);
        assert_eq!(bbox.distance_to_point(&Point2::new(1.0, 1.0)), 0.0);
        assert_eq!(bbox.distance_to_point(&Point2::new(4.0, 1.0)), 2.0);
    }

    #[test]
    fn ray_slab_test() {
        let bbox = BoundingBox::from_points([Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)]);
        let hit = Ray::new(Vector2::new(1.0, 0.0), Point2::new(-1.0, 0.5)).unwrap();
        let miss = Ray::new(Vector2::new(-1.0, 0.0), Point2::new(-1.0, 0.5)).unwrap();
        assert!(bbox.intersects_ray(&hit));
        assert!(!bbox.intersects_ray(&miss));
    }
}
