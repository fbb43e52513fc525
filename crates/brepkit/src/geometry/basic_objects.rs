use nalgebra as na;
use serde::{Deserialize, Serialize};

use super::GeometryError;
use super::bounding_box::BoundingBox;
use super::point::{GLOBAL_EPSILON, Point, Point3, Vector, Vector3};

/// Two endpoints; degenerate segments are allowed here and rejected by the
/// constructions that cannot handle them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment<const D: usize> {
    pub p0: Point<D>,
    pub p1: Point<D>,
}

impl<const D: usize> Segment<D> {
    pub fn new(p0: Point<D>, p1: Point<D>) -> Self {
        Self { p0, p1 }
    }

    pub fn length(&self) -> f64 {
        na::distance(&self.p0, &self.p1)
    }

    pub fn barycenter(&self) -> Point<D> {
        na::center(&self.p0, &self.p1)
    }

    /// Normalized direction; fails when the segment extent is below
    /// tolerance.
    pub fn normalized_direction(&self) -> Result<Vector<D>, GeometryError> {
        normalize(self.p1 - self.p0, "segment")
    }

    pub fn bounding_box(&self) -> BoundingBox<D> {
        BoundingBox::from_points([self.p0, self.p1])
    }
}

fn normalize<const D: usize>(
    direction: Vector<D>,
    what: &'static str,
) -> Result<Vector<D>, GeometryError> {
    let length = direction.norm();
    if length <= GLOBAL_EPSILON {
        return Err(GeometryError::Degenerate(what));
    }
    Ok(direction / length)
}

/// Origin plus a normalized direction, extending both ways.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InfiniteLine<const D: usize> {
    origin: Point<D>,
    direction: Vector<D>,
}

impl<const D: usize> InfiniteLine<D> {
    pub fn new(direction: Vector<D>, origin: Point<D>) -> Result<Self, GeometryError> {
        Ok(Self {
            origin,
            direction: normalize(direction, "line direction")?,
        })
    }

    pub fn from_segment(segment: &Segment<D>) -> Result<Self, GeometryError> {
        Ok(Self {
            origin: segment.p0,
            direction: segment.normalized_direction()?,
        })
    }

    pub fn origin(&self) -> &Point<D> {
        &self.origin
    }

    pub fn direction(&self) -> &Vector<D> {
        &self.direction
    }

    pub fn point_at(&self, parameter: f64) -> Point<D> {
        self.origin + self.direction * parameter
    }
}

/// Origin plus a normalized direction, extending one way.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ray<const D: usize> {
    origin: Point<D>,
    direction: Vector<D>,
}

impl<const D: usize> Ray<D> {
    pub fn new(direction: Vector<D>, origin: Point<D>) -> Result<Self, GeometryError> {
        Ok(Self {
            origin,
            direction: normalize(direction, "ray direction")?,
        })
    }

    pub fn origin(&self) -> &Point<D> {
        &self.origin
    }

    pub fn direction(&self) -> &Vector<D> {
        &self.direction
    }
}

impl<const D: usize> From<Ray<D>> for InfiniteLine<D> {
    fn from(ray: Ray<D>) -> Self {
        Self {
            origin: ray.origin,
            direction: ray.direction,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Triangle<const D: usize> {
    pub vertices: [Point<D>; 3],
}

impl<const D: usize> Triangle<D> {
    pub fn new(v0: Point<D>, v1: Point<D>, v2: Point<D>) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    pub fn barycenter(&self) -> Point<D> {
        let [v0, v1, v2] = &self.vertices;
        Point::from((v0.coords + v1.coords + v2.coords) / 3.0)
    }

    pub fn edge(&self, edge: usize) -> Segment<D> {
        Segment::new(self.vertices[edge], self.vertices[(edge + 1) % 3])
    }

    pub fn bounding_box(&self) -> BoundingBox<D> {
        BoundingBox::from_points(self.vertices)
    }
}

impl Triangle<3> {
    /// Unit normal; fails on triangles of near-zero area.
    pub fn normal(&self) -> Result<Vector3, GeometryError> {
        let [v0, v1, v2] = &self.vertices;
        normalize((v1 - v0).cross(&(v2 - v0)), "triangle")
    }

    pub fn plane(&self) -> Result<Plane, GeometryError> {
        Ok(Plane::new(self.normal()?, self.vertices[0]))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tetrahedron {
    pub vertices: [Point3; 4],
}

impl Tetrahedron {
    /// Local vertex indices of the four facets, facet `f` opposite vertex `f`,
    /// outward-oriented for a positive-volume tetrahedron.
    pub const FACET_VERTICES: [[usize; 3]; 4] = [[1, 2, 3], [0, 3, 2], [0, 1, 3], [0, 2, 1]];

    pub fn new(v0: Point3, v1: Point3, v2: Point3, v3: Point3) -> Self {
        Self {
            vertices: [v0, v1, v2, v3],
        }
    }

    pub fn barycenter(&self) -> Point3 {
        let sum: Vector3 = self.vertices.iter().map(|vertex| vertex.coords).sum();
        Point3::from(sum / 4.0)
    }

    pub fn facet(&self, facet: usize) -> Triangle<3> {
        let [a, b, c] = Self::FACET_VERTICES[facet];
        Triangle::new(self.vertices[a], self.vertices[b], self.vertices[c])
    }

    pub fn bounding_box(&self) -> BoundingBox<3> {
        BoundingBox::from_points(self.vertices)
    }
}

/// Oriented plane through `origin` with unit `normal`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    normal: Vector3,
    origin: Point3,
}

impl Plane {
    pub fn new(normal: Vector3, origin: Point3) -> Self {
        debug_assert!((normal.norm() - 1.0).abs() <= GLOBAL_EPSILON);
        Self { normal, origin }
    }

    pub fn try_new(normal: Vector3, origin: Point3) -> Result<Self, GeometryError> {
        Ok(Self {
            normal: normalize(normal, "plane normal")?,
            origin,
        })
    }

    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Constant `d` of the implicit equation `n . x = d`.
    pub fn plane_constant(&self) -> f64 {
        self.normal.dot(&self.origin.coords)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sphere<const D: usize> {
    origin: Point<D>,
    radius: f64,
}

impl<const D: usize> Sphere<D> {
    pub fn new(origin: Point<D>, radius: f64) -> Self {
        Self { origin, radius }
    }

    pub fn origin(&self) -> &Point<D> {
        &self.origin
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn bounding_box(&self) -> BoundingBox<D> {
        let mut bbox = BoundingBox::new();
        bbox.add_point(&self.origin);
        bbox.extends(self.radius);
        bbox
    }
}

/// Ring of given radius lying in `plane` around its origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    plane: Plane,
    radius: f64,
}

impl Circle {
    pub fn new(plane: Plane, radius: f64) -> Self {
        Self { plane, radius }
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

/// Finite lateral surface around the axis segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    axis: Segment<3>,
    radius: f64,
}

impl Cylinder {
    pub fn new(axis: Segment<3>, radius: f64) -> Self {
        Self { axis, radius }
    }

    pub fn axis(&self) -> &Segment<3> {
        &self.axis
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::Point2;

    #[test]
    fn degenerate_segment_has_no_direction() {
        let segment = Segment::new(Point2::new(1.0, 1.0), Point2::new(1.0, 1.0));
        assert!(segment.normalized_direction().is_err());
        assert!(InfiniteLine::from_segment(&segment).is_err());
    }

    #[test]
    fn line_directions_are_normalized() {
        let line =
            InfiniteLine::new(Vector3::new(0.0, 0.0, 10.0), Point3::origin()).unwrap();
        assert_eq!(line.direction(), &Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(line.point_at(2.0), Point3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn tetrahedron_facets_are_outward() {
        let tetra = Tetrahedron::new(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        );
        // The facet opposite the apex must look away from the barycenter.
        let facet = tetra.facet(3);
        let normal = facet.normal().unwrap();
        let outwards = facet.barycenter() - tetra.barycenter();
        assert!(normal.dot(&outwards) > 0.0);
    }
}
