use robust::{Coord, Coord3D, orient2d, orient3d};

use super::basic_objects::{Plane, Segment, Tetrahedron, Triangle};
use super::point::{GLOBAL_EPSILON, Point2, Point3};

/// Side of a point relative to an oriented primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Positive,
    Negative,
    Zero,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Positive => Side::Negative,
            Side::Negative => Side::Positive,
            Side::Zero => Side::Zero,
        }
    }
}

fn coord(point: &Point2) -> Coord<f64> {
    Coord {
        x: point.x,
        y: point.y,
    }
}

fn coord3d(point: &Point3) -> Coord3D<f64> {
    Coord3D {
        x: point.x,
        y: point.y,
        z: point.z,
    }
}

fn side_of(determinant: f64) -> Side {
    if determinant > 0.0 {
        Side::Positive
    } else if determinant < 0.0 {
        Side::Negative
    } else {
        Side::Zero
    }
}

/// Exact side of `point` relative to the oriented segment, positive on the
/// left.
pub fn point_side_to_segment(point: &Point2, segment: &Segment<2>) -> Side {
    side_of(orient2d(
        coord(&segment.p0),
        coord(&segment.p1),
        coord(point),
    ))
}

/// Side of `point` relative to the plane, positive along the normal.
pub fn point_side_to_plane(point: &Point3, plane: &Plane) -> Side {
    side_of(plane.normal().dot(&(point - plane.origin())))
}

/// Exact side of `point` relative to the oriented triangle, positive along
/// its normal.
pub fn point_side_to_triangle(point: &Point3, triangle: &Triangle<3>) -> Side {
    let [v0, v1, v2] = &triangle.vertices;
    side_of(orient3d(
        coord3d(v0),
        coord3d(v1),
        coord3d(v2),
        coord3d(point),
    ))
    .opposite()
}

/// Whether `point` lies in the closed triangle.
pub fn is_point_inside_triangle2d(point: &Point2, triangle: &Triangle<2>) -> bool {
    let mut sides = [Side::Zero; 3];
    for edge in 0..3 {
        sides[edge] = point_side_to_segment(point, &triangle.edge(edge));
    }
    let positive = sides.iter().any(|&side| side == Side::Positive);
    let negative = sides.iter().any(|&side| side == Side::Negative);
    !(positive && negative)
}

/// Whether `point` lies in the closed tetrahedron.
pub fn is_point_inside_tetrahedron(point: &Point3, tetra: &Tetrahedron) -> bool {
    Tetrahedron::FACET_VERTICES.iter().all(|&[a, b, c]| {
        let determinant = orient3d(
            coord3d(&tetra.vertices[a]),
            coord3d(&tetra.vertices[b]),
            coord3d(&tetra.vertices[c]),
            coord3d(point),
        );
        // Outward facets see interior points on one consistent side.
        determinant >= 0.0
    })
}

/// Barycentric inside test of the projection of `point` onto the triangle
/// plane, with tolerance.
pub fn is_point_projection_inside_triangle3d(point: &Point3, triangle: &Triangle<3>) -> bool {
    let [v0, v1, v2] = &triangle.vertices;
    let edge0 = v1 - v0;
    let edge1 = v2 - v0;
    let to_point = point - v0;
    let d00 = edge0.dot(&edge0);
    let d01 = edge0.dot(&edge1);
    let d11 = edge1.dot(&edge1);
    let d20 = to_point.dot(&edge0);
    let d21 = to_point.dot(&edge1);
    let denominator = d00 * d11 - d01 * d01;
    if denominator.abs() <= GLOBAL_EPSILON * GLOBAL_EPSILON {
        return false;
    }
    let v = (d11 * d20 - d01 * d21) / denominator;
    let w = (d00 * d21 - d01 * d20) / denominator;
    v >= -GLOBAL_EPSILON && w >= -GLOBAL_EPSILON && v + w <= 1.0 + GLOBAL_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn segment_side_is_signed() {
        let segment = Segment::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
        assert_eq!(
            point_side_to_segment(&Point2::new(0.5, 1.0), &segment),
            Side::Positive
        );
        assert_eq!(
            point_side_to_segment(&Point2::new(0.5, -1.0), &segment),
            Side::Negative
        );
        assert_eq!(
            point_side_to_segment(&Point2::new(2.0, 0.0), &segment),
            Side::Zero
        );
    }

    #[test]
    fn plane_side_follows_normal() {
        let plane = Plane::new(Vector3::z(), Point3::origin());
        assert_eq!(
            point_side_to_plane(&Point3::new(0.3, 0.2, 1.0), &plane),
            Side::Positive
        );
        assert_eq!(
            point_side_to_plane(&Point3::new(0.3, 0.2, -1.0), &plane),
            Side::Negative
        );
    }

    #[test]
    fn tetrahedron_contains_its_barycenter() {
        let tetra = Tetrahedron::new(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        );
        assert!(is_point_inside_tetrahedron(&tetra.barycenter(), &tetra));
        assert!(!is_point_inside_tetrahedron(
            &Point3::new(1.0, 1.0, 1.0),
            &tetra
        ));
    }
}
