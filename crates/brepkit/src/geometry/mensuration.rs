use super::basic_objects::{Tetrahedron, Triangle};
use super::point::Vector3;

/// Signed area of a 2D triangle, positive for a counterclockwise loop.
pub fn triangle_signed_area2d(triangle: &Triangle<2>) -> f64 {
    let [v0, v1, v2] = &triangle.vertices;
    ((v1.x - v0.x) * (v2.y - v0.y) - (v2.x - v0.x) * (v1.y - v0.y)) / 2.0
}

pub fn triangle_area2d(triangle: &Triangle<2>) -> f64 {
    triangle_signed_area2d(triangle).abs()
}

pub fn triangle_area3d(triangle: &Triangle<3>) -> f64 {
    let [v0, v1, v2] = &triangle.vertices;
    (v1 - v0).cross(&(v2 - v0)).norm() / 2.0
}

/// Area of a 3D triangle signed by its orientation relative to `up`.
pub fn triangle_signed_area3d(triangle: &Triangle<3>, up: &Vector3) -> f64 {
    let [v0, v1, v2] = &triangle.vertices;
    let cross = (v1 - v0).cross(&(v2 - v0));
    (cross.norm() / 2.0).copysign(cross.dot(up))
}

/// Signed volume, positive when the fourth vertex sees the base
/// counterclockwise.
pub fn tetrahedron_signed_volume(tetra: &Tetrahedron) -> f64 {
    let [a, b, c, d] = &tetra.vertices;
    (b - a).cross(&(c - a)).dot(&(d - a)) / 6.0
}

pub fn tetrahedron_volume(tetra: &Tetrahedron) -> f64 {
    tetrahedron_signed_volume(tetra).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::{Point2, Point3};
    use approx::assert_abs_diff_eq;

    #[test]
    fn triangle_areas() {
        let ccw = Triangle::new(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        );
        assert_abs_diff_eq!(triangle_signed_area2d(&ccw), 0.5);
        let cw = Triangle::new(ccw.vertices[0], ccw.vertices[2], ccw.vertices[1]);
        assert_abs_diff_eq!(triangle_signed_area2d(&cw), -0.5);
    }

    #[test]
    fn signed_area_follows_up_vector() {
        let triangle = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        assert_abs_diff_eq!(triangle_signed_area3d(&triangle, &Vector3::z()), 0.5);
        assert_abs_diff_eq!(triangle_signed_area3d(&triangle, &-Vector3::z()), -0.5);
    }

    #[test]
    fn unit_tetrahedron_volume() {
        let tetra = Tetrahedron::new(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        );
        assert_abs_diff_eq!(tetrahedron_signed_volume(&tetra), 1.0 / 6.0);
        let flipped = Tetrahedron::new(
            tetra.vertices[1],
            tetra.vertices[0],
            tetra.vertices[2],
            tetra.vertices[3],
        );
        assert_abs_diff_eq!(tetrahedron_signed_volume(&flipped), -1.0 / 6.0);
    }
}
