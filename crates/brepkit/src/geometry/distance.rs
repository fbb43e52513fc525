use nalgebra as na;

use super::basic_objects::{Circle, InfiniteLine, Plane, Segment, Sphere, Tetrahedron, Triangle};
use super::point::{GLOBAL_EPSILON, Point, Point2, Point3, Vector3};
use super::position::{
    is_point_inside_tetrahedron, is_point_inside_triangle2d,
    is_point_projection_inside_triangle3d,
};

pub fn point_point_distance<const D: usize>(point0: &Point<D>, point1: &Point<D>) -> f64 {
    na::distance(point0, point1)
}

/// Smallest distance and closest point on the segment.
pub fn point_segment_distance<const D: usize>(
    point: &Point<D>,
    segment: &Segment<D>,
) -> (f64, Point<D>) {
    let direction = segment.p1 - segment.p0;
    let length_squared = direction.norm_squared();
    let closest = if length_squared <= GLOBAL_EPSILON * GLOBAL_EPSILON {
        segment.p0
    } else {
        let parameter = ((point - segment.p0).dot(&direction) / length_squared).clamp(0.0, 1.0);
        segment.p0 + direction * parameter
    };
    (na::distance(point, &closest), closest)
}

/// Smallest distance and the closest point pair, first on `segment0`.
///
/// Clamped quadratic minimization over both parameters.
pub fn segment_segment_distance<const D: usize>(
    segment0: &Segment<D>,
    segment1: &Segment<D>,
) -> (f64, Point<D>, Point<D>) {
    let d0 = segment0.p1 - segment0.p0;
    let d1 = segment1.p1 - segment1.p0;
    let between = segment0.p0 - segment1.p0;
    let a = d0.norm_squared();
    let e = d1.norm_squared();
    let f = d1.dot(&between);
    let tiny = GLOBAL_EPSILON * GLOBAL_EPSILON;
    let (s, t);
    if a <= tiny && e <= tiny {
        s = 0.0;
        t = 0.0;
    } else if a <= tiny {
        s = 0.0;
        t = (f / e).clamp(0.0, 1.0);
    } else {
        let c = d0.dot(&between);
        if e <= tiny {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else {
            let b = d0.dot(&d1);
            let denominator = a * e - b * b;
            let s_candidate = if denominator > tiny {
                ((b * f - c * e) / denominator).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let t_candidate = (b * s_candidate + f) / e;
            if t_candidate < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t_candidate > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            } else {
                t = t_candidate;
                s = s_candidate;
            }
        }
    }
    let closest0 = segment0.p0 + d0 * s;
    let closest1 = segment1.p0 + d1 * t;
    (na::distance(&closest0, &closest1), closest0, closest1)
}

/// Smallest distance and the closest point pair, first on the segment.
pub fn segment_line_distance<const D: usize>(
    segment: &Segment<D>,
    line: &InfiniteLine<D>,
) -> (f64, Point<D>, Point<D>) {
    let d0 = segment.p1 - segment.p0;
    let direction = *line.direction();
    let between = segment.p0 - line.origin();
    let a = d0.norm_squared();
    let b = d0.dot(&direction);
    let c = d0.dot(&between);
    let f = direction.dot(&between);
    let tiny = GLOBAL_EPSILON * GLOBAL_EPSILON;
    let denominator = a - b * b;
    let s = if a <= tiny {
        0.0
    } else if denominator > tiny {
        ((b * f - c) / denominator).clamp(0.0, 1.0)
    } else {
        // Segment parallel to the line.
        0.0
    };
    let closest0 = segment.p0 + d0 * s;
    let closest1 = line.point_at((closest0 - line.origin()).dot(&direction));
    (na::distance(&closest0, &closest1), closest0, closest1)
}

/// Smallest distance and closest point on the line.
pub fn point_line_distance<const D: usize>(
    point: &Point<D>,
    line: &InfiniteLine<D>,
) -> (f64, Point<D>) {
    let closest = line.point_at((point - line.origin()).dot(line.direction()));
    (na::distance(point, &closest), closest)
}

/// 2D signed point-line distance, positive on the left of the direction.
pub fn point_line_signed_distance2d(point: &Point2, line: &InfiniteLine<2>) -> (f64, Point2) {
    let (distance, closest) = point_line_distance(point, line);
    let to_point = point - line.origin();
    let cross = line.direction().x * to_point.y - line.direction().y * to_point.x;
    (distance.copysign(cross), closest)
}

/// Smallest distance and closest point on the triangle.
pub fn point_triangle_distance2d(point: &Point2, triangle: &Triangle<2>) -> (f64, Point2) {
    if is_point_inside_triangle2d(point, triangle) {
        return (0.0, *point);
    }
    closest_on_edges(point, triangle)
}

/// Smallest distance and closest point on the triangle.
pub fn point_triangle_distance3d(point: &Point3, triangle: &Triangle<3>) -> (f64, Point3) {
    if let Ok(plane) = triangle.plane() {
        let (_, projection) = point_plane_distance(point, &plane);
        if is_point_projection_inside_triangle3d(point, triangle) {
            return (na::distance(point, &projection), projection);
        }
    }
    closest_on_edges(point, triangle)
}

fn closest_on_edges<const D: usize>(
    point: &Point<D>,
    triangle: &Triangle<D>,
) -> (f64, Point<D>) {
    let mut best = (f64::INFINITY, triangle.vertices[0]);
    for edge in 0..3 {
        let candidate = point_segment_distance(point, &triangle.edge(edge));
        if candidate.0 < best.0 {
            best = candidate;
        }
    }
    best
}

/// Distance signed by the triangle normal, positive above.
pub fn point_triangle_signed_distance3d(
    point: &Point3,
    triangle: &Triangle<3>,
) -> (f64, Point3) {
    let (distance, closest) = point_triangle_distance3d(point, triangle);
    match triangle.normal() {
        Ok(normal) => (distance.copysign(normal.dot(&(point - closest))), closest),
        Err(_) => (distance, closest),
    }
}

/// Smallest distance with closest points on the line then on the triangle.
pub fn line_triangle_distance(
    line: &InfiniteLine<3>,
    triangle: &Triangle<3>,
) -> (f64, Point3, Point3) {
    use super::intersection::line_triangle_intersection;
    if let Some(point) = line_triangle_intersection(line, triangle).into_result() {
        return (0.0, point, point);
    }
    let mut best = (f64::INFINITY, *line.origin(), triangle.vertices[0]);
    for edge in 0..3 {
        let (distance, on_edge, on_line) = segment_line_distance(&triangle.edge(edge), line);
        if distance < best.0 {
            best = (distance, on_line, on_edge);
        }
    }
    best
}

/// Smallest distance with closest points on the segment then on the triangle.
pub fn segment_triangle_distance(
    segment: &Segment<3>,
    triangle: &Triangle<3>,
) -> (f64, Point3, Point3) {
    use super::intersection::segment_triangle_intersection;
    if let Some(point) = segment_triangle_intersection(segment, triangle).into_result() {
        return (0.0, point, point);
    }
    let mut best = (f64::INFINITY, segment.p0, triangle.vertices[0]);
    for edge in 0..3 {
        let (distance, on_segment, on_edge) =
            segment_segment_distance(segment, &triangle.edge(edge));
        if distance < best.0 {
            best = (distance, on_segment, on_edge);
        }
    }
    for endpoint in [&segment.p0, &segment.p1] {
        let (distance, on_triangle) = point_triangle_distance3d(endpoint, triangle);
        if distance < best.0 {
            best = (distance, *endpoint, on_triangle);
        }
    }
    best
}

/// Smallest distance and nearest point on the tetrahedron; zero inside.
pub fn point_tetrahedron_distance(point: &Point3, tetra: &Tetrahedron) -> (f64, Point3) {
    if is_point_inside_tetrahedron(point, tetra) {
        return (0.0, *point);
    }
    let mut best = (f64::INFINITY, tetra.vertices[0]);
    for facet in 0..4 {
        let candidate = point_triangle_distance3d(point, &tetra.facet(facet));
        if candidate.0 < best.0 {
            best = candidate;
        }
    }
    best
}

pub fn point_plane_signed_distance(point: &Point3, plane: &Plane) -> (f64, Point3) {
    let signed = plane.normal().dot(&(point - plane.origin()));
    (signed, point - plane.normal() * signed)
}

pub fn point_plane_distance(point: &Point3, plane: &Plane) -> (f64, Point3) {
    let (signed, closest) = point_plane_signed_distance(point, plane);
    (signed.abs(), closest)
}

pub fn point_sphere_signed_distance<const D: usize>(
    point: &Point<D>,
    sphere: &Sphere<D>,
) -> (f64, Point<D>) {
    let radial = point - sphere.origin();
    let length = radial.norm();
    if length <= GLOBAL_EPSILON {
        // The center sees every surface point at the same distance.
        let mut axis = na::SVector::<f64, D>::zeros();
        axis[0] = 1.0;
        return (-sphere.radius(), sphere.origin() + axis * sphere.radius());
    }
    let closest = sphere.origin() + radial * (sphere.radius() / length);
    (length - sphere.radius(), closest)
}

pub fn point_sphere_distance<const D: usize>(
    point: &Point<D>,
    sphere: &Sphere<D>,
) -> (f64, Point<D>) {
    let (signed, closest) = point_sphere_signed_distance(point, sphere);
    (signed.abs(), closest)
}

/// Distance to the full ball: zero anywhere inside.
pub fn point_ball_distance<const D: usize>(
    point: &Point<D>,
    ball: &Sphere<D>,
) -> (f64, Point<D>) {
    let (signed, closest) = point_sphere_signed_distance(point, ball);
    if signed <= 0.0 {
        (0.0, *point)
    } else {
        (signed, closest)
    }
}

pub fn point_circle_distance(point: &Point3, circle: &Circle) -> (f64, Point3) {
    let plane = circle.plane();
    let (_, projection) = point_plane_distance(point, plane);
    let radial = projection - plane.origin();
    let length = radial.norm();
    let closest = if length <= GLOBAL_EPSILON {
        plane.origin() + perpendicular(plane.normal()) * circle.radius()
    } else {
        plane.origin() + radial * (circle.radius() / length)
    };
    (na::distance(point, &closest), closest)
}

/// Sign is positive outside the circle radius, negative inside.
pub fn point_circle_signed_distance(point: &Point3, circle: &Circle) -> (f64, Point3) {
    let (distance, closest) = point_circle_distance(point, circle);
    let radial = point_plane_distance(point, circle.plane()).1 - circle.plane().origin();
    (distance.copysign(radial.norm() - circle.radius()), closest)
}

/// Distance to the full disk: plane distance above it, rim distance beyond.
pub fn point_disk_distance(point: &Point3, disk: &Circle) -> (f64, Point3) {
    let plane = disk.plane();
    let (_, projection) = point_plane_distance(point, plane);
    if (projection - plane.origin()).norm() <= disk.radius() {
        return (na::distance(point, &projection), projection);
    }
    point_circle_distance(point, disk)
}

/// Any unit vector orthogonal to `normal`.
pub(crate) fn perpendicular(normal: &Vector3) -> Vector3 {
    let axis = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    normal.cross(&axis).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn point_segment_clamps_to_endpoints() {
        let segment = Segment::new(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0));
        let (distance, closest) = point_segment_distance(&Point2::new(3.0, 1.0), &segment);
        assert_abs_diff_eq!(distance, 2.0_f64.sqrt());
        assert_eq!(closest, Point2::new(2.0, 0.0));
        let (distance, closest) = point_segment_distance(&Point2::new(1.0, 1.0), &segment);
        assert_abs_diff_eq!(distance, 1.0);
        assert_eq!(closest, Point2::new(1.0, 0.0));
    }

    #[test]
    fn skew_segments() {
        let segment0 = Segment::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        let segment1 = Segment::new(Point3::new(0.5, -1.0, 1.0), Point3::new(0.5, 1.0, 1.0));
        let (distance, closest0, closest1) = segment_segment_distance(&segment0, &segment1);
        assert_abs_diff_eq!(distance, 1.0);
        assert_eq!(closest0, Point3::new(0.5, 0.0, 0.0));
        assert_eq!(closest1, Point3::new(0.5, 0.0, 1.0));
    }

    #[test]
    fn triangle_distance_inside_and_outside() {
        let triangle = Triangle::new(
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 2.0),
        );
        let (inside, _) = point_triangle_distance2d(&Point2::new(0.5, 0.5), &triangle);
        assert_eq!(inside, 0.0);
        let (outside, closest) = point_triangle_distance2d(&Point2::new(1.0, -1.0), &triangle);
        assert_abs_diff_eq!(outside, 1.0);
        assert_eq!(closest, Point2::new(1.0, 0.0));
    }

    #[test]
    fn plane_distance_is_signed_by_the_normal() {
        let plane = Plane::new(Vector3::z(), Point3::new(0.0, 0.0, 1.0));
        let (signed, closest) = point_plane_signed_distance(&Point3::new(2.0, 0.0, 3.0), &plane);
        assert_abs_diff_eq!(signed, 2.0);
        assert_eq!(closest, Point3::new(2.0, 0.0, 1.0));
        let (signed, _) = point_plane_signed_distance(&Point3::new(2.0, 0.0, 0.0), &plane);
        assert_abs_diff_eq!(signed, -1.0);
    }

    #[test]
    fn sphere_and_ball_distances() {
        let sphere = Sphere::new(Point3::origin(), 2.0);
        let (signed, closest) = point_sphere_signed_distance(&Point3::new(0.5, 0.0, 0.0), &sphere);
        assert_abs_diff_eq!(signed, -1.5);
        assert_eq!(closest, Point3::new(2.0, 0.0, 0.0));
        let (ball, inside) = point_ball_distance(&Point3::new(0.5, 0.0, 0.0), &sphere);
        assert_eq!(ball, 0.0);
        assert_eq!(inside, Point3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn tetrahedron_distance() {
        let tetra = Tetrahedron::new(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        );
        assert_eq!(
            point_tetrahedron_distance(&Point3::new(0.2, 0.2, 0.2), &tetra).0,
            0.0
        );
        let (distance, closest) =
            point_tetrahedron_distance(&Point3::new(0.2, 0.2, -1.0), &tetra);
        assert_abs_diff_eq!(distance, 1.0);
        assert_eq!(closest, Point3::new(0.2, 0.2, 0.0));
    }
}
