use arrayvec::ArrayVec;

use super::basic_objects::{Circle, Cylinder, InfiniteLine, Plane, Segment, Sphere, Triangle};
use super::distance::{
    point_line_distance, point_plane_distance, point_segment_distance, point_triangle_distance3d,
};
use super::point::{GLOBAL_EPSILON, Point, Point2, Point3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntersectionType {
    None,
    Intersect,
    Parallel,
    /// The algebraic construction succeeded but a point-on-primitive sanity
    /// check failed beyond tolerance.
    Incorrect,
}

/// Per-primitive sanity outcome: the flag tells whether the intersection lies
/// on the primitive, the payload carries the corrected (projected) value.
#[derive(Clone, Debug)]
pub struct CorrectnessInfo<T> {
    pub first: (bool, T),
    pub second: (bool, T),
}

#[derive(Clone, Debug)]
pub struct IntersectionResult<T> {
    pub result: Option<T>,
    pub kind: IntersectionType,
    pub correctness: Option<CorrectnessInfo<T>>,
}

impl<T> IntersectionResult<T> {
    pub fn intersecting(result: T, correctness: CorrectnessInfo<T>) -> Self {
        let kind = if correctness.first.0 && correctness.second.0 {
            IntersectionType::Intersect
        } else {
            IntersectionType::Incorrect
        };
        Self {
            result: Some(result),
            kind,
            correctness: Some(correctness),
        }
    }

    pub fn of(kind: IntersectionType) -> Self {
        Self {
            result: None,
            kind,
            correctness: None,
        }
    }

    pub fn has_intersection(&self) -> bool {
        self.kind == IntersectionType::Intersect
    }

    /// The intersection when present and sane.
    pub fn into_result(self) -> Option<T> {
        if self.kind == IntersectionType::Intersect {
            self.result
        } else {
            None
        }
    }
}

pub type IntersectionPoints<const D: usize> = ArrayVec<Point<D>, 2>;

pub fn line_plane_intersection(
    line: &InfiniteLine<3>,
    plane: &Plane,
) -> IntersectionResult<Point3> {
    let along = plane.normal().dot(line.direction());
    if along.abs() <= GLOBAL_EPSILON {
        return IntersectionResult::of(IntersectionType::Parallel);
    }
    let parameter = (plane.plane_constant() - plane.normal().dot(&line.origin().coords)) / along;
    let point = line.point_at(parameter);
    IntersectionResult::intersecting(point, point_correctness(&point, line, plane))
}

fn point_correctness(
    point: &Point3,
    line: &InfiniteLine<3>,
    plane: &Plane,
) -> CorrectnessInfo<Point3> {
    let (line_distance, on_line) = point_line_distance(point, line);
    let (plane_distance, on_plane) = point_plane_distance(point, plane);
    CorrectnessInfo {
        first: (line_distance <= GLOBAL_EPSILON, on_line),
        second: (plane_distance <= GLOBAL_EPSILON, on_plane),
    }
}

pub fn line_sphere_intersection<const D: usize>(
    line: &InfiniteLine<D>,
    sphere: &Sphere<D>,
) -> IntersectionResult<IntersectionPoints<D>> {
    let to_origin = line.origin() - sphere.origin();
    let b = to_origin.dot(line.direction());
    let c = to_origin.norm_squared() - sphere.radius() * sphere.radius();
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return IntersectionResult::of(IntersectionType::None);
    }
    let mut points = IntersectionPoints::new();
    let root = discriminant.sqrt();
    points.push(line.point_at(-b - root));
    if root > GLOBAL_EPSILON {
        points.push(line.point_at(-b + root));
    }
    let correctness = points_correctness(&points, |point| {
        point_line_distance(point, line).0 <= GLOBAL_EPSILON
    }, |point| {
        (nalgebra::distance(point, sphere.origin()) - sphere.radius()).abs() <= GLOBAL_EPSILON
    });
    IntersectionResult::intersecting(points, correctness)
}

fn points_correctness<const D: usize>(
    points: &IntersectionPoints<D>,
    on_first: impl Fn(&Point<D>) -> bool,
    on_second: impl Fn(&Point<D>) -> bool,
) -> CorrectnessInfo<IntersectionPoints<D>> {
    CorrectnessInfo {
        first: (points.iter().all(on_first), points.clone()),
        second: (points.iter().all(on_second), points.clone()),
    }
}

pub fn segment_sphere_intersection<const D: usize>(
    segment: &Segment<D>,
    sphere: &Sphere<D>,
) -> IntersectionResult<IntersectionPoints<D>> {
    let Ok(line) = InfiniteLine::from_segment(segment) else {
        return IntersectionResult::of(IntersectionType::None);
    };
    let line_result = line_sphere_intersection(&line, sphere);
    restrict_to_segment(line_result, segment)
}

fn restrict_to_segment<const D: usize>(
    line_result: IntersectionResult<IntersectionPoints<D>>,
    segment: &Segment<D>,
) -> IntersectionResult<IntersectionPoints<D>> {
    let Some(candidates) = line_result.result else {
        return IntersectionResult::of(line_result.kind);
    };
    let points: IntersectionPoints<D> = candidates
        .into_iter()
        .filter(|point| point_segment_distance(point, segment).0 <= GLOBAL_EPSILON)
        .collect();
    if points.is_empty() {
        return IntersectionResult::of(IntersectionType::None);
    }
    let correctness = line_result.correctness.map(|info| CorrectnessInfo {
        first: (info.first.0, points.clone()),
        second: (info.second.0, points.clone()),
    });
    match correctness {
        Some(info) => IntersectionResult::intersecting(points, info),
        None => IntersectionResult::of(IntersectionType::None),
    }
}

pub fn segment_plane_intersection(
    segment: &Segment<3>,
    plane: &Plane,
) -> IntersectionResult<Point3> {
    let Ok(line) = InfiniteLine::from_segment(segment) else {
        return IntersectionResult::of(IntersectionType::None);
    };
    let result = line_plane_intersection(&line, plane);
    let Some(point) = result.result else {
        return IntersectionResult::of(result.kind);
    };
    if point_segment_distance(&point, segment).0 > GLOBAL_EPSILON {
        return IntersectionResult::of(IntersectionType::None);
    }
    let (_, on_segment) = point_segment_distance(&point, segment);
    let (plane_distance, on_plane) = point_plane_distance(&point, plane);
    IntersectionResult::intersecting(
        point,
        CorrectnessInfo {
            first: (true, on_segment),
            second: (plane_distance <= GLOBAL_EPSILON, on_plane),
        },
    )
}

pub fn line_triangle_intersection(
    line: &InfiniteLine<3>,
    triangle: &Triangle<3>,
) -> IntersectionResult<Point3> {
    let Ok(plane) = triangle.plane() else {
        return IntersectionResult::of(IntersectionType::None);
    };
    let result = line_plane_intersection(line, &plane);
    let Some(point) = result.result else {
        return IntersectionResult::of(result.kind);
    };
    let (triangle_distance, on_triangle) = point_triangle_distance3d(&point, triangle);
    if triangle_distance > GLOBAL_EPSILON {
        return IntersectionResult::of(IntersectionType::None);
    }
    let (line_distance, on_line) = point_line_distance(&point, line);
    IntersectionResult::intersecting(
        point,
        CorrectnessInfo {
            first: (line_distance <= GLOBAL_EPSILON, on_line),
            second: (triangle_distance <= GLOBAL_EPSILON, on_triangle),
        },
    )
}

pub fn segment_triangle_intersection(
    segment: &Segment<3>,
    triangle: &Triangle<3>,
) -> IntersectionResult<Point3> {
    let Ok(line) = InfiniteLine::from_segment(segment) else {
        return IntersectionResult::of(IntersectionType::None);
    };
    let result = line_triangle_intersection(&line, triangle);
    let Some(point) = result.result else {
        return IntersectionResult::of(result.kind);
    };
    let (segment_distance, on_segment) = point_segment_distance(&point, segment);
    if segment_distance > GLOBAL_EPSILON {
        return IntersectionResult::of(IntersectionType::None);
    }
    let (triangle_distance, on_triangle) = point_triangle_distance3d(&point, triangle);
    IntersectionResult::intersecting(
        point,
        CorrectnessInfo {
            first: (segment_distance <= GLOBAL_EPSILON, on_segment),
            second: (triangle_distance <= GLOBAL_EPSILON, on_triangle),
        },
    )
}

pub fn line_line_intersection(
    line0: &InfiniteLine<2>,
    line1: &InfiniteLine<2>,
) -> IntersectionResult<Point2> {
    let d0 = line0.direction();
    let d1 = line1.direction();
    let determinant = d0.x * d1.y - d0.y * d1.x;
    if determinant.abs() <= GLOBAL_EPSILON {
        return IntersectionResult::of(IntersectionType::Parallel);
    }
    let between = line1.origin() - line0.origin();
    let parameter = (between.x * d1.y - between.y * d1.x) / determinant;
    let point = line0.point_at(parameter);
    let (distance0, on_line0) = point_line_distance(&point, line0);
    let (distance1, on_line1) = point_line_distance(&point, line1);
    IntersectionResult::intersecting(
        point,
        CorrectnessInfo {
            first: (distance0 <= GLOBAL_EPSILON, on_line0),
            second: (distance1 <= GLOBAL_EPSILON, on_line1),
        },
    )
}

pub fn segment_segment_intersection(
    segment0: &Segment<2>,
    segment1: &Segment<2>,
) -> IntersectionResult<Point2> {
    let (Ok(line0), Ok(line1)) = (
        InfiniteLine::from_segment(segment0),
        InfiniteLine::from_segment(segment1),
    ) else {
        return IntersectionResult::of(IntersectionType::None);
    };
    let result = line_line_intersection(&line0, &line1);
    let Some(point) = result.result else {
        return IntersectionResult::of(result.kind);
    };
    let (distance0, on_segment0) = point_segment_distance(&point, segment0);
    let (distance1, on_segment1) = point_segment_distance(&point, segment1);
    if distance0 > GLOBAL_EPSILON || distance1 > GLOBAL_EPSILON {
        return IntersectionResult::of(IntersectionType::None);
    }
    IntersectionResult::intersecting(
        point,
        CorrectnessInfo {
            first: (true, on_segment0),
            second: (true, on_segment1),
        },
    )
}

pub fn segment_line_intersection(
    segment: &Segment<2>,
    line: &InfiniteLine<2>,
) -> IntersectionResult<Point2> {
    let Ok(segment_line) = InfiniteLine::from_segment(segment) else {
        return IntersectionResult::of(IntersectionType::None);
    };
    let result = line_line_intersection(&segment_line, line);
    let Some(point) = result.result else {
        return IntersectionResult::of(result.kind);
    };
    let (segment_distance, on_segment) = point_segment_distance(&point, segment);
    if segment_distance > GLOBAL_EPSILON {
        return IntersectionResult::of(IntersectionType::None);
    }
    let (line_distance, on_line) = point_line_distance(&point, line);
    IntersectionResult::intersecting(
        point,
        CorrectnessInfo {
            first: (true, on_segment),
            second: (line_distance <= GLOBAL_EPSILON, on_line),
        },
    )
}

pub fn line_cylinder_intersection(
    line: &InfiniteLine<3>,
    cylinder: &Cylinder,
) -> IntersectionResult<IntersectionPoints<3>> {
    let Ok(axis) = InfiniteLine::from_segment(cylinder.axis()) else {
        return IntersectionResult::of(IntersectionType::None);
    };
    let axis_direction = axis.direction();
    let radial_direction = line.direction() - axis_direction * line.direction().dot(axis_direction);
    let to_base = line.origin() - cylinder.axis().p0;
    let radial_origin = to_base - axis_direction * to_base.dot(axis_direction);
    let a = radial_direction.norm_squared();
    if a <= GLOBAL_EPSILON * GLOBAL_EPSILON {
        return IntersectionResult::of(IntersectionType::Parallel);
    }
    let b = radial_direction.dot(&radial_origin);
    let c = radial_origin.norm_squared() - cylinder.radius() * cylinder.radius();
    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return IntersectionResult::of(IntersectionType::None);
    }
    let root = discriminant.sqrt();
    let height = cylinder.axis().length();
    let mut points = IntersectionPoints::new();
    for parameter in [(-b - root) / a, (-b + root) / a] {
        let point = line.point_at(parameter);
        let axial = (point - cylinder.axis().p0).dot(axis_direction);
        if (-GLOBAL_EPSILON..=height + GLOBAL_EPSILON).contains(&axial)
            && !points.iter().any(|known| known == &point)
        {
            points.push(point);
        }
    }
    if points.is_empty() {
        return IntersectionResult::of(IntersectionType::None);
    }
    let correctness = points_correctness(
        &points,
        |point| point_line_distance(point, line).0 <= GLOBAL_EPSILON,
        |point| {
            let to_point = point - cylinder.axis().p0;
            let radial = to_point - axis_direction * to_point.dot(axis_direction);
            (radial.norm() - cylinder.radius()).abs() <= GLOBAL_EPSILON
        },
    );
    IntersectionResult::intersecting(points, correctness)
}

pub fn segment_cylinder_intersection(
    segment: &Segment<3>,
    cylinder: &Cylinder,
) -> IntersectionResult<IntersectionPoints<3>> {
    let Ok(line) = InfiniteLine::from_segment(segment) else {
        return IntersectionResult::of(IntersectionType::None);
    };
    restrict_to_segment(line_cylinder_intersection(&line, cylinder), segment)
}

pub fn plane_plane_intersection(
    plane0: &Plane,
    plane1: &Plane,
) -> IntersectionResult<InfiniteLine<3>> {
    let cross = plane0.normal().cross(plane1.normal());
    if cross.norm() <= GLOBAL_EPSILON {
        return IntersectionResult::of(IntersectionType::Parallel);
    }
    let d0 = plane0.plane_constant();
    let d1 = plane1.plane_constant();
    let dot = plane0.normal().dot(plane1.normal());
    let denominator = 1.0 - dot * dot;
    let c0 = (d0 - d1 * dot) / denominator;
    let c1 = (d1 - d0 * dot) / denominator;
    let origin = Point3::from(plane0.normal() * c0 + plane1.normal() * c1);
    let Ok(line) = InfiniteLine::new(cross, origin) else {
        return IntersectionResult::of(IntersectionType::Parallel);
    };
    let on_plane0 = point_plane_distance(&origin, plane0).0 <= GLOBAL_EPSILON;
    let on_plane1 = point_plane_distance(&origin, plane1).0 <= GLOBAL_EPSILON;
    IntersectionResult::intersecting(
        line,
        CorrectnessInfo {
            first: (on_plane0, line),
            second: (on_plane1, line),
        },
    )
}

pub fn plane_circle_intersection(
    plane: &Plane,
    circle: &Circle,
) -> IntersectionResult<IntersectionPoints<3>> {
    let trace = plane_plane_intersection(plane, circle.plane());
    let Some(line) = trace.result else {
        return IntersectionResult::of(trace.kind);
    };
    let sphere = Sphere::new(*circle.plane().origin(), circle.radius());
    let result = line_sphere_intersection(&line, &sphere);
    let Some(points) = result.result else {
        return IntersectionResult::of(result.kind);
    };
    let correctness = points_correctness(
        &points,
        |point| point_plane_distance(point, plane).0 <= GLOBAL_EPSILON,
        |point| {
            point_plane_distance(point, circle.plane()).0 <= GLOBAL_EPSILON
                && (nalgebra::distance(point, circle.plane().origin()) - circle.radius()).abs()
                    <= GLOBAL_EPSILON
        },
    );
    IntersectionResult::intersecting(points, correctness)
}

pub fn triangle_circle_intersection(
    triangle: &Triangle<3>,
    circle: &Circle,
) -> IntersectionResult<IntersectionPoints<3>> {
    let Ok(plane) = triangle.plane() else {
        return IntersectionResult::of(IntersectionType::None);
    };
    let result = plane_circle_intersection(&plane, circle);
    let Some(candidates) = result.result else {
        return IntersectionResult::of(result.kind);
    };
    let points: IntersectionPoints<3> = candidates
        .into_iter()
        .filter(|point| point_triangle_distance3d(point, triangle).0 <= GLOBAL_EPSILON)
        .collect();
    if points.is_empty() {
        return IntersectionResult::of(IntersectionType::None);
    }
    let correctness = points_correctness(
        &points,
        |point| point_triangle_distance3d(point, triangle).0 <= GLOBAL_EPSILON,
        |point| {
            point_plane_distance(point, circle.plane()).0 <= GLOBAL_EPSILON
                && (nalgebra::distance(point, circle.plane().origin()) - circle.radius()).abs()
                    <= GLOBAL_EPSILON
        },
    );
    IntersectionResult::intersecting(points, correctness)
}
