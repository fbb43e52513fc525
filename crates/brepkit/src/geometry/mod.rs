/// Points, vectors and the library-wide tolerance.
pub mod point;

/// Axis-aligned boxes.
pub mod bounding_box;

/// Value-type geometric primitives (segments, triangles, planes, ...).
pub mod basic_objects;

/// Exact-predicate orientation and containment tests.
pub mod position;

/// Distances and closest points between primitives.
pub mod distance;

/// Pairwise intersection constructions with correctness tracking.
pub mod intersection;

/// Areas and volumes.
pub mod mensuration;

/// Determinant and inverse with explicit failure on singular matrices.
pub mod square_matrix;

/// Coordinate sort along Morton curves.
pub mod points_sort;

/// Axis-aligned bounding-box tree over a fixed element set.
pub mod aabb;

/// Nearest-neighbour search and colocation mapping.
pub mod nn_search;

pub use self::aabb::AabbTree;
pub use self::basic_objects::{
    Circle, Cylinder, InfiniteLine, Plane, Ray, Segment, Sphere, Tetrahedron, Triangle,
};
pub use self::bounding_box::BoundingBox;
pub use self::intersection::{CorrectnessInfo, IntersectionResult, IntersectionType};
pub use self::nn_search::{ColocatedInfo, NnSearch};
pub use self::point::{GLOBAL_EPSILON, Point, Point2, Point3, Vector, Vector2, Vector3};
pub use self::position::Side;
pub use self::square_matrix::SquareMatrix;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("degenerate {0}: extent below tolerance")]
    Degenerate(&'static str),
    #[error("matrix is singular")]
    SingularMatrix,
}
