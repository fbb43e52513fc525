/// Rebuilding a mesh as another kind: triangulating, tetrahedralizing,
/// exploding grids.
pub mod convert;

/// Merging meshes with vertex colocation and element deduplication.
pub mod merge;

/// Duplicating vertices to disconnect a solid across a facet set.
pub mod split;

/// Collapsing colocated vertices of a single mesh.
pub mod remove_duplication;

/// Distance fields on structured grids.
pub mod euclidean_distance_transform;

/// Interpolating values stored at grid or simplex vertices.
pub mod grid_function;

pub use self::convert::{
    convert_grid_to_densified_tetrahedral, convert_grid_to_hybrid, convert_grid_to_tetrahedral,
    convert_solid_to_polyhedral, convert_solid_to_tetrahedral, convert_surface_to_polygonal,
    convert_surface_to_triangulated,
};
pub use self::euclidean_distance_transform::{
    approximated_euclidean_distance_transform, euclidean_distance_transform,
    euclidean_squared_distance_transform,
};
pub use self::grid_function::{
    RegularGridPointFunction, RegularGridScalarFunction, TetrahedralSolidPointFunction,
    TriangulatedSurfacePointFunction,
};
pub use self::merge::{
    EdgedCurveMergeResult, MergeOrigin, PointSetMergeResult, SolidMergeResult,
    SurfaceMergeResult, merge_edged_curves, merge_point_sets, merge_solid_meshes,
    merge_surface_meshes,
};
pub use self::remove_duplication::{
    remove_solid_vertex_duplication, remove_surface_vertex_duplication,
};
pub use self::split::split_along_solid_facets;
