/// Unique-vertex views of component-mesh elements and their inverses.
pub mod component_mesh_queries;

/// Ordering surfaces radially around a line.
pub mod radial_sort;

/// Lengths, areas and volumes of components.
pub mod mensuration;

/// Bounding-box trees over component meshes and whole models.
pub mod aabb;

/// Disconnecting block meshes along internal or boundary surfaces.
pub mod cut;

pub use self::aabb::{
    ModelAabbTree, create_block_meshes_aabb_trees, create_brep_aabb_tree,
    create_section_aabb_tree, create_surface_meshes_aabb_trees,
};
pub use self::component_mesh_queries::{
    block_vertices_from_surface_polygon, component_mesh_edge_unique_vertices,
    component_mesh_edges, component_mesh_polygon_unique_vertices, component_mesh_polygons,
    component_mesh_polyhedron_facets,
};
pub use self::cut::{cut_along_internal_surfaces, split_along_block_mesh_borders};
pub use self::mensuration::{block_volume, line_length, surface_area};
pub use self::radial_sort::{SortedSurfaces, SurfaceSide, surface_radial_sort};
