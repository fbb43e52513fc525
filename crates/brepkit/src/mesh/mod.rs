/// Anonymous vertices with their attribute manager.
pub mod vertex_set;

/// Vertices with coordinates.
pub mod point_set;

/// Curves made of vertex-pair edges.
pub mod edged_curve;

/// Polygonal surface meshes with per-edge adjacency.
pub mod surface_mesh;

/// Deduplicated edge index derived from a surface mesh.
pub mod surface_edges;

/// Reference-counted vertex-cycle store shared by the derived sub-meshes.
pub(crate) mod facet_storage;

/// Polyhedral solid meshes with per-facet adjacency.
pub mod solid_mesh;

/// Deduplicated facet and edge indices derived from a solid mesh.
pub mod solid_facets;

/// Fixed-arity surface and solid views.
pub mod specializations;

/// Structured grids with implicit coordinates.
pub mod grid;

/// Named coordinate frames carried by a mesh.
pub mod crs;

/// Canonical vertex tuples identifying facets and edges independently of
/// traversal.
pub mod vertex_cycle;

/// Mesh-to-mesh algorithms: conversion, merge, split, distance fields.
pub mod helpers;

pub use self::helpers::MergeOrigin;

pub use self::crs::CoordinateReferenceSystemManager;
pub use self::edged_curve::{EdgeVertex, EdgedCurve, EdgedCurveBuilder};
pub use self::grid::{CellIndices, Grid, LightRegularGrid, RegularGrid};
pub use self::point_set::{PointSet, PointSetBuilder};
pub use self::solid_facets::{SolidEdges, SolidFacets};
pub use self::solid_mesh::{
    PolyhedronFacet, PolyhedronFacetVertex, PolyhedronVertex, SolidMesh3, SolidMeshBuilder,
};
pub use self::specializations::{
    HybridCellKind, HybridSolid3, HybridSolidBuilder, PolygonalSurface, PolyhedralSolid3,
    TetrahedralSolid3, TetrahedralSolidBuilder, TriangulatedSurface, TriangulatedSurfaceBuilder,
};
pub use self::surface_edges::SurfaceEdges;
pub use self::surface_mesh::{PolygonEdge, PolygonVertex, SurfaceMesh, SurfaceMeshBuilder};
pub use self::vertex_cycle::VertexCycle;
pub use self::vertex_set::{VertexSet, VertexSetBuilder};

use thiserror::Error;

use crate::basic::{AttributeError, Index};

#[derive(Error, Debug)]
pub enum MeshError {
    #[error("index {index} is out of range (size {size})")]
    OutOfRange { index: Index, size: usize },
    #[error("invalid reference: {0}")]
    InvalidReference(String),
    #[error("expected {expected} entries, got {got}")]
    SizeMismatch { expected: usize, got: usize },
    #[error("degenerate {0}")]
    DegenerateGeometry(&'static str),
    #[error("unsupported mesh conversion: {0}")]
    IncompatibleMeshType(String),
    #[error("non-manifold configuration around {0}")]
    NonManifold(String),
    #[error(transparent)]
    Attribute(#[from] AttributeError),
}
