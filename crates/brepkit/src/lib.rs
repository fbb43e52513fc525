/// Identifiers, element indices and the per-element attribute system.
pub mod basic;

/// Geometric primitives, measures and spatial search structures.
pub mod geometry;

/// Point sets, curves, surface and solid meshes, grids, and their builders.
pub mod mesh;

/// Boundary-representation models: components, relationships and unique
/// vertices.
pub mod model;

/// Versioned persistence for meshes and models.
pub mod io;

#[cfg(test)]
pub mod mesh_examples;

pub mod prelude {
    pub use crate::basic::{
        AttributeManager, AttributeProperties, Index, LocalIndex, NO_ID, NO_LID,
    };
    pub use crate::geometry::{
        AabbTree, BoundingBox, GLOBAL_EPSILON, NnSearch, Point, Point2, Point3, Vector, Vector2,
        Vector3,
    };
    pub use crate::mesh::{
        EdgedCurve, EdgedCurveBuilder, Grid, HybridSolid3, LightRegularGrid, PointSet,
        PointSetBuilder, PolygonalSurface, PolyhedralSolid3, RegularGrid, SolidMesh3,
        SolidMeshBuilder, SurfaceMesh, SurfaceMeshBuilder, TetrahedralSolid3,
        TriangulatedSurface, VertexSet,
    };
    pub use crate::model::{
        BRep, BRepBuilder, ComponentId, ComponentType, Relationships, Section, SectionBuilder,
        VertexIdentifier,
    };
}
