use serde::{Deserialize, Serialize};

use super::MeshError;
use super::solid_mesh::{SolidMesh3, SolidMeshBuilder};
use super::surface_mesh::{SurfaceMesh, SurfaceMeshBuilder};
use crate::basic::{Index, LocalIndex};
use crate::geometry::basic_objects::{Tetrahedron, Triangle};

/// General polygonal surface; the unconstrained-arity face of
/// [`SurfaceMesh`].
pub type PolygonalSurface<const D: usize> = SurfaceMesh<D>;

/// General polyhedral solid; the unconstrained face of [`SolidMesh3`].
pub type PolyhedralSolid3 = SolidMesh3;

/// Surface mesh restricted to triangles.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TriangulatedSurface<const D: usize> {
    mesh: SurfaceMesh<D>,
}

impl<const D: usize> TriangulatedSurface<D> {
    pub fn new() -> Self {
        Self {
            mesh: SurfaceMesh::new(),
        }
    }

    pub fn nb_triangles(&self) -> usize {
        self.mesh.nb_polygons()
    }

    pub fn triangle_vertices(&self, triangle: Index) -> [Index; 3] {
        let vertices = self.mesh.polygon_vertices(triangle);
        [vertices[0], vertices[1], vertices[2]]
    }

    pub fn triangle(&self, triangle: Index) -> Triangle<D> {
        let [a, b, c] = self.triangle_vertices(triangle);
        Triangle::new(*self.mesh.point(a), *self.mesh.point(b), *self.mesh.point(c))
    }

    pub fn as_surface(&self) -> &SurfaceMesh<D> {
        &self.mesh
    }

    pub fn into_surface(self) -> SurfaceMesh<D> {
        self.mesh
    }

    pub fn vertex_attribute_manager_mut(&mut self) -> &mut crate::basic::AttributeManager {
        self.mesh.vertex_attribute_manager_mut()
    }
}

impl<const D: usize> std::ops::Deref for TriangulatedSurface<D> {
    type Target = SurfaceMesh<D>;

    fn deref(&self) -> &SurfaceMesh<D> {
        &self.mesh
    }
}

impl<const D: usize> From<TriangulatedSurface<D>> for SurfaceMesh<D> {
    fn from(surface: TriangulatedSurface<D>) -> Self {
        surface.mesh
    }
}

/// Edits a [`TriangulatedSurface`], keeping every polygon a triangle.
pub struct TriangulatedSurfaceBuilder<'a, const D: usize> {
    inner: SurfaceMeshBuilder<'a, D>,
}

impl<'a, const D: usize> TriangulatedSurfaceBuilder<'a, D> {
    pub fn new(surface: &'a mut TriangulatedSurface<D>) -> Self {
        Self {
            inner: SurfaceMeshBuilder::new(&mut surface.mesh),
        }
    }

    pub fn create_triangle(&mut self, vertices: [Index; 3]) -> Result<Index, MeshError> {
        self.inner.create_polygon(&vertices)
    }

    /// The underlying surface builder, for the operations that cannot break
    /// the triangle arity.
    pub fn as_surface_builder(&mut self) -> &mut SurfaceMeshBuilder<'a, D> {
        &mut self.inner
    }
}

/// Solid mesh restricted to tetrahedra.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TetrahedralSolid3 {
    mesh: SolidMesh3,
}

impl TetrahedralSolid3 {
    pub fn new() -> Self {
        Self {
            mesh: SolidMesh3::new(),
        }
    }

    pub fn nb_tetrahedra(&self) -> usize {
        self.mesh.nb_polyhedra()
    }

    pub fn tetrahedron_vertices(&self, tetrahedron: Index) -> [Index; 4] {
        let vertices = self.mesh.polyhedron_vertices(tetrahedron);
        [vertices[0], vertices[1], vertices[2], vertices[3]]
    }

    pub fn tetrahedron(&self, tetrahedron: Index) -> Tetrahedron {
        let [a, b, c, d] = self.tetrahedron_vertices(tetrahedron);
        Tetrahedron::new(
            *self.mesh.point(a),
            *self.mesh.point(b),
            *self.mesh.point(c),
            *self.mesh.point(d),
        )
    }

    pub fn as_solid(&self) -> &SolidMesh3 {
        &self.mesh
    }

    pub fn into_solid(self) -> SolidMesh3 {
        self.mesh
    }

    pub fn vertex_attribute_manager_mut(&mut self) -> &mut crate::basic::AttributeManager {
        self.mesh.vertex_attribute_manager_mut()
    }
}

impl std::ops::Deref for TetrahedralSolid3 {
    type Target = SolidMesh3;

    fn deref(&self) -> &SolidMesh3 {
        &self.mesh
    }
}

impl From<TetrahedralSolid3> for SolidMesh3 {
    fn from(solid: TetrahedralSolid3) -> Self {
        solid.mesh
    }
}

const TETRAHEDRON_FACETS: [[LocalIndex; 3]; 4] = [[1, 2, 3], [0, 3, 2], [0, 1, 3], [0, 2, 1]];

/// Edits a [`TetrahedralSolid3`], keeping every polyhedron a tetrahedron.
pub struct TetrahedralSolidBuilder<'a> {
    inner: SolidMeshBuilder<'a>,
}

impl<'a> TetrahedralSolidBuilder<'a> {
    pub fn new(solid: &'a mut TetrahedralSolid3) -> Self {
        Self {
            inner: SolidMeshBuilder::new(&mut solid.mesh),
        }
    }

    pub fn create_tetrahedron(&mut self, vertices: [Index; 4]) -> Result<Index, MeshError> {
        let facets: Vec<&[LocalIndex]> =
            TETRAHEDRON_FACETS.iter().map(|facet| &facet[..]).collect();
        self.inner.create_polyhedron(&vertices, &facets)
    }

    pub fn as_solid_builder(&mut self) -> &mut SolidMeshBuilder<'a> {
        &mut self.inner
    }
}

/// Cell shapes admitted by a hybrid solid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HybridCellKind {
    Tetrahedron,
    Pyramid,
    Prism,
    Hexahedron,
}

/// Outward facet tables in the canonical local numbering of each cell kind:
/// tetrahedron `0-3`; pyramid base `0-3` counterclockwise seen from the apex
/// side plus apex `4`; prism bottom `0-2` and top `3-5`; hexahedron bottom
/// `0-3` counterclockwise and top `4-7` above it.
const PYRAMID_FACETS: [&[LocalIndex]; 5] =
    [&[0, 3, 2, 1], &[0, 1, 4], &[1, 2, 4], &[2, 3, 4], &[3, 0, 4]];
const PRISM_FACETS: [&[LocalIndex]; 5] =
    [&[0, 2, 1], &[3, 4, 5], &[0, 1, 4, 3], &[1, 2, 5, 4], &[2, 0, 3, 5]];
const HEXAHEDRON_FACETS: [&[LocalIndex]; 6] = [
    &[0, 3, 2, 1],
    &[4, 5, 6, 7],
    &[0, 1, 5, 4],
    &[1, 2, 6, 5],
    &[2, 3, 7, 6],
    &[3, 0, 4, 7],
];

/// Solid mesh whose cells are tetrahedra, pyramids, prisms or hexahedra with
/// a canonical local numbering per kind.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HybridSolid3 {
    mesh: SolidMesh3,
}

impl HybridSolid3 {
    pub fn new() -> Self {
        Self {
            mesh: SolidMesh3::new(),
        }
    }

    pub fn polyhedron_kind(&self, polyhedron: Index) -> HybridCellKind {
        match self.mesh.nb_polyhedron_vertices(polyhedron) {
            4 => HybridCellKind::Tetrahedron,
            5 => HybridCellKind::Pyramid,
            6 => HybridCellKind::Prism,
            8 => HybridCellKind::Hexahedron,
            arity => unreachable!("hybrid cell with {arity} vertices"),
        }
    }

    pub fn as_solid(&self) -> &SolidMesh3 {
        &self.mesh
    }

    pub fn into_solid(self) -> SolidMesh3 {
        self.mesh
    }
}

impl std::ops::Deref for HybridSolid3 {
    type Target = SolidMesh3;

    fn deref(&self) -> &SolidMesh3 {
        &self.mesh
    }
}

impl From<HybridSolid3> for SolidMesh3 {
    fn from(solid: HybridSolid3) -> Self {
        solid.mesh
    }
}

/// Edits a [`HybridSolid3`], keeping every cell one of the standard kinds.
pub struct HybridSolidBuilder<'a> {
    inner: SolidMeshBuilder<'a>,
}

impl<'a> HybridSolidBuilder<'a> {
    pub fn new(solid: &'a mut HybridSolid3) -> Self {
        Self {
            inner: SolidMeshBuilder::new(&mut solid.mesh),
        }
    }

    pub fn create_tetrahedron(&mut self, vertices: [Index; 4]) -> Result<Index, MeshError> {
        let facets: Vec<&[LocalIndex]> =
            TETRAHEDRON_FACETS.iter().map(|facet| &facet[..]).collect();
        self.inner.create_polyhedron(&vertices, &facets)
    }

    pub fn create_pyramid(&mut self, vertices: [Index; 5]) -> Result<Index, MeshError> {
        self.inner.create_polyhedron(&vertices, &PYRAMID_FACETS)
    }

    pub fn create_prism(&mut self, vertices: [Index; 6]) -> Result<Index, MeshError> {
        self.inner.create_polyhedron(&vertices, &PRISM_FACETS)
    }

    pub fn create_hexahedron(&mut self, vertices: [Index; 8]) -> Result<Index, MeshError> {
        self.inner.create_polyhedron(&vertices, &HEXAHEDRON_FACETS)
    }

    pub fn as_solid_builder(&mut self) -> &mut SolidMeshBuilder<'a> {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::Point3;
    use approx::assert_abs_diff_eq;

    #[test]
    fn hybrid_cells_have_positive_volume() {
        let mut solid = HybridSolid3::new();
        let mut builder = HybridSolidBuilder::new(&mut solid);
        let solid_builder = builder.as_solid_builder();
        // Unit cube corners in the canonical hexahedron numbering.
        for point in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ] {
            solid_builder.create_point(point);
        }
        builder
            .create_hexahedron([0, 1, 2, 3, 4, 5, 6, 7])
            .unwrap();
        assert_eq!(solid.polyhedron_kind(0), HybridCellKind::Hexahedron);
        assert_abs_diff_eq!(solid.polyhedron_signed_volume(0), 1.0);

        let apex = builder.as_solid_builder().create_point(Point3::new(0.5, 0.5, 2.0));
        builder.create_pyramid([4, 5, 6, 7, apex]).unwrap();
        assert_eq!(solid.polyhedron_kind(1), HybridCellKind::Pyramid);
        assert_abs_diff_eq!(solid.polyhedron_signed_volume(1), 1.0 / 3.0);
    }

    #[test]
    fn prism_volume() {
        let mut solid = HybridSolid3::new();
        let mut builder = HybridSolidBuilder::new(&mut solid);
        for point in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ] {
            builder.as_solid_builder().create_point(point);
        }
        builder.create_prism([0, 1, 2, 3, 4, 5]).unwrap();
        assert_abs_diff_eq!(solid.polyhedron_signed_volume(0), 0.5);
    }

    #[test]
    fn triangulated_surface_views() {
        let mut surface = TriangulatedSurface::<3>::new();
        let mut builder = TriangulatedSurfaceBuilder::new(&mut surface);
        let inner = builder.as_surface_builder();
        inner.create_point(Point3::new(0.0, 0.0, 0.0));
        inner.create_point(Point3::new(1.0, 0.0, 0.0));
        inner.create_point(Point3::new(0.0, 1.0, 0.0));
        builder.create_triangle([0, 1, 2]).unwrap();
        assert_eq!(surface.nb_triangles(), 1);
        let triangle = surface.triangle(0);
        assert_abs_diff_eq!(
            crate::geometry::mensuration::triangle_area3d(&triangle),
            0.5
        );
    }
}
