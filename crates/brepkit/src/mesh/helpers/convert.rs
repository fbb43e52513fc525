use rustc_hash::FxHashSet;

use crate::basic::{Index, LocalIndex};
use crate::geometry::basic_objects::Tetrahedron;
use crate::geometry::mensuration::tetrahedron_signed_volume;
use crate::mesh::MeshError;
use crate::mesh::grid::{CellIndices, Grid, RegularGrid};
use crate::mesh::solid_mesh::SolidMesh3;
use crate::mesh::specializations::{
    HybridSolid3, HybridSolidBuilder, PolygonalSurface, PolyhedralSolid3, TetrahedralSolid3,
    TetrahedralSolidBuilder, TriangulatedSurface, TriangulatedSurfaceBuilder,
};
use crate::mesh::surface_mesh::SurfaceMesh;

/// Rebuilds a surface as triangles, fanning every polygon from its first
/// vertex.
pub fn convert_surface_to_triangulated<const D: usize>(
    surface: &SurfaceMesh<D>,
) -> Result<TriangulatedSurface<D>, MeshError> {
    let mut triangulated = TriangulatedSurface::new();
    let mut builder = TriangulatedSurfaceBuilder::new(&mut triangulated);
    for &point in surface.points() {
        builder.as_surface_builder().create_point(point);
    }
    for polygon in 0..surface.nb_polygons() as Index {
        let vertices = surface.polygon_vertices(polygon);
        for fan in 1..vertices.len() - 1 {
            builder.create_triangle([vertices[0], vertices[fan], vertices[fan + 1]])?;
        }
    }
    builder.as_surface_builder().compute_polygon_adjacencies();
    Ok(triangulated)
}

/// Repackages a triangulated surface as a general polygonal one.
pub fn convert_surface_to_polygonal<const D: usize>(
    surface: &TriangulatedSurface<D>,
) -> PolygonalSurface<D> {
    surface.as_surface().clone()
}

/// Reinterprets a solid as tetrahedral; fails on any non-tetrahedral cell.
pub fn convert_solid_to_tetrahedral(solid: &SolidMesh3) -> Result<TetrahedralSolid3, MeshError> {
    for polyhedron in 0..solid.nb_polyhedra() as Index {
        if solid.nb_polyhedron_vertices(polyhedron) != 4 {
            return Err(MeshError::IncompatibleMeshType(format!(
                "polyhedron {polyhedron} has {} vertices",
                solid.nb_polyhedron_vertices(polyhedron)
            )));
        }
    }
    let mut tetrahedral = TetrahedralSolid3::new();
    let mut builder = TetrahedralSolidBuilder::new(&mut tetrahedral);
    for &point in solid.points() {
        builder.as_solid_builder().create_point(point);
    }
    for polyhedron in 0..solid.nb_polyhedra() as Index {
        let vertices = solid.polyhedron_vertices(polyhedron);
        builder.create_tetrahedron([vertices[0], vertices[1], vertices[2], vertices[3]])?;
    }
    builder.as_solid_builder().compute_polyhedron_adjacencies();
    Ok(tetrahedral)
}

/// Repackages a tetrahedral solid as a general polyhedral one.
pub fn convert_solid_to_polyhedral(solid: &TetrahedralSolid3) -> PolyhedralSolid3 {
    solid.as_solid().clone()
}

/// Corner vertex ids of a grid cell, in binary order (first axis lowest bit).
fn cell_corners(grid: &RegularGrid<3>, cell: CellIndices<3>) -> [Index; 8] {
    let corners = grid.cell_vertex_indices(cell);
    let mut ids = [0 as Index; 8];
    for (corner, indices) in corners.into_iter().enumerate() {
        ids[corner] = grid.vertex_index(indices);
    }
    ids
}

/// Explodes a grid into one hexahedron per cell.
pub fn convert_grid_to_hybrid(grid: &RegularGrid<3>) -> Result<HybridSolid3, MeshError> {
    let mut hybrid = HybridSolid3::new();
    let mut builder = HybridSolidBuilder::new(&mut hybrid);
    for vertex in 0..grid.nb_grid_vertices() as Index {
        let point = grid.grid_point(grid.vertex_indices(vertex));
        builder.as_solid_builder().create_point(point);
    }
    for cell in 0..grid.nb_cells() as Index {
        let [c0, c1, c2, c3, c4, c5, c6, c7] = cell_corners(grid, grid.cell_indices(cell));
        // The canonical hexahedron walks the bottom loop then the top one.
        builder.create_hexahedron([c0, c1, c3, c2, c4, c5, c7, c6])?;
    }
    builder.as_solid_builder().compute_polyhedron_adjacencies();
    Ok(hybrid)
}

/// Six positive tetrahedra per cell around the main cell diagonal; the
/// pattern tiles the grid so that the facet diagonals of neighbouring cells
/// coincide.
const CELL_TETRAHEDRA: [[usize; 4]; 6] = [
    [0, 1, 3, 7],
    [0, 3, 2, 7],
    [0, 2, 6, 7],
    [0, 6, 4, 7],
    [0, 4, 5, 7],
    [0, 5, 1, 7],
];

/// Explodes a grid into six tetrahedra per cell.
pub fn convert_grid_to_tetrahedral(grid: &RegularGrid<3>) -> Result<TetrahedralSolid3, MeshError> {
    convert_grid_to_densified_tetrahedral(grid, &[])
}

/// Explodes a grid into tetrahedra, splitting each cell of `densified` into
/// twelve tetrahedra around a Steiner vertex at the cell center instead of
/// the regular six.
pub fn convert_grid_to_densified_tetrahedral(
    grid: &RegularGrid<3>,
    densified: &[CellIndices<3>],
) -> Result<TetrahedralSolid3, MeshError> {
    let densified: FxHashSet<Index> = densified
        .iter()
        .map(|&indices| grid.cell_index(indices))
        .collect();
    let mut tetrahedral = TetrahedralSolid3::new();
    let mut builder = TetrahedralSolidBuilder::new(&mut tetrahedral);
    for vertex in 0..grid.nb_grid_vertices() as Index {
        let point = grid.grid_point(grid.vertex_indices(vertex));
        builder.as_solid_builder().create_point(point);
    }
    for cell in 0..grid.nb_cells() as Index {
        let corners = cell_corners(grid, grid.cell_indices(cell));
        if densified.contains(&cell) {
            let barycenter = grid.cell_barycenter(cell);
            let center = builder.as_solid_builder().create_point(barycenter);
            for mut triangle in cell_boundary_triangles(&corners) {
                let volume = tetrahedron_signed_volume(&Tetrahedron::new(
                    grid.grid_point(grid.vertex_indices(triangle[0])),
                    grid.grid_point(grid.vertex_indices(triangle[1])),
                    grid.grid_point(grid.vertex_indices(triangle[2])),
                    barycenter,
                ));
                if volume < 0.0 {
                    triangle.swap(1, 2);
                }
                builder.create_tetrahedron([triangle[0], triangle[1], triangle[2], center])?;
            }
        } else {
            for tetrahedron in &CELL_TETRAHEDRA {
                builder.create_tetrahedron([
                    corners[tetrahedron[0]],
                    corners[tetrahedron[1]],
                    corners[tetrahedron[2]],
                    corners[tetrahedron[3]],
                ])?;
            }
        }
    }
    builder.as_solid_builder().compute_polyhedron_adjacencies();
    Ok(tetrahedral)
}

/// The twelve boundary triangles of the six-tetrahedra cell pattern: each
/// face splits along its min-corner to max-corner diagonal.
fn cell_boundary_triangles(corners: &[Index; 8]) -> Vec<[Index; 3]> {
    const FACES: [[usize; 4]; 6] = [
        [0, 1, 2, 3],
        [4, 5, 6, 7],
        [0, 1, 4, 5],
        [2, 3, 6, 7],
        [0, 2, 4, 6],
        [1, 3, 5, 7],
    ];
    let mut triangles = Vec::with_capacity(12);
    for face in FACES {
        let diagonal_min = face[0];
        let diagonal_max = face[3];
        for &other in &face[1..3] {
            triangles.push([
                corners[diagonal_min],
                corners[other],
                corners[diagonal_max],
            ]);
        }
    }
    triangles
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::{Point2, Point3};
    use crate::mesh::surface_mesh::SurfaceMeshBuilder;
    use approx::assert_abs_diff_eq;

    #[test]
    fn quads_triangulate_by_fan() {
        let mut surface = SurfaceMesh::<2>::new();
        let mut builder = SurfaceMeshBuilder::new(&mut surface);
        builder.create_point(Point2::new(0.0, 0.0));
        builder.create_point(Point2::new(1.0, 0.0));
        builder.create_point(Point2::new(1.0, 1.0));
        builder.create_point(Point2::new(0.0, 1.0));
        builder.create_polygon(&[0, 1, 2, 3]).unwrap();
        let triangulated = convert_surface_to_triangulated(&surface).unwrap();
        assert_eq!(triangulated.nb_triangles(), 2);
        assert_abs_diff_eq!(triangulated.as_surface().area(), 1.0);
    }

    #[test]
    fn grid_explodes_into_six_positive_tets_per_cell() {
        let grid = RegularGrid::new(Point3::origin(), [2, 1, 1], [1.0, 1.0, 1.0]);
        let solid = convert_grid_to_tetrahedral(&grid).unwrap();
        assert_eq!(solid.nb_tetrahedra(), 12);
        let mut volume = 0.0;
        for tetrahedron in 0..solid.nb_tetrahedra() as Index {
            let signed = solid.polyhedron_signed_volume(tetrahedron);
            assert!(signed > 0.0, "tetrahedron {tetrahedron} is inverted");
            volume += signed;
        }
        assert_abs_diff_eq!(volume, 2.0, epsilon = 1e-12);
        // Facets across the shared grid face match up.
        let mut interior = 0;
        for tetrahedron in 0..solid.nb_tetrahedra() as Index {
            for facet_id in 0..4u8 {
                let facet = crate::mesh::solid_mesh::PolyhedronFacet::new(tetrahedron, facet_id);
                if !solid.is_polyhedron_facet_on_border(facet) {
                    interior += 1;
                }
            }
        }
        // 12 tets x 4 facets; border facets are the 2 triangles on each of the
        // 10 outer grid faces.
        assert_eq!(interior, 12 * 4 - 20);
    }

    #[test]
    fn densified_cells_use_a_steiner_point() {
        let grid = RegularGrid::new(Point3::origin(), [1, 1, 1], [1.0, 1.0, 1.0]);
        let solid = convert_grid_to_densified_tetrahedral(&grid, &[[0, 0, 0]]).unwrap();
        assert_eq!(solid.nb_tetrahedra(), 12);
        assert_eq!(solid.nb_vertices(), 9);
        let volume: f64 = (0..12)
            .map(|tetrahedron| solid.polyhedron_signed_volume(tetrahedron))
            .sum();
        assert_abs_diff_eq!(volume, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn hybrid_conversion_keeps_cell_volumes() {
        let grid = RegularGrid::new(Point3::origin(), [2, 2, 1], [0.5, 0.5, 2.0]);
        let hybrid = convert_grid_to_hybrid(&grid).unwrap();
        assert_eq!(hybrid.nb_polyhedra(), 4);
        for cell in 0..4 {
            assert_abs_diff_eq!(hybrid.polyhedron_signed_volume(cell), 0.5);
        }
    }

    #[test]
    fn non_tetrahedral_solids_do_not_convert() {
        let grid = RegularGrid::new(Point3::origin(), [1, 1, 1], [1.0, 1.0, 1.0]);
        let hybrid = convert_grid_to_hybrid(&grid).unwrap();
        assert!(matches!(
            convert_solid_to_tetrahedral(hybrid.as_solid()),
            Err(MeshError::IncompatibleMeshType(_))
        ));
    }
}
