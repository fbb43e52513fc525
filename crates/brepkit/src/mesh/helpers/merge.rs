use rustc_hash::FxHashMap;

use crate::basic::{Index, LocalIndex, NO_ID};
use crate::geometry::nn_search::NnSearch;
use crate::geometry::point::{GLOBAL_EPSILON, Point};
use crate::mesh::MeshError;
use crate::mesh::edged_curve::{EdgedCurve, EdgedCurveBuilder};
use crate::mesh::point_set::{PointSet, PointSetBuilder};
use crate::mesh::solid_mesh::{PolyhedronFacet, SolidMesh3, SolidMeshBuilder};
use crate::mesh::surface_mesh::{SurfaceMesh, SurfaceMeshBuilder};
use crate::mesh::vertex_cycle::VertexCycle;

/// Where a merged element comes from: input mesh ordinal and element index
/// there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeOrigin {
    pub mesh: usize,
    pub element: Index,
}

impl MergeOrigin {
    fn new(mesh: usize, element: Index) -> Self {
        Self { mesh, element }
    }
}

/// Shared first stage of every merger: colocate the concatenated input
/// points and number the unique vertices.
struct MergedVertices<const D: usize> {
    unique_points: Vec<Point<D>>,
    /// Per input mesh, old vertex index -> merged vertex index.
    vertices_maps: Vec<Vec<Index>>,
    vertex_origins: Vec<Vec<MergeOrigin>>,
}

fn merge_vertices<const D: usize>(
    point_sets: &[&[Point<D>]],
    epsilon: f64,
) -> MergedVertices<D> {
    let total: usize = point_sets.iter().map(|points| points.len()).sum();
    let mut all_points = Vec::with_capacity(total);
    for points in point_sets {
        all_points.extend_from_slice(points);
    }
    let colocated = NnSearch::new(all_points).colocated_index_mapping(epsilon);
    let mut vertices_maps = Vec::with_capacity(point_sets.len());
    let mut vertex_origins = vec![Vec::new(); colocated.nb_unique_points()];
    let mut offset = 0;
    for (mesh, points) in point_sets.iter().enumerate() {
        let map: Vec<Index> = (0..points.len())
            .map(|vertex| colocated.colocated_mapping[offset + vertex])
            .collect();
        for (vertex, &unique) in map.iter().enumerate() {
            vertex_origins[unique as usize].push(MergeOrigin::new(mesh, vertex as Index));
        }
        vertices_maps.push(map);
        offset += points.len();
    }
    MergedVertices {
        unique_points: colocated.unique_points,
        vertices_maps,
        vertex_origins,
    }
}

pub struct PointSetMergeResult<const D: usize> {
    pub point_set: PointSet<D>,
    pub vertices_maps: Vec<Vec<Index>>,
    pub vertex_origins: Vec<Vec<MergeOrigin>>,
}

/// Merges point sets, collapsing vertices within `epsilon` (pass
/// [`GLOBAL_EPSILON`] unless a looser tolerance is wanted).
pub fn merge_point_sets<const D: usize>(
    inputs: &[&PointSet<D>],
    epsilon: f64,
) -> PointSetMergeResult<D> {
    let point_slices: Vec<&[Point<D>]> = inputs.iter().map(|input| input.points()).collect();
    let merged = merge_vertices(&point_slices, epsilon);
    let mut point_set = PointSet::new();
    let mut builder = PointSetBuilder::new(&mut point_set);
    for point in &merged.unique_points {
        builder.create_point(*point);
    }
    PointSetMergeResult {
        point_set,
        vertices_maps: merged.vertices_maps,
        vertex_origins: merged.vertex_origins,
    }
}

pub struct EdgedCurveMergeResult<const D: usize> {
    pub curve: EdgedCurve<D>,
    pub vertices_maps: Vec<Vec<Index>>,
    pub vertex_origins: Vec<Vec<MergeOrigin>>,
    pub edge_origins: Vec<Vec<MergeOrigin>>,
}

/// Merges curves; colocated endpoints collapse, duplicated edges appear once
/// and edges whose endpoints merged together are dropped.
pub fn merge_edged_curves<const D: usize>(
    inputs: &[&EdgedCurve<D>],
    epsilon: f64,
) -> Result<EdgedCurveMergeResult<D>, MeshError> {
    let point_slices: Vec<&[Point<D>]> = inputs.iter().map(|input| input.points()).collect();
    let merged = merge_vertices(&point_slices, epsilon);
    let mut curve = EdgedCurve::new();
    let mut builder = EdgedCurveBuilder::new(&mut curve);
    for point in &merged.unique_points {
        builder.create_point(*point);
    }
    let mut known: FxHashMap<VertexCycle, Index> = FxHashMap::default();
    let mut edge_origins: Vec<Vec<MergeOrigin>> = Vec::new();
    for (mesh, input) in inputs.iter().enumerate() {
        let map = &merged.vertices_maps[mesh];
        for edge in 0..input.nb_edges() as Index {
            let [v0, v1] = input.edge_vertices(edge);
            let (m0, m1) = (map[v0 as usize], map[v1 as usize]);
            if m0 == m1 {
                // The whole edge collapsed onto one vertex.
                continue;
            }
            let cycle = VertexCycle::from([m0, m1]);
            let origin = MergeOrigin::new(mesh, edge);
            match known.get(&cycle) {
                Some(&existing) => edge_origins[existing as usize].push(origin),
                None => {
                    let created = builder.create_edge(m0, m1)?;
                    known.insert(cycle, created);
                    edge_origins.push(vec![origin]);
                }
            }
        }
    }
    Ok(EdgedCurveMergeResult {
        curve,
        vertices_maps: merged.vertices_maps,
        vertex_origins: merged.vertex_origins,
        edge_origins,
    })
}

pub struct SurfaceMergeResult<const D: usize> {
    pub surface: SurfaceMesh<D>,
    pub vertices_maps: Vec<Vec<Index>>,
    pub vertex_origins: Vec<Vec<MergeOrigin>>,
    pub polygon_origins: Vec<Vec<MergeOrigin>>,
}

/// Merges surfaces; duplicated polygons (same vertex cycle) appear once and
/// adjacencies are recomputed on the union.
pub fn merge_surface_meshes<const D: usize>(
    inputs: &[&SurfaceMesh<D>],
    epsilon: f64,
) -> Result<SurfaceMergeResult<D>, MeshError> {
    let point_slices: Vec<&[Point<D>]> = inputs.iter().map(|input| input.points()).collect();
    let merged = merge_vertices(&point_slices, epsilon);
    let mut surface = SurfaceMesh::new();
    let mut builder = SurfaceMeshBuilder::new(&mut surface);
    for point in &merged.unique_points {
        builder.create_point(*point);
    }
    let mut known: FxHashMap<VertexCycle, Index> = FxHashMap::default();
    let mut polygon_origins: Vec<Vec<MergeOrigin>> = Vec::new();
    for (mesh, input) in inputs.iter().enumerate() {
        let map = &merged.vertices_maps[mesh];
        for polygon in 0..input.nb_polygons() as Index {
            let vertices: Vec<Index> = input
                .polygon_vertices(polygon)
                .iter()
                .map(|&vertex| map[vertex as usize])
                .collect();
            let origin = MergeOrigin::new(mesh, polygon);
            let cycle = VertexCycle::new(vertices.as_slice());
            match known.get(&cycle) {
                Some(&existing) => polygon_origins[existing as usize].push(origin),
                None => {
                    let created = builder.create_polygon(&vertices)?;
                    known.insert(cycle, created);
                    polygon_origins.push(vec![origin]);
                }
            }
        }
    }
    builder.compute_polygon_adjacencies();
    Ok(SurfaceMergeResult {
        surface,
        vertices_maps: merged.vertices_maps,
        vertex_origins: merged.vertex_origins,
        polygon_origins,
    })
}

pub struct SolidMergeResult {
    pub solid: SolidMesh3,
    pub vertices_maps: Vec<Vec<Index>>,
    pub vertex_origins: Vec<Vec<MergeOrigin>>,
    pub polyhedron_origins: Vec<Vec<MergeOrigin>>,
}

/// Merges solids; duplicated polyhedra (same vertex set) appear once and
/// adjacencies are recomputed on the union.
pub fn merge_solid_meshes(
    inputs: &[&SolidMesh3],
    epsilon: f64,
) -> Result<SolidMergeResult, MeshError> {
    let point_slices: Vec<&[Point<3>]> = inputs.iter().map(|input| input.points()).collect();
    let merged = merge_vertices(&point_slices, epsilon);
    let mut solid = SolidMesh3::new();
    let mut builder = SolidMeshBuilder::new(&mut solid);
    for point in &merged.unique_points {
        builder.create_point(*point);
    }
    let mut known: FxHashMap<VertexCycle, Index> = FxHashMap::default();
    let mut polyhedron_origins: Vec<Vec<MergeOrigin>> = Vec::new();
    for (mesh, input) in inputs.iter().enumerate() {
        let map = &merged.vertices_maps[mesh];
        for polyhedron in 0..input.nb_polyhedra() as Index {
            let vertices: Vec<Index> = input
                .polyhedron_vertices(polyhedron)
                .iter()
                .map(|&vertex| map[vertex as usize])
                .collect();
            let origin = MergeOrigin::new(mesh, polyhedron);
            let cycle = VertexCycle::new(vertices.as_slice());
            match known.get(&cycle) {
                Some(&existing) => polyhedron_origins[existing as usize].push(origin),
                None => {
                    let facets: Vec<Vec<LocalIndex>> = (0..input
                        .nb_polyhedron_facets(polyhedron))
                        .map(|facet_id| {
                            input
                                .polyhedron_facet_locals(PolyhedronFacet::new(
                                    polyhedron,
                                    facet_id as LocalIndex,
                                ))
                                .to_vec()
                        })
                        .collect();
                    let facet_refs: Vec<&[LocalIndex]> =
                        facets.iter().map(|facet| facet.as_slice()).collect();
                    let created = builder.create_polyhedron(&vertices, &facet_refs)?;
                    known.insert(cycle, created);
                    polyhedron_origins.push(vec![origin]);
                }
            }
        }
    }
    builder.compute_polyhedron_adjacencies();
    Ok(SolidMergeResult {
        solid,
        vertices_maps: merged.vertices_maps,
        vertex_origins: merged.vertex_origins,
        polyhedron_origins,
    })
}

/// Default merge tolerance.
pub fn merge_epsilon() -> f64 {
    GLOBAL_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::Point2;
    use crate::mesh::surface_mesh::SurfaceMeshBuilder;

    fn strip(points: &[Point2], triangles: &[[Index; 3]]) -> SurfaceMesh<2> {
        let mut mesh = SurfaceMesh::new();
        let mut builder = SurfaceMeshBuilder::new(&mut mesh);
        for &point in points {
            builder.create_point(point);
        }
        for triangle in triangles {
            builder.create_polygon(triangle).unwrap();
        }
        builder.compute_polygon_adjacencies();
        mesh
    }

    #[test]
    fn overlapping_strips_merge_shared_triangles_once() {
        // Two 3-triangle pieces of one triangulated 2x3 point grid,
        // overlapping on two triangles.
        let left = strip(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
                Point2::new(1.0, 1.0),
                Point2::new(2.0, 1.0),
            ],
            &[[0, 1, 3], [0, 3, 2], [1, 4, 3]],
        );
        let right = strip(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(2.0, 1.0),
            ],
            &[[1, 2, 4], [1, 4, 3], [0, 1, 3]],
        );
        let result = merge_surface_meshes(&[&left, &right], merge_epsilon()).unwrap();
        assert_eq!(result.surface.nb_vertices(), 6);
        assert_eq!(result.surface.nb_polygons(), 4);
        let shared: Vec<_> = result
            .polygon_origins
            .iter()
            .filter(|origins| origins.len() == 2)
            .collect();
        assert_eq!(shared.len(), 2);
        assert_eq!(shared[0][0].mesh, 0);
        assert_eq!(shared[0][1].mesh, 1);
    }

    #[test]
    fn curve_merge_drops_collapsed_edges() {
        let mut curve0 = EdgedCurve::<2>::new();
        let mut builder = EdgedCurveBuilder::new(&mut curve0);
        let a = builder.create_point(Point2::new(0.0, 0.0));
        let b = builder.create_point(Point2::new(1.0, 0.0));
        builder.create_edge(a, b).unwrap();

        let mut curve1 = EdgedCurve::<2>::new();
        let mut builder = EdgedCurveBuilder::new(&mut curve1);
        let a = builder.create_point(Point2::new(1.0, 0.0));
        // Both endpoints colocate with curve0's second point.
        let b = builder.create_point(Point2::new(1.0, GLOBAL_EPSILON / 10.0));
        let c = builder.create_point(Point2::new(2.0, 0.0));
        builder.create_edge(a, b).unwrap();
        builder.create_edge(b, c).unwrap();

        let result = merge_edged_curves(&[&curve0, &curve1], merge_epsilon()).unwrap();
        assert_eq!(result.curve.nb_vertices(), 3);
        assert_eq!(result.curve.nb_edges(), 2);
        assert_eq!(result.edge_origins.len(), 2);
    }

    #[test]
    fn merging_a_mesh_with_itself_is_isomorphic() {
        let mesh = strip(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
            ],
            &[[0, 1, 2]],
        );
        let result = merge_surface_meshes(&[&mesh, &mesh], merge_epsilon()).unwrap();
        assert_eq!(result.surface.nb_vertices(), mesh.nb_vertices());
        assert_eq!(result.surface.nb_polygons(), mesh.nb_polygons());
    }
}
