use brepkit::basic::{Index, LocalIndex, NO_ID};
use brepkit::geometry::basic_objects::Tetrahedron;
use brepkit::geometry::point::{Point2, Point3};
use brepkit::geometry::GLOBAL_EPSILON;
use brepkit::mesh::helpers::merge::{merge_epsilon, merge_surface_meshes};
use brepkit::mesh::helpers::remove_duplication::remove_solid_vertex_duplication;
use brepkit::mesh::helpers::split::split_along_solid_facets;
use brepkit::mesh::solid_mesh::{PolyhedronFacet, SolidMesh3, SolidMeshBuilder};
use brepkit::mesh::surface_mesh::{PolygonEdge, SurfaceMesh, SurfaceMeshBuilder};

fn triangulated_pair() -> SurfaceMesh<2> {
    let mut mesh = SurfaceMesh::new();
    let mut builder = SurfaceMeshBuilder::new(&mut mesh);
    builder.create_point(Point2::new(0.0, 0.0));
    builder.create_point(Point2::new(1.0, 0.0));
    builder.create_point(Point2::new(0.0, 1.0));
    builder.create_point(Point2::new(1.0, -1.0));
    builder.create_polygon(&[0, 1, 2]).unwrap();
    builder.create_polygon(&[0, 3, 1]).unwrap();
    builder.compute_polygon_adjacencies();
    mesh
}

#[test]
fn triangulated_surface_edits() {
    let mut mesh = triangulated_pair();
    assert_eq!(mesh.polygon_adjacent(PolygonEdge::new(0, 0)), 1);
    assert_eq!(mesh.polygon_adjacent(PolygonEdge::new(1, 2)), 0);

    // Rename vertex 0 to 3 everywhere, then drop the isolated vertex.
    let mut builder = SurfaceMeshBuilder::new(&mut mesh);
    builder.replace_vertex(0, 3).unwrap();
    assert_eq!(mesh.polygon_vertices(0), &[3, 1, 2]);
    assert_eq!(mesh.polygon_vertices(1), &[3, 3, 1]);
    let mut builder = SurfaceMeshBuilder::new(&mut mesh);
    let mapping = builder.delete_isolated_vertices().unwrap();
    assert_eq!(mapping[0], NO_ID);
    assert_eq!(mesh.nb_vertices(), 3);
}

#[test]
fn reverse_index_stays_valid_under_edits() {
    let mut mesh = triangulated_pair();
    for vertex in 0..mesh.nb_vertices() as Index {
        for &around in mesh.polygons_around_vertex(vertex) {
            assert_eq!(mesh.polygon_vertex(around), vertex);
        }
    }
    let mut builder = SurfaceMeshBuilder::new(&mut mesh);
    builder.delete_polygons(&[true, false]).unwrap();
    for vertex in [0, 1, 3] {
        for &around in mesh.polygons_around_vertex(vertex) {
            assert_eq!(mesh.polygon_vertex(around), vertex);
            assert_eq!(around.polygon, 0);
        }
    }
    assert!(mesh.polygons_around_vertex(2).is_empty());
}

fn tetrahedron_facet_refs() -> Vec<Vec<LocalIndex>> {
    Tetrahedron::FACET_VERTICES
        .iter()
        .map(|facet| facet.iter().map(|&local| local as LocalIndex).collect())
        .collect()
}

#[test]
fn disjoint_tets_rebuild_their_shared_face() {
    // Two tetrahedra sharing a face geometrically but built with disjoint
    // vertex sets.
    let mut solid = SolidMesh3::new();
    let mut builder = SolidMeshBuilder::new(&mut solid);
    for point in [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
    ] {
        builder.create_point(point);
    }
    let locals = tetrahedron_facet_refs();
    let facets: Vec<&[LocalIndex]> = locals.iter().map(|facet| facet.as_slice()).collect();
    builder.create_polyhedron(&[0, 1, 2, 3], &facets).unwrap();
    builder.create_polyhedron(&[7, 4, 6, 5], &facets).unwrap();

    remove_solid_vertex_duplication(&mut solid, GLOBAL_EPSILON).unwrap();
    assert_eq!(solid.nb_vertices(), 5);
    assert_eq!(solid.nb_polyhedra(), 2);

    let mut builder = SolidMeshBuilder::new(&mut solid);
    builder.compute_polyhedron_adjacencies();
    let facet = PolyhedronFacet::new(0, 0);
    assert_eq!(solid.polyhedron_adjacent(facet), 1);
    let matching = solid.polyhedron_adjacent_facet(facet).unwrap();
    assert_eq!(matching.polyhedron, 1);
}

#[test]
fn merge_of_two_triangle_strips() {
    fn strip(points: &[Point2], triangles: &[[Index; 3]]) -> SurfaceMesh<2> {
        let mut mesh = SurfaceMesh::new();
        let mut builder = SurfaceMeshBuilder::new(&mut mesh);
        for &point in points {
            builder.create_point(point);
        }
        for triangle in triangles {
            builder.create_polygon(triangle).unwrap();
        }
        mesh
    }
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
    // Adjacency matches the union topology: the triangulated 2x3 grid has
    // five interior edge adjacencies.
    let interior: usize = (0..result.surface.nb_polygons() as Index)
        .map(|polygon| {
            (0..3)
                .filter(|&edge| {
                    result.surface.polygon_adjacent(PolygonEdge::new(polygon, edge)) != NO_ID
                })
                .count()
        })
        .sum();
    assert_eq!(interior, 2 * 3);
}

#[test]
fn split_then_deduplicate_is_identity() {
    let mut solid = SolidMesh3::new();
    let mut builder = SolidMeshBuilder::new(&mut solid);
    for point in [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
    ] {
        builder.create_point(point);
    }
    let locals = tetrahedron_facet_refs();
    let facets: Vec<&[LocalIndex]> = locals.iter().map(|facet| facet.as_slice()).collect();
    builder.create_polyhedron(&[0, 1, 2, 3], &facets).unwrap();
    builder.create_polyhedron(&[4, 1, 3, 2], &facets).unwrap();
    builder.compute_polyhedron_adjacencies();

    let before_vertices = solid.nb_vertices();
    let renames = split_along_solid_facets(&mut solid, &[PolyhedronFacet::new(0, 0)]).unwrap();
    assert_eq!(renames.len(), 3);
    assert_eq!(solid.nb_vertices(), before_vertices + 3);

    remove_solid_vertex_duplication(&mut solid, 0.0).unwrap();
    assert_eq!(solid.nb_vertices(), before_vertices);
    assert_eq!(solid.nb_polyhedra(), 2);
    let mut builder = SolidMeshBuilder::new(&mut solid);
    builder.compute_polyhedron_adjacencies();
    assert_eq!(solid.polyhedron_adjacent(PolyhedronFacet::new(0, 0)), 1);
}
