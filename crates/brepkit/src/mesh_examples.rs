//! Small meshes shared by the unit tests.

use crate::basic::LocalIndex;
use crate::geometry::basic_objects::Tetrahedron;
use crate::geometry::point::{Point2, Point3};
use crate::mesh::edged_curve::{EdgedCurve, EdgedCurveBuilder};
use crate::mesh::solid_mesh::{SolidMesh3, SolidMeshBuilder};
use crate::mesh::surface_mesh::{SurfaceMesh, SurfaceMeshBuilder};

/// The outward facet tables of a tetrahedron, as local-index slices.
pub fn tetrahedron_facets() -> Vec<Vec<LocalIndex>> {
    Tetrahedron::FACET_VERTICES
        .iter()
        .map(|facet| facet.iter().map(|&local| local as LocalIndex).collect())
        .collect()
}

/// Two positive tetrahedra sharing the facet (1, 2, 3), with adjacencies
/// computed.
pub fn make_two_tets_solid() -> SolidMesh3 {
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
    let locals = tetrahedron_facets();
    let facets: Vec<&[LocalIndex]> = locals.iter().map(|facet| facet.as_slice()).collect();
    builder.create_polyhedron(&[0, 1, 2, 3], &facets).unwrap();
    builder.create_polyhedron(&[4, 1, 3, 2], &facets).unwrap();
    builder.compute_polyhedron_adjacencies();
    solid
}

/// Two triangles sharing the edge (0, 1), with adjacencies computed.
pub fn make_triangle_pair_surface() -> SurfaceMesh<2> {
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

/// A four-point open polyline along the x axis.
pub fn make_polyline() -> EdgedCurve<2> {
    let mut curve = EdgedCurve::new();
    let mut builder = EdgedCurveBuilder::new(&mut curve);
    for x in 0..4 {
        builder.create_point(Point2::new(f64::from(x), 0.0));
    }
    builder.create_edge(0, 1).unwrap();
    builder.create_edge(1, 2).unwrap();
    builder.create_edge(2, 3).unwrap();
    curve
}
