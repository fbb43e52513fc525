use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::basic::{Index, LocalIndex, NO_ID};
use crate::mesh::solid_mesh::PolyhedronFacet;
use crate::mesh::surface_mesh::PolygonEdge;
use crate::model::brep::BRep;
use crate::model::vertex_identifier::{ComponentMeshVertex, VertexIdentifier};

fn unique_loop(
    identifier: &VertexIdentifier,
    component: crate::model::component::ComponentId,
    vertices: impl IntoIterator<Item = Index>,
) -> Vec<Index> {
    vertices
        .into_iter()
        .map(|vertex| identifier.unique_vertex(&ComponentMeshVertex::new(component, vertex)))
        .collect()
}

/// Unique-vertex loop of one polygon of one surface.
pub fn component_mesh_polygon_unique_vertices(
    model: &BRep,
    surface: Uuid,
    polygon: Index,
) -> Vec<Index> {
    let Some(surface) = model.surface(surface) else {
        return Vec::new();
    };
    unique_loop(
        model.vertex_identifier(),
        surface.component_id(),
        surface.mesh().polygon_vertices(polygon).iter().copied(),
    )
}

/// Unique-vertex pair of one edge of one line.
pub fn component_mesh_edge_unique_vertices(model: &BRep, line: Uuid, edge: Index) -> Vec<Index> {
    let Some(line) = model.line(line) else {
        return Vec::new();
    };
    unique_loop(
        model.vertex_identifier(),
        line.component_id(),
        line.mesh().edge_vertices(edge),
    )
}

/// Whether `candidate` is a cyclic permutation of `query` or of its reverse.
fn matches_cyclically(query: &[Index], candidate: &[Index]) -> bool {
    if query.len() != candidate.len() || query.is_empty() {
        return false;
    }
    let n = query.len();
    let Some(start) = candidate.iter().position(|&vertex| vertex == query[0]) else {
        return false;
    };
    let forward = (0..n).all(|offset| candidate[(start + offset) % n] == query[offset]);
    let backward = (0..n).all(|offset| candidate[(start + n - offset) % n] == query[offset]);
    forward || backward
}

/// Every polygon of every surface whose unique-vertex loop is a cyclic
/// permutation (or reversed cyclic permutation) of `unique_vertices`.
pub fn component_mesh_polygons(
    model: &BRep,
    unique_vertices: &[Index],
) -> FxHashMap<Uuid, Vec<Index>> {
    let mut found: FxHashMap<Uuid, Vec<Index>> = FxHashMap::default();
    if unique_vertices.contains(&NO_ID) {
        return found;
    }
    for surface in model.surfaces() {
        for polygon in 0..surface.mesh().nb_polygons() as Index {
            let candidate =
                component_mesh_polygon_unique_vertices(model, surface.id(), polygon);
            if matches_cyclically(unique_vertices, &candidate) {
                found.entry(surface.id()).or_default().push(polygon);
            }
        }
    }
    found
}

/// Every edge of every line whose unique-vertex pair matches
/// `unique_vertices` in either direction.
pub fn component_mesh_edges(
    model: &BRep,
    unique_vertices: [Index; 2],
) -> FxHashMap<Uuid, Vec<Index>> {
    let mut found: FxHashMap<Uuid, Vec<Index>> = FxHashMap::default();
    if unique_vertices.contains(&NO_ID) {
        return found;
    }
    let reversed = [unique_vertices[1], unique_vertices[0]];
    for line in model.lines() {
        for edge in 0..line.mesh().nb_edges() as Index {
            let candidate = component_mesh_edge_unique_vertices(model, line.id(), edge);
            if candidate == unique_vertices || candidate == reversed {
                found.entry(line.id()).or_default().push(edge);
            }
        }
    }
    found
}

/// Every polyhedron facet of every block matching the unique-vertex loop, in
/// either orientation.
pub fn component_mesh_polyhedron_facets(
    model: &BRep,
    unique_vertices: &[Index],
) -> FxHashMap<Uuid, Vec<PolyhedronFacet>> {
    let mut found: FxHashMap<Uuid, Vec<PolyhedronFacet>> = FxHashMap::default();
    if unique_vertices.contains(&NO_ID) {
        return found;
    }
    for block in model.blocks() {
        let component = block.component_id();
        let mesh = block.mesh();
        for polyhedron in 0..mesh.nb_polyhedra() as Index {
            for facet_id in 0..mesh.nb_polyhedron_facets(polyhedron) {
                let facet = PolyhedronFacet::new(polyhedron, facet_id as LocalIndex);
                let candidate = unique_loop(
                    model.vertex_identifier(),
                    component,
                    mesh.polyhedron_facet_vertices(facet).into_iter(),
                );
                if matches_cyclically(unique_vertices, &candidate) {
                    found.entry(block.id()).or_default().push(facet);
                }
            }
        }
    }
    found
}

/// The block facets standing on one surface polygon: the facet traversing
/// the polygon's unique loop in the same orientation, and the opposite one.
pub fn block_vertices_from_surface_polygon(
    model: &BRep,
    surface: Uuid,
    polygon: Index,
) -> FxHashMap<Uuid, Vec<PolyhedronFacet>> {
    let unique_vertices = component_mesh_polygon_unique_vertices(model, surface, polygon);
    component_mesh_polyhedron_facets(model, &unique_vertices)
}

/// Every polygon edge of `surface` whose unique-vertex pair matches.
pub(crate) fn surface_edges_matching(
    model: &BRep,
    surface: Uuid,
    unique_vertices: [Index; 2],
) -> Vec<PolygonEdge> {
    let Some(component) = model.surface(surface) else {
        return Vec::new();
    };
    let mesh = component.mesh();
    let identifier = model.vertex_identifier();
    let component_id = component.component_id();
    let mut matching = Vec::new();
    for polygon in 0..mesh.nb_polygons() as Index {
        for edge_id in 0..mesh.nb_polygon_vertices(polygon) {
            let edge = PolygonEdge::new(polygon, edge_id as LocalIndex);
            let [v0, v1] = mesh.polygon_edge_vertices(edge);
            let pair = [
                identifier.unique_vertex(&ComponentMeshVertex::new(component_id, v0)),
                identifier.unique_vertex(&ComponentMeshVertex::new(component_id, v1)),
            ];
            if pair == unique_vertices || pair == [unique_vertices[1], unique_vertices[0]] {
                matching.push(edge);
            }
        }
    }
    matching
}
