use itertools::Itertools;
use petgraph::algo::tarjan_scc;
use petgraph::prelude::UnGraphMap;
use rustc_hash::FxHashSet;

use crate::basic::{Index, LocalIndex};
use crate::mesh::MeshError;
use crate::mesh::solid_mesh::{PolyhedronFacet, PolyhedronVertex, SolidMesh3, SolidMeshBuilder};

/// Duplicates the vertices lying on `facets` so the solid becomes
/// topologically disconnected across them.
///
/// Around each vertex of the cut, the polyhedra are grouped by walking only
/// the facets that are not cut; the first group keeps the vertex, every other
/// group is rewired onto a fresh copy of its point. Returns the
/// (old vertex, new vertex) pairs, in creation order, for callers tracking
/// identities across the split.
pub fn split_along_solid_facets(
    solid: &mut SolidMesh3,
    facets: &[PolyhedronFacet],
) -> Result<Vec<(Index, Index)>, MeshError> {
    let mut cut: FxHashSet<(Index, LocalIndex)> = FxHashSet::default();
    for &facet in facets {
        cut.insert((facet.polyhedron, facet.facet_id));
        if let Some(matching) = solid.polyhedron_adjacent_facet(facet) {
            cut.insert((matching.polyhedron, matching.facet_id));
        }
    }

    // The cut facets stop being adjacencies.
    {
        let mut builder = SolidMeshBuilder::new(solid);
        for &(polyhedron, facet_id) in &cut {
            builder.unset_polyhedron_adjacent(PolyhedronFacet::new(polyhedron, facet_id))?;
        }
    }

    let cut_vertices: Vec<Index> = cut
        .iter()
        .flat_map(|&(polyhedron, facet_id)| {
            solid
                .polyhedron_facet_vertices(PolyhedronFacet::new(polyhedron, facet_id))
                .into_iter()
        })
        .sorted_unstable()
        .dedup()
        .collect();

    log::debug!(
        "splitting {} facets touching {} vertices",
        facets.len(),
        cut_vertices.len()
    );

    let mut renames = Vec::new();
    for vertex in cut_vertices {
        let components = components_around_vertex(solid, vertex);
        if components.len() <= 1 {
            continue;
        }
        for component in &components[1..] {
            let point = *solid.point(vertex);
            let mut builder = SolidMeshBuilder::new(solid);
            let created = builder.create_point(point);
            for &polyhedron in component {
                let slots: Vec<LocalIndex> = solid
                    .polyhedron_vertices(polyhedron)
                    .iter()
                    .enumerate()
                    .filter(|&(_, &v)| v == vertex)
                    .map(|(slot, _)| slot as LocalIndex)
                    .collect();
                let mut builder = SolidMeshBuilder::new(solid);
                for slot in slots {
                    builder
                        .set_polyhedron_vertex(PolyhedronVertex::new(polyhedron, slot), created)?;
                }
            }
            renames.push((vertex, created));
        }
    }
    Ok(renames)
}

/// Polyhedra around `vertex`, grouped by uncut-facet connectivity. Groups are
/// ordered by their smallest polyhedron index.
fn components_around_vertex(solid: &SolidMesh3, vertex: Index) -> Vec<Vec<Index>> {
    let around: Vec<Index> = solid
        .polyhedra_around_vertex(vertex)
        .iter()
        .map(|polyhedron_vertex| polyhedron_vertex.polyhedron)
        .sorted_unstable()
        .dedup()
        .collect();
    let mut graph: UnGraphMap<Index, ()> = UnGraphMap::new();
    for &polyhedron in &around {
        graph.add_node(polyhedron);
    }
    for &polyhedron in &around {
        for facet_id in 0..solid.nb_polyhedron_facets(polyhedron) {
            let facet = PolyhedronFacet::new(polyhedron, facet_id as LocalIndex);
            if !solid.polyhedron_facet_vertices(facet).contains(&vertex) {
                continue;
            }
            let adjacent = solid.polyhedron_adjacent(facet);
            if adjacent != crate::basic::NO_ID && graph.contains_node(adjacent) {
                graph.add_edge(polyhedron, adjacent, ());
            }
        }
    }
    let mut components = tarjan_scc(&graph);
    for component in &mut components {
        component.sort_unstable();
    }
    components.sort_by_key(|component| component[0]);
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_examples::make_two_tets_solid;

    #[test]
    fn splitting_the_shared_facet_disconnects_the_tets() {
        let mut solid = make_two_tets_solid();
        let renames =
            split_along_solid_facets(&mut solid, &[PolyhedronFacet::new(0, 0)]).unwrap();
        // The three shared vertices are duplicated for the second tet.
        assert_eq!(renames.len(), 3);
        assert_eq!(solid.nb_vertices(), 8);
        for facet_id in 0..4 {
            assert!(
                solid.is_polyhedron_facet_on_border(PolyhedronFacet::new(0, facet_id)),
                "tet 0 should be fully disconnected"
            );
        }
        let vertices0: Vec<Index> = solid.polyhedron_vertices(0).to_vec();
        let vertices1: Vec<Index> = solid.polyhedron_vertices(1).to_vec();
        assert!(vertices0.iter().all(|v| !vertices1.contains(v)));
    }

    #[test]
    fn uncut_meshes_are_untouched() {
        let mut solid = make_two_tets_solid();
        let renames = split_along_solid_facets(&mut solid, &[]).unwrap();
        assert!(renames.is_empty());
        assert_eq!(solid.nb_vertices(), 5);
    }
}
