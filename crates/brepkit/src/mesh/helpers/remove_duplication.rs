use crate::basic::Index;
use crate::geometry::nn_search::NnSearch;
use crate::mesh::MeshError;
use crate::mesh::solid_mesh::{SolidMesh3, SolidMeshBuilder};
use crate::mesh::surface_mesh::{SurfaceMesh, SurfaceMeshBuilder};

/// Old vertex -> surviving vertex map from a colocation result: each cluster
/// collapses onto its smallest member.
fn representative_mapping(colocated_mapping: &[Index]) -> Vec<Index> {
    let nb_unique = colocated_mapping
        .iter()
        .map(|&unique| unique as usize + 1)
        .max()
        .unwrap_or(0);
    let mut representative = vec![Index::MAX; nb_unique];
    for (vertex, &unique) in colocated_mapping.iter().enumerate() {
        if representative[unique as usize] == Index::MAX {
            representative[unique as usize] = vertex as Index;
        }
    }
    colocated_mapping
        .iter()
        .map(|&unique| representative[unique as usize])
        .collect()
}

/// Collapses colocated vertices of a solid onto one representative each and
/// drops the now-isolated duplicates. Returns the old -> new vertex map.
pub fn remove_solid_vertex_duplication(
    solid: &mut SolidMesh3,
    epsilon: f64,
) -> Result<Vec<Index>, MeshError> {
    let colocated = NnSearch::new(solid.points().to_vec()).colocated_index_mapping(epsilon);
    let mapping = representative_mapping(&colocated.colocated_mapping);
    let mut builder = SolidMeshBuilder::new(solid);
    builder.replace_vertices(&mapping)?;
    builder.delete_isolated_vertices()
}

/// Collapses colocated vertices of a surface onto one representative each and
/// drops the now-isolated duplicates. Returns the old -> new vertex map.
pub fn remove_surface_vertex_duplication<const D: usize>(
    surface: &mut SurfaceMesh<D>,
    epsilon: f64,
) -> Result<Vec<Index>, MeshError> {
    let colocated = NnSearch::new(surface.points().to_vec()).colocated_index_mapping(epsilon);
    let mapping = representative_mapping(&colocated.colocated_mapping);
    let mut builder = SurfaceMeshBuilder::new(surface);
    builder.replace_vertices(&mapping)?;
    builder.delete_isolated_vertices()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::LocalIndex;
    use crate::geometry::GLOBAL_EPSILON;
    use crate::geometry::basic_objects::Tetrahedron;
    use crate::geometry::point::Point3;
    use crate::mesh::solid_mesh::PolyhedronFacet;

    #[test]
    fn disjoint_tets_reconnect() {
        // Two tetrahedra sharing a face geometrically, built with 4 + 4
        // disjoint vertices.
        let mut solid = SolidMesh3::new();
        let mut builder = SolidMeshBuilder::new(&mut solid);
        for point in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            // Second tet repeats the shared face (1, 2, 3).
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
        ] {
            builder.create_point(point);
        }
        let locals: Vec<Vec<LocalIndex>> = Tetrahedron::FACET_VERTICES
            .iter()
            .map(|facet| facet.iter().map(|&local| local as LocalIndex).collect())
            .collect();
        let facets: Vec<&[LocalIndex]> = locals.iter().map(|facet| facet.as_slice()).collect();
        builder.create_polyhedron(&[0, 1, 2, 3], &facets).unwrap();
        builder.create_polyhedron(&[7, 4, 6, 5], &facets).unwrap();

        remove_solid_vertex_duplication(&mut solid, GLOBAL_EPSILON).unwrap();
        assert_eq!(solid.nb_vertices(), 5);
        assert_eq!(solid.nb_polyhedra(), 2);

        let mut builder = SolidMeshBuilder::new(&mut solid);
        builder.compute_polyhedron_adjacencies();
        assert_eq!(solid.polyhedron_adjacent(PolyhedronFacet::new(0, 0)), 1);
        let matching = solid
            .polyhedron_adjacent_facet(PolyhedronFacet::new(0, 0))
            .unwrap();
        assert_eq!(matching.polyhedron, 1);
    }
}
