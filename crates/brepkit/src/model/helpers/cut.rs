use uuid::Uuid;

use super::component_mesh_queries::block_vertices_from_surface_polygon;
use crate::basic::{Index, NO_ID};
use crate::mesh::helpers::split::split_along_solid_facets;
use crate::mesh::solid_mesh::PolyhedronFacet;
use crate::model::ModelError;
use crate::model::brep::BRep;
use crate::model::builder::BRepBuilder;
use crate::model::component::ComponentType;
use crate::model::vertex_identifier::ComponentMeshVertex;

/// Mesh-vertex duplications performed in one block: (old vertex, new vertex)
/// pairs.
pub type BlockVertexRenames = Vec<(Index, Index)>;

fn facets_on_surface(model: &BRep, block: Uuid, surface: Uuid) -> Vec<PolyhedronFacet> {
    let Some(surface_component) = model.surface(surface) else {
        return Vec::new();
    };
    let mut facets = Vec::new();
    for polygon in 0..surface_component.mesh().nb_polygons() as Index {
        let matching = block_vertices_from_surface_polygon(model, surface, polygon);
        if let Some(block_facets) = matching.get(&block) {
            facets.extend_from_slice(block_facets);
        }
    }
    facets
}

fn split_block(
    model: &mut BRep,
    block: Uuid,
    facets: &[PolyhedronFacet],
) -> Result<BlockVertexRenames, ModelError> {
    if facets.is_empty() {
        return Ok(Vec::new());
    }
    let component = model
        .blocks
        .get(block)
        .ok_or(ModelError::UnknownComponent(block))?
        .component_id();
    let mesh = model
        .blocks
        .get_mut(block)
        .ok_or(ModelError::UnknownComponent(block))?
        .mesh_mut();
    let renames = split_along_solid_facets(mesh, facets)?;
    // Fresh vertex copies stand at the same model vertex as their original.
    let uniques: Vec<Index> = renames
        .iter()
        .map(|&(old, _)| {
            model
                .vertex_identifier()
                .unique_vertex(&ComponentMeshVertex::new(component, old))
        })
        .collect();
    let mut builder = BRepBuilder::new(model);
    for (&(_, new), unique) in renames.iter().zip(uniques) {
        if unique != NO_ID {
            builder.set_unique_vertex(ComponentMeshVertex::new(component, new), unique);
        }
    }
    Ok(renames)
}

/// Disconnects every block mesh across the surfaces lying strictly inside
/// it. Returns, per block, the vertex duplications applied.
pub fn cut_along_internal_surfaces(
    model: &mut BRep,
) -> Result<Vec<(Uuid, BlockVertexRenames)>, ModelError> {
    let blocks: Vec<Uuid> = model.blocks.ids().collect();
    let mut results = Vec::new();
    for block in blocks {
        let internal_surfaces: Vec<Uuid> = model
            .relationships()
            .internals(block)
            .into_iter()
            .filter(|component| component.component_type() == ComponentType::Surface)
            .map(|component| component.id())
            .collect();
        let mut facets = Vec::new();
        for surface in internal_surfaces {
            facets.extend(facets_on_surface(model, block, surface));
        }
        let renames = split_block(model, block, &facets)?;
        if !renames.is_empty() {
            log::debug!("cut block {block}: {} vertices duplicated", renames.len());
            results.push((block, renames));
        }
    }
    Ok(results)
}

/// Disconnects every block mesh from its neighbours across its boundary
/// surfaces, so no block shares mesh vertices through its borders. Returns,
/// per block, the vertex duplications applied.
pub fn split_along_block_mesh_borders(
    model: &mut BRep,
) -> Result<Vec<(Uuid, BlockVertexRenames)>, ModelError> {
    let blocks: Vec<Uuid> = model.blocks.ids().collect();
    let mut results = Vec::new();
    for block in blocks {
        let boundary_surfaces: Vec<Uuid> = model
            .relationships()
            .boundaries(block)
            .into_iter()
            .filter(|component| component.component_type() == ComponentType::Surface)
            .map(|component| component.id())
            .collect();
        let mut facets = Vec::new();
        for surface in boundary_surfaces {
            facets.extend(facets_on_surface(model, block, surface));
        }
        // Only interior facets disconnect anything; border facets are kept to
        // preserve the around-vertex components.
        let mesh = model
            .blocks
            .get(block)
            .ok_or(ModelError::UnknownComponent(block))?
            .mesh();
        facets.retain(|&facet| !mesh.is_polyhedron_facet_on_border(facet));
        let renames = split_block(model, block, &facets)?;
        if !renames.is_empty() {
            results.push((block, renames));
        }
    }
    Ok(results)
}
