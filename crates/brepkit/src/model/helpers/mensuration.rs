use rustc_hash::FxHashMap;
use uuid::Uuid;

use super::component_mesh_queries::{
    component_mesh_edge_unique_vertices, surface_edges_matching,
};
use crate::basic::Index;
use crate::geometry::basic_objects::Tetrahedron;
use crate::geometry::mensuration::tetrahedron_signed_volume;
use crate::model::ModelError;
use crate::model::brep::BRep;

/// Total length of a line's edges.
pub fn line_length(model: &BRep, line: Uuid) -> Result<f64, ModelError> {
    let line = model.line(line).ok_or(ModelError::UnknownComponent(line))?;
    Ok((0..line.mesh().nb_edges() as Index)
        .map(|edge| line.mesh().edge_length(edge))
        .sum())
}

/// Total area of a surface's polygons.
pub fn surface_area(model: &BRep, surface: Uuid) -> Result<f64, ModelError> {
    let surface = model
        .surface(surface)
        .ok_or(ModelError::UnknownComponent(surface))?;
    Ok(surface.mesh().area())
}

/// Volume of a block.
///
/// With a volumetric mesh the signed polyhedron volumes are summed directly.
/// Otherwise the volume is recovered from the oriented boundary surfaces:
/// signed tetrahedra are fanned from an anchor point over every boundary
/// polygon, each surface weighted by its orientation relative to the block,
/// propagated surface-to-surface through shared line orientations.
pub fn block_volume(model: &BRep, block: Uuid) -> Result<f64, ModelError> {
    let component = model.block(block).ok_or(ModelError::UnknownComponent(block))?;
    if component.mesh().nb_polyhedra() > 0 {
        return Ok(component.mesh().volume().abs());
    }

    let boundaries: Vec<Uuid> = model
        .relationships()
        .boundaries(block)
        .into_iter()
        .map(|surface| surface.id())
        .collect();
    if boundaries.is_empty() {
        return Ok(0.0);
    }
    let orientations = propagate_orientations(model, &boundaries);

    let anchor = *model
        .surface(boundaries[0])
        .ok_or(ModelError::UnknownComponent(boundaries[0]))?
        .mesh()
        .point(0);
    let mut volume = 0.0;
    for &surface_id in &boundaries {
        let surface = model
            .surface(surface_id)
            .ok_or(ModelError::UnknownComponent(surface_id))?;
        let orientation = f64::from(orientations.get(&surface_id).copied().unwrap_or(1));
        let mesh = surface.mesh();
        for polygon in 0..mesh.nb_polygons() as Index {
            let vertices = mesh.polygon_vertices(polygon);
            for fan in 1..vertices.len() - 1 {
                let tetra = Tetrahedron::new(
                    anchor,
                    *mesh.point(vertices[0]),
                    *mesh.point(vertices[fan]),
                    *mesh.point(vertices[fan + 1]),
                );
                volume += orientation * tetrahedron_signed_volume(&tetra);
            }
        }
    }
    Ok(volume.abs())
}

/// Assigns +1/-1 to each boundary surface so neighbouring surfaces are
/// consistently oriented, starting arbitrarily from the first one.
///
/// Two surfaces of a consistently oriented closed boundary traverse their
/// shared line in opposite directions; traversing it in the same direction
/// flips the relative sign.
fn propagate_orientations(model: &BRep, boundaries: &[Uuid]) -> FxHashMap<Uuid, i8> {
    let mut orientations: FxHashMap<Uuid, i8> = FxHashMap::default();
    let mut queue = std::collections::VecDeque::new();
    orientations.insert(boundaries[0], 1);
    queue.push_back(boundaries[0]);
    while let Some(current) = queue.pop_front() {
        let current_sign = orientations[&current];
        for line in model.relationships().boundaries(current) {
            let line_id = line.id();
            let Some(current_direction) = edge_direction_in_surface(model, current, line_id)
            else {
                continue;
            };
            for incidence in model.relationships().incidences(line_id) {
                let neighbour = incidence.id();
                if neighbour == current
                    || orientations.contains_key(&neighbour)
                    || !boundaries.contains(&neighbour)
                {
                    continue;
                }
                let Some(neighbour_direction) =
                    edge_direction_in_surface(model, neighbour, line_id)
                else {
                    continue;
                };
                let sign = if neighbour_direction == current_direction {
                    -current_sign
                } else {
                    current_sign
                };
                orientations.insert(neighbour, sign);
                queue.push_back(neighbour);
            }
        }
    }
    orientations
}

/// Whether `surface` traverses the first edge of `line` forward; `None` when
/// the edge does not appear in the surface.
fn edge_direction_in_surface(model: &BRep, surface: Uuid, line: Uuid) -> Option<bool> {
    let line_component = model.line(line)?;
    if line_component.mesh().nb_edges() == 0 {
        return None;
    }
    let unique = component_mesh_edge_unique_vertices(model, line, 0);
    let unique = [unique[0], unique[1]];
    let edge = surface_edges_matching(model, surface, unique).into_iter().next()?;
    let surface_component = model.surface(surface)?;
    let [v0, v1] = surface_component.mesh().polygon_edge_vertices(edge);
    let identifier = model.vertex_identifier();
    let pair = [
        identifier.unique_vertex(&crate::model::vertex_identifier::ComponentMeshVertex::new(
            surface_component.component_id(),
            v0,
        )),
        identifier.unique_vertex(&crate::model::vertex_identifier::ComponentMeshVertex::new(
            surface_component.component_id(),
            v1,
        )),
    ];
    Some(pair == unique)
}
