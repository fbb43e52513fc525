use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::component::ComponentId;
use crate::basic::{Index, NO_ID};

/// One vertex of one component mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentMeshVertex {
    pub component: ComponentId,
    pub vertex: Index,
}

impl ComponentMeshVertex {
    pub fn new(component: ComponentId, vertex: Index) -> Self {
        Self { component, vertex }
    }
}

/// Model-wide vertex identities.
///
/// Each unique vertex stands for one physical point and backs any number of
/// component-mesh vertices; each component-mesh vertex belongs to at most one
/// unique vertex. The two directions of the mapping are kept synchronized
/// through every edit.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VertexIdentifier {
    unique_to_mesh: Vec<Vec<ComponentMeshVertex>>,
    mesh_to_unique: FxHashMap<Uuid, (ComponentId, Vec<Index>)>,
}

impl VertexIdentifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nb_unique_vertices(&self) -> usize {
        self.unique_to_mesh.len()
    }

    pub fn has_component(&self, id: Uuid) -> bool {
        self.mesh_to_unique.contains_key(&id)
    }

    /// Starts tracking `nb_vertices` mesh vertices of `component`, all
    /// initially unassociated.
    pub(crate) fn register_component(&mut self, component: ComponentId, nb_vertices: usize) {
        self.mesh_to_unique
            .insert(component.id(), (component, vec![NO_ID; nb_vertices]));
    }

    /// Stops tracking `component`, dropping its contributions to every unique
    /// vertex.
    pub(crate) fn unregister_component(&mut self, id: Uuid) {
        if self.mesh_to_unique.remove(&id).is_some() {
            for contributions in &mut self.unique_to_mesh {
                contributions.retain(|cmv| cmv.component.id() != id);
            }
        }
    }

    pub(crate) fn create_unique_vertex(&mut self) -> Index {
        let created = self.unique_to_mesh.len() as Index;
        self.unique_to_mesh.push(Vec::new());
        created
    }

    pub(crate) fn create_unique_vertices(&mut self, count: usize) -> Index {
        let first = self.unique_to_mesh.len() as Index;
        self.unique_to_mesh
            .resize_with(self.unique_to_mesh.len() + count, Vec::new);
        first
    }

    /// Every component-mesh vertex standing at the unique vertex.
    pub fn component_mesh_vertices(&self, unique_vertex: Index) -> &[ComponentMeshVertex] {
        &self.unique_to_mesh[unique_vertex as usize]
    }

    /// Unique vertex of one component-mesh vertex, [`NO_ID`] when unset.
    pub fn unique_vertex(&self, cmv: &ComponentMeshVertex) -> Index {
        self.mesh_to_unique
            .get(&cmv.component.id())
            .and_then(|(_, mapping)| mapping.get(cmv.vertex as usize))
            .copied()
            .unwrap_or(NO_ID)
    }

    /// Component-mesh vertices of `unique_vertex` belonging to `component`.
    pub fn unique_vertex_in_component(
        &self,
        unique_vertex: Index,
        component: Uuid,
    ) -> Vec<ComponentMeshVertex> {
        self.component_mesh_vertices(unique_vertex)
            .iter()
            .filter(|cmv| cmv.component.id() == component)
            .copied()
            .collect()
    }

    /// Associates a component-mesh vertex with a unique vertex, detaching it
    /// from any previous one.
    pub(crate) fn set_unique_vertex(&mut self, cmv: ComponentMeshVertex, unique_vertex: Index) {
        let Some((_, mapping)) = self.mesh_to_unique.get_mut(&cmv.component.id()) else {
            return;
        };
        if (cmv.vertex as usize) >= mapping.len() {
            mapping.resize(cmv.vertex as usize + 1, NO_ID);
        }
        let previous = mapping[cmv.vertex as usize];
        if previous == unique_vertex {
            return;
        }
        if previous != NO_ID {
            self.unique_to_mesh[previous as usize].retain(|entry| entry != &cmv);
        }
        mapping[cmv.vertex as usize] = unique_vertex;
        if unique_vertex != NO_ID {
            self.unique_to_mesh[unique_vertex as usize].push(cmv);
        }
    }

    /// Removes the association between `cmv` and `unique_vertex`.
    pub(crate) fn unset_unique_vertex(&mut self, cmv: ComponentMeshVertex, unique_vertex: Index) {
        if let Some((_, mapping)) = self.mesh_to_unique.get_mut(&cmv.component.id()) {
            if mapping.get(cmv.vertex as usize) == Some(&unique_vertex) {
                mapping[cmv.vertex as usize] = NO_ID;
                self.unique_to_mesh[unique_vertex as usize].retain(|entry| entry != &cmv);
            }
        }
    }

    /// Propagates a component-mesh vertex deletion or permutation;
    /// `old_to_new[v]` is the new index of vertex `v`, [`NO_ID`] when
    /// deleted.
    pub(crate) fn update_unique_vertices(&mut self, component: Uuid, old_to_new: &[Index]) {
        let Some((component_id, mapping)) = self.mesh_to_unique.get(&component) else {
            return;
        };
        let component_id = *component_id;
        let old_mapping = mapping.clone();
        let new_size = old_to_new
            .iter()
            .filter(|&&new| new != NO_ID)
            .count()
            .max(
                old_to_new
                    .iter()
                    .filter(|&&new| new != NO_ID)
                    .map(|&new| new as usize + 1)
                    .max()
                    .unwrap_or(0),
            );
        let mut new_mapping = vec![NO_ID; new_size];
        for (old, &unique) in old_mapping.iter().enumerate() {
            let new = old_to_new.get(old).copied().unwrap_or(NO_ID);
            if unique == NO_ID {
                continue;
            }
            let contributions = &mut self.unique_to_mesh[unique as usize];
            contributions.retain(|cmv| {
                cmv.component.id() != component || cmv.vertex != old as Index
            });
            if new != NO_ID {
                new_mapping[new as usize] = unique;
                contributions.push(ComponentMeshVertex::new(component_id, new));
            }
        }
        self.mesh_to_unique
            .insert(component, (component_id, new_mapping));
    }

    /// Drops unique vertices with no remaining contribution and compacts the
    /// id space. Returns the old -> new unique vertex map.
    pub(crate) fn delete_isolated_vertices(&mut self) -> Vec<Index> {
        let mut mapping = Vec::with_capacity(self.unique_to_mesh.len());
        let mut kept = 0 as Index;
        for contributions in &self.unique_to_mesh {
            if contributions.is_empty() {
                mapping.push(NO_ID);
            } else {
                mapping.push(kept);
                kept += 1;
            }
        }
        self.unique_to_mesh.retain(|contributions| !contributions.is_empty());
        for (_, (_, vertex_mapping)) in self.mesh_to_unique.iter_mut() {
            for unique in vertex_mapping.iter_mut() {
                if *unique != NO_ID {
                    *unique = mapping[*unique as usize];
                }
            }
        }
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::component::ComponentType;

    fn corner_component() -> ComponentId {
        ComponentId::new(ComponentType::Corner, Uuid::new_v4())
    }

    fn line_component() -> ComponentId {
        ComponentId::new(ComponentType::Line, Uuid::new_v4())
    }

    #[test]
    fn both_directions_stay_in_sync() {
        let mut identifier = VertexIdentifier::new();
        let corner = corner_component();
        let line = line_component();
        identifier.register_component(corner, 1);
        identifier.register_component(line, 2);

        let unique = identifier.create_unique_vertex();
        let corner_vertex = ComponentMeshVertex::new(corner, 0);
        let line_vertex = ComponentMeshVertex::new(line, 1);
        identifier.set_unique_vertex(corner_vertex, unique);
        identifier.set_unique_vertex(line_vertex, unique);

        assert_eq!(identifier.unique_vertex(&corner_vertex), unique);
        assert_eq!(
            identifier.component_mesh_vertices(unique),
            &[corner_vertex, line_vertex]
        );

        // Re-associating moves the contribution.
        let other = identifier.create_unique_vertex();
        identifier.set_unique_vertex(line_vertex, other);
        assert_eq!(identifier.component_mesh_vertices(unique), &[corner_vertex]);
        assert_eq!(identifier.component_mesh_vertices(other), &[line_vertex]);
    }

    #[test]
    fn unregistering_drops_contributions() {
        let mut identifier = VertexIdentifier::new();
        let corner = corner_component();
        let line = line_component();
        identifier.register_component(corner, 1);
        identifier.register_component(line, 1);
        let unique = identifier.create_unique_vertex();
        identifier.set_unique_vertex(ComponentMeshVertex::new(corner, 0), unique);
        identifier.set_unique_vertex(ComponentMeshVertex::new(line, 0), unique);

        identifier.unregister_component(line.id());
        assert!(!identifier.has_component(line.id()));
        assert_eq!(identifier.component_mesh_vertices(unique).len(), 1);
    }

    #[test]
    fn vertex_deletions_propagate() {
        let mut identifier = VertexIdentifier::new();
        let line = line_component();
        identifier.register_component(line, 3);
        let first = identifier.create_unique_vertices(3);
        for vertex in 0..3 {
            identifier
                .set_unique_vertex(ComponentMeshVertex::new(line, vertex), first + vertex);
        }
        // Mesh deletes its vertex 1; vertices 2 slides to 1.
        identifier.update_unique_vertices(line.id(), &[0, NO_ID, 1]);
        assert_eq!(
            identifier.unique_vertex(&ComponentMeshVertex::new(line, 1)),
            2
        );
        assert!(identifier.component_mesh_vertices(1).is_empty());

        let mapping = identifier.delete_isolated_vertices();
        assert_eq!(mapping, vec![0, NO_ID, 1]);
        assert_eq!(identifier.nb_unique_vertices(), 2);
        assert_eq!(
            identifier.unique_vertex(&ComponentMeshVertex::new(line, 1)),
            1
        );
    }
}
