use serde::{Deserialize, Serialize};

use super::MeshError;
use super::facet_storage::FacetStorage;
use super::vertex_cycle::VertexCycle;
use crate::basic::{AttributeManager, Index};

/// Unique edges of a surface mesh, keyed by their unordered vertex pair.
///
/// Lives and dies with the owning mesh: polygon creation and deletion adjust
/// the per-edge reference counters, vertex renames rebuild the lookup.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SurfaceEdges {
    storage: FacetStorage,
}

impl SurfaceEdges {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn nb_edges(&self) -> usize {
        self.storage.nb_facets()
    }

    pub fn edge_vertices(&self, edge: Index) -> [Index; 2] {
        let vertices = self.storage.facet_vertices(edge);
        [vertices[0], vertices[1]]
    }

    pub fn edge_from_vertices(&self, vertices: [Index; 2]) -> Option<Index> {
        self.storage.find_facet(&VertexCycle::from(vertices))
    }

    pub fn edge_attribute_manager(&self) -> &AttributeManager {
        self.storage.attribute_manager()
    }

    pub fn edge_attribute_manager_mut(&mut self) -> &mut AttributeManager {
        self.storage.attribute_manager_mut()
    }

    pub(crate) fn find_or_create_edge(&mut self, vertices: [Index; 2]) -> Index {
        self.storage.add_facet(&vertices)
    }

    pub(crate) fn remove_edge(&mut self, vertices: [Index; 2]) {
        self.storage.remove_facet(&vertices);
    }

    /// Drops unreferenced edges, returning the old -> new edge map.
    pub fn clean_edges(&mut self) -> Result<Vec<Index>, MeshError> {
        self.storage.clean_facets()
    }

    pub(crate) fn update_edge_vertices(&mut self, old_to_new: &[Index]) {
        self.storage.update_facet_vertices(old_to_new);
    }
}
