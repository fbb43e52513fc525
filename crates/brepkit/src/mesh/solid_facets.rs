use serde::{Deserialize, Serialize};

use super::MeshError;
use super::facet_storage::FacetStorage;
use super::vertex_cycle::VertexCycle;
use crate::basic::{AttributeManager, Index};

/// Unique facets of a solid mesh, keyed by their vertex cycle.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SolidFacets {
    storage: FacetStorage,
}

impl SolidFacets {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn nb_facets(&self) -> usize {
        self.storage.nb_facets()
    }

    pub fn facet_vertices(&self, facet: Index) -> &[Index] {
        self.storage.facet_vertices(facet)
    }

    pub fn facet_from_vertices(&self, vertices: &[Index]) -> Option<Index> {
        self.storage.find_facet(&VertexCycle::new(vertices))
    }

    pub fn facet_attribute_manager(&self) -> &AttributeManager {
        self.storage.attribute_manager()
    }

    pub fn facet_attribute_manager_mut(&mut self) -> &mut AttributeManager {
        self.storage.attribute_manager_mut()
    }

    pub(crate) fn find_or_create_facet(&mut self, vertices: &[Index]) -> Index {
        self.storage.add_facet(vertices)
    }

    pub(crate) fn remove_facet(&mut self, vertices: &[Index]) {
        self.storage.remove_facet(vertices);
    }

    /// Drops unreferenced facets, returning the old -> new facet map.
    pub fn clean_facets(&mut self) -> Result<Vec<Index>, MeshError> {
        self.storage.clean_facets()
    }

    pub(crate) fn update_facet_vertices(&mut self, old_to_new: &[Index]) {
        self.storage.update_facet_vertices(old_to_new);
    }
}

/// Unique edges of a solid mesh, keyed by their unordered vertex pair.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SolidEdges {
    storage: FacetStorage,
}

impl SolidEdges {
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
