use serde::{Deserialize, Serialize};

use super::MeshError;
use crate::basic::{AttributeManager, Index};

/// A bag of anonymous vertices carrying attributes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VertexSet {
    attributes: AttributeManager,
}

impl VertexSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nb_vertices(&self) -> usize {
        self.attributes.nb_elements()
    }

    pub fn vertex_attribute_manager(&self) -> &AttributeManager {
        &self.attributes
    }

    pub fn vertex_attribute_manager_mut(&mut self) -> &mut AttributeManager {
        &mut self.attributes
    }
}

/// Edits a [`VertexSet`].
pub struct VertexSetBuilder<'a> {
    mesh: &'a mut VertexSet,
}

impl<'a> VertexSetBuilder<'a> {
    pub fn new(mesh: &'a mut VertexSet) -> Self {
        Self { mesh }
    }

    pub fn create_vertex(&mut self) -> Index {
        self.mesh.attributes.create_element()
    }

    /// Creates `count` vertices, returning the first new index.
    pub fn create_vertices(&mut self, count: usize) -> Index {
        let first = self.mesh.nb_vertices() as Index;
        self.mesh.attributes.resize(self.mesh.nb_vertices() + count);
        first
    }

    /// Compacts the vertex set, returning the old index -> new index map.
    pub fn delete_vertices(&mut self, to_delete: &[bool]) -> Result<Vec<Index>, MeshError> {
        Ok(self.mesh.attributes.delete_elements(to_delete)?)
    }

    pub fn permute_vertices(&mut self, permutation: &[Index]) -> Result<(), MeshError> {
        Ok(self.mesh.attributes.permute_elements(permutation)?)
    }
}
