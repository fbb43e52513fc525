use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::component::{
    ComponentCollection, ComponentStore, Corner, Line, ModelBoundary, Surface,
};
use super::relationships::Relationships;
use super::vertex_identifier::VertexIdentifier;
use crate::geometry::BoundingBox;

/// 2D boundary-representation model: corners, lines and surfaces tied
/// together by relationships and unique vertices.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Section {
    pub(crate) corners: ComponentStore<Corner<2>>,
    pub(crate) lines: ComponentStore<Line<2>>,
    pub(crate) surfaces: ComponentStore<Surface<2>>,
    pub(crate) model_boundaries: ComponentStore<ModelBoundary>,
    pub(crate) collections: ComponentStore<ComponentCollection>,
    pub(crate) relationships: Relationships,
    pub(crate) vertex_identifier: VertexIdentifier,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nb_corners(&self) -> usize {
        self.corners.len()
    }

    pub fn nb_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn nb_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    pub fn nb_model_boundaries(&self) -> usize {
        self.model_boundaries.len()
    }

    pub fn corner(&self, id: Uuid) -> Option<&Corner<2>> {
        self.corners.get(id)
    }

    pub fn line(&self, id: Uuid) -> Option<&Line<2>> {
        self.lines.get(id)
    }

    pub fn surface(&self, id: Uuid) -> Option<&Surface<2>> {
        self.surfaces.get(id)
    }

    pub fn model_boundary(&self, id: Uuid) -> Option<&ModelBoundary> {
        self.model_boundaries.get(id)
    }

    pub fn collection(&self, id: Uuid) -> Option<&ComponentCollection> {
        self.collections.get(id)
    }

    pub fn corners(&self) -> impl Iterator<Item = &Corner<2>> {
        self.corners.iter()
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line<2>> {
        self.lines.iter()
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &Surface<2>> {
        self.surfaces.iter()
    }

    pub fn model_boundaries(&self) -> impl Iterator<Item = &ModelBoundary> {
        self.model_boundaries.iter()
    }

    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    pub fn vertex_identifier(&self) -> &VertexIdentifier {
        &self.vertex_identifier
    }

    pub fn bounding_box(&self) -> BoundingBox<2> {
        let mut bbox = BoundingBox::new();
        for corner in self.corners() {
            bbox.add_box(&corner.mesh().bounding_box());
        }
        for line in self.lines() {
            bbox.add_box(&line.mesh().bounding_box());
        }
        for surface in self.surfaces() {
            bbox.add_box(&surface.mesh().bounding_box());
        }
        bbox
    }
}
