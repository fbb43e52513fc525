use rustc_hash::FxHashMap;
use uuid::Uuid;

use super::ModelError;
use super::brep::BRep;
use super::component::{
    Block, ComponentCollection, ComponentId, ComponentType, Corner, Line, ModelBoundary, Surface,
};
use super::relationships::RelationKind;
use super::section::Section;
use super::vertex_identifier::ComponentMeshVertex;
use crate::basic::Index;
use crate::mesh::edged_curve::{EdgedCurve, EdgedCurveBuilder};
use crate::mesh::point_set::{PointSet, PointSetBuilder};
use crate::mesh::solid_mesh::{SolidMesh3, SolidMeshBuilder};
use crate::mesh::surface_mesh::{SurfaceMesh, SurfaceMeshBuilder};

/// Old component id -> new component id map produced by a whole-model copy.
#[derive(Clone, Debug, Default)]
pub struct ModelCopyMapping {
    mapping: FxHashMap<Uuid, Uuid>,
    types: FxHashMap<Uuid, ComponentType>,
}

impl ModelCopyMapping {
    fn insert(&mut self, component_type: ComponentType, old: Uuid, new: Uuid) {
        self.mapping.insert(old, new);
        self.types.insert(old, component_type);
    }

    pub fn converted(&self, old: Uuid) -> Option<Uuid> {
        self.mapping.get(&old).copied()
    }

    pub fn component_type(&self, old: Uuid) -> Option<ComponentType> {
        self.types.get(&old).copied()
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

macro_rules! model_builder_common {
    () => {
        pub fn create_unique_vertex(&mut self) -> Index {
            self.model.vertex_identifier.create_unique_vertex()
        }

        pub fn create_unique_vertices(&mut self, count: usize) -> Index {
            self.model.vertex_identifier.create_unique_vertices(count)
        }

        pub fn set_unique_vertex(&mut self, cmv: ComponentMeshVertex, unique_vertex: Index) {
            self.model.vertex_identifier.set_unique_vertex(cmv, unique_vertex);
        }

        pub fn unset_unique_vertex(&mut self, cmv: ComponentMeshVertex, unique_vertex: Index) {
            self.model
                .vertex_identifier
                .unset_unique_vertex(cmv, unique_vertex);
        }

        /// Propagates a component-mesh vertex deletion or permutation to the
        /// unique vertices.
        pub fn update_unique_vertices(&mut self, component: Uuid, old_to_new: &[Index]) {
            self.model
                .vertex_identifier
                .update_unique_vertices(component, old_to_new);
        }

        /// Compacts the unique vertex ids, returning the old -> new map.
        pub fn delete_isolated_unique_vertices(&mut self) -> Vec<Index> {
            self.model.vertex_identifier.delete_isolated_vertices()
        }

        fn check_component(&self, id: Uuid) -> Result<(), ModelError> {
            if self.model.relationships.has_component(id) {
                Ok(())
            } else {
                Err(ModelError::UnknownComponent(id))
            }
        }
    };
}

/// The only write path into a [`BRep`]: component creation and deletion,
/// mesh edition, relation registration and unique-vertex bookkeeping.
pub struct BRepBuilder<'a> {
    model: &'a mut BRep,
}

impl<'a> BRepBuilder<'a> {
    pub fn new(model: &'a mut BRep) -> Self {
        Self { model }
    }

    model_builder_common!();

    pub fn add_corner(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        let corner = Corner::new(id);
        self.model.relationships.register_component(corner.component_id());
        self.model
            .vertex_identifier
            .register_component(corner.component_id(), 0);
        self.model.corners.insert(id, corner);
        id
    }

    pub fn add_line(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        let line = Line::new(id);
        self.model.relationships.register_component(line.component_id());
        self.model
            .vertex_identifier
            .register_component(line.component_id(), 0);
        self.model.lines.insert(id, line);
        id
    }

    pub fn add_surface(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        let surface = Surface::new(id);
        self.model
            .relationships
            .register_component(surface.component_id());
        self.model
            .vertex_identifier
            .register_component(surface.component_id(), 0);
        self.model.surfaces.insert(id, surface);
        id
    }

    pub fn add_block(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        let block = Block::new(id);
        self.model.relationships.register_component(block.component_id());
        self.model
            .vertex_identifier
            .register_component(block.component_id(), 0);
        self.model.blocks.insert(id, block);
        id
    }

    pub fn add_model_boundary(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        let boundary = ModelBoundary::new(id);
        self.model
            .relationships
            .register_component(boundary.component_id());
        self.model.model_boundaries.insert(id, boundary);
        id
    }

    pub fn add_block_collection(&mut self) -> Uuid {
        self.add_collection(ComponentType::BlockCollection)
    }

    pub fn add_surface_collection(&mut self) -> Uuid {
        self.add_collection(ComponentType::SurfaceCollection)
    }

    pub fn add_line_collection(&mut self) -> Uuid {
        self.add_collection(ComponentType::LineCollection)
    }

    pub fn add_corner_collection(&mut self) -> Uuid {
        self.add_collection(ComponentType::CornerCollection)
    }

    fn add_collection(&mut self, component_type: ComponentType) -> Uuid {
        let id = Uuid::new_v4();
        let collection = ComponentCollection::new(id, component_type);
        self.model
            .relationships
            .register_component(collection.component_id());
        self.model.collections.insert(id, collection);
        id
    }

    pub fn remove_corner(&mut self, id: Uuid) -> Result<(), ModelError> {
        self.model
            .corners
            .remove(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        self.release_component(id);
        Ok(())
    }

    pub fn remove_line(&mut self, id: Uuid) -> Result<(), ModelError> {
        self.model
            .lines
            .remove(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        self.release_component(id);
        Ok(())
    }

    pub fn remove_surface(&mut self, id: Uuid) -> Result<(), ModelError> {
        self.model
            .surfaces
            .remove(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        self.release_component(id);
        Ok(())
    }

    pub fn remove_block(&mut self, id: Uuid) -> Result<(), ModelError> {
        self.model
            .blocks
            .remove(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        self.release_component(id);
        Ok(())
    }

    pub fn remove_model_boundary(&mut self, id: Uuid) -> Result<(), ModelError> {
        self.model
            .model_boundaries
            .remove(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        self.model.relationships.unregister_component(id);
        Ok(())
    }

    fn release_component(&mut self, id: Uuid) {
        self.model.relationships.unregister_component(id);
        self.model.vertex_identifier.unregister_component(id);
    }

    pub fn set_component_name(&mut self, id: Uuid, name: &str) -> Result<(), ModelError> {
        if let Some(corner) = self.model.corners.get_mut(id) {
            corner.set_name(name.to_owned());
        } else if let Some(line) = self.model.lines.get_mut(id) {
            line.set_name(name.to_owned());
        } else if let Some(surface) = self.model.surfaces.get_mut(id) {
            surface.set_name(name.to_owned());
        } else if let Some(block) = self.model.blocks.get_mut(id) {
            block.set_name(name.to_owned());
        } else if let Some(boundary) = self.model.model_boundaries.get_mut(id) {
            boundary.set_name(name.to_owned());
        } else if let Some(collection) = self.model.collections.get_mut(id) {
            collection.set_name(name.to_owned());
        } else {
            return Err(ModelError::UnknownComponent(id));
        }
        Ok(())
    }

    pub fn corner_mesh_builder(
        &mut self,
        id: Uuid,
    ) -> Result<PointSetBuilder<'_, 3>, ModelError> {
        let corner = self
            .model
            .corners
            .get_mut(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        Ok(PointSetBuilder::new(corner.mesh_mut()))
    }

    pub fn line_mesh_builder(
        &mut self,
        id: Uuid,
    ) -> Result<EdgedCurveBuilder<'_, 3>, ModelError> {
        let line = self
            .model
            .lines
            .get_mut(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        Ok(EdgedCurveBuilder::new(line.mesh_mut()))
    }

    pub fn surface_mesh_builder(
        &mut self,
        id: Uuid,
    ) -> Result<SurfaceMeshBuilder<'_, 3>, ModelError> {
        let surface = self
            .model
            .surfaces
            .get_mut(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        Ok(SurfaceMeshBuilder::new(surface.mesh_mut()))
    }

    pub fn block_mesh_builder(&mut self, id: Uuid) -> Result<SolidMeshBuilder<'_>, ModelError> {
        let block = self
            .model
            .blocks
            .get_mut(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        Ok(SolidMeshBuilder::new(block.mesh_mut()))
    }

    /// Installs a new corner mesh, resetting its unique-vertex associations,
    /// and returns the previous mesh.
    pub fn update_corner_mesh(
        &mut self,
        id: Uuid,
        mesh: PointSet<3>,
    ) -> Result<PointSet<3>, ModelError> {
        let corner = self
            .model
            .corners
            .get_mut(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        let nb_vertices = mesh.nb_vertices();
        let old = corner.replace_mesh(mesh);
        let component_id = corner.component_id();
        self.model
            .vertex_identifier
            .unregister_component(id);
        self.model
            .vertex_identifier
            .register_component(component_id, nb_vertices);
        Ok(old)
    }

    pub fn update_line_mesh(
        &mut self,
        id: Uuid,
        mesh: EdgedCurve<3>,
    ) -> Result<EdgedCurve<3>, ModelError> {
        let line = self
            .model
            .lines
            .get_mut(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        let nb_vertices = mesh.nb_vertices();
        let old = line.replace_mesh(mesh);
        let component_id = line.component_id();
        self.model.vertex_identifier.unregister_component(id);
        self.model
            .vertex_identifier
            .register_component(component_id, nb_vertices);
        Ok(old)
    }

    pub fn update_surface_mesh(
        &mut self,
        id: Uuid,
        mesh: SurfaceMesh<3>,
    ) -> Result<SurfaceMesh<3>, ModelError> {
        let surface = self
            .model
            .surfaces
            .get_mut(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        let nb_vertices = mesh.nb_vertices();
        let old = surface.replace_mesh(mesh);
        let component_id = surface.component_id();
        self.model.vertex_identifier.unregister_component(id);
        self.model
            .vertex_identifier
            .register_component(component_id, nb_vertices);
        Ok(old)
    }

    pub fn update_block_mesh(
        &mut self,
        id: Uuid,
        mesh: SolidMesh3,
    ) -> Result<SolidMesh3, ModelError> {
        let block = self
            .model
            .blocks
            .get_mut(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        let nb_vertices = mesh.nb_vertices();
        let old = block.replace_mesh(mesh);
        let component_id = block.component_id();
        self.model.vertex_identifier.unregister_component(id);
        self.model
            .vertex_identifier
            .register_component(component_id, nb_vertices);
        Ok(old)
    }

    fn component_id_of(&self, id: Uuid) -> Result<ComponentId, ModelError> {
        if let Some(corner) = self.model.corners.get(id) {
            return Ok(corner.component_id());
        }
        if let Some(line) = self.model.lines.get(id) {
            return Ok(line.component_id());
        }
        if let Some(surface) = self.model.surfaces.get(id) {
            return Ok(surface.component_id());
        }
        if let Some(block) = self.model.blocks.get(id) {
            return Ok(block.component_id());
        }
        if let Some(boundary) = self.model.model_boundaries.get(id) {
            return Ok(boundary.component_id());
        }
        if let Some(collection) = self.model.collections.get(id) {
            return Ok(collection.component_id());
        }
        Err(ModelError::UnknownComponent(id))
    }

    fn add_typed_relation(
        &mut self,
        from: Uuid,
        from_type: ComponentType,
        to: Uuid,
        to_type: ComponentType,
        kind: RelationKind,
    ) -> Result<(), ModelError> {
        let from = self.component_id_of(from)?;
        let to = self.component_id_of(to)?;
        if from.component_type() != from_type || to.component_type() != to_type {
            return Err(ModelError::InvalidRelation(
                from.component_type(),
                to.component_type(),
            ));
        }
        match kind {
            RelationKind::Boundary => self.model.relationships.add_boundary_relation(from, to),
            RelationKind::Internal => self.model.relationships.add_internal_relation(from, to),
            RelationKind::Item => self.model.relationships.add_item_relation(from, to),
        }
        Ok(())
    }

    pub fn add_corner_line_boundary_relationship(
        &mut self,
        corner: Uuid,
        line: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            corner,
            ComponentType::Corner,
            line,
            ComponentType::Line,
            RelationKind::Boundary,
        )
    }

    pub fn add_line_surface_boundary_relationship(
        &mut self,
        line: Uuid,
        surface: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            line,
            ComponentType::Line,
            surface,
            ComponentType::Surface,
            RelationKind::Boundary,
        )
    }

    pub fn add_surface_block_boundary_relationship(
        &mut self,
        surface: Uuid,
        block: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            surface,
            ComponentType::Surface,
            block,
            ComponentType::Block,
            RelationKind::Boundary,
        )
    }

    pub fn add_corner_surface_internal_relationship(
        &mut self,
        corner: Uuid,
        surface: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            corner,
            ComponentType::Corner,
            surface,
            ComponentType::Surface,
            RelationKind::Internal,
        )
    }

    pub fn add_corner_block_internal_relationship(
        &mut self,
        corner: Uuid,
        block: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            corner,
            ComponentType::Corner,
            block,
            ComponentType::Block,
            RelationKind::Internal,
        )
    }

    pub fn add_line_surface_internal_relationship(
        &mut self,
        line: Uuid,
        surface: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            line,
            ComponentType::Line,
            surface,
            ComponentType::Surface,
            RelationKind::Internal,
        )
    }

    pub fn add_line_block_internal_relationship(
        &mut self,
        line: Uuid,
        block: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            line,
            ComponentType::Line,
            block,
            ComponentType::Block,
            RelationKind::Internal,
        )
    }

    pub fn add_surface_block_internal_relationship(
        &mut self,
        surface: Uuid,
        block: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            surface,
            ComponentType::Surface,
            block,
            ComponentType::Block,
            RelationKind::Internal,
        )
    }

    pub fn add_surface_in_model_boundary(
        &mut self,
        surface: Uuid,
        boundary: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            surface,
            ComponentType::Surface,
            boundary,
            ComponentType::ModelBoundary,
            RelationKind::Item,
        )
    }

    pub fn add_corner_in_collection(
        &mut self,
        corner: Uuid,
        collection: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            corner,
            ComponentType::Corner,
            collection,
            ComponentType::CornerCollection,
            RelationKind::Item,
        )
    }

    pub fn add_line_in_collection(
        &mut self,
        line: Uuid,
        collection: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            line,
            ComponentType::Line,
            collection,
            ComponentType::LineCollection,
            RelationKind::Item,
        )
    }

    pub fn add_surface_in_collection(
        &mut self,
        surface: Uuid,
        collection: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            surface,
            ComponentType::Surface,
            collection,
            ComponentType::SurfaceCollection,
            RelationKind::Item,
        )
    }

    pub fn add_block_in_collection(
        &mut self,
        block: Uuid,
        collection: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            block,
            ComponentType::Block,
            collection,
            ComponentType::BlockCollection,
            RelationKind::Item,
        )
    }

    pub fn remove_relationship(&mut self, first: Uuid, second: Uuid) -> Result<(), ModelError> {
        self.check_component(first)?;
        self.check_component(second)?;
        self.model.relationships.remove_relation(first, second);
        Ok(())
    }

    /// Registers a named coordinate frame on every component mesh.
    pub fn register_model_coordinate_reference_system(&mut self, name: &str, definition: &str) {
        for corner in self.model.corners.components_mut() {
            corner
                .mesh_mut()
                .coordinate_reference_system_manager_mut()
                .register_coordinate_reference_system(name, definition.to_owned());
        }
        for line in self.model.lines.components_mut() {
            line.mesh_mut()
                .coordinate_reference_system_manager_mut()
                .register_coordinate_reference_system(name, definition.to_owned());
        }
        for surface in self.model.surfaces.components_mut() {
            surface
                .mesh_mut()
                .coordinate_reference_system_manager_mut()
                .register_coordinate_reference_system(name, definition.to_owned());
        }
        for block in self.model.blocks.components_mut() {
            block
                .mesh_mut()
                .coordinate_reference_system_manager_mut()
                .register_coordinate_reference_system(name, definition.to_owned());
        }
    }

    /// Makes a registered frame the active one on every component mesh;
    /// reports whether every mesh knew the frame.
    pub fn set_model_active_coordinate_reference_system(&mut self, name: &str) -> bool {
        let mut all_known = true;
        for corner in self.model.corners.components_mut() {
            all_known &= corner
                .mesh_mut()
                .coordinate_reference_system_manager_mut()
                .set_active_coordinate_reference_system(name);
        }
        for line in self.model.lines.components_mut() {
            all_known &= line
                .mesh_mut()
                .coordinate_reference_system_manager_mut()
                .set_active_coordinate_reference_system(name);
        }
        for surface in self.model.surfaces.components_mut() {
            all_known &= surface
                .mesh_mut()
                .coordinate_reference_system_manager_mut()
                .set_active_coordinate_reference_system(name);
        }
        for block in self.model.blocks.components_mut() {
            all_known &= block
                .mesh_mut()
                .coordinate_reference_system_manager_mut()
                .set_active_coordinate_reference_system(name);
        }
        all_known
    }

    /// Deep-copies every component, mesh, relation and unique vertex of
    /// `other` into this model under fresh component ids.
    pub fn copy(&mut self, other: &BRep) -> ModelCopyMapping {
        let mut mapping = ModelCopyMapping::default();
        for corner in other.corners() {
            let id = self.add_corner();
            mapping.insert(ComponentType::Corner, corner.id(), id);
            let mesh = corner.mesh().clone();
            self.update_corner_mesh(id, mesh).expect("fresh corner");
            self.set_component_name(id, corner.name()).expect("fresh corner");
        }
        for line in other.lines() {
            let id = self.add_line();
            mapping.insert(ComponentType::Line, line.id(), id);
            let mesh = line.mesh().clone();
            self.update_line_mesh(id, mesh).expect("fresh line");
            self.set_component_name(id, line.name()).expect("fresh line");
        }
        for surface in other.surfaces() {
            let id = self.add_surface();
            mapping.insert(ComponentType::Surface, surface.id(), id);
            let mesh = surface.mesh().clone();
            self.update_surface_mesh(id, mesh).expect("fresh surface");
            self.set_component_name(id, surface.name()).expect("fresh surface");
        }
        for block in other.blocks() {
            let id = self.add_block();
            mapping.insert(ComponentType::Block, block.id(), id);
            let mesh = block.mesh().clone();
            self.update_block_mesh(id, mesh).expect("fresh block");
            self.set_component_name(id, block.name()).expect("fresh block");
        }
        for boundary in other.model_boundaries() {
            let id = self.add_model_boundary();
            mapping.insert(ComponentType::ModelBoundary, boundary.id(), id);
            self.set_component_name(id, boundary.name()).expect("fresh boundary");
        }
        for collection in other.collections.iter() {
            let id = self.add_collection(collection.component_id().component_type());
            mapping.insert(
                collection.component_id().component_type(),
                collection.id(),
                id,
            );
            self.set_component_name(id, collection.name()).expect("fresh collection");
        }
        for (from, to, kind) in other.relationships().relations() {
            let (Some(from_new), Some(to_new)) =
                (mapping.converted(from.id()), mapping.converted(to.id()))
            else {
                continue;
            };
            let from = ComponentId::new(from.component_type(), from_new);
            let to = ComponentId::new(to.component_type(), to_new);
            match kind {
                RelationKind::Boundary => {
                    self.model.relationships.add_boundary_relation(from, to);
                }
                RelationKind::Internal => {
                    self.model.relationships.add_internal_relation(from, to);
                }
                RelationKind::Item => {
                    self.model.relationships.add_item_relation(from, to);
                }
            }
        }
        let identifier = other.vertex_identifier();
        let first = self
            .model
            .vertex_identifier
            .create_unique_vertices(identifier.nb_unique_vertices());
        for unique in 0..identifier.nb_unique_vertices() as Index {
            for cmv in identifier.component_mesh_vertices(unique) {
                let Some(new_component) = mapping.converted(cmv.component.id()) else {
                    continue;
                };
                let component =
                    ComponentId::new(cmv.component.component_type(), new_component);
                self.model.vertex_identifier.set_unique_vertex(
                    ComponentMeshVertex::new(component, cmv.vertex),
                    first + unique,
                );
            }
        }
        log::debug!("copied model with {} components", mapping.len());
        mapping
    }
}

/// The only write path into a [`Section`].
pub struct SectionBuilder<'a> {
    model: &'a mut Section,
}

impl<'a> SectionBuilder<'a> {
    pub fn new(model: &'a mut Section) -> Self {
        Self { model }
    }

    model_builder_common!();

    pub fn add_corner(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        let corner = Corner::new(id);
        self.model.relationships.register_component(corner.component_id());
        self.model
            .vertex_identifier
            .register_component(corner.component_id(), 0);
        self.model.corners.insert(id, corner);
        id
    }

    pub fn add_line(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        let line = Line::new(id);
        self.model.relationships.register_component(line.component_id());
        self.model
            .vertex_identifier
            .register_component(line.component_id(), 0);
        self.model.lines.insert(id, line);
        id
    }

    pub fn add_surface(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        let surface = Surface::new(id);
        self.model
            .relationships
            .register_component(surface.component_id());
        self.model
            .vertex_identifier
            .register_component(surface.component_id(), 0);
        self.model.surfaces.insert(id, surface);
        id
    }

    pub fn add_model_boundary(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        let boundary = ModelBoundary::new(id);
        self.model
            .relationships
            .register_component(boundary.component_id());
        self.model.model_boundaries.insert(id, boundary);
        id
    }

    pub fn add_surface_collection(&mut self) -> Uuid {
        self.add_collection(ComponentType::SurfaceCollection)
    }

    pub fn add_line_collection(&mut self) -> Uuid {
        self.add_collection(ComponentType::LineCollection)
    }

    pub fn add_corner_collection(&mut self) -> Uuid {
        self.add_collection(ComponentType::CornerCollection)
    }

    fn add_collection(&mut self, component_type: ComponentType) -> Uuid {
        let id = Uuid::new_v4();
        let collection = ComponentCollection::new(id, component_type);
        self.model
            .relationships
            .register_component(collection.component_id());
        self.model.collections.insert(id, collection);
        id
    }

    pub fn remove_corner(&mut self, id: Uuid) -> Result<(), ModelError> {
        self.model
            .corners
            .remove(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        self.model.relationships.unregister_component(id);
        self.model.vertex_identifier.unregister_component(id);
        Ok(())
    }

    pub fn remove_line(&mut self, id: Uuid) -> Result<(), ModelError> {
        self.model
            .lines
            .remove(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        self.model.relationships.unregister_component(id);
        self.model.vertex_identifier.unregister_component(id);
        Ok(())
    }

    pub fn remove_surface(&mut self, id: Uuid) -> Result<(), ModelError> {
        self.model
            .surfaces
            .remove(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        self.model.relationships.unregister_component(id);
        self.model.vertex_identifier.unregister_component(id);
        Ok(())
    }

    pub fn set_component_name(&mut self, id: Uuid, name: &str) -> Result<(), ModelError> {
        if let Some(corner) = self.model.corners.get_mut(id) {
            corner.set_name(name.to_owned());
        } else if let Some(line) = self.model.lines.get_mut(id) {
            line.set_name(name.to_owned());
        } else if let Some(surface) = self.model.surfaces.get_mut(id) {
            surface.set_name(name.to_owned());
        } else if let Some(boundary) = self.model.model_boundaries.get_mut(id) {
            boundary.set_name(name.to_owned());
        } else if let Some(collection) = self.model.collections.get_mut(id) {
            collection.set_name(name.to_owned());
        } else {
            return Err(ModelError::UnknownComponent(id));
        }
        Ok(())
    }

    pub fn corner_mesh_builder(
        &mut self,
        id: Uuid,
    ) -> Result<PointSetBuilder<'_, 2>, ModelError> {
        let corner = self
            .model
            .corners
            .get_mut(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        Ok(PointSetBuilder::new(corner.mesh_mut()))
    }

    pub fn line_mesh_builder(
        &mut self,
        id: Uuid,
    ) -> Result<EdgedCurveBuilder<'_, 2>, ModelError> {
        let line = self
            .model
            .lines
            .get_mut(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        Ok(EdgedCurveBuilder::new(line.mesh_mut()))
    }

    pub fn surface_mesh_builder(
        &mut self,
        id: Uuid,
    ) -> Result<SurfaceMeshBuilder<'_, 2>, ModelError> {
        let surface = self
            .model
            .surfaces
            .get_mut(id)
            .ok_or(ModelError::UnknownComponent(id))?;
        Ok(SurfaceMeshBuilder::new(surface.mesh_mut()))
    }

    fn component_id_of(&self, id: Uuid) -> Result<ComponentId, ModelError> {
        if let Some(corner) = self.model.corners.get(id) {
            return Ok(corner.component_id());
        }
        if let Some(line) = self.model.lines.get(id) {
            return Ok(line.component_id());
        }
        if let Some(surface) = self.model.surfaces.get(id) {
            return Ok(surface.component_id());
        }
        if let Some(boundary) = self.model.model_boundaries.get(id) {
            return Ok(boundary.component_id());
        }
        if let Some(collection) = self.model.collections.get(id) {
            return Ok(collection.component_id());
        }
        Err(ModelError::UnknownComponent(id))
    }

    fn add_typed_relation(
        &mut self,
        from: Uuid,
        from_type: ComponentType,
        to: Uuid,
        to_type: ComponentType,
        kind: RelationKind,
    ) -> Result<(), ModelError> {
        let from = self.component_id_of(from)?;
        let to = self.component_id_of(to)?;
        if from.component_type() != from_type || to.component_type() != to_type {
            return Err(ModelError::InvalidRelation(
                from.component_type(),
                to.component_type(),
            ));
        }
        match kind {
            RelationKind::Boundary => self.model.relationships.add_boundary_relation(from, to),
            RelationKind::Internal => self.model.relationships.add_internal_relation(from, to),
            RelationKind::Item => self.model.relationships.add_item_relation(from, to),
        }
        Ok(())
    }

    pub fn add_corner_line_boundary_relationship(
        &mut self,
        corner: Uuid,
        line: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            corner,
            ComponentType::Corner,
            line,
            ComponentType::Line,
            RelationKind::Boundary,
        )
    }

    pub fn add_line_surface_boundary_relationship(
        &mut self,
        line: Uuid,
        surface: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            line,
            ComponentType::Line,
            surface,
            ComponentType::Surface,
            RelationKind::Boundary,
        )
    }

    pub fn add_corner_surface_internal_relationship(
        &mut self,
        corner: Uuid,
        surface: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            corner,
            ComponentType::Corner,
            surface,
            ComponentType::Surface,
            RelationKind::Internal,
        )
    }

    pub fn add_line_surface_internal_relationship(
        &mut self,
        line: Uuid,
        surface: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            line,
            ComponentType::Line,
            surface,
            ComponentType::Surface,
            RelationKind::Internal,
        )
    }

    pub fn add_line_in_model_boundary(
        &mut self,
        line: Uuid,
        boundary: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            line,
            ComponentType::Line,
            boundary,
            ComponentType::ModelBoundary,
            RelationKind::Item,
        )
    }

    pub fn add_corner_in_collection(
        &mut self,
        corner: Uuid,
        collection: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            corner,
            ComponentType::Corner,
            collection,
            ComponentType::CornerCollection,
            RelationKind::Item,
        )
    }

    pub fn add_line_in_collection(
        &mut self,
        line: Uuid,
        collection: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            line,
            ComponentType::Line,
            collection,
            ComponentType::LineCollection,
            RelationKind::Item,
        )
    }

    pub fn add_surface_in_collection(
        &mut self,
        surface: Uuid,
        collection: Uuid,
    ) -> Result<(), ModelError> {
        self.add_typed_relation(
            surface,
            ComponentType::Surface,
            collection,
            ComponentType::SurfaceCollection,
            RelationKind::Item,
        )
    }

    pub fn remove_relationship(&mut self, first: Uuid, second: Uuid) -> Result<(), ModelError> {
        self.check_component(first)?;
        self.check_component(second)?;
        self.model.relationships.remove_relation(first, second);
        Ok(())
    }
}
