use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mesh::edged_curve::EdgedCurve;
use crate::mesh::point_set::PointSet;
use crate::mesh::solid_mesh::SolidMesh3;
use crate::mesh::surface_mesh::SurfaceMesh;

/// Topological nature of a model component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentType {
    Corner,
    Line,
    Surface,
    Block,
    ModelBoundary,
    CornerCollection,
    LineCollection,
    SurfaceCollection,
    BlockCollection,
}

impl ComponentType {
    /// Topological dimension for the meshed component types.
    pub fn dimension(self) -> Option<usize> {
        match self {
            ComponentType::Corner => Some(0),
            ComponentType::Line => Some(1),
            ComponentType::Surface => Some(2),
            ComponentType::Block => Some(3),
            _ => None,
        }
    }

    /// Token used in component-mesh file names.
    pub fn file_token(self) -> &'static str {
        match self {
            ComponentType::Corner => "corner",
            ComponentType::Line => "line",
            ComponentType::Surface => "surface",
            ComponentType::Block => "block",
            ComponentType::ModelBoundary => "model_boundary",
            ComponentType::CornerCollection => "corner_collection",
            ComponentType::LineCollection => "line_collection",
            ComponentType::SurfaceCollection => "surface_collection",
            ComponentType::BlockCollection => "block_collection",
        }
    }
}

/// Typed identity of one component of one model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId {
    component_type: ComponentType,
    id: Uuid,
}

impl ComponentId {
    pub fn new(component_type: ComponentType, id: Uuid) -> Self {
        Self { component_type, id }
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

fn default_name(kind: &str, id: Uuid) -> String {
    let id = id.simple().to_string();
    format!("{kind}_{}", &id[..8])
}

macro_rules! meshed_component {
    ($(#[$doc:meta])* $name:ident < const D > , $mesh:ty, $component_type:expr, $kind:literal) => {
        $(#[$doc])*
        #[derive(Clone, Debug, Serialize, Deserialize)]
        pub struct $name<const D: usize> {
            id: Uuid,
            name: String,
            mesh: $mesh,
        }

        impl<const D: usize> $name<D> {
            pub(crate) fn new(id: Uuid) -> Self {
                Self {
                    id,
                    name: default_name($kind, id),
                    mesh: <$mesh>::new(),
                }
            }

            pub fn id(&self) -> Uuid {
                self.id
            }

            pub fn component_id(&self) -> ComponentId {
                ComponentId::new($component_type, self.id)
            }

            pub fn name(&self) -> &str {
                &self.name
            }

            pub(crate) fn set_name(&mut self, name: String) {
                self.name = name;
            }

            pub fn mesh(&self) -> &$mesh {
                &self.mesh
            }

            pub(crate) fn mesh_mut(&mut self) -> &mut $mesh {
                &mut self.mesh
            }

            pub(crate) fn replace_mesh(&mut self, mesh: $mesh) -> $mesh {
                std::mem::replace(&mut self.mesh, mesh)
            }
        }
    };
}

meshed_component!(
    /// 0D component: one or a few isolated points.
    Corner<const D>, PointSet<D>, ComponentType::Corner, "corner"
);
meshed_component!(
    /// 1D component backed by an edged curve.
    Line<const D>, EdgedCurve<D>, ComponentType::Line, "line"
);
meshed_component!(
    /// 2D component backed by a surface mesh.
    Surface<const D>, SurfaceMesh<D>, ComponentType::Surface, "surface"
);

/// 3D component backed by a solid mesh.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    id: Uuid,
    name: String,
    mesh: SolidMesh3,
}

impl Block {
    pub(crate) fn new(id: Uuid) -> Self {
        Self {
            id,
            name: default_name("block", id),
            mesh: SolidMesh3::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn component_id(&self) -> ComponentId {
        ComponentId::new(ComponentType::Block, self.id)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn mesh(&self) -> &SolidMesh3 {
        &self.mesh
    }

    pub(crate) fn mesh_mut(&mut self) -> &mut SolidMesh3 {
        &mut self.mesh
    }

    pub(crate) fn replace_mesh(&mut self, mesh: SolidMesh3) -> SolidMesh3 {
        std::mem::replace(&mut self.mesh, mesh)
    }
}

/// Unmeshed component grouping the outer surfaces (or lines) of a model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelBoundary {
    id: Uuid,
    name: String,
}

impl ModelBoundary {
    pub(crate) fn new(id: Uuid) -> Self {
        Self {
            id,
            name: default_name("model_boundary", id),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn component_id(&self) -> ComponentId {
        ComponentId::new(ComponentType::ModelBoundary, self.id)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

/// Unmeshed component grouping items of one component type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComponentCollection {
    id: Uuid,
    name: String,
    component_type: ComponentType,
}

impl ComponentCollection {
    pub(crate) fn new(id: Uuid, component_type: ComponentType) -> Self {
        Self {
            id,
            name: default_name(component_type.file_token(), id),
            component_type,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn component_id(&self) -> ComponentId {
        ComponentId::new(self.component_type, self.id)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

/// Components of one kind, iterated in insertion order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComponentStore<T> {
    entries: Vec<(Uuid, T)>,
}

impl<T> Default for ComponentStore<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> ComponentStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn insert(&mut self, id: Uuid, component: T) {
        debug_assert!(self.get(id).is_none());
        self.entries.push((id, component));
    }

    pub(crate) fn remove(&mut self, id: Uuid) -> Option<T> {
        let position = self.entries.iter().position(|(entry, _)| *entry == id)?;
        Some(self.entries.remove(position).1)
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == id)
            .map(|(_, component)| component)
    }

    pub(crate) fn get_mut(&mut self, id: Uuid) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|(entry, _)| *entry == id)
            .map(|(_, component)| component)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, component)| component)
    }

    pub(crate) fn components_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().map(|(_, component)| component)
    }

    pub fn ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }
}
