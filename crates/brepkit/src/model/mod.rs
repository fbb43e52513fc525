/// Component identities and the typed component stores.
pub mod component;

/// The typed relation graph between components.
pub mod relationships;

/// Model-wide unique vertices backed by component-mesh vertices.
pub mod vertex_identifier;

/// 2D models: corners, lines and surfaces.
pub mod section;

/// 3D models: corners, lines, surfaces and blocks.
pub mod brep;

/// The only write paths into a model.
pub mod builder;

/// Queries spanning several components of a model.
pub mod helpers;

pub use self::brep::BRep;
pub use self::builder::{BRepBuilder, ModelCopyMapping, SectionBuilder};
pub use self::component::{
    Block, ComponentCollection, ComponentId, ComponentStore, ComponentType, Corner, Line,
    ModelBoundary, Surface,
};
pub use self::relationships::{RelationKind, Relationships};
pub use self::section::Section;
pub use self::vertex_identifier::{ComponentMeshVertex, VertexIdentifier};

use thiserror::Error;

use crate::mesh::MeshError;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("unknown component {0}")]
    UnknownComponent(uuid::Uuid),
    #[error("relation between {0:?} and {1:?} is not allowed")]
    InvalidRelation(ComponentType, ComponentType),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}
