/// Type-erased, per-element keyed attribute storage.
///
/// Attributes are created and retrieved by name through an
/// [`AttributeManager`](attribute_manager::AttributeManager); every attribute
/// of a manager is kept in lockstep when elements are resized, deleted or
/// permuted.
pub mod attribute;
pub mod attribute_manager;

pub use self::attribute::{
    Attribute, AttributeError, AttributeHandle, AttributeProperties, AttributeValue, StorageKind,
};
pub use self::attribute_manager::{AttributeManager, AttributeSerializerRegistry};

/// Index of an element inside its container.
///
/// Kept at 32 bits to halve connectivity memory on large meshes.
pub type Index = u32;

/// Ordinal of a sub-element inside its element (vertex-of-polygon,
/// facet-of-polyhedron).
pub type LocalIndex = u8;

/// Sentinel for an absent or deleted index.
pub const NO_ID: Index = Index::MAX;

/// Sentinel for an absent local index.
pub const NO_LID: LocalIndex = LocalIndex::MAX;
