use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::attribute::{
    Attribute, AttributeBase, AttributeError, AttributeHandle, AttributeProperties, AttributeValue,
    SharedAttribute, StorageKind, deletion_mapping,
};
use super::{Index, NO_ID};

/// Owns every attribute of one element container and keeps them in lockstep.
///
/// The manager knows the number of elements; each non-constant attribute holds
/// exactly that many logical entries. Resizing, deleting and permuting
/// elements fan out to every attribute atomically with respect to external
/// readers.
#[derive(Default)]
pub struct AttributeManager {
    nb_elements: usize,
    attributes: BTreeMap<String, SharedAttribute>,
}

impl AttributeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nb_elements(&self) -> usize {
        self.nb_elements
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn attribute_exists(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Tag of the value type stored under `name`.
    pub fn attribute_type(&self, name: &str) -> Result<&'static str, AttributeError> {
        self.attributes
            .get(name)
            .map(|attribute| attribute.read().type_tag())
            .ok_or_else(|| AttributeError::AttributeMissing(name.to_owned()))
    }

    pub fn attribute_storage_kind(&self, name: &str) -> Result<StorageKind, AttributeError> {
        self.attributes
            .get(name)
            .map(|attribute| attribute.read().storage_kind())
            .ok_or_else(|| AttributeError::AttributeMissing(name.to_owned()))
    }

    pub fn attribute_properties(&self, name: &str) -> Result<AttributeProperties, AttributeError> {
        self.attributes
            .get(name)
            .map(|attribute| attribute.read().properties())
            .ok_or_else(|| AttributeError::AttributeMissing(name.to_owned()))
    }

    /// Typed handle to an existing attribute.
    pub fn find_attribute<T: AttributeValue>(
        &self,
        name: &str,
    ) -> Result<AttributeHandle<T>, AttributeError> {
        let attribute = self
            .attributes
            .get(name)
            .ok_or_else(|| AttributeError::AttributeMissing(name.to_owned()))?;
        let stored = attribute.read().type_tag();
        if stored != T::type_tag() {
            return Err(AttributeError::AttributeTypeMismatch {
                name: name.to_owned(),
                stored,
                requested: T::type_tag(),
            });
        }
        Ok(AttributeHandle::new(Arc::clone(attribute)))
    }

    pub fn find_or_create_constant_attribute<T: AttributeValue>(
        &mut self,
        name: &str,
        value: T,
        properties: AttributeProperties,
    ) -> Result<AttributeHandle<T>, AttributeError> {
        self.find_or_create(name, StorageKind::Constant, || {
            Attribute::constant(value, properties)
        })
    }

    pub fn find_or_create_variable_attribute<T: AttributeValue>(
        &mut self,
        name: &str,
        default: T,
        properties: AttributeProperties,
    ) -> Result<AttributeHandle<T>, AttributeError> {
        let size = self.nb_elements;
        self.find_or_create(name, StorageKind::Dense, || {
            Attribute::dense(size, default, properties)
        })
    }

    pub fn find_or_create_sparse_attribute<T: AttributeValue>(
        &mut self,
        name: &str,
        default: T,
        properties: AttributeProperties,
    ) -> Result<AttributeHandle<T>, AttributeError> {
        self.find_or_create(name, StorageKind::Sparse, || {
            Attribute::sparse(default, properties)
        })
    }

    fn find_or_create<T: AttributeValue>(
        &mut self,
        name: &str,
        kind: StorageKind,
        create: impl FnOnce() -> Attribute<T>,
    ) -> Result<AttributeHandle<T>, AttributeError> {
        if let Some(existing) = self.attributes.get(name) {
            let (stored_tag, stored_kind) = {
                let guard = existing.read();
                (guard.type_tag(), guard.storage_kind())
            };
            if stored_tag == T::type_tag() && stored_kind == kind {
                return Ok(AttributeHandle::new(Arc::clone(existing)));
            }
            // Replacing a shared attribute would leave live handles watching a
            // storage the manager no longer tracks.
            if Arc::strong_count(existing) > 1 {
                if stored_tag != T::type_tag() {
                    return Err(AttributeError::AttributeTypeMismatch {
                        name: name.to_owned(),
                        stored: stored_tag,
                        requested: T::type_tag(),
                    });
                }
                return Err(AttributeError::AttributeStorageConflict(name.to_owned()));
            }
        }
        let attribute: SharedAttribute = Arc::new(RwLock::new(create()));
        self.attributes.insert(name.to_owned(), Arc::clone(&attribute));
        Ok(AttributeHandle::new(attribute))
    }

    /// Idempotent removal; live handles keep their storage but are no longer
    /// tracked by the manager.
    pub fn delete_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }

    /// Drops every attribute and empties the index space.
    pub fn clear(&mut self) {
        self.attributes.clear();
        self.nb_elements = 0;
    }

    /// Keeps the attributes but drops all their content.
    pub fn clear_attributes(&mut self) {
        self.resize(0);
    }

    pub fn resize(&mut self, size: usize) {
        if size == self.nb_elements {
            return;
        }
        self.nb_elements = size;
        for attribute in self.attributes.values() {
            attribute.write().resize(size);
        }
    }

    /// Reserves one more element on every attribute and returns its index.
    pub(crate) fn create_element(&mut self) -> Index {
        let created = self.nb_elements as Index;
        self.resize(self.nb_elements + 1);
        created
    }

    /// Compacts all attributes, dropping flagged elements while preserving the
    /// relative order of the survivors. Returns the old index -> new index
    /// map, with [`NO_ID`] marking deleted elements.
    pub fn delete_elements(&mut self, to_delete: &[bool]) -> Result<Vec<Index>, AttributeError> {
        if to_delete.len() != self.nb_elements {
            return Err(AttributeError::SizeMismatch {
                expected: self.nb_elements,
                got: to_delete.len(),
            });
        }
        if !to_delete.contains(&true) {
            return Ok((0..self.nb_elements as Index).collect());
        }
        for attribute in self.attributes.values() {
            attribute.write().delete_elements(to_delete);
        }
        let mapping = deletion_mapping(to_delete);
        self.nb_elements = mapping.iter().filter(|&&new| new != NO_ID).count();
        Ok(mapping)
    }

    /// Applies the same reordering to every attribute; `permutation[old]` is
    /// the destination index.
    pub fn permute_elements(&mut self, permutation: &[Index]) -> Result<(), AttributeError> {
        if permutation.len() != self.nb_elements {
            return Err(AttributeError::SizeMismatch {
                expected: self.nb_elements,
                got: permutation.len(),
            });
        }
        for attribute in self.attributes.values() {
            attribute.write().permute_elements(permutation);
        }
        Ok(())
    }

    /// Takes over the element count and attributes of `other`. Attributes
    /// already present with the same value type are value-copied so existing
    /// handles keep observing them; the rest are deep-cloned in.
    pub fn copy_from(&mut self, other: &AttributeManager) {
        self.nb_elements = other.nb_elements;
        for (name, source) in &other.attributes {
            let source_guard = source.read();
            if let Some(existing) = self.attributes.get(name) {
                if existing.write().copy_values_from(&*source_guard) {
                    continue;
                }
            }
            self.attributes
                .insert(name.clone(), source_guard.clone_shared());
        }
    }

    /// Number of float-convertible items per value of the named attribute;
    /// zero when the attribute cannot be viewed generically.
    pub fn nb_items(&self, name: &str) -> Result<usize, AttributeError> {
        self.attributes
            .get(name)
            .map(|attribute| attribute.read().nb_items())
            .ok_or_else(|| AttributeError::AttributeMissing(name.to_owned()))
    }

    /// Float view of one item of one element, for generic consumers.
    pub fn generic_value(
        &self,
        name: &str,
        element: Index,
        item: usize,
    ) -> Result<f64, AttributeError> {
        let attribute = self
            .attributes
            .get(name)
            .ok_or_else(|| AttributeError::AttributeMissing(name.to_owned()))?;
        if element as usize >= self.nb_elements {
            return Err(AttributeError::OutOfRange {
                element,
                size: self.nb_elements,
            });
        }
        Ok(attribute.read().generic_value(element, item))
    }

    pub(crate) fn to_record(&self) -> Result<AttributeManagerRecord, serde_json::Error> {
        let mut attributes = BTreeMap::new();
        for (name, attribute) in &self.attributes {
            let guard = attribute.read();
            attributes.insert(
                name.clone(),
                AttributeRecord {
                    type_tag: guard.type_tag().to_owned(),
                    payload: guard.serialize_payload()?,
                },
            );
        }
        Ok(AttributeManagerRecord {
            nb_elements: self.nb_elements,
            attributes,
        })
    }

    pub fn from_record(
        record: AttributeManagerRecord,
        registry: &AttributeSerializerRegistry,
    ) -> Result<Self, AttributeError> {
        let mut attributes = BTreeMap::new();
        for (name, attribute) in record.attributes {
            let deserializer = registry.deserializers.get(attribute.type_tag.as_str()).ok_or(
                AttributeError::UnregisteredType(attribute.type_tag.clone()),
            )?;
            let attribute = deserializer(attribute.payload)
                .map_err(|error| AttributeError::Payload(error.to_string()))?;
            attributes.insert(name, attribute);
        }
        Ok(Self {
            nb_elements: record.nb_elements,
            attributes,
        })
    }
}

impl Clone for AttributeManager {
    fn clone(&self) -> Self {
        let mut cloned = Self::new();
        cloned.copy_from(self);
        cloned
    }
}

impl std::fmt::Debug for AttributeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeManager")
            .field("nb_elements", &self.nb_elements)
            .field("attributes", &self.attributes.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Serialized form of one attribute: its value-type tag plus the storage
/// payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttributeRecord {
    type_tag: String,
    payload: serde_json::Value,
}

/// Serialized form of a whole manager.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttributeManagerRecord {
    nb_elements: usize,
    attributes: BTreeMap<String, AttributeRecord>,
}

type AttributeDeserializer = fn(serde_json::Value) -> Result<SharedAttribute, serde_json::Error>;

fn deserialize_attribute<T: AttributeValue>(
    payload: serde_json::Value,
) -> Result<SharedAttribute, serde_json::Error> {
    let attribute: Attribute<T> = serde_json::from_value(payload)?;
    Ok(Arc::new(RwLock::new(attribute)))
}

/// Maps attribute type tags to their deserializers.
///
/// Custom value types must be registered here before their managers can be
/// loaded back; the built-in scalar, point and array types are always known.
pub struct AttributeSerializerRegistry {
    deserializers: FxHashMap<&'static str, AttributeDeserializer>,
}

impl AttributeSerializerRegistry {
    pub fn register<T: AttributeValue>(&mut self) {
        self.deserializers
            .insert(T::type_tag(), deserialize_attribute::<T>);
    }
}

impl Default for AttributeSerializerRegistry {
    fn default() -> Self {
        let mut registry = Self {
            deserializers: FxHashMap::default(),
        };
        registry.register::<bool>();
        registry.register::<u8>();
        registry.register::<u32>();
        registry.register::<u64>();
        registry.register::<i32>();
        registry.register::<i64>();
        registry.register::<f64>();
        registry.register::<String>();
        registry.register::<nalgebra::Point2<f64>>();
        registry.register::<nalgebra::Point3<f64>>();
        registry.register::<[f64; 2]>();
        registry.register::<[f64; 3]>();
        registry.register::<[f64; 4]>();
        registry
    }
}

impl Serialize for AttributeManager {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AttributeManager {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = AttributeManagerRecord::deserialize(deserializer)?;
        Self::from_record(record, &AttributeSerializerRegistry::default())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_across_flavours() {
        let mut manager = AttributeManager::new();
        manager.resize(10);

        let constant = manager
            .find_or_create_constant_attribute("c", true, AttributeProperties::default())
            .unwrap();
        constant.set_value(0, false);
        assert!(!constant.value(12));

        let variable = manager
            .find_or_create_variable_attribute("i", 12_i32, AttributeProperties::default())
            .unwrap();
        variable.set_value(3, 3);
        assert_eq!(variable.value(3), 3);
        assert_eq!(variable.value(6), 12);

        let sparse = manager
            .find_or_create_sparse_attribute("d", 12.0, AttributeProperties::default())
            .unwrap();
        sparse.set_value(3, 3.0);
        assert_eq!(sparse.value(6), 12.0);

        let mut to_delete = vec![false; 10];
        to_delete[3] = true;
        to_delete[5] = true;
        let mapping = manager.delete_elements(&to_delete).unwrap();
        assert_eq!(manager.nb_elements(), 8);
        assert_eq!(mapping[3], NO_ID);
        assert_eq!(mapping[4], 3);
        assert_eq!(variable.value(3), 12);
        assert_eq!(sparse.value(3), 12.0);
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let mut manager = AttributeManager::new();
        manager.resize(4);
        manager
            .find_or_create_variable_attribute("value", 0.0_f64, AttributeProperties::default())
            .unwrap();
        let error = manager.find_attribute::<u32>("value").unwrap_err();
        assert!(matches!(
            error,
            AttributeError::AttributeTypeMismatch { .. }
        ));
    }

    #[test]
    fn storage_conflict_requires_unreferenced_attribute() {
        let mut manager = AttributeManager::new();
        manager.resize(4);
        let handle = manager
            .find_or_create_variable_attribute("value", 0.0_f64, AttributeProperties::default())
            .unwrap();
        let error = manager
            .find_or_create_sparse_attribute("value", 0.0_f64, AttributeProperties::default())
            .unwrap_err();
        assert!(matches!(error, AttributeError::AttributeStorageConflict(_)));
        drop(handle);
        // With no live handle left, the storage flavour may be swapped.
        manager
            .find_or_create_sparse_attribute("value", 0.0_f64, AttributeProperties::default())
            .unwrap();
        assert_eq!(
            manager.attribute_storage_kind("value").unwrap(),
            StorageKind::Sparse
        );
    }

    #[test]
    fn serialization_round_trip() {
        let mut manager = AttributeManager::new();
        manager.resize(5);
        let heights = manager
            .find_or_create_variable_attribute("height", 0.0, AttributeProperties::default())
            .unwrap();
        heights.set_value(2, 4.5);
        let labels = manager
            .find_or_create_sparse_attribute("label", 7_u32, AttributeProperties::default())
            .unwrap();
        labels.set_value(1, 3);

        let json = serde_json::to_string(&manager).unwrap();
        let reloaded: AttributeManager = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded.nb_elements(), 5);
        let heights = reloaded.find_attribute::<f64>("height").unwrap();
        assert_eq!(heights.value(2), 4.5);
        assert_eq!(heights.value(0), 0.0);
        let labels = reloaded.find_attribute::<u32>("label").unwrap();
        assert_eq!(labels.value(1), 3);
        assert_eq!(labels.value(4), 7);
    }

    #[test]
    fn copy_preserves_values_and_count() {
        let mut source = AttributeManager::new();
        source.resize(3);
        source
            .find_or_create_variable_attribute("kind", 1_u32, AttributeProperties::default())
            .unwrap()
            .set_value(1, 9);

        let mut target = AttributeManager::new();
        target.copy_from(&source);
        assert_eq!(target.nb_elements(), 3);
        assert_eq!(target.find_attribute::<u32>("kind").unwrap().value(1), 9);
    }
}
