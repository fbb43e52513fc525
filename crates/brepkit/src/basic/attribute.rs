use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use derive_where::derive_where;
use nalgebra as na;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Index, NO_ID};

#[derive(Error, Debug)]
pub enum AttributeError {
    #[error("no attribute named {0:?}")]
    AttributeMissing(String),
    #[error("attribute {name:?} holds {stored} values, not {requested}")]
    AttributeTypeMismatch {
        name: String,
        stored: &'static str,
        requested: &'static str,
    },
    #[error("attribute {0:?} is referenced elsewhere with another storage kind")]
    AttributeStorageConflict(String),
    #[error("expected {expected} entries, got {got}")]
    SizeMismatch { expected: usize, got: usize },
    #[error("element {element} is out of range (size {size})")]
    OutOfRange { element: Index, size: usize },
    #[error("no serializer registered for attribute type {0:?}")]
    UnregisteredType(String),
    #[error("malformed attribute payload: {0}")]
    Payload(String),
}

/// How an attribute behaves under generic edition and interpolation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeProperties {
    /// Values may be written by generic consumers (editors, importers).
    pub assignable: bool,
    /// Values may be blended when elements are subdivided or merged.
    pub interpolable: bool,
}

impl Default for AttributeProperties {
    fn default() -> Self {
        Self {
            assignable: true,
            interpolable: false,
        }
    }
}

/// Storage flavour of an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// One value shared by every element.
    Constant,
    /// One value per element, default-filled on resize.
    Dense,
    /// Values for a few elements, the default everywhere else.
    Sparse,
}

/// A value storable in an [`Attribute`].
///
/// The tag is written to archives and checked on dynamic downcasts, so it must
/// stay stable across releases. `nb_items`/`generic_item` expose a
/// float-convertible view used by generic consumers; types that cannot convert
/// report zero items.
pub trait AttributeValue:
    Clone + fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    fn type_tag() -> &'static str;

    fn nb_items() -> usize {
        0
    }

    fn generic_item(&self, _item: usize) -> f64 {
        0.0
    }
}

macro_rules! numeric_attribute_value {
    ($type:ty, $tag:literal) => {
        impl AttributeValue for $type {
            fn type_tag() -> &'static str {
                $tag
            }
            fn nb_items() -> usize {
                1
            }
            fn generic_item(&self, _item: usize) -> f64 {
                *self as f64
            }
        }
    };
}

numeric_attribute_value!(u8, "u8");
numeric_attribute_value!(u32, "u32");
numeric_attribute_value!(u64, "u64");
numeric_attribute_value!(i32, "i32");
numeric_attribute_value!(i64, "i64");
numeric_attribute_value!(f64, "f64");

impl AttributeValue for bool {
    fn type_tag() -> &'static str {
        "bool"
    }
    fn nb_items() -> usize {
        1
    }
    fn generic_item(&self, _item: usize) -> f64 {
        f64::from(*self)
    }
}

impl AttributeValue for String {
    fn type_tag() -> &'static str {
        "string"
    }
}

impl<const D: usize> AttributeValue for na::Point<f64, D> {
    fn type_tag() -> &'static str {
        match D {
            1 => "point1d",
            2 => "point2d",
            3 => "point3d",
            _ => "pointnd",
        }
    }
    fn nb_items() -> usize {
        D
    }
    fn generic_item(&self, item: usize) -> f64 {
        self[item]
    }
}

impl<const N: usize> AttributeValue for [f64; N]
where
    [f64; N]: Serialize + DeserializeOwned,
{
    fn type_tag() -> &'static str {
        match N {
            1 => "array1d",
            2 => "array2d",
            3 => "array3d",
            4 => "array4d",
            _ => "arraynd",
        }
    }
    fn nb_items() -> usize {
        N
    }
    fn generic_item(&self, item: usize) -> f64 {
        self[item]
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Storage<T> {
    Constant(T),
    Dense(Vec<T>),
    Sparse(FxHashMap<Index, T>),
}

/// A typed attribute: one value per element of the owning manager, behind one
/// of the three storage flavours.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Attribute<T> {
    properties: AttributeProperties,
    default: T,
    storage: Storage<T>,
}

impl<T: AttributeValue> Attribute<T> {
    pub(crate) fn constant(value: T, properties: AttributeProperties) -> Self {
        Self {
            properties,
            default: value.clone(),
            storage: Storage::Constant(value),
        }
    }

    pub(crate) fn dense(size: usize, default: T, properties: AttributeProperties) -> Self {
        Self {
            properties,
            default: default.clone(),
            storage: Storage::Dense(vec![default; size]),
        }
    }

    pub(crate) fn sparse(default: T, properties: AttributeProperties) -> Self {
        Self {
            properties,
            default,
            storage: Storage::Sparse(FxHashMap::default()),
        }
    }

    pub fn properties(&self) -> AttributeProperties {
        self.properties
    }

    pub fn storage_kind(&self) -> StorageKind {
        match self.storage {
            Storage::Constant(_) => StorageKind::Constant,
            Storage::Dense(_) => StorageKind::Dense,
            Storage::Sparse(_) => StorageKind::Sparse,
        }
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Value of the given element; the default for sparse elements without a
    /// stored entry. Never inserts.
    pub fn value(&self, element: Index) -> &T {
        match &self.storage {
            Storage::Constant(value) => value,
            Storage::Dense(values) => &values[element as usize],
            Storage::Sparse(values) => values.get(&element).unwrap_or(&self.default),
        }
    }

    /// Mutable access to the given element. On sparse storage the entry is
    /// created with the default on first access; on constant storage the
    /// shared value is returned whatever the element.
    pub fn value_mut(&mut self, element: Index) -> &mut T {
        match &mut self.storage {
            Storage::Constant(value) => value,
            Storage::Dense(values) => &mut values[element as usize],
            Storage::Sparse(values) => values
                .entry(element)
                .or_insert_with(|| self.default.clone()),
        }
    }

    pub fn set_value(&mut self, element: Index, value: T) {
        *self.value_mut(element) = value;
    }

    fn resize(&mut self, size: usize) {
        match &mut self.storage {
            Storage::Constant(_) => {}
            Storage::Dense(values) => values.resize(size, self.default.clone()),
            Storage::Sparse(values) => values.retain(|&element, _| (element as usize) < size),
        }
    }

    fn delete_elements(&mut self, to_delete: &[bool]) {
        match &mut self.storage {
            Storage::Constant(_) => {}
            Storage::Dense(values) => {
                let mut kept = 0;
                for old in 0..values.len() {
                    if !to_delete[old] {
                        values.swap(kept, old);
                        kept += 1;
                    }
                }
                values.truncate(kept);
            }
            Storage::Sparse(values) => {
                let old_to_new = deletion_mapping(to_delete);
                let entries = std::mem::take(values);
                for (element, value) in entries {
                    let new = old_to_new[element as usize];
                    if new != NO_ID {
                        values.insert(new, value);
                    }
                }
            }
        }
    }

    fn permute_elements(&mut self, permutation: &[Index]) {
        match &mut self.storage {
            Storage::Constant(_) => {}
            Storage::Dense(values) => {
                let mut permuted = vec![self.default.clone(); values.len()];
                for (old, value) in values.drain(..).enumerate() {
                    permuted[permutation[old] as usize] = value;
                }
                *values = permuted;
            }
            Storage::Sparse(values) => {
                let entries = std::mem::take(values);
                for (element, value) in entries {
                    values.insert(permutation[element as usize], value);
                }
            }
        }
    }
}

/// Old index -> new index map for a deletion mask; deleted entries map to
/// [`NO_ID`].
pub fn deletion_mapping(to_delete: &[bool]) -> Vec<Index> {
    let mut mapping = Vec::with_capacity(to_delete.len());
    let mut new = 0;
    for &deleted in to_delete {
        if deleted {
            mapping.push(NO_ID);
        } else {
            mapping.push(new);
            new += 1;
        }
    }
    mapping
}

/// Virtual interface the manager drives without knowing the value type.
pub(crate) trait AttributeBase: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn type_tag(&self) -> &'static str;
    fn storage_kind(&self) -> StorageKind;
    fn properties(&self) -> AttributeProperties;
    fn resize(&mut self, size: usize);
    fn delete_elements(&mut self, to_delete: &[bool]);
    fn permute_elements(&mut self, permutation: &[Index]);
    fn clone_shared(&self) -> SharedAttribute;
    /// Value-copies from `other` when the types match; reports success.
    fn copy_values_from(&mut self, other: &dyn AttributeBase) -> bool;
    fn nb_items(&self) -> usize;
    fn generic_value(&self, element: Index, item: usize) -> f64;
    fn serialize_payload(&self) -> Result<serde_json::Value, serde_json::Error>;
}

impl<T: AttributeValue> AttributeBase for Attribute<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn type_tag(&self) -> &'static str {
        T::type_tag()
    }
    fn storage_kind(&self) -> StorageKind {
        self.storage_kind()
    }
    fn properties(&self) -> AttributeProperties {
        self.properties
    }
    fn resize(&mut self, size: usize) {
        self.resize(size);
    }
    fn delete_elements(&mut self, to_delete: &[bool]) {
        self.delete_elements(to_delete);
    }
    fn permute_elements(&mut self, permutation: &[Index]) {
        self.permute_elements(permutation);
    }
    fn clone_shared(&self) -> SharedAttribute {
        Arc::new(RwLock::new(self.clone()))
    }
    fn copy_values_from(&mut self, other: &dyn AttributeBase) -> bool {
        match other.as_any().downcast_ref::<Attribute<T>>() {
            Some(other) => {
                *self = other.clone();
                true
            }
            None => false,
        }
    }
    fn nb_items(&self) -> usize {
        T::nb_items()
    }
    fn generic_value(&self, element: Index, item: usize) -> f64 {
        self.value(element).generic_item(item)
    }
    fn serialize_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

pub(crate) type SharedAttribute = Arc<RwLock<dyn AttributeBase>>;

/// Stable reference-counted handle to one attribute of a manager.
///
/// The handle stays valid across manager-wide resize, deletion and
/// permutation; it is only orphaned by `delete_attribute` or `clear`, after
/// which it keeps the last storage alive but no longer tracks the manager.
#[derive_where(Clone)]
pub struct AttributeHandle<T> {
    pub(crate) inner: SharedAttribute,
    pub(crate) _values: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for AttributeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeHandle")
            .field("type_tag", &self.inner.read().type_tag())
            .finish()
    }
}

impl<T: AttributeValue> AttributeHandle<T> {
    pub(crate) fn new(inner: SharedAttribute) -> Self {
        Self {
            inner,
            _values: PhantomData,
        }
    }

    fn with<R>(&self, f: impl FnOnce(&Attribute<T>) -> R) -> R {
        let guard = self.inner.read();
        let attribute = guard
            .as_any()
            .downcast_ref::<Attribute<T>>()
            .expect("attribute handle type checked at creation");
        f(attribute)
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut Attribute<T>) -> R) -> R {
        let mut guard = self.inner.write();
        let attribute = guard
            .as_any_mut()
            .downcast_mut::<Attribute<T>>()
            .expect("attribute handle type checked at creation");
        f(attribute)
    }

    pub fn value(&self, element: Index) -> T {
        self.with(|attribute| attribute.value(element).clone())
    }

    pub fn default_value(&self) -> T {
        self.with(|attribute| attribute.default_value().clone())
    }

    pub fn set_value(&self, element: Index, value: T) {
        self.with_mut(|attribute| attribute.set_value(element, value));
    }

    /// Applies `f` to the element value in place, creating the sparse entry if
    /// needed.
    pub fn modify_value(&self, element: Index, f: impl FnOnce(&mut T)) {
        self.with_mut(|attribute| f(attribute.value_mut(element)));
    }

    pub fn properties(&self) -> AttributeProperties {
        self.with(|attribute| attribute.properties())
    }

    pub fn storage_kind(&self) -> StorageKind {
        self.with(|attribute| attribute.storage_kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_reads_are_pure() {
        let mut attribute = Attribute::sparse(12.0, AttributeProperties::default());
        assert_eq!(*attribute.value(4), 12.0);
        assert_eq!(attribute.storage_kind(), StorageKind::Sparse);
        match &attribute.storage {
            Storage::Sparse(values) => assert!(values.is_empty()),
            _ => unreachable!(),
        }
        *attribute.value_mut(4) = 3.0;
        assert_eq!(*attribute.value(4), 3.0);
        assert_eq!(*attribute.value(5), 12.0);
    }

    #[test]
    fn dense_deletion_keeps_relative_order() {
        let mut attribute = Attribute::dense(5, 0_u32, AttributeProperties::default());
        for element in 0..5 {
            attribute.set_value(element, element * 10);
        }
        attribute.delete_elements(&[false, true, false, true, false]);
        match &attribute.storage {
            Storage::Dense(values) => assert_eq!(values, &[0, 20, 40]),
            _ => unreachable!(),
        }
    }

    #[test]
    fn permutation_sends_values_to_destinations() {
        let mut attribute = Attribute::dense(3, 0_i32, AttributeProperties::default());
        for element in 0..3 {
            attribute.set_value(element, element as i32);
        }
        attribute.permute_elements(&[2, 0, 1]);
        match &attribute.storage {
            Storage::Dense(values) => assert_eq!(values, &[1, 2, 0]),
            _ => unreachable!(),
        }
    }

    #[test]
    fn generic_view_exposes_point_items() {
        let attribute = Attribute::constant(
            na::Point2::new(1.0, 2.0),
            AttributeProperties {
                assignable: false,
                interpolable: true,
            },
        );
        assert_eq!(AttributeBase::nb_items(&attribute), 2);
        assert_eq!(attribute.generic_value(7, 1), 2.0);
    }
}
