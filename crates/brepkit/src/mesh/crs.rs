use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named coordinate frames of a mesh, with at most one active frame.
///
/// The kernel only carries the naming; interpreting a frame definition is
/// left to importers and exporters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateReferenceSystemManager {
    frames: BTreeMap<String, String>,
    active: Option<String>,
}

impl CoordinateReferenceSystemManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nb_coordinate_reference_systems(&self) -> usize {
        self.frames.len()
    }

    pub fn register_coordinate_reference_system(&mut self, name: &str, definition: String) {
        self.frames.insert(name.to_owned(), definition);
    }

    pub fn delete_coordinate_reference_system(&mut self, name: &str) {
        self.frames.remove(name);
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
    }

    pub fn coordinate_reference_system_exists(&self, name: &str) -> bool {
        self.frames.contains_key(name)
    }

    pub fn coordinate_reference_system(&self, name: &str) -> Option<&str> {
        self.frames.get(name).map(String::as_str)
    }

    pub fn set_active_coordinate_reference_system(&mut self, name: &str) -> bool {
        if self.frames.contains_key(name) {
            self.active = Some(name.to_owned());
            true
        } else {
            false
        }
    }

    pub fn active_coordinate_reference_system(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn coordinate_reference_system_names(&self) -> impl Iterator<Item = &str> {
        self.frames.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_frame_follows_registration() {
        let mut manager = CoordinateReferenceSystemManager::new();
        assert!(!manager.set_active_coordinate_reference_system("utm"));
        manager.register_coordinate_reference_system("utm", "EPSG:32631".to_owned());
        assert!(manager.set_active_coordinate_reference_system("utm"));
        assert_eq!(manager.active_coordinate_reference_system(), Some("utm"));
        manager.delete_coordinate_reference_system("utm");
        assert_eq!(manager.active_coordinate_reference_system(), None);
    }
}
