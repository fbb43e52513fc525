use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::MeshError;
use super::vertex_cycle::VertexCycle;
use crate::basic::{AttributeManager, Index, NO_ID};

/// Reference-counted store of deduplicated vertex cycles.
///
/// Each distinct cycle gets a dense id carrying attributes; adding an
/// existing cycle bumps its counter, removing decrements it, and `clean`
/// compacts away unreferenced entries. The owning mesh drives the lifecycle:
/// it is the only writer and forwards its vertex renames and deletions here.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(crate) struct FacetStorage {
    attributes: AttributeManager,
    vertices: Vec<SmallVec<[Index; 4]>>,
    counters: Vec<u32>,
    #[serde(with = "cycle_map")]
    indices: FxHashMap<VertexCycle, Index>,
}

/// The cycle lookup as an id-ordered pair list; JSON maps only take string
/// keys.
mod cycle_map {
    use super::{FxHashMap, Index, VertexCycle};
    use serde::de::Deserializer;
    use serde::ser::Serializer;
    use serde::{Deserialize, Serialize};

    pub fn serialize<S: Serializer>(
        map: &FxHashMap<VertexCycle, Index>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut entries: Vec<(&VertexCycle, Index)> =
            map.iter().map(|(cycle, &facet)| (cycle, facet)).collect();
        entries.sort_by_key(|&(_, facet)| facet);
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<FxHashMap<VertexCycle, Index>, D::Error> {
        let entries: Vec<(VertexCycle, Index)> = Vec::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

impl FacetStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nb_facets(&self) -> usize {
        self.vertices.len()
    }

    pub fn attribute_manager(&self) -> &AttributeManager {
        &self.attributes
    }

    pub fn attribute_manager_mut(&mut self) -> &mut AttributeManager {
        &mut self.attributes
    }

    pub fn facet_vertices(&self, facet: Index) -> &[Index] {
        &self.vertices[facet as usize]
    }

    pub fn find_facet(&self, cycle: &VertexCycle) -> Option<Index> {
        self.indices.get(cycle).copied()
    }

    /// Id of the cycle, creating it with a unit counter when unseen.
    pub fn add_facet(&mut self, vertices: &[Index]) -> Index {
        let cycle = VertexCycle::new(vertices);
        if let Some(&facet) = self.indices.get(&cycle) {
            self.counters[facet as usize] += 1;
            return facet;
        }
        let facet = self.vertices.len() as Index;
        self.vertices.push(cycle.vertices().into());
        self.counters.push(1);
        self.indices.insert(cycle, facet);
        self.attributes.resize(self.vertices.len());
        facet
    }

    /// Drops one reference; the entry stays until [`Self::clean_facets`].
    pub fn remove_facet(&mut self, vertices: &[Index]) {
        let cycle = VertexCycle::new(vertices);
        if let Some(&facet) = self.indices.get(&cycle) {
            let counter = &mut self.counters[facet as usize];
            *counter = counter.saturating_sub(1);
        }
    }

    /// Deletes every unreferenced entry, returning the old -> new id map.
    pub fn clean_facets(&mut self) -> Result<Vec<Index>, MeshError> {
        let to_delete: Vec<bool> = self.counters.iter().map(|&counter| counter == 0).collect();
        self.delete_facets(&to_delete)
    }

    pub fn delete_facets(&mut self, to_delete: &[bool]) -> Result<Vec<Index>, MeshError> {
        if to_delete.len() != self.vertices.len() {
            return Err(MeshError::SizeMismatch {
                expected: self.vertices.len(),
                got: to_delete.len(),
            });
        }
        let mapping = self.attributes.delete_elements(to_delete)?;
        let mut kept = 0;
        for old in 0..self.vertices.len() {
            if !to_delete[old] {
                self.vertices.swap(kept, old);
                self.counters.swap(kept, old);
                kept += 1;
            }
        }
        self.vertices.truncate(kept);
        self.counters.truncate(kept);
        self.indices.retain(|_, facet| {
            let new = mapping[*facet as usize];
            if new == NO_ID {
                return false;
            }
            *facet = new;
            true
        });
        Ok(mapping)
    }

    /// Renames every cycle through `old_to_new`, keeping ids stable. Cycles
    /// that end up referencing a deleted vertex, or collapsing onto another
    /// cycle, lose their references and go away on the next clean.
    pub fn update_facet_vertices(&mut self, old_to_new: &[Index]) {
        let mut indices = FxHashMap::default();
        indices.reserve(self.indices.len());
        for (facet, vertices) in self.vertices.iter_mut().enumerate() {
            let facet = facet as Index;
            let mut dangling = false;
            for vertex in vertices.iter_mut() {
                *vertex = old_to_new[*vertex as usize];
                dangling |= *vertex == NO_ID;
            }
            if dangling {
                self.counters[facet as usize] = 0;
                continue;
            }
            let cycle = VertexCycle::new(vertices.as_slice());
            match indices.entry(cycle) {
                std::collections::hash_map::Entry::Vacant(entry) => {
                    entry.insert(facet);
                }
                std::collections::hash_map::Entry::Occupied(entry) => {
                    // Two former cycles now coincide; fold the counters into
                    // the survivor.
                    let survivor = *entry.get() as usize;
                    self.counters[survivor] += self.counters[facet as usize];
                    self.counters[facet as usize] = 0;
                }
            }
        }
        self.indices = indices;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_and_cleaning() {
        let mut storage = FacetStorage::new();
        let facet = storage.add_facet(&[0, 1, 2]);
        assert_eq!(storage.add_facet(&[1, 2, 0]), facet);
        assert_eq!(storage.counters[facet as usize], 2);
        let other = storage.add_facet(&[2, 3, 4]);

        storage.remove_facet(&[0, 1, 2]);
        storage.remove_facet(&[2, 1, 0]);
        let mapping = storage.clean_facets().unwrap();
        assert_eq!(mapping[facet as usize], NO_ID);
        assert_eq!(mapping[other as usize], 0);
        assert_eq!(storage.nb_facets(), 1);
        assert_eq!(storage.facet_vertices(0), &[2, 3, 4]);
        assert_eq!(storage.find_facet(&VertexCycle::new(&[3_u32, 4, 2][..])), Some(0));
    }

    #[test]
    fn renames_rebuild_the_lookup() {
        let mut storage = FacetStorage::new();
        storage.add_facet(&[0, 1, 2]);
        storage.add_facet(&[1, 2, 3]);
        // Vertex 3 collapses onto 0: both cycles coincide.
        storage.update_facet_vertices(&[0, 1, 2, 0]);
        assert_eq!(storage.find_facet(&VertexCycle::new(&[0_u32, 1, 2][..])), Some(0));
        let mapping = storage.clean_facets().unwrap();
        assert_eq!(storage.nb_facets(), 1);
        assert_eq!(mapping[1], NO_ID);
    }
}
