use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::basic::Index;

/// Canonical form of a vertex tuple, identical for every rotation and for the
/// reversed traversal. Two facets (or edges) seen from both sides hash to the
/// same cycle.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexCycle {
    vertices: SmallVec<[Index; 4]>,
}

impl VertexCycle {
    pub fn new(vertices: impl Into<SmallVec<[Index; 4]>>) -> Self {
        let mut vertices = vertices.into();
        canonicalize(&mut vertices);
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Index] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl From<[Index; 2]> for VertexCycle {
    fn from(pair: [Index; 2]) -> Self {
        Self::new(&pair[..])
    }
}

impl From<&[Index]> for VertexCycle {
    fn from(vertices: &[Index]) -> Self {
        Self::new(vertices)
    }
}

/// Rotates the smallest vertex to the front, then keeps the traversal
/// direction whose second element is smaller.
fn canonicalize(vertices: &mut SmallVec<[Index; 4]>) {
    if vertices.len() <= 1 {
        return;
    }
    let start = vertices
        .iter()
        .enumerate()
        .min_by_key(|&(position, &vertex)| (vertex, position))
        .map(|(position, _)| position)
        .unwrap_or(0);
    vertices.rotate_left(start);
    let n = vertices.len();
    if n > 2 && vertices[n - 1] < vertices[1] {
        vertices[1..].reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotations_and_reflections_collapse() {
        let reference = VertexCycle::new(&[2_u32, 7, 4][..]);
        assert_eq!(VertexCycle::new(&[7_u32, 4, 2][..]), reference);
        assert_eq!(VertexCycle::new(&[4_u32, 7, 2][..]), reference);
        assert_eq!(VertexCycle::new(&[2_u32, 4, 7][..]), reference);
        assert_eq!(reference.vertices(), &[2, 4, 7]);
    }

    #[test]
    fn pairs_are_unordered() {
        assert_eq!(VertexCycle::from([9, 1]), VertexCycle::from([1, 9]));
        assert_eq!(VertexCycle::from([1, 9]).vertices(), &[1, 9]);
    }

    #[test]
    fn distinct_cycles_stay_distinct() {
        let quad = VertexCycle::new(&[0_u32, 1, 2, 3][..]);
        let crossed = VertexCycle::new(&[0_u32, 2, 1, 3][..]);
        assert_ne!(quad, crossed);
    }
}
