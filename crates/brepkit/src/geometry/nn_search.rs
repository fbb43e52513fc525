use rstar::RTree;
use rstar::primitives::GeomWithData;

use super::point::Point;
use crate::basic::Index;

type IndexedPoint<const D: usize> = GeomWithData<[f64; D], Index>;

/// Nearest-neighbour search over a fixed point cloud, backed by an R*-tree.
pub struct NnSearch<const D: usize> {
    points: Vec<Point<D>>,
    tree: RTree<IndexedPoint<D>>,
}

/// Outcome of [`NnSearch::colocated_index_mapping`]: each input point maps to
/// the unique point standing for its colocation cluster.
#[derive(Clone, Debug)]
pub struct ColocatedInfo<const D: usize> {
    /// One entry per input point, each below `unique_points.len()`.
    pub colocated_mapping: Vec<Index>,
    /// One representative per cluster, in input order of the representatives.
    pub unique_points: Vec<Point<D>>,
}

impl<const D: usize> ColocatedInfo<D> {
    pub fn nb_unique_points(&self) -> usize {
        self.unique_points.len()
    }

    pub fn nb_colocated_points(&self) -> usize {
        self.colocated_mapping.len() - self.unique_points.len()
    }
}

impl<const D: usize> NnSearch<D> {
    pub fn new(points: Vec<Point<D>>) -> Self {
        let tree = RTree::bulk_load(
            points
                .iter()
                .enumerate()
                .map(|(index, point)| IndexedPoint::new((*point).into(), index as Index))
                .collect(),
        );
        Self { points, tree }
    }

    pub fn nb_points(&self) -> usize {
        self.points.len()
    }

    pub fn point(&self, index: Index) -> &Point<D> {
        &self.points[index as usize]
    }

    pub fn closest_neighbor(&self, point: &Point<D>) -> Option<Index> {
        let query: [f64; D] = (*point).into();
        self.tree.nearest_neighbor(&query).map(|found| found.data)
    }

    /// Up to `nb_neighbors` indices by increasing distance.
    pub fn neighbors(&self, point: &Point<D>, nb_neighbors: usize) -> Vec<Index> {
        let query: [f64; D] = (*point).into();
        self.tree
            .nearest_neighbor_iter(&query)
            .take(nb_neighbors)
            .map(|found| found.data)
            .collect()
    }

    /// Every index within `radius` of `point`, in no particular order.
    pub fn radius_neighbors(&self, point: &Point<D>, radius: f64) -> Vec<Index> {
        let query: [f64; D] = (*point).into();
        self.tree
            .locate_within_distance(query, radius * radius)
            .map(|found| found.data)
            .collect()
    }

    /// Groups points lying within `epsilon` of each other and elects the
    /// smallest input index of each cluster as its representative.
    ///
    /// Every input point ends within `epsilon` of its unique point, and the
    /// outcome does not depend on scheduling: clusters always collapse onto
    /// their minimum index.
    pub fn colocated_index_mapping(&self, epsilon: f64) -> ColocatedInfo<D> {
        let mut mapping = self.cluster_representatives(epsilon);
        let mut nb_colocated = 0;
        let mut unique_points = Vec::new();
        for index in 0..self.nb_points() {
            if mapping[index] == index as Index {
                mapping[index] -= nb_colocated;
                unique_points.push(self.points[index]);
            } else {
                nb_colocated += 1;
                mapping[index] = mapping[mapping[index] as usize];
            }
        }
        ColocatedInfo {
            colocated_mapping: mapping,
            unique_points,
        }
    }

    #[cfg(feature = "rayon")]
    fn cluster_representatives(&self, epsilon: f64) -> Vec<Index> {
        use rayon::prelude::*;
        use std::sync::atomic::{AtomicU32, Ordering};

        let mapping: Vec<AtomicU32> = (0..self.nb_points() as Index)
            .map(AtomicU32::new)
            .collect();
        (0..self.nb_points()).into_par_iter().for_each(|index| {
            if mapping[index].load(Ordering::Relaxed) == index as Index {
                let cluster = self.radius_neighbors(&self.points[index], epsilon);
                let representative = cluster.iter().copied().min().unwrap_or(index as Index);
                for member in cluster {
                    mapping[member as usize].store(representative, Ordering::Relaxed);
                }
            }
        });
        mapping.into_iter().map(AtomicU32::into_inner).collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn cluster_representatives(&self, epsilon: f64) -> Vec<Index> {
        let mut mapping: Vec<Index> = (0..self.nb_points() as Index).collect();
        for index in 0..self.nb_points() {
            if mapping[index] == index as Index {
                let cluster = self.radius_neighbors(&self.points[index], epsilon);
                let representative = cluster.iter().copied().min().unwrap_or(index as Index);
                for member in cluster {
                    mapping[member as usize] = representative;
                }
            }
        }
        mapping
    }
}

impl<const D: usize> std::fmt::Debug for NnSearch<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NnSearch")
            .field("nb_points", &self.nb_points())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::Point3;

    fn sample_cloud() -> NnSearch<3> {
        NnSearch::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1e-10),
            Point3::new(5.0, 5.0, 5.0),
        ])
    }

    #[test]
    fn neighbour_queries() {
        let search = sample_cloud();
        assert_eq!(search.closest_neighbor(&Point3::new(0.9, 0.1, 0.0)), Some(1));
        assert_eq!(
            search.neighbors(&Point3::new(1.0, 0.1, 0.0), 2),
            vec![1, 2]
        );
        let mut near_origin = search.radius_neighbors(&Point3::origin(), 0.5);
        near_origin.sort_unstable();
        assert_eq!(near_origin, vec![0, 3]);
    }

    #[test]
    fn colocation_elects_minimum_indices() {
        let search = sample_cloud();
        let info = search.colocated_index_mapping(1e-8);
        assert_eq!(info.colocated_mapping, vec![0, 1, 2, 0, 3]);
        assert_eq!(info.nb_unique_points(), 4);
        assert_eq!(info.nb_colocated_points(), 1);
        assert_eq!(info.unique_points[0], Point3::origin());
    }

    #[test]
    fn colocation_with_zero_epsilon_keeps_distinct_points() {
        let search = sample_cloud();
        let info = search.colocated_index_mapping(0.0);
        assert_eq!(info.nb_unique_points(), 5);
        for (index, &unique) in info.colocated_mapping.iter().enumerate() {
            assert!(
                nalgebra::distance(
                    search.point(index as Index),
                    &info.unique_points[unique as usize]
                ) <= f64::EPSILON
            );
        }
    }
}
