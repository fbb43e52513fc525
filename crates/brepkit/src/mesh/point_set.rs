use serde::{Deserialize, Serialize};

use super::MeshError;
use super::crs::CoordinateReferenceSystemManager;
use crate::basic::{AttributeManager, Index};
use crate::geometry::BoundingBox;
use crate::geometry::point::Point;

/// Vertices with coordinates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PointSet<const D: usize> {
    attributes: AttributeManager,
    points: Vec<Point<D>>,
    crs: CoordinateReferenceSystemManager,
}

impl<const D: usize> Default for PointSet<D> {
    fn default() -> Self {
        Self {
            attributes: AttributeManager::new(),
            points: Vec::new(),
            crs: CoordinateReferenceSystemManager::new(),
        }
    }
}

impl<const D: usize> PointSet<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nb_vertices(&self) -> usize {
        self.points.len()
    }

    pub fn point(&self, vertex: Index) -> &Point<D> {
        &self.points[vertex as usize]
    }

    pub fn points(&self) -> &[Point<D>] {
        &self.points
    }

    pub fn bounding_box(&self) -> BoundingBox<D> {
        BoundingBox::from_points(self.points.iter().copied())
    }

    pub fn vertex_attribute_manager(&self) -> &AttributeManager {
        &self.attributes
    }

    pub fn vertex_attribute_manager_mut(&mut self) -> &mut AttributeManager {
        &mut self.attributes
    }

    pub fn coordinate_reference_system_manager(&self) -> &CoordinateReferenceSystemManager {
        &self.crs
    }

    pub fn coordinate_reference_system_manager_mut(
        &mut self,
    ) -> &mut CoordinateReferenceSystemManager {
        &mut self.crs
    }
}

/// Edits a [`PointSet`].
pub struct PointSetBuilder<'a, const D: usize> {
    mesh: &'a mut PointSet<D>,
}

impl<'a, const D: usize> PointSetBuilder<'a, D> {
    pub fn new(mesh: &'a mut PointSet<D>) -> Self {
        Self { mesh }
    }

    pub fn create_point(&mut self, point: Point<D>) -> Index {
        let created = self.mesh.points.len() as Index;
        self.mesh.points.push(point);
        self.mesh.attributes.resize(self.mesh.points.len());
        created
    }

    /// Creates `count` vertices at the origin, returning the first new index.
    pub fn create_vertices(&mut self, count: usize) -> Index {
        let first = self.mesh.points.len() as Index;
        self.mesh.points.resize(self.mesh.points.len() + count, Point::origin());
        self.mesh.attributes.resize(self.mesh.points.len());
        first
    }

    pub fn set_point(&mut self, vertex: Index, point: Point<D>) -> Result<(), MeshError> {
        let size = self.mesh.points.len();
        match self.mesh.points.get_mut(vertex as usize) {
            Some(stored) => {
                *stored = point;
                Ok(())
            }
            None => Err(MeshError::OutOfRange {
                index: vertex,
                size,
            }),
        }
    }

    pub fn delete_vertices(&mut self, to_delete: &[bool]) -> Result<Vec<Index>, MeshError> {
        let mapping = self.mesh.attributes.delete_elements(to_delete)?;
        let mut kept = 0;
        for old in 0..self.mesh.points.len() {
            if !to_delete[old] {
                self.mesh.points.swap(kept, old);
                kept += 1;
            }
        }
        self.mesh.points.truncate(kept);
        Ok(mapping)
    }

    pub fn permute_vertices(&mut self, permutation: &[Index]) -> Result<(), MeshError> {
        self.mesh.attributes.permute_elements(permutation)?;
        let mut permuted = vec![Point::origin(); self.mesh.points.len()];
        for (old, point) in self.mesh.points.drain(..).enumerate() {
            permuted[permutation[old] as usize] = point;
        }
        self.mesh.points = permuted;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::Point2;

    #[test]
    fn points_and_attributes_stay_in_step() {
        let mut mesh = PointSet::<2>::new();
        let mut builder = PointSetBuilder::new(&mut mesh);
        builder.create_point(Point2::new(0.0, 0.0));
        builder.create_point(Point2::new(1.0, 0.0));
        builder.create_point(Point2::new(2.0, 0.0));
        builder.set_point(1, Point2::new(1.5, 0.0)).unwrap();
        assert!(builder.set_point(9, Point2::origin()).is_err());

        let mapping = builder.delete_vertices(&[true, false, false]).unwrap();
        assert_eq!(mapping, vec![crate::basic::NO_ID, 0, 1]);
        assert_eq!(mesh.nb_vertices(), 2);
        assert_eq!(mesh.point(0), &Point2::new(1.5, 0.0));
        assert_eq!(mesh.vertex_attribute_manager().nb_elements(), 2);
    }
}
