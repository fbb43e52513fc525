use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use super::MeshError;
use super::crs::CoordinateReferenceSystemManager;
use crate::basic::{AttributeManager, Index, LocalIndex, NO_ID};
use crate::geometry::basic_objects::Segment;
use crate::geometry::point::Point;
use crate::geometry::BoundingBox;

/// One endpoint slot of one edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeVertex {
    pub edge: Index,
    pub vertex_id: LocalIndex,
}

impl EdgeVertex {
    pub fn new(edge: Index, vertex_id: LocalIndex) -> Self {
        Self { edge, vertex_id }
    }
}

/// A curve discretized into vertex-pair edges.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EdgedCurve<const D: usize> {
    vertex_attributes: AttributeManager,
    points: Vec<Point<D>>,
    crs: CoordinateReferenceSystemManager,
    edges: Vec<[Index; 2]>,
    edge_attributes: AttributeManager,
    #[serde(skip)]
    edges_around: OnceCell<Vec<Vec<EdgeVertex>>>,
}

impl<const D: usize> Default for EdgedCurve<D> {
    fn default() -> Self {
        Self {
            vertex_attributes: AttributeManager::new(),
            points: Vec::new(),
            crs: CoordinateReferenceSystemManager::new(),
            edges: Vec::new(),
            edge_attributes: AttributeManager::new(),
            edges_around: OnceCell::new(),
        }
    }
}

impl<const D: usize> EdgedCurve<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nb_vertices(&self) -> usize {
        self.points.len()
    }

    pub fn nb_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn point(&self, vertex: Index) -> &Point<D> {
        &self.points[vertex as usize]
    }

    pub fn points(&self) -> &[Point<D>] {
        &self.points
    }

    pub fn edge_vertices(&self, edge: Index) -> [Index; 2] {
        self.edges[edge as usize]
    }

    pub fn edge_vertex(&self, edge_vertex: EdgeVertex) -> Index {
        self.edges[edge_vertex.edge as usize][edge_vertex.vertex_id as usize]
    }

    pub fn segment(&self, edge: Index) -> Segment<D> {
        let [v0, v1] = self.edge_vertices(edge);
        Segment::new(*self.point(v0), *self.point(v1))
    }

    pub fn edge_length(&self, edge: Index) -> f64 {
        self.segment(edge).length()
    }

    pub fn edge_barycenter(&self, edge: Index) -> Point<D> {
        self.segment(edge).barycenter()
    }

    pub fn bounding_box(&self) -> BoundingBox<D> {
        BoundingBox::from_points(self.points.iter().copied())
    }

    /// Every edge endpoint slot referencing `vertex`.
    pub fn edges_around_vertex(&self, vertex: Index) -> &[EdgeVertex] {
        let around = self.edges_around.get_or_init(|| {
            let mut around = vec![Vec::new(); self.nb_vertices()];
            for (edge, vertices) in self.edges.iter().enumerate() {
                for (slot, &endpoint) in vertices.iter().enumerate() {
                    if endpoint != NO_ID {
                        around[endpoint as usize]
                            .push(EdgeVertex::new(edge as Index, slot as LocalIndex));
                    }
                }
            }
            around
        });
        &around[vertex as usize]
    }

    pub fn vertex_attribute_manager(&self) -> &AttributeManager {
        &self.vertex_attributes
    }

    pub fn vertex_attribute_manager_mut(&mut self) -> &mut AttributeManager {
        &mut self.vertex_attributes
    }

    pub fn edge_attribute_manager(&self) -> &AttributeManager {
        &self.edge_attributes
    }

    pub fn edge_attribute_manager_mut(&mut self) -> &mut AttributeManager {
        &mut self.edge_attributes
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

/// Edits an [`EdgedCurve`].
pub struct EdgedCurveBuilder<'a, const D: usize> {
    mesh: &'a mut EdgedCurve<D>,
}

impl<'a, const D: usize> EdgedCurveBuilder<'a, D> {
    pub fn new(mesh: &'a mut EdgedCurve<D>) -> Self {
        Self { mesh }
    }

    fn invalidate(&mut self) {
        self.mesh.edges_around.take();
    }

    pub fn create_point(&mut self, point: Point<D>) -> Index {
        let created = self.mesh.points.len() as Index;
        self.mesh.points.push(point);
        self.mesh.vertex_attributes.resize(self.mesh.points.len());
        self.invalidate();
        created
    }

    pub fn create_vertices(&mut self, count: usize) -> Index {
        let first = self.mesh.points.len() as Index;
        self.mesh
            .points
            .resize(self.mesh.points.len() + count, Point::origin());
        self.mesh.vertex_attributes.resize(self.mesh.points.len());
        self.invalidate();
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

    pub fn create_edge(&mut self, v0: Index, v1: Index) -> Result<Index, MeshError> {
        let size = self.mesh.nb_vertices();
        for vertex in [v0, v1] {
            if vertex as usize >= size {
                return Err(MeshError::OutOfRange {
                    index: vertex,
                    size,
                });
            }
        }
        if v0 == v1 {
            return Err(MeshError::DegenerateGeometry("edge"));
        }
        let created = self.mesh.edges.len() as Index;
        self.mesh.edges.push([v0, v1]);
        self.mesh.edge_attributes.resize(self.mesh.edges.len());
        self.invalidate();
        Ok(created)
    }

    pub fn set_edge_vertex(
        &mut self,
        edge_vertex: EdgeVertex,
        vertex: Index,
    ) -> Result<(), MeshError> {
        let nb_edges = self.mesh.edges.len();
        let slot = self
            .mesh
            .edges
            .get_mut(edge_vertex.edge as usize)
            .ok_or(MeshError::OutOfRange {
                index: edge_vertex.edge,
                size: nb_edges,
            })?;
        slot[edge_vertex.vertex_id as usize] = vertex;
        self.invalidate();
        Ok(())
    }

    /// Compacts edges, returning the old index -> new index map.
    pub fn delete_edges(&mut self, to_delete: &[bool]) -> Result<Vec<Index>, MeshError> {
        if to_delete.len() != self.mesh.edges.len() {
            return Err(MeshError::SizeMismatch {
                expected: self.mesh.edges.len(),
                got: to_delete.len(),
            });
        }
        let mapping = self.mesh.edge_attributes.delete_elements(to_delete)?;
        let mut kept = 0;
        for old in 0..self.mesh.edges.len() {
            if !to_delete[old] {
                self.mesh.edges.swap(kept, old);
                kept += 1;
            }
        }
        self.mesh.edges.truncate(kept);
        self.invalidate();
        Ok(mapping)
    }

    /// Reorders edges; `permutation[old]` is the destination index.
    pub fn permute_edges(&mut self, permutation: &[Index]) -> Result<(), MeshError> {
        if permutation.len() != self.mesh.edges.len() {
            return Err(MeshError::SizeMismatch {
                expected: self.mesh.edges.len(),
                got: permutation.len(),
            });
        }
        self.mesh.edge_attributes.permute_elements(permutation)?;
        let mut permuted = vec![[NO_ID; 2]; self.mesh.edges.len()];
        for (old, edge) in self.mesh.edges.drain(..).enumerate() {
            permuted[permutation[old] as usize] = edge;
        }
        self.mesh.edges = permuted;
        self.invalidate();
        Ok(())
    }

    /// Reorders vertices and renames edge endpoints accordingly.
    pub fn permute_vertices(&mut self, permutation: &[Index]) -> Result<(), MeshError> {
        self.mesh.vertex_attributes.permute_elements(permutation)?;
        let mut permuted = vec![Point::origin(); self.mesh.points.len()];
        for (old, point) in self.mesh.points.drain(..).enumerate() {
            permuted[permutation[old] as usize] = point;
        }
        self.mesh.points = permuted;
        for edge in &mut self.mesh.edges {
            for endpoint in edge {
                if *endpoint != NO_ID {
                    *endpoint = permutation[*endpoint as usize];
                }
            }
        }
        self.invalidate();
        Ok(())
    }

    /// Rewrites every edge endpoint through `old_to_new`; deleted vertices
    /// ([`NO_ID`]) leave dangling slots for a later cleanup pass.
    pub fn replace_vertices(&mut self, old_to_new: &[Index]) -> Result<(), MeshError> {
        if old_to_new.len() != self.mesh.nb_vertices() {
            return Err(MeshError::SizeMismatch {
                expected: self.mesh.nb_vertices(),
                got: old_to_new.len(),
            });
        }
        for edge in &mut self.mesh.edges {
            for endpoint in edge {
                if *endpoint != NO_ID {
                    *endpoint = old_to_new[*endpoint as usize];
                }
            }
        }
        self.invalidate();
        Ok(())
    }

    /// Drops vertices not referenced by any edge, returning the old -> new
    /// vertex map.
    pub fn delete_isolated_vertices(&mut self) -> Result<Vec<Index>, MeshError> {
        let mut isolated = vec![true; self.mesh.nb_vertices()];
        for edge in &self.mesh.edges {
            for &endpoint in edge {
                if endpoint != NO_ID {
                    isolated[endpoint as usize] = false;
                }
            }
        }
        self.delete_vertices(&isolated)
    }

    /// Compacts vertices and renames edge endpoints accordingly; endpoints of
    /// deleted vertices become [`NO_ID`].
    pub fn delete_vertices(&mut self, to_delete: &[bool]) -> Result<Vec<Index>, MeshError> {
        let mapping = self.mesh.vertex_attributes.delete_elements(to_delete)?;
        let mut kept = 0;
        for old in 0..self.mesh.points.len() {
            if !to_delete[old] {
                self.mesh.points.swap(kept, old);
                kept += 1;
            }
        }
        self.mesh.points.truncate(kept);
        for edge in &mut self.mesh.edges {
            for endpoint in edge {
                if *endpoint != NO_ID {
                    *endpoint = mapping[*endpoint as usize];
                }
            }
        }
        self.invalidate();
        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::Point2;
    use crate::mesh_examples::make_polyline as polyline;

    #[test]
    fn edges_and_lengths() {
        let curve = polyline();
        assert_eq!(curve.nb_edges(), 3);
        assert_eq!(curve.edge_vertices(1), [1, 2]);
        assert_eq!(curve.edge_length(1), 1.0);
        assert_eq!(curve.edge_barycenter(0), Point2::new(0.5, 0.0));
    }

    #[test]
    fn reverse_index_tracks_edits() {
        let mut curve = polyline();
        let around = curve.edges_around_vertex(1);
        assert_eq!(around.len(), 2);
        assert_eq!(around[0], EdgeVertex::new(0, 1));
        assert_eq!(around[1], EdgeVertex::new(1, 0));

        let mut builder = EdgedCurveBuilder::new(&mut curve);
        builder.delete_edges(&[true, false, false]).unwrap();
        assert_eq!(curve.edges_around_vertex(1), &[EdgeVertex::new(0, 0)]);
    }

    #[test]
    fn degenerate_edges_are_rejected() {
        let mut curve = EdgedCurve::<2>::new();
        let mut builder = EdgedCurveBuilder::new(&mut curve);
        builder.create_point(Point2::new(0.0, 0.0));
        assert!(matches!(
            builder.create_edge(0, 0),
            Err(MeshError::DegenerateGeometry("edge"))
        ));
        assert!(matches!(
            builder.create_edge(0, 5),
            Err(MeshError::OutOfRange { .. })
        ));
    }

    #[test]
    fn isolated_vertices_are_compacted() {
        let mut curve = polyline();
        let mut builder = EdgedCurveBuilder::new(&mut curve);
        builder.delete_edges(&[true, false, false]).unwrap();
        let mapping = builder.delete_isolated_vertices().unwrap();
        assert_eq!(mapping[0], NO_ID);
        assert_eq!(curve.nb_vertices(), 3);
        assert_eq!(curve.edge_vertices(0), [0, 1]);
        assert_eq!(curve.edge_vertices(1), [1, 2]);
    }
}
