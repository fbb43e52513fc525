use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::MeshError;
use super::crs::CoordinateReferenceSystemManager;
use super::surface_edges::SurfaceEdges;
use super::vertex_cycle::VertexCycle;
use crate::basic::{AttributeManager, Index, LocalIndex, NO_ID};
use crate::geometry::BoundingBox;
use crate::geometry::basic_objects::Triangle;
use crate::geometry::mensuration::{triangle_area3d, triangle_signed_area2d};
use crate::geometry::point::Point;

/// One vertex slot of one polygon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolygonVertex {
    pub polygon: Index,
    pub vertex_id: LocalIndex,
}

impl PolygonVertex {
    pub fn new(polygon: Index, vertex_id: LocalIndex) -> Self {
        Self { polygon, vertex_id }
    }
}

/// One oriented edge of one polygon, from local vertex `edge_id` to the next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolygonEdge {
    pub polygon: Index,
    pub edge_id: LocalIndex,
}

impl PolygonEdge {
    pub fn new(polygon: Index, edge_id: LocalIndex) -> Self {
        Self { polygon, edge_id }
    }
}

/// Polygons of arity three or more over a shared point set, with one
/// adjacency slot per polygon edge.
///
/// The polygon vertex loop is the oriented boundary; two polygons adjacent
/// across an edge traverse it in opposite orders. Non-manifold edges are
/// legal and carry [`NO_ID`] on every side.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SurfaceMesh<const D: usize> {
    vertex_attributes: AttributeManager,
    points: Vec<Point<D>>,
    crs: CoordinateReferenceSystemManager,
    polygon_ptr: Vec<usize>,
    polygon_vertices: Vec<Index>,
    polygon_adjacents: Vec<Index>,
    polygon_attributes: AttributeManager,
    edges: Option<SurfaceEdges>,
    #[serde(skip)]
    around_vertex: OnceCell<Vec<Vec<PolygonVertex>>>,
}

impl<const D: usize> Default for SurfaceMesh<D> {
    fn default() -> Self {
        Self {
            vertex_attributes: AttributeManager::new(),
            points: Vec::new(),
            crs: CoordinateReferenceSystemManager::new(),
            polygon_ptr: vec![0],
            polygon_vertices: Vec::new(),
            polygon_adjacents: Vec::new(),
            polygon_attributes: AttributeManager::new(),
            edges: None,
            around_vertex: OnceCell::new(),
        }
    }
}

impl<const D: usize> SurfaceMesh<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nb_vertices(&self) -> usize {
        self.points.len()
    }

    pub fn nb_polygons(&self) -> usize {
        self.polygon_ptr.len() - 1
    }

    pub fn point(&self, vertex: Index) -> &Point<D> {
        &self.points[vertex as usize]
    }

    pub fn points(&self) -> &[Point<D>] {
        &self.points
    }

    fn range(&self, polygon: Index) -> std::ops::Range<usize> {
        self.polygon_ptr[polygon as usize]..self.polygon_ptr[polygon as usize + 1]
    }

    pub fn nb_polygon_vertices(&self, polygon: Index) -> usize {
        self.range(polygon).len()
    }

    pub fn polygon_vertices(&self, polygon: Index) -> &[Index] {
        &self.polygon_vertices[self.range(polygon)]
    }

    pub fn polygon_vertex(&self, polygon_vertex: PolygonVertex) -> Index {
        self.polygon_vertices(polygon_vertex.polygon)[polygon_vertex.vertex_id as usize]
    }

    /// Oriented vertex pair of a polygon edge.
    pub fn polygon_edge_vertices(&self, edge: PolygonEdge) -> [Index; 2] {
        let vertices = self.polygon_vertices(edge.polygon);
        let from = edge.edge_id as usize;
        [vertices[from], vertices[(from + 1) % vertices.len()]]
    }

    /// Adjacent polygon across an edge, [`NO_ID`] on borders and non-manifold
    /// edges.
    pub fn polygon_adjacent(&self, edge: PolygonEdge) -> Index {
        self.polygon_adjacents[self.polygon_ptr[edge.polygon as usize] + edge.edge_id as usize]
    }

    /// The matching oriented edge on the adjacent polygon, when any.
    pub fn polygon_adjacent_edge(&self, edge: PolygonEdge) -> Option<PolygonEdge> {
        let adjacent = self.polygon_adjacent(edge);
        if adjacent == NO_ID {
            return None;
        }
        let [v0, v1] = self.polygon_edge_vertices(edge);
        let vertices = self.polygon_vertices(adjacent);
        for from in 0..vertices.len() {
            let to = (from + 1) % vertices.len();
            if vertices[from] == v1 && vertices[to] == v0 {
                return Some(PolygonEdge::new(adjacent, from as LocalIndex));
            }
        }
        None
    }

    pub fn is_edge_on_border(&self, edge: PolygonEdge) -> bool {
        self.polygon_adjacent(edge) == NO_ID
    }

    pub fn is_polygon_on_border(&self, polygon: Index) -> bool {
        (0..self.nb_polygon_vertices(polygon))
            .any(|edge| self.is_edge_on_border(PolygonEdge::new(polygon, edge as LocalIndex)))
    }

    pub fn is_vertex_on_border(&self, vertex: Index) -> bool {
        self.polygons_around_vertex(vertex).iter().any(|&around| {
            let n = self.nb_polygon_vertices(around.polygon);
            let outgoing = PolygonEdge::new(around.polygon, around.vertex_id);
            let incoming = PolygonEdge::new(
                around.polygon,
                ((around.vertex_id as usize + n - 1) % n) as LocalIndex,
            );
            self.is_edge_on_border(outgoing) || self.is_edge_on_border(incoming)
        })
    }

    /// Every border edge of the mesh, in polygon order.
    pub fn border_edges(&self) -> Vec<PolygonEdge> {
        let mut borders = Vec::new();
        for polygon in 0..self.nb_polygons() as Index {
            for edge in 0..self.nb_polygon_vertices(polygon) {
                let edge = PolygonEdge::new(polygon, edge as LocalIndex);
                if self.is_edge_on_border(edge) {
                    borders.push(edge);
                }
            }
        }
        borders
    }

    /// Every polygon slot referencing `vertex`; stays valid across renames
    /// and deletions until the vertex itself is isolated.
    pub fn polygons_around_vertex(&self, vertex: Index) -> &[PolygonVertex] {
        let around = self.around_vertex.get_or_init(|| {
            let mut around = vec![Vec::new(); self.nb_vertices()];
            for polygon in 0..self.nb_polygons() as Index {
                for (slot, &v) in self.polygon_vertices(polygon).iter().enumerate() {
                    if v != NO_ID {
                        around[v as usize].push(PolygonVertex::new(polygon, slot as LocalIndex));
                    }
                }
            }
            around
        });
        &around[vertex as usize]
    }

    /// Every polygon presenting the edge `(v0, v1)` in either direction.
    pub fn polygons_around_edge(&self, v0: Index, v1: Index) -> Vec<PolygonEdge> {
        let mut around = Vec::new();
        for &polygon_vertex in self.polygons_around_vertex(v0) {
            let vertices = self.polygon_vertices(polygon_vertex.polygon);
            let n = vertices.len();
            let at = polygon_vertex.vertex_id as usize;
            if vertices[(at + 1) % n] == v1 {
                around.push(PolygonEdge::new(polygon_vertex.polygon, at as LocalIndex));
            }
            if vertices[(at + n - 1) % n] == v1 {
                around.push(PolygonEdge::new(
                    polygon_vertex.polygon,
                    ((at + n - 1) % n) as LocalIndex,
                ));
            }
        }
        around
    }

    pub fn polygon_barycenter(&self, polygon: Index) -> Point<D> {
        let vertices = self.polygon_vertices(polygon);
        let mut sum = nalgebra::SVector::<f64, D>::zeros();
        for &vertex in vertices {
            sum += self.point(vertex).coords;
        }
        Point::from(sum / vertices.len() as f64)
    }

    pub fn polygon_bounding_box(&self, polygon: Index) -> BoundingBox<D> {
        BoundingBox::from_points(
            self.polygon_vertices(polygon)
                .iter()
                .map(|&vertex| *self.point(vertex)),
        )
    }

    pub fn bounding_box(&self) -> BoundingBox<D> {
        BoundingBox::from_points(self.points.iter().copied())
    }

    pub fn are_edges_enabled(&self) -> bool {
        self.edges.is_some()
    }

    pub fn edges(&self) -> Option<&SurfaceEdges> {
        self.edges.as_ref()
    }

    pub fn vertex_attribute_manager(&self) -> &AttributeManager {
        &self.vertex_attributes
    }

    pub fn vertex_attribute_manager_mut(&mut self) -> &mut AttributeManager {
        &mut self.vertex_attributes
    }

    pub fn polygon_attribute_manager(&self) -> &AttributeManager {
        &self.polygon_attributes
    }

    pub fn polygon_attribute_manager_mut(&mut self) -> &mut AttributeManager {
        &mut self.polygon_attributes
    }

    pub fn coordinate_reference_system_manager(&self) -> &CoordinateReferenceSystemManager {
        &self.crs
    }

    pub fn coordinate_reference_system_manager_mut(
        &mut self,
    ) -> &mut CoordinateReferenceSystemManager {
        &mut self.crs
    }

    fn fan_triangles(&self, polygon: Index) -> impl Iterator<Item = [Index; 3]> + '_ {
        let vertices = self.polygon_vertices(polygon);
        (1..vertices.len().saturating_sub(1))
            .map(move |k| [vertices[0], vertices[k], vertices[k + 1]])
    }
}

impl SurfaceMesh<2> {
    /// Area of the polygon, fanned from its first vertex; counterclockwise
    /// loops are positive.
    pub fn polygon_signed_area(&self, polygon: Index) -> f64 {
        self.fan_triangles(polygon)
            .map(|[a, b, c]| {
                triangle_signed_area2d(&Triangle::new(
                    *self.point(a),
                    *self.point(b),
                    *self.point(c),
                ))
            })
            .sum()
    }

    pub fn polygon_area(&self, polygon: Index) -> f64 {
        self.polygon_signed_area(polygon).abs()
    }

    pub fn area(&self) -> f64 {
        (0..self.nb_polygons() as Index)
            .map(|polygon| self.polygon_area(polygon))
            .sum()
    }
}

impl SurfaceMesh<3> {
    pub fn polygon_area(&self, polygon: Index) -> f64 {
        self.fan_triangles(polygon)
            .map(|[a, b, c]| {
                triangle_area3d(&Triangle::new(
                    *self.point(a),
                    *self.point(b),
                    *self.point(c),
                ))
            })
            .sum()
    }

    pub fn area(&self) -> f64 {
        (0..self.nb_polygons() as Index)
            .map(|polygon| self.polygon_area(polygon))
            .sum()
    }

    /// Unit normal of a polygon, averaged over its fan triangles.
    pub fn polygon_normal(&self, polygon: Index) -> Result<nalgebra::Vector3<f64>, MeshError> {
        let mut normal = nalgebra::Vector3::zeros();
        for [a, b, c] in self.fan_triangles(polygon) {
            let edge0 = self.point(b) - self.point(a);
            let edge1 = self.point(c) - self.point(a);
            normal += edge0.cross(&edge1);
        }
        if normal.norm() <= crate::geometry::GLOBAL_EPSILON {
            return Err(MeshError::DegenerateGeometry("polygon"));
        }
        Ok(normal.normalize())
    }
}

/// Edits a [`SurfaceMesh`].
pub struct SurfaceMeshBuilder<'a, const D: usize> {
    mesh: &'a mut SurfaceMesh<D>,
}

impl<'a, const D: usize> SurfaceMeshBuilder<'a, D> {
    pub fn new(mesh: &'a mut SurfaceMesh<D>) -> Self {
        Self { mesh }
    }

    fn invalidate(&mut self) {
        self.mesh.around_vertex.take();
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

    pub fn create_polygon(&mut self, vertices: &[Index]) -> Result<Index, MeshError> {
        if vertices.len() < 3 {
            return Err(MeshError::DegenerateGeometry("polygon"));
        }
        let size = self.mesh.nb_vertices();
        for &vertex in vertices {
            if vertex as usize >= size {
                return Err(MeshError::OutOfRange {
                    index: vertex,
                    size,
                });
            }
        }
        let created = self.mesh.nb_polygons() as Index;
        self.mesh.polygon_vertices.extend_from_slice(vertices);
        self.mesh
            .polygon_adjacents
            .extend(std::iter::repeat_n(NO_ID, vertices.len()));
        self.mesh.polygon_ptr.push(self.mesh.polygon_vertices.len());
        self.mesh
            .polygon_attributes
            .resize(self.mesh.nb_polygons());
        if let Some(edges) = self.mesh.edges.as_mut() {
            for from in 0..vertices.len() {
                let to = (from + 1) % vertices.len();
                edges.find_or_create_edge([vertices[from], vertices[to]]);
            }
        }
        self.invalidate();
        Ok(created)
    }

    /// Renames one vertex slot; the surrounding edge records follow.
    pub fn set_polygon_vertex(
        &mut self,
        polygon_vertex: PolygonVertex,
        vertex: Index,
    ) -> Result<(), MeshError> {
        let size = self.mesh.nb_vertices();
        if vertex != NO_ID && vertex as usize >= size {
            return Err(MeshError::OutOfRange {
                index: vertex,
                size,
            });
        }
        let n = self.mesh.nb_polygon_vertices(polygon_vertex.polygon);
        let at = polygon_vertex.vertex_id as usize;
        if at >= n {
            return Err(MeshError::OutOfRange {
                index: polygon_vertex.vertex_id as Index,
                size: n,
            });
        }
        let start = self.mesh.polygon_ptr[polygon_vertex.polygon as usize];
        let old = self.mesh.polygon_vertices[start + at];
        if old == vertex {
            return Ok(());
        }
        if let Some(edges) = self.mesh.edges.as_mut() {
            let previous = self.mesh.polygon_vertices[start + (at + n - 1) % n];
            let next = self.mesh.polygon_vertices[start + (at + 1) % n];
            edges.remove_edge([previous, old]);
            edges.remove_edge([old, next]);
            edges.find_or_create_edge([previous, vertex]);
            edges.find_or_create_edge([vertex, next]);
        }
        self.mesh.polygon_vertices[start + at] = vertex;
        self.invalidate();
        Ok(())
    }

    pub fn set_polygon_adjacent(
        &mut self,
        edge: PolygonEdge,
        adjacent: Index,
    ) -> Result<(), MeshError> {
        let nb_polygons = self.mesh.nb_polygons();
        if adjacent != NO_ID && adjacent as usize >= nb_polygons {
            return Err(MeshError::OutOfRange {
                index: adjacent,
                size: nb_polygons,
            });
        }
        let slot = self.mesh.polygon_ptr[edge.polygon as usize] + edge.edge_id as usize;
        self.mesh.polygon_adjacents[slot] = adjacent;
        Ok(())
    }

    pub fn unset_polygon_adjacent(&mut self, edge: PolygonEdge) -> Result<(), MeshError> {
        self.set_polygon_adjacent(edge, NO_ID)
    }

    /// Rebuilds every adjacency slot from the polygon loops. Two polygons
    /// are linked across an edge iff they traverse it in opposite orders;
    /// borders and non-manifold edges keep [`NO_ID`].
    pub fn compute_polygon_adjacencies(&mut self) {
        let mesh = &mut *self.mesh;
        for slot in &mut mesh.polygon_adjacents {
            *slot = NO_ID;
        }
        let mut edge_map: FxHashMap<VertexCycle, Vec<(PolygonEdge, [Index; 2])>> =
            FxHashMap::default();
        for polygon in 0..mesh.nb_polygons() as Index {
            for edge_id in 0..mesh.nb_polygon_vertices(polygon) {
                let edge = PolygonEdge::new(polygon, edge_id as LocalIndex);
                let vertices = mesh.polygon_edge_vertices(edge);
                edge_map
                    .entry(VertexCycle::from(vertices))
                    .or_default()
                    .push((edge, vertices));
            }
        }
        for sharing in edge_map.into_values() {
            if sharing.len() != 2 {
                continue;
            }
            let ((edge0, vertices0), (edge1, vertices1)) = (sharing[0], sharing[1]);
            if vertices0[0] == vertices1[1] && vertices0[1] == vertices1[0] {
                let slot0 =
                    mesh.polygon_ptr[edge0.polygon as usize] + edge0.edge_id as usize;
                let slot1 =
                    mesh.polygon_ptr[edge1.polygon as usize] + edge1.edge_id as usize;
                mesh.polygon_adjacents[slot0] = edge1.polygon;
                mesh.polygon_adjacents[slot1] = edge0.polygon;
            }
        }
    }

    /// Compacts polygons, returning the old index -> new index map.
    pub fn delete_polygons(&mut self, to_delete: &[bool]) -> Result<Vec<Index>, MeshError> {
        if to_delete.len() != self.mesh.nb_polygons() {
            return Err(MeshError::SizeMismatch {
                expected: self.mesh.nb_polygons(),
                got: to_delete.len(),
            });
        }
        let mapping = self.mesh.polygon_attributes.delete_elements(to_delete)?;
        if let Some(edges) = self.mesh.edges.as_mut() {
            for polygon in 0..to_delete.len() {
                if !to_delete[polygon] {
                    continue;
                }
                let range = self.mesh.polygon_ptr[polygon]..self.mesh.polygon_ptr[polygon + 1];
                let vertices = &self.mesh.polygon_vertices[range];
                for from in 0..vertices.len() {
                    let to = (from + 1) % vertices.len();
                    edges.remove_edge([vertices[from], vertices[to]]);
                }
            }
        }
        let mut polygon_ptr = vec![0];
        let mut polygon_vertices = Vec::with_capacity(self.mesh.polygon_vertices.len());
        let mut polygon_adjacents = Vec::with_capacity(self.mesh.polygon_adjacents.len());
        for polygon in 0..to_delete.len() {
            if to_delete[polygon] {
                continue;
            }
            let range = self.mesh.polygon_ptr[polygon]..self.mesh.polygon_ptr[polygon + 1];
            polygon_vertices.extend_from_slice(&self.mesh.polygon_vertices[range.clone()]);
            polygon_adjacents.extend(self.mesh.polygon_adjacents[range].iter().map(|&adjacent| {
                if adjacent == NO_ID {
                    NO_ID
                } else {
                    mapping[adjacent as usize]
                }
            }));
            polygon_ptr.push(polygon_vertices.len());
        }
        self.mesh.polygon_ptr = polygon_ptr;
        self.mesh.polygon_vertices = polygon_vertices;
        self.mesh.polygon_adjacents = polygon_adjacents;
        self.invalidate();
        Ok(mapping)
    }

    /// Reorders polygons; `permutation[old]` is the destination index.
    pub fn permute_polygons(&mut self, permutation: &[Index]) -> Result<(), MeshError> {
        if permutation.len() != self.mesh.nb_polygons() {
            return Err(MeshError::SizeMismatch {
                expected: self.mesh.nb_polygons(),
                got: permutation.len(),
            });
        }
        self.mesh.polygon_attributes.permute_elements(permutation)?;
        let nb = permutation.len();
        let mut destinations = vec![0usize; nb];
        for (old, &new) in permutation.iter().enumerate() {
            destinations[new as usize] = old;
        }
        let mut polygon_ptr = vec![0];
        let mut polygon_vertices = Vec::with_capacity(self.mesh.polygon_vertices.len());
        let mut polygon_adjacents = Vec::with_capacity(self.mesh.polygon_adjacents.len());
        for &old in &destinations {
            let range = self.mesh.polygon_ptr[old]..self.mesh.polygon_ptr[old + 1];
            polygon_vertices.extend_from_slice(&self.mesh.polygon_vertices[range.clone()]);
            polygon_adjacents.extend(self.mesh.polygon_adjacents[range].iter().map(|&adjacent| {
                if adjacent == NO_ID {
                    NO_ID
                } else {
                    permutation[adjacent as usize]
                }
            }));
            polygon_ptr.push(polygon_vertices.len());
        }
        self.mesh.polygon_ptr = polygon_ptr;
        self.mesh.polygon_vertices = polygon_vertices;
        self.mesh.polygon_adjacents = polygon_adjacents;
        self.invalidate();
        Ok(())
    }

    /// Reorders vertices and renames polygon loops accordingly.
    pub fn permute_vertices(&mut self, permutation: &[Index]) -> Result<(), MeshError> {
        self.mesh.vertex_attributes.permute_elements(permutation)?;
        let mut permuted = vec![Point::origin(); self.mesh.points.len()];
        for (old, point) in self.mesh.points.drain(..).enumerate() {
            permuted[permutation[old] as usize] = point;
        }
        self.mesh.points = permuted;
        for vertex in &mut self.mesh.polygon_vertices {
            if *vertex != NO_ID {
                *vertex = permutation[*vertex as usize];
            }
        }
        if let Some(edges) = self.mesh.edges.as_mut() {
            edges.update_edge_vertices(permutation);
        }
        self.invalidate();
        Ok(())
    }

    /// Renames every occurrence of `old` to `new` in one pass.
    pub fn replace_vertex(&mut self, old: Index, new: Index) -> Result<(), MeshError> {
        let mut mapping: Vec<Index> = (0..self.mesh.nb_vertices() as Index).collect();
        let size = self.mesh.nb_vertices();
        if old as usize >= size || new as usize >= size {
            return Err(MeshError::OutOfRange {
                index: old.max(new),
                size,
            });
        }
        mapping[old as usize] = new;
        self.replace_vertices(&mapping)
    }

    /// Rewrites every polygon loop through `old_to_new` atomically.
    pub fn replace_vertices(&mut self, old_to_new: &[Index]) -> Result<(), MeshError> {
        if old_to_new.len() != self.mesh.nb_vertices() {
            return Err(MeshError::SizeMismatch {
                expected: self.mesh.nb_vertices(),
                got: old_to_new.len(),
            });
        }
        for vertex in &mut self.mesh.polygon_vertices {
            if *vertex != NO_ID {
                *vertex = old_to_new[*vertex as usize];
            }
        }
        if let Some(edges) = self.mesh.edges.as_mut() {
            edges.update_edge_vertices(old_to_new);
        }
        self.invalidate();
        Ok(())
    }

    /// Compacts vertices; polygon slots referencing deleted vertices become
    /// [`NO_ID`] and must be fixed or removed by the caller.
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
        for vertex in &mut self.mesh.polygon_vertices {
            if *vertex != NO_ID {
                *vertex = mapping[*vertex as usize];
            }
        }
        if let Some(edges) = self.mesh.edges.as_mut() {
            edges.update_edge_vertices(&mapping);
            edges.clean_edges()?;
        }
        self.invalidate();
        Ok(mapping)
    }

    /// Drops vertices not referenced by any polygon, returning the old -> new
    /// vertex map.
    pub fn delete_isolated_vertices(&mut self) -> Result<Vec<Index>, MeshError> {
        let mut isolated = vec![true; self.mesh.nb_vertices()];
        for &vertex in &self.mesh.polygon_vertices {
            if vertex != NO_ID {
                isolated[vertex as usize] = false;
            }
        }
        self.delete_vertices(&isolated)
    }

    pub fn enable_edges(&mut self) {
        if self.mesh.edges.is_some() {
            return;
        }
        let mut edges = SurfaceEdges::new();
        for polygon in 0..self.mesh.nb_polygons() as Index {
            let vertices = self.mesh.polygon_vertices(polygon);
            for from in 0..vertices.len() {
                let to = (from + 1) % vertices.len();
                edges.find_or_create_edge([vertices[from], vertices[to]]);
            }
        }
        self.mesh.edges = Some(edges);
    }

    pub fn disable_edges(&mut self) {
        self.mesh.edges = None;
    }
}
