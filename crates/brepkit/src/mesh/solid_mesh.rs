use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::MeshError;
use super::crs::CoordinateReferenceSystemManager;
use super::solid_facets::{SolidEdges, SolidFacets};
use super::vertex_cycle::VertexCycle;
use crate::basic::{AttributeManager, Index, LocalIndex, NO_ID};
use crate::geometry::BoundingBox;
use crate::geometry::point::Point3;

/// One vertex slot of one polyhedron.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolyhedronVertex {
    pub polyhedron: Index,
    pub vertex_id: LocalIndex,
}

impl PolyhedronVertex {
    pub fn new(polyhedron: Index, vertex_id: LocalIndex) -> Self {
        Self {
            polyhedron,
            vertex_id,
        }
    }
}

/// One facet slot of one polyhedron.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolyhedronFacet {
    pub polyhedron: Index,
    pub facet_id: LocalIndex,
}

impl PolyhedronFacet {
    pub fn new(polyhedron: Index, facet_id: LocalIndex) -> Self {
        Self {
            polyhedron,
            facet_id,
        }
    }
}

/// One vertex slot of one polyhedron facet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolyhedronFacetVertex {
    pub facet: PolyhedronFacet,
    pub vertex_id: LocalIndex,
}

impl PolyhedronFacetVertex {
    pub fn new(facet: PolyhedronFacet, vertex_id: LocalIndex) -> Self {
        Self { facet, vertex_id }
    }
}

/// Polyhedra over a shared point set.
///
/// Each polyhedron is a vertex list plus facets written as ordered lists of
/// local vertex ordinals, outward-oriented; each facet carries an adjacency
/// slot. Opposite facets of two adjacent polyhedra enumerate the same
/// vertices in opposite orientations, and non-manifold facets keep [`NO_ID`]
/// on every side.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolidMesh3 {
    vertex_attributes: AttributeManager,
    points: Vec<Point3>,
    crs: CoordinateReferenceSystemManager,
    vertex_ptr: Vec<usize>,
    vertices: Vec<Index>,
    facet_slot_ptr: Vec<usize>,
    facet_ptr: Vec<usize>,
    facet_locals: Vec<LocalIndex>,
    adjacents: Vec<Index>,
    polyhedron_attributes: AttributeManager,
    facets: Option<SolidFacets>,
    edges: Option<SolidEdges>,
    #[serde(skip)]
    around_vertex: OnceCell<Vec<Vec<PolyhedronVertex>>>,
}

impl Default for SolidMesh3 {
    fn default() -> Self {
        Self {
            vertex_attributes: AttributeManager::new(),
            points: Vec::new(),
            crs: CoordinateReferenceSystemManager::new(),
            vertex_ptr: vec![0],
            vertices: Vec::new(),
            facet_slot_ptr: vec![0],
            facet_ptr: vec![0],
            facet_locals: Vec::new(),
            adjacents: Vec::new(),
            polyhedron_attributes: AttributeManager::new(),
            facets: None,
            edges: None,
            around_vertex: OnceCell::new(),
        }
    }
}

impl SolidMesh3 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nb_vertices(&self) -> usize {
        self.points.len()
    }

    pub fn nb_polyhedra(&self) -> usize {
        self.vertex_ptr.len() - 1
    }

    pub fn point(&self, vertex: Index) -> &Point3 {
        &self.points[vertex as usize]
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn nb_polyhedron_vertices(&self, polyhedron: Index) -> usize {
        self.vertex_ptr[polyhedron as usize + 1] - self.vertex_ptr[polyhedron as usize]
    }

    pub fn polyhedron_vertices(&self, polyhedron: Index) -> &[Index] {
        &self.vertices[self.vertex_ptr[polyhedron as usize]..self.vertex_ptr[polyhedron as usize + 1]]
    }

    pub fn polyhedron_vertex(&self, polyhedron_vertex: PolyhedronVertex) -> Index {
        self.polyhedron_vertices(polyhedron_vertex.polyhedron)
            [polyhedron_vertex.vertex_id as usize]
    }

    pub fn nb_polyhedron_facets(&self, polyhedron: Index) -> usize {
        self.facet_slot_ptr[polyhedron as usize + 1] - self.facet_slot_ptr[polyhedron as usize]
    }

    /// Global slot of a polyhedron facet in the flattened facet arrays.
    fn slot(&self, facet: PolyhedronFacet) -> usize {
        self.facet_slot_ptr[facet.polyhedron as usize] + facet.facet_id as usize
    }

    /// Local vertex ordinals of a facet, referencing the polyhedron's own
    /// vertex list.
    pub fn polyhedron_facet_locals(&self, facet: PolyhedronFacet) -> &[LocalIndex] {
        let slot = self.slot(facet);
        &self.facet_locals[self.facet_ptr[slot]..self.facet_ptr[slot + 1]]
    }

    pub fn nb_polyhedron_facet_vertices(&self, facet: PolyhedronFacet) -> usize {
        self.polyhedron_facet_locals(facet).len()
    }

    pub fn polyhedron_facet_vertex(&self, facet_vertex: PolyhedronFacetVertex) -> Index {
        let local = self.polyhedron_facet_locals(facet_vertex.facet)
            [facet_vertex.vertex_id as usize];
        self.polyhedron_vertices(facet_vertex.facet.polyhedron)[local as usize]
    }

    /// Global vertex loop of a facet.
    pub fn polyhedron_facet_vertices(&self, facet: PolyhedronFacet) -> SmallVec<[Index; 4]> {
        let vertices = self.polyhedron_vertices(facet.polyhedron);
        self.polyhedron_facet_locals(facet)
            .iter()
            .map(|&local| vertices[local as usize])
            .collect()
    }

    pub fn polyhedron_adjacent(&self, facet: PolyhedronFacet) -> Index {
        self.adjacents[self.slot(facet)]
    }

    /// The matching facet on the adjacent polyhedron, when any.
    pub fn polyhedron_adjacent_facet(&self, facet: PolyhedronFacet) -> Option<PolyhedronFacet> {
        let adjacent = self.polyhedron_adjacent(facet);
        if adjacent == NO_ID {
            return None;
        }
        let cycle = VertexCycle::new(self.polyhedron_facet_vertices(facet).as_slice());
        for other_id in 0..self.nb_polyhedron_facets(adjacent) {
            let other = PolyhedronFacet::new(adjacent, other_id as LocalIndex);
            if VertexCycle::new(self.polyhedron_facet_vertices(other).as_slice()) == cycle {
                return Some(other);
            }
        }
        None
    }

    pub fn is_polyhedron_facet_on_border(&self, facet: PolyhedronFacet) -> bool {
        self.polyhedron_adjacent(facet) == NO_ID
    }

    pub fn is_polyhedron_on_border(&self, polyhedron: Index) -> bool {
        (0..self.nb_polyhedron_facets(polyhedron)).any(|facet_id| {
            self.is_polyhedron_facet_on_border(PolyhedronFacet::new(
                polyhedron,
                facet_id as LocalIndex,
            ))
        })
    }

    /// Every border facet of the mesh, in polyhedron order.
    pub fn border_facets(&self) -> Vec<PolyhedronFacet> {
        let mut borders = Vec::new();
        for polyhedron in 0..self.nb_polyhedra() as Index {
            for facet_id in 0..self.nb_polyhedron_facets(polyhedron) {
                let facet = PolyhedronFacet::new(polyhedron, facet_id as LocalIndex);
                if self.is_polyhedron_facet_on_border(facet) {
                    borders.push(facet);
                }
            }
        }
        borders
    }

    /// Every polyhedron slot referencing `vertex`.
    pub fn polyhedra_around_vertex(&self, vertex: Index) -> &[PolyhedronVertex] {
        let around = self.around_vertex.get_or_init(|| {
            let mut around = vec![Vec::new(); self.nb_vertices()];
            for polyhedron in 0..self.nb_polyhedra() as Index {
                for (slot, &v) in self.polyhedron_vertices(polyhedron).iter().enumerate() {
                    if v != NO_ID {
                        around[v as usize]
                            .push(PolyhedronVertex::new(polyhedron, slot as LocalIndex));
                    }
                }
            }
            around
        });
        &around[vertex as usize]
    }

    pub fn polyhedron_barycenter(&self, polyhedron: Index) -> Point3 {
        let vertices = self.polyhedron_vertices(polyhedron);
        let mut sum = nalgebra::Vector3::zeros();
        for &vertex in vertices {
            sum += self.point(vertex).coords;
        }
        Point3::from(sum / vertices.len() as f64)
    }

    /// Signed volume from the divergence theorem over outward facet fans.
    pub fn polyhedron_signed_volume(&self, polyhedron: Index) -> f64 {
        let mut volume = 0.0;
        for facet_id in 0..self.nb_polyhedron_facets(polyhedron) {
            let facet = PolyhedronFacet::new(polyhedron, facet_id as LocalIndex);
            let loop_vertices = self.polyhedron_facet_vertices(facet);
            let origin = self.point(loop_vertices[0]).coords;
            for window in 1..loop_vertices.len() - 1 {
                let b = self.point(loop_vertices[window]).coords;
                let c = self.point(loop_vertices[window + 1]).coords;
                volume += origin.dot(&b.cross(&c)) / 6.0;
            }
        }
        volume
    }

    pub fn polyhedron_volume(&self, polyhedron: Index) -> f64 {
        self.polyhedron_signed_volume(polyhedron).abs()
    }

    pub fn volume(&self) -> f64 {
        (0..self.nb_polyhedra() as Index)
            .map(|polyhedron| self.polyhedron_signed_volume(polyhedron))
            .sum()
    }

    pub fn polyhedron_bounding_box(&self, polyhedron: Index) -> BoundingBox<3> {
        BoundingBox::from_points(
            self.polyhedron_vertices(polyhedron)
                .iter()
                .map(|&vertex| *self.point(vertex)),
        )
    }

    pub fn bounding_box(&self) -> BoundingBox<3> {
        BoundingBox::from_points(self.points.iter().copied())
    }

    pub fn are_facets_enabled(&self) -> bool {
        self.facets.is_some()
    }

    pub fn facets(&self) -> Option<&SolidFacets> {
        self.facets.as_ref()
    }

    pub fn are_edges_enabled(&self) -> bool {
        self.edges.is_some()
    }

    pub fn edges(&self) -> Option<&SolidEdges> {
        self.edges.as_ref()
    }

    pub fn vertex_attribute_manager(&self) -> &AttributeManager {
        &self.vertex_attributes
    }

    pub fn vertex_attribute_manager_mut(&mut self) -> &mut AttributeManager {
        &mut self.vertex_attributes
    }

    pub fn polyhedron_attribute_manager(&self) -> &AttributeManager {
        &self.polyhedron_attributes
    }

    pub fn polyhedron_attribute_manager_mut(&mut self) -> &mut AttributeManager {
        &mut self.polyhedron_attributes
    }

    pub fn coordinate_reference_system_manager(&self) -> &CoordinateReferenceSystemManager {
        &self.crs
    }

    pub fn coordinate_reference_system_manager_mut(
        &mut self,
    ) -> &mut CoordinateReferenceSystemManager {
        &mut self.crs
    }

    fn facet_global_loops(&self, polyhedron: Index) -> Vec<SmallVec<[Index; 4]>> {
        (0..self.nb_polyhedron_facets(polyhedron))
            .map(|facet_id| {
                self.polyhedron_facet_vertices(PolyhedronFacet::new(
                    polyhedron,
                    facet_id as LocalIndex,
                ))
            })
            .collect()
    }
}

/// Whether two vertex loops traverse the same cycle in opposite directions.
fn opposite_loops(loop0: &[Index], loop1: &[Index]) -> bool {
    if loop0.len() != loop1.len() {
        return false;
    }
    let n = loop0.len();
    let Some(start) = loop1.iter().position(|&vertex| vertex == loop0[0]) else {
        return false;
    };
    (0..n).all(|offset| loop0[offset] == loop1[(start + n - offset) % n])
}

/// Edits a [`SolidMesh3`].
pub struct SolidMeshBuilder<'a> {
    mesh: &'a mut SolidMesh3,
}

impl<'a> SolidMeshBuilder<'a> {
    pub fn new(mesh: &'a mut SolidMesh3) -> Self {
        Self { mesh }
    }

    fn invalidate(&mut self) {
        self.mesh.around_vertex.take();
    }

    pub fn create_point(&mut self, point: Point3) -> Index {
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
            .resize(self.mesh.points.len() + count, Point3::origin());
        self.mesh.vertex_attributes.resize(self.mesh.points.len());
        self.invalidate();
        first
    }

    pub fn set_point(&mut self, vertex: Index, point: Point3) -> Result<(), MeshError> {
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

    /// Creates a polyhedron from its vertex list and its facets written as
    /// ordered local vertex ordinals, outward-oriented.
    pub fn create_polyhedron(
        &mut self,
        vertices: &[Index],
        facets: &[&[LocalIndex]],
    ) -> Result<Index, MeshError> {
        if vertices.len() < 4 || facets.len() < 4 {
            return Err(MeshError::DegenerateGeometry("polyhedron"));
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
        for facet in facets {
            for &local in *facet {
                if local as usize >= vertices.len() {
                    return Err(MeshError::OutOfRange {
                        index: local as Index,
                        size: vertices.len(),
                    });
                }
            }
        }
        let created = self.mesh.nb_polyhedra() as Index;
        self.mesh.vertices.extend_from_slice(vertices);
        self.mesh.vertex_ptr.push(self.mesh.vertices.len());
        for facet in facets {
            self.mesh.facet_locals.extend_from_slice(facet);
            self.mesh.facet_ptr.push(self.mesh.facet_locals.len());
            self.mesh.adjacents.push(NO_ID);
        }
        self.mesh.facet_slot_ptr.push(self.mesh.adjacents.len());
        self.mesh
            .polyhedron_attributes
            .resize(self.mesh.nb_polyhedra());
        self.register_polyhedron(created);
        self.invalidate();
        Ok(created)
    }

    fn register_polyhedron(&mut self, polyhedron: Index) {
        let loops = self.mesh.facet_global_loops(polyhedron);
        if let Some(facets) = self.mesh.facets.as_mut() {
            for loop_vertices in &loops {
                facets.find_or_create_facet(loop_vertices);
            }
        }
        if let Some(edges) = self.mesh.edges.as_mut() {
            for loop_vertices in &loops {
                for from in 0..loop_vertices.len() {
                    let to = (from + 1) % loop_vertices.len();
                    edges.find_or_create_edge([loop_vertices[from], loop_vertices[to]]);
                }
            }
        }
    }

    fn unregister_polyhedron(&mut self, polyhedron: Index) {
        let loops = self.mesh.facet_global_loops(polyhedron);
        if let Some(facets) = self.mesh.facets.as_mut() {
            for loop_vertices in &loops {
                facets.remove_facet(loop_vertices);
            }
        }
        if let Some(edges) = self.mesh.edges.as_mut() {
            for loop_vertices in &loops {
                for from in 0..loop_vertices.len() {
                    let to = (from + 1) % loop_vertices.len();
                    edges.remove_edge([loop_vertices[from], loop_vertices[to]]);
                }
            }
        }
    }

    /// Renames one vertex slot of one polyhedron; facet and edge records
    /// follow.
    pub fn set_polyhedron_vertex(
        &mut self,
        polyhedron_vertex: PolyhedronVertex,
        vertex: Index,
    ) -> Result<(), MeshError> {
        let size = self.mesh.nb_vertices();
        if vertex != NO_ID && vertex as usize >= size {
            return Err(MeshError::OutOfRange {
                index: vertex,
                size,
            });
        }
        let n = self.mesh.nb_polyhedron_vertices(polyhedron_vertex.polyhedron);
        if polyhedron_vertex.vertex_id as usize >= n {
            return Err(MeshError::OutOfRange {
                index: polyhedron_vertex.vertex_id as Index,
                size: n,
            });
        }
        self.unregister_polyhedron(polyhedron_vertex.polyhedron);
        let at = self.mesh.vertex_ptr[polyhedron_vertex.polyhedron as usize]
            + polyhedron_vertex.vertex_id as usize;
        self.mesh.vertices[at] = vertex;
        self.register_polyhedron(polyhedron_vertex.polyhedron);
        self.invalidate();
        Ok(())
    }

    pub fn set_polyhedron_adjacent(
        &mut self,
        facet: PolyhedronFacet,
        adjacent: Index,
    ) -> Result<(), MeshError> {
        let nb_polyhedra = self.mesh.nb_polyhedra();
        if adjacent != NO_ID && adjacent as usize >= nb_polyhedra {
            return Err(MeshError::OutOfRange {
                index: adjacent,
                size: nb_polyhedra,
            });
        }
        let slot = self.mesh.slot(facet);
        self.mesh.adjacents[slot] = adjacent;
        Ok(())
    }

    pub fn unset_polyhedron_adjacent(&mut self, facet: PolyhedronFacet) -> Result<(), MeshError> {
        self.set_polyhedron_adjacent(facet, NO_ID)
    }

    /// Rebuilds every adjacency slot from the facet loops. Two polyhedra are
    /// linked across a facet iff they present the same cycle in opposite
    /// orientations; borders and non-manifold facets keep [`NO_ID`].
    pub fn compute_polyhedron_adjacencies(&mut self) {
        for slot in &mut self.mesh.adjacents {
            *slot = NO_ID;
        }
        let mut facet_map: FxHashMap<VertexCycle, Vec<PolyhedronFacet>> = FxHashMap::default();
        for polyhedron in 0..self.mesh.nb_polyhedra() as Index {
            for facet_id in 0..self.mesh.nb_polyhedron_facets(polyhedron) {
                let facet = PolyhedronFacet::new(polyhedron, facet_id as LocalIndex);
                let cycle =
                    VertexCycle::new(self.mesh.polyhedron_facet_vertices(facet).as_slice());
                facet_map.entry(cycle).or_default().push(facet);
            }
        }
        for sharing in facet_map.into_values() {
            if sharing.len() != 2 {
                continue;
            }
            let (facet0, facet1) = (sharing[0], sharing[1]);
            let loop0 = self.mesh.polyhedron_facet_vertices(facet0);
            let loop1 = self.mesh.polyhedron_facet_vertices(facet1);
            if opposite_loops(&loop0, &loop1) {
                let slot0 = self.mesh.slot(facet0);
                let slot1 = self.mesh.slot(facet1);
                self.mesh.adjacents[slot0] = facet1.polyhedron;
                self.mesh.adjacents[slot1] = facet0.polyhedron;
            }
        }
    }

    /// Compacts polyhedra, returning the old index -> new index map.
    pub fn delete_polyhedra(&mut self, to_delete: &[bool]) -> Result<Vec<Index>, MeshError> {
        if to_delete.len() != self.mesh.nb_polyhedra() {
            return Err(MeshError::SizeMismatch {
                expected: self.mesh.nb_polyhedra(),
                got: to_delete.len(),
            });
        }
        for polyhedron in 0..to_delete.len() {
            if to_delete[polyhedron] {
                self.unregister_polyhedron(polyhedron as Index);
            }
        }
        let mapping = self.mesh.polyhedron_attributes.delete_elements(to_delete)?;
        let mut vertex_ptr = vec![0];
        let mut vertices = Vec::with_capacity(self.mesh.vertices.len());
        let mut facet_slot_ptr = vec![0];
        let mut facet_ptr = vec![0];
        let mut facet_locals = Vec::with_capacity(self.mesh.facet_locals.len());
        let mut adjacents = Vec::with_capacity(self.mesh.adjacents.len());
        for polyhedron in 0..to_delete.len() {
            if to_delete[polyhedron] {
                continue;
            }
            let vertex_range =
                self.mesh.vertex_ptr[polyhedron]..self.mesh.vertex_ptr[polyhedron + 1];
            vertices.extend_from_slice(&self.mesh.vertices[vertex_range]);
            vertex_ptr.push(vertices.len());
            let slot_range =
                self.mesh.facet_slot_ptr[polyhedron]..self.mesh.facet_slot_ptr[polyhedron + 1];
            for slot in slot_range {
                let local_range = self.mesh.facet_ptr[slot]..self.mesh.facet_ptr[slot + 1];
                facet_locals.extend_from_slice(&self.mesh.facet_locals[local_range]);
                facet_ptr.push(facet_locals.len());
                let adjacent = self.mesh.adjacents[slot];
                adjacents.push(if adjacent == NO_ID {
                    NO_ID
                } else {
                    mapping[adjacent as usize]
                });
            }
            facet_slot_ptr.push(adjacents.len());
        }
        self.mesh.vertex_ptr = vertex_ptr;
        self.mesh.vertices = vertices;
        self.mesh.facet_slot_ptr = facet_slot_ptr;
        self.mesh.facet_ptr = facet_ptr;
        self.mesh.facet_locals = facet_locals;
        self.mesh.adjacents = adjacents;
        self.invalidate();
        Ok(mapping)
    }

    /// Reorders polyhedra; `permutation[old]` is the destination index.
    pub fn permute_polyhedra(&mut self, permutation: &[Index]) -> Result<(), MeshError> {
        if permutation.len() != self.mesh.nb_polyhedra() {
            return Err(MeshError::SizeMismatch {
                expected: self.mesh.nb_polyhedra(),
                got: permutation.len(),
            });
        }
        self.mesh.polyhedron_attributes.permute_elements(permutation)?;
        let mut destinations = vec![0usize; permutation.len()];
        for (old, &new) in permutation.iter().enumerate() {
            destinations[new as usize] = old;
        }
        let mut vertex_ptr = vec![0];
        let mut vertices = Vec::with_capacity(self.mesh.vertices.len());
        let mut facet_slot_ptr = vec![0];
        let mut facet_ptr = vec![0];
        let mut facet_locals = Vec::with_capacity(self.mesh.facet_locals.len());
        let mut adjacents = Vec::with_capacity(self.mesh.adjacents.len());
        for &old in &destinations {
            let vertex_range = self.mesh.vertex_ptr[old]..self.mesh.vertex_ptr[old + 1];
            vertices.extend_from_slice(&self.mesh.vertices[vertex_range]);
            vertex_ptr.push(vertices.len());
            let slot_range = self.mesh.facet_slot_ptr[old]..self.mesh.facet_slot_ptr[old + 1];
            for slot in slot_range {
                let local_range = self.mesh.facet_ptr[slot]..self.mesh.facet_ptr[slot + 1];
                facet_locals.extend_from_slice(&self.mesh.facet_locals[local_range]);
                facet_ptr.push(facet_locals.len());
                let adjacent = self.mesh.adjacents[slot];
                adjacents.push(if adjacent == NO_ID {
                    NO_ID
                } else {
                    permutation[adjacent as usize]
                });
            }
            facet_slot_ptr.push(adjacents.len());
        }
        self.mesh.vertex_ptr = vertex_ptr;
        self.mesh.vertices = vertices;
        self.mesh.facet_slot_ptr = facet_slot_ptr;
        self.mesh.facet_ptr = facet_ptr;
        self.mesh.facet_locals = facet_locals;
        self.mesh.adjacents = adjacents;
        self.invalidate();
        Ok(())
    }

    /// Reorders vertices and renames polyhedron vertex lists accordingly.
    pub fn permute_vertices(&mut self, permutation: &[Index]) -> Result<(), MeshError> {
        self.mesh.vertex_attributes.permute_elements(permutation)?;
        let mut permuted = vec![Point3::origin(); self.mesh.points.len()];
        for (old, point) in self.mesh.points.drain(..).enumerate() {
            permuted[permutation[old] as usize] = point;
        }
        self.mesh.points = permuted;
        for vertex in &mut self.mesh.vertices {
            if *vertex != NO_ID {
                *vertex = permutation[*vertex as usize];
            }
        }
        if let Some(facets) = self.mesh.facets.as_mut() {
            facets.update_facet_vertices(permutation);
        }
        if let Some(edges) = self.mesh.edges.as_mut() {
            edges.update_edge_vertices(permutation);
        }
        self.invalidate();
        Ok(())
    }

    /// Renames every occurrence of `old` to `new` in one pass.
    pub fn replace_vertex(&mut self, old: Index, new: Index) -> Result<(), MeshError> {
        let size = self.mesh.nb_vertices();
        if old as usize >= size || new as usize >= size {
            return Err(MeshError::OutOfRange {
                index: old.max(new),
                size,
            });
        }
        let mut mapping: Vec<Index> = (0..size as Index).collect();
        mapping[old as usize] = new;
        self.replace_vertices(&mapping)
    }

    /// Rewrites every polyhedron vertex list through `old_to_new` atomically.
    pub fn replace_vertices(&mut self, old_to_new: &[Index]) -> Result<(), MeshError> {
        if old_to_new.len() != self.mesh.nb_vertices() {
            return Err(MeshError::SizeMismatch {
                expected: self.mesh.nb_vertices(),
                got: old_to_new.len(),
            });
        }
        for vertex in &mut self.mesh.vertices {
            if *vertex != NO_ID {
                *vertex = old_to_new[*vertex as usize];
            }
        }
        if let Some(facets) = self.mesh.facets.as_mut() {
            facets.update_facet_vertices(old_to_new);
        }
        if let Some(edges) = self.mesh.edges.as_mut() {
            edges.update_edge_vertices(old_to_new);
        }
        self.invalidate();
        Ok(())
    }

    /// Compacts vertices and renames polyhedron vertex lists; slots of
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
        for vertex in &mut self.mesh.vertices {
            if *vertex != NO_ID {
                *vertex = mapping[*vertex as usize];
            }
        }
        if let Some(facets) = self.mesh.facets.as_mut() {
            facets.update_facet_vertices(&mapping);
            facets.clean_facets()?;
        }
        if let Some(edges) = self.mesh.edges.as_mut() {
            edges.update_edge_vertices(&mapping);
            edges.clean_edges()?;
        }
        self.invalidate();
        Ok(mapping)
    }

    /// Drops vertices not referenced by any polyhedron, returning the old ->
    /// new vertex map.
    pub fn delete_isolated_vertices(&mut self) -> Result<Vec<Index>, MeshError> {
        let mut isolated = vec![true; self.mesh.nb_vertices()];
        for &vertex in &self.mesh.vertices {
            if vertex != NO_ID {
                isolated[vertex as usize] = false;
            }
        }
        self.delete_vertices(&isolated)
    }

    pub fn enable_facets(&mut self) {
        if self.mesh.facets.is_some() {
            return;
        }
        self.mesh.facets = Some(SolidFacets::new());
        for polyhedron in 0..self.mesh.nb_polyhedra() as Index {
            let loops = self.mesh.facet_global_loops(polyhedron);
            let facets = self.mesh.facets.as_mut().unwrap();
            for loop_vertices in &loops {
                facets.find_or_create_facet(loop_vertices);
            }
        }
    }

    pub fn disable_facets(&mut self) {
        self.mesh.facets = None;
    }

    pub fn enable_edges(&mut self) {
        if self.mesh.edges.is_some() {
            return;
        }
        self.mesh.edges = Some(SolidEdges::new());
        for polyhedron in 0..self.mesh.nb_polyhedra() as Index {
            let loops = self.mesh.facet_global_loops(polyhedron);
            let edges = self.mesh.edges.as_mut().unwrap();
            for loop_vertices in &loops {
                for from in 0..loop_vertices.len() {
                    let to = (from + 1) % loop_vertices.len();
                    edges.find_or_create_edge([loop_vertices[from], loop_vertices[to]]);
                }
            }
        }
    }

    pub fn disable_edges(&mut self) {
        self.mesh.edges = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_examples::make_two_tets_solid;
    use approx::assert_abs_diff_eq;

    #[test]
    fn shared_facet_is_reciprocal() {
        let mesh = make_two_tets_solid();
        let facet = PolyhedronFacet::new(0, 0);
        assert_eq!(mesh.polyhedron_adjacent(facet), 1);
        let matching = mesh.polyhedron_adjacent_facet(facet).unwrap();
        assert_eq!(matching, PolyhedronFacet::new(1, 0));
        let loop0 = mesh.polyhedron_facet_vertices(facet);
        let loop1 = mesh.polyhedron_facet_vertices(matching);
        assert!(opposite_loops(&loop0, &loop1));
        assert_eq!(mesh.border_facets().len(), 6);
    }

    #[test]
    fn volumes_are_signed_and_additive() {
        let mesh = make_two_tets_solid();
        assert_abs_diff_eq!(mesh.polyhedron_signed_volume(0), 1.0 / 6.0);
        assert!(mesh.polyhedron_signed_volume(1) > 0.0);
        assert_abs_diff_eq!(
            mesh.volume(),
            mesh.polyhedron_volume(0) + mesh.polyhedron_volume(1)
        );
    }

    #[test]
    fn facet_store_follows_the_mesh() {
        let mut mesh = make_two_tets_solid();
        let mut builder = SolidMeshBuilder::new(&mut mesh);
        builder.enable_facets();
        assert_eq!(mesh.facets().unwrap().nb_facets(), 7);

        let mut builder = SolidMeshBuilder::new(&mut mesh);
        builder.delete_polyhedra(&[false, true]).unwrap();
        let mut builder = SolidMeshBuilder::new(&mut mesh);
        let mapping = builder.delete_isolated_vertices().unwrap();
        assert_eq!(mapping[4], NO_ID);
        assert_eq!(mesh.nb_vertices(), 4);
        assert_eq!(mesh.facets().unwrap().nb_facets(), 4);
    }

    #[test]
    fn polyhedra_around_vertex_reference_it() {
        let mesh = make_two_tets_solid();
        assert_eq!(mesh.polyhedra_around_vertex(1).len(), 2);
        assert_eq!(mesh.polyhedra_around_vertex(0).len(), 1);
        for vertex in 0..mesh.nb_vertices() as Index {
            for &around in mesh.polyhedra_around_vertex(vertex) {
                assert_eq!(mesh.polyhedron_vertex(around), vertex);
            }
        }
    }
}
