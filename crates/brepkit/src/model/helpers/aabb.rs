use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::basic::Index;
use crate::geometry::BoundingBox;
use crate::geometry::aabb::AabbTree;
use crate::model::brep::BRep;
use crate::model::section::Section;

/// Model-level tree over per-component bounding boxes; leaf `i` maps to
/// `components[i]`.
pub struct ModelAabbTree<const D: usize> {
    pub tree: AabbTree<D>,
    pub components: Vec<Uuid>,
}

impl<const D: usize> ModelAabbTree<D> {
    pub fn component(&self, leaf: Index) -> Uuid {
        self.components[leaf as usize]
    }
}

/// Tree over the component bounding boxes of a 3D model.
pub fn create_brep_aabb_tree(model: &BRep) -> ModelAabbTree<3> {
    let mut components = Vec::new();
    let mut bboxes = Vec::new();
    for corner in model.corners() {
        components.push(corner.id());
        bboxes.push(corner.mesh().bounding_box());
    }
    for line in model.lines() {
        components.push(line.id());
        bboxes.push(line.mesh().bounding_box());
    }
    for surface in model.surfaces() {
        components.push(surface.id());
        bboxes.push(surface.mesh().bounding_box());
    }
    for block in model.blocks() {
        components.push(block.id());
        bboxes.push(block.mesh().bounding_box());
    }
    ModelAabbTree {
        tree: AabbTree::new(&bboxes),
        components,
    }
}

/// Tree over the component bounding boxes of a 2D model.
pub fn create_section_aabb_tree(model: &Section) -> ModelAabbTree<2> {
    let mut components = Vec::new();
    let mut bboxes = Vec::new();
    for corner in model.corners() {
        components.push(corner.id());
        bboxes.push(corner.mesh().bounding_box());
    }
    for line in model.lines() {
        components.push(line.id());
        bboxes.push(line.mesh().bounding_box());
    }
    for surface in model.surfaces() {
        components.push(surface.id());
        bboxes.push(surface.mesh().bounding_box());
    }
    ModelAabbTree {
        tree: AabbTree::new(&bboxes),
        components,
    }
}

fn surface_tree(surface: &crate::model::component::Surface<3>) -> AabbTree<3> {
    let mesh = surface.mesh();
    let bboxes: Vec<BoundingBox<3>> = (0..mesh.nb_polygons() as Index)
        .map(|polygon| mesh.polygon_bounding_box(polygon))
        .collect();
    AabbTree::new(&bboxes)
}

fn block_tree(block: &crate::model::component::Block) -> AabbTree<3> {
    let mesh = block.mesh();
    let bboxes: Vec<BoundingBox<3>> = (0..mesh.nb_polyhedra() as Index)
        .map(|polyhedron| mesh.polyhedron_bounding_box(polyhedron))
        .collect();
    AabbTree::new(&bboxes)
}

/// One polygon-level tree per surface of the model.
pub fn create_surface_meshes_aabb_trees(model: &BRep) -> FxHashMap<Uuid, AabbTree<3>> {
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        let surfaces: Vec<_> = model.surfaces().collect();
        return surfaces
            .par_iter()
            .map(|surface| (surface.id(), surface_tree(surface)))
            .collect::<Vec<_>>()
            .into_iter()
            .collect();
    }
    #[cfg(not(feature = "rayon"))]
    model
        .surfaces()
        .map(|surface| (surface.id(), surface_tree(surface)))
        .collect()
}

/// One polyhedron-level tree per block of the model.
pub fn create_block_meshes_aabb_trees(model: &BRep) -> FxHashMap<Uuid, AabbTree<3>> {
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        let blocks: Vec<_> = model.blocks().collect();
        return blocks
            .par_iter()
            .map(|block| (block.id(), block_tree(block)))
            .collect::<Vec<_>>()
            .into_iter()
            .collect();
    }
    #[cfg(not(feature = "rayon"))]
    model
        .blocks()
        .map(|block| (block.id(), block_tree(block)))
        .collect()
}
