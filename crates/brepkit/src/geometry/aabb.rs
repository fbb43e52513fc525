use super::basic_objects::Ray;
use super::bounding_box::BoundingBox;
use super::point::Point;
use super::points_sort::morton_mapping;
use crate::basic::Index;

/// Bounding-box search tree over a fixed set of element boxes.
///
/// Leaves keep the caller's box indices; inner nodes store the union of their
/// subtree. The tree is laid out implicitly in an array, node `i` having
/// children `2i` and `2i + 1`, and leaves are ordered along a Morton curve of
/// the box centers so that siblings stay spatially tight.
#[derive(Clone, Debug, Default)]
pub struct AabbTree<const D: usize> {
    nodes: Vec<BoundingBox<D>>,
    mapping_morton: Vec<Index>,
}

const ROOT: usize = 1;

fn is_leaf(box_begin: usize, box_end: usize) -> bool {
    box_begin + 1 == box_end
}

fn children(
    node: usize,
    box_begin: usize,
    box_end: usize,
) -> (usize, usize, usize) {
    let middle = box_begin + (box_end - box_begin) / 2;
    (middle, 2 * node, 2 * node + 1)
}

fn max_node_index(node: usize, box_begin: usize, box_end: usize) -> usize {
    if is_leaf(box_begin, box_end) {
        return node;
    }
    let (middle, left, right) = children(node, box_begin, box_end);
    max_node_index(left, box_begin, middle).max(max_node_index(right, middle, box_end))
}

impl<const D: usize> AabbTree<D> {
    pub fn new(bboxes: &[BoundingBox<D>]) -> Self {
        if bboxes.is_empty() {
            return Self::default();
        }
        let centers: Vec<Point<D>> = bboxes.iter().map(BoundingBox::center).collect();
        let mapping_morton = morton_mapping(&centers);
        let mut nodes =
            vec![BoundingBox::new(); max_node_index(ROOT, 0, bboxes.len()) + 1];
        initialize_tree(&mut nodes, &mapping_morton, bboxes, ROOT, 0, bboxes.len());
        Self {
            nodes,
            mapping_morton,
        }
    }

    pub fn nb_bboxes(&self) -> usize {
        self.mapping_morton.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping_morton.is_empty()
    }

    /// Box enclosing every element.
    pub fn bounding_box(&self) -> &BoundingBox<D> {
        assert!(!self.is_empty(), "bounding_box on an empty tree");
        &self.nodes[ROOT]
    }

    fn element(&self, morton: usize) -> Index {
        self.mapping_morton[morton]
    }

    /// Element closest to `query` under the caller's element distance.
    ///
    /// `eval_distance` maps (query, element index) to the distance and the
    /// nearest point on that element. Subtrees whose box lies farther than the
    /// incumbent are pruned; exact ties keep the smallest element index.
    pub fn closest_element_box<F>(&self, query: &Point<D>, eval_distance: F) -> (Index, Point<D>, f64)
    where
        F: Fn(&Point<D>, Index) -> (f64, Point<D>),
    {
        assert!(!self.is_empty(), "closest_element_box on an empty tree");
        let hint = self.element(self.closest_leaf_hint(query, ROOT, 0, self.nb_bboxes()));
        let (distance, point) = eval_distance(query, hint);
        let mut best = (hint, point, distance);
        self.closest_recursive(query, &eval_distance, &mut best, ROOT, 0, self.nb_bboxes());
        best
    }

    /// Fast descent picking the nearer child, to seed the incumbent.
    fn closest_leaf_hint(
        &self,
        query: &Point<D>,
        node: usize,
        box_begin: usize,
        box_end: usize,
    ) -> usize {
        if is_leaf(box_begin, box_end) {
            return box_begin;
        }
        let (middle, left, right) = children(node, box_begin, box_end);
        if self.nodes[left].distance_to_point(query) < self.nodes[right].distance_to_point(query)
        {
            self.closest_leaf_hint(query, left, box_begin, middle)
        } else {
            self.closest_leaf_hint(query, right, middle, box_end)
        }
    }

    fn closest_recursive<F>(
        &self,
        query: &Point<D>,
        eval_distance: &F,
        best: &mut (Index, Point<D>, f64),
        node: usize,
        box_begin: usize,
        box_end: usize,
    ) where
        F: Fn(&Point<D>, Index) -> (f64, Point<D>),
    {
        if is_leaf(box_begin, box_end) {
            let element = self.element(box_begin);
            let (distance, point) = eval_distance(query, element);
            if distance < best.2 || (distance == best.2 && element < best.0) {
                *best = (element, point, distance);
            }
            return;
        }
        let (middle, left, right) = children(node, box_begin, box_end);
        let mut ordered = [(left, box_begin, middle), (right, middle, box_end)];
        let distance_left = self.nodes[left].distance_to_point(query);
        let distance_right = self.nodes[right].distance_to_point(query);
        if distance_right < distance_left {
            ordered.swap(0, 1);
        }
        for (child, begin, end) in ordered {
            if self.nodes[child].distance_to_point(query) <= best.2 {
                self.closest_recursive(query, eval_distance, best, child, begin, end);
            }
        }
    }

    /// Calls `action` once per element box overlapping `query`.
    pub fn compute_bbox_element_bbox_intersections(
        &self,
        query: &BoundingBox<D>,
        action: &mut impl FnMut(Index),
    ) {
        if self.is_empty() {
            return;
        }
        self.bbox_recursive(query, action, ROOT, 0, self.nb_bboxes());
    }

    fn bbox_recursive(
        &self,
        query: &BoundingBox<D>,
        action: &mut impl FnMut(Index),
        node: usize,
        box_begin: usize,
        box_end: usize,
    ) {
        if !self.nodes[node].intersects(query) {
            return;
        }
        if is_leaf(box_begin, box_end) {
            action(self.element(box_begin));
            return;
        }
        let (middle, left, right) = children(node, box_begin, box_end);
        self.bbox_recursive(query, action, left, box_begin, middle);
        self.bbox_recursive(query, action, right, middle, box_end);
    }

    /// Calls `action` once per unordered pair of distinct overlapping element
    /// boxes, smaller index first.
    pub fn compute_self_element_bbox_intersections(&self, action: &mut impl FnMut(Index, Index)) {
        if self.is_empty() {
            return;
        }
        self.self_recursive(
            action,
            (ROOT, 0, self.nb_bboxes()),
            (ROOT, 0, self.nb_bboxes()),
        );
    }

    fn self_recursive(
        &self,
        action: &mut impl FnMut(Index, Index),
        (node0, begin0, end0): (usize, usize, usize),
        (node1, begin1, end1): (usize, usize, usize),
    ) {
        if node0 != node1 && !self.nodes[node0].intersects(&self.nodes[node1]) {
            return;
        }
        if node0 == node1 {
            if is_leaf(begin0, end0) {
                return;
            }
            let (middle, left, right) = children(node0, begin0, end0);
            self.self_recursive(action, (left, begin0, middle), (left, begin0, middle));
            self.self_recursive(action, (left, begin0, middle), (right, middle, end0));
            self.self_recursive(action, (right, middle, end0), (right, middle, end0));
            return;
        }
        match (is_leaf(begin0, end0), is_leaf(begin1, end1)) {
            (true, true) => {
                let element0 = self.element(begin0);
                let element1 = self.element(begin1);
                action(element0.min(element1), element0.max(element1));
            }
            (true, false) => {
                let (middle, left, right) = children(node1, begin1, end1);
                self.self_recursive(action, (node0, begin0, end0), (left, begin1, middle));
                self.self_recursive(action, (node0, begin0, end0), (right, middle, end1));
            }
            (false, _) => {
                let (middle, left, right) = children(node0, begin0, end0);
                self.self_recursive(action, (left, begin0, middle), (node1, begin1, end1));
                self.self_recursive(action, (right, middle, end0), (node1, begin1, end1));
            }
        }
    }

    /// Calls `action` once per overlapping pair of element boxes across two
    /// trees, this tree's element first.
    pub fn compute_other_element_bbox_intersections(
        &self,
        other: &AabbTree<D>,
        action: &mut impl FnMut(Index, Index),
    ) {
        if self.is_empty() || other.is_empty() {
            return;
        }
        self.other_recursive(
            other,
            action,
            (ROOT, 0, self.nb_bboxes()),
            (ROOT, 0, other.nb_bboxes()),
        );
    }

    fn other_recursive(
        &self,
        other: &AabbTree<D>,
        action: &mut impl FnMut(Index, Index),
        (node0, begin0, end0): (usize, usize, usize),
        (node1, begin1, end1): (usize, usize, usize),
    ) {
        if !self.nodes[node0].intersects(&other.nodes[node1]) {
            return;
        }
        match (is_leaf(begin0, end0), is_leaf(begin1, end1)) {
            (true, true) => action(self.element(begin0), other.element(begin1)),
            (true, false) => {
                let (middle, left, right) = children(node1, begin1, end1);
                self.other_recursive(other, action, (node0, begin0, end0), (left, begin1, middle));
                self.other_recursive(other, action, (node0, begin0, end0), (right, middle, end1));
            }
            (false, _) => {
                let (middle, left, right) = children(node0, begin0, end0);
                self.other_recursive(other, action, (left, begin0, middle), (node1, begin1, end1));
                self.other_recursive(other, action, (right, middle, end0), (node1, begin1, end1));
            }
        }
    }

    /// Calls `action` once per element box hit by the ray.
    pub fn compute_ray_element_bbox_intersections(
        &self,
        ray: &Ray<D>,
        action: &mut impl FnMut(Index),
    ) {
        if self.is_empty() {
            return;
        }
        self.ray_recursive(ray, action, ROOT, 0, self.nb_bboxes());
    }

    fn ray_recursive(
        &self,
        ray: &Ray<D>,
        action: &mut impl FnMut(Index),
        node: usize,
        box_begin: usize,
        box_end: usize,
    ) {
        if !self.nodes[node].intersects_ray(ray) {
            return;
        }
        if is_leaf(box_begin, box_end) {
            action(self.element(box_begin));
            return;
        }
        let (middle, left, right) = children(node, box_begin, box_end);
        self.ray_recursive(ray, action, left, box_begin, middle);
        self.ray_recursive(ray, action, right, middle, box_end);
    }
}

fn initialize_tree<const D: usize>(
    nodes: &mut [BoundingBox<D>],
    mapping_morton: &[Index],
    bboxes: &[BoundingBox<D>],
    node: usize,
    box_begin: usize,
    box_end: usize,
) {
    if is_leaf(box_begin, box_end) {
        nodes[node] = bboxes[mapping_morton[box_begin] as usize].clone();
        return;
    }
    let (middle, left, right) = children(node, box_begin, box_end);
    initialize_tree(nodes, mapping_morton, bboxes, left, box_begin, middle);
    initialize_tree(nodes, mapping_morton, bboxes, right, middle, box_end);
    nodes[node] = nodes[left].union(&nodes[right]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::{Point2, Vector2};

    fn unit_boxes(count: usize) -> Vec<BoundingBox<2>> {
        (0..count)
            .map(|i| {
                let x = f64::from(i as u32);
                BoundingBox::from_points([Point2::new(x, 0.0), Point2::new(x + 0.8, 0.8)])
            })
            .collect()
    }

    #[test]
    fn closest_element_is_exact() {
        let boxes = unit_boxes(10);
        let tree = AabbTree::new(&boxes);
        assert_eq!(tree.nb_bboxes(), 10);
        let query = Point2::new(4.1, 0.4);
        let (element, _, distance) = tree.closest_element_box(&query, |point, element| {
            let distance = boxes[element as usize].distance_to_point(point);
            (distance, *point)
        });
        assert_eq!(element, 4);
        assert_eq!(distance, 0.0);
    }

    #[test]
    fn box_query_reports_overlaps() {
        let tree = AabbTree::new(&unit_boxes(10));
        let query = BoundingBox::from_points([Point2::new(2.5, 0.0), Point2::new(4.5, 1.0)]);
        let mut hits = Vec::new();
        tree.compute_bbox_element_bbox_intersections(&query, &mut |element| hits.push(element));
        hits.sort_unstable();
        assert_eq!(hits, vec![2, 3, 4]);
    }

    #[test]
    fn self_intersections_of_overlapping_strip() {
        // Two wide boxes overlapping everything, three disjoint cells.
        let mut boxes = unit_boxes(3);
        boxes.push(BoundingBox::from_points([
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 1.0),
        ]));
        let tree = AabbTree::new(&boxes);
        let mut pairs = Vec::new();
        tree.compute_self_element_bbox_intersections(&mut |i, j| pairs.push((i, j)));
        pairs.sort_unstable();
        assert_eq!(pairs, vec![(0, 3), (1, 3), (2, 3)]);
    }

    #[test]
    fn ray_walks_the_row() {
        let tree = AabbTree::new(&unit_boxes(5));
        let ray = Ray::new(Vector2::x(), Point2::new(1.9, 0.4)).unwrap();
        let mut hits = Vec::new();
        tree.compute_ray_element_bbox_intersections(&ray, &mut |element| hits.push(element));
        hits.sort_unstable();
        assert_eq!(hits, vec![2, 3, 4]);
    }
}
