use brepkit::basic::Index;
use brepkit::geometry::{AabbTree, BoundingBox, NnSearch, Point3};
use nalgebra as na;
use proptest::prelude::*;

fn point_strategy() -> impl Strategy<Value = Point3> {
    (0.0_f64..1.0, 0.0_f64..1.0, 0.0_f64..1.0).prop_map(|(x, y, z)| Point3::new(x, y, z))
}

proptest! {
    /// Every point lies within epsilon of the unique point it maps to, and
    /// the mapping covers the whole input.
    #[test]
    fn colocation_covers_all_points(
        points in proptest::collection::vec(point_strategy(), 1..25),
        epsilon in prop_oneof![Just(0.0), 1e-9_f64..0.3],
    ) {
        let search = NnSearch::new(points.clone());
        let info = search.colocated_index_mapping(epsilon);
        prop_assert_eq!(info.colocated_mapping.len(), points.len());
        for (index, &unique) in info.colocated_mapping.iter().enumerate() {
            prop_assert!((unique as usize) < info.unique_points.len());
            let distance = na::distance(&points[index], &info.unique_points[unique as usize]);
            prop_assert!(distance <= epsilon + f64::EPSILON);
        }
        // Representatives are input points, kept in input order.
        let mut seen = 0;
        for &unique in &info.colocated_mapping {
            seen = seen.max(unique as usize + 1);
        }
        prop_assert_eq!(seen, info.unique_points.len());
    }

    /// The tree's closest element always matches the brute-force minimum of
    /// the same element distance.
    #[test]
    fn closest_element_box_is_optimal(
        centers in proptest::collection::vec(point_strategy(), 1..30),
        query in point_strategy(),
    ) {
        let boxes: Vec<BoundingBox<3>> = centers
            .iter()
            .map(|center| {
                let mut bbox = BoundingBox::new();
                bbox.add_point(center);
                bbox.extends(0.05);
                bbox
            })
            .collect();
        let tree = AabbTree::new(&boxes);
        let (element, _, distance) = tree.closest_element_box(&query, |point, element| {
            let distance = boxes[element as usize].distance_to_point(point);
            (distance, *point)
        });
        let brute = (0..boxes.len() as Index)
            .map(|element| boxes[element as usize].distance_to_point(&query))
            .fold(f64::INFINITY, f64::min);
        prop_assert!((distance - brute).abs() <= 1e-12);
        prop_assert!(boxes[element as usize].distance_to_point(&query) <= brute + 1e-12);
    }

    /// Box overlap queries report exactly the brute-force overlap set.
    #[test]
    fn bbox_intersections_match_brute_force(
        centers in proptest::collection::vec(point_strategy(), 1..30),
        query_center in point_strategy(),
    ) {
        let boxes: Vec<BoundingBox<3>> = centers
            .iter()
            .map(|center| {
                let mut bbox = BoundingBox::new();
                bbox.add_point(center);
                bbox.extends(0.08);
                bbox
            })
            .collect();
        let mut query = BoundingBox::new();
        query.add_point(&query_center);
        query.extends(0.2);

        let tree = AabbTree::new(&boxes);
        let mut reported = Vec::new();
        tree.compute_bbox_element_bbox_intersections(&query, &mut |element| {
            reported.push(element);
        });
        reported.sort_unstable();
        let expected: Vec<Index> = (0..boxes.len() as Index)
            .filter(|&element| boxes[element as usize].intersects(&query))
            .collect();
        prop_assert_eq!(reported, expected);
    }
}
