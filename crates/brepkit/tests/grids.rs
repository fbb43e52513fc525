use approx::assert_abs_diff_eq;
use brepkit::mesh::grid::{Grid, RegularGrid};
use brepkit::mesh::helpers::euclidean_distance_transform::{
    approximated_euclidean_distance_transform, euclidean_distance_transform,
    euclidean_squared_distance_transform,
};
use brepkit::mesh::helpers::grid_function::RegularGridScalarFunction;
use brepkit::prelude::*;

#[test]
fn distance_transform_on_a_ten_by_ten_grid() {
    // Seeds in opposite corners, half-unit cells.
    let mut grid = RegularGrid::new(Point2::origin(), [10, 10], [0.5, 0.5]);
    let distances = euclidean_distance_transform(&mut grid, &[[0, 0], [9, 9]], "edt").unwrap();

    for k in 1..10_u32 {
        let cell = grid.cell_index([0, k]);
        assert_abs_diff_eq!(distances.value(cell), 0.5 * f64::from(k), epsilon = 1e-9);
    }
    for k in 0..10_u32 {
        let from_origin = 0.5 * f64::from(2 * k * k).sqrt();
        let gap = 9 - k;
        let from_far = 0.5 * f64::from(2 * gap * gap).sqrt();
        let cell = grid.cell_index([k, k]);
        assert_abs_diff_eq!(
            distances.value(cell),
            from_origin.min(from_far),
            epsilon = 1e-9
        );
    }
}

#[test]
fn squared_and_plain_transforms_agree() {
    let mut grid = RegularGrid::new(Point2::origin(), [8, 6], [0.25, 0.25]);
    let squared =
        euclidean_squared_distance_transform(&mut grid, &[[2, 3]], "squared").unwrap();
    let mut grid2 = RegularGrid::new(Point2::origin(), [8, 6], [0.25, 0.25]);
    let plain = euclidean_distance_transform(&mut grid2, &[[2, 3]], "plain").unwrap();
    for cell in 0..grid.nb_cells() as Index {
        assert_abs_diff_eq!(
            squared.value(cell).sqrt(),
            plain.value(cell),
            epsilon = 1e-9
        );
    }
}

#[test]
fn approximated_transform_is_the_axis_aligned_sum() {
    let mut grid = RegularGrid::new(Point2::origin(), [6, 6], [1.0, 1.0]);
    let distances =
        approximated_euclidean_distance_transform(&mut grid, &[[0, 0]], "approx").unwrap();
    for i in 0..6_u32 {
        for j in 0..6_u32 {
            let cell = grid.cell_index([i, j]);
            assert_abs_diff_eq!(distances.value(cell), f64::from(i + j));
        }
    }
}

#[test]
fn scalar_functions_interpolate_linearly() {
    let mut grid = RegularGrid::new(Point2::origin(), [4, 4], [0.25, 0.25]);
    let function = RegularGridScalarFunction::create(&mut grid, "ramp", 0.0).unwrap();
    for i in 0..5_u32 {
        for j in 0..5_u32 {
            // A plane: f(x, y) = x + 2 y over the unit square.
            function.set_value([i, j], 0.25 * f64::from(i) + 0.5 * f64::from(j));
        }
    }
    // Multilinear interpolation reproduces the plane everywhere.
    for &(x, y) in &[(0.1, 0.1), (0.33, 0.7), (0.99, 0.01), (0.5, 0.5)] {
        let value = function.evaluate(&Point2::new(x, y)).unwrap();
        assert_abs_diff_eq!(value, x + 2.0 * y, epsilon = 1e-12);
    }
    assert!(function.evaluate(&Point2::new(2.0, 0.0)).is_none());
}

#[test]
fn grid_cells_know_their_neighbours() {
    let grid = LightRegularGrid::new(Point3::origin(), [3, 4, 5], [1.0, 1.0, 1.0]);
    assert_eq!(grid.nb_cells(), 60);
    assert_eq!(grid.nb_grid_vertices(), 4 * 5 * 6);
    let cell = grid.cell_index([1, 2, 3]);
    assert_eq!(grid.cell_indices(cell), [1, 2, 3]);
    assert_eq!(grid.cell_adjacent([1, 2, 3], 2, true), Some([1, 2, 4]));
    assert_eq!(grid.cell_adjacent([1, 2, 4], 2, true), None);
}
