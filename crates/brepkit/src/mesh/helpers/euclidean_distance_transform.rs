use ndarray::{ArrayD, ArrayViewMut1, Axis, IxDyn};

use crate::basic::AttributeProperties;
use crate::basic::attribute::AttributeHandle;
use crate::mesh::MeshError;
use crate::mesh::grid::{CellIndices, Grid, RegularGrid};

/// One forward-then-backward relaxation pass over a single row of cells.
///
/// `increment(steps)` is the cost of the next step given the number of steps
/// walked since the last seed; seeds (zero cells) reset the counter.
fn sweep_row(mut row: ArrayViewMut1<'_, f64>, increment: &impl Fn(u32) -> f64) {
    let mut steps = 0;
    for cell in 1..row.len() {
        if row[cell] == 0.0 {
            steps = 0;
            continue;
        }
        let candidate = row[cell - 1] + increment(steps);
        steps += 2;
        if candidate < row[cell] {
            row[cell] = candidate;
        }
    }
    steps = 0;
    for cell in (0..row.len() - 1).rev() {
        if row[cell] == 0.0 {
            steps = 0;
            continue;
        }
        let candidate = row[cell + 1] + increment(steps);
        steps += 2;
        if candidate < row[cell] {
            row[cell] = candidate;
        }
    }
}

fn axis_sweep<const D: usize>(
    distances: &mut ArrayD<f64>,
    grid: &RegularGrid<D>,
    direction: usize,
    squared: bool,
) {
    let length = grid.cell_length_in_direction(direction);
    let increment = move |steps: u32| {
        if squared {
            length * length * f64::from(steps + 1)
        } else {
            length
        }
    };
    // Rows along one axis are independent of each other.
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        distances
            .lanes_mut(Axis(direction))
            .into_iter()
            .par_bridge()
            .for_each(|lane| sweep_row(lane, &increment));
    }
    #[cfg(not(feature = "rayon"))]
    for lane in distances.lanes_mut(Axis(direction)) {
        sweep_row(lane, &increment);
    }
}

fn run_transform<const D: usize>(
    grid: &mut RegularGrid<D>,
    seeds: &[CellIndices<D>],
    attribute_name: &str,
    squared: bool,
) -> Result<AttributeHandle<f64>, MeshError> {
    let attribute = grid
        .cell_attribute_manager_mut()
        .find_or_create_variable_attribute(
            attribute_name,
            f64::MAX,
            AttributeProperties {
                assignable: true,
                interpolable: false,
            },
        )?;
    let mut shape = [0usize; D];
    for (direction, extent) in shape.iter_mut().enumerate() {
        *extent = grid.nb_cells_in_direction(direction);
    }
    // ndarray shapes list the slowest axis first; grid indices pack the first
    // axis fastest.
    let reversed: Vec<usize> = shape.iter().rev().copied().collect();
    let mut distances = ArrayD::from_elem(IxDyn(&reversed), f64::MAX);
    for seed in seeds {
        let mut location = [0usize; D];
        for (direction, &index) in seed.iter().enumerate() {
            location[D - 1 - direction] = index as usize;
        }
        distances[IxDyn(&location)] = 0.0;
    }
    for direction in 0..D {
        // Grid direction d is ndarray axis D-1-d.
        axis_sweep(&mut distances, grid, D - 1 - direction, squared);
    }
    log::debug!(
        "distance transform over {} cells from {} seeds",
        grid.nb_cells(),
        seeds.len()
    );
    for (cell, &distance) in distances.as_slice().expect("standard layout").iter().enumerate() {
        attribute.set_value(cell as crate::basic::Index, distance);
    }
    Ok(attribute)
}

/// Axis-aligned distance field: each sweep adds whole cell lengths, giving a
/// Manhattan-like upper bound of the Euclidean distance.
pub fn approximated_euclidean_distance_transform<const D: usize>(
    grid: &mut RegularGrid<D>,
    seeds: &[CellIndices<D>],
    attribute_name: &str,
) -> Result<AttributeHandle<f64>, MeshError> {
    run_transform(grid, seeds, attribute_name, false)
}

/// Squared Euclidean distance to the nearest seed, propagated per axis with
/// the two-pass quadratic-increment sweep of Meijster's one-dimensional
/// transform.
pub fn euclidean_squared_distance_transform<const D: usize>(
    grid: &mut RegularGrid<D>,
    seeds: &[CellIndices<D>],
    attribute_name: &str,
) -> Result<AttributeHandle<f64>, MeshError> {
    run_transform(grid, seeds, attribute_name, true)
}

/// Euclidean distance to the nearest seed: the squared transform followed by
/// a square root.
pub fn euclidean_distance_transform<const D: usize>(
    grid: &mut RegularGrid<D>,
    seeds: &[CellIndices<D>],
    attribute_name: &str,
) -> Result<AttributeHandle<f64>, MeshError> {
    let attribute = run_transform(grid, seeds, attribute_name, true)?;
    for cell in 0..grid.nb_cells() {
        let cell = cell as crate::basic::Index;
        attribute.modify_value(cell, |value| *value = value.sqrt());
    }
    Ok(attribute)
}
