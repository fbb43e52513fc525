use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;

use super::crs::CoordinateReferenceSystemManager;
use crate::basic::{AttributeManager, Index};
use crate::geometry::BoundingBox;
use crate::geometry::point::{Point, Vector};

/// Per-axis grid coordinates of a cell or vertex.
pub type CellIndices<const D: usize> = [Index; D];

/// Geometry of a structured grid: origin, per-axis cell counts and lengths,
/// and an orthonormal frame of axis directions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct GridDefinition<const D: usize> {
    origin: Point<D>,
    #[serde(with = "BigArray")]
    cells_number: [usize; D],
    #[serde(with = "BigArray")]
    cells_length: [f64; D],
    #[serde(with = "BigArray")]
    directions: [Vector<D>; D],
}

impl<const D: usize> GridDefinition<D> {
    fn new(origin: Point<D>, cells_number: [usize; D], cells_length: [f64; D]) -> Self {
        let mut directions = [Vector::<D>::zeros(); D];
        for (axis, direction) in directions.iter_mut().enumerate() {
            direction[axis] = 1.0;
        }
        Self {
            origin,
            cells_number,
            cells_length,
            directions,
        }
    }
}

/// Uniform interface of structured grids.
///
/// Cells and vertices are numbered row-major with the first axis varying
/// fastest; adjacency comes from index arithmetic, never from stored
/// connectivity.
pub trait Grid<const D: usize> {
    fn origin(&self) -> &Point<D>;
    fn nb_cells_in_direction(&self, direction: usize) -> usize;
    fn cell_length_in_direction(&self, direction: usize) -> f64;
    fn direction_vector(&self, direction: usize) -> Vector<D>;

    fn nb_cells(&self) -> usize {
        (0..D).map(|direction| self.nb_cells_in_direction(direction)).product()
    }

    fn nb_vertices_in_direction(&self, direction: usize) -> usize {
        self.nb_cells_in_direction(direction) + 1
    }

    fn nb_grid_vertices(&self) -> usize {
        (0..D)
            .map(|direction| self.nb_vertices_in_direction(direction))
            .product()
    }

    fn cell_indices(&self, cell: Index) -> CellIndices<D> {
        let mut remainder = cell as usize;
        let mut indices = [0 as Index; D];
        for direction in 0..D {
            let extent = self.nb_cells_in_direction(direction);
            indices[direction] = (remainder % extent) as Index;
            remainder /= extent;
        }
        indices
    }

    fn cell_index(&self, indices: CellIndices<D>) -> Index {
        let mut packed = 0usize;
        for direction in (0..D).rev() {
            packed = packed * self.nb_cells_in_direction(direction) + indices[direction] as usize;
        }
        packed as Index
    }

    fn vertex_indices(&self, vertex: Index) -> CellIndices<D> {
        let mut remainder = vertex as usize;
        let mut indices = [0 as Index; D];
        for direction in 0..D {
            let extent = self.nb_vertices_in_direction(direction);
            indices[direction] = (remainder % extent) as Index;
            remainder /= extent;
        }
        indices
    }

    fn vertex_index(&self, indices: CellIndices<D>) -> Index {
        let mut packed = 0usize;
        for direction in (0..D).rev() {
            packed =
                packed * self.nb_vertices_in_direction(direction) + indices[direction] as usize;
        }
        packed as Index
    }

    /// Coordinates of the grid vertex at the given per-axis indices.
    fn grid_point(&self, indices: CellIndices<D>) -> Point<D> {
        let mut point = *self.origin();
        for direction in 0..D {
            point += self.direction_vector(direction)
                * (f64::from(indices[direction]) * self.cell_length_in_direction(direction));
        }
        point
    }

    fn cell_barycenter(&self, cell: Index) -> Point<D> {
        let indices = self.cell_indices(cell);
        let mut point = *self.origin();
        for direction in 0..D {
            point += self.direction_vector(direction)
                * ((f64::from(indices[direction]) + 0.5)
                    * self.cell_length_in_direction(direction));
        }
        point
    }

    /// Neighbouring cell along an axis, when inside the grid.
    fn cell_adjacent(
        &self,
        indices: CellIndices<D>,
        direction: usize,
        forward: bool,
    ) -> Option<CellIndices<D>> {
        let mut adjacent = indices;
        if forward {
            if indices[direction] as usize + 1 >= self.nb_cells_in_direction(direction) {
                return None;
            }
            adjacent[direction] += 1;
        } else {
            if indices[direction] == 0 {
                return None;
            }
            adjacent[direction] -= 1;
        }
        Some(adjacent)
    }

    /// The `2^D` vertex indices of a cell, in binary order with the first
    /// axis as lowest bit.
    fn cell_vertex_indices(&self, indices: CellIndices<D>) -> Vec<CellIndices<D>> {
        (0..1usize << D)
            .map(|corner| {
                let mut vertex = indices;
                for (direction, index) in vertex.iter_mut().enumerate() {
                    if corner >> direction & 1 == 1 {
                        *index += 1;
                    }
                }
                vertex
            })
            .collect()
    }

    /// Per-axis scalar coordinates of `point` in grid parameter space.
    fn grid_coordinates(&self, point: &Point<D>) -> [f64; D] {
        let offset = point - self.origin();
        let mut coordinates = [0.0; D];
        for direction in 0..D {
            coordinates[direction] = offset.dot(&self.direction_vector(direction))
                / self.cell_length_in_direction(direction);
        }
        coordinates
    }

    fn contains(&self, point: &Point<D>) -> bool {
        self.grid_coordinates(point).iter().enumerate().all(
            |(direction, &coordinate)| {
                coordinate >= 0.0 && coordinate <= self.nb_cells_in_direction(direction) as f64
            },
        )
    }

    /// Cell containing `point` and the point's local coordinates in `[0, 1]^D`
    /// within that cell; `None` outside the grid.
    fn cell_containing(&self, point: &Point<D>) -> Option<(CellIndices<D>, [f64; D])> {
        if !self.contains(point) {
            return None;
        }
        let coordinates = self.grid_coordinates(point);
        let mut indices = [0 as Index; D];
        let mut locals = [0.0; D];
        for direction in 0..D {
            let last_cell = self.nb_cells_in_direction(direction) - 1;
            let cell = (coordinates[direction].floor() as usize).min(last_cell);
            indices[direction] = cell as Index;
            locals[direction] = coordinates[direction] - cell as f64;
        }
        Some((indices, locals))
    }

    fn grid_bounding_box(&self) -> BoundingBox<D> {
        let mut bbox = BoundingBox::new();
        bbox.add_point(self.origin());
        let mut far = [0 as Index; D];
        for (direction, index) in far.iter_mut().enumerate() {
            *index = self.nb_cells_in_direction(direction) as Index;
        }
        bbox.add_point(&self.grid_point(far));
        bbox
    }
}

/// Structured grid with cell and vertex attribute managers and a coordinate
/// reference system.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegularGrid<const D: usize> {
    definition: GridDefinition<D>,
    cell_attributes: AttributeManager,
    vertex_attributes: AttributeManager,
    crs: CoordinateReferenceSystemManager,
}

impl<const D: usize> RegularGrid<D> {
    pub fn new(origin: Point<D>, cells_number: [usize; D], cells_length: [f64; D]) -> Self {
        let definition = GridDefinition::new(origin, cells_number, cells_length);
        let mut grid = Self {
            definition,
            cell_attributes: AttributeManager::new(),
            vertex_attributes: AttributeManager::new(),
            crs: CoordinateReferenceSystemManager::new(),
        };
        grid.cell_attributes.resize(grid.nb_cells());
        grid.vertex_attributes.resize(grid.nb_grid_vertices());
        grid
    }

    pub fn cell_attribute_manager(&self) -> &AttributeManager {
        &self.cell_attributes
    }

    pub fn cell_attribute_manager_mut(&mut self) -> &mut AttributeManager {
        &mut self.cell_attributes
    }

    pub fn grid_vertex_attribute_manager(&self) -> &AttributeManager {
        &self.vertex_attributes
    }

    pub fn grid_vertex_attribute_manager_mut(&mut self) -> &mut AttributeManager {
        &mut self.vertex_attributes
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

impl<const D: usize> Grid<D> for RegularGrid<D> {
    fn origin(&self) -> &Point<D> {
        &self.definition.origin
    }

    fn nb_cells_in_direction(&self, direction: usize) -> usize {
        self.definition.cells_number[direction]
    }

    fn cell_length_in_direction(&self, direction: usize) -> f64 {
        self.definition.cells_length[direction]
    }

    fn direction_vector(&self, direction: usize) -> Vector<D> {
        self.definition.directions[direction]
    }
}

/// Standalone structured grid: attribute managers and index arithmetic, no
/// adjacency cache and no coordinate frames.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LightRegularGrid<const D: usize> {
    definition: GridDefinition<D>,
    cell_attributes: AttributeManager,
    vertex_attributes: AttributeManager,
}

impl<const D: usize> LightRegularGrid<D> {
    pub fn new(origin: Point<D>, cells_number: [usize; D], cells_length: [f64; D]) -> Self {
        let definition = GridDefinition::new(origin, cells_number, cells_length);
        let mut grid = Self {
            definition,
            cell_attributes: AttributeManager::new(),
            vertex_attributes: AttributeManager::new(),
        };
        grid.cell_attributes.resize(grid.nb_cells());
        grid.vertex_attributes.resize(grid.nb_grid_vertices());
        grid
    }

    pub fn cell_attribute_manager(&self) -> &AttributeManager {
        &self.cell_attributes
    }

    pub fn cell_attribute_manager_mut(&mut self) -> &mut AttributeManager {
        &mut self.cell_attributes
    }

    pub fn grid_vertex_attribute_manager(&self) -> &AttributeManager {
        &self.vertex_attributes
    }

    pub fn grid_vertex_attribute_manager_mut(&mut self) -> &mut AttributeManager {
        &mut self.vertex_attributes
    }
}

impl<const D: usize> Grid<D> for LightRegularGrid<D> {
    fn origin(&self) -> &Point<D> {
        &self.definition.origin
    }

    fn nb_cells_in_direction(&self, direction: usize) -> usize {
        self.definition.cells_number[direction]
    }

    fn cell_length_in_direction(&self, direction: usize) -> f64 {
        self.definition.cells_length[direction]
    }

    fn direction_vector(&self, direction: usize) -> Vector<D> {
        self.definition.directions[direction]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::{Point2, Point3};

    #[test]
    fn indices_pack_first_axis_fastest() {
        let grid = RegularGrid::new(Point2::origin(), [3, 2], [1.0, 1.0]);
        assert_eq!(grid.nb_cells(), 6);
        assert_eq!(grid.nb_grid_vertices(), 12);
        assert_eq!(grid.cell_indices(0), [0, 0]);
        assert_eq!(grid.cell_indices(1), [1, 0]);
        assert_eq!(grid.cell_indices(3), [0, 1]);
        assert_eq!(grid.cell_index([2, 1]), 5);
        assert_eq!(grid.vertex_index([3, 2]), 11);
    }

    #[test]
    fn points_and_barycenters() {
        let grid = RegularGrid::new(Point3::new(1.0, 0.0, 0.0), [2, 2, 2], [0.5, 1.0, 2.0]);
        assert_eq!(grid.grid_point([2, 0, 1]), Point3::new(2.0, 0.0, 2.0));
        assert_eq!(
            grid.cell_barycenter(grid.cell_index([0, 0, 0])),
            Point3::new(1.25, 0.5, 1.0)
        );
    }

    #[test]
    fn adjacency_is_arithmetic() {
        let grid = LightRegularGrid::new(Point2::origin(), [3, 3], [1.0, 1.0]);
        assert_eq!(grid.cell_adjacent([0, 0], 0, true), Some([1, 0]));
        assert_eq!(grid.cell_adjacent([0, 0], 0, false), None);
        assert_eq!(grid.cell_adjacent([2, 1], 0, true), None);
        assert_eq!(grid.cell_adjacent([1, 1], 1, true), Some([1, 2]));
    }

    #[test]
    fn cell_lookup_from_points() {
        let grid = RegularGrid::new(Point2::origin(), [10, 10], [0.5, 0.5]);
        let (cell, locals) = grid.cell_containing(&Point2::new(1.3, 0.2)).unwrap();
        assert_eq!(cell, [2, 0]);
        assert!((locals[0] - 0.6).abs() < 1e-12);
        assert!(grid.cell_containing(&Point2::new(-1.0, 0.0)).is_none());
        // Points on the far border land in the last cell.
        let (cell, locals) = grid.cell_containing(&Point2::new(5.0, 5.0)).unwrap();
        assert_eq!(cell, [9, 9]);
        assert_eq!(locals, [1.0, 1.0]);
    }
}
