use nalgebra as na;

use crate::basic::attribute::AttributeHandle;
use crate::basic::{AttributeProperties, Index};
use crate::geometry::point::Point;
use crate::mesh::MeshError;
use crate::mesh::grid::{CellIndices, Grid, RegularGrid};
use crate::mesh::specializations::{TetrahedralSolid3, TriangulatedSurface};

fn interpolable() -> AttributeProperties {
    AttributeProperties {
        assignable: true,
        interpolable: true,
    }
}

/// Multilinear corner weights of a cell at local coordinates in `[0, 1]^D`,
/// in the binary corner order.
fn shape_function_weights<const D: usize>(locals: &[f64; D]) -> Vec<f64> {
    (0..1usize << D)
        .map(|corner| {
            (0..D)
                .map(|direction| {
                    if corner >> direction & 1 == 1 {
                        locals[direction]
                    } else {
                        1.0 - locals[direction]
                    }
                })
                .product()
        })
        .collect()
}

/// One scalar per grid vertex, evaluated anywhere on the grid by bilinear or
/// trilinear interpolation.
pub struct RegularGridScalarFunction<'a, const D: usize> {
    grid: &'a RegularGrid<D>,
    values: AttributeHandle<f64>,
}

impl<'a, const D: usize> RegularGridScalarFunction<'a, D> {
    pub fn create(
        grid: &'a mut RegularGrid<D>,
        name: &str,
        initial_value: f64,
    ) -> Result<Self, MeshError> {
        let values = grid
            .grid_vertex_attribute_manager_mut()
            .find_or_create_variable_attribute(name, initial_value, interpolable())?;
        Ok(Self { grid: &*grid, values })
    }

    pub fn find(grid: &'a RegularGrid<D>, name: &str) -> Result<Self, MeshError> {
        let values = grid.grid_vertex_attribute_manager().find_attribute(name)?;
        Ok(Self { grid, values })
    }

    pub fn set_value(&self, vertex: CellIndices<D>, value: f64) {
        self.values
            .set_value(self.grid.vertex_index(vertex), value);
    }

    pub fn value(&self, vertex: CellIndices<D>) -> f64 {
        self.values.value(self.grid.vertex_index(vertex))
    }

    /// Interpolated value at `point`; `None` outside the grid.
    pub fn evaluate(&self, point: &Point<D>) -> Option<f64> {
        let (cell, locals) = self.grid.cell_containing(point)?;
        let weights = shape_function_weights(&locals);
        let mut value = 0.0;
        for (corner, vertex) in self.grid.cell_vertex_indices(cell).into_iter().enumerate() {
            value += weights[corner] * self.values.value(self.grid.vertex_index(vertex));
        }
        Some(value)
    }
}

/// One `P`-dimensional point per grid vertex, evaluated anywhere on the grid
/// by multilinear interpolation.
pub struct RegularGridPointFunction<'a, const D: usize, const P: usize> {
    grid: &'a RegularGrid<D>,
    values: AttributeHandle<Point<P>>,
}

impl<'a, const D: usize, const P: usize> RegularGridPointFunction<'a, D, P> {
    pub fn create(
        grid: &'a mut RegularGrid<D>,
        name: &str,
        initial_value: Point<P>,
    ) -> Result<Self, MeshError> {
        let values = grid
            .grid_vertex_attribute_manager_mut()
            .find_or_create_variable_attribute(name, initial_value, interpolable())?;
        Ok(Self { grid: &*grid, values })
    }

    pub fn find(grid: &'a RegularGrid<D>, name: &str) -> Result<Self, MeshError> {
        let values = grid.grid_vertex_attribute_manager().find_attribute(name)?;
        Ok(Self { grid, values })
    }

    pub fn set_value(&self, vertex: CellIndices<D>, value: Point<P>) {
        self.values
            .set_value(self.grid.vertex_index(vertex), value);
    }

    pub fn value(&self, vertex: CellIndices<D>) -> Point<P> {
        self.values.value(self.grid.vertex_index(vertex))
    }

    /// Interpolated point at `point`; `None` outside the grid.
    pub fn evaluate(&self, point: &Point<D>) -> Option<Point<P>> {
        let (cell, locals) = self.grid.cell_containing(point)?;
        let weights = shape_function_weights(&locals);
        let mut value = na::SVector::<f64, P>::zeros();
        for (corner, vertex) in self.grid.cell_vertex_indices(cell).into_iter().enumerate() {
            value += self.values.value(self.grid.vertex_index(vertex)).coords * weights[corner];
        }
        Some(Point::from(value))
    }
}

/// Barycentric weights of `point` in the triangle spanned by three points,
/// by normal-equation projection; usable in any ambient dimension.
fn triangle_barycentric<const D: usize>(
    point: &Point<D>,
    a: &Point<D>,
    b: &Point<D>,
    c: &Point<D>,
) -> Option<[f64; 3]> {
    let edge0 = b - a;
    let edge1 = c - a;
    let to_point = point - a;
    let d00 = edge0.dot(&edge0);
    let d01 = edge0.dot(&edge1);
    let d11 = edge1.dot(&edge1);
    let d20 = to_point.dot(&edge0);
    let d21 = to_point.dot(&edge1);
    let denominator = d00 * d11 - d01 * d01;
    if denominator == 0.0 {
        return None;
    }
    let v = (d11 * d20 - d01 * d21) / denominator;
    let w = (d00 * d21 - d01 * d20) / denominator;
    Some([1.0 - v - w, v, w])
}

/// One `P`-dimensional point per mesh vertex of a triangulated surface,
/// evaluated inside a named triangle by barycentric interpolation.
pub struct TriangulatedSurfacePointFunction<'a, const D: usize, const P: usize> {
    surface: &'a TriangulatedSurface<D>,
    values: AttributeHandle<Point<P>>,
}

impl<'a, const D: usize, const P: usize> TriangulatedSurfacePointFunction<'a, D, P> {
    pub fn create(
        surface: &'a mut TriangulatedSurface<D>,
        name: &str,
        initial_value: Point<P>,
    ) -> Result<Self, MeshError> {
        let values = surface
            .vertex_attribute_manager_mut()
            .find_or_create_variable_attribute(name, initial_value, interpolable())?;
        Ok(Self {
            surface: &*surface,
            values,
        })
    }

    pub fn find(surface: &'a TriangulatedSurface<D>, name: &str) -> Result<Self, MeshError> {
        let values = surface.vertex_attribute_manager().find_attribute(name)?;
        Ok(Self { surface, values })
    }

    pub fn set_value(&self, vertex: Index, value: Point<P>) {
        self.values.set_value(vertex, value);
    }

    pub fn value(&self, vertex: Index) -> Point<P> {
        self.values.value(vertex)
    }

    /// Interpolated point at `point` located in `triangle`.
    pub fn evaluate(&self, point: &Point<D>, triangle: Index) -> Option<Point<P>> {
        let [a, b, c] = self.surface.triangle_vertices(triangle);
        let weights = triangle_barycentric(
            point,
            self.surface.point(a),
            self.surface.point(b),
            self.surface.point(c),
        )?;
        let mut value = na::SVector::<f64, P>::zeros();
        for (vertex, weight) in [a, b, c].into_iter().zip(weights) {
            value += self.values.value(vertex).coords * weight;
        }
        Some(Point::from(value))
    }
}

/// One `P`-dimensional point per mesh vertex of a tetrahedral solid,
/// evaluated inside a named tetrahedron by barycentric interpolation.
pub struct TetrahedralSolidPointFunction<'a, const P: usize> {
    solid: &'a TetrahedralSolid3,
    values: AttributeHandle<Point<P>>,
}

impl<'a, const P: usize> TetrahedralSolidPointFunction<'a, P> {
    pub fn create(
        solid: &'a mut TetrahedralSolid3,
        name: &str,
        initial_value: Point<P>,
    ) -> Result<Self, MeshError> {
        let values = solid
            .vertex_attribute_manager_mut()
            .find_or_create_variable_attribute(name, initial_value, interpolable())?;
        Ok(Self {
            solid: &*solid,
            values,
        })
    }

    pub fn find(solid: &'a TetrahedralSolid3, name: &str) -> Result<Self, MeshError> {
        let values = solid.vertex_attribute_manager().find_attribute(name)?;
        Ok(Self { solid, values })
    }

    pub fn set_value(&self, vertex: Index, value: Point<P>) {
        self.values.set_value(vertex, value);
    }

    pub fn value(&self, vertex: Index) -> Point<P> {
        self.values.value(vertex)
    }

    /// Interpolated point at `point` located in `tetrahedron`, by
    /// volume-ratio barycentric weights.
    pub fn evaluate(&self, point: &crate::geometry::Point3, tetrahedron: Index) -> Option<Point<P>> {
        use crate::geometry::basic_objects::Tetrahedron;
        use crate::geometry::mensuration::tetrahedron_signed_volume;
        let vertices = self.solid.tetrahedron_vertices(tetrahedron);
        let tetra = self.solid.tetrahedron(tetrahedron);
        let total = tetrahedron_signed_volume(&tetra);
        if total == 0.0 {
            return None;
        }
        let mut value = na::SVector::<f64, P>::zeros();
        for (slot, vertex) in vertices.into_iter().enumerate() {
            let mut corners = tetra.vertices;
            corners[slot] = *point;
            let weight = tetrahedron_signed_volume(&Tetrahedron {
                vertices: corners,
            }) / total;
            value += self.values.value(vertex).coords * weight;
        }
        Some(Point::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::{Point2, Point3};
    use approx::assert_abs_diff_eq;

    #[test]
    fn bilinear_interpolation_on_a_grid() {
        let mut grid = RegularGrid::new(Point2::origin(), [2, 2], [1.0, 1.0]);
        let function = RegularGridScalarFunction::create(&mut grid, "height", 0.0).unwrap();
        // Height equals x over the whole grid.
        for i in 0..3u32 {
            for j in 0..3u32 {
                function.set_value([i, j], f64::from(i));
            }
        }
        assert_abs_diff_eq!(function.evaluate(&Point2::new(0.5, 0.5)).unwrap(), 0.5);
        assert_abs_diff_eq!(function.evaluate(&Point2::new(1.75, 1.0)).unwrap(), 1.75);
        assert!(function.evaluate(&Point2::new(5.0, 0.0)).is_none());
    }

    #[test]
    fn point_function_interpolates_each_item() {
        let mut grid = RegularGrid::new(Point2::origin(), [1, 1], [2.0, 2.0]);
        let function =
            RegularGridPointFunction::<2, 2>::create(&mut grid, "warp", Point2::origin())
                .unwrap();
        function.set_value([0, 0], Point2::new(0.0, 0.0));
        function.set_value([1, 0], Point2::new(2.0, 0.0));
        function.set_value([0, 1], Point2::new(0.0, 4.0));
        function.set_value([1, 1], Point2::new(2.0, 4.0));
        let warped = function.evaluate(&Point2::new(1.0, 1.0)).unwrap();
        assert_abs_diff_eq!(warped.x, 1.0);
        assert_abs_diff_eq!(warped.y, 2.0);
    }

    #[test]
    fn tetrahedron_barycentric_recovers_vertices() {
        use crate::mesh::specializations::TetrahedralSolidBuilder;
        let mut solid = TetrahedralSolid3::new();
        let mut builder = TetrahedralSolidBuilder::new(&mut solid);
        let inner = builder.as_solid_builder();
        inner.create_point(Point3::new(0.0, 0.0, 0.0));
        inner.create_point(Point3::new(1.0, 0.0, 0.0));
        inner.create_point(Point3::new(0.0, 1.0, 0.0));
        inner.create_point(Point3::new(0.0, 0.0, 1.0));
        builder.create_tetrahedron([0, 1, 2, 3]).unwrap();

        let function =
            TetrahedralSolidPointFunction::<1>::create(&mut solid, "weight", Point::origin())
                .unwrap();
        for vertex in 0..4 {
            function.set_value(vertex, Point::from([f64::from(vertex)]));
        }
        let at_barycenter = function
            .evaluate(&Point3::new(0.25, 0.25, 0.25), 0)
            .unwrap();
        assert_abs_diff_eq!(at_barycenter[0], 1.5);
    }
}
