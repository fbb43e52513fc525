use nalgebra as na;
use nalgebra::dimension::{Const, DimMin};

use super::GeometryError;

pub type SquareMatrix<const D: usize> = na::SMatrix<f64, D, D>;

pub fn determinant<const D: usize>(matrix: &SquareMatrix<D>) -> f64
where
    Const<D>: DimMin<Const<D>, Output = Const<D>>,
{
    matrix.determinant()
}

/// Inverse by cofactors; fails when the determinant is exactly zero.
pub fn inverse<const D: usize>(
    matrix: &SquareMatrix<D>,
) -> Result<SquareMatrix<D>, GeometryError>
where
    Const<D>: DimMin<Const<D>, Output = Const<D>>,
{
    if matrix.determinant() == 0.0 {
        return Err(GeometryError::SingularMatrix);
    }
    matrix
        .try_inverse()
        .ok_or(GeometryError::SingularMatrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn inverse_round_trip() {
        let matrix = SquareMatrix::<3>::new(2.0, 0.0, 0.0, 0.0, 4.0, 0.0, 1.0, 0.0, 1.0);
        let inverted = inverse(&matrix).unwrap();
        let identity = matrix * inverted;
        for row in 0..3 {
            for column in 0..3 {
                let expected = if row == column { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(identity[(row, column)], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn singular_matrix_is_rejected() {
        let matrix = SquareMatrix::<2>::new(1.0, 2.0, 2.0, 4.0);
        assert_eq!(determinant(&matrix), 0.0);
        assert!(matches!(
            inverse(&matrix),
            Err(GeometryError::SingularMatrix)
        ));
    }
}
