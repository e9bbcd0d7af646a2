use faer::{Mat, MatRef};

use crate::domain::Domain;

///
/// Basis matrix for a set of query points together with its partial derivatives.
/// `derivatives[k]` holds d(basis)/d(x_k) in cube coordinates and has the same shape as `basis`.
///
pub struct BasisWithDerivatives
{
    pub basis: Mat<f64>,
    pub derivatives: Vec<Mat<f64>>,
}

///
/// A Smolyak grid as seen by the interpolation routines. Construction of the grid points, the
/// polynomial term index and the basis functions are the responsibility of the implementor.
///
/// `b_lower() * b_upper()` must reproduce the basis matrix evaluated at the grid points, and both
/// factors must be square with one row per grid point.
///
pub trait SmolyakGrid
{
    /// Number of dimensions `d`.
    fn ndim(&self) -> usize;

    /// Refinement level `mu`.
    fn level(&self) -> u32;

    fn num_points(&self) -> usize
    {
        self.b_lower().nrows()
    }

    /// Lower factor of the basis matrix at the grid points.
    fn b_lower(&self) -> MatRef<'_, f64>;

    /// Upper factor of the basis matrix at the grid points.
    fn b_upper(&self) -> MatRef<'_, f64>;

    fn domain(&self) -> &Domain;

    fn lower_bounds(&self) -> &[f64]
    {
        &self.domain().lower
    }

    fn upper_bounds(&self) -> &[f64]
    {
        &self.domain().upper
    }

    ///
    /// Map points (one per row) from the grid's domain into the canonical cube `[-1, 1]^d`.
    ///
    fn dom_to_cube(&self, points: MatRef<'_, f64>) -> Mat<f64>
    {
        self.domain().to_cube(points)
    }

    ///
    /// Evaluate every basis polynomial of the grid at `cube_points`, returning an
    /// `n_query x n_points` matrix.
    ///
    fn build_basis(&self, cube_points: MatRef<'_, f64>) -> Mat<f64>;

    ///
    /// As [`SmolyakGrid::build_basis`], additionally returning the partial derivative of the
    /// basis along each cube dimension.
    ///
    fn build_basis_with_derivatives(&self, cube_points: MatRef<'_, f64>) -> BasisWithDerivatives;
}
