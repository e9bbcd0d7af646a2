use faer::{Mat, MatRef};
use log::debug;

use crate::{errors::SmolyakError, grid::SmolyakGrid, linalg::{all_finite, solve_factor}, options::SolverOptions};

///
/// Coefficients `theta` of the interpolant through `f_on_grid`, one column per column of samples.
///
/// Solves `B_L * y = f_on_grid` and then `B_U * theta = y`. The factors do not commute, so the
/// order of the two solves is fixed.
///
pub fn find_theta<G: SmolyakGrid + ?Sized>(grid: &G, f_on_grid: MatRef<'_, f64>) -> Result<Mat<f64>, SmolyakError>
{
    find_theta_with_options(grid, f_on_grid, &SolverOptions::default())
}

pub fn find_theta_with_options<G: SmolyakGrid + ?Sized>(grid: &G, f_on_grid: MatRef<'_, f64>, options: &SolverOptions) -> Result<Mat<f64>, SmolyakError>
{
    let b_lower = grid.b_lower();
    let b_upper = grid.b_upper();
    if b_upper.nrows() != b_lower.nrows() || b_upper.ncols() != b_lower.ncols()
    {
        return Err(SmolyakError::NonSquareFactor);
    }
    if f_on_grid.nrows() != b_lower.nrows()
    {
        return Err(SmolyakError::NumberOfPointsAndValuesMismatch);
    }
    if !all_finite(f_on_grid)
    {
        return Err(SmolyakError::NonFiniteValues);
    }
    debug!("fitting {} column(s) of samples on {} grid points", f_on_grid.ncols(), f_on_grid.nrows());
    let y = solve_factor(b_lower, f_on_grid.to_owned(), options)?;
    solve_factor(b_upper, y, options)
}

///
/// Convenience wrapper around [`find_theta`] for a single vector of samples.
///
pub fn find_theta_from_slice<G: SmolyakGrid + ?Sized>(grid: &G, f_on_grid: &[f64]) -> Result<Vec<f64>, SmolyakError>
{
    let theta = find_theta(grid, column(f_on_grid).as_ref())?;
    Ok((0..theta.nrows()).map(|i| theta[(i, 0)]).collect())
}

/// Single column matrix holding `values`.
pub(crate) fn column(values: &[f64]) -> Mat<f64>
{
    Mat::from_fn(values.len(), 1, |i, _| values[i])
}
