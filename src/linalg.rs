//! Dense solves against the grid's factor matrices.
//!
//! Factors produced by an LU decomposition are usually triangular, but a lower factor that has
//! absorbed the row permutation is not. Exactly triangular factors are solved by substitution,
//! anything else goes through a partial pivoting LU.

use faer::{
    linalg::{solvers::Solve, triangular_solve},
    Mat, MatRef, Par,
};
use log::debug;

use crate::{errors::SmolyakError, options::SolverOptions};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FactorKind
{
    Lower,
    Upper,
    General,
}

fn is_lower_triangular(a: MatRef<'_, f64>) -> bool
{
    (0..a.ncols()).all(|j| (0..j.min(a.nrows())).all(|i| a[(i, j)] == 0.0))
}

fn is_upper_triangular(a: MatRef<'_, f64>) -> bool
{
    (0..a.ncols()).all(|j| (j + 1..a.nrows()).all(|i| a[(i, j)] == 0.0))
}

pub(crate) fn factor_kind(a: MatRef<'_, f64>) -> FactorKind
{
    if is_lower_triangular(a)
    {
        FactorKind::Lower
    }
    else if is_upper_triangular(a)
    {
        FactorKind::Upper
    }
    else
    {
        FactorKind::General
    }
}

///
/// Fails with `SingularMatrix` if any pivot is zero, non-finite or small relative to the largest.
///
fn check_pivots(pivots: impl Iterator<Item = f64>, options: &SolverOptions) -> Result<(), SmolyakError>
{
    let pivots: Vec<f64> = pivots.map(f64::abs).collect();
    if pivots.iter().any(|p| !p.is_finite())
    {
        return Err(SmolyakError::SingularMatrix);
    }
    let largest = pivots.iter().cloned().fold(0.0, f64::max);
    if pivots.iter().any(|&p| p == 0.0 || p <= options.pivot_tolerance * largest)
    {
        return Err(SmolyakError::SingularMatrix);
    }
    Ok(())
}

fn diagonal(a: MatRef<'_, f64>) -> impl Iterator<Item = f64> + '_
{
    (0..a.nrows().min(a.ncols())).map(move |i| a[(i, i)])
}

pub(crate) fn all_finite(m: MatRef<'_, f64>) -> bool
{
    (0..m.ncols()).all(|j| (0..m.nrows()).all(|i| m[(i, j)].is_finite()))
}

///
/// Solve `a * x = rhs` for a square factor `a` and any number of right hand side columns.
///
pub(crate) fn solve_factor(a: MatRef<'_, f64>, rhs: Mat<f64>, options: &SolverOptions) -> Result<Mat<f64>, SmolyakError>
{
    if a.nrows() != a.ncols()
    {
        return Err(SmolyakError::NonSquareFactor);
    }
    if rhs.nrows() != a.nrows()
    {
        return Err(SmolyakError::NumberOfPointsAndValuesMismatch);
    }
    // a non-finite solution from a finite right hand side means the factor is singular
    if !all_finite(rhs.as_ref())
    {
        return Err(SmolyakError::NonFiniteValues);
    }
    let x = match factor_kind(a)
    {
        FactorKind::Lower =>
        {
            check_pivots(diagonal(a), options)?;
            let mut x = rhs;
            triangular_solve::solve_lower_triangular_in_place(a, x.as_mut(), Par::Seq);
            x
        },
        FactorKind::Upper =>
        {
            check_pivots(diagonal(a), options)?;
            let mut x = rhs;
            triangular_solve::solve_upper_triangular_in_place(a, x.as_mut(), Par::Seq);
            x
        },
        FactorKind::General =>
        {
            debug!("factor of size {} is not triangular, solving with partial pivoting LU", a.nrows());
            let lu = a.partial_piv_lu();
            check_pivots(diagonal(lu.U()), options)?;
            lu.solve(&rhs)
        }
    };
    if !all_finite(x.as_ref())
    {
        return Err(SmolyakError::SingularMatrix);
    }
    Ok(x)
}

#[test]
fn check_factor_kind()
{
    let lower = faer::mat![[2.0, 0.0], [1.0, 3.0]];
    let upper = faer::mat![[2.0, 1.0], [0.0, 3.0]];
    let general = faer::mat![[0.0, 1.0], [2.0, 3.0]];
    assert_eq!(factor_kind(lower.as_ref()), FactorKind::Lower);
    assert_eq!(factor_kind(upper.as_ref()), FactorKind::Upper);
    assert_eq!(factor_kind(general.as_ref()), FactorKind::General);
    assert_eq!(factor_kind(lower.transpose()), FactorKind::Upper);
}

#[test]
fn check_triangular_solves()
{
    let options = SolverOptions::default();
    let lower = faer::mat![[2.0, 0.0, 0.0], [1.0, 4.0, 0.0], [-1.0, 2.0, 5.0]];
    let x = faer::mat![[1.0, -2.0], [0.5, 3.0], [2.0, 0.0]];
    let b = &lower * &x;
    let solved = solve_factor(lower.as_ref(), b, &options).unwrap();
    let upper = lower.transpose().to_owned();
    let solved_upper = solve_factor(upper.as_ref(), &upper * &x, &options).unwrap();
    for i in 0..3
    {
        for j in 0..2
        {
            assert!((solved[(i, j)] - x[(i, j)]).abs() < 1e-14);
            assert!((solved_upper[(i, j)] - x[(i, j)]).abs() < 1e-14);
        }
    }
}

#[test]
fn check_permuted_lower_solve()
{
    // rows of a lower triangular factor swapped, as returned by LU with the permutation folded in
    let a = faer::mat![[1.0, 2.0, 0.0], [1.0, 0.0, 0.0], [3.0, 1.0, 4.0]];
    let x = faer::mat![[1.0], [-1.0], [0.25]];
    let b = &a * &x;
    let solved = solve_factor(a.as_ref(), b, &SolverOptions::default()).unwrap();
    for i in 0..3
    {
        assert!((solved[(i, 0)] - x[(i, 0)]).abs() < 1e-14);
    }
}

#[test]
fn check_singular_factors()
{
    let options = SolverOptions::default();
    let lower = faer::mat![[1.0, 0.0], [2.0, 0.0]];
    assert_eq!(solve_factor(lower.as_ref(), Mat::zeros(2, 1), &options).unwrap_err(), SmolyakError::SingularMatrix);
    let general = faer::mat![[1.0, 2.0], [2.0, 4.0]];
    assert_eq!(solve_factor(general.as_ref(), Mat::zeros(2, 1), &options).unwrap_err(), SmolyakError::SingularMatrix);
    let nearly = faer::mat![[1.0, 0.0], [0.0, 1e-20]];
    assert_eq!(solve_factor(nearly.as_ref(), Mat::zeros(2, 1), &options).unwrap_err(), SmolyakError::SingularMatrix);
}

#[test]
fn check_non_finite_right_hand_side()
{
    let options = SolverOptions::default();
    let lower = faer::mat![[2.0, 0.0], [1.0, 4.0]];
    let general = faer::mat![[0.0, 1.0], [2.0, 3.0]];
    for a in [lower.as_ref(), general.as_ref()]
    {
        let rhs = faer::mat![[1.0], [f64::NAN]];
        assert_eq!(solve_factor(a, rhs, &options).unwrap_err(), SmolyakError::NonFiniteValues);
        let rhs = faer::mat![[f64::INFINITY], [0.0]];
        assert_eq!(solve_factor(a, rhs, &options).unwrap_err(), SmolyakError::NonFiniteValues);
    }
    // finite samples against a near singular factor are still a conditioning failure
    let tiny = faer::mat![[1.0, 0.0], [0.0, 1e-300]];
    let rhs = faer::mat![[1.0], [f64::MAX]];
    assert_eq!(solve_factor(tiny.as_ref(), rhs, &options).unwrap_err(), SmolyakError::SingularMatrix);
}

#[test]
fn check_shape_errors()
{
    let options = SolverOptions::default();
    let rect = Mat::<f64>::zeros(2, 3);
    assert_eq!(solve_factor(rect.as_ref(), Mat::zeros(2, 1), &options).unwrap_err(), SmolyakError::NonSquareFactor);
    let square = Mat::<f64>::identity(2, 2);
    assert_eq!(solve_factor(square.as_ref(), Mat::zeros(3, 1), &options).unwrap_err(), SmolyakError::NumberOfPointsAndValuesMismatch);
}
