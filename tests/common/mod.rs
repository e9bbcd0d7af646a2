//! Reference Smolyak grid on Chebyshev extrema used by the integration tests and benchmarks.
#![allow(dead_code)]

use std::f64::consts::PI;

use faer::{Mat, MatRef};
use smolyak::{domain::Domain, BasisWithDerivatives, SmolyakGrid};

/// How the basis matrix at the grid points is split into `B_L * B_U`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Factorization
{
    /// Unit lower and upper triangular factors, no pivoting.
    Doolittle,
    /// Partial pivoting with the row permutation folded into the lower factor.
    PermutedLower,
}

#[derive(Debug)]
pub struct ChebyshevSmolyakGrid
{
    ndim: usize,
    level: u32,
    domain: Domain,
    /// Grid points in cube coordinates, one per row.
    cube_points: Mat<f64>,
    /// Chebyshev degree per dimension for each basis polynomial.
    terms: Vec<Vec<usize>>,
    b_lower: Mat<f64>,
    b_upper: Mat<f64>,
}

/// Number of nested Chebyshev extrema at 1-based level `i`.
fn num_nodes(i: usize) -> usize
{
    if i == 1 { 1 } else { (1 << (i - 1)) + 1 }
}

/// Extrema added at level `i` that are not present at level `i - 1`.
fn new_nodes(i: usize) -> Vec<f64>
{
    match i
    {
        1 => vec![0.0],
        2 => vec![-1.0, 1.0],
        _ =>
        {
            let m = num_nodes(i);
            (1..m).step_by(2).map(|j| -f64::cos(PI * j as f64 / (m - 1) as f64)).collect()
        }
    }
}

/// Chebyshev degrees added at 1-based level `i`.
fn new_degrees(i: usize) -> Vec<usize>
{
    match i
    {
        1 => vec![0],
        _ => (num_nodes(i - 1)..num_nodes(i)).collect(),
    }
}

/// Multi-indices `i >= 1` with `|i| <= max_sum`.
fn smolyak_indices(ndim: usize, max_sum: usize) -> Vec<Vec<usize>>
{
    let mut indices = vec![vec![]];
    for d in 0..ndim
    {
        let remaining = ndim - d - 1;
        let mut next = Vec::new();
        for index in indices
        {
            let used: usize = index.iter().sum();
            for i in 1..=(max_sum - used - remaining)
            {
                let mut extended = index.clone();
                extended.push(i);
                next.push(extended);
            }
        }
        indices = next;
    }
    indices
}

fn cartesian<T: Clone>(sets: &[Vec<T>]) -> Vec<Vec<T>>
{
    sets.iter().fold(vec![vec![]], |acc, set|
    {
        acc.iter().flat_map(|prefix| set.iter().map(move |item|
        {
            let mut next = prefix.clone();
            next.push(item.clone());
            next
        })).collect()
    })
}

/// `T_n(x)` and `T_n'(x)`.
pub fn chebyshev(n: usize, x: f64) -> (f64, f64)
{
    if n == 0
    {
        return (1.0, 0.0);
    }
    // T_n' = n * U_{n-1}
    let (mut t_prev, mut t) = (1.0, x);
    let (mut u_prev, mut u) = (0.0, 1.0);
    for _ in 1..n
    {
        (t_prev, t) = (t, 2.0 * x * t - t_prev);
        (u_prev, u) = (u, 2.0 * x * u - u_prev);
    }
    (t, n as f64 * u)
}

fn lu(a: &Mat<f64>, pivot: bool) -> (Mat<f64>, Mat<f64>)
{
    let n = a.nrows();
    let mut work = a.clone();
    let mut perm: Vec<usize> = (0..n).collect();
    for k in 0..n
    {
        if pivot
        {
            let p = (k..n).max_by(|&i, &j| work[(i, k)].abs().total_cmp(&work[(j, k)].abs())).unwrap();
            if p != k
            {
                for c in 0..n
                {
                    let tmp = work[(k, c)];
                    work[(k, c)] = work[(p, c)];
                    work[(p, c)] = tmp;
                }
                perm.swap(k, p);
            }
        }
        for i in k + 1..n
        {
            let factor = work[(i, k)] / work[(k, k)];
            work[(i, k)] = factor;
            for c in k + 1..n
            {
                work[(i, c)] -= factor * work[(k, c)];
            }
        }
    }
    let mut lower = Mat::<f64>::zeros(n, n);
    let mut upper = Mat::<f64>::zeros(n, n);
    for k in 0..n
    {
        for c in 0..n
        {
            if c < k
            {
                lower[(perm[k], c)] = work[(k, c)];
            }
            else
            {
                upper[(k, c)] = work[(k, c)];
            }
        }
        lower[(perm[k], k)] = 1.0;
    }
    (lower, upper)
}

impl ChebyshevSmolyakGrid
{
    pub fn new(ndim: usize, level: u32, lower: &[f64], upper: &[f64], factorization: Factorization) -> Self
    {
        let mut points = Vec::new();
        let mut terms = Vec::new();
        for index in smolyak_indices(ndim, ndim + level as usize)
        {
            let node_sets: Vec<Vec<f64>> = index.iter().map(|&i| new_nodes(i)).collect();
            let degree_sets: Vec<Vec<usize>> = index.iter().map(|&i| new_degrees(i)).collect();
            points.extend(cartesian(&node_sets));
            terms.extend(cartesian(&degree_sets));
        }
        assert_eq!(points.len(), terms.len());
        let cube_points = Mat::from_fn(points.len(), ndim, |i, j| points[i][j]);
        let mut grid = Self
        {
            ndim,
            level,
            domain: Domain::new(lower, upper).unwrap(),
            cube_points,
            terms,
            b_lower: Mat::new(),
            b_upper: Mat::new(),
        };
        let basis = grid.basis(grid.cube_points.as_ref());
        let (b_lower, b_upper) = lu(&basis, factorization == Factorization::PermutedLower);
        grid.b_lower = b_lower;
        grid.b_upper = b_upper;
        grid
    }

    /// Grid points in domain coordinates, one per row.
    pub fn points(&self) -> Mat<f64>
    {
        self.domain.to_real(self.cube_points.as_ref())
    }

    /// `f` evaluated at every grid point.
    pub fn sample(&self, f: impl Fn(&[f64]) -> f64) -> Vec<f64>
    {
        let points = self.points();
        (0..points.nrows()).map(|i|
        {
            let x: Vec<f64> = (0..self.ndim).map(|d| points[(i, d)]).collect();
            f(&x)
        }).collect()
    }

    fn basis(&self, cube_points: MatRef<'_, f64>) -> Mat<f64>
    {
        Mat::from_fn(cube_points.nrows(), self.terms.len(), |i, j|
        {
            self.terms[j].iter().enumerate().map(|(d, &n)| chebyshev(n, cube_points[(i, d)]).0).product::<f64>()
        })
    }
}

impl SmolyakGrid for ChebyshevSmolyakGrid
{
    fn ndim(&self) -> usize { self.ndim }
    fn level(&self) -> u32 { self.level }
    fn b_lower(&self) -> MatRef<'_, f64> { self.b_lower.as_ref() }
    fn b_upper(&self) -> MatRef<'_, f64> { self.b_upper.as_ref() }
    fn domain(&self) -> &Domain { &self.domain }

    fn build_basis(&self, cube_points: MatRef<'_, f64>) -> Mat<f64>
    {
        self.basis(cube_points)
    }

    fn build_basis_with_derivatives(&self, cube_points: MatRef<'_, f64>) -> BasisWithDerivatives
    {
        let derivatives = (0..self.ndim).map(|dim|
        {
            Mat::from_fn(cube_points.nrows(), self.terms.len(), |i, j|
            {
                self.terms[j].iter().enumerate().map(|(d, &n)|
                {
                    let (t, dt) = chebyshev(n, cube_points[(i, d)]);
                    if d == dim { dt } else { t }
                }).product::<f64>()
            })
        }).collect();
        BasisWithDerivatives { basis: self.basis(cube_points), derivatives }
    }
}

pub fn max_abs_diff(a: MatRef<'_, f64>, b: MatRef<'_, f64>) -> f64
{
    assert_eq!((a.nrows(), a.ncols()), (b.nrows(), b.ncols()));
    let mut max = 0.0_f64;
    for i in 0..a.nrows()
    {
        for j in 0..a.ncols()
        {
            max = max.max((a[(i, j)] - b[(i, j)]).abs());
        }
    }
    max
}
