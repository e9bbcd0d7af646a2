use faer::{Mat, MatRef};
use serde::{Deserialize, Serialize};

use crate::errors::SmolyakError;

///
/// Axis aligned box `[lower, upper]` that a Smolyak grid is defined over. Points are mapped
/// affinely onto the canonical cube `[-1, 1]^d` before basis evaluation.
///
#[derive(Default, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Domain
{
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}
impl Domain
{
    pub fn new(lower: &[f64], upper: &[f64]) -> Result<Self, SmolyakError>
    {
        let domain = Self { lower: lower.to_owned(), upper: upper.to_owned() };
        domain.validate()?;
        Ok(domain)
    }

    ///
    /// Bounds must have matching lengths and a positive finite width in every dimension.
    ///
    pub fn validate(&self) -> Result<(), SmolyakError>
    {
        if self.lower.len() != self.upper.len()
        {
            return Err(SmolyakError::InvalidBounds);
        }
        let valid = (0..self.ndim()).all(|dim|
        {
            let width = self.width(dim);
            width > 0.0 && width.is_finite()
        });
        if valid { Ok(()) } else { Err(SmolyakError::InvalidBounds) }
    }

    ///
    /// Unit cube `[-1, 1]^ndim`, i.e. the identity transform.
    ///
    pub fn canonical(ndim: usize) -> Self
    {
        Self { lower: vec![-1.0; ndim], upper: vec![1.0; ndim] }
    }

    #[inline]
    pub fn ndim(&self) -> usize
    {
        self.lower.len()
    }

    #[inline]
    pub fn width(&self, dim: usize) -> f64
    {
        self.upper[dim] - self.lower[dim]
    }

    ///
    /// Factor mapping a derivative taken in cube coordinates back to the units of `dim`.
    /// The cube has a half-width of one, so this is `2 / (ub - lb)`.
    ///
    #[inline]
    pub fn derivative_scale(&self, dim: usize) -> f64
    {
        2.0 / self.width(dim)
    }

    #[inline]
    pub fn cube_coordinate(&self, x: f64, dim: usize) -> f64
    {
        2.0 * (x - self.lower[dim]) / self.width(dim) - 1.0
    }

    #[inline]
    pub fn real_coordinate(&self, x: f64, dim: usize) -> f64
    {
        self.lower[dim] + 0.5 * (x + 1.0) * self.width(dim)
    }

    ///
    /// Map each row of `points` (one point per row) into the canonical cube.
    ///
    pub fn to_cube(&self, points: MatRef<'_, f64>) -> Mat<f64>
    {
        Mat::from_fn(points.nrows(), points.ncols(), |i, j| self.cube_coordinate(points[(i, j)], j))
    }

    ///
    /// Inverse of [`Domain::to_cube`].
    ///
    pub fn to_real(&self, cube_points: MatRef<'_, f64>) -> Mat<f64>
    {
        Mat::from_fn(cube_points.nrows(), cube_points.ncols(), |i, j| self.real_coordinate(cube_points[(i, j)], j))
    }

    pub fn contains(&self, point: &[f64]) -> bool
    {
        point.iter().zip(self.lower.iter().zip(&self.upper)).all(|(&x, (&lo, &hi))| lo <= x && x <= hi)
    }

    ///
    /// Returns the index of the first row of `points` lying outside the domain.
    ///
    pub fn first_outside(&self, points: MatRef<'_, f64>) -> Option<usize>
    {
        let mut row = vec![0.0; points.ncols()];
        (0..points.nrows()).find(|&i|
        {
            for (d, x) in row.iter_mut().enumerate()
            {
                *x = points[(i, d)];
            }
            !self.contains(&row)
        })
    }
}

#[test]
fn check_cube_transform()
{
    let domain = Domain::new(&[0.0, -2.0], &[4.0, 2.0]).unwrap();
    let points = faer::mat![[0.0, -2.0], [2.0, 0.0], [4.0, 1.0]];
    let cube = domain.to_cube(points.as_ref());
    let expected = [[-1.0, -1.0], [0.0, 0.0], [1.0, 0.5]];
    for (i, row) in expected.iter().enumerate()
    {
        for (j, &value) in row.iter().enumerate()
        {
            assert!((cube[(i, j)] - value).abs() < 1e-15);
        }
    }
    let back = domain.to_real(cube.as_ref());
    for i in 0..3
    {
        for j in 0..2
        {
            assert!((back[(i, j)] - points[(i, j)]).abs() < 1e-14);
        }
    }
    assert_eq!(domain.derivative_scale(0), 0.5);
}

#[test]
fn check_contains()
{
    let domain = Domain::new(&[-1.0, 0.0], &[1.0, 1.0]).unwrap();
    assert!(domain.contains(&[0.0, 0.5]));
    assert!(domain.contains(&[1.0, 1.0]));
    assert!(!domain.contains(&[1.5, 0.5]));
    let points = faer::mat![[0.0, 0.5], [0.0, -0.1]];
    assert_eq!(domain.first_outside(points.as_ref()), Some(1));
    assert_eq!(Domain::canonical(2).first_outside(points.as_ref()), None);
    let nan_point = faer::mat![[0.0, 0.5], [f64::NAN, 0.5]];
    assert_eq!(domain.first_outside(nan_point.as_ref()), Some(1));
}

#[test]
fn check_invalid_bounds()
{
    assert_eq!(Domain::new(&[0.0, 1.0], &[1.0]).unwrap_err(), SmolyakError::InvalidBounds);
    assert_eq!(Domain::new(&[0.5], &[0.5]).unwrap_err(), SmolyakError::InvalidBounds);
    assert_eq!(Domain::new(&[0.0, 2.0], &[1.0, 1.0]).unwrap_err(), SmolyakError::InvalidBounds);
    assert_eq!(Domain::new(&[f64::NAN], &[1.0]).unwrap_err(), SmolyakError::InvalidBounds);
    assert_eq!(Domain::new(&[0.0], &[f64::INFINITY]).unwrap_err(), SmolyakError::InvalidBounds);
    assert!(Domain::canonical(3).validate().is_ok());
    let deserialized = Domain { lower: vec![1.0], upper: vec![1.0] };
    assert_eq!(deserialized.validate(), Err(SmolyakError::InvalidBounds));
}
