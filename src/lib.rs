//! Lagrange interpolation on Smolyak sparse grids.
//!
//! A grid implementing [`grid::SmolyakGrid`] supplies the factored basis matrix at its points and
//! builds basis matrices for arbitrary query points. [`fit::find_theta`] turns function values on
//! the grid into polynomial coefficients, and [`interpolation::SmolyakInterp`] evaluates the
//! resulting interpolant, its gradient and its sensitivities to the coefficients and to the samples.

pub mod domain;
pub mod errors;
pub mod fit;
pub mod grid;
pub mod interpolation;
pub(crate) mod linalg;
pub mod options;

pub use errors::SmolyakError;
pub use fit::{find_theta, find_theta_from_slice, find_theta_with_options};
pub use grid::{BasisWithDerivatives, SmolyakGrid};
pub use interpolation::{Interpolated, Output, OutputKind, SmolyakInterp};
pub use options::{EvaluationRequest, InterpolationOptions, SolverOptions};
