use serde::{Deserialize, Serialize};

/// Relative size below which a pivot is treated as zero.
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1e3 * f64::EPSILON;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SolverOptions
{
    /// A factor is reported as singular when `|pivot| <= pivot_tolerance * max|pivot|`.
    pub pivot_tolerance: f64,
}

impl Default for SolverOptions
{
    fn default() -> Self {
        Self { pivot_tolerance: DEFAULT_PIVOT_TOLERANCE }
    }
}

#[derive(Default, Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct InterpolationOptions
{
    /// Options for the coefficient fit and the point sensitivity solves.
    pub solver: SolverOptions,
    /// Reject query points outside the grid domain instead of extrapolating.
    pub reject_out_of_domain: bool,
}

///
/// Selects which outputs [`crate::interpolation::SmolyakInterp::interpolate`] computes.
/// Outputs are always returned in the order value, gradient, theta sensitivity, point sensitivity.
///
#[derive(Default, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvaluationRequest
{
    /// Interpolated values.
    pub value: bool,
    /// Gradient with respect to the query point, in domain units.
    pub gradient: bool,
    /// Derivative of the values with respect to the coefficients theta.
    pub theta_sensitivity: bool,
    /// Derivative of the values with respect to the sampled function values.
    pub point_sensitivity: bool,
}

impl EvaluationRequest
{
    pub fn none() -> Self
    {
        Self::default()
    }

    pub fn value_only() -> Self
    {
        Self { value: true, ..Self::default() }
    }

    pub fn all() -> Self
    {
        Self { value: true, gradient: true, theta_sensitivity: true, point_sensitivity: true }
    }

    pub fn with_value(mut self, value: bool) -> Self
    {
        self.value = value;
        self
    }

    pub fn with_gradient(mut self, gradient: bool) -> Self
    {
        self.gradient = gradient;
        self
    }

    pub fn with_theta_sensitivity(mut self, theta_sensitivity: bool) -> Self
    {
        self.theta_sensitivity = theta_sensitivity;
        self
    }

    pub fn with_point_sensitivity(mut self, point_sensitivity: bool) -> Self
    {
        self.point_sensitivity = point_sensitivity;
        self
    }

    /// Number of outputs that will be returned.
    pub fn count(&self) -> usize
    {
        [self.value, self.gradient, self.theta_sensitivity, self.point_sensitivity].iter().filter(|&&b| b).count()
    }

    pub fn is_empty(&self) -> bool
    {
        self.count() == 0
    }
}

#[test]
fn check_request_builders()
{
    assert!(EvaluationRequest::none().is_empty());
    assert_eq!(EvaluationRequest::value_only().count(), 1);
    assert_eq!(EvaluationRequest::all().count(), 4);
    let request = EvaluationRequest::none().with_gradient(true).with_point_sensitivity(true);
    assert!(!request.value && request.gradient && !request.theta_sensitivity && request.point_sensitivity);
    assert_eq!(request.count(), 2);
}
