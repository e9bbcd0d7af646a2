use faer::{Mat, MatRef};
use log::{debug, trace};

use crate::{
    errors::SmolyakError,
    fit::{column, find_theta_with_options},
    grid::SmolyakGrid,
    linalg::solve_factor,
    options::{EvaluationRequest, InterpolationOptions},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputKind
{
    Value,
    Gradient,
    ThetaSensitivity,
    PointSensitivity,
}

///
/// One requested output of [`SmolyakInterp::interpolate`]. Every matrix has one row per query point.
///
#[derive(Clone, Debug)]
pub enum Output
{
    /// `n_query x k` interpolated values, `k` being the number of sample columns.
    Value(Mat<f64>),
    /// `n_query x d` partial derivatives in the units of the grid domain.
    Gradient(Mat<f64>),
    /// `n_query x n_points` derivative of the values with respect to theta, i.e. the basis matrix.
    ThetaSensitivity(Mat<f64>),
    /// `n_query x n_points` derivative of the values with respect to the samples on the grid.
    PointSensitivity(Mat<f64>),
}

impl Output
{
    pub fn kind(&self) -> OutputKind
    {
        match self
        {
            Output::Value(_) => OutputKind::Value,
            Output::Gradient(_) => OutputKind::Gradient,
            Output::ThetaSensitivity(_) => OutputKind::ThetaSensitivity,
            Output::PointSensitivity(_) => OutputKind::PointSensitivity,
        }
    }

    pub fn matrix(&self) -> MatRef<'_, f64>
    {
        match self
        {
            Output::Value(m) | Output::Gradient(m) | Output::ThetaSensitivity(m) | Output::PointSensitivity(m) => m.as_ref(),
        }
    }

    pub fn into_matrix(self) -> Mat<f64>
    {
        match self
        {
            Output::Value(m) | Output::Gradient(m) | Output::ThetaSensitivity(m) | Output::PointSensitivity(m) => m,
        }
    }
}

///
/// Result of [`SmolyakInterp::interpolate`]. A single requested output is returned on its own,
/// otherwise the outputs are listed in the order value, gradient, theta sensitivity, point
/// sensitivity. Requesting nothing yields an empty `Multiple`.
///
#[derive(Clone, Debug)]
pub enum Interpolated
{
    Single(Output),
    Multiple(Vec<Output>),
}

impl Interpolated
{
    fn from_outputs(mut outputs: Vec<Output>) -> Self
    {
        if outputs.len() == 1
        {
            if let Some(output) = outputs.pop()
            {
                return Interpolated::Single(output);
            }
        }
        Interpolated::Multiple(outputs)
    }

    pub fn len(&self) -> usize
    {
        match self
        {
            Interpolated::Single(_) => 1,
            Interpolated::Multiple(outputs) => outputs.len(),
        }
    }

    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }

    pub fn kinds(&self) -> Vec<OutputKind>
    {
        match self
        {
            Interpolated::Single(output) => vec![output.kind()],
            Interpolated::Multiple(outputs) => outputs.iter().map(Output::kind).collect(),
        }
    }

    pub fn get(&self, kind: OutputKind) -> Option<MatRef<'_, f64>>
    {
        match self
        {
            Interpolated::Single(output) => (output.kind() == kind).then(|| output.matrix()),
            Interpolated::Multiple(outputs) => outputs.iter().find(|o| o.kind() == kind).map(Output::matrix),
        }
    }

    pub fn into_outputs(self) -> Vec<Output>
    {
        match self
        {
            Interpolated::Single(output) => vec![output],
            Interpolated::Multiple(outputs) => outputs,
        }
    }
}

///
/// Intermediates of a single evaluation. The basis matrix and its derivatives are built on first
/// use and reused by every output requested in the same call.
///
struct EvaluationState<'a, G: SmolyakGrid + ?Sized>
{
    grid: &'a G,
    cube_points: Mat<f64>,
    basis: Option<Mat<f64>>,
    derivatives: Option<Vec<Mat<f64>>>,
}

impl<'a, G: SmolyakGrid + ?Sized> EvaluationState<'a, G>
{
    fn new(grid: &'a G, cube_points: Mat<f64>) -> Self
    {
        Self { grid, cube_points, basis: None, derivatives: None }
    }

    fn check_shape(&self, m: &Mat<f64>) -> Result<(), SmolyakError>
    {
        if m.nrows() != self.cube_points.nrows() || m.ncols() != self.grid.num_points()
        {
            return Err(SmolyakError::BasisShapeMismatch);
        }
        Ok(())
    }

    fn build_basis(&self) -> Result<Mat<f64>, SmolyakError>
    {
        let basis = self.grid.build_basis(self.cube_points.as_ref());
        self.check_shape(&basis)?;
        Ok(basis)
    }

    fn basis(&mut self) -> Result<&Mat<f64>, SmolyakError>
    {
        let basis = match self.basis.take()
        {
            Some(basis) => basis,
            None => self.build_basis()?,
        };
        let basis = self.basis.insert(basis);
        Ok(&*basis)
    }

    fn basis_and_derivatives(&mut self) -> Result<(&Mat<f64>, &[Mat<f64>]), SmolyakError>
    {
        if self.derivatives.is_none()
        {
            let built = self.grid.build_basis_with_derivatives(self.cube_points.as_ref());
            self.check_shape(&built.basis)?;
            if built.derivatives.len() != self.grid.ndim()
            {
                return Err(SmolyakError::BasisShapeMismatch);
            }
            for derivative in &built.derivatives
            {
                self.check_shape(derivative)?;
            }
            self.basis = Some(built.basis);
            self.derivatives = Some(built.derivatives);
        }
        match (&self.basis, &self.derivatives)
        {
            (Some(basis), Some(derivatives)) => Ok((basis, derivatives.as_slice())),
            _ => Err(SmolyakError::BasisShapeMismatch),
        }
    }

    fn into_basis(mut self) -> Result<Mat<f64>, SmolyakError>
    {
        match self.basis.take()
        {
            Some(basis) => Ok(basis),
            None => self.build_basis(),
        }
    }
}

///
/// Interpolant over a Smolyak grid. Holds the samples on the grid and the fitted coefficients;
/// the grid itself is borrowed and must outlive the interpolant.
///
#[derive(Debug)]
pub struct SmolyakInterp<'g, G: SmolyakGrid + ?Sized>
{
    grid: &'g G,
    f_on_grid: Mat<f64>,
    theta: Mat<f64>,
    options: InterpolationOptions,
}

impl<'g, G: SmolyakGrid + ?Sized> SmolyakInterp<'g, G>
{
    ///
    /// Fit an interpolant to the function values `f_on_grid`, one per grid point.
    ///
    pub fn new(grid: &'g G, f_on_grid: &[f64]) -> Result<Self, SmolyakError>
    {
        Self::with_options(grid, f_on_grid, InterpolationOptions::default())
    }

    pub fn with_options(grid: &'g G, f_on_grid: &[f64], options: InterpolationOptions) -> Result<Self, SmolyakError>
    {
        Self::from_matrix(grid, column(f_on_grid).as_ref(), options)
    }

    ///
    /// Fit several interpolants sharing one grid at once, one per column of `f_on_grid`.
    /// Values are returned per column; gradients are only available for a single column.
    ///
    pub fn from_matrix(grid: &'g G, f_on_grid: MatRef<'_, f64>, options: InterpolationOptions) -> Result<Self, SmolyakError>
    {
        grid.domain().validate()?;
        let theta = find_theta_with_options(grid, f_on_grid, &options.solver)?;
        debug!("created interpolant with {} points in {} dimensions (level {})", grid.num_points(), grid.ndim(), grid.level());
        Ok(Self { grid, f_on_grid: f_on_grid.to_owned(), theta, options })
    }

    ///
    /// Replace the samples on the grid and refit theta. On failure the previous fit is kept.
    ///
    pub fn update_theta(&mut self, f_on_grid: &[f64]) -> Result<(), SmolyakError>
    {
        self.update_theta_matrix(column(f_on_grid).as_ref())
    }

    pub fn update_theta_matrix(&mut self, f_on_grid: MatRef<'_, f64>) -> Result<(), SmolyakError>
    {
        let theta = find_theta_with_options(self.grid, f_on_grid, &self.options.solver)?;
        debug!("refitted interpolant with {} column(s) of samples", f_on_grid.ncols());
        self.f_on_grid = f_on_grid.to_owned();
        self.theta = theta;
        Ok(())
    }

    #[inline]
    pub fn grid(&self) -> &'g G
    {
        self.grid
    }

    #[inline]
    pub fn sample_values(&self) -> MatRef<'_, f64>
    {
        self.f_on_grid.as_ref()
    }

    #[inline]
    pub fn theta(&self) -> MatRef<'_, f64>
    {
        self.theta.as_ref()
    }

    #[inline]
    pub fn options(&self) -> &InterpolationOptions
    {
        &self.options
    }

    ///
    /// Evaluate the outputs selected by `request` at `points` (one point per row, `d` columns).
    ///
    pub fn interpolate(&self, points: MatRef<'_, f64>, request: EvaluationRequest) -> Result<Interpolated, SmolyakError>
    {
        self.check_points(points)?;
        if request.is_empty()
        {
            return Ok(Interpolated::Multiple(Vec::new()));
        }
        if request.gradient
        {
            self.check_scalar()?;
        }
        trace!("interpolating {} points with {:?}", points.nrows(), request);
        let mut state = self.prepare(points)?;
        let mut outputs = Vec::with_capacity(request.count());
        if request.gradient
        {
            let (basis, derivatives) = state.basis_and_derivatives()?;
            if request.value
            {
                outputs.push(Output::Value(basis * &self.theta));
            }
            outputs.push(Output::Gradient(self.scaled_gradient(derivatives, points.nrows())));
        }
        else if request.value
        {
            outputs.push(Output::Value(state.basis()? * &self.theta));
        }
        let point_sensitivity = match request.point_sensitivity
        {
            true => Some(self.point_sensitivity_from_basis(state.basis()?)?),
            false => None,
        };
        if request.theta_sensitivity
        {
            outputs.push(Output::ThetaSensitivity(state.into_basis()?));
        }
        if let Some(sensitivity) = point_sensitivity
        {
            outputs.push(Output::PointSensitivity(sensitivity));
        }
        Ok(Interpolated::from_outputs(outputs))
    }

    /// Interpolated values at `points`, `n_query x k`.
    pub fn values(&self, points: MatRef<'_, f64>) -> Result<Mat<f64>, SmolyakError>
    {
        self.check_points(points)?;
        let mut state = self.prepare(points)?;
        Ok(state.basis()? * &self.theta)
    }

    /// Gradient at `points`, `n_query x d`.
    pub fn gradient(&self, points: MatRef<'_, f64>) -> Result<Mat<f64>, SmolyakError>
    {
        self.check_points(points)?;
        self.check_scalar()?;
        let mut state = self.prepare(points)?;
        let (_, derivatives) = state.basis_and_derivatives()?;
        Ok(self.scaled_gradient(derivatives, points.nrows()))
    }

    /// Derivative of the values with respect to theta, `n_query x n_points`.
    pub fn theta_sensitivity(&self, points: MatRef<'_, f64>) -> Result<Mat<f64>, SmolyakError>
    {
        self.check_points(points)?;
        self.prepare(points)?.into_basis()
    }

    /// Derivative of the values with respect to the samples on the grid, `n_query x n_points`.
    pub fn point_sensitivity(&self, points: MatRef<'_, f64>) -> Result<Mat<f64>, SmolyakError>
    {
        self.check_points(points)?;
        let mut state = self.prepare(points)?;
        self.point_sensitivity_from_basis(state.basis()?)
    }

    fn check_points(&self, points: MatRef<'_, f64>) -> Result<(), SmolyakError>
    {
        let expected = self.grid.ndim();
        if points.ncols() != expected
        {
            return Err(SmolyakError::DimensionMismatch { expected, found: points.ncols() });
        }
        Ok(())
    }

    fn check_scalar(&self) -> Result<(), SmolyakError>
    {
        if self.theta.ncols() != 1
        {
            return Err(SmolyakError::MultipleRightHandSides);
        }
        Ok(())
    }

    fn prepare(&self, points: MatRef<'_, f64>) -> Result<EvaluationState<'g, G>, SmolyakError>
    {
        if self.options.reject_out_of_domain
        {
            if let Some(row) = self.grid.domain().first_outside(points)
            {
                debug!("query point {row} lies outside the grid domain");
                return Err(SmolyakError::OutOfDomain);
            }
        }
        Ok(EvaluationState::new(self.grid, self.grid.dom_to_cube(points)))
    }

    ///
    /// Contract theta against the basis derivatives and rescale each partial from the cube, which
    /// has a half-width of one, back to the grid domain.
    ///
    fn scaled_gradient(&self, derivatives: &[Mat<f64>], num_points: usize) -> Mat<f64>
    {
        let domain = self.grid.domain();
        let mut gradient = Mat::<f64>::zeros(num_points, derivatives.len());
        for (dim, derivative) in derivatives.iter().enumerate()
        {
            let partial = derivative * &self.theta;
            let scale = domain.derivative_scale(dim);
            for i in 0..num_points
            {
                gradient[(i, dim)] = partial[(i, 0)] * scale;
            }
        }
        gradient
    }

    ///
    /// Adjoint of fit-then-evaluate: `basis * B_U^-1 * B_L^-1`, computed as
    /// `(B_L^-T * (B_U^-T * basis^T))^T`.
    ///
    fn point_sensitivity_from_basis(&self, basis: &Mat<f64>) -> Result<Mat<f64>, SmolyakError>
    {
        let z = solve_factor(self.grid.b_upper().transpose(), basis.transpose().to_owned(), &self.options.solver)?;
        let w = solve_factor(self.grid.b_lower().transpose(), z, &self.options.solver)?;
        Ok(w.transpose().to_owned())
    }
}
