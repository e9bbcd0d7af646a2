use std::fmt::Display;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SmolyakError
{
    /// Query points do not have one column per grid dimension.
    DimensionMismatch { expected: usize, found: usize },
    /// A factor matrix is singular or too ill-conditioned to solve against.
    SingularMatrix,
    NumberOfPointsAndValuesMismatch,
    NonSquareFactor,
    BasisShapeMismatch,
    /// Gradients are only defined for a single column of samples.
    MultipleRightHandSides,
    OutOfDomain,
    /// Samples on the grid contain NaN or infinite entries.
    NonFiniteValues,
    /// Domain bounds differ in length or some `upper <= lower`.
    InvalidBounds,
}
impl std::error::Error for SmolyakError {}

impl Display for SmolyakError
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self
        {
            SmolyakError::DimensionMismatch { expected, found } =>
                write!(f, "DimensionMismatch: expected {expected} columns, found {found}"),
            _ => write!(f, "{:?}", *self),
        }
    }
}

#[test]
fn check_error_display()
{
    let err = SmolyakError::DimensionMismatch { expected: 2, found: 3 };
    assert_eq!(err.to_string(), "DimensionMismatch: expected 2 columns, found 3");
    assert_eq!(SmolyakError::SingularMatrix.to_string(), "SingularMatrix");
    assert_eq!(SmolyakError::NonFiniteValues.to_string(), "NonFiniteValues");
}
