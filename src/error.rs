//! Errors for integration methods

use thiserror::Error;

use crate::Float;

/// Errors surfaced by the solvers and the solution container.
///
/// Configuration validation errors are returned by the `solve` entry points
/// before the integration loop starts. `DimensionMismatch` is fatal and
/// surfaced immediately; step-size underflow and iteration exhaustion are
/// reported through [`crate::Status`] on the partial solution instead, so
/// that already-accumulated data is still returned to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("right-hand side produced {got} components but the state has {expected}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("event root-finding did not converge within {max_iters} bisection iterations")]
    EventRootFindFailure { max_iters: usize },
    #[error("dense output was not enabled for this solution")]
    NoDenseOutput,
    #[error("index {index} is out of range for a solution of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("max_iters must be positive (got {0})")]
    MaxItersMustBePositive(usize),
    #[error("safety factor must be in (1e-4, 1.0) (got {0})")]
    SafetyFactorOutOfRange(Float),
    #[error("beta must be <= 0.2 (got {0})")]
    BetaTooLarge(Float),
    #[error("scale factors must satisfy 0 < scale_min < scale_max (got {0} and {1})")]
    InvalidScaleFactors(Float, Float),
    #[error("step size dt must be nonzero and finite (got {0})")]
    InvalidStepSize(Float),
    #[error("time span must be nondegenerate (got t0 = {0}, tend = {1})")]
    InvalidTimeSpan(Float, Float),
}
