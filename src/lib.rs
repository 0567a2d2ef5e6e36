//! A library of adaptive explicit Runge-Kutta methods for solving initial
//! value problems (IVPs) for ordinary and stochastic differential equations.
//!
//! The integration engine is tableau-driven: every one-step method is
//! described by an immutable coefficient table ([`Tableau`]) which plugs into
//! a single generic stepper, step-size controller, and dense-output
//! interpolant. An event layer inspects every accepted interval for
//! user-defined zero crossings and can truncate the step, mutate the state,
//! and resume.

mod callback;
mod controller;
mod dense;
mod ensemble;
mod error;
mod event;
mod hinit;
mod ode;
mod options;
mod problem;
mod sde;
mod solution;
mod solve;
mod status;
mod stepper;
mod tableau;
mod tolerance;

pub mod prelude;

pub use callback::{Callback, ControlFlag, StepInfo};
pub use dense::{ContinuousOutput, Segment};
pub use ensemble::solve_ensemble;
pub use error::Error;
pub use event::{EventDirection, EventSpec};
pub use ode::{Ode, Rhs, Sde};
pub use options::{Method, SdeMethod, SolveOptions};
pub use problem::{OdeProblem, SdeProblem};
pub use sde::solve_sde;
pub use solution::{ErrorKind, Evals, Solution, Steps};
pub use solve::solve;
pub use status::Status;
pub use tableau::{DenseRule, ExtraStage, PolyDense, Tableau};
pub use tolerance::Tolerance;

// Prevent selecting two incompatible float precision features at once.
#[cfg(all(feature = "f32", feature = "f64"))]
compile_error!(
    "features 'f32' and 'f64' cannot both be enabled; pick exactly one Float precision feature"
);

/// Change this to f64 or f32 via the crate features as desired.
#[cfg(feature = "f32")]
pub type Float = f32;
#[cfg(feature = "f64")]
pub type Float = f64;
