//! Commonly used items, for glob import:
//!
//! ```ignore
//! use ivpkit::prelude::*;
//! ```

pub use crate::{
    Callback, ControlFlag, Error, ErrorKind, Evals, EventDirection, EventSpec, Float, Method,
    Ode, OdeProblem, Sde, SdeMethod, SdeProblem, Solution, SolveOptions, Status, StepInfo,
    Steps, Tolerance, solve, solve_ensemble, solve_sde,
};
