//! Problem descriptors bundling the system, initial state, and an optional
//! analytic solution for error computation.

use crate::{
    Float,
    ode::{Ode, Rhs, Sde},
};

/// An ODE initial value problem `u' = f(t, u)`, `u(t0) = u0`.
pub struct OdeProblem<'a> {
    pub(crate) rhs: Rhs<'a>,
    pub u0: Vec<Float>,
    /// Known analytic solution `u(t)` given the initial state, used to fill
    /// the solution's error map.
    pub analytic: Option<&'a dyn Fn(Float, &[Float]) -> Vec<Float>>,
}

impl<'a> OdeProblem<'a> {
    /// Problem from a buffer-writing right-hand side (preferred contract).
    pub fn new(f: &'a dyn Ode, u0: impl Into<Vec<Float>>) -> Self {
        Self {
            rhs: Rhs::InPlace(f),
            u0: u0.into(),
            analytic: None,
        }
    }

    /// Problem from an allocating right-hand side `f(t, u) -> Vec`; the
    /// adapter checks the output shape on every evaluation.
    pub fn from_fn(
        f: &'a dyn Fn(Float, &[Float]) -> Vec<Float>,
        u0: impl Into<Vec<Float>>,
    ) -> Self {
        Self {
            rhs: Rhs::Allocating(f),
            u0: u0.into(),
            analytic: None,
        }
    }

    /// Scalar problem: a single-component state.
    pub fn scalar(f: &'a dyn Ode, u0: Float) -> Self {
        Self::new(f, vec![u0])
    }

    /// Attach a known analytic solution `(t, u0) -> u(t)`.
    pub fn with_analytic(mut self, analytic: &'a dyn Fn(Float, &[Float]) -> Vec<Float>) -> Self {
        self.analytic = Some(analytic);
        self
    }
}

/// An SDE initial value problem
/// `du = drift(t, u) dt + diffusion(t, u) dW`, `u(t0) = u0`.
pub struct SdeProblem<'a, S: Sde> {
    pub system: &'a S,
    pub u0: Vec<Float>,
    /// Known strong solution `u(t)` given the initial state and the
    /// accumulated Wiener path `W(t)` (one component per state component).
    /// `Sync` so a problem can be shared across ensemble workers.
    pub analytic: Option<&'a (dyn Fn(Float, &[Float], &[Float]) -> Vec<Float> + Sync)>,
}

impl<'a, S: Sde> SdeProblem<'a, S> {
    pub fn new(system: &'a S, u0: impl Into<Vec<Float>>) -> Self {
        Self {
            system,
            u0: u0.into(),
            analytic: None,
        }
    }

    /// Attach a known strong solution `(t, u0, W) -> u(t)`.
    pub fn with_analytic(
        mut self,
        analytic: &'a (dyn Fn(Float, &[Float], &[Float]) -> Vec<Float> + Sync),
    ) -> Self {
        self.analytic = Some(analytic);
        self
    }
}
