//! Options and method selection for the solve entry points.

use bon::Builder;

use crate::{
    Float,
    callback::Callback,
    event::EventSpec,
    tableau::{self, Tableau},
    tolerance::Tolerance,
};

/// Deterministic method selection; resolves a [`Tableau`] registry entry at
/// configuration time, never inside the step loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// Explicit Euler (order 1, fixed-step).
    Euler,
    /// Classic fixed-step RK4.
    Rk4,
    /// Bogacki-Shampine 3(2) adaptive RK.
    Bs23,
    /// Dormand-Prince 5(4) adaptive RK.
    Dopri5,
}

impl Method {
    pub fn tableau(self) -> &'static Tableau {
        match self {
            Method::Euler => &tableau::EULER,
            Method::Rk4 => &tableau::RK4,
            Method::Bs23 => &tableau::BS23,
            Method::Dopri5 => &tableau::DOPRI5,
        }
    }
}

/// Fixed-step stochastic method selection.
///
/// The two methods solve different interpretations of the same
/// drift/diffusion pair: Euler-Maruyama converges to the Ito solution,
/// stochastic Heun to the Stratonovich one. For additive noise the two
/// coincide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SdeMethod {
    /// Euler-Maruyama, Ito interpretation (strong order 0.5).
    EulerMaruyama,
    /// Predictor-corrector stochastic Heun, Stratonovich interpretation
    /// (strong order 1.0 for commutative noise).
    Heun,
}

/// Options for the solve entry points.
#[derive(Builder)]
pub struct SolveOptions<'a> {
    /// Method to use. Default: Dormand-Prince 5(4).
    #[builder(default = Method::Dopri5)]
    pub method: Method,
    /// Stochastic method for `solve_sde`. Default: Euler-Maruyama.
    #[builder(default = SdeMethod::EulerMaruyama)]
    pub sde_method: SdeMethod,
    /// Adaptive step-size control. Ignored (treated as fixed-step) when the
    /// method carries no embedded error estimate.
    #[builder(default = true)]
    pub adaptive: bool,
    /// Relative tolerance for error estimation.
    #[builder(default = 1e-6, into)]
    pub rtol: Tolerance,
    /// Absolute tolerance for error estimation.
    #[builder(default = 1e-6, into)]
    pub atol: Tolerance,
    /// Initial step size (fixed step size when `adaptive` is off). A
    /// heuristic guess is used if absent.
    pub dt: Option<Float>,
    /// Minimum step size; the run fails with `Status::StepSizeTooSmall`
    /// when the controller proposes less.
    pub dt_min: Option<Float>,
    /// Maximum step size. Defaults to the span width.
    pub dt_max: Option<Float>,
    /// Maximum number of step attempts (accepted plus rejected).
    #[builder(default = 100_000)]
    pub max_iters: usize,
    /// Safety (risk) factor in step-size prediction.
    #[builder(default = 0.9)]
    pub safety: Float,
    /// Step ratio bounds: `scale_min <= dt_new/dt_old <= scale_max`.
    #[builder(default = 0.2)]
    pub scale_min: Float,
    #[builder(default = 10.0)]
    pub scale_max: Float,
    /// Lund stabilization parameter for the PI step-size law. `0.0` gives
    /// the plain error-ratio rule; values up to `0.2` are accepted.
    #[builder(default = 0.0)]
    pub beta: Float,
    /// Keep dense-output segments for continuous interpolation.
    #[builder(default = false)]
    pub dense: bool,
    /// Explicit query times interpolated into the record. When set, step
    /// endpoints are no longer recorded by themselves.
    pub save_at: Option<Vec<Float>>,
    /// Retain the full timeseries; when `false` only the final point (and
    /// the last dense segment) is kept.
    #[builder(default = true)]
    pub save_timeseries: bool,
    /// Record every n-th accepted step.
    #[builder(default = 1)]
    pub timeseries_steps: usize,
    /// Event detection on each accepted interval.
    pub event: Option<EventSpec<'a>>,
    /// Observer hooks invoked as the integration progresses.
    pub callback: Option<&'a mut dyn Callback>,
    /// RNG seed for stochastic methods.
    #[builder(default = 0)]
    pub seed: u64,
}
