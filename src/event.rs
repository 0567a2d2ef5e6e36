//! Event detection: zero crossings of a user condition on accepted intervals.
//!
//! Before an accepted interval is committed, the condition is sampled at
//! evenly spaced positions inside the step via the dense interpolant. A sign
//! change brackets the crossing; bisection then locates the event time to
//! `root_tol`. The solve loop truncates the step there, records the
//! pre-event state, applies the reaction (which may resize the state), and
//! records the post-event state at the same time.

use bon::Builder;
use log::warn;

use crate::{
    Error, Float,
    dense::Segment,
    ode::Rhs,
    solution::Evals,
    tableau::Tableau,
};

/// Event zero-crossing direction filter.
/// - `All`: any sign change triggers.
/// - `Positive`: only negative -> nonnegative crossings.
/// - `Negative`: only positive -> nonpositive crossings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventDirection {
    All,
    Positive,
    Negative,
}

/// Configuration of one event: the scalar condition expected to change sign
/// at the event, and how to react when it does.
#[derive(Builder)]
pub struct EventSpec<'a> {
    /// Scalar condition `g(t, u)`; the event is a zero crossing of `g`.
    pub condition: &'a dyn Fn(Float, &[Float]) -> Float,
    /// Reaction applied at the event time. May mutate the state in place,
    /// including resizing it; stage buffers are resized in lockstep.
    pub reaction: Option<&'a mut dyn FnMut(Float, &mut Vec<Float>)>,
    /// Number of probe points strictly inside each interval.
    #[builder(default = 8)]
    pub interp_points: usize,
    /// Locate the crossing by bisection; when `false` the interval is
    /// truncated at the first bracketing sample instead.
    #[builder(default = true)]
    pub root_find: bool,
    /// Time tolerance for the located event.
    #[builder(default = 1e-12)]
    pub root_tol: Float,
    /// Factor applied to the next proposed step size after the event fires.
    #[builder(default = 1.0)]
    pub dt_damp: Float,
    #[builder(default = EventDirection::All)]
    pub direction: EventDirection,
}

impl EventSpec<'_> {
    fn crossed(&self, g_prev: Float, g: Float) -> bool {
        match self.direction {
            EventDirection::All => {
                (g_prev < 0.0 && g >= 0.0) || (g_prev > 0.0 && g <= 0.0)
            }
            EventDirection::Positive => g_prev < 0.0 && g >= 0.0,
            EventDirection::Negative => g_prev > 0.0 && g <= 0.0,
        }
    }
}

const MAX_BISECT: usize = 80;

/// Scan one accepted interval for a crossing of the event condition.
///
/// Returns the normalized position `theta` of the event, or `None` when the
/// interval passes. A root-find that fails to converge falls back to the
/// right bracketing sample and reports at warning level.
pub(crate) fn scan(
    spec: &EventSpec<'_>,
    seg: &Segment,
    tab: &Tableau,
    rhs: &Rhs<'_>,
    evals: &mut Evals,
) -> Result<Option<Float>, Error> {
    let m = spec.interp_points.max(1);
    let mut u = vec![0.0; seg.u0.len()];

    let mut theta_prev = 0.0;
    let mut g_prev = (spec.condition)(seg.t0, &seg.u0);

    for j in 1..=m + 1 {
        let theta = j as Float / (m + 1) as Float;
        let g = if j == m + 1 {
            // The right endpoint is known exactly; no interpolation needed.
            (spec.condition)(seg.t1, &seg.u1)
        } else {
            seg.eval_with(tab, rhs, evals, seg.t0 + theta * seg.h, &mut u)?;
            (spec.condition)(seg.t0 + theta * seg.h, &u)
        };

        if spec.crossed(g_prev, g) {
            if !spec.root_find {
                return Ok(Some(theta));
            }
            return locate(spec, seg, tab, rhs, evals, theta_prev, g_prev, theta).map(Some);
        }

        theta_prev = theta;
        g_prev = g;
    }

    Ok(None)
}

/// Bisection for the crossing position inside the bracket
/// `(theta_a, theta_b]` where the condition changes sign.
#[allow(clippy::too_many_arguments)]
fn locate(
    spec: &EventSpec<'_>,
    seg: &Segment,
    tab: &Tableau,
    rhs: &Rhs<'_>,
    evals: &mut Evals,
    mut theta_a: Float,
    mut g_a: Float,
    mut theta_b: Float,
) -> Result<Float, Error> {
    let mut u = vec![0.0; seg.u0.len()];
    for _ in 0..MAX_BISECT {
        if (theta_b - theta_a).abs() * seg.h.abs() <= spec.root_tol {
            // Commit the right side so the condition has crossed at the
            // recorded point.
            return Ok(theta_b);
        }
        let theta_m = 0.5 * (theta_a + theta_b);
        seg.eval_with(tab, rhs, evals, seg.t0 + theta_m * seg.h, &mut u)?;
        let g_m = (spec.condition)(seg.t0 + theta_m * seg.h, &u);
        if spec.crossed(g_a, g_m) {
            theta_b = theta_m;
        } else {
            theta_a = theta_m;
            g_a = g_m;
        }
    }
    let err = Error::EventRootFindFailure {
        max_iters: MAX_BISECT,
    };
    warn!("{err}; falling back to the bracketing sample at theta = {theta_b}");
    Ok(theta_b)
}
