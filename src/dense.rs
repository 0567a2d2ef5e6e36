//! Continuous (dense) output over accepted intervals.
//!
//! Each accepted step leaves behind a [`Segment`]: the interval endpoints,
//! their derivatives, and the stage derivatives of the step. Evaluation goes
//! through the tableau's [`DenseRule`] — the native stage-weight polynomial
//! in the normalized position `theta`, or a cubic Hermite fallback. Extra
//! stage derivatives a native rule may declare are computed only on the
//! first query that lands in the segment and memoized for later queries.

use std::cell::RefCell;

use crate::{
    Error, Float,
    ode::Rhs,
    solution::Evals,
    tableau::{DenseRule, Tableau},
};

/// Dense-output data for one accepted interval.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Left endpoint time.
    pub t0: Float,
    /// Step size the interpolating polynomial was built over. When an event
    /// truncated the step, the segment covers only `[t0, t1]` but `theta` is
    /// still measured against this original step.
    pub h: Float,
    /// Right edge of validity (`t0 + h` unless truncated by an event).
    pub t1: Float,
    /// State at `t0`.
    pub u0: Vec<Float>,
    /// State at `t1`.
    pub u1: Vec<Float>,
    /// Derivative at `t0`.
    pub k0: Vec<Float>,
    /// Derivative at `t1`.
    pub k1: Vec<Float>,
    /// Stage derivatives of the step, in tableau order. Empty for methods
    /// interpolated by the Hermite fallback.
    pub stages: Vec<Vec<Float>>,
    /// Lazily evaluated extra interpolation stages.
    extra: RefCell<Vec<Vec<Float>>>,
}

impl Segment {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        t0: Float,
        h: Float,
        t1: Float,
        u0: Vec<Float>,
        u1: Vec<Float>,
        k0: Vec<Float>,
        k1: Vec<Float>,
        stages: Vec<Vec<Float>>,
    ) -> Self {
        Self {
            t0,
            h,
            t1,
            u0,
            u1,
            k0,
            k1,
            stages,
            extra: RefCell::new(Vec::new()),
        }
    }

    /// Whether `t` lies inside the covered interval (either direction).
    pub fn contains(&self, t: Float) -> bool {
        let left = self.t0.min(self.t1);
        let right = self.t0.max(self.t1);
        t >= left && t <= right
    }

    /// Interpolate the solution at time `t` into `out`.
    ///
    /// Falls back to Hermite when the native rule declares extra stages that
    /// were never resolved (no right-hand side is available after the run);
    /// both constructions reproduce the endpoints exactly.
    pub fn eval(&self, tab: &Tableau, t: Float, out: &mut [Float]) {
        match &tab.dense {
            DenseRule::Hermite => self.hermite(t, out),
            DenseRule::Poly(poly) => {
                if poly.extra.is_empty() {
                    self.poly(tab, t, out);
                } else {
                    let resolved = !self.extra.borrow().is_empty();
                    if resolved {
                        self.poly(tab, t, out);
                    } else {
                        self.hermite(t, out);
                    }
                }
            }
        }
    }

    /// Interpolate with access to the right-hand side, resolving and caching
    /// any extra interpolation stages on first use.
    pub(crate) fn eval_with(
        &self,
        tab: &Tableau,
        rhs: &Rhs<'_>,
        evals: &mut Evals,
        t: Float,
        out: &mut [Float],
    ) -> Result<(), Error> {
        if let DenseRule::Poly(poly) = &tab.dense {
            if !poly.extra.is_empty() && self.extra.borrow().is_empty() {
                self.resolve_extra(tab, rhs, evals)?;
            }
            self.poly(tab, t, out);
            return Ok(());
        }
        self.hermite(t, out);
        Ok(())
    }

    fn resolve_extra(&self, tab: &Tableau, rhs: &Rhs<'_>, evals: &mut Evals) -> Result<(), Error> {
        let DenseRule::Poly(poly) = &tab.dense else {
            return Ok(());
        };
        let n = self.u0.len();
        let mut extra: Vec<Vec<Float>> = Vec::with_capacity(poly.extra.len());
        let mut u_stage = vec![0.0; n];
        for row in poly.extra {
            for j in 0..n {
                let mut acc = 0.0;
                for (m, &a) in row.a.iter().enumerate() {
                    let k = if m < self.stages.len() {
                        &self.stages[m]
                    } else {
                        &extra[m - self.stages.len()]
                    };
                    acc += a * k[j];
                }
                u_stage[j] = self.u0[j] + self.h * acc;
            }
            let mut k = vec![0.0; n];
            rhs.eval(self.t0 + row.c * self.h, &u_stage, &mut k)?;
            evals.rhs += 1;
            extra.push(k);
        }
        *self.extra.borrow_mut() = extra;
        Ok(())
    }

    /// Native stage-weight polynomial in `theta = (t - t0) / h`.
    fn poly(&self, tab: &Tableau, t: Float, out: &mut [Float]) {
        let DenseRule::Poly(poly) = &tab.dense else {
            unreachable!("poly evaluation requires a native dense rule");
        };
        let theta = (t - self.t0) / self.h;
        let extra = self.extra.borrow();
        for (j, o) in out.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (i, w) in poly.weights.iter().enumerate() {
                // w_i(theta) with ascending powers theta^1, theta^2, ...
                let mut wi = 0.0;
                let mut th = theta;
                for &c in w.iter() {
                    wi += c * th;
                    th *= theta;
                }
                let k = if i < self.stages.len() {
                    &self.stages[i]
                } else {
                    &extra[i - self.stages.len()]
                };
                acc += wi * k[j];
            }
            *o = self.u0[j] + self.h * acc;
        }
    }

    /// Cubic Hermite interpolation from the endpoint states and derivatives.
    fn hermite(&self, t: Float, out: &mut [Float]) {
        let h = self.t1 - self.t0;
        let s = (t - self.t0) / h;
        let s2 = s * s;
        let s3 = s2 * s;

        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        for j in 0..out.len() {
            out[j] = h00 * self.u0[j]
                + h10 * h * self.k0[j]
                + h01 * self.u1[j]
                + h11 * h * self.k1[j];
        }
    }
}

/// Piecewise dense output over all accepted steps of a run.
#[derive(Debug, Clone, Default)]
pub struct ContinuousOutput {
    segments: Vec<Segment>,
}

impl ContinuousOutput {
    pub(crate) fn push(&mut self, seg: Segment) {
        self.segments.push(seg);
    }

    /// Keep only the most recent segment (save_timeseries = false policy).
    pub(crate) fn push_replacing(&mut self, seg: Segment) {
        self.segments.clear();
        self.segments.push(seg);
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Domain covered by the dense output.
    pub fn t_span(&self) -> Option<(Float, Float)> {
        let first = self.segments.first()?;
        let last = self.segments.last()?;
        Some((first.t0, last.t1))
    }

    pub(crate) fn find(&self, t: Float) -> Option<&Segment> {
        self.segments.iter().find(|seg| seg.contains(t))
    }

    /// Interpolate `u(t)` if `t` lies within a recorded interval.
    pub fn evaluate(&self, tab: &Tableau, t: Float) -> Option<Vec<Float>> {
        let seg = self.find(t)?;
        let mut out = vec![0.0; seg.u1.len()];
        seg.eval(tab, t, &mut out);
        Some(out)
    }

    /// Batch-evaluate at many times; `None` for points outside coverage.
    pub fn evaluate_many(&self, tab: &Tableau, ts: &[Float]) -> Vec<Option<Vec<Float>>> {
        ts.iter().map(|&t| self.evaluate(tab, t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tableau::{DenseRule, ExtraStage, PolyDense, Tableau, DOPRI5};

    fn segment_for_decay() -> Segment {
        // One DOPRI5-shaped interval of u' = -u is enough to probe endpoint
        // exactness; stage values here come from a hand-stepped tableau.
        let rhs = |_t: Float, u: &[Float], du: &mut [Float]| du[0] = -u[0];
        let mut stepper = crate::stepper::Stepper::new(&DOPRI5, 1);
        let mut evals = Evals::default();
        stepper
            .step(
                &Rhs::InPlace(&rhs),
                0.0,
                &[1.0],
                0.25,
                &crate::Tolerance::Scalar(1e-10),
                &crate::Tolerance::Scalar(1e-10),
                &mut evals,
            )
            .unwrap();
        let u1 = stepper.u_next.clone();
        let k1 = stepper.k.last().unwrap().clone();
        Segment::new(
            0.0,
            0.25,
            0.25,
            vec![1.0],
            u1,
            stepper.k[0].clone(),
            k1,
            stepper.k.clone(),
        )
    }

    #[test]
    fn native_polynomial_reproduces_endpoints() {
        let seg = segment_for_decay();
        let mut out = [0.0];
        seg.eval(&DOPRI5, 0.0, &mut out);
        assert!((out[0] - seg.u0[0]).abs() < 1e-14);
        seg.eval(&DOPRI5, 0.25, &mut out);
        assert!((out[0] - seg.u1[0]).abs() < 1e-14);
    }

    #[test]
    fn native_polynomial_is_accurate_inside_the_interval() {
        let seg = segment_for_decay();
        let mut out = [0.0];
        // Interpolation error is O(h^5); at h = 0.25 that is a few 1e-7.
        for &t in &[0.05, 0.1, 0.2] {
            seg.eval(&DOPRI5, t, &mut out);
            assert!((out[0] - (-t).exp()).abs() < 1e-6, "t = {}", t);
        }
    }

    // An Euler tableau with a quadratic interpolant needing a lazily
    // evaluated midpoint derivative: u(theta) = u0 + h*theta^2*k1
    // + h*(theta - theta^2)*k_mid reproduces both endpoints and exercises
    // the memoized extra-stage path.
    static LAZY_W1: [Float; 2] = [0.0, 1.0];
    static LAZY_W2: [Float; 2] = [1.0, -1.0];
    static LAZY_WEIGHTS: [&[Float]; 2] = [&LAZY_W1, &LAZY_W2];
    static LAZY_MID: [Float; 1] = [0.5];
    static LAZY_EXTRA: [ExtraStage; 1] = [ExtraStage { c: 0.5, a: &LAZY_MID }];
    static LAZY_POLY: PolyDense = PolyDense {
        weights: &LAZY_WEIGHTS,
        extra: &LAZY_EXTRA,
    };
    static LAZY_EULER: Tableau = Tableau {
        name: "LazyEuler",
        order: 1,
        stages: 1,
        a: &[&[]],
        c: &[0.0],
        b: &[1.0],
        e: None,
        fsal: false,
        dense: DenseRule::Poly(&LAZY_POLY),
    };

    #[test]
    fn extra_stages_are_resolved_lazily_and_cached() {
        let rhs_fn = |_t: Float, u: &[Float], du: &mut [Float]| du[0] = -u[0];
        let rhs = Rhs::InPlace(&rhs_fn);
        let h = 0.1;
        let u1 = vec![1.0 - h];
        let seg = Segment::new(
            0.0,
            h,
            h,
            vec![1.0],
            u1.clone(),
            vec![-1.0],
            vec![-u1[0]],
            vec![vec![-1.0]],
        );

        let mut evals = Evals::default();
        let mut out = [0.0];
        seg.eval_with(&LAZY_EULER, &rhs, &mut evals, 0.05, &mut out)
            .unwrap();
        assert_eq!(evals.rhs, 1, "midpoint stage evaluated on first query");

        // Second query in the same segment must reuse the cached stage.
        seg.eval_with(&LAZY_EULER, &rhs, &mut evals, 0.02, &mut out)
            .unwrap();
        assert_eq!(evals.rhs, 1);

        // Endpoint exactness still holds for the extended polynomial.
        seg.eval_with(&LAZY_EULER, &rhs, &mut evals, 0.0, &mut out)
            .unwrap();
        assert!((out[0] - 1.0).abs() < 1e-14);
        seg.eval_with(&LAZY_EULER, &rhs, &mut evals, h, &mut out)
            .unwrap();
        assert!((out[0] - u1[0]).abs() < 1e-14);
    }

    #[test]
    fn hermite_fallback_reproduces_endpoints() {
        let u1 = (-0.1_f64).exp();
        let seg = Segment::new(
            0.0,
            0.1,
            0.1,
            vec![1.0],
            vec![u1],
            vec![-1.0],
            vec![-u1],
            Vec::new(),
        );
        let mut out = [0.0];
        seg.hermite(0.0, &mut out);
        assert!((out[0] - 1.0).abs() < 1e-14);
        seg.hermite(0.1, &mut out);
        assert!((out[0] - u1).abs() < 1e-14);
        seg.hermite(0.05, &mut out);
        assert!((out[0] - (-0.05_f64).exp()).abs() < 1e-6);
    }
}
