//! The accumulated result of a numerical integration.

use std::collections::BTreeMap;

use crate::{
    Error, Float,
    dense::{ContinuousOutput, Segment},
    status::Status,
    tableau::Tableau,
};

/// Derivative evaluation counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct Evals {
    /// Right-hand-side (drift) evaluations.
    pub rhs: usize,
    /// Diffusion evaluations (SDE only).
    pub diffusion: usize,
}

/// Step counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct Steps {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// Error metrics computed against a known (or substituted) true solution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorKind {
    /// Mean absolute error at the final point.
    Final,
    /// Max absolute error over the stored timeseries.
    LinfSteps,
    /// Root-mean-square error over the stored timeseries.
    L2Steps,
    /// Max absolute error of the dense interpolant on an even time grid.
    LinfDense,
    /// Root-mean-square error of the dense interpolant on an even time grid.
    L2Dense,
}

/// Number of evenly spaced query points used for the dense error metrics.
const DENSE_ERROR_POINTS: usize = 100;

/// Accumulated output of an integration run.
///
/// Holds the recorded `(t, u)` history, the final point, optional dense
/// output, run statistics, the terminal [`Status`], and — once
/// [`compute_errors`](Self::compute_errors) ran — a map of error metrics.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Recorded abscissas.
    pub t: Vec<Float>,
    /// Recorded states, one per abscissa.
    pub u: Vec<Vec<Float>>,
    /// Error metrics; empty until computed against a true solution.
    pub errors: BTreeMap<ErrorKind, Float>,
    pub status: Status,
    pub evals: Evals,
    pub steps: Steps,
    dense: Option<ContinuousOutput>,
    tableau: &'static Tableau,
    save_timeseries: bool,
    timeseries_steps: usize,
    accepted_since_record: usize,
    t_final: Float,
    u_final: Vec<Float>,
}

impl Solution {
    pub(crate) fn new(
        tableau: &'static Tableau,
        dense: bool,
        save_timeseries: bool,
        timeseries_steps: usize,
    ) -> Self {
        Self {
            t: Vec::new(),
            u: Vec::new(),
            errors: BTreeMap::new(),
            status: Status::Success,
            evals: Evals::default(),
            steps: Steps::default(),
            dense: dense.then(ContinuousOutput::default),
            tableau,
            save_timeseries,
            timeseries_steps: timeseries_steps.max(1),
            accepted_since_record: 0,
            t_final: 0.0,
            u_final: Vec::new(),
        }
    }

    /// Record an accepted step endpoint, honoring the retention policy:
    /// with `save_timeseries = false` only the latest point is kept, and
    /// `timeseries_steps = n` keeps every n-th accepted step.
    pub(crate) fn record(&mut self, t: Float, u: &[Float]) {
        self.t_final = t;
        self.u_final = u.to_vec();

        if !self.save_timeseries {
            self.t.clear();
            self.u.clear();
            self.t.push(t);
            self.u.push(u.to_vec());
            return;
        }

        self.accepted_since_record += 1;
        if self.accepted_since_record >= self.timeseries_steps {
            self.accepted_since_record = 0;
            self.t.push(t);
            self.u.push(u.to_vec());
        }
    }

    /// Record a point unconditionally (initial point, event points,
    /// `save_at` samples, final point).
    pub(crate) fn record_forced(&mut self, t: Float, u: &[Float]) {
        self.t_final = t;
        self.u_final = u.to_vec();
        if !self.save_timeseries {
            self.t.clear();
            self.u.clear();
        }
        self.t.push(t);
        self.u.push(u.to_vec());
    }

    /// Track the integration endpoint even when the retention policy (or
    /// `save_at`) skipped recording it as a point.
    pub(crate) fn set_final(&mut self, t: Float, u: &[Float]) {
        self.t_final = t;
        self.u_final = u.to_vec();
    }

    pub(crate) fn push_segment(&mut self, seg: Segment) {
        if let Some(dense) = self.dense.as_mut() {
            if self.save_timeseries {
                dense.push(seg);
            } else {
                dense.push_replacing(seg);
            }
        }
    }

    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Final abscissa reached by the integration.
    pub fn tf(&self) -> Float {
        self.t_final
    }

    /// Final state reached by the integration.
    pub fn uf(&self) -> &[Float] {
        &self.u_final
    }

    /// The i-th recorded `(t, u)` pair.
    pub fn at(&self, index: usize) -> Result<(Float, &[Float]), Error> {
        if index >= self.t.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.t.len(),
            });
        }
        Ok((self.t[index], &self.u[index]))
    }

    /// Dense-output query: interpolate `u(t)` within a stored interval.
    /// Fails with [`Error::NoDenseOutput`] when dense output was disabled
    /// or `t` lies outside every stored interval.
    pub fn query(&self, t: Float) -> Result<Vec<Float>, Error> {
        let dense = self.dense.as_ref().ok_or(Error::NoDenseOutput)?;
        dense
            .evaluate(self.tableau, t)
            .ok_or(Error::NoDenseOutput)
    }

    /// Evaluate the solution as a function of time: dense-interpolated when
    /// available, otherwise the nearest recorded state.
    pub fn eval(&self, t: Float) -> Vec<Float> {
        if let Some(dense) = self.dense.as_ref() {
            if let Some(u) = dense.evaluate(self.tableau, t) {
                return u;
            }
        }
        // Nearest recorded point.
        let mut best = 0;
        let mut best_dist = Float::INFINITY;
        for (i, &ti) in self.t.iter().enumerate() {
            let d = (ti - t).abs();
            if d < best_dist {
                best_dist = d;
                best = i;
            }
        }
        self.u.get(best).cloned().unwrap_or_else(|| self.u_final.clone())
    }

    /// The piecewise dense output, when enabled.
    pub fn continuous(&self) -> Option<&ContinuousOutput> {
        self.dense.as_ref()
    }

    /// Iterate over stored `(t, u)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Float, &[Float])> {
        self.t
            .iter()
            .copied()
            .zip(self.u.iter().map(|u| u.as_slice()))
    }

    /// Compute the error map against a true solution `truth(t)`.
    ///
    /// Always yields [`ErrorKind::Final`]; the pointwise metrics when more
    /// than one point was stored; the dense metrics when dense output is
    /// enabled (sampled on an even grid of 100 points across the horizon).
    pub fn compute_errors(&mut self, truth: impl Fn(Float) -> Vec<Float>) {
        self.errors.clear();

        let exact = truth(self.t_final);
        let final_err = mean_abs_diff(&self.u_final, &exact);
        self.errors.insert(ErrorKind::Final, final_err);

        if self.t.len() > 1 {
            let mut max: Float = 0.0;
            let mut sq_sum = 0.0;
            let mut count = 0usize;
            for (t, u) in self.iter() {
                let exact = truth(t);
                for (a, b) in u.iter().zip(exact.iter()) {
                    let d = (a - b).abs();
                    if d > max {
                        max = d;
                    }
                    sq_sum += d * d;
                    count += 1;
                }
            }
            self.errors.insert(ErrorKind::LinfSteps, max);
            self.errors
                .insert(ErrorKind::L2Steps, (sq_sum / count as Float).sqrt());
        }

        if let Some(dense) = self.dense.as_ref() {
            if let Some((t0, t1)) = dense.t_span() {
                let mut max: Float = 0.0;
                let mut sq_sum = 0.0;
                let mut count = 0usize;
                for i in 0..DENSE_ERROR_POINTS {
                    let t = t0 + (t1 - t0) * i as Float / (DENSE_ERROR_POINTS - 1) as Float;
                    let Some(u) = dense.evaluate(self.tableau, t) else {
                        continue;
                    };
                    let exact = truth(t);
                    for (a, b) in u.iter().zip(exact.iter()) {
                        let d = (a - b).abs();
                        if d > max {
                            max = d;
                        }
                        sq_sum += d * d;
                        count += 1;
                    }
                }
                if count > 0 {
                    self.errors.insert(ErrorKind::LinfDense, max);
                    self.errors
                        .insert(ErrorKind::L2Dense, (sq_sum / count as Float).sqrt());
                }
            }
        }
    }

    /// Approximate-true mode: compute the error map against a second,
    /// more accurate solution standing in for the analytic one. The
    /// reference must carry dense output.
    pub fn compute_errors_against(&mut self, reference: &Solution) -> Result<(), Error> {
        if reference.dense.is_none() {
            return Err(Error::NoDenseOutput);
        }
        self.compute_errors(|t| reference.eval(t));
        Ok(())
    }
}

impl std::ops::Index<usize> for Solution {
    type Output = [Float];

    fn index(&self, index: usize) -> &Self::Output {
        &self.u[index]
    }
}

fn mean_abs_diff(a: &[Float], b: &[Float]) -> Float {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        sum += (a[i] - b[i]).abs();
    }
    sum / n as Float
}
