//! Generic tableau-driven explicit Runge-Kutta step.

use crate::{
    Error, Float,
    ode::Rhs,
    solution::Evals,
    tableau::Tableau,
    tolerance::Tolerance,
};

/// One-step workhorse: computes stage derivatives, the tentative next state,
/// and the embedded error estimate for any explicit [`Tableau`].
///
/// Owns the stage buffers so the hot loop never allocates; the event layer
/// resizes them in lockstep when a reaction changes the state length.
pub(crate) struct Stepper {
    tab: &'static Tableau,
    /// Stage derivatives of the current (tentative) step.
    pub k: Vec<Vec<Float>>,
    /// Tentative next state written by [`step`](Self::step).
    pub u_next: Vec<Float>,
    u_stage: Vec<Float>,
    k0_ready: bool,
}

impl Stepper {
    pub fn new(tab: &'static Tableau, n: usize) -> Self {
        Self {
            tab,
            k: vec![vec![0.0; n]; tab.stages],
            u_next: vec![0.0; n],
            u_stage: vec![0.0; n],
            k0_ready: false,
        }
    }

    /// Resize every stage buffer after an event reaction changed the state
    /// length. Invalidates any reusable first stage.
    pub fn resize(&mut self, n: usize) {
        for k in &mut self.k {
            k.resize(n, 0.0);
        }
        self.u_next.resize(n, 0.0);
        self.u_stage.resize(n, 0.0);
        self.k0_ready = false;
    }

    /// Install a known derivative at the current `(t, u)` as the first stage,
    /// saving one evaluation on the next step.
    pub fn seed_first(&mut self, k: &[Float]) {
        self.k[0].copy_from_slice(k);
        self.k0_ready = true;
    }

    /// Forget the cached first stage (state was modified externally).
    pub fn invalidate_first(&mut self) {
        self.k0_ready = false;
    }

    /// Hand the final stage to the next step (first-same-as-last reuse).
    pub fn propagate_fsal(&mut self) {
        if self.tab.fsal {
            let last = self.tab.stages - 1;
            let (head, tail) = self.k.split_at_mut(last);
            head[0].copy_from_slice(&tail[0]);
            self.k0_ready = true;
        } else {
            self.k0_ready = false;
        }
    }

    /// Compute one tentative step of size `dt` from `(t, u)`.
    ///
    /// On return `self.u_next` holds the proposed state and `self.k` the
    /// stage derivatives. The result is the scaled root-mean-square error
    /// norm of the embedded estimate, or `0.0` for a method without one
    /// (fixed-step: no rejection possible). After the call the first stage
    /// remains valid at `(t, u)`, so a rejected step re-steps for free.
    pub fn step(
        &mut self,
        rhs: &Rhs<'_>,
        t: Float,
        u: &[Float],
        dt: Float,
        atol: &Tolerance,
        rtol: &Tolerance,
        evals: &mut Evals,
    ) -> Result<Float, Error> {
        let s = self.tab.stages;
        let n = u.len();

        if !self.k0_ready {
            rhs.eval(t, u, &mut self.k[0])?;
            evals.rhs += 1;
            self.k0_ready = true;
        }

        for i in 1..s {
            let row = self.tab.a[i];
            for j in 0..n {
                let mut acc = 0.0;
                for (m, &a) in row.iter().enumerate() {
                    acc += a * self.k[m][j];
                }
                self.u_stage[j] = u[j] + dt * acc;
            }
            rhs.eval(t + self.tab.c[i] * dt, &self.u_stage, &mut self.k[i])?;
            evals.rhs += 1;
        }

        for j in 0..n {
            let mut acc = 0.0;
            for (i, &b) in self.tab.b.iter().enumerate() {
                acc += b * self.k[i][j];
            }
            self.u_next[j] = u[j] + dt * acc;
        }

        let Some(e) = self.tab.e else {
            return Ok(0.0);
        };

        let mut err = 0.0;
        for j in 0..n {
            let mut acc = 0.0;
            for (i, &ei) in e.iter().enumerate() {
                acc += ei * self.k[i][j];
            }
            let sk = atol[j] + rtol[j] * u[j].abs().max(self.u_next[j].abs());
            let q = dt * acc / sk;
            err += q * q;
        }
        Ok((err / n as Float).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tableau::{DOPRI5, RK4};

    fn decay(_t: Float, u: &[Float], du: &mut [Float]) {
        du[0] = -u[0];
    }

    #[test]
    fn rk4_single_step_matches_taylor_series() {
        let mut stepper = Stepper::new(&RK4, 1);
        let mut evals = Evals::default();
        let err = stepper
            .step(
                &Rhs::InPlace(&decay),
                0.0,
                &[1.0],
                0.1,
                &Tolerance::Scalar(1e-6),
                &Tolerance::Scalar(1e-6),
                &mut evals,
            )
            .unwrap();
        assert_eq!(err, 0.0);
        assert_eq!(evals.rhs, 4);
        // RK4 on u' = -u reproduces exp(-h) through the h^4 term.
        assert!((stepper.u_next[0] - (-0.1_f64).exp()).abs() < 1e-7);
    }

    #[test]
    fn allocating_rhs_shape_mismatch_is_reported() {
        let bad = |_t: Float, _u: &[Float]| vec![0.0, 0.0];
        let mut stepper = Stepper::new(&DOPRI5, 1);
        let mut evals = Evals::default();
        let got = stepper.step(
            &Rhs::Allocating(&bad),
            0.0,
            &[1.0],
            0.1,
            &Tolerance::Scalar(1e-6),
            &Tolerance::Scalar(1e-6),
            &mut evals,
        );
        assert_eq!(got, Err(Error::DimensionMismatch { expected: 1, got: 2 }));
    }
}
