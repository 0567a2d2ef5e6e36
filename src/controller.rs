//! Adaptive step-size controller.
//!
//! Maps the scaled error norm of a tentative step to an accept/reject
//! decision plus the next proposed step size. The default law is the plain
//! error-ratio rule `dt' = dt * clamp(safety * err^(-1/(order+1)))`; setting
//! `beta > 0` enables Lund stabilization, which also folds in the previous
//! accepted step's error ratio for smoother control.

use crate::Float;

/// Outcome of one controller decision.
pub(crate) enum Decision {
    /// Commit the step and continue with `dt_next`.
    Accept { dt_next: Float },
    /// Retry from the same point with the smaller `dt_retry`.
    Reject { dt_retry: Float },
}

pub(crate) struct Controller {
    safety: Float,
    /// Inverse growth bounds: `1/scale_min` and `1/scale_max`.
    facc1: Float,
    facc2: Float,
    beta: Float,
    expo1: Float,
    facold: Float,
    dt_max: Float,
    rejected: bool,
}

impl Controller {
    pub fn new(
        order: usize,
        safety: Float,
        scale_min: Float,
        scale_max: Float,
        beta: Float,
        dt_max: Float,
    ) -> Self {
        Self {
            safety,
            facc1: 1.0 / scale_min,
            facc2: 1.0 / scale_max,
            beta,
            expo1: 1.0 / (order as Float + 1.0) - beta * 0.75,
            facold: 1.0e-4,
            dt_max,
            rejected: false,
        }
    }

    /// Decide on a tentative step with scaled error norm `err` taken at step
    /// size `dt`. `posneg` is the integration direction sign.
    pub fn decide(&mut self, err: Float, dt: Float, posneg: Float) -> Decision {
        let fac11 = err.powf(self.expo1);

        if err <= 1.0 {
            // Lund stabilization: weigh in the previous accepted error ratio.
            let fac = fac11 / self.facold.powf(self.beta);
            let fac = self.facc2.max(self.facc1.min(fac / self.safety));
            let mut dt_next = dt / fac;

            self.facold = err.max(1.0e-4);

            if dt_next.abs() > self.dt_max {
                dt_next = posneg * self.dt_max;
            }
            // A growth right after a rejection tends to oscillate.
            if self.rejected {
                dt_next = posneg * dt_next.abs().min(dt.abs());
                self.rejected = false;
            }
            Decision::Accept { dt_next }
        } else {
            self.rejected = true;
            Decision::Reject {
                dt_retry: dt / self.facc1.min(fac11 / self.safety),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_error_grows_step_within_bounds() {
        let mut ctl = Controller::new(4, 0.9, 0.2, 10.0, 0.0, 1.0e6);
        match ctl.decide(1e-10, 0.1, 1.0) {
            Decision::Accept { dt_next } => {
                assert!(dt_next > 0.1);
                assert!(dt_next <= 0.1 * 10.0 + 1e-12);
            }
            Decision::Reject { .. } => panic!("tiny error must be accepted"),
        }
    }

    #[test]
    fn large_error_rejects_and_shrinks() {
        let mut ctl = Controller::new(4, 0.9, 0.2, 10.0, 0.0, 1.0e6);
        match ctl.decide(50.0, 0.1, 1.0) {
            Decision::Reject { dt_retry } => {
                assert!(dt_retry.abs() < 0.1);
                assert!(dt_retry.abs() >= 0.1 * 0.2 - 1e-12);
            }
            Decision::Accept { .. } => panic!("large error must be rejected"),
        }
    }

    #[test]
    fn no_growth_immediately_after_rejection() {
        let mut ctl = Controller::new(4, 0.9, 0.2, 10.0, 0.0, 1.0e6);
        match ctl.decide(50.0, 0.1, 1.0) {
            Decision::Reject { .. } => {}
            Decision::Accept { .. } => panic!(),
        }
        match ctl.decide(1e-10, 0.05, 1.0) {
            Decision::Accept { dt_next } => assert!(dt_next <= 0.05 + 1e-12),
            Decision::Reject { .. } => panic!(),
        }
    }

    #[test]
    fn dt_max_caps_the_proposal() {
        let mut ctl = Controller::new(4, 0.9, 0.2, 10.0, 0.0, 0.25);
        match ctl.decide(1e-12, 0.2, 1.0) {
            Decision::Accept { dt_next } => assert!((dt_next - 0.25).abs() < 1e-12),
            Decision::Reject { .. } => panic!(),
        }
    }
}
