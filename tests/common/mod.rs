#![allow(dead_code)]

use ivpkit::prelude::*;

/// Simple harmonic oscillator: u'' = -u as a first-order system.
/// With u(0) = (1, 0) the solution is (cos t, -sin t).
pub struct Sho;

impl Ode for Sho {
    fn rhs(&self, _t: Float, u: &[Float], du: &mut [Float]) {
        du[0] = u[1];
        du[1] = -u[0];
    }
}

/// Scalar exponential growth u' = u.
pub fn growth(_t: Float, u: &[Float], du: &mut [Float]) {
    du[0] = u[0];
}

pub fn tight_opts(method: Method) -> SolveOptions<'static> {
    SolveOptions::builder()
        .method(method)
        .rtol(1e-10)
        .atol(1e-10)
        .build()
}

pub fn dense_opts(method: Method) -> SolveOptions<'static> {
    SolveOptions::builder()
        .method(method)
        .rtol(1e-9)
        .atol(1e-9)
        .dense(true)
        .build()
}
