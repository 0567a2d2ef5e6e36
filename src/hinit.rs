//! Compute an initial step size guess

use crate::{Error, Float, ode::Rhs, tolerance::Tolerance};

/// Compute an initial step size guess from the scaled magnitudes of the
/// state, its derivative, and an estimated second derivative.
#[allow(clippy::too_many_arguments)]
pub(crate) fn hinit(
    rhs: &Rhs<'_>,
    t: Float,
    u: &[Float],
    posneg: Float,
    f0: &[Float],
    f1: &mut [Float],
    u1: &mut [Float],
    order: usize,
    dt_max: Float,
    atol: &Tolerance,
    rtol: &Tolerance,
) -> Result<Float, Error> {
    let n = u.len();
    let mut dnf: Float = 0.0;
    let mut dny: Float = 0.0;

    for i in 0..n {
        let sk = atol[i] + rtol[i] * u[i].abs();
        dnf += (f0[i] / sk) * (f0[i] / sk);
        dny += (u[i] / sk) * (u[i] / sk);
    }

    let mut h: Float;
    if dnf <= 1e-10 || dny <= 1e-10 {
        h = 1.0e-6;
    } else {
        h = (dny / dnf).sqrt() * 0.01;
    }

    if h > dt_max.abs() {
        h = dt_max.abs();
    }
    h = h.abs() * posneg.signum();

    // Explicit Euler step: u1 = u + h * f0
    for i in 0..n {
        u1[i] = u[i] + h * f0[i];
    }
    rhs.eval(t + h, u1, f1)?;

    // Estimate second derivative
    let mut der2: Float = 0.0;
    for i in 0..n {
        let sk = atol[i] + rtol[i] * u[i].abs();
        let df = (f1[i] - f0[i]) / sk;
        der2 += df * df;
    }
    der2 = der2.sqrt() / h.abs();

    let der12 = der2.abs().max(dnf.sqrt());
    let h1: Float = if der12 <= 1.0e-15 {
        Float::max(1.0e-6, h.abs() * 1.0e-3)
    } else {
        (0.01 / der12).powf(1.0 / (order as Float))
    };

    let h_final = (100.0 * h.abs()).min(h1).min(dt_max.abs());
    Ok(h_final.abs() * posneg.signum())
}
