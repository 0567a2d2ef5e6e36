//! User-supplied ODE/SDE systems and the right-hand-side adapter.

use crate::{Error, Float};

/// User-supplied ODE system.
///
/// Implement this trait for your problem to provide the right-hand side
/// function u' = f(t, u). The integrator repeatedly calls `rhs` with the
/// current time `t` and state `u` and expects you to fill `du` with the
/// derivative values. Closures of the shape `|t, u, du|` implement this
/// trait automatically.
///
/// # Example
///
/// ```ignore
/// struct VanDerPol { eps: f64 }
/// impl Ode for VanDerPol {
///     fn rhs(&self, _t: f64, u: &[f64], du: &mut [f64]) {
///         du[0] = u[1];
///         du[1] = ((1.0 - u[0] * u[0]) * u[1] - u[0]) / self.eps;
///     }
/// }
/// ```
pub trait Ode {
    fn rhs(&self, t: Float, u: &[Float], du: &mut [Float]);
}

impl<F> Ode for F
where
    F: Fn(Float, &[Float], &mut [Float]),
{
    fn rhs(&self, t: Float, u: &[Float], du: &mut [Float]) {
        self(t, u, du)
    }
}

/// User-supplied SDE system `du = drift(t, u) dt + diffusion(t, u) dW`
/// with diagonal noise: `diffusion` fills one amplitude per state
/// component, each driven by an independent Wiener increment.
pub trait Sde {
    fn drift(&self, t: Float, u: &[Float], du: &mut [Float]);
    fn diffusion(&self, t: Float, u: &[Float], du: &mut [Float]);
}

/// Right-hand-side adapter.
///
/// Normalizes the two supported user contracts into one buffer-writing
/// entry point: either the preferred in-place form `f(t, u, du)` via the
/// [`Ode`] trait, or an allocating `f(t, u) -> Vec` which is copied into
/// the caller's buffer. Only the allocating form can disagree with the
/// state shape, which surfaces as [`Error::DimensionMismatch`].
pub enum Rhs<'a> {
    InPlace(&'a dyn Ode),
    Allocating(&'a dyn Fn(Float, &[Float]) -> Vec<Float>),
}

impl<'a> Rhs<'a> {
    /// Evaluate the derivative at `(t, u)` into `du`.
    pub fn eval(&self, t: Float, u: &[Float], du: &mut [Float]) -> Result<(), Error> {
        match self {
            Rhs::InPlace(f) => {
                f.rhs(t, u, du);
                Ok(())
            }
            Rhs::Allocating(f) => {
                let v = f(t, u);
                if v.len() != du.len() {
                    return Err(Error::DimensionMismatch {
                        expected: du.len(),
                        got: v.len(),
                    });
                }
                du.copy_from_slice(&v);
                Ok(())
            }
        }
    }
}
