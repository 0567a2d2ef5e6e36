//! # Example: Exponential Decay
//!
//! Solve dy/dt = -y, y(0) = 1 and sample the result at fixed times.

use ivpkit::prelude::*;

struct Decay;

impl Ode for Decay {
    fn rhs(&self, _t: Float, u: &[Float], du: &mut [Float]) {
        for i in 0..u.len() {
            du[i] = -u[i];
        }
    }
}

fn main() {
    let problem = OdeProblem::new(&Decay, vec![1.0]);
    let save_at: Vec<Float> = (0..=50).map(|i| i as Float * 0.1).collect();

    let options = SolveOptions::builder()
        // Default method is Dormand-Prince 5(4).
        .rtol(1e-6)
        .atol(1e-6)
        .save_at(save_at)
        .build();

    match solve(&problem, (0.0, 5.0), options) {
        Ok(sol) => {
            println!("Final status: {:?}", sol.status);
            println!("Final state: t = {:.5}, u = {:?}", sol.tf(), sol.uf());
            println!("Function evaluations: {}", sol.evals.rhs);
            println!(
                "Steps: {} (accepted {} / rejected {})",
                sol.steps.total, sol.steps.accepted, sol.steps.rejected
            );

            for (t, u) in sol.iter() {
                println!("t = {:.4}, u = {:?}", t, u);
            }
        }
        Err(e) => eprintln!("Integration failed: {e}"),
    }
}
