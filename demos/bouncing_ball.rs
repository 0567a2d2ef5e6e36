//! # Example: Bouncing Ball
//!
//! Free fall with an event at ground contact. The event condition is the
//! height; when it crosses zero going down, the reaction reverses the
//! velocity with a restitution loss and the integration continues.

use ivpkit::prelude::*;

const G: Float = 9.81;
const RESTITUTION: Float = 0.8;

struct Ball;

impl Ode for Ball {
    fn rhs(&self, _t: Float, u: &[Float], du: &mut [Float]) {
        du[0] = u[1];
        du[1] = -G;
    }
}

#[derive(Default)]
struct BounceLog {
    times: Vec<Float>,
}

impl Callback for BounceLog {
    fn on_event(&mut self, t: Float, u: &[Float]) {
        self.times.push(t);
        println!("bounce at t = {:.6}, rebound velocity {:.4}", t, u[1]);
    }
}

fn main() {
    let condition = |_t: Float, u: &[Float]| u[0];
    let mut bounce = |_t: Float, u: &mut Vec<Float>| u[1] = -RESTITUTION * u[1];
    let mut log = BounceLog::default();

    let problem = OdeProblem::new(&Ball, vec![10.0, 0.0]);
    let options = SolveOptions::builder()
        .rtol(1e-9)
        .atol(1e-9)
        .dense(true)
        .event(
            EventSpec::builder()
                .condition(&condition)
                .direction(EventDirection::Negative)
                .reaction(&mut bounce)
                .build(),
        )
        .callback(&mut log)
        .build();

    let sol = solve(&problem, (0.0, 10.0), options).expect("solve failed");
    println!("Final status: {:?}", sol.status);
    println!("{} bounces in {:.1} s", log.times.len(), sol.tf());
    println!(
        "Final state: height = {:.4}, velocity = {:.4}",
        sol.uf()[0],
        sol.uf()[1]
    );
}
