use ivpkit::prelude::*;

mod common;
use common::{Sho, dense_opts, growth};

#[test]
fn interpolant_is_exact_at_recorded_step_endpoints() {
    let problem = OdeProblem::new(&growth, vec![1.0]);
    for method in [Method::Bs23, Method::Dopri5, Method::Rk4] {
        let sol = solve(&problem, (0.0, 1.0), dense_opts(method)).unwrap();
        for (t, u) in sol.iter() {
            let v = sol.query(t).unwrap();
            assert!(
                (v[0] - u[0]).abs() < 1e-12,
                "{:?} at t = {}: {} vs {}",
                method,
                t,
                v[0],
                u[0]
            );
        }
    }
}

#[test]
fn interpolant_tracks_the_solution_between_steps() {
    let problem = OdeProblem::new(&growth, vec![1.0]);
    let sol = solve(&problem, (0.0, 1.0), dense_opts(Method::Dopri5)).unwrap();
    for i in 0..=50 {
        let t = i as Float / 50.0;
        let v = sol.query(t).unwrap();
        assert!((v[0] - t.exp()).abs() < 1e-7, "t = {}", t);
    }
}

#[test]
fn hermite_fallback_covers_methods_without_native_interpolants() {
    // RK4 has no stage-weight polynomial; dense output still works.
    let problem = OdeProblem::new(&Sho, vec![1.0, 0.0]);
    let options = SolveOptions::builder()
        .method(Method::Rk4)
        .adaptive(false)
        .dt(0.01)
        .dense(true)
        .build();
    let sol = solve(&problem, (0.0, 1.0), options).unwrap();
    let v = sol.query(0.505).unwrap();
    assert!((v[0] - Float::cos(0.505)).abs() < 1e-6);
}

#[test]
fn query_outside_the_covered_span_fails() {
    let problem = OdeProblem::new(&growth, vec![1.0]);
    let sol = solve(&problem, (0.0, 1.0), dense_opts(Method::Dopri5)).unwrap();
    assert_eq!(sol.query(2.0), Err(Error::NoDenseOutput));
    assert_eq!(sol.query(-0.5), Err(Error::NoDenseOutput));
}

#[test]
fn backward_spans_are_queryable() {
    let problem = OdeProblem::new(&Sho, vec![1.0, 0.0]);
    let two_pi = 2.0 * std::f64::consts::PI;
    let sol = solve(&problem, (two_pi, 0.0), dense_opts(Method::Dopri5)).unwrap();
    let (t0, t1) = sol.continuous().unwrap().t_span().unwrap();
    assert!(t0 > t1);
    let mid = 0.5 * (t0 + t1);
    let v = sol.query(mid).unwrap();
    assert!((v[0] - mid.cos()).abs() < 1e-6);
    assert!((v[1] + mid.sin()).abs() < 1e-6);
}

#[test]
fn save_at_records_exactly_the_requested_points() {
    let problem = OdeProblem::new(&growth, vec![1.0]);
    let wanted = vec![0.0, 0.25, 0.5, 0.75, 1.0];
    let options = SolveOptions::builder()
        .rtol(1e-9)
        .atol(1e-9)
        .save_at(wanted.clone())
        .build();
    let sol = solve(&problem, (0.0, 1.0), options).unwrap();
    assert_eq!(sol.len(), wanted.len());
    for (i, &tq) in wanted.iter().enumerate() {
        let (t, u) = sol.at(i).unwrap();
        assert!((t - tq).abs() < 1e-12);
        assert!((u[0] - tq.exp()).abs() < 1e-7, "t = {}", tq);
    }
    // The integration endpoint is still reported.
    assert!((sol.tf() - 1.0).abs() < 1e-12);
}

#[test]
fn timeseries_can_be_decimated_or_disabled() {
    let problem = OdeProblem::new(&growth, vec![1.0]);
    let full = solve(
        &problem,
        (0.0, 1.0),
        SolveOptions::builder().rtol(1e-9).atol(1e-9).build(),
    )
    .unwrap();
    let thin = solve(
        &problem,
        (0.0, 1.0),
        SolveOptions::builder()
            .rtol(1e-9)
            .atol(1e-9)
            .timeseries_steps(5)
            .build(),
    )
    .unwrap();
    assert!(thin.len() < full.len());

    let latest_only = solve(
        &problem,
        (0.0, 1.0),
        SolveOptions::builder()
            .rtol(1e-9)
            .atol(1e-9)
            .save_timeseries(false)
            .build(),
    )
    .unwrap();
    assert_eq!(latest_only.len(), 1);
    assert!((latest_only.uf()[0] - Float::exp(1.0)).abs() < 1e-6);
}
