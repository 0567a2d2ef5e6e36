//! The `solve` entry point: adaptive explicit integration with events,
//! dense output, and error computation.

use crate::{
    Error, Float,
    callback::{ControlFlag, StepInfo},
    controller::{Controller, Decision},
    dense::Segment,
    event,
    hinit::hinit,
    options::SolveOptions,
    problem::OdeProblem,
    solution::Solution,
    status::Status,
    stepper::Stepper,
    tableau::DenseRule,
};

/// Tolerance for matching `save_at` points against interval bounds.
const SAVE_AT_TOL: Float = 1e-12;

/// Solve an ODE initial value problem over `t_span = (t0, tend)`.
///
/// Integration runs backward when `tend < t0`. Configuration errors and a
/// right-hand-side shape mismatch are returned as `Err`; step-size underflow
/// and iteration exhaustion instead set the [`Status`] on the returned
/// partial solution, which keeps everything accepted up to the failure.
pub fn solve(
    problem: &OdeProblem<'_>,
    t_span: (Float, Float),
    mut options: SolveOptions<'_>,
) -> Result<Solution, Error> {
    let (t0, tend) = t_span;

    // --- Input validation ---
    if !t0.is_finite() || !tend.is_finite() || t0 == tend {
        return Err(Error::InvalidTimeSpan(t0, tend));
    }
    if options.max_iters == 0 {
        return Err(Error::MaxItersMustBePositive(options.max_iters));
    }
    if options.safety >= 1.0 || options.safety <= 1e-4 {
        return Err(Error::SafetyFactorOutOfRange(options.safety));
    }
    if options.scale_min <= 0.0 || options.scale_max <= options.scale_min {
        return Err(Error::InvalidScaleFactors(
            options.scale_min,
            options.scale_max,
        ));
    }
    if !(0.0..=0.2).contains(&options.beta) {
        return Err(Error::BetaTooLarge(options.beta));
    }
    if let Some(dt) = options.dt {
        if dt == 0.0 || !dt.is_finite() {
            return Err(Error::InvalidStepSize(dt));
        }
    }

    let tab = options.method.tableau();
    let adaptive = options.adaptive && tab.embedded();
    let posneg = (tend - t0).signum();
    let uround = Float::EPSILON;
    let dt_max = options.dt_max.map(Float::abs).unwrap_or((tend - t0).abs());
    let dt_min = options.dt_min.map(Float::abs).unwrap_or(0.0);
    let atol = options.atol.clone();
    let rtol = options.rtol.clone();

    let needs_segment =
        options.dense || options.event.is_some() || options.save_at.is_some();
    let keep_stages = matches!(tab.dense, DenseRule::Poly(_));

    // --- Declarations ---
    let mut u = problem.u0.clone();
    let mut stepper = Stepper::new(tab, u.len());
    let mut controller = Controller::new(
        tab.order,
        options.safety,
        options.scale_min,
        options.scale_max,
        options.beta,
        dt_max,
    );
    let mut sol = Solution::new(
        tab,
        options.dense,
        options.save_timeseries,
        options.timeseries_steps,
    );
    let mut t = t0;
    let mut last = false;
    let mut save_at_idx = 0usize;
    let mut status = Status::Success;

    // --- Initializations ---
    let mut f0 = vec![0.0; u.len()];
    problem.rhs.eval(t, &u, &mut f0)?;
    sol.evals.rhs += 1;

    let mut dt = match options.dt {
        Some(dt) => dt.abs() * posneg,
        None if adaptive => {
            let mut f1 = vec![0.0; u.len()];
            let mut u1 = vec![0.0; u.len()];
            sol.evals.rhs += 1;
            hinit(
                &problem.rhs,
                t,
                &u,
                posneg,
                &f0,
                &mut f1,
                &mut u1,
                tab.order,
                dt_max,
                &atol,
                &rtol,
            )?
        }
        None => (tend - t0) / 100.0,
    };
    stepper.seed_first(&f0);

    match options.save_at.as_deref() {
        Some(save_at) => {
            // Points at (or before) t0 are settled without interpolation.
            while save_at_idx < save_at.len()
                && (save_at[save_at_idx] - t0) * posneg <= SAVE_AT_TOL
            {
                if (save_at[save_at_idx] - t0).abs() <= SAVE_AT_TOL {
                    sol.record_forced(t0, &u);
                }
                save_at_idx += 1;
            }
        }
        None => sol.record_forced(t0, &u),
    }
    sol.set_final(t0, &u);

    // --- Main integration loop ---
    loop {
        if sol.steps.total >= options.max_iters {
            status = Status::MaxIterationsExceeded;
            break;
        }
        if dt.abs() < dt_min || 0.1 * dt.abs() <= t.abs() * uround {
            status = Status::StepSizeTooSmall;
            break;
        }
        if (t + 1.01 * dt - tend) * posneg > 0.0 {
            dt = tend - t;
            last = true;
        }

        sol.steps.total += 1;
        let err = stepper.step(&problem.rhs, t, &u, dt, &atol, &rtol, &mut sol.evals)?;

        let mut dt_next = if adaptive {
            match controller.decide(err, dt, posneg) {
                Decision::Accept { dt_next } => dt_next,
                Decision::Reject { dt_retry } => {
                    sol.steps.rejected += 1;
                    last = false;
                    dt = dt_retry;
                    continue;
                }
            }
        } else {
            dt
        };

        // Step accepted
        sol.steps.accepted += 1;
        let t_old = t;
        let t_new = t + dt;
        let u_new = stepper.u_next.clone();

        let segment = if needs_segment {
            let k0 = stepper.k[0].clone();
            let k_end = if tab.fsal {
                stepper.k[tab.stages - 1].clone()
            } else {
                let mut k = vec![0.0; u_new.len()];
                problem.rhs.eval(t_new, &u_new, &mut k)?;
                sol.evals.rhs += 1;
                k
            };
            let stages = if keep_stages {
                stepper.k.clone()
            } else {
                Vec::new()
            };
            Some(Segment::new(
                t,
                dt,
                t_new,
                u.clone(),
                u_new.clone(),
                k0,
                k_end,
                stages,
            ))
        } else {
            None
        };

        // Event scan on the accepted interval, before it is committed.
        let mut event_fired = false;
        if let (Some(spec), Some(seg)) = (options.event.as_mut(), segment.as_ref()) {
            if let Some(theta) =
                event::scan(spec, seg, tab, &problem.rhs, &mut sol.evals)?
            {
                event_fired = true;
                let dt_eff = theta * dt;
                let t_ev = t + dt_eff;
                let mut u_ev = vec![0.0; u_new.len()];
                if theta < 1.0 {
                    seg.eval_with(tab, &problem.rhs, &mut sol.evals, t_ev, &mut u_ev)?;
                    last = false;
                } else {
                    u_ev.copy_from_slice(&u_new);
                }

                // Derivative at the event point (the method's final stage no
                // longer matches after truncation).
                let mut k_ev = vec![0.0; u_ev.len()];
                problem.rhs.eval(t_ev, &u_ev, &mut k_ev)?;
                sol.evals.rhs += 1;

                sol.push_segment(Segment::new(
                    t,
                    dt,
                    t_ev,
                    u.clone(),
                    u_ev.clone(),
                    seg.k0.clone(),
                    k_ev.clone(),
                    seg.stages.clone(),
                ));
                if let Some(save_at) = options.save_at.as_deref() {
                    // Exclusive bound: the event commit below covers t_ev.
                    sample_save_at(
                        &mut sol, seg, tab, problem, save_at, &mut save_at_idx, t_ev, false,
                        posneg,
                    )?;
                }

                // Pre-event state first, so the trajectory up to the event
                // is part of the record.
                sol.record_forced(t_ev, &u_ev);
                if let Some(save_at) = options.save_at.as_deref() {
                    // A requested point at the event time is satisfied by
                    // the commit above; do not record it twice.
                    while save_at_idx < save_at.len()
                        && (save_at[save_at_idx] - t_ev) * posneg <= SAVE_AT_TOL
                    {
                        save_at_idx += 1;
                    }
                }

                let mut u_post = u_ev;
                if let Some(reaction) = spec.reaction.as_mut() {
                    reaction(t_ev, &mut u_post);
                    sol.record_forced(t_ev, &u_post);
                    if u_post.len() != u.len() {
                        // Stage buffers follow the state length in lockstep.
                        stepper.resize(u_post.len());
                    } else {
                        stepper.invalidate_first();
                    }
                } else {
                    stepper.seed_first(&k_ev);
                }

                if let Some(cb) = options.callback.as_mut() {
                    cb.on_event(t_ev, &u_post);
                }

                u = u_post;
                t = t_ev;
                dt_next *= spec.dt_damp;
                dt = dt_next;
            }
        }

        if !event_fired {
            if let Some(seg) = segment {
                if let Some(save_at) = options.save_at.as_deref() {
                    sample_save_at(
                        &mut sol, &seg, tab, problem, save_at, &mut save_at_idx, t_new, true,
                        posneg,
                    )?;
                } else {
                    sol.record(t_new, &u_new);
                }
                let k_end = seg.k1.clone();
                sol.push_segment(seg);
                stepper.seed_first(&k_end);
            } else {
                sol.record(t_new, &u_new);
                stepper.propagate_fsal();
            }
            u = u_new;
            t = t_new;
            dt = dt_next;
        }

        if let Some(cb) = options.callback.as_mut() {
            let info = StepInfo {
                t_old,
                t,
                u: &u,
                k: &stepper.k,
                dt: t - t_old,
            };
            if cb.on_accepted_step(&info) == ControlFlag::Interrupt {
                status = Status::Interrupted;
                break;
            }
        }

        if last {
            break;
        }
    }

    sol.set_final(t, &u);
    sol.status = status;

    if let Some(analytic) = problem.analytic {
        let u0 = problem.u0.clone();
        sol.compute_errors(|tq| analytic(tq, &u0));
    }

    Ok(sol)
}

/// Interpolate and record every `save_at` point inside `(seg.t0, t_right]`,
/// or `(seg.t0, t_right)` when the right endpoint is recorded separately.
#[allow(clippy::too_many_arguments)]
fn sample_save_at(
    sol: &mut Solution,
    seg: &Segment,
    tab: &'static crate::tableau::Tableau,
    problem: &OdeProblem<'_>,
    save_at: &[Float],
    next_idx: &mut usize,
    t_right: Float,
    include_right: bool,
    posneg: Float,
) -> Result<(), Error> {
    let cutoff = if include_right { SAVE_AT_TOL } else { -SAVE_AT_TOL };
    let mut ui = vec![0.0; seg.u1.len()];
    while *next_idx < save_at.len() {
        let tq = save_at[*next_idx];
        if (tq - t_right) * posneg > cutoff {
            break;
        }
        if (tq - seg.t0) * posneg >= -SAVE_AT_TOL {
            let mut evals = sol.evals;
            seg.eval_with(tab, &problem.rhs, &mut evals, tq, &mut ui)?;
            sol.evals = evals;
            sol.record_forced(tq, &ui);
        }
        *next_idx += 1;
    }
    Ok(())
}
