//! Parallel ensembles of stochastic trajectories.
//!
//! Trajectories are distributed round-robin over scoped worker threads. Each
//! trajectory runs with seed `base + index`, where `base` is the seed of the
//! options the factory returns, so the ensemble is reproducible and the
//! result order is independent of scheduling.

use std::thread;

use crate::{
    Error, Float,
    ode::Sde,
    options::SolveOptions,
    problem::SdeProblem,
    sde::solve_sde,
    solution::Solution,
};

/// Solve `trajectories` independent realizations of an SDE problem.
///
/// `options` is called once per trajectory on the worker thread that runs
/// it; its seed is treated as the ensemble base seed and offset by the
/// trajectory index. Results come back ordered by index. The first error
/// aborts the ensemble.
pub fn solve_ensemble<'a, S, F>(
    problem: &SdeProblem<'_, S>,
    t_span: (Float, Float),
    trajectories: usize,
    options: F,
) -> Result<Vec<Solution>, Error>
where
    S: Sde + Sync,
    F: Fn() -> SolveOptions<'a> + Sync,
{
    if trajectories == 0 {
        return Ok(Vec::new());
    }

    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(trajectories);

    let mut slots: Vec<Option<Solution>> = (0..trajectories).map(|_| None).collect();

    thread::scope(|scope| -> Result<(), Error> {
        let options = &options;
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                scope.spawn(move || -> Result<Vec<(usize, Solution)>, Error> {
                    let mut done = Vec::new();
                    let mut index = worker;
                    while index < trajectories {
                        let mut opts = options();
                        opts.seed = opts.seed.wrapping_add(index as u64);
                        done.push((index, solve_sde(problem, t_span, opts)?));
                        index += workers;
                    }
                    Ok(done)
                })
            })
            .collect();

        for handle in handles {
            let done = match handle.join() {
                Ok(result) => result?,
                Err(payload) => std::panic::resume_unwind(payload),
            };
            for (index, sol) in done {
                slots[index] = Some(sol);
            }
        }
        Ok(())
    })?;

    Ok(slots.into_iter().flatten().collect())
}
