//! User-defined observer hooks invoked by the integration loop.
//!
//! The solver exposes exactly the documented step fields through
//! [`StepInfo`]; callbacks cannot reach into solver-loop internals. State
//! changes happen through the event layer, not here.

use crate::Float;

/// Return flag for [`Callback::on_accepted_step`].
///
/// - `Continue`: proceed with integration as normal.
/// - `Interrupt`: stop integration and return control to the caller with
///   everything accepted so far (cooperative cancellation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlag {
    Continue,
    Interrupt,
}

/// Read-only view of one accepted step.
pub struct StepInfo<'a> {
    /// Left end of the accepted interval.
    pub t_old: Float,
    /// Right end of the accepted interval (equals `t_old + dt` unless an
    /// event truncated the step).
    pub t: Float,
    /// Solution at `t`.
    pub u: &'a [Float],
    /// Stage derivatives of the step.
    pub k: &'a [Vec<Float>],
    /// Step size the stages were computed with.
    pub dt: Float,
}

/// Strategy object observing the integration as it progresses.
///
/// Both hooks have no-op defaults, so implementors override only what they
/// need.
pub trait Callback {
    /// Invoked after every accepted step (after event handling for that
    /// interval, if any).
    fn on_accepted_step(&mut self, info: &StepInfo<'_>) -> ControlFlag {
        let _ = info;
        ControlFlag::Continue
    }

    /// Invoked when an event fired, after the reaction ran. `t` is the
    /// located event time and `u` the post-reaction state.
    fn on_event(&mut self, t: Float, u: &[Float]) {
        let _ = (t, u);
    }
}
