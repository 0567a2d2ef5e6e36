//! Status codes for integrators

/// Terminal status of an integration run.
///
/// Anything other than `Success` means the run stopped early; the returned
/// solution still holds every point accepted up to that moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// The user callback asked to stop between steps.
    Interrupted,
    /// The adaptive step size underflowed the configured minimum.
    StepSizeTooSmall,
    /// The step/retry loop exceeded `max_iters`.
    MaxIterationsExceeded,
}
