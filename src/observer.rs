//! Where caught device failures go.
//!
//! When a phase's catch policy is on, the manager hands each failure to a
//! [`FailureObserver`] and moves on to the next device. The default observer,
//! [`TracingObserver`], writes one `tracing` line per failure prefixed with
//! [`LOG_TAG`].

use crate::error::IoError;
use std::fmt;

/// Prefix tag on every failure line emitted by [`TracingObserver`].
pub const LOG_TAG: &str = "[DeviceManager]";

/// Batch operation a failure happened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Open,
    Update,
    Close,
    Rumble,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Open => "open",
            Phase::Update => "update",
            Phase::Close => "close",
            Phase::Rumble => "rumble",
        })
    }
}

/// Receives failures the manager recovered from.
pub trait FailureObserver {
    fn on_failure(&mut self, phase: Phase, error: &IoError);
}

impl<F> FailureObserver for F
where
    F: FnMut(Phase, &IoError),
{
    fn on_failure(&mut self, phase: Phase, error: &IoError) {
        self(phase, error)
    }
}

/// Logs each failure as a single `warn` line.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        TracingObserver
    }
}

impl FailureObserver for TracingObserver {
    fn on_failure(&mut self, phase: Phase, error: &IoError) {
        tracing::warn!(
            target: "devrig::manager",
            %phase,
            origin = error.origin(),
            "{LOG_TAG} {phase} failed: {error}"
        );
    }
}

/// Wraps an observer and forwards only failures from selected phases.
pub struct PhaseFilter {
    phases: Vec<Phase>,
    inner: Box<dyn FailureObserver>,
}

impl PhaseFilter {
    pub fn new(phases: impl IntoIterator<Item = Phase>, inner: Box<dyn FailureObserver>) -> Self {
        Self {
            phases: phases.into_iter().collect(),
            inner,
        }
    }
}

impl FailureObserver for PhaseFilter {
    fn on_failure(&mut self, phase: Phase, error: &IoError) {
        if self.phases.contains(&phase) {
            self.inner.on_failure(phase, error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn phase_display() {
        assert_eq!(Phase::Open.to_string(), "open");
        assert_eq!(Phase::Rumble.to_string(), "rumble");
    }

    #[test]
    fn filter_drops_unselected_phases() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut filter = PhaseFilter::new(
            [Phase::Close],
            Box::new(move |phase: Phase, err: &IoError| {
                sink.borrow_mut().push((phase, err.message().to_string()))
            }),
        );

        filter.on_failure(Phase::Update, &IoError::new("a", "dropped"));
        filter.on_failure(Phase::Close, &IoError::new("a", "kept"));

        assert_eq!(*seen.borrow(), vec![(Phase::Close, "kept".to_string())]);
    }
}
