use std::sync::atomic::{AtomicBool, Ordering};

use super::State;

/// One requested walk toward `target`.
///
/// The only mutable part is the cancellation flag. It is written by the
/// dispatching side and read by the lane running the walk between steps;
/// Release/Acquire makes a cancel visible before the next step's check.
#[derive(Debug)]
pub struct Transaction {
    target: State,
    canceled: AtomicBool,
}

impl Transaction {
    pub const fn new(target: State) -> Self {
        Self {
            target,
            canceled: AtomicBool::new(false),
        }
    }

    pub fn target(&self) -> State {
        self.target
    }

    /// Mark the transaction superseded. Returns `false` if it already was.
    pub fn cancel(&self) -> bool {
        !self.canceled.swap(true, Ordering::AcqRel)
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }
}
