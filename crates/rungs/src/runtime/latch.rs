use parking_lot::{Condvar, Mutex};

/// One-shot release signal for a batch of in-flight work.
///
/// A fresh latch is created whenever a component goes from idle to busy and
/// released when its in-flight count drops back to zero. Waiters block until
/// release; waiting on a released latch returns immediately.
#[derive(Debug, Default)]
pub(crate) struct Latch {
    released: Mutex<bool>,
    cond: Condvar,
}

impl Latch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn release(&self) {
        let mut released = self.released.lock();
        *released = true;
        self.cond.notify_all();
    }

    #[cfg(test)]
    pub(crate) fn is_released(&self) -> bool {
        *self.released.lock()
    }

    pub(crate) fn wait(&self) {
        let mut released = self.released.lock();
        while !*released {
            self.cond.wait(&mut released);
        }
    }
}
