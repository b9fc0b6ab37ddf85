use std::sync::atomic::{AtomicBool, Ordering};

/// Activation flag for a component, readable from any thread.
///
/// The runtime switches it on when the component lands on `Active` and off
/// when it leaves. Timers, publishers or request handlers owned by the
/// component check `is_active()` to allow or skip work.
#[derive(Debug)]
pub struct ActivationGate {
    active: AtomicBool,
}

impl ActivationGate {
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
        }
    }

    pub fn activate(&self) {
        self.active.store(true, Ordering::Release);
    }

    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl Default for ActivationGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Execute a closure only when the gate is active.
///
/// Returns `true` if executed, `false` if suppressed.
pub fn run_if_active<F>(gate: &ActivationGate, f: F) -> bool
where
    F: FnOnce(),
{
    if gate.is_active() {
        f();
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_gate_test() {
        let gate = ActivationGate::new();

        assert!(!gate.is_active());

        gate.activate();
        assert!(gate.is_active());

        gate.deactivate();
        assert!(!gate.is_active());
    }

    #[test]
    fn run_if_active_suppresses_when_inactive() {
        let gate = ActivationGate::new();
        let mut hits = 0;

        assert!(!run_if_active(&gate, || hits += 1));
        gate.activate();
        assert!(run_if_active(&gate, || hits += 1));
        assert_eq!(hits, 1);
    }
}
