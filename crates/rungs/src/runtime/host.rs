use rungs_core::lifecycle::State;
use tracing::debug;

use super::registry::Registry;

/// Application lifecycle signals as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostSignal {
    Started,
    Resumed,
    Paused,
    Stopped,
}

impl HostSignal {
    /// Global state the signal puts components into.
    pub fn global_state(self) -> State {
        match self {
            HostSignal::Started => State::Inactive,
            HostSignal::Resumed => State::Active,
            HostSignal::Paused => State::Inactive,
            HostSignal::Stopped => State::Background,
        }
    }
}

/// Forwards host signals to the registry, skipping signals that would not
/// change the global state.
///
/// The registry's global state is the only record; a direct
/// [`Registry::set_global_state`] is seen by the next signal.
#[derive(Debug, Clone)]
pub struct HostLifecycle {
    registry: Registry,
}

impl HostLifecycle {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns true when the signal changed the global state.
    pub fn signal(&self, signal: HostSignal) -> bool {
        let state = signal.global_state();
        let forwarded = self.registry.set_global_state_if_changed(state);
        if forwarded {
            debug!(?signal, state = %state, "host signal");
        } else {
            debug!(?signal, state = %state, "host signal ignored; state unchanged");
        }
        forwarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signals_map_onto_the_ladder() {
        assert_eq!(HostSignal::Started.global_state(), State::Inactive);
        assert_eq!(HostSignal::Resumed.global_state(), State::Active);
        assert_eq!(HostSignal::Paused.global_state(), State::Inactive);
        assert_eq!(HostSignal::Stopped.global_state(), State::Background);
    }

    #[test]
    fn repeated_state_is_not_forwarded() {
        let host = HostLifecycle::new(Registry::new().unwrap());

        assert!(host.signal(HostSignal::Started));
        // Paused lands on the same rung as Started.
        assert!(!host.signal(HostSignal::Paused));
        assert!(host.signal(HostSignal::Resumed));
        assert_eq!(host.registry().global_state(), State::Active);

        assert!(host.signal(HostSignal::Stopped));
        assert_eq!(host.registry().global_state(), State::Background);
    }

    #[test]
    fn direct_global_changes_are_seen_by_the_next_signal() {
        let host = HostLifecycle::new(Registry::new().unwrap());

        host.registry().set_global_state(State::Active);
        assert!(!host.signal(HostSignal::Resumed));

        host.registry().set_global_state(State::Background);
        assert!(host.signal(HostSignal::Resumed));
        assert_eq!(host.registry().global_state(), State::Active);
    }
}
