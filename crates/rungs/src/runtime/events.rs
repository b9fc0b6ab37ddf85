//! Lifecycle transition events.
//!
//! Emitted after every completed rung so observers (UI glue, diagnostics,
//! tests) can follow a component without polling.

use rungs_core::lifecycle::{State, Transition};

/// Emitted after each completed ladder step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    pub type_name: &'static str,
    pub tag: String,
    pub transition: Transition,
    pub start_state: State,
    pub goal_state: State,
}
