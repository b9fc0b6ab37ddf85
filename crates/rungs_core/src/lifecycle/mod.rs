//! rungs_core::lifecycle
//!
//! Thread-free lifecycle semantics for the component ladder
//! `Down < Background < Inactive < Active`.
//!
//! Key ideas:
//! - Components implement [`Component`]: 18 optional `will/on/did` hooks
//! - A [`Transaction`] asks for a target rung and may be canceled between steps
//! - [`drive`] walks one rung at a time and never skips an intermediate rung
//! - Lanes, queues and the registry live in the `rungs` runtime crate

mod component;
mod engine;
mod gate;
mod graph;
mod mode;
mod params;
mod state;
mod transaction;
mod transition;

pub use component::Component;
pub use engine::{drive, next_transition, run_hooks, DriveOutcome};
pub use gate::{run_if_active, ActivationGate};
pub use graph::{path, transition_graph, TransitionEdge, TransitionGraph};
pub use mode::Mode;
pub use params::Params;
pub use state::{State, ALL_STATES};
pub use transaction::Transaction;
pub use transition::{Transition, ALL_TRANSITIONS};
