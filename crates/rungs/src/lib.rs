//! rungs
//!
//! Threaded scheduler on top of `rungs_core`: execution lanes, per-component
//! serialized transactions, the component registry and the host lifecycle
//! adapter.

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{PanicPolicy, RuntimeConfig};
pub use runtime::{
    ComponentOptions, HostLifecycle, HostSignal, ObjectLeak, Registry, TransitionEvent,
};

// Re-export core types that callers will commonly need
pub use rungs_core::error::{CoreError, Result};
pub use rungs_core::lifecycle::{
    run_if_active, ActivationGate, Component, Mode, Params, State, Transition,
};
