//! rungs_core: thread-free core of the component lifecycle scheduler.
//!
//! Design goals:
//! - Pure, testable logic (no lanes, no registry).
//! - Explicit types; no macro wizardry.
//! - Small, stable public API surface.

pub mod error;

/// State ladder, transactions, component hooks and the stepping engine.
pub mod lifecycle;
