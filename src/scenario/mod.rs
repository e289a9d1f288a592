//! Scenario store: named parameter sets plus the results last computed for them.
//!
//! - in-memory store with upsert-by-name semantics (`store`)
//! - built-in demo scenarios (`predefined`)
//! - two-scenario comparison (`compare`)
//! - JSON export/import files (`export`)

pub mod compare;
pub mod export;
pub mod predefined;
pub mod store;

pub use compare::*;
pub use export::*;
pub use predefined::*;
pub use store::*;
