//! Domain types for the parameter form.
//!
//! This module defines:
//!
//! - the model inputs collected by the form (`ModelParams`, `YearRates`, `Lease`)
//! - the output selector (`LineItem`) and the known selectors (`LINE_ITEM_CATALOG`)
//! - parameter validation (`validate_params`)

pub mod types;
pub mod validate;

pub use types::*;
pub use validate::*;
