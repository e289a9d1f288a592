//! Plumbing to the hosted financial planning model.
//!
//! - request envelope construction (`payload`)
//! - HTTP client and the `ModelApi` seam (`client`)
//! - response envelope checks and output extraction (`response`)

pub mod client;
pub mod payload;
pub mod response;

pub use client::*;
pub use payload::*;
pub use response::*;
