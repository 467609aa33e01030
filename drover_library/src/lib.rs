//! Drover Library
//!
//! Shared code and utilities that are not specific to any one crate in the Drover stack.

pub mod config;
pub mod logging;
#[macro_use]
pub mod macros;
pub mod metrics;
pub mod threading;
pub mod transaction;
