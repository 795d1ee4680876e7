//! CLI command implementations.

pub mod doctor;
pub mod env;
pub mod target;
