//! Shared domain types for the visual QA workspace.

pub mod config;
pub mod report;
pub mod screen;
pub mod vision;

mod errors;

pub use errors::{Result, VqaError};
