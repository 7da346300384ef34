//! Shared utilities: errors, configuration, logging and identifiers.
pub mod config;
pub mod error;
pub mod ids;
pub mod log;

pub use error::{ObjCode, ObjError, ObjResult};
