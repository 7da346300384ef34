//! Public entry points for foreign function interfaces.

pub mod error;
pub mod ffi;
