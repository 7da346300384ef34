// lib.rs - value holders behind a C ABI of opaque handles
pub mod api;
pub mod common;
pub mod holder;

pub use common::{ObjCode, ObjError, ObjResult};
pub use holder::{Handle, Registry, Scalar, ScalarKind, ScalarType, ValueHolder};
