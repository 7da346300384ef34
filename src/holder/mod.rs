//! Holder domain: the value-holder object and the handle table that owns
//! instances on behalf of foreign callers.

pub mod domain;
pub mod registry;

pub use domain::{Holder, Scalar, ScalarKind, ScalarType, ValueHolder};
pub use registry::{Handle, Registry};
