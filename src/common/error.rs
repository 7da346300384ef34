//! Error handling primitives shared across the core.
//!
//! `ObjError` is the rich Rust-side error; `ObjCode` is the stable number that
//! crosses the FFI boundary.

use crate::holder::domain::ScalarKind;

/// Stable error codes that cross the FFI boundary.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ObjCode {
    /// Success code used as a sentinel.
    Ok = 0,
    /// The null handle was passed.
    NullHandle = 1,
    /// Handle is unknown, foreign, stale or already destroyed.
    InvalidHandle = 2,
    /// A typed accessor family was used on a handle of another kind.
    TypeMismatch = 3,
    /// Kind tag is not one of the supported scalar kinds.
    UnknownKind = 4,
    /// A required out-pointer was null.
    NullPointer = 5,
    /// The live object limit was reached.
    CapacityExhausted = 6,
    /// Catch-all for bugs and environment failures.
    Internal = 7,
}

impl ObjCode {
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Canonical error type for the core.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ObjError {
    #[error("null handle")]
    NullHandle,

    #[error("invalid or destroyed handle {0:#018x}")]
    InvalidHandle(u64),

    #[error("handle {handle:#018x} holds {actual}, not {expected}")]
    TypeMismatch {
        handle: u64,
        expected: ScalarKind,
        actual: ScalarKind,
    },

    #[error("unknown scalar kind tag {0}")]
    UnknownKind(u32),

    #[error("null out-pointer passed for `{0}`")]
    NullPointer(&'static str),

    #[error("live object limit of {0} reached")]
    CapacityExhausted(usize),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias used throughout the crate.
pub type ObjResult<T> = Result<T, ObjError>;

impl ObjError {
    /// Machine parsable code for this error.
    pub fn code(&self) -> ObjCode {
        match self {
            ObjError::NullHandle => ObjCode::NullHandle,
            ObjError::InvalidHandle(_) => ObjCode::InvalidHandle,
            ObjError::TypeMismatch { .. } => ObjCode::TypeMismatch,
            ObjError::UnknownKind(_) => ObjCode::UnknownKind,
            ObjError::NullPointer(_) => ObjCode::NullPointer,
            ObjError::CapacityExhausted(_) => ObjCode::CapacityExhausted,
            ObjError::Internal(_) => ObjCode::Internal,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ObjCode::Ok as u32, 0);
        assert_eq!(ObjCode::NullHandle as u32, 1);
        assert_eq!(ObjCode::InvalidHandle as u32, 2);
        assert_eq!(ObjCode::TypeMismatch as u32, 3);
        assert_eq!(ObjCode::UnknownKind as u32, 4);
        assert_eq!(ObjCode::NullPointer as u32, 5);
        assert_eq!(ObjCode::CapacityExhausted as u32, 6);
        assert_eq!(ObjCode::Internal as u32, 7);
    }

    #[test]
    fn errors_map_to_codes() {
        assert_eq!(ObjError::NullHandle.code(), ObjCode::NullHandle);
        assert_eq!(ObjError::InvalidHandle(9).code(), ObjCode::InvalidHandle);
        assert_eq!(ObjError::UnknownKind(42).code(), ObjCode::UnknownKind);
        assert_eq!(ObjError::NullPointer("out").code(), ObjCode::NullPointer);
        assert_eq!(ObjError::CapacityExhausted(1).code(), ObjCode::CapacityExhausted);
        assert_eq!(ObjError::internal("boom").code(), ObjCode::Internal);
    }

    #[test]
    fn mismatch_message_names_both_kinds() {
        let err = ObjError::TypeMismatch {
            handle: 0x1_0000_0001,
            expected: ScalarKind::Float,
            actual: ScalarKind::Int,
        };
        assert_eq!(err.code(), ObjCode::TypeMismatch);
        assert_eq!(
            err.to_string(),
            "handle 0x0000000100000001 holds int, not float"
        );
    }
}
