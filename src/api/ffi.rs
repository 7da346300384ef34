//! C-compatible API exposed to interpreted-language bindings.
//!
//! Handles are plain `uint64_t` values issued by the registry; `0` is the null
//! handle. Functions that cannot return a handle or pointer report a `u32`
//! status from `ObjCode`. Every failure is also recorded in the calling
//! thread's last-error slot (`object_last_error`).

use std::ffi::c_char;
use std::ptr;

use tracing::{info, warn};

use crate::common::config::ObjCfg;
use crate::common::error::{ObjCode, ObjError, ObjResult};
use crate::common::log;
use crate::holder::domain::{Scalar, ScalarKind, ScalarType};
use crate::holder::registry::{self, Handle};

use super::error::{clear_last_error, last_error_code, last_error_ptr, set_last_error};

/// ABI version to coordinate with the binding layers.
pub const ABI_VERSION: u32 = 1;

#[no_mangle]
pub extern "C" fn object_abi_version() -> u32 {
    ABI_VERSION
}

/// Load configuration from the environment and install the log subscriber.
/// Safe to call more than once.
#[no_mangle]
pub extern "C" fn object_init() -> u32 {
    let cfg = ObjCfg::load();
    let result = log::init(&cfg);
    if result.is_ok() {
        info!(
            abi = ABI_VERSION,
            max_live = registry::global().lock().max_live(),
            "object library initialised"
        );
    }
    status(result)
}

/// Message of this thread's last failure, or NULL. Owned by the library.
#[no_mangle]
pub extern "C" fn object_last_error() -> *const c_char {
    last_error_ptr()
}

#[no_mangle]
pub extern "C" fn object_last_error_code() -> u32 {
    last_error_code().raw()
}

#[no_mangle]
pub extern "C" fn object_clear_error() {
    clear_last_error();
}

/// Zero-valued holder of the given kind tag (1 = int, 2 = float).
#[no_mangle]
pub extern "C" fn object_new(kind: u32) -> u64 {
    match ScalarKind::try_from(kind) {
        Ok(kind) => create(kind.zero()),
        Err(err) => {
            fail(&err);
            Handle::NULL.raw()
        }
    }
}

/// Write the kind tag of `handle` to `out`.
///
/// # Safety
/// `out` must be NULL or valid for a `u32` write.
#[no_mangle]
pub unsafe extern "C" fn object_kind(handle: u64, out: *mut u32) -> u32 {
    let result = if out.is_null() {
        Err(ObjError::NullPointer("out"))
    } else {
        registry::global().lock().kind(Handle::from_raw(handle))
    };
    match result {
        Ok(kind) => {
            unsafe { out.write(kind as u32) };
            ObjCode::Ok.raw()
        }
        Err(err) => fail(&err).raw(),
    }
}

/// Destroy a holder of any kind.
#[no_mangle]
pub extern "C" fn object_destroy(handle: u64) -> u32 {
    let result = registry::global().lock().destroy(Handle::from_raw(handle));
    status(result.map(drop))
}

/// Identity of a holder of any kind; valid until that holder is destroyed.
#[no_mangle]
pub extern "C" fn object_id(handle: u64) -> *const c_char {
    let result = registry::global()
        .lock()
        .identity(Handle::from_raw(handle))
        .map(|label| label.as_ptr());
    pointer(result)
}

/// 1 when `handle` refers to a live holder. Never touches the last error.
#[no_mangle]
pub extern "C" fn object_is_live(handle: u64) -> u32 {
    u32::from(registry::global().lock().is_live(Handle::from_raw(handle)))
}

#[no_mangle]
pub extern "C" fn object_live_count() -> u64 {
    registry::global().lock().len() as u64
}

/// Generates the `object_<name>_*` family for one scalar type. Each family
/// only accepts handles holding its own kind.
macro_rules! scalar_family {
    ($name:ident, $ty:ty) => {
        paste::paste! {
            /// New holder with payload `n`.
            #[no_mangle]
            pub extern "C" fn [<object_ $name _init>](n: $ty) -> u64 {
                create(n.into_scalar())
            }

            /// New holder with a zero payload.
            #[no_mangle]
            pub extern "C" fn [<object_ $name _new>]() -> u64 {
                create(<$ty as ScalarType>::KIND.zero())
            }

            #[no_mangle]
            pub extern "C" fn [<object_ $name _destroy>](handle: u64) -> u32 {
                let result = registry::global()
                    .lock()
                    .destroy_as(Handle::from_raw(handle), <$ty as ScalarType>::KIND);
                status(result.map(drop))
            }

            /// Write the payload of `handle` to `out`.
            ///
            /// # Safety
            /// `out` must be NULL or valid for a write of the payload type.
            #[no_mangle]
            pub unsafe extern "C" fn [<object_ $name _n_get>](handle: u64, out: *mut $ty) -> u32 {
                let result = if out.is_null() {
                    Err(ObjError::NullPointer("out"))
                } else {
                    registry::global().lock().get_as::<$ty>(Handle::from_raw(handle))
                };
                match result {
                    Ok(value) => {
                        unsafe { out.write(value) };
                        ObjCode::Ok.raw()
                    }
                    Err(err) => fail(&err).raw(),
                }
            }

            /// Overwrite the payload. Returns `handle` on success, 0 otherwise.
            #[no_mangle]
            pub extern "C" fn [<object_ $name _n_put>](handle: u64, n: $ty) -> u64 {
                let result = registry::global().lock().set_as(Handle::from_raw(handle), n);
                report(result).map_or(Handle::NULL.raw(), |h| h.raw())
            }

            /// Identity token owned by the holder; do not free.
            #[no_mangle]
            pub extern "C" fn [<object_ $name _id>](handle: u64) -> *const c_char {
                let result = registry::global()
                    .lock()
                    .identity_as(Handle::from_raw(handle), <$ty as ScalarType>::KIND)
                    .map(|label| label.as_ptr());
                pointer(result)
            }
        }
    };
}

scalar_family!(int, i32);
scalar_family!(float, f32);

fn create(value: Scalar) -> u64 {
    let result = registry::global().lock().create(value);
    report(result).map_or(Handle::NULL.raw(), |h| h.raw())
}

fn fail(err: &ObjError) -> ObjCode {
    warn!(%err, code = err.code().raw(), "object call failed");
    set_last_error(err);
    err.code()
}

fn report<T>(result: ObjResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            fail(&err);
            None
        }
    }
}

fn status(result: ObjResult<()>) -> u32 {
    match result {
        Ok(()) => ObjCode::Ok.raw(),
        Err(err) => fail(&err).raw(),
    }
}

fn pointer(result: ObjResult<*const c_char>) -> *const c_char {
    report(result).unwrap_or(ptr::null())
}
