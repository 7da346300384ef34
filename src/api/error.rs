//! Per-thread record of the most recent failure at the C boundary.

use std::cell::RefCell;
use std::ffi::{c_char, CString};
use std::ptr;

use crate::common::error::{ObjCode, ObjError};

struct LastError {
    code: ObjCode,
    message: CString,
}

thread_local! {
    static LAST_ERROR: RefCell<Option<LastError>> = const { RefCell::new(None) };
}

/// Record `err` as this thread's last error.
pub fn set_last_error(err: &ObjError) {
    // Messages are built from our own Display impls and never hold NUL.
    let message = CString::new(err.to_string()).unwrap_or_default();
    LAST_ERROR.with(|slot| {
        *slot.borrow_mut() = Some(LastError {
            code: err.code(),
            message,
        });
    });
}

pub fn clear_last_error() {
    LAST_ERROR.with(|slot| slot.borrow_mut().take());
}

pub fn last_error_code() -> ObjCode {
    LAST_ERROR.with(|slot| slot.borrow().as_ref().map_or(ObjCode::Ok, |e| e.code))
}

/// Pointer to the last message, or null. Valid until the next failure on this
/// thread or a call to `clear_last_error`.
pub fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(ptr::null(), |e| e.message.as_ptr())
    })
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use super::*;

    #[test]
    fn records_and_clears() {
        clear_last_error();
        assert_eq!(last_error_code(), ObjCode::Ok);
        assert!(last_error_ptr().is_null());

        set_last_error(&ObjError::UnknownKind(9));
        assert_eq!(last_error_code(), ObjCode::UnknownKind);
        let msg = unsafe { CStr::from_ptr(last_error_ptr()) };
        assert_eq!(msg.to_str().unwrap(), "unknown scalar kind tag 9");

        clear_last_error();
        assert!(last_error_ptr().is_null());
    }

    #[test]
    fn is_per_thread() {
        set_last_error(&ObjError::NullHandle);
        let other = std::thread::spawn(last_error_code).join().unwrap();
        assert_eq!(other, ObjCode::Ok);
        assert_eq!(last_error_code(), ObjCode::NullHandle);
    }
}
