use crate::error::{with_last_error_mut, DefaultWxFxError, WxFxError, WxFxErrorCode};
use std::ffi::CString;
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Set the thread-local error message and code.
/// Internal helper for FFI functions to record failure details.
/// Accepts any type implementing `WxFxError` trait.
pub(crate) fn set_last_error(error: &impl WxFxError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
/// More efficient than handling results for immediate errors.
#[inline]
pub(crate) fn track_error(error: &impl WxFxError) -> WxFxErrorCode {
    set_last_error(error);
    error.code()
}

/// Clear the thread-local error message and code.
/// Internal helper called on successful operations.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = WxFxErrorCode::Ok;
    });
}

/// Record the outcome of a fallible operation: errors are stored, success clears.
pub(crate) fn track_result<T>(result: Result<T, DefaultWxFxError>) -> Result<T, WxFxErrorCode> {
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(error) => Err(track_error(&error)),
    }
}

/// Run an FFI body and translate its result into an error code.
pub(crate) fn handle_ffi_result_error<F>(f: F) -> WxFxErrorCode
where
    F: FnOnce() -> Result<(), DefaultWxFxError>,
{
    match track_result(f()) {
        Ok(()) => WxFxErrorCode::Ok,
        Err(code) => code,
    }
}

/// Borrow an instance from an opaque handle.
///
/// # Safety
/// `ptr` must be null or a live pointer returned by the matching `*_new` function.
pub(crate) unsafe fn instance_from_ptr<'a, T>(ptr: *const T) -> Result<&'a T, DefaultWxFxError> {
    // SAFETY: caller guarantees `ptr` is null or valid for 'a
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultWxFxError::null_pointer("ptr"))
}

/// Lock a mutex, mapping poisoning to `LockPoisoned`.
pub(crate) fn lock<'a, T>(
    mutex: &'a Mutex<T>,
    name: &str,
) -> Result<MutexGuard<'a, T>, DefaultWxFxError> {
    mutex
        .lock()
        .map_err(|_| DefaultWxFxError::lock_poisoned(name))
}

/// Acquire a shared read lock, mapping poisoning to `LockPoisoned`.
pub(crate) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    name: &str,
) -> Result<RwLockReadGuard<'a, T>, DefaultWxFxError> {
    lock.read()
        .map_err(|_| DefaultWxFxError::lock_poisoned(name))
}

/// Acquire an exclusive write lock, mapping poisoning to `LockPoisoned`.
pub(crate) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    name: &str,
) -> Result<RwLockWriteGuard<'a, T>, DefaultWxFxError> {
    lock.write()
        .map_err(|_| DefaultWxFxError::lock_poisoned(name))
}
