use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for FFI error types.
///
/// This trait provides a unified way to handle errors across the FFI boundary,
/// allowing both simple error codes and custom error messages.
///
/// # Design
/// - `code()` - Returns the error code to be passed across FFI boundary
/// - `msg()` - Returns the error message for diagnostic purposes
pub(crate) trait WxFxError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> WxFxErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `WxFxError` for common FFI error scenarios.
///
/// This struct wraps a `WxFxErrorCode` and provides convenient constructors
/// for each error type (except Ok, which represents success).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultWxFxError {
    code: WxFxErrorCode,
    msg: String,
}

impl DefaultWxFxError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_instance"`, `"ptr"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: WxFxErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for poisoned lock.
    ///
    /// # Arguments
    /// * `lock_name` - The name of the lock that was poisoned (e.g., `"field"`, `"surface"`)
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: WxFxErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    /// Create error for a non-finite float where a finite value is required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the invalid parameter (e.g., `"pressure_hpa"`)
    /// * `value` - The invalid value
    pub fn non_finite(param_name: &str, value: f32) -> Self {
        Self::invalid_parameter(format!("Parameter '{param_name}' must be finite, got {value}"))
    }

    /// Create error for invalid parameter.
    ///
    /// # Arguments
    /// * `message` - Description of the error
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: WxFxErrorCode::InvalidParameter,
            msg: message,
        }
    }
}

impl WxFxError for DefaultWxFxError {
    fn code(&self) -> WxFxErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by weather FX functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WxFxErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Lock poisoned: internal synchronization primitive was poisoned by a panic.
    LockPoisoned = 2,

    /// Invalid parameter passed to function (unknown enum tag, non-finite pressure).
    InvalidParameter = 3,
}

impl From<DefaultWxFxError> for WxFxErrorCode {
    fn from(error: DefaultWxFxError) -> Self {
        error.code
    }
}

thread_local! {
    /// Thread-local storage for the most recent FFI error (C string, error code).
    /// Allows callers to retrieve diagnostic information after a failed call.
    /// The CString is stored to prevent memory leaks when returning raw pointers via FFI.
    static LAST_ERROR: RefCell<(Option<CString>, WxFxErrorCode)> = const { RefCell::new((None, WxFxErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, WxFxErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, WxFxErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if an error occurred.
/// - `null` if the last call succeeded or the message cannot be converted to a C string.
///
/// # Thread Safety
/// Error messages are stored per-thread (thread-local storage), so this is thread-safe.
/// Each thread has its own independent error state.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread that sets or
/// clears the error, or until the thread terminates.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```cpp
/// WxFxGaugeInstance* gauge = /* ... */;
/// WxFxTrend trend;
/// if (wxfx_gauge_submit(gauge, NAN, now_ms, &trend) != WxFxErrorCode::Ok) {
///     const char* error = wxfx_get_last_error();
///     if (error) {
///         printf("Pressure rejected: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn wxfx_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns:
/// - `WxFxErrorCode::Ok` (0) if the last call on this thread succeeded
/// - The specific error code from the last failed operation
#[no_mangle]
pub extern "C" fn wxfx_get_last_error_code() -> WxFxErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
