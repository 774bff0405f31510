//! C ABI for hosts that load the library dynamically.
//!
//! # Calling convention
//!
//! 1. The host fills a [`HostApi`] and calls [`regex_extract_init`] once per
//!    loaded instance. The library calls `register_scalar` back for
//!    `regex_extract` with arity 2 and 3, then returns a status code
//!    (`0` ok, `1` error, `256` ok and keep loaded). On `1` the host must
//!    treat the function as unregistered.
//! 2. For every call the host passes length-delimited buffers to
//!    [`regex_extract_invoke`] with a zeroed [`RawOutput`]. The pattern
//!    must be UTF-8. The subject may hold any bytes: invalid UTF-8
//!    sequences are replaced with U+FFFD before matching, so a malformed
//!    row still matches on its valid parts and the result is UTF-8.
//! 3. The host copies what it needs out of the `RawOutput` and hands it to
//!    [`regex_extract_output_free`].
//!
//! Text buffers are not NUL-terminated. A null pointer is accepted only
//! together with a zero length.

use super::{call_regex_extract, global_engine, register, FunctionCatalog, StatusCode};
use super::{FunctionFlags, ScalarFn, Value, ValueRef};
use crate::error::{ExtractError, Result};
use std::ffi::{c_char, c_int, c_void, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

/// Registration callback signature.
///
/// Receives the host context, a NUL-terminated function name, the arity
/// and the [`FunctionFlags`] bits. Returns `0` on success.
pub type RegisterScalarFn = unsafe extern "C" fn(
    host_ctx: *mut c_void,
    name: *const c_char,
    arity: c_int,
    flags: c_int,
) -> c_int;

/// Host services passed to [`regex_extract_init`].
#[repr(C)]
pub struct HostApi {
    /// Opaque pointer handed back to every callback
    pub host_ctx: *mut c_void,
    /// Binds a function name and arity in the host catalog
    pub register_scalar: Option<RegisterScalarFn>,
}

/// Outcome of one [`regex_extract_invoke`] call.
///
/// * `status == 0`, `is_null == 1` - NULL result
/// * `status == 0`, `is_null == 0` - `text`/`text_len` hold the result
/// * `status == 1` - `error`/`error_len` hold a UTF-8 message
#[repr(C)]
#[derive(Debug)]
pub struct RawOutput {
    pub status: c_int,
    pub is_null: c_int,
    pub text: *mut u8,
    pub text_len: usize,
    pub error: *mut u8,
    pub error_len: usize,
}

impl Default for RawOutput {
    fn default() -> Self {
        Self {
            status: StatusCode::Ok.as_raw(),
            is_null: 1,
            text: ptr::null_mut(),
            text_len: 0,
            error: ptr::null_mut(),
            error_len: 0,
        }
    }
}

/// Catalog that forwards registrations to the host callback.
///
/// Only the name, arity and flags cross the boundary. The host routes
/// calls to [`regex_extract_invoke`], so the `ScalarFn` built during
/// registration is dropped here.
struct CallbackCatalog<'a> {
    api: &'a HostApi,
}

impl FunctionCatalog for CallbackCatalog<'_> {
    fn create_scalar_function(
        &mut self,
        name: &str,
        arity: usize,
        flags: FunctionFlags,
        // Unused: dispatch goes through `regex_extract_invoke`
        _func: ScalarFn,
    ) -> Result<()> {
        let callback = self.api.register_scalar.ok_or_else(|| {
            ExtractError::RegistrationError("host did not provide register_scalar".to_string())
        })?;
        let c_name = CString::new(name)
            .map_err(|e| ExtractError::RegistrationError(format!("function name: {e}")))?;
        let arity = c_int::try_from(arity)
            .map_err(|e| ExtractError::RegistrationError(format!("arity: {e}")))?;

        // SAFETY: the host guarantees `register_scalar` is callable with its
        // own context for the duration of `regex_extract_init`.
        let rc = unsafe { callback(self.api.host_ctx, c_name.as_ptr(), arity, flags.bits()) };
        if rc != StatusCode::Ok.as_raw() {
            return Err(ExtractError::RegistrationError(format!(
                "host rejected {name}/{arity} with code {rc}"
            )));
        }
        Ok(())
    }
}

/// Initialization entry point.
///
/// # Safety
/// `api` must be null or point to a valid [`HostApi`] for the duration of
/// the call.
#[no_mangle]
pub unsafe extern "C" fn regex_extract_init(api: *const HostApi) -> c_int {
    // SAFETY: caller contract above.
    let Some(api) = (unsafe { api.as_ref() }) else {
        return StatusCode::Error.as_raw();
    };

    let mut catalog = CallbackCatalog { api };
    catch_unwind(AssertUnwindSafe(|| register(&mut catalog)))
        .unwrap_or(StatusCode::Error)
        .as_raw()
}

/// Evaluate one `regex_extract` call against the process-wide engine.
///
/// Returns the same value as `out.status`.
///
/// # Safety
/// * `pattern`/`subject` must each be null with length 0, or point to
///   `len` readable bytes.
/// * `out` must point to a writable [`RawOutput`]; any buffers it already
///   owns are leaked, so pass a fresh or freed one.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn regex_extract_invoke(
    pattern: *const u8,
    pattern_len: usize,
    subject: *const u8,
    subject_len: usize,
    subject_is_null: c_int,
    has_group: c_int,
    group: i64,
    out: *mut RawOutput,
) -> c_int {
    // SAFETY: caller contract above.
    let Some(out) = (unsafe { out.as_mut() }) else {
        return StatusCode::Error.as_raw();
    };

    let result = catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: caller contract above.
        let pattern = unsafe { text_arg(pattern, pattern_len, "pattern") }?;
        let decoded;
        let subject = if subject_is_null != 0 {
            ValueRef::Null
        } else {
            // SAFETY: caller contract above.
            let bytes = unsafe { bytes_arg(subject, subject_len, "subject") }?;
            decoded = String::from_utf8_lossy(bytes);
            ValueRef::Text(&decoded)
        };

        let pattern = ValueRef::Text(pattern);
        let engine = global_engine()?;
        if has_group != 0 {
            call_regex_extract(&engine, &[pattern, subject, ValueRef::Integer(group)])
        } else {
            call_regex_extract(&engine, &[pattern, subject])
        }
    }))
    .unwrap_or_else(|_| {
        Err(ExtractError::InvalidArgument(
            "panic during regex_extract".to_string(),
        ))
    });

    *out = RawOutput::default();
    match result {
        Ok(Value::Null) => {}
        Ok(Value::Text(text)) => {
            let (ptr, len) = into_raw_buffer(text);
            out.is_null = 0;
            out.text = ptr;
            out.text_len = len;
        }
        Err(e) => {
            let (ptr, len) = into_raw_buffer(e.to_string());
            out.status = StatusCode::Error.as_raw();
            out.error = ptr;
            out.error_len = len;
        }
    }
    out.status
}

/// Release the buffers owned by a [`RawOutput`] and reset it.
///
/// # Safety
/// `out` must be null or point to a `RawOutput` filled by
/// [`regex_extract_invoke`] and not freed since.
#[no_mangle]
pub unsafe extern "C" fn regex_extract_output_free(out: *mut RawOutput) {
    // SAFETY: caller contract above.
    let Some(out) = (unsafe { out.as_mut() }) else {
        return;
    };
    // SAFETY: both buffers came from `into_raw_buffer` with these lengths.
    unsafe {
        free_raw_buffer(out.text, out.text_len);
        free_raw_buffer(out.error, out.error_len);
    }
    *out = RawOutput::default();
}

/// # Safety
/// `data` must be null with `len == 0`, or point to `len` readable bytes
/// that outlive the returned slice.
unsafe fn bytes_arg<'a>(data: *const u8, len: usize, what: &str) -> Result<&'a [u8]> {
    if data.is_null() {
        if len == 0 {
            return Ok(&[]);
        }
        return Err(ExtractError::InvalidArgument(format!(
            "{what} pointer is null"
        )));
    }
    // SAFETY: caller contract above.
    Ok(unsafe { std::slice::from_raw_parts(data, len) })
}

/// # Safety
/// Same contract as [`bytes_arg`].
unsafe fn text_arg<'a>(data: *const u8, len: usize, what: &str) -> Result<&'a str> {
    // SAFETY: caller contract above.
    let bytes = unsafe { bytes_arg(data, len, what) }?;
    std::str::from_utf8(bytes)
        .map_err(|e| ExtractError::InvalidArgument(format!("{what} is not valid UTF-8: {e}")))
}

fn into_raw_buffer(text: String) -> (*mut u8, usize) {
    let boxed = text.into_bytes().into_boxed_slice();
    let len = boxed.len();
    (Box::into_raw(boxed).cast::<u8>(), len)
}

/// # Safety
/// `data` must be null or come from `into_raw_buffer` with the same `len`.
unsafe fn free_raw_buffer(data: *mut u8, len: usize) {
    if data.is_null() {
        return;
    }
    // SAFETY: caller contract above.
    drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(data, len)) });
}
