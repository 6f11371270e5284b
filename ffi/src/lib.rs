//! C-ABI wrapper around `localpostman-core`.
//!
//! # Overview
//! Lets a host UI written in any language with a C FFI run the LocalPostman
//! pipeline: it fills in an `FfiFormState`, gets back an `FfiHttpRequest` to
//! execute with its own HTTP client, and hands the response (or the client's
//! error) back for rendering.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Build failures, transport failures and rendered responses all come back
//!   as one `FfiOutcome` shape, so the host has a single display path.
//! - `FfiGenerations` exposes the stale-outcome guard: call
//!   `lp_generations_begin` on every submit and drop any outcome whose
//!   generation is no longer current.
//! - The C caller owns all returned pointers and must call the matching
//!   `lp_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use localpostman_core::{
    build_request, extract_token, render, Failure, Generations, ResponseOutcome, StatusClass,
    TransportError,
};

use types::*;

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

/// Validate `form` and build the request it describes.
///
/// On success `request` is set; on a validation error `failure` holds a
/// `ValidationError` outcome ready for display and nothing should be sent.
/// The caller must free the result with `lp_free_build_result`.
#[unsafe(no_mangle)]
pub extern "C" fn lp_build_request(form: *const FfiFormState) -> *mut FfiBuildResult {
    catch_unwind(|| {
        if form.is_null() {
            return FfiBuildResult::failed(FfiOutcome::null_arg("form"));
        }
        let form = unsafe { (*form).to_core() };
        match build_request(&form) {
            Ok(req) => FfiBuildResult::ok(FfiHttpRequest::from_core(req)),
            Err(err) => {
                let outcome = ResponseOutcome::Failure(Failure::from_validation(&err));
                FfiBuildResult::failed(FfiOutcome::from_core(&outcome))
            }
        }
    })
    .unwrap_or_else(|_| FfiBuildResult::failed(FfiOutcome::panic("panic in lp_build_request")))
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Render a response the host received after `elapsed_ms` milliseconds.
///
/// Any status code renders successfully; check `class` for 4xx/5xx.
#[unsafe(no_mangle)]
pub extern "C" fn lp_render_response(
    response: *const FfiHttpResponse,
    elapsed_ms: u64,
) -> *mut FfiOutcome {
    catch_unwind(|| {
        if response.is_null() {
            return FfiOutcome::null_arg("response");
        }
        let response = unsafe { (*response).to_core() };
        FfiOutcome::from_core(&ResponseOutcome::Success(render(response, elapsed_ms)))
    })
    .unwrap_or_else(|_| FfiOutcome::panic("panic in lp_render_response"))
}

/// Report that the host's HTTP client produced no response.
///
/// `message` is shown verbatim; null is treated as empty.
#[unsafe(no_mangle)]
pub extern "C" fn lp_transport_failure(message: *const c_char, elapsed_ms: u64) -> *mut FfiOutcome {
    catch_unwind(|| {
        let err = TransportError::Unreachable(unsafe { from_c(message) });
        FfiOutcome::from_core(&ResponseOutcome::Failure(Failure::from_transport(err, elapsed_ms)))
    })
    .unwrap_or_else(|_| FfiOutcome::panic("panic in lp_transport_failure"))
}

/// Report that a response arrived but its body could not be read.
#[unsafe(no_mangle)]
pub extern "C" fn lp_body_failure(message: *const c_char, elapsed_ms: u64) -> *mut FfiOutcome {
    catch_unwind(|| {
        let err = TransportError::Body(unsafe { from_c(message) });
        FfiOutcome::from_core(&ResponseOutcome::Failure(Failure::from_transport(err, elapsed_ms)))
    })
    .unwrap_or_else(|_| FfiOutcome::panic("panic in lp_body_failure"))
}

/// Display class of a status code.
#[unsafe(no_mangle)]
pub extern "C" fn lp_classify_status(status: u16) -> FfiStatusClass {
    StatusClass::of(status).into()
}

/// Token found in a JSON document, or null.
///
/// Returns null if `json` is null, not valid JSON, or carries no token.
/// The caller must free a non-null result with `lp_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn lp_extract_token(json: *const c_char) -> *mut c_char {
    catch_unwind(|| {
        if json.is_null() {
            return std::ptr::null_mut();
        }
        let text = unsafe { CStr::from_ptr(json) }.to_str().unwrap_or("");
        serde_json::from_str::<serde_json::Value>(text)
            .ok()
            .and_then(|value| extract_token(&value))
            .map(to_c)
            .unwrap_or(std::ptr::null_mut())
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Stale-outcome guard
// ---------------------------------------------------------------------------

/// Create a submission counter. Free with `lp_generations_free`.
#[unsafe(no_mangle)]
pub extern "C" fn lp_generations_new() -> *mut FfiGenerations {
    catch_unwind(|| {
        Box::into_raw(Box::new(FfiGenerations {
            inner: Generations::new(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Start a submission and return its generation. Returns 0 for null.
#[unsafe(no_mangle)]
pub extern "C" fn lp_generations_begin(generations: *const FfiGenerations) -> u64 {
    if generations.is_null() {
        return 0;
    }
    catch_unwind(|| unsafe { &*generations }.inner.begin().0).unwrap_or(0)
}

/// Whether `generation` is still the latest submission.
#[unsafe(no_mangle)]
pub extern "C" fn lp_generations_is_current(
    generations: *const FfiGenerations,
    generation: u64,
) -> bool {
    if generations.is_null() {
        return false;
    }
    catch_unwind(|| {
        unsafe { &*generations }
            .inner
            .is_current(localpostman_core::Ticket(generation))
    })
    .unwrap_or(false)
}

/// Free a counter created by `lp_generations_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn lp_generations_free(generations: *mut FfiGenerations) {
    if !generations.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(generations) });
        });
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiBuildResult` and whichever of its pointers is set.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn lp_free_build_result(result: *mut FfiBuildResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_request(result.request);
        lp_free_outcome(result.failure);
    });
}

fn free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let req = unsafe { Box::from_raw(req) };
    free_c(req.url);
    free_c(req.body);
    for h in unsafe { from_raw_slice(req.headers, req.headers_len) } {
        free_c(h.key);
        free_c(h.value);
    }
    for part in unsafe { from_raw_slice(req.parts, req.parts_len) } {
        part.free_fields();
    }
}

/// Free an `FfiOutcome` returned by any function in this library.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn lp_free_outcome(outcome: *mut FfiOutcome) {
    if outcome.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let outcome = unsafe { Box::from_raw(outcome) };
        outcome.free_fields();
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn lp_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
