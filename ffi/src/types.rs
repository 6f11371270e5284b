//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`, and
//! tagged enums with explicit discriminants. Input structs (`FfiFormState`,
//! `FfiHttpResponse`) are owned by the C caller and only read here; output
//! structs are heap-allocated by Rust and released with the matching
//! `lp_free_*` function.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use localpostman_core::{
    badge, format_outcome, FailureKind, FileAttachment, FormState, Generations, HttpMethod,
    HttpRequest, HttpResponse, MultipartPart, PartValue, RequestBody, ResponseOutcome,
    StatusClass,
};

// ---------------------------------------------------------------------------
// String and buffer helpers
// ---------------------------------------------------------------------------

/// Move `s` into a C string owned by the caller. Interior NULs are dropped.
pub(crate) fn to_c(s: String) -> *mut c_char {
    CString::new(s)
        .unwrap_or_else(|e| {
            let mut bytes = e.into_vec();
            bytes.retain(|b| *b != 0);
            CString::new(bytes).unwrap_or_default()
        })
        .into_raw()
}

pub(crate) fn opt_to_c(s: Option<String>) -> *mut c_char {
    s.map(to_c).unwrap_or(std::ptr::null_mut())
}

/// Read a caller-owned C string. Null reads as empty; invalid UTF-8 is
/// replaced rather than rejected.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn from_c(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

pub(crate) fn free_c(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

/// Leak `items` as a pointer to `len` elements, null when empty.
fn into_raw_slice<T>(items: Vec<T>) -> (*mut T, usize) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = items.len();
    (Box::into_raw(items.into_boxed_slice()) as *mut T, len)
}

/// Reclaim a slice produced by `into_raw_slice`.
///
/// # Safety
/// `ptr`/`len` must come from `into_raw_slice` and not have been freed.
pub(crate) unsafe fn from_raw_slice<T>(ptr: *mut T, len: usize) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, len);
    unsafe { Box::from_raw(slice) }.into_vec()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
    Patch = 4,
    Head = 5,
    Options = 6,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Head => FfiHttpMethod::Head,
            HttpMethod::Options => FfiHttpMethod::Options,
        }
    }
}

impl From<FfiHttpMethod> for HttpMethod {
    fn from(m: FfiHttpMethod) -> Self {
        match m {
            FfiHttpMethod::Get => HttpMethod::Get,
            FfiHttpMethod::Post => HttpMethod::Post,
            FfiHttpMethod::Put => HttpMethod::Put,
            FfiHttpMethod::Delete => HttpMethod::Delete,
            FfiHttpMethod::Patch => HttpMethod::Patch,
            FfiHttpMethod::Head => HttpMethod::Head,
            FfiHttpMethod::Options => HttpMethod::Options,
        }
    }
}

/// The request form as filled in by the host UI.
///
/// String fields may be null (read as empty). A null `file_name` means no
/// file is attached.
#[repr(C)]
pub struct FfiFormState {
    pub url: *const c_char,
    pub method: FfiHttpMethod,
    pub bearer_token: *const c_char,
    pub include_auth: bool,
    pub json_body: *const c_char,
    pub include_body: bool,
    pub include_file: bool,
    pub file_name: *const c_char,
    pub file_content_type: *const c_char,
    pub file_data: *const u8,
    pub file_len: usize,
}

impl FfiFormState {
    /// Copy the caller's form into an owned `FormState`.
    ///
    /// # Safety
    /// Every non-null pointer must be valid for the lifetime of the call;
    /// `file_data` must point to `file_len` readable bytes.
    pub(crate) unsafe fn to_core(&self) -> FormState {
        let file = if self.file_name.is_null() {
            None
        } else {
            let bytes = if self.file_data.is_null() || self.file_len == 0 {
                Vec::new()
            } else {
                unsafe { std::slice::from_raw_parts(self.file_data, self.file_len) }.to_vec()
            };
            let content_type = if self.file_content_type.is_null() {
                None
            } else {
                Some(unsafe { from_c(self.file_content_type) })
            };
            Some(FileAttachment {
                file_name: unsafe { from_c(self.file_name) },
                content_type,
                bytes,
            })
        };

        FormState {
            url: unsafe { from_c(self.url) },
            method: self.method.into(),
            bearer_token: unsafe { from_c(self.bearer_token) },
            include_auth: self.include_auth,
            json_body: unsafe { from_c(self.json_body) },
            include_body: self.include_body,
            include_file: self.include_file,
            file,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// What `FfiHttpRequest::body` / `parts` hold.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiBodyTag {
    None = 0,
    Json = 1,
    Multipart = 2,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiPartTag {
    Text = 0,
    File = 1,
}

/// One multipart part. `text` is set for `Text`; `file_name`,
/// `content_type` (nullable) and `data`/`data_len` for `File`.
#[repr(C)]
pub struct FfiPart {
    pub tag: FfiPartTag,
    pub name: *mut c_char,
    pub text: *mut c_char,
    pub file_name: *mut c_char,
    pub content_type: *mut c_char,
    pub data: *mut u8,
    pub data_len: usize,
}

impl FfiPart {
    fn from_core(part: MultipartPart) -> Self {
        let name = to_c(part.name);
        match part.value {
            PartValue::Text(text) => FfiPart {
                tag: FfiPartTag::Text,
                name,
                text: to_c(text),
                file_name: std::ptr::null_mut(),
                content_type: std::ptr::null_mut(),
                data: std::ptr::null_mut(),
                data_len: 0,
            },
            PartValue::File(file) => {
                let (data, data_len) = into_raw_slice(file.bytes);
                FfiPart {
                    tag: FfiPartTag::File,
                    name,
                    text: std::ptr::null_mut(),
                    file_name: to_c(file.file_name),
                    content_type: opt_to_c(file.content_type),
                    data,
                    data_len,
                }
            }
        }
    }

    /// Free the fields of a part (but not the struct itself).
    pub(crate) fn free_fields(self) {
        free_c(self.name);
        free_c(self.text);
        free_c(self.file_name);
        free_c(self.content_type);
        drop(unsafe { from_raw_slice(self.data, self.data_len) });
    }
}

/// An HTTP request described as C-compatible plain data.
///
/// The C caller executes it and reports back through `lp_render_response`
/// or `lp_transport_failure`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: usize,
    pub body_tag: FfiBodyTag,
    pub body: *mut c_char,
    pub parts: *mut FfiPart,
    pub parts_len: usize,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let (headers, headers_len) = into_raw_slice(
            req.headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c(k),
                    value: to_c(v),
                })
                .collect(),
        );

        let (body_tag, body, parts) = match req.body {
            RequestBody::None => (FfiBodyTag::None, std::ptr::null_mut(), Vec::new()),
            RequestBody::Json(text) => (FfiBodyTag::Json, to_c(text), Vec::new()),
            RequestBody::Multipart(parts) => (
                FfiBodyTag::Multipart,
                std::ptr::null_mut(),
                parts.into_iter().map(FfiPart::from_core).collect(),
            ),
        };
        let (parts, parts_len) = into_raw_slice(parts);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: to_c(req.url),
            headers,
            headers_len,
            body_tag,
            body,
            parts,
            parts_len,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// A header as read from the caller's HTTP client.
#[repr(C)]
pub struct FfiHeaderRef {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this after executing a request, then passes a
/// pointer to `lp_render_response`. The FFI layer reads but does not free
/// these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub status_text: *const c_char,
    pub headers: *const FfiHeaderRef,
    pub headers_len: usize,
    pub body: *const c_char,
}

impl FfiHttpResponse {
    /// # Safety
    /// `headers` must be null or point to `headers_len` valid entries.
    pub(crate) unsafe fn to_core(&self) -> HttpResponse {
        let headers = if self.headers.is_null() || self.headers_len == 0 {
            Vec::new()
        } else {
            unsafe { std::slice::from_raw_parts(self.headers, self.headers_len) }
                .iter()
                .map(|h| unsafe { (from_c(h.key), from_c(h.value)) })
                .collect()
        };
        HttpResponse {
            status: self.status,
            status_text: unsafe { from_c(self.status_text) },
            headers,
            body: unsafe { from_c(self.body) },
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Discriminant of `FfiOutcome`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiOutcomeTag {
    Success = 0,
    ValidationError = 1,
    ParseError = 2,
    TransportError = 3,
    Panic = 4,
    NullArg = 5,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStatusClass {
    Ok = 0,
    Warning = 1,
    Error = 2,
}

impl From<StatusClass> for FfiStatusClass {
    fn from(c: StatusClass) -> Self {
        match c {
            StatusClass::Ok => FfiStatusClass::Ok,
            StatusClass::Warning => FfiStatusClass::Warning,
            StatusClass::Error => FfiStatusClass::Error,
        }
    }
}

/// Everything the host needs to display one outcome.
///
/// `status_label`/`status_text` form the badge (`200 OK`, `400 Invalid URL`,
/// `ERR Network Error`). `display_text` is the full response panel.
/// `content_type`, `content_length` and `token` are null for failures;
/// `token` is also null when no token was found. `elapsed_ms` is -1 when the
/// request was never sent.
#[repr(C)]
pub struct FfiOutcome {
    pub tag: FfiOutcomeTag,
    pub class: FfiStatusClass,
    pub status_label: *mut c_char,
    pub status_text: *mut c_char,
    pub content_type: *mut c_char,
    pub content_length: *mut c_char,
    pub body_text: *mut c_char,
    pub display_text: *mut c_char,
    pub token: *mut c_char,
    pub elapsed_ms: i64,
}

fn elapsed(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

impl FfiOutcome {
    pub(crate) fn from_core(outcome: &ResponseOutcome) -> *mut Self {
        let badge = badge(outcome);
        let display_text = to_c(format_outcome(outcome));
        let result = match outcome {
            ResponseOutcome::Success(r) => FfiOutcome {
                tag: FfiOutcomeTag::Success,
                class: badge.class.into(),
                status_label: to_c(badge.label),
                status_text: to_c(badge.text),
                content_type: to_c(r.content_type.clone()),
                content_length: to_c(r.content_length_display().to_string()),
                body_text: to_c(r.body_text.clone()),
                display_text,
                token: opt_to_c(r.extracted_token.clone()),
                elapsed_ms: elapsed(r.elapsed_ms),
            },
            ResponseOutcome::Failure(f) => FfiOutcome {
                tag: match f.kind {
                    FailureKind::Validation => FfiOutcomeTag::ValidationError,
                    FailureKind::Parse => FfiOutcomeTag::ParseError,
                    FailureKind::Transport => FfiOutcomeTag::TransportError,
                },
                class: badge.class.into(),
                status_label: to_c(badge.label),
                status_text: to_c(badge.text),
                content_type: std::ptr::null_mut(),
                content_length: std::ptr::null_mut(),
                body_text: to_c(f.message.clone()),
                display_text,
                token: std::ptr::null_mut(),
                elapsed_ms: f.elapsed_ms.map(elapsed).unwrap_or(-1),
            },
        };
        Box::into_raw(Box::new(result))
    }

    /// An outcome for a problem on the FFI boundary itself.
    fn boundary_error(tag: FfiOutcomeTag, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiOutcome {
            tag,
            class: FfiStatusClass::Error,
            status_label: to_c("ERR".to_string()),
            status_text: to_c(msg.clone()),
            content_type: std::ptr::null_mut(),
            content_length: std::ptr::null_mut(),
            body_text: to_c(msg.clone()),
            display_text: to_c(msg),
            token: std::ptr::null_mut(),
            elapsed_ms: -1,
        }))
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boundary_error(FfiOutcomeTag::NullArg, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boundary_error(FfiOutcomeTag::Panic, msg.to_string())
    }

    /// Free the C-string fields (but not the struct itself).
    pub(crate) fn free_fields(&self) {
        for ptr in [
            self.status_label,
            self.status_text,
            self.content_type,
            self.content_length,
            self.body_text,
            self.display_text,
            self.token,
        ] {
            free_c(ptr);
        }
    }
}

/// Result of `lp_build_request`: exactly one of the two pointers is set.
#[repr(C)]
pub struct FfiBuildResult {
    pub request: *mut FfiHttpRequest,
    pub failure: *mut FfiOutcome,
}

impl FfiBuildResult {
    pub(crate) fn ok(request: *mut FfiHttpRequest) -> *mut Self {
        Box::into_raw(Box::new(FfiBuildResult {
            request,
            failure: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn failed(failure: *mut FfiOutcome) -> *mut Self {
        Box::into_raw(Box::new(FfiBuildResult {
            request: std::ptr::null_mut(),
            failure,
        }))
    }
}

/// Opaque handle to a submission counter. C callers receive a pointer to
/// this and pass it back into `lp_generations_*`.
pub struct FfiGenerations {
    pub(crate) inner: Generations,
}
