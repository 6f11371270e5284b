//! Turns a raw `HttpResponse` into what the user gets to read.
//!
//! # Design
//! Rendering never fails. A body declared as JSON is pretty-printed when it
//! parses and shown exactly as received when it does not. Status codes of
//! 4xx/5xx are still successful renders; `StatusClass` is how the display
//! tells them apart.

use log::debug;

use crate::http::HttpResponse;
use crate::json;
use crate::token::extract_token;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Display classification of a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Ok,
    Warning,
    Error,
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match status {
            400.. => StatusClass::Error,
            300..=399 => StatusClass::Warning,
            _ => StatusClass::Ok,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusClass::Ok => "ok",
            StatusClass::Warning => "warning",
            StatusClass::Error => "error",
        }
    }
}

/// A completed round-trip, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResponse {
    pub status_code: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    /// Declared `Content-Type`, empty when the server sent none.
    pub content_type: String,
    pub content_length: Option<String>,
    pub body_text: String,
    pub elapsed_ms: u64,
    pub extracted_token: Option<String>,
    pub class: StatusClass,
}

impl RenderedResponse {
    /// The target server answered with a 4xx or 5xx status.
    pub fn is_application_error(&self) -> bool {
        self.status_code >= 400
    }

    /// `Content-Length` for display, `N/A` when absent.
    pub fn content_length_display(&self) -> &str {
        self.content_length.as_deref().unwrap_or("N/A")
    }
}

/// True when `content_type` declares a JSON body.
pub fn is_json_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains(JSON_MEDIA_TYPE)
}

/// Render `response`, which took `elapsed_ms` to arrive.
pub fn render(response: HttpResponse, elapsed_ms: u64) -> RenderedResponse {
    let content_type = response.header("Content-Type").unwrap_or_default().to_string();
    let content_length = response.header("Content-Length").map(str::to_string);

    let (body_text, extracted_token) = if is_json_content_type(&content_type) {
        match serde_json::from_str::<serde_json::Value>(&response.body) {
            Ok(value) => {
                let token = extract_token(&value);
                let pretty = json::to_pretty(value).unwrap_or(response.body);
                (pretty, token)
            }
            Err(e) => {
                debug!("body declared as {content_type} is not JSON ({e}), showing raw text");
                (response.body, None)
            }
        }
    } else {
        (response.body, None)
    };

    RenderedResponse {
        status_code: response.status,
        status_text: response.status_text,
        headers: response.headers,
        content_type,
        content_length,
        body_text,
        elapsed_ms,
        extracted_token,
        class: StatusClass::of(response.status),
    }
}
