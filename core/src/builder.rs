//! Turns raw form values into a validated `HttpRequest`.
//!
//! # Design
//! `build_request` is a pure function of `FormState`. It checks the URL gate
//! first, so no request descriptor exists for a non-localhost target. Whether
//! a body is attached is decided by `HttpMethod::carries_body`; the body
//! flags on the form are only consulted for methods that may carry one.

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ValidationError;
use crate::http::{FileAttachment, HttpMethod, HttpRequest, MultipartPart, RequestBody};
use crate::json;

const ALLOWED_PREFIXES: [&str; 2] = ["http://localhost", "https://localhost"];

/// Field name the attached file is always sent under.
pub const FILE_FIELD: &str = "file";

/// Literal prefix of a bearer credential in the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Raw values of the request form, exactly as the user entered them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormState {
    pub url: String,
    pub method: HttpMethod,
    pub bearer_token: String,
    pub include_auth: bool,
    pub json_body: String,
    pub include_body: bool,
    pub include_file: bool,
    pub file: Option<FileAttachment>,
}

/// Validate `form` and assemble the request it describes.
pub fn build_request(form: &FormState) -> Result<HttpRequest, ValidationError> {
    let url = form.url.trim();
    if !is_localhost_url(url) {
        debug!("rejected non-localhost url {url:?}");
        return Err(ValidationError::InvalidUrl);
    }

    let mut headers = Vec::new();
    let json_text = form.json_body.trim();
    let wants_json = form.include_body && !json_text.is_empty();

    let body = match (form.method.carries_body(), &form.file) {
        (true, Some(file)) if form.include_file => {
            let mut parts = vec![MultipartPart::file(FILE_FIELD, file.clone())];
            if wants_json {
                parts.extend(json_fields(json_text)?);
            }
            RequestBody::Multipart(parts)
        }
        (true, _) if wants_json => {
            let pretty = json::to_pretty(parse_json(json_text)?)
                .map_err(|e| ValidationError::BadRequest(e.to_string()))?;
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
            RequestBody::Json(pretty)
        }
        _ => RequestBody::None,
    };

    let token = form.bearer_token.trim();
    if form.include_auth && !token.is_empty() {
        headers.push(("Authorization".to_string(), bearer_header(token)));
    }

    debug!(
        "built {} {url} with {} header(s), body: {}",
        form.method,
        headers.len(),
        body_kind(&body)
    );

    Ok(HttpRequest {
        method: form.method,
        url: url.to_string(),
        headers,
        body,
    })
}

/// True when `url` targets `localhost` over http or https.
///
/// The authority must be exactly `localhost` with an optional numeric port.
/// Userinfo is refused, since `localhost:3000@host` names `host`.
pub fn is_localhost_url(url: &str) -> bool {
    ALLOWED_PREFIXES
        .iter()
        .any(|prefix| url.strip_prefix(prefix).is_some_and(authority_tail_ok))
}

/// `rest` is the URL after `localhost`; the authority ends at the first
/// `/`, `?` or `#`.
fn authority_tail_ok(rest: &str) -> bool {
    let end = rest.find(&['/', '?', '#'][..]).unwrap_or(rest.len());
    match &rest[..end] {
        "" => true,
        tail => tail
            .strip_prefix(':')
            .is_some_and(|port| port.bytes().all(|b| b.is_ascii_digit())),
    }
}

/// `Authorization` value for `token`, never double-prefixed.
pub fn bearer_header(token: &str) -> String {
    if token.starts_with(BEARER_PREFIX) {
        token.to_string()
    } else {
        format!("{BEARER_PREFIX}{token}")
    }
}

fn parse_json(text: &str) -> Result<Value, ValidationError> {
    serde_json::from_str(text).map_err(|e| ValidationError::BadRequest(e.to_string()))
}

/// Top-level keys of a JSON object as text parts, index-like keys first and
/// the rest in document order.
///
/// Nested values are not flattened; they travel as their compact JSON text.
fn json_fields(text: &str) -> Result<Vec<MultipartPart>, ValidationError> {
    match json::normalize(parse_json(text)?) {
        Value::Object(map) => Ok(map
            .iter()
            .map(|(key, value)| MultipartPart::text(key, part_text(value)))
            .collect()),
        _ => Err(ValidationError::BadRequest(
            "multipart fields require a JSON object".to_string(),
        )),
    }
}

fn part_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn body_kind(body: &RequestBody) -> &'static str {
    match body {
        RequestBody::None => "none",
        RequestBody::Json(_) => "json",
        RequestBody::Multipart(_) => "multipart",
    }
}
