//! Text the display layer shows for an outcome.
//!
//! Every surface (terminal, C host) reads the same badge and response text,
//! so the wording lives here rather than in the adapters.

use std::fmt::Write as _;

use crate::dispatch::{Failure, FailureKind, ResponseOutcome};
use crate::render::{RenderedResponse, StatusClass};

/// Troubleshooting hints appended to a transport failure.
pub const NETWORK_HINTS: [&str; 4] = [
    "Server is not running",
    "CORS policy restriction",
    "Invalid URL or port",
    "Network connectivity issue",
];

/// Status badge: a label such as `200`, `400` or `ERR`, plus its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub text: String,
    pub class: StatusClass,
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.label, self.text)
    }
}

pub fn badge(outcome: &ResponseOutcome) -> Badge {
    match outcome {
        ResponseOutcome::Success(r) => Badge {
            label: r.status_code.to_string(),
            text: r.status_text.clone(),
            class: r.class,
        },
        ResponseOutcome::Failure(f) => Badge {
            label: pseudo_status(f.kind).to_string(),
            text: f.title.clone(),
            class: StatusClass::Error,
        },
    }
}

/// `400` for input rejected before sending, `ERR` for everything else.
pub fn pseudo_status(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Validation => "400",
        FailureKind::Parse | FailureKind::Transport => "ERR",
    }
}

/// Full response panel text for `outcome`.
pub fn format_outcome(outcome: &ResponseOutcome) -> String {
    match outcome {
        ResponseOutcome::Success(r) => format_success(r),
        ResponseOutcome::Failure(f) => format_failure(f),
    }
}

fn format_success(r: &RenderedResponse) -> String {
    format!(
        "Status: {} {}\nTime: {}ms\nContent-Type: {}\nContent-Length: {}\n\n{}",
        r.status_code,
        r.status_text,
        r.elapsed_ms,
        r.content_type,
        r.content_length_display(),
        r.body_text
    )
}

fn format_failure(f: &Failure) -> String {
    match f.kind {
        FailureKind::Validation => f.message.clone(),
        FailureKind::Parse => format!("Parse Error: {}", f.message),
        FailureKind::Transport => {
            let mut out = format!("Network Error: {}\n\nPossible causes:", f.message);
            for hint in NETWORK_HINTS {
                let _ = write!(out, "\n• {hint}");
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TransportError, ValidationError};
    use crate::http::HttpResponse;
    use crate::render::render;

    #[test]
    fn success_panel_lists_metadata_then_body() {
        let rendered = render(
            HttpResponse {
                status: 201,
                status_text: "Created".to_string(),
                headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
                body: "made it".to_string(),
            },
            42,
        );
        let outcome = ResponseOutcome::Success(rendered);
        assert_eq!(
            format_outcome(&outcome),
            "Status: 201 Created\nTime: 42ms\nContent-Type: text/plain\nContent-Length: N/A\n\nmade it"
        );
        assert_eq!(badge(&outcome).to_string(), "201 Created");
        assert_eq!(badge(&outcome).class, StatusClass::Ok);
    }

    #[test]
    fn validation_failure_shows_400_badge() {
        let outcome =
            ResponseOutcome::Failure(Failure::from_validation(&ValidationError::InvalidUrl));
        let b = badge(&outcome);
        assert_eq!(b.to_string(), "400 Invalid URL");
        assert_eq!(b.class, StatusClass::Error);
        assert!(format_outcome(&outcome).contains("Only localhost URLs are allowed"));
    }

    #[test]
    fn transport_failure_lists_hints() {
        let outcome = ResponseOutcome::Failure(Failure::from_transport(
            TransportError::Unreachable("connection refused".to_string()),
            7,
        ));
        assert_eq!(badge(&outcome).to_string(), "ERR Network Error");
        let text = format_outcome(&outcome);
        assert!(text.starts_with("Network Error: connection refused\n\nPossible causes:"));
        assert!(text.ends_with("• Network connectivity issue"));
        assert_eq!(text.matches('•').count(), NETWORK_HINTS.len());
    }

    #[test]
    fn parse_failure_uses_err_label() {
        let outcome = ResponseOutcome::Failure(Failure::from_transport(
            TransportError::Body("stream did not contain valid UTF-8".to_string()),
            1,
        ));
        assert_eq!(badge(&outcome).to_string(), "ERR Parse Error");
        assert_eq!(
            format_outcome(&outcome),
            "Parse Error: stream did not contain valid UTF-8"
        );
    }
}
