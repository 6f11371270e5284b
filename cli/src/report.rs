//! Terminal rendering of an outcome.

use localpostman_core::{badge, format_outcome, ResponseOutcome};

/// Process exit code: 0 for a 1xx-3xx response, 1 when the server answered
/// with an error status, 2 when no response could be rendered.
pub fn exit_code(outcome: &ResponseOutcome) -> u8 {
    match outcome {
        ResponseOutcome::Success(r) if r.is_application_error() => 1,
        ResponseOutcome::Success(_) => 0,
        ResponseOutcome::Failure(_) => 2,
    }
}

/// Badge line, the response panel, and the extracted token if there is one.
pub fn report(outcome: &ResponseOutcome) -> String {
    let mut out = format!("{}\n\n{}", badge(outcome), format_outcome(outcome));
    if let Some(token) = token(outcome) {
        out.push_str("\n\nToken: ");
        out.push_str(token);
    }
    out
}

pub fn token(outcome: &ResponseOutcome) -> Option<&str> {
    match outcome {
        ResponseOutcome::Success(r) => r.extracted_token.as_deref(),
        ResponseOutcome::Failure(_) => None,
    }
}
