//! Runs a built request through a `Transport` and classifies what comes back.
//!
//! # Design
//! The core never performs I/O itself. `Transport` is the seam where a host
//! plugs in its HTTP client; `send` only adds timing and routes the result to
//! the renderer. `Dispatcher` layers a generation counter on top so that an
//! outcome which arrives after a newer submission has started is discarded
//! instead of overwriting the newer result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use log::{debug, warn};

use crate::builder::{build_request, FormState};
use crate::error::{TransportError, ValidationError};
use crate::http::{HttpRequest, HttpResponse};
use crate::render::{render, RenderedResponse};

/// Executes an `HttpRequest` against the network.
///
/// Non-2xx responses are `Ok`; only a failure to obtain a response at all,
/// or to read its body, is an `Err`.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

/// Which stage of a submission failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Rejected by `build_request`; nothing was sent.
    Validation,
    /// A response arrived but its body could not be read.
    Parse,
    /// No response was obtained.
    Transport,
}

/// A submission that produced no renderable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub title: String,
    pub message: String,
    pub elapsed_ms: Option<u64>,
}

impl Failure {
    pub fn from_validation(err: &ValidationError) -> Self {
        Self {
            kind: FailureKind::Validation,
            title: err.title().to_string(),
            message: err.to_string(),
            elapsed_ms: None,
        }
    }

    pub fn from_transport(err: TransportError, elapsed_ms: u64) -> Self {
        let (kind, title, message) = match err {
            TransportError::Unreachable(msg) => (FailureKind::Transport, "Network Error", msg),
            TransportError::Body(msg) => (FailureKind::Parse, "Parse Error", msg),
        };
        Self {
            kind,
            title: title.to_string(),
            message,
            elapsed_ms: Some(elapsed_ms),
        }
    }
}

/// Result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    Success(RenderedResponse),
    Failure(Failure),
}

impl ResponseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ResponseOutcome::Success(_))
    }
}

/// Send `request` through `transport`, timing the round-trip.
pub fn send<T: Transport + ?Sized>(request: &HttpRequest, transport: &T) -> ResponseOutcome {
    let start = Instant::now();
    let result = transport.send(request);
    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    match result {
        Ok(response) => {
            debug!(
                "{} {} -> {} in {elapsed_ms}ms",
                request.method, request.url, response.status
            );
            ResponseOutcome::Success(render(response, elapsed_ms))
        }
        Err(err) => {
            warn!("{} {} failed after {elapsed_ms}ms: {err}", request.method, request.url);
            ResponseOutcome::Failure(Failure::from_transport(err, elapsed_ms))
        }
    }
}

/// Generation number handed out when a submission starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

/// Monotonic submission counter. Only the most recent ticket is current.
#[derive(Debug, Default)]
pub struct Generations {
    latest: AtomicU64,
}

impl Generations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new submission; every earlier ticket becomes stale.
    pub fn begin(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }
}

/// An outcome tagged with the ticket of the submission that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub ticket: Ticket,
    pub outcome: ResponseOutcome,
}

/// Build, send and render form submissions over one transport.
#[derive(Debug)]
pub struct Dispatcher<T> {
    transport: T,
    generations: Generations,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            generations: Generations::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mark the start of a submission. Call before `submit`.
    pub fn begin(&self) -> Ticket {
        self.generations.begin()
    }

    /// Run one submission. Validation failures never reach the transport.
    pub fn submit(&self, ticket: Ticket, form: &FormState) -> Submission {
        let outcome = match build_request(form) {
            Ok(request) => send(&request, &self.transport),
            Err(err) => ResponseOutcome::Failure(Failure::from_validation(&err)),
        };
        Submission { ticket, outcome }
    }

    /// Hand back the outcome only if no newer submission has begun since.
    pub fn accept(&self, submission: Submission) -> Option<ResponseOutcome> {
        if self.generations.is_current(submission.ticket) {
            Some(submission.outcome)
        } else {
            debug!("discarding stale outcome for ticket {}", submission.ticket.0);
            None
        }
    }

    /// `begin` + `submit` for callers that never overlap submissions.
    pub fn run(&self, form: &FormState) -> ResponseOutcome {
        let ticket = self.begin();
        self.submit(ticket, form).outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::render::StatusClass;
    use std::cell::{Cell, RefCell};

    /// Records every request and replays a canned result.
    struct Canned {
        result: Result<HttpResponse, TransportError>,
        calls: Cell<usize>,
        last: RefCell<Option<HttpRequest>>,
    }

    impl Canned {
        fn new(result: Result<HttpResponse, TransportError>) -> Self {
            Self {
                result,
                calls: Cell::new(0),
                last: RefCell::new(None),
            }
        }
    }

    impl Transport for Canned {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.calls.set(self.calls.get() + 1);
            *self.last.borrow_mut() = Some(request.clone());
            self.result.clone()
        }
    }

    fn ok_json(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }
    }

    fn form(url: &str) -> FormState {
        FormState {
            url: url.to_string(),
            method: HttpMethod::Get,
            ..FormState::default()
        }
    }

    #[test]
    fn invalid_form_never_reaches_transport() {
        let dispatcher = Dispatcher::new(Canned::new(Ok(ok_json("{}"))));
        let outcome = dispatcher.run(&form("https://example.com/api"));

        let ResponseOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.kind, FailureKind::Validation);
        assert_eq!(failure.title, "Invalid URL");
        assert!(failure.elapsed_ms.is_none());
        assert_eq!(dispatcher.transport().calls.get(), 0);
    }

    #[test]
    fn successful_response_is_rendered() {
        let dispatcher = Dispatcher::new(Canned::new(Ok(ok_json(r#"{"access_token":"abc123"}"#))));
        let outcome = dispatcher.run(&form("http://localhost:3000/login"));

        let ResponseOutcome::Success(rendered) = outcome else {
            panic!("expected success");
        };
        assert_eq!(rendered.status_code, 200);
        assert_eq!(rendered.extracted_token.as_deref(), Some("abc123"));
        assert_eq!(dispatcher.transport().calls.get(), 1);
        let sent = dispatcher.transport().last.borrow().clone().unwrap();
        assert_eq!(sent.url, "http://localhost:3000/login");
    }

    #[test]
    fn error_status_is_still_a_success_outcome() {
        let mut resp = ok_json(r#"{"error":"nope"}"#);
        resp.status = 500;
        resp.status_text = "Internal Server Error".to_string();
        let outcome = send(&build_request(&form("http://localhost")).unwrap(), &Canned::new(Ok(resp)));

        let ResponseOutcome::Success(rendered) = outcome else {
            panic!("expected success");
        };
        assert_eq!(rendered.class, StatusClass::Error);
    }

    #[test]
    fn transport_rejection_becomes_transport_failure() {
        let transport = Canned::new(Err(TransportError::Unreachable(
            "Connection refused (os error 111)".to_string(),
        )));
        let outcome = send(&build_request(&form("http://localhost:1")).unwrap(), &transport);

        let ResponseOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.kind, FailureKind::Transport);
        assert_eq!(failure.title, "Network Error");
        assert_eq!(failure.message, "Connection refused (os error 111)");
        assert!(failure.elapsed_ms.is_some());
    }

    #[test]
    fn unreadable_body_becomes_parse_failure() {
        let transport = Canned::new(Err(TransportError::Body("invalid utf-8".to_string())));
        let outcome = send(&build_request(&form("http://localhost")).unwrap(), &transport);

        let ResponseOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.kind, FailureKind::Parse);
        assert_eq!(failure.title, "Parse Error");
    }

    #[test]
    fn stale_outcome_is_discarded() {
        let dispatcher = Dispatcher::new(Canned::new(Ok(ok_json("{}"))));
        let first = dispatcher.begin();
        let second = dispatcher.begin();

        let late = dispatcher.submit(first, &form("http://localhost:3000/slow"));
        let fresh = dispatcher.submit(second, &form("http://localhost:3000/fast"));

        assert!(dispatcher.accept(late).is_none());
        assert!(dispatcher.accept(fresh).is_some());
    }

    #[test]
    fn generations_are_monotonic() {
        let generations = Generations::new();
        let a = generations.begin();
        let b = generations.begin();
        assert!(b > a);
        assert!(!generations.is_current(a));
        assert!(generations.is_current(b));
    }

    #[test]
    fn transport_works_through_references_and_boxes() {
        let canned = Canned::new(Ok(ok_json("{}")));
        let boxed: Box<dyn Transport> = Box::new(Canned::new(Ok(ok_json("{}"))));
        let request = build_request(&form("http://localhost")).unwrap();
        assert!(send(&request, &&canned).is_success());
        assert!(send(&request, &boxed).is_success());
    }
}
