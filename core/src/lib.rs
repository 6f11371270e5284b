//! Request-composition and response-rendering pipeline for LocalPostman.
//!
//! # Overview
//! Turns raw form values into a validated `HttpRequest`, hands it to a
//! host-supplied `Transport`, and turns whatever comes back into a
//! `ResponseOutcome` ready for display (host-does-IO pattern). Nothing in this
//! crate opens a socket.
//!
//! # Design
//! - `build_request` is pure and rejects any URL outside `http(s)://localhost`
//!   before a request descriptor exists.
//! - Only POST and PUT carry bodies; the rule is an exhaustive match on
//!   `HttpMethod`.
//! - `render` never fails: a body declared as JSON that does not parse is
//!   shown as received.
//! - Request and response JSON share one pretty-printer (`json::to_pretty`)
//!   whose layout follows `JSON.stringify(v, null, 2)`.
//! - `Dispatcher` tags each submission with a `Ticket` so a late outcome from
//!   an older submission cannot overwrite a newer one.

pub mod builder;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod http;
pub mod json;
pub mod render;
pub mod token;

pub use builder::{build_request, FormState};
pub use dispatch::{
    send, Dispatcher, Failure, FailureKind, Generations, ResponseOutcome, Submission, Ticket,
    Transport,
};
pub use display::{badge, format_outcome, Badge};
pub use error::{TransportError, ValidationError};
pub use http::{
    FileAttachment, HttpMethod, HttpRequest, HttpResponse, MultipartPart, PartValue, RequestBody,
};
pub use render::{render, RenderedResponse, StatusClass};
pub use token::extract_token;
