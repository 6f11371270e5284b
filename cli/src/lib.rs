//! Terminal adapter for the LocalPostman pipeline.
//!
//! Maps command-line options onto a `FormState`, sends it over reqwest and
//! prints what the core renders. All request and response rules live in
//! `localpostman-core`.

pub mod options;
pub mod report;
pub mod transport;

pub use options::{parse_options, Options};
pub use report::{exit_code, report};
pub use transport::ReqwestTransport;
