//! Full pipeline tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives form submissions
//! through `Dispatcher` over real HTTP, using a ureq agent as the host
//! transport. Multipart bodies are covered by the CLI crate's reqwest
//! transport instead.

use std::net::SocketAddr;

use localpostman_core::{
    Dispatcher, FailureKind, FormState, HttpMethod, HttpRequest, HttpResponse, RequestBody,
    ResponseOutcome, StatusClass, Transport, TransportError,
};

/// Executes requests with ureq, returning 4xx/5xx as data.
struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

fn with_headers<B>(
    mut req: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        req = req.header(name.as_str(), value.as_str());
    }
    req
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        // The mock server only listens on IPv4 loopback.
        let url = request.url.replacen("://localhost", "://127.0.0.1", 1);
        let headers = &request.headers;
        let agent = &self.agent;

        let result = match (request.method, &request.body) {
            (_, RequestBody::Multipart(_)) => panic!("multipart is not exercised over ureq"),
            (HttpMethod::Post, RequestBody::Json(text)) => {
                with_headers(agent.post(&url), headers).send(text.as_bytes())
            }
            (HttpMethod::Put, RequestBody::Json(text)) => {
                with_headers(agent.put(&url), headers).send(text.as_bytes())
            }
            (HttpMethod::Post, _) => with_headers(agent.post(&url), headers).send_empty(),
            (HttpMethod::Put, _) => with_headers(agent.put(&url), headers).send_empty(),
            (HttpMethod::Patch, _) => with_headers(agent.patch(&url), headers).send_empty(),
            (HttpMethod::Get, _) => with_headers(agent.get(&url), headers).call(),
            (HttpMethod::Delete, _) => with_headers(agent.delete(&url), headers).call(),
            (HttpMethod::Head, _) => with_headers(agent.head(&url), headers).call(),
            (HttpMethod::Options, _) => with_headers(agent.options(&url), headers).call(),
        };
        let mut response = result.map_err(|e| TransportError::Unreachable(e.to_string()))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            // ureq drops the reason phrase; use the canonical one for the code.
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn form(method: HttpMethod, url: String) -> FormState {
    FormState {
        url,
        method,
        ..FormState::default()
    }
}

fn expect_success(outcome: ResponseOutcome) -> localpostman_core::RenderedResponse {
    match outcome {
        ResponseOutcome::Success(rendered) => rendered,
        ResponseOutcome::Failure(failure) => panic!("unexpected failure: {failure:?}"),
    }
}

#[test]
fn login_token_round_trip() {
    let addr = start_server();
    let base = format!("http://localhost:{}", addr.port());
    let dispatcher = Dispatcher::new(UreqTransport::new());

    // Step 1: without a token the profile is 401, rendered normally.
    let rendered = expect_success(dispatcher.run(&form(HttpMethod::Get, format!("{base}/auth/me"))));
    assert_eq!(rendered.status_code, 401);
    assert_eq!(rendered.class, StatusClass::Error);
    assert!(rendered.is_application_error());

    // Step 2: log in; the token is picked out of the JSON response.
    let login = FormState {
        include_body: true,
        json_body: r#"{"username":"ada","password":"hunter2"}"#.to_string(),
        ..form(HttpMethod::Post, format!("{base}/auth/login"))
    };
    let rendered = expect_success(dispatcher.run(&login));
    assert_eq!(rendered.status_code, 200);
    assert_eq!(rendered.status_text, "OK");
    assert!(rendered.content_type.contains("application/json"));
    assert!(rendered.body_text.contains("\n  \"access_token\": "));
    let token = rendered.extracted_token.expect("login response carries a token");

    // Step 3: reuse the token as a bearer credential.
    let me = FormState {
        include_auth: true,
        bearer_token: token,
        ..form(HttpMethod::Get, format!("{base}/auth/me"))
    };
    let rendered = expect_success(dispatcher.run(&me));
    assert_eq!(rendered.status_code, 200);
    assert_eq!(rendered.class, StatusClass::Ok);
}

#[test]
fn json_body_and_headers_reach_the_server() {
    let addr = start_server();
    let dispatcher = Dispatcher::new(UreqTransport::new());

    let state = FormState {
        include_body: true,
        json_body: r#"{"a":1,"b":"x"}"#.to_string(),
        include_auth: true,
        bearer_token: "Bearer xyz".to_string(),
        ..form(HttpMethod::Put, format!("http://localhost:{}/echo", addr.port()))
    };
    let rendered = expect_success(dispatcher.run(&state));
    let echo: mock_server::Echo = serde_json::from_str(&rendered.body_text).unwrap();

    assert_eq!(echo.method, "PUT");
    assert_eq!(echo.content_type.as_deref(), Some("application/json"));
    assert_eq!(echo.authorization.as_deref(), Some("Bearer xyz"));
    assert_eq!(echo.body, "{\n  \"a\": 1,\n  \"b\": \"x\"\n}");
}

#[test]
fn get_sends_no_body_even_when_flags_are_set() {
    let addr = start_server();
    let dispatcher = Dispatcher::new(UreqTransport::new());

    let state = FormState {
        include_body: true,
        json_body: r#"{"ignored":true}"#.to_string(),
        ..form(HttpMethod::Get, format!("http://localhost:{}/echo", addr.port()))
    };
    let rendered = expect_success(dispatcher.run(&state));
    let echo: mock_server::Echo = serde_json::from_str(&rendered.body_text).unwrap();

    assert_eq!(echo.method, "GET");
    assert!(echo.content_type.is_none());
    assert!(echo.body.is_empty());
}

#[test]
fn text_and_broken_json_render_as_received() {
    let addr = start_server();
    let base = format!("http://localhost:{}", addr.port());
    let dispatcher = Dispatcher::new(UreqTransport::new());

    let rendered = expect_success(dispatcher.run(&form(HttpMethod::Get, format!("{base}/plain"))));
    assert_eq!(rendered.body_text, "pong");
    assert!(rendered.content_type.starts_with("text/plain"));
    assert_eq!(rendered.content_length_display(), "4");

    let rendered =
        expect_success(dispatcher.run(&form(HttpMethod::Get, format!("{base}/broken-json"))));
    assert_eq!(rendered.body_text, "{\"unterminated\": ");
    assert!(rendered.extracted_token.is_none());
}

#[test]
fn status_codes_are_classified() {
    let addr = start_server();
    let base = format!("http://localhost:{}", addr.port());
    let dispatcher = Dispatcher::new(UreqTransport::new());

    for (code, class) in [
        (204, StatusClass::Ok),
        (418, StatusClass::Error),
        (503, StatusClass::Error),
    ] {
        let rendered =
            expect_success(dispatcher.run(&form(HttpMethod::Get, format!("{base}/status/{code}"))));
        assert_eq!(rendered.status_code, code);
        assert_eq!(rendered.class, class, "{code}");
    }
}

#[test]
fn unreachable_server_is_a_transport_failure() {
    // Grab a free port, then release it so nothing is listening there.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let dispatcher = Dispatcher::new(UreqTransport::new());

    let outcome = dispatcher.run(&form(HttpMethod::Get, format!("http://localhost:{port}/")));
    let ResponseOutcome::Failure(failure) = outcome else {
        panic!("expected a transport failure");
    };
    assert_eq!(failure.kind, FailureKind::Transport);
    assert!(!failure.message.is_empty());
    assert!(failure.elapsed_ms.is_some());
}

#[test]
fn remote_hosts_are_refused_before_sending() {
    let dispatcher = Dispatcher::new(UreqTransport::new());

    let outcome = dispatcher.run(&form(HttpMethod::Get, "http://example.com/".to_string()));
    let ResponseOutcome::Failure(failure) = outcome else {
        panic!("expected a validation failure");
    };
    assert_eq!(failure.kind, FailureKind::Validation);
    assert_eq!(failure.title, "Invalid URL");
}
