//! `Transport` backed by a blocking reqwest client.

use std::error::Error as _;

use localpostman_core::{
    HttpRequest, HttpResponse, MultipartPart, PartValue, RequestBody, Transport, TransportError,
};
use log::debug;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::redirect::Policy;
use reqwest::Method;

/// Sends requests with a blocking reqwest client.
///
/// Redirects are never followed: a 3xx reaches the renderer as is, and no
/// request leaves for a `Location` the localhost gate never saw. reqwest does
/// not expose the reason phrase, so `status_text` is the canonical phrase for
/// the code (empty for codes without one) rather than the server's own text.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> reqwest::Result<Self> {
        Ok(Self::with_client(Self::client_builder().build()?))
    }

    /// Client settings every `ReqwestTransport` expects; extend before
    /// handing the built client to `with_client`.
    pub fn client_builder() -> ClientBuilder {
        Client::builder().redirect(Policy::none())
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            RequestBody::None => builder,
            RequestBody::Json(text) => builder.body(text.clone()),
            RequestBody::Multipart(parts) => builder.multipart(multipart_form(parts)?),
        };

        let response = builder
            .send()
            .map_err(|e| TransportError::Unreachable(error_chain(&e)))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .text()
            .map_err(|e| TransportError::Body(error_chain(&e)))?;
        debug!("received {} byte(s) with status {status}", body.len());

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn multipart_form(parts: &[MultipartPart]) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for part in parts {
        form = match &part.value {
            PartValue::Text(text) => form.text(part.name.clone(), text.clone()),
            PartValue::File(file) => {
                let mut file_part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
                if let Some(content_type) = &file.content_type {
                    file_part = file_part
                        .mime_str(content_type)
                        .map_err(|e| TransportError::Unreachable(e.to_string()))?;
                }
                form.part(part.name.clone(), file_part)
            }
        };
    }
    Ok(form)
}

/// reqwest keeps the useful part ("Connection refused") in the source chain.
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
