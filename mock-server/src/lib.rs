//! A small localhost API to point LocalPostman at.
//!
//! Routes cover every shape of response the client has to render: a login
//! that issues a token, a bearer-protected profile, an echo of whatever was
//! sent, a multipart upload, plain text, a body that lies about being JSON,
//! arbitrary status codes, and a redirect that points off localhost.

use std::{collections::HashSet, sync::Arc};

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct Login {
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Upload {
    pub files: Vec<UploadedFile>,
    /// Text fields in the order they were received.
    pub fields: Vec<(String, String)>,
}

/// Tokens handed out by `/auth/login`.
pub type Sessions = Arc<RwLock<HashSet<String>>>;

pub fn app() -> Router {
    let sessions: Sessions = Arc::new(RwLock::new(HashSet::new()));
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/echo", any(echo))
        .route("/upload", post(upload).put(upload))
        .route("/plain", get(plain))
        .route("/broken-json", get(broken_json))
        .route("/status/{code}", any(status))
        .route("/redirect/{port}", any(redirect))
        .with_state(sessions)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn login(
    State(sessions): State<Sessions>,
    Json(input): Json<Login>,
) -> (StatusCode, Json<Value>) {
    if input.username.is_empty() || input.password.is_empty() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "username and password are required"})),
        );
    }
    let token = Uuid::new_v4().to_string();
    sessions.write().await.insert(token.clone());
    (
        StatusCode::OK,
        Json(json!({"access_token": token, "token_type": "Bearer", "user": input.username})),
    )
}

async fn me(State(sessions): State<Sessions>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let known = match token {
        Some(token) => sessions.read().await.contains(token),
        None => false,
    };
    if known {
        (StatusCode::OK, Json(json!({"authenticated": true})))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"authenticated": false, "error": "missing or unknown bearer token"})),
        )
    }
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Echo> {
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(Echo {
        method: method.to_string(),
        content_type: header_text(header::CONTENT_TYPE),
        authorization: header_text(header::AUTHORIZATION),
        body,
    })
}

async fn upload(mut multipart: Multipart) -> Result<Json<Upload>, MultipartError> {
    let mut files = Vec::new();
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let size = field.bytes().await?.len();
                files.push(UploadedFile {
                    field: name,
                    file_name,
                    content_type,
                    size,
                });
            }
            None => fields.push((name, field.text().await?)),
        }
    }
    Ok(Json(Upload { files, fields }))
}

async fn plain() -> &'static str {
    "pong"
}

async fn broken_json() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "{\"unterminated\": ")
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

/// `302` to `/plain` on the loopback IP, which is not `localhost`.
async fn redirect(Path(port): Path<u16>) -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [(header::LOCATION, format!("http://127.0.0.1:{port}/plain"))],
    )
}
