use tokio::net::TcpListener;

/// Serves the mock API on `127.0.0.1:$PORT` (default 3000) for manual trials.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    println!("mock API on http://localhost:{port}");
    println!("  POST /auth/login   GET /auth/me   ANY /echo   POST|PUT /upload");
    println!("  GET /plain   GET /broken-json   ANY /status/{{code}}   ANY /redirect/{{port}}");
    mock_server::run(listener).await
}
