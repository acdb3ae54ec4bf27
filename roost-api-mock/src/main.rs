//! Standalone mock booking server
//!
//! Binds a local port and serves the seeded demo dataset. Useful for
//! driving the client by hand without the production backend.

use roost_api_mock::{router, state};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenv::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roost_api_mock=info,tower_http=info".into()),
        )
        .init();

    let port = std::env::var("ROOST_MOCK_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let app_state = state::seeded();
    let app = router(app_state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("roost-api-mock listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
