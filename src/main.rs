use axum::{
    extract::State,
    http::Method,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::any::Any as PanicPayload;
use std::net::SocketAddr;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod config;
mod database;
mod dtos;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod state;

use config::AppConfig;
use errors::AppError;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AppConfig::from_env();
    let addr = resolve_addr(&config)?;
    let app_state = initialize_app_state(config)?;

    let app = build_router(app_state);
    start_server(app, addr).await
}

fn resolve_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    Ok(addr)
}

fn initialize_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    for group in config.missing_credentials() {
        tracing::error!("❌ Missing {} credentials in environment variables", group);
    }
    tracing::debug!("Config: {}", config.get_config_info());

    let app_state = AppState::from_config(config)?;
    tracing::info!(
        "✅ OTP service initialized with {} user store",
        app_state.otp_service.backend()
    );

    Ok(app_state)
}

pub(crate) fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/api/health", get(api_health_check))
        .nest("/functions/v1", routes::otp_routes::otp_routes())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn start_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("🚀 Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind to {}: {}", addr, e);
        e
    })?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn handle_panic(err: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::internal(format!("handler panicked: {}", detail)).into_response()
}

async fn root_handler() -> &'static str {
    "🔐 MediSafe OTP API"
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn api_health_check(State(state): State<AppState>) -> Json<Value> {
    let missing = state.config.missing_credentials();
    let status = if missing.is_empty() { "healthy" } else { "degraded" };

    Json(json!({
        "status": status,
        "store": state.otp_service.backend(),
        "missing_credentials": missing,
        "config": state.config.get_config_info(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
