use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, Uri},
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use clap::Parser;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use minirest::auth::{AuthContext, JwtCodec};
use minirest::dispatcher::RequestDispatcher;
use minirest::handlers::mount_user_routes;
use minirest::store::MemoryStore;

#[derive(Parser, Debug)]
#[command(name = "minirest", about = "Minimal REST scaffolding demo server")]
struct Cli {
    /// Port to listen on (overrides config and the PORT env var)
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<RequestDispatcher>,
    codec: JwtCodec,
}

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up SECURITY_JWT_SECRET etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = minirest::config::config();
    tracing::info!("starting minirest in {:?} mode", config.environment);

    let codec = JwtCodec::from_config();
    let mut dispatcher = RequestDispatcher::new();
    mount_user_routes(&mut dispatcher, Arc::new(MemoryStore::new()), codec.clone());

    let app = app(AppState {
        dispatcher: Arc::new(dispatcher),
        codec,
    });

    let port = cli
        .port
        .or_else(|| std::env::var("PORT").ok().and_then(|s| s.parse().ok()))
        .unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", config.server.bind_address, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("minirest listening on http://{}", bind_addr);
    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    let config = minirest::config::config();

    let mut router = Router::new()
        .route("/health", get(health))
        .route("/", any(handle))
        .route("/*path", any(handle))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes));

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if config.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    router
}

/// Every non-health request funnels into the dispatcher.
async fn handle(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let ctx = AuthContext::from_headers(&headers, &state.codec);
    match state
        .dispatcher
        .dispatch(method.as_str(), uri.path(), &body, &ctx)
        .await
    {
        Ok(payload) => ([(header::CONTENT_TYPE, "application/json")], payload).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
