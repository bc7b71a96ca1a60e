pub mod health;

use axum::{
    http::{header, HeaderName, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, Any, CorsLayer};

use crate::gateway::handlers;
use crate::state::AppState;

/// Request headers the browser client may send cross-origin: the bearer
/// token and content type, plus the two extra headers the web app's auth
/// SDK attaches to every call.
fn allowed_headers() -> Vec<HeaderName> {
    vec![
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        HeaderName::from_static("x-client-info"),
        HeaderName::from_static("apikey"),
    ]
}

/// CORS policy for all gateway responses. `OPTIONS` preflights short-circuit
/// inside the layer and never reach a handler.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::list(allowed_headers()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/ai", post(handlers::handle_ai))
        .layer(cors_layer())
        .with_state(state)
}
