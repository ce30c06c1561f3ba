//! Axum router construction.

use axum::http::{header, Method};
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::middleware::request_id::{request_id_middleware, X_REQUEST_ID};
use crate::routes;

/// Build the application router with all routes and middleware layers.
pub fn build_router(ctx: AppContext) -> Router {
    // Browsers need the range headers exposed to drive seeking.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([
            header::CONTENT_RANGE,
            header::ACCEPT_RANGES,
            header::CONTENT_LENGTH,
            X_REQUEST_ID.clone(),
        ]);

    let api = Router::new()
        .route("/videos", get(routes::videos::list_videos))
        .route("/stream/{resource_id}", get(routes::stream::stream_resource));

    Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api", api)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
