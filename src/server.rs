use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::MAX_REPORT_BODY_BYTES;
use crate::state::SharedState;

pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(crate::routes::health::health))
        // Reports: the slug wildcard swallows owner/name/version[/...]
        .route(
            "/reports/{*slug}",
            get(crate::routes::reports::get_report).put(crate::routes::reports::put_report),
        )
        .layer(DefaultBodyLimit::max(MAX_REPORT_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(cors)
        .with_state(state)
}
