//! Local HTTP endpoint the browser extension talks to

pub mod handlers;
pub mod launcher;
pub mod listener;
pub mod state;

pub use launcher::{Launcher, ProcessLauncher};
pub use listener::{is_port_in_use, LaunchService};
pub use state::AppState;

use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

const NO_CACHE: &str = "no-store, no-cache, must-revalidate, max-age=0";

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/launch", get(handlers::launch))
        .route("/status", get(handlers::status))
        .fallback(handlers::not_found)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(NO_CACHE),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
