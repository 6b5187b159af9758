//! # ophir-api
//!
//! HTTP surface of Ophir Estate: session auth, the public contact form, the
//! property catalog, and image uploads. Handlers only talk to the ports in
//! `ophir-core`; the binary decides which plugins sit behind them.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod session;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post};
use axum::Router;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use handlers::{auth, contacts, properties, upload};

/// Every route under `/api`, without layers.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/check", get(auth::check))
        .route("/api/contact", post(contacts::submit))
        .route("/api/contacts", get(contacts::list))
        .route("/api/contacts/{id}", delete(contacts::delete))
        .route("/api/properties", get(properties::list).post(properties::create))
        .route(
            "/api/properties/{id}",
            patch(properties::update).delete(properties::delete),
        )
        .route(
            "/api/upload",
            post(upload::upload).layer(DefaultBodyLimit::max(upload::MAX_UPLOAD_BYTES)),
        )
}

/// The full application: routes, request tracing and CORS.
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    api_routes()
        .layer(middleware::cors_policy(allowed_origins))
        .layer(middleware::standard_middleware())
        .with_state(state)
}
