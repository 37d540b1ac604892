//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use snapcam_app::fetcher::ImageFetcher;
use snapcam_app::ports::{NotificationSink, NotificationSource, StatePublisher};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests the API routes under `/api` and logs each request/response through
/// a [`TraceLayer`].
pub fn build<B, Fe, P>(state: AppState<B, Fe, P>) -> Router
where
    B: NotificationSource + NotificationSink + Clone + 'static,
    Fe: ImageFetcher + 'static,
    P: StatePublisher + Clone + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
