//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod host;
#[allow(clippy::missing_errors_doc)]
pub mod instances;

use axum::Router;
use axum::routing::{get, post, put};

use snapcam_app::fetcher::ImageFetcher;
use snapcam_app::ports::{NotificationSink, NotificationSource, StatePublisher};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<B, Fe, P>() -> Router<AppState<B, Fe, P>>
where
    B: NotificationSource + NotificationSink + Clone + 'static,
    Fe: ImageFetcher + 'static,
    P: StatePublisher + Clone + 'static,
{
    Router::new()
        // Instances
        .route("/instances", get(instances::list::<B, Fe, P>))
        .route("/instances/{name}", put(instances::update::<B, Fe, P>))
        .route("/instances/{name}/image", get(instances::image::<B, Fe, P>))
        .route(
            "/instances/{name}/image/last",
            get(instances::last_image::<B, Fe, P>),
        )
        .route(
            "/instances/{name}/snapshot",
            post(instances::snapshot::<B, Fe, P>),
        )
        .route(
            "/instances/{name}/diagnostics",
            get(instances::diagnostics::<B, Fe, P>),
        )
        // Host bus
        .route("/states/{entity_id}", post(host::set_state::<B, Fe, P>))
        .route("/events/{event_type}", post(host::fire_event::<B, Fe, P>))
}
