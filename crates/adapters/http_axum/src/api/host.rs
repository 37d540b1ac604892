//! Handlers that play the host: state changes and events on the bus.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};

use snapcam_app::fetcher::ImageFetcher;
use snapcam_app::ports::{NotificationSink, NotificationSource, StatePublisher};
use snapcam_domain::notification::StateChange;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for setting an entity state.
#[derive(Deserialize)]
pub struct SetStateRequest {
    pub state: String,
}

/// `POST /api/states/{entity_id}`
pub async fn set_state<B, Fe, P>(
    State(state): State<AppState<B, Fe, P>>,
    Path(entity_id): Path<String>,
    Json(request): Json<SetStateRequest>,
) -> Json<StateChange>
where
    B: NotificationSource + NotificationSink + Clone + 'static,
    Fe: ImageFetcher + 'static,
    P: StatePublisher + Clone + 'static,
{
    Json(state.bus.set_state(&entity_id, &request.state))
}

/// `POST /api/events/{event_type}`
///
/// The body, when present, must be a JSON object and becomes the payload.
pub async fn fire_event<B, Fe, P>(
    State(state): State<AppState<B, Fe, P>>,
    Path(event_type): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError>
where
    B: NotificationSource + NotificationSink + Clone + 'static,
    Fe: ImageFetcher + 'static,
    P: StatePublisher + Clone + 'static,
{
    let data = if body.iter().all(u8::is_ascii_whitespace) {
        Map::new()
    } else {
        serde_json::from_slice::<Map<String, Value>>(&body)?
    };
    state.bus.fire_event(&event_type, data);
    Ok(StatusCode::ACCEPTED)
}
