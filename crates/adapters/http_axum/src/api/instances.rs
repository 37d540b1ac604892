//! Handlers for instance views, diagnostics and the manual snapshot action.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use snapcam_app::fetcher::ImageFetcher;
use snapcam_app::instance::{Diagnostics, SnapcamInstance};
use snapcam_app::ports::{NotificationSink, NotificationSource, StatePublisher};
use snapcam_domain::config::{InstanceConfig, InstanceRecord};
use snapcam_domain::entity::slugify;
use snapcam_domain::error::SnapcamError;
use snapcam_domain::snapshot::Image;
use snapcam_domain::time::to_rfc3339;

use crate::error::ApiError;
use crate::state::AppState;

/// One entry of `GET /api/instances`.
#[derive(Debug, Serialize)]
pub struct InstanceSummary {
    pub name: String,
    pub entity_id: String,
    pub last_entity_id: Option<String>,
    #[serde(flatten)]
    pub diagnostics: DiagnosticsBody,
}

/// Diagnostic values as served over HTTP.
#[derive(Debug, Serialize)]
pub struct DiagnosticsBody {
    pub last_source: Option<String>,
    pub last_update: Option<String>,
    pub triggered: bool,
}

impl From<Diagnostics> for DiagnosticsBody {
    fn from(value: Diagnostics) -> Self {
        Self {
            last_source: value.last_source,
            last_update: value.last_update.map(to_rfc3339),
            triggered: value.triggered,
        }
    }
}

/// Optional body of `POST /api/instances/{name}/snapshot`.
#[derive(Debug, Default, Deserialize)]
pub struct SnapshotRequest {
    pub source_camera: Option<String>,
}

/// Possible responses from the image endpoints.
pub enum ImageResponse {
    Jpeg(Image),
}

impl IntoResponse for ImageResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Jpeg(image) => {
                ([(header::CONTENT_TYPE, "image/jpeg")], image.to_vec()).into_response()
            }
        }
    }
}

/// Possible responses from the snapshot endpoint.
pub enum SnapshotResponse {
    Accepted,
}

impl IntoResponse for SnapshotResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted => StatusCode::ACCEPTED.into_response(),
        }
    }
}

fn summary<B, Fe, P>(instance: &SnapcamInstance<B, Fe, P>) -> InstanceSummary
where
    B: NotificationSource + Clone,
    Fe: ImageFetcher + 'static,
    P: StatePublisher + Clone + 'static,
{
    let context = instance.context();
    InstanceSummary {
        name: instance.name().to_string(),
        entity_id: context.views.camera.clone(),
        last_entity_id: context
            .config
            .create_last_camera
            .then(|| context.views.last_camera.clone()),
        diagnostics: instance.diagnostics().into(),
    }
}

/// `GET /api/instances`
pub async fn list<B, Fe, P>(State(state): State<AppState<B, Fe, P>>) -> Json<Vec<InstanceSummary>>
where
    B: NotificationSource + NotificationSink + Clone + 'static,
    Fe: ImageFetcher + 'static,
    P: StatePublisher + Clone + 'static,
{
    let mut summaries = Vec::with_capacity(state.instances.len());
    for instance in state.instances.iter() {
        summaries.push(summary(&*instance.read().await));
    }
    Json(summaries)
}

/// `GET /api/instances/{name}/image`
pub async fn image<B, Fe, P>(
    State(state): State<AppState<B, Fe, P>>,
    Path(name): Path<String>,
) -> Result<ImageResponse, ApiError>
where
    B: NotificationSource + NotificationSink + Clone + 'static,
    Fe: ImageFetcher + 'static,
    P: StatePublisher + Clone + 'static,
{
    let instance = state
        .find(&name)
        .await
        .ok_or_else(|| ApiError::not_found("Instance", name.clone()))?;
    let image = instance
        .read()
        .await
        .primary_image()
        .ok_or_else(|| ApiError::not_found("Image", name))?;
    Ok(ImageResponse::Jpeg(image))
}

/// `GET /api/instances/{name}/image/last`
pub async fn last_image<B, Fe, P>(
    State(state): State<AppState<B, Fe, P>>,
    Path(name): Path<String>,
) -> Result<ImageResponse, ApiError>
where
    B: NotificationSource + NotificationSink + Clone + 'static,
    Fe: ImageFetcher + 'static,
    P: StatePublisher + Clone + 'static,
{
    let instance = state
        .find(&name)
        .await
        .ok_or_else(|| ApiError::not_found("Instance", name.clone()))?;
    let image = instance
        .read()
        .await
        .secondary_image()
        .ok_or_else(|| ApiError::not_found("Last camera", name))?;
    Ok(ImageResponse::Jpeg(image))
}

/// `POST /api/instances/{name}/snapshot`
///
/// Runs in the background; the response does not wait for the fetch.
pub async fn snapshot<B, Fe, P>(
    State(state): State<AppState<B, Fe, P>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<SnapshotResponse, ApiError>
where
    B: NotificationSource + NotificationSink + Clone + 'static,
    Fe: ImageFetcher + 'static,
    P: StatePublisher + Clone + 'static,
{
    let instance = state
        .find(&name)
        .await
        .ok_or_else(|| ApiError::not_found("Instance", name.clone()))?;
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        SnapshotRequest::default()
    } else {
        serde_json::from_slice::<SnapshotRequest>(&body)?
    };
    let camera = request
        .source_camera
        .filter(|camera| !camera.trim().is_empty());

    // a reconfiguration does not wait for the fetch
    let orchestrator = instance.read().await.orchestrator().clone();
    tokio::spawn(async move {
        if let Some(outcome) = orchestrator.request_snapshot(camera.as_deref()).await {
            tracing::debug!(instance = %name, ?outcome, "manual snapshot finished");
        }
    });
    Ok(SnapshotResponse::Accepted)
}

/// `GET /api/instances/{name}/diagnostics`
pub async fn diagnostics<B, Fe, P>(
    State(state): State<AppState<B, Fe, P>>,
    Path(name): Path<String>,
) -> Result<Json<DiagnosticsBody>, ApiError>
where
    B: NotificationSource + NotificationSink + Clone + 'static,
    Fe: ImageFetcher + 'static,
    P: StatePublisher + Clone + 'static,
{
    let instance = state
        .find(&name)
        .await
        .ok_or_else(|| ApiError::not_found("Instance", name))?;
    Ok(Json(instance.read().await.diagnostics().into()))
}

/// `PUT /api/instances/{name}`
///
/// Replaces the configuration of a running instance. Its images and
/// diagnostics carry over; its triggers are rebuilt from the new pairs.
pub async fn update<B, Fe, P>(
    State(state): State<AppState<B, Fe, P>>,
    Path(name): Path<String>,
    Json(record): Json<InstanceRecord>,
) -> Result<Json<InstanceSummary>, ApiError>
where
    B: NotificationSource + NotificationSink + Clone + 'static,
    Fe: ImageFetcher + 'static,
    P: StatePublisher + Clone + 'static,
{
    let instance = state
        .find(&name)
        .await
        .ok_or_else(|| ApiError::not_found("Instance", name))?;
    let (config, warnings) =
        InstanceConfig::from_record(&record, &state.roots).map_err(SnapcamError::from)?;
    for warning in &warnings {
        tracing::warn!(instance = %config.name, %warning, "instance configuration warning");
    }

    if let Some(other) = state.find(&config.name).await
        && !Arc::ptr_eq(&other, &instance)
    {
        return Err(ApiError::BadRequest(format!(
            "an instance named {} already exists",
            slugify(&config.name)
        )));
    }

    let mut instance = instance.write().await;
    instance.reconfigure(config);
    Ok(Json(summary(&*instance)))
}
