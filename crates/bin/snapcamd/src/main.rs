//! # snapcamd — snapcam daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize logging
//! - Construct the in-process host (bus, cameras, state recorder)
//! - Construct the image sources and the fetcher dispatching to them
//! - Set up every configured instance
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT) and tear instances down
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

use snapcam_adapter_fs::LocalFileSource;
use snapcam_adapter_http_axum::router;
use snapcam_adapter_http_axum::state::AppState;
use snapcam_adapter_http_reqwest::HttpUrlSource;
use snapcam_adapter_virtual::{InProcessBus, StateRecorder, VirtualCameras};
use snapcam_app::fetcher::SourceFetcher;
use snapcam_app::instance::SnapcamInstance;
use snapcam_domain::paths::PathRoots;

use crate::config::{CameraConfig, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    let roots = config.path_roots();
    let instance_configs = config.instance_configs()?;

    // Host
    let bus = Arc::new(InProcessBus::default());
    let cameras = Arc::new(VirtualCameras::new());
    load_cameras(&cameras, &config.cameras, &roots);
    let recorder = Arc::new(StateRecorder::with_bus(Arc::clone(&bus)));

    // Sources
    let fetcher = Arc::new(SourceFetcher::new(
        cameras,
        LocalFileSource::new(),
        HttpUrlSource::new()?,
    ));

    // Instances
    let mut instances = Vec::with_capacity(instance_configs.len());
    for (instance_config, warnings) in instance_configs {
        for warning in &warnings {
            tracing::warn!(
                instance = %instance_config.name,
                %warning,
                "instance configuration warning"
            );
        }
        let instance = SnapcamInstance::setup(
            instance_config,
            Arc::clone(&bus),
            Arc::clone(&fetcher),
            Arc::clone(&recorder),
        )
        .await;
        instances.push(Arc::new(RwLock::new(instance)));
    }

    // HTTP
    let app = router::build(AppState::new(instances.clone(), Arc::clone(&bus), roots));
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, instances = instances.len(), "snapcamd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for instance in instances {
        match Arc::try_unwrap(instance) {
            Ok(instance) => instance.into_inner().teardown(),
            Err(instance) => {
                tracing::warn!(
                    instance = %instance.read().await.name(),
                    "instance still in use at shutdown"
                );
            }
        }
    }
    tracing::info!("snapcamd stopped");
    Ok(())
}

fn load_cameras(cameras: &VirtualCameras, entries: &[CameraConfig], roots: &PathRoots) {
    for entry in entries {
        let path = roots.resolve(&entry.file);
        match std::fs::read(&path) {
            Ok(bytes) => {
                tracing::debug!(camera = %entry.entity_id, path = %path.display(), "camera loaded");
                cameras.set_image(&entry.entity_id, bytes);
            }
            Err(err) => {
                tracing::warn!(
                    %err,
                    camera = %entry.entity_id,
                    path = %path.display(),
                    "failed to load camera image"
                );
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown requested");
}
