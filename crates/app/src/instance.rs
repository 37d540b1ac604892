//! Instance lifecycle — setup, reconfiguration and teardown of one snapcam.

use std::sync::Arc;

use tokio::task::JoinHandle;

use snapcam_domain::config::InstanceConfig;
use snapcam_domain::snapshot::Image;
use snapcam_domain::time::Timestamp;

use crate::context::InstanceContext;
use crate::fetcher::ImageFetcher;
use crate::orchestrator::{SnapshotOrchestrator, SnapshotOutcome};
use crate::ports::{NotificationSource, StatePublisher};
use crate::router::{SubscriptionKey, TriggerRouter};
use crate::views::ViewPublisher;

/// Read-only diagnostic values of an instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics {
    pub last_source: Option<String>,
    pub last_update: Option<Timestamp>,
    pub triggered: bool,
}

/// A running snapcam: its context, trigger subscriptions and view task.
pub struct SnapcamInstance<B, Fe, P> {
    bus: B,
    fetcher: Arc<Fe>,
    publisher: P,
    orchestrator: SnapshotOrchestrator<Fe>,
    router: TriggerRouter<B, Fe>,
    views: Option<JoinHandle<()>>,
}

impl<B, Fe, P> SnapcamInstance<B, Fe, P>
where
    B: NotificationSource + Clone,
    Fe: ImageFetcher + 'static,
    P: StatePublisher + Clone + 'static,
{
    /// Subscribe to triggers, start publishing views and take the startup
    /// snapshots.
    pub async fn setup(config: InstanceConfig, bus: B, fetcher: Arc<Fe>, publisher: P) -> Self {
        let context = InstanceContext::new(config);
        tracing::info!(
            instance = %context.name(),
            id = %context.id,
            pairs = context.config.pairs.len(),
            "setting up instance"
        );
        let orchestrator = SnapshotOrchestrator::new(context, Arc::clone(&fetcher));
        let mut instance = Self {
            router: TriggerRouter::new(bus.clone(), orchestrator.clone()),
            bus,
            fetcher,
            publisher,
            orchestrator,
            views: None,
        };
        instance.start();
        instance.orchestrator.seed().await;
        instance
    }

    /// Replace the configuration wholesale.
    ///
    /// Subscriptions are rebuilt from scratch. The snapshot store and the
    /// triggered pulse carry over.
    pub fn reconfigure(&mut self, config: InstanceConfig) {
        self.stop();
        let previous = self.orchestrator.context();
        let context = InstanceContext::with_state(
            previous.id,
            config,
            previous.store.clone(),
            previous.pulse.clone(),
        );
        tracing::info!(
            instance = %context.name(),
            id = %context.id,
            pairs = context.config.pairs.len(),
            "reconfiguring instance"
        );
        self.orchestrator = SnapshotOrchestrator::new(context, Arc::clone(&self.fetcher));
        self.router = TriggerRouter::new(self.bus.clone(), self.orchestrator.clone());
        self.start();
    }

    /// Release every subscription and stop the view task.
    ///
    /// Fetches already in flight complete on their own.
    pub fn teardown(mut self) {
        self.stop();
        tracing::info!(instance = %self.name(), "instance torn down");
    }

    /// Manual snapshot, never rate limited.
    pub async fn request_snapshot(&self, camera: Option<&str>) -> Option<SnapshotOutcome> {
        self.orchestrator.request_snapshot(camera).await
    }

    /// Handle on the current snapshot logic, usable without holding the instance.
    #[must_use]
    pub fn orchestrator(&self) -> &SnapshotOrchestrator<Fe> {
        &self.orchestrator
    }

    #[must_use]
    pub fn context(&self) -> &InstanceContext {
        self.orchestrator.context()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.context().name()
    }

    /// Image of the primary camera view.
    #[must_use]
    pub fn primary_image(&self) -> Option<Image> {
        self.context().store.snapshot().primary_image()
    }

    /// Image of the secondary camera view, `None` when that view is disabled.
    #[must_use]
    pub fn secondary_image(&self) -> Option<Image> {
        let context = self.context();
        context
            .config
            .create_last_camera
            .then(|| context.store.snapshot().secondary_image())
    }

    #[must_use]
    pub fn diagnostics(&self) -> Diagnostics {
        let context = self.context();
        let snapshot = context.store.snapshot();
        Diagnostics {
            last_source: snapshot.last_source,
            last_update: snapshot.last_update,
            triggered: context.pulse.is_on(),
        }
    }

    #[must_use]
    pub fn subscriptions(&self) -> Vec<SubscriptionKey> {
        self.router.active()
    }

    fn start(&mut self) {
        self.router.subscribe();
        let views = ViewPublisher::new(self.context().clone(), self.publisher.clone());
        self.views = Some(views.spawn());
    }

    fn stop(&mut self) {
        self.router.release();
        if let Some(handle) = self.views.take() {
            handle.abort();
        }
    }
}

impl<B, Fe, P> Drop for SnapcamInstance<B, Fe, P> {
    fn drop(&mut self) {
        if let Some(handle) = self.views.take() {
            handle.abort();
        }
    }
}
