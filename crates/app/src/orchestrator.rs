//! Snapshot Orchestrator — one snapshot attempt, from fetch to store rotation.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tokio::task::JoinHandle;

use snapcam_domain::pair::TriggerPair;
use snapcam_domain::time::now;

use crate::context::InstanceContext;
use crate::fetcher::ImageFetcher;
use crate::gate::CooldownGate;

/// What a snapshot attempt ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// The store was rotated with `bytes` bytes.
    Updated { bytes: usize },
    /// The source had nothing; the store is unchanged.
    NoData,
    /// The attempt crashed; the store is unchanged.
    Failed,
}

/// Runs snapshot attempts for one instance.
pub struct SnapshotOrchestrator<Fe> {
    context: InstanceContext,
    gate: CooldownGate,
    fetcher: Arc<Fe>,
}

impl<Fe> Clone for SnapshotOrchestrator<Fe> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            gate: self.gate.clone(),
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

impl<Fe> SnapshotOrchestrator<Fe>
where
    Fe: ImageFetcher + 'static,
{
    pub fn new(context: InstanceContext, fetcher: Arc<Fe>) -> Self {
        let gate = context.gate();
        Self {
            context,
            gate,
            fetcher,
        }
    }

    pub fn context(&self) -> &InstanceContext {
        &self.context
    }

    /// Fetch from `pair` and rotate the store when bytes came back.
    ///
    /// Zero-length bytes are a valid image. Only a missing image leaves the
    /// store untouched.
    #[tracing::instrument(skip(self, pair), fields(instance = %self.context.name(), source = %pair.label()))]
    pub async fn snapshot(&self, pair: &TriggerPair) -> SnapshotOutcome {
        let Some(image) = self.fetcher.fetch(&pair.source).await else {
            tracing::warn!("snapshot returned no image, keeping previous one");
            return SnapshotOutcome::NoData;
        };
        let bytes = image.len();
        self.context.record_snapshot(image, pair.label(), now());
        tracing::debug!(bytes, "snapshot stored");
        SnapshotOutcome::Updated { bytes }
    }

    /// Like [`snapshot`](Self::snapshot), in a task of its own so a panic
    /// inside a source is reported as [`SnapshotOutcome::Failed`].
    pub async fn snapshot_isolated(&self, pair: TriggerPair) -> SnapshotOutcome {
        let this = self.clone();
        let label = pair.label();
        let handle = tokio::spawn(async move { this.snapshot(&pair).await });
        match handle.await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(
                    %err,
                    instance = %self.context.name(),
                    source = %label,
                    "snapshot attempt failed"
                );
                SnapshotOutcome::Failed
            }
        }
    }

    /// Entry point of the trigger router.
    ///
    /// Checks the cooldown gate now and, when allowed, schedules the attempt
    /// on the runtime without waiting for it. Returns `None` when suppressed.
    pub fn fire(&self, pair: &TriggerPair) -> Option<JoinHandle<SnapshotOutcome>> {
        if !self.gate.allowed() {
            return None;
        }
        let this = self.clone();
        let pair = pair.clone();
        Some(tokio::spawn(
            async move { this.snapshot_isolated(pair).await },
        ))
    }

    /// On-demand snapshot, never rate limited.
    ///
    /// Uses the entity pair of `camera` when configured, otherwise a random
    /// pair. Returns `None` when the instance has no pairs at all.
    #[tracing::instrument(skip(self), fields(instance = %self.context.name()))]
    pub async fn request_snapshot(&self, camera: Option<&str>) -> Option<SnapshotOutcome> {
        let named = camera.and_then(|camera| self.context.config.pair_for_camera(camera));
        if camera.is_some() && named.is_none() {
            tracing::debug!("requested camera is not configured, picking a random pair");
        }
        let pair = named.cloned().or_else(|| self.random_pair())?;
        Some(self.snapshot_isolated(pair).await)
    }

    /// Startup snapshots: one random pair, then a second independent draw
    /// when the "last image" view exists so it starts with its own image.
    pub async fn seed(&self) -> Vec<SnapshotOutcome> {
        let Some(first) = self.random_pair() else {
            tracing::debug!(instance = %self.context.name(), "no pairs configured, nothing to seed");
            return Vec::new();
        };
        let mut outcomes = vec![self.snapshot_isolated(first).await];
        if self.context.config.create_last_camera
            && let Some(second) = self.random_pair()
        {
            outcomes.push(self.snapshot_isolated(second).await);
        }
        outcomes
    }

    fn random_pair(&self) -> Option<TriggerPair> {
        self.context
            .config
            .pairs
            .choose(&mut rand::thread_rng())
            .cloned()
    }
}
