//! Trigger Router — matches host notifications against trigger pairs.
//!
//! One listener per watched entity id and one per distinct event type, each
//! owning its own bus receiver. Matching pairs are handed to the
//! [`SnapshotOrchestrator`] which schedules the attempt and returns at once.

use std::collections::BTreeMap;
use std::fmt;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use snapcam_domain::notification::Notification;
use snapcam_domain::pair::{Trigger, TriggerPair};

use crate::fetcher::ImageFetcher;
use crate::orchestrator::SnapshotOrchestrator;
use crate::ports::NotificationSource;

/// What a [`Subscription`] listens to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubscriptionKey {
    State(String),
    Event(String),
}

impl SubscriptionKey {
    fn for_trigger(trigger: &Trigger) -> Self {
        match trigger {
            Trigger::State(state) => Self::State(state.entity_id.clone()),
            Trigger::Event(event) => Self::Event(event.event_type.clone()),
        }
    }

    fn accepts(&self, notification: &Notification) -> bool {
        match (self, notification) {
            (Self::State(entity_id), Notification::StateChanged(change)) => {
                change.entity_id == *entity_id
            }
            (Self::Event(event_type), Notification::Event(event)) => {
                event.event_type == *event_type
            }
            _ => false,
        }
    }
}

impl fmt::Display for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State(entity_id) => write!(f, "state:{entity_id}"),
            Self::Event(event_type) => write!(f, "event:{event_type}"),
        }
    }
}

/// A running listener. Released on [`release`](Self::release) or drop.
pub struct Subscription {
    key: SubscriptionKey,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    #[must_use]
    pub fn key(&self) -> &SubscriptionKey {
        &self.key
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop listening. Calling it again is a no-op.
    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!(key = %self.key, "subscription released");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// Holds the subscriptions of one instance configuration.
pub struct TriggerRouter<B, Fe> {
    bus: B,
    orchestrator: SnapshotOrchestrator<Fe>,
    subscriptions: Vec<Subscription>,
}

impl<B, Fe> TriggerRouter<B, Fe>
where
    B: NotificationSource,
    Fe: ImageFetcher + 'static,
{
    pub fn new(bus: B, orchestrator: SnapshotOrchestrator<Fe>) -> Self {
        Self {
            bus,
            orchestrator,
            subscriptions: Vec::new(),
        }
    }

    /// (Re)create every subscription from the current pairs.
    ///
    /// Previous subscriptions are released first, so calling this twice
    /// leaves the same set active as calling it once.
    pub fn subscribe(&mut self) {
        self.release();

        let mut groups: BTreeMap<SubscriptionKey, Vec<TriggerPair>> = BTreeMap::new();
        for pair in &self.orchestrator.context().config.pairs {
            groups
                .entry(SubscriptionKey::for_trigger(&pair.trigger))
                .or_default()
                .push(pair.clone());
        }

        for (key, pairs) in groups {
            let receiver = self.bus.subscribe();
            tracing::debug!(
                instance = %self.orchestrator.context().name(),
                %key,
                pairs = pairs.len(),
                "subscribed"
            );
            let handle = tokio::spawn(listen(
                key.clone(),
                pairs,
                receiver,
                self.orchestrator.clone(),
            ));
            self.subscriptions.push(Subscription {
                key,
                handle: Some(handle),
            });
        }
    }

    /// Release every subscription. Safe to call repeatedly.
    pub fn release(&mut self) {
        for subscription in &mut self.subscriptions {
            subscription.release();
        }
        self.subscriptions.clear();
    }

    /// Keys of the active subscriptions, in subscription order.
    #[must_use]
    pub fn active(&self) -> Vec<SubscriptionKey> {
        self.subscriptions
            .iter()
            .filter(|subscription| subscription.is_active())
            .map(|subscription| subscription.key().clone())
            .collect()
    }
}

async fn listen<Fe>(
    key: SubscriptionKey,
    pairs: Vec<TriggerPair>,
    mut receiver: broadcast::Receiver<Notification>,
    orchestrator: SnapshotOrchestrator<Fe>,
) where
    Fe: ImageFetcher + 'static,
{
    loop {
        let notification = match receiver.recv().await {
            Ok(notification) => notification,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(%key, skipped, "listener lagged behind, notifications lost");
                continue;
            }
            Err(RecvError::Closed) => break,
        };
        if !key.accepts(&notification) {
            continue;
        }
        if let Notification::StateChanged(change) = &notification
            && change.is_noop()
        {
            tracing::debug!(%key, "ignoring transition without value change");
            continue;
        }
        for pair in pairs.iter().filter(|pair| pair.trigger.matches(&notification)) {
            tracing::debug!(%key, source = %pair.label(), "trigger matched");
            if orchestrator.fire(pair).is_some() {
                tracing::debug!(%key, source = %pair.label(), "snapshot scheduled");
            }
        }
    }
}
