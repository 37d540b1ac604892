//! Shared application state for axum handlers.

use std::sync::Arc;

use tokio::sync::RwLock;

use snapcam_app::fetcher::ImageFetcher;
use snapcam_app::instance::SnapcamInstance;
use snapcam_app::ports::{NotificationSink, NotificationSource, StatePublisher};
use snapcam_domain::entity::slugify;
use snapcam_domain::paths::PathRoots;

/// A running instance behind the lock that serializes reconfiguration.
pub type SharedInstance<B, Fe, P> = Arc<RwLock<SnapcamInstance<B, Fe, P>>>;

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so the instance types themselves do not
/// need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<B, Fe, P> {
    /// Every running instance, in configuration order.
    pub instances: Arc<Vec<SharedInstance<B, Fe, P>>>,
    /// Host bus the instances subscribe to.
    pub bus: B,
    /// Roots file references of submitted records resolve against.
    pub roots: Arc<PathRoots>,
}

impl<B: Clone, Fe, P> Clone for AppState<B, Fe, P> {
    fn clone(&self) -> Self {
        Self {
            instances: Arc::clone(&self.instances),
            bus: self.bus.clone(),
            roots: Arc::clone(&self.roots),
        }
    }
}

impl<B, Fe, P> AppState<B, Fe, P>
where
    B: NotificationSource + NotificationSink + Clone + 'static,
    Fe: ImageFetcher + 'static,
    P: StatePublisher + Clone + 'static,
{
    pub fn new(instances: Vec<SharedInstance<B, Fe, P>>, bus: B, roots: PathRoots) -> Self {
        Self {
            instances: Arc::new(instances),
            bus,
            roots: Arc::new(roots),
        }
    }

    /// Instance whose name has the same slug as `name`.
    pub async fn find(&self, name: &str) -> Option<SharedInstance<B, Fe, P>> {
        let wanted = slugify(name);
        for instance in self.instances.iter() {
            if slugify(instance.read().await.name()) == wanted {
                return Some(Arc::clone(instance));
            }
        }
        None
    }
}
