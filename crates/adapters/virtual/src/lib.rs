//! # snapcam-adapter-virtual
//!
//! In-process stand-in for the host platform.
//!
//! | Type | Port | Behaviour |
//! |------|------|-----------|
//! | [`InProcessBus`] | `NotificationSource`, `NotificationSink` | Tracks entity values, broadcasts state changes and events |
//! | [`VirtualCameras`] | `CameraSource` | Serves images registered per camera entity id |
//! | [`StateRecorder`] | `StatePublisher` | Keeps the latest published update per entity, optionally echoing it on the bus |
//!
//! ## Dependency rule
//!
//! Depends on `snapcam-app` (port traits) and `snapcam-domain` only.

mod bus;
mod cameras;
mod recorder;

pub use bus::InProcessBus;
pub use cameras::VirtualCameras;
pub use recorder::StateRecorder;
