//! # snapcam-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** the host and the source adapters implement:
//!   - `NotificationSource` — state-change and event notifications
//!   - `CameraSource`, `FileSource`, `UrlSource` — raw image bytes
//!   - `StatePublisher` — entity state/attribute updates
//! - Hold the per-instance **Snapshot Store** and **Cooldown Gate**
//! - Resolve sources into bytes (**Source Fetcher**)
//! - Match notifications against trigger pairs (**Trigger Router**)
//! - Run one snapshot attempt end to end (**Snapshot Orchestrator**)
//! - Publish the derived read-only **views** (cameras, sensors, triggered pulse)
//! - Tie it together in the **instance lifecycle** (setup, reconfigure, teardown)
//!
//! ## Dependency rule
//! Depends on `snapcam-domain` only (plus `tokio` for tasks and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod context;
pub mod fetcher;
pub mod gate;
pub mod instance;
pub mod orchestrator;
pub mod ports;
pub mod router;
pub mod store;
pub mod views;
