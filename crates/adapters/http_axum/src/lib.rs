//! # snapcam-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **camera views** of every instance as raw JPEG bytes
//! - Expose the **manual snapshot** action and the **diagnostic** values
//! - **Reconfigure** a running instance from a submitted instance record
//! - Let callers play the host: inject **state changes** and **events**
//!   into the bus the instances listen to
//!
//! ## Dependency rule
//! Depends on `snapcam-app` (instances and port traits) and `snapcam-domain`
//! (for request/response mapping). Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
