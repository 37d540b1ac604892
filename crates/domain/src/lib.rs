//! # snapcam-domain
//!
//! Pure domain model for the snapcam virtual snapshot camera.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Trigger Pairs** (one image source bound to one firing condition)
//! - Define the **matching rules** for state-change and bus-event notifications
//! - Define the **cooldown** arithmetic used to rate-limit automatic snapshots
//! - Define the **snapshot tuple** (current/previous image + metadata) and its rotation
//! - Define **instance configuration** records, their validation and path normalization
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod config;
pub mod cooldown;
pub mod entity;
pub mod notification;
pub mod pair;
pub mod paths;
pub mod placeholder;
pub mod snapshot;
