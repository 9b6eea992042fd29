#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Simulated real-time incident and resource feed.
//!
//! [`generator::FeedGenerator`] owns the authoritative in-memory state and
//! mutates it one tick at a time. [`service::FeedService`] wraps it with a
//! `start()`/`stop()` lifecycle that drives ticks from a tokio interval and
//! refreshes weather without ever stalling the tick loop.
//!
//! All randomness and time come from injectable [`random::RandomSource`] and
//! [`clock::Clock`] implementations so the simulation can be replayed
//! exactly in tests.

pub mod clock;
pub mod generator;
pub mod random;
pub mod seed;
pub mod service;
pub mod weather;

use command_center_feed_models::ResourceStatus;
use thiserror::Error;

/// Errors that can occur in the feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Embedded seed data could not be parsed.
    #[error("Seed data error: {0}")]
    Seed(#[from] toml::de::Error),

    /// Weather source failed.
    #[error("Weather source error: {message}")]
    Weather {
        /// Description of what went wrong.
        message: String,
    },

    /// No incident with this id is retained.
    #[error("Incident not found: {id}")]
    IncidentNotFound {
        /// The requested incident id.
        id: String,
    },

    /// No resource with this id exists.
    #[error("Resource not found: {id}")]
    ResourceNotFound {
        /// The requested resource id.
        id: String,
    },

    /// The resource cannot be assigned in its current status.
    #[error("Resource {id} is {status}, expected available")]
    ResourceUnavailable {
        /// The resource id.
        id: String,
        /// Its current status.
        status: ResourceStatus,
    },

    /// The resource cannot be released because it is not deployed.
    #[error("Resource {id} is {status}, expected deployed")]
    ResourceNotDeployed {
        /// The resource id.
        id: String,
        /// Its current status.
        status: ResourceStatus,
    },
}
