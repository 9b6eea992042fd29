#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Advisory analysis client with LLM provider abstraction.
//!
//! Supports `OpenAI` (and any `OpenAI`-compatible server via `AI_BASE_URL`)
//! and Anthropic Claude behind the [`providers::LlmProvider`] trait.
//! [`client::AnalysisClient`] turns a feed snapshot into a prompt, sends it,
//! validates the structured reply, and substitutes a fixed fallback on any
//! failure. Nothing in this crate returns an error to the dashboard: a
//! failed advisory call degrades to the fallback instead.

pub mod client;
pub mod config;
pub mod prompt;
pub mod providers;
pub mod validate;

use thiserror::Error;

/// Errors that can occur while talking to an LLM provider.
///
/// These never escape [`client::AnalysisClient`]; they are logged and
/// replaced by the fallback.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error, including non-2xx responses.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// The provider returned no content.
    #[error("Empty response from provider")]
    EmptyResponse,

    /// The reply parsed but failed validation.
    #[error("Validation error: {message}")]
    Validation {
        /// Description of the invalid field.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}
