//! Error taxonomy for the analyzer library
//!
//! Configuration and listing failures are terminal for a run; metrics
//! failures are handled per site inside the pipeline and never surface
//! through this type.

use thiserror::Error;

/// Errors surfaced by the analysis pipeline and Azure clients
#[derive(Debug, Error)]
pub enum Error {
    /// No subscription ID was provided by flag, environment, or config
    #[error("subscription ID required: set --subscription-id or AZURE_SUBSCRIPTION_ID")]
    MissingSubscription,

    /// Credential acquisition failed
    #[error("azure auth failed: {0}")]
    Auth(String),

    /// Transport-level HTTP failure
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The management plane answered with a non-success status
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// A request URL could not be constructed
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A worker task panicked or was cancelled
    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
