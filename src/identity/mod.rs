//! Identity and role lookup.
//!
//! # Data Flow
//! ```text
//! Incoming request headers
//!     → IdentityProvider::principal (username or anonymous)
//!     → IdentityProvider::roles     (only when the username did not match)
//!     → redirect::Resolver
//! ```
//!
//! # Design Decisions
//! - The gateway never authenticates; it trusts a front proxy (`headers`) or
//!   asks the BI app itself (`upstream`)
//! - Errors are typed so logs and metrics can tell a timeout from a bad reply,
//!   but every error is treated the same way by the resolver

pub mod headers;
pub mod upstream;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use thiserror::Error;

use crate::config::{IdentityConfig, IdentityProviderKind};

pub use headers::HeaderIdentity;
pub use upstream::UpstreamIdentity;

/// Errors from an identity backend.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Backend could not be reached.
    #[error("identity backend unavailable: {0}")]
    Unavailable(String),

    #[error("identity lookup timed out after {0:?}")]
    Timeout(Duration),

    /// Backend answered with an unexpected status.
    #[error("identity backend returned status {0}")]
    Status(u16),

    /// Backend answered with a body we could not read.
    #[error("malformed identity response: {0}")]
    Malformed(String),
}

impl IdentityError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            IdentityError::Unavailable(_) => "unavailable",
            IdentityError::Timeout(_) => "timeout",
            IdentityError::Status(_) => "status",
            IdentityError::Malformed(_) => "malformed",
        }
    }
}

/// Source of the current user and their roles.
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug {
    /// Provider name for logs and the admin API.
    fn name(&self) -> &'static str;

    /// Username of the caller, `None` when anonymous.
    async fn principal(&self, headers: &HeaderMap) -> Result<Option<String>, IdentityError>;

    /// Role names of `username`, in assignment order.
    async fn roles(&self, headers: &HeaderMap, username: &str) -> Result<Vec<String>, IdentityError>;
}

/// Build the configured provider.
pub fn build_provider(
    config: &IdentityConfig,
    upstream_url: &str,
    timeout: Duration,
) -> Result<Arc<dyn IdentityProvider>, IdentityError> {
    Ok(match config.provider {
        IdentityProviderKind::Headers => Arc::new(HeaderIdentity::from_config(config)),
        IdentityProviderKind::Upstream => Arc::new(UpstreamIdentity::new(upstream_url, timeout)?),
    })
}
