//! Redirect resolution.
//!
//! # Responsibilities
//! - Decide the dashboard for an authenticated user (username, then roles)
//! - Ask the identity provider for the principal and, only when needed, roles
//! - Fold every identity failure into "no redirect", never into "anonymous"
//!
//! # Design Decisions
//! - `resolve_redirect` is pure; all I/O lives in `Resolver::resolve`
//! - Role order is the order the provider reports; first table hit wins
//! - The role lookup is skipped when the username already matched

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;

use crate::identity::{IdentityError, IdentityProvider};
use crate::observability::metrics;
use crate::redirect::table::RedirectTable;

/// The user behind the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentUser {
    Anonymous,
    Authenticated { username: String, roles: Vec<String> },
}

impl CurrentUser {
    pub fn authenticated(username: impl Into<String>, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Authenticated {
            username: username.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

/// What selected a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchKind {
    Username,
    Role(String),
}

impl MatchKind {
    /// Label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            MatchKind::Username => "username",
            MatchKind::Role(_) => "role",
        }
    }
}

/// A table hit, borrowing from the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectMatch<'a> {
    pub destination: &'a str,
    pub matched_by: MatchKind,
}

/// Resolve the destination for `user`.
///
/// Anonymous users never match. The username is checked first, then each role
/// in order.
pub fn resolve_redirect<'a>(user: &CurrentUser, table: &'a RedirectTable) -> Option<RedirectMatch<'a>> {
    let CurrentUser::Authenticated { username, roles } = user else {
        return None;
    };

    if let Some(destination) = table.get(username) {
        return Some(RedirectMatch {
            destination,
            matched_by: MatchKind::Username,
        });
    }

    roles.iter().find_map(|role| {
        table.get(role).map(|destination| RedirectMatch {
            destination,
            matched_by: MatchKind::Role(role.clone()),
        })
    })
}

/// Outcome of resolving a live request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No authenticated user.
    Anonymous,
    /// The provider failed before it could tell who the user is.
    Unknown,
    /// Authenticated user with a configured destination.
    Matched { username: String, destination: String, matched_by: MatchKind },
    /// Authenticated user without a destination.
    NoMatch { username: String },
}

impl Decision {
    /// Decision for an already materialized user.
    pub fn for_user(user: &CurrentUser, table: &RedirectTable) -> Self {
        let CurrentUser::Authenticated { username, .. } = user else {
            return Decision::Anonymous;
        };
        match resolve_redirect(user, table) {
            Some(hit) => Decision::Matched {
                username: username.clone(),
                destination: hit.destination.to_string(),
                matched_by: hit.matched_by,
            },
            None => Decision::NoMatch {
                username: username.clone(),
            },
        }
    }
}

/// Request-time resolver: identity provider plus the frozen table.
#[derive(Debug, Clone)]
pub struct Resolver {
    table: Arc<RedirectTable>,
    identity: Arc<dyn IdentityProvider>,
    identity_timeout: Duration,
}

impl Resolver {
    pub fn new(table: Arc<RedirectTable>, identity: Arc<dyn IdentityProvider>, identity_timeout: Duration) -> Self {
        Self {
            table,
            identity,
            identity_timeout,
        }
    }

    pub fn table(&self) -> &RedirectTable {
        &self.table
    }

    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    /// Resolve the request's user against the table. Never fails.
    pub async fn resolve(&self, headers: &HeaderMap) -> Decision {
        let username = match self.bounded(self.identity.principal(headers)).await {
            Ok(Some(username)) => username,
            Ok(None) => return Decision::Anonymous,
            Err(e) => {
                tracing::debug!(provider = self.identity.name(), error = %e, "Principal lookup failed, no redirect");
                metrics::record_identity_failure(e.kind());
                return Decision::Unknown;
            }
        };

        if let Some(destination) = self.table.get(&username) {
            return Decision::Matched {
                destination: destination.to_string(),
                username,
                matched_by: MatchKind::Username,
            };
        }

        let roles = match self.bounded(self.identity.roles(headers, &username)).await {
            Ok(roles) => roles,
            Err(e) => {
                tracing::debug!(provider = self.identity.name(), username = %username, error = %e, "Role lookup failed, no redirect");
                metrics::record_identity_failure(e.kind());
                return Decision::NoMatch { username };
            }
        };

        Decision::for_user(&CurrentUser::Authenticated { username, roles }, &self.table)
    }

    async fn bounded<T>(
        &self,
        call: impl std::future::Future<Output = Result<T, IdentityError>>,
    ) -> Result<T, IdentityError> {
        tokio::time::timeout(self.identity_timeout, call)
            .await
            .unwrap_or(Err(IdentityError::Timeout(self.identity_timeout)))
    }
}
