//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::redirect::RedirectRule;

/// Root configuration for the dashboard gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, concurrency).
    pub listener: ListenerConfig,

    /// The BI application every non-redirected request goes to.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Dashboard redirect rules and landing pages.
    pub redirects: RedirectConfig,

    /// Where the current user comes from.
    pub identity: IdentityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the BI application (http only).
    pub url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "http://superset:8088".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Upper bound for a single identity lookup, in milliseconds.
    pub identity_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 60,
            identity_ms: 2_000,
        }
    }
}

/// Dashboard redirect configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Landing page for users without a configured dashboard.
    pub default_home_page: String,

    /// Where anonymous visitors of the root path are sent.
    pub login_page: String,

    /// Which home path is the application root.
    pub root_path: String,

    /// GET paths that trigger redirect resolution.
    pub home_paths: Vec<String>,

    /// Query parameters copied from the request onto the destination.
    pub forwarded_query_params: Vec<String>,

    /// Selector → destination rules, first entry first.
    pub rules: Vec<RedirectRule>,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            default_home_page: "/superset/welcome/".to_string(),
            login_page: "/login/".to_string(),
            root_path: "/".to_string(),
            home_paths: vec![
                "/".to_string(),
                "/superset/welcome/".to_string(),
                "/superset/welcome".to_string(),
            ],
            forwarded_query_params: vec!["expand_filters".to_string(), "show_filters".to_string()],
            rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityProviderKind {
    /// Trusted headers from an authenticating front proxy.
    Headers,
    /// The BI application's `/api/v1/me/` endpoints.
    Upstream,
}

impl std::str::FromStr for IdentityProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "headers" => Ok(Self::Headers),
            "upstream" => Ok(Self::Upstream),
            other => Err(format!("unknown identity provider '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub provider: IdentityProviderKind,

    /// Header carrying the username (headers provider).
    pub user_header: String,

    /// Header carrying the role list (headers provider).
    pub roles_header: String,

    pub roles_separator: char,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            provider: IdentityProviderKind::Headers,
            user_header: "x-forwarded-user".to_string(),
            roles_header: "x-forwarded-roles".to_string(),
            roles_separator: ',',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

pub const ADMIN_KEY_PLACEHOLDER: &str = "CHANGE_ME_IN_PRODUCTION";

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: ADMIN_KEY_PLACEHOLDER.to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.redirects.home_paths.len(), 3);
        assert_eq!(config.identity.provider, IdentityProviderKind::Headers);
        assert!(config.redirects.rules.is_empty());
    }

    #[test]
    fn test_full_toml() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [upstream]
            url = "http://bi.internal:8088"

            [redirects]
            default_home_page = "/superset/dashboard/list/"
            rules = [
                { selector = "alice", destination = "/superset/dashboard/3/" },
                { selector = "sales", destination = "/superset/dashboard/7/" },
            ]

            [identity]
            provider = "upstream"
            roles_separator = ";"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.url, "http://bi.internal:8088");
        assert_eq!(config.redirects.default_home_page, "/superset/dashboard/list/");
        assert_eq!(config.redirects.rules[1], RedirectRule::new("sales", "/superset/dashboard/7/"));
        assert_eq!(config.identity.provider, IdentityProviderKind::Upstream);
        assert_eq!(config.identity.roles_separator, ';');
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.redirects.login_page, "/login/");
    }
}
