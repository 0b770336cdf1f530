//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, URLs and paths
//! - Reject redirect rules that can never be served
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::{GatewayConfig, ADMIN_KEY_PLACEHOLDER};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new("listener.bind_address", "not a socket address"));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new("listener.max_connections", "must be greater than 0"));
    }

    match url::Url::parse(&config.upstream.url) {
        Ok(url) if url.scheme() != "http" => {
            errors.push(ValidationError::new("upstream.url", "only http upstreams are supported"));
        }
        Ok(url) if url.host_str().is_none() => {
            errors.push(ValidationError::new("upstream.url", "missing host"));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new("upstream.url", e.to_string())),
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.timeouts.identity_ms == 0 {
        errors.push(ValidationError::new("timeouts.identity_ms", "must be greater than 0"));
    }

    validate_redirects(config, &mut errors);

    if config.admin.enabled {
        if config.admin.api_key.is_empty() || config.admin.api_key == ADMIN_KEY_PLACEHOLDER {
            errors.push(ValidationError::new("admin.api_key", "must be set when the admin API is enabled"));
        }
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new("admin.bind_address", "not a socket address"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new("observability.metrics_address", "not a socket address"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_redirects(config: &GatewayConfig, errors: &mut Vec<ValidationError>) {
    let redirects = &config.redirects;

    for (field, path) in [
        ("redirects.default_home_page", &redirects.default_home_page),
        ("redirects.login_page", &redirects.login_page),
        ("redirects.root_path", &redirects.root_path),
    ] {
        if !path.starts_with('/') {
            errors.push(ValidationError::new(field, "must start with '/'"));
        }
    }
    for (i, path) in redirects.home_paths.iter().enumerate() {
        if !path.starts_with('/') {
            errors.push(ValidationError::new(format!("redirects.home_paths[{}]", i), "must start with '/'"));
        }
    }
    if !redirects.home_paths.contains(&redirects.root_path) {
        errors.push(ValidationError::new("redirects.root_path", "must be one of redirects.home_paths"));
    }
    // Sending the root to itself would loop forever.
    if redirects.default_home_page == redirects.root_path {
        errors.push(ValidationError::new("redirects.default_home_page", "must differ from the root path"));
    }
    if redirects.login_page == redirects.root_path {
        errors.push(ValidationError::new("redirects.login_page", "must differ from the root path"));
    }

    let mut seen = HashSet::new();
    for (i, rule) in redirects.rules.iter().enumerate() {
        if rule.selector.is_empty() {
            errors.push(ValidationError::new(format!("redirects.rules[{}].selector", i), "must not be empty"));
        } else if !seen.insert(rule.selector.as_str()) {
            errors.push(ValidationError::new(
                format!("redirects.rules[{}].selector", i),
                format!("duplicate selector '{}'", rule.selector),
            ));
        }
        if rule.destination.is_empty() {
            errors.push(ValidationError::new(format!("redirects.rules[{}].destination", i), "must not be empty"));
        }
    }
}
