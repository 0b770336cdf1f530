//! Environment overlay.
//!
//! Applied after the config file and before validation. Variables that are
//! unset leave the file value alone.
//!
//! The redirect mapping in `SUPERSET_USER_DASHBOARD_REDIRECTS` never stops the
//! gateway: malformed JSON is reported as a warning and yields an empty table.

use crate::config::loader::ConfigError;
use crate::config::schema::GatewayConfig;
use crate::redirect::{parse_redirect_json, RedirectRule};

pub const BIND_ADDRESS_VAR: &str = "GATEWAY_BIND_ADDRESS";
pub const UPSTREAM_URL_VAR: &str = "GATEWAY_UPSTREAM_URL";
pub const IDENTITY_PROVIDER_VAR: &str = "GATEWAY_IDENTITY_PROVIDER";
pub const LOG_FORMAT_VAR: &str = "GATEWAY_LOG_FORMAT";
pub const ADMIN_API_KEY_VAR: &str = "GATEWAY_ADMIN_API_KEY";
pub const REDIRECTS_VAR: &str = "SUPERSET_USER_DASHBOARD_REDIRECTS";
pub const DEFAULT_HOME_PAGE_VAR: &str = "SUPERSET_DEFAULT_HOME_PAGE";

/// Read from the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Apply environment overrides, returning non-fatal warnings.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<Vec<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut warnings = Vec::new();

    if let Some(addr) = lookup(BIND_ADDRESS_VAR) {
        config.listener.bind_address = addr;
    }
    if let Some(url) = lookup(UPSTREAM_URL_VAR) {
        config.upstream.url = url;
    }
    if let Some(provider) = lookup(IDENTITY_PROVIDER_VAR) {
        config.identity.provider = provider.parse().map_err(|message| ConfigError::Env {
            var: IDENTITY_PROVIDER_VAR,
            message,
        })?;
    }
    if let Some(format) = lookup(LOG_FORMAT_VAR) {
        config.observability.log_format = format.parse().map_err(|message| ConfigError::Env {
            var: LOG_FORMAT_VAR,
            message,
        })?;
    }
    if let Some(key) = lookup(ADMIN_API_KEY_VAR) {
        config.admin.api_key = key;
    }
    if let Some(page) = lookup(DEFAULT_HOME_PAGE_VAR).filter(|p| !p.is_empty()) {
        config.redirects.default_home_page = page;
    }
    if let Some(raw) = lookup(REDIRECTS_VAR) {
        config.redirects.rules = redirect_rules_from_json(&raw, &mut warnings);
    }

    Ok(warnings)
}

/// Parse the JSON mapping; any problem becomes a warning, never an error.
///
/// Malformed JSON yields an empty table. Entries with a non-string value or an
/// empty selector or destination are dropped one by one.
pub fn redirect_rules_from_json(raw: &str, warnings: &mut Vec<String>) -> Vec<RedirectRule> {
    match parse_redirect_json(raw) {
        Ok(parsed) => {
            for selector in parsed.skipped {
                warnings.push(format!(
                    "Ignoring {} entry '{}': destination is not a string",
                    REDIRECTS_VAR, selector
                ));
            }
            parsed
                .rules
                .into_iter()
                .filter(|rule| {
                    let reason = if rule.selector.is_empty() {
                        "empty selector"
                    } else if rule.destination.is_empty() {
                        "empty destination"
                    } else {
                        return true;
                    };
                    warnings.push(format!(
                        "Ignoring {} entry '{}': {}",
                        REDIRECTS_VAR, rule.selector, reason
                    ));
                    false
                })
                .collect()
        }
        Err(e) => {
            warnings.push(format!("Invalid JSON in {}: {}. No dashboard redirects.", REDIRECTS_VAR, e));
            Vec::new()
        }
    }
}
