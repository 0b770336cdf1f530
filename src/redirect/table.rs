//! Redirect table: selector → destination.
//!
//! # Responsibilities
//! - Hold the configured rules in their original order
//! - O(1) selector lookup
//! - Parse the `{"selector": "destination"}` JSON form
//!
//! # Design Decisions
//! - Built once, never mutated; no interior mutability
//! - A repeated selector keeps its first position and its last destination,
//!   matching how a JSON object with duplicate keys is read

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A single selector → destination pair.
///
/// The selector is either a username or a role name; the table does not
/// distinguish the two.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RedirectRule {
    pub selector: String,
    pub destination: String,
}

impl RedirectRule {
    pub fn new(selector: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            destination: destination.into(),
        }
    }
}

/// Immutable, ordered redirect mapping.
#[derive(Debug, Clone, Default)]
pub struct RedirectTable {
    rules: Vec<RedirectRule>,
    index: HashMap<String, usize>,
}

impl RedirectTable {
    /// Build a table from rules in order.
    pub fn new(rules: impl IntoIterator<Item = RedirectRule>) -> Self {
        let mut table = Self::default();
        for rule in rules {
            match table.index.get(&rule.selector) {
                Some(&pos) => table.rules[pos].destination = rule.destination,
                None => {
                    table.index.insert(rule.selector.clone(), table.rules.len());
                    table.rules.push(rule);
                }
            }
        }
        table
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Destination for an exact selector match.
    pub fn get(&self, selector: &str) -> Option<&str> {
        self.index
            .get(selector)
            .map(|&pos| self.rules[pos].destination.as_str())
    }

    pub fn contains(&self, selector: &str) -> bool {
        self.index.contains_key(selector)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &RedirectRule> {
        self.rules.iter()
    }
}

/// Errors produced while reading the JSON redirect mapping.
#[derive(Debug, Error)]
pub enum RedirectJsonError {
    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Result of parsing the JSON mapping.
#[derive(Debug, Default)]
pub struct ParsedRedirects {
    pub rules: Vec<RedirectRule>,
    /// Selectors whose value was not a string.
    pub skipped: Vec<String>,
}

/// Parse `{"selector": "destination", ...}`.
///
/// An empty or whitespace-only input is an empty mapping.
pub fn parse_redirect_json(raw: &str) -> Result<ParsedRedirects, RedirectJsonError> {
    if raw.trim().is_empty() {
        return Ok(ParsedRedirects::default());
    }

    let map = match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => map,
        Value::Null => return Err(RedirectJsonError::NotAnObject("null")),
        Value::Bool(_) => return Err(RedirectJsonError::NotAnObject("a boolean")),
        Value::Number(_) => return Err(RedirectJsonError::NotAnObject("a number")),
        Value::String(_) => return Err(RedirectJsonError::NotAnObject("a string")),
        Value::Array(_) => return Err(RedirectJsonError::NotAnObject("an array")),
    };

    let mut parsed = ParsedRedirects::default();
    for (selector, value) in map {
        match value {
            Value::String(destination) => parsed.rules.push(RedirectRule { selector, destination }),
            _ => parsed.skipped.push(selector),
        }
    }
    Ok(parsed)
}
