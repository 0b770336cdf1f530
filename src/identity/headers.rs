//! Trusted-header identity.
//!
//! An authenticating proxy in front of the gateway sets the username and a
//! separated role list. The gateway must not be reachable without that proxy,
//! otherwise clients can pick their own dashboard.

use async_trait::async_trait;
use axum::http::HeaderMap;

use crate::config::IdentityConfig;
use crate::identity::{IdentityError, IdentityProvider};

#[derive(Debug, Clone)]
pub struct HeaderIdentity {
    user_header: String,
    roles_header: String,
    separator: char,
}

impl HeaderIdentity {
    pub fn new(user_header: impl Into<String>, roles_header: impl Into<String>, separator: char) -> Self {
        Self {
            user_header: user_header.into(),
            roles_header: roles_header.into(),
            separator,
        }
    }

    pub fn from_config(config: &IdentityConfig) -> Self {
        Self::new(&config.user_header, &config.roles_header, config.roles_separator)
    }

    fn header<'a>(&self, headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, IdentityError> {
        match headers.get(name) {
            Some(value) => value
                .to_str()
                .map(|v| Some(v.trim()))
                .map_err(|_| IdentityError::Malformed(format!("{} is not visible ASCII", name))),
            None => Ok(None),
        }
    }
}

impl Default for HeaderIdentity {
    fn default() -> Self {
        Self::from_config(&IdentityConfig::default())
    }
}

#[async_trait]
impl IdentityProvider for HeaderIdentity {
    fn name(&self) -> &'static str {
        "headers"
    }

    async fn principal(&self, headers: &HeaderMap) -> Result<Option<String>, IdentityError> {
        Ok(self
            .header(headers, &self.user_header)?
            .filter(|u| !u.is_empty())
            .map(str::to_string))
    }

    async fn roles(&self, headers: &HeaderMap, _username: &str) -> Result<Vec<String>, IdentityError> {
        let Some(raw) = self.header(headers, &self.roles_header)? else {
            return Ok(Vec::new());
        };
        Ok(raw
            .split(self.separator)
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn test_reads_user_and_roles_in_order() {
        let identity = HeaderIdentity::default();
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-user", HeaderValue::from_static(" bob "));
        headers.insert("x-forwarded-roles", HeaderValue::from_static("sales, ,ops,Gamma"));

        assert_eq!(identity.principal(&headers).await.unwrap(), Some("bob".to_string()));
        assert_eq!(identity.roles(&headers, "bob").await.unwrap(), vec!["sales", "ops", "Gamma"]);
    }

    #[tokio::test]
    async fn test_missing_or_blank_user_is_anonymous() {
        let identity = HeaderIdentity::default();
        assert_eq!(identity.principal(&HeaderMap::new()).await.unwrap(), None);

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-user", HeaderValue::from_static("   "));
        assert_eq!(identity.principal(&headers).await.unwrap(), None);
        assert!(identity.roles(&headers, "x").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_custom_header_names() {
        let identity = HeaderIdentity::new("remote-user", "remote-groups", ';');
        let mut headers = HeaderMap::new();
        headers.insert("remote-user", HeaderValue::from_static("carol"));
        headers.insert("remote-groups", HeaderValue::from_static("ops;sales"));

        assert_eq!(identity.principal(&headers).await.unwrap(), Some("carol".to_string()));
        assert_eq!(identity.roles(&headers, "carol").await.unwrap(), vec!["ops", "sales"]);
    }

    #[tokio::test]
    async fn test_non_ascii_header_is_malformed() {
        let identity = HeaderIdentity::default();
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-user", HeaderValue::from_bytes(b"caf\xe9").unwrap());
        assert!(matches!(
            identity.principal(&headers).await,
            Err(IdentityError::Malformed(_))
        ));
    }
}
