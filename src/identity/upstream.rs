//! Identity from the BI application's own session API.
//!
//! The caller's `Cookie` and `Authorization` headers are replayed against:
//! - `GET /api/v1/me/`        → `{"result": {"username": ...}}`, 401/403 when anonymous
//! - `GET /api/v1/me/roles/`  → `{"result": {"roles": {"<role>": [...], ...}}}`
//!
//! Role names are the keys of `result.roles` in document order.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::identity::{IdentityError, IdentityProvider};

const ME_PATH: &str = "/api/v1/me/";
const ROLES_PATH: &str = "/api/v1/me/roles/";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct Me {
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MeRoles {
    #[serde(default)]
    roles: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct UpstreamIdentity {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl UpstreamIdentity {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    async fn get(&self, path: &str, headers: &HeaderMap) -> Result<reqwest::Response, IdentityError> {
        let mut request = self.client.get(format!("{}{}", self.base_url, path));
        for name in [header::COOKIE, header::AUTHORIZATION] {
            for value in headers.get_all(&name) {
                request = request.header(name.clone(), value.clone());
            }
        }

        request.send().await.map_err(|e| {
            if e.is_timeout() {
                IdentityError::Timeout(self.timeout)
            } else {
                IdentityError::Unavailable(e.to_string())
            }
        })
    }

    async fn json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, IdentityError> {
        response
            .json::<Envelope<T>>()
            .await
            .map(|envelope| envelope.result)
            .map_err(|e| IdentityError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for UpstreamIdentity {
    fn name(&self) -> &'static str {
        "upstream"
    }

    async fn principal(&self, headers: &HeaderMap) -> Result<Option<String>, IdentityError> {
        if !headers.contains_key(header::COOKIE) && !headers.contains_key(header::AUTHORIZATION) {
            return Ok(None);
        }

        let response = self.get(ME_PATH, headers).await?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_success() => {
                let me: Me = Self::json(response).await?;
                Ok(me.username.filter(|u| !u.is_empty()))
            }
            status => Err(IdentityError::Status(status.as_u16())),
        }
    }

    async fn roles(&self, headers: &HeaderMap, _username: &str) -> Result<Vec<String>, IdentityError> {
        let response = self.get(ROLES_PATH, headers).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Status(status.as_u16()));
        }

        let me: MeRoles = Self::json(response).await?;
        Ok(me.roles.into_iter().map(|(name, _)| name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_payload_keeps_document_order() {
        let body = r#"{"result": {"roles": {"sales": [["can_read", "Dashboard"]], "Gamma": [], "ops": []}}}"#;
        let parsed: Envelope<MeRoles> = serde_json::from_str(body).unwrap();
        let names: Vec<_> = parsed.result.roles.keys().cloned().collect();
        assert_eq!(names, vec!["sales", "Gamma", "ops"]);
    }

    #[test]
    fn test_me_payload_ignores_extra_fields() {
        let body = r#"{"result": {"first_name": "Bob", "username": "bob", "is_active": true}}"#;
        let parsed: Envelope<Me> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.result.username.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn test_no_credentials_is_anonymous_without_calling_upstream() {
        // Port 9 (discard) is never contacted: no cookie means no request.
        let identity = UpstreamIdentity::new("http://127.0.0.1:9/", Duration::from_millis(100)).unwrap();
        assert_eq!(identity.principal(&HeaderMap::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_an_error() {
        let identity = UpstreamIdentity::new("http://127.0.0.1:1", Duration::from_millis(200)).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "session=abc".parse().unwrap());

        let err = identity.principal(&headers).await.unwrap_err();
        assert!(matches!(err, IdentityError::Unavailable(_) | IdentityError::Timeout(_)));
    }
}
