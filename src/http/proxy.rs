//! Upstream forwarding.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the BI application's authority
//! - Strip hop-by-hop headers, append X-Forwarded-For
//! - Stream the upstream response back unchanged
//!
//! # Design Decisions
//! - No retries: the BI app owns its own failure handling
//! - Upstream is always spoken to over HTTP/1.1
//! - The Host header is preserved so the BI app builds correct URLs

use std::net::IpAddr;

use axum::{
    body::Body,
    http::{
        header::{self, HeaderName},
        uri::{Authority, InvalidUri, PathAndQuery, Scheme},
        HeaderMap, HeaderValue, Request, Response, Uri, Version,
    },
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

static X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

const HOP_BY_HOP: &[&str] = &["connection", "keep-alive", "proxy-connection", "te", "trailer", "upgrade"];

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid upstream URL: {0}")]
    InvalidUpstream(String),

    #[error("upstream request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),
}

impl From<InvalidUri> for ProxyError {
    fn from(e: InvalidUri) -> Self {
        ProxyError::InvalidUpstream(e.to_string())
    }
}

/// HTTP client bound to one upstream.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client<HttpConnector, Body>,
    scheme: Scheme,
    authority: Authority,
}

impl UpstreamClient {
    pub fn new(url: &str) -> Result<Self, ProxyError> {
        let uri: Uri = url.parse()?;
        let authority = uri
            .authority()
            .cloned()
            .ok_or_else(|| ProxyError::InvalidUpstream(format!("{} has no host", url)))?;

        Ok(Self {
            client: Client::builder(TokioExecutor::new()).build(HttpConnector::new()),
            scheme: uri.scheme().cloned().unwrap_or(Scheme::HTTP),
            authority,
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Send `request` upstream.
    pub async fn forward(&self, request: Request<Body>, client_ip: Option<IpAddr>) -> Result<Response<Body>, ProxyError> {
        let (mut parts, body) = request.into_parts();

        let mut uri_parts = parts.uri.clone().into_parts();
        uri_parts.scheme = Some(self.scheme.clone());
        uri_parts.authority = Some(self.authority.clone());
        if uri_parts.path_and_query.is_none() {
            uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        parts.uri = Uri::from_parts(uri_parts).map_err(|e| ProxyError::InvalidUpstream(e.to_string()))?;
        parts.version = Version::HTTP_11;

        strip_hop_by_hop(&mut parts.headers);
        if let Some(ip) = client_ip {
            append_forwarded_for(&mut parts.headers, ip);
        }

        let response = self.client.request(Request::from_parts(parts, body)).await?;
        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    // Headers named in Connection are hop-by-hop too.
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}

fn append_forwarded_for(headers: &mut HeaderMap, ip: IpAddr) {
    let value = match headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(prior) => format!("{}, {}", prior, ip),
        None => ip.to_string(),
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR.clone(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_authority() {
        assert!(UpstreamClient::new("http://superset:8088").is_ok());
        assert!(matches!(
            UpstreamClient::new("/relative"),
            Err(ProxyError::InvalidUpstream(_))
        ));
    }

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-internal"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-internal", HeaderValue::from_static("1"));
        headers.insert(header::COOKIE, HeaderValue::from_static("session=abc"));

        strip_hop_by_hop(&mut headers);

        assert!(headers.get(header::CONNECTION).is_none());
        assert!(headers.get("keep-alive").is_none());
        assert!(headers.get("x-internal").is_none());
        assert_eq!(headers.get(header::COOKIE).unwrap(), "session=abc");
    }

    #[test]
    fn test_append_forwarded_for() {
        let mut headers = HeaderMap::new();
        append_forwarded_for(&mut headers, "10.0.0.1".parse().unwrap());
        assert_eq!(headers.get("x-forwarded-for").unwrap(), "10.0.0.1");

        append_forwarded_for(&mut headers, "10.0.0.2".parse().unwrap());
        assert_eq!(headers.get("x-forwarded-for").unwrap(), "10.0.0.1, 10.0.0.2");
    }
}
