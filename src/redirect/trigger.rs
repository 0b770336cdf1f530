//! Home path matching.
//!
//! # Responsibilities
//! - Decide whether a request is a candidate for a dashboard redirect
//! - Tell the root path apart from the other home paths
//!
//! # Design Decisions
//! - GET only; every other method passes straight through
//! - Exact, case-sensitive path comparison (trailing slash variants are
//!   listed explicitly)
//! - Query string is ignored for matching

use axum::http::{Method, Request};

/// Which kind of home path a request hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomePath {
    /// The application root. Unmatched users are sent to the default page.
    Root,
    /// Any other home path. Unmatched users fall through to upstream.
    Welcome,
}

/// Matches GET requests on the configured home paths.
#[derive(Debug, Clone)]
pub struct HomePathMatcher {
    paths: Vec<String>,
    root: String,
}

impl HomePathMatcher {
    pub fn new(paths: impl IntoIterator<Item = impl Into<String>>, root: impl Into<String>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            root: root.into(),
        }
    }

    /// Classify a method and path.
    pub fn classify(&self, method: &Method, path: &str) -> Option<HomePath> {
        if method != Method::GET || !self.paths.iter().any(|p| p == path) {
            return None;
        }
        if path == self.root {
            Some(HomePath::Root)
        } else {
            Some(HomePath::Welcome)
        }
    }

    pub fn matches<B>(&self, req: &Request<B>) -> Option<HomePath> {
        self.classify(req.method(), req.uri().path())
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}
