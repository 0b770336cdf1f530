//! Home path redirect middleware.
//!
//! Runs in front of upstream forwarding. GET requests on a home path are
//! resolved against the redirect table:
//!
//! | path    | user            | result                      |
//! |---------|-----------------|-----------------------------|
//! | root    | anonymous       | 302 → login page            |
//! | root    | matched         | 302 → destination           |
//! | root    | not matched     | 302 → default home page     |
//! | root    | identity failed | 302 → default home page     |
//! | welcome | matched         | 302 → destination           |
//! | welcome | anyone else     | forwarded                   |

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::redirect::{build_destination, Decision, HomePath};

/// Landing pages and query forwarding for the redirect middleware.
#[derive(Debug, Clone)]
pub struct LandingPages {
    pub default_home_page: String,
    pub login_page: String,
    pub forwarded_query_params: Vec<String>,
}

/// What to do with a home path request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Redirect { location: String, outcome: &'static str },
    PassThrough { outcome: &'static str },
}

/// The parts of the incoming request the redirect plan looks at.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    /// `Host` header, if any.
    pub host: Option<&'a str>,
    pub path: &'a str,
    pub query: Option<&'a str>,
}

/// Map a resolver decision onto an action.
pub fn plan(decision: &Decision, home: HomePath, target: Target<'_>, pages: &LandingPages) -> Action {
    match (decision, home) {
        (Decision::Matched { destination, matched_by, .. }, _) => {
            let location = build_destination(destination, target.query, &pages.forwarded_query_params);
            if points_at(&location, target) {
                Action::PassThrough { outcome: "loop" }
            } else {
                Action::Redirect {
                    location,
                    outcome: matched_by.label(),
                }
            }
        }
        (Decision::Anonymous, HomePath::Root) => Action::Redirect {
            location: pages.login_page.clone(),
            outcome: "login",
        },
        (Decision::NoMatch { .. } | Decision::Unknown, HomePath::Root) => Action::Redirect {
            location: pages.default_home_page.clone(),
            outcome: "default",
        },
        (_, HomePath::Welcome) => Action::PassThrough { outcome: "none" },
    }
}

/// Whether `location` is the page being requested.
///
/// Relative destinations compare by path. Absolute ones also need the
/// authority to match the request's `Host`.
fn points_at(location: &str, target: Target<'_>) -> bool {
    let without_fragment = location.split('#').next().unwrap_or(location);
    let Ok(uri) = without_fragment.parse::<Uri>() else {
        return false;
    };
    if uri.path() != target.path {
        return false;
    }
    match uri.authority() {
        None => true,
        Some(authority) => target
            .host
            .is_some_and(|host| host.eq_ignore_ascii_case(authority.as_str())),
    }
}

/// 302 Found to `location`, or `None` if it is not a valid header value.
fn found(location: &str) -> Option<Response> {
    let value = HeaderValue::from_str(location).ok()?;
    let mut response = StatusCode::FOUND.into_response();
    response.headers_mut().insert(header::LOCATION, value);
    Some(response)
}

pub async fn home_redirect_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(home) = state.home.matches(&request) else {
        return next.run(request).await;
    };

    let decision = state.resolver.resolve(request.headers()).await;
    let target = Target {
        host: request.headers().get(header::HOST).and_then(|h| h.to_str().ok()),
        path: request.uri().path(),
        query: request.uri().query(),
    };
    let action = plan(&decision, home, target, &state.landing);

    match action {
        Action::Redirect { location, outcome } => match found(&location) {
            Some(response) => {
                tracing::info!(
                    path = %request.uri().path(),
                    location = %location,
                    outcome,
                    "Home path redirect"
                );
                metrics::record_redirect_decision(outcome);
                response
            }
            None => {
                tracing::warn!(location = %location, "Redirect destination is not a valid Location header, forwarding");
                metrics::record_redirect_decision("none");
                next.run(request).await
            }
        },
        Action::PassThrough { outcome } => {
            tracing::debug!(path = %request.uri().path(), outcome, "No home path redirect");
            metrics::record_redirect_decision(outcome);
            next.run(request).await
        }
    }
}
