pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use crate::redirect::RedirectTable;
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// Read-only view of the running gateway for the admin API.
#[derive(Clone)]
pub struct AdminState {
    pub table: Arc<RedirectTable>,
    pub identity_provider: &'static str,
    pub home_paths: Arc<[String]>,
    api_key: Arc<str>,
}

impl AdminState {
    pub fn new(table: Arc<RedirectTable>, identity_provider: &'static str, api_key: &str, home_paths: Vec<String>) -> Self {
        Self {
            table,
            identity_provider,
            home_paths: home_paths.into(),
            api_key: api_key.into(),
        }
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/redirects", get(get_redirects))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
