use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::AdminState;
use crate::redirect::RedirectRule;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub identity_provider: &'static str,
    pub redirect_rules: usize,
    pub home_paths: Vec<String>,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        identity_provider: state.identity_provider,
        redirect_rules: state.table.len(),
        home_paths: state.home_paths.to_vec(),
    })
}

/// The redirect table in configuration order.
pub async fn get_redirects(State(state): State<AdminState>) -> Json<Vec<RedirectRule>> {
    Json(state.table.iter().cloned().collect())
}
