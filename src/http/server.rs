//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the forwarding handler
//! - Wire up middleware (request ID, tracing, timeout, concurrency limit)
//! - Install the home path redirect in front of forwarding
//! - Bind server to listener and shut down gracefully
//! - Observability (metrics, correlation IDs)

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderName, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{limit::GlobalConcurrencyLimitLayer, ServiceBuilder};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::{self, AdminState};
use crate::config::GatewayConfig;
use crate::http::middleware::{home_redirect_middleware, LandingPages};
use crate::http::proxy::{ProxyError, UpstreamClient};
use crate::identity::{self, IdentityError};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::redirect::{HomePathMatcher, RedirectTable, Resolver};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Upstream(#[from] ProxyError),

    #[error("identity provider: {0}")]
    Identity(#[from] IdentityError),
}

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    pub home: Arc<HomePathMatcher>,
    pub landing: Arc<LandingPages>,
    pub upstream: Arc<UpstreamClient>,
}

/// HTTP server for the dashboard gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    admin_state: AdminState,
}

impl GatewayServer {
    /// Create a new server from a validated configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let table = Arc::new(RedirectTable::new(config.redirects.rules.iter().cloned()));
        let identity_timeout = Duration::from_millis(config.timeouts.identity_ms);
        let provider = identity::build_provider(&config.identity, &config.upstream.url, identity_timeout)?;
        let upstream = Arc::new(UpstreamClient::new(&config.upstream.url)?);

        let redirects = &config.redirects;
        let state = AppState {
            resolver: Arc::new(Resolver::new(table.clone(), provider.clone(), identity_timeout)),
            home: Arc::new(HomePathMatcher::new(redirects.home_paths.iter(), redirects.root_path.as_str())),
            landing: Arc::new(LandingPages {
                default_home_page: redirects.default_home_page.clone(),
                login_page: redirects.login_page.clone(),
                forwarded_query_params: redirects.forwarded_query_params.clone(),
            }),
            upstream,
        };

        tracing::info!(
            rules = table.len(),
            identity_provider = provider.name(),
            upstream = %state.upstream.authority(),
            "Redirect table loaded"
        );

        let admin_state = AdminState::new(table, provider.name(), &config.admin.api_key, redirects.home_paths.clone());
        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            admin_state,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(forward_handler))
            .route("/{*path}", any(forward_handler))
            .layer(middleware::from_fn_with_state(state.clone(), home_redirect_middleware))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                        let request_id = req
                            .headers()
                            .get(X_REQUEST_ID)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("unknown");
                        tracing::info_span!(
                            "request",
                            method = %req.method(),
                            path = %req.uri().path(),
                            request_id = %request_id,
                        )
                    }))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                    .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections)),
            )
    }

    /// The gateway router, for serving or for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Router for the admin API (bearer protected).
    pub fn admin_router(&self) -> Router {
        admin::setup_admin_router(self.admin_state.clone())
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Forward anything the redirect middleware let through.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    match state.upstream.forward(request, client_ip).await {
        Ok(response) => {
            metrics::record_request(&method, response.status().as_u16(), start_time);
            response
        }
        Err(e) => {
            tracing::error!(error = %e, "Upstream error");
            metrics::record_request(&method, StatusCode::BAD_GATEWAY.as_u16(), start_time);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
