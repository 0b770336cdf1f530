//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout, concurrency limit)
//!     → middleware/home_redirect.rs (GET on a home path → resolver → 302)
//!     → proxy.rs (everything else → BI application)
//!     → Send to client
//! ```

pub mod middleware;
pub mod proxy;
pub mod server;

pub use proxy::{ProxyError, UpstreamClient};
pub use server::{AppState, GatewayServer, ServerError, X_REQUEST_ID};
