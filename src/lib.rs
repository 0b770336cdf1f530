//! Dashboard redirect gateway library.

pub mod admin;
pub mod config;
pub mod http;
pub mod identity;
pub mod lifecycle;
pub mod observability;
pub mod redirect;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use redirect::{resolve_redirect, CurrentUser, RedirectTable};
