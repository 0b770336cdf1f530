//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     LoadedConfig → log config warnings → metrics exporter
//!         → GatewayServer (redirect table frozen here) → admin + main listeners
//!
//! Shutdown (shutdown.rs):
//!     Shutdown::trigger → every listener stops accepting → in-flight requests finish
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//! ```
//!
//! # Design Decisions
//! - No reload signal: the redirect table lives as long as the process
//! - Any startup error is fatal and reported through `anyhow` context

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
