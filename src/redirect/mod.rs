//! Dashboard redirect subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     RedirectRule[] (config file or SUPERSET_USER_DASHBOARD_REDIRECTS)
//!     → table.rs (index selectors, freeze)
//!     → Arc<RedirectTable> shared by every request
//!
//! GET on a home path (trigger.rs):
//!     → resolver.rs (identity provider → CurrentUser → username, then roles)
//!     → destination.rs (append forwarded filter toggles)
//!     → 302 Found, or fall through
//! ```
//!
//! # Design Decisions
//! - The table is immutable after construction (no locks on the hot path)
//! - Username lookup always wins over role lookup
//! - Identity failures fail open: the request falls through as if unmatched

pub mod destination;
pub mod resolver;
pub mod table;
pub mod trigger;

pub use destination::build_destination;
pub use resolver::{resolve_redirect, CurrentUser, Decision, MatchKind, RedirectMatch, Resolver};
pub use table::{parse_redirect_json, ParsedRedirects, RedirectJsonError, RedirectRule, RedirectTable};
pub use trigger::{HomePath, HomePathMatcher};
