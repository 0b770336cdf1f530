//! Dashboard gateway.
//!
//! Sits in front of the BI application and sends authenticated users from the
//! home pages straight to their dashboard.
//!
//! ```text
//!     Client ──▶ request id / trace / timeout / limit
//!                    │
//!                    ▼
//!              home path? ──no──────────────────────┐
//!                    │ yes                          │
//!                    ▼                              ▼
//!              identity provider ──▶ resolver    upstream ──▶ BI application
//!                    │
//!                    ▼
//!              302 Found (dashboard / default page / login)
//! ```

use std::path::PathBuf;

use clap::Parser;

use dashboard_gateway::config::load_config;
use dashboard_gateway::lifecycle::startup;

#[derive(Parser)]
#[command(name = "dashboard-gateway")]
#[command(about = "Per-user dashboard redirects in front of a BI application", long_about = None)]
struct Args {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let loaded = load_config(args.config.as_deref())?;
    startup::run(loaded).await
}
