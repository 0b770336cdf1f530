use std::path::PathBuf;

use axum::http::Method;
use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

use dashboard_gateway::config::{load_config, ConfigError};
use dashboard_gateway::http::middleware::home_redirect::{plan, Action, LandingPages, Target};
use dashboard_gateway::redirect::{CurrentUser, Decision, HomePathMatcher, RedirectTable};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the dashboard gateway", long_about = None)]
struct Cli {
    /// Admin API base URL.
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    /// Admin API key.
    #[arg(short, long, env = "GATEWAY_ADMIN_API_KEY", default_value = "")]
    key: String,

    /// Configuration file for the offline commands.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// List the loaded redirect table
    Redirects,
    /// Show where a user would be sent, using the local configuration
    Resolve {
        /// Username; omit for an anonymous visitor
        #[arg(long)]
        user: Option<String>,
        /// Role, in assignment order (repeatable)
        #[arg(long = "role")]
        roles: Vec<String>,
        /// Request path
        #[arg(long, default_value = "/")]
        path: String,
        /// Raw query string, e.g. "show_filters=0"
        #[arg(long)]
        query: Option<String>,
    },
    /// Validate the local configuration
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => admin_get(&cli.url, &cli.key, "/admin/status").await?,
        Commands::Redirects => admin_get(&cli.url, &cli.key, "/admin/redirects").await?,
        Commands::Resolve { user, roles, path, query } => {
            let loaded = load_config(cli.config.as_deref())?;
            for warning in &loaded.warnings {
                eprintln!("warning: {}", warning);
            }
            let redirects = &loaded.config.redirects;
            let table = RedirectTable::new(redirects.rules.iter().cloned());
            let user = match user {
                Some(name) => CurrentUser::authenticated(name, roles),
                None => CurrentUser::Anonymous,
            };

            let decision = Decision::for_user(&user, &table);

            let matcher = HomePathMatcher::new(redirects.home_paths.iter(), redirects.root_path.as_str());
            let pages = LandingPages {
                default_home_page: redirects.default_home_page.clone(),
                login_page: redirects.login_page.clone(),
                forwarded_query_params: redirects.forwarded_query_params.clone(),
            };
            let action = match matcher.classify(&Method::GET, &path) {
                Some(home) => {
                    let target = Target {
                        host: None,
                        path: &path,
                        query: query.as_deref(),
                    };
                    plan(&decision, home, target, &pages)
                }
                None => Action::PassThrough { outcome: "not_home_path" },
            };

            let output = match action {
                Action::Redirect { location, outcome } => json!({ "action": "redirect", "location": location, "outcome": outcome }),
                Action::PassThrough { outcome } => json!({ "action": "forward", "outcome": outcome }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Check => match load_config(cli.config.as_deref()) {
            Ok(loaded) => {
                for warning in &loaded.warnings {
                    eprintln!("warning: {}", warning);
                }
                println!("configuration OK ({} redirect rules)", loaded.config.redirects.rules.len());
            }
            Err(ConfigError::Validation(errors)) => {
                for error in &errors {
                    eprintln!("error: {}", error);
                }
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },
    }

    Ok(())
}

async fn admin_get(base: &str, key: &str, path: &str) -> anyhow::Result<()> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);

    let res = reqwest::Client::new()
        .get(format!("{}{}", base.trim_end_matches('/'), path))
        .headers(headers)
        .send()
        .await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> anyhow::Result<()> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
