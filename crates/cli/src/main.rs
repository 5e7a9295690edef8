//! CloneKit CLI: ask the agent to clone a website into a static bundle.
//!
//! ```text
//! clonekit "Clone https://example.com/"
//! clonekit -v -c ./clonekit.toml
//! ```

use std::path::PathBuf;

use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(
    name = "clonekit",
    about = "CloneKit: turn a live website into a static HTML/CSS/JS bundle",
    version,
    author
)]
struct Cli {
    /// What to ask the agent; defaults to cloning the demo site
    request: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Read configuration from this file instead of ~/.clonekit/config.toml
    #[arg(short, long, env = "CLONEKIT_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    commands::clone::run(cli.request, cli.config).await?;
    Ok(())
}
