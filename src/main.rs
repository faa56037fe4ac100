use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use time::OffsetDateTime;

mod assets;
mod canvas;
mod config;
mod error;
mod plan;
mod record;
mod render;
mod server;
mod symbol;
mod transport;

#[cfg(test)]
mod report_tests;
#[cfg(test)]
mod test_support;

use assets::HttpFetcher;
use config::{Config, ReportArgs};
use plan::LayoutPlan;
use record::{FieldRecord, Submission};
use render::Reporter;
use server::AppState;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        #[arg(short, long, env = "PORT", default_value = "3000")]
        port: u16,
        #[command(flatten)]
        report: ReportArgs,
    },
    /// Render a worksheet from a JSON file of form fields
    Render {
        /// Path to the JSON submission (same field names as the web form)
        input: PathBuf,
        /// Output file (defaults to <numStr>.pdf)
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        report: ReportArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Render { input, out, report }) => {
            render_file(&input, out, Config::from(&report)).await
        }
        Some(Commands::Serve { port, report }) => serve(port, Config::from(&report)).await,
        None => serve(3000, Config::default()).await,
    }
}

async fn render_file(input: &std::path::Path, out: Option<PathBuf>, config: Config) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let raw: Submission = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", input.display()))?;
    let record = FieldRecord::try_from(raw)?;

    let reporter = Reporter::new(HttpFetcher::new(config.fetch_timeout)?, config);
    let document = reporter
        .render(&record, LayoutPlan::worksheet(), OffsetDateTime::now_utc())
        .await?;

    let out = out.unwrap_or_else(|| PathBuf::from(record.file_name()));
    std::fs::write(&out, document.to_bytes())
        .with_context(|| format!("writing {}", out.display()))?;
    log::info!("Wrote {} ({} pages)", out.display(), document.pages);
    Ok(())
}

async fn serve(port: u16, config: Config) -> Result<()> {
    if config.fetch_timeout.is_none() {
        log::info!("Remote image fetches have no timeout");
    }
    let state = Arc::new(AppState {
        reporter: Reporter::new(HttpFetcher::new(config.fetch_timeout)?, config),
        plan: LayoutPlan::worksheet(),
    });

    let app = server::router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    log::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
