use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use lp_tracker::{
    history::{self, DEFAULT_BLOCK_GAP, ErrorPolicy, ScanParams},
    report,
    subgraph::{DEFAULT_GATEWAY_URL, SubgraphClient},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Samples a liquidity position's fees and token value across its lifetime
/// and writes the result to a CSV file.
#[derive(Debug, Parser)]
#[command(name = "lp-tracker", version, about)]
struct Cli {
    /// NFT id of the position to track.
    position_id: u64,

    /// Where to write the CSV report.
    output: PathBuf,

    /// Blocks between samples; the default is about one day.
    #[arg(long, default_value_t = DEFAULT_BLOCK_GAP)]
    block_gap: u64,

    /// Gateway API key, substituted into the subgraph URL.
    #[arg(long, env = "GRAPH_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Subgraph endpoint; a `{api_key}` placeholder is filled from --api-key.
    #[arg(long, default_value = DEFAULT_GATEWAY_URL)]
    subgraph_url: String,

    /// Log and skip blocks that fail instead of aborting the scan.
    #[arg(long)]
    skip_errors: bool,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Env vars may come from a .env file; load it before clap reads them.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let url = resolve_url(&cli)?;
    let client = SubgraphClient::new(url).context("building subgraph client")?;

    let params = ScanParams {
        position_id: cli.position_id,
        block_gap: cli.block_gap,
        on_error: if cli.skip_errors {
            ErrorPolicy::Skip
        } else {
            ErrorPolicy::Abort
        },
    };

    let rows = history::scan(&client, &params)
        .await
        .context("scanning position history")?;
    info!(rows = rows.len(), output = %cli.output.display(), "writing report");

    report::write_csv(&cli.output, &rows)
        .with_context(|| format!("writing {}", cli.output.display()))?;

    Ok(())
}

fn resolve_url(cli: &Cli) -> anyhow::Result<String> {
    if !cli.subgraph_url.contains("{api_key}") {
        return Ok(cli.subgraph_url.clone());
    }
    let key = cli
        .api_key
        .as_deref()
        .context("--api-key (or GRAPH_API_KEY) is required for the gateway URL")?;
    Ok(cli.subgraph_url.replace("{api_key}", key))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
