use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lemmy_block::config::{load_accounts, load_blocklist};
use lemmy_block::traits::PublicDirectory;
use lemmy_block::{
    BlockOrchestrator, CommunityDiscoverer, RunSummary, TargetListBuilder, Throttle,
};
use lemmy_client::LemmyClient;

#[derive(Parser)]
#[command(name = "lemmy-block", about = "Block every community of chosen Lemmy instances across a set of accounts")]
struct Cli {
    /// Path to the accounts TOML file
    #[arg(long, env = "LEMMY_BLOCK_ACCOUNTS", default_value = "./accounts.toml")]
    accounts: PathBuf,

    /// Path to the block list TOML file
    #[arg(long, env = "LEMMY_BLOCK_BLOCKLIST", default_value = "./blocklist.toml")]
    blocklist: PathBuf,

    /// Pause between remote calls in milliseconds (overrides the block list file)
    #[arg(long)]
    pause_ms: Option<u64>,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lemmy_block=info,lemmy_client=info"));
    if cli.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting lemmy-block");

    let registry = load_accounts(&cli.accounts)?;
    registry.log_redacted();

    let blocklist = load_blocklist(&cli.blocklist)?;
    if blocklist.is_empty() {
        warn!(path = %cli.blocklist.display(), "Block list has no sources and no targets");
    }
    let throttle = match cli.pause_ms {
        Some(ms) => Throttle::new(Duration::from_millis(ms)),
        None => blocklist.throttle(),
    };

    let http = lemmy_client::http_client()?;

    let directory = PublicDirectory::new(http.clone());
    let discoverer =
        CommunityDiscoverer::new(&directory, throttle).with_page_size(blocklist.page_size());
    let mut targets = TargetListBuilder::new(discoverer)
        .build(blocklist.source_instances())
        .await;
    targets.extend(blocklist.explicit_targets());

    let mut instances =
        registry.bind(|account| LemmyClient::with_client(http.clone(), &account.site));

    let orchestrator = BlockOrchestrator::new(throttle);
    let reports = orchestrator.run(&mut instances, &targets).await;

    let summary = RunSummary::from_reports(&reports);
    info!("lemmy-block complete. {summary}");

    Ok(())
}
