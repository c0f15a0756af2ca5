use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use volcano_map::config::AppConfig;

#[derive(Parser)]
#[command(author, version, about = "Render volcanoes and world population onto a Leaflet map", long_about = None)]
struct Cli {
    /// TOML config; the built-in defaults are used when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn init_logger(verbose: bool) {
    let default_filter = if verbose { "volcano_map=debug,info" } else { "volcano_map=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let app_config = match &cli.config {
        Some(path) => {
            tracing::info!(config = ?path, "Loading configuration");
            AppConfig::load_from_file(path)?
        }
        None => AppConfig::default(),
    };

    volcano_map::run(&app_config)?;
    Ok(())
}
