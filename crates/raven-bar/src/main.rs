mod daemon;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use raven_bar_core::ConfigPaths;

#[derive(Parser)]
#[command(name = "raven-bar")]
#[command(about = "Layer-shell status bar for the Raven desktop")]
#[command(version)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/raven-bar/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// User stylesheet (default: $XDG_CONFIG_HOME/raven-bar/style.css)
    #[arg(short, long)]
    style: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `raven_bar_core=trace`
    #[arg(short, long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::from_default_env()
            .add_directive("raven_bar=info".parse()?)
            .add_directive("raven_bar_core=info".parse()?)
            .add_directive("raven_bar_components=info".parse()?),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let paths = ConfigPaths::new().with_overrides(cli.config, cli.style);
    info!("Starting raven-bar with {:?}", paths.config);
    daemon::run(paths)
}
