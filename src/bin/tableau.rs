use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tableau", version)]
struct Cli {
    /// Monitor to occupy in fullscreen; out-of-range indices fall back to the first monitor.
    #[arg(long, default_value_t = 1)]
    monitor: usize,

    /// Playlist and tunables (JSON). Built-in defaults are used when the file is absent.
    #[arg(long, default_value = "tableau.json")]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = tableau::Config::load_or_default(&cli.config)
        .with_context(|| format!("load config '{}'", cli.config.display()))?;
    config.validate()?;

    let display = tableau::WindowDisplay::open(cli.monitor, config.output_size)
        .context("open fullscreen display")?;
    let backends = tableau::Backends::system(display, &config);

    let mut orchestrator =
        tableau::Orchestrator::start(config, backends).context("start playback")?;
    orchestrator.run()?;
    Ok(())
}
