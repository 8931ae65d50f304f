use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::info;

use recording_calc::app_config::{default_config_path, AppConfig};
use recording_calc::catalog::{catalog_source_for, load_or_builtin};
use recording_calc::console::{Console, HELP};
use recording_calc::error::Result;
use recording_calc::selection::{AutoSelect, CascadeSelector};

/// Recording time calculator: how long a device can record on a given
/// storage capacity.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// CSV or JSON device catalog, overrides the configured one
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// Storage capacity in GB
    #[arg(long, value_name = "GB")]
    storage: Option<f64>,

    /// Keep dependent selections unset instead of picking the first option
    #[arg(long)]
    no_auto_select: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

async fn load_config(cli: &Cli) -> Result<AppConfig> {
    let path = match &cli.config {
        Some(path) => Ok(path.clone()),
        None => default_config_path(),
    };

    let mut config = AppConfig::load_or_default(path).await;
    config.apply_overrides(
        cli.catalog.clone(),
        cli.storage,
        cli.no_auto_select,
    )?;

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(&cli).await?;

    let source = catalog_source_for(config.catalog_path.as_deref());
    let catalog = Arc::new(load_or_builtin(source.as_ref()).await);

    let auto_select: AutoSelect = config.auto_select();
    let selector = CascadeSelector::new(catalog, auto_select);
    let mut console = Console::new(selector, config.storage_gb);

    info!("Recording calculator ready");
    println!("{}\n", HELP);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    console.run(stdin, tokio::io::stdout()).await?;

    info!("Recording calculator stopped");

    Ok(())
}
