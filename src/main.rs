mod api;
mod app;
mod cache;
mod commands;
mod config;
mod event;
mod logging;
mod query;
mod session;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(about = "Browse a product catalog from the terminal")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./storefront.yaml, then $XDG_CONFIG_HOME/storefront/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Origin of the product API, e.g. http://localhost:5000
  #[arg(long, env = config::API_URL_ENV)]
  api_url: Option<String>,

  /// Products per page
  #[arg(long)]
  page_size: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(api_url) = args.api_url {
    config.api.base_url = api_url;
  }
  if let Some(page_size) = args.page_size {
    config.page_size = page_size;
  }
  config.validate()?;

  let _guard = logging::init()?;
  info!(api = %config.api.base_url, page_size = config.page_size, "starting");

  let catalog = api::StoreCatalog::from_config(&config)?;

  let mut app = app::App::new(config, catalog);
  app.run().await?;

  Ok(())
}
