pub mod cli;
pub mod config;
pub mod core;
pub mod log;
pub mod sources;
pub mod store;

use anyhow::Result;
use tracing::{debug, info};

use crate::core::rate::RateSource;
use crate::sources::exchangerate_api::PremiumSource;
use crate::sources::fallback::StaticSource;
use crate::sources::open_er::FreeSource;
use crate::sources::resolver::RateResolver;

pub enum AppCommand {
    Convert { amount: f64, from: String, to: String },
    Rates { base: String },
    History { limit: usize },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Currency converter starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = store::Store::open(&config.default_data_path()?)?;
    let resolver = build_resolver(&config)?;

    match command {
        AppCommand::Convert { amount, from, to } => {
            let converter = core::convert::Converter::new(&resolver, &store);
            cli::convert::run(&converter, amount, &from, &to).await
        }
        AppCommand::Rates { base } => cli::rates::run(&resolver, &store, &base).await,
        AppCommand::History { limit } => cli::history::run(&store, limit),
    }
}

/// Builds the source chain in priority order: premium when an API key
/// is configured, then the free endpoints, then the static table.
fn build_resolver(config: &config::AppConfig) -> Result<RateResolver> {
    let mut sources: Vec<Box<dyn RateSource>> = Vec::new();

    if let Some(api_key) = &config.api_key {
        let base_url = config
            .sources
            .premium
            .as_ref()
            .map_or("https://v6.exchangerate-api.com/v6", |p| &p.base_url);
        sources.push(Box::new(PremiumSource::new(base_url, api_key)?));
    }

    for free in &config.sources.free {
        sources.push(Box::new(FreeSource::new(&free.base_url)?));
    }

    sources.push(Box::new(StaticSource));
    Ok(RateResolver::new(sources))
}
