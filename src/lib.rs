pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::payout::CalculationInputs;
use crate::providers::CachingRateProvider;
use anyhow::Result;
use tracing::{debug, info};

/// Inputs for a single payout calculation. Split and currency fall back to
/// the configured defaults.
#[derive(Debug, Clone)]
pub struct CalcArgs {
    pub account_size: f64,
    pub profit_percent: f64,
    pub split_percent: Option<f64>,
    pub currency: Option<String>,
}

impl CalcArgs {
    fn resolve(&self, config: &AppConfig) -> Result<CalculationInputs> {
        Ok(CalculationInputs::new(
            self.account_size,
            self.profit_percent,
            self.split_percent.unwrap_or(config.profit_split),
            self.currency.as_deref().unwrap_or(config.currency.as_str()),
        )?)
    }
}

pub enum AppCommand {
    Calc(CalcArgs),
    Rates,
    Interactive(CalcArgs),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Payout calculator starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let source = providers::build_rate_source(&config.rates)?;
    let provider = CachingRateProvider::new(source, config.rates.cache_ttl());

    match command {
        AppCommand::Calc(args) => cli::calc::run(&provider, &args.resolve(&config)?).await,
        AppCommand::Rates => cli::rates::run(&provider).await,
        AppCommand::Interactive(args) => {
            cli::interactive::run(&provider, args.resolve(&config)?).await
        }
    }
}
