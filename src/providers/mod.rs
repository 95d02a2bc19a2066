pub mod caching;
pub mod exchange_rate;

use crate::core::config::{RateApi, RatesConfig};
use crate::core::rates::RateSource;
use anyhow::Result;
use tracing::debug;

pub use caching::CachingRateProvider;

/// Builds the adapter for the configured rate service.
pub fn build_rate_source(config: &RatesConfig) -> Result<Box<dyn RateSource>> {
    let base_url = config.base_url();
    let api_key = config.api_key.as_deref();
    let timeout = config.timeout();

    let source: Box<dyn RateSource> = match config.provider {
        RateApi::OpenErApi => Box::new(exchange_rate::OpenErApiSource::new(
            base_url, api_key, timeout,
        )?),
        RateApi::ExchangeRateHost => Box::new(exchange_rate::ExchangeRateHostSource::new(
            base_url, api_key, timeout,
        )?),
    };
    debug!(source = source.name(), base_url, "Built rate source");
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_rate_source_per_provider() {
        let config = RatesConfig::default();
        assert_eq!(build_rate_source(&config).unwrap().name(), "open_er_api");

        let config = RatesConfig {
            provider: RateApi::ExchangeRateHost,
            ..RatesConfig::default()
        };
        assert_eq!(build_rate_source(&config).unwrap().name(), "exchange_rate_host");
    }
}
