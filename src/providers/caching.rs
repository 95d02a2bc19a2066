use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::core::cache::{Clock, SystemClock, TtlSlot};
use crate::core::rates::{RateLookup, RateProvider, RateSource, RateTable};

/// Serves rate tables from a single time-boxed slot, refreshing from the
/// wrapped source on expiry and falling back to the static table on failure.
///
/// Only live tables are ever stored. A failed refresh leaves the slot as it
/// was, so the next call goes back to the network.
pub struct CachingRateProvider<S: RateSource> {
    source: S,
    slot: TtlSlot<RateTable>,
}

impl<S: RateSource> CachingRateProvider<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self::with_clock(source, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(source: S, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            slot: TtlSlot::new(ttl, clock),
        }
    }
}

#[async_trait]
impl<S: RateSource> RateProvider for CachingRateProvider<S> {
    #[instrument(name = "RateLookup", skip(self))]
    async fn get_rates(&self) -> RateLookup {
        let mut slot = self.slot.lock().await;
        if let Some(table) = slot.fresh() {
            debug!("Serving cached rate table");
            return RateLookup::cached(table);
        }

        match self.source.fetch_rates().await {
            Ok(table) => {
                debug!(
                    source = self.source.name(),
                    currencies = table.len(),
                    "Fetched live rate table"
                );
                slot.store(table.clone());
                RateLookup::live(table)
            }
            Err(e) => {
                warn!(error = %e, "Rate fetch failed, using fallback table");
                RateLookup::fallback(&e)
            }
        }
    }
}
