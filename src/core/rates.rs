//! Exchange rate abstractions and the static fallback table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt::Display;
use thiserror::Error;

pub const BASE_CURRENCY: &str = "USD";

/// Approximate units of each currency per 1 USD, used when no live table is
/// available.
pub const FALLBACK_RATES: [(&str, f64); 9] = [
    ("USD", 1.0),
    ("ZAR", 18.50),
    ("EUR", 0.92),
    ("GBP", 0.79),
    ("JPY", 149.50),
    ("AUD", 1.52),
    ("CAD", 1.36),
    ("CHF", 0.88),
    ("NZD", 1.65),
];

#[derive(Debug, Error)]
pub enum RateError {
    /// Connection failure, timeout or an unsuccessful HTTP status.
    #[error("Network error: {0}")]
    Network(String),

    /// The body did not have the shape the provider promises.
    #[error("Format error: {0}")]
    Format(String),
}

/// Currency code to units-per-USD mapping. Always holds `USD = 1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: BTreeMap<String, f64>,
    fetched_at: DateTime<Utc>,
}

impl RateTable {
    pub fn new<I, S>(rates: I, fetched_at: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut rates: BTreeMap<String, f64> = rates
            .into_iter()
            .map(|(code, rate)| (code.as_ref().trim().to_uppercase(), rate))
            .collect();
        rates.insert(BASE_CURRENCY.to_string(), 1.0);
        Self { rates, fetched_at }
    }

    /// Builds a table from a provider payload, rejecting rates that are
    /// negative or not finite.
    pub fn from_provider<I>(rates: I, fetched_at: DateTime<Utc>) -> Result<Self, RateError>
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let rates: Vec<(String, f64)> = rates.into_iter().collect();
        if rates.is_empty() {
            return Err(RateError::Format("Rate mapping is empty".to_string()));
        }
        if let Some((code, rate)) = rates
            .iter()
            .find(|(_, rate)| !rate.is_finite() || *rate < 0.0)
        {
            return Err(RateError::Format(format!(
                "Invalid rate {rate} for currency: {code}"
            )));
        }
        Ok(Self::new(rates, fetched_at))
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(&code.trim().to_uppercase()).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rate(code).is_some()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(code, rate)| (code.as_str(), *rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

pub fn fallback_table() -> RateTable {
    RateTable::new(FALLBACK_RATES, Utc::now())
}

/// Where the table handed to the caller came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateOrigin {
    Live,
    Cached,
    Fallback,
}

impl Display for RateOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RateOrigin::Live => "live",
                RateOrigin::Cached => "cached",
                RateOrigin::Fallback => "fallback",
            }
        )
    }
}

#[derive(Debug, Clone)]
pub struct RateLookup {
    pub table: RateTable,
    pub origin: RateOrigin,
    pub warning: Option<String>,
}

impl RateLookup {
    pub fn live(table: RateTable) -> Self {
        Self {
            table,
            origin: RateOrigin::Live,
            warning: None,
        }
    }

    pub fn cached(table: RateTable) -> Self {
        Self {
            table,
            origin: RateOrigin::Cached,
            warning: None,
        }
    }

    pub fn fallback(cause: &RateError) -> Self {
        Self {
            table: fallback_table(),
            origin: RateOrigin::Fallback,
            warning: Some(format!(
                "Live exchange rates unavailable ({cause}); using approximate fallback rates"
            )),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == RateOrigin::Fallback
    }
}

/// A remote service that can produce a full rate table.
#[async_trait]
pub trait RateSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_rates(&self) -> Result<RateTable, RateError>;
}

#[async_trait]
impl RateSource for Box<dyn RateSource> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch_rates(&self) -> Result<RateTable, RateError> {
        (**self).fetch_rates().await
    }
}

/// Hands out a usable rate table. Implementations absorb fetch failures.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn get_rates(&self) -> RateLookup;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_table_contents() {
        let table = fallback_table();
        assert_eq!(table.len(), 9);
        assert_eq!(table.rate("USD"), Some(1.0));
        assert_eq!(table.rate("ZAR"), Some(18.50));
        for code in ["EUR", "GBP", "JPY", "AUD", "CAD", "CHF", "NZD"] {
            assert!(table.contains(code), "fallback is missing {code}");
        }
    }

    #[test]
    fn test_table_always_has_usd_base() {
        let table = RateTable::new([("eur", 0.9)], Utc::now());
        assert_eq!(table.rate("USD"), Some(1.0));
        assert_eq!(table.rate("EUR"), Some(0.9));

        let table = RateTable::new([("USD", 1.2)], Utc::now());
        assert_eq!(table.rate("USD"), Some(1.0));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = fallback_table();
        assert_eq!(table.rate("zar"), Some(18.50));
        assert_eq!(table.rate(" gbp "), Some(0.79));
        assert!(!table.contains("XYZ"));
    }

    #[test]
    fn test_codes_are_sorted() {
        let table = fallback_table();
        let codes: Vec<&str> = table.codes().collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn test_from_provider_rejects_bad_rates() {
        let err = RateTable::from_provider(vec![("EUR".to_string(), -1.0)], Utc::now())
            .unwrap_err();
        assert!(matches!(err, RateError::Format(_)));
        assert_eq!(err.to_string(), "Format error: Invalid rate -1 for currency: EUR");

        let err = RateTable::from_provider(vec![("EUR".to_string(), f64::NAN)], Utc::now())
            .unwrap_err();
        assert!(matches!(err, RateError::Format(_)));

        let err = RateTable::from_provider(Vec::new(), Utc::now()).unwrap_err();
        assert!(matches!(err, RateError::Format(_)));
    }

    #[test]
    fn test_from_provider_keeps_zero_rates() {
        let table =
            RateTable::from_provider(vec![("XAU".to_string(), 0.0)], Utc::now()).unwrap();
        assert_eq!(table.rate("XAU"), Some(0.0));
    }

    #[test]
    fn test_fallback_lookup_carries_warning() {
        let lookup = RateLookup::fallback(&RateError::Network("timed out".to_string()));
        assert!(lookup.is_fallback());
        assert_eq!(lookup.origin.to_string(), "fallback");
        let warning = lookup.warning.unwrap();
        assert!(warning.contains("Network error: timed out"));
        assert!(warning.contains("fallback rates"));
    }
}
