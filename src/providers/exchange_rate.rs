use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::rates::{BASE_CURRENCY, RateError, RateSource, RateTable};

fn build_client(timeout: Duration) -> anyhow::Result<Client> {
    Ok(Client::builder()
        .user_agent("payoutcalc/1.0")
        .timeout(timeout)
        .build()?)
}

fn fetched_at(unix_seconds: Option<i64>) -> DateTime<Utc> {
    unix_seconds
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .unwrap_or_else(Utc::now)
}

/// Issues one GET and decodes the JSON body. No retries.
async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, RateError> {
    debug!("Requesting exchange rates from {}", url);

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            RateError::Network(format!("Request timed out for URL: {url}"))
        } else {
            RateError::Network(format!("Request error: {e} for URL: {url}"))
        }
    })?;

    if !response.status().is_success() {
        return Err(RateError::Network(format!(
            "HTTP error: {} for URL: {}",
            response.status(),
            url
        )));
    }

    let text = response
        .text()
        .await
        .map_err(|e| RateError::Network(format!("Failed to read response body: {e}")))?;

    serde_json::from_str(&text)
        .map_err(|e| RateError::Format(format!("Failed to parse JSON response: {e}")))
}

// open.er-api.com / exchangerate-api.com v6
pub struct OpenErApiSource {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl OpenErApiSource {
    pub fn new(base_url: &str, api_key: Option<&str>, timeout: Duration) -> anyhow::Result<Self> {
        Ok(OpenErApiSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
            client: build_client(timeout)?,
        })
    }

    fn url(&self) -> String {
        match &self.api_key {
            Some(key) => format!("{}/v6/{}/latest/{}", self.base_url, key, BASE_CURRENCY),
            None => format!("{}/v6/latest/{}", self.base_url, BASE_CURRENCY),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenErApiResponse {
    result: Option<String>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    #[serde(alias = "conversion_rates")]
    rates: Option<HashMap<String, f64>>,
    time_last_update_unix: Option<i64>,
}

#[async_trait]
impl RateSource for OpenErApiSource {
    fn name(&self) -> &str {
        "open_er_api"
    }

    #[instrument(name = "OpenErApiFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<RateTable, RateError> {
        let data: OpenErApiResponse = get_json(&self.client, &self.url()).await?;

        match data.result.as_deref() {
            Some("success") => {}
            Some(other) => {
                return Err(RateError::Format(format!(
                    "Provider reported result: {}{}",
                    other,
                    data.error_type
                        .map(|t| format!(" ({t})"))
                        .unwrap_or_default()
                )));
            }
            None => {
                return Err(RateError::Format(
                    "Missing field `result` in response".to_string(),
                ));
            }
        }

        let rates = data
            .rates
            .ok_or_else(|| RateError::Format("Missing field `rates` in response".to_string()))?;

        RateTable::from_provider(rates, fetched_at(data.time_last_update_unix))
    }
}

// exchangerate.host
pub struct ExchangeRateHostSource {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl ExchangeRateHostSource {
    pub fn new(base_url: &str, api_key: Option<&str>, timeout: Duration) -> anyhow::Result<Self> {
        Ok(ExchangeRateHostSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
            client: build_client(timeout)?,
        })
    }

    fn url(&self) -> String {
        let mut url = format!("{}/latest?base={}", self.base_url, BASE_CURRENCY);
        if let Some(key) = &self.api_key {
            url.push_str(&format!("&access_key={key}"));
        }
        url
    }
}

#[derive(Debug, Deserialize)]
struct ExchangeRateHostResponse {
    success: Option<bool>,
    rates: Option<HashMap<String, f64>>,
    timestamp: Option<i64>,
}

#[async_trait]
impl RateSource for ExchangeRateHostSource {
    fn name(&self) -> &str {
        "exchange_rate_host"
    }

    #[instrument(name = "ExchangeRateHostFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<RateTable, RateError> {
        let data: ExchangeRateHostResponse = get_json(&self.client, &self.url()).await?;

        match data.success {
            Some(true) => {}
            Some(false) => {
                return Err(RateError::Format(
                    "Provider reported success: false".to_string(),
                ));
            }
            None => {
                return Err(RateError::Format(
                    "Missing field `success` in response".to_string(),
                ));
            }
        }

        let rates = data
            .rates
            .ok_or_else(|| RateError::Format("Missing field `rates` in response".to_string()))?;

        RateTable::from_provider(rates, fetched_at(data.timestamp))
    }
}
