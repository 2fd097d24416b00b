use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use super::PriceLookup;
use crate::settings::Settings;

const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Client for the CoinGecko public simple-price endpoint (no key required)
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl CoinGeckoClient {
    pub fn new() -> Self {
        Self::with_base_url(COINGECKO_API_BASE, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a client against a specific base URL, mainly for tests
    pub fn with_base_url(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_base_url(
            settings.price_api_base.clone(),
            settings.price_lookup_timeout_secs,
        )
    }

    /// Map common symbol spellings to CoinGecko coin ids
    ///
    /// Only the majors are mapped; anything else has no quote and uses the
    /// synthetic range.
    fn coin_id_for(symbol: &str) -> Option<&'static str> {
        match symbol.to_lowercase().as_str() {
            "btc" | "btcusd" | "btc-usd" | "bitcoinusd" | "btc/usd" | "bitcoin/usd" => {
                Some("bitcoin")
            }
            "eth" | "ethusd" | "eth-usd" | "ethereumusd" | "eth/usd" | "ethereum/usd" => {
                Some("ethereum")
            }
            _ => None,
        }
    }

    async fn fetch_simple_price(&self, coin_id: &str) -> Result<f64> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.base_url, coin_id
        );

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .context("price request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("price API returned {}", status));
        }

        let data: HashMap<String, HashMap<String, f64>> = response
            .json()
            .await
            .context("failed to parse price payload")?;

        data.get(coin_id)
            .and_then(|quote| quote.get("usd"))
            .copied()
            .ok_or_else(|| anyhow!("no usd quote for {} in payload", coin_id))
    }
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceLookup for CoinGeckoClient {
    async fn lookup(&self, symbol: &str) -> Option<f64> {
        let coin_id = Self::coin_id_for(symbol)?;

        match self.fetch_simple_price(coin_id).await {
            Ok(price) => {
                tracing::debug!("Resolved {} -> {} at ${:.2}", symbol, coin_id, price);
                Some(price)
            }
            Err(e) => {
                tracing::warn!(
                    "Price lookup failed for {}: {}. Using synthetic price range",
                    symbol,
                    e
                );
                None
            }
        }
    }
}
