use serde::{Deserialize, Serialize};

use crate::Result;

/// Synthetic price band for a family of symbols, matched by prefix
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceBand {
    /// Case-insensitive symbol prefix; empty matches nothing by itself
    pub prefix: String,
    pub min_price: f64,
    pub max_price: f64,
}

/// Runtime settings for the simulator
///
/// Loaded from an optional `stratsim` config file plus `STRATSIM_*` environment
/// overrides; defaults reproduce the built-in behavior so no file is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the price API
    #[serde(default = "default_price_api_base")]
    pub price_api_base: String,
    /// Timeout for the single best-effort price lookup
    #[serde(default = "default_lookup_timeout")]
    pub price_lookup_timeout_secs: u64,
    /// Symbol-prefix keyed synthetic price bands, first match wins
    #[serde(default = "default_price_bands")]
    pub price_bands: Vec<PriceBand>,
    /// Band used when no prefix matches
    #[serde(default = "default_fallback_band")]
    pub fallback_band: PriceBand,
}

fn default_price_api_base() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_lookup_timeout() -> u64 {
    5
}

fn default_price_bands() -> Vec<PriceBand> {
    vec![PriceBand {
        prefix: "BTC".to_string(),
        min_price: 20000.0,
        max_price: 60000.0,
    }]
}

fn default_fallback_band() -> PriceBand {
    PriceBand {
        prefix: String::new(),
        min_price: 1000.0,
        max_price: 2000.0,
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            price_api_base: default_price_api_base(),
            price_lookup_timeout_secs: default_lookup_timeout(),
            price_bands: default_price_bands(),
            fallback_band: default_fallback_band(),
        }
    }
}

impl Settings {
    /// Load settings from `stratsim.{toml,json,yaml}` (optional) and
    /// `STRATSIM_*` environment variables
    pub fn load() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name("stratsim").required(false))
            .add_source(
                config::Environment::with_prefix("STRATSIM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(cfg.try_deserialize()?)
    }

    /// Resolve the synthetic price band for a symbol
    pub fn band_for(&self, symbol: &str) -> &PriceBand {
        let upper = symbol.to_uppercase();
        self.price_bands
            .iter()
            .filter(|band| !band.prefix.is_empty())
            .find(|band| upper.starts_with(&band.prefix.to_uppercase()))
            .unwrap_or(&self.fallback_band)
    }
}
