pub mod coingecko;

use async_trait::async_trait;

pub use coingecko::CoinGeckoClient;

/// Injectable current-price capability
///
/// The simulation treats this as read-only and best-effort: any failure mode
/// resolves to `None` and the caller falls back to its synthetic price range.
#[async_trait]
pub trait PriceLookup: Send + Sync {
    /// Current price for a symbol, or None when unavailable
    async fn lookup(&self, symbol: &str) -> Option<f64>;
}

/// Lookup that never resolves a price
///
/// Used by tests and the `--offline` flag to force the synthetic fallback.
pub struct OfflinePriceLookup;

#[async_trait]
impl PriceLookup for OfflinePriceLookup {
    async fn lookup(&self, _symbol: &str) -> Option<f64> {
        None
    }
}
