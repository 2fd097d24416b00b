use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Input parameters for one simulated backtest run
///
/// Field defaults mirror the upstream configuration collaborator so a partial
/// JSON document (or none at all) still yields a runnable parameter set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Symbol to backtest on (e.g. "BTCUSD")
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Timeframe label (e.g. "1D"); only participates in seeding
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    /// Start date as YYYY-MM-DD
    #[serde(default = "default_start_date")]
    pub start_date: String,
    /// End date as YYYY-MM-DD; empty means "now"
    #[serde(default)]
    pub end_date: String,
    /// Starting account value, must be positive
    #[serde(default = "default_capital")]
    pub initial_capital: f64,
    /// Position size in percent of current equity per trade
    #[serde(default = "default_position_size")]
    pub position_size: f64,
    /// Commission percent charged per trade
    #[serde(default = "default_commission")]
    pub commission_percent: f64,
    /// Raw strategy script text; used for seeding and name extraction only
    #[serde(default)]
    pub script: String,
}

fn default_symbol() -> String {
    "BTCUSD".to_string()
}

fn default_timeframe() -> String {
    "1D".to_string()
}

fn default_start_date() -> String {
    "2020-01-01".to_string()
}

fn default_capital() -> f64 {
    10000.0
}

fn default_position_size() -> f64 {
    100.0
}

fn default_commission() -> f64 {
    0.1
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            timeframe: default_timeframe(),
            start_date: default_start_date(),
            end_date: String::new(),
            initial_capital: default_capital(),
            position_size: default_position_size(),
            commission_percent: default_commission(),
            script: String::new(),
        }
    }
}

impl SimulationParameters {
    /// Parse parameters from a JSON document (direct content path)
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load parameters from a JSON file on disk
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Direction of a simulated trade
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TradeSide {
    Long,
    Short,
}

/// A single synthesized trade
///
/// Price and percent fields are rounded to 2 decimals at creation and never
/// mutated afterwards; downstream curves and statistics consume these rounded
/// values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    /// 1-based sequence id in generation order
    pub id: u32,
    pub entry_date: NaiveDate,
    /// Always >= entry_date; clipped to the simulation end date
    pub exit_date: NaiveDate,
    pub side: TradeSide,
    pub entry_price: f64,
    pub exit_price: f64,
    pub profit_percent: f64,
    pub profit_amount: f64,
}

/// One labelled point of the equity or drawdown curve
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartPoint {
    /// "Day 0" for the origin, then "Trade N"
    pub label: String,
    pub value: f64,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Percent-of-capital return for one entry month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyReturn {
    /// YYYY-MM
    pub month: String,
    pub return_percent: f64,
}

/// Chart-ready series derived from the trade set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartData {
    pub equity_curve: Vec<ChartPoint>,
    pub drawdown_curve: Vec<ChartPoint>,
    pub monthly_returns: Vec<MonthlyReturn>,
}

/// Complete simulated backtest result, consumed verbatim by report rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub strategy_name: String,
    pub symbol: String,
    pub timeframe: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub position_size: f64,
    pub commission_percent: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    /// f64::INFINITY when there are no losing trades
    pub profit_factor: f64,
    pub net_profit: f64,
    pub net_profit_percent: f64,
    pub max_drawdown_percent: f64,
    /// Seeded placeholder in (0.8, 2.5); not derived from the equity series
    pub risk_adjusted_metric: f64,
    pub trades: Vec<Trade>,
    pub chart_data: ChartData,
    /// Always "simulation"
    pub execution_mode: String,
    pub last_price: f64,
    /// True when the external price lookup returned nothing and the synthetic
    /// fallback range was used
    pub price_unavailable: bool,
}

/// Round to 2 decimal places, the precision used throughout result assembly
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
