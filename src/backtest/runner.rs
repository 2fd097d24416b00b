use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rand::Rng;

use crate::api::PriceLookup;
use crate::backtest::curves::{build_drawdown_curve, build_equity_curve, monthly_returns};
use crate::backtest::metrics::SummaryStats;
use crate::backtest::sampler::sample_trade_days;
use crate::backtest::seed::{derive_seed, seeded_rng};
use crate::backtest::synthesizer::synthesize_trades;
use crate::error::SimError;
use crate::models::{round2, BacktestResult, ChartData, SimulationParameters};
use crate::settings::Settings;
use crate::Result;

/// Bounds of the placeholder risk-adjusted metric
const RISK_METRIC_MIN: f64 = 0.8;
const RISK_METRIC_MAX: f64 = 2.5;

const DEFAULT_STRATEGY_NAME: &str = "Unknown Strategy";

/// Drives the simulation pipeline: parameters in, result object out
///
/// Each run owns its own seeded generator, so concurrent runs cannot disturb
/// each other's draw sequence.
pub struct BacktestRunner {
    settings: Settings,
    price_lookup: Arc<dyn PriceLookup>,
}

impl BacktestRunner {
    pub fn new(settings: Settings, price_lookup: Arc<dyn PriceLookup>) -> Self {
        Self {
            settings,
            price_lookup,
        }
    }

    /// Run one simulated backtest
    ///
    /// Validation failures surface immediately with no partial computation.
    /// The external price lookup happens at most once; any failure there is
    /// recovered by the symbol's synthetic price band.
    pub async fn run(&self, params: &SimulationParameters) -> Result<BacktestResult> {
        if params.script.trim().is_empty() {
            return Err(SimError::MissingScript);
        }

        let start_date = parse_date("start_date", &params.start_date)?;
        let end_date = if params.end_date.trim().is_empty() {
            Utc::now().date_naive()
        } else {
            parse_date("end_date", &params.end_date)?
        };

        if params.initial_capital <= 0.0 {
            return Err(SimError::InvalidCapital(params.initial_capital));
        }
        if params.position_size < 0.0 {
            return Err(SimError::InvalidPercent {
                field: "position_size",
                value: params.position_size,
            });
        }
        if params.commission_percent < 0.0 {
            return Err(SimError::InvalidPercent {
                field: "commission_percent",
                value: params.commission_percent,
            });
        }

        let strategy_name = extract_strategy_name(&params.script);

        tracing::info!(
            "Simulating '{}' on {} {} from {} to {}",
            strategy_name,
            params.symbol,
            params.timeframe,
            start_date,
            end_date
        );

        let seed = derive_seed(&params.script, &params.symbol, &params.timeframe);
        let mut rng = seeded_rng(seed);

        let trade_days = sample_trade_days(&mut rng, start_date, end_date);
        tracing::debug!("Sampled {} trade days", trade_days.len());

        let quoted_price = self.price_lookup.lookup(&params.symbol).await;
        let band = self.settings.band_for(&params.symbol);

        let outcome = synthesize_trades(
            &mut rng,
            &trade_days,
            end_date,
            params.initial_capital,
            params.position_size,
            params.commission_percent,
            quoted_price,
            band,
        );

        let equity_curve = build_equity_curve(&outcome.trades, params.initial_capital);
        let drawdown_curve = build_drawdown_curve(&equity_curve);
        let monthly = monthly_returns(&outcome.trades, params.initial_capital);
        let stats = SummaryStats::from_trades(&outcome.trades, params.initial_capital);

        // Placeholder, drawn last so it never disturbs the trade stream
        let risk_adjusted_metric = round2(rng.gen_range(RISK_METRIC_MIN..RISK_METRIC_MAX));

        tracing::info!(
            "Simulation complete: {} trades, net {:.2}%, max drawdown {:.2}%",
            stats.total_trades,
            stats.net_profit_percent,
            outcome.max_drawdown_percent
        );

        Ok(BacktestResult {
            strategy_name,
            symbol: params.symbol.clone(),
            timeframe: params.timeframe.clone(),
            start_date,
            end_date,
            initial_capital: params.initial_capital,
            position_size: params.position_size,
            commission_percent: params.commission_percent,
            total_trades: stats.total_trades,
            winning_trades: stats.winning_trades,
            losing_trades: stats.losing_trades,
            win_rate: round2(stats.win_rate),
            profit_factor: round2(stats.profit_factor),
            net_profit: round2(stats.net_profit),
            net_profit_percent: round2(stats.net_profit_percent),
            max_drawdown_percent: round2(outcome.max_drawdown_percent),
            risk_adjusted_metric,
            trades: outcome.trades,
            chart_data: ChartData {
                equity_curve,
                drawdown_curve,
                monthly_returns: monthly,
            },
            execution_mode: "simulation".to_string(),
            last_price: outcome.last_price,
            price_unavailable: outcome.price_unavailable,
        })
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| SimError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Pull the declared name out of a `strategy("...")` line
fn extract_strategy_name(script: &str) -> String {
    for line in script.lines() {
        if line.contains("strategy(") {
            if let Some(name) = line.split('"').nth(1) {
                return name.to_string();
            }
            break;
        }
    }
    DEFAULT_STRATEGY_NAME.to_string()
}
