use serde::{Deserialize, Serialize};

use crate::models::Trade;

/// Aggregate performance statistics over a synthesized trade set
///
/// Values here are unrounded; result assembly applies the 2-decimal rounding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    /// f64::INFINITY when gross_loss is zero, even with zero gross_profit
    pub profit_factor: f64,
    pub net_profit: f64,
    pub net_profit_percent: f64,
}

impl SummaryStats {
    /// Calculate statistics from the recorded trades
    ///
    /// A trade wins when its profit_percent is strictly positive; break-even
    /// trades count against the loss side.
    pub fn from_trades(trades: &[Trade], initial_capital: f64) -> Self {
        let total_trades = trades.len();
        let winning_trades = trades.iter().filter(|t| t.profit_percent > 0.0).count();
        let losing_trades = total_trades - winning_trades;

        let win_rate = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let gross_profit: f64 = trades
            .iter()
            .filter(|t| t.profit_percent > 0.0)
            .map(|t| t.profit_amount)
            .sum();
        let gross_loss: f64 = trades
            .iter()
            .filter(|t| t.profit_percent <= 0.0)
            .map(|t| t.profit_amount)
            .sum::<f64>()
            .abs();

        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else {
            f64::INFINITY
        };

        let net_profit: f64 = trades.iter().map(|t| t.profit_amount).sum();
        let net_profit_percent = net_profit / initial_capital * 100.0;

        Self {
            total_trades,
            winning_trades,
            losing_trades,
            win_rate,
            gross_profit,
            gross_loss,
            profit_factor,
            net_profit,
            net_profit_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TradeSide;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn trade(id: u32, profit_percent: f64, profit_amount: f64) -> Trade {
        let date = NaiveDate::from_ymd_opt(2022, 1, id).unwrap();
        Trade {
            id,
            entry_date: date,
            exit_date: date,
            side: TradeSide::Long,
            entry_price: 1000.0,
            exit_price: 1000.0,
            profit_percent,
            profit_amount,
        }
    }

    #[test]
    fn test_two_trade_reference_scenario() {
        let trades = vec![trade(1, 5.0, 500.0), trade(2, -2.0, -200.0)];
        let stats = SummaryStats::from_trades(&trades, 10000.0);

        assert_eq!(stats.total_trades, 2);
        assert_eq!(stats.winning_trades, 1);
        assert_eq!(stats.losing_trades, 1);
        assert_relative_eq!(stats.win_rate, 50.0);
        assert_relative_eq!(stats.net_profit, 300.0);
        assert_relative_eq!(stats.net_profit_percent, 3.0);
        assert_relative_eq!(stats.profit_factor, 2.5);
    }

    #[test]
    fn test_no_trades_yield_zeroed_stats() {
        let stats = SummaryStats::from_trades(&[], 10000.0);

        assert_eq!(stats.total_trades, 0);
        assert_eq!(stats.win_rate, 0.0);
        assert_eq!(stats.net_profit, 0.0);
        assert_eq!(stats.net_profit_percent, 0.0);
        // No losing trades means the infinite sentinel, even with no winners
        assert!(stats.profit_factor.is_infinite());
    }

    #[test]
    fn test_profit_factor_infinite_without_losses() {
        let trades = vec![trade(1, 3.0, 300.0), trade(2, 1.0, 100.0)];
        let stats = SummaryStats::from_trades(&trades, 10000.0);

        assert_eq!(stats.losing_trades, 0);
        assert!(stats.profit_factor.is_infinite());
        assert!(stats.profit_factor > 0.0);
    }

    #[test]
    fn test_profit_factor_infinite_with_zero_gross_profit() {
        // A single break-even trade: no winners, gross_loss is exactly 0
        let trades = vec![trade(1, 0.0, 0.0)];
        let stats = SummaryStats::from_trades(&trades, 10000.0);

        assert_eq!(stats.winning_trades, 0);
        assert_eq!(stats.losing_trades, 1);
        assert_eq!(stats.gross_profit, 0.0);
        assert_eq!(stats.gross_loss, 0.0);
        assert!(stats.profit_factor.is_infinite());
    }

    #[test]
    fn test_break_even_trades_count_as_losses() {
        let trades = vec![trade(1, 0.0, 0.0), trade(2, 2.0, 200.0)];
        let stats = SummaryStats::from_trades(&trades, 10000.0);

        assert_eq!(stats.winning_trades, 1);
        assert_eq!(stats.losing_trades, 1);
        assert_relative_eq!(stats.win_rate, 50.0);
    }

    #[test]
    fn test_win_rate_identity() {
        let trades = vec![
            trade(1, 1.0, 100.0),
            trade(2, 2.0, 200.0),
            trade(3, -1.0, -100.0),
        ];
        let stats = SummaryStats::from_trades(&trades, 10000.0);

        assert_relative_eq!(
            stats.win_rate,
            stats.winning_trades as f64 / stats.total_trades as f64 * 100.0
        );
    }
}
