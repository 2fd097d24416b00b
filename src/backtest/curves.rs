use std::collections::BTreeMap;

use crate::models::{round2, ChartPoint, MonthlyReturn, Trade};

/// Build the normalized equity curve from the trade set
///
/// A fresh accumulator seeded at `initial_capital` replays the recorded profit
/// amounts in entry-date order; the synthesizer's running state is never
/// reused here. The first point is always ("Day 0", 100.0).
pub fn build_equity_curve(trades: &[Trade], initial_capital: f64) -> Vec<ChartPoint> {
    let mut sorted: Vec<&Trade> = trades.iter().collect();
    sorted.sort_by_key(|t| t.entry_date);

    let mut curve = Vec::with_capacity(sorted.len() + 1);
    curve.push(ChartPoint::new("Day 0", 100.0));

    let mut equity = initial_capital;
    for (i, trade) in sorted.iter().enumerate() {
        equity += trade.profit_amount;
        let percent = equity / initial_capital * 100.0;
        curve.push(ChartPoint::new(format!("Trade {}", i + 1), round2(percent)));
    }

    curve
}

/// Derive the drawdown curve from an equity curve
///
/// Tracks a peak starting at 100 and emits the percent distance below it,
/// negated; every value is <= 0.
pub fn build_drawdown_curve(equity_curve: &[ChartPoint]) -> Vec<ChartPoint> {
    let mut peak = 100.0_f64;
    let mut curve = Vec::with_capacity(equity_curve.len());

    for point in equity_curve {
        if point.value > peak {
            peak = point.value;
        }
        let drawdown = (peak - point.value) / peak * 100.0;
        curve.push(ChartPoint::new(point.label.clone(), round2(-drawdown)));
    }

    curve
}

/// Bucket trades by entry month and express each bucket as a percent of
/// initial capital, sorted by month ascending
pub fn monthly_returns(trades: &[Trade], initial_capital: f64) -> Vec<MonthlyReturn> {
    let mut buckets: BTreeMap<String, f64> = BTreeMap::new();

    for trade in trades {
        let month = trade.entry_date.format("%Y-%m").to_string();
        *buckets.entry(month).or_insert(0.0) += trade.profit_amount;
    }

    buckets
        .into_iter()
        .map(|(month, profit)| MonthlyReturn {
            month,
            return_percent: round2(profit / initial_capital * 100.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TradeSide;
    use chrono::NaiveDate;

    fn trade(id: u32, entry: (i32, u32, u32), profit_amount: f64) -> Trade {
        let entry_date = NaiveDate::from_ymd_opt(entry.0, entry.1, entry.2).unwrap();
        Trade {
            id,
            entry_date,
            exit_date: entry_date,
            side: TradeSide::Long,
            entry_price: 1000.0,
            exit_price: 1000.0,
            profit_percent: if profit_amount > 0.0 { 1.0 } else { -1.0 },
            profit_amount,
        }
    }

    #[test]
    fn test_equity_curve_starts_at_day_zero() {
        let curve = build_equity_curve(&[], 10000.0);
        assert_eq!(curve.len(), 1);
        assert_eq!(curve[0], ChartPoint::new("Day 0", 100.0));
    }

    #[test]
    fn test_equity_curve_two_trades() {
        let trades = vec![
            trade(1, (2022, 1, 5), 500.0),
            trade(2, (2022, 2, 10), -200.0),
        ];
        let curve = build_equity_curve(&trades, 10000.0);

        assert_eq!(curve.len(), 3);
        assert_eq!(curve[1], ChartPoint::new("Trade 1", 105.0));
        assert_eq!(curve[2], ChartPoint::new("Trade 2", 103.0));
    }

    #[test]
    fn test_equity_curve_resorts_by_entry_date() {
        // Generation order deliberately violates date order
        let trades = vec![
            trade(1, (2022, 3, 1), -200.0),
            trade(2, (2022, 1, 1), 500.0),
        ];
        let curve = build_equity_curve(&trades, 10000.0);

        // The January trade must be replayed first
        assert_eq!(curve[1].value, 105.0);
        assert_eq!(curve[2].value, 103.0);
    }

    #[test]
    fn test_drawdown_curve_is_never_positive() {
        let trades = vec![
            trade(1, (2022, 1, 5), 500.0),
            trade(2, (2022, 2, 10), -200.0),
            trade(3, (2022, 3, 15), 800.0),
            trade(4, (2022, 4, 20), -1000.0),
        ];
        let equity = build_equity_curve(&trades, 10000.0);
        let drawdown = build_drawdown_curve(&equity);

        assert_eq!(drawdown.len(), equity.len());
        for point in &drawdown {
            assert!(point.value <= 0.0, "drawdown {} > 0", point.value);
        }
    }

    #[test]
    fn test_drawdown_tracks_peak() {
        let trades = vec![
            trade(1, (2022, 1, 5), 500.0),
            trade(2, (2022, 2, 10), -200.0),
        ];
        let equity = build_equity_curve(&trades, 10000.0);
        let drawdown = build_drawdown_curve(&equity);

        assert_eq!(drawdown[0].value, 0.0);
        assert_eq!(drawdown[1].value, 0.0);
        // (105 - 103) / 105 * 100 = 1.9047... -> -1.90
        assert_eq!(drawdown[2].value, -1.9);
        assert_eq!(drawdown[2].label, "Trade 2");
    }

    #[test]
    fn test_monthly_returns_buckets_and_sorts() {
        let trades = vec![
            trade(1, (2022, 2, 10), -200.0),
            trade(2, (2022, 1, 5), 500.0),
            trade(3, (2022, 1, 25), 300.0),
        ];
        let monthly = monthly_returns(&trades, 10000.0);

        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].month, "2022-01");
        assert_eq!(monthly[0].return_percent, 8.0);
        assert_eq!(monthly[1].month, "2022-02");
        assert_eq!(monthly[1].return_percent, -2.0);
    }

    #[test]
    fn test_monthly_returns_empty() {
        assert!(monthly_returns(&[], 10000.0).is_empty());
    }
}
