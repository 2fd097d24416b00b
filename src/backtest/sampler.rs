use chrono::{Duration, NaiveDate};
use rand::Rng;

/// Probability that any given calendar day carries a trade
pub const TRADE_DAY_PROBABILITY: f64 = 0.10;

/// Walk the date range and pick trade days from the seeded stream
///
/// Iterates from `start` (inclusive) to `end` (exclusive), drawing exactly one
/// uniform value per day in chronological order so the stream consumption is
/// reproducible. An empty or inverted range yields no days.
pub fn sample_trade_days<R: Rng>(rng: &mut R, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;

    while current < end {
        if rng.gen::<f64>() < TRADE_DAY_PROBABILITY {
            days.push(current);
        }
        current = current + Duration::days(1);
    }

    days
}
