//! Balance history - dense per-day series from sparse snapshots
//!
//! The API reports an end-of-day balance only for days with activity.
//! Charts need one point per day, so gaps are filled from the nearest
//! known value: the latest earlier snapshot if there is one, otherwise the
//! earliest later one, otherwise zero.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::domain::BalancePoint;

/// Snapshots indexed by day; the last record seen for a day wins
struct DailyBalances(BTreeMap<NaiveDate, Decimal>);

impl DailyBalances {
    fn from_points(points: &[BalancePoint]) -> Self {
        let mut by_day = BTreeMap::new();
        for point in points {
            by_day.insert(point.date, point.balance);
        }
        Self(by_day)
    }

    fn value_on(&self, date: NaiveDate) -> Decimal {
        if let Some(balance) = self.0.get(&date) {
            return *balance;
        }
        if let Some((_, balance)) = self.0.range(..date).next_back() {
            return *balance;
        }
        self.0
            .range(date..)
            .next()
            .map(|(_, balance)| *balance)
            .unwrap_or(Decimal::ZERO)
    }
}

/// One point per day for the `days` calendar days ending at `end`
///
/// The result is ordered oldest first and always has exactly `days`
/// entries; `days == 0` yields an empty series.
pub fn fill_balance_series(points: &[BalancePoint], end: NaiveDate, days: u32) -> Vec<BalancePoint> {
    if days == 0 {
        return Vec::new();
    }

    let balances = DailyBalances::from_points(points);
    let Some(start) = end.checked_sub_signed(Duration::days(i64::from(days) - 1)) else {
        tracing::warn!(%end, days, "balance window starts before the supported date range");
        return Vec::new();
    };

    start
        .iter_days()
        .take(days as usize)
        .map(|date| BalancePoint::new(date, balances.value_on(date)))
        .collect()
}

/// Re-index several accounts on the union of their dates
///
/// Every returned series has the same length and the same dates, in
/// ascending order, with gaps filled by the same rule as
/// [`fill_balance_series`].
pub fn align_series(histories: &BTreeMap<i64, Vec<BalancePoint>>) -> BTreeMap<i64, Vec<BalancePoint>> {
    let all_dates: BTreeSet<NaiveDate> = histories
        .values()
        .flat_map(|points| points.iter().map(|p| p.date))
        .collect();

    histories
        .iter()
        .map(|(account_id, points)| {
            let balances = DailyBalances::from_points(points);
            let series = all_dates
                .iter()
                .map(|date| BalancePoint::new(*date, balances.value_on(*date)))
                .collect();
            (*account_id, series)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::ToPrimitive;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn point(d: u32, balance: i64) -> BalancePoint {
        BalancePoint::new(day(d), Decimal::from(balance))
    }

    fn balances(series: &[BalancePoint]) -> Vec<i64> {
        series
            .iter()
            .map(|p| p.balance.to_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_forward_fill_between_snapshots() {
        let series = fill_balance_series(&[point(2, 100), point(5, 40)], day(7), 7);

        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, day(1));
        assert_eq!(series[6].date, day(7));
        // Day 1 has no earlier snapshot, so it takes the first later one
        assert_eq!(balances(&series), vec![100, 100, 100, 100, 40, 40, 40]);
    }

    #[test]
    fn test_no_snapshots_defaults_to_zero() {
        let series = fill_balance_series(&[], day(10), 3);
        assert_eq!(balances(&series), vec![0, 0, 0]);
    }

    #[test]
    fn test_zero_days_is_empty() {
        assert!(fill_balance_series(&[point(1, 5)], day(10), 0).is_empty());
    }

    #[test]
    fn test_last_record_per_day_wins() {
        let points = vec![point(3, 100), point(3, 80), point(3, 95)];
        let series = fill_balance_series(&points, day(3), 1);
        assert_eq!(balances(&series), vec![95]);
    }

    #[test]
    fn test_snapshots_outside_window_seed_the_fill() {
        // Earlier snapshot outside the window carries into it
        let series = fill_balance_series(&[point(1, 10), point(20, 99)], day(6), 3);
        assert_eq!(balances(&series), vec![10, 10, 10]);

        // Only a later snapshot: back-filled
        let series = fill_balance_series(&[point(20, 99)], day(6), 2);
        assert_eq!(balances(&series), vec![99, 99]);
    }

    #[test]
    fn test_unsorted_input() {
        let series = fill_balance_series(&[point(4, 4), point(2, 2)], day(5), 4);
        assert_eq!(balances(&series), vec![2, 2, 4, 4]);
    }

    #[test]
    fn test_align_series_uses_union_of_dates() {
        let mut histories = BTreeMap::new();
        histories.insert(1, vec![point(1, 10), point(3, 30)]);
        histories.insert(2, vec![point(2, 200)]);

        let aligned = align_series(&histories);
        assert_eq!(aligned.len(), 2);

        let dates: Vec<NaiveDate> = aligned[&1].iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);
        assert_eq!(balances(&aligned[&1]), vec![10, 10, 30]);
        assert_eq!(balances(&aligned[&2]), vec![200, 200, 200]);
    }

    #[test]
    fn test_align_series_keeps_empty_accounts() {
        let mut histories = BTreeMap::new();
        histories.insert(1, vec![point(1, 10)]);
        histories.insert(2, Vec::new());

        let aligned = align_series(&histories);
        assert_eq!(balances(&aligned[&2]), vec![0]);
    }
}
