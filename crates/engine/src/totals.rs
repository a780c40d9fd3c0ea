//! Entry totals and aggregation.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use chrono::{DateTime, Datelike, NaiveTime, Utc};
use serde::Serialize;

use crate::{entry::AccountingEntry, money::Pesos, sale::DailySale};

/// Fixed daily stipend deducted from an entry's total when paid.
pub const DAILY_STIPEND: Pesos = Pesos::new(60_000);

/// Net total of a single entry. Negative totals are valid (a loss).
#[must_use]
pub fn compute_total(sales: Pesos, expenses: Pesos, stipend_paid: bool) -> Pesos {
    let stipend = if stipend_paid { DAILY_STIPEND } else { Pesos::ZERO };
    sales - expenses - stipend
}

/// Aggregate figures over a slice of entries.
///
/// Additive: summaries of disjoint partitions combine with `+` into the
/// summary of the union, so callers can aggregate per-day or per-month
/// buckets and fold them together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub count: u64,
    pub total_sales: Pesos,
    pub total_expenses: Pesos,
    pub net_balance: Pesos,
}

impl Summary {
    fn of(entry: &AccountingEntry) -> Self {
        let stipend = if entry.daily_stipend_paid {
            DAILY_STIPEND
        } else {
            Pesos::ZERO
        };
        Self {
            count: 1,
            total_sales: entry.sales_value,
            total_expenses: entry.operating_expenses + stipend,
            net_balance: compute_total(
                entry.sales_value,
                entry.operating_expenses,
                entry.daily_stipend_paid,
            ),
        }
    }
}

impl Add for Summary {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            count: self.count + rhs.count,
            total_sales: self.total_sales + rhs.total_sales,
            total_expenses: self.total_expenses + rhs.total_expenses,
            net_balance: self.net_balance + rhs.net_balance,
        }
    }
}

impl AddAssign for Summary {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Summary {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Pure aggregation; the caller decides which entries to feed in
/// (status filtering and date slicing happen upstream).
pub fn aggregate<'a, I>(entries: I) -> Summary
where
    I: IntoIterator<Item = &'a AccountingEntry>,
{
    entries.into_iter().map(Summary::of).sum()
}

/// Figures shown on the landing dashboard.
#[derive(Clone, Debug)]
pub struct Dashboard {
    /// All accounting entries ever recorded.
    pub entry_count: u64,
    /// Sum of point-of-sale product values, current calendar month to date.
    pub monthly_sales_income: Pesos,
    /// Entries plus point-of-sale lines recorded today.
    pub today_transaction_count: u64,
    /// One report per ten entries, rounded up.
    pub report_count: u64,
    pub recent_entries: Vec<AccountingEntry>,
    pub recent_sales: Vec<DailySale>,
}

#[must_use]
pub fn report_count(entry_count: u64) -> u64 {
    entry_count.div_ceil(10)
}

/// Start of the calendar month containing `now`, in UTC.
#[must_use]
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let date = now.date_naive();
    let first = date.with_day(1).unwrap_or(date);
    first.and_time(NaiveTime::MIN).and_utc()
}

/// Start of the UTC day containing `now`.
#[must_use]
pub fn day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(sales: i64, expenses: i64, stipend: bool) -> AccountingEntry {
        AccountingEntry {
            sales_value: Pesos::new(sales),
            operating_expenses: Pesos::new(expenses),
            daily_stipend_paid: stipend,
            total: compute_total(Pesos::new(sales), Pesos::new(expenses), stipend),
            ..AccountingEntry::default()
        }
    }

    #[test]
    fn stipend_shifts_total_by_sixty_thousand() {
        let sales = Pesos::new(200_000);
        let expenses = Pesos::new(30_000);
        assert_eq!(compute_total(sales, expenses, true), Pesos::new(110_000));
        assert_eq!(
            compute_total(sales, expenses, true),
            compute_total(sales, expenses, false) - DAILY_STIPEND
        );
    }

    #[test]
    fn negative_totals_are_representable() {
        let total = compute_total(Pesos::new(10_000), Pesos::new(80_000), true);
        assert_eq!(total, Pesos::new(-130_000));
    }

    #[test]
    fn aggregate_of_nothing_is_zeroed() {
        assert_eq!(aggregate([]), Summary::default());
    }

    #[test]
    fn aggregate_counts_stipend_as_an_expense() {
        let entries = [
            entry(100_000, 20_000, true),
            entry(250_000, 0, false),
            entry(300_000, 100_000, false),
        ];
        let summary = aggregate(&entries);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.total_sales, Pesos::new(650_000));
        assert_eq!(summary.total_expenses, Pesos::new(180_000));
        assert_eq!(summary.net_balance, Pesos::new(470_000));
    }

    #[test]
    fn partitioned_aggregates_add_up() {
        let entries = [
            entry(100_000, 20_000, true),
            entry(250_000, 0, false),
            entry(300_000, 100_000, false),
        ];
        let whole = aggregate(&entries);
        let split = aggregate(&entries[..1]) + aggregate(&entries[1..]);
        assert_eq!(whole, split);
    }

    #[test]
    fn report_count_rounds_up() {
        assert_eq!(report_count(0), 0);
        assert_eq!(report_count(1), 1);
        assert_eq!(report_count(10), 1);
        assert_eq!(report_count(11), 2);
    }

    #[test]
    fn month_start_is_the_first_at_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 3, 17, 15, 42, 9).unwrap();
        let start = month_start(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(day_start(now), Utc.with_ymd_and_hms(2026, 3, 17, 0, 0, 0).unwrap());
    }
}
