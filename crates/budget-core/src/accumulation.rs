//! Monthly accumulation rule.
//!
//! Usage counters live inside the UTC calendar month of their last spend.
//! Adding to a counter last touched in the current month sums; adding to one
//! last touched in any other month discards the old figure.

use budget_types::{Amount, MonthBucket};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};

/// New usage after adding `amount` at `now` to a counter that held
/// `previous_used` as of `previous_time`.
pub fn accumulate(
    previous_used: Amount,
    amount: Amount,
    previous_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> LedgerResult<Amount> {
    let current = MonthBucket::of(now);
    if current.contains(previous_time) {
        return previous_used
            .checked_add(amount)
            .ok_or(LedgerError::Overflow("monthly usage"));
    }
    debug!(
        previous_month = %MonthBucket::of(previous_time),
        current_month = %current,
        discarded = previous_used,
        "usage rolled over"
    );
    Ok(amount)
}

/// Usage as it reads at `now` without writing anything: zero when the last
/// spend was in a different month.
pub fn effective_usage(used: Amount, last_spend: DateTime<Utc>, now: DateTime<Utc>) -> Amount {
    if MonthBucket::of(now).contains(last_spend) {
        used
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn same_month_sums() {
        assert_eq!(accumulate(100, 50, at(2026, 3, 1), at(2026, 3, 31)).unwrap(), 150);
    }

    #[test]
    fn next_month_resets() {
        assert_eq!(accumulate(100, 50, at(2026, 3, 31), at(2026, 4, 1)).unwrap(), 50);
    }

    #[test]
    fn same_month_of_other_year_resets() {
        assert_eq!(accumulate(100, 50, at(2025, 3, 10), at(2026, 3, 10)).unwrap(), 50);
    }

    #[test]
    fn month_boundary_is_utc() {
        let last = Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(accumulate(7, 3, last, now).unwrap(), 3);
    }

    #[test]
    fn overflow_only_within_month() {
        let err = accumulate(u64::MAX, 1, at(2026, 3, 1), at(2026, 3, 2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        assert_eq!(accumulate(u64::MAX, 1, at(2026, 2, 1), at(2026, 3, 2)).unwrap(), 1);
    }

    #[test]
    fn never_spent_counter_takes_reset_branch() {
        let epoch = DateTime::<Utc>::default();
        assert_eq!(accumulate(0, 40, epoch, at(2026, 3, 2)).unwrap(), 40);
    }

    #[test]
    fn effective_usage_hides_stale_months() {
        assert_eq!(effective_usage(80, at(2026, 3, 1), at(2026, 3, 9)), 80);
        assert_eq!(effective_usage(80, at(2026, 2, 1), at(2026, 3, 9)), 0);
    }
}
