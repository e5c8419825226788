//! crates/study_core/src/streak.rs
//!
//! Day-delta streak rule shared by the reward and progress records.

use chrono::{DateTime, Days, Utc};

/// Computes the streak after a study event at `now`.
///
/// Same calendar day (UTC) as `last` keeps the streak, the following day
/// extends it by one, anything else (including no previous activity) restarts
/// it at 1. Only the single most recent date is consulted.
pub fn advance_streak(current: u32, last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u32 {
    let Some(last) = last else {
        return 1;
    };

    let today = now.date_naive();
    let last_day = last.date_naive();

    if last_day == today {
        current
    } else if today.checked_sub_days(Days::new(1)) == Some(last_day) {
        current + 1
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn first_activity_starts_at_one() {
        assert_eq!(advance_streak(0, None, noon()), 1);
    }

    #[test]
    fn same_day_keeps_streak() {
        let earlier = noon() - Duration::hours(3);
        assert_eq!(advance_streak(4, Some(earlier), noon()), 4);
    }

    #[test]
    fn yesterday_extends_streak() {
        let yesterday = noon() - Duration::days(1);
        assert_eq!(advance_streak(4, Some(yesterday), noon()), 5);
    }

    #[test]
    fn yesterday_is_calendar_based() {
        // 23:59 the day before counts as yesterday even though less than an hour passed.
        let last = Utc.with_ymd_and_hms(2025, 3, 9, 23, 59, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 0, 30, 0).unwrap();
        assert_eq!(advance_streak(2, Some(last), now), 3);
    }

    #[test]
    fn gap_resets_streak() {
        let two_days_ago = noon() - Duration::days(2);
        assert_eq!(advance_streak(9, Some(two_days_ago), noon()), 1);
    }

    #[test]
    fn future_date_resets_streak() {
        let tomorrow = noon() + Duration::days(1);
        assert_eq!(advance_streak(3, Some(tomorrow), noon()), 1);
    }
}
