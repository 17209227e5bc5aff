//! Streak, eligibility, and break detection over a user's record log.
//!
//! All functions here are pure: they take the record log and the reference
//! "today" as inputs, so callers decide which clock supplies the date.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::store::Record;

/// Display status of a user's streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakStatus {
    /// No records at all
    NotStarted,
    /// Latest record is dated today or yesterday
    Active,
    /// Latest record is older than yesterday
    Broken,
}

/// Whether a new submission is allowed right now.
///
/// One submission per calendar day: allowed unless the most recent record is
/// already dated today. An empty log allows submission (see DESIGN.md for the
/// reasoning).
pub fn is_submission_allowed(records: &[Record], today: NaiveDate) -> bool {
    match latest_date(records) {
        Some(date) => date != today,
        None => true,
    }
}

/// Count of consecutive calendar days with a submission, walking backward
/// from the newest record.
///
/// The newest record must be dated today or yesterday for the streak to be
/// alive at all; a day not yet submitted does not break a streak that ran
/// through yesterday. The walk stops at the first gap.
pub fn current_streak(records: &[Record], today: NaiveDate) -> u32 {
    let mut sorted: Vec<&Record> = records.iter().collect();
    sorted.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

    let Some(newest) = sorted.first() else {
        return 0;
    };
    let anchor = newest.submitted_at.date();
    let yesterday = today.checked_sub_days(Days::new(1));
    if anchor != today && Some(anchor) != yesterday {
        return 0;
    }

    let mut streak: u32 = 1;
    for record in &sorted[1..] {
        let expected = anchor.checked_sub_days(Days::new(u64::from(streak)));
        if Some(record.submitted_at.date()) == expected {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Display-only break detection.
pub fn streak_status(records: &[Record], today: NaiveDate) -> StreakStatus {
    let yesterday = today.checked_sub_days(Days::new(1));
    match latest_date(records) {
        None => StreakStatus::NotStarted,
        Some(date) if date == today || Some(date) == yesterday => StreakStatus::Active,
        Some(_) => StreakStatus::Broken,
    }
}

/// Calendar date of the most recent record, by submission timestamp.
fn latest_date(records: &[Record]) -> Option<NaiveDate> {
    records
        .iter()
        .max_by_key(|r| r.submitted_at)
        .map(|r| r.submitted_at.date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn on(days_ago: u64) -> NaiveDateTime {
        today()
            .checked_sub_days(Days::new(days_ago))
            .unwrap()
            .and_hms_opt(21, 30, 0)
            .unwrap()
    }

    fn log(days_ago: &[u64]) -> Vec<Record> {
        days_ago
            .iter()
            .map(|&d| Record::new(format!("day -{}", d), on(d)))
            .collect()
    }

    #[test]
    fn submission_blocked_when_already_submitted_today() {
        assert!(!is_submission_allowed(&log(&[0, 1]), today()));
    }

    #[test]
    fn submission_allowed_when_latest_is_yesterday() {
        assert!(is_submission_allowed(&log(&[1, 2]), today()));
    }

    #[test]
    fn stale_log_allows_submission_and_flags_broken() {
        let records = log(&[3, 4]);
        assert!(is_submission_allowed(&records, today()));
        assert_eq!(streak_status(&records, today()), StreakStatus::Broken);
    }

    #[test]
    fn empty_log_allows_submission_and_is_not_started() {
        assert!(is_submission_allowed(&[], today()));
        assert_eq!(streak_status(&[], today()), StreakStatus::NotStarted);
        assert_eq!(current_streak(&[], today()), 0);
    }

    #[test]
    fn streak_is_zero_when_latest_is_before_yesterday() {
        assert_eq!(current_streak(&log(&[2, 3, 4]), today()), 0);
    }

    #[test]
    fn streak_stops_at_first_gap() {
        // today, yesterday, day-2, then a hole before day-4
        assert_eq!(current_streak(&log(&[0, 1, 2, 4]), today()), 3);
    }

    #[test]
    fn streak_anchored_on_yesterday_still_counts() {
        // Today not yet submitted; the run through yesterday is still active.
        assert_eq!(current_streak(&log(&[1, 2, 3]), today()), 3);
        assert_eq!(streak_status(&log(&[1, 2, 3]), today()), StreakStatus::Active);
    }

    #[test]
    fn single_record_today_is_a_streak_of_one() {
        assert_eq!(current_streak(&log(&[0]), today()), 1);
    }

    #[test]
    fn unsorted_input_is_handled() {
        assert_eq!(current_streak(&log(&[2, 0, 1]), today()), 3);
    }
}
