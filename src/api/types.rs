//! API request and response types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::store::Record;
use crate::streak::{self, StreakStatus};

/// Request to submit today's task.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitTaskRequest {
    /// Participant name (must be one of the configured users)
    pub user: String,

    /// Free-form description of today's work
    pub task: String,
}

/// Request to replace the task text of the most recent record.
#[derive(Debug, Clone, Deserialize)]
pub struct EditLatestRequest {
    pub task: String,
}

/// One record as rendered in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    pub task: String,

    /// Submission instant, `Submission Time` column format
    pub submitted_at: String,
}

impl RecordView {
    pub fn from_record(record: &Record) -> Self {
        Self {
            task: record.task.clone(),
            submitted_at: record.formatted_time(),
        }
    }
}

/// Response after a successful submission or edit.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitTaskResponse {
    pub user: String,
    pub record: RecordView,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Configured participants.
#[derive(Debug, Clone, Serialize)]
pub struct UsersResponse {
    pub users: Vec<String>,
}

/// Full record table for one user.
#[derive(Debug, Clone, Serialize)]
pub struct LogResponse {
    pub user: String,
    pub records: Vec<RecordView>,
}

/// Per-user dashboard summary.
#[derive(Debug, Clone, Serialize)]
pub struct UserOverview {
    pub user: String,

    /// Break-detection flag for display
    pub status: StreakStatus,

    /// Current consecutive-day streak (resets to 0 on a skipped day)
    pub streak: u32,

    /// Total submissions ever recorded
    pub record_count: usize,

    /// Fraction of the challenge length completed, 0.0 to 1.0.
    /// Counts total submissions toward the goal, not the current streak.
    pub progress: f64,

    /// Whether the user has reached the challenge length
    pub completed: bool,

    /// Whether a submission would be accepted right now
    pub submission_allowed: bool,

    /// Most recent record, if any
    pub latest: Option<RecordView>,
}

impl UserOverview {
    /// Derive the summary for one user from their record log.
    pub fn build(user: &str, records: &[Record], today: NaiveDate, challenge_days: u32) -> Self {
        let latest = records
            .iter()
            .max_by_key(|r| r.submitted_at)
            .map(RecordView::from_record);
        let record_count = records.len();
        let progress = if challenge_days == 0 {
            1.0
        } else {
            (record_count as f64 / f64::from(challenge_days)).min(1.0)
        };

        Self {
            user: user.to_string(),
            status: streak::streak_status(records, today),
            streak: streak::current_streak(records, today),
            record_count,
            progress,
            completed: record_count as u64 >= u64::from(challenge_days),
            submission_allowed: streak::is_submission_allowed(records, today),
            latest,
        }
    }
}

/// Dashboard summary for all users.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewResponse {
    pub challenge_days: u32,
    pub users: Vec<UserOverview>,
}

/// Error payload for non-2xx responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn log(days_ago: &[u64]) -> Vec<Record> {
        days_ago
            .iter()
            .map(|&d| {
                let date = today().checked_sub_days(Days::new(d)).unwrap();
                Record::new("work", date.and_hms_opt(20, 0, 0).unwrap())
            })
            .collect()
    }

    #[test]
    fn overview_for_active_user() {
        let overview = UserOverview::build("Deep", &log(&[0, 1, 2]), today(), 75);
        assert_eq!(overview.status, StreakStatus::Active);
        assert_eq!(overview.streak, 3);
        assert_eq!(overview.record_count, 3);
        assert!(!overview.submission_allowed);
        assert!(!overview.completed);
        assert!((overview.progress - 3.0 / 75.0).abs() < 1e-9);
    }

    #[test]
    fn overview_for_broken_streak() {
        let overview = UserOverview::build("Prayas", &log(&[3, 4]), today(), 75);
        assert_eq!(overview.status, StreakStatus::Broken);
        assert_eq!(overview.streak, 0);
        assert!(overview.submission_allowed);
    }

    #[test]
    fn overview_for_unstarted_user() {
        let overview = UserOverview::build("Shivanshu", &[], today(), 75);
        assert_eq!(overview.status, StreakStatus::NotStarted);
        assert_eq!(overview.record_count, 0);
        assert!(overview.submission_allowed);
        assert_eq!(overview.progress, 0.0);
        assert!(overview.latest.is_none());
    }

    #[test]
    fn progress_caps_at_one_and_flags_completion() {
        let days: Vec<u64> = (0..80).collect();
        let overview = UserOverview::build("Deep", &log(&days), today(), 75);
        assert_eq!(overview.progress, 1.0);
        assert!(overview.completed);
    }
}
