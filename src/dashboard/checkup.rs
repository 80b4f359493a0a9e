use time::{Date, Duration};

use crate::dashboard::dto::CheckupStatus;

/// Next-checkup rule: a checkup is expected `interval_days` after the last
/// one; a date already passed reads as overdue. With no checkup on record
/// the countdown falls back to the due date, and with neither there is
/// nothing to schedule.
pub fn next_checkup(
    last_checkup: Option<Date>,
    due_date: Option<Date>,
    today: Date,
    interval_days: i64,
) -> CheckupStatus {
    if let Some(last) = last_checkup {
        let next = last + Duration::days(interval_days);
        if today > next {
            return CheckupStatus::Overdue { date: next };
        }
        return CheckupStatus::Upcoming {
            date: next,
            days_left: (next - today).whole_days(),
        };
    }
    if let Some(due) = due_date {
        return CheckupStatus::DueDateCountdown {
            due_date: due,
            days_left: (due - today).whole_days(),
        };
    }
    CheckupStatus::NotScheduled
}
