//! Snooze presets resolved against the wall clock at call time.

use chrono::{DateTime, Datelike, Days, Local, NaiveTime};
use serde::{Deserialize, Serialize};

use super::TriageError;

/// Hour of day every preset lands on
const SNOOZE_HOUR: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnoozeOption {
    #[default]
    Tomorrow,
    NextMonday,
    NextWeek,
}

impl SnoozeOption {
    pub const ALL: [SnoozeOption; 3] = [
        SnoozeOption::Tomorrow,
        SnoozeOption::NextMonday,
        SnoozeOption::NextWeek,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SnoozeOption::Tomorrow => "tomorrow",
            SnoozeOption::NextMonday => "next Monday",
            SnoozeOption::NextWeek => "next week",
        }
    }

    /// Key that picks this option in the triage view
    pub fn key(&self) -> char {
        match self {
            SnoozeOption::Tomorrow => 't',
            SnoozeOption::NextMonday => 'm',
            SnoozeOption::NextWeek => 'w',
        }
    }

    pub fn from_key(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.key() == c)
    }

    /// Days from `now`'s date to the target date
    fn days_ahead(&self, now: &DateTime<Local>) -> u64 {
        match self {
            SnoozeOption::Tomorrow => 1,
            // Always strictly in the future: Monday maps to the following Monday
            SnoozeOption::NextMonday => 7 - u64::from(now.weekday().num_days_from_monday()),
            SnoozeOption::NextWeek => 7,
        }
    }

    /// Absolute 09:00 local time for this option
    pub fn resolve_at(&self, now: &DateTime<Local>) -> Result<DateTime<Local>, TriageError> {
        let time = NaiveTime::from_hms_opt(SNOOZE_HOUR, 0, 0).ok_or(TriageError::InvalidSnoozeTime)?;
        now.date_naive()
            .checked_add_days(Days::new(self.days_ahead(now)))
            .and_then(|date| date.and_time(time).and_local_timezone(Local).earliest())
            .ok_or(TriageError::InvalidSnoozeTime)
    }

    /// Resolve against the current wall clock
    pub fn resolve_now(&self) -> Result<DateTime<Local>, TriageError> {
        self.resolve_at(&Local::now())
    }
}
