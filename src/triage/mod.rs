//! Triage queues: Focus Mode, overdue sweeps and action-queue review.
//!
//! A session walks a fixed snapshot of items one at a time; each item ends up
//! completed, snoozed or skipped.

pub mod session;
pub mod snooze;
pub mod sources;

use thiserror::Error;

pub use session::{
    Disposition, TriageAction, TriageCounts, TriageItem, TriageKind, TriageOutcome,
    TriageSession, TriageTicket,
};
pub use snooze::SnoozeOption;
pub use sources::candidates;

/// Why a triage action could not start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TriageError {
    #[error("another action is still in progress")]
    Busy,
    #[error("the session is already finished")]
    Terminal,
    #[error("nothing left to triage")]
    Empty,
    #[error("could not compute the snooze time")]
    InvalidSnoozeTime,
}
