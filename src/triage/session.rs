//! One-item-at-a-time triage session.
//!
//! The session is a pure state machine. Mutating actions are split into a
//! `begin_*` call, which takes the single-flight lock and hands out a
//! [`TriageTicket`], and [`TriageSession::finish`], which applies the
//! collaborator's answer. Nothing leaves the queue before the collaborator has
//! confirmed it.

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::crud::{CrudError, EntityKind, Item, ItemId};

use super::snooze::SnoozeOption;
use super::TriageError;

/// Which flow opened the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageKind {
    /// Today's tasks and anything high priority
    Focus,
    /// Reminders whose due date has passed
    OverdueSweep,
    /// Everything still open in the action queue
    ActionReview,
}

impl TriageKind {
    pub fn title(&self) -> &'static str {
        match self {
            TriageKind::Focus => "Focus Mode",
            TriageKind::OverdueSweep => "Overdue Reminders",
            TriageKind::ActionReview => "Action Queue Review",
        }
    }

    /// Entity kind the session draws its candidates from
    pub fn entity(&self) -> EntityKind {
        match self {
            TriageKind::Focus => EntityKind::Task,
            TriageKind::OverdueSweep => EntityKind::Reminder,
            TriageKind::ActionReview => EntityKind::Action,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Pending,
    Completed,
    Skipped,
    Snoozed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriageItem {
    pub id: ItemId,
    pub payload: Item,
    pub disposition: Disposition,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriageCounts {
    pub completed: usize,
    pub snoozed: usize,
    pub skipped: usize,
}

/// Mutation requested from the collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriageAction {
    Complete,
    Snooze(DateTime<Local>),
}

/// Proof that the lock is held for one outstanding action
#[derive(Debug, Clone, PartialEq)]
pub struct TriageTicket {
    pub id: ItemId,
    pub kind: EntityKind,
    pub action: TriageAction,
}

/// What [`TriageSession::finish`] did
#[derive(Debug, Clone, PartialEq)]
pub enum TriageOutcome {
    /// Item resolved; more remain
    Advanced,
    /// Item resolved and the session is done
    Finished,
    /// Item was deleted elsewhere and was dropped without counting
    Vanished,
    /// Collaborator failed; queue unchanged, retry possible
    Failed(CrudError),
}

#[derive(Debug, Clone)]
pub struct TriageSession {
    kind: TriageKind,
    queue: Vec<TriageItem>,
    cursor: usize,
    counts: TriageCounts,
    in_flight: bool,
    terminal: bool,
    initial_len: usize,
    /// Skipped items that were still queued when the session went terminal
    skipped_ids: Vec<ItemId>,
}

impl TriageSession {
    /// Snapshot `items` into a new session. Duplicate ids keep their first
    /// occurrence.
    pub fn open(kind: TriageKind, items: Vec<Item>) -> Self {
        let mut queue: Vec<TriageItem> = Vec::with_capacity(items.len());
        for item in items {
            if queue.iter().any(|q| q.id == item.id) {
                continue;
            }
            queue.push(TriageItem {
                id: item.id,
                payload: item,
                disposition: Disposition::Pending,
            });
        }

        let initial_len = queue.len();
        let terminal = queue.is_empty();
        info!(kind = ?kind, items = initial_len, "triage session opened");
        Self {
            kind,
            queue,
            cursor: 0,
            counts: TriageCounts::default(),
            in_flight: false,
            terminal,
            initial_len,
            skipped_ids: Vec::new(),
        }
    }

    pub fn kind(&self) -> TriageKind {
        self.kind
    }

    pub fn counts(&self) -> TriageCounts {
        self.counts
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn initial_len(&self) -> usize {
        self.initial_len
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn queue_ids(&self) -> Vec<ItemId> {
        self.queue.iter().map(|item| item.id).collect()
    }

    pub fn skipped_ids(&self) -> &[ItemId] {
        &self.skipped_ids
    }

    pub fn current(&self) -> Option<&TriageItem> {
        if self.terminal {
            return None;
        }
        self.queue.get(self.cursor)
    }

    pub fn begin_complete(&mut self) -> Result<TriageTicket, TriageError> {
        self.begin(TriageAction::Complete)
    }

    /// Resolve `option` against `now` and take the lock for a reschedule
    pub fn begin_snooze(
        &mut self,
        option: SnoozeOption,
        now: &DateTime<Local>,
    ) -> Result<TriageTicket, TriageError> {
        self.check_ready()?;
        let due = option.resolve_at(now)?;
        self.begin(TriageAction::Snooze(due))
    }

    fn check_ready(&self) -> Result<(), TriageError> {
        if self.terminal {
            return Err(TriageError::Terminal);
        }
        if self.in_flight {
            return Err(TriageError::Busy);
        }
        if self.queue.is_empty() {
            return Err(TriageError::Empty);
        }
        Ok(())
    }

    fn begin(&mut self, action: TriageAction) -> Result<TriageTicket, TriageError> {
        self.check_ready()?;
        let item = self.queue.get(self.cursor).ok_or(TriageError::Empty)?;
        let ticket = TriageTicket {
            id: item.id,
            kind: item.payload.kind,
            action,
        };
        self.in_flight = true;
        debug!(id = ticket.id, action = ?ticket.action, "triage action started");
        Ok(ticket)
    }

    /// Apply the collaborator's answer for `ticket` and release the lock
    pub fn finish(&mut self, ticket: &TriageTicket, result: Result<(), CrudError>) -> TriageOutcome {
        self.in_flight = false;

        let Some(index) = self.queue.iter().position(|item| item.id == ticket.id) else {
            return TriageOutcome::Vanished;
        };

        match result {
            Ok(()) => {
                let removed = self.remove_at(index);
                if removed.disposition == Disposition::Skipped {
                    self.counts.skipped = self.counts.skipped.saturating_sub(1);
                }
                match ticket.action {
                    TriageAction::Complete => self.counts.completed += 1,
                    TriageAction::Snooze(_) => self.counts.snoozed += 1,
                }
            }
            Err(CrudError::NotFound { .. }) => {
                let removed = self.remove_at(index);
                if removed.disposition == Disposition::Skipped {
                    self.counts.skipped = self.counts.skipped.saturating_sub(1);
                }
                self.update_terminal();
                return TriageOutcome::Vanished;
            }
            Err(err) => {
                debug!(id = ticket.id, error = %err, "triage action failed");
                return TriageOutcome::Failed(err);
            }
        }

        self.update_terminal();
        if self.terminal {
            TriageOutcome::Finished
        } else {
            TriageOutcome::Advanced
        }
    }

    /// Leave the current item in the queue and move on. No collaborator call.
    pub fn skip(&mut self) -> Result<(), TriageError> {
        self.check_ready()?;
        let item = &mut self.queue[self.cursor];
        if item.disposition != Disposition::Skipped {
            item.disposition = Disposition::Skipped;
            self.counts.skipped += 1;
        }
        self.cursor = (self.cursor + 1) % self.queue.len();
        self.update_terminal();
        Ok(())
    }

    fn remove_at(&mut self, index: usize) -> TriageItem {
        let removed = self.queue.remove(index);
        if index < self.cursor {
            self.cursor -= 1;
        }
        if self.cursor >= self.queue.len() {
            self.cursor = 0;
        }
        removed
    }

    fn update_terminal(&mut self) {
        if self.terminal {
            return;
        }
        let all_skipped = self
            .queue
            .iter()
            .all(|item| item.disposition == Disposition::Skipped);
        if self.queue.is_empty() || all_skipped {
            self.terminal = true;
            self.cursor = 0;
            self.skipped_ids = self.queue.drain(..).map(|item| item.id).collect();
            info!(
                completed = self.counts.completed,
                snoozed = self.counts.snoozed,
                skipped = self.counts.skipped,
                "triage session finished"
            );
        }
    }
}
