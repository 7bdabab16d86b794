//! Candidate selection for each triage flow.

use chrono::{DateTime, Local};

use crate::crud::{Item, Priority};

use super::session::TriageKind;

/// Pick the items a session of `kind` should walk through, in queue order
pub fn candidates(kind: TriageKind, items: Vec<Item>, now: &DateTime<Local>) -> Vec<Item> {
    let mut picked: Vec<Item> = items
        .into_iter()
        .filter(|item| item.kind == kind.entity() && !item.status.is_done())
        .filter(|item| match kind {
            TriageKind::Focus => {
                item.priority == Priority::High
                    || item.due.is_some_and(|due| due.date_naive() <= now.date_naive())
            }
            TriageKind::OverdueSweep => item.due.is_some_and(|due| due < *now),
            TriageKind::ActionReview => true,
        })
        .collect();

    match kind {
        // Most urgent first: priority, then earliest due date
        TriageKind::Focus => picked.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| due_key(a).cmp(&due_key(b)))
        }),
        TriageKind::OverdueSweep => picked.sort_by_key(due_key),
        TriageKind::ActionReview => {}
    }
    picked
}

fn due_key(item: &Item) -> (bool, Option<DateTime<Local>>) {
    (item.due.is_none(), item.due)
}
