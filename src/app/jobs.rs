//! Folding background job results back into App state.

use std::time::Instant;

use chrono::Local;
use tracing::{debug, info, warn};

use super::*;
use crate::crud::jobs::JobOutcome;
use crate::crud::{CrudError, Item, Job, JobResult};
use crate::list::{BatchAction, ListIdentity};
use crate::search::Palette;
use crate::triage::{candidates, TriageKind, TriageOutcome, TriageSession, TriageTicket};

impl App {
    /// Send the palette's debounced search once its window has passed
    pub(super) fn dispatch_due_search(&mut self, now: Instant) {
        let Some(palette) = self.modal_state.palette_mut() else {
            return;
        };
        let id = palette.id();
        let engine = palette.engine_mut();
        if let Some(request) = engine.poll_debounce(now) {
            self.jobs.submit(
                JobTag::Search { palette: id },
                Job::Search {
                    query: request.query,
                    generation: request.generation,
                    token: engine.cancel_token(),
                },
            );
        }
    }

    /// Apply every job result that has arrived
    pub(super) fn drain_jobs(&mut self, now: Instant) {
        while let Some(result) = self.jobs.try_recv() {
            self.handle_job_result(result, now);
        }
    }

    /// Apply one job result
    pub fn handle_job_result(&mut self, result: JobResult<JobTag>, now: Instant) {
        let JobResult { tag, outcome } = result;
        match (tag, outcome) {
            (JobTag::LoadList(identity), JobOutcome::Listed(result)) => {
                self.on_list_loaded(identity, result)
            }
            (JobTag::Mutation { verb, title }, outcome) => {
                let result = match outcome {
                    JobOutcome::Created(r) | JobOutcome::Updated(r) => r.map(|_| ()),
                    JobOutcome::Deleted(r) => r,
                    other => {
                        warn!(?other, "unexpected outcome for mutation");
                        return;
                    }
                };
                match result {
                    Ok(()) => self.toast_success(format!("{verb} \"{title}\"")),
                    Err(err) => {
                        warn!(error = %err, %title, "mutation failed");
                        self.toast_error(format!("Could not save \"{title}\": {err}"));
                    }
                }
                self.reload_list();
            }
            (JobTag::Batch { action, list }, JobOutcome::Batch(results)) => {
                self.on_batch_finished(action, list, &results)
            }
            (JobTag::QuickCreate { palette }, JobOutcome::Created(result)) => {
                self.on_quick_create(palette, result, now)
            }
            (JobTag::Search { palette }, JobOutcome::Searched { generation, result }) => {
                let Some(palette) = self.palette_with_id(palette) else {
                    debug!(palette, generation, "search result for a closed palette");
                    return;
                };
                match result {
                    Ok(hits) => {
                        palette.engine_mut().apply_results(generation, hits);
                    }
                    Err(err) => warn!(error = %err, generation, "search failed"),
                }
            }
            (JobTag::Search { .. }, JobOutcome::Abandoned { generation }) => {
                debug!(generation, "search abandoned");
            }
            (JobTag::LoadTriage(kind), JobOutcome::Listed(result)) => {
                self.on_triage_loaded(kind, result)
            }
            (JobTag::Triage { session, ticket }, JobOutcome::Updated(result)) => {
                self.on_triage_finished(session, ticket, result.map(|_| ()), now)
            }
            (tag, outcome) => warn!(?tag, ?outcome, "job outcome does not match its tag"),
        }
    }

    fn on_list_loaded(&mut self, identity: ListIdentity, result: Result<Vec<Item>, CrudError>) {
        if self.view.list_identity().as_ref() != Some(&identity) {
            debug!(?identity, "discarding rows for a list no longer shown");
            return;
        }
        match result {
            Ok(rows) => {
                self.list.set_rows(identity, rows);
                if let Some(id) = self.pending_focus.take() {
                    self.list.focus_id(id);
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to load list");
                self.toast_error(format!("Failed to load {}: {err}", self.view.title()));
            }
        }
    }

    /// The open palette, if it is the one with `id`
    fn palette_with_id(&mut self, id: u64) -> Option<&mut Palette> {
        self.modal_state.palette_mut().filter(|palette| palette.id() == id)
    }

    fn on_batch_finished(
        &mut self,
        action: BatchAction,
        list: ListIdentity,
        results: &[(crate::crud::ItemId, Result<(), CrudError>)],
    ) {
        // Leaving the list already dropped its selection and batch flag
        let still_shown = self.list.identity() == Some(&list);
        let (succeeded, failed) = if still_shown {
            self.list.finish_batch(results)
        } else {
            let succeeded = results.iter().filter(|(_, r)| r.is_ok()).count();
            (succeeded, results.len() - succeeded)
        };
        info!(action = action.label(), succeeded, failed, still_shown, "batch finished");

        if failed == 0 {
            self.toast_success(format!("{} {} item(s)", batch_verb(action), succeeded));
        } else if still_shown {
            self.toast_warning(format!(
                "{} of {} failed to {}; still selected",
                failed,
                succeeded + failed,
                action.label()
            ));
        } else {
            self.toast_warning(format!(
                "{} of {} failed to {}",
                failed,
                succeeded + failed,
                action.label()
            ));
        }
        self.reload_list();
    }

    fn on_quick_create(&mut self, id: u64, result: Result<Item, CrudError>, now: Instant) {
        let Some(palette) = self.palette_with_id(id) else {
            // The palette that asked was closed while the create was in flight
            match result {
                Ok(item) => self.toast_success(format!("Created \"{}\"", item.title)),
                Err(err) => self.toast_error(format!("Create failed: {err}")),
            }
            return;
        };

        match result {
            Ok(item) => {
                info!(id = item.id, kind = ?item.kind, "quick create succeeded");
                palette.create_succeeded(format!(
                    "Created {} \"{}\"",
                    item.kind.display_name().to_lowercase(),
                    item.title
                ));
                self.presentation.schedule_palette_close(now);
                self.reload_list();
            }
            Err(err) => {
                warn!(error = %err, "quick create failed");
                palette.create_failed(format!("Error: {err}"));
                self.presentation.schedule_palette_restore(now);
            }
        }
    }

    fn on_triage_loaded(&mut self, kind: TriageKind, result: Result<Vec<Item>, CrudError>) {
        let items = match result {
            Ok(items) => items,
            Err(err) => {
                warn!(error = %err, ?kind, "failed to load triage candidates");
                self.toast_error(format!("Could not start {}: {err}", kind.title()));
                return;
            }
        };

        let queue = candidates(kind, items, &Local::now());
        let id = self.next_triage_id;
        self.next_triage_id += 1;
        let session = TriageSession::open(kind, queue);
        self.open_modal(ModalState::Triage(Box::new(TriageView {
            id,
            session,
            error: None,
        })));
    }

    fn on_triage_finished(
        &mut self,
        session: u64,
        ticket: TriageTicket,
        result: Result<(), CrudError>,
        now: Instant,
    ) {
        let Some(view) = self.modal_state.triage_mut() else {
            debug!(id = ticket.id, "triage result after session closed");
            self.reload_list();
            return;
        };
        if view.id != session {
            debug!(session, current = view.id, "triage result for an old session");
            return;
        }

        let outcome = view.session.finish(&ticket, result);
        match &outcome {
            TriageOutcome::Advanced | TriageOutcome::Finished => {
                view.error = None;
                self.presentation.start_transition(now);
            }
            TriageOutcome::Vanished => {
                view.error = None;
            }
            TriageOutcome::Failed(err) => {
                view.error = Some(err.to_string());
            }
        }

        match outcome {
            TriageOutcome::Vanished => self.toast_info("Item was removed elsewhere; skipped"),
            TriageOutcome::Failed(err) => {
                warn!(error = %err, id = ticket.id, "triage action failed");
                self.toast_error(format!("Could not save: {err}"));
            }
            TriageOutcome::Advanced | TriageOutcome::Finished => {}
        }
        self.reload_list();
    }
}

fn batch_verb(action: BatchAction) -> &'static str {
    match action {
        BatchAction::Complete => "Completed",
        BatchAction::Delete => "Deleted",
        BatchAction::Snooze => "Snoozed",
    }
}
