//! User-facing actions on App (list mutations, palette, triage, inline edits).

use std::time::Instant;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use tracing::{info, warn};

use super::*;
use crate::crud::jobs::BatchOp;
use crate::crud::{EntityKind, Item, ItemId, ItemPatch, ItemStatus, Job, NewItem};
use crate::list::{BatchAction, ListCommand};
use crate::search::{Command, PaletteAction, PaletteKeyResult};
use crate::triage::{SnoozeOption, TriageAction, TriageError, TriageKind, TriageTicket};

impl App {
    // =========================================================================
    // List page
    // =========================================================================

    /// Carry out what a list-page key asked for
    pub fn apply_list_command(&mut self, command: ListCommand, now: Instant) {
        match command {
            ListCommand::None | ListCommand::Cleared => {}
            ListCommand::Complete(item) => {
                let job = Job::Update {
                    kind: item.kind,
                    id: item.id,
                    patch: ItemPatch::status(ItemStatus::Done),
                };
                self.submit_mutation("Completed", &item, job);
            }
            ListCommand::Snooze(item) => {
                let option = self.config.triage.default_snooze;
                match option.resolve_now() {
                    Ok(due) => {
                        let job = Job::Update {
                            kind: item.kind,
                            id: item.id,
                            patch: ItemPatch::due(due),
                        };
                        self.submit_mutation("Snoozed", &item, job);
                    }
                    Err(err) => self.toast_error(format!("Cannot snooze: {err}")),
                }
            }
            ListCommand::Delete(item) => {
                let job = Job::Delete {
                    kind: item.kind,
                    id: item.id,
                };
                self.submit_mutation("Deleted", &item, job);
            }
            ListCommand::Duplicate(item) => {
                let job = Job::Create(NewItem::duplicate_of(&item));
                self.submit_mutation("Duplicated", &item, job);
            }
            ListCommand::SetStatus(item, status) => {
                let job = Job::Update {
                    kind: item.kind,
                    id: item.id,
                    patch: ItemPatch::status(status),
                };
                self.submit_mutation(status_verb(status), &item, job);
            }
            ListCommand::Edit(item) => self.begin_item_edit(&item),
            ListCommand::Open(item) => {
                if item.kind == EntityKind::Project && self.view.project.is_none() {
                    self.open_project(item);
                } else {
                    self.begin_item_edit(&item);
                }
            }
            ListCommand::Batch(action, ids) => self.submit_batch(action, ids),
            ListCommand::ShowHelp => self.show_help(now),
            ListCommand::Denied(reason) => self.toast_warning(reason),
        }
    }

    fn submit_mutation(&mut self, verb: &'static str, item: &Item, job: Job) {
        info!(verb, id = item.id, kind = ?item.kind, "submitting mutation");
        self.jobs.submit(
            JobTag::Mutation {
                verb,
                title: item.title.clone(),
            },
            job,
        );
    }

    fn submit_batch(&mut self, action: BatchAction, ids: Vec<ItemId>) {
        let Some(list) = self.list.identity().cloned() else {
            self.list.finish_batch(&[]);
            return;
        };
        let op = match action {
            BatchAction::Complete => BatchOp::Complete,
            BatchAction::Delete => BatchOp::Delete,
            BatchAction::Snooze => match self.config.triage.default_snooze.resolve_now() {
                Ok(due) => BatchOp::Snooze(due),
                Err(err) => {
                    self.list.finish_batch(&[]);
                    self.toast_error(format!("Cannot snooze: {err}"));
                    return;
                }
            },
        };
        info!(action = action.label(), count = ids.len(), "submitting batch");
        let kind = list.kind;
        self.jobs
            .submit(JobTag::Batch { action, list }, Job::Batch { kind, ids, op });
    }

    // =========================================================================
    // Inline editing
    // =========================================================================

    fn begin_item_edit(&mut self, item: &Item) {
        self.begin_inline_edit(
            EditTarget::Item {
                kind: item.kind,
                id: item.id,
            },
            &item.title,
        );
    }

    /// Open the scratch note editor (Notes page)
    pub fn begin_scratch_edit(&mut self) {
        let text = self.scratch_note.clone();
        self.begin_inline_edit(EditTarget::ScratchNote, &text);
    }

    fn begin_inline_edit(&mut self, target: EditTarget, text: &str) {
        self.chord.cancel();
        self.inline_edit = Some(InlineEdit::new(target, text));
        self.dispatcher.begin_text_edit();
    }

    /// Drop the editor without saving
    pub fn cancel_inline_edit(&mut self) {
        if self.inline_edit.take().is_some() {
            self.dispatcher.end_text_edit();
        }
    }

    /// Save the editor's text to wherever it came from
    pub fn commit_inline_edit(&mut self) {
        let Some(edit) = self.inline_edit.take() else {
            return;
        };
        self.dispatcher.end_text_edit();

        match edit.target {
            EditTarget::Item { kind, id } => {
                let title = edit.buffer.trim().to_string();
                if title.is_empty() {
                    self.toast_warning("Title cannot be empty");
                    return;
                }
                info!(id, ?kind, "renaming item");
                self.jobs.submit(
                    JobTag::Mutation {
                        verb: "Renamed",
                        title: title.clone(),
                    },
                    Job::Update {
                        kind,
                        id,
                        patch: ItemPatch::title(title),
                    },
                );
            }
            EditTarget::ScratchNote => {
                // An emptied note is dropped from the store
                let text = if edit.buffer.trim().is_empty() {
                    String::new()
                } else {
                    edit.buffer
                };
                let saved = if text.is_empty() {
                    self.notes.remove(SCRATCH_KEY)
                } else {
                    self.notes.set(SCRATCH_KEY, &text)
                };
                match saved {
                    Ok(()) => {
                        self.scratch_note = text;
                        self.toast_success("Note saved");
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to save scratch note");
                        self.toast_error(format!("Failed to save note: {}", e));
                    }
                }
            }
        }
    }

    /// Keys typed into the inline editor
    pub fn handle_inline_edit_key(&mut self, key: KeyEvent) {
        let Some(edit) = self.inline_edit.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Enter => self.commit_inline_edit(),
            KeyCode::Backspace => edit.backspace(),
            KeyCode::Left => edit.move_left(),
            KeyCode::Right => edit.move_right(),
            KeyCode::Char(c) => edit.insert(c),
            _ => {}
        }
    }

    // =========================================================================
    // Command palette
    // =========================================================================

    pub fn handle_palette_key(&mut self, key: KeyEvent, now: Instant) {
        let Some(palette) = self.modal_state.palette_mut() else {
            return;
        };
        match palette.handle_key(key, now) {
            PaletteKeyResult::Continue | PaletteKeyResult::QueryChanged => {}
            PaletteKeyResult::Close => self.close_modal(),
            PaletteKeyResult::Activate => {
                let action = palette.activate(now, &Local::now());
                self.run_palette_action(action, now);
            }
        }
    }

    pub fn run_palette_action(&mut self, action: PaletteAction, now: Instant) {
        match action {
            PaletteAction::None | PaletteAction::CompletePrefix(_) => {}
            PaletteAction::Navigate(destination) => {
                self.close_modal();
                self.navigate(destination, now);
            }
            PaletteAction::Run(command) => {
                self.close_modal();
                self.run_command(command, now);
            }
            PaletteAction::OpenItem { kind, id } => {
                self.close_modal();
                self.navigate(destination_for(kind), now);
                if !self.list.focus_id(id) {
                    self.pending_focus = Some(id);
                }
            }
            PaletteAction::QuickCreate(item) => {
                info!(kind = ?item.kind, title = %item.title, "quick create");
                // Ids start at 1, so a create without a palette never matches one
                let palette = self.modal_state.palette_mut().map_or(0, |p| p.id());
                self.jobs
                    .submit(JobTag::QuickCreate { palette }, Job::Create(item));
            }
        }
    }

    pub fn run_command(&mut self, command: Command, now: Instant) {
        match command {
            Command::StartFocus => self.start_triage(TriageKind::Focus),
            Command::SweepOverdue => self.start_triage(TriageKind::OverdueSweep),
            Command::ReviewActions => self.start_triage(TriageKind::ActionReview),
            Command::ShowHelp => self.show_help(now),
            Command::Quit => self.should_quit = true,
        }
    }

    // =========================================================================
    // Triage
    // =========================================================================

    pub fn handle_triage_key(&mut self, key: KeyEvent, now: Instant) {
        if key.code == KeyCode::Esc {
            self.close_modal();
            return;
        }

        let transitioning = self.presentation.is_transitioning(now);
        let Some(view) = self.modal_state.triage_mut() else {
            return;
        };

        if view.session.is_terminal() {
            if key.code == KeyCode::Enter {
                self.close_modal();
            }
            return;
        }
        if transitioning {
            return;
        }

        let started = match key.code {
            KeyCode::Char('c') | KeyCode::Enter => view.session.begin_complete().map(Some),
            KeyCode::Char('s') => view.session.skip().map(|()| None),
            KeyCode::Char(c) => match SnoozeOption::from_key(c) {
                Some(option) => view.session.begin_snooze(option, &Local::now()).map(Some),
                None => return,
            },
            _ => return,
        };
        let session = view.id;
        if started.is_ok() {
            view.error = None;
        }

        match started {
            Ok(Some(ticket)) => self.submit_triage(session, ticket),
            Ok(None) => {}
            Err(TriageError::Busy) => self.toast_warning("Still saving the last change"),
            Err(err) => self.toast_warning(err.to_string()),
        }
    }

    fn submit_triage(&mut self, session: u64, ticket: TriageTicket) {
        let patch = match ticket.action {
            TriageAction::Complete => ItemPatch::status(ItemStatus::Done),
            TriageAction::Snooze(due) => ItemPatch::due(due),
        };
        let job = Job::Update {
            kind: ticket.kind,
            id: ticket.id,
            patch,
        };
        self.jobs.submit(JobTag::Triage { session, ticket }, job);
    }
}

fn status_verb(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Todo => "Reopened",
        ItemStatus::InProgress => "Started",
        ItemStatus::Waiting => "Parked",
        ItemStatus::Done => "Completed",
    }
}
