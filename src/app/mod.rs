//! Application state for dashkeys.
//!
//! `App` owns the dispatcher, the chord navigator, the open modal and the
//! current list page, and is the only place where background job results are
//! folded back into UI state.

mod actions;
mod jobs;
mod navigation;
mod state;

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::crud::{Crud, JobRunner};
use crate::input::{ChordConfig, ChordNavigator, InputDispatcher, KeyTarget};
use crate::list::ItemListController;
use crate::notes::{NoteStore, SCRATCH_KEY};
use crate::search::QuickCreateRegistry;
use crate::ui::presentation::{Presentation, PresentationEvent, PresentationTimings};
use crate::ui::toast::ToastManager;

pub use state::{
    destination_for, list_kind, EditTarget, InlineEdit, JobTag, ModalState, TriageView, View,
};

use crate::input::Destination;

/// Application state
pub struct App {
    pub config: Config,
    /// Decides which consumer sees each keystroke
    pub dispatcher: InputDispatcher,
    pub chord: ChordNavigator,
    /// Page being shown
    pub view: View,
    /// Focus/selection over the current list page
    pub list: ItemListController,
    pub modal_state: ModalState,
    /// Inline title or note editor, when open
    pub inline_edit: Option<InlineEdit>,
    pub toast_manager: ToastManager,
    pub presentation: Presentation,
    pub notes: NoteStore,
    /// Cached scratch note shown on the Notes page
    pub scratch_note: String,
    /// Should quit
    pub should_quit: bool,
    jobs: JobRunner<JobTag>,
    registry: QuickCreateRegistry,
    /// Id given to the next triage session
    next_triage_id: u64,
    /// Id given to the next command palette
    next_palette_id: u64,
    /// Item to focus once the list it lives in has loaded
    pending_focus: Option<crate::crud::ItemId>,
}

impl App {
    pub fn new(config: Config, crud: Arc<dyn Crud>, notes: NoteStore) -> Self {
        let chord_config = ChordConfig::new(config.keyboard.leader, config.keyboard.chord_timeout());
        let mut dispatcher = InputDispatcher::new(config.keyboard.leader);
        dispatcher.attach();

        let scratch_note = notes.get(SCRATCH_KEY).unwrap_or_default();
        let presentation = Presentation::new(PresentationTimings::from_config(&config));
        let registry = QuickCreateRegistry::new(config.search.sentinel);

        let mut app = Self {
            config,
            dispatcher,
            chord: ChordNavigator::new(chord_config),
            view: View::new(Destination::Dashboard),
            list: ItemListController::new(),
            modal_state: ModalState::None,
            inline_edit: None,
            toast_manager: ToastManager::new(),
            presentation,
            notes,
            scratch_note,
            should_quit: false,
            jobs: JobRunner::new(crud),
            registry,
            next_triage_id: 1,
            next_palette_id: 1,
            pending_focus: None,
        };
        app.reload_list();
        app
    }

    /// What kind of control currently has input focus
    pub fn key_target(&self) -> KeyTarget {
        if matches!(self.modal_state, ModalState::Palette(_)) || self.inline_edit.is_some() {
            KeyTarget::TextField
        } else {
            KeyTarget::Surface
        }
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_state.is_open()
    }

    /// Advance every deadline-driven piece of state to `now`
    pub fn tick(&mut self, now: Instant) {
        if self.chord.tick(now) {
            tracing::debug!("chord timed out");
        }

        self.dispatch_due_search(now);
        self.drain_jobs(now);

        for event in self.presentation.poll(now) {
            match event {
                PresentationEvent::RestorePalette => {
                    if let Some(palette) = self.modal_state.palette_mut() {
                        palette.restore_after_error();
                    }
                }
                PresentationEvent::ClosePalette => {
                    if matches!(self.modal_state, ModalState::Palette(_)) {
                        self.close_modal();
                    }
                }
            }
        }

        self.toast_manager.update(now);
    }

    /// Close whatever modal is open and give the keyboard back to the page
    pub fn close_modal(&mut self) {
        match std::mem::replace(&mut self.modal_state, ModalState::None) {
            ModalState::None => return,
            ModalState::Palette(_) => self.presentation.clear_palette(),
            ModalState::Triage(view) => {
                self.presentation.clear_transition();
                tracing::info!(
                    kind = ?view.session.kind(),
                    terminal = view.session.is_terminal(),
                    "triage session closed"
                );
            }
        }
        self.dispatcher.pop_modal();
    }

    fn open_modal(&mut self, modal: ModalState) {
        if self.is_modal_open() {
            self.close_modal();
        }
        self.chord.cancel();
        self.modal_state = modal;
        self.dispatcher.push_modal();
    }
}

#[cfg(test)]
mod tests;
