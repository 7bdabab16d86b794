//! Page navigation, palette and triage entry points on App.

use std::time::Instant;

use tracing::info;

use super::*;
use crate::crud::{Item, Job};
use crate::search::{Command, Palette, PaletteEntry, SearchEngine};
use crate::triage::TriageKind;
use crate::ui::toast::ToastType;

impl App {
    /// Switch to `destination` and show the short "→ Page" confirmation
    pub fn navigate(&mut self, destination: Destination, now: Instant) {
        self.chord.cancel();
        self.cancel_inline_edit();
        self.presentation.hide_help();

        if self.view.destination != destination || self.view.project.is_some() {
            info!(?destination, "navigate");
            self.view = View::new(destination);
            self.reload_list();
        }

        self.toast_manager.push_for(
            format!("→ {}", destination.label()),
            ToastType::Info,
            self.presentation.timings().chord_confirm,
            now,
        );
    }

    /// Show the tasks of `project` on the Projects page
    pub fn open_project(&mut self, project: Item) {
        self.cancel_inline_edit();
        info!(project = project.id, "open project tasks");
        self.view = View {
            destination: Destination::Projects,
            project: Some(project),
        };
        self.reload_list();
    }

    /// Leave a project's task list; returns false if none was open
    pub fn close_project(&mut self) -> bool {
        if self.view.project.take().is_none() {
            return false;
        }
        self.reload_list();
        true
    }

    /// Fetch the rows of the current page. A different list starts over;
    /// the same list keeps focus and selection until the rows arrive.
    pub fn reload_list(&mut self) {
        let Some(identity) = self.view.list_identity() else {
            self.list = ItemListController::new();
            return;
        };
        if self.list.identity() != Some(&identity) {
            self.list.reset(identity.clone());
        }
        self.jobs.submit(
            JobTag::LoadList(identity.clone()),
            Job::List {
                kind: identity.kind,
                filter: identity.filter,
            },
        );
    }

    /// Open the command palette over the current page
    pub fn open_palette(&mut self) {
        self.cancel_inline_edit();
        let engine = SearchEngine::new(
            self.registry.clone(),
            self.palette_statics(),
            self.config.search.debounce(),
        );
        let id = self.next_palette_id;
        self.next_palette_id += 1;
        self.open_modal(ModalState::Palette(Box::new(Palette::new(id, engine))));
    }

    /// Pages (with their chord) followed by commands
    fn palette_statics(&self) -> Vec<PaletteEntry> {
        let config = self.chord.config();
        let pages = Destination::ALL.into_iter().map(|destination| {
            let chord = config
                .key_for(destination)
                .map(|key| format!("{} {}", config.leader, key));
            PaletteEntry::page(destination, chord)
        });
        pages
            .chain(Command::ALL.into_iter().map(PaletteEntry::command))
            .collect()
    }

    /// Load candidates for a triage flow; the modal opens when they arrive
    pub fn start_triage(&mut self, kind: TriageKind) {
        self.cancel_inline_edit();
        info!(?kind, "loading triage candidates");
        self.jobs.submit(
            JobTag::LoadTriage(kind),
            Job::List {
                kind: kind.entity(),
                filter: Default::default(),
            },
        );
    }

    /// Show the shortcut overlay
    pub fn show_help(&mut self, now: Instant) {
        self.presentation.show_help(now);
    }

    pub fn toast_info(&mut self, message: impl Into<String>) {
        self.toast_manager.push(message, ToastType::Info);
    }

    pub fn toast_success(&mut self, message: impl Into<String>) {
        self.toast_manager.push(message, ToastType::Success);
    }

    pub fn toast_warning(&mut self, message: impl Into<String>) {
        self.toast_manager.push(message, ToastType::Warning);
    }

    pub fn toast_error(&mut self, message: impl Into<String>) {
        self.toast_manager.push(message, ToastType::Error);
    }
}
