//! Independent type definitions used by App.

use crate::crud::{EntityKind, Item, ItemId};
use crate::input::Destination;
use crate::list::{BatchAction, ListIdentity};
use crate::search::Palette;
use crate::triage::{TriageKind, TriageSession, TriageTicket};

/// The page being shown
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub destination: Destination,
    /// Project whose tasks are listed (Projects page drill-down)
    pub project: Option<Item>,
}

impl View {
    pub fn new(destination: Destination) -> Self {
        Self {
            destination,
            project: None,
        }
    }

    /// The list this page shows, if it is a list page
    pub fn list_identity(&self) -> Option<ListIdentity> {
        if let Some(project) = &self.project {
            return Some(ListIdentity::project_tasks(project.id));
        }
        list_kind(self.destination).map(ListIdentity::new)
    }

    pub fn title(&self) -> String {
        match &self.project {
            Some(project) => format!("{} › {}", self.destination.label(), project.title),
            None => self.destination.label().to_string(),
        }
    }
}

/// Entity kind listed on a destination page
pub fn list_kind(destination: Destination) -> Option<EntityKind> {
    match destination {
        Destination::Tasks => Some(EntityKind::Task),
        Destination::Reminders => Some(EntityKind::Reminder),
        Destination::Projects => Some(EntityKind::Project),
        Destination::People => Some(EntityKind::Person),
        Destination::ActionQueue => Some(EntityKind::Action),
        Destination::Notes => Some(EntityKind::Note),
        _ => None,
    }
}

/// Page that lists items of `kind`
pub fn destination_for(kind: EntityKind) -> Destination {
    match kind {
        EntityKind::Task => Destination::Tasks,
        EntityKind::Reminder => Destination::Reminders,
        EntityKind::Project => Destination::Projects,
        EntityKind::Person => Destination::People,
        EntityKind::Note => Destination::Notes,
        EntityKind::Action => Destination::ActionQueue,
    }
}

/// An open triage session and its identity
pub struct TriageView {
    /// Distinguishes sessions so late results for a closed one are ignored
    pub id: u64,
    pub session: TriageSession,
    /// Last failure, shown until the next action
    pub error: Option<String>,
}

/// Modal dialog state
pub enum ModalState {
    /// No modal is open
    None,
    /// Command palette
    Palette(Box<Palette>),
    /// Focus Mode, overdue sweep or action review
    Triage(Box<TriageView>),
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        !matches!(self, ModalState::None)
    }

    pub fn palette_mut(&mut self) -> Option<&mut Palette> {
        match self {
            ModalState::Palette(palette) => Some(palette.as_mut()),
            _ => None,
        }
    }

    pub fn triage_mut(&mut self) -> Option<&mut TriageView> {
        match self {
            ModalState::Triage(view) => Some(view.as_mut()),
            _ => None,
        }
    }
}

/// What an inline editor writes back to
#[derive(Debug, Clone, PartialEq)]
pub enum EditTarget {
    Item { kind: EntityKind, id: ItemId },
    ScratchNote,
}

/// Single-line inline text editor
#[derive(Debug, Clone, PartialEq)]
pub struct InlineEdit {
    pub target: EditTarget,
    pub buffer: String,
    /// Cursor position in characters
    pub cursor: usize,
}

impl InlineEdit {
    pub fn new(target: EditTarget, text: impl Into<String>) -> Self {
        let buffer = text.into();
        let cursor = buffer.chars().count();
        Self {
            target,
            buffer,
            cursor,
        }
    }

    pub fn insert(&mut self, c: char) {
        let idx = self.byte_index();
        self.buffer.insert(idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let idx = self.byte_index();
            self.buffer.remove(idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.buffer.chars().count());
    }

    fn byte_index(&self) -> usize {
        self.buffer
            .char_indices()
            .nth(self.cursor)
            .map(|(idx, _)| idx)
            .unwrap_or(self.buffer.len())
    }
}

/// Routing tag carried by every background job
#[derive(Debug, Clone)]
pub enum JobTag {
    LoadList(ListIdentity),
    /// Single-item mutation from a list page; `verb` feeds the toast
    Mutation { verb: &'static str, title: String },
    /// Batch over the rows of `list`
    Batch { action: BatchAction, list: ListIdentity },
    QuickCreate { palette: u64 },
    Search { palette: u64 },
    LoadTriage(TriageKind),
    Triage { session: u64, ticket: TriageTicket },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_pages_map_to_entity_kinds_and_back() {
        for destination in Destination::ALL {
            if let Some(kind) = list_kind(destination) {
                assert_eq!(destination_for(kind), destination);
            }
        }
        assert_eq!(list_kind(Destination::Dashboard), None);
    }

    #[test]
    fn inline_edit_handles_multibyte_text() {
        let mut edit = InlineEdit::new(EditTarget::ScratchNote, "café");
        edit.backspace();
        assert_eq!(edit.buffer, "caf");
        edit.move_left();
        edit.insert('ñ');
        assert_eq!(edit.buffer, "cañf");
        assert_eq!(edit.cursor, 3);
    }
}
