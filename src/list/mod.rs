//! Keyboard controller shared by the reminder, action-queue, task and project
//! list pages.
//!
//! The controller only decides what a key means for the visible rows. It
//! returns a [`ListCommand`] and the application performs any collaborator
//! call; the list is reloaded afterwards.

use std::collections::BTreeSet;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::crud::{CrudError, EntityKind, Item, ItemId, ItemStatus, ListFilter};

/// Focused row in the visible list; `None` means nothing is focused
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusIndex(Option<usize>);

impl FocusIndex {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn at(index: usize) -> Self {
        Self(Some(index))
    }

    pub fn get(&self) -> Option<usize> {
        self.0
    }

    /// Index with -1 standing for "nothing focused"
    pub fn as_index(&self) -> isize {
        self.0.map_or(-1, |i| i as isize)
    }
}

/// Ids picked for a batch action
pub type SelectionSet = BTreeSet<ItemId>;

/// Which list is being shown; a change resets focus and selection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListIdentity {
    pub kind: EntityKind,
    pub filter: ListFilter,
}

impl ListIdentity {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            filter: ListFilter::default(),
        }
    }

    /// Tasks belonging to one project
    pub fn project_tasks(project_id: ItemId) -> Self {
        Self {
            kind: EntityKind::Task,
            filter: ListFilter {
                project_id: Some(project_id),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    Complete,
    Delete,
    Snooze,
}

impl BatchAction {
    pub fn label(&self) -> &'static str {
        match self {
            BatchAction::Complete => "complete",
            BatchAction::Delete => "delete",
            BatchAction::Snooze => "snooze",
        }
    }
}

/// What a key on a list page asks for
#[derive(Debug, Clone, PartialEq)]
pub enum ListCommand {
    /// Nothing to do beyond a redraw
    None,
    Complete(Item),
    Edit(Item),
    Delete(Item),
    Snooze(Item),
    Duplicate(Item),
    /// Move the item to `status` (status-cycle key)
    SetStatus(Item, ItemStatus),
    /// Enter on a row (project pages open the project's tasks)
    Open(Item),
    Batch(BatchAction, Vec<ItemId>),
    /// Focus and selection were cleared
    Cleared,
    ShowHelp,
    /// The action is not allowed for the focused row
    Denied(String),
}

/// Keyboard state for one list page
#[derive(Debug, Default)]
pub struct ItemListController {
    identity: Option<ListIdentity>,
    rows: Vec<Item>,
    focus: FocusIndex,
    selection: SelectionSet,
    scroll_offset: usize,
    viewport: usize,
    batch_in_flight: bool,
}

impl ItemListController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&ListIdentity> {
        self.identity.as_ref()
    }

    pub fn rows(&self) -> &[Item] {
        &self.rows
    }

    pub fn focus(&self) -> FocusIndex {
        self.focus
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn is_batch_in_flight(&self) -> bool {
        self.batch_in_flight
    }

    pub fn focused(&self) -> Option<&Item> {
        self.focus.get().and_then(|i| self.rows.get(i))
    }

    pub fn is_selected(&self, id: ItemId) -> bool {
        self.selection.contains(&id)
    }

    /// Switch to another list; focus and selection start over
    pub fn reset(&mut self, identity: ListIdentity) {
        self.identity = Some(identity);
        self.rows.clear();
        self.focus = FocusIndex::none();
        self.selection.clear();
        self.scroll_offset = 0;
        self.batch_in_flight = false;
    }

    /// Install freshly loaded rows.
    ///
    /// A different identity starts over. The same identity is a reload: focus
    /// is clamped and selected ids that disappeared are dropped.
    pub fn set_rows(&mut self, identity: ListIdentity, rows: Vec<Item>) {
        if self.identity.as_ref() != Some(&identity) {
            self.reset(identity);
        }
        self.rows = rows;
        let visible: BTreeSet<ItemId> = self.rows.iter().map(|r| r.id).collect();
        self.selection.retain(|id| visible.contains(id));
        self.focus = match self.focus.get() {
            Some(_) if self.rows.is_empty() => FocusIndex::none(),
            Some(i) => FocusIndex::at(i.min(self.rows.len() - 1)),
            None => FocusIndex::none(),
        };
        self.scroll_into_view();
    }

    /// Height of the list area in rows, as last rendered
    pub fn set_viewport(&mut self, rows: usize) {
        self.viewport = rows;
        self.scroll_into_view();
    }

    pub fn move_down(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() - 1;
        self.focus = FocusIndex::at(match self.focus.get() {
            None => 0,
            Some(i) => (i + 1).min(last),
        });
        self.scroll_into_view();
    }

    pub fn move_up(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.focus = FocusIndex::at(match self.focus.get() {
            None => 0,
            Some(i) => i.saturating_sub(1),
        });
        self.scroll_into_view();
    }

    pub fn jump_to_first(&mut self) {
        if !self.rows.is_empty() {
            self.focus = FocusIndex::at(0);
            self.scroll_into_view();
        }
    }

    pub fn jump_to_last(&mut self) {
        if !self.rows.is_empty() {
            self.focus = FocusIndex::at(self.rows.len() - 1);
            self.scroll_into_view();
        }
    }

    /// Focus the row holding `id`, if it is visible
    pub fn focus_id(&mut self, id: ItemId) -> bool {
        match self.rows.iter().position(|item| item.id == id) {
            Some(index) => {
                self.focus = FocusIndex::at(index);
                self.scroll_into_view();
                true
            }
            None => false,
        }
    }

    /// Add or remove the focused row from the selection
    pub fn toggle_select(&mut self) -> bool {
        let Some(id) = self.focused().map(|item| item.id) else {
            return false;
        };
        if !self.selection.remove(&id) {
            self.selection.insert(id);
        }
        true
    }

    /// Escape: forget focus and selection
    pub fn clear(&mut self) {
        self.focus = FocusIndex::none();
        self.selection.clear();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ListCommand {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return ListCommand::None;
        }

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_down();
                ListCommand::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_up();
                ListCommand::None
            }
            KeyCode::Home => {
                self.jump_to_first();
                ListCommand::None
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.jump_to_last();
                ListCommand::None
            }
            KeyCode::Esc => {
                self.clear();
                ListCommand::Cleared
            }
            KeyCode::Char('?') => ListCommand::ShowHelp,
            KeyCode::Char('x') => {
                self.toggle_select();
                ListCommand::None
            }
            KeyCode::Char('C') => self.begin_batch(BatchAction::Complete),
            KeyCode::Char('D') => self.begin_batch(BatchAction::Delete),
            KeyCode::Char('S') => self.begin_batch(BatchAction::Snooze),
            KeyCode::Char('c') => self.on_focused(|item| {
                if item.status.is_done() {
                    ListCommand::Denied("Already completed".to_string())
                } else {
                    ListCommand::Complete(item.clone())
                }
            }),
            KeyCode::Char('s') => self.on_focused(|item| {
                if item.status.is_done() {
                    ListCommand::Denied("Completed items cannot be snoozed".to_string())
                } else if !item.kind.is_schedulable() {
                    ListCommand::Denied(format!(
                        "{} items have no due date",
                        item.kind.display_name()
                    ))
                } else {
                    ListCommand::Snooze(item.clone())
                }
            }),
            KeyCode::Char('e') => self.on_focused(|item| ListCommand::Edit(item.clone())),
            KeyCode::Char('d') => self.on_focused(|item| ListCommand::Delete(item.clone())),
            KeyCode::Char('y') => self.on_focused(|item| ListCommand::Duplicate(item.clone())),
            KeyCode::Char(' ') => {
                self.on_focused(|item| ListCommand::SetStatus(item.clone(), item.status.next()))
            }
            KeyCode::Enter => self.on_focused(|item| ListCommand::Open(item.clone())),
            _ => ListCommand::None,
        }
    }

    fn on_focused(&self, action: impl FnOnce(&Item) -> ListCommand) -> ListCommand {
        match self.focused() {
            Some(item) => action(item),
            None => ListCommand::None,
        }
    }

    fn begin_batch(&mut self, action: BatchAction) -> ListCommand {
        if self.batch_in_flight {
            return ListCommand::Denied("A batch action is still running".to_string());
        }
        if self.selection.is_empty() {
            return ListCommand::Denied("Nothing selected (x selects)".to_string());
        }
        if action == BatchAction::Snooze {
            let unschedulable = self
                .rows
                .iter()
                .filter(|item| self.selection.contains(&item.id))
                .any(|item| !item.kind.is_schedulable());
            if unschedulable {
                return ListCommand::Denied("Selection contains items without due dates".to_string());
            }
        }
        self.batch_in_flight = true;
        let ids: Vec<ItemId> = self.selection.iter().copied().collect();
        debug!(action = action.label(), count = ids.len(), "batch started");
        ListCommand::Batch(action, ids)
    }

    /// Record a finished batch. Ids that succeeded leave the selection; ids
    /// that failed stay selected so the batch can be retried. Returns
    /// `(succeeded, failed)`.
    pub fn finish_batch(&mut self, results: &[(ItemId, Result<(), CrudError>)]) -> (usize, usize) {
        self.batch_in_flight = false;
        let mut succeeded = 0;
        for (id, result) in results {
            if result.is_ok() {
                self.selection.remove(id);
                succeeded += 1;
            }
        }
        (succeeded, results.len() - succeeded)
    }

    fn scroll_into_view(&mut self) {
        let Some(focus) = self.focus.get() else {
            self.scroll_offset = self.scroll_offset.min(self.rows.len().saturating_sub(1));
            return;
        };
        if self.viewport == 0 {
            return;
        }
        if focus < self.scroll_offset {
            self.scroll_offset = focus;
        } else if focus >= self.scroll_offset + self.viewport {
            self.scroll_offset = focus + 1 - self.viewport;
        }
    }
}
