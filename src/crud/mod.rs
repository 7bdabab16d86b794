//! Collaborator contract for the persistence layer.
//!
//! Everything the keyboard layer mutates goes through the [`Crud`] trait. The
//! trait is deliberately small: list/create/update/delete per entity kind plus
//! one cross-entity search. `complete` and `reschedule` are just typed
//! `update` calls.

pub mod jobs;
pub mod memory;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use jobs::{Job, JobResult, JobRunner};
pub use memory::InMemoryCrud;

/// Identifier of a stored item
pub type ItemId = u64;

/// Entity kinds managed by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Task,
    Reminder,
    Project,
    Person,
    Note,
    /// Items waiting in the action queue (follow-ups, inbox triage)
    Action,
}

impl EntityKind {
    /// Returns the display name for the kind
    pub fn display_name(&self) -> &'static str {
        match self {
            EntityKind::Task => "Task",
            EntityKind::Reminder => "Reminder",
            EntityKind::Project => "Project",
            EntityKind::Person => "Person",
            EntityKind::Note => "Note",
            EntityKind::Action => "Action",
        }
    }

    /// Whether items of this kind carry a due date that can be moved
    pub fn is_schedulable(&self) -> bool {
        matches!(
            self,
            EntityKind::Task | EntityKind::Reminder | EntityKind::Action
        )
    }
}

/// Workflow status shared by every list page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Todo,
    InProgress,
    Waiting,
    Done,
}

impl ItemStatus {
    /// Fixed cycle order used by the status-cycle key
    pub const CYCLE: [ItemStatus; 4] = [
        ItemStatus::Todo,
        ItemStatus::InProgress,
        ItemStatus::Waiting,
        ItemStatus::Done,
    ];

    /// Advance to the next status, wrapping from the last back to the first
    pub fn next(&self) -> Self {
        let idx = Self::CYCLE.iter().position(|s| s == self).unwrap_or(0);
        Self::CYCLE[(idx + 1) % Self::CYCLE.len()]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ItemStatus::Todo => "todo",
            ItemStatus::InProgress => "in progress",
            ItemStatus::Waiting => "waiting",
            ItemStatus::Done => "done",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, ItemStatus::Done)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// A stored item of any kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: EntityKind,
    pub title: String,
    pub status: ItemStatus,
    pub priority: Priority,
    pub due: Option<DateTime<Local>>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Owning project, for project tasks
    #[serde(default)]
    pub project_id: Option<ItemId>,
}

/// Payload for `Crud::create`
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub kind: EntityKind,
    pub title: String,
    pub status: ItemStatus,
    pub priority: Priority,
    pub due: Option<DateTime<Local>>,
    pub tags: Vec<String>,
    pub project_id: Option<ItemId>,
}

impl NewItem {
    /// Copy of an existing item, suitable for the duplicate action
    pub fn duplicate_of(item: &Item) -> Self {
        Self {
            kind: item.kind,
            title: format!("{} (copy)", item.title),
            status: ItemStatus::Todo,
            priority: item.priority,
            due: item.due,
            tags: item.tags.clone(),
            project_id: item.project_id,
        }
    }
}

/// Partial update for `Crud::update`; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub status: Option<ItemStatus>,
    pub priority: Option<Priority>,
    pub due: Option<Option<DateTime<Local>>>,
}

impl ItemPatch {
    pub fn status(status: ItemStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn due(due: DateTime<Local>) -> Self {
        Self {
            due: Some(Some(due)),
            ..Default::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

/// Filters accepted by `Crud::list`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ListFilter {
    /// Hide items whose status is Done
    pub hide_done: bool,
    /// Restrict to one project (project task pages)
    pub project_id: Option<ItemId>,
}

/// One ranked result of a cross-entity search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub kind: EntityKind,
    pub id: ItemId,
    pub title: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrudError {
    #[error("{kind:?} #{id} not found")]
    NotFound { kind: EntityKind, id: ItemId },
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// The persistence collaborator consumed by the keyboard layer
pub trait Crud: Send + Sync {
    fn list(&self, kind: EntityKind, filter: &ListFilter) -> Result<Vec<Item>, CrudError>;
    fn create(&self, item: NewItem) -> Result<Item, CrudError>;
    fn update(&self, kind: EntityKind, id: ItemId, patch: ItemPatch) -> Result<Item, CrudError>;
    fn delete(&self, kind: EntityKind, id: ItemId) -> Result<(), CrudError>;
    fn search(&self, query: &str) -> Result<Vec<SearchHit>, CrudError>;
}

/// Mark an item Done
pub fn complete(crud: &dyn Crud, kind: EntityKind, id: ItemId) -> Result<Item, CrudError> {
    crud.update(kind, id, ItemPatch::status(ItemStatus::Done))
}

/// Move an item's due date
pub fn reschedule(
    crud: &dyn Crud,
    kind: EntityKind,
    id: ItemId,
    due: DateTime<Local>,
) -> Result<Item, CrudError> {
    crud.update(kind, id, ItemPatch::due(due))
}
