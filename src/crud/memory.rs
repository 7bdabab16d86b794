//! In-process implementation of the collaborator, used by the binary and tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{Days, Local, NaiveTime};

use super::{
    Crud, CrudError, EntityKind, Item, ItemId, ItemPatch, ItemStatus, ListFilter, NewItem,
    Priority, SearchHit,
};

/// A recorded collaborator call
#[derive(Debug, Clone, PartialEq)]
pub enum CrudCall {
    List(EntityKind),
    Create(NewItem),
    Update(EntityKind, ItemId, ItemPatch),
    Delete(EntityKind, ItemId),
    Search(String),
}

#[derive(Default)]
struct Store {
    items: BTreeMap<ItemId, Item>,
    next_id: ItemId,
    /// Number of upcoming mutating calls that should fail
    fail_next: usize,
    /// Ids whose mutations always fail
    fail_ids: BTreeSet<ItemId>,
    calls: Vec<CrudCall>,
}

/// Thread-safe in-memory store
pub struct InMemoryCrud {
    store: Mutex<Store>,
    latency: Option<Duration>,
}

impl Default for InMemoryCrud {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCrud {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store {
                next_id: 1,
                ..Default::default()
            }),
            latency: None,
        }
    }

    /// Create a store pre-filled with the given items (ids are kept)
    pub fn with_items(items: Vec<Item>) -> Self {
        let next_id = items.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        Self {
            store: Mutex::new(Store {
                items: items.into_iter().map(|i| (i.id, i)).collect(),
                next_id,
                ..Default::default()
            }),
            latency: None,
        }
    }

    /// Simulate network latency on every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next `n` mutating calls fail with `Unavailable`
    pub fn fail_next(&self, n: usize) {
        if let Ok(mut store) = self.store.lock() {
            store.fail_next = n;
        }
    }

    /// Make every mutation of `id` fail with `Unavailable`
    pub fn fail_id(&self, id: ItemId) {
        if let Ok(mut store) = self.store.lock() {
            store.fail_ids.insert(id);
        }
    }

    /// All calls received so far, in order
    pub fn calls(&self) -> Vec<CrudCall> {
        self.store
            .lock()
            .map(|store| store.calls.clone())
            .unwrap_or_default()
    }

    /// Look up an item directly, bypassing the call log
    pub fn get(&self, id: ItemId) -> Option<Item> {
        self.store
            .lock()
            .ok()
            .and_then(|store| store.items.get(&id).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, CrudError> {
        if let Some(latency) = self.latency {
            thread::sleep(latency);
        }
        self.store
            .lock()
            .map_err(|_| CrudError::Unavailable("store lock poisoned".to_string()))
    }
}

impl Store {
    fn check_failure(&mut self, id: Option<ItemId>) -> Result<(), CrudError> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(CrudError::Unavailable("simulated network failure".to_string()));
        }
        if let Some(id) = id {
            if self.fail_ids.contains(&id) {
                return Err(CrudError::Unavailable(format!("simulated failure for #{id}")));
            }
        }
        Ok(())
    }

    fn find_mut(&mut self, kind: EntityKind, id: ItemId) -> Result<&mut Item, CrudError> {
        self.items
            .get_mut(&id)
            .filter(|item| item.kind == kind)
            .ok_or(CrudError::NotFound { kind, id })
    }
}

impl Crud for InMemoryCrud {
    fn list(&self, kind: EntityKind, filter: &ListFilter) -> Result<Vec<Item>, CrudError> {
        let mut store = self.lock()?;
        store.calls.push(CrudCall::List(kind));
        Ok(store
            .items
            .values()
            .filter(|item| item.kind == kind)
            .filter(|item| !(filter.hide_done && item.status.is_done()))
            .filter(|item| filter.project_id.is_none() || item.project_id == filter.project_id)
            .cloned()
            .collect())
    }

    fn create(&self, new: NewItem) -> Result<Item, CrudError> {
        let mut store = self.lock()?;
        store.calls.push(CrudCall::Create(new.clone()));
        store.check_failure(None)?;
        if new.title.trim().is_empty() {
            return Err(CrudError::Rejected("title must not be empty".to_string()));
        }

        let id = store.next_id;
        store.next_id += 1;
        let item = Item {
            id,
            kind: new.kind,
            title: new.title,
            status: new.status,
            priority: new.priority,
            due: new.due,
            tags: new.tags,
            project_id: new.project_id,
        };
        store.items.insert(id, item.clone());
        Ok(item)
    }

    fn update(&self, kind: EntityKind, id: ItemId, patch: ItemPatch) -> Result<Item, CrudError> {
        let mut store = self.lock()?;
        store.calls.push(CrudCall::Update(kind, id, patch.clone()));
        store.check_failure(Some(id))?;

        let item = store.find_mut(kind, id)?;
        if let Some(title) = patch.title {
            item.title = title;
        }
        if let Some(status) = patch.status {
            item.status = status;
        }
        if let Some(priority) = patch.priority {
            item.priority = priority;
        }
        if let Some(due) = patch.due {
            item.due = due;
        }
        Ok(item.clone())
    }

    fn delete(&self, kind: EntityKind, id: ItemId) -> Result<(), CrudError> {
        let mut store = self.lock()?;
        store.calls.push(CrudCall::Delete(kind, id));
        store.check_failure(Some(id))?;
        store.find_mut(kind, id)?;
        store.items.remove(&id);
        Ok(())
    }

    fn search(&self, query: &str) -> Result<Vec<SearchHit>, CrudError> {
        let mut store = self.lock()?;
        store.calls.push(CrudCall::Search(query.to_string()));

        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<SearchHit> = store
            .items
            .values()
            .filter_map(|item| {
                let title = item.title.to_lowercase();
                let score = if title.starts_with(&needle) {
                    3
                } else if title.contains(&needle) {
                    2
                } else if item.tags.iter().any(|t| t.to_lowercase().contains(&needle)) {
                    1
                } else {
                    return None;
                };
                Some(SearchHit {
                    kind: item.kind,
                    id: item.id,
                    title: item.title.clone(),
                    score,
                })
            })
            .collect();
        hits.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
        Ok(hits)
    }
}

/// A small data set so the dashboard has something to show on first launch
pub fn sample_items() -> Vec<Item> {
    let now = Local::now();
    let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default();
    let at_nine = |days_ago: u64| {
        now.date_naive()
            .checked_sub_days(Days::new(days_ago))
            .and_then(|d| d.and_time(nine).and_local_timezone(Local).earliest())
    };
    let in_days = |days: u64| {
        now.date_naive()
            .checked_add_days(Days::new(days))
            .and_then(|d| d.and_time(nine).and_local_timezone(Local).earliest())
    };

    let item = |id, kind, title: &str, status, priority, due| Item {
        id,
        kind,
        title: title.to_string(),
        status,
        priority,
        due,
        tags: Vec::new(),
        project_id: None,
    };

    let mut items = vec![
        item(1, EntityKind::Task, "Draft quarterly goals", ItemStatus::InProgress, Priority::High, at_nine(0)),
        item(2, EntityKind::Task, "Renew passport", ItemStatus::Todo, Priority::Medium, at_nine(2)),
        item(3, EntityKind::Task, "Clean up photo library", ItemStatus::Todo, Priority::Low, in_days(5)),
        item(4, EntityKind::Task, "File expense report", ItemStatus::Done, Priority::Medium, at_nine(1)),
        item(5, EntityKind::Reminder, "Call dentist", ItemStatus::Todo, Priority::Medium, at_nine(3)),
        item(6, EntityKind::Reminder, "Pay electricity bill", ItemStatus::Todo, Priority::High, at_nine(1)),
        item(7, EntityKind::Reminder, "Water the plants", ItemStatus::Todo, Priority::Low, in_days(1)),
        item(8, EntityKind::Project, "Kitchen renovation", ItemStatus::InProgress, Priority::High, None),
        item(9, EntityKind::Person, "Alex Morgan", ItemStatus::Todo, Priority::Medium, None),
        item(10, EntityKind::Person, "Sam Rivera", ItemStatus::Waiting, Priority::Low, None),
        item(11, EntityKind::Action, "Reply to landlord email", ItemStatus::Todo, Priority::High, at_nine(0)),
        item(12, EntityKind::Action, "Follow up with Sam about review", ItemStatus::Waiting, Priority::Medium, in_days(2)),
        item(13, EntityKind::Note, "Gift ideas", ItemStatus::Todo, Priority::Low, None),
        item(14, EntityKind::Task, "Get contractor quotes", ItemStatus::Todo, Priority::High, in_days(3)),
    ];
    if let Some(quotes) = items.iter_mut().find(|i| i.id == 14) {
        quotes.project_id = Some(8);
        quotes.tags.push("renovation".to_string());
    }
    items
}
