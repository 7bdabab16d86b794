//! Background execution of collaborator calls.
//!
//! The UI thread never blocks on the collaborator. Each submitted [`Job`] runs
//! on its own thread and its [`JobOutcome`] comes back over a channel, tagged
//! with whatever the caller needs to route it.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};

use super::{
    complete, reschedule, Crud, CrudError, EntityKind, Item, ItemId, ItemPatch, ListFilter,
    NewItem, SearchHit,
};
use crate::search::CancelToken;

/// Operation applied to every id of a batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BatchOp {
    Complete,
    Delete,
    Snooze(DateTime<Local>),
}

impl BatchOp {
    pub fn verb(&self) -> &'static str {
        match self {
            BatchOp::Complete => "completed",
            BatchOp::Delete => "deleted",
            BatchOp::Snooze(_) => "snoozed",
        }
    }
}

/// A unit of work for the collaborator
#[derive(Debug, Clone)]
pub enum Job {
    List {
        kind: EntityKind,
        filter: ListFilter,
    },
    Create(NewItem),
    Update {
        kind: EntityKind,
        id: ItemId,
        patch: ItemPatch,
    },
    Delete {
        kind: EntityKind,
        id: ItemId,
    },
    /// Cross-entity search; abandoned when `token` moves past `generation`
    Search {
        query: String,
        generation: u64,
        token: CancelToken,
    },
    /// One individual call per id, executed in order
    Batch {
        kind: EntityKind,
        ids: Vec<ItemId>,
        op: BatchOp,
    },
}

#[derive(Debug, Clone)]
pub enum JobOutcome {
    Listed(Result<Vec<Item>, CrudError>),
    Created(Result<Item, CrudError>),
    Updated(Result<Item, CrudError>),
    Deleted(Result<(), CrudError>),
    Searched {
        generation: u64,
        result: Result<Vec<SearchHit>, CrudError>,
    },
    /// A search whose generation was superseded before it finished
    Abandoned { generation: u64 },
    Batch(Vec<(ItemId, Result<(), CrudError>)>),
}

#[derive(Debug, Clone)]
pub struct JobResult<T> {
    pub tag: T,
    pub outcome: JobOutcome,
}

/// Execute a job on the calling thread
pub fn run_job(crud: &dyn Crud, job: Job) -> JobOutcome {
    match job {
        Job::List { kind, filter } => JobOutcome::Listed(crud.list(kind, &filter)),
        Job::Create(item) => JobOutcome::Created(crud.create(item)),
        Job::Update { kind, id, patch } => JobOutcome::Updated(crud.update(kind, id, patch)),
        Job::Delete { kind, id } => JobOutcome::Deleted(crud.delete(kind, id)),
        Job::Search {
            query,
            generation,
            token,
        } => {
            if !token.is_current(generation) {
                return JobOutcome::Abandoned { generation };
            }
            let result = crud.search(&query);
            if !token.is_current(generation) {
                return JobOutcome::Abandoned { generation };
            }
            JobOutcome::Searched { generation, result }
        }
        Job::Batch { kind, ids, op } => JobOutcome::Batch(
            ids.into_iter()
                .map(|id| {
                    let result = match op {
                        BatchOp::Complete => complete(crud, kind, id).map(|_| ()),
                        BatchOp::Delete => crud.delete(kind, id),
                        BatchOp::Snooze(due) => reschedule(crud, kind, id, due).map(|_| ()),
                    };
                    (id, result)
                })
                .collect(),
        ),
    }
}

/// Runs jobs off the UI thread and collects their results
pub struct JobRunner<T> {
    crud: Arc<dyn Crud>,
    tx: Sender<JobResult<T>>,
    rx: Receiver<JobResult<T>>,
}

impl<T: Send + 'static> JobRunner<T> {
    pub fn new(crud: Arc<dyn Crud>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { crud, tx, rx }
    }

    /// Shared handle to the collaborator
    pub fn crud(&self) -> &Arc<dyn Crud> {
        &self.crud
    }

    /// Start a job in the background
    pub fn submit(&self, tag: T, job: Job) {
        let crud = Arc::clone(&self.crud);
        let tx = self.tx.clone();
        tracing::trace!(?job, "submitting job");
        thread::spawn(move || {
            let outcome = run_job(crud.as_ref(), job);
            // Receiver gone means the app is shutting down
            let _ = tx.send(JobResult { tag, outcome });
        });
    }

    /// Try to receive a finished job (non-blocking)
    pub fn try_recv(&self) -> Option<JobResult<T>> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next finished job
    pub fn recv_timeout(&self, timeout: Duration) -> Option<JobResult<T>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud::memory::CrudCall;
    use crate::crud::{InMemoryCrud, ItemStatus, Priority};

    fn task(id: ItemId) -> Item {
        Item {
            id,
            kind: EntityKind::Task,
            title: format!("task {id}"),
            status: ItemStatus::Todo,
            priority: Priority::Medium,
            due: None,
            tags: Vec::new(),
            project_id: None,
        }
    }

    #[test]
    fn batch_issues_one_call_per_id_and_reports_each() {
        let crud = InMemoryCrud::with_items(vec![task(1), task(2), task(3)]);
        crud.fail_id(2);
        let outcome = run_job(
            &crud,
            Job::Batch {
                kind: EntityKind::Task,
                ids: vec![1, 2, 3],
                op: BatchOp::Complete,
            },
        );
        let JobOutcome::Batch(results) = outcome else {
            panic!("expected batch outcome");
        };
        assert_eq!(results.len(), 3);
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
        assert!(results[2].1.is_ok());
        let updates = crud
            .calls()
            .into_iter()
            .filter(|c| matches!(c, CrudCall::Update(..)))
            .count();
        assert_eq!(updates, 3);
    }

    #[test]
    fn stale_search_is_abandoned_without_calling_backend() {
        let crud = InMemoryCrud::with_items(vec![task(1)]);
        let token = CancelToken::new();
        token.advance_to(2);
        let outcome = run_job(
            &crud,
            Job::Search {
                query: "task".to_string(),
                generation: 1,
                token,
            },
        );
        assert!(matches!(outcome, JobOutcome::Abandoned { generation: 1 }));
        assert!(crud.calls().is_empty());
    }

    #[test]
    fn runner_delivers_tagged_results() {
        let crud: Arc<dyn Crud> = Arc::new(InMemoryCrud::with_items(vec![task(1)]));
        let runner = JobRunner::new(crud);
        runner.submit(
            7u8,
            Job::Delete {
                kind: EntityKind::Task,
                id: 1,
            },
        );
        let result = runner.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(result.tag, 7);
        assert!(matches!(result.outcome, JobOutcome::Deleted(Ok(()))));
    }
}
