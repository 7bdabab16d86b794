use std::time::Duration;

use tempfile::TempDir;

use super::*;
use crate::crud::jobs::JobOutcome;
use crate::crud::memory::CrudCall;
use crate::crud::{
    CrudError, EntityKind, InMemoryCrud, Item, ItemId, ItemStatus, JobResult, Priority,
    SearchHit,
};
use crate::input::{char_key, key, CaptureContext};
use crate::list::{BatchAction, ListIdentity};
use crate::search::{Command, CreateStatus, PaletteAction, PaletteTarget};
use crate::triage::SnoozeOption;
use crossterm::event::KeyCode;

fn item(id: ItemId, kind: EntityKind, title: &str, priority: Priority) -> Item {
    Item {
        id,
        kind,
        title: title.to_string(),
        status: ItemStatus::Todo,
        priority,
        due: None,
        tags: Vec::new(),
        project_id: None,
    }
}

fn fixture() -> Vec<Item> {
    let mut project_task = item(5, EntityKind::Task, "Draft outline", Priority::Low);
    project_task.project_id = Some(4);
    vec![
        item(1, EntityKind::Task, "Write report", Priority::High),
        item(2, EntityKind::Task, "Call plumber", Priority::High),
        item(3, EntityKind::Task, "Water plants", Priority::Low),
        item(4, EntityKind::Project, "Book", Priority::Medium),
        project_task,
        item(6, EntityKind::Note, "Groceries", Priority::Low),
    ]
}

fn setup() -> (App, Arc<InMemoryCrud>, TempDir) {
    setup_with(InMemoryCrud::with_items(fixture()))
}

fn setup_with(crud: InMemoryCrud) -> (App, Arc<InMemoryCrud>, TempDir) {
    let crud = Arc::new(crud);
    let dir = TempDir::new().unwrap();
    let notes = NoteStore::new(dir.path().join("notes.json"));
    let app = App::new(Config::default(), crud.clone(), notes);
    (app, crud, dir)
}

/// Apply job results until the runner has been quiet for a while
fn settle(app: &mut App, now: Instant) {
    while let Some(result) = app.jobs.recv_timeout(Duration::from_millis(300)) {
        app.handle_job_result(result, now);
    }
}

fn open_page(app: &mut App, destination: Destination, now: Instant) {
    app.navigate(destination, now);
    settle(app, now);
}

fn has_toast(app: &App, message: &str) -> bool {
    app.toast_manager
        .visible_toasts()
        .iter()
        .any(|toast| toast.message == message)
}

fn palette_has_item(app: &mut App) -> bool {
    app.modal_state
        .palette_mut()
        .unwrap()
        .engine()
        .results()
        .iter()
        .any(|entry| matches!(entry.target, PaletteTarget::Item { .. }))
}

fn update_calls(crud: &InMemoryCrud) -> usize {
    crud.calls()
        .iter()
        .filter(|call| matches!(call, CrudCall::Update(..)))
        .count()
}

#[test]
fn navigation_loads_rows_and_confirms() {
    let (mut app, _crud, _dir) = setup();
    let now = Instant::now();
    open_page(&mut app, Destination::Tasks, now);

    assert_eq!(app.view.destination, Destination::Tasks);
    assert_eq!(app.list.rows().len(), 4);
    assert!(app
        .toast_manager
        .visible_toasts()
        .iter()
        .any(|toast| toast.message == "→ Tasks"));
}

#[test]
fn complete_waits_for_collaborator_then_reloads() {
    let (mut app, crud, _dir) = setup();
    let now = Instant::now();
    open_page(&mut app, Destination::Tasks, now);

    app.list.move_down();
    let command = app.list.handle_key(char_key('c'));
    app.apply_list_command(command, now);
    assert_eq!(app.list.rows()[0].status, ItemStatus::Todo);

    settle(&mut app, now);
    assert_eq!(crud.get(1).map(|i| i.status), Some(ItemStatus::Done));
    assert_eq!(app.list.rows()[0].status, ItemStatus::Done);
    assert_eq!(app.list.focus().get(), Some(0));
}

#[test]
fn batch_partial_failure_keeps_failed_ids_selected() {
    let (mut app, crud, _dir) = setup();
    crud.fail_id(2);
    let now = Instant::now();
    open_page(&mut app, Destination::Tasks, now);

    for _ in 0..3 {
        app.list.move_down();
        app.list.toggle_select();
    }
    let command = app.list.handle_key(char_key('C'));
    app.apply_list_command(command, now);
    settle(&mut app, now);

    assert_eq!(app.list.selection().iter().copied().collect::<Vec<_>>(), vec![2]);
    assert!(!app.list.is_batch_in_flight());
    assert_eq!(crud.get(1).map(|i| i.status), Some(ItemStatus::Done));
    assert_eq!(crud.get(2).map(|i| i.status), Some(ItemStatus::Todo));
    assert_eq!(crud.get(3).map(|i| i.status), Some(ItemStatus::Done));
}

#[test]
fn batch_snooze_reschedules_every_selected_item() {
    let (mut app, crud, _dir) = setup();
    let now = Instant::now();
    open_page(&mut app, Destination::Tasks, now);

    for _ in 0..3 {
        app.list.move_down();
        app.list.toggle_select();
    }
    let mut selected: Vec<ItemId> = app.list.selection().iter().copied().collect();
    selected.sort_unstable();
    let expected = SnoozeOption::Tomorrow.resolve_now().unwrap();

    let command = app.list.handle_key(char_key('S'));
    app.apply_list_command(command, now);
    settle(&mut app, now);

    let mut snoozed: Vec<ItemId> = crud
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            CrudCall::Update(EntityKind::Task, id, patch) => {
                assert_eq!(patch.due, Some(Some(expected)));
                assert_eq!(patch.status, None);
                Some(id)
            }
            _ => None,
        })
        .collect();
    snoozed.sort_unstable();

    assert_eq!(snoozed, selected);
    assert!(app.list.selection().is_empty());
    assert!(!app.list.is_batch_in_flight());
    assert!(has_toast(&app, "Snoozed 3 item(s)"));
}

#[test]
fn batch_result_after_leaving_list_keeps_new_selection() {
    let (mut app, _crud, _dir) = setup();
    let now = Instant::now();
    open_page(&mut app, Destination::Notes, now);
    app.list.move_down();
    app.list.toggle_select();
    assert!(app.list.is_selected(6));

    // Batch started on Tasks, answered while Notes is shown
    let finished = JobResult {
        tag: JobTag::Batch {
            action: BatchAction::Complete,
            list: ListIdentity::new(EntityKind::Task),
        },
        outcome: JobOutcome::Batch(vec![
            (6, Ok(())),
            (2, Err(CrudError::Unavailable("offline".to_string()))),
        ]),
    };
    app.handle_job_result(finished, now);

    assert!(app.list.is_selected(6));
    assert!(has_toast(&app, "1 of 2 failed to complete"));
    assert!(!app
        .toast_manager
        .visible_toasts()
        .iter()
        .any(|toast| toast.message.contains("still selected")));
}

#[test]
fn project_enter_drills_into_its_tasks() {
    let (mut app, _crud, _dir) = setup();
    let now = Instant::now();
    open_page(&mut app, Destination::Projects, now);

    app.list.move_down();
    let command = app.list.handle_key(key(KeyCode::Enter));
    app.apply_list_command(command, now);
    settle(&mut app, now);

    assert_eq!(app.view.project.as_ref().map(|p| p.id), Some(4));
    let ids: Vec<ItemId> = app.list.rows().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![5]);

    assert!(app.close_project());
    settle(&mut app, now);
    assert_eq!(app.list.rows().len(), 1);
    assert_eq!(app.list.rows()[0].kind, EntityKind::Project);
}

#[test]
fn quick_create_ignores_second_enter_and_closes_after_success() {
    let (mut app, crud, _dir) = setup();
    let now = Instant::now();
    app.open_palette();
    app.modal_state
        .palette_mut()
        .unwrap()
        .set_query("/task Buy milk", now);

    app.handle_palette_key(key(KeyCode::Enter), now);
    app.handle_palette_key(key(KeyCode::Enter), now);
    settle(&mut app, now);

    let creates = crud
        .calls()
        .iter()
        .filter(|call| matches!(call, CrudCall::Create(_)))
        .count();
    assert_eq!(creates, 1);
    assert!(matches!(
        app.modal_state.palette_mut().unwrap().status(),
        CreateStatus::Succeeded { .. }
    ));

    app.tick(now + Duration::from_millis(599));
    assert!(app.is_modal_open());
    app.tick(now + Duration::from_millis(600));
    assert!(!app.is_modal_open());
    assert!(!app.dispatcher.is_modal_open());
}

#[test]
fn quick_create_failure_shows_error_then_restores_query() {
    let (mut app, crud, _dir) = setup();
    crud.fail_next(1);
    let now = Instant::now();
    app.open_palette();
    app.modal_state
        .palette_mut()
        .unwrap()
        .set_query("/note hello", now);

    app.handle_palette_key(key(KeyCode::Enter), now);
    settle(&mut app, now);
    let palette = app.modal_state.palette_mut().unwrap();
    assert!(palette.display_query().starts_with("Error"));

    app.tick(now + Duration::from_millis(1500));
    let palette = app.modal_state.palette_mut().unwrap();
    assert_eq!(palette.display_query(), "/note hello");
    assert_eq!(palette.status(), &CreateStatus::Idle);
}

#[test]
fn stale_search_results_are_dropped() {
    let (mut app, _crud, _dir) = setup();
    let now = Instant::now();
    app.open_palette();
    let palette = app.modal_state.palette_mut().unwrap();
    let id = palette.id();
    palette.set_query("wri", now);
    let stale = palette.engine().generation();
    palette.set_query("writ", now);
    let current = palette.engine().generation();

    let hit = SearchHit {
        kind: EntityKind::Task,
        id: 1,
        title: "Write report".to_string(),
        score: 3,
    };
    let searched = |generation| JobResult {
        tag: JobTag::Search { palette: id },
        outcome: JobOutcome::Searched {
            generation,
            result: Ok(vec![hit.clone()]),
        },
    };

    app.handle_job_result(searched(stale), now);
    assert!(!palette_has_item(&mut app));

    app.handle_job_result(searched(current), now);
    assert!(palette_has_item(&mut app));
}

#[test]
fn search_results_do_not_leak_into_next_palette() {
    let slow = InMemoryCrud::with_items(fixture()).with_latency(Duration::from_millis(150));
    let (mut app, crud, _dir) = setup_with(slow);
    let now = Instant::now();
    settle(&mut app, now);

    app.open_palette();
    app.modal_state.palette_mut().unwrap().set_query("write", now);
    app.tick(now + Duration::from_millis(250));
    app.close_modal();

    // Same generation as the closed palette's search
    app.open_palette();
    app.modal_state.palette_mut().unwrap().set_query("zzz", now);
    settle(&mut app, now);

    assert!(crud.calls().contains(&CrudCall::Search("write".to_string())));
    let palette = app.modal_state.palette_mut().unwrap();
    assert_eq!(palette.engine().query(), "zzz");
    assert!(!palette_has_item(&mut app));
}

#[test]
fn create_from_closed_palette_only_toasts() {
    let (mut app, _crud, _dir) = setup();
    let now = Instant::now();
    app.open_palette();
    app.modal_state
        .palette_mut()
        .unwrap()
        .set_query("/task Buy milk", now);
    app.handle_palette_key(key(KeyCode::Enter), now);
    app.close_modal();

    app.open_palette();
    app.modal_state.palette_mut().unwrap().set_query("wri", now);
    settle(&mut app, now);

    let palette = app.modal_state.palette_mut().unwrap();
    assert_eq!(palette.status(), &CreateStatus::Idle);
    assert_eq!(palette.engine().query(), "wri");
    assert!(has_toast(&app, "Created \"Buy milk\""));

    app.tick(now + Duration::from_millis(700));
    assert!(app.is_modal_open());
}

#[test]
fn debounced_search_reaches_collaborator_once() {
    let (mut app, crud, _dir) = setup();
    let now = Instant::now();
    app.open_palette();
    for (i, text) in ["w", "wr", "wri"].iter().enumerate() {
        app.modal_state
            .palette_mut()
            .unwrap()
            .set_query(*text, now + Duration::from_millis(50 * i as u64));
    }

    app.tick(now + Duration::from_millis(150));
    app.tick(now + Duration::from_millis(300));
    settle(&mut app, now);

    let searches: Vec<CrudCall> = crud
        .calls()
        .into_iter()
        .filter(|call| matches!(call, CrudCall::Search(_)))
        .collect();
    assert_eq!(searches, vec![CrudCall::Search("wri".to_string())]);
}

#[test]
fn open_item_focuses_row_once_loaded() {
    let (mut app, _crud, _dir) = setup();
    let now = Instant::now();
    app.open_palette();
    app.run_palette_action(
        PaletteAction::OpenItem {
            kind: EntityKind::Task,
            id: 2,
        },
        now,
    );
    settle(&mut app, now);

    assert!(!app.is_modal_open());
    assert_eq!(app.view.destination, Destination::Tasks);
    assert_eq!(app.list.focused().map(|i| i.id), Some(2));
}

#[test]
fn focus_session_guards_and_transitions() {
    let (mut app, crud, _dir) = setup();
    let now = Instant::now();
    app.run_command(Command::StartFocus, now);
    settle(&mut app, now);

    let view = app.modal_state.triage_mut().unwrap();
    assert_eq!(view.session.initial_len(), 2);

    // Second action while the first is outstanding is refused
    app.handle_triage_key(char_key('c'), now);
    app.handle_triage_key(char_key('c'), now);
    assert!(app.modal_state.triage_mut().unwrap().session.is_in_flight());
    settle(&mut app, now);
    assert_eq!(update_calls(&crud), 1);
    assert_eq!(app.modal_state.triage_mut().unwrap().session.counts().completed, 1);

    // Keys are ignored while the next item slides in
    let during = now + Duration::from_millis(100);
    app.handle_triage_key(char_key('c'), during);
    assert!(!app.modal_state.triage_mut().unwrap().session.is_in_flight());

    let after = now + Duration::from_millis(300);
    app.handle_triage_key(char_key('t'), after);
    settle(&mut app, after);
    let view = app.modal_state.triage_mut().unwrap();
    assert!(view.session.is_terminal());
    assert_eq!(view.session.counts().snoozed, 1);

    app.handle_triage_key(key(KeyCode::Enter), after);
    assert!(!app.is_modal_open());
}

#[test]
fn failed_triage_action_keeps_item_for_retry() {
    let (mut app, crud, _dir) = setup();
    let now = Instant::now();
    app.run_command(Command::StartFocus, now);
    settle(&mut app, now);

    crud.fail_next(1);
    app.handle_triage_key(char_key('c'), now);
    settle(&mut app, now);

    let view = app.modal_state.triage_mut().unwrap();
    assert_eq!(view.session.remaining(), 2);
    assert!(view.error.is_some());
    assert!(!view.session.is_in_flight());
    assert!(!app.presentation.is_transitioning(now));
}

#[test]
fn scratch_note_edit_is_saved() {
    let (mut app, _crud, _dir) = setup();
    let now = Instant::now();
    open_page(&mut app, Destination::Notes, now);

    app.begin_scratch_edit();
    assert_eq!(app.dispatcher.context(false), CaptureContext::TextEditing);
    for c in "hi".chars() {
        app.handle_inline_edit_key(char_key(c));
    }
    app.handle_inline_edit_key(key(KeyCode::Enter));

    assert_eq!(app.scratch_note, "hi");
    assert_eq!(app.notes.get(SCRATCH_KEY).as_deref(), Some("hi"));
    assert_eq!(app.dispatcher.context(false), CaptureContext::None);
}

#[test]
fn emptied_scratch_note_is_removed_from_store() {
    let (mut app, _crud, _dir) = setup();
    app.notes.set(SCRATCH_KEY, "old").unwrap();
    app.notes.set("other", "kept").unwrap();
    app.scratch_note = "old".to_string();

    app.begin_scratch_edit();
    for _ in 0..3 {
        app.handle_inline_edit_key(key(KeyCode::Backspace));
    }
    app.handle_inline_edit_key(char_key(' '));
    app.handle_inline_edit_key(key(KeyCode::Enter));

    assert_eq!(app.scratch_note, "");
    assert_eq!(app.notes.get(SCRATCH_KEY), None);
    assert_eq!(app.notes.get("other").as_deref(), Some("kept"));
}
