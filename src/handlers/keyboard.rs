use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::app::App;
use crate::input::{ChordOutcome, Destination, Keystroke, Route};
use crate::triage::TriageKind;

use super::modal::handle_modal_key;

/// Action returned from key handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
}

/// Route one key press to exactly one consumer
pub fn handle_key_event(app: &mut App, key: KeyEvent, now: Instant) -> KeyAction {
    // True global keybinding, works even while typing
    if let (KeyCode::Char('q'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return KeyAction::Quit;
    }

    let stroke = Keystroke::new(key, app.key_target());
    let chord_pending = app.chord.is_pending(now);
    match app.dispatcher.route(&stroke, chord_pending) {
        Route::Dropped => {}
        Route::Field => handle_field_key(app, key, now),
        Route::Modal => handle_modal_key(app, key, now),
        Route::Chord => handle_chord_key(app, &stroke, now),
        Route::Page => handle_page_key(app, key, now),
    }

    if app.should_quit {
        KeyAction::Quit
    } else {
        KeyAction::Continue
    }
}

/// Keys consumed by whichever text control has focus
fn handle_field_key(app: &mut App, key: KeyEvent, now: Instant) {
    if app.is_modal_open() {
        handle_modal_key(app, key, now);
    } else {
        app.handle_inline_edit_key(key);
    }
}

fn handle_chord_key(app: &mut App, stroke: &Keystroke, now: Instant) {
    if app.dispatcher.is_palette_toggle(&stroke.key) {
        app.chord.cancel();
        app.open_palette();
        return;
    }

    let outcome = if app.chord.is_pending(now) {
        app.chord.handle_key(stroke.plain_char(), now)
    } else {
        app.chord.press_leader(now)
    };

    match outcome {
        ChordOutcome::Navigate(destination) => app.navigate(destination, now),
        ChordOutcome::Started | ChordOutcome::Restarted => debug!("waiting for chord key"),
        ChordOutcome::Discarded | ChordOutcome::Expired => debug!(?outcome, "chord dropped"),
    }
}

fn handle_page_key(app: &mut App, key: KeyEvent, now: Instant) {
    let palette_toggle = app.dispatcher.is_palette_toggle(&key);

    // While the inline editor is open only the always-on keys get here
    if app.inline_edit.is_some() {
        app.cancel_inline_edit();
        if palette_toggle {
            app.open_palette();
        }
        return;
    }

    if palette_toggle {
        app.open_palette();
        return;
    }

    if key.code == KeyCode::Esc && app.presentation.help_visible(now) {
        app.presentation.hide_help();
        return;
    }

    let plain = key.modifiers.difference(KeyModifiers::SHIFT).is_empty();
    if !plain {
        return;
    }

    let is_list_page = app.view.list_identity().is_some();
    match (app.view.destination, key.code) {
        (_, KeyCode::Char('q')) => app.should_quit = true,
        (Destination::Focus, KeyCode::Enter) => app.start_triage(TriageKind::Focus),
        (Destination::Reminders, KeyCode::Char('o')) => app.start_triage(TriageKind::OverdueSweep),
        (Destination::ActionQueue, KeyCode::Char('v')) => {
            app.start_triage(TriageKind::ActionReview)
        }
        (Destination::Notes, KeyCode::Char('e')) if app.list.focused().is_none() => {
            app.begin_scratch_edit()
        }
        (Destination::Projects, KeyCode::Backspace) if app.view.project.is_some() => {
            app.close_project();
        }
        _ if is_list_page => {
            let command = app.list.handle_key(key);
            app.apply_list_command(command, now);
        }
        (_, KeyCode::Char('?')) => app.show_help(now),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::config::Config;
    use crate::crud::memory::sample_items;
    use crate::crud::InMemoryCrud;
    use crate::input::{char_key, ctrl_key, key, CaptureContext};
    use crate::notes::NoteStore;

    fn setup() -> (App, TempDir) {
        let dir = TempDir::new().unwrap();
        let crud = Arc::new(InMemoryCrud::with_items(sample_items()));
        let notes = NoteStore::new(dir.path().join("notes.json"));
        (App::new(Config::default(), crud, notes), dir)
    }

    fn palette_query(app: &mut App) -> String {
        app.modal_state
            .palette_mut()
            .map(|p| p.engine().query().to_string())
            .unwrap_or_default()
    }

    #[test]
    fn navigates_when_leader_then_destination() {
        let (mut app, _dir) = setup();
        let now = Instant::now();
        handle_key_event(&mut app, char_key('g'), now);
        assert_eq!(app.dispatcher.context(app.chord.is_pending(now)), CaptureContext::ChordPending);
        handle_key_event(&mut app, char_key('t'), now + Duration::from_millis(300));
        assert_eq!(app.view.destination, Destination::Tasks);
        assert!(!app.chord.is_pending(now + Duration::from_millis(300)));
    }

    #[test]
    fn ignores_destination_after_timeout() {
        let (mut app, _dir) = setup();
        let now = Instant::now();
        handle_key_event(&mut app, char_key('g'), now);
        let late = now + Duration::from_millis(1600);
        app.tick(late);
        handle_key_event(&mut app, char_key('t'), late);
        assert_eq!(app.view.destination, Destination::Dashboard);
    }

    #[test]
    fn swallows_unknown_key_when_chord_pending() {
        let (mut app, _dir) = setup();
        let now = Instant::now();
        handle_key_event(&mut app, char_key('g'), now);
        // 'q' would quit on the page; inside the chord it only cancels it
        let action = handle_key_event(&mut app, char_key('q'), now);
        assert_eq!(action, KeyAction::Continue);
        assert!(!app.chord.is_pending(now));
    }

    #[test]
    fn palette_consumes_leader_and_page_keys() {
        let (mut app, _dir) = setup();
        let now = Instant::now();
        handle_key_event(&mut app, ctrl_key('k'), now);
        assert!(app.is_modal_open());

        for c in "gq".chars() {
            assert_eq!(handle_key_event(&mut app, char_key(c), now), KeyAction::Continue);
        }
        assert_eq!(palette_query(&mut app), "gq");
        assert!(!app.chord.is_pending(now));

        handle_key_event(&mut app, ctrl_key('k'), now);
        assert!(!app.is_modal_open());
        assert_eq!(app.dispatcher.context(false), CaptureContext::None);
    }

    #[test]
    fn closes_palette_on_escape() {
        let (mut app, _dir) = setup();
        let now = Instant::now();
        handle_key_event(&mut app, ctrl_key('k'), now);
        handle_key_event(&mut app, key(KeyCode::Esc), now);
        assert!(!app.is_modal_open());
    }

    #[test]
    fn keeps_list_keys_when_inline_editor_open() {
        let (mut app, _dir) = setup();
        let now = Instant::now();
        app.navigate(Destination::Notes, now);
        handle_key_event(&mut app, char_key('e'), now);
        assert!(app.inline_edit.is_some());

        handle_key_event(&mut app, char_key('j'), now);
        handle_key_event(&mut app, char_key('g'), now);
        assert_eq!(app.inline_edit.as_ref().map(|e| e.buffer.as_str()), Some("jg"));
        assert!(!app.chord.is_pending(now));
        assert_eq!(app.list.focus().get(), None);

        handle_key_event(&mut app, key(KeyCode::Esc), now);
        assert!(app.inline_edit.is_none());
        assert_eq!(app.scratch_note, "");
    }

    #[test]
    fn opens_palette_when_ctrl_k_in_editor() {
        let (mut app, _dir) = setup();
        let now = Instant::now();
        app.navigate(Destination::Notes, now);
        handle_key_event(&mut app, char_key('e'), now);
        handle_key_event(&mut app, ctrl_key('k'), now);
        assert!(app.inline_edit.is_none());
        assert!(app.is_modal_open());
    }

    #[test]
    fn quits_on_q_and_ctrl_q() {
        let (mut app, _dir) = setup();
        let now = Instant::now();
        assert_eq!(handle_key_event(&mut app, char_key('q'), now), KeyAction::Quit);

        let (mut app, _dir) = setup();
        handle_key_event(&mut app, ctrl_key('k'), now);
        assert_eq!(handle_key_event(&mut app, ctrl_key('q'), now), KeyAction::Quit);
    }

    #[test]
    fn drops_keys_when_dispatcher_detached() {
        let (mut app, _dir) = setup();
        let now = Instant::now();
        app.dispatcher.detach();
        handle_key_event(&mut app, char_key('g'), now);
        handle_key_event(&mut app, ctrl_key('k'), now);
        assert!(!app.chord.is_pending(now));
        assert!(!app.is_modal_open());
    }

    #[test]
    fn shows_help_overlay_on_plain_page() {
        let (mut app, _dir) = setup();
        let now = Instant::now();
        handle_key_event(&mut app, char_key('?'), now);
        assert!(app.presentation.help_visible(now));
        handle_key_event(&mut app, key(KeyCode::Esc), now);
        assert!(!app.presentation.help_visible(now));
    }
}
