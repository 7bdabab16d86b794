use std::time::Instant;

use crossterm::event::KeyEvent;

use crate::app::{App, ModalState};

/// Forward a key event to the currently open modal
pub(crate) fn handle_modal_key(app: &mut App, key: KeyEvent, now: Instant) {
    match app.modal_state {
        ModalState::Palette(_) => app.handle_palette_key(key, now),
        ModalState::Triage(_) => app.handle_triage_key(key, now),
        ModalState::None => {}
    }
}
