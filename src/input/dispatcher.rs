//! Global keystroke dispatcher.
//!
//! A single dispatcher sees every keystroke and hands it to exactly one
//! consumer. It is an ordinary value: the application root constructs it and
//! attaches it, and tests can spin up as many independent instances as they
//! like.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{CaptureContext, KeyTarget, Keystroke};

/// Where a keystroke should be delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The open modal's own handler
    Modal,
    /// The chord navigator (leader press or pending destination key)
    Chord,
    /// The active page's list/command handler
    Page,
    /// The focused text control consumes the key itself
    Field,
    /// Nobody interprets the key (dispatcher detached)
    Dropped,
}

#[derive(Debug, Clone)]
pub struct InputDispatcher {
    attached: bool,
    modal_depth: usize,
    text_editing: bool,
    leader: char,
    palette_toggle: KeyEvent,
}

impl InputDispatcher {
    /// Create a detached dispatcher with the given leader key
    pub fn new(leader: char) -> Self {
        Self {
            attached: false,
            modal_depth: 0,
            text_editing: false,
            leader,
            palette_toggle: KeyEvent::new(KeyCode::Char('k'), KeyModifiers::CONTROL),
        }
    }

    /// Start interpreting keystrokes
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Stop interpreting keystrokes and forget all capture state
    pub fn detach(&mut self) {
        self.attached = false;
        self.modal_depth = 0;
        self.text_editing = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn leader(&self) -> char {
        self.leader
    }

    pub fn push_modal(&mut self) {
        self.modal_depth += 1;
    }

    pub fn pop_modal(&mut self) {
        self.modal_depth = self.modal_depth.saturating_sub(1);
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_depth > 0
    }

    pub fn begin_text_edit(&mut self) {
        self.text_editing = true;
    }

    pub fn end_text_edit(&mut self) {
        self.text_editing = false;
    }

    /// The single active capture context
    pub fn context(&self, chord_pending: bool) -> CaptureContext {
        if self.modal_depth > 0 {
            CaptureContext::ModalOpen
        } else if self.text_editing {
            CaptureContext::TextEditing
        } else if chord_pending {
            CaptureContext::ChordPending
        } else {
            CaptureContext::None
        }
    }

    /// Keys that stay eligible even while a text field has focus
    pub fn is_always_on(&self, key: &KeyEvent) -> bool {
        key.code == KeyCode::Esc || self.is_palette_toggle(key)
    }

    pub fn is_palette_toggle(&self, key: &KeyEvent) -> bool {
        key.code == self.palette_toggle.code && key.modifiers == self.palette_toggle.modifiers
    }

    /// Decide which consumer gets this keystroke
    pub fn route(&self, stroke: &Keystroke, chord_pending: bool) -> Route {
        if !self.attached {
            return Route::Dropped;
        }

        if stroke.target == KeyTarget::TextField && !self.is_always_on(&stroke.key) {
            return Route::Field;
        }

        match self.context(chord_pending) {
            CaptureContext::ModalOpen => Route::Modal,
            CaptureContext::ChordPending => Route::Chord,
            CaptureContext::None
                if stroke.plain_char() == Some(self.leader) && stroke.key.modifiers.is_empty() =>
            {
                Route::Chord
            }
            CaptureContext::None | CaptureContext::TextEditing => Route::Page,
        }
    }
}
