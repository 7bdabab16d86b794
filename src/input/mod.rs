//! Keyboard input routing.
//!
//! This module decides which part of the UI gets to interpret a keystroke:
//! - **Dispatcher**: eligibility and priority routing (modal, chord, page)
//! - **Chord**: leader key followed by a destination key

pub mod chord;
pub mod dispatcher;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub use chord::{ChordConfig, ChordNavigator, ChordOutcome, ChordState, Destination};
pub use dispatcher::{InputDispatcher, Route};

/// Which capture context currently owns the keyboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaptureContext {
    /// Nothing is capturing; page shortcuts and the leader key are live
    #[default]
    None,
    /// A modal (palette, triage, help) owns the keyboard
    ModalOpen,
    /// An inline editor or form field has input focus
    TextEditing,
    /// The leader key was pressed and a destination key is awaited
    ChordPending,
}

impl CaptureContext {
    /// Returns the display name for the status line
    pub fn display_name(&self) -> &'static str {
        match self {
            CaptureContext::None => "NORMAL",
            CaptureContext::ModalOpen => "MODAL",
            CaptureContext::TextEditing => "INSERT",
            CaptureContext::ChordPending => "LEADER",
        }
    }
}

/// What kind of control had focus when the key was pressed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyTarget {
    /// A non-editable surface (lists, pages, modal chrome)
    #[default]
    Surface,
    /// A text-editing control (palette input, inline editor)
    TextField,
}

/// A key event together with the control it was aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keystroke {
    pub key: KeyEvent,
    pub target: KeyTarget,
}

impl Keystroke {
    pub fn new(key: KeyEvent, target: KeyTarget) -> Self {
        Self { key, target }
    }

    /// Keystroke aimed at a non-editable surface
    pub fn surface(key: KeyEvent) -> Self {
        Self::new(key, KeyTarget::Surface)
    }

    /// The character typed, if this is a plain (unmodified or shifted) char key
    pub fn plain_char(&self) -> Option<char> {
        match self.key.code {
            KeyCode::Char(c)
                if self.key.modifiers.difference(KeyModifiers::SHIFT).is_empty() =>
            {
                Some(c)
            }
            _ => None,
        }
    }

    pub fn has_modifiers(&self) -> bool {
        !self.key.modifiers.difference(KeyModifiers::SHIFT).is_empty()
    }

    pub fn is_escape(&self) -> bool {
        self.key.code == KeyCode::Esc
    }
}

/// Build a key event from a code with no modifiers (test and config helper)
pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// Build a plain character key event
pub fn char_key(c: char) -> KeyEvent {
    let modifiers = if c.is_ascii_uppercase() {
        KeyModifiers::SHIFT
    } else {
        KeyModifiers::NONE
    };
    KeyEvent::new(KeyCode::Char(c), modifiers)
}

/// Build a Ctrl+<c> key event
pub fn ctrl_key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_char_accepts_shifted_letters_only() {
        assert_eq!(Keystroke::surface(char_key('C')).plain_char(), Some('C'));
        assert_eq!(Keystroke::surface(char_key('c')).plain_char(), Some('c'));
        assert_eq!(Keystroke::surface(ctrl_key('c')).plain_char(), None);
        assert_eq!(Keystroke::surface(key(KeyCode::Enter)).plain_char(), None);
    }

    #[test]
    fn has_modifiers_ignores_shift() {
        assert!(!Keystroke::surface(char_key('S')).has_modifiers());
        assert!(Keystroke::surface(ctrl_key('k')).has_modifiers());
    }

    #[test]
    fn display_name_matches_each_context() {
        assert_eq!(CaptureContext::None.display_name(), "NORMAL");
        assert_eq!(CaptureContext::TextEditing.display_name(), "INSERT");
        assert_eq!(CaptureContext::ChordPending.display_name(), "LEADER");
    }
}
