//! Command palette state: text input over a [`SearchEngine`] plus the
//! quick-create request lifecycle.

use std::time::Instant;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::engine::SearchEngine;
use super::types::PaletteAction;

/// Where a quick-create request stands
#[derive(Debug, Clone, PartialEq)]
pub enum CreateStatus {
    Idle,
    /// Create call outstanding; further Enters are ignored
    InFlight { original: String },
    /// Created; the palette closes shortly
    Succeeded { message: String },
    /// The query line shows the error until the original text comes back
    Failed { error: String, original: String },
}

/// Result of a key handled by the palette input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteKeyResult {
    Continue,
    QueryChanged,
    /// Enter pressed; the caller should call [`Palette::activate`]
    Activate,
    Close,
}

pub struct Palette {
    /// Distinguishes this palette from earlier ones; results tagged with
    /// another id are dropped
    id: u64,
    engine: SearchEngine,
    /// Cursor position in characters
    cursor_pos: usize,
    status: CreateStatus,
}

impl Palette {
    pub fn new(id: u64, engine: SearchEngine) -> Self {
        Self {
            id,
            engine,
            cursor_pos: 0,
            status: CreateStatus::Idle,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SearchEngine {
        &mut self.engine
    }

    pub fn status(&self) -> &CreateStatus {
        &self.status
    }

    pub fn cursor_pos(&self) -> usize {
        self.cursor_pos
    }

    /// Text shown on the query line
    pub fn display_query(&self) -> &str {
        match &self.status {
            CreateStatus::Failed { error, .. } => error,
            _ => self.engine.query(),
        }
    }

    pub fn is_create_in_flight(&self) -> bool {
        matches!(self.status, CreateStatus::InFlight { .. })
    }

    /// Replace the whole query and put the cursor at the end
    pub fn set_query(&mut self, text: impl Into<String>, now: Instant) {
        let text = text.into();
        self.cursor_pos = text.chars().count();
        self.engine.set_query(text, now);
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> PaletteKeyResult {
        if key.code == KeyCode::Esc {
            return PaletteKeyResult::Close;
        }

        match self.status {
            CreateStatus::InFlight { .. } | CreateStatus::Succeeded { .. } => {
                return PaletteKeyResult::Continue;
            }
            // Typing over an error brings the original text back first
            CreateStatus::Failed { .. } => self.restore_after_error(),
            CreateStatus::Idle => {}
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Down => self.engine.move_selection(1),
            KeyCode::Up => self.engine.move_selection(-1),
            KeyCode::Char('j') if ctrl => self.engine.move_selection(1),
            KeyCode::Char('k') if ctrl => return PaletteKeyResult::Close,
            KeyCode::Char('p') if ctrl => self.engine.move_selection(-1),
            KeyCode::Enter => return PaletteKeyResult::Activate,
            KeyCode::Char(c) if !ctrl => {
                let mut query = self.engine.query().to_string();
                query.insert(byte_index(&query, self.cursor_pos), c);
                self.cursor_pos += 1;
                self.engine.set_query(query, now);
                return PaletteKeyResult::QueryChanged;
            }
            KeyCode::Backspace if self.cursor_pos > 0 => {
                let mut query = self.engine.query().to_string();
                self.cursor_pos -= 1;
                query.remove(byte_index(&query, self.cursor_pos));
                self.engine.set_query(query, now);
                return PaletteKeyResult::QueryChanged;
            }
            KeyCode::Delete if self.cursor_pos < self.engine.query().chars().count() => {
                let mut query = self.engine.query().to_string();
                query.remove(byte_index(&query, self.cursor_pos));
                self.engine.set_query(query, now);
                return PaletteKeyResult::QueryChanged;
            }
            KeyCode::Left => self.cursor_pos = self.cursor_pos.saturating_sub(1),
            KeyCode::Right => {
                self.cursor_pos = (self.cursor_pos + 1).min(self.engine.query().chars().count());
            }
            KeyCode::Home => self.cursor_pos = 0,
            KeyCode::End => self.cursor_pos = self.engine.query().chars().count(),
            _ => {}
        }
        PaletteKeyResult::Continue
    }

    /// Resolve Enter. A quick-create moves the palette into the in-flight
    /// state; a hint row fills in its prefix.
    pub fn activate(&mut self, now: Instant, wall: &DateTime<Local>) -> PaletteAction {
        if !matches!(self.status, CreateStatus::Idle) {
            return PaletteAction::None;
        }

        let action = self.engine.activate(wall);
        match &action {
            PaletteAction::QuickCreate(_) => {
                self.status = CreateStatus::InFlight {
                    original: self.engine.query().to_string(),
                };
            }
            PaletteAction::CompletePrefix(text) => {
                let text = text.clone();
                self.set_query(text, now);
            }
            _ => {}
        }
        action
    }

    pub fn create_succeeded(&mut self, message: impl Into<String>) {
        self.status = CreateStatus::Succeeded {
            message: message.into(),
        };
    }

    pub fn create_failed(&mut self, error: impl Into<String>) {
        let original = match &self.status {
            CreateStatus::InFlight { original } => original.clone(),
            _ => self.engine.query().to_string(),
        };
        self.status = CreateStatus::Failed {
            error: error.into(),
            original,
        };
    }

    /// Put the user's text back after an error so they can retry
    pub fn restore_after_error(&mut self) {
        if let CreateStatus::Failed { original, .. } = &self.status {
            if original != self.engine.query() {
                let original = original.clone();
                self.cursor_pos = original.chars().count();
                self.engine.set_query(original, Instant::now());
            }
            self.status = CreateStatus::Idle;
        }
    }
}

fn byte_index(s: &str, char_pos: usize) -> usize {
    s.char_indices()
        .nth(char_pos)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{char_key, key};
    use crate::search::quick_create::QuickCreateRegistry;
    use crate::search::types::PaletteEntry;
    use chrono::TimeZone;
    use std::time::Duration;

    fn palette() -> Palette {
        Palette::new(
            1,
            SearchEngine::new(
                QuickCreateRegistry::default(),
                Vec::<PaletteEntry>::new(),
                Duration::from_millis(200),
            ),
        )
    }

    fn wall() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap()
    }

    fn type_text(palette: &mut Palette, text: &str) {
        for c in text.chars() {
            palette.handle_key(char_key(c), Instant::now());
        }
    }

    #[test]
    fn typing_updates_query_and_generation() {
        let mut palette = palette();
        type_text(&mut palette, "abc");
        assert_eq!(palette.engine().query(), "abc");
        assert_eq!(palette.engine().generation(), 3);
        palette.handle_key(key(KeyCode::Backspace), Instant::now());
        assert_eq!(palette.engine().query(), "ab");
    }

    #[test]
    fn second_enter_while_creating_is_ignored() {
        let mut palette = palette();
        type_text(&mut palette, "/task Buy milk");
        assert!(matches!(
            palette.activate(Instant::now(), &wall()),
            PaletteAction::QuickCreate(_)
        ));
        assert!(palette.is_create_in_flight());
        assert_eq!(palette.activate(Instant::now(), &wall()), PaletteAction::None);
    }

    #[test]
    fn failure_shows_error_then_restores_original_text() {
        let mut palette = palette();
        type_text(&mut palette, "/task Buy milk");
        palette.activate(Instant::now(), &wall());
        palette.create_failed("Create failed: backend unavailable");
        assert_eq!(palette.display_query(), "Create failed: backend unavailable");

        palette.restore_after_error();
        assert_eq!(palette.display_query(), "/task Buy milk");
        assert_eq!(palette.status(), &CreateStatus::Idle);
        // Retry without retyping
        assert!(matches!(
            palette.activate(Instant::now(), &wall()),
            PaletteAction::QuickCreate(_)
        ));
    }

    #[test]
    fn accepting_a_hint_fills_in_the_prefix() {
        let mut palette = palette();
        type_text(&mut palette, "/rem");
        assert_eq!(
            palette.activate(Instant::now(), &wall()),
            PaletteAction::CompletePrefix("/reminder ".to_string())
        );
        assert_eq!(palette.engine().query(), "/reminder ");
        assert_eq!(palette.cursor_pos(), 10);
    }

    #[test]
    fn escape_closes_even_while_in_flight() {
        let mut palette = palette();
        type_text(&mut palette, "/note idea");
        palette.activate(Instant::now(), &wall());
        assert_eq!(
            palette.handle_key(key(KeyCode::Esc), Instant::now()),
            PaletteKeyResult::Close
        );
    }
}
