//! Quick-create grammar: `<prefix> <free text>`.
//!
//! Each registered prefix produces exactly one create payload whose title is
//! the free text and whose remaining fields come from a fixed per-kind default
//! set.

use chrono::{DateTime, Local};

use crate::crud::{EntityKind, ItemStatus, NewItem, Priority};
use crate::triage::SnoozeOption;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickCreateKind {
    Task,
    Reminder,
    Note,
}

impl QuickCreateKind {
    pub fn entity(&self) -> EntityKind {
        match self {
            QuickCreateKind::Task => EntityKind::Task,
            QuickCreateKind::Reminder => EntityKind::Reminder,
            QuickCreateKind::Note => EntityKind::Note,
        }
    }

    /// Build the create payload for `text` with this kind's default fields
    pub fn build(&self, text: &str, now: &DateTime<Local>) -> NewItem {
        let base = NewItem {
            kind: self.entity(),
            title: text.trim().to_string(),
            status: ItemStatus::Todo,
            priority: Priority::Medium,
            due: None,
            tags: Vec::new(),
            project_id: None,
        };
        match self {
            QuickCreateKind::Task => NewItem {
                tags: vec!["inbox".to_string()],
                ..base
            },
            QuickCreateKind::Reminder => NewItem {
                priority: Priority::Low,
                due: SnoozeOption::Tomorrow.resolve_at(now).ok(),
                ..base
            },
            QuickCreateKind::Note => NewItem {
                priority: Priority::Low,
                tags: vec!["scratch".to_string()],
                ..base
            },
        }
    }
}

/// A registered quick-create command
#[derive(Debug, Clone)]
pub struct QuickCreateCommand {
    pub kind: QuickCreateKind,
    /// Prefix word without the sentinel, e.g. `task`
    pub prefix: &'static str,
    pub description: &'static str,
}

/// Parse result for a query that starts with the sentinel
#[derive(Debug, Clone, PartialEq)]
pub enum QuickCreateParse {
    /// Complete command with non-empty text
    Create { kind: QuickCreateKind, text: String },
    /// Hints for every command whose prefix matches what was typed
    Hints(Vec<QuickCreateKind>),
    /// Not a quick-create query at all
    NotQuickCreate,
}

#[derive(Debug, Clone)]
pub struct QuickCreateRegistry {
    sentinel: char,
    commands: Vec<QuickCreateCommand>,
}

impl Default for QuickCreateRegistry {
    fn default() -> Self {
        Self::new('/')
    }
}

impl QuickCreateRegistry {
    pub fn new(sentinel: char) -> Self {
        Self {
            sentinel,
            commands: vec![
                QuickCreateCommand {
                    kind: QuickCreateKind::Task,
                    prefix: "task",
                    description: "Create a task in the inbox",
                },
                QuickCreateCommand {
                    kind: QuickCreateKind::Reminder,
                    prefix: "reminder",
                    description: "Remind me tomorrow at 09:00",
                },
                QuickCreateCommand {
                    kind: QuickCreateKind::Note,
                    prefix: "note",
                    description: "Capture a note",
                },
            ],
        }
    }

    pub fn sentinel(&self) -> char {
        self.sentinel
    }

    pub fn commands(&self) -> &[QuickCreateCommand] {
        &self.commands
    }

    pub fn command(&self, kind: QuickCreateKind) -> Option<&QuickCreateCommand> {
        self.commands.iter().find(|c| c.kind == kind)
    }

    /// Full prefix including the sentinel, e.g. `/task`
    pub fn full_prefix(&self, kind: QuickCreateKind) -> String {
        self.command(kind)
            .map(|c| format!("{}{}", self.sentinel, c.prefix))
            .unwrap_or_default()
    }

    pub fn parse(&self, query: &str) -> QuickCreateParse {
        let Some(rest) = query.strip_prefix(self.sentinel) else {
            return QuickCreateParse::NotQuickCreate;
        };

        let (word, text) = match rest.find(char::is_whitespace) {
            Some(idx) => (&rest[..idx], rest[idx..].trim()),
            None => (rest, ""),
        };
        let word = word.to_lowercase();

        if !text.is_empty() {
            if let Some(cmd) = self.commands.iter().find(|c| c.prefix == word) {
                return QuickCreateParse::Create {
                    kind: cmd.kind,
                    text: text.to_string(),
                };
            }
            return QuickCreateParse::NotQuickCreate;
        }

        let hints: Vec<QuickCreateKind> = self
            .commands
            .iter()
            .filter(|c| c.prefix.starts_with(&word))
            .map(|c| c.kind)
            .collect();
        if hints.is_empty() {
            QuickCreateParse::NotQuickCreate
        } else {
            QuickCreateParse::Hints(hints)
        }
    }
}
