//! Types for the command palette.

use crate::crud::{EntityKind, ItemId, NewItem, SearchHit};
use crate::input::Destination;

use super::quick_create::QuickCreateKind;

/// Commands available from the palette besides page navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Work through today's tasks one at a time
    StartFocus,
    /// Triage every overdue reminder
    SweepOverdue,
    /// Review the action queue item by item
    ReviewActions,
    ShowHelp,
    Quit,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::StartFocus,
        Command::SweepOverdue,
        Command::ReviewActions,
        Command::ShowHelp,
        Command::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Command::StartFocus => "Start focus mode",
            Command::SweepOverdue => "Sweep overdue reminders",
            Command::ReviewActions => "Review action queue",
            Command::ShowHelp => "Show keyboard shortcuts",
            Command::Quit => "Quit",
        }
    }
}

/// What a palette row points at
#[derive(Debug, Clone, PartialEq)]
pub enum PaletteTarget {
    Page(Destination),
    Command(Command),
    Item { kind: EntityKind, id: ItemId },
    /// Quick-create hint row; activating it fills in the prefix
    Hint(QuickCreateKind),
}

/// A row in the palette result list
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteEntry {
    pub label: String,
    /// Secondary text (entity kind, shortcut, hint syntax)
    pub detail: String,
    pub target: PaletteTarget,
}

impl PaletteEntry {
    pub fn page(destination: Destination, chord: Option<String>) -> Self {
        Self {
            label: format!("Go to {}", destination.label()),
            detail: chord.unwrap_or_default(),
            target: PaletteTarget::Page(destination),
        }
    }

    pub fn command(command: Command) -> Self {
        Self {
            label: command.label().to_string(),
            detail: "command".to_string(),
            target: PaletteTarget::Command(command),
        }
    }

    pub fn from_hit(hit: SearchHit) -> Self {
        Self {
            label: hit.title,
            detail: hit.kind.display_name().to_string(),
            target: PaletteTarget::Item {
                kind: hit.kind,
                id: hit.id,
            },
        }
    }

    /// Case-insensitive substring match against the label
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.label.to_lowercase().contains(needle_lower)
    }
}

/// How the current query is interpreted
#[derive(Debug, Clone, PartialEq)]
pub enum QueryMode {
    /// Empty query: the static command/page list
    Commands,
    /// Sentinel (or a partial prefix): one hint row per matching command
    QuickCreateHints(Vec<QuickCreateKind>),
    /// `<prefix> <text>`: search suppressed, Enter creates
    QuickCreate { kind: QuickCreateKind, text: String },
    /// Static filter now, debounced cross-entity search later
    Search,
}

/// A debounced search ready to be sent to the collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub generation: u64,
}

/// What Enter in the palette asks the application to do
#[derive(Debug, Clone, PartialEq)]
pub enum PaletteAction {
    Navigate(Destination),
    Run(Command),
    OpenItem { kind: EntityKind, id: ItemId },
    QuickCreate(NewItem),
    /// Replace the query with this text (hint row accepted)
    CompletePrefix(String),
    None,
}
