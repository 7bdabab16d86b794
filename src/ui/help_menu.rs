//! Shortcut overlay shown by `?` and the palette's help command.
//!
//! Lists the global keys followed by the keys of the current page, laid out
//! in rows above the help bar. It disappears on its own after a few seconds.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::input::Destination;

const ENTRIES_PER_ROW: usize = 5;

/// A single keybinding entry for display
struct HelpEntry {
    key: &'static str,
    label: &'static str,
}

const fn entry(key: &'static str, label: &'static str) -> HelpEntry {
    HelpEntry { key, label }
}

const GLOBAL: &[HelpEntry] = &[
    entry("C-k", "palette"),
    entry("g", "go to..."),
    entry("?", "help"),
    entry("q", "quit"),
    entry("C-q", "quit"),
];

const LIST: &[HelpEntry] = &[
    entry("j/k", "move"),
    entry("Home/G", "first/last"),
    entry("Enter", "open"),
    entry("c", "complete"),
    entry("e", "edit"),
    entry("d", "delete"),
    entry("s", "snooze"),
    entry("y", "duplicate"),
    entry("Space", "status"),
    entry("x", "select"),
    entry("C/D/S", "batch"),
    entry("Esc", "clear"),
];

pub struct HelpMenuWidget {
    destination: Destination,
    /// Project drill-down is open (Backspace goes back)
    in_project: bool,
}

impl HelpMenuWidget {
    pub fn new(destination: Destination, in_project: bool) -> Self {
        Self {
            destination,
            in_project,
        }
    }

    /// Positioned at the bottom of the screen, above the help bar
    pub fn calculate_area(&self, screen: Rect) -> Rect {
        let row_count = self.entries().len().div_ceil(ENTRIES_PER_ROW);
        let height = row_count as u16 + 2; // +2 for top border + padding
        let y = screen.height.saturating_sub(height + 1); // +1 for help bar

        Rect {
            x: 0,
            y,
            width: screen.width,
            height,
        }
    }

    fn page_entries(&self) -> Vec<&'static HelpEntry> {
        const FOCUS: &[HelpEntry] = &[entry("Enter", "start focus")];
        const OVERDUE: &[HelpEntry] = &[entry("o", "overdue sweep")];
        const REVIEW: &[HelpEntry] = &[entry("v", "review queue")];
        const NOTES: &[HelpEntry] = &[entry("e", "scratch note")];
        const PROJECT: &[HelpEntry] = &[entry("Bksp", "back")];

        let extra: &'static [HelpEntry] = match self.destination {
            Destination::Focus => FOCUS,
            Destination::Reminders => OVERDUE,
            Destination::ActionQueue => REVIEW,
            Destination::Notes => NOTES,
            Destination::Projects if self.in_project => PROJECT,
            _ => &[],
        };
        extra.iter().collect()
    }

    fn entries(&self) -> Vec<&'static HelpEntry> {
        let mut entries: Vec<&'static HelpEntry> = GLOBAL.iter().collect();
        if crate::app::list_kind(self.destination).is_some() {
            entries.extend(LIST.iter());
        }
        entries.extend(self.page_entries());
        entries
    }

    fn build_lines(&self) -> Vec<Line<'static>> {
        self.entries()
            .chunks(ENTRIES_PER_ROW)
            .map(|chunk| {
                let spans: Vec<Span> = chunk
                    .iter()
                    .flat_map(|entry| {
                        [
                            Span::styled(
                                format!(" {} ", entry.key),
                                Style::default()
                                    .fg(Color::Cyan)
                                    .add_modifier(Modifier::BOLD),
                            ),
                            Span::styled(
                                format!("{} ", entry.label),
                                Style::default().fg(Color::White),
                            ),
                        ]
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

impl Widget for HelpMenuWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                format!(" ? | {} ", self.destination.label()),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ))
            .style(Style::default().bg(Color::Black));

        Paragraph::new(self.build_lines())
            .block(block)
            .style(Style::default().bg(Color::Black))
            .render(area, buf);
    }
}
