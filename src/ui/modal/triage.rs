//! Triage modal: one item at a time, with a summary once the queue is done.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::app::TriageView;
use crate::crud::Priority;
use crate::triage::SnoozeOption;

pub struct TriageModal<'a> {
    view: &'a TriageView,
    /// Between items; the next one is dimmed until it takes keys
    transitioning: bool,
}

impl<'a> TriageModal<'a> {
    pub fn new(view: &'a TriageView, transitioning: bool) -> Self {
        Self {
            view,
            transitioning,
        }
    }

    /// Centered, 60% width, fixed height
    pub fn calculate_area(total: Rect) -> Rect {
        let width = (total.width * 60 / 100)
            .max(44)
            .min(total.width.saturating_sub(4));
        let height = 14.min(total.height.saturating_sub(2));

        let x = (total.width.saturating_sub(width)) / 2;
        let y = (total.height.saturating_sub(height)) / 2;

        Rect::new(x, y, width, height)
    }
}

impl Widget for TriageModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 30 || area.height < 8 {
            return;
        }

        Clear.render(area, buf);

        let session = &self.view.session;
        let done = session.initial_len() - session.remaining();
        let title = format!(
            " {} ({}/{}) ",
            session.kind().title(),
            done,
            session.initial_len()
        );
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::vertical([
            Constraint::Min(4),    // Item or summary
            Constraint::Length(1), // Counts
            Constraint::Length(1), // Error / status
            Constraint::Length(1), // Help bar
        ])
        .split(inner);

        if session.is_terminal() {
            self.render_summary(chunks[0], buf);
        } else {
            self.render_current(chunks[0], buf);
        }
        self.render_counts(chunks[1], buf);
        self.render_status(chunks[2], buf);
        self.render_help_bar(chunks[3], buf);
    }
}

impl TriageModal<'_> {
    fn render_current(&self, area: Rect, buf: &mut Buffer) {
        let Some(current) = self.view.session.current() else {
            return;
        };
        let item = &current.payload;

        let title_style = if self.transitioning {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let priority_color = match item.priority {
            Priority::High => Color::Red,
            Priority::Medium => Color::Yellow,
            Priority::Low => Color::DarkGray,
        };
        let due = item
            .due
            .map(|d| d.format("%a %b %-d, %H:%M").to_string())
            .unwrap_or_else(|| "no due date".to_string());

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(item.title.clone(), title_style)),
            Line::from(vec![
                Span::styled(
                    format!("{:?}", item.priority),
                    Style::default().fg(priority_color),
                ),
                Span::raw("  ·  "),
                Span::raw(item.status.display_name()),
                Span::raw("  ·  "),
                Span::styled(due, Style::default().fg(Color::Cyan)),
            ]),
        ];

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }

    fn render_summary(&self, area: Rect, buf: &mut Buffer) {
        let counts = self.view.session.counts();
        let headline = if self.view.session.initial_len() == 0 {
            "Nothing to triage"
        } else {
            "All done"
        };
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                headline,
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(
                "{} completed, {} snoozed, {} skipped",
                counts.completed, counts.snoozed, counts.skipped
            )),
            Line::from(Span::styled(
                "Press Enter to close",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_counts(&self, area: Rect, buf: &mut Buffer) {
        let counts = self.view.session.counts();
        Paragraph::new(Line::from(vec![
            Span::styled(format!("✓ {}", counts.completed), Style::default().fg(Color::Green)),
            Span::raw("   "),
            Span::styled(format!("⏰ {}", counts.snoozed), Style::default().fg(Color::Cyan)),
            Span::raw("   "),
            Span::styled(format!("→ {}", counts.skipped), Style::default().fg(Color::Yellow)),
        ]))
        .alignment(Alignment::Center)
        .render(area, buf);
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        let line = if let Some(error) = &self.view.error {
            Line::from(Span::styled(
                format!("Failed: {} (try again)", error),
                Style::default().fg(Color::Red),
            ))
        } else if self.view.session.is_in_flight() {
            Line::from(Span::styled("Saving...", Style::default().fg(Color::DarkGray)))
        } else {
            Line::from("")
        };
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_help_bar(&self, area: Rect, buf: &mut Buffer) {
        let key_style = Style::default().fg(Color::Cyan);
        let mut spans = Vec::new();
        if self.view.session.is_terminal() {
            spans.push(Span::styled(" Enter ", key_style));
            spans.push(Span::raw("close"));
        } else {
            spans.push(Span::styled(" c ", key_style));
            spans.push(Span::raw("complete "));
            spans.push(Span::styled(" s ", key_style));
            spans.push(Span::raw("skip "));
            for option in SnoozeOption::ALL {
                spans.push(Span::styled(format!(" {} ", option.key()), key_style));
                spans.push(Span::raw(format!("{} ", option.label())));
            }
            spans.push(Span::styled(" Esc ", key_style));
            spans.push(Span::raw("close"));
        }

        Paragraph::new(Line::from(spans))
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}
