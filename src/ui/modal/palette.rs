//! Command palette modal: query line, result list and create preview.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

use crate::search::{CreateStatus, Palette, PaletteTarget, QueryMode};
use crate::ui::truncate_str;

/// Widget for rendering the command palette
pub struct PaletteModal<'a> {
    palette: &'a Palette,
}

impl<'a> PaletteModal<'a> {
    pub fn new(palette: &'a Palette) -> Self {
        Self { palette }
    }

    /// Calculate the modal area (centered, 70% width, 60% height)
    pub fn calculate_area(total: Rect) -> Rect {
        let width = (total.width * 70 / 100)
            .max(50)
            .min(total.width.saturating_sub(4));
        let height = (total.height * 60 / 100)
            .max(12)
            .min(total.height.saturating_sub(4));

        let x = (total.width.saturating_sub(width)) / 2;
        let y = (total.height.saturating_sub(height)) / 2;

        Rect::new(x, y, width, height)
    }
}

impl Widget for PaletteModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 40 || area.height < 10 {
            return;
        }

        Clear.render(area, buf);

        let block = Block::default()
            .title(" Command Palette ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::vertical([
            Constraint::Length(3), // Query input
            Constraint::Min(3),    // Results or preview
            Constraint::Length(1), // Help bar
        ])
        .split(inner);

        self.render_query(chunks[0], buf);
        self.render_body(chunks[1], buf);
        self.render_help_bar(chunks[2], buf);
    }
}

impl PaletteModal<'_> {
    fn render_query(&self, area: Rect, buf: &mut Buffer) {
        let (title, border) = match self.palette.status() {
            CreateStatus::Failed { .. } => (" Error ", Color::Red),
            CreateStatus::InFlight { .. } => (" Creating... ", Color::DarkGray),
            CreateStatus::Succeeded { .. } => (" Done ", Color::Green),
            CreateStatus::Idle => (" > ", Color::Yellow),
        };
        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title);
        let input_inner = input_block.inner(area);
        input_block.render(area, buf);

        let text = match self.palette.status() {
            CreateStatus::Succeeded { message } => message.as_str(),
            _ => self.palette.display_query(),
        };

        if !matches!(self.palette.status(), CreateStatus::Idle) {
            let color = match self.palette.status() {
                CreateStatus::Failed { .. } => Color::Red,
                CreateStatus::Succeeded { .. } => Color::Green,
                _ => Color::DarkGray,
            };
            Paragraph::new(text)
                .style(Style::default().fg(color))
                .render(input_inner, buf);
            return;
        }

        // Scroll horizontally so the cursor stays visible
        let available = input_inner.width as usize;
        if available == 0 {
            return;
        }
        let cursor = self.palette.cursor_pos();
        let start = (cursor + 1).saturating_sub(available);
        let visible: Vec<char> = text.chars().skip(start).take(available).collect();
        let cursor_offset = cursor - start;

        let mut spans = Vec::new();
        for (i, c) in visible.iter().enumerate() {
            if i == cursor_offset {
                spans.push(Span::styled(
                    c.to_string(),
                    Style::default().bg(Color::White).fg(Color::Black),
                ));
            } else {
                spans.push(Span::raw(c.to_string()));
            }
        }
        if cursor_offset >= visible.len() {
            spans.push(Span::styled(" ", Style::default().bg(Color::White)));
        }

        Paragraph::new(Line::from(spans)).render(input_inner, buf);
    }

    fn render_body(&self, area: Rect, buf: &mut Buffer) {
        let engine = self.palette.engine();

        if let Some(preview) = engine.create_preview() {
            Paragraph::new(Line::from(vec![
                Span::styled("+ ", Style::default().fg(Color::Green)),
                Span::raw(preview),
                Span::styled("  (Enter)", Style::default().fg(Color::DarkGray)),
            ]))
            .render(area, buf);
            return;
        }

        if engine.results().is_empty() {
            let message = if engine.is_search_pending() {
                "Searching..."
            } else {
                "No results found"
            };
            Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .render(area, buf);
            return;
        }

        let label_width = (area.width as usize).saturating_sub(20).max(10);
        let items: Vec<ListItem> = engine
            .results()
            .iter()
            .map(|entry| {
                let color = match entry.target {
                    PaletteTarget::Page(_) => Color::Cyan,
                    PaletteTarget::Command(_) => Color::Magenta,
                    PaletteTarget::Item { .. } => Color::Yellow,
                    PaletteTarget::Hint(_) => Color::Green,
                };
                let label = truncate_str(&entry.label, label_width);
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{:<width$}", label, width = label_width)),
                    Span::styled(format!(" {}", entry.detail), Style::default().fg(color)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default().with_selected(Some(engine.selected()));
        StatefulWidget::render(list, area, buf, &mut state);
    }

    fn render_help_bar(&self, area: Rect, buf: &mut Buffer) {
        let mode_hint = match self.palette.engine().mode() {
            QueryMode::QuickCreate { .. } => "create ",
            QueryMode::QuickCreateHints(_) => "complete ",
            _ => "open ",
        };
        let help_spans = vec![
            Span::styled(" C-j/C-p ", Style::default().fg(Color::Cyan)),
            Span::raw("nav "),
            Span::styled(" Enter ", Style::default().fg(Color::Cyan)),
            Span::raw(mode_hint),
            Span::styled(" / ", Style::default().fg(Color::Cyan)),
            Span::raw("quick create "),
            Span::styled(" Esc ", Style::default().fg(Color::Cyan)),
            Span::raw("close"),
        ];

        Paragraph::new(Line::from(help_spans))
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}
