//! List page widget: one row per item with focus highlight and selection marks.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

use crate::crud::{Item, ItemStatus, Priority};
use crate::list::ItemListController;
use crate::ui::truncate_str;

pub struct ItemListWidget<'a> {
    list: &'a ItemListController,
    title: String,
    /// Whether the page has the keyboard (no modal on top)
    active: bool,
}

impl<'a> ItemListWidget<'a> {
    pub fn new(list: &'a ItemListController, title: impl Into<String>, active: bool) -> Self {
        Self {
            list,
            title: title.into(),
            active,
        }
    }
}

impl Widget for ItemListWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.active {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let selected = self.list.selection().len();
        let mut title = format!(" {} ({}) ", self.title, self.list.rows().len());
        if selected > 0 {
            title.push_str(&format!("[{} selected] ", selected));
        }
        if self.list.is_batch_in_flight() {
            title.push_str("[working...] ");
        }

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        if self.list.rows().is_empty() {
            Paragraph::new("Nothing here yet")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .render(inner, buf);
            return;
        }

        let width = inner.width as usize;
        let items: Vec<ListItem> = self
            .list
            .rows()
            .iter()
            .map(|item| ListItem::new(row_line(item, self.list.is_selected(item.id), width)))
            .collect();

        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default()
            .with_offset(self.list.scroll_offset())
            .with_selected(self.list.focus().get());
        StatefulWidget::render(list, inner, buf, &mut state);
    }
}

fn status_span(status: ItemStatus) -> Span<'static> {
    let (symbol, color) = match status {
        ItemStatus::Todo => ("○", Color::White),
        ItemStatus::InProgress => ("◐", Color::Yellow),
        ItemStatus::Waiting => ("◌", Color::Magenta),
        ItemStatus::Done => ("●", Color::Green),
    };
    Span::styled(symbol, Style::default().fg(color))
}

fn priority_span(priority: Priority) -> Span<'static> {
    match priority {
        Priority::High => Span::styled("!!", Style::default().fg(Color::Red)),
        Priority::Medium => Span::styled("! ", Style::default().fg(Color::Yellow)),
        Priority::Low => Span::raw("  "),
    }
}

/// One rendered row
fn row_line(item: &Item, selected: bool, width: usize) -> Line<'static> {
    let mark = if selected { "[x] " } else { "[ ] " };
    let due = item
        .due
        .map(|d| format!("  {}", d.format("%b %-d %H:%M")))
        .unwrap_or_default();
    let room = width.saturating_sub(12 + due.chars().count());

    let title_style = if item.status.is_done() {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::styled(mark, Style::default().fg(Color::Cyan)),
        status_span(item.status),
        Span::raw(" "),
        priority_span(item.priority),
        Span::raw(" "),
        Span::styled(truncate_str(&item.title, room), title_style),
        Span::styled(due, Style::default().fg(Color::DarkGray)),
    ])
}
