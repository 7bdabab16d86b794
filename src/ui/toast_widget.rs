//! Stacked toast rendering in the bottom-right corner.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::ui::toast::{Toast, ToastType};
use crate::ui::truncate_str;

const MIN_WIDTH: u16 = 16;
const MAX_WIDTH: u16 = 48;
const TOAST_HEIGHT: u16 = 3;

pub struct ToastWidget<'a> {
    toasts: &'a [&'a Toast],
}

impl<'a> ToastWidget<'a> {
    pub fn new(toasts: &'a [&'a Toast]) -> Self {
        Self { toasts }
    }

    /// Where the `index`-th toast goes, counting up from the bottom
    fn slot(area: Rect, width: u16, index: u16) -> Rect {
        let offset = index * (TOAST_HEIGHT + 1);
        let x = area.right().saturating_sub(width + 2);
        let y = area.bottom().saturating_sub(TOAST_HEIGHT + 2 + offset);
        Rect::new(x, y, width.min(area.width), TOAST_HEIGHT.min(area.height))
    }

    fn width_for(toast: &Toast) -> u16 {
        let text = toast.message.chars().count().min(MAX_WIDTH as usize) as u16 + 6; // icon, padding, borders
        text.clamp(MIN_WIDTH, MAX_WIDTH)
    }
}

fn icon(toast_type: ToastType) -> &'static str {
    match toast_type {
        ToastType::Info => "ℹ",
        ToastType::Success => "✓",
        ToastType::Warning => "⚠",
        ToastType::Error => "✗",
    }
}

fn accent(toast_type: ToastType) -> Color {
    match toast_type {
        ToastType::Info => Color::Cyan,
        ToastType::Success => Color::Green,
        ToastType::Warning => Color::Yellow,
        ToastType::Error => Color::Red,
    }
}

impl Widget for ToastWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (index, toast) in self.toasts.iter().enumerate() {
            let width = Self::width_for(toast);
            let slot = Self::slot(area, width, index as u16);
            if slot.y < area.top() || slot.height < TOAST_HEIGHT {
                break;
            }

            Clear.render(slot, buf);

            let style = Style::default().fg(accent(toast.toast_type));
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .style(Style::default().bg(Color::Black));

            let room = slot.width.saturating_sub(6) as usize;
            Paragraph::new(Line::from(vec![
                Span::styled(icon(toast.toast_type), style.add_modifier(Modifier::BOLD)),
                Span::raw(" "),
                Span::raw(truncate_str(&toast.message, room)),
            ]))
            .block(block)
            .render(slot, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    fn width_grows_with_message_within_bounds() {
        let now = Instant::now();
        let short = Toast::new(1, "ok", ToastType::Info, now);
        let long = Toast::new(2, "x".repeat(200), ToastType::Error, now);
        assert_eq!(ToastWidget::width_for(&short), MIN_WIDTH);
        assert_eq!(ToastWidget::width_for(&long), MAX_WIDTH);
    }

    #[test]
    fn toasts_stack_upwards() {
        let area = Rect::new(0, 0, 100, 30);
        let first = ToastWidget::slot(area, 20, 0);
        let second = ToastWidget::slot(area, 20, 1);
        assert_eq!(first.x, 78);
        assert_eq!(first.y, 25);
        assert_eq!(second.y, 21);
    }
}
