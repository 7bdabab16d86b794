//! Chord hint popup listing the destinations reachable from the leader key.
//!
//! Rendered at the bottom of the screen while a chord is pending.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::input::ChordConfig;

/// Destinations shown per row
const BINDINGS_PER_ROW: usize = 5;

pub struct ChordHintWidget<'a> {
    config: &'a ChordConfig,
}

impl<'a> ChordHintWidget<'a> {
    pub fn new(config: &'a ChordConfig) -> Self {
        Self { config }
    }

    /// Positioned at the bottom of the screen, above the help bar
    pub fn calculate_area(screen: Rect, binding_count: usize) -> Rect {
        let rows = binding_count.div_ceil(BINDINGS_PER_ROW).max(1) as u16;
        let height = rows + 1; // + top border
        let y = screen.height.saturating_sub(height + 1); // +1 for help bar

        Rect {
            x: 0,
            y,
            width: screen.width,
            height,
        }
    }

    fn build_title(&self) -> String {
        format!("{} | Go to", self.config.leader)
    }

    fn build_lines(&self) -> Vec<Line<'a>> {
        if self.config.bindings.is_empty() {
            return vec![Line::from("No destinations")];
        }

        self.config
            .bindings
            .chunks(BINDINGS_PER_ROW)
            .map(|chunk| {
                let spans: Vec<Span> = chunk
                    .iter()
                    .flat_map(|binding| {
                        [
                            Span::styled(
                                format!(" {} ", binding.key),
                                Style::default()
                                    .fg(Color::Cyan)
                                    .add_modifier(Modifier::BOLD),
                            ),
                            Span::styled(
                                format!("{:<14}", binding.destination.label()),
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

impl Widget for ChordHintWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                format!(" {} ", self.build_title()),
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
