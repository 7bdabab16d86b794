use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Split the screen into tab bar, page body and help bar
pub fn create_page_layout(area: Rect) -> (Rect, Rect, Rect) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    (vertical[0], vertical[1], vertical[2])
}

/// Split the Notes page into the note list and the scratch-note panel
pub fn create_notes_layout(area: Rect) -> (Rect, Rect) {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    (horizontal[0], horizontal[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_layout_reserves_one_line_bars() {
        let (tabs, body, help) = create_page_layout(Rect::new(0, 0, 80, 24));
        assert_eq!(tabs.height, 1);
        assert_eq!(help.height, 1);
        assert_eq!(body.height, 22);
        assert_eq!(help.y, 23);
    }
}
