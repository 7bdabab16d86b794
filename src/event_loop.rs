use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{poll, read, Event, KeyEventKind};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};

use crate::app::{App, EditTarget, InlineEdit, ModalState};
use crate::handlers::{handle_key_event, KeyAction};
use crate::input::{CaptureContext, Destination};
use crate::ui::layout::{create_notes_layout, create_page_layout};
use crate::ui::modal::{PaletteModal, TriageModal};
use crate::ui::{ChordHintWidget, HelpMenuWidget, ItemListWidget, ToastWidget};

/// How long to wait for input before ticking again
const TICK: Duration = Duration::from_millis(50);

pub fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Chord expiry, search debounce, job results, presentation deadlines, toasts
        let now = Instant::now();
        app.tick(now);

        terminal.draw(|f| draw_ui(f, app, now))?;

        if poll(TICK)? {
            match read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(app, key, Instant::now()) == KeyAction::Quit {
                        return Ok(());
                    }
                }
                // Next draw picks up the new size
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn draw_ui(f: &mut Frame, app: &mut App, now: Instant) {
    let (tabs_area, body_area, help_area) = create_page_layout(f.area());

    draw_tabs(f, tabs_area, app);
    draw_page(f, body_area, app);
    draw_help_bar(f, help_area, app, now);

    let toasts: Vec<_> = app.toast_manager.visible_toasts();
    if !toasts.is_empty() {
        f.render_widget(ToastWidget::new(&toasts), body_area);
    }

    if app.chord.is_pending(now) {
        let config = app.chord.config();
        let area = ChordHintWidget::calculate_area(f.area(), config.bindings.len());
        f.render_widget(ChordHintWidget::new(config), area);
    } else if app.presentation.help_visible(now) {
        let help = HelpMenuWidget::new(app.view.destination, app.view.project.is_some());
        let area = help.calculate_area(f.area());
        f.render_widget(help, area);
    }

    // Modal last (highest z-index)
    draw_modal(f, app, now);
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Destination::ALL
        .iter()
        .map(|d| Line::from(d.label()))
        .collect();
    let selected = Destination::ALL
        .iter()
        .position(|d| *d == app.view.destination)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider("|");
    f.render_widget(tabs, area);
}

fn draw_page(f: &mut Frame, area: Rect, app: &mut App) {
    let active = !app.is_modal_open();

    if app.view.list_identity().is_none() {
        draw_placeholder(f, area, app.view.destination);
        return;
    }

    let list_area = if app.view.destination == Destination::Notes {
        let (list_area, scratch_area) = create_notes_layout(area);
        draw_scratch_note(f, scratch_area, app);
        list_area
    } else {
        area
    };

    // Inner height, minus the inline editor line when one is open
    let editing_item = matches!(
        app.inline_edit,
        Some(InlineEdit {
            target: EditTarget::Item { .. },
            ..
        })
    );
    let editor_height = if editing_item { 3 } else { 0 };
    app.list
        .set_viewport(list_area.height.saturating_sub(2 + editor_height) as usize);

    let title = app.view.title();
    f.render_widget(ItemListWidget::new(&app.list, title, active), list_area);

    if let Some(edit) = app.inline_edit.as_ref().filter(|_| editing_item) {
        let editor_area = Rect {
            x: list_area.x + 1,
            y: list_area.bottom().saturating_sub(editor_height + 1),
            width: list_area.width.saturating_sub(2),
            height: editor_height,
        };
        draw_inline_editor(f, editor_area, edit, " Rename (Enter save, Esc cancel) ");
    }
}

fn draw_placeholder(f: &mut Frame, area: Rect, destination: Destination) {
    let hint = match destination {
        Destination::Dashboard => "Press g then a letter to jump to a page, or Ctrl+K for the palette.",
        Destination::Focus => "Press Enter to start Focus Mode on today's tasks.",
        _ => "This page has no keyboard content yet.",
    };
    let block = Block::default()
        .title(format!(" {} ", destination.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let text = Paragraph::new(vec![Line::from(""), Line::from(hint)])
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(text, area);
}

fn draw_scratch_note(f: &mut Frame, area: Rect, app: &App) {
    let editing = matches!(
        app.inline_edit,
        Some(InlineEdit {
            target: EditTarget::ScratchNote,
            ..
        })
    );

    if let Some(edit) = app.inline_edit.as_ref().filter(|_| editing) {
        draw_inline_editor(f, area, edit, " Scratch (Enter save, Esc cancel) ");
        return;
    }

    let block = Block::default()
        .title(" Scratch (e to edit) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let body = if app.scratch_note.is_empty() {
        Paragraph::new("Empty").style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(app.scratch_note.as_str())
    };
    f.render_widget(body.block(block).wrap(Wrap { trim: false }), area);
}

fn draw_inline_editor(f: &mut Frame, area: Rect, edit: &InlineEdit, title: &str) {
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let mut spans = Vec::new();
    for (i, c) in edit.buffer.chars().enumerate() {
        if i == edit.cursor {
            spans.push(Span::styled(
                c.to_string(),
                Style::default().bg(Color::White).fg(Color::Black),
            ));
        } else {
            spans.push(Span::raw(c.to_string()));
        }
    }
    if edit.cursor >= edit.buffer.chars().count() {
        spans.push(Span::styled(" ", Style::default().bg(Color::White)));
    }

    f.render_widget(
        Paragraph::new(Line::from(spans))
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_modal(f: &mut Frame, app: &App, now: Instant) {
    match &app.modal_state {
        ModalState::None => {}
        ModalState::Palette(palette) => {
            let area = PaletteModal::calculate_area(f.area());
            f.render_widget(PaletteModal::new(palette), area);
        }
        ModalState::Triage(view) => {
            let area = TriageModal::calculate_area(f.area());
            let transitioning = app.presentation.is_transitioning(now);
            f.render_widget(TriageModal::new(view, transitioning), area);
        }
    }
}

fn draw_help_bar(f: &mut Frame, area: Rect, app: &App, now: Instant) {
    let context = app.dispatcher.context(app.chord.is_pending(now));
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Cyan));

    let mut spans = vec![build_mode_indicator(context)];
    match context {
        CaptureContext::ChordPending => {
            spans.push(Span::raw(" waiting for a page key (Esc to cancel)"));
        }
        CaptureContext::TextEditing => {
            spans.extend([key(" Enter "), Span::raw("save "), key(" Esc "), Span::raw("cancel")]);
        }
        CaptureContext::ModalOpen => {
            spans.extend([key(" Esc "), Span::raw("close "), key(" C-q "), Span::raw("quit")]);
        }
        CaptureContext::None => {
            if app.view.list_identity().is_some() {
                spans.extend([
                    key(" j/k "),
                    Span::raw("move "),
                    key(" c/e/d/s "),
                    Span::raw("act "),
                    key(" x "),
                    Span::raw("select "),
                ]);
            }
            spans.extend([
                key(" g "),
                Span::raw("go to "),
                key(" C-k "),
                Span::raw("palette "),
                key(" ? "),
                Span::raw("help "),
                key(" q "),
                Span::raw("quit"),
            ]);
        }
    }

    let help = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    f.render_widget(help, area);
}

/// Build the mode indicator span for the help bar
fn build_mode_indicator(context: CaptureContext) -> Span<'static> {
    let bg = match context {
        CaptureContext::None => Color::Blue,
        CaptureContext::TextEditing => Color::Green,
        CaptureContext::ChordPending => Color::Yellow,
        CaptureContext::ModalOpen => Color::Magenta,
    };
    Span::styled(
        format!(" -- {} -- ", context.display_name()),
        Style::default().fg(Color::Black).bg(bg),
    )
}
