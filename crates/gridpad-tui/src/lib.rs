// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use gridpad_app::{
    Alignment, AppCommand, AppEvent, AppMode, AppState, Cell, GRID_COLUMNS, GRID_ROWS_PER_PAGE,
};
use log::{debug, info};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const LARGE_FONT_SIZE: u16 = 20;
const SMALL_FONT_SIZE: u16 = 12;
const EDIT_CARET: &str = "▏";
const NUMERIC_MARK: &str = "#";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    help_visible: bool,
    status_token: u64,
}

/// Runs `restore` exactly once: on an explicit `restore()` call, or on drop
/// when setup or the event loop bails out early.
struct TerminalGuard<F: FnMut() -> Result<()>> {
    restore: F,
    restored: bool,
}

impl<F: FnMut() -> Result<()>> TerminalGuard<F> {
    fn new(restore: F) -> Self {
        Self {
            restore,
            restored: false,
        }
    }

    fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        (self.restore)()
    }
}

impl<F: FnMut() -> Result<()>> Drop for TerminalGuard<F> {
    fn drop(&mut self) {
        if let Err(error) = self.restore() {
            debug!("terminal restore on drop failed: {error:#}");
        }
    }
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode().context("disable raw mode")?;
    execute!(
        io::stdout(),
        DisableBracketedPaste,
        terminal::LeaveAlternateScreen
    )
    .context("leave alternate screen")?;
    Ok(())
}

pub fn run_app(state: &mut AppState) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut guard = TerminalGuard::new(restore_terminal);
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, EnableBracketedPaste)
        .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    info!("grid editor started on {}", state.pager.label());

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if !has_event {
            continue;
        }
        match event::read().context("read event") {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                if handle_key_event(state, &mut view_data, &internal_tx, key) {
                    break;
                }
            }
            Ok(Event::Paste(text)) => {
                dispatch_command(state, &mut view_data, &internal_tx, AppCommand::Paste(text));
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    drop(terminal);
    guard.restore()?;
    info!(
        "grid editor closed with {} history entries",
        state.store.history_len()
    );
    result
}

fn process_internal_events(state: &mut AppState, view_data: &ViewData, rx: &Receiver<InternalEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn dispatch_command(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) -> Vec<AppEvent> {
    let events = state.dispatch(command);
    for event in &events {
        match event {
            AppEvent::EditRejected(id) => debug!("edit to {id} discarded"),
            AppEvent::PageChanged(page) => debug!("showing page {}", page + 1),
            _ => {}
        }
    }
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
    events
}

fn handle_key_event(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        let command = match key.code {
            KeyCode::Char('z') => Some(AppCommand::Undo),
            KeyCode::Char('y') => Some(AppCommand::Redo),
            _ => None,
        };
        if let Some(command) = command {
            dispatch_command(state, view_data, internal_tx, command);
        }
        return false;
    }

    let command = match state.mode {
        AppMode::Edit(_) => edit_command_for_key(key),
        AppMode::Search => search_command_for_key(key),
        AppMode::Nav => {
            if key.code == KeyCode::Char('?') {
                view_data.help_visible = true;
                return false;
            }
            nav_command_for_key(key)
        }
    };
    if let Some(command) = command {
        dispatch_command(state, view_data, internal_tx, command);
    }
    false
}

fn nav_command_for_key(key: KeyEvent) -> Option<AppCommand> {
    let command = match key.code {
        KeyCode::Left | KeyCode::Char('h') => AppCommand::MoveCursor { rows: 0, cols: -1 },
        KeyCode::Right | KeyCode::Char('l') => AppCommand::MoveCursor { rows: 0, cols: 1 },
        KeyCode::Up | KeyCode::Char('k') => AppCommand::MoveCursor { rows: -1, cols: 0 },
        KeyCode::Down | KeyCode::Char('j') => AppCommand::MoveCursor { rows: 1, cols: 0 },
        KeyCode::Enter | KeyCode::Char('i') => AppCommand::FocusCell,
        KeyCode::Char('u') => AppCommand::Undo,
        KeyCode::Char('r') => AppCommand::Redo,
        KeyCode::Char('a') => AppCommand::CycleAlignment,
        KeyCode::Char('+') | KeyCode::Char('=') => AppCommand::AdjustFontSize(1),
        KeyCode::Char('-') => AppCommand::AdjustFontSize(-1),
        KeyCode::Char('n') => AppCommand::ToggleNumeric,
        KeyCode::Char('/') => AppCommand::OpenSearch,
        KeyCode::Char('[') | KeyCode::PageUp => AppCommand::PrevPage,
        KeyCode::Char(']') | KeyCode::PageDown => AppCommand::NextPage,
        KeyCode::Char('g') => AppCommand::GoToPage(0),
        KeyCode::Char('G') => AppCommand::GoToPage(gridpad_app::PAGE_COUNT as i64 - 1),
        _ => return None,
    };
    Some(command)
}

fn edit_command_for_key(key: KeyEvent) -> Option<AppCommand> {
    if key.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }
    let command = match key.code {
        KeyCode::Esc | KeyCode::Enter => AppCommand::Blur,
        KeyCode::Backspace => AppCommand::Backspace,
        KeyCode::Tab => AppCommand::MoveCursor { rows: 0, cols: 1 },
        KeyCode::Char(ch) => AppCommand::TypeChar(ch),
        _ => return None,
    };
    Some(command)
}

fn search_command_for_key(key: KeyEvent) -> Option<AppCommand> {
    let command = match key.code {
        KeyCode::Esc | KeyCode::Enter => AppCommand::CloseSearch,
        KeyCode::Backspace => AppCommand::SearchBackspace,
        KeyCode::Char(ch) => AppCommand::SearchChar(ch),
        _ => return None,
    };
    Some(command)
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(GRID_ROWS_PER_PAGE as u16),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let toolbar = Paragraph::new(toolbar_text(state))
        .block(Block::default().title("gridpad").borders(Borders::ALL));
    frame.render_widget(toolbar, layout[0]);

    render_grid(frame, layout[1], state);

    let footer = Paragraph::new(footer_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, layout[2]);

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_grid(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Ratio(1, GRID_ROWS_PER_PAGE as u32);
            GRID_ROWS_PER_PAGE
        ])
        .split(area);

    let focused = state.focused_cell();
    for (slot, id) in state.pager.cell_ids().enumerate() {
        let row = slot / GRID_COLUMNS;
        let col = slot % GRID_COLUMNS;
        let Some(row_area) = rows.get(row) else {
            continue;
        };
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![
                Constraint::Ratio(1, GRID_COLUMNS as u32);
                GRID_COLUMNS
            ])
            .split(*row_area);
        let Some(cell_area) = columns.get(col) else {
            continue;
        };

        let cell = state.store.cell_or_default(id);
        let editing = focused == Some(id);
        let selected = slot == state.cursor;
        let widget = Paragraph::new(cell_display_text(&cell, editing))
            .alignment(text_alignment(cell.alignment))
            .style(cell_style(&cell))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(cell_border_style(selected, editing)),
            );
        frame.render_widget(widget, *cell_area);
    }
}

fn text_alignment(alignment: Alignment) -> ratatui::layout::Alignment {
    match alignment {
        Alignment::Left => ratatui::layout::Alignment::Left,
        Alignment::Center => ratatui::layout::Alignment::Center,
        Alignment::Right => ratatui::layout::Alignment::Right,
    }
}

fn cell_display_text(cell: &Cell, editing: bool) -> String {
    let mut text = String::new();
    if cell.is_numeric && cell.value.is_empty() && !editing {
        text.push_str(NUMERIC_MARK);
    }
    text.push_str(&cell.value);
    if editing {
        text.push_str(EDIT_CARET);
    }
    text
}

// Terminal text has one size; the cell's font size maps onto weight.
fn cell_style(cell: &Cell) -> Style {
    let mut style = if cell.is_highlighted {
        Style::default().bg(Color::Yellow).fg(Color::Black)
    } else {
        Style::default()
    };
    if cell.font_size >= LARGE_FONT_SIZE {
        style = style.add_modifier(Modifier::BOLD);
    } else if cell.font_size <= SMALL_FONT_SIZE {
        style = style.add_modifier(Modifier::DIM);
    }
    style
}

fn cell_border_style(selected: bool, editing: bool) -> Style {
    if editing {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else if selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn toolbar_text(state: &AppState) -> String {
    let undo = if state.store.can_undo() { "undo" } else { "-" };
    let redo = if state.store.can_redo() { "redo" } else { "-" };
    let numeric = if state.toolbar.numeric { "on" } else { "off" };
    let search_marker = if state.mode == AppMode::Search {
        EDIT_CARET
    } else {
        ""
    };
    format!(
        "[{undo}] [{redo}] | align: {} | font: {} | numeric: {numeric} | search: {}{search_marker}",
        state.toolbar.alignment,
        state.toolbar.font_size,
        state.store.search_query(),
    )
}

fn footer_text(state: &AppState) -> String {
    let prev = if state.pager.has_prev() { "< prev" } else { "      " };
    let next = if state.pager.has_next() { "next >" } else { "      " };
    let mode = match state.mode {
        AppMode::Nav => "NAV".to_owned(),
        AppMode::Edit(id) => format!("EDIT {id}"),
        AppMode::Search => "SEARCH".to_owned(),
    };
    let position = state
        .cursor_cell()
        .map(|id| id.to_string())
        .unwrap_or_default();
    let mut text = format!("{prev} {} {next} | {mode} | {position}", state.pager.label());
    if let Some(status) = &state.status_line {
        text.push_str(" | ");
        text.push_str(status);
    }
    text.push_str(" | ? help | ctrl+q");
    text
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ctrl+z undo | ctrl+y redo\n\
nav: h/j/k/l or arrows move | enter/i edit cell | u undo | r redo\n\
nav: a cycle alignment | +/- font size | n numeric | / search\n\
nav: [/] or pgup/pgdn page | g/G first/last page | ? help\n\
edit: type to change | backspace delete | tab next cell | enter/esc done\n\
search: type query | backspace delete | enter/esc close"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
