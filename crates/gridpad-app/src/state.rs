// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use log::debug;

use crate::validation::{accepts_numeric_keypress, is_numeric_text};
use crate::{
    Alignment, AppMode, CELLS_PER_PAGE, Cell, CellId, CellStore, GRID_COLUMNS, Pager, Toolbar,
    value_matches_query,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub store: CellStore,
    pub pager: Pager,
    pub toolbar: Toolbar,
    /// Page-local slot under the cursor, `0..CELLS_PER_PAGE`.
    pub cursor: usize,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            store: CellStore::new(),
            pager: Pager::default(),
            toolbar: Toolbar::default(),
            cursor: 0,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    MoveCursor { rows: isize, cols: isize },
    FocusCell,
    Blur,
    TypeChar(char),
    Backspace,
    Paste(String),
    SetCellText { id: CellId, value: String },
    Undo,
    Redo,
    SetAlignment(Alignment),
    CycleAlignment,
    SetFontSize(i64),
    AdjustFontSize(i64),
    ToggleNumeric,
    OpenSearch,
    SetSearchQuery(String),
    SearchChar(char),
    SearchBackspace,
    CloseSearch,
    NextPage,
    PrevPage,
    GoToPage(i64),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    CursorMoved(CellId),
    CellUpdated(CellId),
    EditRejected(CellId),
    KeySuppressed(char),
    HistoryMoved { index: usize },
    PageChanged(usize),
    SearchUpdated { query: String, matches: usize },
    ToolbarChanged(Toolbar),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn with_toolbar(toolbar: Toolbar) -> Self {
        Self {
            toolbar,
            ..Self::default()
        }
    }

    pub fn cursor_cell(&self) -> Option<CellId> {
        self.pager.cell_at(self.cursor)
    }

    pub fn focused_cell(&self) -> Option<CellId> {
        match self.mode {
            AppMode::Edit(id) => Some(id),
            AppMode::Nav | AppMode::Search => None,
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::MoveCursor { rows, cols } => self.move_cursor(rows, cols),
            AppCommand::FocusCell => match self.cursor_cell() {
                Some(id) => self.focus_cell(id),
                None => Vec::new(),
            },
            AppCommand::Blur => self.enter_nav(),
            AppCommand::TypeChar(ch) => self.type_char(ch),
            AppCommand::Backspace => self.backspace(),
            AppCommand::Paste(text) => self.paste(&text),
            AppCommand::SetCellText { id, value } => {
                if CellId::checked(id.get()).is_none() {
                    debug!("ignored edit to {id} outside the grid");
                    return Vec::new();
                }
                vec![self.change_cell_text(id, value)]
            }
            AppCommand::Undo => {
                if self.store.undo() {
                    self.history_moved("undo")
                } else {
                    vec![self.set_status("nothing to undo")]
                }
            }
            AppCommand::Redo => {
                if self.store.redo() {
                    self.history_moved("redo")
                } else {
                    vec![self.set_status("nothing to redo")]
                }
            }
            AppCommand::SetAlignment(alignment) => {
                self.toolbar.alignment = alignment;
                self.toolbar_changed(format!("align {alignment}"))
            }
            AppCommand::CycleAlignment => {
                self.toolbar.alignment = self.toolbar.alignment.next();
                self.toolbar_changed(format!("align {}", self.toolbar.alignment))
            }
            AppCommand::SetFontSize(size) => self.set_font_size(size),
            AppCommand::AdjustFontSize(delta) => {
                self.set_font_size(i64::from(self.toolbar.font_size) + delta)
            }
            AppCommand::ToggleNumeric => {
                self.toolbar.numeric = !self.toolbar.numeric;
                let label = if self.toolbar.numeric {
                    "numeric on"
                } else {
                    "numeric off"
                };
                self.toolbar_changed(label.to_owned())
            }
            AppCommand::OpenSearch => {
                self.mode = AppMode::Search;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::SetSearchQuery(query) => vec![self.apply_search(query)],
            AppCommand::SearchChar(ch) => {
                let mut query = self.store.search_query().to_owned();
                query.push(ch);
                vec![self.apply_search(query)]
            }
            AppCommand::SearchBackspace => {
                let mut query = self.store.search_query().to_owned();
                if query.pop().is_none() {
                    return Vec::new();
                }
                vec![self.apply_search(query)]
            }
            AppCommand::CloseSearch => self.enter_nav(),
            AppCommand::NextPage => {
                let changed = self.pager.next();
                self.page_moved(changed)
            }
            AppCommand::PrevPage => {
                let changed = self.pager.prev();
                self.page_moved(changed)
            }
            AppCommand::GoToPage(page) => {
                let changed = self.pager.set_page(page);
                self.page_moved(changed)
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    /// Text-change handler: existing cell or a toolbar-format blank, numeric
    /// check, then a full-record write with the highlight recomputed.
    fn change_cell_text(&mut self, id: CellId, value: String) -> AppEvent {
        let cell = self
            .store
            .cell(id)
            .cloned()
            .unwrap_or_else(|| Cell::from_toolbar(&self.toolbar));

        if cell.is_numeric && !is_numeric_text(&value) {
            debug!("rejected non-numeric value {value:?} for {id}");
            return AppEvent::EditRejected(id);
        }

        let is_highlighted = value_matches_query(&value, self.store.search_query());
        self.store.set_cell(
            id,
            Cell {
                value,
                is_highlighted,
                ..cell
            },
        );
        AppEvent::CellUpdated(id)
    }

    fn focus_cell(&mut self, id: CellId) -> Vec<AppEvent> {
        let cell = self
            .store
            .cell(id)
            .cloned()
            .unwrap_or_else(|| Cell::from_toolbar(&self.toolbar));
        self.store.set_cell(
            id,
            Cell {
                alignment: self.toolbar.alignment,
                font_size: self.toolbar.font_size,
                ..cell
            },
        );
        self.mode = AppMode::Edit(id);
        debug!("focused {id}");
        vec![AppEvent::CellUpdated(id), AppEvent::ModeChanged(self.mode)]
    }

    fn type_char(&mut self, ch: char) -> Vec<AppEvent> {
        let Some(id) = self.focused_cell() else {
            return Vec::new();
        };
        let is_numeric = self.store.cell(id).is_some_and(|cell| cell.is_numeric);
        if is_numeric && !accepts_numeric_keypress(ch) {
            debug!("suppressed keypress {ch:?} in numeric {id}");
            return vec![AppEvent::KeySuppressed(ch)];
        }
        let mut value = self.store.cell_or_default(id).value;
        value.push(ch);
        vec![self.change_cell_text(id, value)]
    }

    fn backspace(&mut self) -> Vec<AppEvent> {
        let Some(id) = self.focused_cell() else {
            return Vec::new();
        };
        let mut value = self.store.cell_or_default(id).value;
        if value.pop().is_none() {
            return Vec::new();
        }
        vec![self.change_cell_text(id, value)]
    }

    fn paste(&mut self, text: &str) -> Vec<AppEvent> {
        if text.is_empty() {
            return Vec::new();
        }
        match self.mode {
            AppMode::Edit(id) => {
                let mut value = self.store.cell_or_default(id).value;
                value.push_str(text);
                vec![self.change_cell_text(id, value)]
            }
            AppMode::Search => {
                let mut query = self.store.search_query().to_owned();
                query.push_str(text);
                vec![self.apply_search(query)]
            }
            AppMode::Nav => Vec::new(),
        }
    }

    /// Sets the query, then rewrites every stored cell with its highlight
    /// recomputed. Each rewrite is its own history entry.
    fn apply_search(&mut self, query: String) -> AppEvent {
        self.store.set_search_query(query.clone());
        let existing = self
            .store
            .cells()
            .iter()
            .map(|(id, cell)| (*id, cell.clone()))
            .collect::<Vec<_>>();

        let mut matches = 0;
        for (id, cell) in existing {
            let is_highlighted = cell.matches_query(&query);
            if is_highlighted {
                matches += 1;
            }
            self.store.set_cell(
                id,
                Cell {
                    is_highlighted,
                    ..cell
                },
            );
        }
        debug!("search {query:?} matched {matches} cells");
        AppEvent::SearchUpdated { query, matches }
    }

    fn move_cursor(&mut self, rows: isize, cols: isize) -> Vec<AppEvent> {
        let mut events = self.blur_if_editing();
        let row_count = (CELLS_PER_PAGE / GRID_COLUMNS) as isize;
        let row = (self.cursor / GRID_COLUMNS) as isize;
        let col = (self.cursor % GRID_COLUMNS) as isize;
        let next_row = (row + rows).clamp(0, row_count - 1);
        let next_col = (col + cols).clamp(0, GRID_COLUMNS as isize - 1);
        self.cursor = next_row as usize * GRID_COLUMNS + next_col as usize;
        if let Some(id) = self.cursor_cell() {
            events.push(AppEvent::CursorMoved(id));
        }
        events
    }

    fn set_font_size(&mut self, size: i64) -> Vec<AppEvent> {
        if self.toolbar.set_font_size(size) {
            self.toolbar_changed(format!("font {}", self.toolbar.font_size))
        } else {
            vec![self.set_status(&format!("font size {size} out of range"))]
        }
    }

    fn toolbar_changed(&mut self, label: String) -> Vec<AppEvent> {
        vec![
            AppEvent::ToolbarChanged(self.toolbar),
            self.set_status(&label),
        ]
    }

    fn history_moved(&mut self, label: &str) -> Vec<AppEvent> {
        let index = self.store.history_index().unwrap_or(0);
        debug!("{label} -> history index {index}");
        vec![
            AppEvent::HistoryMoved { index },
            self.set_status(&format!("{label} {}/{}", index + 1, self.store.history_len())),
        ]
    }

    fn page_moved(&mut self, changed: bool) -> Vec<AppEvent> {
        if !changed {
            return Vec::new();
        }
        let mut events = self.blur_if_editing();
        let page = self.pager.page();
        debug!("page -> {page}");
        events.push(AppEvent::PageChanged(page));
        events
    }

    fn blur_if_editing(&mut self) -> Vec<AppEvent> {
        if matches!(self.mode, AppMode::Edit(_)) {
            self.enter_nav()
        } else {
            Vec::new()
        }
    }

    fn enter_nav(&mut self) -> Vec<AppEvent> {
        if self.mode == AppMode::Nav {
            return Vec::new();
        }
        self.mode = AppMode::Nav;
        vec![AppEvent::ModeChanged(self.mode)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState};
    use crate::{Alignment, AppMode, Cell, CellId, Toolbar};

    fn numeric_state() -> AppState {
        AppState::with_toolbar(Toolbar {
            numeric: true,
            ..Toolbar::default()
        })
    }

    fn set_text(state: &mut AppState, index: usize, value: &str) -> Vec<AppEvent> {
        state.dispatch(AppCommand::SetCellText {
            id: CellId::new(index),
            value: value.to_owned(),
        })
    }

    #[test]
    fn numeric_cell_keeps_value_on_non_numeric_edit() {
        let mut state = numeric_state();
        let id = CellId::new(0);

        assert_eq!(set_text(&mut state, 0, "42"), vec![AppEvent::CellUpdated(id)]);
        assert_eq!(set_text(&mut state, 0, "4x"), vec![AppEvent::EditRejected(id)]);
        assert_eq!(state.store.cell_or_default(id).value, "42");
        assert_eq!(state.store.history_len(), 1);
    }

    #[test]
    fn numeric_cell_accepts_infinity_and_radix_literals() {
        let mut state = numeric_state();
        for value in ["Infinity", "-Infinity", "0x10", "0b11", "0o7"] {
            assert_eq!(
                set_text(&mut state, 0, value),
                vec![AppEvent::CellUpdated(CellId::new(0))],
                "{value}"
            );
            assert_eq!(state.store.cell_or_default(CellId::new(0)).value, value);
        }
    }

    #[test]
    fn pasted_hex_literal_lands_in_numeric_cell() {
        let mut state = numeric_state();
        state.dispatch(AppCommand::FocusCell);
        state.dispatch(AppCommand::Paste("0x1F".to_owned()));
        assert_eq!(state.store.cell_or_default(CellId::new(0)).value, "0x1F");
    }

    #[test]
    fn edits_outside_the_grid_are_ignored() {
        let mut state = AppState::default();
        assert!(set_text(&mut state, 1000, "lost").is_empty());
        assert!(state.store.cells().is_empty());
        assert_eq!(state.store.history_len(), 0);

        set_text(&mut state, 999, "kept");
        state.dispatch(AppCommand::SetSearchQuery("e".to_owned()));
        assert_eq!(state.store.cells().len(), 1);
    }

    #[test]
    fn new_cell_takes_toolbar_format() {
        let mut state = AppState::with_toolbar(Toolbar {
            alignment: Alignment::Right,
            font_size: 20,
            numeric: false,
        });
        set_text(&mut state, 7, "hello");
        let cell = state.store.cell_or_default(CellId::new(7));
        assert_eq!(cell.alignment, Alignment::Right);
        assert_eq!(cell.font_size, 20);
        assert!(!cell.is_numeric);
    }

    #[test]
    fn text_change_keeps_existing_cell_format() {
        let mut state = AppState::default();
        set_text(&mut state, 1, "a");
        state.dispatch(AppCommand::SetAlignment(Alignment::Center));
        set_text(&mut state, 1, "ab");
        assert_eq!(
            state.store.cell_or_default(CellId::new(1)).alignment,
            Alignment::Left
        );
    }

    #[test]
    fn text_change_recomputes_highlight_from_active_query() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::SetSearchQuery("ab".to_owned()));
        set_text(&mut state, 3, "xaby");
        assert!(state.store.cell_or_default(CellId::new(3)).is_highlighted);
        set_text(&mut state, 3, "xy");
        assert!(!state.store.cell_or_default(CellId::new(3)).is_highlighted);
    }

    #[test]
    fn focus_applies_toolbar_alignment_and_font_size() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::MoveCursor { rows: 0, cols: 2 });
        set_text(&mut state, 2, "text");
        state.dispatch(AppCommand::SetAlignment(Alignment::Right));
        state.dispatch(AppCommand::SetFontSize(30));

        let events = state.dispatch(AppCommand::FocusCell);
        let id = CellId::new(2);
        assert_eq!(
            events,
            vec![
                AppEvent::CellUpdated(id),
                AppEvent::ModeChanged(AppMode::Edit(id)),
            ]
        );
        let cell = state.store.cell_or_default(id);
        assert_eq!(cell.value, "text");
        assert_eq!(cell.alignment, Alignment::Right);
        assert_eq!(cell.font_size, 30);
        assert_eq!(state.store.history_len(), 2);
    }

    #[test]
    fn focus_does_not_change_numeric_flag_of_existing_cell() {
        let mut state = AppState::default();
        set_text(&mut state, 0, "words");
        state.dispatch(AppCommand::ToggleNumeric);
        state.dispatch(AppCommand::FocusCell);
        assert!(!state.store.cell_or_default(CellId::new(0)).is_numeric);
    }

    #[test]
    fn keypress_filter_blocks_non_digits_in_numeric_cell() {
        let mut state = numeric_state();
        state.dispatch(AppCommand::FocusCell);
        let id = CellId::new(0);

        state.dispatch(AppCommand::TypeChar('4'));
        assert_eq!(
            state.dispatch(AppCommand::TypeChar('x')),
            vec![AppEvent::KeySuppressed('x')]
        );
        state.dispatch(AppCommand::TypeChar('2'));
        assert_eq!(state.store.cell_or_default(id).value, "42");
    }

    #[test]
    fn backspace_is_never_suppressed() {
        let mut state = numeric_state();
        state.dispatch(AppCommand::FocusCell);
        state.dispatch(AppCommand::TypeChar('7'));
        state.dispatch(AppCommand::TypeChar('8'));
        state.dispatch(AppCommand::Backspace);
        assert_eq!(state.store.cell_or_default(CellId::new(0)).value, "7");
        assert_eq!(state.dispatch(AppCommand::Backspace).len(), 1);
        assert!(state.dispatch(AppCommand::Backspace).is_empty());
    }

    #[test]
    fn paste_bypasses_keypress_filter_but_not_numeric_check() {
        let mut state = numeric_state();
        state.dispatch(AppCommand::FocusCell);
        let id = CellId::new(0);

        state.dispatch(AppCommand::Paste("12.5".to_owned()));
        assert_eq!(state.store.cell_or_default(id).value, "12.5");
        assert_eq!(
            state.dispatch(AppCommand::Paste("abc".to_owned())),
            vec![AppEvent::EditRejected(id)]
        );
        assert_eq!(state.store.cell_or_default(id).value, "12.5");
    }

    #[test]
    fn typing_records_one_history_entry_per_keystroke() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::FocusCell);
        for ch in "hello".chars() {
            state.dispatch(AppCommand::TypeChar(ch));
        }
        assert_eq!(state.store.history_len(), 6);

        state.dispatch(AppCommand::Undo);
        assert_eq!(state.store.cell_or_default(CellId::new(0)).value, "hell");
    }

    #[test]
    fn typing_outside_edit_mode_is_ignored() {
        let mut state = AppState::default();
        assert!(state.dispatch(AppCommand::TypeChar('a')).is_empty());
        assert!(state.dispatch(AppCommand::Backspace).is_empty());
        assert_eq!(state.store.history_len(), 0);
    }

    #[test]
    fn search_highlights_exactly_matching_cells() {
        let mut state = AppState::default();
        for (index, value) in [(0, "15"), (1, "abc"), (2, "555"), (3, "5"), (4, "")] {
            set_text(&mut state, index, value);
        }

        let events = state.dispatch(AppCommand::SetSearchQuery("5".to_owned()));
        assert_eq!(
            events,
            vec![AppEvent::SearchUpdated {
                query: "5".to_owned(),
                matches: 3,
            }]
        );
        for (id, cell) in state.store.cells() {
            assert_eq!(cell.is_highlighted, cell.value.contains('5'), "{id}");
        }
        assert_eq!(state.store.history_len(), 10);
    }

    #[test]
    fn clearing_search_removes_all_highlights() {
        let mut state = AppState::default();
        set_text(&mut state, 0, "x");
        state.dispatch(AppCommand::OpenSearch);
        state.dispatch(AppCommand::SearchChar('x'));
        assert!(state.store.cell_or_default(CellId::new(0)).is_highlighted);

        state.dispatch(AppCommand::SearchBackspace);
        assert_eq!(state.store.search_query(), "");
        assert!(!state.store.cell_or_default(CellId::new(0)).is_highlighted);
        assert!(state.dispatch(AppCommand::SearchBackspace).is_empty());
    }

    #[test]
    fn undo_redo_round_trip_and_edges() {
        let mut state = AppState::default();
        set_text(&mut state, 0, "a");
        set_text(&mut state, 0, "ab");

        let before = state.store.cells().clone();
        let undo = state.dispatch(AppCommand::Undo);
        assert_eq!(undo[0], AppEvent::HistoryMoved { index: 0 });
        assert_eq!(
            state.dispatch(AppCommand::Undo),
            vec![AppEvent::StatusUpdated("nothing to undo".to_owned())]
        );
        state.dispatch(AppCommand::Redo);
        assert_eq!(state.store.cells(), &before);
        assert_eq!(
            state.dispatch(AppCommand::Redo),
            vec![AppEvent::StatusUpdated("nothing to redo".to_owned())]
        );
    }

    #[test]
    fn font_size_adjustment_stays_positive() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::SetFontSize(1));
        let events = state.dispatch(AppCommand::AdjustFontSize(-1));
        assert_eq!(state.toolbar.font_size, 1);
        assert_eq!(
            events,
            vec![AppEvent::StatusUpdated("font size 0 out of range".to_owned())]
        );
    }

    #[test]
    fn page_requests_outside_range_are_ignored() {
        let mut state = AppState::default();
        assert!(state.dispatch(AppCommand::GoToPage(-1)).is_empty());
        assert!(state.dispatch(AppCommand::GoToPage(10)).is_empty());
        assert_eq!(state.pager.page(), 0);

        assert_eq!(
            state.dispatch(AppCommand::NextPage),
            vec![AppEvent::PageChanged(1)]
        );
        assert_eq!(state.cursor_cell(), Some(CellId::new(100)));
    }

    #[test]
    fn page_change_blurs_focused_cell() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::FocusCell);
        let events = state.dispatch(AppCommand::NextPage);
        assert_eq!(
            events,
            vec![
                AppEvent::ModeChanged(AppMode::Nav),
                AppEvent::PageChanged(1),
            ]
        );
    }

    #[test]
    fn cursor_clamps_to_page_bounds() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::MoveCursor { rows: -3, cols: -3 });
        assert_eq!(state.cursor, 0);
        state.dispatch(AppCommand::MoveCursor { rows: 50, cols: 50 });
        assert_eq!(state.cursor, 99);
        assert_eq!(state.cursor_cell(), Some(CellId::new(99)));
    }

    #[test]
    fn undo_restores_snapshot_highlights() {
        let mut state = AppState::default();
        set_text(&mut state, 0, "q");
        state.dispatch(AppCommand::SetSearchQuery("q".to_owned()));
        assert!(state.store.cell_or_default(CellId::new(0)).is_highlighted);

        state.dispatch(AppCommand::Undo);
        assert_eq!(
            state.store.cell(CellId::new(0)),
            Some(&Cell {
                value: "q".to_owned(),
                ..Cell::default()
            })
        );
    }
}
