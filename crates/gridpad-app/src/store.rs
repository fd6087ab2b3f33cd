// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Cell, CellId, CellMap};

/// Cell mapping plus a linear history of whole-mapping snapshots.
///
/// Every `set_cell` appends exactly one snapshot; nothing is coalesced, so a
/// burst of keystrokes yields one undo step per keystroke.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellStore {
    cells: CellMap,
    history: Vec<CellMap>,
    history_index: Option<usize>,
    search_query: String,
}

impl CellStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cells(&self) -> &CellMap {
        &self.cells
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    pub fn cell_or_default(&self, id: CellId) -> Cell {
        self.cells.get(&id).cloned().unwrap_or_default()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_index(&self) -> Option<usize> {
        self.history_index
    }

    pub fn can_undo(&self) -> bool {
        self.history_index.is_some_and(|index| index > 0)
    }

    pub fn can_redo(&self) -> bool {
        match self.history_index {
            Some(index) => index + 1 < self.history.len(),
            None => false,
        }
    }

    pub fn set_cell(&mut self, id: CellId, cell: Cell) {
        self.cells.insert(id, cell);
        self.push_snapshot();
    }

    /// Returns whether the cursor moved.
    pub fn undo(&mut self) -> bool {
        let Some(index) = self.history_index.filter(|index| *index > 0) else {
            return false;
        };
        self.restore(index - 1);
        true
    }

    /// Returns whether the cursor moved.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        let next = self.history_index.map_or(0, |index| index + 1);
        self.restore(next);
        true
    }

    /// Highlights are not recomputed here.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    fn push_snapshot(&mut self) {
        let keep = self.history_index.map_or(0, |index| index + 1);
        self.history.truncate(keep);
        self.history.push(self.cells.clone());
        self.history_index = Some(self.history.len() - 1);
    }

    fn restore(&mut self, index: usize) {
        if let Some(snapshot) = self.history.get(index) {
            self.cells = snapshot.clone();
            self.history_index = Some(index);
        }
    }
}
