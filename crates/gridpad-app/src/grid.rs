// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::CellId;

pub const GRID_CELL_COUNT: usize = 1000;
pub const CELLS_PER_PAGE: usize = 100;
pub const PAGE_COUNT: usize = GRID_CELL_COUNT.div_ceil(CELLS_PER_PAGE);
pub const GRID_COLUMNS: usize = 10;
pub const GRID_ROWS_PER_PAGE: usize = CELLS_PER_PAGE / GRID_COLUMNS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pager {
    page: usize,
}

impl Pager {
    pub fn page(self) -> usize {
        self.page
    }

    /// Out-of-range requests leave the page unchanged and return false.
    pub fn set_page(&mut self, page: i64) -> bool {
        if page < 0 || page >= PAGE_COUNT as i64 {
            return false;
        }
        self.page = page as usize;
        true
    }

    pub fn next(&mut self) -> bool {
        self.set_page(self.page as i64 + 1)
    }

    pub fn prev(&mut self) -> bool {
        self.set_page(self.page as i64 - 1)
    }

    pub fn has_prev(self) -> bool {
        self.page > 0
    }

    pub fn has_next(self) -> bool {
        (self.page + 1) * CELLS_PER_PAGE < GRID_CELL_COUNT
    }

    pub fn cell_ids(self) -> impl Iterator<Item = CellId> {
        let start = self.page * CELLS_PER_PAGE;
        let end = (start + CELLS_PER_PAGE).min(GRID_CELL_COUNT);
        (start..end).map(CellId::new)
    }

    /// Maps a page-local slot to a grid cell, if the slot exists on this page.
    pub fn cell_at(self, slot: usize) -> Option<CellId> {
        if slot >= CELLS_PER_PAGE {
            return None;
        }
        CellId::checked(self.page * CELLS_PER_PAGE + slot)
    }

    pub fn label(self) -> String {
        format!("Page {} of {PAGE_COUNT}", self.page + 1)
    }
}
