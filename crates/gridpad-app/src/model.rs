// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::ids::CellId;

pub const DEFAULT_FONT_SIZE: u16 = 16;
pub const MIN_FONT_SIZE: u16 = 1;
pub const MAX_FONT_SIZE: u16 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    pub const ALL: [Self; 3] = [Self::Left, Self::Center, Self::Right];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub const fn next(self) -> Self {
        match self {
            Self::Left => Self::Center,
            Self::Center => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub value: String,
    pub alignment: Alignment,
    pub font_size: u16,
    pub is_numeric: bool,
    pub is_highlighted: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            value: String::new(),
            alignment: Alignment::Left,
            font_size: DEFAULT_FONT_SIZE,
            is_numeric: false,
            is_highlighted: false,
        }
    }
}

impl Cell {
    /// A blank cell carrying the toolbar's current format.
    pub fn from_toolbar(toolbar: &Toolbar) -> Self {
        Self {
            value: String::new(),
            alignment: toolbar.alignment,
            font_size: toolbar.font_size,
            is_numeric: toolbar.numeric,
            is_highlighted: false,
        }
    }

    pub fn matches_query(&self, query: &str) -> bool {
        value_matches_query(&self.value, query)
    }
}

/// Case-sensitive containment; an empty query matches nothing.
pub fn value_matches_query(value: &str, query: &str) -> bool {
    !query.is_empty() && value.contains(query)
}

pub type CellMap = BTreeMap<CellId, Cell>;

/// Format applied to new cells and to cells on focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolbar {
    pub alignment: Alignment,
    pub font_size: u16,
    pub numeric: bool,
}

impl Default for Toolbar {
    fn default() -> Self {
        Self {
            alignment: Alignment::Left,
            font_size: DEFAULT_FONT_SIZE,
            numeric: false,
        }
    }
}

impl Toolbar {
    /// Returns false and leaves the size alone when `size` is out of range.
    pub fn set_font_size(&mut self, size: i64) -> bool {
        if size < i64::from(MIN_FONT_SIZE) || size > i64::from(MAX_FONT_SIZE) {
            return false;
        }
        self.font_size = size as u16;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Nav,
    Edit(CellId),
    Search,
}
