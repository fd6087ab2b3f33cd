// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::GRID_CELL_COUNT;

const CELL_ID_PREFIX: &str = "cell-";

/// Stable key of one grid cell, rendered as `cell-<index>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellId(usize);

impl CellId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn get(self) -> usize {
        self.0
    }

    pub fn checked(index: usize) -> Option<Self> {
        (index < GRID_CELL_COUNT).then_some(Self(index))
    }
}

impl From<usize> for CellId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CELL_ID_PREFIX}{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellIdError {
    MissingPrefix,
    InvalidIndex,
    OutOfRange,
}

impl fmt::Display for CellIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPrefix => f.write_str("cell id must start with `cell-`"),
            Self::InvalidIndex => f.write_str("cell id index is not a number"),
            Self::OutOfRange => write!(f, "cell id index must be below {GRID_CELL_COUNT}"),
        }
    }
}

impl std::error::Error for CellIdError {}

impl FromStr for CellId {
    type Err = CellIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let digits = value
            .strip_prefix(CELL_ID_PREFIX)
            .ok_or(CellIdError::MissingPrefix)?;
        if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(CellIdError::InvalidIndex);
        }
        let index: usize = digits.parse().map_err(|_| CellIdError::OutOfRange)?;
        Self::checked(index).ok_or(CellIdError::OutOfRange)
    }
}

#[cfg(test)]
mod tests {
    use super::{CellId, CellIdError};

    #[test]
    fn display_uses_cell_prefix() {
        assert_eq!(CellId::new(0).to_string(), "cell-0");
        assert_eq!(CellId::new(999).to_string(), "cell-999");
    }

    #[test]
    fn parse_accepts_grid_range_only() {
        assert_eq!("cell-42".parse::<CellId>(), Ok(CellId::new(42)));
        assert_eq!("cell-1000".parse::<CellId>(), Err(CellIdError::OutOfRange));
        assert_eq!("row-1".parse::<CellId>(), Err(CellIdError::MissingPrefix));
        assert_eq!("cell-".parse::<CellId>(), Err(CellIdError::InvalidIndex));
        assert_eq!("cell-+1".parse::<CellId>(), Err(CellIdError::InvalidIndex));
    }
}
