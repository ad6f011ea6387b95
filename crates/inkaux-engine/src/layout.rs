//! Grid placement for icons on a sheet.

use crate::config::SheetConfig;
use serde::{Deserialize, Serialize};

/// Position of one icon on the sheet, in user units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: u64,
    pub y: u64,
}

/// Row-major grid with a fixed column count.
///
/// Rows start one row height below the origin, so the first row sits at
/// `icon_size + row_gap` and leaves room above it for the template's own
/// heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    columns: u64,
    column_pitch: u64,
    row_pitch: u64,
}

impl GridLayout {
    /// Build a layout from sheet settings.
    ///
    /// `columns` is clamped to 1 so an unvalidated config cannot divide by zero.
    pub fn from_config(config: &SheetConfig) -> Self {
        let icon = u64::from(config.icon_size);
        Self {
            columns: u64::from(config.columns.max(1)),
            column_pitch: icon + u64::from(config.column_gap),
            row_pitch: icon + u64::from(config.row_gap),
        }
    }

    /// Cell for the icon at `index` in listing order.
    pub fn cell(&self, index: usize) -> Cell {
        Cell {
            x: self.column(index) * self.column_pitch,
            y: (index as u64 / self.columns + 1) * self.row_pitch,
        }
    }

    /// Column index of the icon at `index`.
    pub fn column(&self, index: usize) -> u64 {
        index as u64 % self.columns
    }
}
