use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellRef, CellStyle, CellValue, Range};

/// Coarse data-type tag reported by the snapshot producer for a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellDataType {
    Text,
    Number,
    Date,
    Bool,
    Formula,
    Empty,
}

impl Default for CellDataType {
    fn default() -> Self {
        CellDataType::Empty
    }
}

/// Kind of data-validation rule attached to a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    /// Dropdown list of allowed values.
    List,
    /// Whole-number constraint.
    Whole,
    /// Decimal-number constraint.
    Decimal,
    /// Date constraint.
    Date,
    /// Text-length constraint.
    TextLength,
    /// Custom formula constraint.
    Custom,
}

impl ValidationKind {
    /// Stable snake_case name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationKind::List => "list",
            ValidationKind::Whole => "whole",
            ValidationKind::Decimal => "decimal",
            ValidationKind::Date => "date",
            ValidationKind::TextLength => "text_length",
            ValidationKind::Custom => "custom",
        }
    }
}

/// A data-validation descriptor attached to a snapshot cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub kind: ValidationKind,
    /// Raw descriptor text (e.g. the list source formula), preserved verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<String>,
}

/// One cell of the structural snapshot.
///
/// Snapshot cells are read-only inputs: the extraction pipeline never
/// mutates them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotCell {
    /// 0-indexed position within the sheet.
    pub cell: CellRef,

    #[serde(default)]
    pub value: CellValue,

    #[serde(default)]
    pub style: CellStyle,

    #[serde(default)]
    pub data_type: CellDataType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,

    /// Original coordinate/anchor string (e.g. `B4`), when the producer
    /// supplies one. Informational only; `cell` is authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

impl SnapshotCell {
    /// A text cell with default style, the common case in tests.
    pub fn text(row: u32, col: u32, text: &str) -> Self {
        Self {
            cell: CellRef::new(row, col),
            value: CellValue::Text(text.to_string()),
            style: CellStyle::default(),
            data_type: CellDataType::Text,
            validation: None,
            number_format: None,
            anchor: None,
        }
    }

    /// An empty cell (present in the snapshot for style or merge reasons).
    pub fn empty(row: u32, col: u32) -> Self {
        Self {
            cell: CellRef::new(row, col),
            value: CellValue::Empty,
            style: CellStyle::default(),
            data_type: CellDataType::Empty,
            validation: None,
            number_format: None,
            anchor: None,
        }
    }

    /// Trimmed text content, if this is a non-empty text cell.
    pub fn trimmed_text(&self) -> Option<&str> {
        self.value.as_text().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Whether the producer tagged this cell as holding a formula.
    pub fn is_formula(&self) -> bool {
        self.data_type == CellDataType::Formula
    }
}

/// The structural snapshot of one sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetSnapshot {
    /// Position of the sheet within the workbook (0-indexed).
    pub index: usize,
    pub name: String,
    #[serde(default)]
    pub cells: Vec<SnapshotCell>,
    /// Merged-cell ranges within the sheet.
    #[serde(default)]
    pub merged: Vec<Range>,
}

impl SheetSnapshot {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            cells: Vec::new(),
            merged: Vec::new(),
        }
    }

    /// Cells in reading order: row ascending, then column ascending.
    ///
    /// Snapshot producers usually emit cells already sorted; this re-sorts
    /// defensively since the extraction contract depends on reading order.
    pub fn sorted_cells(&self) -> Vec<&SnapshotCell> {
        let mut cells: Vec<&SnapshotCell> = self.cells.iter().collect();
        cells.sort_by_key(|c| (c.cell.row, c.cell.col));
        cells
    }

    /// The merged range containing `cell`, if any.
    pub fn merged_range_containing(&self, cell: CellRef) -> Option<Range> {
        self.merged.iter().copied().find(|r| r.contains(cell))
    }
}

/// The full structural snapshot of a trail template workbook.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrailSnapshot {
    pub sheets: Vec<SheetSnapshot>,
}

impl TrailSnapshot {
    pub fn new(sheets: Vec<SheetSnapshot>) -> Self {
        Self { sheets }
    }

    /// Structural sanity checks run before extraction.
    ///
    /// A snapshot is valid when it has at least one sheet, sheet indices
    /// match their list positions, and sheet names are unique and non-empty.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.sheets.is_empty() {
            return Err(SnapshotError::NoSheets);
        }

        let mut names = HashSet::new();
        for (position, sheet) in self.sheets.iter().enumerate() {
            if sheet.index != position {
                return Err(SnapshotError::SheetIndexMismatch {
                    position,
                    index: sheet.index,
                });
            }
            if sheet.name.trim().is_empty() {
                return Err(SnapshotError::UnnamedSheet { position });
            }
            if !names.insert(sheet.name.as_str()) {
                return Err(SnapshotError::DuplicateSheetName {
                    name: sheet.name.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Structural problems that make a snapshot unusable for extraction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("snapshot contains no sheets")]
    NoSheets,
    #[error("sheet at position {position} carries index {index}")]
    SheetIndexMismatch { position: usize, index: usize },
    #[error("sheet at position {position} has an empty name")]
    UnnamedSheet { position: usize },
    #[error("duplicate sheet name: {name:?}")]
    DuplicateSheetName { name: String },
}
