use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sentinel `row_end` for the last section of a sheet: the section covers
/// all remaining rows.
pub const OPEN_ROW_END: u32 = u32::MAX;

/// A titled grouping of rows within one sheet.
///
/// Sections are created once per sheet during identification and never
/// mutated afterwards within an extraction run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Ordinal index within the sheet (0-based).
    pub index: usize,
    /// Display name (the header cell's trimmed text).
    pub name: String,
    /// First row covered by the section (the header row itself).
    pub row_start: u32,
    /// Last row covered, inclusive. [`OPEN_ROW_END`] for the final section.
    pub row_end: u32,
}

impl Section {
    /// Whether `row` falls inside this section's row range.
    pub fn covers_row(&self, row: u32) -> bool {
        row >= self.row_start && row <= self.row_end
    }
}

/// Response type inferred for a question from validation, number format,
/// or data-type hints.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferredType {
    TextShort,
    TextLong,
    Number,
    Date,
    Choice,
}

impl Default for InferredType {
    fn default() -> Self {
        InferredType::TextShort
    }
}

/// One extracted question of a trail template.
///
/// Questions are produced fresh on every ingestion run and never mutated in
/// place. `field_id` is derived from (sheet name, row, column, text), so an
/// unchanged template reproduces identical ids across runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Stable content+position derived identifier (16 hex chars).
    pub field_id: String,

    pub sheet_index: usize,
    pub sheet_name: String,
    /// 0-indexed row of the question text cell.
    pub row: u32,
    /// 0-indexed column of the question text cell.
    pub column: u32,
    /// A1 range of the question text cell.
    pub cell_range: String,

    /// Name of the owning section, when the question falls inside one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
    /// Ordinal of the owning section within the sheet, or `-1` when the
    /// question sits outside every identified section.
    #[serde(default = "no_section")]
    pub section_index: i32,

    /// Trimmed exact question text.
    pub question_text: String,

    #[serde(default)]
    pub inferred_type: InferredType,

    /// 0-based position among the questions of this sheet.
    pub order_index_sheet: usize,
    /// 0-based position among all questions of the template. For any
    /// extracted list, `list[i].order_index_global == i`.
    pub order_index_global: usize,

    /// A1 range of the located answer region, when one was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_cell_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_row_start: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_row_end: Option<u32>,

    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_value: Option<String>,
    /// Raw validation descriptor kind, when the question cell carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_type: Option<String>,

    /// Free-form annotations (detection method, owning section, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub source_metadata: BTreeMap<String, String>,
}

impl Question {
    /// Whether the question carries a located answer region.
    pub fn has_answer_block(&self) -> bool {
        self.answer_cell_range.is_some()
    }
}

fn no_section() -> i32 {
    -1
}

fn default_true() -> bool {
    true
}

/// Per-user progress through a trail, computed on demand from the ordered
/// question list and the user's answers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrailProgress {
    pub answered: usize,
    pub total: usize,
    /// `floor(answered / total * 100)`; `100` for an empty trail.
    pub percent: u8,
    /// First question in order with no matching answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_question: Option<Question>,
    pub is_complete: bool,
}

impl TrailProgress {
    pub fn new(answered: usize, total: usize, next_question: Option<Question>) -> Self {
        let percent = if total == 0 {
            100
        } else {
            (answered * 100 / total) as u8
        };
        Self {
            answered,
            total,
            percent,
            is_complete: next_question.is_none(),
            next_question,
        }
    }
}
