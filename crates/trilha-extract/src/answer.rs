use serde::{Deserialize, Serialize};
use trilha_model::{CellRef, CellValue, Range, SheetSnapshot};

/// Maximum text length (in characters) for a cell to qualify as an answer
/// slot. Longer text reads as another question or a pre-filled paragraph.
const MAX_ANSWER_TEXT_CHARS: usize = 100;

/// The located response region for a question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerBlock {
    /// Full extent of the region (merged range, or a single cell).
    pub range: Range,
    pub row_start: u32,
    pub row_end: u32,
}

/// Find the response region for the question at `question`.
///
/// Scans the sheet's cells in ascending row order, restricted to the
/// question's column, and picks the first cell strictly below the question
/// whose value is empty or a short string. Formula cells never qualify.
/// When the candidate belongs to a merged range, the whole range is the
/// answer extent; otherwise the single cell is, with `row_end == row_start`.
///
/// The search is downward-only; there is deliberately no rightward fallback.
/// Returns `None` when no candidate exists; the caller records a warning
/// and extraction proceeds.
pub fn locate_answer_block(question: CellRef, sheet: &SheetSnapshot) -> Option<AnswerBlock> {
    for cell in sheet.sorted_cells() {
        if cell.cell.col != question.col || cell.cell.row <= question.row {
            continue;
        }
        if cell.is_formula() {
            continue;
        }

        let qualifies = match &cell.value {
            CellValue::Empty => true,
            CellValue::Text(text) => text.chars().count() < MAX_ANSWER_TEXT_CHARS,
            _ => false,
        };
        if !qualifies {
            continue;
        }

        let block = match sheet.merged_range_containing(cell.cell) {
            Some(merged) => AnswerBlock {
                range: merged,
                row_start: merged.start.row,
                row_end: merged.end.row,
            },
            None => AnswerBlock {
                range: Range::single(cell.cell),
                row_start: cell.cell.row,
                row_end: cell.cell.row,
            },
        };
        return Some(block);
    }

    None
}
