use std::collections::BTreeMap;

use trilha_model::{Question, Range, SheetSnapshot, SnapshotCell, TrailSnapshot};

use crate::answer::locate_answer_block;
use crate::classify::{is_excluded_text, question_signal};
use crate::error::ExtractError;
use crate::field_id::field_id;
use crate::infer::infer_type;
use crate::report::AuditReport;
use crate::sections::{identify_sections, section_for_row};

/// Result of a successful extraction run.
#[derive(Clone, Debug, PartialEq)]
pub struct Extraction {
    /// Questions in reading order; `questions[i].order_index_global == i`.
    pub questions: Vec<Question>,
    pub report: AuditReport,
}

/// Walk the snapshot and extract its ordered question list.
///
/// Sheets are processed in snapshot order. Each sheet contributes its
/// questions with sheet-local order indices; the global order index is
/// assigned by folding sheet results in order, seeding each sheet's first
/// question with the running total of all prior sheets. The accumulator is
/// threaded explicitly so per-sheet extraction stays independent.
///
/// Fails with [`ExtractError::SheetWithoutQuestions`] when any sheet yields
/// zero questions.
pub fn extract(snapshot: &TrailSnapshot) -> Result<Extraction, ExtractError> {
    let mut questions: Vec<Question> = Vec::new();
    let mut report = AuditReport {
        sheet_count: snapshot.sheets.len(),
        ..AuditReport::default()
    };

    for sheet in &snapshot.sheets {
        let sheet_result = extract_sheet(sheet)?;
        report.section_count += sheet_result.section_count;
        report.warnings.extend(sheet_result.warnings);

        let global_base = questions.len();
        for (offset, mut question) in sheet_result.questions.into_iter().enumerate() {
            question.order_index_global = global_base + offset;
            questions.push(question);
        }
    }

    report.question_count = questions.len();
    Ok(Extraction { questions, report })
}

struct SheetExtraction {
    questions: Vec<Question>,
    warnings: Vec<String>,
    section_count: usize,
}

/// Extract one sheet's questions, with sheet-local order indices only.
fn extract_sheet(sheet: &SheetSnapshot) -> Result<SheetExtraction, ExtractError> {
    let sections = identify_sections(sheet);
    let cells = sheet.sorted_cells();

    let mut questions: Vec<Question> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    for cell in &cells {
        let Some(text) = cell.trimmed_text() else {
            continue;
        };
        let Some(signal) = question_signal(text) else {
            continue;
        };

        let section = section_for_row(&sections, cell.cell.row);
        let answer = locate_answer_block(cell.cell, sheet);
        if answer.is_none() {
            log::warn!(
                "no answer block for question at {}!{}: {text:?}",
                sheet.name,
                cell.cell
            );
            warnings.push(format!(
                "sheet {:?}: question at {} has no answer block",
                sheet.name,
                cell.cell.to_a1()
            ));
        }

        let cell_range = match sheet.merged_range_containing(cell.cell) {
            Some(merged) => merged,
            None => Range::single(cell.cell),
        };

        let mut source_metadata = BTreeMap::new();
        source_metadata.insert("detection".to_string(), signal.as_str().to_string());
        if let Some(section) = section {
            source_metadata.insert("section".to_string(), section.name.clone());
        }

        questions.push(Question {
            field_id: field_id(&sheet.name, cell.cell.row, cell.cell.col, text),
            sheet_index: sheet.index,
            sheet_name: sheet.name.clone(),
            row: cell.cell.row,
            column: cell.cell.col,
            cell_range: cell_range.to_string(),
            section_name: section.map(|s| s.name.clone()),
            section_index: section.map_or(-1, |s| s.index as i32),
            question_text: text.to_string(),
            inferred_type: infer_type(cell),
            order_index_sheet: questions.len(),
            order_index_global: 0, // assigned by the caller's fold
            answer_cell_range: answer.as_ref().map(|b| b.range.to_string()),
            answer_row_start: answer.as_ref().map(|b| b.row_start),
            answer_row_end: answer.as_ref().map(|b| b.row_end),
            required: true,
            example_value: find_example_value(&cells, cell.cell.row, cell.cell.col),
            validation_type: cell
                .validation
                .as_ref()
                .map(|v| v.kind.as_str().to_string()),
            source_metadata,
        });
    }

    if questions.is_empty() {
        return Err(ExtractError::SheetWithoutQuestions {
            sheet: sheet.name.clone(),
        });
    }

    log::debug!(
        "sheet {:?}: {} questions, {} sections",
        sheet.name,
        questions.len(),
        sections.len()
    );

    Ok(SheetExtraction {
        questions,
        warnings,
        section_count: sections.len(),
    })
}

/// Example text placed beside a question, when present: the first cell to
/// the right on the same row whose text carries an example marker.
fn find_example_value(cells: &[&SnapshotCell], row: u32, col: u32) -> Option<String> {
    cells
        .iter()
        .filter(|c| c.cell.row == row && c.cell.col > col)
        .filter_map(|c| c.trimmed_text())
        .find(|text| is_excluded_text(text))
        .map(str::to_string)
}
