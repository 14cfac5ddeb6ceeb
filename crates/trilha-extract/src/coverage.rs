//! Independent re-verification of extraction invariants.
//!
//! The validator never repairs anything: a gap in the global order or a
//! duplicate field id indicates an extraction bug and must surface as-is.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use trilha_model::{Question, TrailSnapshot};

/// Outcome of coverage validation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Re-check, after extraction, that:
/// - every sheet of the snapshot contributed at least one question,
/// - `questions[i].order_index_global == i` exactly (no gaps, no duplicates),
/// - all field ids are pairwise distinct.
pub fn validate_coverage(questions: &[Question], snapshot: &TrailSnapshot) -> CoverageReport {
    let mut errors: Vec<String> = Vec::new();

    let covered: HashSet<usize> = questions.iter().map(|q| q.sheet_index).collect();
    for sheet in &snapshot.sheets {
        if !covered.contains(&sheet.index) {
            errors.push(format!(
                "sheet {:?} (index {}) contributed no questions",
                sheet.name, sheet.index
            ));
        }
    }

    for (position, question) in questions.iter().enumerate() {
        if question.order_index_global != position {
            errors.push(format!(
                "order_index_global {} at list position {} (field {})",
                question.order_index_global, position, question.field_id
            ));
        }
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for question in questions {
        if let Some(first) = seen.insert(question.field_id.as_str(), question.order_index_global) {
            errors.push(format!(
                "duplicate field_id {} at order indices {} and {}",
                question.field_id, first, question.order_index_global
            ));
        }
    }

    CoverageReport {
        ok: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trilha_model::{SheetSnapshot, SnapshotCell};

    fn question(field_id: &str, sheet_index: usize, global: usize) -> Question {
        Question {
            field_id: field_id.to_string(),
            sheet_index,
            sheet_name: format!("Sheet{sheet_index}"),
            row: global as u32,
            column: 0,
            cell_range: "A1".into(),
            section_name: None,
            section_index: -1,
            question_text: "Qual é a pergunta?".into(),
            inferred_type: Default::default(),
            order_index_sheet: 0,
            order_index_global: global,
            answer_cell_range: None,
            answer_row_start: None,
            answer_row_end: None,
            required: true,
            example_value: None,
            validation_type: None,
            source_metadata: Default::default(),
        }
    }

    fn snapshot(sheet_count: usize) -> TrailSnapshot {
        TrailSnapshot::new(
            (0..sheet_count)
                .map(|i| {
                    let mut sheet = SheetSnapshot::new(i, format!("Sheet{i}"));
                    sheet.cells.push(SnapshotCell::empty(0, 0));
                    sheet
                })
                .collect(),
        )
    }

    #[test]
    fn clean_list_passes() {
        let questions = vec![question("aa", 0, 0), question("bb", 0, 1), question("cc", 1, 2)];
        let report = validate_coverage(&questions, &snapshot(2));
        assert!(report.ok, "unexpected errors: {:?}", report.errors);
    }

    #[test]
    fn uncovered_sheet_is_reported() {
        let questions = vec![question("aa", 0, 0)];
        let report = validate_coverage(&questions, &snapshot(2));
        assert!(!report.ok);
        assert!(report.errors[0].contains("Sheet1"));
    }

    #[test]
    fn order_gap_is_reported() {
        let questions = vec![question("aa", 0, 0), question("bb", 0, 2)];
        let report = validate_coverage(&questions, &snapshot(1));
        assert!(!report.ok);
        assert!(report.errors.iter().any(|e| e.contains("order_index_global 2")));
    }

    #[test]
    fn duplicate_field_ids_are_reported_not_deduplicated() {
        let questions = vec![question("aa", 0, 0), question("aa", 0, 1)];
        let report = validate_coverage(&questions, &snapshot(1));
        assert!(!report.ok);
        assert!(report.errors.iter().any(|e| e.contains("duplicate field_id aa")));
    }
}
