use thiserror::Error;
use trilha_model::{Question, TrailSnapshot};

use crate::coverage::validate_coverage;
use crate::engine::extract;
use crate::error::ExtractError;
use crate::report::{IngestReport, IngestStage, StageStatus};

/// Result of a successful ingestion run.
#[derive(Clone, Debug, PartialEq)]
pub struct Ingestion {
    pub questions: Vec<Question>,
    pub report: IngestReport,
}

/// A failed ingestion: the underlying error plus the per-stage report up to
/// and including the failing stage. No partial question list is carried.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("trail ingestion failed during {stage}: {error}")]
pub struct IngestFailure {
    pub stage: IngestStage,
    #[source]
    pub error: ExtractError,
    pub report: IngestReport,
}

/// Run the full ingestion pipeline: snapshot validation, question
/// extraction, coverage validation. Stages run strictly in order and the
/// first failure aborts the run.
pub fn ingest(snapshot: &TrailSnapshot) -> Result<Ingestion, IngestFailure> {
    let mut report = IngestReport {
        sheet_count: snapshot.sheets.len(),
        ..IngestReport::default()
    };

    if let Err(err) = snapshot.validate() {
        let error = ExtractError::from(err);
        report
            .stages
            .push(StageStatus::failed(IngestStage::SnapshotValidation, error.to_string()));
        report
            .stages
            .push(StageStatus::skipped(IngestStage::QuestionExtraction));
        report
            .stages
            .push(StageStatus::skipped(IngestStage::CoverageValidation));
        return Err(IngestFailure {
            stage: IngestStage::SnapshotValidation,
            error,
            report,
        });
    }
    report
        .stages
        .push(StageStatus::passed(IngestStage::SnapshotValidation));

    let extraction = match extract(snapshot) {
        Ok(extraction) => extraction,
        Err(error) => {
            report
                .stages
                .push(StageStatus::failed(IngestStage::QuestionExtraction, error.to_string()));
            report
                .stages
                .push(StageStatus::skipped(IngestStage::CoverageValidation));
            return Err(IngestFailure {
                stage: IngestStage::QuestionExtraction,
                error,
                report,
            });
        }
    };
    report
        .stages
        .push(StageStatus::passed(IngestStage::QuestionExtraction));
    report.question_count = extraction.report.question_count;
    report.warnings = extraction.report.warnings.clone();

    let coverage = validate_coverage(&extraction.questions, snapshot);
    if !coverage.ok {
        let error = ExtractError::CoverageBroken {
            errors: coverage.errors,
        };
        report
            .stages
            .push(StageStatus::failed(IngestStage::CoverageValidation, error.to_string()));
        return Err(IngestFailure {
            stage: IngestStage::CoverageValidation,
            error,
            report,
        });
    }
    report
        .stages
        .push(StageStatus::passed(IngestStage::CoverageValidation));

    Ok(Ingestion {
        questions: extraction.questions,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::StageOutcome;
    use pretty_assertions::assert_eq;
    use trilha_model::{SheetSnapshot, SnapshotCell, SnapshotError};

    fn question_sheet(index: usize, name: &str) -> SheetSnapshot {
        let mut sheet = SheetSnapshot::new(index, name);
        sheet.cells.push(SnapshotCell::text(0, 0, "Qual é a meta?"));
        sheet.cells.push(SnapshotCell::empty(1, 0));
        sheet
    }

    #[test]
    fn all_stages_pass_on_a_good_snapshot() {
        let snapshot = TrailSnapshot::new(vec![question_sheet(0, "Plano")]);
        let ingestion = ingest(&snapshot).unwrap();

        assert_eq!(ingestion.questions.len(), 1);
        assert_eq!(ingestion.report.stages.len(), 3);
        assert!(ingestion
            .report
            .stages
            .iter()
            .all(|s| s.outcome == StageOutcome::Passed));
        assert_eq!(ingestion.report.question_count, 1);
    }

    #[test]
    fn invalid_snapshot_skips_later_stages() {
        let failure = ingest(&TrailSnapshot::default()).unwrap_err();

        assert_eq!(failure.stage, IngestStage::SnapshotValidation);
        assert_eq!(
            failure.error,
            ExtractError::SnapshotInvalid(SnapshotError::NoSheets)
        );
        assert_eq!(failure.report.stages[0].outcome, StageOutcome::Failed);
        assert_eq!(failure.report.stages[1].outcome, StageOutcome::Skipped);
        assert_eq!(failure.report.stages[2].outcome, StageOutcome::Skipped);
    }

    #[test]
    fn zero_question_sheet_fails_the_extraction_stage() {
        let mut empty = SheetSnapshot::new(1, "Capa");
        empty.cells.push(SnapshotCell::text(0, 0, "Apresentação"));
        let snapshot = TrailSnapshot::new(vec![question_sheet(0, "Plano"), empty]);

        let failure = ingest(&snapshot).unwrap_err();
        assert_eq!(failure.stage, IngestStage::QuestionExtraction);
        assert_eq!(
            failure.error,
            ExtractError::SheetWithoutQuestions {
                sheet: "Capa".into()
            }
        );
        let detail = failure.report.stages[1].detail.as_deref().unwrap();
        assert!(detail.contains("Capa"));
    }

    #[test]
    fn failure_report_serializes() {
        let failure = ingest(&TrailSnapshot::default()).unwrap_err();
        let json = serde_json::to_value(&failure.report).unwrap();
        assert_eq!(json["stages"][0]["outcome"], "failed");
    }
}
