use core::fmt;

use serde::{Deserialize, Serialize};

/// Summary of one extraction run, returned alongside the question list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub sheet_count: usize,
    pub question_count: usize,
    pub section_count: usize,
    /// Non-fatal findings (e.g. questions without a located answer block).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// The three sequential stages of trail ingestion.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStage {
    SnapshotValidation,
    QuestionExtraction,
    CoverageValidation,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IngestStage::SnapshotValidation => "snapshot validation",
            IngestStage::QuestionExtraction => "question extraction",
            IngestStage::CoverageValidation => "coverage validation",
        };
        f.write_str(name)
    }
}

/// Outcome of one ingestion stage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome {
    Passed,
    Failed,
    /// A preceding stage failed, so this one never ran.
    Skipped,
}

/// Human-readable status of one ingestion stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStatus {
    pub stage: IngestStage,
    pub outcome: StageOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl StageStatus {
    pub fn passed(stage: IngestStage) -> Self {
        Self {
            stage,
            outcome: StageOutcome::Passed,
            detail: None,
        }
    }

    pub fn failed(stage: IngestStage, detail: impl Into<String>) -> Self {
        Self {
            stage,
            outcome: StageOutcome::Failed,
            detail: Some(detail.into()),
        }
    }

    pub fn skipped(stage: IngestStage) -> Self {
        Self {
            stage,
            outcome: StageOutcome::Skipped,
            detail: None,
        }
    }
}

/// Structured per-stage report of an ingestion run, successful or not.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    #[serde(default)]
    pub stages: Vec<StageStatus>,
    pub sheet_count: usize,
    pub question_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
