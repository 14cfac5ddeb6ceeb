//! `trilha-extract` turns a structural spreadsheet snapshot into the ordered
//! question list of a trail template.
//!
//! The pipeline has three stages, run fail-fast by [`ingest`]:
//! 1. snapshot validation ([`trilha_model::TrailSnapshot::validate`])
//! 2. question extraction ([`extract`]): section identification, question
//!    classification, answer-block location, field identity, ordering
//! 3. coverage validation ([`validate_coverage`]): every sheet contributed,
//!    global order is gap-free, field ids are distinct
//!
//! Extraction is deterministic: re-ingesting an unchanged snapshot reproduces
//! identical field ids in identical order.

mod answer;
mod classify;
mod engine;
mod error;
mod field_id;
mod infer;
mod ingest;
mod report;
mod sections;

pub mod coverage;

pub use answer::{locate_answer_block, AnswerBlock};
pub use classify::{classify_cell, CellClassification, QuestionSignal};
pub use coverage::{validate_coverage, CoverageReport};
pub use engine::{extract, Extraction};
pub use error::ExtractError;
pub use field_id::{field_id, FIELD_ID_LEN};
pub use infer::infer_type;
pub use ingest::{ingest, IngestFailure, Ingestion};
pub use report::{AuditReport, IngestReport, IngestStage, StageOutcome, StageStatus};
pub use sections::{identify_sections, section_for_row};
