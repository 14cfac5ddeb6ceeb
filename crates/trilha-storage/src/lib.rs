//! SQLite-backed storage for Trilha trails.
//!
//! This crate is intentionally self-contained so it can sit behind any
//! transport layer later. It exposes:
//! - SQLite schema creation/migration
//! - Template and question persistence (uniqueness scoped to
//!   `(template_id, field_id)`, never global)
//! - The Trail Sequencing Authority: `next_unanswered`,
//!   `validate_sequence`, `submit_answer`, `progress`
//!
//! The sequencing operations are server-authoritative: every submission
//! re-verifies the answering order; a client-supplied "this is the next
//! question" claim is never trusted.

mod schema;
mod sequence;
pub mod storage;

pub use sequence::{AnswerRecord, SequenceCheck};
pub use storage::{Result, Storage, StorageError, TemplateMeta};
