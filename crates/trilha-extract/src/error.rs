use thiserror::Error;
use trilha_model::SnapshotError;

/// Fatal extraction-pipeline errors. Non-fatal conditions (e.g. a missing
/// answer block) go into the audit report's warnings instead.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The structural snapshot is malformed or empty.
    #[error("invalid snapshot: {0}")]
    SnapshotInvalid(#[from] SnapshotError),

    /// A sheet yielded zero questions. A template with an entirely
    /// non-question sheet is malformed, not merely empty.
    #[error("sheet {sheet:?} produced no questions")]
    SheetWithoutQuestions { sheet: String },

    /// Post-hoc coverage invariants failed: a gap in the global order or
    /// duplicate field ids. Indicates an extraction bug; never patched.
    #[error("coverage validation failed: {}", errors.join("; "))]
    CoverageBroken { errors: Vec<String> },
}
