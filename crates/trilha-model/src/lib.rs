//! `trilha-model` defines the core in-memory data structures for trail
//! templates.
//!
//! The crate is intentionally self-contained so it can be reused by:
//! - the extraction pipeline (`trilha-extract`)
//! - the persistence/sequencing layer (`trilha-storage`)
//! - HTTP/IPC boundaries via `serde` (JSON-safe schema)

mod address;
mod question;
mod snapshot;
mod style;
mod value;

pub use address::{A1ParseError, CellRef, Range, RangeParseError};
pub use question::{
    InferredType, Question, Section, TrailProgress, OPEN_ROW_END,
};
pub use snapshot::{
    CellDataType, SheetSnapshot, SnapshotCell, SnapshotError, TrailSnapshot, Validation,
    ValidationKind,
};
pub use style::{CellStyle, Color};
pub use value::CellValue;
