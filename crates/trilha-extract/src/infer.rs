use trilha_model::{CellDataType, InferredType, SnapshotCell, ValidationKind};

/// Infer the expected response type for a question cell.
///
/// Sources are consulted in priority order: validation descriptor, then
/// number format, then the producer's data-type tag, defaulting to
/// [`InferredType::TextShort`]. A `Custom` validation carries no type
/// information and falls through to the next source.
pub fn infer_type(cell: &SnapshotCell) -> InferredType {
    if let Some(validation) = &cell.validation {
        match validation.kind {
            ValidationKind::List => return InferredType::Choice,
            ValidationKind::Whole | ValidationKind::Decimal => return InferredType::Number,
            ValidationKind::Date => return InferredType::Date,
            ValidationKind::TextLength => return InferredType::TextLong,
            ValidationKind::Custom => {}
        }
    }

    if let Some(format) = &cell.number_format {
        if let Some(inferred) = type_from_number_format(format) {
            return inferred;
        }
    }

    match cell.data_type {
        CellDataType::Number => InferredType::Number,
        CellDataType::Date => InferredType::Date,
        _ => InferredType::TextShort,
    }
}

/// Date formats contain day/month/year tokens; numeric formats contain
/// digit placeholders. `@` (text) and `General` yield nothing.
fn type_from_number_format(format: &str) -> Option<InferredType> {
    let lower = format.to_ascii_lowercase();
    if lower == "general" || lower.contains('@') {
        return None;
    }
    if lower.contains("dd") || lower.contains("mm") || lower.contains("yy") || lower.contains("aaaa")
    {
        return Some(InferredType::Date);
    }
    if lower.contains('0') || lower.contains('#') || lower.contains('%') {
        return Some(InferredType::Number);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use trilha_model::Validation;

    fn cell_with_validation(kind: ValidationKind) -> SnapshotCell {
        let mut cell = SnapshotCell::text(0, 0, "Qual é o prazo?");
        cell.validation = Some(Validation {
            kind,
            descriptor: None,
        });
        cell
    }

    #[test]
    fn validation_kind_wins() {
        assert_eq!(
            infer_type(&cell_with_validation(ValidationKind::List)),
            InferredType::Choice
        );
        assert_eq!(
            infer_type(&cell_with_validation(ValidationKind::Whole)),
            InferredType::Number
        );
        assert_eq!(
            infer_type(&cell_with_validation(ValidationKind::Date)),
            InferredType::Date
        );
        assert_eq!(
            infer_type(&cell_with_validation(ValidationKind::TextLength)),
            InferredType::TextLong
        );
    }

    #[test]
    fn custom_validation_falls_through_to_format() {
        let mut cell = cell_with_validation(ValidationKind::Custom);
        cell.number_format = Some("#,##0.00".into());
        assert_eq!(infer_type(&cell), InferredType::Number);
    }

    #[test]
    fn number_format_beats_data_type() {
        let mut cell = SnapshotCell::text(0, 0, "Quando foi fundada?");
        cell.number_format = Some("dd/mm/yyyy".into());
        assert_eq!(infer_type(&cell), InferredType::Date);
    }

    #[test]
    fn text_format_and_general_are_ignored() {
        let mut cell = SnapshotCell::text(0, 0, "Qual é o nome?");
        cell.number_format = Some("General".into());
        assert_eq!(infer_type(&cell), InferredType::TextShort);
        cell.number_format = Some("@".into());
        assert_eq!(infer_type(&cell), InferredType::TextShort);
    }

    #[test]
    fn defaults_to_short_text() {
        let cell = SnapshotCell::text(0, 0, "Qual é o nome?");
        assert_eq!(infer_type(&cell), InferredType::TextShort);
    }
}
