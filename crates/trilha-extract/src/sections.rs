use trilha_model::{Section, SheetSnapshot, OPEN_ROW_END};

use crate::classify::{classify_cell, CellClassification};

/// Partition a sheet's rows into labeled sections.
///
/// Cells are scanned in reading order; a cell opens a new section when it
/// classifies as a section header (keyword or title style, see
/// [`classify_cell`]). Each section's `row_end` is fixed to one less than
/// the next section's `row_start`; the last section stays open-ended.
///
/// When several header cells share a row, the first one in reading order
/// names the section.
pub fn identify_sections(sheet: &SheetSnapshot) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();

    for cell in sheet.sorted_cells() {
        let Some(text) = cell.trimmed_text() else {
            continue;
        };
        if classify_cell(text, &cell.style) != CellClassification::SectionHeader {
            continue;
        }
        if sections
            .last()
            .is_some_and(|prev| prev.row_start == cell.cell.row)
        {
            continue;
        }

        if let Some(prev) = sections.last_mut() {
            prev.row_end = cell.cell.row - 1;
        }
        sections.push(Section {
            index: sections.len(),
            name: text.to_string(),
            row_start: cell.cell.row,
            row_end: OPEN_ROW_END,
        });
    }

    sections
}

/// The section covering `row`, if any.
///
/// Rows above the first section header fall outside every section and get
/// `None` (such questions carry `section_index = -1`).
pub fn section_for_row(sections: &[Section], row: u32) -> Option<&Section> {
    sections.iter().find(|s| s.covers_row(row))
}
