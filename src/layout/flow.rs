//! Table flow calculation: turning a row count and row height into fragment
//! boundaries that honor the content band capacity.
//!
//! Rows are not individually sized; every data row uses the same height
//! formula as the header row. A row whose bottom edge would cross a band
//! boundary is never split, it moves entirely to the next fragment.

use super::LINE_SPACING;
use crate::error::GenerationError;
use crate::template::TableDef;
use std::ops::Range;

// Guards the floor() against accumulated float error when the available
// space is an exact multiple of the row height.
const EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMetrics {
    pub header_row_height: f32,
    pub row_height: f32,
}

pub fn row_metrics(def: &TableDef) -> RowMetrics {
    let height = def.font_size + 2.0 * def.cell_padding + LINE_SPACING;
    RowMetrics {
        header_row_height: height,
        row_height: height,
    }
}

/// The portion of a table's rows assigned to a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFragment {
    pub table_index: usize,
    /// Row index range covered by this fragment (empty for a header-only
    /// fragment).
    pub rows: Range<usize>,
    /// Top edge relative to the billContent band origin.
    pub start_y: f32,
    pub height: f32,
    /// 0 places the fragment on the table's anchor page; each following
    /// offset takes a fresh page of its own.
    pub page_offset: usize,
    pub is_continuation: bool,
    pub reprint_header: bool,
}

/// Splits a table into fragments given its anchor position and the band
/// height. Continuation fragments each occupy the full band on their own
/// page and reprint the header row.
pub fn plan_fragments(
    def: &TableDef,
    table_index: usize,
    row_count: usize,
    anchor_y: f32,
    band_height: f32,
) -> Result<Vec<TableFragment>, GenerationError> {
    let m = row_metrics(def);
    if m.header_row_height > band_height {
        return Err(GenerationError::LayoutOverflow(format!(
            "table {table_index} header row ({:.1}pt) is taller than the content band ({band_height:.1}pt)",
            m.header_row_height
        )));
    }
    let per_page = fit_rows(band_height - m.header_row_height, m.row_height);
    if row_count > 0 && per_page == 0 {
        return Err(GenerationError::LayoutOverflow(format!(
            "table {table_index} cannot fit a single row ({:.1}pt) below its header on an empty page",
            m.row_height
        )));
    }

    let mut fragments = Vec::new();
    let mut next_row = 0usize;

    // Portion on the anchor page. A fragment that would hold the header but
    // none of a non-empty table's rows is skipped; the whole table moves to
    // the next page instead of stranding a lone header row.
    let available = band_height - anchor_y;
    if available + EPSILON >= m.header_row_height {
        let fit = fit_rows(available - m.header_row_height, m.row_height).min(row_count);
        if row_count == 0 || fit > 0 {
            fragments.push(TableFragment {
                table_index,
                rows: 0..fit,
                start_y: anchor_y,
                height: m.header_row_height + fit as f32 * m.row_height,
                page_offset: 0,
                is_continuation: false,
                reprint_header: false,
            });
            next_row = fit;
        }
    }

    let mut page_offset = 0usize;
    while next_row < row_count || fragments.is_empty() {
        page_offset += 1;
        let take = per_page.min(row_count - next_row);
        let first = fragments.is_empty();
        fragments.push(TableFragment {
            table_index,
            rows: next_row..next_row + take,
            start_y: 0.0,
            height: m.header_row_height + take as f32 * m.row_height,
            page_offset,
            is_continuation: !first,
            reprint_header: !first,
        });
        next_row += take;
        if row_count == 0 {
            break;
        }
    }

    Ok(fragments)
}

fn fit_rows(available: f32, row_height: f32) -> usize {
    if available <= 0.0 {
        return 0;
    }
    ((available + EPSILON) / row_height).floor() as usize
}
