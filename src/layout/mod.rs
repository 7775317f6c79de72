//! Geometry, table flow, element placement and pagination.

pub mod engine;
pub mod flow;
pub mod geometry;
pub mod paginator;

pub use engine::{LayoutResult, Page, Placed, PlacedFragment, PositionedElement};
pub use flow::{RowMetrics, TableFragment, row_metrics};
pub use geometry::Rect;
pub use paginator::Paginator;

use crate::template::{PAGE_MARGIN, TemplateSpec};

/// Vertical gap added above the glyph box of a text line, and the constant
/// term of the table row height formula.
pub const LINE_SPACING: f32 = 2.0;

/// One section's reserved horizontal band on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub top: f32,
    pub height: f32,
}

impl Band {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Absolute band positions for the fixed section stacking order. Origins are
/// identical on every page; the pageFooter band is anchored to the bottom
/// margin, and the billHeader band is simply left empty on pages after the
/// first.
#[derive(Debug, Clone, Copy)]
pub struct SectionBands {
    pub page_header: Band,
    pub bill_header: Band,
    pub bill_content: Band,
    pub page_footer: Band,
}

impl SectionBands {
    pub fn from_spec(spec: &TemplateSpec) -> Self {
        let h = &spec.section_heights;
        let (_, page_height) = spec.page_size();
        let page_header = Band {
            top: PAGE_MARGIN,
            height: h.page_header,
        };
        let bill_header = Band {
            top: page_header.bottom(),
            height: h.bill_header,
        };
        let bill_content = Band {
            top: bill_header.bottom(),
            height: h.bill_content,
        };
        let page_footer = Band {
            top: page_height - PAGE_MARGIN - h.page_footer,
            height: h.page_footer,
        };
        SectionBands {
            page_header,
            bill_header,
            bill_content,
            page_footer,
        }
    }
}
