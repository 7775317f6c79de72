//! Serializes finished pages into a PDF byte stream with `lopdf`.
//!
//! Template coordinates are top-down; every draw converts to the PDF's
//! bottom-up convention via `y' = page_height - y`. Elements are drawn in
//! the order the layout engine placed them, so any residual overlap stays
//! visually detectable by the diagnostic tool.

use crate::error::GenerationError;
use crate::layout::{Page, Placed, PlacedFragment, Rect};
use crate::template::TemplateSpec;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

const GRID_LINE_WIDTH: f32 = 0.5;

pub struct PdfRenderer {
    page_width: f32,
    page_height: f32,
}

impl PdfRenderer {
    pub fn new(spec: &TemplateSpec) -> Self {
        let (page_width, page_height) = spec.page_size();
        Self {
            page_width,
            page_height,
        }
    }

    /// Renders all pages into a single in-memory PDF document.
    pub fn render(&self, pages: &[Page]) -> Result<Vec<u8>, GenerationError> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for page in pages {
            let content = self.page_content(page);
            let encoded = content.encode()?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    0.into(), 0.into(),
                    self.page_width.into(), self.page_height.into(),
                ],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            dictionary! { "Type" => "Pages", "Kids" => kids, "Count" => count }.into(),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }

    fn page_content(&self, page: &Page) -> Content {
        let mut ctx = PageContext::new(self.page_height);
        for el in &page.elements {
            match &el.content {
                Placed::Text { text, font_size } => {
                    ctx.draw_text(el.rect.x, el.rect.y, text, *font_size);
                }
                Placed::Image { source } => {
                    // Image payload fetch is outside the engine; a bordered
                    // placeholder keeps the authored box visible.
                    ctx.stroke_rect(&el.rect);
                    ctx.draw_text(
                        el.rect.x + 2.0,
                        el.rect.y + 2.0,
                        source,
                        8.0,
                    );
                }
                Placed::TableFragment(frag) => ctx.draw_fragment(&el.rect, frag),
            }
        }
        ctx.finish()
    }
}

/// Accumulates content-stream operations for one page, tracking the current
/// font state to avoid redundant `Tf` operators.
struct PageContext {
    page_height: f32,
    operations: Vec<Operation>,
    font_size: f32,
}

impl PageContext {
    fn new(page_height: f32) -> Self {
        Self {
            page_height,
            operations: Vec::new(),
            font_size: 0.0,
        }
    }

    fn finish(self) -> Content {
        Content {
            operations: self.operations,
        }
    }

    /// Draws one line of text with its top edge at `y` (top-down).
    fn draw_text(&mut self, x: f32, y: f32, text: &str, font_size: f32) {
        if text.trim().is_empty() {
            return;
        }
        self.operations.push(Operation::new("BT", vec![]));
        if self.font_size != font_size {
            self.operations.push(Operation::new(
                "Tf",
                vec![Object::Name(b"F1".to_vec()), font_size.into()],
            ));
            self.font_size = font_size;
        }
        let baseline = y + font_size * 0.8;
        let pdf_y = self.page_height - baseline;
        self.operations
            .push(Operation::new("Td", vec![x.into(), pdf_y.into()]));
        self.operations.push(Operation::new(
            "Tj",
            vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
        ));
        self.operations.push(Operation::new("ET", vec![]));
    }

    fn stroke_rect(&mut self, rect: &Rect) {
        let pdf_y = self.page_height - rect.bottom();
        self.operations
            .push(Operation::new("w", vec![GRID_LINE_WIDTH.into()]));
        self.operations.push(Operation::new(
            "re",
            vec![
                rect.x.into(),
                pdf_y.into(),
                rect.width.into(),
                rect.height.into(),
            ],
        ));
        self.operations.push(Operation::new("S", vec![]));
    }

    fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) {
        self.operations
            .push(Operation::new("w", vec![GRID_LINE_WIDTH.into()]));
        self.operations.push(Operation::new(
            "m",
            vec![x0.into(), (self.page_height - y0).into()],
        ));
        self.operations.push(Operation::new(
            "l",
            vec![x1.into(), (self.page_height - y1).into()],
        ));
        self.operations.push(Operation::new("S", vec![]));
    }

    /// Draws one table fragment: outer border, grid lines, the header row
    /// (always present; continuations carry `reprint_header`), then the data
    /// rows of this fragment's range.
    fn draw_fragment(&mut self, rect: &Rect, frag: &PlacedFragment) {
        self.stroke_rect(rect);

        // Vertical separators at the cumulative column edges.
        let mut edge = rect.x;
        for width in &frag.col_widths[..frag.col_widths.len().saturating_sub(1)] {
            edge += width;
            self.line(edge, rect.y, edge, rect.bottom());
        }

        let mut row_top = rect.y;
        self.draw_row(rect.x, row_top, &frag.header, frag);
        row_top += frag.header_row_height;
        self.line(rect.x, row_top, rect.right(), row_top);

        for cells in &frag.cells {
            self.draw_row(rect.x, row_top, cells, frag);
            row_top += frag.row_height;
            if row_top < rect.bottom() {
                self.line(rect.x, row_top, rect.right(), row_top);
            }
        }
    }

    fn draw_row(&mut self, x: f32, row_top: f32, cells: &[String], frag: &PlacedFragment) {
        let mut cell_x = x;
        for (text, width) in cells.iter().zip(&frag.col_widths) {
            self.draw_text(
                cell_x + frag.cell_padding,
                row_top + frag.cell_padding,
                text,
                frag.font_size,
            );
            cell_x += width;
        }
    }
}

fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| if c as u32 <= 255 { c as u8 } else { b'?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_latin1_chars_are_substituted() {
        assert_eq!(to_win_ansi("Total: 5€?"), b"Total: 5??".to_vec());
        assert_eq!(to_win_ansi("plain"), b"plain".to_vec());
    }
}
