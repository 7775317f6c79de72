//! Element placement with growth-aware overlap resolution.
//!
//! Table anchors are authored as static coordinates, so a preceding table's
//! row growth can push its bottom edge past the anchor of a later element.
//! Placement therefore checks every new item against everything already on
//! the page and reflows the later item downward by the overlapping delta
//! (cascading to subsequent items), unless the item is pinned, in which case
//! the overlap is kept and reported as a warning.

use super::flow::TableFragment;
use super::geometry::Rect;
use super::{Band, LINE_SPACING};
use crate::error::{GenerationError, GenerationWarning};
use crate::template::{ElementDef, ElementKind, PAGE_MARGIN, ResolvedRows, TableDef, TemplateSpec};
use log::{debug, warn};

// Average glyph advance as a fraction of the font size, for the built-in
// Helvetica. Good enough for collision boxes; this engine does no shaping.
const CHAR_WIDTH_FACTOR: f32 = 0.6;

/// An element resolved to absolute page coordinates.
#[derive(Debug, Clone)]
pub struct PositionedElement {
    pub id: String,
    pub rect: Rect,
    pub pinned: bool,
    pub overlay: bool,
    pub content: Placed,
}

/// The exhaustive set of renderable content kinds. Every consumer matches
/// all variants; there is no "unknown element" fallthrough.
#[derive(Debug, Clone)]
pub enum Placed {
    Text { text: String, font_size: f32 },
    Image { source: String },
    TableFragment(PlacedFragment),
}

/// A table fragment with its cell text resolved, ready to draw.
#[derive(Debug, Clone)]
pub struct PlacedFragment {
    pub table_index: usize,
    pub fragment: TableFragment,
    pub header: Vec<String>,
    pub cells: Vec<Vec<String>>,
    pub col_widths: Vec<f32>,
    pub header_row_height: f32,
    pub row_height: f32,
    pub cell_padding: f32,
    pub font_size: f32,
}

#[derive(Debug)]
pub struct Page {
    pub index: usize,
    pub elements: Vec<PositionedElement>,
}

impl Page {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            elements: Vec::new(),
        }
    }
}

/// Pages plus the non-fatal warnings collected while producing them.
#[derive(Debug)]
pub struct LayoutResult {
    pub pages: Vec<Page>,
    pub warnings: Vec<GenerationWarning>,
}

pub(crate) enum Placement {
    Placed,
    /// Placed at the authored position despite an overlap (pinned item);
    /// carries the ids of the colliding elements.
    PlacedWithOverlap(Vec<String>),
    /// Reflow pushed the item past the band; it needs a fresh page.
    Deferred(PositionedElement),
}

/// Places `item` on the page, reflowing it downward past any non-overlay
/// blocker until it either fits without overlap or leaves the band.
pub(crate) fn place_on_page(page: &mut Page, mut item: PositionedElement, band_bottom: f32) -> Placement {
    if item.overlay {
        page.elements.push(item);
        return Placement::Placed;
    }
    loop {
        match find_blocker(page, &item.rect) {
            None => {
                page.elements.push(item);
                return Placement::Placed;
            }
            Some((blocker_id, blocker_bottom)) => {
                if item.pinned {
                    let ids = vec![blocker_id, item.id.clone()];
                    warn!("pinned element `{}` overlaps `{}`", item.id, ids[0]);
                    page.elements.push(item);
                    return Placement::PlacedWithOverlap(ids);
                }
                let delta = blocker_bottom - item.rect.y;
                debug!(
                    "reflowing `{}` down by {delta:.1}pt past `{blocker_id}` on page {}",
                    item.id, page.index
                );
                item.rect.y += delta;
                if item.rect.bottom() > band_bottom {
                    return Placement::Deferred(item);
                }
            }
        }
    }
}

/// Places an element of a fixed section (page/bill header, footers). These
/// never move to another page: if reflow would leave the band, the element
/// keeps its authored position and the overlap is reported.
pub(crate) fn place_fixed(
    page: &mut Page,
    item: PositionedElement,
    band: &Band,
    warnings: &mut Vec<GenerationWarning>,
) {
    let original = item.clone();
    match place_on_page(page, item, band.bottom()) {
        Placement::Placed => {}
        Placement::PlacedWithOverlap(element_ids) => {
            warnings.push(GenerationWarning::LayoutOverflow { element_ids });
        }
        Placement::Deferred(moved) => {
            let mut element_ids = vec![moved.id.clone()];
            if let Some((blocker_id, _)) = find_blocker(page, &original.rect) {
                element_ids.insert(0, blocker_id);
            }
            warnings.push(GenerationWarning::LayoutOverflow { element_ids });
            page.elements.push(original);
        }
    }
}

/// The first already-placed, non-overlay element intersecting `rect`, with
/// its bottom edge.
pub(crate) fn find_blocker(page: &Page, rect: &Rect) -> Option<(String, f32)> {
    page.elements
        .iter()
        .filter(|el| !el.overlay)
        .find(|el| el.rect.intersects(rect))
        .map(|el| (el.id.clone(), el.rect.bottom()))
}

/// Turns an authored element into a positioned one, resolving its bind from
/// the scalar details. Misses render blank; they were already reported by
/// [`validate_bindings`].
pub(crate) fn materialize_element(
    def: &ElementDef,
    band: &Band,
    rows: &ResolvedRows<'_>,
) -> PositionedElement {
    let text = match &def.bind {
        Some(bind) => rows.detail(bind).into_text(),
        None => def.label.clone(),
    };
    let (rect, content) = match def.kind {
        ElementKind::Text => (
            Rect::new(
                PAGE_MARGIN + def.x,
                band.top + def.y,
                text_width(&text, def.font_size),
                text_height(def.font_size),
            ),
            Placed::Text {
                text,
                font_size: def.font_size,
            },
        ),
        ElementKind::Image => (
            Rect::new(
                PAGE_MARGIN + def.x,
                band.top + def.y,
                def.width.unwrap_or_default(),
                def.height.unwrap_or_default(),
            ),
            Placed::Image { source: text },
        ),
    };
    PositionedElement {
        id: def.label.clone(),
        rect,
        pinned: def.pinned,
        overlay: def.overlay,
        content,
    }
}

/// Builds the positioned element for one table fragment, resolving every
/// cell of its row range.
pub(crate) fn materialize_fragment(
    def: &TableDef,
    fragment: TableFragment,
    band: &Band,
    rows: &ResolvedRows<'_>,
) -> PositionedElement {
    let metrics = super::flow::row_metrics(def);
    let header: Vec<String> = def.columns.iter().map(|c| c.label.clone()).collect();
    let cells: Vec<Vec<String>> = fragment
        .rows
        .clone()
        .map(|row| {
            def.columns
                .iter()
                .map(|col| rows.cell(row, &col.bind).into_text())
                .collect()
        })
        .collect();
    let id = format!(
        "table{} rows {}..{}",
        fragment.table_index, fragment.rows.start, fragment.rows.end
    );
    let rect = Rect::new(
        PAGE_MARGIN + def.x,
        band.top + fragment.start_y,
        def.width,
        fragment.height,
    );
    PositionedElement {
        id,
        rect,
        pinned: def.pinned,
        overlay: false,
        content: Placed::TableFragment(PlacedFragment {
            table_index: fragment.table_index,
            header,
            cells,
            col_widths: def.columns.iter().map(|c| c.width).collect(),
            header_row_height: metrics.header_row_height,
            row_height: metrics.row_height,
            cell_padding: def.cell_padding,
            font_size: def.font_size,
            fragment,
        }),
    }
}

/// Checks every bind of the template against the data set once, up front.
/// Individual misses become warnings (the affected cells render blank); a
/// table none of whose column binds match any data column cannot determine
/// its content at all and is fatal.
pub(crate) fn validate_bindings(
    spec: &TemplateSpec,
    rows: &ResolvedRows<'_>,
    warnings: &mut Vec<GenerationWarning>,
) -> Result<(), GenerationError> {
    let sections = [
        ("header", &spec.header),
        ("page header", &spec.page_header),
        ("page footer", &spec.page_footer),
        ("bill header", &spec.bill_header),
        ("bill footer", &spec.bill_footer),
        ("bill content", &spec.bill_content),
    ];
    for (section, elements) in sections {
        for el in elements {
            if let Some(bind) = &el.bind
                && rows.detail(bind) == crate::template::BindValue::Missing
            {
                warn!("bind `{bind}` of {section} element `{}` has no value", el.label);
                warnings.push(GenerationWarning::MissingBinding {
                    bind: bind.clone(),
                    context: format!("{section} element `{}`", el.label),
                });
            }
        }
    }

    if rows.row_count() == 0 {
        // No rows means no cells to resolve; the column set is undefined.
        return Ok(());
    }
    for (i, table) in spec.bill_content_tables.iter().enumerate() {
        let mut resolved = 0usize;
        for col in &table.columns {
            if rows.has_column(&col.bind) {
                resolved += 1;
            } else {
                warn!("bind `{}` of table {i} column `{}` matches no data column", col.bind, col.label);
                warnings.push(GenerationWarning::MissingBinding {
                    bind: col.bind.clone(),
                    context: format!("table {i} column `{}`", col.label),
                });
            }
        }
        if resolved == 0 {
            return Err(GenerationError::MissingBinding {
                bind: table.columns[0].bind.clone(),
                message: format!("none of table {i}'s column binds match any data column"),
            });
        }
    }
    Ok(())
}

pub(crate) fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * CHAR_WIDTH_FACTOR
}

pub(crate) fn text_height(font_size: f32) -> f32 {
    font_size + LINE_SPACING
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_item(id: &str, rect: Rect, pinned: bool) -> PositionedElement {
        PositionedElement {
            id: id.to_string(),
            rect,
            pinned,
            overlay: false,
            content: Placed::Text {
                text: id.to_string(),
                font_size: 10.0,
            },
        }
    }

    #[test]
    fn non_overlapping_item_is_placed_as_authored() {
        let mut page = Page::new(0);
        page.elements.push(text_item("a", Rect::new(0.0, 0.0, 100.0, 20.0), false));
        let item = text_item("b", Rect::new(0.0, 30.0, 100.0, 20.0), false);
        assert!(matches!(
            place_on_page(&mut page, item, 500.0),
            Placement::Placed
        ));
        assert_eq!(page.elements[1].rect.y, 30.0);
    }

    #[test]
    fn overlapping_item_reflows_by_the_exact_delta() {
        let mut page = Page::new(0);
        page.elements.push(text_item("a", Rect::new(0.0, 0.0, 100.0, 240.0), false));
        let item = text_item("b", Rect::new(0.0, 100.0, 100.0, 20.0), false);
        assert!(matches!(
            place_on_page(&mut page, item, 500.0),
            Placement::Placed
        ));
        assert_eq!(page.elements[1].rect.y, 240.0);
    }

    #[test]
    fn pinned_item_stays_and_reports_the_collision() {
        let mut page = Page::new(0);
        page.elements.push(text_item("a", Rect::new(0.0, 0.0, 100.0, 240.0), false));
        let item = text_item("b", Rect::new(0.0, 100.0, 100.0, 20.0), true);
        match place_on_page(&mut page, item, 500.0) {
            Placement::PlacedWithOverlap(ids) => {
                assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
            }
            _ => panic!("expected a reported overlap"),
        }
        assert_eq!(page.elements[1].rect.y, 100.0);
    }

    #[test]
    fn reflow_past_the_band_defers_the_item() {
        let mut page = Page::new(0);
        page.elements.push(text_item("a", Rect::new(0.0, 0.0, 100.0, 240.0), false));
        let item = text_item("b", Rect::new(0.0, 100.0, 100.0, 20.0), false);
        assert!(matches!(
            place_on_page(&mut page, item, 250.0),
            Placement::Deferred(_)
        ));
        assert_eq!(page.elements.len(), 1);
    }

    #[test]
    fn overlay_items_skip_the_check_entirely() {
        let mut page = Page::new(0);
        page.elements.push(text_item("a", Rect::new(0.0, 0.0, 100.0, 240.0), false));
        let mut item = text_item("mark", Rect::new(0.0, 100.0, 100.0, 20.0), false);
        item.overlay = true;
        assert!(matches!(
            place_on_page(&mut page, item, 500.0),
            Placement::Placed
        ));
        assert_eq!(page.elements[1].rect.y, 100.0);
    }

    #[test]
    fn reflow_cascades_through_stacked_blockers() {
        let mut page = Page::new(0);
        page.elements.push(text_item("a", Rect::new(0.0, 0.0, 100.0, 100.0), false));
        page.elements.push(text_item("b", Rect::new(0.0, 100.0, 100.0, 100.0), false));
        let item = text_item("c", Rect::new(0.0, 50.0, 100.0, 20.0), false);
        assert!(matches!(
            place_on_page(&mut page, item, 500.0),
            Placement::Placed
        ));
        assert_eq!(page.elements[2].rect.y, 200.0);
    }
}
