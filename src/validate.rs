//! Pairwise overlap validation over a finished page list.
//!
//! Shared by the test suite and the offline diagnostic binary: both run the
//! exact intersection test the layout engine uses, so a clean report here
//! means the engine's reflow held its contract.

use crate::layout::{Page, Placed, PositionedElement, Rect};
use itertools::Itertools;

const PREVIEW_LEN: usize = 32;

/// One colliding pair of non-overlay bounding boxes.
#[derive(Debug, Clone)]
pub struct OverlapHit {
    pub page_index: usize,
    pub first: BoxInfo,
    pub second: BoxInfo,
}

#[derive(Debug, Clone)]
pub struct BoxInfo {
    pub id: String,
    pub preview: String,
    pub rect: Rect,
}

impl BoxInfo {
    fn of(el: &PositionedElement) -> Self {
        Self {
            id: el.id.clone(),
            preview: preview(el),
            rect: el.rect,
        }
    }
}

/// Returns every pair of non-overlay boxes that intersect with positive
/// area, across all pages. Empty means the layout is overlap-free.
pub fn find_overlaps(pages: &[Page]) -> Vec<OverlapHit> {
    pages
        .iter()
        .flat_map(|page| {
            page.elements
                .iter()
                .filter(|el| !el.overlay)
                .tuple_combinations()
                .filter(|(a, b)| a.rect.intersects(&b.rect))
                .map(|(a, b)| OverlapHit {
                    page_index: page.index,
                    first: BoxInfo::of(a),
                    second: BoxInfo::of(b),
                })
        })
        .collect()
}

fn preview(el: &PositionedElement) -> String {
    let text = match &el.content {
        Placed::Text { text, .. } => text.as_str(),
        Placed::Image { source } => source.as_str(),
        Placed::TableFragment(frag) => {
            return format!("table {} ({} rows)", frag.table_index, frag.cells.len());
        }
    };
    text.chars().take(PREVIEW_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, rect: Rect, overlay: bool) -> PositionedElement {
        PositionedElement {
            id: id.to_string(),
            rect,
            pinned: false,
            overlay,
            content: Placed::Text {
                text: format!("{id} text that is long enough to get truncated in a preview"),
                font_size: 10.0,
            },
        }
    }

    #[test]
    fn reports_each_colliding_pair_once() {
        let mut page = Page::new(0);
        page.elements.push(item("a", Rect::new(0.0, 0.0, 100.0, 100.0), false));
        page.elements.push(item("b", Rect::new(50.0, 50.0, 100.0, 100.0), false));
        page.elements.push(item("c", Rect::new(500.0, 500.0, 10.0, 10.0), false));
        let hits = find_overlaps(&[page]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].first.id, "a");
        assert_eq!(hits[0].second.id, "b");
        assert_eq!(hits[0].first.preview.chars().count(), 32);
    }

    #[test]
    fn overlay_boxes_are_exempt() {
        let mut page = Page::new(0);
        page.elements.push(item("a", Rect::new(0.0, 0.0, 100.0, 100.0), false));
        page.elements.push(item("mark", Rect::new(0.0, 0.0, 100.0, 100.0), true));
        assert!(find_overlaps(&[page]).is_empty());
    }
}
