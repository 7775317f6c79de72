//! The pagination state machine.
//!
//! Accumulates placed content into pages, replaying the repeating sections
//! (pageHeader, pageFooter) on every page; the billHeader section appears on
//! page 0 only. A table's logical row order is preserved across fragment
//! boundaries, and every continuation fragment reprints the table header.

use super::engine::{self, LayoutResult, Page, Placement, PositionedElement};
use super::{Band, SectionBands, flow};
use crate::error::{GenerationError, GenerationWarning};
use crate::template::{ElementDef, ResolvedRows, TableDef, TemplateSpec};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AccumulatingPage,
    PageFull,
    Finalized,
}

pub struct Paginator<'a> {
    spec: &'a TemplateSpec,
    rows: &'a ResolvedRows<'a>,
    bands: SectionBands,
    state: State,
    pages: Vec<Page>,
    current: Page,
    warnings: Vec<GenerationWarning>,
}

impl<'a> Paginator<'a> {
    pub fn new(spec: &'a TemplateSpec, rows: &'a ResolvedRows<'a>) -> Self {
        Self {
            spec,
            rows,
            bands: SectionBands::from_spec(spec),
            state: State::PageFull,
            pages: Vec::new(),
            current: Page::new(0),
            warnings: Vec::new(),
        }
    }

    /// Runs the whole layout: fixed sections, content elements, tables and
    /// the bill footer, splitting onto new pages as content overflows.
    pub fn run(mut self) -> Result<LayoutResult, GenerationError> {
        let spec = self.spec;
        engine::validate_bindings(spec, self.rows, &mut self.warnings)?;

        self.open_page();
        for el in &spec.bill_content {
            self.place_content_element(el)?;
        }
        for (index, def) in spec.bill_content_tables.iter().enumerate() {
            self.place_table(index, def)?;
        }
        for el in &spec.bill_footer {
            self.place_content_element(el)?;
        }

        self.finalize_page();
        self.state = State::Finalized;
        debug!("pagination finished with {} pages", self.pages.len());
        Ok(LayoutResult {
            pages: self.pages,
            warnings: self.warnings,
        })
    }

    /// Opens the next page and replays its fixed header sections.
    fn open_page(&mut self) {
        debug_assert_eq!(self.state, State::PageFull);
        let index = self.pages.len();
        self.current = Page::new(index);
        self.state = State::AccumulatingPage;

        if index == 0 {
            self.place_section(&self.spec.header, self.bands.page_header);
        }
        self.place_section(&self.spec.page_header, self.bands.page_header);
        if index == 0 {
            self.place_section(&self.spec.bill_header, self.bands.bill_header);
        }
    }

    /// Appends the pageFooter and moves the current page to the output.
    fn finalize_page(&mut self) {
        debug_assert_eq!(self.state, State::AccumulatingPage);
        self.place_section(&self.spec.page_footer, self.bands.page_footer);
        self.state = State::PageFull;
        let index = self.current.index;
        let finished = std::mem::replace(&mut self.current, Page::new(index + 1));
        self.pages.push(finished);
    }

    fn break_page(&mut self) {
        self.finalize_page();
        self.open_page();
    }

    fn place_section(&mut self, elements: &[ElementDef], band: Band) {
        for def in elements {
            if !def.visible {
                continue;
            }
            let item = engine::materialize_element(def, &band, self.rows);
            if item.rect.bottom() > band.bottom() {
                // Fixed sections never migrate; an element authored past its
                // band bleeds into the neighbouring one and must be reported.
                self.warnings.push(GenerationWarning::LayoutOverflow {
                    element_ids: vec![item.id.clone()],
                });
            }
            engine::place_fixed(&mut self.current, item, &band, &mut self.warnings);
        }
    }

    /// Places one billContent (or billFooter) element, reflowing it around
    /// grown tables and spilling it to a fresh page when the band is full.
    fn place_content_element(&mut self, def: &ElementDef) -> Result<(), GenerationError> {
        if !def.visible {
            return Ok(());
        }
        let band = self.bands.bill_content;
        let mut deferred_once = false;
        loop {
            let item = engine::materialize_element(def, &band, self.rows);
            if item.rect.bottom() > band.bottom() {
                return Err(GenerationError::LayoutOverflow(format!(
                    "element `{}` extends past the billContent band at its authored position",
                    item.id
                )));
            }
            match engine::place_on_page(&mut self.current, item, band.bottom()) {
                Placement::Placed => return Ok(()),
                Placement::PlacedWithOverlap(element_ids) => {
                    self.warnings
                        .push(GenerationWarning::LayoutOverflow { element_ids });
                    return Ok(());
                }
                Placement::Deferred(item) => {
                    if deferred_once {
                        return Err(GenerationError::LayoutOverflow(format!(
                            "element `{}` cannot be placed even on a fresh page",
                            item.id
                        )));
                    }
                    deferred_once = true;
                    debug!("element `{}` spills to page {}", item.id, self.current.index + 1);
                    self.break_page();
                }
            }
        }
    }

    /// Places one table: resolves its effective anchor against content that
    /// grew above it, then lays its fragments onto this and following pages.
    fn place_table(&mut self, table_index: usize, def: &TableDef) -> Result<(), GenerationError> {
        let band = self.bands.bill_content;
        let row_count = self.rows.row_count();
        let metrics = flow::row_metrics(def);
        let mut anchor_y = def.y;
        let mut pinned_overlap: Option<Vec<String>> = None;

        let fragments = loop {
            let fragments =
                flow::plan_fragments(def, table_index, row_count, anchor_y, band.height)?;
            let on_anchor_page = fragments
                .first()
                .filter(|frag| frag.page_offset == 0)
                .cloned();
            let Some(first) = on_anchor_page else {
                break fragments;
            };
            let probe = engine::materialize_fragment(def, first, &band, self.rows);
            match engine::find_blocker(&self.current, &probe.rect) {
                None => break fragments,
                Some((blocker_id, blocker_bottom)) => {
                    if def.pinned {
                        pinned_overlap = Some(vec![blocker_id, probe.id.clone()]);
                        break fragments;
                    }
                    let delta = blocker_bottom - probe.rect.y;
                    debug!(
                        "table {table_index} anchor reflowed down by {delta:.1}pt past `{blocker_id}`"
                    );
                    anchor_y += delta;
                    if anchor_y + metrics.header_row_height > band.height {
                        // No room left on this page at all; push every
                        // fragment to fresh pages.
                        anchor_y = band.height;
                    }
                }
            }
        };

        if let Some(element_ids) = pinned_overlap {
            self.warnings
                .push(GenerationWarning::LayoutOverflow { element_ids });
        }

        for fragment in fragments {
            let continuation = fragment.page_offset > 0;
            if continuation {
                self.break_page();
            }
            let item = engine::materialize_fragment(def, fragment, &band, self.rows);
            // The anchor-page fragment was probed above; a continuation can
            // still collide with fixed-section content bleeding into the
            // band on its fresh page.
            if continuation
                && let Some((blocker_id, _)) = engine::find_blocker(&self.current, &item.rect)
            {
                self.warnings.push(GenerationWarning::LayoutOverflow {
                    element_ids: vec![blocker_id, item.id.clone()],
                });
            }
            self.push_fragment(item);
        }
        Ok(())
    }

    fn push_fragment(&mut self, item: PositionedElement) {
        debug_assert_eq!(self.state, State::AccumulatingPage);
        self.current.elements.push(item);
    }
}
