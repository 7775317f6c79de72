//! Template-driven bill layout and PDF rendering.
//!
//! Given a JSON template describing fixed page sections and repeating item
//! tables, plus a resolved data set (rows and scalar bindings), the engine
//! computes exact element placement, paginates overflowing content without
//! breaking a row mid-draw, and renders a multi-page PDF byte stream.
//!
//! ```no_run
//! use billpress::generate;
//!
//! let template = std::fs::read_to_string("template.json")?;
//! let data = std::fs::read_to_string("data.json")?;
//! let output = generate(&template, &data)?;
//! std::fs::write("bill.pdf", &output.pdf)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod layout;
pub mod render;
pub mod service;
pub mod template;
pub mod validate;

pub use error::{GenerationError, GenerationWarning};
pub use layout::{LayoutResult, Page, Paginator, Placed, PlacedFragment, PositionedElement};
pub use render::PdfRenderer;
pub use service::GenerationPool;
pub use template::{DataSet, ResolvedRows, TemplateSpec};
pub use validate::{BoxInfo, OverlapHit, find_overlaps};

/// The result of one successful generation call: the PDF bytes plus any
/// non-fatal warnings recorded along the way.
#[derive(Debug)]
pub struct GenerationOutput {
    pub pdf: Vec<u8>,
    pub page_count: usize,
    pub warnings: Vec<GenerationWarning>,
}

/// Lays out and renders one document. Single-threaded and CPU-bound; the
/// template, pages and renderer state live only for the duration of the
/// call. No partial byte stream is ever returned on a fatal error.
pub fn generate(template_json: &str, data_json: &str) -> Result<GenerationOutput, GenerationError> {
    let spec = TemplateSpec::parse(template_json)?;
    let data = DataSet::parse(data_json)?;
    let laid_out = layout_pages(&spec, &data)?;
    let pdf = PdfRenderer::new(&spec).render(&laid_out.pages)?;
    Ok(GenerationOutput {
        pdf,
        page_count: laid_out.pages.len(),
        warnings: laid_out.warnings,
    })
}

/// Runs layout only, returning positioned pages for inspection. Used by the
/// overlap diagnostic and the test suite.
pub fn layout_document(template_json: &str, data_json: &str) -> Result<LayoutResult, GenerationError> {
    let spec = TemplateSpec::parse(template_json)?;
    let data = DataSet::parse(data_json)?;
    layout_pages(&spec, &data)
}

/// Layout over already-parsed inputs.
pub fn layout_pages(spec: &TemplateSpec, data: &DataSet) -> Result<LayoutResult, GenerationError> {
    let rows = ResolvedRows::new(data);
    Paginator::new(spec, &rows).run()
}
