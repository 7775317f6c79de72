//! The typed layout specification parsed from template JSON.
//!
//! Parsing validates structure only; bind references are resolved later, at
//! layout time, so a template can be validated independently of any data set.

use crate::error::GenerationError;
use serde::Deserialize;

/// Uniform page margin in points. Section bands stack inside it.
pub const PAGE_MARGIN: f32 = 36.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageSize {
    /// Portrait dimensions in points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSetup {
    #[serde(default)]
    pub size: PageSize,
    #[serde(default)]
    pub orientation: Orientation,
}

/// Reserved heights of the four fixed vertical bands, top to bottom:
/// pageHeader, billHeader, billContent, pageFooter.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionHeights {
    pub page_header: f32,
    pub bill_header: f32,
    pub bill_content: f32,
    pub page_footer: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    #[default]
    Text,
    Image,
}

/// One authored element inside a section. Coordinates are relative to the
/// owning section's top-left corner.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDef {
    pub label: String,
    pub x: f32,
    pub y: f32,
    #[serde(default, rename = "type")]
    pub kind: ElementKind,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub bind: Option<String>,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Explicit box size; required for images, ignored for text.
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    /// The authored position must never be adjusted by auto-reflow.
    #[serde(default)]
    pub pinned: bool,
    /// Exempt from overlap checks (intentional stacking, e.g. watermarks).
    #[serde(default)]
    pub overlay: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    pub label: String,
    pub bind: String,
    pub width: f32,
}

/// A repeating item table anchored inside the billContent band.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDef {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub columns: Vec<ColumnDef>,
    #[serde(default = "default_cell_padding")]
    pub cell_padding: f32,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default)]
    pub pinned: bool,
}

/// The immutable, validated layout specification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSpec {
    pub page: PageSetup,
    pub section_heights: SectionHeights,
    /// One-time document header, rendered on page 0 inside the pageHeader band.
    #[serde(default)]
    pub header: Vec<ElementDef>,
    #[serde(default)]
    pub page_header: Vec<ElementDef>,
    #[serde(default)]
    pub page_footer: Vec<ElementDef>,
    #[serde(default)]
    pub bill_header: Vec<ElementDef>,
    #[serde(default)]
    pub bill_footer: Vec<ElementDef>,
    #[serde(default)]
    pub bill_content: Vec<ElementDef>,
    #[serde(default)]
    pub bill_content_tables: Vec<TableDef>,
}

fn default_visible() -> bool {
    true
}

fn default_font_size() -> f32 {
    10.0
}

fn default_cell_padding() -> f32 {
    5.0
}

impl TemplateSpec {
    /// Parses and validates a template. Fatal on any missing or malformed
    /// required field; no layout work happens before this succeeds.
    pub fn parse(raw_json: &str) -> Result<Self, GenerationError> {
        let spec: TemplateSpec =
            serde_json::from_str(raw_json).map_err(|e| GenerationError::TemplateValidation {
                field: "template".to_string(),
                message: e.to_string(),
            })?;
        spec.validate()?;
        Ok(spec)
    }

    /// Page dimensions in points with orientation applied.
    pub fn page_size(&self) -> (f32, f32) {
        let (w, h) = self.page.size.dimensions();
        match self.page.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    fn validate(&self) -> Result<(), GenerationError> {
        let heights = [
            ("sectionHeights.pageHeader", self.section_heights.page_header),
            ("sectionHeights.billHeader", self.section_heights.bill_header),
            ("sectionHeights.billContent", self.section_heights.bill_content),
            ("sectionHeights.pageFooter", self.section_heights.page_footer),
        ];
        for (field, h) in heights {
            if !h.is_finite() || h < 0.0 {
                return Err(validation(field, "height must be a non-negative number"));
            }
        }

        let (_, page_height) = self.page_size();
        let total: f32 = heights.iter().map(|(_, h)| h).sum();
        if total > page_height - 2.0 * PAGE_MARGIN {
            return Err(GenerationError::TemplateValidation {
                field: "sectionHeights".to_string(),
                message: format!(
                    "section heights sum to {total:.1}pt, exceeding the usable page height of {:.1}pt",
                    page_height - 2.0 * PAGE_MARGIN
                ),
            });
        }

        let sections = [
            ("header", &self.header),
            ("pageHeader", &self.page_header),
            ("pageFooter", &self.page_footer),
            ("billHeader", &self.bill_header),
            ("billFooter", &self.bill_footer),
            ("billContent", &self.bill_content),
        ];
        for (section, elements) in sections {
            for (i, el) in elements.iter().enumerate() {
                if !el.x.is_finite() || !el.y.is_finite() || el.x < 0.0 || el.y < 0.0 {
                    return Err(validation(
                        &format!("{section}[{i}]"),
                        "element coordinates must be non-negative numbers",
                    ));
                }
                if el.kind == ElementKind::Image && (el.width.is_none() || el.height.is_none()) {
                    return Err(validation(
                        &format!("{section}[{i}]"),
                        "image elements must declare width and height",
                    ));
                }
            }
        }

        for (i, table) in self.bill_content_tables.iter().enumerate() {
            let field = format!("billContentTables[{i}]");
            if table.columns.is_empty() {
                return Err(validation(&format!("{field}.columns"), "table has no columns"));
            }
            if !(table.width > 0.0) {
                return Err(validation(&format!("{field}.width"), "table width must be positive"));
            }
            if table.y < 0.0 || table.x < 0.0 {
                return Err(validation(&field, "table anchor must be non-negative"));
            }
            if !(table.font_size > 0.0) || table.cell_padding < 0.0 {
                return Err(validation(
                    &field,
                    "fontSize must be positive and cellPadding non-negative",
                ));
            }
            for (c, col) in table.columns.iter().enumerate() {
                if !(col.width > 0.0) {
                    return Err(validation(
                        &format!("{field}.columns[{c}].width"),
                        "column width must be positive",
                    ));
                }
            }
        }

        Ok(())
    }
}

fn validation(field: &str, message: &str) -> GenerationError {
    GenerationError::TemplateValidation {
        field: field.to_string(),
        message: message.to_string(),
    }
}
