//! PDF serialization of finished pages.

pub mod pdf;

pub use pdf::PdfRenderer;
