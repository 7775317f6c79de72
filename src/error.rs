// src/error.rs
use std::fmt;
use thiserror::Error;

/// A comprehensive error type for the entire bill generation pipeline.
///
/// Every fatal condition surfaces as one of these variants; recoverable
/// conditions are downgraded to [`GenerationWarning`]s attached to the result.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// A required template field is missing or malformed. Raised at the parse
    /// boundary, before any layout work starts.
    #[error("template validation failed at `{field}`: {message}")]
    TemplateValidation { field: String, message: String },

    /// A bind reference cannot be resolved and no safe fallback exists.
    /// Per-cell misses are downgraded to warnings instead.
    #[error("bind `{bind}` cannot be resolved: {message}")]
    MissingBinding { bind: String, message: String },

    /// Content cannot be accommodated even across unlimited pages, e.g. a
    /// single table row taller than the content band.
    #[error("layout overflow: {0}")]
    LayoutOverflow(String),

    /// Low-level failure while producing the PDF byte stream.
    #[error("PDF rendering failed: {0}")]
    Render(String),

    /// The worker pool rejected the call (pool shut down).
    #[error("worker pool unavailable: {0}")]
    Pool(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<lopdf::Error> for GenerationError {
    fn from(e: lopdf::Error) -> Self {
        GenerationError::Render(e.to_string())
    }
}

/// A non-fatal condition recorded during generation and handed back to the
/// caller alongside the output bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationWarning {
    /// A bind referenced a column or key absent from the data set; the
    /// affected cells render blank.
    MissingBinding { bind: String, context: String },
    /// A pinned element could not be auto-reflowed around grown content and
    /// was left at its authored position, overlapping.
    LayoutOverflow { element_ids: Vec<String> },
}

impl fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationWarning::MissingBinding { bind, context } => {
                write!(f, "bind `{bind}` has no matching column or key ({context})")
            }
            GenerationWarning::LayoutOverflow { element_ids } => {
                write!(f, "pinned element left overlapping: {}", element_ids.join(", "))
            }
        }
    }
}
