//! Template and data models: the typed inputs of a generation call.

pub mod data;
pub mod spec;

pub use data::{BindValue, DataSet, ResolvedRows};
pub use spec::{
    ColumnDef, ElementDef, ElementKind, Orientation, PAGE_MARGIN, PageSetup, PageSize,
    SectionHeights, TableDef, TemplateSpec,
};
