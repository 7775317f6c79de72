//! The resolved data set a template is bound against.

use crate::error::GenerationError;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Row data plus scalar bindings, fully resolved by the caller. The column
/// set of `items` is implicitly defined by the first row.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSet {
    #[serde(default)]
    pub items: Vec<Map<String, Value>>,
    #[serde(default)]
    pub content_details: Map<String, Value>,
}

impl DataSet {
    pub fn parse(raw_json: &str) -> Result<Self, GenerationError> {
        Ok(serde_json::from_str(raw_json)?)
    }
}

/// A typed lookup result: either the bound text or an explicit miss. The
/// miss is surfaced as a warning by the caller instead of propagating nulls
/// into rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Present(String),
    Missing,
}

impl BindValue {
    /// The bound text, or empty for a miss (cells render blank).
    pub fn into_text(self) -> String {
        match self {
            BindValue::Present(s) => s,
            BindValue::Missing => String::new(),
        }
    }
}

/// A per-call row abstraction built once from the data set. The column set
/// is validated against table bindings up front, so lookups during layout
/// are cheap and never invent data.
#[derive(Debug)]
pub struct ResolvedRows<'d> {
    data: &'d DataSet,
    columns: HashSet<&'d str>,
}

impl<'d> ResolvedRows<'d> {
    pub fn new(data: &'d DataSet) -> Self {
        let columns = data
            .items
            .first()
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default();
        Self { data, columns }
    }

    pub fn row_count(&self) -> usize {
        self.data.items.len()
    }

    /// Whether the column set (defined by the first row) contains `bind`.
    pub fn has_column(&self, bind: &str) -> bool {
        self.columns.contains(bind)
    }

    pub fn cell(&self, row: usize, bind: &str) -> BindValue {
        match self.data.items.get(row).and_then(|r| r.get(bind)) {
            Some(v) => BindValue::Present(scalar_text(v)),
            None => BindValue::Missing,
        }
    }

    pub fn detail(&self, key: &str) -> BindValue {
        match self.data.content_details.get(key) {
            Some(v) => BindValue::Present(scalar_text(v)),
            None => BindValue::Missing,
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> DataSet {
        DataSet::parse(
            &json!({
                "items": [
                    { "name": "Widget", "qty": 3 },
                    { "name": "Gadget", "qty": 5 }
                ],
                "contentDetails": { "billNo": "INV-001", "total": 42.5 }
            })
            .to_string(),
        )
        .unwrap()
    }

    #[test]
    fn first_row_defines_the_column_set() {
        let data = sample();
        let rows = ResolvedRows::new(&data);
        assert!(rows.has_column("name"));
        assert!(rows.has_column("qty"));
        assert!(!rows.has_column("price"));
    }

    #[test]
    fn numbers_and_bools_stringify() {
        let data = sample();
        let rows = ResolvedRows::new(&data);
        assert_eq!(rows.cell(1, "qty"), BindValue::Present("5".to_string()));
        assert_eq!(rows.detail("total"), BindValue::Present("42.5".to_string()));
    }

    #[test]
    fn missing_bind_is_explicit() {
        let data = sample();
        let rows = ResolvedRows::new(&data);
        assert_eq!(rows.cell(0, "price"), BindValue::Missing);
        assert_eq!(rows.detail("nope"), BindValue::Missing);
        assert_eq!(BindValue::Missing.into_text(), "");
    }

    #[test]
    fn empty_data_set_has_no_columns() {
        let data = DataSet::default();
        let rows = ResolvedRows::new(&data);
        assert_eq!(rows.row_count(), 0);
        assert!(!rows.has_column("anything"));
    }
}
