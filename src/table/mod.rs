//! Typed tables and the response normalizer.
//!
//! Upstream endpoints return loosely-typed JSON records. [`normalize`] maps
//! them onto the fixed column set of a [`SchemaKind`], coercing values per
//! column category. Bad values never fail the table; they become
//! [`Cell::Missing`].

mod cell;
mod normalize;
mod schema;

pub use cell::{Cell, MISSING_AGE_DAYS};
pub use normalize::{ShapeError, normalize, normalize_records};
pub use schema::{Alias, Column, ColumnKind, Derived, Schema, SchemaKind};

use serde_json::{Map, Value};

/// JSON object as returned by the upstream API.
pub type Record = Map<String, Value>;

/// Normalized, schema-fixed, row-ordered table.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    kind: SchemaKind,
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Empty table with exactly the schema's fixed columns.
    pub fn empty(kind: SchemaKind) -> Self {
        Self {
            kind,
            columns: kind.schema().column_names().map(String::from).collect(),
            rows: Vec::new(),
        }
    }

    pub(crate) fn from_parts(kind: SchemaKind, columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self {
            kind,
            columns,
            rows,
        }
    }

    /// Schema the table was normalized with.
    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Cell at the given row and column, `None` if either is out of range.
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Cells of a single column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Numeric values of a column; non-numeric cells are `None`.
    pub fn numbers(&self, name: &str) -> Vec<Option<f64>> {
        match self.column(name) {
            Some(cells) => cells.map(Cell::as_f64).collect(),
            None => vec![None; self.len()],
        }
    }

    /// Projection onto the given columns; unknown columns are filled with
    /// [`Cell::Missing`].
    pub fn select(&self, columns: &[&str]) -> Table {
        let indices: Vec<_> = columns.iter().map(|c| self.column_index(c)).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|idx| idx.map(|i| row[i].clone()).unwrap_or(Cell::Missing))
                    .collect()
            })
            .collect();
        Table::from_parts(
            self.kind,
            columns.iter().map(|c| c.to_string()).collect(),
            rows,
        )
    }

    /// Table with the same columns and the given rows, in the given order.
    pub(crate) fn with_rows(&self, rows: Vec<Vec<Cell>>) -> Table {
        Table::from_parts(self.kind, self.columns.clone(), rows)
    }

    /// Rows converted back to JSON records.
    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(name, cell)| (name.clone(), cell.to_json()))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Table {
        normalize(
            SchemaKind::Screener,
            &[
                json!({"tokenSymbol": "AAA", "volume": "10", "netflow": 1}),
                json!({"tokenSymbol": "BBB", "volume": "bad"}),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_empty_table_columns() {
        let table = Table::empty(SchemaKind::Inflows);
        assert!(table.is_empty());
        assert_eq!(
            table.columns(),
            [
                "chain",
                "tokenAddress",
                "symbol",
                "sectors",
                "volume24hUSD",
                "volume7dUSD",
                "volume30dUSD",
                "nofTraders",
                "tokenAgeDays",
                "marketCap"
            ]
        );
    }

    #[test]
    fn test_accessors() {
        let table = sample();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "volume"), Some(&Cell::Float(10.0)));
        assert_eq!(table.get(1, "volume"), Some(&Cell::Missing));
        assert_eq!(table.get(2, "volume"), None);
        assert_eq!(table.get(0, "nope"), None);
        assert_eq!(table.numbers("netflow"), vec![Some(1.0), None]);
        assert_eq!(table.numbers("nope"), vec![None, None]);
    }

    #[test]
    fn test_select() {
        let table = sample().select(&["tokenSymbol", "volume", "unknown"]);
        assert_eq!(table.columns(), ["tokenSymbol", "volume", "unknown"]);
        assert_eq!(
            table.rows()[0],
            vec![
                Cell::Text("AAA".to_string()),
                Cell::Float(10.0),
                Cell::Missing
            ]
        );
    }

    #[test]
    fn test_records() {
        let records = sample().select(&["tokenSymbol", "volume"]).records();
        assert_eq!(
            Value::Array(records.into_iter().map(Value::Object).collect()),
            json!([
                {"tokenSymbol": "AAA", "volume": 10.0},
                {"tokenSymbol": "BBB", "volume": null},
            ])
        );
    }
}
