use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use super::{
    Record, Table,
    cell::{self, Cell},
    schema::{ColumnKind, SchemaKind},
};

/// Input handed to [`normalize`] was not a sequence of JSON objects.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("record {index} is not a JSON object, got: {found}")]
pub struct ShapeError {
    pub index: usize,
    pub found: &'static str,
}

/// Normalizes raw JSON records into a [`Table`] of the given kind.
///
/// Fails only if one of the `records` is not a JSON object; malformed
/// values inside records degrade to [`Cell::Missing`].
pub fn normalize(kind: SchemaKind, records: &[Value]) -> Result<Table, ShapeError> {
    let records = records
        .iter()
        .enumerate()
        .map(|(index, value)| match value {
            Value::Object(map) => Ok(map.clone()),
            other => Err(ShapeError {
                index,
                found: json_type(other),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(normalize_records(kind, records))
}

/// Normalizes already-decoded records into a [`Table`] of the given kind.
///
/// Output columns are the schema columns, followed by upstream keys the
/// schema does not name (kept as given) and then derived numeric columns.
/// An empty input yields exactly the schema columns.
pub fn normalize_records(kind: SchemaKind, mut records: Vec<Record>) -> Table {
    if records.is_empty() {
        return Table::empty(kind);
    }
    let schema = kind.schema();

    for alias in schema.aliases {
        let has_canonical = records.iter().any(|r| r.contains_key(alias.canonical));
        let has_variant = records.iter().any(|r| r.contains_key(alias.variant));
        if !has_canonical && has_variant {
            for record in records.iter_mut() {
                let value = record.get(alias.variant).cloned().unwrap_or(Value::Null);
                record.insert(alias.canonical.to_string(), value);
            }
        }
    }

    let mut columns: Vec<String> = schema.column_names().map(String::from).collect();
    // derived columns shadow upstream keys of the same name
    let mut seen: HashSet<String> = columns
        .iter()
        .cloned()
        .chain(schema.derived.iter().map(|d| d.name.to_string()))
        .collect();
    let mut extra = Vec::new();
    for record in &records {
        for key in record.keys() {
            if seen.insert(key.clone()) {
                extra.push(key.clone());
            }
        }
    }
    columns.extend(extra.iter().cloned());
    columns.extend(schema.derived.iter().map(|d| d.name.to_string()));

    let rows = records
        .into_iter()
        .map(|mut record| {
            let mut row = Vec::with_capacity(columns.len());
            let derived: Vec<Cell> = schema
                .derived
                .iter()
                .map(|d| {
                    record
                        .get(d.source)
                        .map(cell::coerce_numeric)
                        .unwrap_or(Cell::Missing)
                })
                .collect();
            for column in schema.columns {
                let cell = match record.remove(column.name) {
                    None => Cell::Missing,
                    Some(value) => match column.kind {
                        ColumnKind::Passthrough => Cell::from_json(value),
                        ColumnKind::Numeric => cell::coerce_numeric(&value),
                        ColumnKind::List => cell::join_list(value),
                        ColumnKind::Timestamp => cell::parse_timestamp(&value),
                    },
                };
                row.push(cell);
            }
            for key in &extra {
                row.push(
                    record
                        .remove(key)
                        .map(Cell::from_json)
                        .unwrap_or(Cell::Missing),
                );
            }
            row.extend(derived);
            row
        })
        .collect::<Vec<_>>();

    debug!(%kind, rows = rows.len(), columns = columns.len(), "normalized records");
    Table::from_parts(kind, columns, rows)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
