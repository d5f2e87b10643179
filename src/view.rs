//! Presentation-side derived views of a [`Table`].
//!
//! Every function returns a new table (or plain data) and leaves its input
//! untouched; results are meant for display only.

use std::cmp::Ordering;

use itertools::Itertools;

use crate::table::{Cell, MISSING_AGE_DAYS, Table};

/// Sort direction of a [`SortKey`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

#[derive(Clone, Copy, Debug)]
pub struct SortKey<'a> {
    pub column: &'a str,
    pub order: Order,
}

impl<'a> SortKey<'a> {
    pub fn asc(column: &'a str) -> Self {
        Self {
            column,
            order: Order::Ascending,
        }
    }

    pub fn desc(column: &'a str) -> Self {
        Self {
            column,
            order: Order::Descending,
        }
    }
}

/// Stable multi-key sort.
///
/// Numeric cells compare numerically, text lexically, timestamps
/// chronologically. Missing and non-comparable cells sort last regardless of
/// direction. Unknown columns are ignored.
pub fn sort_by(table: &Table, keys: &[SortKey<'_>]) -> Table {
    let keys: Vec<_> = keys
        .iter()
        .filter_map(|k| table.column_index(k.column).map(|idx| (idx, k.order)))
        .collect();
    let rows = table
        .rows()
        .iter()
        .sorted_by(|a, b| {
            keys.iter()
                .map(|&(idx, order)| compare_cells(&a[idx], &b[idx], order))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
        .cloned()
        .collect();
    table.with_rows(rows)
}

fn compare_cells(a: &Cell, b: &Cell, order: Order) -> Ordering {
    let ordering = match (sort_value(a), sort_value(b)) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    };
    match order {
        Order::Ascending => ordering,
        Order::Descending => ordering.reverse(),
    }
}

#[derive(PartialEq, PartialOrd)]
enum SortValue<'a> {
    Number(f64),
    Text(&'a str),
}

fn sort_value(cell: &Cell) -> Option<SortValue<'_>> {
    match cell {
        Cell::Int(_) | Cell::Float(_) => cell.as_f64().map(SortValue::Number),
        Cell::Timestamp(ts) => Some(SortValue::Number(ts.timestamp_millis() as f64)),
        Cell::Text(s) => Some(SortValue::Text(s)),
        Cell::Bool(b) => Some(SortValue::Number(*b as u8 as f64)),
        Cell::Missing | Cell::Json(_) => None,
    }
}

/// First `n` rows.
pub fn head(table: &Table, n: usize) -> Table {
    table.with_rows(table.rows().iter().take(n).cloned().collect())
}

/// Rows whose numeric `column` is at most `max_days`.
///
/// Missing ages count as [`MISSING_AGE_DAYS`], so they are kept only for
/// very large limits.
pub fn max_age(table: &Table, column: &str, max_days: f64) -> Table {
    let Some(idx) = table.column_index(column) else {
        return table.clone();
    };
    table.with_rows(
        table
            .rows()
            .iter()
            .filter(|row| row[idx].as_f64().unwrap_or(MISSING_AGE_DAYS) <= max_days)
            .cloned()
            .collect(),
    )
}

/// `(label, value)` pairs for a bar chart, skipping rows whose value is
/// missing or not finite.
pub fn finite_series(table: &Table, label_column: &str, value_column: &str) -> Vec<(String, f64)> {
    let (Some(labels), Some(values)) = (table.column(label_column), table.column(value_column))
    else {
        return Vec::new();
    };
    labels
        .zip(values)
        .filter_map(|(label, value)| {
            value
                .as_f64()
                .filter(|v| v.is_finite())
                .map(|v| (label.to_string(), v))
        })
        .collect()
}

/// Square matrix of pairwise Pearson correlations.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `None` where fewer than two complete pairs exist or a
    /// column is constant.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Pearson correlation between numeric columns, using pairwise complete
/// observations. Non-finite values are treated as missing.
pub fn correlation(table: &Table, columns: &[&str]) -> CorrelationMatrix {
    let series: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|c| {
            table
                .numbers(c)
                .into_iter()
                .map(|v| v.filter(|v| v.is_finite()))
                .collect()
        })
        .collect();
    let values = series
        .iter()
        .map(|a| series.iter().map(|b| pearson(a, b)).collect())
        .collect();
    CorrelationMatrix {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        values,
    }
}

fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}
