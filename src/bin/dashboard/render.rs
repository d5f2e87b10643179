//! Plain-text rendering of tables, bar charts and correlation matrices.

use smart_money_sdk::{
    Cell, Table,
    view::{CorrelationMatrix, finite_series},
};

const MAX_CELL_WIDTH: usize = 44;
const BAR_WIDTH: usize = 40;

/// Column to display and its header.
pub type Field<'a> = (&'a str, &'a str);

pub fn title(text: &str) {
    println!("\n{:=^100}", format!(" {text} "));
}

fn format_cell(cell: &Cell) -> String {
    let text = match cell {
        Cell::Float(v) if v.abs() >= 1000.0 => format!("{v:.0}"),
        Cell::Float(_) => format!("{cell:.4}"),
        other => other.to_string(),
    };
    if text.chars().count() > MAX_CELL_WIDTH {
        let truncated: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
        format!("{truncated}…")
    } else {
        text
    }
}

/// Prints the given columns of `table` under renamed headers.
pub fn table(table: &Table, columns: &[Field<'_>]) {
    let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
    let projected = table.select(&names);
    let cells: Vec<Vec<String>> = projected
        .rows()
        .iter()
        .map(|row| row.iter().map(format_cell).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, (_, header))| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let line = |values: Vec<&str>| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!("{v:<w$}"))
            .collect::<Vec<_>>()
            .join(" │ ")
    };

    println!("{}", line(columns.iter().map(|(_, h)| *h).collect()));
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─")
    );
    for row in &cells {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
}

/// Horizontal bar chart of `value_column` labelled by `label_column`.
pub fn bars(table: &Table, label_column: &str, value_column: &str) {
    let series = finite_series(table, label_column, value_column);
    if series.is_empty() {
        println!("No finite {value_column} values to chart.");
        return;
    }
    let max = series.iter().map(|(_, v)| v.abs()).fold(0.0, f64::max);
    let label_width = series
        .iter()
        .map(|(l, _)| l.chars().count())
        .max()
        .unwrap_or_default();
    for (label, value) in &series {
        let len = if max > 0.0 {
            ((value.abs() / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let bar = if *value < 0.0 { "░" } else { "█" };
        println!(
            "{label:<label_width$} │ {}{} {value:.0}",
            bar.repeat(len),
            " ".repeat(BAR_WIDTH - len)
        );
    }
}

pub fn correlation(matrix: &CorrelationMatrix) {
    let width = matrix
        .columns
        .iter()
        .map(|c| c.len())
        .max()
        .unwrap_or_default()
        .max(7);
    print!("{:<width$}", "");
    for column in &matrix.columns {
        print!(" {column:>width$}");
    }
    println!();
    for (column, row) in matrix.columns.iter().zip(&matrix.values) {
        print!("{column:<width$}");
        for value in row {
            match value {
                Some(v) => print!(" {v:>width$.3}"),
                None => print!(" {:>width$}", "-"),
            }
        }
        println!();
    }
}

/// Prints every cell of every row, one `column: value` per line.
pub fn records(table: &Table) {
    for (i, row) in table.rows().iter().enumerate() {
        println!("-- record {} --", i + 1);
        for (column, cell) in table.columns().iter().zip(row) {
            println!("{column:>24}: {}", format_cell(cell));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(&Cell::Float(1234567.891)), "1234568");
        assert_eq!(format_cell(&Cell::Float(0.5)), "0.5000");
        assert_eq!(format_cell(&Cell::Missing), "-");
        let long = Cell::Text("x".repeat(100));
        assert_eq!(format_cell(&long).chars().count(), MAX_CELL_WIDTH);
    }
}
