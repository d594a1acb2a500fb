//! Export aggregation.
//!
//! Turns the recorded rows of one session into a write-once table:
//! columns sorted by descending average, every row expanded to those
//! columns, and a trailing emphasized row with the per-column averages.
//! Averages only count the rows in which a label actually appeared.

use serde::{Deserialize, Serialize};

use crate::recorder::RecordedRow;

pub const TIME_COLUMN: &str = "Time (s)";
pub const SUMMARY_LABEL: &str = "Average";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub timestamp_seconds: u64,
    /// One value per column, in column order.
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub label: String,
    pub values: Vec<f64>,
    /// Rendered bold by the spreadsheet sink.
    pub emphasized: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTable {
    pub columns: Vec<String>,
    pub rows: Vec<ExportRow>,
    pub summary: Option<SummaryRow>,
}

/// A flat row of display cells, header first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub cells: Vec<String>,
    pub emphasized: bool,
}

/// Receives a finished table. Fire-and-forget.
pub trait ExportSink {
    fn deliver(&mut self, table: ExportTable);
}

impl<F> ExportSink for F
where
    F: FnMut(ExportTable),
{
    fn deliver(&mut self, table: ExportTable) {
        self(table)
    }
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Builds the export table. `all_labels` fixes the tie-break order; labels
/// that only show up inside `rows` are appended in order of appearance.
pub fn aggregate(rows: &[RecordedRow], all_labels: &[String]) -> ExportTable {
    if rows.is_empty() {
        return ExportTable::default();
    }

    let mut labels: Vec<&str> = all_labels.iter().map(String::as_str).collect();
    for row in rows {
        for label in row.scores.keys() {
            if !labels.contains(&label.as_str()) {
                labels.push(label);
            }
        }
    }

    // expanded[r][l]: value of label l in row r, 0 when absent
    let expanded: Vec<Vec<f64>> = rows
        .iter()
        .map(|row| {
            labels
                .iter()
                .map(|label| row.scores.get(*label).copied().map_or(0.0, round3))
                .collect()
        })
        .collect();

    let mut ranked: Vec<(usize, f64)> = (0..labels.len())
        .map(|l| {
            let (sum, count) = expanded
                .iter()
                .map(|values| values[l])
                .filter(|v| *v != 0.0)
                .fold((0.0, 0_u32), |(sum, count), v| (sum + v, count + 1));
            let average = if count == 0 {
                0.0
            } else {
                round3(sum / f64::from(count))
            };
            (l, average)
        })
        .filter(|(_, average)| *average != 0.0)
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let columns = ranked
        .iter()
        .map(|(l, _)| labels[*l].to_string())
        .collect();
    let table_rows = rows
        .iter()
        .zip(&expanded)
        .map(|(row, values)| ExportRow {
            timestamp_seconds: row.timestamp_seconds,
            values: ranked.iter().map(|(l, _)| values[*l]).collect(),
        })
        .collect();

    ExportTable {
        columns,
        rows: table_rows,
        summary: Some(SummaryRow {
            label: SUMMARY_LABEL.to_string(),
            values: ranked.iter().map(|(_, average)| *average).collect(),
            emphasized: true,
        }),
    }
}

impl ExportTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(label, average)` pairs in column order.
    pub fn averages(&self) -> Vec<(String, f64)> {
        match &self.summary {
            Some(summary) => self
                .columns
                .iter()
                .cloned()
                .zip(summary.values.iter().copied())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Header, data rows and summary as display strings for a spreadsheet writer.
    pub fn grid(&self) -> Vec<GridRow> {
        if self.columns.is_empty() && self.rows.is_empty() {
            return Vec::new();
        }

        let mut grid = Vec::with_capacity(self.rows.len() + 2);
        grid.push(GridRow {
            cells: std::iter::once(TIME_COLUMN.to_string())
                .chain(self.columns.iter().cloned())
                .collect(),
            emphasized: true,
        });
        for row in &self.rows {
            grid.push(GridRow {
                cells: std::iter::once(row.timestamp_seconds.to_string())
                    .chain(row.values.iter().map(|v| format!("{v:.3}")))
                    .collect(),
                emphasized: false,
            });
        }
        if let Some(summary) = &self.summary {
            grid.push(GridRow {
                cells: std::iter::once(summary.label.clone())
                    .chain(summary.values.iter().map(|v| format!("{v:.3}")))
                    .collect(),
                emphasized: summary.emphasized,
            });
        }
        grid
    }
}
