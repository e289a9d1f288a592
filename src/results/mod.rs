//! Results view: turns the model's `Results` rows into chart-ready series.
//!
//! The model returns a list of rows; a row is usually an object keyed by
//! period (`{"Line Item": "Revenue", "Y1": 100.0, ...}`) but scalar rows also
//! occur. Everything downstream (plots, stats, scenarios) works on `Series`.

pub mod format;
pub mod stats;

pub use format::*;
pub use stats::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column used for scalar (non-object) rows.
pub const VALUE_COLUMN: &str = "Value";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub period: String,
    pub value: f64,
}

/// One labelled line of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn periods(&self) -> Vec<String> {
        self.points.iter().map(|p| p.period.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(x, value)` pairs with x the index of each point's period on `axis`.
    /// Points whose period is not on the axis are dropped.
    pub fn axis_points(&self, axis: &[String]) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .filter_map(|p| {
                let x = axis.iter().position(|period| *period == p.period)?;
                Some((x as f64, p.value))
            })
            .collect()
    }
}

/// Common x axis for several series: the longest series' periods, then any
/// period only the others carry, in first-seen order.
pub fn period_axis(series: &[Series]) -> Vec<String> {
    let mut ordered: Vec<&Series> = series.iter().collect();
    // Stable sort: ties keep input order.
    ordered.sort_by(|a, b| b.points.len().cmp(&a.points.len()));

    let mut axis: Vec<String> = Vec::new();
    for s in ordered {
        for p in &s.points {
            if !axis.contains(&p.period) {
                axis.push(p.period.clone());
            }
        }
    }
    axis
}

/// Results rows normalized to a rectangular table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    pub columns: Vec<String>,
    /// Cells aligned with `columns`; missing keys are `Null`.
    pub rows: Vec<Vec<Value>>,
}

impl ResultTable {
    pub fn from_results(results: &[Value]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in results {
            match row {
                Value::Object(map) => {
                    for key in map.keys() {
                        if !columns.iter().any(|c| c == key) {
                            columns.push(key.clone());
                        }
                    }
                }
                _ => {
                    if !columns.iter().any(|c| c == VALUE_COLUMN) {
                        columns.push(VALUE_COLUMN.to_string());
                    }
                }
            }
        }

        let rows = results
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|col| match row {
                        Value::Object(map) => map.get(col).cloned().unwrap_or(Value::Null),
                        scalar if col == VALUE_COLUMN => scalar.clone(),
                        _ => Value::Null,
                    })
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Display label of row `idx`: its first text cell, else `Row N`.
    pub fn row_label(&self, idx: usize) -> String {
        self.rows
            .get(idx)
            .and_then(|row| row.iter().find_map(text_cell))
            .unwrap_or_else(|| format!("Row {}", idx + 1))
    }

    /// One series per row, one point per numeric cell.
    pub fn row_series(&self) -> Vec<Series> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| {
                let points: Vec<SeriesPoint> = self
                    .columns
                    .iter()
                    .zip(row)
                    .filter_map(|(col, cell)| {
                        numeric_value(cell).map(|value| SeriesPoint {
                            period: col.clone(),
                            value,
                        })
                    })
                    .collect();
                (!points.is_empty()).then(|| Series {
                    label: self.row_label(idx),
                    points,
                })
            })
            .collect()
    }

    /// One series per numeric column, indexed by row label.
    pub fn column_series(&self) -> Vec<Series> {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(col_idx, col)| {
                let points: Vec<SeriesPoint> = self
                    .rows
                    .iter()
                    .enumerate()
                    .filter_map(|(row_idx, row)| {
                        row.get(col_idx).and_then(numeric_value).map(|value| SeriesPoint {
                            period: self.row_label(row_idx),
                            value,
                        })
                    })
                    .collect();
                (!points.is_empty()).then(|| Series {
                    label: col.clone(),
                    points,
                })
            })
            .collect()
    }
}

/// Numbers, and strings like `"1,234.5"` or `"$12"`.
pub fn numeric_value(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|x| x.is_finite()),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| *c != ',' && *c != '$' && !c.is_whitespace())
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok().filter(|x| x.is_finite())
        }
        _ => None,
    }
}

fn text_cell(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() && numeric_value(v).is_none() => Some(s.trim().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn series(label: &str, points: &[(&str, f64)]) -> Series {
        Series {
            label: label.to_string(),
            points: points
                .iter()
                .map(|&(period, value)| SeriesPoint {
                    period: period.to_string(),
                    value,
                })
                .collect(),
        }
    }

    #[test]
    fn shorter_series_align_on_the_shared_axis() {
        let all = series("All", &[("Y1", 1.0), ("Y2", 2.0), ("Y3", 3.0), ("Y4", 4.0), ("Y5", 5.0)]);
        let mid = series("Mid", &[("Y2", 20.0), ("Y3", 30.0), ("Y4", 40.0)]);

        let axis = period_axis(&[mid.clone(), all.clone()]);
        assert_eq!(axis, vec!["Y1", "Y2", "Y3", "Y4", "Y5"]);
        assert_eq!(mid.axis_points(&axis), vec![(1.0, 20.0), (2.0, 30.0), (3.0, 40.0)]);
        assert_eq!(all.axis_points(&axis)[4], (4.0, 5.0));
    }

    #[test]
    fn axis_appends_periods_missing_from_the_longest() {
        let a = series("A", &[("Y1", 1.0), ("Y2", 2.0)]);
        let b = series("B", &[("Y3", 3.0)]);
        assert_eq!(period_axis(&[a, b]), vec!["Y1", "Y2", "Y3"]);
        assert!(period_axis(&[]).is_empty());
    }

    #[test]
    fn columns_keep_first_seen_order() {
        let rows = vec![
            json!({"Line Item": "Revenue", "Y1": 100.0, "Y2": 110.0}),
            json!({"Line Item": "Costs", "Y2": 50.0, "Y3": 55.0}),
        ];
        let table = ResultTable::from_results(&rows);
        assert_eq!(table.columns, vec!["Line Item", "Y1", "Y2", "Y3"]);
        assert_eq!(table.rows[1][1], Value::Null);
        assert_eq!(table.rows[1][3], json!(55.0));
    }

    #[test]
    fn scalar_rows_land_in_value_column() {
        let table = ResultTable::from_results(&[json!(1.5), json!("2,000")]);
        assert_eq!(table.columns, vec![VALUE_COLUMN]);
        let series = table.row_series();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "Row 1");
        assert_eq!(series[1].values(), vec![2000.0]);
    }

    #[test]
    fn row_series_are_labelled_by_text_cell() {
        let rows = vec![
            json!({"Line Item": "Net Income", "Y1": 10.0, "Y2": "$12", "Note": "est."}),
            json!({"Line Item": "Empty", "Note": "n/a"}),
        ];
        let series = ResultTable::from_results(&rows).row_series();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].label, "Net Income");
        assert_eq!(series[0].periods(), vec!["Y1", "Y2"]);
        assert_eq!(series[0].values(), vec![10.0, 12.0]);
    }

    #[test]
    fn column_series_skip_text_columns() {
        let rows = vec![
            json!({"Year": "2025", "Revenue": 100.0, "Label": "a"}),
            json!({"Year": "2026", "Revenue": 120.0, "Label": "b"}),
        ];
        let series = ResultTable::from_results(&rows).column_series();
        let labels: Vec<&str> = series.iter().map(|s| s.label.as_str()).collect();
        // "Year" strings are numeric, "Label" is text.
        assert_eq!(labels, vec!["Year", "Revenue"]);
        assert_eq!(series[1].periods(), vec!["a", "b"]);
    }

    #[test]
    fn numeric_value_rejects_text() {
        assert_eq!(numeric_value(&json!("  1,234.5 ")), Some(1234.5));
        assert_eq!(numeric_value(&json!("-$5")), Some(-5.0));
        assert_eq!(numeric_value(&json!("abc")), None);
        assert_eq!(numeric_value(&json!("")), None);
        assert_eq!(numeric_value(&json!(true)), None);
    }
}
