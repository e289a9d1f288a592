//! Terminal formatting for model results.
//!
//! Kept apart from the request/response plumbing so output changes stay
//! localized (and snapshot-testable).

use serde_json::Value;

use crate::api::ModelOutputs;
use crate::domain::ModelParams;
use crate::results::{ResultTable, SeriesSummary, numeric_value};

/// Scalar balance-sheet items shown before eliding.
pub const BALANCE_SHEET_PREVIEW: usize = 5;
/// Column series listed under "Key insights".
pub const MAX_INSIGHTS: usize = 3;

const CELL_WIDTH: usize = 18;

/// `$1,234` / `-$1,234` (rounded to whole units).
pub fn format_currency(v: f64) -> String {
    if !v.is_finite() {
        return "N/A".to_string();
    }
    let rounded = v.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(rounded.abs() as u64))
}

/// `0.0356` -> `3.56%`.
pub fn format_rate(r: f64) -> String {
    format!("{:.2}%", r * 100.0)
}

/// `12.34` -> `+12.3%`.
pub fn format_signed_percent(p: f64) -> String {
    format!("{p:+.1}%")
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Header block: who/what was run and the main inputs.
pub fn format_run_summary(outputs: &ModelOutputs, params: &ModelParams, call_purpose: &str) -> String {
    let mut out = String::new();

    out.push_str("=== fpm - Financial Planning Model ===\n");
    out.push_str(&format!("Client : {}\n", outputs.client_name));
    out.push_str(&format!("Model  : {}\n", outputs.model_name));
    out.push_str(&format!("Project: {}\n", outputs.project_name));
    out.push_str(&format!("Line item: {}\n", params.line_item));
    out.push_str(&format!("Purpose  : {call_purpose}\n"));

    out.push_str("\nInputs:\n");
    out.push_str(&format!("- Capex: {}\n", format_currency(params.capex)));
    out.push_str(&format!(
        "- PP&E useful life: existing {}y | new {}y\n",
        params.existing_ppe_life, params.new_ppe_life
    ));
    out.push_str(&format!(
        "- Global SaaS COGS: {} | Interest income: {}\n",
        format_rate(params.global_saas_cogs),
        format_rate(params.interest_income)
    ));
    out.push_str(&format!(
        "- Y1 rates: G&A personnel {} | R&D personnel {}\n",
        format_rate(params.ga_personnel_rates.first()),
        format_rate(params.rd_personnel_rates.first())
    ));
    out.push_str(&format!("- Leases: {}\n", params.existing_leases.len()));
    out.push('\n');

    out
}

/// Results rows as a fixed-width table; numeric cells as currency.
pub fn format_results_table(table: &ResultTable) -> String {
    if table.is_empty() {
        return "No results returned.\n".to_string();
    }

    let mut out = String::new();
    out.push_str("Financial projections:\n");
    push_row(&mut out, table.columns.iter().map(|c| truncate(c, CELL_WIDTH)));
    push_row(&mut out, table.columns.iter().map(|_| "-".repeat(CELL_WIDTH)));
    for row in &table.rows {
        push_row(&mut out, row.iter().map(|cell| truncate(&display_cell(cell), CELL_WIDTH)));
    }
    out
}

/// Trend lines for the first few numeric columns with more than one value.
pub fn format_insights(columns: &[SeriesSummary]) -> String {
    let lines: Vec<String> = columns
        .iter()
        .filter(|s| s.stats.count > 1)
        .take(MAX_INSIGHTS)
        .map(|s| {
            let change = s
                .stats
                .percent_change
                .map(format_signed_percent)
                .unwrap_or_else(|| "n/a".to_string());
            format!(
                "  {}: {} ({change} over period) | min {} | max {} | mean {}\n",
                s.label,
                s.stats.trend.label(),
                format_currency(s.stats.min),
                format_currency(s.stats.max),
                format_currency(s.stats.mean),
            )
        })
        .collect();

    if lines.is_empty() {
        return String::new();
    }
    let mut out = String::from("Key insights:\n");
    for line in lines {
        out.push_str(&line);
    }
    out
}

/// Balance-sheet items: object rows as a table, scalars as a short list.
pub fn format_balance_sheet(items: &[Value]) -> String {
    if items.is_empty() {
        return String::new();
    }

    let mut out = String::from("Balance sheet items:\n");
    if items[0].is_object() {
        let table = ResultTable::from_results(items);
        push_row(&mut out, table.columns.iter().map(|c| truncate(c, CELL_WIDTH)));
        for row in &table.rows {
            push_row(&mut out, row.iter().map(|cell| truncate(&display_cell(cell), CELL_WIDTH)));
        }
        return out;
    }

    for item in items.iter().take(BALANCE_SHEET_PREVIEW) {
        out.push_str(&format!("  - {}\n", plain_text(item)));
    }
    if items.len() > BALANCE_SHEET_PREVIEW {
        out.push_str(&format!("  ... and {} more items\n", items.len() - BALANCE_SHEET_PREVIEW));
    }
    out
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>) {
    let line: Vec<String> = cells.map(|c| format!("{c:<CELL_WIDTH$}")).collect();
    out.push_str(line.join(" ").trim_end());
    out.push('\n');
}

fn display_cell(cell: &Value) -> String {
    match cell {
        Value::Null => "N/A".to_string(),
        Value::Number(_) => numeric_value(cell).map(format_currency).unwrap_or_default(),
        other => plain_text(other),
    }
}

fn plain_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::results::{Series, SeriesPoint, summarize_series};

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.4), "$999");
        assert_eq!(format_currency(1234.5), "$1,235");
        assert_eq!(format_currency(-1_234_567.0), "-$1,234,567");
        assert_eq!(format_currency(f64::NAN), "N/A");
    }

    #[test]
    fn rates_and_percentages() {
        assert_eq!(format_rate(0.0356), "3.56%");
        assert_eq!(format_signed_percent(12.34), "+12.3%");
        assert_eq!(format_signed_percent(-4.0), "-4.0%");
    }

    #[test]
    fn balance_sheet_elides_long_lists() {
        let items: Vec<Value> = (1..=7).map(|i| json!(format!("Item {i}"))).collect();
        let txt = format_balance_sheet(&items);
        assert!(txt.contains("  - Item 5\n"));
        assert!(!txt.contains("Item 6"));
        assert!(txt.ends_with("  ... and 2 more items\n"));
    }

    #[test]
    fn results_table_formats_numbers() {
        let table = ResultTable::from_results(&[json!({"Line Item": "Revenue", "Y1": 1500.0})]);
        let txt = format_results_table(&table);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], "Financial projections:");
        assert!(lines[1].starts_with("Line Item"));
        assert!(lines[3].starts_with("Revenue"));
        assert!(lines[3].ends_with("$1,500"));
    }

    #[test]
    fn insights_skip_single_points() {
        let one = Series {
            label: "Y1".to_string(),
            points: vec![SeriesPoint { period: "a".to_string(), value: 1.0 }],
        };
        let two = Series {
            label: "Y2".to_string(),
            points: vec![
                SeriesPoint { period: "a".to_string(), value: 100.0 },
                SeriesPoint { period: "b".to_string(), value: 90.0 },
            ],
        };
        let summaries: Vec<SeriesSummary> = [one, two].iter().filter_map(summarize_series).collect();
        let txt = format_insights(&summaries);
        assert!(txt.starts_with("Key insights:\n"));
        assert!(txt.contains("  Y2: Declining (-10.0% over period)"));
        assert!(!txt.contains("  Y1:"));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
