//! Side-by-side comparison of two saved scenarios.

use serde::Serialize;

use crate::domain::ModelParams;
use crate::error::AppError;
use crate::results::{
    Series, SeriesSummary, format_currency, format_rate, format_signed_percent, percent_change, summarize_series,
};
use crate::scenario::Scenario;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonPoint {
    pub period: String,
    pub base: f64,
    pub other: f64,
    /// `other - base`.
    pub delta: f64,
    pub percent_delta: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterChange {
    pub field: String,
    pub base: String,
    pub other: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioComparison {
    pub base_name: String,
    pub other_name: String,
    pub series_label: String,
    pub points: Vec<ComparisonPoint>,
    pub base_summary: Option<SeriesSummary>,
    pub other_summary: Option<SeriesSummary>,
    pub parameter_changes: Vec<ParameterChange>,
}

pub fn compare(base: &Scenario, other: &Scenario) -> Result<ScenarioComparison, AppError> {
    let base_series = first_series(base)?;
    let other_series = first_series(other)?;

    let points = base_series
        .points
        .iter()
        .filter_map(|b| {
            let o = other_series.points.iter().find(|o| o.period == b.period)?;
            Some(ComparisonPoint {
                period: b.period.clone(),
                base: b.value,
                other: o.value,
                delta: o.value - b.value,
                percent_delta: percent_change(b.value, o.value),
            })
        })
        .collect();

    Ok(ScenarioComparison {
        base_name: base.name.clone(),
        other_name: other.name.clone(),
        series_label: base_series.label.clone(),
        points,
        base_summary: summarize_series(base_series),
        other_summary: summarize_series(other_series),
        parameter_changes: parameter_changes(&base.parameters, &other.parameters),
    })
}

fn first_series(scenario: &Scenario) -> Result<&Series, AppError> {
    scenario
        .result
        .as_ref()
        .and_then(|r| r.series.iter().find(|s| !s.is_empty()))
        .ok_or_else(|| AppError::input(format!("Scenario '{}' has no results to compare.", scenario.name)))
}

/// Scalar inputs (and Y1 rates) that differ between two parameter sets.
pub fn parameter_changes(base: &ModelParams, other: &ModelParams) -> Vec<ParameterChange> {
    let fields: [(&str, String, String); 10] = [
        ("capex", format_currency(base.capex), format_currency(other.capex)),
        (
            "existingPpeLife",
            base.existing_ppe_life.to_string(),
            other.existing_ppe_life.to_string(),
        ),
        ("newPpeLife", base.new_ppe_life.to_string(), other.new_ppe_life.to_string()),
        (
            "globalSaasCogs",
            format_rate(base.global_saas_cogs),
            format_rate(other.global_saas_cogs),
        ),
        (
            "interestIncome",
            format_rate(base.interest_income),
            format_rate(other.interest_income),
        ),
        (
            "gaPersonnelRates.Y1",
            format_rate(base.ga_personnel_rates.first()),
            format_rate(other.ga_personnel_rates.first()),
        ),
        (
            "gaNonPersonnelRates.Y1",
            format_rate(base.ga_non_personnel_rates.first()),
            format_rate(other.ga_non_personnel_rates.first()),
        ),
        (
            "rdPersonnelRates.Y1",
            format_rate(base.rd_personnel_rates.first()),
            format_rate(other.rd_personnel_rates.first()),
        ),
        (
            "rdNonPersonnelRates.Y1",
            format_rate(base.rd_non_personnel_rates.first()),
            format_rate(other.rd_non_personnel_rates.first()),
        ),
        ("lineItem", base.line_item.to_string(), other.line_item.to_string()),
    ];

    fields
        .into_iter()
        .filter(|(_, b, o)| b != o)
        .map(|(field, base, other)| ParameterChange {
            field: field.to_string(),
            base,
            other,
        })
        .collect()
}

pub fn format_comparison(cmp: &ScenarioComparison) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "=== {} vs {} ({}) ===\n",
        cmp.base_name, cmp.other_name, cmp.series_label
    ));

    out.push_str(&format!(
        "{:<10} {:>14} {:>14} {:>14} {:>9}\n",
        "period", "base", "other", "delta", "delta%"
    ));
    for p in &cmp.points {
        let pct = p
            .percent_delta
            .map(format_signed_percent)
            .unwrap_or_else(|| "n/a".to_string());
        out.push_str(&format!(
            "{:<10} {:>14} {:>14} {:>14} {:>9}\n",
            p.period,
            format_currency(p.base),
            format_currency(p.other),
            format_currency(p.delta),
            pct
        ));
    }
    if cmp.points.is_empty() {
        out.push_str("(no common periods)\n");
    }

    if !cmp.parameter_changes.is_empty() {
        out.push_str("\nChanged inputs:\n");
        for c in &cmp.parameter_changes {
            out.push_str(&format!("- {}: {} -> {}\n", c.field, c.base, c.other));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::results::SeriesPoint;
    use crate::scenario::ScenarioResult;

    fn with_series(name: &str, values: &[(&str, f64)], params: ModelParams) -> Scenario {
        let series = Series {
            label: "Net Income".to_string(),
            points: values
                .iter()
                .map(|(period, value)| SeriesPoint {
                    period: period.to_string(),
                    value: *value,
                })
                .collect(),
        };
        Scenario::new(name, "", params).with_result(ScenarioResult {
            client_name: "N/A".to_string(),
            model_name: "N/A".to_string(),
            project_name: "N/A".to_string(),
            line_item: String::new(),
            series: vec![series],
            computed_at: Utc::now(),
        })
    }

    #[test]
    fn compares_common_periods() {
        let base = with_series("Base", &[("Y1", 100.0), ("Y2", 200.0), ("Y3", 300.0)], ModelParams::default());
        let mut params = ModelParams::default();
        params.capex = 9000.0;
        let other = with_series("Stretch", &[("Y1", 110.0), ("Y3", 240.0)], params);

        let cmp = compare(&base, &other).unwrap();
        assert_eq!(cmp.points.len(), 2);
        assert_eq!(cmp.points[0].delta, 10.0);
        assert_eq!(cmp.points[0].percent_delta, Some(10.0));
        assert_eq!(cmp.points[1].period, "Y3");
        assert_eq!(cmp.points[1].delta, -60.0);
        assert_eq!(cmp.parameter_changes.len(), 1);
        assert_eq!(cmp.parameter_changes[0].field, "capex");
        assert_eq!(cmp.parameter_changes[0].other, "$9,000");

        let txt = format_comparison(&cmp);
        assert!(txt.starts_with("=== Base vs Stretch (Net Income) ===\n"));
        assert!(txt.contains("- capex: $8,000 -> $9,000\n"));
    }

    #[test]
    fn missing_results_is_an_input_error() {
        let base = Scenario::new("Empty", "", ModelParams::default());
        let other = with_series("Other", &[("Y1", 1.0)], ModelParams::default());
        let err = compare(&base, &other).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("'Empty'"));
    }
}
