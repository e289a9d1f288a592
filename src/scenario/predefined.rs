//! Built-in demo scenarios.

use serde::Serialize;

use crate::domain::{LineItem, ModelParams, YearRates};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredefinedScenario {
    pub id: String,
    pub name: String,
    pub description: String,
    pub parameters: ModelParams,
}

struct Template {
    name: &'static str,
    description: &'static str,
    capex: f64,
    ga_personnel: [f64; 5],
    ga_non_personnel: [f64; 5],
    rd_personnel: [f64; 5],
    rd_non_personnel: [f64; 5],
    global_saas_cogs: f64,
    interest_income: f64,
    line_item: &'static str,
}

const TEMPLATES: [Template; 3] = [
    Template {
        name: "Conservative Growth",
        description: "Low-risk scenario with modest growth projections",
        capex: 5000.0,
        ga_personnel: [0.030, 0.028, 0.026, 0.024, 0.022],
        ga_non_personnel: [0.035, 0.033, 0.031, 0.029, 0.027],
        rd_personnel: [0.080, 0.075, 0.070, 0.065, 0.060],
        rd_non_personnel: [0.025, 0.024, 0.023, 0.022, 0.021],
        global_saas_cogs: 0.800,
        interest_income: 0.015,
        line_item: "Income Statement : GAAP Net Income : GAAP Net Income",
    },
    Template {
        name: "Aggressive Expansion",
        description: "High-growth scenario with increased investments",
        capex: 15000.0,
        ga_personnel: [0.045, 0.042, 0.040, 0.038, 0.036],
        ga_non_personnel: [0.050, 0.048, 0.046, 0.044, 0.042],
        rd_personnel: [0.120, 0.115, 0.110, 0.105, 0.100],
        rd_non_personnel: [0.040, 0.038, 0.036, 0.034, 0.032],
        global_saas_cogs: 0.900,
        interest_income: 0.008,
        line_item: "Income Statement : Revenue : Total Revenue",
    },
    Template {
        name: "Balanced Portfolio",
        description: "Moderate growth with balanced risk/return",
        capex: 8000.0,
        ga_personnel: [0.0356, 0.0338, 0.0321, 0.0289, 0.0284],
        ga_non_personnel: [0.0413, 0.041, 0.0390, 0.0370, 0.0352],
        rd_personnel: [0.0929, 0.091, 0.089, 0.088, 0.088],
        rd_non_personnel: [0.0312, 0.031, 0.029, 0.029, 0.029],
        global_saas_cogs: 0.843,
        interest_income: 0.010,
        line_item: "Balance Sheet : Total Assets : Total Assets",
    },
];

impl Template {
    fn build(&self) -> PredefinedScenario {
        PredefinedScenario {
            id: scenario_id(self.name),
            name: self.name.to_string(),
            description: self.description.to_string(),
            parameters: ModelParams {
                capex: self.capex,
                ga_personnel_rates: YearRates::new(self.ga_personnel),
                ga_non_personnel_rates: YearRates::new(self.ga_non_personnel),
                rd_personnel_rates: YearRates::new(self.rd_personnel),
                rd_non_personnel_rates: YearRates::new(self.rd_non_personnel),
                global_saas_cogs: self.global_saas_cogs,
                interest_income: self.interest_income,
                line_item: LineItem::parse(self.line_item).unwrap_or_default(),
                ..ModelParams::default()
            },
        }
    }
}

/// `"Balanced Portfolio"` -> `"balanced_portfolio"`.
pub fn scenario_id(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

pub fn predefined_scenarios() -> Vec<PredefinedScenario> {
    TEMPLATES.iter().map(Template::build).collect()
}

/// Match by id or name, case-insensitively.
pub fn find_predefined(key: &str) -> Option<PredefinedScenario> {
    let key = key.trim();
    let as_id = scenario_id(key);
    TEMPLATES
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(key) || scenario_id(t.name) == as_id)
        .map(Template::build)
}

/// Flat-rate parameters used by the connectivity check.
pub fn connectivity_test_params() -> ModelParams {
    ModelParams {
        capex: 1000.0,
        ga_personnel_rates: YearRates::flat(0.03),
        ga_non_personnel_rates: YearRates::flat(0.04),
        rd_personnel_rates: YearRates::flat(0.08),
        rd_non_personnel_rates: YearRates::flat(0.03),
        global_saas_cogs: 0.8,
        interest_income: 0.01,
        ..ModelParams::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validate_params;

    #[test]
    fn three_valid_scenarios() {
        let all = predefined_scenarios();
        assert_eq!(all.len(), 3);
        for s in &all {
            assert!(validate_params(&s.parameters).is_ok(), "{} should validate", s.name);
            assert!(s.parameters.line_item.is_known());
        }
        assert_eq!(all[1].id, "aggressive_expansion");
        assert_eq!(all[1].parameters.capex, 15000.0);
        assert_eq!(all[1].parameters.existing_leases.len(), 2);
    }

    #[test]
    fn lookup_by_id_or_name() {
        assert_eq!(
            find_predefined("conservative_growth").map(|s| s.name),
            Some("Conservative Growth".to_string())
        );
        assert_eq!(
            find_predefined("BALANCED PORTFOLIO").map(|s| s.id),
            Some("balanced_portfolio".to_string())
        );
        assert!(find_predefined("Moonshot").is_none());
    }

    #[test]
    fn connectivity_params_validate() {
        assert!(validate_params(&connectivity_test_params()).is_ok());
    }
}
