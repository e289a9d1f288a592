//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - filled from CLI flags, the terminal form or the browser form (camelCase JSON)
//! - turned into the model's request payload (`api::payload`)
//! - stored inside scenarios and exported to JSON

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Projection years, in payload order.
pub const YEAR_LABELS: [&str; 5] = ["Y1", "Y2", "Y3", "Y4", "Y5"];

/// Five yearly rates (decimal, `0.05` = 5%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearRates(pub [f64; 5]);

impl YearRates {
    pub const fn new(rates: [f64; 5]) -> Self {
        Self(rates)
    }

    /// The same rate every year.
    pub const fn flat(rate: f64) -> Self {
        Self([rate; 5])
    }

    pub fn first(&self) -> f64 {
        self.0[0]
    }

    /// `(label, rate)` pairs in year order.
    pub fn labelled(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        YEAR_LABELS.iter().copied().zip(self.0.iter().copied())
    }

    /// Shift every year by `delta`, clamped to `[0, 1]`.
    pub fn shifted(&self, delta: f64) -> Self {
        let mut out = self.0;
        for r in &mut out {
            *r = (*r + delta).clamp(0.0, 1.0);
        }
        Self(out)
    }
}

impl fmt::Display for YearRates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|r| format!("{r}")).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// Dotted-path selector for one row of the model output,
/// e.g. `Income Statement : Revenue : Total Revenue`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LineItem {
    segments: Vec<String>,
}

impl LineItem {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let segments: Vec<String> = raw.split(':').map(|s| s.trim().to_string()).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(format!("Invalid line item '{raw}': empty path segment."));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Statement the row belongs to (first segment).
    pub fn statement(&self) -> &str {
        self.segments.first().map(String::as_str).unwrap_or("")
    }

    /// Row label (last segment).
    pub fn label(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    pub fn is_known(&self) -> bool {
        LINE_ITEM_CATALOG.iter().any(|known| *known == self.to_string())
    }

    /// Next entry of the catalog (wrapping); unknown items restart at the first.
    pub fn next_known(&self) -> Self {
        let current = self.to_string();
        let idx = LINE_ITEM_CATALOG.iter().position(|k| *k == current);
        let next = match idx {
            Some(i) => LINE_ITEM_CATALOG[(i + 1) % LINE_ITEM_CATALOG.len()],
            None => LINE_ITEM_CATALOG[0],
        };
        Self::parse(next).unwrap_or_else(|_| self.clone())
    }

    pub fn prev_known(&self) -> Self {
        let current = self.to_string();
        let n = LINE_ITEM_CATALOG.len();
        let idx = LINE_ITEM_CATALOG.iter().position(|k| *k == current);
        let prev = match idx {
            Some(i) => LINE_ITEM_CATALOG[(i + n - 1) % n],
            None => LINE_ITEM_CATALOG[n - 1],
        };
        Self::parse(prev).unwrap_or_else(|_| self.clone())
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(" : "))
    }
}

impl TryFrom<String> for LineItem {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LineItem> for String {
    fn from(value: LineItem) -> Self {
        value.to_string()
    }
}

impl Default for LineItem {
    fn default() -> Self {
        Self {
            segments: vec![
                "Income Statement".to_string(),
                "GAAP Net Income".to_string(),
                "GAAP Net Income".to_string(),
            ],
        }
    }
}

/// Selectors the form offers.
pub const LINE_ITEM_CATALOG: [&str; 4] = [
    "Income Statement : GAAP Net Income : GAAP Net Income",
    "Income Statement : Revenue : Total Revenue",
    "Balance Sheet : Total Assets : Total Assets",
    "Cash Flow : Operating Cash Flow : Operating Cash Flow",
];

/// An existing lease as the model expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lease {
    pub name: String,
    pub expiry_date: NaiveDate,
    pub remaining_life_years: f64,
    pub renewable: bool,
    pub avg_new_lease_life_years: f64,
    /// Share of total lease liabilities (decimal).
    pub liability_share: f64,
    /// Borrowing rate per annum (decimal).
    pub borrowing_rate: f64,
}

impl Lease {
    pub fn default_leases() -> Vec<Lease> {
        vec![
            Lease {
                name: "HQ Main".to_string(),
                expiry_date: date(2027, 10, 31),
                remaining_life_years: 3.83,
                renewable: true,
                avg_new_lease_life_years: 7.58,
                liability_share: 0.10,
                borrowing_rate: 0.083,
            },
            Lease {
                name: "Branch Office".to_string(),
                expiry_date: date(2025, 6, 30),
                remaining_life_years: 1.5,
                renewable: false,
                avg_new_lease_life_years: 3.25,
                liability_share: 0.05,
                borrowing_rate: 0.0804,
            },
        ]
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

/// Everything the form sends to the model.
///
/// All fields are optional on the wire; missing ones take the defaults below
/// (the "balanced" form state).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelParams {
    pub capex: f64,
    pub existing_ppe_life: u32,
    pub new_ppe_life: u32,
    pub existing_leases: Vec<Lease>,
    pub ga_personnel_rates: YearRates,
    pub ga_non_personnel_rates: YearRates,
    pub rd_personnel_rates: YearRates,
    pub rd_non_personnel_rates: YearRates,
    pub global_saas_cogs: f64,
    pub interest_income: f64,
    pub line_item: LineItem,
    /// Gross revenue retention schedules.
    pub grr_rates: Vec<YearRates>,
    pub debt_borrowing_costs: Vec<YearRates>,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            capex: 8000.0,
            existing_ppe_life: 15,
            new_ppe_life: 15,
            existing_leases: Lease::default_leases(),
            ga_personnel_rates: YearRates::new([0.0356, 0.0338, 0.0321, 0.0289, 0.0284]),
            ga_non_personnel_rates: YearRates::new([0.0413, 0.041, 0.0390, 0.0370, 0.0352]),
            rd_personnel_rates: YearRates::new([0.0929, 0.091, 0.089, 0.088, 0.088]),
            rd_non_personnel_rates: YearRates::new([0.0312, 0.031, 0.029, 0.029, 0.029]),
            global_saas_cogs: 0.843,
            interest_income: 0.01,
            line_item: LineItem::default(),
            grr_rates: default_grr_rates(),
            debt_borrowing_costs: default_debt_borrowing_costs(),
        }
    }
}

pub fn default_grr_rates() -> Vec<YearRates> {
    vec![
        YearRates::new([1.0, 0.999, 0.999, 0.999, 0.999]),
        YearRates::new([0.91, 0.925, 0.937, 0.945, 0.95]),
    ]
}

pub fn default_debt_borrowing_costs() -> Vec<YearRates> {
    vec![
        YearRates::flat(0.03),
        YearRates::flat(0.06),
        YearRates::flat(0.005),
        YearRates::flat(0.005),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_item_parses_and_normalizes_spacing() {
        let item = LineItem::parse("Income Statement:Revenue :  Total Revenue").unwrap();
        assert_eq!(item.to_string(), "Income Statement : Revenue : Total Revenue");
        assert_eq!(item.statement(), "Income Statement");
        assert_eq!(item.label(), "Total Revenue");
        assert!(item.is_known());
    }

    #[test]
    fn line_item_rejects_empty_segments() {
        assert!(LineItem::parse("Income Statement :: Revenue").is_err());
        assert!(LineItem::parse("").is_err());
    }

    #[test]
    fn line_item_cycles_through_catalog() {
        let first = LineItem::default();
        let second = first.next_known();
        assert_eq!(second.to_string(), LINE_ITEM_CATALOG[1]);
        assert_eq!(second.prev_known(), first);
        assert_eq!(first.prev_known().to_string(), LINE_ITEM_CATALOG[3]);
    }

    #[test]
    fn params_fill_missing_fields_with_defaults() {
        let params: ModelParams =
            serde_json::from_str(r#"{"capex": 12000, "lineItem": "Balance Sheet : Total Assets : Total Assets"}"#)
                .unwrap();
        assert_eq!(params.capex, 12000.0);
        assert_eq!(params.line_item.label(), "Total Assets");
        assert_eq!(params.ga_personnel_rates, ModelParams::default().ga_personnel_rates);
        assert_eq!(params.existing_leases.len(), 2);
    }

    #[test]
    fn rates_must_have_five_years() {
        let res: Result<ModelParams, _> = serde_json::from_str(r#"{"gaPersonnelRates": [0.1, 0.2]}"#);
        assert!(res.is_err());
    }

    #[test]
    fn shifted_rates_stay_in_unit_interval() {
        let rates = YearRates::new([0.0, 0.5, 0.999, 1.0, 0.25]).shifted(0.25);
        assert_eq!(rates.0, [0.25, 0.75, 1.0, 1.0, 0.5]);
        let down = YearRates::flat(0.005).shifted(-0.01);
        assert_eq!(down, YearRates::flat(0.0));
    }
}
