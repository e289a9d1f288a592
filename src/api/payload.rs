//! Request envelope for the model's `execute` operation.
//!
//! The hosted model reads spreadsheet-style input names, so the structs here
//! carry explicit renames instead of a blanket case convention.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::domain::{Lease, LineItem, ModelParams, YearRates};
use crate::error::AppError;

/// Outputs the dashboard asks for.
pub const REQUESTED_OUTPUTS: [&str; 5] = [
    "ClientName",
    "ModelName",
    "ProjectName",
    "Results",
    "BalanceSheet_lineitems",
];

/// Which front-end issued a call (`request_meta.source_system`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSystem {
    Relay,
    Cli,
    Dashboard,
    Diagnostic,
}

impl SourceSystem {
    pub fn label(self) -> &'static str {
        match self {
            SourceSystem::Relay => "Financial Planning Relay",
            SourceSystem::Cli => "fpm CLI",
            SourceSystem::Dashboard => "fpm Terminal Dashboard",
            SourceSystem::Diagnostic => "Diagnostic Tool",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecuteRequest {
    pub request_data: RequestData,
    pub request_meta: RequestMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestData {
    pub inputs: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestMeta {
    pub version_id: Option<String>,
    pub transaction_date: Option<String>,
    pub call_purpose: Option<String>,
    pub source_system: Option<String>,
    pub correlation_id: Option<String>,
    pub service_category: String,
    pub requested_output: Vec<String>,
}

impl RequestMeta {
    pub fn new(call_purpose: &str, source: SourceSystem) -> Self {
        Self {
            version_id: None,
            transaction_date: None,
            call_purpose: Some(call_purpose.to_string()),
            source_system: Some(source.label().to_string()),
            correlation_id: None,
            service_category: "ALL".to_string(),
            requested_output: REQUESTED_OUTPUTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ModelInputs<'a> {
    #[serde(rename = "Capex")]
    capex: f64,
    existing_leases: Vec<LeaseInput<'a>>,
    #[serde(rename = "ExistingPPEUsefulLife")]
    existing_ppe_life: u32,
    #[serde(rename = "NewPPEUsefulLife")]
    new_ppe_life: u32,
    #[serde(rename = "GA_personnel_expenses")]
    ga_personnel: Vec<Value>,
    #[serde(rename = "GA_non_personnel_expenses")]
    ga_non_personnel: Vec<Value>,
    #[serde(rename = "RD_personnel_expenses")]
    rd_personnel: Vec<Value>,
    #[serde(rename = "RD_non_personnel_expenses")]
    rd_non_personnel: Vec<Value>,
    #[serde(rename = "GlobalSaaSCOGS")]
    global_saas_cogs: f64,
    #[serde(rename = "GRR")]
    grr: Vec<Vec<Value>>,
    #[serde(rename = "InterestIncome")]
    interest_income: f64,
    #[serde(rename = "LongTermDebtBorrowingCosts")]
    debt_borrowing_costs: Vec<Vec<Value>>,
    #[serde(rename = "LineItem")]
    line_item: String,
}

#[derive(Debug, Serialize)]
struct LeaseInput<'a> {
    #[serde(rename = "Existing leases")]
    name: &'a str,
    #[serde(rename = "Lease expiry date")]
    expiry_date: String,
    #[serde(rename = "Remaining useful life(years)")]
    remaining_life_years: f64,
    #[serde(rename = "Lease renewable")]
    renewable: &'static str,
    #[serde(rename = "Average new lease life(years)")]
    avg_new_lease_life_years: f64,
    // Key spelling is the model's.
    #[serde(rename = "% of Total lease liabilties")]
    liability_share: f64,
    #[serde(rename = "Borrowing Rate pa")]
    borrowing_rate: f64,
}

impl<'a> From<&'a Lease> for LeaseInput<'a> {
    fn from(lease: &'a Lease) -> Self {
        Self {
            name: &lease.name,
            expiry_date: lease.expiry_date.format("%Y-%m-%d").to_string(),
            remaining_life_years: lease.remaining_life_years,
            renewable: if lease.renewable { "Yes" } else { "No" },
            avg_new_lease_life_years: lease.avg_new_lease_life_years,
            liability_share: lease.liability_share,
            borrowing_rate: lease.borrowing_rate,
        }
    }
}

impl ExecuteRequest {
    /// Full request for a parameter set.
    pub fn for_params(params: &ModelParams, meta: RequestMeta) -> Result<Self, AppError> {
        let inputs = ModelInputs {
            capex: params.capex,
            existing_leases: params.existing_leases.iter().map(LeaseInput::from).collect(),
            existing_ppe_life: params.existing_ppe_life,
            new_ppe_life: params.new_ppe_life,
            ga_personnel: year_entries(&params.ga_personnel_rates),
            ga_non_personnel: year_entries(&params.ga_non_personnel_rates),
            rd_personnel: year_entries(&params.rd_personnel_rates),
            rd_non_personnel: year_entries(&params.rd_non_personnel_rates),
            global_saas_cogs: params.global_saas_cogs,
            grr: params.grr_rates.iter().map(year_entries).collect(),
            interest_income: params.interest_income,
            debt_borrowing_costs: params.debt_borrowing_costs.iter().map(year_entries).collect(),
            line_item: params.line_item.to_string(),
        };

        let inputs = serde_json::to_value(inputs)
            .map_err(|e| AppError::runtime(format!("Failed to encode model inputs: {e}")))?;

        Ok(Self {
            request_data: RequestData { inputs },
            request_meta: meta,
        })
    }

    /// Smallest useful request (capex + line item, `Results` only).
    pub fn minimal(capex: f64, line_item: &LineItem, mut meta: RequestMeta) -> Self {
        meta.requested_output = vec!["Results".to_string()];
        Self {
            request_data: RequestData {
                inputs: json!({
                    "Capex": capex,
                    "LineItem": line_item.to_string(),
                }),
            },
            request_meta: meta,
        }
    }

    pub fn call_purpose(&self) -> &str {
        self.request_meta.call_purpose.as_deref().unwrap_or("")
    }
}

/// `[{"Y1": r1}, {"Y2": r2}, ...]`, the model's per-year input layout.
pub fn year_entries(rates: &YearRates) -> Vec<Value> {
    rates
        .labelled()
        .map(|(label, rate)| {
            let mut entry = Map::new();
            entry.insert(label.to_string(), json!(rate));
            Value::Object(entry)
        })
        .collect()
}
