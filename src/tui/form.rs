//! Editable fields of the dashboard's parameter form.
//!
//! Each field knows how to render its current value, how to step it with the
//! arrow keys, and how to parse a typed value. Keeping this free of terminal
//! state lets it be tested directly.
//!
//! The field list depends on the parameters: after the scalar inputs comes a
//! lease count, then one block of fields per existing lease.

use chrono::{Months, NaiveDate};

use crate::domain::{
    LEASE_NEW_LIFE_RANGE, LEASE_REMAINING_LIFE_RANGE, Lease, LineItem, MAX_LEASES, ModelParams, PPE_LIFE_RANGE,
    parse_rates,
};
use crate::error::AppError;
use crate::results::{format_currency, format_rate};

const CAPEX_STEP: f64 = 500.0;
const RATE_STEP: f64 = 0.001;
const COGS_STEP: f64 = 0.01;
const INTEREST_STEP: f64 = 0.0025;
const LEASE_LIFE_STEP: f64 = 0.25;
const LEASE_SHARE_STEP: f64 = 0.01;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Capex,
    ExistingPpeLife,
    NewPpeLife,
    GaPersonnel,
    GaNonPersonnel,
    RdPersonnel,
    RdNonPersonnel,
    GlobalSaasCogs,
    InterestIncome,
    LineItem,
    LeaseCount,
    /// One attribute of the lease at that index.
    Lease(usize, LeaseField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseField {
    Name,
    ExpiryDate,
    RemainingLife,
    Renewable,
    NewLeaseLife,
    LiabilityShare,
    BorrowingRate,
}

impl LeaseField {
    pub const ALL: [LeaseField; 7] = [
        LeaseField::Name,
        LeaseField::ExpiryDate,
        LeaseField::RemainingLife,
        LeaseField::Renewable,
        LeaseField::NewLeaseLife,
        LeaseField::LiabilityShare,
        LeaseField::BorrowingRate,
    ];

    fn label(self) -> &'static str {
        match self {
            LeaseField::Name => "name",
            LeaseField::ExpiryDate => "expiry",
            LeaseField::RemainingLife => "remaining",
            LeaseField::Renewable => "renewable",
            LeaseField::NewLeaseLife => "new life",
            LeaseField::LiabilityShare => "liab. share",
            LeaseField::BorrowingRate => "rate p.a.",
        }
    }

    fn display(self, lease: &Lease) -> String {
        match self {
            LeaseField::Name => lease.name.clone(),
            LeaseField::ExpiryDate => lease.expiry_date.format(DATE_FORMAT).to_string(),
            LeaseField::RemainingLife => format!("{} yrs", lease.remaining_life_years),
            LeaseField::Renewable => if lease.renewable { "Yes" } else { "No" }.to_string(),
            LeaseField::NewLeaseLife => format!("{} yrs", lease.avg_new_lease_life_years),
            LeaseField::LiabilityShare => format_rate(lease.liability_share),
            LeaseField::BorrowingRate => format_rate(lease.borrowing_rate),
        }
    }

    fn raw(self, lease: &Lease) -> String {
        match self {
            LeaseField::Name => lease.name.clone(),
            LeaseField::ExpiryDate => lease.expiry_date.format(DATE_FORMAT).to_string(),
            LeaseField::RemainingLife => format!("{}", lease.remaining_life_years),
            LeaseField::Renewable => if lease.renewable { "yes" } else { "no" }.to_string(),
            LeaseField::NewLeaseLife => format!("{}", lease.avg_new_lease_life_years),
            LeaseField::LiabilityShare => format!("{}", lease.liability_share),
            LeaseField::BorrowingRate => format!("{}", lease.borrowing_rate),
        }
    }

    fn adjust(self, lease: &mut Lease, delta: i32) {
        let d = f64::from(delta);
        match self {
            LeaseField::Name => {}
            LeaseField::ExpiryDate => {
                let months = Months::new(delta.unsigned_abs());
                let next = if delta >= 0 {
                    lease.expiry_date.checked_add_months(months)
                } else {
                    lease.expiry_date.checked_sub_months(months)
                };
                if let Some(date) = next {
                    lease.expiry_date = date;
                }
            }
            LeaseField::RemainingLife => {
                lease.remaining_life_years =
                    clamp_range(lease.remaining_life_years + d * LEASE_LIFE_STEP, LEASE_REMAINING_LIFE_RANGE)
            }
            LeaseField::Renewable => lease.renewable = !lease.renewable,
            LeaseField::NewLeaseLife => {
                lease.avg_new_lease_life_years =
                    clamp_range(lease.avg_new_lease_life_years + d * LEASE_LIFE_STEP, LEASE_NEW_LIFE_RANGE)
            }
            LeaseField::LiabilityShare => {
                lease.liability_share = (lease.liability_share + d * LEASE_SHARE_STEP).clamp(0.0, 1.0)
            }
            LeaseField::BorrowingRate => {
                lease.borrowing_rate = (lease.borrowing_rate + d * RATE_STEP).clamp(0.0, 1.0)
            }
        }
    }

    fn apply_text(self, lease: &mut Lease, label: &str, text: &str) -> Result<(), AppError> {
        match self {
            LeaseField::Name => {
                if text.is_empty() {
                    return Err(AppError::input(format!("{label}: name must not be empty")));
                }
                lease.name = text.to_string();
            }
            LeaseField::ExpiryDate => {
                lease.expiry_date = NaiveDate::parse_from_str(text, DATE_FORMAT)
                    .map_err(|e| AppError::input(format!("{label}: invalid date '{text}' (YYYY-MM-DD): {e}")))?;
            }
            LeaseField::RemainingLife => {
                lease.remaining_life_years = parse_bounded(label, text, LEASE_REMAINING_LIFE_RANGE)?
            }
            LeaseField::Renewable => {
                lease.renewable = match text.to_ascii_lowercase().as_str() {
                    "y" | "yes" | "true" => true,
                    "n" | "no" | "false" => false,
                    _ => return Err(AppError::input(format!("{label}: expected yes or no, got '{text}'"))),
                };
            }
            LeaseField::NewLeaseLife => {
                lease.avg_new_lease_life_years = parse_bounded(label, text, LEASE_NEW_LIFE_RANGE)?
            }
            LeaseField::LiabilityShare => lease.liability_share = parse_bounded(label, text, (0.0, 1.0))?,
            LeaseField::BorrowingRate => lease.borrowing_rate = parse_bounded(label, text, (0.0, 1.0))?,
        }
        Ok(())
    }
}

impl FormField {
    /// Fields that do not depend on the lease list.
    pub const SCALARS: [FormField; 11] = [
        FormField::Capex,
        FormField::ExistingPpeLife,
        FormField::NewPpeLife,
        FormField::GaPersonnel,
        FormField::GaNonPersonnel,
        FormField::RdPersonnel,
        FormField::RdNonPersonnel,
        FormField::GlobalSaasCogs,
        FormField::InterestIncome,
        FormField::LineItem,
        FormField::LeaseCount,
    ];

    /// Every row of the form for `params`, in display order.
    pub fn all(params: &ModelParams) -> Vec<FormField> {
        let mut out = Self::SCALARS.to_vec();
        for i in 0..params.existing_leases.len() {
            out.extend(LeaseField::ALL.iter().map(|f| FormField::Lease(i, *f)));
        }
        out
    }

    pub fn label(self) -> String {
        let s = match self {
            FormField::Capex => "Capex",
            FormField::ExistingPpeLife => "Existing PP&E life",
            FormField::NewPpeLife => "New PP&E life",
            FormField::GaPersonnel => "G&A personnel",
            FormField::GaNonPersonnel => "G&A non-personnel",
            FormField::RdPersonnel => "R&D personnel",
            FormField::RdNonPersonnel => "R&D non-personnel",
            FormField::GlobalSaasCogs => "Global SaaS COGS",
            FormField::InterestIncome => "Interest income",
            FormField::LineItem => "Line item",
            FormField::LeaseCount => "Leases",
            FormField::Lease(i, f) => return format!("Lease {} {}", i + 1, f.label()),
        };
        s.to_string()
    }

    /// Value as shown in the form list.
    pub fn display(self, params: &ModelParams) -> String {
        match self {
            FormField::Capex => format_currency(params.capex),
            FormField::ExistingPpeLife => format!("{} yrs", params.existing_ppe_life),
            FormField::NewPpeLife => format!("{} yrs", params.new_ppe_life),
            FormField::GaPersonnel => rates_summary(&params.ga_personnel_rates.0),
            FormField::GaNonPersonnel => rates_summary(&params.ga_non_personnel_rates.0),
            FormField::RdPersonnel => rates_summary(&params.rd_personnel_rates.0),
            FormField::RdNonPersonnel => rates_summary(&params.rd_non_personnel_rates.0),
            FormField::GlobalSaasCogs => format_rate(params.global_saas_cogs),
            FormField::InterestIncome => format_rate(params.interest_income),
            FormField::LineItem => params.line_item.label().to_string(),
            FormField::LeaseCount => params.existing_leases.len().to_string(),
            FormField::Lease(i, f) => params
                .existing_leases
                .get(i)
                .map(|lease| f.display(lease))
                .unwrap_or_else(|| "-".to_string()),
        }
    }

    /// Value pre-filled into the text editor.
    pub fn raw(self, params: &ModelParams) -> String {
        match self {
            FormField::Capex => format!("{}", params.capex),
            FormField::ExistingPpeLife => params.existing_ppe_life.to_string(),
            FormField::NewPpeLife => params.new_ppe_life.to_string(),
            FormField::GaPersonnel => params.ga_personnel_rates.to_string(),
            FormField::GaNonPersonnel => params.ga_non_personnel_rates.to_string(),
            FormField::RdPersonnel => params.rd_personnel_rates.to_string(),
            FormField::RdNonPersonnel => params.rd_non_personnel_rates.to_string(),
            FormField::GlobalSaasCogs => format!("{}", params.global_saas_cogs),
            FormField::InterestIncome => format!("{}", params.interest_income),
            FormField::LineItem => params.line_item.to_string(),
            FormField::LeaseCount => params.existing_leases.len().to_string(),
            FormField::Lease(i, f) => params.existing_leases.get(i).map(|lease| f.raw(lease)).unwrap_or_default(),
        }
    }

    /// Step the field by `delta` notches (arrow keys).
    ///
    /// Rate schedules shift every year together; values stay inside the
    /// ranges validation accepts.
    pub fn adjust(self, params: &mut ModelParams, delta: i32) {
        let d = f64::from(delta);
        match self {
            FormField::Capex => params.capex = (params.capex + d * CAPEX_STEP).max(0.0),
            FormField::ExistingPpeLife => params.existing_ppe_life = step_life(params.existing_ppe_life, delta),
            FormField::NewPpeLife => params.new_ppe_life = step_life(params.new_ppe_life, delta),
            FormField::GaPersonnel => params.ga_personnel_rates = params.ga_personnel_rates.shifted(d * RATE_STEP),
            FormField::GaNonPersonnel => {
                params.ga_non_personnel_rates = params.ga_non_personnel_rates.shifted(d * RATE_STEP)
            }
            FormField::RdPersonnel => params.rd_personnel_rates = params.rd_personnel_rates.shifted(d * RATE_STEP),
            FormField::RdNonPersonnel => {
                params.rd_non_personnel_rates = params.rd_non_personnel_rates.shifted(d * RATE_STEP)
            }
            FormField::GlobalSaasCogs => {
                params.global_saas_cogs = (params.global_saas_cogs + d * COGS_STEP).clamp(0.0, 1.0)
            }
            FormField::InterestIncome => {
                params.interest_income = (params.interest_income + d * INTEREST_STEP).clamp(0.0, 1.0)
            }
            FormField::LineItem => {
                params.line_item = if delta >= 0 {
                    params.line_item.next_known()
                } else {
                    params.line_item.prev_known()
                };
            }
            FormField::LeaseCount => {
                let target = i64::try_from(params.existing_leases.len()).unwrap_or(i64::MAX) + i64::from(delta);
                resize_leases(params, target.clamp(1, MAX_LEASES as i64) as usize);
            }
            FormField::Lease(i, f) => {
                if let Some(lease) = params.existing_leases.get_mut(i) {
                    f.adjust(lease, delta);
                }
            }
        }
    }

    /// Parse typed text into the field. `params` is untouched on error.
    pub fn apply_text(self, params: &mut ModelParams, text: &str) -> Result<(), AppError> {
        let text = text.trim();
        match self {
            FormField::Capex => params.capex = parse_number(self, text)?,
            FormField::ExistingPpeLife => params.existing_ppe_life = parse_life(self, text)?,
            FormField::NewPpeLife => params.new_ppe_life = parse_life(self, text)?,
            FormField::GaPersonnel => params.ga_personnel_rates = parse_rates(text)?,
            FormField::GaNonPersonnel => params.ga_non_personnel_rates = parse_rates(text)?,
            FormField::RdPersonnel => params.rd_personnel_rates = parse_rates(text)?,
            FormField::RdNonPersonnel => params.rd_non_personnel_rates = parse_rates(text)?,
            FormField::GlobalSaasCogs => params.global_saas_cogs = parse_number(self, text)?,
            FormField::InterestIncome => params.interest_income = parse_number(self, text)?,
            FormField::LineItem => params.line_item = LineItem::parse(text).map_err(AppError::input)?,
            FormField::LeaseCount => {
                let count = text
                    .parse::<usize>()
                    .ok()
                    .filter(|n| (1..=MAX_LEASES).contains(n))
                    .ok_or_else(|| AppError::input(format!("Leases: expected 1 to {MAX_LEASES}, got '{text}'")))?;
                resize_leases(params, count);
            }
            FormField::Lease(i, f) => {
                let label = self.label();
                let lease = params
                    .existing_leases
                    .get_mut(i)
                    .ok_or_else(|| AppError::input(format!("{label}: no such lease")))?;
                f.apply_text(lease, &label, text)?;
            }
        }
        Ok(())
    }
}

/// Grow with copies of the default template (renamed) or drop from the end.
fn resize_leases(params: &mut ModelParams, count: usize) {
    let template = Lease::default_leases().into_iter().next();
    while params.existing_leases.len() < count {
        let n = params.existing_leases.len() + 1;
        let Some(mut lease) = template.clone() else {
            return;
        };
        lease.name = format!("Lease {n}");
        params.existing_leases.push(lease);
    }
    params.existing_leases.truncate(count);
}

fn rates_summary(rates: &[f64; 5]) -> String {
    format!("{} .. {}", format_rate(rates[0]), format_rate(rates[4]))
}

fn step_life(life: u32, delta: i32) -> u32 {
    let next = i64::from(life) + i64::from(delta);
    next.clamp(i64::from(PPE_LIFE_RANGE.0), i64::from(PPE_LIFE_RANGE.1)) as u32
}

fn clamp_range(v: f64, (min, max): (f64, f64)) -> f64 {
    v.clamp(min, max)
}

fn parse_number(field: FormField, text: &str) -> Result<f64, AppError> {
    let cleaned: String = text.chars().filter(|c| *c != '$' && *c != ',').collect();
    cleaned
        .parse::<f64>()
        .map_err(|e| AppError::input(format!("{}: invalid number '{text}': {e}", field.label())))
}

fn parse_life(field: FormField, text: &str) -> Result<u32, AppError> {
    text.parse::<u32>()
        .map_err(|e| AppError::input(format!("{}: invalid years '{text}': {e}", field.label())))
}

fn parse_bounded(label: &str, text: &str, (min, max): (f64, f64)) -> Result<f64, AppError> {
    let v = text
        .parse::<f64>()
        .map_err(|e| AppError::input(format!("{label}: invalid number '{text}': {e}")))?;
    if !(v.is_finite() && v >= min && v <= max) {
        return Err(AppError::input(format!("{label}: must be between {min} and {max} (got {v})")));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LINE_ITEM_CATALOG, YearRates, validate_params};

    #[test]
    fn arrows_step_and_clamp() {
        let mut p = ModelParams::default();
        FormField::Capex.adjust(&mut p, 1);
        assert_eq!(p.capex, 8500.0);

        p.capex = 200.0;
        FormField::Capex.adjust(&mut p, -1);
        assert_eq!(p.capex, 0.0);

        p.new_ppe_life = 1;
        FormField::NewPpeLife.adjust(&mut p, -1);
        assert_eq!(p.new_ppe_life, 1);

        p.global_saas_cogs = 0.995;
        FormField::GlobalSaasCogs.adjust(&mut p, 1);
        assert_eq!(p.global_saas_cogs, 1.0);
    }

    #[test]
    fn line_item_cycles_through_catalog() {
        let mut p = ModelParams::default();
        FormField::LineItem.adjust(&mut p, 1);
        assert_eq!(p.line_item.to_string(), LINE_ITEM_CATALOG[1]);
        FormField::LineItem.adjust(&mut p, -1);
        FormField::LineItem.adjust(&mut p, -1);
        assert_eq!(p.line_item.to_string(), LINE_ITEM_CATALOG[LINE_ITEM_CATALOG.len() - 1]);
    }

    #[test]
    fn typed_values_are_parsed() {
        let mut p = ModelParams::default();
        FormField::Capex.apply_text(&mut p, " $12,500 ").unwrap();
        assert_eq!(p.capex, 12500.0);

        FormField::RdPersonnel.apply_text(&mut p, "0.5,0.5,0.5,0.5,0.5").unwrap();
        assert_eq!(p.rd_personnel_rates, YearRates::flat(0.5));

        FormField::LineItem
            .apply_text(&mut p, "Balance Sheet:Total Assets:Total Assets")
            .unwrap();
        assert_eq!(p.line_item.label(), "Total Assets");
    }

    #[test]
    fn bad_text_leaves_params_alone() {
        let mut p = ModelParams::default();
        let err = FormField::ExistingPpeLife.apply_text(&mut p, "ten").unwrap_err();
        assert!(err.is_input());
        assert!(err.to_string().starts_with("Existing PP&E life"));
        assert_eq!(p, ModelParams::default());

        assert!(FormField::GaPersonnel.apply_text(&mut p, "0.1,0.2").is_err());
        assert_eq!(p.ga_personnel_rates, ModelParams::default().ga_personnel_rates);
    }

    #[test]
    fn display_and_raw() {
        let p = ModelParams::default();
        assert_eq!(FormField::Capex.display(&p), "$8,000");
        assert_eq!(FormField::GaPersonnel.display(&p), "3.56% .. 2.84%");
        assert_eq!(FormField::NewPpeLife.raw(&p), "15");
        assert_eq!(FormField::LineItem.display(&p), "GAAP Net Income");
        assert_eq!(FormField::LeaseCount.display(&p), "2");
        assert_eq!(FormField::Lease(0, LeaseField::ExpiryDate).display(&p), "2027-10-31");
        assert_eq!(FormField::Lease(1, LeaseField::Renewable).display(&p), "No");
        assert_eq!(FormField::Lease(5, LeaseField::Name).display(&p), "-");
    }

    #[test]
    fn field_list_follows_lease_count() {
        let mut p = ModelParams::default();
        assert_eq!(FormField::all(&p).len(), FormField::SCALARS.len() + 2 * LeaseField::ALL.len());
        assert_eq!(FormField::Lease(1, LeaseField::Name).label(), "Lease 2 name");

        p.existing_leases.clear();
        assert_eq!(FormField::all(&p), FormField::SCALARS.to_vec());
    }

    #[test]
    fn lease_count_grows_and_shrinks_within_bounds() {
        let mut p = ModelParams::default();
        FormField::LeaseCount.apply_text(&mut p, "4").unwrap();
        assert_eq!(p.existing_leases.len(), 4);
        assert_eq!(p.existing_leases[0].name, "HQ Main");
        assert_eq!(p.existing_leases[3].name, "Lease 4");
        assert!(validate_params(&p).is_ok());

        FormField::LeaseCount.adjust(&mut p, -1);
        assert_eq!(p.existing_leases.len(), 3);

        for bad in ["0", "11", "two"] {
            let err = FormField::LeaseCount.apply_text(&mut p, bad).unwrap_err();
            assert!(err.is_input());
        }
        assert_eq!(p.existing_leases.len(), 3);

        p.existing_leases.truncate(1);
        FormField::LeaseCount.adjust(&mut p, -1);
        assert_eq!(p.existing_leases.len(), 1);
        FormField::LeaseCount.apply_text(&mut p, "10").unwrap();
        FormField::LeaseCount.adjust(&mut p, 1);
        assert_eq!(p.existing_leases.len(), MAX_LEASES);
    }

    #[test]
    fn lease_fields_parse_typed_values() {
        let mut p = ModelParams::default();
        let field = |f| FormField::Lease(1, f);

        field(LeaseField::Name).apply_text(&mut p, " Warehouse ").unwrap();
        field(LeaseField::ExpiryDate).apply_text(&mut p, "2030-01-15").unwrap();
        field(LeaseField::RemainingLife).apply_text(&mut p, "12.5").unwrap();
        field(LeaseField::Renewable).apply_text(&mut p, "YES").unwrap();
        field(LeaseField::NewLeaseLife).apply_text(&mut p, "20").unwrap();
        field(LeaseField::LiabilityShare).apply_text(&mut p, "0.25").unwrap();
        field(LeaseField::BorrowingRate).apply_text(&mut p, "0.07").unwrap();

        let lease = &p.existing_leases[1];
        assert_eq!(lease.name, "Warehouse");
        assert_eq!(lease.expiry_date, NaiveDate::from_ymd_opt(2030, 1, 15).unwrap());
        assert_eq!(lease.remaining_life_years, 12.5);
        assert!(lease.renewable);
        assert_eq!(lease.avg_new_lease_life_years, 20.0);
        assert_eq!(lease.liability_share, 0.25);
        assert_eq!(lease.borrowing_rate, 0.07);
        assert_eq!(p.existing_leases[0], ModelParams::default().existing_leases[0]);
    }

    #[test]
    fn lease_fields_reject_out_of_range_values() {
        let mut p = ModelParams::default();
        let before = p.clone();
        let cases = [
            (LeaseField::Name, "   "),
            (LeaseField::ExpiryDate, "31/10/2027"),
            (LeaseField::ExpiryDate, "2027-02-30"),
            (LeaseField::RemainingLife, "0.05"),
            (LeaseField::RemainingLife, "51"),
            (LeaseField::Renewable, "maybe"),
            (LeaseField::NewLeaseLife, "0.5"),
            (LeaseField::NewLeaseLife, "21"),
            (LeaseField::LiabilityShare, "1.5"),
            (LeaseField::BorrowingRate, "-0.01"),
        ];
        for (f, text) in cases {
            let err = FormField::Lease(0, f).apply_text(&mut p, text).unwrap_err();
            assert!(err.is_input(), "{f:?} {text}");
            assert!(err.to_string().starts_with("Lease 1 "), "{err}");
        }
        assert_eq!(p, before);

        let err = FormField::Lease(7, LeaseField::Name).apply_text(&mut p, "x").unwrap_err();
        assert!(err.to_string().contains("no such lease"));
    }

    #[test]
    fn lease_arrows_stay_in_range() {
        let mut p = ModelParams::default();
        FormField::Lease(0, LeaseField::ExpiryDate).adjust(&mut p, 1);
        assert_eq!(p.existing_leases[0].expiry_date, NaiveDate::from_ymd_opt(2027, 11, 30).unwrap());

        FormField::Lease(0, LeaseField::Renewable).adjust(&mut p, 1);
        assert!(!p.existing_leases[0].renewable);

        p.existing_leases[1].avg_new_lease_life_years = 1.1;
        FormField::Lease(1, LeaseField::NewLeaseLife).adjust(&mut p, -1);
        assert_eq!(p.existing_leases[1].avg_new_lease_life_years, 1.0);

        p.existing_leases[1].liability_share = 0.995;
        FormField::Lease(1, LeaseField::LiabilityShare).adjust(&mut p, 1);
        assert_eq!(p.existing_leases[1].liability_share, 1.0);
        assert!(validate_params(&p).is_ok());
    }
}
