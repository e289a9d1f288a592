//! Parameter validation.
//!
//! All checks run and every violation is reported at once, so a form can show
//! the whole list instead of one problem per round trip.

use crate::domain::{ModelParams, YEAR_LABELS, YearRates};
use crate::error::AppError;

pub const MAX_LEASES: usize = 10;
pub const PPE_LIFE_RANGE: (u32, u32) = (1, 50);
pub const LEASE_REMAINING_LIFE_RANGE: (f64, f64) = (0.1, 50.0);
pub const LEASE_NEW_LIFE_RANGE: (f64, f64) = (1.0, 20.0);

/// Validate a full parameter set.
pub fn validate_params(params: &ModelParams) -> Result<(), AppError> {
    let mut issues = Vec::new();

    if !(params.capex.is_finite() && params.capex >= 0.0) {
        issues.push(format!("capex must be a non-negative number (got {})", params.capex));
    }

    for (name, life) in [
        ("existingPpeLife", params.existing_ppe_life),
        ("newPpeLife", params.new_ppe_life),
    ] {
        if !(PPE_LIFE_RANGE.0..=PPE_LIFE_RANGE.1).contains(&life) {
            issues.push(format!(
                "{name} must be between {} and {} years (got {life})",
                PPE_LIFE_RANGE.0, PPE_LIFE_RANGE.1
            ));
        }
    }

    check_schedule(&mut issues, "gaPersonnelRates", &params.ga_personnel_rates);
    check_schedule(&mut issues, "gaNonPersonnelRates", &params.ga_non_personnel_rates);
    check_schedule(&mut issues, "rdPersonnelRates", &params.rd_personnel_rates);
    check_schedule(&mut issues, "rdNonPersonnelRates", &params.rd_non_personnel_rates);
    for (i, rates) in params.grr_rates.iter().enumerate() {
        check_schedule(&mut issues, &format!("grrRates[{i}]"), rates);
    }
    for (i, rates) in params.debt_borrowing_costs.iter().enumerate() {
        check_schedule(&mut issues, &format!("debtBorrowingCosts[{i}]"), rates);
    }

    check_unit(&mut issues, "globalSaasCogs", params.global_saas_cogs);
    check_unit(&mut issues, "interestIncome", params.interest_income);

    if params.existing_leases.len() > MAX_LEASES {
        issues.push(format!(
            "at most {MAX_LEASES} leases are supported (got {})",
            params.existing_leases.len()
        ));
    }
    for (i, lease) in params.existing_leases.iter().enumerate() {
        let prefix = format!("existingLeases[{i}]");
        if lease.name.trim().is_empty() {
            issues.push(format!("{prefix}.name must not be empty"));
        }
        check_range(
            &mut issues,
            &format!("{prefix}.remainingLifeYears"),
            lease.remaining_life_years,
            LEASE_REMAINING_LIFE_RANGE,
        );
        check_range(
            &mut issues,
            &format!("{prefix}.avgNewLeaseLifeYears"),
            lease.avg_new_lease_life_years,
            LEASE_NEW_LIFE_RANGE,
        );
        check_unit(&mut issues, &format!("{prefix}.liabilityShare"), lease.liability_share);
        check_unit(&mut issues, &format!("{prefix}.borrowingRate"), lease.borrowing_rate);
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::input(format!("Invalid parameters: {}.", issues.join("; "))))
    }
}

/// Parse a comma-separated list of five rates (`0.03, 0.028, ...`).
pub fn parse_rates(raw: &str) -> Result<YearRates, AppError> {
    let values = raw
        .split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f64>()
                .map_err(|e| AppError::input(format!("Invalid rate '{part}': {e}")))
        })
        .collect::<Result<Vec<f64>, AppError>>()?;

    let rates: [f64; 5] = values.as_slice().try_into().map_err(|_| {
        AppError::input(format!(
            "Expected {} yearly rates, got {}.",
            YEAR_LABELS.len(),
            values.len()
        ))
    })?;
    Ok(YearRates::new(rates))
}

fn check_schedule(issues: &mut Vec<String>, name: &str, rates: &YearRates) {
    for (label, rate) in rates.labelled() {
        check_unit(issues, &format!("{name}.{label}"), rate);
    }
}

fn check_unit(issues: &mut Vec<String>, name: &str, value: f64) {
    check_range(issues, name, value, (0.0, 1.0));
}

fn check_range(issues: &mut Vec<String>, name: &str, value: f64, (min, max): (f64, f64)) {
    if !(value.is_finite() && value >= min && value <= max) {
        issues.push(format!("{name} must be between {min} and {max} (got {value})"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Lease;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_params(&ModelParams::default()).is_ok());
    }

    #[test]
    fn reports_every_violation() {
        let mut params = ModelParams::default();
        params.capex = -1.0;
        params.new_ppe_life = 0;
        params.global_saas_cogs = 1.5;
        params.rd_personnel_rates = YearRates::new([0.1, 0.1, -0.2, 0.1, 0.1]);

        let err = validate_params(&params).unwrap_err();
        let msg = err.to_string();
        assert_eq!(err.exit_code(), 2);
        assert!(msg.contains("capex"));
        assert!(msg.contains("newPpeLife"));
        assert!(msg.contains("globalSaasCogs"));
        assert!(msg.contains("rdPersonnelRates.Y3"));
        assert!(!msg.contains("existingPpeLife"));
    }

    #[test]
    fn lease_bounds_are_checked() {
        let mut params = ModelParams::default();
        params.existing_leases = vec![Lease {
            name: " ".to_string(),
            remaining_life_years: 0.05,
            avg_new_lease_life_years: 25.0,
            ..Lease::default_leases()[0].clone()
        }];
        let msg = validate_params(&params).unwrap_err().to_string();
        assert!(msg.contains("existingLeases[0].name"));
        assert!(msg.contains("existingLeases[0].remainingLifeYears"));
        assert!(msg.contains("existingLeases[0].avgNewLeaseLifeYears"));
    }

    #[test]
    fn too_many_leases() {
        let mut params = ModelParams::default();
        params.existing_leases = vec![Lease::default_leases()[0].clone(); MAX_LEASES + 1];
        assert!(validate_params(&params).is_err());
    }

    #[test]
    fn nan_capex_is_rejected() {
        let mut params = ModelParams::default();
        params.capex = f64::NAN;
        assert!(validate_params(&params).is_err());
    }

    #[test]
    fn parse_rates_requires_five_values() {
        let rates = parse_rates("0.03, 0.028,0.026 ,0.024,0.022").unwrap();
        assert_eq!(rates.0, [0.03, 0.028, 0.026, 0.024, 0.022]);
        assert!(parse_rates("0.1,0.2").is_err());
        assert!(parse_rates("0.1,0.2,x,0.1,0.1").is_err());
    }
}
