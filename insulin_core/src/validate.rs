//! Range checks for user-supplied input.
//!
//! The calculators trust their arguments. Anything coming from a person
//! (CLI flags, a JSON file) passes through here first.

use crate::{BolusQuery, Error, PatientInput, Result, DOSE_FACTORS};

pub const WEIGHT_RANGE_KG: (f64, f64) = (20.0, 300.0);
pub const BOLUS_TDD_RANGE: (f64, f64) = (5.0, 300.0);
pub const PREVIOUS_TDD_MAX: f64 = 300.0;
pub const GLUCOSE_RANGE: (u32, u32) = (60, 600);

const FACTOR_TOLERANCE: f64 = 1e-9;

fn in_range(value: f64, (lo, hi): (f64, f64)) -> bool {
    value >= lo && value <= hi
}

fn finish(problems: Vec<String>) -> Result<()> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(problems.join("; ")))
    }
}

/// Check a worksheet input against the documented clinical ranges
///
/// Every offending field is reported, not only the first.
pub fn validate_patient(input: &PatientInput) -> Result<()> {
    let mut problems = Vec::new();

    if !in_range(input.weight_kg, WEIGHT_RANGE_KG) {
        problems.push(format!(
            "weight must be between {} and {} kg, got {}",
            WEIGHT_RANGE_KG.0, WEIGHT_RANGE_KG.1, input.weight_kg
        ));
    }

    if !DOSE_FACTORS
        .iter()
        .any(|f| (f - input.dose_factor).abs() < FACTOR_TOLERANCE)
    {
        problems.push(format!(
            "dose factor must be one of 0.1, 0.2, 0.3, 0.4, 0.5, 0.6 U/kg, got {}",
            input.dose_factor
        ));
    }

    match input.previous_tdd {
        Some(prev) if prev.is_nan() || prev < 0.0 => {
            problems.push(format!("previous TDD cannot be negative, got {}", prev));
        }
        Some(prev) if prev > PREVIOUS_TDD_MAX => {
            problems.push(format!(
                "previous TDD must be at most {} U, got {}",
                PREVIOUS_TDD_MAX, prev
            ));
        }
        None if input.visit_type.uses_previous_tdd() => {
            problems.push(format!(
                "previous TDD is required for a {} visit",
                input.visit_type.label().to_lowercase()
            ));
        }
        _ => {}
    }

    if let Err(e) = finish(problems) {
        tracing::warn!("Rejected patient input: {}", e);
        return Err(e);
    }
    Ok(())
}

/// Check a bolus query against the documented ranges
pub fn validate_bolus(query: &BolusQuery) -> Result<()> {
    let mut problems = Vec::new();

    if !in_range(query.tdd, BOLUS_TDD_RANGE) {
        problems.push(format!(
            "TDD must be between {} and {} U, got {}",
            BOLUS_TDD_RANGE.0, BOLUS_TDD_RANGE.1, query.tdd
        ));
    }

    if query.premeal_glucose < GLUCOSE_RANGE.0 || query.premeal_glucose > GLUCOSE_RANGE.1 {
        problems.push(format!(
            "pre-meal glucose must be between {} and {} mg/dL, got {}",
            GLUCOSE_RANGE.0, GLUCOSE_RANGE.1, query.premeal_glucose
        ));
    }

    finish(problems)
}
