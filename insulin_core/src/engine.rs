//! Worksheet engine.
//!
//! Runs one patient through the calculators in order:
//! 1. TDD from the visit rule
//! 2. Regimen split of the rounded TDD
//! 3. Correction table against the risk-category target

use crate::correction::build_correction_table;
use crate::regimen::split_regimen;
use crate::tdd::compute_tdd;
use crate::{DoseResult, DoseWorksheet, PatientInput, Result};
use chrono::Utc;
use uuid::Uuid;

/// Compute the dose recommendation for a patient
///
/// Inputs are trusted; run them through `validate::validate_patient` first
/// when they come from a user.
pub fn compute_dose(input: &PatientInput) -> DoseResult {
    let calc = compute_tdd(
        input.weight_kg,
        input.dose_factor,
        input.visit_type,
        input.previous_tdd,
        input.adjustment_step,
    );

    let regimen_breakdown = split_regimen(input.regimen, calc.tdd, input.weight_kg);

    tracing::info!(
        "TDD {:.1} U for {:?} visit ({:?} regimen)",
        calc.tdd,
        input.visit_type,
        input.regimen
    );

    DoseResult {
        target_glucose: input.risk_category.target_glucose(),
        tdd: calc.tdd,
        adjustment_note: calc.note,
        regimen_breakdown,
    }
}

/// Build the full worksheet: dose recommendation plus correction table
///
/// Fails with `Error::InvalidPrecondition` if the TDD rounds to zero, since
/// no correction factor exists for it.
pub fn build_worksheet(input: PatientInput) -> Result<DoseWorksheet> {
    let dose = compute_dose(&input);
    let correction_table =
        build_correction_table(dose.tdd, dose.target_glucose, input.insulin_type)?;

    Ok(DoseWorksheet {
        id: Uuid::new_v4(),
        generated_at: Utc::now(),
        patient: input,
        dose,
        correction_table,
    })
}
