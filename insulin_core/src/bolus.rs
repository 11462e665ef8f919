//! Standalone bolus correction calculator.
//!
//! Answers "how much correction for this reading?" for a known TDD, and
//! prints its own reference table. That table is independent of the
//! worksheet's correction table: targets are fixed at 130 (usual) and
//! 140 (hypo concern) whatever the patient's risk category, and the open
//! `>330` bin bumps both columns (+5 usual, +4 hypo).

use crate::correction::{correction_factor, units_for_drop, GLUCOSE_BINS};
use crate::{
    BolusQuery, BolusReport, BolusResult, CorrectionRow, CorrectionTable, InsulinType, Result,
};

/// Fixed target for the usual column
pub const USUAL_TARGET: u32 = 130;
/// Fixed target for the hypo-concern column
pub const HYPO_TARGET: u32 = 140;

const OPEN_BIN_BUMP_USUAL: u32 = 5;
const OPEN_BIN_BUMP_HYPO: u32 = 4;

/// Correction units for a single pre-meal glucose reading
pub fn bolus_correction(
    tdd: f64,
    insulin_type: InsulinType,
    premeal_glucose: u32,
) -> Result<BolusResult> {
    let isf = correction_factor(tdd, insulin_type)?;

    let units_usual = if premeal_glucose <= USUAL_TARGET {
        0
    } else {
        units_for_drop(premeal_glucose - USUAL_TARGET, isf)
    };
    let units_hypo = if premeal_glucose <= HYPO_TARGET {
        0
    } else {
        units_for_drop(premeal_glucose - HYPO_TARGET, isf)
    };

    Ok(BolusResult {
        units_usual,
        units_hypo,
        isf,
    })
}

/// Reference table over the standard bins with fixed 130/140 targets
pub fn bolus_reference_table(tdd: f64, insulin_type: InsulinType) -> Result<CorrectionTable> {
    let isf = correction_factor(tdd, insulin_type)?;

    let rows = GLUCOSE_BINS
        .iter()
        .map(|range| {
            let low = range.low();
            let mut units_usual = units_for_drop(low.saturating_sub(USUAL_TARGET), isf);
            let mut units_hypo = units_for_drop(low.saturating_sub(HYPO_TARGET), isf);
            if range.is_open() {
                units_usual = units_usual.saturating_add(OPEN_BIN_BUMP_USUAL);
                units_hypo = units_hypo.saturating_add(OPEN_BIN_BUMP_HYPO);
            }
            CorrectionRow {
                glucose_range: *range,
                units_usual,
                units_hypo,
            }
        })
        .collect();

    Ok(CorrectionTable {
        rows,
        correction_factor: isf,
    })
}

/// Answer a bolus query together with its reference table
pub fn run_bolus_query(query: &BolusQuery) -> Result<BolusReport> {
    let result = bolus_correction(query.tdd, query.insulin_type, query.premeal_glucose)?;
    let reference_table = bolus_reference_table(query.tdd, query.insulin_type)?;

    tracing::info!(
        "Bolus correction at {} mg/dL: {} U usual, {} U hypo (isf {:.1})",
        query.premeal_glucose,
        result.units_usual,
        result.units_hypo,
        result.isf
    );

    Ok(BolusReport {
        query: query.clone(),
        result,
        reference_table,
    })
}
