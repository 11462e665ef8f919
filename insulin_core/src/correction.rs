//! Correction-dose table for the worksheet.
//!
//! The correction factor comes from the 1500 rule (regular insulin) or the
//! 1800 rule (rapid-acting). Each pre-meal glucose bin is dosed from its
//! lower bound against the patient's risk-category target. The open-ended
//! top bin carries a fixed safety bump.

use crate::{CorrectionRow, CorrectionTable, Error, GlucoseRange, InsulinType, Result};

/// Fixed pre-meal glucose bins, in display order
pub const GLUCOSE_BINS: [GlucoseRange; 6] = [
    GlucoseRange::Closed { low: 131, high: 170 },
    GlucoseRange::Closed { low: 171, high: 210 },
    GlucoseRange::Closed { low: 211, high: 250 },
    GlucoseRange::Closed { low: 251, high: 290 },
    GlucoseRange::Closed { low: 291, high: 330 },
    GlucoseRange::Above { threshold: 330 },
];

/// Units added to the usual-target dose in the open `>330` bin
pub const OPEN_BIN_BUMP: u32 = 5;

/// Correction factor (mg/dL per unit) for a TDD
///
/// Returns `Error::InvalidPrecondition` for a non-positive or non-finite
/// TDD instead of dividing by it.
pub fn correction_factor(tdd: f64, insulin_type: InsulinType) -> Result<f64> {
    if !tdd.is_finite() || tdd <= 0.0 {
        return Err(Error::InvalidPrecondition(format!(
            "TDD must be positive and finite to derive a correction factor, got {}",
            tdd
        )));
    }
    Ok(insulin_type.rule_constant() / tdd)
}

/// Units needed to bring glucose down by `delta` mg/dL, rounded up
pub(crate) fn units_for_drop(delta: u32, factor: f64) -> u32 {
    (f64::from(delta) / factor).ceil() as u32
}

/// Build the correction table for a patient
///
/// `target` is the patient's pre-meal target (130 usual, 140 hypo concern).
/// Every closed bin doses at least one unit on the usual column; the hypo
/// column is always one unit less, floored at zero.
pub fn build_correction_table(
    tdd: f64,
    target: u32,
    insulin_type: InsulinType,
) -> Result<CorrectionTable> {
    let cf = correction_factor(tdd, insulin_type)?;

    let rows = GLUCOSE_BINS
        .iter()
        .map(|range| {
            let delta = range.low().saturating_sub(target);
            let mut units_usual = units_for_drop(delta, cf).max(1);
            if range.is_open() {
                units_usual = units_usual.saturating_add(OPEN_BIN_BUMP);
            }
            CorrectionRow {
                glucose_range: *range,
                units_usual,
                units_hypo: units_usual.saturating_sub(1),
            }
        })
        .collect();

    tracing::debug!(
        "Built correction table: tdd {:.1} U, target {} mg/dL, cf {:.1}",
        tdd,
        target,
        cf
    );

    Ok(CorrectionTable {
        rows,
        correction_factor: cf,
    })
}
