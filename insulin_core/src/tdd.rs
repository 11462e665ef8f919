//! Total daily dose (TDD) calculation.
//!
//! Rules by visit type:
//! - Initial: weight x dose factor
//! - Repeat: previous TDD carried forward
//! - Inadequate control: base TDD escalated by the adjustment step
//! - Hypoglycaemia: base TDD reduced by the adjustment step
//!
//! Any visit that needs a previous TDD falls back to the weight-based
//! estimate when none was recorded.

use crate::rounding::round_half_unit;
use crate::{AdjustmentStep, VisitType};
use serde::{Deserialize, Serialize};

/// Rounded TDD and a note naming the rule that produced it
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TddCalculation {
    pub tdd: f64,
    pub note: String,
}

/// Starting point for repeat, escalation and reduction visits
enum BaseDose {
    Previous(f64),
    WeightBased(f64),
}

impl BaseDose {
    fn resolve(weight_kg: f64, dose_factor: f64, previous_tdd: Option<f64>) -> Self {
        // A zero previous TDD counts as not recorded
        match previous_tdd {
            Some(prev) if prev > 0.0 => BaseDose::Previous(prev),
            _ => BaseDose::WeightBased(weight_kg * dose_factor),
        }
    }

    fn units(&self) -> f64 {
        match self {
            BaseDose::Previous(u) | BaseDose::WeightBased(u) => *u,
        }
    }

    fn describe(&self) -> String {
        match self {
            BaseDose::Previous(u) => format!("previous TDD {:.1} U", u),
            BaseDose::WeightBased(u) => format!("weight-based TDD {:.1} U", u),
        }
    }
}

/// Compute the total daily dose for a visit
///
/// The result is always rounded to the nearest half unit. `step` is only
/// read for inadequate-control and hypoglycaemia visits.
pub fn compute_tdd(
    weight_kg: f64,
    dose_factor: f64,
    visit_type: VisitType,
    previous_tdd: Option<f64>,
    step: AdjustmentStep,
) -> TddCalculation {
    let base = BaseDose::resolve(weight_kg, dose_factor, previous_tdd);

    let (raw, note) = match visit_type {
        VisitType::Initial => (
            weight_kg * dose_factor,
            format!(
                "Initial: {:.1} kg x {:.1} U/kg",
                weight_kg, dose_factor
            ),
        ),
        VisitType::RepeatWithPrevTdd => {
            let note = match base {
                BaseDose::Previous(_) => format!("Repeat: continued {}", base.describe()),
                BaseDose::WeightBased(_) => format!(
                    "Repeat: no previous TDD, {:.1} kg x {:.1} U/kg",
                    weight_kg, dose_factor
                ),
            };
            (base.units(), note)
        }
        VisitType::InadequateControl => (
            base.units() * (1.0 + step.fraction()),
            format!(
                "Inadequate control: {} increased by {}%",
                base.describe(),
                step.percent()
            ),
        ),
        VisitType::Hypoglycemia => (
            base.units() * (1.0 - step.fraction()),
            format!(
                "Hypoglycaemia: {} reduced by {}%",
                base.describe(),
                step.percent()
            ),
        ),
    };

    let tdd = round_half_unit(raw);
    tracing::debug!("TDD for {:?}: raw {:.3} -> {:.1} U", visit_type, raw, tdd);

    TddCalculation { tdd, note }
}
