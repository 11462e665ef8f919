//! Per-regimen split of the daily dose.
//!
//! Premix and basal-bolus regimens divide the TDD. Basal and basal-plus
//! are dosed from body weight instead and never read the TDD.

use crate::rounding::round_half_unit;
use crate::{DoseAmount, DoseComponent, Regimen, RegimenBreakdown};

fn units(name: &str, value: f64) -> DoseComponent {
    DoseComponent {
        name: name.to_string(),
        amount: DoseAmount::Units(round_half_unit(value)),
        counts_toward_total: true,
    }
}

fn basal_range(weight_kg: f64) -> DoseComponent {
    DoseComponent {
        name: "basal".to_string(),
        amount: DoseAmount::Range {
            low: round_half_unit(0.1 * weight_kg),
            high: round_half_unit(0.2 * weight_kg),
        },
        counts_toward_total: true,
    }
}

/// Split a rounded TDD into the components of `regimen`
pub fn split_regimen(regimen: Regimen, tdd: f64, weight_kg: f64) -> RegimenBreakdown {
    let components = match regimen {
        Regimen::Basal => vec![basal_range(weight_kg)],
        Regimen::BasalPlus => vec![
            basal_range(weight_kg),
            units("prandial", 0.1 * weight_kg),
        ],
        Regimen::PremixBid => vec![
            units("breakfast", tdd * 2.0 / 3.0),
            units("supper", tdd / 3.0),
        ],
        Regimen::PremixTid => vec![
            units("breakfast", tdd * 0.40),
            units("lunch", tdd * 0.30),
            units("dinner", tdd * 0.30),
        ],
        Regimen::BasalBolus => {
            let bolus_total = tdd * 0.50;
            vec![
                units("basal", tdd * 0.50),
                units("bolus_total", bolus_total),
                DoseComponent {
                    counts_toward_total: false,
                    ..units("bolus_per_meal", bolus_total / 3.0)
                },
            ]
        }
    };

    tracing::debug!(
        "Split {:?} (tdd {:.1} U, weight {:.1} kg) into {} components",
        regimen,
        tdd,
        weight_kg,
        components.len()
    );

    RegimenBreakdown {
        regimen,
        components,
    }
}
