//! Core domain types for the insulin dosing worksheet.
//!
//! This module defines the value records passed through the engine:
//! - Clinical choices (risk category, visit type, regimen, insulin type)
//! - Patient input and the resulting dose recommendation
//! - Correction tables and bolus queries

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Allowed weight-based dose factors, in U/kg
pub const DOSE_FACTORS: [f64; 6] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6];

/// Lowercase and unify separators so "Basal-Bolus", "basal_bolus" and
/// "BASAL BOLUS" all parse the same way.
fn normalize_key(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}

// ============================================================================
// Clinical Choices
// ============================================================================

/// Patient risk category; selects the pre-meal glucose target
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Usual,
    HypoConcern,
}

impl RiskCategory {
    /// Pre-meal glucose target in mg/dL
    pub fn target_glucose(self) -> u32 {
        match self {
            RiskCategory::Usual => 130,
            RiskCategory::HypoConcern => 140,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskCategory::Usual => "Usual",
            RiskCategory::HypoConcern => "Hypoglycaemia concern",
        }
    }
}

impl FromStr for RiskCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_key(s).as_str() {
            "usual" => Ok(RiskCategory::Usual),
            "hypo_concern" | "hypo" => Ok(RiskCategory::HypoConcern),
            _ => Err(Error::Validation(format!("unknown risk category: {}", s))),
        }
    }
}

/// Why the patient is being seen; selects the TDD rule
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VisitType {
    Initial,
    RepeatWithPrevTdd,
    InadequateControl,
    Hypoglycemia,
}

impl VisitType {
    pub fn label(self) -> &'static str {
        match self {
            VisitType::Initial => "Initial",
            VisitType::RepeatWithPrevTdd => "Repeat with previous TDD",
            VisitType::InadequateControl => "Inadequate control",
            VisitType::Hypoglycemia => "Hypoglycaemia",
        }
    }

    /// Whether the TDD rule for this visit reads a previous TDD
    pub fn uses_previous_tdd(self) -> bool {
        !matches!(self, VisitType::Initial)
    }
}

impl FromStr for VisitType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_key(s).as_str() {
            "initial" => Ok(VisitType::Initial),
            "repeat" | "repeat_with_prev_tdd" => Ok(VisitType::RepeatWithPrevTdd),
            "inadequate" | "inadequate_control" => Ok(VisitType::InadequateControl),
            "hypo" | "hypoglycemia" | "hypoglycaemia" => Ok(VisitType::Hypoglycemia),
            _ => Err(Error::Validation(format!("unknown visit type: {}", s))),
        }
    }
}

/// Insulin regimen
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Regimen {
    Basal,
    BasalPlus,
    PremixBid,
    PremixTid,
    BasalBolus,
}

impl Regimen {
    pub fn label(self) -> &'static str {
        match self {
            Regimen::Basal => "Basal only",
            Regimen::BasalPlus => "Basal plus",
            Regimen::PremixBid => "Premix twice daily",
            Regimen::PremixTid => "Premix three times daily",
            Regimen::BasalBolus => "Basal-bolus",
        }
    }
}

impl FromStr for Regimen {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_key(s).as_str() {
            "basal" => Ok(Regimen::Basal),
            "basal_plus" => Ok(Regimen::BasalPlus),
            "premix_bid" | "bid" => Ok(Regimen::PremixBid),
            "premix_tid" | "tid" => Ok(Regimen::PremixTid),
            "basal_bolus" => Ok(Regimen::BasalBolus),
            _ => Err(Error::Validation(format!("unknown regimen: {}", s))),
        }
    }
}

/// Correction insulin type; selects the 1500 or 1800 rule
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum InsulinType {
    Regular,
    #[default]
    Rapid,
}

impl InsulinType {
    /// Numerator of the correction-factor rule (1500 regular, 1800 rapid)
    pub fn rule_constant(self) -> f64 {
        match self {
            InsulinType::Regular => 1500.0,
            InsulinType::Rapid => 1800.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InsulinType::Regular => "Regular (1500 rule)",
            InsulinType::Rapid => "Rapid-acting (1800 rule)",
        }
    }
}

impl FromStr for InsulinType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_key(s).as_str() {
            "regular" => Ok(InsulinType::Regular),
            "rapid" | "rapid_acting" => Ok(InsulinType::Rapid),
            _ => Err(Error::Validation(format!("unknown insulin type: {}", s))),
        }
    }
}

/// Percentage step used when escalating or reducing a TDD
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum AdjustmentStep {
    #[default]
    Ten,
    Fifteen,
    Twenty,
}

impl AdjustmentStep {
    pub fn percent(self) -> u8 {
        match self {
            AdjustmentStep::Ten => 10,
            AdjustmentStep::Fifteen => 15,
            AdjustmentStep::Twenty => 20,
        }
    }

    pub fn fraction(self) -> f64 {
        f64::from(self.percent()) / 100.0
    }
}

impl TryFrom<u8> for AdjustmentStep {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            10 => Ok(AdjustmentStep::Ten),
            15 => Ok(AdjustmentStep::Fifteen),
            20 => Ok(AdjustmentStep::Twenty),
            other => Err(Error::Validation(format!(
                "adjustment step must be 10, 15 or 20 percent, got {}",
                other
            ))),
        }
    }
}

impl From<AdjustmentStep> for u8 {
    fn from(step: AdjustmentStep) -> Self {
        step.percent()
    }
}

impl FromStr for AdjustmentStep {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_end_matches('%');
        let value: u8 = trimmed
            .parse()
            .map_err(|_| Error::Validation(format!("invalid adjustment step: {}", s)))?;
        AdjustmentStep::try_from(value)
    }
}

// ============================================================================
// Dose Calculation Types
// ============================================================================

/// Clinical inputs for one worksheet computation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PatientInput {
    pub name: Option<String>,
    pub weight_kg: f64,
    pub risk_category: RiskCategory,
    pub dose_factor: f64,
    pub visit_type: VisitType,
    pub previous_tdd: Option<f64>,
    pub regimen: Regimen,
    #[serde(default)]
    pub adjustment_step: AdjustmentStep,
    #[serde(default)]
    pub insulin_type: InsulinType,
}

/// Amount of insulin for one regimen component
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DoseAmount {
    Units(f64),
    Range { low: f64, high: f64 },
}

impl DoseAmount {
    /// Fixed unit value, if this is not a range
    pub fn units(&self) -> Option<f64> {
        match self {
            DoseAmount::Units(u) => Some(*u),
            DoseAmount::Range { .. } => None,
        }
    }
}

impl fmt::Display for DoseAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoseAmount::Units(u) => write!(f, "{:.1} U", u),
            DoseAmount::Range { low, high } => write!(f, "{:.1}-{:.1} U", low, high),
        }
    }
}

/// One named component of a regimen split (e.g. "breakfast")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DoseComponent {
    pub name: String,
    pub amount: DoseAmount,
    /// False for informational sub-divisions such as the per-meal bolus,
    /// which is already counted in `bolus_total`.
    pub counts_toward_total: bool,
}

/// Ordered per-regimen split of the daily dose
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RegimenBreakdown {
    pub regimen: Regimen,
    pub components: Vec<DoseComponent>,
}

impl RegimenBreakdown {
    /// Look up a component by name
    pub fn get(&self, name: &str) -> Option<&DoseAmount> {
        self.components
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.amount)
    }

    /// Sum of the fixed components that make up the daily dose.
    ///
    /// Returns None for weight-derived regimens whose basal dose is a range.
    pub fn daily_total(&self) -> Option<f64> {
        let mut total = 0.0;
        for component in self.components.iter().filter(|c| c.counts_toward_total) {
            total += component.amount.units()?;
        }
        Some(total)
    }
}

/// Dose recommendation for a patient
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DoseResult {
    pub target_glucose: u32,
    pub tdd: f64,
    pub adjustment_note: String,
    pub regimen_breakdown: RegimenBreakdown,
}

// ============================================================================
// Correction Types
// ============================================================================

/// Pre-meal glucose bin in mg/dL
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GlucoseRange {
    Closed { low: u32, high: u32 },
    /// Everything above `threshold`; dosed from `threshold + 1`
    Above { threshold: u32 },
}

impl GlucoseRange {
    /// Lowest glucose value in the bin, used as the dosing reference point
    pub fn low(&self) -> u32 {
        match self {
            GlucoseRange::Closed { low, .. } => *low,
            GlucoseRange::Above { threshold } => threshold + 1,
        }
    }

    pub fn high(&self) -> Option<u32> {
        match self {
            GlucoseRange::Closed { high, .. } => Some(*high),
            GlucoseRange::Above { .. } => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, GlucoseRange::Above { .. })
    }
}

impl fmt::Display for GlucoseRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlucoseRange::Closed { low, high } => write!(f, "{}-{}", low, high),
            GlucoseRange::Above { threshold } => write!(f, ">{}", threshold),
        }
    }
}

/// Correction dose for one glucose bin
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorrectionRow {
    pub glucose_range: GlucoseRange,
    pub units_usual: u32,
    pub units_hypo: u32,
}

/// Correction doses for all bins at one correction factor
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CorrectionTable {
    pub rows: Vec<CorrectionRow>,
    /// mg/dL drop per unit
    pub correction_factor: f64,
}

// ============================================================================
// Bolus Types
// ============================================================================

/// Standalone bolus correction query
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BolusQuery {
    pub tdd: f64,
    pub insulin_type: InsulinType,
    pub premeal_glucose: u32,
}

/// Bolus correction for one pre-meal reading
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BolusResult {
    pub units_usual: u32,
    pub units_hypo: u32,
    pub isf: f64,
}

/// Bolus result together with the fixed-target reference table
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BolusReport {
    pub query: BolusQuery,
    pub result: BolusResult,
    pub reference_table: CorrectionTable,
}

// ============================================================================
// Worksheet
// ============================================================================

/// Everything the report renderer needs for one patient
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DoseWorksheet {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub patient: PatientInput,
    pub dose: DoseResult,
    pub correction_table: CorrectionTable,
}
