#![forbid(unsafe_code)]

//! Core dose calculation engine for the SMART insulin worksheet.
//!
//! This crate provides:
//! - Domain types (patient input, regimens, correction tables)
//! - TDD calculation and regimen splitting
//! - Correction tables and standalone bolus correction
//! - Input validation, text reports and file export

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod rounding;
pub mod tdd;
pub mod regimen;
pub mod correction;
pub mod bolus;
pub mod engine;
pub mod validate;
pub mod report;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use rounding::{round_half_unit, round_unit};
pub use tdd::{compute_tdd, TddCalculation};
pub use regimen::split_regimen;
pub use correction::{build_correction_table, correction_factor};
pub use bolus::{bolus_correction, bolus_reference_table, run_bolus_query};
pub use engine::{build_worksheet, compute_dose};
pub use report::{render_bolus, render_worksheet, ReportSettings};
