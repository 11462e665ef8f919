//! File export for worksheets and correction tables.
//!
//! Reports are written atomically (temp file in the target directory,
//! fsync, rename) so a crash never leaves a half-written worksheet behind.

use crate::{CorrectionTable, Error, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the correction-table CSV
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    glucose_range: String,
    low: u32,
    high: Option<u32>,
    units_usual: u32,
    units_hypo: u32,
    correction_factor: String,
}

/// Write a correction table as CSV, one row per glucose bin
///
/// Overwrites `path`. Returns the number of rows written.
pub fn write_correction_csv(table: &CorrectionTable, path: &Path) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for row in &table.rows {
        writer.serialize(CsvRow {
            glucose_range: row.glucose_range.to_string(),
            low: row.glucose_range.low(),
            high: row.glucose_range.high(),
            units_usual: row.units_usual,
            units_hypo: row.units_hypo,
            correction_factor: format!("{:.1}", table.correction_factor),
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;
    write_atomic(path, &bytes)?;

    tracing::info!("Wrote {} correction rows to {:?}", table.rows.len(), path);
    Ok(table.rows.len())
}

/// Write a rendered report to `path`
pub fn write_report(path: &Path, contents: &str) -> Result<()> {
    write_atomic(path, contents.as_bytes())?;
    tracing::info!("Saved report to {:?}", path);
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    // Temp file in the same directory so the rename stays on one filesystem
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.as_file().sync_all()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
