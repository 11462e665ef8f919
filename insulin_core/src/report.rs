//! Plain-text worksheet renderer.
//!
//! Layout is fixed: header, patient, total daily dose, regimen, correction
//! table, disclaimer, signature line. Output is split into pages of
//! `lines_per_page`; when the cursor reaches the bottom margin a form feed
//! starts a new page with a continuation header. Doses are shown to one
//! decimal place.

use crate::{
    BolusReport, Config, CorrectionTable, DoseComponent, DoseWorksheet, PatientInput,
};

const RULE: &str = "==========================================================";
const WRAP_WIDTH: usize = 72;
/// Continuation header plus the blank line after it
const CONTINUATION_LINES: usize = 2;

/// Presentation settings for rendered reports
#[derive(Clone, Debug)]
pub struct ReportSettings {
    pub title: String,
    pub clinician: Option<String>,
    pub facility: Option<String>,
    pub disclaimer: String,
    pub lines_per_page: usize,
    pub bottom_margin: usize,
}

impl From<&Config> for ReportSettings {
    fn from(config: &Config) -> Self {
        Self {
            title: config.report.title.clone(),
            clinician: config.clinic.clinician.clone(),
            facility: config.clinic.facility.clone(),
            disclaimer: config.report.disclaimer.clone(),
            lines_per_page: config.report.lines_per_page,
            bottom_margin: config.report.bottom_margin,
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Accumulates lines and inserts page breaks
struct PageWriter<'a> {
    settings: &'a ReportSettings,
    out: String,
    line_on_page: usize,
    page: usize,
}

impl<'a> PageWriter<'a> {
    fn new(settings: &'a ReportSettings) -> Self {
        Self {
            settings,
            out: String::new(),
            line_on_page: 0,
            page: 1,
        }
    }

    /// Lines available above the bottom margin
    fn usable_lines(&self) -> usize {
        self.settings
            .lines_per_page
            .saturating_sub(self.settings.bottom_margin)
            .max(3)
    }

    fn line(&mut self, text: impl AsRef<str>) {
        if self.line_on_page >= self.usable_lines() {
            self.new_page();
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
        self.line_on_page += 1;
    }

    fn blank(&mut self) {
        self.line("");
    }

    /// Break early if the next `lines` would not fit on this page but
    /// would fit on a fresh one
    fn keep_together(&mut self, lines: usize) {
        let fits_fresh = lines + CONTINUATION_LINES <= self.usable_lines();
        if fits_fresh && self.line_on_page + lines > self.usable_lines() {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        self.page += 1;
        self.out.push('\u{c}');
        self.line_on_page = 0;
        let header = format!("{} (continued, page {})", self.settings.title, self.page);
        self.line(header);
        self.blank();
        tracing::debug!("Report page break, now on page {}", self.page);
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Greedy word wrap
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// "bolus_per_meal" -> "Bolus per meal"
fn display_name(component: &DoseComponent) -> String {
    let spaced = component.name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}

fn write_header(w: &mut PageWriter<'_>, subtitle: &str) {
    let settings = w.settings;
    w.line(RULE);
    w.line(&settings.title);
    w.line(subtitle);
    let mut signed = String::new();
    if let Some(clinician) = &settings.clinician {
        signed.push_str(&format!("Clinician: {}", clinician));
    }
    if let Some(facility) = &settings.facility {
        if !signed.is_empty() {
            signed.push_str("   ");
        }
        signed.push_str(&format!("Facility: {}", facility));
    }
    if !signed.is_empty() {
        w.line(signed);
    }
}

fn write_patient(w: &mut PageWriter<'_>, patient: &PatientInput, target: u32) {
    w.keep_together(8);
    w.line("PATIENT");
    w.line(format!(
        "  Name/ID:        {}",
        patient.name.as_deref().unwrap_or("-")
    ));
    w.line(format!("  Weight:         {:.1} kg", patient.weight_kg));
    w.line(format!(
        "  Risk category:  {} (target {} mg/dL)",
        patient.risk_category.label(),
        target
    ));
    w.line(format!("  Visit:          {}", patient.visit_type.label()));
    w.line(format!("  Dose factor:    {:.1} U/kg", patient.dose_factor));
    match patient.previous_tdd {
        Some(prev) => w.line(format!("  Previous TDD:   {:.1} U", prev)),
        None => w.line("  Previous TDD:   -"),
    }
}

fn write_table(w: &mut PageWriter<'_>, table: &CorrectionTable, usual: &str, hypo: &str) {
    w.keep_together(table.rows.len() + 1);
    w.line(format!("  {:<20}{:<16}{}", "Pre-meal (mg/dL)", usual, hypo));
    for row in &table.rows {
        w.line(format!(
            "  {:<20}{:<16}{}",
            row.glucose_range.to_string(),
            format!("{} U", row.units_usual),
            format!("{} U", row.units_hypo)
        ));
    }
}

fn write_footer(w: &mut PageWriter<'_>) {
    let settings = w.settings;
    let disclaimer = wrap(&settings.disclaimer, WRAP_WIDTH - 2);
    w.blank();
    w.keep_together(disclaimer.len() + 1);
    w.line("DISCLAIMER");
    for line in disclaimer {
        w.line(format!("  {}", line));
    }
    w.blank();
    w.keep_together(2);
    w.line("Signature: ______________________________   Date: ____________");
    w.line(RULE);
}

/// Render a full dosing worksheet
pub fn render_worksheet(sheet: &DoseWorksheet, settings: &ReportSettings) -> String {
    let mut w = PageWriter::new(settings);
    let dose = &sheet.dose;

    write_header(&mut w, "Insulin dosing recommendation");
    w.line(format!("Worksheet: {}", sheet.id));
    w.line(format!(
        "Generated: {}",
        sheet.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    w.line(RULE);
    w.blank();

    write_patient(&mut w, &sheet.patient, dose.target_glucose);
    w.blank();

    w.keep_together(3);
    w.line("TOTAL DAILY DOSE");
    w.line(format!("  TDD:   {:.1} U", dose.tdd));
    w.line(format!("  Rule:  {}", dose.adjustment_note));
    w.blank();

    let breakdown = &dose.regimen_breakdown;
    w.keep_together(breakdown.components.len() + 1);
    w.line(format!("REGIMEN: {}", breakdown.regimen.label()));
    for component in &breakdown.components {
        w.line(format!("  {:<20}{}", display_name(component), component.amount));
    }
    w.blank();

    let table = &sheet.correction_table;
    w.keep_together(table.rows.len() + 2);
    w.line(format!(
        "CORRECTION TABLE: {}, {:.1} mg/dL per unit",
        sheet.patient.insulin_type.label(),
        table.correction_factor
    ));
    write_table(&mut w, table, "Usual", "Hypo concern");

    write_footer(&mut w);
    w.finish()
}

/// Render a standalone bolus correction with its reference table
pub fn render_bolus(report: &BolusReport, settings: &ReportSettings) -> String {
    let mut w = PageWriter::new(settings);
    let query = &report.query;
    let result = &report.result;

    write_header(&mut w, "Bolus correction");
    w.line(RULE);
    w.blank();

    w.line("BOLUS CORRECTION");
    w.line(format!("  TDD:               {:.1} U", query.tdd));
    w.line(format!("  Insulin:           {}", query.insulin_type.label()));
    w.line(format!("  ISF:               {:.1} mg/dL per unit", result.isf));
    w.line(format!("  Pre-meal glucose:  {} mg/dL", query.premeal_glucose));
    w.line(format!(
        "  Usual (target 130):         {} U",
        result.units_usual
    ));
    w.line(format!(
        "  Hypo concern (target 140):  {} U",
        result.units_hypo
    ));
    w.blank();

    w.keep_together(report.reference_table.rows.len() + 2);
    w.line("REFERENCE TABLE");
    write_table(&mut w, &report.reference_table, "Target 130", "Target 140");

    write_footer(&mut w);
    w.finish()
}
