use clap::{Parser, Subcommand};
use insulin_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "insulin")]
#[command(about = "SMART insulin dosing worksheet", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute TDD, regimen split and correction table for a patient
    Worksheet {
        /// Patient name or ID
        #[arg(long)]
        name: Option<String>,

        /// Body weight in kg (20-300)
        #[arg(long)]
        weight: f64,

        /// Dose factor in U/kg (0.1-0.6)
        #[arg(long)]
        factor: f64,

        /// Risk category (usual, hypo-concern)
        #[arg(long)]
        risk: RiskCategory,

        /// Visit type (initial, repeat, inadequate-control, hypoglycemia)
        #[arg(long)]
        visit: VisitType,

        /// Previous total daily dose in units
        #[arg(long)]
        previous_tdd: Option<f64>,

        /// Escalation/reduction step in percent (10, 15, 20)
        #[arg(long)]
        step: Option<AdjustmentStep>,

        /// Regimen (basal, basal-plus, premix-bid, premix-tid, basal-bolus)
        #[arg(long)]
        regimen: Regimen,

        /// Correction insulin (regular, rapid)
        #[arg(long)]
        insulin: Option<InsulinType>,

        /// Print JSON instead of the text worksheet
        #[arg(long)]
        json: bool,

        /// Save the text worksheet to a file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Export the correction table as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Correction dose for a single pre-meal glucose reading
    Bolus {
        /// Total daily dose in units (5-300)
        #[arg(long)]
        tdd: f64,

        /// Correction insulin (regular, rapid)
        #[arg(long)]
        insulin: Option<InsulinType>,

        /// Pre-meal glucose in mg/dL (60-600)
        #[arg(long)]
        glucose: u32,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show or create the configuration file
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,

        /// Print the config file path only
        #[arg(long)]
        path: bool,
    },
}

fn main() -> Result<()> {
    // Keep stdout for worksheets; logs go to stderr
    insulin_core::logging::init_with_level("warn");

    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(Config::default_config_path);

    match cli.command {
        Commands::Config { init, path } => cmd_config(&config_path, init, path),
        Commands::Worksheet {
            name,
            weight,
            factor,
            risk,
            visit,
            previous_tdd,
            step,
            regimen,
            insulin,
            json,
            output,
            csv,
        } => {
            let config = Config::load_or_default(&config_path)?;
            let input = PatientInput {
                name,
                weight_kg: weight,
                risk_category: risk,
                dose_factor: factor,
                visit_type: visit,
                previous_tdd,
                regimen,
                adjustment_step: step.unwrap_or(config.defaults.adjustment_step),
                insulin_type: insulin.unwrap_or(config.defaults.insulin_type),
            };
            cmd_worksheet(input, json, output, csv, &config)
        }
        Commands::Bolus {
            tdd,
            insulin,
            glucose,
            json,
        } => {
            let config = Config::load_or_default(&config_path)?;
            let query = BolusQuery {
                tdd,
                insulin_type: insulin.unwrap_or(config.defaults.insulin_type),
                premeal_glucose: glucose,
            };
            cmd_bolus(query, json, &config)
        }
    }
}

fn cmd_worksheet(
    input: PatientInput,
    json: bool,
    output: Option<PathBuf>,
    csv: Option<PathBuf>,
    config: &Config,
) -> Result<()> {
    validate::validate_patient(&input)?;
    let sheet = build_worksheet(input)?;
    let rendered = render_worksheet(&sheet, &ReportSettings::from(config));

    if json {
        println!("{}", serde_json::to_string_pretty(&sheet)?);
    } else {
        print!("{}", rendered);
    }

    if let Some(path) = output {
        let path = config.resolve_output_path(&path);
        export::write_report(&path, &rendered)?;
        eprintln!("✓ Worksheet saved to {}", path.display());
    }

    if let Some(path) = csv {
        let path = config.resolve_output_path(&path);
        let rows = export::write_correction_csv(&sheet.correction_table, &path)?;
        eprintln!("✓ Exported {} correction rows to {}", rows, path.display());
    }

    Ok(())
}

fn cmd_bolus(query: BolusQuery, json: bool, config: &Config) -> Result<()> {
    validate::validate_bolus(&query)?;
    let report = run_bolus_query(&query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_bolus(&report, &ReportSettings::from(config)));
    }

    Ok(())
}

fn cmd_config(path: &Path, init: bool, path_only: bool) -> Result<()> {
    if path_only {
        println!("{}", path.display());
        return Ok(());
    }

    if init {
        if path.exists() {
            println!("Config already exists at {}", path.display());
        } else {
            Config::default().save_to(path)?;
            println!("✓ Wrote default config to {}", path.display());
        }
        return Ok(());
    }

    let config = Config::load_or_default(path)?;
    print!("{}", config.to_toml()?);
    Ok(())
}
