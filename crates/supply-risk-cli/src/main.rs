use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use supply_risk_core::{
    pipeline::{assess_stage, ingest_stage, report_stage},
    run_pipeline, OutputFormat, RiskSettings,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "supply-risk",
    author,
    version,
    about = "Supplier risk scoring pipeline"
)]
struct Cli {
    /// Optional settings file (TOML, YAML or JSON) with weights, thresholds and top_n
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge suppliers with route and sanctions exposure
    Ingest {
        /// Directory containing suppliers.csv, shipping_routes.csv and sanctions.csv
        #[arg(long = "data-dir", value_name = "DIR", default_value = "./data")]
        data_dir: PathBuf,
        /// Output CSV path for the merged supplier profile
        #[arg(long, value_name = "FILE", default_value = "merged_data.csv")]
        output: PathBuf,
    },
    /// Calculate weighted supplier risk scores
    Assess {
        /// Merged supplier dataset from the ingest step
        #[arg(long, value_name = "FILE", default_value = "merged_data.csv")]
        merged: PathBuf,
        /// Country geo risk dataset
        #[arg(long, value_name = "FILE", default_value = "./data/geo_risk.csv")]
        geo: PathBuf,
        /// Output CSV path for risk scores
        #[arg(long, value_name = "FILE", default_value = "risk_scores.csv")]
        output: PathBuf,
    },
    /// Generate the markdown analytic brief
    Report {
        /// Risk score CSV from the assess step
        #[arg(long = "risk-scores", value_name = "FILE", default_value = "risk_scores.csv")]
        risk_scores: PathBuf,
        /// Output path for the brief
        #[arg(long, value_name = "FILE", default_value = "brief.md")]
        output: PathBuf,
        /// Emit the brief data as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// Run ingest, assess and report in sequence
    Run {
        /// Directory containing the CSV inputs
        #[arg(long = "data-dir", value_name = "DIR", default_value = "./data")]
        data_dir: PathBuf,
        /// Directory to write pipeline outputs
        #[arg(long = "output-dir", value_name = "DIR", default_value = "outputs")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Ingest { data_dir, output } => {
            ingest_stage(&data_dir, &output)?;
            println!("Wrote merged dataset to {}", output.display());
        }
        Commands::Assess {
            merged,
            geo,
            output,
        } => {
            let settings = load_settings(cli.config.as_deref())?;
            assess_stage(&merged, &geo, &output, &settings)?;
            println!("Wrote risk scores to {}", output.display());
        }
        Commands::Report {
            risk_scores,
            output,
            json,
        } => {
            let settings = load_settings(cli.config.as_deref())?;
            let format = if json {
                OutputFormat::Json
            } else {
                OutputFormat::Markdown
            };
            report_stage(&risk_scores, &output, &settings, format)?;
            println!("Wrote brief to {}", output.display());
        }
        Commands::Run {
            data_dir,
            output_dir,
        } => {
            let settings = load_settings(cli.config.as_deref())?;
            let outputs = run_pipeline(&data_dir, &output_dir, &settings)?;
            println!("Pipeline complete.");
            println!("- Merged data: {}", outputs.merged.display());
            println!("- Risk scores: {}", outputs.risk_scores.display());
            println!("- Brief: {}", outputs.brief.display());
        }
    }
    Ok(())
}

fn load_settings(config: Option<&Path>) -> Result<RiskSettings> {
    let settings = RiskSettings::load(config).with_context(|| match config {
        Some(path) => format!("failed to load settings from {}", path.display()),
        None => "failed to load settings".to_string(),
    })?;
    tracing::debug!(settings = %serde_json::to_string(&settings)?, "resolved settings");
    Ok(settings)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
