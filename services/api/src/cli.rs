use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use ism_admissions::error::AppError;
use ism_admissions::workflows::admissions::{ApplicationStatus, ExportProfile};

use crate::demo::{run_demo, run_export, run_score};
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "ISM Admissions",
    about = "Run and demonstrate the ISM admissions workflow from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk one file from submission to student account and print the trail
    Demo(DemoArgs),
    /// Compute the predictive score for a set of grades
    Score(ScoreArgs),
    /// Write a CSV export of the demo applications
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Use this average instead of synthesized grades
    #[arg(long)]
    pub(crate) average: Option<f64>,
    /// Track paired with --average
    #[arg(long, default_value = "S2")]
    pub(crate) track: String,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Grade average out of 20
    #[arg(long)]
    pub(crate) average: f64,
    /// Baccalaureate track, e.g. S2 or L1
    #[arg(long)]
    pub(crate) track: String,
    /// Score for a master's program (adds the experience component)
    #[arg(long)]
    pub(crate) graduate: bool,
    /// Years of professional experience, only used with --graduate
    #[arg(long, default_value_t = 0.0)]
    pub(crate) experience_years: f64,
    /// Submission date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) submitted_on: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// `operational` (directors) or `supervisory` (full report)
    #[arg(long, value_parser = parse_profile, default_value = "operational")]
    pub(crate) profile: ExportProfile,
    /// Restrict to one school
    #[arg(long)]
    pub(crate) school: Option<String>,
    /// Restrict to one status, e.g. validee
    #[arg(long)]
    pub(crate) status: Option<ApplicationStatus>,
    /// Directory receiving the CSV file
    #[arg(long, default_value = ".")]
    pub(crate) output_dir: PathBuf,
}

fn parse_profile(raw: &str) -> Result<ExportProfile, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "operational" | "directeur" => Ok(ExportProfile::Operational),
        "supervisory" | "superviseur" => Ok(ExportProfile::Supervisory),
        other => Err(format!(
            "unknown export profile '{other}' (expected operational or supervisory)"
        )),
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
        Command::Score(args) => run_score(args),
        Command::Export(args) => run_export(args),
    }
}
