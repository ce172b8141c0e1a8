// crates/sim_cli/src/args.rs
//
// Offline CLI argument surface.
// - --reference and --scenario are local JSON files (no scheme:// paths)
// - --swing / --seats override the scenario's options
// - --out is the directory result.json is written to
// - --validate-only loads and validates inputs without running the engine

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use clap::Parser;
use sim_core::variables::SwingType;

/// Parsed CLI arguments.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "seatsim",
    disable_help_subcommand = true,
    about = "Offline what-if seat simulator (swing → D'Hondt → metrics → coalitions)"
)]
pub struct Args {
    /// Reference data JSON (parties, history, unit baselines, electorates, regions).
    #[arg(long)]
    pub reference: PathBuf,

    /// Scenario JSON (national votes, district pairings, options).
    #[arg(long)]
    pub scenario: PathBuf,

    /// Swing type override: uniform, proportional, proportional-bounded,
    /// proportional-logistic or regional.
    #[arg(long, value_parser = parse_swing)]
    pub swing: Option<SwingType>,

    /// Seats per district override.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub seats: Option<u32>,

    /// Output directory for result.json.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Validate inputs only, do not run the engine.
    #[arg(long)]
    pub validate_only: bool,

    /// Only warnings and errors on stderr.
    #[arg(long)]
    pub quiet: bool,
}

/// Argument errors; short, stable messages.
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::NonLocalPath(p) => write!(f, "path must be a local file (no scheme): {p}"),
        }
    }
}

impl std::error::Error for CliError {}

pub fn parse_and_validate() -> Result<Args, CliError> {
    let mut args = Args::parse();
    for p in [args.reference.as_path(), args.scenario.as_path(), args.out.as_path()] {
        ensure_local_path(p)?;
    }
    args.reference = normalize_path(&args.reference);
    args.scenario = normalize_path(&args.scenario);
    args.out = normalize_path(&args.out);
    Ok(args)
}

pub fn parse_swing(s: &str) -> Result<SwingType, String> {
    s.trim()
        .parse::<SwingType>()
        .map_err(|_| format!("expected one of: {}", SwingType::TOKENS.join(", ")))
}

#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    match p.to_str() {
        Some(s) if has_scheme(s) => Err(CliError::NonLocalPath(s.to_string())),
        _ => Ok(()),
    }
}

/// Absolute path; falls back to CWD-relative when the path does not exist yet.
fn normalize_path(p: &Path) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}
