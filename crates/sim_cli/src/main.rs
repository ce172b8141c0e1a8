// crates/sim_cli/src/main.rs
//
// seatsim: load reference + scenario → apply flag overrides → simulate →
// write canonical result.json → print its sha256 on stdout.
// Exit codes: 0 ok, 2 validation/configuration, 4 I/O.

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    pub const VALIDATION: i32 = 2;
    pub const IO: i32 = 4;
}

use std::fmt;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use args::{parse_and_validate as parse_cli, Args};
use sim_core::variables::SimulationOptions;
use sim_io::{canonical_json, hasher, IoError};
use sim_pipeline::{simulate, validate_inputs, PipelineError};

/// Central error type for exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Schema / shape / option domain / configuration failures
    Validation(String),
    /// Read, write, path and size-limit failures
    Io(String),
}

impl fmt::Display for MainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "validation: {m}"),
            MainError::Io(m) => write!(f, "io: {m}"),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("seatsim: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };
    init_tracing(args.quiet);

    let rc = match run(&args) {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("seatsim: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// `RUST_LOG` wins; otherwise `info`, or `warn` under --quiet.
fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), MainError> {
    let mut loaded = sim_io::load_inputs(&args.reference, &args.scenario).map_err(map_io_err)?;
    apply_overrides(args, &mut loaded.scenario.options);
    tracing::info!(
        reference_sha256 = %loaded.digests.reference_sha256,
        scenario_sha256 = %loaded.digests.scenario_sha256,
        swing = %loaded.scenario.options.swing_type,
        seats_per_district = loaded.scenario.options.seats_per_district,
        "inputs loaded"
    );

    if args.validate_only {
        let diags = validate_inputs(&loaded.reference, &loaded.scenario).map_err(map_pipeline_err)?;
        for d in diags.iter() {
            tracing::warn!(code = %d.code, subject = ?d.subject, "{}", d.message);
        }
        if !args.quiet {
            eprintln!("validate-only: inputs OK ({} warning(s))", diags.len());
        }
        return Ok(());
    }

    let result = simulate(&loaded.reference, &loaded.scenario).map_err(map_pipeline_err)?;

    let path = args.out.join("result.json");
    canonical_json::write_canonical_file(&path, &result)
        .map_err(|e| MainError::Io(format!("write result.json: {e}")))?;
    let digest = hasher::sha256_file(&path).map_err(|e| MainError::Io(format!("hash result.json: {e}")))?;

    println!("{digest}  {}", path.display());
    if !args.quiet {
        eprintln!(
            "run: {} district(s), {} seat(s), {} diagnostic(s)",
            result.district_results.len(),
            result.metrics.election.total_seats,
            result.diagnostics.len()
        );
    }
    Ok(())
}

fn apply_overrides(args: &Args, options: &mut SimulationOptions) {
    if let Some(swing) = args.swing {
        options.swing_type = swing;
    }
    if let Some(seats) = args.seats {
        options.seats_per_district = seats;
    }
}

fn map_error(e: &MainError) -> i32 {
    match e {
        MainError::Validation(_) => exitcodes::VALIDATION,
        MainError::Io(_) => exitcodes::IO,
    }
}

fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Schema { pointer, msg } => MainError::Validation(format!("schema {pointer}: {msg}")),
        IoError::Json { pointer, msg } => MainError::Validation(format!("json {pointer}: {msg}")),
        IoError::Invalid(m) => MainError::Validation(m),
        IoError::Path(m) => MainError::Io(format!("path: {m}")),
        IoError::Limit(m) => MainError::Io(format!("limit: {m}")),
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    MainError::Validation(e.to_string())
}
