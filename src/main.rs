mod abort;
mod config;
mod coord;
mod hardware;
mod observation;
mod session;

use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use crate::config::Config;
use crate::coord::TimingReport;
use crate::hardware::Hardware;
use crate::observation::snapshot;
use crate::session::{ParamOverrides, Prompter, Session};

/// How long to let stuck driver calls finish once the session is over.
const RUNTIME_SHUTDOWN: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "radio-obs")]
#[command(about = "Radio telescope observation session control")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Point the telescope and record spectrometer and SDR data
    Run(RunArgs),
    /// Summarise a saved observations file
    Inspect { file: PathBuf },
}

#[derive(Args)]
struct RunArgs {
    /// YAML configuration file
    #[arg(long)]
    config: Option<String>,
    /// Observations file, overriding the configuration
    #[arg(long)]
    output: Option<PathBuf>,
    /// Observe the Sun
    #[arg(long, conflicts_with_all = ["ra", "dec", "alt", "az"])]
    sun: bool,
    /// Target right ascension (degrees)
    #[arg(long, requires = "dec", allow_negative_numbers = true)]
    ra: Option<f64>,
    /// Target declination (degrees)
    #[arg(long, requires = "ra", allow_negative_numbers = true)]
    dec: Option<f64>,
    /// Fixed altitude (degrees)
    #[arg(long, requires = "az", conflicts_with_all = ["ra", "dec"], allow_negative_numbers = true)]
    alt: Option<f64>,
    /// Fixed azimuth (degrees)
    #[arg(long, requires = "alt", allow_negative_numbers = true)]
    az: Option<f64>,
    /// Samples per SDR block
    #[arg(long)]
    nsamples: Option<usize>,
    /// Number of SDR blocks per capture
    #[arg(long)]
    nblocks: Option<usize>,
    /// Total duration (seconds)
    #[arg(long)]
    duration: Option<f64>,
}

impl RunArgs {
    fn overrides(&self) -> ParamOverrides {
        ParamOverrides {
            sun: self.sun,
            ra_deg: self.ra,
            dec_deg: self.dec,
            alt_deg: self.alt,
            az_deg: self.az,
            nsamples: self.nsamples,
            nblocks: self.nblocks,
            duration_s: self.duration,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Inspect { file } => inspect(&file),
    }
}

fn run(args: RunArgs) -> ExitCode {
    let config = match &args.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let station = match config.station() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut settings = match config.session_settings() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(output) = args.output.clone() {
        settings.output = output;
    }

    log::info!("{}", TimingReport::at(coord::utc_now(), &station));

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    let session = match Session::from_prompts(
        &mut prompter,
        &args.overrides(),
        &station,
        Hardware::from_config(&config.hardware),
        settings,
    ) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Input error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = runtime.block_on(session.run(interrupted()));
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN);

    println!("{}", report);
    ExitCode::SUCCESS
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Cannot listen for Ctrl-C, relying on duration only: {}", e);
        std::future::pending::<()>().await;
    }
}

fn inspect(path: &Path) -> ExitCode {
    match snapshot::load(path) {
        Ok(records) => {
            print!("{}", snapshot::summarize(&records));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            ExitCode::FAILURE
        }
    }
}
