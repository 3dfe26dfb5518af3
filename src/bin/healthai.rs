//! HealthAI CLI - Command-line interface for HealthAI core
//!
//! Commands:
//! - chart: Print the gap-filled daily series for one metric
//! - summary: Print window totals and daily averages
//! - status: Print the latest value of every metric in one line
//! - chat: Talk to the assistant about the current metrics
//! - doctor: Diagnose configuration, source, and assistant setup
//! - config: Show or initialize the configuration file

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use healthai_core::chat::ChatSession;
use healthai_core::config::{Config, SourceConfig, DEFAULT_CONFIG_FILE};
use healthai_core::sources::{MetricSource, FETCH_HORIZON_DAYS};
use healthai_core::{
    chart_data, fetch_all_data, latest_status_line, ComputeError, FetchReport, MetricKind,
    MetricStore, SharedStore, Window, WindowSummary, HEALTHAI_VERSION,
};

/// HealthAI - daily health metrics and assistant context
#[derive(Parser)]
#[command(name = "healthai")]
#[command(version = HEALTHAI_VERSION)]
#[command(about = "Summarize health metrics and chat about them", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./healthai.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Sample source: "mock" or a readings file path (overrides config)
    #[arg(long, global = true)]
    source: Option<String>,

    /// Reference day (YYYY-MM-DD), defaults to today in UTC
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the daily series for one metric
    Chart {
        /// Metric to chart (steps, heart_rate, energy_burned, exercise_time, sleep_duration)
        #[arg(short, long, default_value = "steps")]
        metric: MetricKind,

        /// Window in days (defaults to the configured window)
        #[arg(short, long)]
        days: Option<usize>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print total and daily average over the window
    Summary {
        /// Metric to summarize; all metrics when omitted
        #[arg(short, long)]
        metric: Option<MetricKind>,

        /// Window in days (defaults to the configured window)
        #[arg(short, long)]
        days: Option<usize>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the latest value of every metric
    Status,

    /// Chat with the assistant (one message per line on stdin)
    Chat {
        /// Send a single message and exit
        #[arg(long)]
        message: Option<String>,
    },

    /// Diagnose configuration, source, and assistant setup
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or initialize the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("healthai_core=info,warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), HealthCliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(source) = cli.source.as_deref() {
        config.source = parse_source(source);
    }
    let today = cli.today.unwrap_or_else(|| Utc::now().date_naive());

    match cli.command {
        Commands::Chart {
            metric,
            days,
            format,
        } => cmd_chart(&config, today, metric, days, format),

        Commands::Summary {
            metric,
            days,
            format,
        } => cmd_summary(&config, today, metric, days, format),

        Commands::Status => cmd_status(&config, today),

        Commands::Chat { message } => cmd_chat(&config, today, message.as_deref()),

        Commands::Doctor { json } => cmd_doctor(&config, today, json),

        Commands::Config { action } => cmd_config(&config, cli.config.as_deref(), action),
    }
}

fn parse_source(source: &str) -> SourceConfig {
    if source.eq_ignore_ascii_case("mock") {
        SourceConfig::Mock
    } else {
        SourceConfig::Readings {
            path: PathBuf::from(source),
        }
    }
}

fn resolve_window(config: &Config, days: Option<usize>) -> Result<Window, HealthCliError> {
    match days {
        Some(days) => Ok(Window::new(days)?),
        None => Ok(config.default_window),
    }
}

fn load_store(config: &Config, today: NaiveDate) -> Result<MetricStore, HealthCliError> {
    let source = config.source.open()?;
    let mut store = MetricStore::new();
    fetch_all_data(&mut store, &*source, today)?;
    Ok(store)
}

fn cmd_chart(
    config: &Config,
    today: NaiveDate,
    metric: MetricKind,
    days: Option<usize>,
    format: OutputFormat,
) -> Result<(), HealthCliError> {
    let window = resolve_window(config, days)?;
    let store = load_store(config, today)?;
    let series = chart_data(&store, metric, window, today);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&series)?),
        OutputFormat::Text => {
            println!("{} ({} days)", metric.label(), window.days());
            // Weekday names for a week, month and day otherwise
            let date_format = if window.days() == 7 { "%a" } else { "%b %-d" };
            for sample in &series {
                println!(
                    "  {:<7} {:>10.1} {}",
                    sample.day().format(date_format),
                    sample.value,
                    sample.unit
                );
            }
        }
    }

    Ok(())
}

fn cmd_summary(
    config: &Config,
    today: NaiveDate,
    metric: Option<MetricKind>,
    days: Option<usize>,
    format: OutputFormat,
) -> Result<(), HealthCliError> {
    let window = resolve_window(config, days)?;
    let store = load_store(config, today)?;
    let kinds: Vec<MetricKind> = match metric {
        Some(kind) => vec![kind],
        None => MetricKind::ALL.to_vec(),
    };

    let summaries: Vec<WindowSummary> = kinds
        .into_iter()
        .map(|kind| WindowSummary::compute(&store, kind, window, today))
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Text => {
            for summary in &summaries {
                println!("{:<9} {}", summary.kind.label(), summary.render());
            }
        }
    }

    Ok(())
}

fn cmd_status(config: &Config, today: NaiveDate) -> Result<(), HealthCliError> {
    let store = load_store(config, today)?;
    println!("{}", latest_status_line(&store));
    Ok(())
}

fn cmd_chat(config: &Config, today: NaiveDate, message: Option<&str>) -> Result<(), HealthCliError> {
    // Fetch on a worker the way a view refreshes on activation
    let shared = SharedStore::default();
    let source = config.source.open()?;
    shared
        .refresh_in_background(source, today)
        .join()
        .map_err(|_| HealthCliError::FetchAborted)??;
    let store = shared.snapshot()?;

    let service = config.insight_service(&store)?;
    let mut session = ChatSession::new(config.system_prompt.clone());
    session.open(&store);

    let mut stdout = io::stdout();
    for opening in session.messages() {
        writeln!(stdout, "Assistant: {}", opening.text)?;
    }

    if let Some(message) = message {
        if let Some(reply) = session.send(message, &store, &*service) {
            writeln!(stdout, "Assistant: {}", reply.text)?;
        }
        return Ok(());
    }

    let interactive = atty::is(atty::Stream::Stdin);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        if interactive {
            write!(stdout, "> ")?;
            stdout.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if let Some(reply) = session.send(&line, &store, &*service) {
            writeln!(stdout, "Assistant: {}", reply.text)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

fn cmd_doctor(config: &Config, today: NaiveDate, json: bool) -> Result<(), HealthCliError> {
    let mut checks = Vec::new();

    // Check source
    match config.source.open() {
        Ok(source) => {
            let mut store = MetricStore::new();
            match fetch_all_data(&mut store, &*source, today) {
                Ok(report) => checks.push(source_check(&report, &*source)),
                Err(e) => checks.push(DoctorCheck {
                    name: "source".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Fetch failed: {}", e),
                }),
            }
        }
        Err(e) => checks.push(DoctorCheck {
            name: "source".to_string(),
            status: CheckStatus::Error,
            message: format!("Cannot open source: {}", e),
        }),
    }

    // Check assistant
    checks.push(match config.insight_command.as_deref() {
        Some(command) => DoctorCheck {
            name: "assistant".to_string(),
            status: CheckStatus::Ok,
            message: format!("Prompts are sent to '{}'", command),
        },
        None => DoctorCheck {
            name: "assistant".to_string(),
            status: CheckStatus::Warning,
            message: "No insight_command configured; chat replies with the status line".to_string(),
        },
    });

    // Check stdin mode
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "Interactive terminal detected".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "Piped input detected; chat reads one message per line".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        version: HEALTHAI_VERSION.to_string(),
        today,
        default_window_days: config.default_window.days(),
        checks,
    };
    let failed = report
        .checks
        .iter()
        .any(|check| matches!(check.status, CheckStatus::Error));

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("HealthAI Doctor Report");
        println!("======================");
        println!("Version: {}", report.version);
        println!("Today:   {}", report.today);
        println!("Window:  {} days", report.default_window_days);
        println!("\nChecks:");
        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    if failed {
        return Err(HealthCliError::DoctorFailed);
    }

    Ok(())
}

fn source_check(report: &FetchReport, source: &dyn MetricSource) -> DoctorCheck {
    let total: usize = report.samples_per_kind.values().sum();
    let empty: Vec<String> = MetricKind::ALL
        .iter()
        .filter(|kind| report.samples_per_kind.get(*kind).copied().unwrap_or(0) == 0)
        .map(|kind| kind.to_string())
        .collect();

    if empty.is_empty() {
        DoctorCheck {
            name: "source".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "'{}' returned {} samples over {} days",
                source.name(),
                total,
                FETCH_HORIZON_DAYS
            ),
        }
    } else {
        DoctorCheck {
            name: "source".to_string(),
            status: CheckStatus::Warning,
            message: format!("'{}' has no samples for: {}", source.name(), empty.join(", ")),
        }
    }
}

fn cmd_config(
    config: &Config,
    path: Option<&Path>,
    action: ConfigAction,
) -> Result<(), HealthCliError> {
    match action {
        ConfigAction::Show => {
            println!("{}", config.to_json()?);
        }
        ConfigAction::Init { force } => {
            let path = path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            if path.exists() && !force {
                return Err(HealthCliError::ConfigExists(path));
            }
            fs::write(&path, Config::default().to_json()?)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

#[derive(Debug)]
enum HealthCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    FetchAborted,
    ConfigExists(PathBuf),
    DoctorFailed,
}

impl From<io::Error> for HealthCliError {
    fn from(e: io::Error) -> Self {
        HealthCliError::Io(e)
    }
}

impl From<ComputeError> for HealthCliError {
    fn from(e: ComputeError) -> Self {
        HealthCliError::Compute(e)
    }
}

impl From<serde_json::Error> for HealthCliError {
    fn from(e: serde_json::Error) -> Self {
        HealthCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HealthCliError> for CliError {
    fn from(e: HealthCliError) -> Self {
        match e {
            HealthCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HealthCliError::Compute(ComputeError::InvalidWindow(days)) => CliError {
                code: "INVALID_WINDOW".to_string(),
                message: format!("A window of {} days is not allowed", days),
                hint: Some(format!("Pass --days between 1 and {}", Window::MAX_DAYS)),
            },
            HealthCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the readings file and configuration".to_string()),
            },
            HealthCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            HealthCliError::FetchAborted => CliError {
                code: "FETCH_ABORTED".to_string(),
                message: "Background fetch panicked".to_string(),
                hint: Some("Run with --verbose for details".to_string()),
            },
            HealthCliError::ConfigExists(path) => CliError {
                code: "CONFIG_EXISTS".to_string(),
                message: format!("{} already exists", path.display()),
                hint: Some("Pass --force to overwrite".to_string()),
            },
            HealthCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    version: String,
    today: NaiveDate,
    default_window_days: usize,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
