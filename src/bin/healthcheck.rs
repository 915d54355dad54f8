//! healthcheck CLI
//!
//! Evaluates device health facts against a check list from the command line.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::Term;

use healthchecks::checks::{EvaluateOptions, HealthEvaluator, Verdict};
use healthchecks::cli::{self, CliConfig, OutputFormat, OutputFormatter};

/// Exit status when the overall result is FAIL and `--fail-on-error` is set
const EXIT_CHECKS_FAILED: u8 = 2;

/// Network device health-check evaluator
#[derive(Parser)]
#[command(name = "healthcheck")]
#[command(version = healthchecks::VERSION)]
#[command(about = "Evaluate network device health facts against a check list", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// CLI configuration file
    #[arg(short, long, env = "HEALTHCHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Default-threshold file (JSON object of key to number)
    #[arg(short, long, global = true)]
    defaults: Option<PathBuf>,

    /// Output format: text, json, json-pretty
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate facts against a check list
    Evaluate {
        /// Facts file, `-` for stdin
        #[arg(long)]
        facts: PathBuf,

        /// Check list or `health_check` wrapper file
        #[arg(long)]
        checks: PathBuf,

        /// Attach the raw facts to the report
        #[arg(long)]
        details: bool,

        /// CPU warning tier for checks that set none
        #[arg(long)]
        warning_threshold: Option<f64>,

        /// CPU critical tier for checks that set none
        #[arg(long)]
        critical_threshold: Option<f64>,

        /// Exit with status 2 when the overall result is FAIL
        #[arg(long)]
        fail_on_error: bool,
    },

    /// Print the resolved default-threshold table
    Defaults,

    /// List recognized check names
    Checks,
}

// ═══════════════════════════════════════════════════════════════════════════════
// MAIN
// ═══════════════════════════════════════════════════════════════════════════════

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let term = Term::stdout();

    match run_command(&cli, &term) {
        Ok(code) => code,
        Err(e) => {
            let color = !cli.no_color && Term::stderr().features().colors_supported();
            OutputFormatter::new(cli.format.unwrap_or_default())
                .with_color(color)
                .error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run_command(cli: &Cli, term: &Term) -> anyhow::Result<ExitCode> {
    let config = load_config(cli)?;
    let output = OutputFormatter::new(cli.format.unwrap_or(config.format))
        .with_color(config.color && !cli.no_color && term.features().colors_supported());

    match &cli.command {
        Commands::Evaluate {
            facts,
            checks,
            details,
            warning_threshold,
            critical_threshold,
            fail_on_error,
        } => {
            let defaults = cli::load_defaults(cli.defaults.as_deref().or(config.defaults_path.as_deref()))
                .context("loading default thresholds")?;
            let facts = cli::load_facts(facts).context("loading facts")?;
            let target = cli::load_target(checks).context("loading checks")?;

            let options = EvaluateOptions {
                details: *details,
                warning_threshold: *warning_threshold,
                critical_threshold: *critical_threshold,
            };
            let report = HealthEvaluator::with_defaults(defaults).evaluate(&facts, &target, &options)?;

            term.write_line(&output.render_report(&report)?)?;

            if (*fail_on_error || config.fail_on_error) && report.result() == Some(Verdict::Fail) {
                return Ok(ExitCode::from(EXIT_CHECKS_FAILED));
            }
        }
        Commands::Defaults => {
            let defaults = cli::load_defaults(cli.defaults.as_deref().or(config.defaults_path.as_deref()))?;
            term.write_line(&output.render_defaults(&defaults)?)?;
        }
        Commands::Checks => {
            term.write_line(&output.render_checks()?)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_config(cli: &Cli) -> anyhow::Result<CliConfig> {
    let config = match &cli.config {
        Some(path) => CliConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => CliConfig::load_or_default(&CliConfig::default_path())?,
    }
    .with_env_overrides();
    config.validate()?;
    Ok(config)
}
