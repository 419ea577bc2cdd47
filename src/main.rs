use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use resultlint::diagnostics::{JsonDiagnostic, LintError, render_diagnostics, render_error};
use resultlint::span::LineIndex;
use resultlint::{Config, LintOutcome};

#[derive(Parser)]
#[command(name = "resultlint", version, about = "Finds Result values that are never handled")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint source files
    Check {
        /// Files to lint
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Configuration file (defaults to resultlint.toml next to the first file, then in the working directory)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Human)]
        format: Format,
    },
    /// List available rules
    Rules,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Human,
    Json,
}

const EXIT_CLEAN: u8 = 0;
const EXIT_FINDINGS: u8 = 1;
const EXIT_FATAL: u8 = 2;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_max_level(level)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check { files, config, format } => ExitCode::from(check(&files, config, format)),
        Commands::Rules => {
            for rule in resultlint::rules::RULES {
                println!("{:<20} {:<16} {:<6} {}", rule.name, rule.category, rule.recommended.as_str(), rule.description);
            }
            ExitCode::from(EXIT_CLEAN)
        }
    }
}

fn check(files: &[PathBuf], config: Option<PathBuf>, format: Format) -> u8 {
    let config = match Config::discover(config.as_deref(), files.first().map(PathBuf::as_path)) {
        Ok(config) => config,
        Err(err) => {
            render_error("", "", &err);
            return EXIT_FATAL;
        }
    };
    if let Some(source) = &config.source {
        tracing::info!(config = %source.display(), "using configuration");
    }

    // A file that cannot be read or parsed is reported and skipped; the rest are still linted.
    let mut outcomes = Vec::with_capacity(files.len());
    let mut failed = 0usize;
    for file in files {
        match resultlint::lint_file(file, &config) {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => {
                report_fatal(file, &err);
                failed += 1;
            }
        }
    }

    match format {
        Format::Human => print_human(&outcomes),
        Format::Json => {
            if let Err(e) = print_json(&outcomes) {
                eprintln!("error: could not serialize diagnostics: {e}");
                return EXIT_FATAL;
            }
        }
    }

    if failed > 0 {
        tracing::warn!(failed, "some files could not be linted");
        EXIT_FATAL
    } else if outcomes.iter().all(LintOutcome::is_clean) {
        EXIT_CLEAN
    } else {
        EXIT_FINDINGS
    }
}

fn report_fatal(file: &std::path::Path, err: &LintError) {
    match err {
        LintError::Syntax { .. } => {
            let source = std::fs::read_to_string(file).unwrap_or_default();
            eprintln!("error [{}]: {err}", file.display());
            render_error(&source, &file.to_string_lossy(), err);
        }
        _ => eprintln!("error [{}]: {err}", file.display()),
    }
}

fn print_human(outcomes: &[LintOutcome]) {
    let mut total = 0;
    for outcome in outcomes {
        render_diagnostics(&outcome.source, &outcome.path.to_string_lossy(), &outcome.diagnostics);
        total += outcome.diagnostics.len();
    }
    if total > 0 {
        eprintln!("{total} problem(s) in {} file(s)", outcomes.iter().filter(|o| !o.is_clean()).count());
    }
}

fn print_json(outcomes: &[LintOutcome]) -> Result<(), serde_json::Error> {
    let mut items = Vec::new();
    for outcome in outcomes {
        let index = LineIndex::new(&outcome.source);
        items.extend(outcome.diagnostics.iter().map(|d| JsonDiagnostic::new(&outcome.path, &index, d)));
    }
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}
