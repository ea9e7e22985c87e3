use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use hashcompare::config::Settings;
use hashcompare::hash::{hash_results_to_json, Algorithm, ComparisonOutcome, ComparisonService, DigestResult};

#[derive(Parser)]
#[command(name = "hashcompare")]
#[command(version)]
#[command(about = "Compute MD5 and SHA-256 digests and check whether two files are identical", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Read chunk size in bytes (0 keeps the default)
    #[arg(long, global = true)]
    buffer_size: Option<usize>,

    /// Hash the two inputs one after the other instead of concurrently
    #[arg(long, global = true)]
    sequential: bool,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Disable coloured output
    #[arg(long, global = true)]
    no_color: bool,

    /// Settings file (defaults to <config dir>/hashcompare/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the digests of each file
    Hash {
        files: Vec<PathBuf>,
    },
    /// Digest two files and report whether they are the same
    Compare {
        file1: Option<PathBuf>,
        file2: Option<PathBuf>,
    },
}

const EXIT_SUCCESS: u8 = 0;
const EXIT_DIFFERENT: u8 = 1;
const EXIT_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout stays clean for --json
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn"))
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(buffer_size) = cli.buffer_size {
        settings.set_buffer_size(buffer_size);
    }
    if cli.sequential {
        settings.concurrent = false;
    }
    if cli.no_color || !std::io::stdout().is_terminal() {
        settings.color = false;
    }

    let service = settings.service();

    match cli.command {
        Command::Hash { files } => hash_files(service, files, cli.json).await,
        Command::Compare { file1, file2 } => {
            compare_files(&service, file1, file2, cli.json, settings.color).await
        }
    }
}

async fn hash_files(service: ComparisonService, files: Vec<PathBuf>, json: bool) -> Result<ExitCode> {
    let results = tokio::task::spawn_blocking(move || service.compute_each(&files)).await??;

    if json {
        println!("{}", hash_results_to_json(&results)?);
    } else {
        for (path, result) in &results {
            match result {
                Ok(pair) => {
                    println!("{} ({})", path.display(), humansize::format_size(pair.size, humansize::BINARY));
                    for algorithm in Algorithm::ALL {
                        println!("  {}: {}", algorithm.label(), pair.get(algorithm));
                    }
                }
                Err(e) => eprintln!("{}", e),
            }
        }
    }

    Ok(ExitCode::from(hash_exit_status(&results)))
}

async fn compare_files(
    service: &ComparisonService,
    file1: Option<PathBuf>,
    file2: Option<PathBuf>,
    json: bool,
    color: bool,
) -> Result<ExitCode> {
    let spinner = spinner("Comparing files...");
    let outcome = service.evaluate_async(file1, file2).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let outcome = outcome?;

    if json {
        println!("{}", outcome.to_json()?);
    } else if color {
        print!("{}", outcome.digest_text());
        let verdict = match &outcome {
            ComparisonOutcome::Equal { .. } => outcome.verdict().green().bold(),
            ComparisonOutcome::Different { .. } => outcome.verdict().red().bold(),
            _ => outcome.verdict().yellow(),
        };
        println!("{}", verdict);
    } else {
        print!("{}", outcome.to_plain_text());
    }

    Ok(ExitCode::from(exit_status(&outcome)))
}

fn exit_status(outcome: &ComparisonOutcome) -> u8 {
    match outcome {
        ComparisonOutcome::Equal { .. } => EXIT_SUCCESS,
        ComparisonOutcome::SingleResult { result: Ok(_), .. } => EXIT_SUCCESS,
        ComparisonOutcome::Different { .. } => EXIT_DIFFERENT,
        _ => EXIT_FAILURE,
    }
}

fn hash_exit_status(results: &[(PathBuf, DigestResult)]) -> u8 {
    if results.iter().all(|(_, result)| result.is_ok()) {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    }
}

/// Spinner on stderr, only when a person is watching
fn spinner(message: &str) -> Option<ProgressBar> {
    if !std::io::stderr().is_terminal() {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}
