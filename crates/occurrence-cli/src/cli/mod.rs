use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use occurrence_engine::ExpansionOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod expand;
pub mod validate;

#[derive(Subcommand)]
enum Command {
    /// Expand stored events into the occurrences inside a window
    Expand(expand::ExpandArgs),
    /// Check a recurrence rule, or every event in a file
    Validate(validate::ValidateArgs),
    /// Print a recurrence rule in plain English
    Describe {
        /// Rule text, e.g. "FREQ=WEEKLY;BYDAY=TU,TH"
        rule: Option<String>,
    },
}

/// Expansion limits shared by the commands that expand events.
#[derive(Args, Debug, Default)]
pub struct LimitArgs {
    /// JSON file with expansion options
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// How many months past its start an open-ended rule is expanded when the window has no end
    #[arg(long)]
    horizon_months: Option<u32>,

    /// Upper bound on occurrences kept per event
    #[arg(long)]
    max_occurrences: Option<usize>,
}

impl LimitArgs {
    /// Options from `--config`, then overridden by any explicit flags.
    pub fn options(&self) -> Result<ExpansionOptions> {
        let mut options = match &self.config {
            Some(path) => {
                let text = read_input(path)?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Invalid expansion options in {}", path.display()))?
            }
            None => ExpansionOptions::default(),
        };
        if let Some(months) = self.horizon_months {
            options.horizon_months = months;
        }
        if let Some(max) = self.max_occurrences {
            options.max_occurrences = max;
        }
        tracing::debug!(?options, "expansion options");
        Ok(options)
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

pub fn run() -> Result<ExitCode> {
    let args = Cli::parse();
    init_tracing();

    match args.command {
        Command::Expand(args) => expand::run(&args),
        Command::Validate(args) => validate::run(&args),
        Command::Describe { rule } => {
            println!("{}", occurrence_engine::describe_str(rule.as_deref()));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=info,occurrence_engine=warn", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Read a whole file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
