//! gutscore CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use commands::{CompareFormat, PrintFormat, SaveFormat};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "gutscore",
    version,
    about = "Gut health questionnaire with scoring and recommendations"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take the assessment interactively
    Take {
        /// Path to an assessment .toml (default: built-in gut health assessment)
        #[arg(long)]
        assessment: Option<PathBuf>,

        /// Save results to this directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Saved result format (default from config, else json)
        #[arg(long, value_enum)]
        format: Option<SaveFormat>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score a completed answer sheet without prompting
    Score {
        /// Answers .toml with an [answers] table of "<section>-<index>" = score
        #[arg(long)]
        answers: PathBuf,

        /// Path to an assessment .toml (default: built-in gut health assessment)
        #[arg(long)]
        assessment: Option<PathBuf>,

        /// Save results to this directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Saved result format (default from config, else json)
        #[arg(long, value_enum)]
        format: Option<SaveFormat>,

        /// What to print
        #[arg(long, value_enum, default_value_t = PrintFormat::Text)]
        print: PrintFormat,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate assessment TOML files
    Validate {
        /// Path to assessment file or directory (default: built-in)
        #[arg(long)]
        assessment: Option<PathBuf>,
    },

    /// List sections, questions, and interpretation bands
    Show {
        /// Path to an assessment .toml (default: built-in gut health assessment)
        #[arg(long)]
        assessment: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two saved result reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Points a section may rise or fall before it counts as changed
        #[arg(long, default_value = "0")]
        threshold: u32,

        /// Exit code 1 if any section got worse
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = CompareFormat::Text)]
        format: CompareFormat,
    },

    /// Create starter config, assessment, and answer sheet
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gutscore=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            assessment,
            output,
            format,
            config,
        } => commands::take::execute(assessment, output, format, config),
        Commands::Score {
            answers,
            assessment,
            output,
            format,
            print,
            config,
        } => commands::score::execute(answers, assessment, output, format, print, config),
        Commands::Validate { assessment } => commands::validate::execute(assessment),
        Commands::Show { assessment, config } => commands::show::execute(assessment, config),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
