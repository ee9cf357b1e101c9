//! CLI implementation for transcript-md

mod commands;
mod config;
mod signal;

pub(crate) use signal::check_interrupted;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use config::apply_config_defaults;
use transcript_md::config::Config;
use transcript_md::convert::{ConvertOptions, DocumentStyle};

#[derive(Parser)]
#[command(name = "transcript-md")]
#[command(about = "Convert saved chat transcripts (HTML) to Markdown")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input HTML file, or a glob pattern / directory with --batch
    input: Option<String>,

    /// Output Markdown file (default: <input-stem>.md beside the input)
    #[arg(conflicts_with = "batch")]
    output: Option<PathBuf>,

    /// Convert every file matching the input pattern
    #[arg(long)]
    batch: bool,

    /// Write batch outputs to this directory (created if absent)
    #[arg(long, value_name = "DIR", requires = "batch")]
    output_dir: Option<PathBuf>,

    /// Document title (default: derived from the input file name)
    #[arg(long)]
    title: Option<String>,

    /// Document layout
    #[arg(long, value_enum)]
    style: Option<DocumentStyle>,

    /// Refuse to replace existing output files
    #[arg(long)]
    no_clobber: bool,

    /// Show what would be written without writing
    #[arg(long)]
    dry_run: bool,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,

    /// Show debug info (sets RUST_LOG=debug)
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Load config files relative to the current directory
pub fn load_config() -> Config {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    Config::load(&cwd)
}

/// Run CLI with pre-parsed arguments and loaded config (main.rs needs both
/// before logging is set up)
pub fn run_with(mut cli: Cli, config: Config) -> Result<()> {
    apply_config_defaults(&mut cli, &config);

    if let Some(Commands::Completions { shell }) = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let Some(input) = cli.input.clone() else {
        println!("Usage: transcript-md <input> [output] or transcript-md <pattern> --batch");
        println!("Run 'transcript-md --help' for more information.");
        return Ok(());
    };

    let opts = ConvertOptions {
        extractor: config.extractor().context("Invalid turn tag in configuration")?,
        document: {
            let mut document = config.document_options();
            if let Some(style) = cli.style {
                document.style = style;
            }
            document
        },
        title: cli.title.clone(),
        no_clobber: cli.no_clobber,
        dry_run: cli.dry_run,
    };

    if cli.batch {
        signal::setup_signal_handler();
        commands::cmd_batch(&cli, &input, cli.output_dir.as_deref(), &opts)
    } else {
        commands::cmd_convert(&cli, &input, cli.output.as_deref(), &opts)
    }
}

fn cmd_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    clap_complete::generate(
        shell,
        &mut Cli::command(),
        "transcript-md",
        &mut std::io::stdout(),
    );
}
