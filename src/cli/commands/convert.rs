//! CLI handler for single-file conversion.

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;

use transcript_md::convert::{convert_file, ConvertError, ConvertOptions};

use super::super::signal::ExitCode;
use super::super::Cli;

pub(crate) fn cmd_convert(
    cli: &Cli,
    input: &str,
    output: Option<&Path>,
    opts: &ConvertOptions,
) -> Result<()> {
    let _span = tracing::info_span!("cmd_convert").entered();

    let source = PathBuf::from(input);
    if !source.exists() {
        anyhow::bail!("Input file not found: {}", input);
    }

    if !cli.quiet {
        println!("Converting {}", source.display());
    }

    let result = match convert_file(&source, output, opts) {
        Ok(r) => r,
        Err(ConvertError::NoConversationFound(path)) => {
            eprintln!(
                "{} no conversation found in {}",
                "warning:".yellow().bold(),
                path.display()
            );
            ExitCode::NoConversation.exit();
        }
        Err(e) => return Err(e.into()),
    };

    if !cli.quiet {
        println!("Extracted {} turn(s)", result.turns);
    }
    if opts.dry_run {
        println!("Dry run: would write {}", result.output.display());
    } else {
        println!(
            "  {} → {}",
            result.source.display(),
            result.output.display().to_string().green()
        );
    }
    if !cli.quiet {
        println!("    Title: {} | Turns: {}", result.title, result.turns);
    }

    Ok(())
}
