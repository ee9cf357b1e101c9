//! CLI handler for batch conversion.
//!
//! Files are independent, so they are converted in parallel. One file's
//! failure is reported and counted; the rest continue. Every output path is
//! written by at most one worker: inputs that map to an output already
//! claimed by an earlier input are failed up front.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use transcript_md::convert::files::expand_pattern;
use transcript_md::convert::naming::{default_output_path, output_path_in};
use transcript_md::convert::{convert_file, ConvertError, ConvertOptions, ConvertResult};

use super::super::check_interrupted;
use super::super::signal::ExitCode;
use super::super::Cli;

pub(crate) fn cmd_batch(
    cli: &Cli,
    pattern: &str,
    output_dir: Option<&Path>,
    opts: &ConvertOptions,
) -> Result<()> {
    let _span = tracing::info_span!("cmd_batch", pattern).entered();

    let files = expand_pattern(pattern)?;
    if files.is_empty() {
        println!("No files match pattern: {}", pattern);
        return Ok(());
    }

    if let Some(dir) = output_dir {
        if !dir.exists() && !opts.dry_run {
            std::fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create output directory: {}", dir.display())
            })?;
            if !cli.quiet {
                println!("Created output directory: {}", dir.display());
            }
        }
    }

    let (jobs, rejected) = plan_outputs(&files, output_dir);

    if !cli.quiet {
        println!("Batch: converting {} file(s)", files.len());
    }

    let progress = if cli.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(jobs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|e| {
                    tracing::warn!("Progress template error: {}, using default", e);
                    ProgressStyle::default_bar()
                }),
        );
        pb
    };

    let mut outcomes: Vec<(PathBuf, Result<ConvertResult, ConvertError>)> = jobs
        .par_iter()
        .filter_map(|job| {
            if check_interrupted() {
                return None;
            }
            let result = convert_file(&job.input, Some(job.output.as_path()), opts);
            progress.inc(1);
            Some((job.input.clone(), result))
        })
        .collect();
    progress.finish_and_clear();
    let skipped = jobs.len() - outcomes.len();

    outcomes.extend(rejected.into_iter().map(|(file, err)| (file, Err(err))));
    outcomes.sort_by(|a, b| a.0.cmp(&b.0));

    let mut converted = 0;
    for (file, outcome) in &outcomes {
        match outcome {
            Ok(r) => {
                converted += 1;
                if !cli.quiet {
                    println!("  {} → {} ({} turns)", file.display(), r.output.display(), r.turns);
                }
            }
            Err(e) => {
                tracing::warn!(path = %file.display(), error = %e, "Failed to convert transcript");
                eprintln!("{} {}", "warning:".yellow().bold(), e);
            }
        }
    }

    let tally = format!("{}/{}", converted, files.len());
    let tally = if converted == files.len() {
        tally.green()
    } else {
        tally.yellow()
    };
    println!("Batch complete: {} file(s) converted", tally);

    if skipped > 0 {
        println!("Interrupted: {} file(s) not started", skipped);
        ExitCode::Interrupted.exit();
    }
    Ok(())
}

/// One input and the file it will be written to.
#[derive(Debug, PartialEq, Eq)]
struct BatchJob {
    input: PathBuf,
    output: PathBuf,
}

/// Assign each input its output path. The first input (in sorted order) to
/// claim a path keeps it; later ones are rejected with
/// [`ConvertError::DuplicateOutput`].
fn plan_outputs(
    files: &[PathBuf],
    output_dir: Option<&Path>,
) -> (Vec<BatchJob>, Vec<(PathBuf, ConvertError)>) {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    let mut jobs = Vec::with_capacity(files.len());
    let mut rejected = Vec::new();

    for file in files {
        let output = match output_dir {
            Some(dir) => output_path_in(dir, file),
            None => default_output_path(file),
        };
        if let Some(first) = claimed.get(&output) {
            tracing::warn!(
                output = %output.display(),
                first = %first.display(),
                second = %file.display(),
                "Batch inputs share an output file"
            );
            rejected.push((
                file.clone(),
                ConvertError::DuplicateOutput {
                    input: file.clone(),
                    output,
                    first: first.to_path_buf(),
                },
            ));
            continue;
        }
        claimed.insert(output.clone(), file.as_path());
        jobs.push(BatchJob {
            input: file.clone(),
            output,
        });
    }

    (jobs, rejected)
}
