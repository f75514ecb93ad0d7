use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use csv_splitter::{
    PlannedChunk, SplitConfig, SplitError, SplitErrorKind, SplitResult, Splitter,
    DEFAULT_NUM_SPLITS,
};

#[derive(Parser, Debug)]
#[command(name = "csvsplit")]
#[command(about = "Split a CSV file into N contiguous row chunks", long_about = None)]
struct Cli {
    /// CSV file to split (must have a header row)
    input: PathBuf,

    /// Number of parts to split into
    #[arg(default_value_t = DEFAULT_NUM_SPLITS)]
    num_splits: usize,

    /// Write part files here instead of next to the input
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Show the planned parts without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

/// How a CLI invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Failed(SplitErrorKind),
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            // Same code clap uses for usage errors
            Outcome::Failed(SplitErrorKind::InvalidInput) => ExitCode::from(2),
            Outcome::Failed(_) => ExitCode::FAILURE,
        }
    }
}

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let stderr = io::stderr();
    let outcome = execute(&cli, &mut stdout.lock(), &mut stderr.lock())?;
    Ok(outcome.into())
}

/// Runs the command, writing the report to `out` and, in text mode, error
/// presentations to `err`. `Err` is reserved for failures to write output.
fn execute(cli: &Cli, out: &mut impl Write, err: &mut impl Write) -> Result<Outcome> {
    let mut config = SplitConfig::new(cli.num_splits);
    if let Some(dir) = &cli.output_dir {
        config = config.output_dir(dir);
    }
    let splitter = Splitter::new(config);

    if cli.dry_run {
        match splitter.plan(&cli.input) {
            Ok(chunks) => report_plan(&chunks, cli.json, out),
            Err(e) => report_error(&e, cli.json, out, err),
        }
    } else {
        match splitter.run(&cli.input) {
            Ok(result) => report_split(&result, cli.json, out),
            Err(e) => report_error(&e, cli.json, out, err),
        }
    }
}

/// Prints the error's presentation: as JSON on `out` with `--json`,
/// otherwise as text on `err`.
fn report_error(
    error: &SplitError,
    json: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<Outcome> {
    if json {
        serde_json::to_writer_pretty(&mut *out, error)?;
        writeln!(out)?;
    } else {
        let presentation = error.to_presentation();
        writeln!(err, "Error: {}: {}", presentation.title, presentation.message)?;
        if let Some(action) = presentation.action {
            writeln!(err, "Hint: {}", action)?;
        }
    }
    Ok(Outcome::Failed(error.kind()))
}

fn report_split(result: &SplitResult, json: bool, out: &mut impl Write) -> Result<Outcome> {
    if json {
        serde_json::to_writer_pretty(&mut *out, result)?;
        writeln!(out)?;
        return Ok(Outcome::Success);
    }

    if result.output_paths.is_empty() {
        writeln!(out, "No data rows to split; no files were created.")?;
        return Ok(Outcome::Success);
    }

    writeln!(
        out,
        "Successfully split into {} files:",
        result.output_paths.len()
    )?;
    for path in &result.output_paths {
        writeln!(out, "- {}", path.display())?;
    }
    Ok(Outcome::Success)
}

fn report_plan(chunks: &[PlannedChunk], json: bool, out: &mut impl Write) -> Result<Outcome> {
    if json {
        serde_json::to_writer_pretty(&mut *out, chunks)?;
        writeln!(out)?;
        return Ok(Outcome::Success);
    }

    let total_rows: usize = chunks.iter().map(PlannedChunk::rows).sum();
    writeln!(
        out,
        "Would split {} rows into {} files:",
        total_rows,
        chunks.len()
    )?;
    for chunk in chunks {
        writeln!(
            out,
            "- {} (rows {}..{})",
            chunk.path.display(),
            chunk.start_row,
            chunk.end_row
        )?;
    }
    Ok(Outcome::Success)
}
