//! Command handler functions for the covreport CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout. The one exception is LCOV written to
//! stdout, which goes straight through the reporter's sink.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::events::Runner;
use crate::model::RunReport;
use crate::report;
use crate::reporter::{LcovReporter, ReporterOptions};
use crate::source::{CoverageSource, JsonCoverageFile};
use crate::stats::StatsCollector;
use crate::{aggregate, replay};

/// Run a reporter over the coverage dump at `coverage`, replaying the
/// optional event log, and return the finished report.
pub fn run_reporter<W: Write + 'static>(
    coverage: &Path,
    events: Option<&Path>,
    sink: W,
    options: ReporterOptions,
) -> Result<RunReport> {
    let recorded = match events {
        Some(path) => {
            let content = std::fs::read(path)
                .with_context(|| format!("Failed to read event log {}", path.display()))?;
            replay::parse(&content)
                .with_context(|| format!("Invalid event log {}", path.display()))?
        }
        None => Vec::new(),
    };

    let mut runner = Runner::new();
    let stats = StatsCollector::attach(&mut runner);
    let reporter = LcovReporter::new(&mut runner, JsonCoverageFile::new(coverage), sink, options);
    reporter.track_stats(&stats);

    replay::replay(&mut runner, &recorded)
        .with_context(|| format!("Failed to report coverage from {}", coverage.display()))?;

    reporter
        .result()
        .context("Run ended without producing a report")
}

/// Write LCOV to `output`, or to stdout when no output file is given.
pub fn cmd_lcov(coverage: &Path, events: Option<&Path>, output: Option<&Path>) -> Result<String> {
    let options = ReporterOptions::default();
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let run = run_reporter(coverage, events, BufWriter::new(file), options)?;
            Ok(format!(
                "Wrote LCOV for {} files to {} ({})\n",
                run.report.files.len(),
                path.display(),
                report::format_percent(run.report.coverage),
            ))
        }
        None => {
            run_reporter(coverage, events, io::stdout(), options)?;
            Ok(String::new())
        }
    }
}

pub fn cmd_summary(coverage: &Path, events: Option<&Path>) -> Result<String> {
    let run = run_reporter(coverage, events, io::sink(), ReporterOptions { emit_output: false })?;
    Ok(report::format_summary(&run))
}

pub fn cmd_json(coverage: &Path, events: Option<&Path>) -> Result<String> {
    let run = run_reporter(coverage, events, io::sink(), ReporterOptions { emit_output: false })?;
    let mut out = serde_json::to_string_pretty(&run)?;
    out.push('\n');
    Ok(out)
}

/// List missed line ranges for one file. Reads the coverage dump directly;
/// no test run is involved.
pub fn cmd_uncovered(coverage: &Path, source_file: &str) -> Result<String> {
    let cov = JsonCoverageFile::new(coverage)
        .snapshot()?
        .unwrap_or_default();
    let raw = cov
        .get(source_file)
        .with_context(|| format!("No coverage data for '{}'", source_file))?;
    let file = aggregate::map_file(source_file, raw);

    let ranges = report::missed_ranges(&file);
    if ranges.is_empty() {
        return Ok(format!(
            "All executable lines are covered in '{}'\n",
            source_file
        ));
    }

    Ok(format!(
        "Uncovered lines in '{}':\n  {}\n  ({} lines)\n",
        source_file,
        report::format_line_ranges(&ranges),
        file.misses
    ))
}
