//! Human-readable output for a finished run.

use std::fmt::Write;

use crate::model::{FileReport, RunReport};

/// Lines without a counter (blanks, comments) that may sit inside one
/// uncovered range.
const MAX_BRIDGE_GAP: u32 = 2;

/// Uncovered lines of `file` as inclusive `(first, last)` line spans.
///
/// A missed line extends the current span when everything between the two is
/// non-executable and at most [`MAX_BRIDGE_GAP`] lines long; a hit line or a
/// longer stretch starts a new span.
#[must_use]
pub fn missed_ranges(file: &FileReport) -> Vec<(u32, u32)> {
    let mut ranges: Vec<(u32, u32)> = Vec::new();

    for line in file.missed_lines() {
        if let Some((_, last)) = ranges.last_mut() {
            if joins_span(file, *last, line) {
                *last = line;
                continue;
            }
        }
        ranges.push((line, line));
    }

    ranges
}

// Whether `next` continues a span that currently ends at `last`.
fn joins_span(file: &FileReport, last: u32, next: u32) -> bool {
    next - last - 1 <= MAX_BRIDGE_GAP
        && (last + 1..next)
            .filter_map(|n| file.source.get(&n))
            .all(|entry| !entry.hits.is_executable())
}

/// Format ranges in compact notation, e.g. "1, 3-5, 8".
#[must_use]
pub fn format_line_ranges(ranges: &[(u32, u32)]) -> String {
    ranges
        .iter()
        .map(|&(start, end)| {
            if start == end {
                start.to_string()
            } else {
                format!("{start}-{end}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Percentage with one decimal, or "n/a" for a file with nothing executable.
#[must_use]
pub fn format_percent(pct: f64) -> String {
    if pct.is_nan() {
        "n/a".to_string()
    } else {
        format!("{pct:.1}%")
    }
}

/// Plain text summary: totals, a per-file table, and test outcomes.
#[must_use]
pub fn format_summary(run: &RunReport) -> String {
    let mut out = String::new();

    writeln!(out, "Files:      {}", run.report.files.len()).unwrap();
    writeln!(
        out,
        "Lines:      {}/{} ({})",
        run.report.hits,
        run.report.sloc,
        format_percent(run.report.coverage)
    )
    .unwrap();
    writeln!(
        out,
        "Tests:      {} ({} passed, {} failed)",
        run.tests.len(),
        run.passes.len(),
        run.failures.len()
    )
    .unwrap();

    if !run.report.files.is_empty() {
        out.push('\n');
        writeln!(
            out,
            "{:<60} {:>8} {:>8} {:>8}",
            "FILE", "SLOC", "HITS", "RATE"
        )
        .unwrap();
        writeln!(out, "{}", "-".repeat(88)).unwrap();
        for f in &run.report.files {
            writeln!(
                out,
                "{:<60} {:>8} {:>8} {:>8}",
                f.filename,
                f.sloc,
                f.hits,
                format_percent(f.coverage)
            )
            .unwrap();
        }
    }

    if !run.failures.is_empty() {
        out.push('\n');
        writeln!(out, "Failures:").unwrap();
        for t in &run.failures {
            writeln!(out, "  {}", t.full_title).unwrap();
        }
    }

    out
}
