//! Turns raw per-line counters into the normalized coverage model.
//!
//! Aggregation is two-level: lines roll up into a [`FileReport`], files roll
//! up into a [`Report`]. The two levels treat an empty denominator
//! differently: a file with no executable lines gets a NaN percentage, while
//! a report with no executable lines gets exactly 0.

use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions};
use tracing::{debug, warn};

use crate::model::{percent, CoverageMap, FileReport, LineEntry, LineHits, RawFileCoverage, Report};

/// Normalize one source line. `raw` is `None` when the line has no counter.
#[must_use]
pub fn map_line(line_number: u32, source: &str, raw: Option<i64>) -> LineEntry {
    LineEntry {
        line_number,
        source: source.to_string(),
        hits: LineHits::from_raw(raw),
    }
}

/// Normalize every line of one file and total it up.
#[must_use]
pub fn map_file(filename: &str, raw: &RawFileCoverage) -> FileReport {
    let mut file = FileReport::new(filename.to_string());

    for (line_number, text) in (1u32..).zip(raw.source.iter()) {
        let entry = map_line(line_number, text, raw.hit(line_number));

        if entry.hits.is_miss() {
            file.misses += 1;
            file.sloc += 1;
        } else if entry.hits.is_executable() {
            file.hits += 1;
            file.sloc += 1;
        }

        file.source.insert(line_number, entry);
    }

    file.coverage = percent(file.hits, file.sloc);

    debug!(
        file = %file.filename,
        sloc = file.sloc,
        hits = file.hits,
        misses = file.misses,
        "Mapped file coverage"
    );

    file
}

/// Build the full report from every instrumented file.
#[must_use]
pub fn map_report(cov: &CoverageMap) -> Report {
    let mut report = Report::default();

    for (filename, raw) in cov {
        let file = map_file(filename, raw);
        report.hits += file.hits;
        report.misses += file.misses;
        report.sloc += file.sloc;
        report.files.push(file);
    }

    let order = FilenameOrder::new();
    report
        .files
        .sort_by(|a, b| order.compare(&a.filename, &b.filename));

    if report.sloc > 0 {
        report.coverage = percent(report.hits, report.sloc);
    }

    report
}

/// Filename ordering under the root locale's collation rules.
///
/// Letters compare by base letter first, so accents and case only break
/// ties, with lowercase ahead of uppercase. Punctuation is significant and
/// sorts before digits and letters (`_` before `-` before `.` before `/`).
/// Strings the collation treats as equal fall back to code point order, so
/// only identical names compare equal.
pub struct FilenameOrder {
    collator: Option<Collator>,
}

impl FilenameOrder {
    pub fn new() -> Self {
        let collator = match Collator::try_new(&Default::default(), CollatorOptions::new()) {
            Ok(collator) => Some(collator),
            Err(e) => {
                warn!(error = %e, "Root collation unavailable; sorting filenames by code point");
                None
            }
        };
        Self { collator }
    }

    #[must_use]
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let collated = match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => Ordering::Equal,
        };
        collated.then_with(|| a.cmp(b))
    }
}

impl Default for FilenameOrder {
    fn default() -> Self {
        Self::new()
    }
}

/// One-off comparison with [`FilenameOrder`]. Sorting many names should
/// build the order once instead.
#[must_use]
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    FilenameOrder::new().compare(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawFileCoverage {
        RawFileCoverage::new(["x=1;", "y=2;"])
            .with_hit(1, 1)
            .with_hit(2, 0)
    }

    #[test]
    fn test_map_line_absent_is_not_executable() {
        let entry = map_line(3, "// comment", None);
        assert_eq!(entry.line_number, 3);
        assert_eq!(entry.source, "// comment");
        assert_eq!(entry.hits, LineHits::NotExecutable);
    }

    #[test]
    fn test_map_line_keeps_exact_count() {
        assert_eq!(map_line(1, "x", Some(42)).hits, LineHits::Count(42));
        assert_eq!(map_line(1, "x", Some(0)).hits, LineHits::Count(0));
    }

    #[test]
    fn test_map_file_totals() {
        let file = map_file("a.js", &sample());
        assert_eq!(file.filename, "a.js");
        assert_eq!(file.sloc, 2);
        assert_eq!(file.hits, 1);
        assert_eq!(file.misses, 1);
        assert_eq!(file.coverage, 50.0);
        assert_eq!(file.source.len(), 2);
        assert_eq!(file.source[&1].hits, LineHits::Count(1));
        assert_eq!(file.source[&2].hits, LineHits::Count(0));
    }

    #[test]
    fn test_map_file_skips_non_executable_lines() {
        let raw = RawFileCoverage::new(["// header", "", "run();", "// end"]).with_hit(3, 4);
        let file = map_file("c.js", &raw);
        assert_eq!(file.sloc, 1);
        assert_eq!(file.hits, 1);
        assert_eq!(file.misses, 0);
        assert_eq!(file.coverage, 100.0);
        // Non-executable lines are still part of the line mapping.
        assert_eq!(file.source.len(), 4);
        assert_eq!(file.source[&1].hits, LineHits::NotExecutable);
    }

    #[test]
    fn test_map_file_negative_count_counts_as_hit() {
        let raw = RawFileCoverage::new(["weird();"]).with_hit(1, -1);
        let file = map_file("w.js", &raw);
        assert_eq!(file.hits, 1);
        assert_eq!(file.misses, 0);
        assert_eq!(file.source[&1].hits, LineHits::Count(-1));
    }

    #[test]
    fn test_map_file_without_executable_lines_is_nan() {
        let raw = RawFileCoverage::new(["/* only */", "/* comments */"]);
        let file = map_file("b.js", &raw);
        assert_eq!(file.sloc, 0);
        assert_eq!(file.hits, 0);
        assert_eq!(file.misses, 0);
        assert!(file.coverage.is_nan());
    }

    #[test]
    fn test_map_file_ignores_counters_past_end_of_source() {
        let raw = RawFileCoverage::new(["a();"]).with_hit(1, 1).with_hit(5, 3);
        let file = map_file("short.js", &raw);
        assert_eq!(file.sloc, 1);
        assert_eq!(file.source.len(), 1);
    }

    #[test]
    fn test_map_report_empty_is_zero() {
        let report = map_report(&CoverageMap::new());
        assert_eq!(report.sloc, 0);
        assert_eq!(report.hits, 0);
        assert_eq!(report.misses, 0);
        assert_eq!(report.coverage, 0.0);
        assert!(report.files.is_empty());
    }

    #[test]
    fn test_map_report_sorts_and_totals() {
        let mut cov = CoverageMap::new();
        cov.insert("b.js".to_string(), RawFileCoverage::new(["// nothing"]));
        cov.insert("a.js".to_string(), sample());
        cov.insert(
            "lib/c.js".to_string(),
            RawFileCoverage::new(["f();", "g();"]).with_hit(1, 2).with_hit(2, 9),
        );

        let report = map_report(&cov);
        let names: Vec<&str> = report.files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, ["a.js", "b.js", "lib/c.js"]);
        assert_eq!(report.sloc, 4);
        assert_eq!(report.hits, 3);
        assert_eq!(report.misses, 1);
        assert_eq!(report.coverage, 75.0);
    }

    #[test]
    fn test_locale_cmp_is_case_insensitive() {
        let mut names = vec!["Zeta.js", "alpha.js", "Beta.js", "beta.js"];
        names.sort_by(|a, b| locale_cmp(a, b));
        assert_eq!(names, ["alpha.js", "beta.js", "Beta.js", "Zeta.js"]);
    }

    #[test]
    fn test_filename_order_punctuation_and_accents() {
        let mut names = vec![
            "lib/x.js",
            "foo.js",
            "f.js",
            "lib.js",
            "\u{e9}.js",
            "foo-bar.js",
            "b.js",
            "lib_x.js",
            "foo_bar.js",
        ];
        let order = FilenameOrder::new();
        names.sort_by(|a, b| order.compare(a, b));
        assert_eq!(
            names,
            [
                "b.js",
                "\u{e9}.js",
                "f.js",
                "foo_bar.js",
                "foo-bar.js",
                "foo.js",
                "lib_x.js",
                "lib.js",
                "lib/x.js",
            ]
        );
    }

    #[test]
    fn test_map_report_orders_by_collation() {
        let cov: CoverageMap = ["foo.js", "foo-bar.js", "lib/x.js", "foo_bar.js", "lib.js"]
            .into_iter()
            .map(|name| (name.to_string(), sample()))
            .collect();
        let report = map_report(&cov);
        let names: Vec<&str> = report.files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, ["foo_bar.js", "foo-bar.js", "foo.js", "lib.js", "lib/x.js"]);
    }

    #[test]
    fn test_locale_cmp_equal_only_for_identical() {
        assert_eq!(locale_cmp("a.js", "a.js"), Ordering::Equal);
        assert_ne!(locale_cmp("a.js", "A.js"), Ordering::Equal);
    }
}
