//! In-memory coverage model. Raw per-line counters come in as
//! `RawFileCoverage`, get normalized into `FileReport`s, and roll up into a
//! `Report`. A finished test run wraps the report in a `RunReport`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize, Serializer};

/// Tag identifying the instrumentation that produced the raw counters.
pub const INSTRUMENTATION: &str = "node-jscoverage";

/// Hits as a percentage of executable lines.
///
/// No guard on `sloc == 0`: the result is NaN in that case. File reports
/// carry that value as-is; the report total guards it (see
/// [`Report`]).
#[must_use]
pub fn percent(hits: u64, sloc: u64) -> f64 {
    hits as f64 / sloc as f64 * 100.0
}

/// Raw counters for one instrumented source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFileCoverage {
    /// Source text, one entry per line, in file order.
    pub source: Vec<String>,
    /// 1-based line number → hit count. Lines missing here are not
    /// executable (blank lines, comments).
    #[serde(default)]
    pub hits: BTreeMap<u32, i64>,
}

impl RawFileCoverage {
    pub fn new<I, S>(source: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: source.into_iter().map(Into::into).collect(),
            hits: BTreeMap::new(),
        }
    }

    /// Builder-style helper to record a hit count for a line.
    #[must_use]
    pub fn with_hit(mut self, line_number: u32, count: i64) -> Self {
        self.hits.insert(line_number, count);
        self
    }

    pub fn hit(&self, line_number: u32) -> Option<i64> {
        self.hits.get(&line_number).copied()
    }
}

/// Raw counters for every instrumented file, keyed by filename.
pub type CoverageMap = HashMap<String, RawFileCoverage>;

/// Hit state of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineHits {
    /// No counter for this line.
    NotExecutable,
    /// Executable; the exact count as recorded (0 = never run).
    Count(i64),
}

impl LineHits {
    pub fn from_raw(raw: Option<i64>) -> Self {
        match raw {
            Some(count) => LineHits::Count(count),
            None => LineHits::NotExecutable,
        }
    }

    pub fn is_executable(&self) -> bool {
        matches!(self, LineHits::Count(_))
    }

    /// Executable and never run.
    pub fn is_miss(&self) -> bool {
        matches!(self, LineHits::Count(0))
    }

    /// Any executable line with a non-zero count, negative counts included.
    pub fn is_hit(&self) -> bool {
        matches!(self, LineHits::Count(n) if *n != 0)
    }

    /// Count as written to a `DA:` record; non-executable lines report 0.
    pub fn lcov_count(&self) -> i64 {
        match self {
            LineHits::Count(n) => *n,
            LineHits::NotExecutable => 0,
        }
    }
}

// Non-executable lines serialize as an empty string, counts as numbers.
impl Serialize for LineHits {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            LineHits::NotExecutable => serializer.serialize_str(""),
            LineHits::Count(n) => serializer.serialize_i64(*n),
        }
    }
}

/// One normalized source line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineEntry {
    #[serde(skip)]
    pub line_number: u32,
    pub source: String,
    #[serde(rename = "coverage")]
    pub hits: LineHits,
}

/// Per-file coverage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub filename: String,
    /// `hits / sloc * 100`; NaN for a file with no executable lines.
    pub coverage: f64,
    pub hits: u64,
    pub misses: u64,
    pub sloc: u64,
    /// Every source line keyed by line number, so iteration is ascending.
    pub source: BTreeMap<u32, LineEntry>,
}

impl FileReport {
    pub fn new(filename: String) -> Self {
        Self {
            filename,
            coverage: 0.0,
            hits: 0,
            misses: 0,
            sloc: 0,
            source: BTreeMap::new(),
        }
    }

    /// Executable lines that were never run, ascending.
    pub fn missed_lines(&self) -> Vec<u32> {
        self.source
            .values()
            .filter(|entry| entry.hits.is_miss())
            .map(|entry| entry.line_number)
            .collect()
    }
}

/// Coverage across every instrumented file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub instrumentation: String,
    pub sloc: u64,
    pub hits: u64,
    pub misses: u64,
    /// `hits / sloc * 100`, or exactly 0 when nothing is executable.
    pub coverage: f64,
    /// Sorted by filename.
    pub files: Vec<FileReport>,
}

impl Default for Report {
    fn default() -> Self {
        Self {
            instrumentation: INSTRUMENTATION.to_string(),
            sloc: 0,
            hits: 0,
            misses: 0,
            coverage: 0.0,
            files: Vec::new(),
        }
    }
}

impl Report {
    pub fn file(&self, filename: &str) -> Option<&FileReport> {
        self.files.iter().find(|f| f.filename == filename)
    }
}

/// Plain projection of a finished test, safe to keep after the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    pub title: String,
    #[serde(rename = "fullTitle")]
    pub full_title: String,
    #[serde(rename = "duration", default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

/// The result of a finished run: coverage plus test outcomes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    #[serde(flatten)]
    pub report: Report,
    /// Whatever run statistics the caller attached; not interpreted here.
    pub stats: Option<serde_json::Value>,
    pub tests: Vec<TestRecord>,
    pub failures: Vec<TestRecord>,
    pub passes: Vec<TestRecord>,
}
