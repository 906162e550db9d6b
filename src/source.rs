//! Where raw coverage counters come from.
//!
//! The reporter asks its source exactly once, when the run ends. A source
//! with nothing instrumented answers `Ok(None)`, which is reported as an
//! empty report rather than an error.

use std::path::{Path, PathBuf};

use crate::error::{CovReportError, Result};
use crate::model::CoverageMap;

/// Provides a snapshot of the raw per-file counters.
pub trait CoverageSource {
    fn snapshot(&self) -> Result<Option<CoverageMap>>;
}

/// Any closure returning the counters works as a source.
impl<F> CoverageSource for F
where
    F: Fn() -> Option<CoverageMap>,
{
    fn snapshot(&self) -> Result<Option<CoverageMap>> {
        Ok(self())
    }
}

/// Counters already held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCoverage(pub Option<CoverageMap>);

impl StaticCoverage {
    /// A source for a run where nothing was instrumented.
    pub fn absent() -> Self {
        Self(None)
    }
}

impl From<CoverageMap> for StaticCoverage {
    fn from(cov: CoverageMap) -> Self {
        Self(Some(cov))
    }
}

impl CoverageSource for StaticCoverage {
    fn snapshot(&self) -> Result<Option<CoverageMap>> {
        Ok(self.0.clone())
    }
}

/// A JSON dump of the counters on disk, read when the snapshot is taken.
///
/// The document is an object keyed by filename:
///
/// ```json
/// { "lib/a.js": { "source": ["x = 1;", "// note"], "hits": { "1": 3 } } }
/// ```
///
/// A `null` document means nothing was instrumented.
#[derive(Debug, Clone)]
pub struct JsonCoverageFile {
    path: PathBuf,
}

impl JsonCoverageFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CoverageSource for JsonCoverageFile {
    fn snapshot(&self) -> Result<Option<CoverageMap>> {
        let content = std::fs::read(&self.path)?;
        parse(&content).map_err(|e| {
            CovReportError::Source(format!("{}: {}", self.path.display(), e))
        })
    }
}

/// Parse a JSON coverage dump. Empty or `null` input yields `None`.
pub fn parse(input: &[u8]) -> Result<Option<CoverageMap>> {
    if input.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(None);
    }
    Ok(serde_json::from_slice(input)?)
}
