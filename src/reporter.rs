//! The LCOV reporter: collects test outcomes during a run and, when the run
//! ends, builds the coverage report and writes it out as LCOV.
//!
//! Lifecycle: constructing the reporter subscribes it to the event source
//! (collecting). The first `end` notification whose coverage snapshot
//! succeeds finalizes it. Any later `end` is rejected with [`CovReportError::AlreadyFinalized`] so LCOV output is
//! never written twice.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use tracing::{info, warn};

use crate::aggregate::map_report;
use crate::collector::{TestRecordCollector, TestRecords};
use crate::error::{CovReportError, Result};
use crate::events::{EventKind, EventSource, RunEvent};
use crate::lcov;
use crate::model::{CoverageMap, RunReport};
use crate::source::CoverageSource;
use crate::stats::StatsCollector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReporterOptions {
    /// Write LCOV to the sink when the run ends. When off, only the
    /// in-memory [`RunReport`] is produced.
    pub emit_output: bool,
}

impl Default for ReporterOptions {
    fn default() -> Self {
        Self { emit_output: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Collecting,
    Finalized,
}

enum Stats {
    Unset,
    Fixed(serde_json::Value),
    Tracked(StatsCollector),
}

impl Stats {
    fn resolve(&self) -> Option<serde_json::Value> {
        match self {
            Stats::Unset => None,
            Stats::Fixed(value) => Some(value.clone()),
            Stats::Tracked(collector) => Some(collector.to_value()),
        }
    }
}

struct State {
    options: ReporterOptions,
    phase: Phase,
    stats: Stats,
    source: Box<dyn CoverageSource>,
    sink: Box<dyn Write>,
    result: Option<RunReport>,
}

impl State {
    fn finalize(&mut self, records: TestRecords) -> Result<()> {
        if self.phase == Phase::Finalized {
            return Err(CovReportError::AlreadyFinalized);
        }

        // A failed snapshot leaves the reporter collecting, so a later `end`
        // can still finalize it.
        let cov = self.source.snapshot()?.unwrap_or_else(|| {
            warn!("No coverage data available; reporting an empty report");
            CoverageMap::new()
        });
        self.phase = Phase::Finalized;
        let report = map_report(&cov);

        info!(
            files = report.files.len(),
            sloc = report.sloc,
            hits = report.hits,
            coverage = report.coverage,
            tests = records.tests.len(),
            "Run finished"
        );

        let run = self.result.insert(RunReport {
            report,
            stats: self.stats.resolve(),
            tests: records.tests,
            failures: records.failures,
            passes: records.passes,
        });

        if self.options.emit_output {
            lcov::write_report(&mut self.sink, &run.report)?;
            self.sink.flush()?;
        }

        Ok(())
    }
}

/// Handle to a reporter subscribed to a run.
pub struct LcovReporter {
    collector: TestRecordCollector,
    state: Rc<RefCell<State>>,
}

impl LcovReporter {
    /// Subscribe a reporter to `events`. Coverage is read from `source` and
    /// LCOV is written to `sink` when the run ends.
    pub fn new<E, C, W>(events: &mut E, source: C, sink: W, options: ReporterOptions) -> Self
    where
        E: EventSource + ?Sized,
        C: CoverageSource + 'static,
        W: Write + 'static,
    {
        let collector = TestRecordCollector::attach(events);
        let state = Rc::new(RefCell::new(State {
            options,
            phase: Phase::Collecting,
            stats: Stats::Unset,
            source: Box::new(source),
            sink: Box::new(sink),
            result: None,
        }));

        let on_end = {
            let collector = collector.clone();
            let state = Rc::clone(&state);
            move |_: &RunEvent<'_>| state.borrow_mut().finalize(collector.snapshot())
        };
        events.on(EventKind::End, Box::new(on_end));

        Self { collector, state }
    }

    /// Reporter writing LCOV to standard output.
    pub fn stdout<E, C>(events: &mut E, source: C, options: ReporterOptions) -> Self
    where
        E: EventSource + ?Sized,
        C: CoverageSource + 'static,
    {
        Self::new(events, source, io::stdout(), options)
    }

    /// Attach a fixed stats value to the report. Not inspected.
    pub fn set_stats(&self, stats: serde_json::Value) {
        self.state.borrow_mut().stats = Stats::Fixed(stats);
    }

    /// Read stats from `collector` when the run ends.
    pub fn track_stats(&self, collector: &StatsCollector) {
        self.state.borrow_mut().stats = Stats::Tracked(collector.clone());
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    pub fn options(&self) -> ReporterOptions {
        self.state.borrow().options
    }

    /// Tests recorded so far.
    pub fn records(&self) -> TestRecords {
        self.collector.snapshot()
    }

    /// The finished report, once the run has ended.
    pub fn result(&self) -> Option<RunReport> {
        self.state.borrow().result.clone()
    }
}
