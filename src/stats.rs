//! Run statistics: counts and timing for one run, gathered from the same
//! notifications the reporter listens to.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::events::{EventKind, EventSource, RunEvent};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub tests: u64,
    pub passes: u64,
    pub failures: u64,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    /// Wall-clock run time in milliseconds, set once the run ends.
    pub duration: Option<i64>,
}

impl RunStats {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            tests: 0,
            passes: 0,
            failures: 0,
            start,
            end: None,
            duration: None,
        }
    }

    fn record(&mut self, kind: EventKind) {
        match kind {
            EventKind::TestEnd => self.tests += 1,
            EventKind::Pass => self.passes += 1,
            EventKind::Fail => self.failures += 1,
            EventKind::End => {
                let end = Utc::now();
                self.duration = Some((end - self.start).num_milliseconds());
                self.end = Some(end);
            }
        }
    }
}

/// Counts notifications as they arrive. Attach it before any reporter that
/// reads it, so its `end` handler runs first.
#[derive(Debug, Clone)]
pub struct StatsCollector {
    stats: Rc<RefCell<RunStats>>,
}

impl StatsCollector {
    pub fn attach<S: EventSource + ?Sized>(source: &mut S) -> Self {
        let collector = Self {
            stats: Rc::new(RefCell::new(RunStats::new(Utc::now()))),
        };
        for kind in [EventKind::TestEnd, EventKind::Pass, EventKind::Fail, EventKind::End] {
            let stats = Rc::clone(&collector.stats);
            source.on(
                kind,
                Box::new(move |event: &RunEvent<'_>| {
                    stats.borrow_mut().record(event.kind());
                    Ok(())
                }),
            );
        }
        collector
    }

    pub fn snapshot(&self) -> RunStats {
        self.stats.borrow().clone()
    }

    pub fn to_value(&self) -> serde_json::Value {
        // A struct of numbers and timestamps always serializes.
        serde_json::to_value(&*self.stats.borrow()).unwrap_or_default()
    }
}
