//! Accumulates finished tests as plain records while a run is in progress.

use std::cell::RefCell;
use std::rc::Rc;

use crate::events::{EventKind, EventSource, RunEvent, TestInfo};
use crate::model::TestRecord;

impl TestRecord {
    /// Project a live test object down to the fields worth keeping.
    pub fn from_test(test: &dyn TestInfo) -> Self {
        Self {
            title: test.title().to_string(),
            full_title: test.full_title(),
            duration_ms: test.duration(),
        }
    }
}

/// The three record lists, each in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestRecords {
    /// Every finished test, whatever its outcome.
    pub tests: Vec<TestRecord>,
    pub failures: Vec<TestRecord>,
    pub passes: Vec<TestRecord>,
}

impl TestRecords {
    fn push(&mut self, kind: EventKind, record: TestRecord) {
        match kind {
            EventKind::TestEnd => self.tests.push(record),
            EventKind::Pass => self.passes.push(record),
            EventKind::Fail => self.failures.push(record),
            EventKind::End => {}
        }
    }
}

/// Subscribes to `test end`, `pass` and `fail` and records each test.
///
/// Lists belong to this collector; two collectors on the same source keep
/// separate copies.
#[derive(Debug, Clone, Default)]
pub struct TestRecordCollector {
    records: Rc<RefCell<TestRecords>>,
}

impl TestRecordCollector {
    /// Create a collector and register its handlers with `source`.
    pub fn attach<S: EventSource + ?Sized>(source: &mut S) -> Self {
        let collector = Self::default();
        for kind in [EventKind::TestEnd, EventKind::Pass, EventKind::Fail] {
            let records = Rc::clone(&collector.records);
            source.on(
                kind,
                Box::new(move |event: &RunEvent<'_>| {
                    if let Some(test) = event.test() {
                        records
                            .borrow_mut()
                            .push(event.kind(), TestRecord::from_test(test));
                    }
                    Ok(())
                }),
            );
        }
        collector
    }

    /// Copy of the lists collected so far.
    pub fn snapshot(&self) -> TestRecords {
        self.records.borrow().clone()
    }

    /// Number of `test end` records; outcome lists are not counted.
    pub fn finished_count(&self) -> usize {
        self.records.borrow().tests.len()
    }

    /// True when none of the three lists has a record.
    pub fn is_empty(&self) -> bool {
        let records = self.records.borrow();
        records.tests.is_empty() && records.passes.is_empty() && records.failures.is_empty()
    }
}
