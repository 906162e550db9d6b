#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use covreport::events::TestInfo;
use covreport::model::{CoverageMap, RawFileCoverage};

/// In-memory sink that stays readable after being handed to a reporter.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A test nested in suites, with the full title computed on demand.
pub struct NestedTest {
    pub suites: Vec<String>,
    pub title: String,
    pub duration: Option<f64>,
}

impl NestedTest {
    pub fn new(suites: &[&str], title: &str, duration: Option<f64>) -> Self {
        Self {
            suites: suites.iter().map(|s| s.to_string()).collect(),
            title: title.to_string(),
            duration,
        }
    }
}

impl TestInfo for NestedTest {
    fn title(&self) -> &str {
        &self.title
    }

    fn full_title(&self) -> String {
        let mut parts = self.suites.clone();
        parts.push(self.title.clone());
        parts.join(" ")
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }
}

/// `a.js`: two executable lines, one hit, one missed.
pub fn a_js() -> RawFileCoverage {
    RawFileCoverage::new(["x=1;", "y=2;"])
        .with_hit(1, 1)
        .with_hit(2, 0)
}

/// `b.js`: comments only, nothing executable.
pub fn b_js() -> RawFileCoverage {
    RawFileCoverage::new(["// just", "// comments"])
}

pub fn coverage(files: &[(&str, RawFileCoverage)]) -> CoverageMap {
    files
        .iter()
        .map(|(name, raw)| (name.to_string(), raw.clone()))
        .collect()
}
