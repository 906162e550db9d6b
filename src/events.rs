//! Test-run notifications and a synchronous publish/subscribe bus.
//!
//! A test runner announces each finished test (`test end`), its outcome
//! (`pass` / `fail`), and finally the end of the run (`end`). Subscribers are
//! called in registration order, on the emitting thread, before `emit`
//! returns.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{CovReportError, Result};

/// What a reporter needs to know about a finished test.
pub trait TestInfo {
    fn title(&self) -> &str;

    /// Title including every enclosing suite.
    fn full_title(&self) -> String;

    /// Run time in milliseconds, if the runner measured it.
    fn duration(&self) -> Option<f64>;
}

/// A test whose titles are already resolved.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestCase {
    pub title: String,
    #[serde(rename = "fullTitle")]
    pub full_title: String,
    #[serde(default)]
    pub duration: Option<f64>,
}

impl TestCase {
    pub fn new(title: &str, full_title: &str, duration: Option<f64>) -> Self {
        Self {
            title: title.to_string(),
            full_title: full_title.to_string(),
            duration,
        }
    }
}

impl TestInfo for TestCase {
    fn title(&self) -> &str {
        &self.title
    }

    fn full_title(&self) -> String {
        self.full_title.clone()
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }
}

/// Notification names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TestEnd,
    Pass,
    Fail,
    End,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::TestEnd => "test end",
            EventKind::Pass => "pass",
            EventKind::Fail => "fail",
            EventKind::End => "end",
        }
    }
}

impl FromStr for EventKind {
    type Err = CovReportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "test end" => Ok(EventKind::TestEnd),
            "pass" => Ok(EventKind::Pass),
            "fail" => Ok(EventKind::Fail),
            "end" => Ok(EventKind::End),
            _ => Err(CovReportError::Other(format!(
                "Unknown event: '{}'. Supported: test end, pass, fail, end",
                s
            ))),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification with its payload.
#[derive(Clone, Copy)]
pub enum RunEvent<'a> {
    TestEnd(&'a dyn TestInfo),
    Pass(&'a dyn TestInfo),
    Fail(&'a dyn TestInfo),
    End,
}

impl<'a> RunEvent<'a> {
    pub fn kind(&self) -> EventKind {
        match self {
            RunEvent::TestEnd(_) => EventKind::TestEnd,
            RunEvent::Pass(_) => EventKind::Pass,
            RunEvent::Fail(_) => EventKind::Fail,
            RunEvent::End => EventKind::End,
        }
    }

    pub fn test(&self) -> Option<&'a dyn TestInfo> {
        match *self {
            RunEvent::TestEnd(t) | RunEvent::Pass(t) | RunEvent::Fail(t) => Some(t),
            RunEvent::End => None,
        }
    }

    /// Build the event for `kind` carrying `test`. `End` ignores the test.
    pub fn with_test(kind: EventKind, test: &'a dyn TestInfo) -> Self {
        match kind {
            EventKind::TestEnd => RunEvent::TestEnd(test),
            EventKind::Pass => RunEvent::Pass(test),
            EventKind::Fail => RunEvent::Fail(test),
            EventKind::End => RunEvent::End,
        }
    }
}

impl fmt::Debug for RunEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.test() {
            Some(test) => write!(f, "{}({:?})", self.kind(), test.title()),
            None => f.write_str(self.kind().as_str()),
        }
    }
}

/// Callback invoked for every notification of the kind it was registered for.
pub type Handler = Box<dyn FnMut(&RunEvent<'_>) -> Result<()>>;

/// Anything reporters can subscribe to.
pub trait EventSource {
    fn on(&mut self, kind: EventKind, handler: Handler);
}

/// In-process event bus.
#[derive(Default)]
pub struct Runner {
    handlers: Vec<(EventKind, Handler)>,
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every matching handler in registration order.
    /// The first handler error stops delivery and is returned.
    pub fn emit(&mut self, event: &RunEvent<'_>) -> Result<()> {
        let kind = event.kind();
        for (registered, handler) in self.handlers.iter_mut() {
            if *registered == kind {
                handler(event)?;
            }
        }
        Ok(())
    }

    /// Number of handlers registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.handlers.iter().filter(|(k, _)| *k == kind).count()
    }
}

impl EventSource for Runner {
    fn on(&mut self, kind: EventKind, handler: Handler) {
        self.handlers.push((kind, handler));
    }
}
