//! Replays a recorded test run through a [`Runner`].
//!
//! The log is a JSON array of finished-test notifications in the order they
//! were emitted:
//!
//! ```json
//! [
//!   { "event": "pass", "title": "works", "fullTitle": "Suite works", "duration": 5 },
//!   { "event": "test end", "title": "works", "fullTitle": "Suite works", "duration": 5 }
//! ]
//! ```
//!
//! The terminal `end` notification is not part of the log; [`replay`] sends
//! it after the last entry.

use serde::Deserialize;
use tracing::debug;

use crate::error::{CovReportError, Result};
use crate::events::{EventKind, RunEvent, Runner, TestCase};

#[derive(Debug, Clone, Deserialize)]
pub struct RecordedEvent {
    pub event: String,
    #[serde(flatten)]
    pub test: TestCase,
}

impl RecordedEvent {
    pub fn kind(&self) -> Result<EventKind> {
        match self.event.parse::<EventKind>()? {
            EventKind::End => Err(CovReportError::Other(
                "'end' is sent by the replay itself and must not appear in the log".to_string(),
            )),
            kind => Ok(kind),
        }
    }
}

/// Parse an event log. Empty input is an empty run.
pub fn parse(input: &[u8]) -> Result<Vec<RecordedEvent>> {
    if input.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_slice(input)?)
}

/// Emit every recorded event in order, then `end`.
///
/// All entries are validated before anything is emitted.
pub fn replay(runner: &mut Runner, events: &[RecordedEvent]) -> Result<()> {
    let kinds = events
        .iter()
        .map(RecordedEvent::kind)
        .collect::<Result<Vec<_>>>()?;

    for (kind, recorded) in kinds.into_iter().zip(events) {
        debug!(event = %kind, title = %recorded.test.title, "Replaying event");
        runner.emit(&RunEvent::with_test(kind, &recorded.test))?;
    }
    runner.emit(&RunEvent::End)
}
