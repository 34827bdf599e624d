//! Drive lifecycle hooks from a JSON-lines event stream.

use crate::error::{Error, Result};
use crate::events::{LifecycleEvent, LifecycleHooks};
use serde::Serialize;
use std::borrow::Cow;
use std::io::BufRead;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamSummary {
    pub lines: usize,
    pub dispatched: usize,
    pub skipped: usize,
}

/// Parse one line. `Ok(None)` for blank lines.
pub fn parse_event_line(line: &str) -> Result<Option<LifecycleEvent>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| Error::validation_invalid_json(e, Some("parse lifecycle event".to_string())))
}

/// Feed every event in `reader` to `hooks`, in order.
///
/// Malformed lines are logged and skipped; bytes that are not UTF-8 are
/// replaced before parsing. Only a read error ends the stream early.
pub fn run_event_stream<R, H>(mut reader: R, hooks: &mut H) -> Result<StreamSummary>
where
    R: BufRead,
    H: LifecycleHooks + ?Sized,
{
    let mut summary = StreamSummary::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).map_err(|e| {
            Error::internal_io(e.to_string(), Some("read event stream".to_string()))
        })?;
        if read == 0 {
            break;
        }
        summary.lines += 1;
        let line_no = summary.lines;

        let line = String::from_utf8_lossy(&buf);
        if matches!(line, Cow::Owned(_)) {
            warn!(line = line_no, "Event line is not valid UTF-8; invalid bytes replaced");
        }

        match parse_event_line(&line) {
            Ok(Some(event)) => {
                debug!(line = line_no, event = event.kind(), "Dispatching event");
                event.dispatch(&mut *hooks);
                summary.dispatched += 1;
            }
            Ok(None) => {}
            Err(err) => {
                warn!(
                    line = line_no,
                    "Skipping malformed event: {}",
                    err.details["error"].as_str().unwrap_or(&err.message)
                );
                summary.skipped += 1;
            }
        }
    }

    Ok(summary)
}
