use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use crate::error::{BiPoError, Result};
use crate::event::Event;

/// Forward-only event stream backed by a JSON-lines file, one event
/// record per line:
///
/// ```text
/// {"gtid":1,"clock_count":250,"nhits_cleaned":300,"dc_applied":0,"dc_flagged":0,
///  "fit":{"x":0.0,"y":0.0,"z":2000.0,"valid_position":true,"valid_time":true}}
/// ```
///
/// Opening a missing or unreadable file fails with `SourceUnreadable`.
/// A malformed line mid-stream is logged and skipped; it does not
/// condemn the rest of the file.
pub struct JsonlEventSource {
    path: String,
    lines: Lines<BufReader<File>>,
    line_no: u64,
    parse_errors: u64,
}

impl JsonlEventSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            BiPoError::SourceUnreadable(format!("{}: {}", path.display(), e))
        })?;
        Ok(Self {
            path: path.display().to_string(),
            lines: BufReader::new(file).lines(),
            line_no: 0,
            parse_errors: 0,
        })
    }

    /// Lines that failed to parse so far.
    pub fn parse_errors(&self) -> u64 {
        self.parse_errors
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Iterator for JsonlEventSource {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    log::warn!("{}:{}: read error, stream ends: {}", self.path, self.line_no, e);
                    return None;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Event>(&line) {
                Ok(event) => return Some(event),
                Err(e) => {
                    self.parse_errors += 1;
                    log::warn!("{}:{}: skipping malformed record: {}", self.path, self.line_no, e);
                }
            }
        }
        None
    }
}
