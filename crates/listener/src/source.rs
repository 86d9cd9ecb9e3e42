//! Newline-delimited JSON item events.

use std::io::{BufRead, ErrorKind};

use teardown::ItemEvent;
use thiserror::Error;

/// Errors produced while reading events from a stream.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Failed to read event stream")]
    Io(#[from] std::io::Error),

    /// One line could not be decoded. The stream itself is still usable.
    #[error("Line {line} is not a valid item event")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// One line is not valid UTF-8. Its bytes have been consumed.
    #[error("Line {line} is not valid UTF-8")]
    Encoding { line: usize },
}

impl ListenerError {
    /// Returns `true` if reading can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ListenerError::Decode { .. } | ListenerError::Encoding { .. }
        )
    }
}

/// Reads one [`ItemEvent`] per line. Blank lines are skipped.
///
/// ```json
/// {"kind":"updated","item":{"type":"folder","name":"team"}}
/// ```
#[derive(Debug)]
pub struct JsonLinesEventSource<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> JsonLinesEventSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for JsonLinesEventSource<R> {
    type Item = Result<ItemEvent, ListenerError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line += 1,
                Err(err) if err.kind() == ErrorKind::InvalidData => {
                    self.line += 1;
                    return Some(Err(ListenerError::Encoding { line: self.line }));
                }
                Err(err) => return Some(Err(err.into())),
            }

            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }
            return Some(
                serde_json::from_str(text).map_err(|source| ListenerError::Decode {
                    line: self.line,
                    source,
                }),
            );
        }
    }
}
