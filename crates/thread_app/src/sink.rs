use std::io::{self, Stdout, Write};
use std::sync::Mutex;

use thread_engine::{PublishError, PublishSink};

/// Writes each entry as a `=== title ===` banner followed by the body.
pub struct WriterSink<W: Write + Send> {
    out: Mutex<W>,
}

pub type StdoutSink = WriterSink<Stdout>;

impl StdoutSink {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> PublishSink for WriterSink<W> {
    fn publish(&self, title: &str, body: &str) -> Result<(), PublishError> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| PublishError::Unavailable("output lock poisoned".to_string()))?;
        writeln!(out, "=== {title} ===\n{body}\n")
            .and_then(|()| out.flush())
            .map_err(|err| PublishError::Unavailable(err.to_string()))
    }
}
