// src/highway/reporter.rs

//! Error reporting sink.
//!
//! Every error surfaced by a run goes through exactly one
//! [`ErrorReporter::report`] call. Reporters must not fail.

use std::error::Error as StdError;
use std::io::Write;
use std::sync::Mutex;

use tracing::error;

use crate::errors::HighwayError;

pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &HighwayError);
}

impl<F> ErrorReporter for F
where
    F: Fn(&HighwayError) + Send + Sync,
{
    fn report(&self, error: &HighwayError) {
        self(error)
    }
}

/// Default reporter: writes the error and its causes to a diagnostic stream.
///
/// Writes are serialized by a mutex so concurrent reports never interleave.
pub struct StderrReporter {
    out: Mutex<Box<dyn Write + Send>>,
}

impl StderrReporter {
    pub fn new() -> Self {
        Self::with_writer(std::io::stderr())
    }

    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
        }
    }
}

impl Default for StderrReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorReporter for StderrReporter {
    fn report(&self, err: &HighwayError) {
        error!(error = %err, "highway failed");
        let text = describe(err);
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(out, "[ERROR] {text}");
        let _ = out.flush();
    }
}

/// Render an error with its whole cause chain on one line per cause.
pub fn describe(err: &HighwayError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(&format!("\n        caused by: {cause}"));
        source = cause.source();
    }
    text
}
