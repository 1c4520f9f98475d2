use std::sync::{Arc, Mutex};

use highway::errors::HighwayError;
use highway::highway::ErrorReporter;
use highway::highway::reporter::describe;

/// Reporter that keeps every rendered report instead of printing it.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    reports: Arc<Mutex<Vec<String>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.reports.lock().unwrap().len()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, error: &HighwayError) {
        self.reports.lock().unwrap().push(describe(error));
    }
}
