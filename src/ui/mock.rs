//! Mock reporter for testing.
//!
//! `MockReporter` implements [`Reporter`] and captures every event and output
//! line for later assertion.

use std::sync::Mutex;

use super::{Reporter, StatusEvent};
use crate::shell::OutputLine;

/// Mock reporter implementation for testing.
#[derive(Debug, Default)]
pub struct MockReporter {
    events: Mutex<Vec<StatusEvent>>,
    output: Mutex<Vec<(String, OutputLine)>>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured status events.
    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Get all captured output lines with their source.
    pub fn output_lines(&self) -> Vec<(String, OutputLine)> {
        self.output.lock().map(|o| o.clone()).unwrap_or_default()
    }

    /// Check if a status event rendering to `text` (or containing it) was emitted.
    pub fn has_status(&self, text: &str) -> bool {
        self.events().iter().any(|e| e.to_string().contains(text))
    }

    /// Check if any output line from `source` contains `text`.
    pub fn has_output(&self, source: &str, text: &str) -> bool {
        self.output_lines()
            .iter()
            .any(|(s, line)| s == source && line.text().contains(text))
    }
}

impl Reporter for MockReporter {
    fn status(&self, event: &StatusEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn output(&self, source: &str, line: &OutputLine) {
        if let Ok(mut output) = self.output.lock() {
            output.push((source.to_string(), line.clone()));
        }
    }
}
