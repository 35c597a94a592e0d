//! Terminal status output.

use console::{Style, Term};

use super::{Reporter, StatusEvent};
use crate::shell::OutputLine;

/// Prints status events to stdout; installer output goes to the log.
pub struct ConsoleReporter {
    term: Term,
    info: Style,
    success: Style,
    failure: Style,
    dim: Style,
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a reporter. With `verbose`, installer output is echoed too.
    pub fn new(verbose: bool) -> Self {
        let term = Term::stdout();
        let colors = term.is_term() && std::env::var_os("NO_COLOR").is_none();
        let styled = |s: Style| if colors { s } else { Style::new() };

        Self {
            term,
            info: styled(Style::new().magenta()),
            success: styled(Style::new().green()),
            failure: styled(Style::new().red()),
            dim: styled(Style::new().dim()),
            verbose,
        }
    }

    /// Print a plain line.
    pub fn message(&self, text: &str) {
        self.term.write_line(text).ok();
    }

    /// Print a line marked as an error.
    pub fn error(&self, text: &str) {
        Term::stderr()
            .write_line(&format!("{} {}", self.failure.apply_to("✗"), text))
            .ok();
    }

    /// Print a label followed by a dimmed value.
    pub fn field(&self, label: &str, value: &str) {
        self.message(&format!("{} {}", label, self.dim.apply_to(value)));
    }

    fn line(&self, text: String) {
        self.message(&text);
    }
}

impl Reporter for ConsoleReporter {
    fn status(&self, event: &StatusEvent) {
        tracing::debug!("{}", event);
        let text = match event {
            StatusEvent::Installed { .. } | StatusEvent::AlreadyInstalled { .. } => {
                format!("{} {}", self.success.apply_to("✓"), event)
            }
            _ => format!("{} {}", self.info.apply_to("→"), event),
        };
        self.line(text);
    }

    fn output(&self, source: &str, line: &OutputLine) {
        match line {
            OutputLine::Stdout(text) => tracing::debug!("[{} out] {}", source, text),
            OutputLine::Stderr(text) => tracing::debug!("[{} err] {}", source, text),
        }
        if self.verbose {
            self.line(format!(
                "  {}",
                self.dim.apply_to(format!("[{}] {}", source, line.text()))
            ));
        }
    }
}
