//! Colored diagnostics on stderr.
//!
//! Rendered documents may go to stdout, so everything the CLI says about the
//! run itself is written here instead.

use std::path::Path;

use console::{Style, Term};

/// Diagnostics printer for the `plantmark` commands.
pub(crate) struct Output {
    term: Term,
    done: Style,
    notice: Style,
    failure: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            done: Style::new().green(),
            notice: Style::new().yellow(),
            failure: Style::new().red().bold(),
        }
    }

    /// Report where the rendered document was written.
    pub(crate) fn written(&self, path: &Path) {
        self.line(&self.done, &format!("Wrote {}", path.display()));
    }

    /// Report render warnings, one per line, with a count header.
    pub(crate) fn warnings(&self, warnings: &[String]) {
        if warnings.is_empty() {
            return;
        }
        let noun = if warnings.len() == 1 { "warning" } else { "warnings" };
        self.line(&self.notice, &format!("{} {noun}:", warnings.len()));
        for warning in warnings {
            self.line(&self.notice, &format!("  {warning}"));
        }
    }

    /// Report the error that ended the run.
    pub(crate) fn error(&self, err: &dyn std::fmt::Display) {
        self.line(&self.failure, &format!("Error: {err}"));
    }

    fn line(&self, style: &Style, msg: &str) {
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }
}
