//! Terminal output for the CLI.

use console::{Style, Term};

/// Writes status lines to stderr and resolved documents to stdout.
pub(crate) struct Output {
    status: Term,
    documents: Term,
    heading: Style,
    warning: Style,
    failure: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            status: Term::stderr(),
            documents: Term::stdout(),
            heading: Style::new().cyan().bold(),
            warning: Style::new().yellow(),
            failure: Style::new().red(),
        }
    }

    /// Plain status line.
    pub(crate) fn info(&self, msg: &str) {
        self.status_line(msg, None);
    }

    /// Status line in cyan bold.
    pub(crate) fn highlight(&self, msg: &str) {
        self.status_line(msg, Some(&self.heading));
    }

    /// Contained failure, in yellow.
    pub(crate) fn warning(&self, msg: &str) {
        self.status_line(msg, Some(&self.warning));
    }

    /// Fatal failure, in red.
    pub(crate) fn error(&self, msg: &str) {
        self.status_line(msg, Some(&self.failure));
    }

    /// Write a resolved document to stdout.
    pub(crate) fn document(&self, text: &str) -> std::io::Result<()> {
        self.documents.write_line(text)
    }

    fn status_line(&self, msg: &str, style: Option<&Style>) {
        let line = match style {
            Some(style) => style.apply_to(msg).to_string(),
            None => msg.to_owned(),
        };
        // Best-effort.
        let _ = self.status.write_line(&line);
    }
}
