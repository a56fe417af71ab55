use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use codespan_reporting::files::Files;
use thiserror::Error;

/// A structural error in a configuration document, with its location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{line}: {message}")]
pub struct ParseError {
    pub message: String,
    pub file: String,
    /// 1-based line the error points at.
    pub line: usize,
    pub notes: Vec<String>,
}

impl ParseError {
    pub fn error(message: impl Into<String>, file: impl Into<String>, line: usize) -> Self {
        ParseError {
            message: message.into(),
            file: file.into(),
            line,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display. The label
    /// covers the whole offending line of `file_id` in `files`.
    pub fn to_diagnostic<'a, F>(&self, files: &'a F, file_id: F::FileId) -> Diagnostic<F::FileId>
    where
        F: Files<'a>,
    {
        let span = files
            .line_range(file_id, self.line.saturating_sub(1))
            .unwrap_or(0..0);
        Diagnostic::new(Severity::Error)
            .with_message(&self.message)
            .with_labels(vec![Label::primary(file_id, span)])
            .with_notes(self.notes.clone())
    }
}
