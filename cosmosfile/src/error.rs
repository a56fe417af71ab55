//! Crate-wide error types.

use thiserror::Error;

use crate::parser::ParseError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A directive did not have the shape its consumer expected.
///
/// Raised by code that walks blocks with a [`Dispenser`](crate::Dispenser),
/// never by the dispenser itself. Build one with
/// [`Dispenser::err`](crate::Dispenser::err) and friends so the location is
/// filled in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{line}: {message}")]
pub struct DirectiveError {
    pub file: String,
    pub line: usize,
    pub message: String,
}
