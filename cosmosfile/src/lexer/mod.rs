mod state;
mod token;

pub use state::LexState;
pub use token::{Token, TokenKind};

use std::io::Read;

use crate::error::Error;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Split source bytes into tokens.
///
/// Comments and insignificant whitespace are dropped. Invalid UTF-8 is
/// replaced with U+FFFD rather than rejected. Braces glued to a word are
/// split off as described on [`LexState`].
pub fn tokenize(source_name: &str, input: &[u8]) -> Vec<Token> {
    let decoded = String::from_utf8_lossy(input);
    let text = decoded.strip_prefix(BYTE_ORDER_MARK).unwrap_or(&*decoded);

    let mut state = LexState::new(source_name);
    let mut tokens = Vec::new();
    for ch in text.chars() {
        state.step(ch, &mut tokens);
    }
    let lines = state.line();
    state.finish(&mut tokens);

    tracing::trace!(source = source_name, tokens = tokens.len(), lines, "tokenized");
    tokens
}

/// Read `reader` to the end and tokenize it. Read failures are returned
/// unchanged as [`Error::Io`].
pub fn tokenize_reader(source_name: &str, mut reader: impl Read) -> Result<Vec<Token>, Error> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;
    Ok(tokenize(source_name, &input))
}
