pub mod error;
mod structural;

pub use error::ParseError;

use crate::block::Block;
use crate::lexer;

/// Parser entry point.
pub struct Parser<'a> {
    source_name: &'a str,
    input: &'a [u8],
}

impl<'a> Parser<'a> {
    pub fn new(source_name: &'a str, input: &'a [u8]) -> Self {
        Parser { source_name, input }
    }

    /// Tokenize the source and group it into top-level blocks.
    pub fn parse(&self) -> Result<Vec<Block>, ParseError> {
        let tokens = lexer::tokenize(self.source_name, self.input);
        let blocks = structural::parse_blocks(self.source_name, tokens)?;
        tracing::debug!(source = self.source_name, blocks = blocks.len(), "parsed");
        Ok(blocks)
    }
}

/// Tokenize and parse `input` in one step.
pub fn parse(source_name: &str, input: &[u8]) -> Result<Vec<Block>, ParseError> {
    Parser::new(source_name, input).parse()
}
