pub mod block;
pub mod dispenser;
pub mod error;
pub mod formatter;
pub mod lexer;
pub mod parser;

use std::path::Path;

pub use crate::block::{Block, Segment};
pub use crate::dispenser::Dispenser;
pub use crate::error::{DirectiveError, Error};
pub use crate::formatter::format;
pub use crate::lexer::{Token, TokenKind, tokenize, tokenize_reader};
pub use crate::parser::{ParseError, Parser, parse};

static EMPTY_BLOCK: Block = Block::empty();

/// A parsed configuration document.
///
/// Built once from source and never mutated afterwards. Reloading means
/// reading and parsing the source again.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Top-level blocks in source order.
    pub blocks: Vec<Block>,
}

impl Config {
    /// Parse in-memory source bytes. `source_name` ends up in every token
    /// and error message.
    pub fn parse(source_name: &str, input: &[u8]) -> Result<Self, ParseError> {
        let blocks = Parser::new(source_name, input).parse()?;
        Ok(Config { blocks })
    }

    /// Read a file in full and parse it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let input = std::fs::read(path)?;
        let config = Config::parse(&path.to_string_lossy(), &input)?;
        tracing::debug!(
            path = %path.display(),
            blocks = config.blocks.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// The first block carrying `key`, or an empty block when none does.
    pub fn key(&self, key: &str) -> &Block {
        self.get(key).unwrap_or(&EMPTY_BLOCK)
    }

    /// The first block carrying `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Block> {
        self.blocks.iter().find(|block| block.has_key(key))
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
