use crate::block::{Block, Segment};
use crate::lexer::Token;
use crate::parser::error::ParseError;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Group a token stream into top-level blocks.
pub fn parse_blocks(source_name: &str, tokens: Vec<Token>) -> Result<Vec<Block>, ParseError> {
    let mut state = ParseState::new(source_name);
    for segment in split_segments(tokens) {
        state.push_segment(segment)?;
    }
    state.finalize()
}

/// Split tokens into statements.
///
/// A segment ends where the next token starts on another line, right after
/// a `{`, and on both sides of a `}`. A `{` starting a line is the exception:
/// it joins the statement right before it (`log` then `{` on the next line
/// opens `log`), matching where the formatter puts that brace.
pub fn split_segments(tokens: Vec<Token>) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current: Vec<Token> = Vec::new();

    for token in tokens {
        let continues = current
            .last()
            .is_some_and(|prev| prev.same_line_as(&token) || token.is_open_brace());
        if !continues || token.is_close_brace() {
            segments.extend(Segment::new(std::mem::take(&mut current)));
        }

        if token.is_close_brace() {
            segments.extend(Segment::new(vec![token]));
            continue;
        }

        let opens = token.is_open_brace();
        current.push(token);
        if opens {
            segments.extend(Segment::new(std::mem::take(&mut current)));
        }
    }

    segments.extend(Segment::new(current));
    segments
}

// ---------------------------------------------------------------------------
// Parse state
// ---------------------------------------------------------------------------

struct ParseState<'a> {
    source_name: &'a str,
    /// Block whose braces are currently open.
    open: Option<BlockBuilder>,
    /// Completed top-level blocks.
    blocks: Vec<Block>,
}

struct BlockBuilder {
    keys: Vec<String>,
    segments: Vec<Segment>,
    /// Brace depth inside the block; 1 right after its opening brace.
    depth: usize,
    /// Line of the opening brace, for unterminated-block errors.
    line: usize,
}

impl BlockBuilder {
    fn into_block(self) -> Block {
        Block {
            keys: self.keys,
            segments: self.segments,
        }
    }
}

impl<'a> ParseState<'a> {
    fn new(source_name: &'a str) -> Self {
        ParseState {
            source_name,
            open: None,
            blocks: Vec::new(),
        }
    }

    fn push_segment(&mut self, segment: Segment) -> Result<(), ParseError> {
        let Some(builder) = self.open.as_mut() else {
            return self.push_top_level(segment);
        };

        if segment.closes_block() {
            builder.depth -= 1;
            if builder.depth == 0 {
                if let Some(builder) = self.open.take() {
                    let block = builder.into_block();
                    tracing::trace!(keys = ?block.keys, segments = block.segments.len(), "block closed");
                    self.blocks.push(block);
                }
                return Ok(());
            }
        } else if segment.opens_block() {
            builder.depth += 1;
        }
        builder.segments.push(segment);
        Ok(())
    }

    fn push_top_level(&mut self, segment: Segment) -> Result<(), ParseError> {
        if segment.closes_block() {
            return Err(ParseError::error(
                "unexpected '}': no block is open",
                self.source_name,
                segment.line(),
            ));
        }

        if segment.opens_block() {
            let line = segment.tokens()[segment.len() - 1].line;
            let mut header = segment.into_tokens();
            header.pop();
            self.open = Some(BlockBuilder {
                keys: header_keys(&header),
                segments: Vec::new(),
                depth: 1,
                line,
            });
            return Ok(());
        }

        // A statement without braces is a block of its own.
        self.blocks.push(Block {
            keys: header_keys(segment.tokens()),
            segments: vec![segment],
        });
        Ok(())
    }

    fn finalize(self) -> Result<Vec<Block>, ParseError> {
        if let Some(builder) = self.open {
            let opened = match builder.keys.first() {
                Some(key) => format!("block '{}'", key),
                None => "block".to_string(),
            };
            return Err(ParseError::error(
                "unexpected end of input: missing closing '}'",
                self.source_name,
                builder.line,
            )
            .with_note(format!("{} opened on line {}", opened, builder.line)));
        }
        Ok(self.blocks)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Every header token is a key. Commas separate keys, whether they stand
/// between tokens (`a.com, b.com`) or inside one (`a.com,b.com`).
fn header_keys(header: &[Token]) -> Vec<String> {
    header
        .iter()
        .flat_map(|token| token.text.split(','))
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}
