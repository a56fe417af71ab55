use std::ops::Index;

use crate::lexer::Token;

/// One logical statement: a directive name followed by its arguments.
///
/// Never empty. A segment that opens a nested block ends with a `{` token;
/// a segment closing one consists of a single `}` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment(Vec<Token>);

impl Segment {
    /// Wrap `tokens`, returning `None` when there are none.
    pub fn new(tokens: Vec<Token>) -> Option<Self> {
        if tokens.is_empty() {
            None
        } else {
            Some(Segment(tokens))
        }
    }

    /// The text of the first token.
    pub fn directive(&self) -> &str {
        &self.0[0].text
    }

    /// Everything after the directive name.
    pub fn args(&self) -> &[Token] {
        &self.0[1..]
    }

    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Line of the directive name.
    pub fn line(&self) -> usize {
        self.0[0].line
    }

    /// Whether the segment ends with a `{` and so opens a nested block.
    pub fn opens_block(&self) -> bool {
        self.0.last().is_some_and(Token::is_open_brace)
    }

    /// Whether the segment is a lone `}`.
    pub fn closes_block(&self) -> bool {
        self.0.len() == 1 && self.0[0].is_close_brace()
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.0
    }
}

impl Index<usize> for Segment {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a Segment {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
