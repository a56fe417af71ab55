pub mod segment;

pub use segment::Segment;

use crate::lexer::Token;

/// A top-level grouping of directive lines.
///
/// `keys` come from the header tokens in front of the opening brace. The
/// braces delimiting the block are not part of `segments`; braces of nested
/// blocks are kept verbatim so consumers can walk them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    /// Header labels, case-sensitive, in source order.
    pub keys: Vec<String>,
    /// Directive lines in source order.
    pub segments: Vec<Segment>,
}

impl Block {
    pub const fn empty() -> Self {
        Block {
            keys: Vec::new(),
            segments: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.segments.is_empty()
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// All tokens of all segments, in order. This is the slice a
    /// [`Dispenser`](crate::Dispenser) walks.
    pub fn tokens(&self) -> Vec<Token> {
        self.segments
            .iter()
            .flat_map(|segment| segment.tokens().iter().cloned())
            .collect()
    }

    /// Segments whose directive name equals `name`, at any nesting depth.
    pub fn directives<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Segment> + 'a {
        self.segments
            .iter()
            .filter(move |segment| segment.directive() == name)
    }
}
