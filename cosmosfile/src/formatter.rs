//! Canonical source formatting.
//!
//! Works on raw bytes rather than tokens: comments and the exact contents of
//! quoted spans are thrown away by the tokenizer but must survive here.
//!
//! Formatting runs in two steps. [`Scanner`] splits the input into words,
//! comments and structural braces, counting the newlines in front of each,
//! using the same brace rule as the tokenizer. [`Layout`] then decides
//! placement from the item kinds, the nesting depth and that newline count
//! alone. The output scans back into the same items, which is what makes
//! formatting idempotent.

use std::collections::VecDeque;

/// Reformat configuration source into canonical layout.
///
/// Never fails. Unbalanced braces produce a best-effort layout. The result
/// always ends with exactly one newline.
pub fn format(input: &[u8]) -> Vec<u8> {
    let mut layout = Layout::new(input.len());
    for (item, newlines) in Scanner::new(input) {
        layout.push(item, newlines);
    }
    layout.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Item<'a> {
    Word(&'a [u8]),
    /// From `#` to the end of the line, without the newline.
    Comment(&'a [u8]),
    Open,
    Close,
}

/// Splits input into items paired with the number of newlines before them.
struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
    /// Items split off the end of the last word.
    queued: VecDeque<Item<'a>>,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a [u8]) -> Self {
        Scanner {
            input,
            pos: 0,
            queued: VecDeque::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) -> usize {
        let mut newlines = 0;
        while let Some(b) = self.peek() {
            if !b.is_ascii_whitespace() {
                break;
            }
            if b == b'\n' {
                newlines += 1;
            }
            self.pos += 1;
        }
        newlines
    }

    fn comment(&mut self) -> Item<'a> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b != b'\n') {
            self.pos += 1;
        }
        let mut text = &self.input[start..self.pos];
        if let [rest @ .., b'\r'] = text {
            text = rest;
        }
        Item::Comment(text)
    }

    /// Skip past a quoted span starting at the current `"` or `` ` ``.
    /// Unterminated spans run to the end of input.
    fn quoted_span(&mut self, delimiter: u8) {
        self.pos += 1;
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'\\' && delimiter == b'"' {
                self.pos = (self.pos + 1).min(self.input.len());
            } else if b == delimiter {
                return;
            }
        }
    }

    /// Scan a word starting at the current position. Braces split off its
    /// ends are queued behind it.
    fn word(&mut self) -> Item<'a> {
        let start = self.pos;
        while let Some(delimiter @ (b'"' | b'`')) = self.peek() {
            self.quoted_span(delimiter);
        }

        let mut depth = 0usize;
        let mut open_run = 0usize;
        let mut close = false;
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                break;
            }
            match b {
                b'\\' => {
                    self.pos = (self.pos + 2).min(self.input.len());
                    open_run = 0;
                    continue;
                }
                b'{' => {
                    depth += 1;
                    open_run += 1;
                }
                b'}' if depth == 0 => {
                    close = true;
                    break;
                }
                b'}' => {
                    depth -= 1;
                    open_run = 0;
                }
                _ => open_run = 0,
            }
            self.pos += 1;
        }

        let word = &self.input[start..self.pos - open_run];
        if close {
            self.pos += 1;
            self.queued.push_back(Item::Close);
        }
        self.queued.extend(std::iter::repeat_n(Item::Open, open_run));
        if word.is_empty() {
            // A bare brace.
            if let Some(brace) = self.queued.pop_front() {
                return brace;
            }
        }
        Item::Word(word)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = (Item<'a>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(brace) = self.queued.pop_front() {
            return Some((brace, 0));
        }
        let newlines = self.skip_whitespace();
        let item = match self.peek()? {
            b'#' => self.comment(),
            _ => self.word(),
        };
        Some((item, newlines))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    Nothing,
    Word,
    Comment,
    Open,
    /// A `}`; `top` when it closed back to the top level.
    Close { top: bool },
}

struct Layout {
    out: Vec<u8>,
    nesting: usize,
    last: Last,
}

impl Layout {
    fn new(capacity: usize) -> Self {
        Layout {
            out: Vec::with_capacity(capacity + 1),
            nesting: 0,
            last: Last::Nothing,
        }
    }

    fn push(&mut self, item: Item<'_>, newlines: usize) {
        let newlines = newlines.min(2);
        match item {
            Item::Word(text) | Item::Comment(text) => {
                let breaks = match self.last {
                    Last::Nothing => 0,
                    Last::Word => newlines,
                    Last::Comment => newlines.max(1),
                    Last::Open => 1,
                    Last::Close { top } => newlines.max(if top { 2 } else { 1 }),
                };
                if breaks == 0 && self.last != Last::Nothing {
                    self.out.push(b' ');
                } else {
                    self.line_breaks(breaks);
                }
                self.out.extend_from_slice(text);
                self.last = if matches!(item, Item::Comment(_)) {
                    Last::Comment
                } else {
                    Last::Word
                };
            }
            Item::Open => {
                match self.last {
                    Last::Nothing => {}
                    // The brace joins its header line.
                    Last::Word => self.out.push(b' '),
                    Last::Comment => self.line_breaks(newlines.max(1)),
                    Last::Open => self.line_breaks(1),
                    Last::Close { top } => {
                        self.line_breaks(newlines.max(if top { 2 } else { 1 }))
                    }
                }
                self.out.push(b'{');
                self.nesting += 1;
                self.last = Last::Open;
            }
            Item::Close => {
                let breaks = if self.last == Last::Nothing { 0 } else { 1 };
                self.nesting = self.nesting.saturating_sub(1);
                self.line_breaks(breaks);
                self.out.push(b'}');
                self.last = Last::Close {
                    top: self.nesting == 0,
                };
            }
        }
    }

    /// Start `breaks` lines down and indent, or stay put for zero.
    fn line_breaks(&mut self, breaks: usize) {
        if breaks == 0 {
            return;
        }
        for _ in 0..breaks {
            self.out.push(b'\n');
        }
        self.indent();
    }

    fn indent(&mut self) {
        for _ in 0..self.nesting {
            self.out.push(b'\t');
        }
    }

    fn finish(mut self) -> Vec<u8> {
        while self.out.last().is_some_and(u8::is_ascii_whitespace) {
            self.out.pop();
        }
        self.out.push(b'\n');
        tracing::debug!(bytes = self.out.len(), "formatted");
        self.out
    }
}
