use crate::error::DirectiveError;
use crate::lexer::{Token, TokenKind};

/// A cursor over a flat token slice, used by directive parsers to walk
/// arguments and nested blocks without re-parsing.
///
/// The cursor starts before the first token: call [`Dispenser::next`] before
/// reading [`Dispenser::val`]. Brace depth is tracked with a plain counter
/// relative to where walking started; no tree is built.
///
/// ```ignore
/// let tokens = block.tokens();
/// let mut d = Dispenser::new(&tokens);
/// while d.next() {
///     match d.val() {
///         "listen" => {
///             let addrs = d.remaining_args();
///             let nesting = d.nesting();
///             while d.next_block(nesting) {
///                 // sub-directives
///             }
///         }
///         other => return Err(d.err(format!("unknown directive: \"{other}\""))),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Dispenser<'a> {
    tokens: &'a [Token],
    cursor: Option<usize>,
    nesting: usize,
}

impl<'a> Dispenser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Dispenser {
            tokens,
            cursor: None,
            nesting: 0,
        }
    }

    /// Advance to the next token. Returns false, without moving, when none
    /// remain.
    pub fn next(&mut self) -> bool {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next < self.tokens.len() {
            self.cursor = Some(next);
            true
        } else {
            false
        }
    }

    /// Advance to the next token only if it is on the same line as the
    /// current one. An opening brace is not an argument: the cursor stays
    /// put in front of it.
    pub fn next_arg(&mut self) -> bool {
        let prev = self.cursor;
        if !self.next_on_same_line() {
            return false;
        }
        if self.at_open_brace() {
            self.cursor = prev;
            return false;
        }
        true
    }

    /// Advance to the next token only if it starts a new line.
    pub fn next_line(&mut self) -> bool {
        let Some(c) = self.cursor else {
            return self.next();
        };
        match self.tokens.get(c + 1) {
            Some(next) if !self.tokens[c].same_line_as(next) => {
                self.cursor = Some(c + 1);
                true
            }
            _ => false,
        }
    }

    /// Walk the block opened right after the current token.
    ///
    /// Pass the value of [`Dispenser::nesting`] taken before the loop. The
    /// first call consumes the `{` (which must be on the current line) and
    /// every call then stops on the first token of the next line inside the
    /// block, skipping leftover arguments and nested blocks the caller did
    /// not enter. Returns false once the matching `}` has been consumed, or
    /// right away when no block follows.
    pub fn next_block(&mut self, at_nesting: usize) -> bool {
        if self.nesting <= at_nesting {
            let prev = self.cursor;
            if !self.next_on_same_line() {
                return false;
            }
            if !self.at_open_brace() {
                self.cursor = prev;
                return false;
            }
            self.nesting += 1;
        }

        while self.next() {
            let starts_line = self.starts_line();
            match self.token().map(|t| t.kind) {
                Some(TokenKind::CloseBrace) => {
                    self.nesting = self.nesting.saturating_sub(1);
                    if self.nesting <= at_nesting {
                        return false;
                    }
                }
                Some(TokenKind::OpenBrace) => {
                    self.nesting += 1;
                    if starts_line && self.nesting == at_nesting + 2 {
                        return true;
                    }
                }
                _ if starts_line && self.nesting == at_nesting + 1 => return true,
                _ => {}
            }
        }
        false
    }

    /// Current brace depth. Take it before a `next_block` loop.
    pub fn nesting(&self) -> usize {
        self.nesting
    }

    /// Text of the current token, or `""` before the first `next`.
    pub fn val(&self) -> &'a str {
        self.token().map_or("", |t| t.text.as_str())
    }

    pub fn token(&self) -> Option<&'a Token> {
        self.cursor.and_then(|c| self.tokens.get(c))
    }

    /// Line of the current token, 0 before the first `next`.
    pub fn line(&self) -> usize {
        self.token().map_or(0, |t| t.line)
    }

    pub fn file(&self) -> &'a str {
        self.token().map_or("", |t| &*t.file)
    }

    /// Collect the remaining arguments on the current line.
    pub fn remaining_args(&mut self) -> Vec<String> {
        let mut args = Vec::new();
        while self.next_arg() {
            args.push(self.val().to_string());
        }
        args
    }

    /// Count the remaining arguments on the current line without moving.
    pub fn count_remaining_args(&mut self) -> usize {
        let cursor = self.cursor;
        let mut count = 0;
        while self.next_arg() {
            count += 1;
        }
        self.cursor = cursor;
        count
    }

    /// Fill `targets` from the following arguments, in order. Returns false
    /// as soon as an argument is missing.
    pub fn args(&mut self, targets: &mut [&mut String]) -> bool {
        for target in targets.iter_mut() {
            if !self.next_arg() {
                return false;
            }
            **target = self.val().to_string();
        }
        true
    }

    /// Rewind to before the first token.
    pub fn reset(&mut self) {
        self.cursor = None;
        self.nesting = 0;
    }

    /// An error at the current token.
    pub fn err(&self, message: impl Into<String>) -> DirectiveError {
        DirectiveError {
            file: self.file().to_string(),
            line: self.line(),
            message: message.into(),
        }
    }

    /// A wrong-argument-count error at the current token.
    pub fn arg_err(&self) -> DirectiveError {
        if self.at_open_brace() {
            return self.err("unexpected token '{', expecting argument");
        }
        self.err(format!(
            "wrong argument count or unexpected line ending after '{}'",
            self.val()
        ))
    }

    /// An unexpected-token error naming what was expected instead.
    pub fn syntax_err(&self, expected: &str) -> DirectiveError {
        self.err(format!(
            "syntax error: unexpected token '{}', expecting '{}'",
            self.val(),
            expected
        ))
    }

    fn at_open_brace(&self) -> bool {
        self.token().is_some_and(Token::is_open_brace)
    }

    fn next_on_same_line(&mut self) -> bool {
        let Some(c) = self.cursor else {
            return self.next();
        };
        match self.tokens.get(c + 1) {
            Some(next) if self.tokens[c].same_line_as(next) => {
                self.cursor = Some(c + 1);
                true
            }
            _ => false,
        }
    }

    /// Whether the current token begins a statement: first token, first on
    /// its line, or right after a brace.
    fn starts_line(&self) -> bool {
        let Some(c) = self.cursor else {
            return false;
        };
        if c == 0 {
            return true;
        }
        let prev = &self.tokens[c - 1];
        prev.is_open_brace() || prev.is_close_brace() || !prev.same_line_as(&self.tokens[c])
    }
}
