use std::sync::Arc;

use crate::lexer::token::{Token, TokenKind};

/// Tokenizer state machine.
///
/// Fed one character at a time through [`LexState::step`], which appends
/// every token that character completes. [`LexState::finish`] flushes
/// whatever is left at end of input.
///
/// Braces glued to a bare word follow one rule: a `}` that does not close a
/// `{` opened earlier in the same word ends the word and stands alone, and
/// a run of `{` at the very end of a word is split off. `a{`, `}b` and
/// `a}b` therefore carry structural braces while `{$A}` and `foo{bar}` stay
/// whole words.
#[derive(Debug)]
pub struct LexState {
    file: Arc<str>,
    /// Current line.
    line: usize,
    /// Newlines swallowed by line continuations since the last real newline.
    skipped_lines: usize,
    /// Line on which the token in progress started.
    start_line: usize,
    text: String,

    quoted: bool,
    backtick_quoted: bool,
    escaped: bool,
    comment: bool,

    /// Unescaped `{` in the current word not yet matched by a `}`.
    depth: usize,
    /// Unescaped `{` ending the current word.
    open_run: usize,
}

impl LexState {
    pub fn new(file: impl Into<Arc<str>>) -> Self {
        LexState {
            file: file.into(),
            line: 1,
            skipped_lines: 0,
            start_line: 1,
            text: String::new(),
            quoted: false,
            backtick_quoted: false,
            escaped: false,
            comment: false,
            depth: 0,
            open_run: 0,
        }
    }

    /// Current line of the input position.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Consume one character, appending any tokens it completes to `out`.
    pub fn step(&mut self, ch: char, out: &mut Vec<Token>) {
        if self.comment {
            if ch == '\n' {
                self.comment = false;
                self.newline();
            }
            return;
        }

        if !self.escaped && !self.backtick_quoted && ch == '\\' {
            self.escaped = true;
            return;
        }

        if self.quoted || self.backtick_quoted {
            self.step_quoted(ch, out);
            return;
        }

        if ch.is_whitespace() {
            match ch {
                '\r' => return,
                '\n' if self.escaped => {
                    self.skipped_lines += 1;
                    self.escaped = false;
                }
                '\n' => self.newline(),
                _ => {}
            }
            self.flush(out);
            return;
        }

        if self.text.is_empty() && !self.escaped {
            match ch {
                '#' => {
                    self.comment = true;
                    return;
                }
                '"' => {
                    self.start_line = self.line;
                    self.quoted = true;
                    return;
                }
                '`' => {
                    self.start_line = self.line;
                    self.backtick_quoted = true;
                    return;
                }
                _ => {}
            }
        }

        if self.text.is_empty() {
            self.start_line = self.line;
        }

        if !self.escaped {
            match ch {
                '{' => {
                    self.depth += 1;
                    self.open_run += 1;
                    self.text.push(ch);
                    return;
                }
                '}' if self.depth == 0 => {
                    self.flush(out);
                    out.push(Token::with_kind(
                        Arc::clone(&self.file),
                        self.line,
                        TokenKind::CloseBrace,
                        "}",
                    ));
                    return;
                }
                '}' => self.depth -= 1,
                _ => {}
            }
        }

        if self.escaped {
            self.text.push('\\');
            self.escaped = false;
        }
        self.text.push(ch);
        self.open_run = 0;
    }

    /// End of input: flush the token in progress, if it has any text.
    pub fn finish(mut self, out: &mut Vec<Token>) {
        self.flush(out);
    }

    fn step_quoted(&mut self, ch: char, out: &mut Vec<Token>) {
        if self.quoted && self.escaped {
            // Only the quote character is escapable inside double quotes.
            if ch != '"' {
                self.text.push('\\');
            }
            self.escaped = false;
        } else if self.quoted && ch == '"' {
            out.push(self.emit(TokenKind::Quoted));
            return;
        } else if self.backtick_quoted && ch == '`' {
            out.push(self.emit(TokenKind::Backtick));
            return;
        }

        if ch == '\n' {
            self.newline();
        }
        self.text.push(ch);
    }

    fn newline(&mut self) {
        self.line += 1 + self.skipped_lines;
        self.skipped_lines = 0;
    }

    fn flush(&mut self, out: &mut Vec<Token>) {
        if self.text.is_empty() {
            return;
        }

        let kind = if self.quoted {
            TokenKind::Quoted
        } else if self.backtick_quoted {
            TokenKind::Backtick
        } else {
            TokenKind::Word
        };
        let opens = self.open_run;
        let line = self.start_line;
        let word_len = self.text.len() - opens;
        self.text.truncate(word_len);

        if self.text.is_empty() {
            self.reset();
        } else {
            out.push(self.emit(kind));
        }
        for _ in 0..opens {
            out.push(Token::with_kind(
                Arc::clone(&self.file),
                line,
                TokenKind::OpenBrace,
                "{",
            ));
        }
    }

    fn emit(&mut self, kind: TokenKind) -> Token {
        self.reset();
        Token::with_kind(
            Arc::clone(&self.file),
            self.start_line,
            kind,
            std::mem::take(&mut self.text),
        )
    }

    fn reset(&mut self) {
        self.quoted = false;
        self.backtick_quoted = false;
        self.escaped = false;
        self.comment = false;
        self.depth = 0;
        self.open_run = 0;
    }
}
