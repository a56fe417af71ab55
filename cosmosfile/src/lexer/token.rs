use std::fmt;
use std::sync::Arc;

/// What a token was written as. Only bare braces are structural; a quoted
/// `"{"` is plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    /// Double-quoted string, quotes stripped.
    Quoted,
    /// Backtick string, backticks stripped.
    Backtick,
    OpenBrace,
    CloseBrace,
}

/// A single lexical unit.
///
/// Quoted and backtick strings arrive with their delimiters stripped. Braces
/// that stand alone are their own tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Name of the source the token came from (usually a file path).
    pub file: Arc<str>,
    /// 1-based line on which the token started.
    pub line: usize,
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    /// A bare token. `{` and `}` become structural braces, anything else a
    /// word.
    pub fn new(file: impl Into<Arc<str>>, line: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let kind = match text.as_str() {
            "{" => TokenKind::OpenBrace,
            "}" => TokenKind::CloseBrace,
            _ => TokenKind::Word,
        };
        Token::with_kind(file, line, kind, text)
    }

    pub fn with_kind(
        file: impl Into<Arc<str>>,
        line: usize,
        kind: TokenKind,
        text: impl Into<String>,
    ) -> Self {
        Token {
            file: file.into(),
            line,
            kind,
            text: text.into(),
        }
    }

    /// Number of newlines embedded in the text (multi-line quoted strings).
    pub fn line_breaks(&self) -> usize {
        self.text.bytes().filter(|&b| b == b'\n').count()
    }

    /// The line on which the token ends.
    pub fn end_line(&self) -> usize {
        self.line + self.line_breaks()
    }

    pub fn is_open_brace(&self) -> bool {
        self.kind == TokenKind::OpenBrace
    }

    pub fn is_close_brace(&self) -> bool {
        self.kind == TokenKind::CloseBrace
    }

    /// Whether the token was written between quotes or backticks.
    pub fn is_quoted(&self) -> bool {
        matches!(self.kind, TokenKind::Quoted | TokenKind::Backtick)
    }

    /// Whether `next` continues the same source line as `self`.
    pub fn same_line_as(&self, next: &Token) -> bool {
        self.file == next.file && self.end_line() == next.line
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
