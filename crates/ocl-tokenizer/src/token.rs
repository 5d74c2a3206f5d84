//! Token types for the OCL tokenizer.

use std::fmt;

use crate::Span;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TokenKind {
    // Structural tokens
    /// `,` between array items
    Separator,
    /// `=`
    Assign,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,

    // Literal tokens
    /// `1`, `-42`
    Integer,
    /// `1.5`, also malformed `1.2.3`
    Decimal,
    /// `"..."`, including the quotes
    String,
    /// `<<TAG` ... `TAG`
    Heredoc,
    /// `<<-TAG` ... `TAG`
    IndentedHeredoc,

    /// Bare word: names, `true`, `false`, and anything else unquoted
    Symbol,
    /// `\n`, `\r` or `\r\n`
    Newline,
    /// End of input
    Eof,
    /// Delimiter synthesized by the parser in place of a missing one
    Repair,
}

impl TokenKind {
    /// Whether this token may legally follow a value on the same line.
    pub fn ends_line(&self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Eof)
    }
}

/// What the tokenizer was looking at when it reported a lexical error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Found {
    EndOfInput,
    Newline,
    Whitespace,
    Char(char),
}

impl Found {
    pub(crate) fn from_char(c: Option<char>) -> Self {
        match c {
            None => Found::EndOfInput,
            Some('\n' | '\r') => Found::Newline,
            Some(' ' | '\t') => Found::Whitespace,
            Some(c) => Found::Char(c),
        }
    }
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Found::EndOfInput => write!(f, "end-of-input"),
            Found::Newline => write!(f, "newline"),
            Found::Whitespace => write!(f, "whitespace"),
            Found::Char(c) => write!(f, "`{c}`"),
        }
    }
}

/// Malformed syntax detected while producing a single token.
///
/// The tokenizer never stops on these: the token is still emitted with
/// whatever text was scanned, and the error rides along with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexicalError {
    /// A `-` not followed by a digit.
    ExpectedDigit { found: Found },
    /// A number with more than one decimal point.
    ExtraDecimalPoints { found: usize },
    /// A quoted string cut short by a newline or end of input.
    UnterminatedString { found: Found },
    /// A `<` not followed by a second `<`.
    ExpectedHeredocMarker { found: Found },
    /// `<<` (or `<<-`) not followed by a tag.
    MissingHeredocTag { found: Found },
    /// Something other than a newline after the heredoc tag.
    ExpectedNewline { found: Found },
    /// Input ended before a line holding the heredoc tag.
    UnterminatedHeredoc { tag: String },
}

impl fmt::Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexicalError::ExpectedDigit { found } => write!(f, "expected number; got {found}"),
            LexicalError::ExtraDecimalPoints { found } => {
                write!(f, "expected 1 decimal point; got {found}")
            }
            LexicalError::UnterminatedString { found } => {
                write!(f, "expected closing quote; got {found}")
            }
            LexicalError::ExpectedHeredocMarker { found } => write!(f, "expected `<`; got {found}"),
            LexicalError::MissingHeredocTag { found } => {
                write!(f, "expected heredoc tag; got {found}")
            }
            LexicalError::ExpectedNewline { found } => write!(f, "expected newline; got {found}"),
            LexicalError::UnterminatedHeredoc { tag } => {
                write!(f, "expected end tag \"{tag}\"; got end-of-input")
            }
        }
    }
}

impl std::error::Error for LexicalError {}

#[cfg(feature = "serde")]
impl serde::Serialize for LexicalError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A token with its kind, source text, and position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Token<'src> {
    /// The source text of this token.
    pub text: &'src str,
    /// 1-based line of the first character.
    pub line: u32,
    /// 1-based column of the first character, see [`crate::ColumnUnit`].
    pub column: u32,
    /// The kind of token.
    pub kind: TokenKind,
    /// The byte span in the source text.
    pub span: Span,
    /// Set when the token itself is malformed.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub error: Option<LexicalError>,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, text: &'src str, span: Span, line: u32, column: u32) -> Self {
        Self {
            text,
            line,
            column,
            kind,
            span,
            error: None,
        }
    }

    /// Attach a lexical error to this token.
    pub fn with_error(mut self, error: LexicalError) -> Self {
        self.error = Some(error);
        self
    }

    /// A synthesized delimiter placed at `at`'s position, covering no source text.
    pub fn repair(text: &'static str, at: &Token<'_>) -> Self {
        Self::new(
            TokenKind::Repair,
            text,
            Span::empty(at.span.start),
            at.line,
            at.column,
        )
    }

    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
