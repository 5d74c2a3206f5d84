//! Structural problems recorded on syntax tree nodes.

use std::fmt;

use ocl_tokenizer::{LexicalError, Span, Token};

/// What expectation a node violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemKind {
    /// A symbol followed by something other than `=`, a label, or `{`.
    ExpectedDefinition,
    /// A statement that does not start with a symbol.
    ExpectedName,
    /// Nothing usable after `=`.
    ExpectedValue,
    /// More tokens on the line after a literal value.
    ExpectedNewlineAfterValue,
    /// An array element that is neither a literal nor a dictionary.
    ExpectedLiteral,
    /// Dictionary content that is not an attribute.
    ExpectedDictionaryEntry,
    /// Two array elements without a `,` between them.
    MissingSeparator,
    /// An array that was never closed.
    MissingCloseBracket,
    /// A block name not followed by `{`.
    MissingOpenBrace,
    /// A block or dictionary that was never closed.
    MissingCloseBrace,
    /// Content on the same line as a block's `{`.
    MissingNewline,
    /// A newline between an attribute name and its `=`.
    NewlineBeforeAssign,
    /// A newline between a block name and its `{`.
    NewlineBeforeBlock,
    /// A malformed token surfaced through the node built from it.
    Lexical(LexicalError),
}

impl ProblemKind {
    pub fn is_lexical(&self) -> bool {
        matches!(self, ProblemKind::Lexical(_))
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemKind::ExpectedDefinition => write!(f, "expected attribute or block definition"),
            ProblemKind::ExpectedName => write!(f, "expected assignment name or block name"),
            ProblemKind::ExpectedValue => write!(
                f,
                "expected literal, dictionary, or array after assignment operator"
            ),
            ProblemKind::ExpectedNewlineAfterValue => write!(f, "expected newline after value"),
            ProblemKind::ExpectedLiteral => write!(f, "expected literal"),
            ProblemKind::ExpectedDictionaryEntry => write!(f, "expected attribute in dictionary"),
            ProblemKind::MissingSeparator => write!(f, "missing separator"),
            ProblemKind::MissingCloseBracket => write!(f, "missing `]`"),
            ProblemKind::MissingOpenBrace => write!(f, "missing `{{`"),
            ProblemKind::MissingCloseBrace => write!(f, "missing `}}`"),
            ProblemKind::MissingNewline => write!(f, "missing newline after `{{`"),
            ProblemKind::NewlineBeforeAssign => write!(
                f,
                "unexpected newline; name and `=` must be on the same line"
            ),
            ProblemKind::NewlineBeforeBlock => write!(
                f,
                "unexpected newline; block name and `{{` must be on the same line"
            ),
            ProblemKind::Lexical(error) => write!(f, "{error}"),
        }
    }
}

/// A problem attached to a node, located at the token where it was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub kind: ProblemKind,
    pub span: Span,
    pub line: u32,
    pub column: u32,
}

impl Problem {
    pub fn at(kind: ProblemKind, token: &Token<'_>) -> Self {
        Self {
            kind,
            span: token.span,
            line: token.line,
            column: token.column,
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.kind, self.line, self.column)
    }
}

impl std::error::Error for Problem {}

#[cfg(feature = "serde")]
impl serde::Serialize for Problem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.kind)
    }
}
