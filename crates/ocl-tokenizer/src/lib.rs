//! A tokenizer for OCL, the block/attribute configuration language.
//!
//! Scanning never fails: malformed input still produces tokens, with a
//! [`LexicalError`] attached to the token that was malformed.

mod options;
pub use options::{ColumnUnit, ScanOptions};

mod span;
pub use span::Span;

mod token;
pub use token::{Found, LexicalError, Token, TokenKind};

mod tokenizer;
pub use tokenizer::{Tokenizer, tokenize, tokenize_with_options};
