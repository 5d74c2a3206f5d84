//! Error-tolerant syntax tree builder for OCL.
//!
//! Parsing never fails. Malformed input still yields a complete
//! [`Document`]; what went wrong is recorded as [`Problem`]s on the nodes
//! built around it, and missing delimiters are filled in with repair tokens.
//!
//! ```
//! let doc = ocl_parse::parse("server \"web\" {\n  port = 8080\n}\n");
//! assert!(!doc.has_problems());
//! assert_eq!(doc.roots().len(), 2); // the block and end-of-input
//! ```

pub use ocl_tokenizer::{
    ColumnUnit, Found, LexicalError, ScanOptions, Span, Token, TokenKind, Tokenizer,
};

mod node;
pub use node::{
    Array, Attribute, Block, Descendants, Dictionary, Document, Literal, LiteralKind, Node,
    NodeId, NodeKind,
};

mod problem;
pub use problem::{Problem, ProblemKind};

mod parser;
pub use parser::Parser;

/// Parse `source` with default scan options.
pub fn parse(source: &str) -> Document<'_> {
    Parser::new(Tokenizer::new(source)).parse()
}

/// Parse `source`, counting columns as `options` says.
pub fn parse_with_options(source: &str, options: ScanOptions) -> Document<'_> {
    Parser::new(Tokenizer::with_options(source, options)).parse()
}
