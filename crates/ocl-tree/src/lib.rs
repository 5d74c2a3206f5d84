//! Services on top of OCL syntax trees: diagnostics with source context,
//! a nested JSON view, and an indented text dump.
//!
//! ```
//! let source = "a = [1 2]\n";
//! let doc = ocl_tree::parse(source);
//! let diagnostics = ocl_tree::collect_diagnostics(&doc);
//! assert_eq!(diagnostics[0].message, "missing separator");
//! ```

mod diagnostic;
mod dump;
mod json;

pub use diagnostic::{Diagnostic, Severity, collect_diagnostics};
pub use dump::dump;
pub use json::{DocumentJson, NodeJson, to_json};
pub use ocl_parse::{
    ColumnUnit, Document, Node, NodeId, NodeKind, Problem, ProblemKind, ScanOptions, Span, Token,
    TokenKind, parse, parse_with_options,
};
