//! Indented text rendering of a document, for debugging and snapshots.

use std::fmt::Write;

use ocl_parse::{Document, NodeId, NodeKind, Token};

const INDENT: &str = "  ";

/// Render `document` one node per line, children indented below their owner
/// and problems as `! message` lines beneath the node they belong to.
pub fn dump(document: &Document<'_>) -> String {
    let mut out = String::new();
    for id in document.roots() {
        dump_node(document, *id, 0, &mut out);
    }
    out
}

fn dump_node(document: &Document<'_>, id: NodeId, depth: usize, out: &mut String) {
    let node = document.node(id);
    let indent = INDENT.repeat(depth);
    let _ = write!(out, "{indent}{}", node.kind.name());

    let first = match &node.kind {
        NodeKind::Attribute(attribute) => {
            let _ = write!(out, " {}", attribute.name.text);
            &attribute.name
        }
        NodeKind::Block(block) => {
            let _ = write!(out, " {}", block.name.text);
            for label in &block.labels {
                let _ = write!(out, " {}", escape(label.text));
            }
            &block.name
        }
        NodeKind::Dictionary(dictionary) => &dictionary.open,
        NodeKind::Array(array) => &array.open,
        NodeKind::Literal(literal) => {
            let _ = write!(out, " {} {}", literal.kind, escape(literal.token.text));
            &literal.token
        }
        NodeKind::EndOfInput(token) => token,
        NodeKind::Recovery(token) => {
            let _ = write!(out, " {}", escape(token.text));
            token
        }
    };
    let _ = writeln!(out, " @{}", position(first));

    for problem in &node.problems {
        let _ = writeln!(
            out,
            "{indent}{INDENT}! {} @{}:{}",
            problem.kind, problem.line, problem.column
        );
    }
    for child in node.children() {
        dump_node(document, *child, depth + 1, out);
    }
}

fn position(token: &Token<'_>) -> String {
    format!("{}:{}", token.line, token.column)
}

/// Keep every node on one line.
fn escape(text: &str) -> String {
    text.replace('\r', "\\r").replace('\n', "\\n")
}
