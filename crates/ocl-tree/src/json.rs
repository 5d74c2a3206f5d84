//! Nested JSON view of a document.
//!
//! The arena is unfolded into nested objects, one per node, tagged with a
//! `"type"` key. Parent links are left out; nesting already says who owns
//! whom.

use ocl_parse::{Document, LiteralKind, NodeId, NodeKind, Problem, Token};
use serde::Serialize;

/// A whole document: its top-level nodes in order.
#[derive(Debug, Serialize)]
pub struct DocumentJson<'a> {
    pub nodes: Vec<NodeJson<'a>>,
}

/// One node and everything below it.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NodeJson<'a> {
    Attribute {
        name: &'a Token<'a>,
        assign: &'a Token<'a>,
        value: Box<NodeJson<'a>>,
        problems: &'a [Problem],
    },
    Block {
        name: &'a Token<'a>,
        labels: &'a [Token<'a>],
        open: &'a Token<'a>,
        close: &'a Token<'a>,
        body: Vec<NodeJson<'a>>,
        problems: &'a [Problem],
    },
    Dictionary {
        open: &'a Token<'a>,
        close: &'a Token<'a>,
        entries: Vec<NodeJson<'a>>,
        problems: &'a [Problem],
    },
    Array {
        open: &'a Token<'a>,
        close: &'a Token<'a>,
        entries: Vec<NodeJson<'a>>,
        problems: &'a [Problem],
    },
    Literal {
        kind: LiteralKind,
        token: &'a Token<'a>,
        problems: &'a [Problem],
    },
    EndOfInput {
        token: &'a Token<'a>,
    },
    Recovery {
        token: &'a Token<'a>,
        problems: &'a [Problem],
    },
}

impl<'a> DocumentJson<'a> {
    pub fn new(document: &'a Document<'a>) -> Self {
        Self {
            nodes: document
                .roots()
                .iter()
                .map(|id| NodeJson::new(document, *id))
                .collect(),
        }
    }
}

impl<'a> NodeJson<'a> {
    pub fn new(document: &'a Document<'a>, id: NodeId) -> Self {
        let node = document.node(id);
        let problems = node.problems.as_slice();
        let nested = |ids: &[NodeId]| -> Vec<NodeJson<'a>> {
            ids.iter().map(|id| Self::new(document, *id)).collect()
        };

        match &node.kind {
            NodeKind::Attribute(attribute) => NodeJson::Attribute {
                name: &attribute.name,
                assign: &attribute.assign,
                value: Box::new(Self::new(document, attribute.value)),
                problems,
            },
            NodeKind::Block(block) => NodeJson::Block {
                name: &block.name,
                labels: &block.labels,
                open: &block.open,
                close: &block.close,
                body: nested(&block.body),
                problems,
            },
            NodeKind::Dictionary(dictionary) => NodeJson::Dictionary {
                open: &dictionary.open,
                close: &dictionary.close,
                entries: nested(&dictionary.entries),
                problems,
            },
            NodeKind::Array(array) => NodeJson::Array {
                open: &array.open,
                close: &array.close,
                entries: nested(&array.entries),
                problems,
            },
            NodeKind::Literal(literal) => NodeJson::Literal {
                kind: literal.kind,
                token: &literal.token,
                problems,
            },
            NodeKind::EndOfInput(token) => NodeJson::EndOfInput { token },
            NodeKind::Recovery(token) => NodeJson::Recovery { token, problems },
        }
    }
}

/// Convert `document` to a JSON value.
pub fn to_json(document: &Document<'_>) -> serde_json::Value {
    // All map keys are strings, so this cannot fail.
    serde_json::to_value(DocumentJson::new(document)).unwrap_or(serde_json::Value::Null)
}
