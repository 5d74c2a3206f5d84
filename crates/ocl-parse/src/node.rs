//! Syntax tree nodes and the arena that owns them.

use std::fmt;

use ocl_tokenizer::{Span, Token, TokenKind};

use crate::Problem;

/// Index of a node in its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind of a literal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "kebab-case")
)]
pub enum LiteralKind {
    String,
    Integer,
    Decimal,
    Heredoc,
    IndentedHeredoc,
    True,
    False,
}

impl LiteralKind {
    /// The literal kind a token of `kind` produces on its own, if any.
    ///
    /// Booleans are symbols and are recognized by their text instead.
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::String => Some(LiteralKind::String),
            TokenKind::Integer => Some(LiteralKind::Integer),
            TokenKind::Decimal => Some(LiteralKind::Decimal),
            TokenKind::Heredoc => Some(LiteralKind::Heredoc),
            TokenKind::IndentedHeredoc => Some(LiteralKind::IndentedHeredoc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LiteralKind::String => "string",
            LiteralKind::Integer => "integer",
            LiteralKind::Decimal => "decimal",
            LiteralKind::Heredoc => "heredoc",
            LiteralKind::IndentedHeredoc => "indented-heredoc",
            LiteralKind::True => "true",
            LiteralKind::False => "false",
        }
    }
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `name = value`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Attribute<'src> {
    pub name: Token<'src>,
    pub assign: Token<'src>,
    /// A literal, dictionary, array, or recovery node.
    pub value: NodeId,
}

/// `name "label" ... { body }`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Block<'src> {
    pub name: Token<'src>,
    pub labels: Vec<Token<'src>>,
    pub open: Token<'src>,
    pub close: Token<'src>,
    /// Attributes, blocks, and recovery nodes.
    pub body: Vec<NodeId>,
}

/// `{ name = value ... }` in value position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Dictionary<'src> {
    pub open: Token<'src>,
    pub close: Token<'src>,
    /// Attributes only.
    pub entries: Vec<NodeId>,
}

/// `[ value, ... ]`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Array<'src> {
    pub open: Token<'src>,
    pub close: Token<'src>,
    /// Literals, dictionaries, and recovery nodes.
    pub entries: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Literal<'src> {
    pub token: Token<'src>,
    pub kind: LiteralKind,
}

/// The shape-specific part of a node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NodeKind<'src> {
    Attribute(Attribute<'src>),
    Block(Block<'src>),
    Dictionary(Dictionary<'src>),
    Array(Array<'src>),
    Literal(Literal<'src>),
    EndOfInput(Token<'src>),
    /// Wraps the token that broke a grammar expectation.
    Recovery(Token<'src>),
}

impl<'src> NodeKind<'src> {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Attribute(_) => "attribute",
            NodeKind::Block(_) => "block",
            NodeKind::Dictionary(_) => "dictionary",
            NodeKind::Array(_) => "array",
            NodeKind::Literal(_) => "literal",
            NodeKind::EndOfInput(_) => "end-of-input",
            NodeKind::Recovery(_) => "recovery",
        }
    }

    /// Child nodes in source order.
    pub fn children(&self) -> &[NodeId] {
        match self {
            NodeKind::Attribute(attribute) => std::slice::from_ref(&attribute.value),
            NodeKind::Block(block) => &block.body,
            NodeKind::Dictionary(dictionary) => &dictionary.entries,
            NodeKind::Array(array) => &array.entries,
            NodeKind::Literal(_) | NodeKind::EndOfInput(_) | NodeKind::Recovery(_) => &[],
        }
    }
}

/// A node in the syntax tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Node<'src> {
    pub kind: NodeKind<'src>,
    /// Problems detected while building this node.
    pub problems: Vec<Problem>,
    /// The node owning this one; `None` for top-level nodes.
    pub parent: Option<NodeId>,
}

impl<'src> Node<'src> {
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        self.kind.children()
    }

    pub fn as_attribute(&self) -> Option<&Attribute<'src>> {
        match &self.kind {
            NodeKind::Attribute(attribute) => Some(attribute),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block<'src>> {
        match &self.kind {
            NodeKind::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary<'src>> {
        match &self.kind {
            NodeKind::Dictionary(dictionary) => Some(dictionary),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array<'src>> {
        match &self.kind {
            NodeKind::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal<'src>> {
        match &self.kind {
            NodeKind::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn is_recovery(&self) -> bool {
        matches!(self.kind, NodeKind::Recovery(_))
    }
}

/// A parsed OCL source: the token buffer plus every node, top-level nodes
/// in order.
///
/// Nodes live in an arena and refer to each other by [`NodeId`], so parent
/// links never own anything.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Document<'src> {
    tokens: Vec<Token<'src>>,
    nodes: Vec<Node<'src>>,
    roots: Vec<NodeId>,
}

impl<'src> Document<'src> {
    pub(crate) fn new(tokens: Vec<Token<'src>>) -> Self {
        Self {
            tokens,
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Add a fully built node and point its children back at it.
    pub(crate) fn alloc(&mut self, kind: NodeKind<'src>, problems: Vec<Problem>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            problems,
            parent: None,
        });
        for i in 0..self.nodes[id.index()].children().len() {
            let child = self.nodes[id.index()].children()[i];
            let slot = &mut self.nodes[child.index()].parent;
            debug_assert!(slot.is_none(), "node {child:?} already has a parent");
            *slot = Some(id);
        }
        id
    }

    pub(crate) fn push_root(&mut self, id: NodeId) {
        self.roots.push(id);
    }

    /// The token buffer the tree was built from, ending in end-of-input.
    pub fn tokens(&self) -> &[Token<'src>] {
        &self.tokens
    }

    /// Top-level nodes in source order. The last one is always end-of-input.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Panics if `id` belongs to another document.
    pub fn node(&self, id: NodeId) -> &Node<'src> {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<'src>> {
        self.nodes.get(id.index())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    /// `id` and everything below it, in pre-order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_, 'src> {
        Descendants {
            document: self,
            stack: vec![id],
        }
    }

    /// Every node in the tree, in pre-order.
    pub fn walk(&self) -> Descendants<'_, 'src> {
        Descendants {
            document: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Every problem in the tree with the node it belongs to, in pre-order.
    pub fn problems(&self) -> impl Iterator<Item = (NodeId, &Problem)> + '_ {
        self.walk()
            .flat_map(move |id| self.node(id).problems.iter().map(move |p| (id, p)))
    }

    pub fn has_problems(&self) -> bool {
        self.nodes.iter().any(|node| !node.problems.is_empty())
    }

    /// Source range from the node's first token to its last.
    pub fn span(&self, id: NodeId) -> Span {
        match &self.node(id).kind {
            NodeKind::Attribute(attribute) => attribute.name.span.cover(self.span(attribute.value)),
            NodeKind::Block(block) => block.name.span.cover(block.close.span),
            NodeKind::Dictionary(dictionary) => dictionary.open.span.cover(dictionary.close.span),
            NodeKind::Array(array) => array.open.span.cover(array.close.span),
            NodeKind::Literal(literal) => literal.token.span,
            NodeKind::EndOfInput(token) | NodeKind::Recovery(token) => token.span,
        }
    }
}

/// Pre-order iterator over node ids, see [`Document::descendants`].
pub struct Descendants<'doc, 'src> {
    document: &'doc Document<'src>,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_, '_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.document.children(id).iter().rev().copied());
        Some(id)
    }
}
