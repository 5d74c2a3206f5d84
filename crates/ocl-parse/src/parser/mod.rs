//! Recursive-descent tree builder for OCL.
//!
//! The whole token stream is buffered up front and walked with an integer
//! cursor, which lets the builder look arbitrarily far ahead and step back
//! when an array turns out to have been left open.
//!
//! Statement builders (attributes, blocks, recovery at statement level) leave
//! the cursor after the construct. Value builders (literals, dictionaries,
//! arrays) leave it on their last token; the attribute owning the value steps
//! past it.

use ocl_tokenizer::{Token, TokenKind, Tokenizer};
use tracing::debug;

use crate::node::{Array, Attribute, Block, Dictionary, Literal, LiteralKind, NodeKind};
use crate::{Document, NodeId, Problem, ProblemKind};

/// Builds a [`Document`] from a token stream.
pub struct Parser<'src> {
    document: Document<'src>,
    /// Index of the current token. Always valid: the buffer ends in
    /// end-of-input and the cursor never moves past it.
    pos: usize,
    /// Number of blocks and dictionaries enclosing the cursor.
    depth: usize,
}

impl<'src> Parser<'src> {
    /// Drain `tokenizer` into the token buffer.
    pub fn new(mut tokenizer: Tokenizer<'src>) -> Self {
        let mut tokens = Vec::new();
        loop {
            let token = tokenizer.next_token();
            let done = token.is(TokenKind::Eof);
            tokens.push(token);
            if done {
                break;
            }
        }
        Self::from_tokens(tokens)
    }

    /// Parse an already tokenized buffer.
    ///
    /// Anything after the first end-of-input token is dropped. If there is no
    /// end-of-input token, one is appended at the end of the last token.
    pub fn from_tokens(mut tokens: Vec<Token<'src>>) -> Self {
        if let Some(eof) = tokens.iter().position(|t| t.is(TokenKind::Eof)) {
            tokens.truncate(eof + 1);
        } else {
            let eof = match tokens.last() {
                Some(last) => Token::new(
                    TokenKind::Eof,
                    "",
                    ocl_tokenizer::Span::empty(last.span.end),
                    last.line,
                    last.column,
                ),
                None => Token::new(TokenKind::Eof, "", ocl_tokenizer::Span::empty(0), 1, 1),
            };
            tokens.push(eof);
        }

        Self {
            document: Document::new(tokens),
            pos: 0,
            depth: 0,
        }
    }

    /// Build the tree. The top-level list always ends with an end-of-input node.
    pub fn parse(mut self) -> Document<'src> {
        loop {
            self.skip_newlines();
            if self.at(TokenKind::Eof) {
                break;
            }
            let before = self.pos;
            let id = self.statement();
            debug_assert!(self.pos > before, "no progress at token {before}");
            self.document.push_root(id);
        }

        let eof = self.current().clone();
        let id = self.document.alloc(NodeKind::EndOfInput(eof), Vec::new());
        self.document.push_root(id);
        self.document
    }

    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    #[inline]
    fn tokens(&self) -> &[Token<'src>] {
        self.document.tokens()
    }

    #[inline]
    fn current(&self) -> &Token<'src> {
        &self.tokens()[self.pos]
    }

    #[inline]
    fn kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    /// The token `offset` positions away, clamped to the buffer.
    fn peek(&self, offset: isize) -> &Token<'src> {
        let last = self.tokens().len() as isize - 1;
        let index = (self.pos as isize + offset).clamp(0, last);
        &self.tokens()[index as usize]
    }

    #[inline]
    fn peek_kind(&self, offset: isize) -> TokenKind {
        self.peek(offset).kind
    }

    /// Move to the next token, staying on end-of-input once there.
    fn advance(&mut self) {
        if self.pos + 1 < self.tokens().len() {
            self.pos += 1;
        }
    }

    /// Take the current token and advance.
    fn take(&mut self) -> Token<'src> {
        let token = self.current().clone();
        self.advance();
        token
    }

    fn skip_newlines(&mut self) {
        while self.at(TokenKind::Newline) {
            self.advance();
        }
    }

    /// Whether the current symbol starts an attribute or a block:
    /// `name =`, `name {`, or `name "label"... {`.
    fn starts_definition(&self) -> bool {
        if !self.at(TokenKind::Symbol) {
            return false;
        }
        match self.peek_kind(1) {
            TokenKind::Assign | TokenKind::OpenBrace => true,
            TokenKind::String => {
                let mut offset = 2;
                while self.peek_kind(offset) == TokenKind::String {
                    offset += 1;
                }
                self.peek_kind(offset) == TokenKind::OpenBrace
            }
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    fn problem(&self, kind: ProblemKind, token: &Token<'src>) -> Problem {
        debug!(
            problem = %kind,
            line = token.line,
            column = token.column,
            text = token.text,
            "problem"
        );
        Problem::at(kind, token)
    }

    fn recovery(&mut self, kind: ProblemKind, token: Token<'src>) -> NodeId {
        let problems = vec![self.problem(kind, &token)];
        self.document.alloc(NodeKind::Recovery(token), problems)
    }

    /// An attribute, a block, or a recovery node. Always advances.
    fn statement(&mut self) -> NodeId {
        self.skip_newlines();
        match self.kind() {
            TokenKind::Symbol => self.definition(),
            _ => {
                let token = self.take();
                self.recovery(ProblemKind::ExpectedName, token)
            }
        }
    }

    /// Decide between attribute and block from the tokens after the name.
    fn definition(&mut self) -> NodeId {
        let mut offset = 1;
        while self.peek_kind(offset) == TokenKind::Newline {
            offset += 1;
        }

        if offset == 1 {
            return match self.peek_kind(1) {
                TokenKind::Assign => self.attribute(None),
                TokenKind::String | TokenKind::OpenBrace => self.block(None),
                _ => {
                    let token = self.take();
                    self.recovery(ProblemKind::ExpectedDefinition, token)
                }
            };
        }

        // The name is separated from what follows by line breaks.
        let newline = self.peek(1).clone();
        match self.peek_kind(offset) {
            TokenKind::Assign => self.attribute(Some(newline)),
            TokenKind::String | TokenKind::OpenBrace => self.block(Some(newline)),
            _ => {
                let token = self.take();
                self.recovery(ProblemKind::ExpectedDefinition, token)
            }
        }
    }

    /// `name = value`. `newline` is the line break found between the name
    /// and `=`, if any.
    fn attribute(&mut self, newline: Option<Token<'src>>) -> NodeId {
        let name = self.take();
        let mut problems = Vec::new();
        if let Some(newline) = newline {
            problems.push(self.problem(ProblemKind::NewlineBeforeAssign, &newline));
            self.skip_newlines();
        }
        let assign = self.take();
        let value = self.value();
        self.advance();

        self.document.alloc(
            NodeKind::Attribute(Attribute {
                name,
                assign,
                value,
            }),
            problems,
        )
    }

    /// The value after `=`. Leaves the cursor on the value's last token.
    fn value(&mut self) -> NodeId {
        let kind = self.kind();
        if let Some(literal) = LiteralKind::from_token_kind(kind) {
            return self.literal(literal, true);
        }
        match kind {
            TokenKind::OpenBrace => self.dictionary(),
            TokenKind::OpenBracket => self.array(),
            _ => match self.current().text {
                "true" => self.literal(LiteralKind::True, true),
                "false" => self.literal(LiteralKind::False, true),
                _ => {
                    let token = self.current().clone();
                    // Leave a closing `}` to the enclosing block or dictionary.
                    if token.is(TokenKind::CloseBrace) && self.depth > 0 {
                        self.pos -= 1;
                    }
                    self.recovery(ProblemKind::ExpectedValue, token)
                }
            },
        }
    }

    /// The current token as a literal. Does not advance.
    fn literal(&mut self, kind: LiteralKind, require_newline: bool) -> NodeId {
        let token = self.current().clone();
        let mut problems = Vec::new();
        if require_newline && !self.peek_kind(1).ends_line() {
            problems.push(self.problem(ProblemKind::ExpectedNewlineAfterValue, self.peek(1)));
        }
        if let Some(error) = &token.error {
            problems.push(self.problem(ProblemKind::Lexical(error.clone()), &token));
        }
        self.document
            .alloc(NodeKind::Literal(Literal { token, kind }), problems)
    }

    /// `[ value, ... ]`
    fn array(&mut self) -> NodeId {
        let open = self.take();
        let mut entries = Vec::new();
        let mut problems = Vec::new();

        loop {
            self.skip_newlines();
            if matches!(self.kind(), TokenKind::CloseBracket | TokenKind::Eof) {
                break;
            }

            // An array left open right before the next definition: end it
            // here and give the definition back to the enclosing statement.
            if self.starts_definition() {
                debug!(
                    line = self.current().line,
                    column = self.current().column,
                    "array ends before next definition"
                );
                self.pos -= 1;
                break;
            }

            entries.push(self.array_element());
            self.advance();

            if self.at(TokenKind::Separator) {
                self.advance();
                continue;
            }
            if self.at(TokenKind::CloseBracket) {
                continue;
            }
            self.skip_newlines();
            if self.at(TokenKind::Separator) {
                self.advance();
                continue;
            }
            if !matches!(self.kind(), TokenKind::CloseBracket | TokenKind::Eof)
                && !self.starts_definition()
            {
                problems.push(self.problem(ProblemKind::MissingSeparator, self.current()));
            }
        }

        let close = if self.at(TokenKind::CloseBracket) {
            self.current().clone()
        } else {
            problems.push(self.problem(ProblemKind::MissingCloseBracket, self.current()));
            Token::repair("]", self.current())
        };

        self.document
            .alloc(NodeKind::Array(Array { open, close, entries }), problems)
    }

    /// One array element. Leaves the cursor on its last token.
    fn array_element(&mut self) -> NodeId {
        match self.kind() {
            TokenKind::String => self.literal(LiteralKind::String, false),
            TokenKind::Integer => self.literal(LiteralKind::Integer, false),
            TokenKind::Decimal => self.literal(LiteralKind::Decimal, false),
            TokenKind::OpenBrace => self.dictionary(),
            _ => {
                let token = self.current().clone();
                self.recovery(ProblemKind::ExpectedLiteral, token)
            }
        }
    }

    /// `{ name = value ... }` in value position.
    fn dictionary(&mut self) -> NodeId {
        let open = self.take();
        let mut entries = Vec::new();
        let mut problems = Vec::new();

        self.depth += 1;
        let close = loop {
            self.skip_newlines();
            match self.kind() {
                TokenKind::CloseBrace => break self.current().clone(),
                TokenKind::Eof => {
                    problems.push(self.problem(ProblemKind::MissingCloseBrace, self.current()));
                    break Token::repair("}", self.current());
                }
                TokenKind::Symbol if self.peek_kind(1) == TokenKind::Assign => {
                    entries.push(self.attribute(None));
                }
                _ => {
                    problems.push(self.problem(ProblemKind::ExpectedDictionaryEntry, self.current()));
                    self.advance();
                }
            }
        };
        self.depth -= 1;

        self.document.alloc(
            NodeKind::Dictionary(Dictionary {
                open,
                close,
                entries,
            }),
            problems,
        )
    }

    /// `name "label"... { body }`. `newline` is the line break found between
    /// the name and `{`, if any.
    fn block(&mut self, newline: Option<Token<'src>>) -> NodeId {
        let name = self.take();
        let mut problems = Vec::new();
        if let Some(newline) = newline {
            problems.push(self.problem(ProblemKind::NewlineBeforeBlock, &newline));
            self.skip_newlines();
        }

        let mut labels = Vec::new();
        while self.at(TokenKind::String) {
            labels.push(self.take());
        }

        let open = if self.at(TokenKind::OpenBrace) {
            self.take()
        } else {
            problems.push(self.problem(ProblemKind::MissingOpenBrace, self.current()));
            Token::repair("{", self.peek(-1))
        };

        // `name {}` may stay on one line; anything else after `{` may not.
        // A missing `{` is already reported at the same token.
        if !open.is(TokenKind::Repair)
            && !matches!(
                self.kind(),
                TokenKind::Newline | TokenKind::CloseBrace | TokenKind::Eof
            )
        {
            problems.push(self.problem(ProblemKind::MissingNewline, self.current()));
        }

        self.depth += 1;
        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            if matches!(self.kind(), TokenKind::CloseBrace | TokenKind::Eof) {
                break;
            }
            let before = self.pos;
            body.push(self.statement());
            debug_assert!(self.pos > before, "no progress at token {before}");
        }
        self.depth -= 1;

        let close = if self.at(TokenKind::CloseBrace) {
            self.take()
        } else {
            problems.push(self.problem(ProblemKind::MissingCloseBrace, self.current()));
            Token::repair("}", self.current())
        };

        self.document.alloc(
            NodeKind::Block(Block {
                name,
                labels,
                open,
                close,
                body,
            }),
            problems,
        )
    }
}

#[cfg(test)]
mod tests;
