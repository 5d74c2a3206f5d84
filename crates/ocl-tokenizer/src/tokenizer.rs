//! Tokenizer for the OCL configuration language.

use crate::{Found, LexicalError, ScanOptions, Span, Token, TokenKind};
use tracing::trace;

/// A tokenizer that produces tokens from OCL source text.
///
/// Tokens are produced one per call to [`Tokenizer::next_token`]. Once the
/// input is exhausted every further call returns an end-of-input token at the
/// same position.
#[derive(Clone)]
pub struct Tokenizer<'src> {
    /// The source text being tokenized.
    source: &'src str,
    /// Byte position of `current` in `source`.
    pos: u32,
    /// The character under the cursor, `None` past the end of input.
    current: Option<char>,
    /// Line of `current`.
    line: u32,
    /// Column of `current`, in `options.columns` units.
    column: u32,
    options: ScanOptions,
}

/// Where a token started.
#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: u32,
    line: u32,
    column: u32,
}

impl<'src> Tokenizer<'src> {
    /// Create a new tokenizer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self::with_options(source, ScanOptions::default())
    }

    pub fn with_options(source: &'src str, options: ScanOptions) -> Self {
        Self {
            source,
            pos: 0,
            current: source.chars().next(),
            line: 1,
            column: 1,
            options,
        }
    }

    /// The source text being tokenized.
    #[inline]
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Get the current byte position.
    #[inline]
    pub fn position(&self) -> u32 {
        self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.current.is_none()
    }

    /// Consume the current character.
    ///
    /// A newline moves the cursor to column 1 of the next line; anything else
    /// advances the column by the character's width.
    fn bump(&mut self) {
        let Some(c) = self.current else {
            return;
        };
        self.pos += c.len_utf8() as u32;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += self.options.columns.width(c);
        }
        self.current = self.source[self.pos as usize..].chars().next();
    }

    #[inline]
    fn at_digit(&self) -> bool {
        matches!(self.current, Some(c) if c.is_ascii_digit())
    }

    #[inline]
    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    /// Create a token from `mark` to the current position.
    fn token(&self, kind: TokenKind, mark: Mark) -> Token<'src> {
        let span = Span::new(mark.pos, self.pos);
        let text = span.slice(self.source);
        trace!(?kind, line = mark.line, column = mark.column, text, "token");
        Token::new(kind, text, span, mark.line, mark.column)
    }

    fn single(&mut self, kind: TokenKind, mark: Mark) -> Token<'src> {
        self.bump();
        self.token(kind, mark)
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Token<'src> {
        // Only plain spaces separate tokens; tabs end up in symbols.
        while self.current == Some(' ') {
            self.bump();
        }

        let mark = self.mark();
        let Some(c) = self.current else {
            return self.token(TokenKind::Eof, mark);
        };

        match c {
            '0'..='9' | '-' => self.tokenize_number(mark),
            '"' => self.tokenize_string(mark),
            '<' => self.tokenize_heredoc(mark),
            '\n' => self.single(TokenKind::Newline, mark),
            '\r' => {
                self.bump();
                if self.current == Some('\n') {
                    self.bump();
                }
                self.token(TokenKind::Newline, mark)
            }
            '{' => self.single(TokenKind::OpenBrace, mark),
            '}' => self.single(TokenKind::CloseBrace, mark),
            '[' => self.single(TokenKind::OpenBracket, mark),
            ']' => self.single(TokenKind::CloseBracket, mark),
            '=' => self.single(TokenKind::Assign, mark),
            ',' => self.single(TokenKind::Separator, mark),
            _ => self.tokenize_symbol(mark),
        }
    }

    /// Tokenize an integer or decimal: `-?[0-9]+(\.+[0-9]*)*`.
    fn tokenize_number(&mut self, mark: Mark) -> Token<'src> {
        let mut kind = TokenKind::Integer;

        if self.current == Some('-') {
            self.bump();
            if !self.at_digit() {
                let found = Found::from_char(self.current);
                return self
                    .token(kind, mark)
                    .with_error(LexicalError::ExpectedDigit { found });
            }
        }

        let mut points = 0usize;
        while self.at_digit() {
            self.bump();
            while self.current == Some('.') {
                points += 1;
                kind = TokenKind::Decimal;
                self.bump();
            }
        }

        let token = self.token(kind, mark);
        if points > 1 {
            token.with_error(LexicalError::ExtraDecimalPoints { found: points })
        } else {
            token
        }
    }

    /// Tokenize a quoted string: `"..."`.
    ///
    /// A backslash keeps the next character inside the string; no escape
    /// processing happens here.
    fn tokenize_string(&mut self, mark: Mark) -> Token<'src> {
        // Opening quote
        self.bump();

        loop {
            match self.current {
                Some('"') => {
                    self.bump();
                    return self.token(TokenKind::String, mark);
                }
                None | Some('\n') => {
                    let found = Found::from_char(self.current);
                    return self
                        .token(TokenKind::String, mark)
                        .with_error(LexicalError::UnterminatedString { found });
                }
                Some('\\') => {
                    self.bump();
                    if matches!(self.current, Some(c) if c != '\n') {
                        self.bump();
                    }
                }
                Some(_) => self.bump(),
            }
        }
    }

    /// Tokenize a heredoc: `<<TAG` or `<<-TAG`, a newline, then every line up
    /// to and including the first one whose trimmed text is `TAG`.
    fn tokenize_heredoc(&mut self, mark: Mark) -> Token<'src> {
        let mut kind = TokenKind::Heredoc;

        // First `<`
        self.bump();
        if self.current != Some('<') {
            let found = Found::from_char(self.current);
            return self
                .token(kind, mark)
                .with_error(LexicalError::ExpectedHeredocMarker { found });
        }
        self.bump();

        if self.current == Some('-') {
            kind = TokenKind::IndentedHeredoc;
            self.bump();
        }

        let tag_start = self.pos as usize;
        while let Some(c) = self.current {
            if matches!(c, ' ' | '\n' | '\r') {
                break;
            }
            self.bump();
        }
        let tag = &self.source[tag_start..self.pos as usize];
        if tag.is_empty() {
            let found = Found::from_char(self.current);
            return self
                .token(kind, mark)
                .with_error(LexicalError::MissingHeredocTag { found });
        }

        while matches!(self.current, Some(' ' | '\r')) {
            self.bump();
        }
        if self.current != Some('\n') {
            let found = Found::from_char(self.current);
            return self
                .token(kind, mark)
                .with_error(LexicalError::ExpectedNewline { found });
        }
        self.bump();

        loop {
            if self.is_eof() {
                return self
                    .token(kind, mark)
                    .with_error(LexicalError::UnterminatedHeredoc {
                        tag: tag.to_string(),
                    });
            }

            let line_start = self.pos as usize;
            while let Some(c) = self.current {
                if c == '\n' || c == '\r' {
                    break;
                }
                self.bump();
            }
            if self.source[line_start..self.pos as usize].trim() == tag {
                // The newline after the end tag belongs to the next token.
                return self.token(kind, mark);
            }

            // Line terminator; a no-op at end of input.
            self.bump();
        }
    }

    /// Tokenize a bare word up to the next delimiter.
    fn tokenize_symbol(&mut self, mark: Mark) -> Token<'src> {
        while let Some(c) = self.current {
            if is_symbol_end(c) {
                break;
            }
            self.bump();
        }
        self.token(TokenKind::Symbol, mark)
    }
}

impl<'src> Iterator for Tokenizer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

/// Characters that end a symbol.
fn is_symbol_end(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | ' ' | '"' | '=' | '{' | '}' | '[' | ']' | ','
    )
}

/// Tokenize all of `source`, ending with the end-of-input token.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    tokenize_with_options(source, ScanOptions::default())
}

pub fn tokenize_with_options(source: &str, options: ScanOptions) -> Vec<Token<'_>> {
    let mut tokenizer = Tokenizer::with_options(source, options);
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.next_token();
        let done = token.is(TokenKind::Eof);
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}
