//! Parser for ES5 JavaScript
//!
//! This module implements a recursive descent parser that transforms
//! a token stream from the lexer into an Abstract Syntax Tree (AST).

pub mod error;
pub mod expr;
pub mod guards;
pub mod precedence;
pub mod recovery;
pub mod stmt;

use crate::ast::*;
use crate::lexer::{LexError, Lexer};
use crate::token::{Span, Token};

pub use error::{ParseError, ParseErrorKind};

/// Parser state.
///
/// Automatic semicolon insertion needs to know whether a line terminator
/// separates two tokens; that is computed once from the source and kept
/// alongside the token stream.
pub struct Parser {
    /// Pre-tokenized input
    tokens: Vec<(Token, Span)>,

    /// `line_breaks[i]` is true when a line terminator precedes token `i`
    line_breaks: Vec<bool>,

    /// Current position in token stream
    pos: usize,

    /// Current nesting depth, see [`guards::MAX_PARSE_DEPTH`]
    depth: usize,

    /// Links of the operator and member chains under construction, see
    /// [`guards::MAX_TREE_DEPTH`]
    links: usize,

    /// Accumulated parse errors (allows continuing after errors)
    errors: Vec<ParseError>,
}

impl Parser {
    /// Create a new parser from source code.
    pub fn new(source: &str) -> Result<Self, Vec<LexError>> {
        let tokens = Lexer::new(source).tokenize()?;

        let mut line_breaks = Vec::with_capacity(tokens.len());
        let mut previous_end = 0;
        for (_, span) in &tokens {
            let gap = &source[previous_end..span.start];
            line_breaks.push(gap.contains(&['\n', '\r', '\u{2028}', '\u{2029}'][..]));
            previous_end = span.end;
        }

        Ok(Self {
            tokens,
            line_breaks,
            pos: 0,
            depth: 0,
            links: 0,
            errors: Vec::new(),
        })
    }

    /// Parse the entire source file into a Program.
    ///
    /// Returns the Program on success, or all accumulated errors on failure.
    pub fn parse(mut self) -> Result<Program, Vec<ParseError>> {
        let start_span = self.current_span();
        let mut statements = Vec::new();

        while !self.at_eof() {
            let before = self.pos;
            match stmt::parse_statement(&mut self) {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    recovery::sync_to_statement_boundary(&mut self);
                    // A stray `}` at top level would otherwise stall the loop
                    if self.pos == before {
                        self.advance();
                    }
                }
            }
        }

        let span = self.combine_spans(&start_span, &self.current_span());

        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        Ok(Program { statements, span })
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Get the current token.
    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    /// Get the current token's span.
    #[inline]
    pub fn current_span(&self) -> Span {
        self.tokens[self.pos].1
    }

    /// Span of the most recently consumed token.
    #[inline]
    pub fn previous_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].1
    }

    /// Peek at the next token (lookahead).
    #[inline]
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1).map(|(tok, _)| tok)
    }

    /// Advance to the next token, returning the previous current token.
    pub fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].0.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    /// Check if the current token matches the given kind.
    #[inline]
    pub fn check(&self, expected: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(expected)
    }

    /// Check if the current token matches any of the given kinds.
    pub fn check_any(&self, expected: &[Token]) -> bool {
        expected.iter().any(|tok| self.check(tok))
    }

    /// Consume the current token if it matches, reporting whether it did.
    pub fn eat(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Check if we've reached EOF.
    #[inline]
    pub fn at_eof(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    /// Whether a line terminator separates the current token from the previous one.
    #[inline]
    pub fn newline_before(&self) -> bool {
        self.pos > 0 && self.line_breaks[self.pos]
    }

    /// Consume the current token if it matches the expected kind.
    pub fn expect(&mut self, expected: Token) -> Result<Token, ParseError> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected_token(&[expected]))
        }
    }

    /// Terminate a statement, inserting a semicolon where ES5 allows it:
    /// before `}`, at end of input, and after a line break.
    pub fn consume_semicolon(&mut self) -> Result<(), ParseError> {
        if self.eat(&Token::Semicolon)
            || self.check(&Token::RightBrace)
            || self.at_eof()
            || self.newline_before()
        {
            Ok(())
        } else {
            Err(self.unexpected_token(&[Token::Semicolon]))
        }
    }

    // ========================================================================
    // Error Handling
    // ========================================================================

    /// Create an "unexpected token" error at the current position.
    pub fn unexpected_token(&self, expected: &[Token]) -> ParseError {
        let span = self.current_span();
        if self.at_eof() {
            ParseError::unexpected_eof(expected.to_vec(), span)
        } else {
            ParseError::unexpected_token(expected.to_vec(), self.current().clone(), span)
        }
    }

    // ========================================================================
    // Utilities
    // ========================================================================

    /// Combine two spans into a single span.
    pub fn combine_spans(&self, start: &Span, end: &Span) -> Span {
        Span {
            start: start.start,
            end: end.end.max(start.start),
            line: start.line,
            column: start.column,
        }
    }

    /// Span from `start` through the most recently consumed token.
    pub fn span_from(&self, start: &Span) -> Span {
        self.combine_spans(start, &self.previous_span())
    }
}
