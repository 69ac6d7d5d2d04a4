//! Kahn JavaScript Parser
//!
//! Lexer, parser, code generator and name mangler for the ES5 subset of
//! JavaScript that kahn bundles.

pub mod ast;
pub mod codegen;
pub mod lexer;
pub mod mangle;
pub mod parser;
pub mod token;

pub use ast::Program;
pub use codegen::{generate, CodegenOptions};
pub use lexer::{LexError, Lexer};
pub use mangle::mangle;
pub use parser::{ParseError, ParseErrorKind, Parser};
pub use token::{Span, Token};

/// A lexical or grammatical error in a source file.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("{0}")]
    Lex(LexError),
    #[error("{0}")]
    Parse(ParseError),
}

impl SyntaxError {
    pub fn span(&self) -> Span {
        match self {
            SyntaxError::Lex(err) => err.span(),
            SyntaxError::Parse(err) => err.span,
        }
    }
}

/// Lex and parse `source` into a program.
pub fn parse(source: &str) -> Result<Program, Vec<SyntaxError>> {
    let parser = Parser::new(source)
        .map_err(|errors| errors.into_iter().map(SyntaxError::Lex).collect::<Vec<_>>())?;
    parser
        .parse()
        .map_err(|errors| errors.into_iter().map(SyntaxError::Parse).collect())
}
