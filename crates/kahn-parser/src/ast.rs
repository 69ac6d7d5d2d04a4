//! Abstract syntax tree for ES5 JavaScript.
//!
//! Every node carries the [`Span`] of the source it was parsed from. Nodes
//! synthesized by a rewrite reuse the span of the node they replace.

pub mod expression;
pub mod statement;
pub mod visit_mut;
pub mod visitor;

pub use expression::*;
pub use statement::*;
pub use visit_mut::*;
pub use visitor::*;

pub use crate::token::Span;

/// A complete script: the statements of one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// A name in binding or reference position.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}
