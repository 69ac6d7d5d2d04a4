//! Parser guard against stack overflow on deeply nested input

use super::{ParseError, Parser};

/// Maximum nesting depth of statements and expressions.
///
/// Each level costs several stack frames of recursive descent. Statements,
/// assignment expressions and unary operators each count as one level.
pub const MAX_PARSE_DEPTH: usize = 96;

/// Maximum depth of the tree one expression may produce.
///
/// Operator, member and call chains are parsed in a loop and never reach
/// [`MAX_PARSE_DEPTH`], but each link is one more level of the left-deep
/// tree that the visitors, the code generator and `Drop` recurse through.
/// Nesting levels count towards this limit as well.
pub const MAX_TREE_DEPTH: usize = 2048;

impl Parser {
    /// Run `f` one nesting level deeper, failing once the limit is exceeded.
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Parser) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_PARSE_DEPTH {
            return Err(ParseError::parser_limit_exceeded(
                format!("Maximum nesting depth ({}) exceeded", MAX_PARSE_DEPTH),
                self.current_span(),
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Run `f`, which extends a left-deep chain through [`Parser::link`].
    /// The links it made stop counting once the chain is complete.
    pub(crate) fn chain<T>(
        &mut self,
        f: impl FnOnce(&mut Parser, &mut usize) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let mut links = 0;
        let result = f(self, &mut links);
        self.links -= links;
        result
    }

    /// Count one more link of the chain being built.
    pub(crate) fn link(&mut self, links: &mut usize) -> Result<(), ParseError> {
        if self.depth + self.links >= MAX_TREE_DEPTH {
            return Err(ParseError::parser_limit_exceeded(
                format!("Expression too deep (more than {} levels)", MAX_TREE_DEPTH),
                self.current_span(),
            ));
        }
        self.links += 1;
        *links += 1;
        Ok(())
    }
}
