//! Error recovery strategies for the parser.
//!
//! After a parse error the parser skips ahead to a point where statement
//! parsing can resume, so that one run reports every independent error.

use super::Parser;
use crate::token::Token;

/// Synchronize to the next statement boundary.
pub fn sync_to_statement_boundary(parser: &mut Parser) {
    while !parser.at_eof() {
        match parser.current() {
            // Statement-starting tokens
            Token::Function
            | Token::Var
            | Token::Let
            | Token::Const
            | Token::If
            | Token::While
            | Token::Do
            | Token::For
            | Token::Switch
            | Token::Try
            | Token::Return
            | Token::Break
            | Token::Continue
            | Token::Throw
            | Token::With => {
                return;
            }

            // Semicolon marks end of previous statement
            Token::Semicolon => {
                parser.advance();
                return;
            }

            // Closing brace might end a block
            Token::RightBrace => {
                return;
            }

            _ => {
                parser.advance();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_to_statement_boundary() {
        let source = "invalid tokens var x = 42;";
        let mut parser = Parser::new(source).unwrap();

        parser.advance();
        parser.advance();

        sync_to_statement_boundary(&mut parser);

        assert!(matches!(parser.current(), Token::Var));
    }

    #[test]
    fn test_sync_consumes_semicolon() {
        let mut parser = Parser::new("a b ; c").unwrap();

        sync_to_statement_boundary(&mut parser);

        assert!(matches!(parser.current(), Token::Identifier(name) if name == "c"));
    }
}
