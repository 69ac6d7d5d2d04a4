//! Statement parsing

use super::expr::{
    parse_assignment, parse_binding_identifier, parse_expression, parse_expression_no_in,
    parse_function,
};
use super::{ParseError, Parser};
use crate::ast::*;
use crate::token::Token;

/// Parse a statement.
pub fn parse_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    parser.nested(|parser| match parser.current() {
        Token::Var | Token::Let | Token::Const => parse_variable_statement(parser),
        Token::Function => parse_function(parser, true).map(Statement::FunctionDecl),
        Token::LeftBrace => parse_block(parser).map(Statement::Block),
        Token::If => parse_if(parser),
        Token::For => parse_for(parser),
        Token::While => parse_while(parser),
        Token::Do => parse_do_while(parser),
        Token::Return => parse_return(parser),
        Token::Break | Token::Continue => parse_jump(parser),
        Token::Throw => parse_throw(parser),
        Token::Try => parse_try(parser),
        Token::Switch => parse_switch(parser),
        Token::With => parse_with(parser),
        Token::Debugger => {
            let span = parser.current_span();
            parser.advance();
            parser.consume_semicolon()?;
            Ok(Statement::Debugger(span))
        }
        Token::Semicolon => {
            let span = parser.current_span();
            parser.advance();
            Ok(Statement::Empty(span))
        }
        Token::Identifier(_) if matches!(parser.peek(), Some(Token::Colon)) => {
            parse_labeled(parser)
        }
        _ => parse_expression_statement(parser),
    })
}

fn parse_expression_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start = parser.current_span();
    let expression = parse_expression(parser)?;
    parser.consume_semicolon()?;

    Ok(Statement::Expression(ExpressionStatement {
        expression,
        span: parser.span_from(&start),
    }))
}

/// Parse a `{ ... }` block.
pub fn parse_block(parser: &mut Parser) -> Result<BlockStatement, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::LeftBrace)?;

    let mut statements = Vec::new();
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        statements.push(parse_statement(parser)?);
    }
    parser.expect(Token::RightBrace)?;

    Ok(BlockStatement {
        statements,
        span: parser.span_from(&start),
    })
}

fn parse_variable_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let decl = parse_variable_decl(parser, true)?;
    parser.consume_semicolon()?;
    Ok(Statement::VariableDecl(VariableDecl {
        span: parser.span_from(&decl.span),
        ..decl
    }))
}

/// Parse `var a = 1, b` without the terminating semicolon.
fn parse_variable_decl(parser: &mut Parser, allow_in: bool) -> Result<VariableDecl, ParseError> {
    let start = parser.current_span();
    let kind = match parser.current() {
        Token::Var => VariableKind::Var,
        Token::Let => VariableKind::Let,
        Token::Const => VariableKind::Const,
        _ => return Err(parser.unexpected_token(&[Token::Var, Token::Let, Token::Const])),
    };
    parser.advance();

    let mut declarations = Vec::new();
    loop {
        let name = parse_binding_identifier(parser)?;
        let init = if parser.eat(&Token::Equal) {
            Some(parse_assignment(parser, allow_in)?)
        } else {
            None
        };
        declarations.push(VariableDeclarator {
            span: parser.span_from(&name.span),
            name,
            init,
        });
        if !parser.eat(&Token::Comma) {
            break;
        }
    }

    Ok(VariableDecl {
        kind,
        declarations,
        span: parser.span_from(&start),
    })
}

fn parse_parenthesized(parser: &mut Parser) -> Result<Expression, ParseError> {
    parser.expect(Token::LeftParen)?;
    let expr = parse_expression(parser)?;
    parser.expect(Token::RightParen)?;
    Ok(expr)
}

fn parse_if(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::If)?;

    let test = parse_parenthesized(parser)?;
    let consequent = Box::new(parse_statement(parser)?);
    let alternate = if parser.eat(&Token::Else) {
        Some(Box::new(parse_statement(parser)?))
    } else {
        None
    };

    Ok(Statement::If(IfStatement {
        test,
        consequent,
        alternate,
        span: parser.span_from(&start),
    }))
}

fn parse_for(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::For)?;
    parser.expect(Token::LeftParen)?;

    let init = if parser.check(&Token::Semicolon) {
        None
    } else if parser.check_any(&[Token::Var, Token::Let, Token::Const]) {
        let decl = parse_variable_decl(parser, false)?;
        if parser.check(&Token::In) {
            if decl.declarations.len() != 1 {
                return Err(ParseError::invalid_syntax(
                    "for-in declaration must declare exactly one variable",
                    decl.span,
                ));
            }
            return parse_for_in_rest(parser, start, ForInTarget::VariableDecl(decl));
        }
        Some(ForInit::VariableDecl(decl))
    } else {
        let expr = parse_expression_no_in(parser)?;
        if parser.check(&Token::In) {
            if !expr.is_assignment_target() {
                return Err(ParseError::invalid_syntax(
                    "Invalid left-hand side in for-in",
                    *expr.span(),
                ));
            }
            return parse_for_in_rest(parser, start, ForInTarget::Expression(expr));
        }
        Some(ForInit::Expression(expr))
    };

    parser.expect(Token::Semicolon)?;
    let test = if parser.check(&Token::Semicolon) {
        None
    } else {
        Some(parse_expression(parser)?)
    };
    parser.expect(Token::Semicolon)?;
    let update = if parser.check(&Token::RightParen) {
        None
    } else {
        Some(parse_expression(parser)?)
    };
    parser.expect(Token::RightParen)?;
    let body = Box::new(parse_statement(parser)?);

    Ok(Statement::For(ForStatement {
        init,
        test,
        update,
        body,
        span: parser.span_from(&start),
    }))
}

/// Continue a `for (left in ...` after its left-hand side.
fn parse_for_in_rest(
    parser: &mut Parser,
    start: Span,
    left: ForInTarget,
) -> Result<Statement, ParseError> {
    parser.expect(Token::In)?;
    let right = parse_expression(parser)?;
    parser.expect(Token::RightParen)?;
    let body = Box::new(parse_statement(parser)?);

    Ok(Statement::ForIn(ForInStatement {
        left,
        right,
        body,
        span: parser.span_from(&start),
    }))
}

fn parse_while(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::While)?;

    let test = parse_parenthesized(parser)?;
    let body = Box::new(parse_statement(parser)?);

    Ok(Statement::While(WhileStatement {
        test,
        body,
        span: parser.span_from(&start),
    }))
}

fn parse_do_while(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::Do)?;

    let body = Box::new(parse_statement(parser)?);
    parser.expect(Token::While)?;
    let test = parse_parenthesized(parser)?;
    // A semicolon is always inserted after do-while
    parser.eat(&Token::Semicolon);

    Ok(Statement::DoWhile(DoWhileStatement {
        body,
        test,
        span: parser.span_from(&start),
    }))
}

/// Whether the statement being parsed ends at the current token.
fn at_statement_end(parser: &Parser) -> bool {
    parser.check(&Token::Semicolon)
        || parser.check(&Token::RightBrace)
        || parser.at_eof()
        || parser.newline_before()
}

fn parse_return(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::Return)?;

    let argument = if at_statement_end(parser) {
        None
    } else {
        Some(parse_expression(parser)?)
    };
    parser.consume_semicolon()?;

    Ok(Statement::Return(ReturnStatement {
        argument,
        span: parser.span_from(&start),
    }))
}

/// `break` and `continue`, with an optional label on the same line.
fn parse_jump(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start = parser.current_span();
    let is_break = matches!(parser.advance(), Token::Break);

    let label = match parser.current() {
        Token::Identifier(name) if !parser.newline_before() => Some(name.clone()),
        _ => None,
    };
    if label.is_some() {
        parser.advance();
    }
    parser.consume_semicolon()?;

    let span = parser.span_from(&start);
    Ok(if is_break {
        Statement::Break(BreakStatement { label, span })
    } else {
        Statement::Continue(ContinueStatement { label, span })
    })
}

fn parse_throw(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::Throw)?;

    if parser.newline_before() {
        return Err(ParseError::invalid_syntax(
            "Illegal newline after throw",
            parser.current_span(),
        ));
    }
    let argument = parse_expression(parser)?;
    parser.consume_semicolon()?;

    Ok(Statement::Throw(ThrowStatement {
        argument,
        span: parser.span_from(&start),
    }))
}

fn parse_try(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::Try)?;
    let block = parse_block(parser)?;

    let handler = if parser.check(&Token::Catch) {
        let catch_start = parser.current_span();
        parser.advance();
        parser.expect(Token::LeftParen)?;
        let param = parse_binding_identifier(parser)?;
        parser.expect(Token::RightParen)?;
        let body = parse_block(parser)?;
        Some(CatchClause {
            param,
            body,
            span: parser.span_from(&catch_start),
        })
    } else {
        None
    };

    let finalizer = if parser.eat(&Token::Finally) {
        Some(parse_block(parser)?)
    } else {
        None
    };

    if handler.is_none() && finalizer.is_none() {
        return Err(parser.unexpected_token(&[Token::Catch, Token::Finally]));
    }

    Ok(Statement::Try(TryStatement {
        block,
        handler,
        finalizer,
        span: parser.span_from(&start),
    }))
}

fn parse_switch(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::Switch)?;
    let discriminant = parse_parenthesized(parser)?;
    parser.expect(Token::LeftBrace)?;

    let mut cases = Vec::new();
    while !parser.check(&Token::RightBrace) {
        let case_start = parser.current_span();
        let test = if parser.eat(&Token::Case) {
            Some(parse_expression(parser)?)
        } else if parser.eat(&Token::Default) {
            None
        } else {
            return Err(parser.unexpected_token(&[Token::Case, Token::Default, Token::RightBrace]));
        };
        parser.expect(Token::Colon)?;

        let mut consequent = Vec::new();
        while !parser.check_any(&[Token::Case, Token::Default, Token::RightBrace]) && !parser.at_eof()
        {
            consequent.push(parse_statement(parser)?);
        }
        cases.push(SwitchCase {
            test,
            consequent,
            span: parser.span_from(&case_start),
        });
    }
    parser.expect(Token::RightBrace)?;

    Ok(Statement::Switch(SwitchStatement {
        discriminant,
        cases,
        span: parser.span_from(&start),
    }))
}

fn parse_labeled(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start = parser.current_span();
    let label = parse_binding_identifier(parser)?.name;
    parser.expect(Token::Colon)?;
    let body = Box::new(parse_statement(parser)?);

    Ok(Statement::Labeled(LabeledStatement {
        label,
        body,
        span: parser.span_from(&start),
    }))
}

fn parse_with(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::With)?;
    let object = parse_parenthesized(parser)?;
    let body = Box::new(parse_statement(parser)?);

    Ok(Statement::With(WithStatement {
        object,
        body,
        span: parser.span_from(&start),
    }))
}
