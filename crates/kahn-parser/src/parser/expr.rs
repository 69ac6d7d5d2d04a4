//! Expression parsing
//!
//! Precedence climbing for binary operators, recursive descent for
//! everything else. The `allow_in` flag threads the ES5 `NoIn` grammar
//! variant through to the binary operator loop so that `for (a in b)` and
//! `for (x = a in b;;)` are told apart.

use super::precedence::{infix_operator, InfixOperator, Precedence};
use super::stmt::parse_statement;
use super::{ParseError, Parser};
use crate::ast::*;
use crate::token::Token;

/// Parse a full expression, including comma sequences.
pub fn parse_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    parse_sequence(parser, true)
}

/// Parse a full expression in which a bare `in` is not an operator.
pub fn parse_expression_no_in(parser: &mut Parser) -> Result<Expression, ParseError> {
    parse_sequence(parser, false)
}

fn parse_sequence(parser: &mut Parser, allow_in: bool) -> Result<Expression, ParseError> {
    let first = parse_assignment(parser, allow_in)?;
    if !parser.check(&Token::Comma) {
        return Ok(first);
    }

    let start = *first.span();
    let mut expressions = vec![first];
    while parser.eat(&Token::Comma) {
        expressions.push(parse_assignment(parser, allow_in)?);
    }

    Ok(Expression::Sequence(SequenceExpression {
        expressions,
        span: parser.span_from(&start),
    }))
}

/// Parse an assignment expression (the ES5 `AssignmentExpression`).
pub fn parse_assignment(parser: &mut Parser, allow_in: bool) -> Result<Expression, ParseError> {
    parser.nested(|parser| {
        let target = parse_conditional(parser, allow_in)?;
        let Some(operator) = assignment_operator(parser.current()) else {
            return Ok(target);
        };

        if !target.is_assignment_target() {
            return Err(ParseError::invalid_syntax(
                "Invalid assignment target",
                *target.span(),
            ));
        }
        parser.advance();

        let value = parse_assignment(parser, allow_in)?;
        let span = parser.combine_spans(target.span(), value.span());
        Ok(Expression::Assignment(AssignmentExpression {
            operator,
            target: Box::new(target),
            value: Box::new(value),
            span,
        }))
    })
}

fn assignment_operator(token: &Token) -> Option<AssignmentOperator> {
    let op = match token {
        Token::Equal => AssignmentOperator::Assign,
        Token::PlusEqual => AssignmentOperator::AddAssign,
        Token::MinusEqual => AssignmentOperator::SubtractAssign,
        Token::StarEqual => AssignmentOperator::MultiplyAssign,
        Token::SlashEqual => AssignmentOperator::DivideAssign,
        Token::PercentEqual => AssignmentOperator::ModuloAssign,
        Token::LessLessEqual => AssignmentOperator::LeftShiftAssign,
        Token::GreaterGreaterEqual => AssignmentOperator::RightShiftAssign,
        Token::GreaterGreaterGreaterEqual => AssignmentOperator::UnsignedRightShiftAssign,
        Token::AmpEqual => AssignmentOperator::BitwiseAndAssign,
        Token::PipeEqual => AssignmentOperator::BitwiseOrAssign,
        Token::CaretEqual => AssignmentOperator::BitwiseXorAssign,
        _ => return None,
    };
    Some(op)
}

fn parse_conditional(parser: &mut Parser, allow_in: bool) -> Result<Expression, ParseError> {
    let test = parse_binary(parser, Precedence::LogicalOr, allow_in)?;
    if !parser.eat(&Token::Question) {
        return Ok(test);
    }

    let consequent = parse_assignment(parser, true)?;
    parser.expect(Token::Colon)?;
    let alternate = parse_assignment(parser, allow_in)?;

    let span = parser.combine_spans(test.span(), alternate.span());
    Ok(Expression::Conditional(ConditionalExpression {
        test: Box::new(test),
        consequent: Box::new(consequent),
        alternate: Box::new(alternate),
        span,
    }))
}

fn parse_binary(
    parser: &mut Parser,
    min: Precedence,
    allow_in: bool,
) -> Result<Expression, ParseError> {
    parser.chain(|parser, links| parse_binary_chain(parser, min, allow_in, links))
}

fn parse_binary_chain(
    parser: &mut Parser,
    min: Precedence,
    allow_in: bool,
    links: &mut usize,
) -> Result<Expression, ParseError> {
    let mut left = parse_unary(parser)?;

    while let Some((operator, precedence)) = infix_operator(parser.current(), allow_in) {
        if precedence < min {
            break;
        }
        parser.link(links)?;
        parser.advance();

        // All ES5 binary operators are left-associative
        let right = parse_binary(parser, precedence.tighter(), allow_in)?;
        let span = parser.combine_spans(left.span(), right.span());
        left = match operator {
            InfixOperator::Binary(operator) => Expression::Binary(BinaryExpression {
                operator,
                left: Box::new(left),
                right: Box::new(right),
                span,
            }),
            InfixOperator::Logical(operator) => Expression::Logical(LogicalExpression {
                operator,
                left: Box::new(left),
                right: Box::new(right),
                span,
            }),
        };
    }

    Ok(left)
}

fn parse_unary(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start = parser.current_span();
    let operator = match parser.current() {
        Token::Bang => UnaryOperator::Not,
        Token::Tilde => UnaryOperator::BitwiseNot,
        Token::Plus => UnaryOperator::Plus,
        Token::Minus => UnaryOperator::Minus,
        Token::Typeof => UnaryOperator::Typeof,
        Token::Void => UnaryOperator::Void,
        Token::Delete => UnaryOperator::Delete,
        Token::PlusPlus | Token::MinusMinus => return parse_prefix_update(parser),
        _ => return parse_postfix(parser),
    };
    parser.advance();

    let argument = parser.nested(parse_unary)?;
    Ok(Expression::Unary(UnaryExpression {
        operator,
        span: parser.combine_spans(&start, argument.span()),
        argument: Box::new(argument),
    }))
}

fn parse_prefix_update(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start = parser.current_span();
    let operator = if matches!(parser.advance(), Token::PlusPlus) {
        UpdateOperator::Increment
    } else {
        UpdateOperator::Decrement
    };

    let argument = parser.nested(parse_unary)?;
    if !argument.is_assignment_target() {
        return Err(ParseError::invalid_syntax(
            "Invalid operand for prefix operator",
            *argument.span(),
        ));
    }

    Ok(Expression::Update(UpdateExpression {
        operator,
        prefix: true,
        span: parser.combine_spans(&start, argument.span()),
        argument: Box::new(argument),
    }))
}

fn parse_postfix(parser: &mut Parser) -> Result<Expression, ParseError> {
    let expr = parse_left_hand_side(parser)?;

    // Restricted production: no line break before postfix ++/--
    let operator = match parser.current() {
        Token::PlusPlus if !parser.newline_before() => UpdateOperator::Increment,
        Token::MinusMinus if !parser.newline_before() => UpdateOperator::Decrement,
        _ => return Ok(expr),
    };

    if !expr.is_assignment_target() {
        return Err(ParseError::invalid_syntax(
            "Invalid operand for postfix operator",
            *expr.span(),
        ));
    }
    parser.advance();

    Ok(Expression::Update(UpdateExpression {
        operator,
        prefix: false,
        span: parser.span_from(expr.span()),
        argument: Box::new(expr),
    }))
}

/// Member access, calls, and `new`.
fn parse_left_hand_side(parser: &mut Parser) -> Result<Expression, ParseError> {
    parser.chain(parse_left_hand_side_chain)
}

fn parse_left_hand_side_chain(
    parser: &mut Parser,
    links: &mut usize,
) -> Result<Expression, ParseError> {
    let mut expr = if parser.check(&Token::New) {
        parse_new(parser)?
    } else {
        parse_primary(parser)?
    };

    loop {
        if parser.check_any(&[Token::Dot, Token::LeftBracket, Token::LeftParen]) {
            parser.link(links)?;
        }
        expr = match parser.current() {
            Token::Dot | Token::LeftBracket => parse_member_suffix(parser, expr)?,
            Token::LeftParen => {
                let arguments = parse_arguments(parser)?;
                Expression::Call(CallExpression {
                    span: parser.span_from(expr.span()),
                    callee: Box::new(expr),
                    arguments,
                })
            }
            _ => return Ok(expr),
        };
    }
}

/// `new` binds its argument list to the nearest callee: `new a.b(c).d` is
/// `(new a.b(c)).d`, and the argument list may be omitted.
fn parse_new(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::New)?;

    let callee = parser.chain(|parser, links| {
        let mut callee = if parser.check(&Token::New) {
            parser.nested(parse_new)?
        } else {
            parse_primary(parser)?
        };
        while parser.check_any(&[Token::Dot, Token::LeftBracket]) {
            parser.link(links)?;
            callee = parse_member_suffix(parser, callee)?;
        }
        Ok(callee)
    })?;

    let arguments = if parser.check(&Token::LeftParen) {
        parse_arguments(parser)?
    } else {
        Vec::new()
    };

    Ok(Expression::New(NewExpression {
        callee: Box::new(callee),
        arguments,
        span: parser.span_from(&start),
    }))
}

fn parse_member_suffix(parser: &mut Parser, object: Expression) -> Result<Expression, ParseError> {
    if parser.eat(&Token::Dot) {
        let property = parse_identifier_name(parser)?;
        return Ok(Expression::Member(MemberExpression {
            span: parser.span_from(object.span()),
            object: Box::new(object),
            property,
        }));
    }

    parser.expect(Token::LeftBracket)?;
    let index = parse_expression(parser)?;
    parser.expect(Token::RightBracket)?;
    Ok(Expression::Index(IndexExpression {
        span: parser.span_from(object.span()),
        object: Box::new(object),
        index: Box::new(index),
    }))
}

fn parse_arguments(parser: &mut Parser) -> Result<Vec<Expression>, ParseError> {
    parser.expect(Token::LeftParen)?;
    let mut arguments = Vec::new();

    if !parser.check(&Token::RightParen) {
        loop {
            arguments.push(parse_assignment(parser, true)?);
            if !parser.eat(&Token::Comma) {
                break;
            }
        }
    }

    parser.expect(Token::RightParen)?;
    Ok(arguments)
}

/// An ES5 `IdentifierName`: any identifier, reserved words included.
fn parse_identifier_name(parser: &mut Parser) -> Result<String, ParseError> {
    let name = match parser.current() {
        Token::Identifier(name) => name.clone(),
        token => match token.keyword_str() {
            Some(word) => word.to_string(),
            None => {
                return Err(parser.unexpected_token(&[Token::Identifier(String::new())]));
            }
        },
    };
    parser.advance();
    Ok(name)
}

/// An identifier in binding or reference position.
pub fn parse_binding_identifier(parser: &mut Parser) -> Result<Identifier, ParseError> {
    let span = parser.current_span();
    match parser.current() {
        Token::Identifier(name) => {
            let id = Identifier::new(name.clone(), span);
            parser.advance();
            Ok(id)
        }
        _ => Err(parser.unexpected_token(&[Token::Identifier(String::new())])),
    }
}

fn parse_primary(parser: &mut Parser) -> Result<Expression, ParseError> {
    let span = parser.current_span();

    let expr = match parser.current().clone() {
        Token::Identifier(name) => Expression::Identifier(Identifier::new(name, span)),
        Token::This => Expression::This(span),
        Token::Null => Expression::Null(span),
        Token::True => Expression::Boolean(BooleanLiteral { value: true, span }),
        Token::False => Expression::Boolean(BooleanLiteral { value: false, span }),
        Token::Number(raw) => Expression::Number(NumberLiteral {
            value: number_value(&raw),
            raw,
            span,
        }),
        Token::String(value) => Expression::String(StringLiteral { value, span }),
        Token::Regex { pattern, flags } => Expression::Regex(RegexLiteral {
            pattern,
            flags,
            span,
        }),
        Token::LeftParen => {
            parser.advance();
            let expr = parse_expression(parser)?;
            parser.expect(Token::RightParen)?;
            return Ok(expr);
        }
        Token::LeftBracket => return parse_array(parser),
        Token::LeftBrace => return parse_object(parser),
        Token::Function => return parse_function(parser, false).map(Expression::Function),
        _ => {
            return Err(parser
                .unexpected_token(&[])
                .with_suggestion("expected an expression"));
        }
    };

    parser.advance();
    Ok(expr)
}

/// Numeric value of a literal's source spelling.
fn number_value(raw: &str) -> f64 {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        return hex
            .chars()
            .filter_map(|c| c.to_digit(16))
            .fold(0.0, |acc, digit| acc * 16.0 + f64::from(digit));
    }
    raw.parse().unwrap_or(f64::NAN)
}

fn parse_array(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::LeftBracket)?;
    let mut elements = Vec::new();

    while !parser.check(&Token::RightBracket) {
        if parser.eat(&Token::Comma) {
            elements.push(None);
            continue;
        }
        elements.push(Some(parse_assignment(parser, true)?));
        if !parser.check(&Token::RightBracket) {
            parser.expect(Token::Comma)?;
        }
    }

    parser.expect(Token::RightBracket)?;
    Ok(Expression::Array(ArrayExpression {
        elements,
        span: parser.span_from(&start),
    }))
}

fn parse_object(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::LeftBrace)?;
    let mut properties = Vec::new();

    while !parser.check(&Token::RightBrace) {
        properties.push(parse_property(parser)?);
        if !parser.check(&Token::RightBrace) {
            parser.expect(Token::Comma)?;
        }
    }

    parser.expect(Token::RightBrace)?;
    Ok(Expression::Object(ObjectExpression {
        properties,
        span: parser.span_from(&start),
    }))
}

fn parse_property(parser: &mut Parser) -> Result<Property, ParseError> {
    let start = parser.current_span();

    let accessor = match parser.current() {
        Token::Identifier(name) if name == "get" => Some(PropertyKind::Get),
        Token::Identifier(name) if name == "set" => Some(PropertyKind::Set),
        _ => None,
    };
    // `get` and `set` are ordinary keys when followed by `:` or a separator
    let accessor = accessor.filter(|_| {
        !matches!(
            parser.peek(),
            Some(Token::Colon | Token::Comma | Token::RightBrace)
        )
    });

    if let Some(kind) = accessor {
        parser.advance();
        let key = parse_property_key(parser)?;
        let function_start = parser.current_span();
        let params = parse_params(parser)?;
        let body = parse_function_body(parser)?;
        let value = Expression::Function(Function {
            name: None,
            params,
            body,
            span: parser.span_from(&function_start),
        });
        return Ok(Property {
            kind,
            key,
            value,
            span: parser.span_from(&start),
        });
    }

    let key = parse_property_key(parser)?;
    parser.expect(Token::Colon)?;
    let value = parse_assignment(parser, true)?;
    Ok(Property {
        kind: PropertyKind::Init,
        key,
        value,
        span: parser.span_from(&start),
    })
}

fn parse_property_key(parser: &mut Parser) -> Result<PropertyKey, ParseError> {
    let key = match parser.current() {
        Token::String(value) => PropertyKey::String(value.clone()),
        Token::Number(raw) => PropertyKey::Number(raw.clone()),
        _ => return parse_identifier_name(parser).map(PropertyKey::Identifier),
    };
    parser.advance();
    Ok(key)
}

/// Parse `function [name] (params) { body }`.
///
/// Declarations must be named; expressions may be anonymous.
pub fn parse_function(parser: &mut Parser, require_name: bool) -> Result<Function, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::Function)?;

    let name = if parser.check(&Token::Identifier(String::new())) || require_name {
        Some(parse_binding_identifier(parser)?)
    } else {
        None
    };
    let params = parse_params(parser)?;
    let body = parse_function_body(parser)?;

    Ok(Function {
        name,
        params,
        body,
        span: parser.span_from(&start),
    })
}

fn parse_params(parser: &mut Parser) -> Result<Vec<Identifier>, ParseError> {
    parser.expect(Token::LeftParen)?;
    let mut params = Vec::new();

    if !parser.check(&Token::RightParen) {
        loop {
            params.push(parse_binding_identifier(parser)?);
            if !parser.eat(&Token::Comma) {
                break;
            }
        }
    }

    parser.expect(Token::RightParen)?;
    Ok(params)
}

fn parse_function_body(parser: &mut Parser) -> Result<Vec<Statement>, ParseError> {
    parser.expect(Token::LeftBrace)?;
    let mut body = Vec::new();

    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        body.push(parse_statement(parser)?);
    }

    parser.expect(Token::RightBrace)?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(source: &str) -> Expression {
        let mut parser = Parser::new(source).unwrap();
        parse_expression(&mut parser).unwrap()
    }

    #[test]
    fn test_number_values() {
        assert_eq!(number_value("0xff"), 255.0);
        assert_eq!(number_value("1.5e3"), 1500.0);
        assert_eq!(number_value(".5"), 0.5);
        assert_eq!(number_value("10."), 10.0);
    }

    #[test]
    fn test_precedence_climbing() {
        let Expression::Binary(add) = expr("1 + 2 * 3") else {
            panic!("expected binary expression");
        };
        assert_eq!(add.operator, BinaryOperator::Add);
        assert!(matches!(*add.right, Expression::Binary(ref mul) if mul.operator == BinaryOperator::Multiply));
    }

    #[test]
    fn test_left_associativity() {
        let Expression::Binary(outer) = expr("a - b - c") else {
            panic!("expected binary expression");
        };
        assert!(matches!(*outer.left, Expression::Binary(_)));
        assert!(matches!(*outer.right, Expression::Identifier(_)));
    }

    #[test]
    fn test_new_without_arguments() {
        let Expression::Member(member) = expr("new Foo.bar().baz") else {
            panic!("expected member expression");
        };
        assert_eq!(member.property, "baz");
        assert!(matches!(*member.object, Expression::New(_)));
    }

    #[test]
    fn test_keyword_property_name() {
        let Expression::Member(member) = expr("promise.catch") else {
            panic!("expected member expression");
        };
        assert_eq!(member.property, "catch");
    }

    #[test]
    fn test_invalid_assignment_target() {
        let mut parser = Parser::new("1 = 2").unwrap();
        assert!(parse_expression(&mut parser).is_err());
    }
}
