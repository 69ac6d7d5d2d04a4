//! Tests for expression parsing

use kahn_parser::ast::*;
use kahn_parser::parser::Parser;

/// Parse `source` as a single expression statement.
fn parse_expr(source: &str) -> Expression {
    let program = Parser::new(source).unwrap().parse().unwrap();
    match program.statements.into_iter().next() {
        Some(Statement::Expression(stmt)) => stmt.expression,
        other => panic!("Expected expression statement, got {:?}", other),
    }
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_number_literals_keep_raw_spelling() {
    match parse_expr("0xFF;") {
        Expression::Number(lit) => {
            assert_eq!(lit.raw, "0xFF");
            assert_eq!(lit.value, 255.0);
        }
        _ => panic!("Expected number literal"),
    }
}

#[test]
fn test_string_literal_is_decoded() {
    assert_eq!(parse_expr("'a\\tb';").as_string_literal(), Some("a\tb"));
}

#[test]
fn test_regex_literal() {
    match parse_expr("/ab+c/gi;") {
        Expression::Regex(lit) => {
            assert_eq!(lit.pattern, "ab+c");
            assert_eq!(lit.flags, "gi");
        }
        _ => panic!("Expected regex literal"),
    }
}

#[test]
fn test_array_with_holes() {
    match parse_expr("[1, , 3, ];") {
        Expression::Array(array) => {
            assert_eq!(array.elements.len(), 3);
            assert!(array.elements[1].is_none());
        }
        _ => panic!("Expected array literal"),
    }
}

#[test]
fn test_object_with_accessors() {
    match parse_expr("({ a: 1, 'b': 2, 3: c, get d() { return 4; }, set d(v) {} });") {
        Expression::Object(object) => {
            assert_eq!(object.properties.len(), 5);
            assert!(matches!(object.properties[0].key, PropertyKey::Identifier(ref k) if k == "a"));
            assert!(matches!(object.properties[1].key, PropertyKey::String(ref k) if k == "b"));
            assert!(matches!(object.properties[2].key, PropertyKey::Number(ref k) if k == "3"));
            assert_eq!(object.properties[3].kind, PropertyKind::Get);
            assert_eq!(object.properties[4].kind, PropertyKind::Set);
        }
        _ => panic!("Expected object literal"),
    }
}

#[test]
fn test_get_and_set_as_plain_keys() {
    match parse_expr("({ get: 1, set: 2 });") {
        Expression::Object(object) => {
            assert!(object.properties.iter().all(|p| p.kind == PropertyKind::Init));
        }
        _ => panic!("Expected object literal"),
    }
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    match parse_expr("a + b * c;") {
        Expression::Binary(binary) => {
            assert_eq!(binary.operator, BinaryOperator::Add);
            assert!(matches!(
                *binary.right,
                Expression::Binary(BinaryExpression { operator: BinaryOperator::Multiply, .. })
            ));
        }
        _ => panic!("Expected binary expression"),
    }
}

#[test]
fn test_logical_operators() {
    match parse_expr("a || b && c;") {
        Expression::Logical(logical) => {
            assert_eq!(logical.operator, LogicalOperator::Or);
            assert!(matches!(
                *logical.right,
                Expression::Logical(LogicalExpression { operator: LogicalOperator::And, .. })
            ));
        }
        _ => panic!("Expected logical expression"),
    }
}

#[test]
fn test_assignment_is_right_associative() {
    match parse_expr("a = b += c;") {
        Expression::Assignment(assign) => {
            assert_eq!(assign.operator, AssignmentOperator::Assign);
            assert!(matches!(
                *assign.value,
                Expression::Assignment(AssignmentExpression {
                    operator: AssignmentOperator::AddAssign,
                    ..
                })
            ));
        }
        _ => panic!("Expected assignment"),
    }
}

#[test]
fn test_conditional_and_sequence() {
    match parse_expr("a ? b : c, d;") {
        Expression::Sequence(seq) => {
            assert_eq!(seq.expressions.len(), 2);
            assert!(matches!(seq.expressions[0], Expression::Conditional(_)));
        }
        _ => panic!("Expected sequence"),
    }
}

#[test]
fn test_unary_keywords() {
    assert!(matches!(
        parse_expr("typeof x;"),
        Expression::Unary(UnaryExpression { operator: UnaryOperator::Typeof, .. })
    ));
    assert!(matches!(
        parse_expr("delete o.p;"),
        Expression::Unary(UnaryExpression { operator: UnaryOperator::Delete, .. })
    ));
}

#[test]
fn test_division_after_identifier() {
    assert!(matches!(
        parse_expr("a / b / c;"),
        Expression::Binary(BinaryExpression { operator: BinaryOperator::Divide, .. })
    ));
}

// ============================================================================
// Calls and member access
// ============================================================================

#[test]
fn test_call_with_string_argument() {
    match parse_expr("require('./util');") {
        Expression::Call(call) => {
            assert!(call.is_call_to("require"));
            assert_eq!(call.arguments.len(), 1);
            assert_eq!(call.arguments[0].as_string_literal(), Some("./util"));
        }
        _ => panic!("Expected call"),
    }
}

#[test]
fn test_member_chain() {
    match parse_expr("a.b[c].d();") {
        Expression::Call(call) => match &*call.callee {
            Expression::Member(member) => {
                assert_eq!(member.property, "d");
                assert!(matches!(*member.object, Expression::Index(_)));
            }
            _ => panic!("Expected member callee"),
        },
        _ => panic!("Expected call"),
    }
}

#[test]
fn test_new_binds_arguments_to_nearest_callee() {
    match parse_expr("new Foo.Bar(1).baz;") {
        Expression::Member(member) => match &*member.object {
            Expression::New(new) => {
                assert!(matches!(*new.callee, Expression::Member(_)));
                assert_eq!(new.arguments.len(), 1);
            }
            _ => panic!("Expected new expression"),
        },
        _ => panic!("Expected member expression"),
    }
}

#[test]
fn test_keyword_as_property_name() {
    match parse_expr("promise.catch(handler);") {
        Expression::Call(call) => {
            assert!(matches!(&*call.callee, Expression::Member(m) if m.property == "catch"));
        }
        _ => panic!("Expected call"),
    }
}

#[test]
fn test_immediately_invoked_function() {
    match parse_expr("(function (a) { return a; })(1);") {
        Expression::Call(call) => {
            assert!(matches!(*call.callee, Expression::Function(_)));
        }
        _ => panic!("Expected call"),
    }
}

#[test]
fn test_invalid_assignment_target_is_rejected() {
    assert!(Parser::new("1 = a;").unwrap().parse().is_err());
}

#[test]
fn test_postfix_increment_then_division() {
    match parse_expr("a++ / 2 / 1;") {
        Expression::Binary(outer) => {
            assert_eq!(outer.operator, BinaryOperator::Divide);
            match *outer.left {
                Expression::Binary(inner) => {
                    assert!(matches!(*inner.left, Expression::Update(ref u) if !u.prefix));
                }
                _ => panic!("Expected nested division"),
            }
        }
        _ => panic!("Expected division"),
    }
}

#[test]
fn test_regex_statement_after_function_declaration() {
    let program = Parser::new("function f() {}\n/a/.test('a');")
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(program.statements.len(), 2);
}
