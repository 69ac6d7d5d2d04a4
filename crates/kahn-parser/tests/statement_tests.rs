//! Tests for statement parsing

use kahn_parser::ast::*;
use kahn_parser::parser::{ParseErrorKind, Parser};

fn parse(source: &str) -> Program {
    Parser::new(source).unwrap().parse().unwrap()
}

// ============================================================================
// Variable Declarations
// ============================================================================

#[test]
fn test_parse_var_declaration() {
    let program = parse("var x = 42, y;");

    assert_eq!(program.statements.len(), 1);
    match &program.statements[0] {
        Statement::VariableDecl(decl) => {
            assert_eq!(decl.kind, VariableKind::Var);
            assert_eq!(decl.declarations.len(), 2);
            assert_eq!(decl.declarations[0].name.name, "x");
            assert!(decl.declarations[0].init.is_some());
            assert_eq!(decl.declarations[1].name.name, "y");
            assert!(decl.declarations[1].init.is_none());
        }
        _ => panic!("Expected variable declaration"),
    }
}

#[test]
fn test_parse_const_declaration() {
    let program = parse("const y = 10;");

    match &program.statements[0] {
        Statement::VariableDecl(decl) => assert_eq!(decl.kind, VariableKind::Const),
        _ => panic!("Expected variable declaration"),
    }
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_parse_function_declaration() {
    let program = parse("function add(a, b) { return a + b; }");

    match &program.statements[0] {
        Statement::FunctionDecl(function) => {
            assert_eq!(function.name.as_ref().unwrap().name, "add");
            let params: Vec<_> = function.params.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(params, vec!["a", "b"]);
            assert!(matches!(function.body[0], Statement::Return(_)));
        }
        _ => panic!("Expected function declaration"),
    }
}

#[test]
fn test_function_declaration_requires_name() {
    assert!(Parser::new("function () {}").unwrap().parse().is_err());
}

// ============================================================================
// Control Flow
// ============================================================================

#[test]
fn test_parse_if_else_chain() {
    let program = parse("if (a) b(); else if (c) d(); else e();");

    match &program.statements[0] {
        Statement::If(stmt) => match stmt.alternate.as_deref() {
            Some(Statement::If(inner)) => assert!(inner.alternate.is_some()),
            _ => panic!("Expected else-if"),
        },
        _ => panic!("Expected if statement"),
    }
}

#[test]
fn test_dangling_else_binds_to_nearest_if() {
    let program = parse("if (a) if (b) c(); else d();");

    match &program.statements[0] {
        Statement::If(outer) => {
            assert!(outer.alternate.is_none());
            match &*outer.consequent {
                Statement::If(inner) => assert!(inner.alternate.is_some()),
                _ => panic!("Expected nested if"),
            }
        }
        _ => panic!("Expected if statement"),
    }
}

#[test]
fn test_parse_for_loop() {
    let program = parse("for (var i = 0; i < 10; i++) {}");

    match &program.statements[0] {
        Statement::For(stmt) => {
            assert!(matches!(stmt.init, Some(ForInit::VariableDecl(_))));
            assert!(stmt.test.is_some());
            assert!(stmt.update.is_some());
        }
        _ => panic!("Expected for statement"),
    }
}

#[test]
fn test_parse_empty_for_loop() {
    let program = parse("for (;;) break;");

    match &program.statements[0] {
        Statement::For(stmt) => {
            assert!(stmt.init.is_none());
            assert!(stmt.test.is_none());
            assert!(stmt.update.is_none());
        }
        _ => panic!("Expected for statement"),
    }
}

#[test]
fn test_parse_for_in() {
    let program = parse("for (var key in object) {} for (obj.k in o) {}");

    assert!(matches!(
        &program.statements[0],
        Statement::ForIn(ForInStatement {
            left: ForInTarget::VariableDecl(_),
            ..
        })
    ));
    assert!(matches!(
        &program.statements[1],
        Statement::ForIn(ForInStatement {
            left: ForInTarget::Expression(Expression::Member(_)),
            ..
        })
    ));
}

#[test]
fn test_for_in_rejects_invalid_target() {
    assert!(Parser::new("for (1 in o) {}").unwrap().parse().is_err());
}

#[test]
fn test_in_operator_inside_for_init_parentheses() {
    let program = parse("for (var x = ('a' in o); x;) break;");

    assert!(matches!(program.statements[0], Statement::For(_)));
}

#[test]
fn test_parse_while_and_do_while() {
    let program = parse("while (x) x--; do { y(); } while (z)");

    assert!(matches!(program.statements[0], Statement::While(_)));
    assert!(matches!(program.statements[1], Statement::DoWhile(_)));
}

#[test]
fn test_parse_labeled_break_and_continue() {
    let program = parse("outer: for (;;) { continue outer; break outer; }");

    match &program.statements[0] {
        Statement::Labeled(stmt) => {
            assert_eq!(stmt.label, "outer");
            match &*stmt.body {
                Statement::For(f) => match &*f.body {
                    Statement::Block(block) => {
                        assert!(matches!(
                            &block.statements[0],
                            Statement::Continue(ContinueStatement { label: Some(l), .. }) if l == "outer"
                        ));
                        assert!(matches!(
                            &block.statements[1],
                            Statement::Break(BreakStatement { label: Some(l), .. }) if l == "outer"
                        ));
                    }
                    _ => panic!("Expected block"),
                },
                _ => panic!("Expected for loop"),
            }
        }
        _ => panic!("Expected labeled statement"),
    }
}

#[test]
fn test_parse_try_catch_finally() {
    let program = parse("try { a(); } catch (err) { b(err); } finally { c(); }");

    match &program.statements[0] {
        Statement::Try(stmt) => {
            assert_eq!(stmt.handler.as_ref().unwrap().param.name, "err");
            assert!(stmt.finalizer.is_some());
        }
        _ => panic!("Expected try statement"),
    }
}

#[test]
fn test_try_requires_handler_or_finalizer() {
    assert!(Parser::new("try {}").unwrap().parse().is_err());
}

#[test]
fn test_parse_switch() {
    let program = parse("switch (x) { case 1: case 2: a(); break; default: b(); }");

    match &program.statements[0] {
        Statement::Switch(stmt) => {
            assert_eq!(stmt.cases.len(), 3);
            assert!(stmt.cases[0].consequent.is_empty());
            assert_eq!(stmt.cases[1].consequent.len(), 2);
            assert!(stmt.cases[2].test.is_none());
        }
        _ => panic!("Expected switch statement"),
    }
}

#[test]
fn test_parse_with_debugger_and_empty() {
    let program = parse("with (o) x; debugger; ;");

    assert!(matches!(program.statements[0], Statement::With(_)));
    assert!(matches!(program.statements[1], Statement::Debugger(_)));
    assert!(matches!(program.statements[2], Statement::Empty(_)));
}

// ============================================================================
// Automatic Semicolon Insertion
// ============================================================================

#[test]
fn test_asi_at_line_breaks() {
    let program = parse("var a = 1\nvar b = 2\na = b");

    assert_eq!(program.statements.len(), 3);
}

#[test]
fn test_asi_before_closing_brace_and_eof() {
    let program = parse("function f() { return 1 } f()");

    assert_eq!(program.statements.len(), 2);
}

#[test]
fn test_missing_semicolon_on_same_line_is_an_error() {
    let errors = Parser::new("a = 1 b = 2").unwrap().parse().unwrap_err();

    assert!(matches!(
        errors[0].kind,
        ParseErrorKind::UnexpectedToken { .. }
    ));
}

#[test]
fn test_return_is_restricted_production() {
    let program = parse("function f() { return\n42; }");

    match &program.statements[0] {
        Statement::FunctionDecl(function) => {
            assert_eq!(function.body.len(), 2);
            assert!(matches!(
                function.body[0],
                Statement::Return(ReturnStatement { argument: None, .. })
            ));
        }
        _ => panic!("Expected function declaration"),
    }
}

#[test]
fn test_postfix_update_is_restricted_production() {
    let program = parse("a\n++b");

    assert_eq!(program.statements.len(), 2);
    match &program.statements[1] {
        Statement::Expression(stmt) => assert!(matches!(
            stmt.expression,
            Expression::Update(UpdateExpression { prefix: true, .. })
        )),
        _ => panic!("Expected expression statement"),
    }
}

#[test]
fn test_break_label_must_be_on_same_line() {
    let program = parse("outer: for (;;) { break\nouter; }");

    match &program.statements[0] {
        Statement::Labeled(stmt) => match &*stmt.body {
            Statement::For(f) => match &*f.body {
                Statement::Block(block) => {
                    assert_eq!(block.statements.len(), 2);
                    assert!(matches!(
                        block.statements[0],
                        Statement::Break(BreakStatement { label: None, .. })
                    ));
                }
                _ => panic!("Expected block"),
            },
            _ => panic!("Expected for loop"),
        },
        _ => panic!("Expected labeled statement"),
    }
}

#[test]
fn test_throw_rejects_line_break() {
    assert!(Parser::new("throw\nerr;").unwrap().parse().is_err());
}
