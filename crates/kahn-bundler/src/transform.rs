//! Per-module rewrite into registry form
//!
//! A module written as
//!
//! ```text
//! define(function (require, exports, module) { ... });
//! ```
//!
//! becomes a registry-slot initializer followed by
//!
//! ```text
//! __MODULES["id"].exports = (function (require, exports, module) { ... })
//!     (null, __MODULES["id"].exports, __MODULES["id"]) || __MODULES["id"].exports;
//! ```
//!
//! and every `require("x")` inside it reads `__MODULES["x"].exports`
//! directly. Statements other than the top-level `define` are kept as is.

use kahn_parser::ast::*;
use kahn_parser::codegen::{generate, generate_statement};
use kahn_parser::CodegenOptions;

use crate::builder::REQUIRE;
use crate::cache::CachedSource;
use crate::error::{BundleError, BundleResult};
use crate::module_id::ModuleId;

/// Name of the run-time registry declared once per bundle.
pub const REGISTRY: &str = "__MODULES";

/// The reserved name of the module-definition call.
pub const DEFINE: &str = "define";

const FACTORY_PARAMS: [&str; 3] = ["require", "exports", "module"];

/// `__MODULES["id"]`
pub fn registry_entry(id: &ModuleId, span: Span) -> Expression {
    Expression::Index(IndexExpression {
        object: Box::new(Expression::Identifier(Identifier::new(REGISTRY, span))),
        index: Box::new(Expression::String(StringLiteral {
            value: id.to_string(),
            span,
        })),
        span,
    })
}

/// `__MODULES["id"].exports`
pub fn registry_exports(id: &ModuleId, span: Span) -> Expression {
    Expression::Member(MemberExpression {
        object: Box::new(registry_entry(id, span)),
        property: "exports".to_string(),
        span,
    })
}

/// `__MODULES["id"] = { exports: {} };`
pub fn registry_initializer(id: &ModuleId) -> Statement {
    let span = Span::default();
    let empty = Expression::Object(ObjectExpression {
        properties: Vec::new(),
        span,
    });
    let slot = Expression::Object(ObjectExpression {
        properties: vec![Property {
            kind: PropertyKind::Init,
            key: PropertyKey::Identifier("exports".to_string()),
            value: empty,
            span,
        }],
        span,
    });

    Statement::Expression(ExpressionStatement {
        expression: Expression::Assignment(AssignmentExpression {
            operator: AssignmentOperator::Assign,
            target: Box::new(registry_entry(id, span)),
            value: Box::new(slot),
            span,
        }),
        span,
    })
}

/// A broken module-format rule, before it is tied to a file.
#[derive(Debug)]
struct Violation {
    span: Option<Span>,
    message: String,
}

impl Violation {
    fn new(span: Option<Span>, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

/// Rewrites cached modules and prints them.
#[derive(Debug, Clone, Copy)]
pub struct Transformer {
    codegen: CodegenOptions,
    mangle: bool,
}

impl Transformer {
    pub fn new(codegen: CodegenOptions, mangle: bool) -> Self {
        Self { codegen, mangle }
    }

    /// Produce the bundle fragment for one module.
    pub fn transform(&self, id: &ModuleId, entry: &CachedSource) -> BundleResult<String> {
        let mut program = match &entry.program {
            Some(program) => program.clone(),
            None => {
                return Err(BundleError::Parse {
                    id: id.clone(),
                    path: entry.path.clone(),
                    source_text: entry.source.clone(),
                    errors: entry.errors.clone(),
                })
            }
        };

        rewrite_module(&mut program, id).map_err(|violation| BundleError::FormatViolation {
            id: id.clone(),
            path: entry.path.clone(),
            source_text: entry.source.clone(),
            span: violation.span,
            message: violation.message,
        })?;

        if self.mangle {
            kahn_parser::mangle(&mut program);
        }

        let mut fragment = generate_statement(&registry_initializer(id), self.codegen);
        fragment.push('\n');
        fragment.push_str(&generate(&program, self.codegen));
        Ok(fragment)
    }
}

fn rewrite_module(program: &mut Program, id: &ModuleId) -> Result<(), Violation> {
    let mut rewriter = RequireRewriter {
        id,
        violation: None,
    };
    rewriter.visit_program(program);
    if let Some(span) = rewriter.violation {
        return Err(Violation::new(
            Some(span),
            "require must be called with a single string literal",
        ));
    }

    let sites: Vec<usize> = program
        .statements
        .iter()
        .enumerate()
        .filter(|(_, stmt)| is_define_statement(stmt))
        .map(|(index, _)| index)
        .collect();

    let index = match sites.as_slice() {
        [index] => *index,
        [] => {
            return Err(Violation::new(
                None,
                "module has no top-level define(function (require, exports, module) { ... }) call",
            ))
        }
        [_, second, ..] => {
            return Err(Violation::new(
                Some(*program.statements[*second].span()),
                "module has more than one top-level define call",
            ))
        }
    };

    if let Statement::Expression(statement) = &mut program.statements[index] {
        let placeholder = Expression::Null(statement.span);
        let define = std::mem::replace(&mut statement.expression, placeholder);
        statement.expression = rewrite_define(define, id)?;
    }
    Ok(())
}

fn is_define_statement(stmt: &Statement) -> bool {
    matches!(
        stmt,
        Statement::Expression(ExpressionStatement {
            expression: Expression::Call(call),
            ..
        }) if call.is_call_to(DEFINE)
    )
}

fn rewrite_define(define: Expression, id: &ModuleId) -> Result<Expression, Violation> {
    let (arguments, span) = match define {
        Expression::Call(call) => (call.arguments, call.span),
        other => return Ok(other),
    };

    let factory = match <[Expression; 1]>::try_from(arguments) {
        Ok([Expression::Function(function)]) => function,
        Ok([other]) => {
            return Err(Violation::new(
                Some(*other.span()),
                "define expects a function literal",
            ))
        }
        Err(arguments) => {
            return Err(Violation::new(
                Some(span),
                format!(
                    "define expects exactly one argument, found {}",
                    arguments.len()
                ),
            ))
        }
    };

    let params: Vec<&str> = factory.params.iter().map(|param| param.name.as_str()).collect();
    if params != FACTORY_PARAMS {
        return Err(Violation::new(
            Some(factory.span),
            format!(
                "define factory must take (require, exports, module), found ({})",
                params.join(", ")
            ),
        ));
    }

    let invocation = Expression::Call(CallExpression {
        callee: Box::new(Expression::Function(factory)),
        arguments: vec![
            Expression::Null(span),
            registry_exports(id, span),
            registry_entry(id, span),
        ],
        span,
    });

    Ok(Expression::Assignment(AssignmentExpression {
        operator: AssignmentOperator::Assign,
        target: Box::new(registry_exports(id, span)),
        value: Box::new(Expression::Logical(LogicalExpression {
            operator: LogicalOperator::Or,
            left: Box::new(invocation),
            right: Box::new(registry_exports(id, span)),
            span,
        })),
        span,
    }))
}

/// Replaces `require("x")` with a registry read.
struct RequireRewriter<'a> {
    id: &'a ModuleId,
    /// First `require` call with any other argument list
    violation: Option<Span>,
}

impl VisitorMut for RequireRewriter<'_> {
    fn visit_expression(&mut self, expr: &mut Expression) {
        if self.violation.is_some() {
            return;
        }

        let rewritten = match expr {
            Expression::Call(call) if call.is_call_to(REQUIRE) => Some(match call.arguments.as_slice() {
                [argument] => argument
                    .as_string_literal()
                    .map(|specifier| registry_exports(&self.id.join(specifier), call.span))
                    .ok_or(call.span),
                _ => Err(call.span),
            }),
            _ => None,
        };

        match rewritten {
            Some(Ok(replacement)) => *expr = replacement,
            Some(Err(span)) => self.violation = Some(span),
            None => walk_expression_mut(self, expr),
        }
    }
}
