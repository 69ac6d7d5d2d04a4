//! AST visitor pattern for traversing the syntax tree
//!
//! Each visit method has a default implementation that calls the matching
//! `walk_*` function, so an implementation only overrides the nodes it
//! cares about and calls `walk_*` itself when it wants to keep descending.
//!
//! Names are reported through two separate hooks: [`Visitor::visit_binding`]
//! for declaration sites (parameters, declarators, function names, catch
//! parameters) and [`Visitor::visit_identifier`] for references. Property
//! names and labels are not variables and are never reported.
//!
//! # Example
//!
//! ```rust
//! use kahn_parser::ast::*;
//!
//! struct CountReferences {
//!     count: usize,
//! }
//!
//! impl Visitor for CountReferences {
//!     fn visit_identifier(&mut self, _id: &Identifier) {
//!         self.count += 1;
//!     }
//! }
//! ```

use super::*;

/// Whether a function was written as a statement or inside an expression.
///
/// A declaration binds its name in the enclosing scope; a named function
/// expression binds its name only inside its own body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Declaration,
    Expression,
}

/// AST visitor trait
pub trait Visitor: Sized {
    fn visit_program(&mut self, program: &Program) {
        walk_program(self, program);
    }

    fn visit_statement(&mut self, stmt: &Statement) {
        walk_statement(self, stmt);
    }

    fn visit_variable_declarator(&mut self, decl: &VariableDeclarator) {
        walk_variable_declarator(self, decl);
    }

    fn visit_function(&mut self, function: &Function, _kind: FunctionKind) {
        walk_function(self, function);
    }

    fn visit_catch_clause(&mut self, clause: &CatchClause) {
        walk_catch_clause(self, clause);
    }

    fn visit_expression(&mut self, expr: &Expression) {
        walk_expression(self, expr);
    }

    fn visit_call_expression(&mut self, call: &CallExpression) {
        walk_call_expression(self, call);
    }

    /// A name in declaration position
    fn visit_binding(&mut self, _id: &Identifier) {}

    /// A name in reference position
    fn visit_identifier(&mut self, _id: &Identifier) {}
}

pub fn walk_program<V: Visitor>(visitor: &mut V, program: &Program) {
    for stmt in &program.statements {
        visitor.visit_statement(stmt);
    }
}

pub fn walk_statement<V: Visitor>(visitor: &mut V, stmt: &Statement) {
    match stmt {
        Statement::VariableDecl(decl) => walk_variable_decl(visitor, decl),
        Statement::FunctionDecl(function) => {
            visitor.visit_function(function, FunctionKind::Declaration)
        }
        Statement::Expression(stmt) => visitor.visit_expression(&stmt.expression),
        Statement::Block(block) => walk_block(visitor, block),
        Statement::If(stmt) => {
            visitor.visit_expression(&stmt.test);
            visitor.visit_statement(&stmt.consequent);
            if let Some(alternate) = &stmt.alternate {
                visitor.visit_statement(alternate);
            }
        }
        Statement::For(stmt) => {
            match &stmt.init {
                Some(ForInit::VariableDecl(decl)) => walk_variable_decl(visitor, decl),
                Some(ForInit::Expression(expr)) => visitor.visit_expression(expr),
                None => {}
            }
            if let Some(test) = &stmt.test {
                visitor.visit_expression(test);
            }
            if let Some(update) = &stmt.update {
                visitor.visit_expression(update);
            }
            visitor.visit_statement(&stmt.body);
        }
        Statement::ForIn(stmt) => {
            match &stmt.left {
                ForInTarget::VariableDecl(decl) => walk_variable_decl(visitor, decl),
                ForInTarget::Expression(expr) => visitor.visit_expression(expr),
            }
            visitor.visit_expression(&stmt.right);
            visitor.visit_statement(&stmt.body);
        }
        Statement::While(stmt) => {
            visitor.visit_expression(&stmt.test);
            visitor.visit_statement(&stmt.body);
        }
        Statement::DoWhile(stmt) => {
            visitor.visit_statement(&stmt.body);
            visitor.visit_expression(&stmt.test);
        }
        Statement::Return(stmt) => {
            if let Some(argument) = &stmt.argument {
                visitor.visit_expression(argument);
            }
        }
        Statement::Break(_) | Statement::Continue(_) => {}
        Statement::Throw(stmt) => visitor.visit_expression(&stmt.argument),
        Statement::Try(stmt) => {
            walk_block(visitor, &stmt.block);
            if let Some(handler) = &stmt.handler {
                visitor.visit_catch_clause(handler);
            }
            if let Some(finalizer) = &stmt.finalizer {
                walk_block(visitor, finalizer);
            }
        }
        Statement::Switch(stmt) => {
            visitor.visit_expression(&stmt.discriminant);
            for case in &stmt.cases {
                if let Some(test) = &case.test {
                    visitor.visit_expression(test);
                }
                for stmt in &case.consequent {
                    visitor.visit_statement(stmt);
                }
            }
        }
        Statement::Labeled(stmt) => visitor.visit_statement(&stmt.body),
        Statement::With(stmt) => {
            visitor.visit_expression(&stmt.object);
            visitor.visit_statement(&stmt.body);
        }
        Statement::Debugger(_) | Statement::Empty(_) => {}
    }
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &BlockStatement) {
    for stmt in &block.statements {
        visitor.visit_statement(stmt);
    }
}

pub fn walk_variable_decl<V: Visitor>(visitor: &mut V, decl: &VariableDecl) {
    for declarator in &decl.declarations {
        visitor.visit_variable_declarator(declarator);
    }
}

pub fn walk_variable_declarator<V: Visitor>(visitor: &mut V, decl: &VariableDeclarator) {
    visitor.visit_binding(&decl.name);
    if let Some(init) = &decl.init {
        visitor.visit_expression(init);
    }
}

pub fn walk_function<V: Visitor>(visitor: &mut V, function: &Function) {
    if let Some(name) = &function.name {
        visitor.visit_binding(name);
    }
    for param in &function.params {
        visitor.visit_binding(param);
    }
    for stmt in &function.body {
        visitor.visit_statement(stmt);
    }
}

pub fn walk_catch_clause<V: Visitor>(visitor: &mut V, clause: &CatchClause) {
    visitor.visit_binding(&clause.param);
    walk_block(visitor, &clause.body);
}

pub fn walk_expression<V: Visitor>(visitor: &mut V, expr: &Expression) {
    match expr {
        Expression::Number(_)
        | Expression::String(_)
        | Expression::Regex(_)
        | Expression::Boolean(_)
        | Expression::Null(_)
        | Expression::This(_) => {}
        Expression::Identifier(id) => visitor.visit_identifier(id),
        Expression::Array(array) => {
            for element in array.elements.iter().flatten() {
                visitor.visit_expression(element);
            }
        }
        Expression::Object(object) => {
            for property in &object.properties {
                visitor.visit_expression(&property.value);
            }
        }
        Expression::Function(function) => visitor.visit_function(function, FunctionKind::Expression),
        Expression::Unary(unary) => visitor.visit_expression(&unary.argument),
        Expression::Update(update) => visitor.visit_expression(&update.argument),
        Expression::Binary(binary) => {
            visitor.visit_expression(&binary.left);
            visitor.visit_expression(&binary.right);
        }
        Expression::Logical(logical) => {
            visitor.visit_expression(&logical.left);
            visitor.visit_expression(&logical.right);
        }
        Expression::Conditional(cond) => {
            visitor.visit_expression(&cond.test);
            visitor.visit_expression(&cond.consequent);
            visitor.visit_expression(&cond.alternate);
        }
        Expression::Assignment(assign) => {
            visitor.visit_expression(&assign.target);
            visitor.visit_expression(&assign.value);
        }
        Expression::Sequence(seq) => {
            for expr in &seq.expressions {
                visitor.visit_expression(expr);
            }
        }
        Expression::Call(call) => visitor.visit_call_expression(call),
        Expression::New(new) => {
            visitor.visit_expression(&new.callee);
            for arg in &new.arguments {
                visitor.visit_expression(arg);
            }
        }
        Expression::Member(member) => visitor.visit_expression(&member.object),
        Expression::Index(index) => {
            visitor.visit_expression(&index.object);
            visitor.visit_expression(&index.index);
        }
    }
}

pub fn walk_call_expression<V: Visitor>(visitor: &mut V, call: &CallExpression) {
    visitor.visit_expression(&call.callee);
    for arg in &call.arguments {
        visitor.visit_expression(arg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[derive(Default)]
    struct Names {
        bindings: Vec<String>,
        references: Vec<String>,
        functions: Vec<FunctionKind>,
    }

    impl Visitor for Names {
        fn visit_function(&mut self, function: &Function, kind: FunctionKind) {
            self.functions.push(kind);
            walk_function(self, function);
        }

        fn visit_binding(&mut self, id: &Identifier) {
            self.bindings.push(id.name.clone());
        }

        fn visit_identifier(&mut self, id: &Identifier) {
            self.references.push(id.name.clone());
        }
    }

    #[test]
    fn test_bindings_and_references_are_separated() {
        let program = parse(
            "function f(a) { var b = a.c; try {} catch (e) { g(e); } label: for (;;) break label; }",
        )
        .unwrap();
        let mut names = Names::default();
        names.visit_program(&program);

        assert_eq!(names.bindings, vec!["f", "a", "b", "e"]);
        assert_eq!(names.references, vec!["a", "g", "e"]);
        assert_eq!(names.functions, vec![FunctionKind::Declaration]);
    }

    #[test]
    fn test_function_expression_kind() {
        let program = parse("x = { get y() { return 1; } };").unwrap();
        let mut names = Names::default();
        names.visit_program(&program);

        assert_eq!(names.functions, vec![FunctionKind::Expression]);
        assert_eq!(names.references, vec!["x"]);
    }
}
