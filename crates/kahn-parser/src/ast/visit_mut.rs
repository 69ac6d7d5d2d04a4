//! Mutable counterpart of [`Visitor`](super::Visitor).
//!
//! Traversal order is identical to the read-only visitor, so an analysis
//! pass and a rewrite pass over the same tree see nodes in the same order.
//! `visit_expression` receives the expression slot itself, which lets a
//! rewrite replace a node wholesale.

use super::*;

pub trait VisitorMut: Sized {
    fn visit_program(&mut self, program: &mut Program) {
        walk_program_mut(self, program);
    }

    fn visit_statement(&mut self, stmt: &mut Statement) {
        walk_statement_mut(self, stmt);
    }

    fn visit_variable_declarator(&mut self, decl: &mut VariableDeclarator) {
        walk_variable_declarator_mut(self, decl);
    }

    fn visit_function(&mut self, function: &mut Function, _kind: FunctionKind) {
        walk_function_mut(self, function);
    }

    fn visit_catch_clause(&mut self, clause: &mut CatchClause) {
        walk_catch_clause_mut(self, clause);
    }

    fn visit_expression(&mut self, expr: &mut Expression) {
        walk_expression_mut(self, expr);
    }

    fn visit_binding(&mut self, _id: &mut Identifier) {}

    fn visit_identifier(&mut self, _id: &mut Identifier) {}
}

pub fn walk_program_mut<V: VisitorMut>(visitor: &mut V, program: &mut Program) {
    for stmt in &mut program.statements {
        visitor.visit_statement(stmt);
    }
}

pub fn walk_statement_mut<V: VisitorMut>(visitor: &mut V, stmt: &mut Statement) {
    match stmt {
        Statement::VariableDecl(decl) => walk_variable_decl_mut(visitor, decl),
        Statement::FunctionDecl(function) => {
            visitor.visit_function(function, FunctionKind::Declaration)
        }
        Statement::Expression(stmt) => visitor.visit_expression(&mut stmt.expression),
        Statement::Block(block) => walk_block_mut(visitor, block),
        Statement::If(stmt) => {
            visitor.visit_expression(&mut stmt.test);
            visitor.visit_statement(&mut stmt.consequent);
            if let Some(alternate) = &mut stmt.alternate {
                visitor.visit_statement(alternate);
            }
        }
        Statement::For(stmt) => {
            match &mut stmt.init {
                Some(ForInit::VariableDecl(decl)) => walk_variable_decl_mut(visitor, decl),
                Some(ForInit::Expression(expr)) => visitor.visit_expression(expr),
                None => {}
            }
            if let Some(test) = &mut stmt.test {
                visitor.visit_expression(test);
            }
            if let Some(update) = &mut stmt.update {
                visitor.visit_expression(update);
            }
            visitor.visit_statement(&mut stmt.body);
        }
        Statement::ForIn(stmt) => {
            match &mut stmt.left {
                ForInTarget::VariableDecl(decl) => walk_variable_decl_mut(visitor, decl),
                ForInTarget::Expression(expr) => visitor.visit_expression(expr),
            }
            visitor.visit_expression(&mut stmt.right);
            visitor.visit_statement(&mut stmt.body);
        }
        Statement::While(stmt) => {
            visitor.visit_expression(&mut stmt.test);
            visitor.visit_statement(&mut stmt.body);
        }
        Statement::DoWhile(stmt) => {
            visitor.visit_statement(&mut stmt.body);
            visitor.visit_expression(&mut stmt.test);
        }
        Statement::Return(stmt) => {
            if let Some(argument) = &mut stmt.argument {
                visitor.visit_expression(argument);
            }
        }
        Statement::Break(_) | Statement::Continue(_) => {}
        Statement::Throw(stmt) => visitor.visit_expression(&mut stmt.argument),
        Statement::Try(stmt) => {
            walk_block_mut(visitor, &mut stmt.block);
            if let Some(handler) = &mut stmt.handler {
                visitor.visit_catch_clause(handler);
            }
            if let Some(finalizer) = &mut stmt.finalizer {
                walk_block_mut(visitor, finalizer);
            }
        }
        Statement::Switch(stmt) => {
            visitor.visit_expression(&mut stmt.discriminant);
            for case in &mut stmt.cases {
                if let Some(test) = &mut case.test {
                    visitor.visit_expression(test);
                }
                for stmt in &mut case.consequent {
                    visitor.visit_statement(stmt);
                }
            }
        }
        Statement::Labeled(stmt) => visitor.visit_statement(&mut stmt.body),
        Statement::With(stmt) => {
            visitor.visit_expression(&mut stmt.object);
            visitor.visit_statement(&mut stmt.body);
        }
        Statement::Debugger(_) | Statement::Empty(_) => {}
    }
}

pub fn walk_block_mut<V: VisitorMut>(visitor: &mut V, block: &mut BlockStatement) {
    for stmt in &mut block.statements {
        visitor.visit_statement(stmt);
    }
}

pub fn walk_variable_decl_mut<V: VisitorMut>(visitor: &mut V, decl: &mut VariableDecl) {
    for declarator in &mut decl.declarations {
        visitor.visit_variable_declarator(declarator);
    }
}

pub fn walk_variable_declarator_mut<V: VisitorMut>(visitor: &mut V, decl: &mut VariableDeclarator) {
    visitor.visit_binding(&mut decl.name);
    if let Some(init) = &mut decl.init {
        visitor.visit_expression(init);
    }
}

pub fn walk_function_mut<V: VisitorMut>(visitor: &mut V, function: &mut Function) {
    if let Some(name) = &mut function.name {
        visitor.visit_binding(name);
    }
    for param in &mut function.params {
        visitor.visit_binding(param);
    }
    for stmt in &mut function.body {
        visitor.visit_statement(stmt);
    }
}

pub fn walk_catch_clause_mut<V: VisitorMut>(visitor: &mut V, clause: &mut CatchClause) {
    visitor.visit_binding(&mut clause.param);
    walk_block_mut(visitor, &mut clause.body);
}

pub fn walk_expression_mut<V: VisitorMut>(visitor: &mut V, expr: &mut Expression) {
    match expr {
        Expression::Number(_)
        | Expression::String(_)
        | Expression::Regex(_)
        | Expression::Boolean(_)
        | Expression::Null(_)
        | Expression::This(_) => {}
        Expression::Identifier(id) => visitor.visit_identifier(id),
        Expression::Array(array) => {
            for element in array.elements.iter_mut().flatten() {
                visitor.visit_expression(element);
            }
        }
        Expression::Object(object) => {
            for property in &mut object.properties {
                visitor.visit_expression(&mut property.value);
            }
        }
        Expression::Function(function) => {
            visitor.visit_function(function, FunctionKind::Expression)
        }
        Expression::Unary(unary) => visitor.visit_expression(&mut unary.argument),
        Expression::Update(update) => visitor.visit_expression(&mut update.argument),
        Expression::Binary(binary) => {
            visitor.visit_expression(&mut binary.left);
            visitor.visit_expression(&mut binary.right);
        }
        Expression::Logical(logical) => {
            visitor.visit_expression(&mut logical.left);
            visitor.visit_expression(&mut logical.right);
        }
        Expression::Conditional(cond) => {
            visitor.visit_expression(&mut cond.test);
            visitor.visit_expression(&mut cond.consequent);
            visitor.visit_expression(&mut cond.alternate);
        }
        Expression::Assignment(assign) => {
            visitor.visit_expression(&mut assign.target);
            visitor.visit_expression(&mut assign.value);
        }
        Expression::Sequence(seq) => {
            for expr in &mut seq.expressions {
                visitor.visit_expression(expr);
            }
        }
        Expression::Call(call) => {
            visitor.visit_expression(&mut call.callee);
            for arg in &mut call.arguments {
                visitor.visit_expression(arg);
            }
        }
        Expression::New(new) => {
            visitor.visit_expression(&mut new.callee);
            for arg in &mut new.arguments {
                visitor.visit_expression(arg);
            }
        }
        Expression::Member(member) => visitor.visit_expression(&mut member.object),
        Expression::Index(index) => {
            visitor.visit_expression(&mut index.object);
            visitor.visit_expression(&mut index.index);
        }
    }
}
