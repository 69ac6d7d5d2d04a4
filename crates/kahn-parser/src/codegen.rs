//! JavaScript code generation from the AST.
//!
//! Output is either compact (no whitespace beyond what tokenization needs)
//! or beautified with one statement per line and a configurable indent.
//! Parentheses are reinserted from operator precedence, so any tree,
//! including one assembled by a rewrite, prints as source that parses
//! back to the same tree.

use crate::ast::*;
use crate::lexer::is_identifier_part;
use crate::parser::precedence::{binary_precedence, logical_precedence};

// Printing precedence levels. Binary operators sit between CONDITIONAL and
// UNARY, offset from the parse table in `parser::precedence`.
const SEQUENCE: u8 = 0;
const ASSIGNMENT: u8 = 1;
const CONDITIONAL: u8 = 2;
const BINARY_BASE: u8 = 2;
const UNARY: u8 = 13;
const POSTFIX: u8 = 14;
const CALL: u8 = 15;
const MEMBER: u8 = 16;
const PRIMARY: u8 = 17;

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodegenOptions {
    /// Indent width for beautified output; `None` prints compact.
    pub indent: Option<usize>,
}

impl CodegenOptions {
    pub fn compact() -> Self {
        Self { indent: None }
    }

    pub fn beautify(indent: usize) -> Self {
        Self {
            indent: Some(indent),
        }
    }

    /// Interpret a `--beautify <n>` style level: zero or absent means compact.
    pub fn from_level(level: Option<usize>) -> Self {
        match level {
            Some(indent) if indent > 0 => Self::beautify(indent),
            _ => Self::compact(),
        }
    }

    pub fn is_beautify(&self) -> bool {
        self.indent.is_some()
    }
}

/// Print a whole program.
pub fn generate(program: &Program, options: CodegenOptions) -> String {
    let mut generator = CodeGenerator::new(options);
    generator.program(program);
    generator.finish()
}

/// Print a single statement.
pub fn generate_statement(stmt: &Statement, options: CodegenOptions) -> String {
    let mut generator = CodeGenerator::new(options);
    generator.statement(stmt);
    generator.finish()
}

/// Print a single expression.
pub fn generate_expression(expr: &Expression, options: CodegenOptions) -> String {
    let mut generator = CodeGenerator::new(options);
    generator.expression(expr, SEQUENCE);
    generator.finish()
}

pub struct CodeGenerator {
    options: CodegenOptions,
    out: String,
    level: usize,
}

impl CodeGenerator {
    pub fn new(options: CodegenOptions) -> Self {
        Self {
            options,
            out: String::new(),
            level: 0,
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    // ========================================================================
    // Layout primitives
    // ========================================================================

    fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// A space that only matters for readability.
    fn space(&mut self) {
        if self.options.is_beautify() {
            self.out.push(' ');
        }
    }

    fn newline(&mut self) {
        if self.options.is_beautify() {
            self.out.push('\n');
        }
    }

    fn indent(&mut self) {
        if let Some(width) = self.options.indent {
            self.out.extend(std::iter::repeat(' ').take(width * self.level));
        }
    }

    fn comma(&mut self) {
        self.out.push(',');
        self.space();
    }

    /// Write a binary-style operator, spaced when beautifying.
    fn operator(&mut self, op: &str) {
        self.space();
        self.write(op);
        self.space();
    }

    /// Keep `a - -b`, `a + ++b` and `a / /re/` from fusing into other tokens.
    fn separate_from_previous(&mut self, mark: usize) {
        let previous = self.out[..mark].chars().last();
        if let Some(previous @ ('+' | '-' | '/')) = previous {
            if self.out[mark..].starts_with(previous) {
                self.out.insert(mark, ' ');
            }
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn program(&mut self, program: &Program) {
        for (i, stmt) in program.statements.iter().enumerate() {
            if i > 0 {
                self.newline();
            }
            self.statement(stmt);
        }
    }

    fn block(&mut self, statements: &[Statement]) {
        self.write("{");
        if statements.is_empty() {
            self.write("}");
            return;
        }
        self.level += 1;
        for stmt in statements {
            self.newline();
            self.indent();
            self.statement(stmt);
        }
        self.level -= 1;
        self.newline();
        self.indent();
        self.write("}");
    }

    /// Body of a control statement, after its head.
    fn body(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Block(block) => {
                self.space();
                self.block(&block.statements);
            }
            Statement::Empty(_) => self.write(";"),
            _ if self.options.is_beautify() => {
                self.level += 1;
                self.newline();
                self.indent();
                self.statement(stmt);
                self.level -= 1;
            }
            _ => self.statement(stmt),
        }
    }

    pub fn statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::VariableDecl(decl) => {
                self.variable_decl(decl, true);
                self.write(";");
            }
            Statement::FunctionDecl(function) => self.function(function),
            Statement::Expression(stmt) => {
                let mark = self.out.len();
                self.expression(&stmt.expression, SEQUENCE);
                if starts_ambiguously(&self.out[mark..]) {
                    self.out.insert(mark, '(');
                    self.out.push(')');
                }
                self.write(";");
            }
            Statement::Block(block) => self.block(&block.statements),
            Statement::If(stmt) => self.if_statement(stmt),
            Statement::For(stmt) => {
                self.write("for");
                self.space();
                self.write("(");
                match &stmt.init {
                    Some(ForInit::VariableDecl(decl)) => self.variable_decl(decl, false),
                    Some(ForInit::Expression(expr)) => self.expression_no_in(expr, SEQUENCE),
                    None => {}
                }
                self.write(";");
                if let Some(test) = &stmt.test {
                    self.space();
                    self.expression(test, SEQUENCE);
                }
                self.write(";");
                if let Some(update) = &stmt.update {
                    self.space();
                    self.expression(update, SEQUENCE);
                }
                self.write(")");
                self.body(&stmt.body);
            }
            Statement::ForIn(stmt) => {
                self.write("for");
                self.space();
                self.write("(");
                match &stmt.left {
                    ForInTarget::VariableDecl(decl) => self.variable_decl(decl, false),
                    ForInTarget::Expression(expr) => self.expression(expr, CALL),
                }
                self.write(" in ");
                self.expression(&stmt.right, SEQUENCE);
                self.write(")");
                self.body(&stmt.body);
            }
            Statement::While(stmt) => {
                self.write("while");
                self.space();
                self.parenthesized(&stmt.test);
                self.body(&stmt.body);
            }
            Statement::DoWhile(stmt) => {
                self.write("do");
                match &*stmt.body {
                    Statement::Block(_) => self.body(&stmt.body),
                    _ if self.options.is_beautify() => self.body(&stmt.body),
                    body => {
                        self.write(" ");
                        self.statement(body);
                    }
                }
                if matches!(*stmt.body, Statement::Block(_)) {
                    self.space();
                } else {
                    self.newline();
                    self.indent();
                }
                self.write("while");
                self.space();
                self.parenthesized(&stmt.test);
                self.write(";");
            }
            Statement::Return(stmt) => {
                self.write("return");
                if let Some(argument) = &stmt.argument {
                    self.write(" ");
                    self.expression(argument, SEQUENCE);
                }
                self.write(";");
            }
            Statement::Break(stmt) => self.jump("break", stmt.label.as_deref()),
            Statement::Continue(stmt) => self.jump("continue", stmt.label.as_deref()),
            Statement::Throw(stmt) => {
                self.write("throw ");
                self.expression(&stmt.argument, SEQUENCE);
                self.write(";");
            }
            Statement::Try(stmt) => {
                self.write("try");
                self.space();
                self.block(&stmt.block.statements);
                if let Some(handler) = &stmt.handler {
                    self.space();
                    self.write("catch");
                    self.space();
                    self.write("(");
                    self.write(&handler.param.name);
                    self.write(")");
                    self.space();
                    self.block(&handler.body.statements);
                }
                if let Some(finalizer) = &stmt.finalizer {
                    self.space();
                    self.write("finally");
                    self.space();
                    self.block(&finalizer.statements);
                }
            }
            Statement::Switch(stmt) => self.switch_statement(stmt),
            Statement::Labeled(stmt) => {
                self.write(&stmt.label);
                self.write(":");
                self.body(&stmt.body);
            }
            Statement::With(stmt) => {
                self.write("with");
                self.space();
                self.parenthesized(&stmt.object);
                self.body(&stmt.body);
            }
            Statement::Debugger(_) => self.write("debugger;"),
            Statement::Empty(_) => self.write(";"),
        }
    }

    fn parenthesized(&mut self, expr: &Expression) {
        self.write("(");
        self.expression(expr, SEQUENCE);
        self.write(")");
    }

    fn jump(&mut self, keyword: &str, label: Option<&str>) {
        self.write(keyword);
        if let Some(label) = label {
            self.write(" ");
            self.write(label);
        }
        self.write(";");
    }

    fn variable_decl(&mut self, decl: &VariableDecl, allow_in: bool) {
        self.write(decl.kind.as_str());
        self.write(" ");
        for (i, declarator) in decl.declarations.iter().enumerate() {
            if i > 0 {
                self.comma();
            }
            self.write(&declarator.name.name);
            if let Some(init) = &declarator.init {
                self.operator("=");
                if allow_in {
                    self.expression(init, ASSIGNMENT);
                } else {
                    self.expression_no_in(init, ASSIGNMENT);
                }
            }
        }
    }

    fn if_statement(&mut self, stmt: &IfStatement) {
        self.write("if");
        self.space();
        self.parenthesized(&stmt.test);

        // Braces keep a trailing `else` from binding to a nested `if`
        let braced = stmt.alternate.is_some() && ends_with_open_if(&stmt.consequent);
        if braced {
            self.space();
            self.block(std::slice::from_ref(&*stmt.consequent));
        } else {
            self.body(&stmt.consequent);
        }

        let Some(alternate) = &stmt.alternate else {
            return;
        };
        if braced || matches!(*stmt.consequent, Statement::Block(_)) {
            self.space();
        } else {
            self.newline();
            self.indent();
        }
        self.write("else");
        match &**alternate {
            Statement::If(_) => {
                self.write(" ");
                self.statement(alternate);
            }
            Statement::Block(_) | Statement::Empty(_) => self.body(alternate),
            _ if self.options.is_beautify() => self.body(alternate),
            _ => {
                self.write(" ");
                self.statement(alternate);
            }
        }
    }

    fn switch_statement(&mut self, stmt: &SwitchStatement) {
        self.write("switch");
        self.space();
        self.parenthesized(&stmt.discriminant);
        self.space();
        self.write("{");
        self.level += 1;
        for case in &stmt.cases {
            self.newline();
            self.indent();
            match &case.test {
                Some(test) => {
                    self.write("case ");
                    self.expression(test, SEQUENCE);
                    self.write(":");
                }
                None => self.write("default:"),
            }
            self.level += 1;
            for stmt in &case.consequent {
                self.newline();
                self.indent();
                self.statement(stmt);
            }
            self.level -= 1;
        }
        self.level -= 1;
        if !stmt.cases.is_empty() {
            self.newline();
            self.indent();
        }
        self.write("}");
    }

    fn function(&mut self, function: &Function) {
        self.write("function");
        if let Some(name) = &function.name {
            self.write(" ");
            self.write(&name.name);
        }
        self.function_tail(function);
    }

    /// Parameter list and body.
    fn function_tail(&mut self, function: &Function) {
        self.write("(");
        for (i, param) in function.params.iter().enumerate() {
            if i > 0 {
                self.comma();
            }
            self.write(&param.name);
        }
        self.write(")");
        self.space();
        self.block(&function.body);
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Print `expr`, parenthesized if it binds looser than `min`.
    pub fn expression(&mut self, expr: &Expression, min: u8) {
        let parens = precedence(expr) < min;
        if parens {
            self.write("(");
        }
        self.expression_inner(expr);
        if parens {
            self.write(")");
        }
    }

    /// Print an expression in a `for` head, where a bare `in` would be
    /// misread as the for-in separator.
    fn expression_no_in(&mut self, expr: &Expression, min: u8) {
        if contains_in_operator(expr) {
            self.write("(");
            self.expression(expr, SEQUENCE);
            self.write(")");
        } else {
            self.expression(expr, min);
        }
    }

    fn expression_inner(&mut self, expr: &Expression) {
        match expr {
            Expression::Number(lit) => self.write(&lit.raw),
            Expression::String(lit) => {
                let quoted = quote_string(&lit.value);
                self.write(&quoted);
            }
            Expression::Regex(lit) => {
                self.write("/");
                self.write(&lit.pattern);
                self.write("/");
                self.write(&lit.flags);
            }
            Expression::Boolean(lit) => self.write(if lit.value { "true" } else { "false" }),
            Expression::Null(_) => self.write("null"),
            Expression::This(_) => self.write("this"),
            Expression::Identifier(id) => self.write(&id.name),
            Expression::Array(array) => {
                self.write("[");
                for (i, element) in array.elements.iter().enumerate() {
                    if i > 0 {
                        self.comma();
                    }
                    if let Some(element) = element {
                        self.expression(element, ASSIGNMENT);
                    }
                }
                // A trailing hole needs its own comma to survive
                if matches!(array.elements.last(), Some(None)) {
                    self.write(",");
                }
                self.write("]");
            }
            Expression::Object(object) => self.object(object),
            Expression::Function(function) => self.function(function),
            Expression::Unary(unary) => {
                self.write(unary.operator.as_str());
                if unary.operator.is_keyword() {
                    self.write(" ");
                }
                let mark = self.out.len();
                self.expression(&unary.argument, UNARY);
                self.separate_from_previous(mark);
            }
            Expression::Update(update) => {
                if update.prefix {
                    self.write(update.operator.as_str());
                    let mark = self.out.len();
                    self.expression(&update.argument, UNARY);
                    self.separate_from_previous(mark);
                } else {
                    self.expression(&update.argument, CALL);
                    self.write(update.operator.as_str());
                }
            }
            Expression::Binary(binary) => {
                let level = BINARY_BASE + binary_precedence(binary.operator) as u8;
                self.binary(&binary.left, binary.operator.as_str(), &binary.right, level);
            }
            Expression::Logical(logical) => {
                let level = BINARY_BASE + logical_precedence(logical.operator) as u8;
                self.binary(&logical.left, logical.operator.as_str(), &logical.right, level);
            }
            Expression::Conditional(cond) => {
                self.expression(&cond.test, CONDITIONAL + 1);
                self.operator("?");
                self.expression(&cond.consequent, ASSIGNMENT);
                self.operator(":");
                self.expression(&cond.alternate, ASSIGNMENT);
            }
            Expression::Assignment(assign) => {
                self.expression(&assign.target, CALL);
                self.operator(assign.operator.as_str());
                self.expression(&assign.value, ASSIGNMENT);
            }
            Expression::Sequence(seq) => {
                for (i, expr) in seq.expressions.iter().enumerate() {
                    if i > 0 {
                        self.comma();
                    }
                    self.expression(expr, ASSIGNMENT);
                }
            }
            Expression::Call(call) => {
                if matches!(*call.callee, Expression::Function(_)) {
                    self.write("(");
                    self.expression(&call.callee, SEQUENCE);
                    self.write(")");
                } else {
                    self.expression(&call.callee, CALL);
                }
                self.arguments(&call.arguments);
            }
            Expression::New(new) => {
                self.write("new ");
                if calls_in_member_chain(&new.callee) {
                    self.write("(");
                    self.expression(&new.callee, SEQUENCE);
                    self.write(")");
                } else {
                    self.expression(&new.callee, MEMBER);
                }
                self.arguments(&new.arguments);
            }
            Expression::Member(member) => {
                if is_bare_integer(&member.object) {
                    self.write("(");
                    self.expression(&member.object, SEQUENCE);
                    self.write(")");
                } else {
                    self.expression(&member.object, CALL);
                }
                self.write(".");
                self.write(&member.property);
            }
            Expression::Index(index) => {
                self.expression(&index.object, CALL);
                self.write("[");
                self.expression(&index.index, SEQUENCE);
                self.write("]");
            }
        }
    }

    fn binary(&mut self, left: &Expression, op: &str, right: &Expression, level: u8) {
        self.expression(left, level);
        if op.starts_with(|c: char| c.is_ascii_alphabetic()) {
            self.write(" ");
            self.write(op);
            self.write(" ");
        } else {
            self.operator(op);
        }
        let mark = self.out.len();
        // Left-associative: an equal-precedence right operand needs parentheses
        self.expression(right, level + 1);
        self.separate_from_previous(mark);
    }

    fn arguments(&mut self, arguments: &[Expression]) {
        self.write("(");
        for (i, arg) in arguments.iter().enumerate() {
            if i > 0 {
                self.comma();
            }
            self.expression(arg, ASSIGNMENT);
        }
        self.write(")");
    }

    fn object(&mut self, object: &ObjectExpression) {
        self.write("{");
        if object.properties.is_empty() {
            self.write("}");
            return;
        }
        self.level += 1;
        for (i, property) in object.properties.iter().enumerate() {
            if i > 0 {
                self.write(",");
            }
            self.newline();
            self.indent();
            match property.kind {
                PropertyKind::Init => {
                    self.property_key(&property.key);
                    self.write(":");
                    self.space();
                    self.expression(&property.value, ASSIGNMENT);
                }
                PropertyKind::Get | PropertyKind::Set => {
                    self.write(if property.kind == PropertyKind::Get {
                        "get "
                    } else {
                        "set "
                    });
                    self.property_key(&property.key);
                    match &property.value {
                        Expression::Function(function) => self.function_tail(function),
                        other => self.expression(other, ASSIGNMENT),
                    }
                }
            }
        }
        self.level -= 1;
        self.newline();
        self.indent();
        self.write("}");
    }

    fn property_key(&mut self, key: &PropertyKey) {
        match key {
            PropertyKey::Identifier(name) => self.write(name),
            PropertyKey::String(value) => {
                let quoted = quote_string(value);
                self.write(&quoted);
            }
            PropertyKey::Number(raw) => self.write(raw),
        }
    }
}

/// Printing precedence of an expression.
fn precedence(expr: &Expression) -> u8 {
    match expr {
        Expression::Sequence(_) => SEQUENCE,
        Expression::Assignment(_) => ASSIGNMENT,
        Expression::Conditional(_) => CONDITIONAL,
        Expression::Logical(logical) => BINARY_BASE + logical_precedence(logical.operator) as u8,
        Expression::Binary(binary) => BINARY_BASE + binary_precedence(binary.operator) as u8,
        Expression::Unary(_) => UNARY,
        Expression::Update(update) if update.prefix => UNARY,
        Expression::Update(_) => POSTFIX,
        Expression::Call(_) => CALL,
        Expression::New(_) | Expression::Member(_) | Expression::Index(_) => MEMBER,
        Expression::Number(_)
        | Expression::String(_)
        | Expression::Regex(_)
        | Expression::Boolean(_)
        | Expression::Null(_)
        | Expression::This(_)
        | Expression::Identifier(_)
        | Expression::Array(_)
        | Expression::Object(_)
        | Expression::Function(_) => PRIMARY,
    }
}

/// An expression statement must not start with `{` or the keyword `function`.
fn starts_ambiguously(text: &str) -> bool {
    if text.starts_with('{') {
        return true;
    }
    match text.strip_prefix("function") {
        Some(rest) => !rest.starts_with(is_identifier_part),
        None => false,
    }
}

/// Whether `stmt` ends in an `if` without `else` that would capture a
/// following `else`.
fn ends_with_open_if(stmt: &Statement) -> bool {
    match stmt {
        Statement::If(stmt) => match &stmt.alternate {
            None => true,
            Some(alternate) => ends_with_open_if(alternate),
        },
        Statement::For(stmt) => ends_with_open_if(&stmt.body),
        Statement::ForIn(stmt) => ends_with_open_if(&stmt.body),
        Statement::While(stmt) => ends_with_open_if(&stmt.body),
        Statement::With(stmt) => ends_with_open_if(&stmt.body),
        Statement::Labeled(stmt) => ends_with_open_if(&stmt.body),
        _ => false,
    }
}

/// Whether an `in` operator appears outside any bracketing construct.
fn contains_in_operator(expr: &Expression) -> bool {
    match expr {
        Expression::Binary(binary) => {
            binary.operator == BinaryOperator::In
                || contains_in_operator(&binary.left)
                || contains_in_operator(&binary.right)
        }
        Expression::Logical(logical) => {
            contains_in_operator(&logical.left) || contains_in_operator(&logical.right)
        }
        Expression::Assignment(assign) => {
            contains_in_operator(&assign.target) || contains_in_operator(&assign.value)
        }
        Expression::Conditional(cond) => {
            contains_in_operator(&cond.test)
                || contains_in_operator(&cond.consequent)
                || contains_in_operator(&cond.alternate)
        }
        Expression::Sequence(seq) => seq.expressions.iter().any(contains_in_operator),
        Expression::Unary(unary) => contains_in_operator(&unary.argument),
        Expression::Update(update) => contains_in_operator(&update.argument),
        Expression::Call(call) => contains_in_operator(&call.callee),
        Expression::New(new) => contains_in_operator(&new.callee),
        Expression::Member(member) => contains_in_operator(&member.object),
        Expression::Index(index) => contains_in_operator(&index.object),
        _ => false,
    }
}

/// `new a().b()` would attach the arguments to the wrong callee.
fn calls_in_member_chain(expr: &Expression) -> bool {
    match expr {
        Expression::Call(_) => true,
        Expression::Member(member) => calls_in_member_chain(&member.object),
        Expression::Index(index) => calls_in_member_chain(&index.object),
        _ => false,
    }
}

/// `1.toString()` does not lex; the literal needs parentheses.
fn is_bare_integer(expr: &Expression) -> bool {
    match expr {
        Expression::Number(lit) => lit.raw.bytes().all(|b| b.is_ascii_digit()),
        _ => false,
    }
}

/// Quote a string value as a double-quoted JavaScript literal.
pub fn quote_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\u{0008}' => quoted.push_str("\\b"),
            '\u{000C}' => quoted.push_str("\\f"),
            '\u{2028}' => quoted.push_str("\\u2028"),
            '\u{2029}' => quoted.push_str("\\u2029"),
            c if (c as u32) < 0x20 || c == '\u{7F}' => {
                quoted.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
