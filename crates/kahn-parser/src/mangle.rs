//! Local variable renaming.
//!
//! Every function introduces a scope. Names declared inside a function
//! (parameters, `var`/`let`/`const`, function declarations, catch
//! parameters and a function expression's own name) are replaced with the
//! shortest names that cannot capture or be captured by another binding.
//!
//! The top-level scope is never renamed, since its names are visible to
//! other scripts. A scope that calls `eval` or contains `with` can observe
//! names dynamically, so it and every scope enclosing it keep their names.
//!
//! Renaming runs in two passes over the same traversal order: an analysis
//! pass records scopes, declarations and references, then a rewrite pass
//! applies the chosen names.

use crate::ast::*;
use rustc_hash::{FxHashMap, FxHashSet};

const LEADING: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ$_";
const TRAILING: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ$_0123456789";

/// Words a generated name must never spell.
const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "implements",
    "import", "in", "instanceof", "interface", "let", "new", "null", "package", "private",
    "protected", "public", "return", "static", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with", "yield", "arguments", "eval", "undefined", "NaN",
    "Infinity",
];

/// Rename local variables of `program` in place.
pub fn mangle(program: &mut Program) {
    let mut analyzer = ScopeAnalyzer::new();
    analyzer.visit_program(program);
    let bindings = analyzer.assign_names();

    let mut renamer = Renamer {
        bindings,
        stack: vec![0],
        next_scope: 1,
    };
    renamer.visit_program(program);
}

/// The `n`th generated name: `a`..`_`, then `aa`, `ba`, ...
fn short_name(mut n: usize) -> String {
    let mut name = String::new();
    name.push(LEADING[n % LEADING.len()] as char);
    n /= LEADING.len();
    while n > 0 {
        n -= 1;
        name.push(TRAILING[n % TRAILING.len()] as char);
        n /= TRAILING.len();
    }
    name
}

#[derive(Debug, Default)]
struct Scope {
    parent: Option<usize>,
    /// Declared names, in first-declaration order
    declared: Vec<String>,
    tainted: bool,
}

impl Scope {
    fn declares(&self, name: &str) -> bool {
        self.declared.iter().any(|declared| declared == name)
    }
}

/// First pass: scope tree, declarations and references.
struct ScopeAnalyzer {
    /// Scopes in pre-order; index 0 is the top level
    scopes: Vec<Scope>,
    stack: Vec<usize>,
    /// Referenced name and the scope the reference appears in
    references: Vec<(String, usize)>,
}

impl ScopeAnalyzer {
    fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
            stack: vec![0],
            references: Vec::new(),
        }
    }

    fn current(&self) -> usize {
        self.stack.last().copied().unwrap_or(0)
    }

    fn declare(&mut self, name: &str) {
        let current = self.current();
        let scope = &mut self.scopes[current];
        if !scope.declares(name) {
            scope.declared.push(name.to_string());
        }
    }

    fn taint(&mut self) {
        let mut scope = Some(self.current());
        while let Some(id) = scope {
            self.scopes[id].tainted = true;
            scope = self.scopes[id].parent;
        }
    }

    /// The scope declaring `name` as seen from `scope`, if any.
    fn resolve(&self, name: &str, scope: usize) -> Option<usize> {
        let mut scope = Some(scope);
        while let Some(id) = scope {
            if self.scopes[id].declares(name) {
                return Some(id);
            }
            scope = self.scopes[id].parent;
        }
        None
    }

    /// Choose final names, returning each scope's declared-name mapping.
    fn assign_names(&self) -> Vec<FxHashMap<String, String>> {
        // Names passing through a scope to an outer declaration (or to the
        // global object when undeclared) must stay visible inside it.
        let mut free: Vec<Vec<(String, Option<usize>)>> = vec![Vec::new(); self.scopes.len()];
        for (name, scope) in &self.references {
            let declaring = self.resolve(name, *scope);
            let mut current = Some(*scope);
            while let Some(id) = current {
                if Some(id) == declaring {
                    break;
                }
                free[id].push((name.clone(), declaring));
                current = self.scopes[id].parent;
            }
        }

        let mut bindings: Vec<FxHashMap<String, String>> = Vec::with_capacity(self.scopes.len());
        // Pre-order guarantees every ancestor is assigned before its children
        for (id, scope) in self.scopes.iter().enumerate() {
            let renamable = id != 0 && !scope.tainted;

            let mut avoid: FxHashSet<String> = RESERVED.iter().map(|word| word.to_string()).collect();
            for (name, declaring) in &free[id] {
                let visible = declaring
                    .and_then(|declaring| bindings[declaring].get(name))
                    .unwrap_or(name);
                avoid.insert(visible.clone());
            }

            let mut names = FxHashMap::default();
            let mut counter = 0;
            for declared in &scope.declared {
                let final_name = if renamable {
                    loop {
                        let candidate = short_name(counter);
                        counter += 1;
                        if !avoid.contains(&candidate) {
                            break candidate;
                        }
                    }
                } else {
                    declared.clone()
                };
                names.insert(declared.clone(), final_name);
            }
            bindings.push(names);
        }
        bindings
    }
}

impl Visitor for ScopeAnalyzer {
    fn visit_statement(&mut self, stmt: &Statement) {
        if let Statement::With(_) = stmt {
            self.taint();
        }
        walk_statement(self, stmt);
    }

    fn visit_function(&mut self, function: &Function, kind: FunctionKind) {
        if let (FunctionKind::Declaration, Some(name)) = (kind, &function.name) {
            self.declare(&name.name);
        }

        let id = self.scopes.len();
        self.scopes.push(Scope {
            parent: Some(self.current()),
            ..Scope::default()
        });
        self.stack.push(id);

        if let (FunctionKind::Expression, Some(name)) = (kind, &function.name) {
            self.declare(&name.name);
        }
        for param in &function.params {
            self.declare(&param.name);
        }
        for stmt in &function.body {
            self.visit_statement(stmt);
        }

        self.stack.pop();
    }

    fn visit_binding(&mut self, id: &Identifier) {
        self.declare(&id.name);
    }

    fn visit_identifier(&mut self, id: &Identifier) {
        if id.name == "eval" {
            self.taint();
        }
        self.references.push((id.name.clone(), self.current()));
    }
}

/// Second pass: apply the chosen names.
struct Renamer {
    bindings: Vec<FxHashMap<String, String>>,
    stack: Vec<usize>,
    next_scope: usize,
}

impl Renamer {
    fn rename(&self, id: &mut Identifier) {
        for scope in self.stack.iter().rev() {
            if let Some(name) = self.bindings[*scope].get(&id.name) {
                if *name != id.name {
                    id.name = name.clone();
                }
                return;
            }
        }
    }
}

impl VisitorMut for Renamer {
    fn visit_function(&mut self, function: &mut Function, kind: FunctionKind) {
        if kind == FunctionKind::Declaration {
            if let Some(name) = &mut function.name {
                self.rename(name);
            }
        }

        self.stack.push(self.next_scope);
        self.next_scope += 1;

        if kind == FunctionKind::Expression {
            if let Some(name) = &mut function.name {
                self.rename(name);
            }
        }
        for param in &mut function.params {
            self.rename(param);
        }
        for stmt in &mut function.body {
            self.visit_statement(stmt);
        }

        self.stack.pop();
    }

    fn visit_binding(&mut self, id: &mut Identifier) {
        self.rename(id);
    }

    fn visit_identifier(&mut self, id: &mut Identifier) {
        self.rename(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{generate, CodegenOptions};
    use crate::parse;

    fn mangled(source: &str) -> String {
        let mut program = parse(source).unwrap();
        mangle(&mut program);
        generate(&program, CodegenOptions::compact())
    }

    #[test]
    fn test_short_names() {
        assert_eq!(short_name(0), "a");
        assert_eq!(short_name(53), "_");
        assert_eq!(short_name(54), "aa");
        assert_eq!(short_name(55), "ba");
    }

    #[test]
    fn test_locals_are_renamed() {
        assert_eq!(
            mangled("function outer(first, second) { var total = first + second; return total; }"),
            "function outer(a,b){var c=a+b;return c;}"
        );
    }

    #[test]
    fn test_top_level_names_are_kept() {
        assert_eq!(mangled("var total = 1; total++;"), "var total=1;total++;");
    }

    #[test]
    fn test_free_names_are_not_captured() {
        // `a` refers to the global, so the local may not take that name
        assert_eq!(
            mangled("function f(x) { return a + x; }"),
            "function f(b){return a+b;}"
        );
    }

    #[test]
    fn test_outer_bindings_survive_in_inner_scopes() {
        assert_eq!(
            mangled("function f(x) { return function (y) { return x + y; }; }"),
            "function f(a){return function(b){return a+b;};}"
        );
    }

    #[test]
    fn test_eval_blocks_renaming() {
        assert_eq!(
            mangled("function f(x) { function g(y) { eval(y); } return x; }"),
            "function f(x){function g(y){eval(y);}return x;}"
        );
    }

    #[test]
    fn test_with_blocks_renaming() {
        assert_eq!(
            mangled("function f(o) { with (o) { x = 1; } }"),
            "function f(o){with(o){x=1;}}"
        );
    }

    #[test]
    fn test_named_function_expression() {
        assert_eq!(
            mangled("function f() { return function loop(n) { return loop(n - 1); }; }"),
            "function f(){return function a(b){return a(b-1);};}"
        );
    }

    #[test]
    fn test_property_names_are_untouched() {
        assert_eq!(
            mangled("function f(value) { return { value: value }.value; }"),
            "function f(a){return {value:a}.value;}"
        );
    }
}
