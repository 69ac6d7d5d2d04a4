//! Dependency graph construction
//!
//! Starting from the root id, each module is resolved, read, parsed and
//! cached, then scanned for `require("...")` calls. Every newly named
//! module is visited immediately, so the graph is closed when the root
//! call returns.

use kahn_parser::ast::{walk_call_expression, CallExpression, Program, Visitor};
use kahn_parser::Span;
use tracing::{debug, warn};

use crate::cache::{CachedSource, SourceCache};
use crate::error::{BundleError, BundleResult};
use crate::fs::FileSystem;
use crate::graph::DependencyGraph;
use crate::module_id::ModuleId;
use crate::resolver::ModuleResolver;

/// The reserved name of the loader call.
pub const REQUIRE: &str = "require";

/// One `require` call found in a module body.
#[derive(Debug, Clone, PartialEq)]
pub enum Requirement {
    /// `require("id")`, with the id as written
    Static(String, Span),
    /// Any other argument list
    Dynamic(Span),
}

/// Every `require` call in `program`, in source order.
pub fn collect_requirements(program: &Program) -> Vec<Requirement> {
    let mut collector = RequireCollector::default();
    collector.visit_program(program);
    collector.found
}

#[derive(Default)]
struct RequireCollector {
    found: Vec<Requirement>,
}

impl Visitor for RequireCollector {
    fn visit_call_expression(&mut self, call: &CallExpression) {
        if call.is_call_to(REQUIRE) {
            let requirement = match call.arguments.as_slice() {
                [argument] => match argument.as_string_literal() {
                    Some(specifier) => Requirement::Static(specifier.to_string(), call.span),
                    None => Requirement::Dynamic(call.span),
                },
                _ => Requirement::Dynamic(call.span),
            };
            self.found.push(requirement);
        }
        walk_call_expression(self, call);
    }
}

/// Builds the dependency graph and source cache for one root module.
pub struct GraphBuilder<'a> {
    fs: &'a dyn FileSystem,
    resolver: &'a ModuleResolver,
    graph: DependencyGraph,
    cache: SourceCache,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(fs: &'a dyn FileSystem, resolver: &'a ModuleResolver) -> Self {
        Self {
            fs,
            resolver,
            graph: DependencyGraph::new(),
            cache: SourceCache::new(),
        }
    }

    /// Discover `root` and everything it transitively requires.
    pub fn build(mut self, root: &ModuleId) -> BundleResult<(DependencyGraph, SourceCache)> {
        self.discover(root, None)?;
        Ok((self.graph, self.cache))
    }

    fn discover(&mut self, id: &ModuleId, referrer: Option<&ModuleId>) -> BundleResult<()> {
        if self.cache.contains(id) {
            return Ok(());
        }

        let path = self
            .resolver
            .resolve(self.fs, id)
            .map_err(|err| err.with_referrer(referrer))?;
        let source = self
            .fs
            .read_to_string(&path)
            .map_err(|source| BundleError::Read {
                id: id.clone(),
                path: path.clone(),
                source,
            })?;

        let entry = CachedSource::parse(path, source);
        let requirements = match &entry.program {
            Some(program) => collect_requirements(program),
            None => {
                warn!(
                    module = %id,
                    path = %entry.path.display(),
                    errors = entry.errors.len(),
                    "failed to parse module, treating it as dependency-free"
                );
                Vec::new()
            }
        };

        let mut dependencies = Vec::new();
        for requirement in requirements {
            match requirement {
                Requirement::Static(specifier, _) => {
                    let dependency = id.join(&specifier);
                    if !dependencies.contains(&dependency) {
                        dependencies.push(dependency);
                    }
                }
                Requirement::Dynamic(span) => {
                    return Err(BundleError::DynamicDependency {
                        id: id.clone(),
                        path: entry.path.clone(),
                        source_text: entry.source.clone(),
                        span,
                    });
                }
            }
        }

        self.graph.add_module(id.clone());
        self.cache.insert(id.clone(), entry);

        for dependency in dependencies {
            debug!(from = %id, to = %dependency, "discovered dependency");
            self.graph.add_dependency(id.clone(), dependency.clone());
            self.discover(&dependency, Some(id))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;
    use std::path::PathBuf;

    fn parse(source: &str) -> Program {
        kahn_parser::parse(source).unwrap()
    }

    fn build(fs: &MemoryFileSystem, root: &str) -> BundleResult<(DependencyGraph, SourceCache)> {
        let resolver = ModuleResolver::new(vec![PathBuf::from(".")], "js");
        GraphBuilder::new(fs, &resolver).build(&ModuleId::new(root))
    }

    fn names(ids: &[ModuleId]) -> Vec<&str> {
        ids.iter().map(ModuleId::as_str).collect()
    }

    #[test]
    fn test_collect_static_requirements() {
        let program = parse(
            r#"define(function (require, exports, module) {
                var a = require("a");
                var b = require('./b').value;
                foo(require("c"));
            });"#,
        );

        let specifiers: Vec<String> = collect_requirements(&program)
            .into_iter()
            .map(|req| match req {
                Requirement::Static(specifier, _) => specifier,
                Requirement::Dynamic(_) => panic!("unexpected dynamic require"),
            })
            .collect();

        assert_eq!(specifiers, vec!["a", "./b", "c"]);
    }

    #[test]
    fn test_collect_dynamic_requirements() {
        let program = parse(r#"var name = "x"; require(name); require("a", "b"); require();"#);
        let found = collect_requirements(&program);

        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|req| matches!(req, Requirement::Dynamic(_))));
    }

    #[test]
    fn test_member_require_is_not_a_dependency() {
        let program = parse(r#"loader.require("a"); require.resolve("b");"#);

        assert!(collect_requirements(&program).is_empty());
    }

    #[test]
    fn test_build_closed_graph() {
        let fs = MemoryFileSystem::new()
            .with_file("app.js", r#"require("util"); require("view");"#)
            .with_file("view.js", r#"require("util");"#)
            .with_file("util.js", "");

        let (graph, cache) = build(&fs, "app").unwrap();

        assert_eq!(names(&graph.modules().cloned().collect::<Vec<_>>()), vec!["app", "util", "view"]);
        assert_eq!(names(graph.dependencies(&ModuleId::new("app"))), vec!["util", "view"]);
        assert_eq!(cache.len(), 3);
        for node in graph.nodes() {
            for dep in &node.dependencies {
                assert!(graph.contains(dep));
            }
        }
    }

    #[test]
    fn test_relative_ids_follow_requiring_module() {
        let fs = MemoryFileSystem::new()
            .with_file("lib/a.js", r#"require("./b");"#)
            .with_file("lib/b.js", r#"require("../c");"#)
            .with_file("c.js", "");

        let (graph, _) = build(&fs, "lib/a").unwrap();

        assert_eq!(names(graph.dependencies(&ModuleId::new("lib/a"))), vec!["lib/b"]);
        assert_eq!(names(graph.dependencies(&ModuleId::new("lib/b"))), vec!["c"]);
    }

    #[test]
    fn test_duplicate_requires_recorded_once() {
        let fs = MemoryFileSystem::new()
            .with_file("app.js", r#"require("util"); require("util"); require("./util");"#)
            .with_file("util.js", "");

        let (graph, _) = build(&fs, "app").unwrap();

        assert_eq!(names(graph.dependencies(&ModuleId::new("app"))), vec!["util"]);
    }

    #[test]
    fn test_cycle_is_still_closed() {
        let fs = MemoryFileSystem::new()
            .with_file("a.js", r#"require("b");"#)
            .with_file("b.js", r#"require("a");"#);

        let (graph, cache) = build(&fs, "a").unwrap();

        assert_eq!(graph.len(), 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(names(graph.dependencies(&ModuleId::new("b"))), vec!["a"]);
    }

    #[test]
    fn test_missing_dependency_names_referrer() {
        let fs = MemoryFileSystem::new().with_file("app.js", r#"require("missing");"#);

        match build(&fs, "app") {
            Err(BundleError::Resolution(err)) => {
                assert_eq!(err.id, ModuleId::new("missing"));
                assert_eq!(err.referrer, Some(ModuleId::new("app")));
            }
            other => panic!("expected resolution error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_dynamic_dependency_aborts() {
        let source = r#"var x = "util"; require(x);"#;
        let fs = MemoryFileSystem::new().with_file("app.js", source);

        match build(&fs, "app") {
            Err(BundleError::DynamicDependency { id, span, .. }) => {
                assert_eq!(id, ModuleId::new("app"));
                assert_eq!(&source[span.start..span.end], "require(x)");
            }
            other => panic!("expected dynamic dependency error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_parse_failure_is_dependency_free() {
        let fs = MemoryFileSystem::new()
            .with_file("app.js", r#"require("broken");"#)
            .with_file("broken.js", r#"require("never"); var = ;"#);

        let (graph, cache) = build(&fs, "app").unwrap();

        assert!(graph.dependencies(&ModuleId::new("broken")).is_empty());
        let entry = cache.get(&ModuleId::new("broken")).unwrap();
        assert!(entry.program.is_none());
        assert!(!entry.errors.is_empty());
    }
}
