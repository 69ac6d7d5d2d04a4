//! End-to-end bundling tests

use kahn_bundler::{
    BundleConfig, BundleError, Bundler, ErrorCode, MemoryFileSystem, ModuleId, OsFileSystem,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn module(body: &str) -> String {
    format!("define(function (require, exports, module) {{\n{}\n}});\n", body)
}

fn config(root: &str) -> BundleConfig {
    let mut config = BundleConfig::new(root);
    config.paths = vec![PathBuf::from(".")];
    config.mangle = false;
    config
}

fn bundle(fs: MemoryFileSystem, config: BundleConfig) -> Result<kahn_bundler::Bundle, BundleError> {
    Bundler::with_file_system(config, fs).bundle()
}

fn order(bundle: &kahn_bundler::Bundle) -> Vec<&str> {
    bundle.order.iter().map(ModuleId::as_str).collect()
}

fn initializer(id: &str) -> String {
    format!("__MODULES[\"{}\"]={{exports:{{}}}};", id)
}

fn position(code: &str, needle: &str) -> usize {
    code.find(needle)
        .unwrap_or_else(|| panic!("{:?} not found in:\n{}", needle, code))
}

#[test]
fn test_dependency_emitted_before_dependent() {
    let fs = MemoryFileSystem::new()
        .with_file("app.js", module("var util = require('util'); exports.run = util.run;"))
        .with_file("util.js", module("exports.run = function () {};"));

    let bundle = bundle(fs, config("app")).unwrap();

    assert_eq!(order(&bundle), vec!["util", "app"]);
    assert!(position(&bundle.code, &initializer("util")) < position(&bundle.code, &initializer("app")));
}

#[test]
fn test_output_layout() {
    let fs = MemoryFileSystem::new().with_file("app.js", module("exports.a = 1;"));

    let code = bundle(fs, config("app")).unwrap().code;

    let expected = concat!(
        "(function (__GLOBAL) {\n",
        "var __MODULES = {};\n",
        "__MODULES[\"app\"]={exports:{}};\n",
        "__MODULES[\"app\"].exports=(function(require,exports,module){exports.a=1;})",
        "(null,__MODULES[\"app\"].exports,__MODULES[\"app\"])||__MODULES[\"app\"].exports;\n",
        "__GLOBAL[\"app\"] = __MODULES[\"app\"].exports;\n",
        "}(this));",
    );
    assert_eq!(code, expected);
}

#[test]
fn test_two_module_cycle_rejected() {
    let fs = MemoryFileSystem::new()
        .with_file("a.js", module("require('b');"))
        .with_file("b.js", module("require('a');"));

    match bundle(fs, config("a")) {
        Err(BundleError::Cycle(err)) => {
            let cycle: Vec<&str> = err.cycle.iter().map(ModuleId::as_str).collect();
            assert_eq!(cycle, vec!["a", "b", "a"]);
        }
        other => panic!("expected cycle, got {:?}", other.map(|b| b.code)),
    }
}

#[test]
fn test_self_require_rejected() {
    let fs = MemoryFileSystem::new().with_file("a.js", module("require('./a');"));

    let err = bundle(fs, config("a")).unwrap_err();

    assert_eq!(err.code(), ErrorCode::Cycle);
}

#[test]
fn test_relative_ids_resolve_from_requiring_directory() {
    let fs = MemoryFileSystem::new()
        .with_file("lib/a.js", module("module.exports = require('./b');"))
        .with_file("lib/b.js", module("module.exports = require('../c');"))
        .with_file("c.js", module("exports.c = true;"));

    let bundle = bundle(fs, config("lib/a")).unwrap();

    assert_eq!(order(&bundle), vec!["c", "lib/b", "lib/a"]);
    assert!(bundle.code.contains("module.exports=__MODULES[\"c\"].exports;"));
    assert!(bundle.code.contains("module.exports=__MODULES[\"lib/b\"].exports;"));
}

#[test]
fn test_same_relative_id_from_two_directories() {
    let fs = MemoryFileSystem::new()
        .with_file("app.js", module("require('x/main'); require('y/main');"))
        .with_file("x/main.js", module("require('./util');"))
        .with_file("y/main.js", module("require('./util');"))
        .with_file("x/util.js", module(""))
        .with_file("y/util.js", module(""));

    let bundle = bundle(fs, config("app")).unwrap();

    assert_eq!(
        order(&bundle),
        vec!["x/util", "x/main", "y/util", "y/main", "app"]
    );
}

#[test]
fn test_dynamic_require_aborts() {
    let fs = MemoryFileSystem::new()
        .with_file("app.js", module("var name = 'util'; require(name);"))
        .with_file("util.js", module(""));

    let err = bundle(fs, config("app")).unwrap_err();

    match err {
        BundleError::DynamicDependency { id, .. } => assert_eq!(id, ModuleId::new("app")),
        other => panic!("expected dynamic dependency, got {:?}", other),
    }
}

#[test]
fn test_root_expression_matches_registry_slot() {
    let fs = MemoryFileSystem::new().with_file("main.js", module("module.exports = 42;"));
    let mut config = config("main");
    config.prefix = String::new();
    config.suffix = "EXPORT({{ REQUIRE }}, \"{{ MODULE }}\");".to_string();

    let code = bundle(fs, config).unwrap().code;

    let root_slot = "__MODULES[\"main\"].exports";
    assert!(code.ends_with(&format!("EXPORT({}, \"main\");", root_slot)));
    assert!(code.contains(&format!("{}=(function(", root_slot)));
}

#[test]
fn test_bundling_is_deterministic() {
    let files = || {
        MemoryFileSystem::new()
            .with_file("app.js", module("require('zeta'); require('alpha'); require('mid');"))
            .with_file("zeta.js", module("require('mid');"))
            .with_file("alpha.js", module(""))
            .with_file("mid.js", module(""))
    };

    let first = bundle(files(), config("app")).unwrap();
    let second = bundle(files(), config("app")).unwrap();

    assert_eq!(first.code, second.code);
    assert_eq!(order(&first), vec!["alpha", "mid", "zeta", "app"]);
}

#[test]
fn test_every_module_emitted_once() {
    let fs = MemoryFileSystem::new()
        .with_file("app.js", module("require('a'); require('b'); require('a');"))
        .with_file("a.js", module("require('shared');"))
        .with_file("b.js", module("require('shared'); require('./shared');"))
        .with_file("shared.js", module(""));

    let bundle = bundle(fs, config("app")).unwrap();

    for id in ["app", "a", "b", "shared"] {
        assert_eq!(bundle.code.matches(&initializer(id)).count(), 1, "module {}", id);
    }
    for node in bundle.graph.nodes() {
        let me = bundle.order.iter().position(|id| id == &node.id).unwrap();
        for dep in &node.dependencies {
            assert!(bundle.order.iter().position(|id| id == dep).unwrap() < me);
        }
    }
}

#[test]
fn test_missing_module() {
    let fs = MemoryFileSystem::new().with_file("app.js", module("require('nope');"));

    match bundle(fs, config("app")) {
        Err(BundleError::Resolution(err)) => {
            assert_eq!(err.id, ModuleId::new("nope"));
            assert_eq!(err.referrer, Some(ModuleId::new("app")));
            assert_eq!(err.tried, vec![PathBuf::from("./nope.js")]);
        }
        other => panic!("expected resolution error, got {:?}", other.map(|b| b.code)),
    }
}

#[test]
fn test_bad_factory_rejected() {
    let fs = MemoryFileSystem::new()
        .with_file("app.js", "define(function (require, exports) { exports.a = 1; });");

    let err = bundle(fs, config("app")).unwrap_err();

    assert_eq!(err.code(), ErrorCode::FormatViolation);
}

#[test]
fn test_broken_dependency_fails_at_transform() {
    let fs = MemoryFileSystem::new()
        .with_file("app.js", module("require('broken');"))
        .with_file("broken.js", "define(function (require, exports, module) { var = ; });");

    match bundle(fs, config("app")) {
        Err(BundleError::Parse { id, errors, .. }) => {
            assert_eq!(id, ModuleId::new("broken"));
            assert!(!errors.is_empty());
        }
        other => panic!("expected parse error, got {:?}", other.map(|b| b.code)),
    }
}

#[test]
fn test_nested_define_passes_through() {
    let fs = MemoryFileSystem::new().with_file(
        "app.js",
        module("var define = function (f) { return f(); }; exports.v = define(function () { return 1; });"),
    );

    let code = bundle(fs, config("app")).unwrap().code;

    assert!(code.contains("exports.v=define(function(){return 1;});"));
}

#[test]
fn test_mangle_shortens_locals_only() {
    let source = module("var helper = require('util'); exports.value = helper.compute();");
    let fs = || {
        MemoryFileSystem::new()
            .with_file("app.js", source.clone())
            .with_file("util.js", module("exports.compute = function () { return 1; };"))
    };

    let plain = bundle(fs(), config("app")).unwrap().code;
    let mut mangled_config = config("app");
    mangled_config.mangle = true;
    let mangled = bundle(fs(), mangled_config).unwrap().code;

    assert!(plain.contains("helper"));
    assert!(!mangled.contains("helper"));
    assert!(mangled.contains(".compute()"));
    assert!(mangled.contains(".value="));
    assert!(mangled.len() < plain.len());
}

#[test]
fn test_beautified_bundle() {
    let fs = MemoryFileSystem::new().with_file("app.js", module("if (exports) { exports.a = 1; }"));
    let mut config = config("app");
    config.beautify = Some(4);

    let code = bundle(fs, config).unwrap().code;

    assert!(code.contains("__MODULES[\"app\"] = {\n    exports: {}\n};"));
    assert!(code.contains("\n    if (exports) {\n        exports.a = 1;\n    }\n"));
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = config("app");
    config.paths.clear();

    let err = bundle(MemoryFileSystem::new(), config).unwrap_err();

    assert_eq!(err.code(), ErrorCode::Config);
}

#[test]
fn test_search_path_priority_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let src = temp_dir.path().join("src");
    let vendor = temp_dir.path().join("vendor");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&vendor).unwrap();
    fs::write(src.join("app.js"), module("require('dep');")).unwrap();
    fs::write(src.join("dep.js"), module("exports.from = 'src';")).unwrap();
    fs::write(vendor.join("dep.js"), module("exports.from = 'vendor';")).unwrap();
    fs::write(vendor.join("extra.js"), module("")).unwrap();

    let mut config = config("app");
    config.paths = vec![src.clone(), vendor.clone()];
    let bundle = Bundler::new(config.clone()).bundle().unwrap();

    assert!(bundle.code.contains("exports.from=\"src\";"));
    assert!(!bundle.code.contains("vendor"));

    fs::write(src.join("app.js"), module("require('extra');")).unwrap();
    let bundle = Bundler::with_file_system(config, OsFileSystem).bundle().unwrap();
    assert_eq!(order(&bundle), vec!["extra", "app"]);
}

#[test]
fn test_define_return_value_precedence() {
    let fs = MemoryFileSystem::new().with_file(
        "app.js",
        module("module.exports = { from: 'module' }; return { from: 'return' };"),
    );

    let code = bundle(fs, config("app")).unwrap().code;

    let call = position(&code, "(null,__MODULES[\"app\"].exports,__MODULES[\"app\"])||");
    let fallback = position(&code, "||__MODULES[\"app\"].exports;");
    assert!(call < fallback);
    assert!(code.contains("return {from:\"return\"};})(null,"));
}

#[test]
fn test_overlong_expression_fails_with_parse_error() {
    let terms = vec!["\"s\""; 20_000].join("+");
    let fs = MemoryFileSystem::new().with_file("app.js", module(&format!("exports.a = {};", terms)));

    match bundle(fs, config("app")) {
        Err(BundleError::Parse { id, errors, .. }) => {
            assert_eq!(id, ModuleId::new("app"));
            assert!(errors[0].to_string().contains("Expression too deep"));
        }
        other => panic!("expected parse error, got {:?}", other.map(|b| b.code)),
    }
}

#[test]
fn test_long_expression_within_limit_bundles() {
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(|| {
            let terms = vec!["\"s\""; 1500].join("+");
            let fs = MemoryFileSystem::new()
                .with_file("app.js", module(&format!("exports.a = {};", terms)));
            let mut config = config("app");
            config.mangle = true;
            bundle(fs, config).map(|bundle| bundle.code)
        })
        .unwrap();

    let code = handle.join().unwrap().unwrap();
    assert_eq!(code.matches("\"s\"").count(), 1500);
}

#[test]
fn test_unicode_and_postfix_division_bundle() {
    let fs = MemoryFileSystem::new().with_file(
        "app.js",
        module("var café = 4; var n = café++ / 2 / 1;\nfunction f() {}\n/a/.test('a'); exports.n = n;"),
    );

    let code = bundle(fs, config("app")).unwrap().code;

    assert!(code.contains("var café=4;var n=café++/2/1;"));
    assert!(code.contains("/a/.test(\"a\");"));
}
