//! Process-level tests for the `kahn` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn module(body: &str) -> String {
    format!("define(function (require, exports, module) {{\n{}\n}});\n", body)
}

fn write(dir: &Path, relative: &str, contents: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn kahn(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kahn"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app.js", &module("var util = require('util'); exports.answer = util.value;"));
    write(dir.path(), "lib/util.js", &module("exports.value = 42;"));
    dir
}

#[test]
fn test_bundle_with_default_paths() {
    let dir = project();

    let output = kahn(dir.path(), &["app"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let code = stdout(&output);
    assert!(code.starts_with("(function (__GLOBAL) {\nvar __MODULES = {};\n"));
    assert!(code.ends_with("__GLOBAL[\"app\"] = __MODULES[\"app\"].exports;\n}(this));"));
    let util = code.find("__MODULES[\"util\"]={exports:{}};").unwrap();
    let app = code.find("__MODULES[\"app\"]={exports:{}};").unwrap();
    assert!(util < app);
}

#[test]
fn test_mangle_is_default() {
    let dir = project();

    let mangled = stdout(&kahn(dir.path(), &["app"]));
    let plain = stdout(&kahn(dir.path(), &["app", "--no-mangle"]));

    assert!(!mangled.contains("var util="));
    assert!(plain.contains("var util=__MODULES[\"util\"].exports;"));
}

#[test]
fn test_custom_paths_prefix_and_suffix() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/main.js", &module("module.exports = require('dep');"));
    write(dir.path(), "vendor/dep.js", &module("exports.ok = true;"));

    let output = kahn(
        dir.path(),
        &["-P", "src:vendor", "-p", "/* start */", "-s", "export({{ REQUIRE }});", "main"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let code = stdout(&output);
    assert!(code.starts_with("/* start */\nvar __MODULES = {};\n"));
    assert!(code.ends_with("export(__MODULES[\"main\"].exports);"));
}

#[test]
fn test_beautify() {
    let dir = project();

    let code = stdout(&kahn(dir.path(), &["app", "-b", "2", "--no-mangle"]));

    assert!(code.contains("__MODULES[\"app\"] = {\n  exports: {}\n};"));
    assert!(code.contains("\n  exports.answer = util.value;\n"));
}

#[test]
fn test_output_file() {
    let dir = project();

    let output = kahn(dir.path(), &["app", "-o", "bundle.js"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(output.stdout.is_empty());
    let written = fs::read_to_string(dir.path().join("bundle.js")).unwrap();
    assert!(written.contains("var __MODULES = {};"));
}

#[test]
fn test_cycle_exits_with_failure() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.js", &module("require('b');"));
    write(dir.path(), "b.js", &module("require('a');"));

    let output = kahn(dir.path(), &["a", "-o", "bundle.js"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error[E0005]"));
    assert!(stderr(&output).contains("a -> b -> a"));
    assert!(!dir.path().join("bundle.js").exists());
}

#[test]
fn test_missing_module_exits_with_failure() {
    let dir = project();

    let output = kahn(dir.path(), &["nope"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("Cannot find module 'nope'"));
}

#[test]
fn test_dynamic_require_shows_location() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app.js", &module("var id = 'x';\nrequire(id);"));

    let output = kahn(dir.path(), &["app"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let message = stderr(&output);
    assert!(message.contains("error[E0004]"));
    assert!(message.contains("app.js"));
    assert!(message.contains("require(id)"));
}

#[test]
fn test_project_file_then_flags() {
    let dir = project();
    write(dir.path(), "kahn.toml", "[bundle]\nmangle = false\nbeautify = 2\n");

    let from_file = stdout(&kahn(dir.path(), &["app"]));
    assert!(from_file.contains("  var util = __MODULES[\"util\"].exports;"));

    let overridden = stdout(&kahn(dir.path(), &["app", "-b", "0"]));
    assert!(overridden.contains("var util=__MODULES[\"util\"].exports;"));
}

#[test]
fn test_explicit_config_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "project/src/app.js", &module("exports.a = 1;"));
    write(dir.path(), "project/build.toml", "[bundle]\npaths = [\"src\"]\nsuffix = \"\"\n");

    let output = kahn(dir.path(), &["app", "--config", "project/build.toml"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).ends_with("||__MODULES[\"app\"].exports;\n"));
}

#[test]
fn test_invalid_config_file() {
    let dir = project();
    write(dir.path(), "kahn.toml", "[bundle]\nminify = true\n");

    let output = kahn(dir.path(), &["app"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error[E0007]"));
}

#[test]
fn test_usage_error() {
    let dir = TempDir::new().unwrap();

    let output = kahn(dir.path(), &[]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_logs_without_escape_codes_when_redirected() {
    let dir = project();

    let output = kahn(dir.path(), &["app", "-vv", "--color", "never"]);

    assert!(output.status.success());
    let log = stderr(&output);
    assert!(log.contains("DEBUG"));
    assert!(!log.contains('\u{1b}'));
}

#[test]
fn test_long_expression_bundles() {
    let dir = TempDir::new().unwrap();
    let terms = vec!["'s'"; 1500].join(" + ");
    write(dir.path(), "app.js", &module(&format!("exports.a = {};", terms)));

    let output = kahn(dir.path(), &["app", "--no-mangle"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("exports.a=\"s\"+\"s\"+"));
}

#[test]
fn test_overlong_expression_is_a_diagnostic() {
    let dir = TempDir::new().unwrap();
    let terms = vec!["'s'"; 20_000].join(" + ");
    write(dir.path(), "app.js", &module(&format!("exports.a = {};", terms)));

    let output = kahn(dir.path(), &["app"]);

    assert_eq!(output.status.code(), Some(1));
    let message = stderr(&output);
    assert!(message.contains("error[E0003]"));
    assert!(message.contains("Expression too deep"));
}
