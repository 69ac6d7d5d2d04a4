//! Final bundle text

use kahn_parser::codegen::generate_expression;
use kahn_parser::{CodegenOptions, Span};

use crate::module_id::ModuleId;
use crate::transform::{registry_exports, REGISTRY};

/// Suffix token replaced by the root module's exports expression.
pub const REQUIRE_TOKEN: &str = "{{ REQUIRE }}";

/// Suffix token replaced by the root module's id.
pub const MODULE_TOKEN: &str = "{{ MODULE }}";

/// The expression `{{ REQUIRE }}` stands for: `__MODULES["root"].exports`.
pub fn root_exports(root: &ModuleId) -> String {
    generate_expression(&registry_exports(root, Span::default()), CodegenOptions::compact())
}

/// Replace every suffix token.
pub fn substitute_tokens(suffix: &str, root: &ModuleId) -> String {
    suffix
        .replace(REQUIRE_TOKEN, &root_exports(root))
        .replace(MODULE_TOKEN, root.as_str())
}

/// Join the prefix, the registry declaration, the module fragments and
/// the substituted suffix.
pub fn assemble(prefix: &str, fragments: &[String], suffix: &str, root: &ModuleId) -> String {
    let suffix = substitute_tokens(suffix, root);
    let body_len: usize = fragments.iter().map(|fragment| fragment.len() + 1).sum();

    let mut out = String::with_capacity(prefix.len() + body_len + suffix.len() + 32);
    out.push_str(prefix);
    out.push_str("\nvar ");
    out.push_str(REGISTRY);
    out.push_str(" = {};\n");
    for fragment in fragments {
        out.push_str(fragment);
        out.push('\n');
    }
    out.push_str(&suffix);
    out
}
