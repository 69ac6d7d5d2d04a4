//! Module identifiers
//!
//! Ids always use `/` as separator. A bare id (`util`, `lib/a`) is looked up
//! in the search paths; a relative id (`./b`, `../c`) is first resolved
//! against the directory of the module that requires it.

use std::borrow::Borrow;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `specifier` is resolved against the requiring module.
    pub fn is_relative_specifier(specifier: &str) -> bool {
        specifier == "."
            || specifier == ".."
            || specifier.starts_with("./")
            || specifier.starts_with("../")
    }

    /// Directory part of the id: `lib` for `lib/a`, empty for `a`.
    pub fn dirname(&self) -> &str {
        match self.0.rfind('/') {
            Some(pos) => &self.0[..pos],
            None => "",
        }
    }

    /// The id that `specifier`, required from this module, refers to.
    ///
    /// Relative specifiers are joined to this module's directory and
    /// normalized; leading `..` segments that climb above the search root
    /// are kept. Bare specifiers are returned unchanged.
    pub fn join(&self, specifier: &str) -> ModuleId {
        if !Self::is_relative_specifier(specifier) {
            return ModuleId::new(specifier);
        }

        let mut segments: Vec<&str> = Vec::new();
        for segment in self.dirname().split('/').chain(specifier.split('/')) {
            match segment {
                "" | "." => {}
                ".." => match segments.last() {
                    Some(&last) if last != ".." => {
                        segments.pop();
                    }
                    _ => segments.push(".."),
                },
                name => segments.push(name),
            }
        }

        if segments.is_empty() {
            ModuleId::new(".")
        } else {
            ModuleId::new(segments.join("/"))
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ModuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
