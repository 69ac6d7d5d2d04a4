//! Source cache
//!
//! Holds, per module id, the file it resolved to, its source text and the
//! syntax tree parsed from it. The tree parsed while building the graph is
//! the one the transformer rewrites; nothing is parsed twice.

use indexmap::IndexMap;
use kahn_parser::{Program, SyntaxError};
use std::path::PathBuf;

use crate::module_id::ModuleId;

/// Cached module entry
#[derive(Debug, Clone)]
pub struct CachedSource {
    /// Path to the source file
    pub path: PathBuf,
    /// Source text as read
    pub source: String,
    /// Parsed tree; `None` when the source has syntax errors
    pub program: Option<Program>,
    /// Syntax errors, empty when `program` is present
    pub errors: Vec<SyntaxError>,
}

impl CachedSource {
    /// Read result plus parse of `source`.
    pub fn parse(path: PathBuf, source: String) -> Self {
        match kahn_parser::parse(&source) {
            Ok(program) => Self {
                path,
                source,
                program: Some(program),
                errors: Vec::new(),
            },
            Err(errors) => Self {
                path,
                source,
                program: None,
                errors,
            },
        }
    }
}

/// Discovery-ordered cache of module sources.
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: IndexMap<ModuleId, CachedSource>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &ModuleId) -> Option<&CachedSource> {
        self.entries.get(id)
    }

    /// Insert an entry. An id is cached at most once; a second insert
    /// keeps the first entry.
    pub fn insert(&mut self, id: ModuleId, entry: CachedSource) {
        self.entries.entry(id).or_insert(entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModuleId, &CachedSource)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success() {
        let entry = CachedSource::parse(PathBuf::from("a.js"), "var a = 1;".to_string());

        assert!(entry.program.is_some());
        assert!(entry.errors.is_empty());
    }

    #[test]
    fn test_parse_failure_keeps_source() {
        let entry = CachedSource::parse(PathBuf::from("a.js"), "var = ;".to_string());

        assert!(entry.program.is_none());
        assert!(!entry.errors.is_empty());
        assert_eq!(entry.source, "var = ;");
    }

    #[test]
    fn test_first_insert_wins() {
        let mut cache = SourceCache::new();
        let id = ModuleId::new("a");
        cache.insert(id.clone(), CachedSource::parse("first.js".into(), String::new()));
        cache.insert(id.clone(), CachedSource::parse("second.js".into(), String::new()));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&id).unwrap().path, PathBuf::from("first.js"));
    }
}
