//! Bundling driver
//!
//! Runs resolution and graph construction, ordering, per-module rewriting
//! and assembly, in that order. The bundle is built in memory and only
//! returned when every stage succeeded.

use kahn_parser::CodegenOptions;
use std::time::Instant;
use tracing::{debug, info};

use crate::assembler::assemble;
use crate::builder::GraphBuilder;
use crate::config::BundleConfig;
use crate::error::BundleResult;
use crate::fs::{FileSystem, OsFileSystem};
use crate::graph::DependencyGraph;
use crate::module_id::ModuleId;
use crate::resolver::{ModuleResolver, ResolveError};
use crate::sort::topological_sort;
use crate::transform::Transformer;

/// The result of a successful run
#[derive(Debug, Clone)]
pub struct Bundle {
    pub root: ModuleId,
    /// Modules in emission order, dependencies first
    pub order: Vec<ModuleId>,
    pub graph: DependencyGraph,
    /// The complete output script
    pub code: String,
}

/// Bundles one root module over a filesystem.
pub struct Bundler<F: FileSystem = OsFileSystem> {
    config: BundleConfig,
    fs: F,
}

impl Bundler<OsFileSystem> {
    pub fn new(config: BundleConfig) -> Self {
        Self::with_file_system(config, OsFileSystem)
    }
}

impl<F: FileSystem> Bundler<F> {
    pub fn with_file_system(config: BundleConfig, fs: F) -> Self {
        Self { config, fs }
    }

    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    pub fn bundle(&self) -> BundleResult<Bundle> {
        let start = Instant::now();
        let config = &self.config;
        config.validate()?;

        let resolver = ModuleResolver::new(config.paths.clone(), config.extension.clone());
        let (graph, cache) = GraphBuilder::new(&self.fs, &resolver).build(&config.root)?;
        debug!(modules = graph.len(), "dependency graph complete");

        let order = topological_sort(&graph)?;

        let transformer = Transformer::new(CodegenOptions::from_level(config.beautify), config.mangle);
        let mut fragments = Vec::with_capacity(order.len());
        for id in &order {
            let entry = cache.get(id).ok_or_else(|| ResolveError {
                id: id.clone(),
                referrer: None,
                tried: Vec::new(),
            })?;
            fragments.push(transformer.transform(id, entry)?);
        }

        let code = assemble(&config.prefix, &fragments, &config.suffix, &config.root);
        info!(
            root = %config.root,
            modules = order.len(),
            bytes = code.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "bundle complete"
        );

        Ok(Bundle {
            root: config.root.clone(),
            order,
            graph,
            code,
        })
    }
}
