//! Kahn Bundler
//!
//! Resolves a root module and everything it requires, orders the modules
//! so dependencies come first, rewrites each module's `define`/`require`
//! calls into reads and writes of a shared `__MODULES` registry, and joins
//! the results into one script.
//!
//! # Example
//!
//! ```rust
//! use kahn_bundler::{BundleConfig, Bundler, MemoryFileSystem};
//!
//! let fs = MemoryFileSystem::new()
//!     .with_file("util.js", "define(function (require, exports, module) { exports.one = 1; });")
//!     .with_file("app.js", "define(function (require, exports, module) { module.exports = require('util').one; });");
//!
//! let mut config = BundleConfig::new("app");
//! config.paths = vec![".".into()];
//!
//! let bundle = Bundler::with_file_system(config, fs).bundle().unwrap();
//! assert_eq!(bundle.order.len(), 2);
//! ```

pub mod assembler;
pub mod builder;
pub mod bundler;
pub mod cache;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod fs;
pub mod graph;
pub mod module_id;
pub mod resolver;
pub mod sort;
pub mod transform;

pub use bundler::{Bundle, Bundler};
pub use cache::{CachedSource, SourceCache};
pub use config::{BundleConfig, ConfigError, ProjectConfig};
pub use diagnostic::Report;
pub use error::{BundleError, BundleResult, ErrorCode};
pub use fs::{FileSystem, MemoryFileSystem, OsFileSystem};
pub use graph::{DependencyGraph, ModuleNode};
pub use module_id::ModuleId;
pub use resolver::{ModuleResolver, ResolveError};
pub use sort::{topological_sort, CycleError};
pub use transform::Transformer;
