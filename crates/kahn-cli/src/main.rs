//! kahn command-line tool
//!
//! Bundles a root module and its dependencies into one script, written to
//! stdout or to `--output`. Settings come from defaults, then `kahn.toml`,
//! then flags.

mod output;

use anyhow::{anyhow, Context};
use clap::{ArgAction, Parser};
use kahn_bundler::config::PROJECT_FILE;
use kahn_bundler::{BundleConfig, BundleError, Bundler, ProjectConfig};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kahn")]
#[command(about = "Bundle define/require JavaScript modules into one script", long_about = None)]
#[command(version)]
struct Cli {
    /// Root module id, resolved against the search paths
    module: String,

    /// Text emitted before the modules [default: "(function (__GLOBAL) {"]
    #[arg(short, long)]
    prefix: Option<String>,

    /// Text emitted after the modules; {{ REQUIRE }} and {{ MODULE }} are
    /// replaced with the root module's exports and id
    /// [default: "__GLOBAL[\"{{ MODULE }}\"] = {{ REQUIRE }};\n}(this));"]
    #[arg(short, long)]
    suffix: Option<String>,

    /// Colon-separated module search paths [default: .:./lib:./node_modules]
    #[arg(short = 'P', long, value_delimiter = ':')]
    paths: Option<Vec<PathBuf>>,

    /// Do not minify; indent by this many spaces (0 keeps compact output)
    #[arg(short, long, value_name = "INDENT")]
    beautify: Option<usize>,

    /// Keep local variable names
    #[arg(long)]
    no_mangle: bool,

    /// Module file extension [default: js]
    #[arg(long)]
    extension: Option<String>,

    /// Project file [default: ./kahn.toml when present]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the bundle to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// When to color diagnostics
    #[arg(long, value_name = "WHEN", value_parser = ["auto", "always", "never"])]
    color: Option<String>,

    /// Log more (repeat for more detail)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Overlay explicitly given flags onto `config`.
    fn apply(&self, config: &mut BundleConfig) {
        if let Some(prefix) = &self.prefix {
            config.prefix = prefix.clone();
        }
        if let Some(suffix) = &self.suffix {
            config.suffix = suffix.clone();
        }
        if let Some(paths) = &self.paths {
            config.paths = paths.clone();
        }
        if let Some(beautify) = self.beautify {
            config.beautify = Some(beautify).filter(|&indent| indent > 0);
        }
        if self.no_mangle {
            config.mangle = false;
        }
        if let Some(extension) = &self.extension {
            config.extension = extension.clone();
        }
    }
}

/// Stack for the bundling thread. Syntax trees are walked recursively, and
/// the parser admits trees up to `MAX_TREE_DEPTH` levels deep.
const BUNDLE_STACK_SIZE: usize = 64 * 1024 * 1024;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let choice = output::resolve_color_choice(cli.color.as_deref());
    init_tracing(cli.verbose, output::use_ansi(choice));

    match run_on_bundle_thread(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::report_error(&err, choice);
            ExitCode::FAILURE
        }
    }
}

fn run_on_bundle_thread(cli: Cli) -> anyhow::Result<()> {
    let handle = std::thread::Builder::new()
        .name("bundle".to_string())
        .stack_size(BUNDLE_STACK_SIZE)
        .spawn(move || run(&cli))
        .context("failed to start the bundling thread")?;
    handle
        .join()
        .unwrap_or_else(|_| Err(anyhow!("bundling thread panicked")))
}

/// Logs go to stderr so the bundle on stdout stays clean. `RUST_LOG`
/// takes precedence over `-v`.
fn init_tracing(verbose: u8, ansi: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let bundle = Bundler::new(config).bundle()?;

    match &cli.output {
        Some(path) => std::fs::write(path, &bundle.code)
            .with_context(|| format!("failed to write bundle to {}", path.display()))?,
        None => {
            let stdout = std::io::stdout();
            let mut stdout = stdout.lock();
            stdout
                .write_all(bundle.code.as_bytes())
                .and_then(|()| stdout.flush())
                .context("failed to write bundle to stdout")?;
        }
    }
    Ok(())
}

/// Defaults, then the project file, then flags.
fn load_config(cli: &Cli) -> Result<BundleConfig, BundleError> {
    let mut config = BundleConfig::new(cli.module.as_str());

    let project = match &cli.config {
        Some(path) => Some(ProjectConfig::from_file(path)?),
        None if Path::new(PROJECT_FILE).is_file() => {
            Some(ProjectConfig::from_file(Path::new(PROJECT_FILE))?)
        }
        None => None,
    };
    if let Some(project) = project {
        project.apply(&mut config);
    }

    cli.apply(&mut config);
    debug!(?config, "resolved configuration");
    Ok(config)
}
