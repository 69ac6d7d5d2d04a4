//! Colored diagnostic output.
//!
//! Uses `termcolor` for cross-platform colored terminal output.
//! Respects `NO_COLOR` environment variable and `--color` flag.

use kahn_bundler::{BundleError, Report};
use std::io::{IsTerminal, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolve `ColorChoice` from CLI flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ if std::io::stderr().is_terminal() => ColorChoice::Auto,
        _ => ColorChoice::Never,
    }
}

/// Whether log lines on stderr may carry ANSI escapes.
pub fn use_ansi(choice: ColorChoice) -> bool {
    choice != ColorChoice::Never
}

/// Print a fatal error to stderr. Bundling errors are rendered as source
/// diagnostics; anything else as a plain `error:` line.
pub fn report_error(err: &anyhow::Error, choice: ColorChoice) {
    let stderr = StandardStream::stderr(choice);
    let mut stderr = stderr.lock();

    if let Some(bundle_error) = err.downcast_ref::<BundleError>() {
        if Report::from_error(bundle_error).emit(&mut stderr).is_ok() {
            return;
        }
    }

    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Red)).set_bold(true);
    let _ = stderr.set_color(&spec);
    let _ = write!(stderr, "error");
    let _ = stderr.reset();
    let _ = writeln!(stderr, ": {:#}", err);
}
