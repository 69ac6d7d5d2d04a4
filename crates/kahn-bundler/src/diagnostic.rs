//! Diagnostic rendering for bundling errors
//!
//! Turns a [`BundleError`] into codespan diagnostics. Errors located in a
//! source file show the offending snippet with a primary label.

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::{Error as FilesError, SimpleFiles};
use codespan_reporting::term::{self, termcolor::WriteColor, Config};
use kahn_parser::Span;
use std::ops::Range;
use std::path::Path;

use crate::error::BundleError;
use crate::module_id::ModuleId;

/// Rendered form of one error: the files it refers to and its diagnostics.
pub struct Report {
    files: SimpleFiles<String, String>,
    diagnostics: Vec<Diagnostic<usize>>,
}

impl Report {
    pub fn from_error(error: &BundleError) -> Self {
        let mut files = SimpleFiles::new();
        let code = error.code().as_str();
        let error_diagnostic = || Diagnostic::error().with_code(code);

        let diagnostics = match error {
            BundleError::Resolution(err) => {
                let mut diagnostic = error_diagnostic().with_message(err.to_string());
                if let Some(referrer) = &err.referrer {
                    diagnostic.notes.push(format!("required by '{}'", referrer));
                }
                for path in &err.tried {
                    diagnostic.notes.push(format!("tried {}", path.display()));
                }
                vec![diagnostic]
            }

            BundleError::Read { .. } | BundleError::Config(_) => {
                vec![error_diagnostic().with_message(error.to_string())]
            }

            BundleError::Parse {
                id,
                path,
                source_text,
                errors,
            } => {
                let file = add_file(&mut files, path, source_text);
                errors
                    .iter()
                    .map(|err| {
                        error_diagnostic()
                            .with_message(format!("syntax error in module '{}': {}", id, err))
                            .with_labels(vec![Label::primary(file, range(err.span(), source_text))])
                    })
                    .collect()
            }

            BundleError::DynamicDependency {
                path,
                source_text,
                span,
                ..
            } => {
                let file = add_file(&mut files, path, source_text);
                vec![error_diagnostic()
                    .with_message(error.to_string())
                    .with_labels(vec![Label::primary(file, range(*span, source_text))
                        .with_message("module name must be a string literal")])
                    .with_notes(vec![
                        "dependencies are found statically; computed names cannot be bundled"
                            .to_string(),
                    ])]
            }

            BundleError::Cycle(err) => {
                let residual = err
                    .residual
                    .iter()
                    .map(|(id, deps)| format!("'{}' waits on {}", id, quote_list(deps)))
                    .collect();
                vec![error_diagnostic()
                    .with_message(err.to_string())
                    .with_notes(residual)]
            }

            BundleError::FormatViolation {
                path,
                source_text,
                span,
                message,
                ..
            } => {
                let mut diagnostic = error_diagnostic().with_message(error.to_string());
                match span {
                    Some(span) => {
                        let file = add_file(&mut files, path, source_text);
                        diagnostic = diagnostic.with_labels(vec![
                            Label::primary(file, range(*span, source_text)).with_message(message.clone())
                        ]);
                    }
                    None => diagnostic.notes.push(format!("in {}", path.display())),
                }
                vec![diagnostic]
            }
        };

        Self { files, diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic<usize>] {
        &self.diagnostics
    }

    /// Write every diagnostic to `writer`.
    pub fn emit(&self, writer: &mut dyn WriteColor) -> Result<(), FilesError> {
        let config = Config::default();
        for diagnostic in &self.diagnostics {
            term::emit(writer, &config, &self.files, diagnostic)?;
        }
        Ok(())
    }
}

fn add_file(files: &mut SimpleFiles<String, String>, path: &Path, source: &str) -> usize {
    files.add(path.display().to_string(), source.to_string())
}

/// Byte range of `span`, clamped to the source.
fn range(span: Span, source: &str) -> Range<usize> {
    let end = span.end.min(source.len());
    span.start.min(end)..end
}

fn quote_list(ids: &[ModuleId]) -> String {
    ids.iter()
        .map(|id| format!("'{}'", id))
        .collect::<Vec<_>>()
        .join(", ")
}
