pub mod span;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod visit;
pub mod scope;
pub mod typeck;
pub mod config;
pub mod rules;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub use config::Config;
use diagnostics::{Diagnostic, LintError};
pub use parser::parse;

/// Lint a source string (parse → scopes → types → rules). No file I/O.
///
/// Diagnostics come back sorted by position.
pub fn lint_source(source: &str, config: &Config) -> Result<Vec<Diagnostic>, LintError> {
    let tree = parser::parse(source)?;
    let scopes = scope::analyze(&tree);
    let checker = typeck::type_check(&tree, &scopes);
    debug!(nodes = tree.len(), unresolved = scopes.unresolved().len(), "analyzed unit");

    let mut diagnostics = Vec::new();
    rules::must_use_result::run(&tree, &scopes, Some(&checker), &config.must_use_result, &mut diagnostics)?;
    diagnostics.sort_by_key(|d| (d.span.start, d.span.end));
    Ok(diagnostics)
}

/// Findings for one file, with the source kept for rendering.
#[derive(Debug, Clone)]
pub struct LintOutcome {
    pub path: PathBuf,
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl LintOutcome {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

pub fn lint_file(path: &Path, config: &Config) -> Result<LintOutcome, LintError> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| LintError::io(format!("could not read {}: {e}", path.display()), path.to_path_buf()))?;
    let diagnostics = lint_source(&source, config)?;
    info!(file = %path.display(), diagnostics = diagnostics.len(), "linted");
    Ok(LintOutcome { path: path.to_path_buf(), source, diagnostics })
}
