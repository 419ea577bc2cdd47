use crate::parser::ast::NodeId;
use crate::span::{LineIndex, Span};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal errors. A lint run either completes or stops with one of these;
/// rule findings are never reported through this type.
#[derive(Debug, Error)]
pub enum LintError {
    #[error("Syntax error: {msg}")]
    Syntax { msg: String, span: Span },

    #[error("Type information not available: the rule needs a type oracle for the analyzed unit")]
    TypesUnavailable,

    #[error("Config error: {msg}")]
    Config { msg: String, path: PathBuf },

    #[error("I/O error: {msg}")]
    Io { msg: String, path: PathBuf },
}

impl LintError {
    pub fn syntax(msg: impl Into<String>, span: Span) -> Self {
        Self::Syntax { msg: msg.into(), span }
    }

    pub fn config(msg: impl Into<String>, path: PathBuf) -> Self {
        Self::Config { msg: msg.into(), path }
    }

    pub fn io(msg: impl Into<String>, path: PathBuf) -> Self {
        Self::Io { msg: msg.into(), path }
    }
}

/// Message identifiers a rule can report with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MessageId {
    #[serde(rename = "mustUseResult")]
    MustUseResult,
}

impl MessageId {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageId::MustUseResult => "mustUseResult",
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            MessageId::MustUseResult => {
                "Result must be handled with either of match, unwrapOr or _unsafeUnwrap."
            }
        }
    }
}

/// A single rule finding anchored to a syntax node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub rule: &'static str,
    pub message_id: MessageId,
    pub node: NodeId,
    pub span: Span,
}

impl Diagnostic {
    pub fn message(&self) -> &'static str {
        self.message_id.text()
    }
}

/// Receiver for rule findings.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Serialized form used by `--format json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonDiagnostic {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub rule: &'static str,
    pub message_id: MessageId,
    pub message: &'static str,
}

impl JsonDiagnostic {
    pub fn new(path: &Path, index: &LineIndex<'_>, diag: &Diagnostic) -> Self {
        let start = index.line_col(diag.span.start);
        let end = index.line_col(diag.span.end);
        Self {
            file: path.display().to_string(),
            line: start.line,
            column: start.column,
            end_line: end.line,
            end_column: end.column,
            rule: diag.rule,
            message_id: diag.message_id,
            message: diag.message(),
        }
    }
}

/// One line per diagnostic: `path:line:col: rule: message`.
pub fn format_plain(path: &Path, source: &str, diagnostics: &[Diagnostic]) -> String {
    let index = LineIndex::new(source);
    let mut out = String::new();
    for diag in diagnostics {
        let pos = index.line_col(diag.span.start);
        out.push_str(&format!(
            "{}:{}:{}: {}: {}\n",
            path.display(),
            pos.line,
            pos.column,
            diag.rule,
            diag.message()
        ));
    }
    out
}

/// Render a LintError with ariadne for nice terminal output.
pub fn render_error(source: &str, _filename: &str, err: &LintError) {
    use ariadne::{Label, Report, ReportKind, Source};

    match err {
        LintError::Syntax { msg, span } => {
            let _ = Report::build(ReportKind::Error, (), span.start)
                .with_message("syntax error")
                .with_label(Label::new(span.start..span.end).with_message(msg))
                .finish()
                .eprint(Source::from(source));
        }
        LintError::TypesUnavailable => {
            eprintln!("error: {err}");
        }
        LintError::Config { msg, path } => {
            eprintln!("error[config]: {msg}");
            eprintln!("  --> {}", path.display());
        }
        LintError::Io { msg, path } => {
            eprintln!("error[io]: {msg}");
            eprintln!("  --> {}", path.display());
        }
    }
}

/// Render rule findings as ariadne warnings on stderr.
pub fn render_diagnostics(source: &str, filename: &str, diagnostics: &[Diagnostic]) {
    use ariadne::{Label, Report, ReportKind, Source};

    for diag in diagnostics {
        let _ = Report::build(ReportKind::Warning, (), diag.span.start)
            .with_code(diag.rule)
            .with_message(format!("{filename}: {}", diag.message()))
            .with_label(
                Label::new(diag.span.start..diag.span.end)
                    .with_message("this result is never handled"),
            )
            .finish()
            .eprint(Source::from(source));
    }
}
