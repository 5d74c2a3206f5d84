//! Diagnostic collection and rendering.

use std::fmt;
use std::ops::Range;

use ariadne::{Color, Label, Report, ReportKind, Source};
use ocl_parse::{Document, NodeKind, Problem, ProblemKind, Span, Token};
use tracing::debug;

/// Where a diagnostic comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// A malformed token.
    Lexical,
    /// A grammar expectation the tree builder had to recover from.
    Structural,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Lexical => "lexical",
            Severity::Structural => "structural",
        }
    }
}

/// A problem or lexical error flattened for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub line: u32,
    pub column: u32,
    /// Suggested fix, when there is an obvious one.
    pub help: Option<&'static str>,
}

impl Diagnostic {
    fn from_problem(problem: &Problem) -> Self {
        let severity = if problem.kind.is_lexical() {
            Severity::Lexical
        } else {
            Severity::Structural
        };
        Self {
            severity,
            message: problem.kind.to_string(),
            span: problem.span,
            line: problem.line,
            column: problem.column,
            help: help_for(&problem.kind),
        }
    }

    /// Lexical error of a token no literal surfaced, if it has one.
    fn from_token(token: &Token<'_>) -> Option<Self> {
        let error = token.error.as_ref()?;
        Some(Self {
            severity: Severity::Lexical,
            message: error.to_string(),
            span: token.span,
            line: token.line,
            column: token.column,
            help: None,
        })
    }

    /// Render this diagnostic with ariadne.
    ///
    /// Returns the formatted report with source context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| self.to_string())
    }

    /// Write the report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let range = label_range(self.span, source);
        let label = match self.severity {
            Severity::Lexical => "malformed token",
            Severity::Structural => "here",
        };

        let mut report = Report::build(ReportKind::Error, (filename, range.clone()))
            .with_message(&self.message)
            .with_label(
                Label::new((filename, range))
                    .with_message(label)
                    .with_color(Color::Red),
            );
        if let Some(help) = self.help {
            report = report.with_help(help);
        }

        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for Diagnostic {}

fn help_for(kind: &ProblemKind) -> Option<&'static str> {
    match kind {
        ProblemKind::MissingSeparator => Some("separate array elements with `,`"),
        ProblemKind::MissingCloseBracket => Some("add a closing `]`"),
        ProblemKind::MissingOpenBrace => Some("add `{` after the block name and labels"),
        ProblemKind::MissingCloseBrace => Some("add a closing `}`"),
        ProblemKind::MissingNewline => Some("start the block body on the next line"),
        ProblemKind::NewlineBeforeAssign => Some("put the name and `=` on one line"),
        ProblemKind::NewlineBeforeBlock => Some("put the block name and `{` on one line"),
        ProblemKind::ExpectedLiteral => Some("quote bare words inside arrays"),
        _ => None,
    }
}

/// Empty spans point at a gap; widen them to the character after the gap
/// so the label has something to underline.
fn label_range(span: Span, source: &str) -> Range<usize> {
    let range: Range<usize> = span.into();
    if !range.is_empty() {
        return range;
    }
    match source.get(range.start..).and_then(|rest| rest.chars().next()) {
        Some(c) => range.start..range.start + c.len_utf8(),
        None => range,
    }
}

/// Every problem in `document`, plus lexical errors on tokens that did not
/// become literals, in source order.
pub fn collect_diagnostics(document: &Document<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for id in document.walk() {
        let node = document.node(id);
        diagnostics.extend(node.problems.iter().map(Diagnostic::from_problem));

        match &node.kind {
            NodeKind::Recovery(token) => diagnostics.extend(Diagnostic::from_token(token)),
            NodeKind::Block(block) => {
                diagnostics.extend(block.labels.iter().filter_map(Diagnostic::from_token))
            }
            _ => {}
        }
    }

    diagnostics.sort_by_key(|d| d.span.start);
    debug!(count = diagnostics.len(), "collected diagnostics");
    diagnostics
}
