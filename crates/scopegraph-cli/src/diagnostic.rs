// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Resolution issues rendered with miette.
//!
//! When the source file of a unit is available, issues are shown with
//! source context and a label under the offending span. Otherwise they fall
//! back to a single `file:start..end` line.

// Suppress unused_assignments for struct fields used by derive macros
#![allow(unused_assignments)]

use miette::{Diagnostic, SourceSpan};
use scopegraph_core::semantic_analysis::{ResolveError, Severity};

/// A resolution issue with source context.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic(code(scopegraph::resolve))]
pub struct ResolveDiagnostic {
    pub severity: Severity,
    pub message: String,
    #[source_code]
    pub src: miette::NamedSource<String>,
    #[label("{label}")]
    pub span: SourceSpan,
    pub label: String,
}

impl ResolveDiagnostic {
    /// Create a diagnostic for `issue` found in `source`.
    pub fn from_issue(issue: &ResolveError, source_path: &str, source: &str) -> Self {
        Self {
            severity: issue.severity(),
            message: issue.to_string(),
            src: miette::NamedSource::new(source_path, source.to_string()),
            span: issue.span.into(),
            label: format!("{} here", severity_name(issue.severity())),
        }
    }
}

/// Lower-case name used in labels and JSON output.
pub fn severity_name(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Note => "note",
    }
}

/// One-line rendering for units whose source is not at hand.
pub fn plain_line(unit: &str, issue: &ResolveError) -> String {
    format!(
        "{unit}:{}..{}: {}: {issue}",
        issue.span.start(),
        issue.span.end(),
        severity_name(issue.severity()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use scopegraph_core::semantic_analysis::UnresolvedReason;
    use scopegraph_core::source_analysis::Span;

    #[test]
    fn test_from_duplicate() {
        let issue = ResolveError::duplicate("x", Span::new(0, 1), Span::new(10, 11));
        let source = "int x = 1; x = 2;";
        let diag = ResolveDiagnostic::from_issue(&issue, "A.java", source);

        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "'x' is already declared in this scope");
        assert_eq!(diag.span.offset(), 10);
        assert_eq!(diag.span.len(), 1);
        assert_eq!(diag.label, "error here");
    }

    #[test]
    fn test_from_unresolved() {
        let issue = ResolveError::unresolved("y", UnresolvedReason::NoBinding, Span::new(3, 4));
        let diag = ResolveDiagnostic::from_issue(&issue, "A.java", "use(y);");

        assert_eq!(diag.severity, Severity::Note);
        assert_eq!(diag.label, "note here");
    }

    #[test]
    fn test_plain_line() {
        let issue = ResolveError::unresolved("y", UnresolvedReason::NoBinding, Span::new(3, 4));
        assert_eq!(
            plain_line("A.json", &issue),
            "A.json:3..4: note: unresolved reference 'y': no declaration in scope"
        );
    }
}
