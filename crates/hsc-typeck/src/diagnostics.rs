//! Ariadne-based diagnostic rendering for [`TypeError`] (§7), grounded on
//! `snow-typeck::diagnostics::render_diagnostic`'s error-code-plus-labeled-
//! span shape. Colorless output so callers can assert on it in tests.

use std::ops::Range;

use ariadne::{Config, Label, Report, ReportKind, Source};

use crate::error::TypeError;

/// A short, stable code per variant, matching the teacher's `error_code`
/// table (an `E%04d` numbering scheme per-kind, not per-occurrence).
fn error_code(err: &TypeError) -> &'static str {
    match err {
        TypeError::TypeMismatch { .. } => "E0001",
        TypeError::OccursCheck { .. } => "E0002",
        TypeError::UnknownName { .. } => "E0003",
        TypeError::AmbiguousConstraint { .. } => "E0004",
        TypeError::NoInstance { .. } => "E0005",
        TypeError::MonomorphismRestrictionViolated { .. } => "E0006",
        TypeError::InstanceHeadIllegal { .. } => "E0007",
        TypeError::SuperclassCycle { .. } => "E0008",
        TypeError::OverlappingInstances { .. } => "E0009",
    }
}

fn span_of(err: &TypeError) -> Option<Range<usize>> {
    match err {
        TypeError::UnknownName { span: Some(s), .. } => Some(s.start as usize..s.end as usize),
        _ => None,
    }
}

/// Render a [`TypeError`] as a formatted diagnostic. When the error carries
/// a source span, renders a labeled `ariadne::Report` against `source`;
/// otherwise falls back to a plain `"error[code]: message"` line, since not
/// every variant in this core's error set has a span attached yet (only
/// `UnknownName` does -- see `error.rs`).
pub fn render_diagnostic(error: &TypeError, source: &str, filename: &str) -> String {
    let code = error_code(error);
    let message = error.to_string();

    let Some(range) = span_of(error) else {
        return format!("error[{code}]: {message}\n  --> {filename}\n");
    };

    let len = source.len();
    let start = range.start.min(len);
    let end = range.end.min(len).max(start + 1).min(len.max(1));

    let mut out = Vec::new();
    let config = Config::default().with_color(false);
    let report = Report::<(&str, Range<usize>)>::build(ReportKind::Error, (filename, start..end))
        .with_config(config)
        .with_code(code)
        .with_message(&message)
        .with_label(Label::new((filename, start..end)).with_message(&message))
        .finish();
    report
        .write((filename, Source::from(source)), &mut out)
        .ok();
    String::from_utf8(out).unwrap_or(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConstraintOrigin;

    #[test]
    fn spanless_error_renders_plain_line() {
        let err = TypeError::NoInstance {
            constraint: "Num a".into(),
            origin: ConstraintOrigin::Literal,
        };
        let rendered = render_diagnostic(&err, "x = 1", "Test.hs");
        assert!(rendered.contains("E0005"));
        assert!(rendered.contains("Num a"));
    }

    #[test]
    fn spanned_error_renders_ariadne_report() {
        let err = TypeError::UnknownName {
            name: "foo".into(),
            span: Some(hsc_common::span::Span::new(0, 3)),
        };
        let rendered = render_diagnostic(&err, "foo = 1", "Test.hs");
        assert!(rendered.contains("E0003"));
        assert!(rendered.contains("foo"));
    }
}
