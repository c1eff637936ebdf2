//! Error rendering using ariadne
//!
//! Renders parse and evaluation errors as annotated source snippets. The
//! enclosing node trail of an evaluation error is shown as a help line.

use crate::{Diagnostic, Error, Severity};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

/// Render an error with source snippets to stderr
pub fn render_error(error: &Error, file_name: &str) {
    render_error_to_writer(error, file_name, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, file_name: &str, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, file_name, writer, true)
}

/// Render an error to a String, with color codes
pub fn render_error_to_string(error: &Error, file_name: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, file_name, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error, file_name: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, file_name, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    file_name: &str,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let diagnostic = error.diagnostic();
    let source = error.source_text();
    // Errors raised outside any node have no span to point at.
    if let Error::Evaluation { span: None, .. } = error {
        writeln!(writer, "{}", diagnostic.message)?;
        for help in &diagnostic.help {
            writeln!(writer, "help: {}", help)?;
        }
        return Ok(());
    }
    render_diagnostic(file_name, source, diagnostic, writer, use_color)
}

fn render_diagnostic(
    file_name: &str,
    source: &str,
    diag: &Diagnostic,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let kind = match diag.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
    };

    let mut report = Report::build(kind, (file_name, diag.span.0.clone()))
        .with_message(&diag.message)
        .with_config(ariadne::Config::default().with_color(use_color));

    if let Some(code) = &diag.code {
        report = report.with_code(code);
    }

    let color = colors.next();
    report = report.with_label(
        Label::new((file_name, diag.span.0.clone()))
            .with_message(&diag.message)
            .with_color(color),
    );

    for related in &diag.related {
        let color = colors.next();
        report = report.with_label(
            Label::new((file_name, related.span.0.clone()))
                .with_message(&related.message)
                .with_color(color),
        );
    }

    for help_msg in &diag.help {
        report = report.with_help(help_msg);
    }

    report.finish().write((file_name, Source::from(source)), &mut *writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Context, EvaluateOptions, ParseOptions, evaluate_source};
    use bumpalo::Bump;

    fn run(source: &'static str) -> Error {
        let arena = Bump::new();
        let mut ctx = Context::new(EvaluateOptions::default());
        let err = evaluate_source(&arena, &mut ctx, source, &ParseOptions::default()).unwrap_err();
        Error::new(err, source)
    }

    #[test]
    fn test_render_parse_error() {
        let output = render_error_to_string_no_color(&run("let x = = 2;"), "input.js");
        assert!(output.contains("Error"));
        assert!(output.contains("let x = = 2;"));
        assert!(output.contains("input.js"));
    }

    #[test]
    fn test_render_evaluation_error_with_trail() {
        let output = render_error_to_string_no_color(&run("const o = null;\nconst v = o.prop;"), "input.js");
        assert!(output.contains("TypeError: Cannot read properties of null (reading 'prop')"));
        assert!(output.contains("o.prop"));
        assert!(output.contains("while evaluating MemberExpression"));
    }

    #[test]
    fn test_render_to_string_is_multiline() {
        let output = render_error_to_string_no_color(&run("bad syntax {"), "input.js");
        assert!(!output.is_empty());
        assert!(output.lines().count() > 1);
    }
}
