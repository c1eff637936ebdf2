//! jsx-eval - A sandboxed evaluator for ECMAScript with JSX
//!
//! # Overview
//!
//! Programs are parsed into an arena-allocated syntax tree and walked directly;
//! nothing is compiled and no host capability is reachable unless the host
//! supplies it. Two modes are offered:
//!
//! - **Module mode** runs a program of statements, collecting its exports and
//!   returning the value of the last expression statement.
//! - **JSX mode** treats the source as markup. Top-level children become lazy
//!   [`NodeThunk`]s that a renderer may invoke any number of times, with fresh
//!   override [`Bindings`] each time.
//!
//! # Quick Start
//!
//! ```ignore
//! use bumpalo::Bump;
//! use jsx_eval::{Bindings, Context, EvaluateOptions, ParseOptions, RenderOptions};
//!
//! let arena = Bump::new();
//! let mut ctx = Context::new(EvaluateOptions::default());
//! let thunks = jsx_eval::evaluate_jsx_source(&arena, &mut ctx, "<p>Hi {name}</p>", &ParseOptions::default())?;
//!
//! let bindings = Bindings::new().with("name", "Ada".into());
//! let nodes = jsx_eval::render(&thunks, &bindings, &mut ctx, &RenderOptions::default())?;
//! assert_eq!(jsx_eval::to_html(&nodes), "<p>Hi Ada</p>");
//! ```
//!
//! # Sandbox
//!
//! Host functions are registered through [`ContextBuilder`]. Once
//! [`ContextBuilder::allowed_functions`] is called, call expressions may only
//! invoke the listed functions (built-in methods are always callable):
//!
//! ```ignore
//! let greet = Value::function(Function::native("greet", |_, _, _| Ok("hi".into())));
//! let mut ctx = Context::builder()
//!     .global("greet", greet.clone())
//!     .allowed_functions([greet])
//!     .build();
//! ```

use miette::SourceSpan;

mod error_renderer;

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};

// Re-export public API from jsx_eval_core
pub use jsx_eval_core::api::{
    Diagnostic, EvaluateOptions, EvaluationError, ParseOptions, RelatedInfo, Severity, evaluate,
    evaluate_jsx, evaluate_jsx_source, evaluate_source,
};
pub use jsx_eval_core::evaluator::{Clock, Context, ContextBuilder, EvalError, SystemClock};
pub use jsx_eval_core::parser::{self, ParseError};
pub use jsx_eval_core::render::{
    RenderOptions, RenderedNode, SourcePosition, render, render_node, to_html,
};
pub use jsx_eval_core::values::{
    self, Bindings, Function, JsxNode, NativeFn, NodeThunk, Value,
};

/// A failed parse or evaluation, together with the source text it refers to.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Error {
    #[error("{}", .diagnostic.message)]
    #[diagnostic(code(jsx_eval::parse))]
    Parse {
        diagnostic: Diagnostic,
        #[source_code]
        source_code: String,
        #[label("here")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
    },

    #[error("{}", .diagnostic.message)]
    #[diagnostic(code(jsx_eval::evaluation))]
    Evaluation {
        error: EvaluationError,
        diagnostic: Diagnostic,
        #[source_code]
        source_code: String,
        #[label("raised here")]
        span: Option<SourceSpan>,
        #[help]
        help: Option<String>,
    },
}

impl Error {
    /// Attaches `source_code`, the text that was parsed, to a core error.
    pub fn new(error: jsx_eval_core::api::Error, source_code: impl Into<String>) -> Self {
        let source_code = source_code.into();
        match error {
            jsx_eval_core::api::Error::Parse(err) => {
                let diagnostic = err.to_diagnostic();
                Error::Parse {
                    span: SourceSpan::from(diagnostic.span.0.clone()),
                    help: join_help(&diagnostic.help),
                    diagnostic,
                    source_code,
                }
            }
            jsx_eval_core::api::Error::Evaluation(err) => {
                let diagnostic = err.to_diagnostic();
                Error::Evaluation {
                    span: err.span().map(|span| SourceSpan::from(span.0)),
                    help: join_help(&diagnostic.help),
                    error: err,
                    diagnostic,
                    source_code,
                }
            }
        }
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        match self {
            Error::Parse { diagnostic, .. } | Error::Evaluation { diagnostic, .. } => diagnostic,
        }
    }

    pub fn source_text(&self) -> &str {
        match self {
            Error::Parse { source_code, .. } | Error::Evaluation { source_code, .. } => source_code,
        }
    }
}

fn join_help(help: &[String]) -> Option<String> {
    (!help.is_empty()).then(|| help.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_error_carries_span() {
        let arena = Bump::new();
        let mut ctx = Context::new(EvaluateOptions::default());
        let source = "let x = ;";
        let err = evaluate_source(&arena, &mut ctx, source, &ParseOptions::default()).unwrap_err();
        let err = Error::new(err, source);
        assert!(matches!(err, Error::Parse { .. }));
        assert_eq!(err.source_text(), source);
        assert!(err.diagnostic().code.is_some());
    }

    #[test]
    fn test_error_exposes_miette_source() {
        let arena = Bump::new();
        let mut ctx = Context::new(EvaluateOptions::default());
        let source = "null.x";
        let err = evaluate_source(&arena, &mut ctx, source, &ParseOptions::default()).unwrap_err();
        let err = Error::new(err, source);
        assert!(miette::Diagnostic::source_code(&err).is_some());
        let labels: Vec<_> = miette::Diagnostic::labels(&err)
            .map(|labels| labels.collect())
            .unwrap_or_default();
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn test_evaluation_error_message() {
        let arena = Bump::new();
        let mut ctx = Context::new(EvaluateOptions::default());
        let source = "null.x";
        let err = evaluate_source(&arena, &mut ctx, source, &ParseOptions::default()).unwrap_err();
        let err = Error::new(err, source);
        assert_eq!(
            err.to_string(),
            "TypeError: Cannot read properties of null (reading 'x')"
        );
        let Error::Evaluation { span, error, .. } = &err else {
            panic!("expected an evaluation error");
        };
        assert!(error.catchable);
        assert_eq!(*span, Some(SourceSpan::from(0..6)));
    }
}
