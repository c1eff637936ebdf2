//! Public error types for the evaluator API.
//!
//! Internal evaluation errors borrow the program arena (thrown values are live
//! runtime values), so they are flattened into the lifetime-free types below at
//! the API boundary.

use core::fmt;

use crate::ast::SourceLocation;
use crate::evaluator::EvalError;
use crate::parser::{ParseError, Span};

/// Public error type for all parse-then-evaluate operations.
#[derive(Debug, Clone)]
pub enum Error {
    /// The source could not be parsed.
    Parse(ParseError),

    /// Evaluation failed, either on an uncaught exception or on a fatal
    /// sandbox, structural or resource error.
    Evaluation(EvaluationError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "{}", err),
            Error::Evaluation(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl<'a> From<EvalError<'a>> for Error {
    fn from(err: EvalError<'a>) -> Self {
        Error::Evaluation(EvaluationError::from(err))
    }
}

/// An evaluation failure detached from the runtime that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationError {
    /// Error category, e.g. `TypeError` or `NotAllowed`.
    pub category: &'static str,
    pub message: String,
    /// Whether a `try`/`catch` in the program could have handled it.
    pub catchable: bool,
    /// Location of the innermost node that failed.
    pub loc: Option<SourceLocation>,
    /// Enclosing node kinds, innermost first.
    pub context: Vec<String>,
}

impl EvaluationError {
    pub fn span(&self) -> Option<Span> {
        self.loc.as_ref().map(|l| l.span.clone())
    }

    /// `Category: message`; uncaught exceptions already lead with `Uncaught`.
    pub fn headline(&self) -> String {
        if self.message.starts_with(self.category) {
            self.message.clone()
        } else {
            format!("{}: {}", self.category, self.message)
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut help = Vec::new();
        if !self.context.is_empty() {
            help.push(format!("while evaluating {}", self.context.join(" in ")));
        }
        Diagnostic {
            severity: Severity::Error,
            message: self.headline(),
            span: self.span().unwrap_or_default(),
            related: Vec::new(),
            help,
            code: None,
        }
    }
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.headline())?;
        if let Some(loc) = &self.loc {
            write!(f, " at {}", loc.start)?;
        }
        Ok(())
    }
}

impl std::error::Error for EvaluationError {}

impl<'a> From<EvalError<'a>> for EvaluationError {
    fn from(err: EvalError<'a>) -> Self {
        EvaluationError {
            category: err.kind.category(),
            message: err.kind.to_string(),
            catchable: err.is_catchable(),
            loc: err.loc,
            context: err.context,
        }
    }
}

/// A diagnostic message (error, warning, or info) with source location.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level (error, warning, info).
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Source location of the primary issue.
    pub span: Span,

    /// Related locations that provide additional context.
    pub related: Vec<RelatedInfo>,

    /// Help lines suggesting how to fix the issue.
    pub help: Vec<String>,

    /// Optional error code (e.g., "P001") for documentation lookup.
    pub code: Option<String>,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Related information for a diagnostic.
#[derive(Debug, Clone)]
pub struct RelatedInfo {
    pub span: Span,
    pub message: String,
}
