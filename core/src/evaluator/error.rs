//! Runtime evaluation errors.
//!
//! # Error Categories
//!
//! - **Catchable**: thrown values, reference errors, type errors and calls to
//!   non-callables. A `try`/`catch` in the program sees these as values.
//!
//! - **Fatal**: sandbox violations (whitelist), unsupported constructs,
//!   structural errors and call-depth overflow. These bypass `catch` so a
//!   program cannot hide them, though `finally` blocks still run.

use crate::ast::SourceLocation;
use crate::values::{Value, coerce::to_string};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ErrorKind<'a> {
    /// A value raised by `throw`.
    #[error("Uncaught {}", describe_thrown(.0))]
    Thrown(Value<'a>),

    #[error("{0} is not defined")]
    Reference(String),

    #[error("{0}")]
    Type(String),

    #[error("{0} is not a function")]
    NotCallable(String),

    /// Callee is not on the whitelist.
    #[error("{0} is not allowed function")]
    NotAllowed(String),

    #[error("{0} is not supported")]
    Unsupported(String),

    /// Invalid assignment target or an otherwise malformed construct.
    #[error("{0}")]
    Structural(String),

    #[error("Maximum call stack size exceeded: depth {depth} exceeds maximum of {max_depth}")]
    StackOverflow { depth: usize, max_depth: usize },
}

impl<'a> ErrorKind<'a> {
    /// Name used when the error surfaces as a value (`e.name`) or in reports.
    pub fn category(&self) -> &'static str {
        match self {
            ErrorKind::Thrown(_) => "Uncaught",
            ErrorKind::Reference(_) => "ReferenceError",
            ErrorKind::Type(_) | ErrorKind::NotCallable(_) => "TypeError",
            ErrorKind::NotAllowed(_) => "NotAllowedError",
            ErrorKind::Unsupported(_) => "UnsupportedError",
            ErrorKind::Structural(_) => "SyntaxError",
            ErrorKind::StackOverflow { .. } => "RangeError",
        }
    }
}

/// Renders a thrown value the way an uncaught exception is reported:
/// `Name: message` for error objects, the value itself otherwise.
fn describe_thrown(value: &Value<'_>) -> String {
    if let Value::Object(object) = value {
        let object = object.borrow();
        let field = |name: &str| {
            object
                .properties
                .get(name)
                .and_then(|p| p.data_value())
                .map(to_string)
        };
        if let (Some(name), Some(message)) = (field("name"), field("message")) {
            return if message.is_empty() {
                name.to_string()
            } else {
                format!("{}: {}", name, message)
            };
        }
    }
    value.inspect()
}

/// An evaluation failure with the location of the node that raised it and the
/// kinds of the nodes it propagated through.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}")]
pub struct EvalError<'a> {
    pub kind: ErrorKind<'a>,
    pub loc: Option<SourceLocation>,
    /// Enclosing node kinds, innermost first.
    pub context: Vec<String>,
}

impl<'a> EvalError<'a> {
    pub fn new(kind: ErrorKind<'a>) -> Self {
        Self {
            kind,
            loc: None,
            context: Vec::new(),
        }
    }

    pub fn thrown(value: Value<'a>) -> Self {
        Self::new(ErrorKind::Thrown(value))
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type(message.into()))
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::Reference(name.into()))
    }

    pub fn not_callable(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotCallable(name.into()))
    }

    pub fn not_allowed(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAllowed(name.into()))
    }

    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unsupported(what.into()))
    }

    pub fn structural(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Structural(message.into()))
    }

    /// Whether `catch` may intercept this error.
    pub fn is_catchable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Thrown(_)
                | ErrorKind::Reference(_)
                | ErrorKind::Type(_)
                | ErrorKind::NotCallable(_)
        )
    }

    /// Records the node the error passed through. The first location seen is
    /// the innermost one and is kept.
    pub fn at(mut self, loc: &Option<SourceLocation>, node_kind: &str) -> Self {
        if self.loc.is_none() {
            self.loc = loc.clone();
        }
        if self.context.last().is_none_or(|last| last != node_kind) {
            self.context.push(node_kind.to_string());
        }
        self
    }
}
