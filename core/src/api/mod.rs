//! Public entry points.
//!
//! Two evaluation modes are offered:
//!
//! 1. **Module mode** (`evaluate`): statements run in order, declarations and
//!    exports populate the [`Context`](crate::evaluator::Context), and the value
//!    of the last top-level expression statement is returned.
//! 2. **JSX mode** (`evaluate_jsx`): the program must be a single fragment
//!    expression; its children come back as [`NodeThunk`](crate::values::NodeThunk)s
//!    for a renderer to invoke.
//!
//! # Example
//!
//! ```ignore
//! use bumpalo::Bump;
//! use jsx_eval_core::api::{self, ParseOptions};
//! use jsx_eval_core::evaluator::Context;
//!
//! let arena = Bump::new();
//! let mut ctx = Context::new(Default::default());
//! let thunks = api::evaluate_jsx_source(&arena, &mut ctx, "<b>hi</b>", &ParseOptions::default())?;
//! assert_eq!(thunks.len(), 1);
//! ```

mod error;
mod evaluate;
mod options;

pub use error::{Diagnostic, Error, EvaluationError, RelatedInfo, Severity};
pub use evaluate::{evaluate, evaluate_jsx, evaluate_jsx_source, evaluate_source};
pub use options::{EvaluateOptions, ParseOptions};
