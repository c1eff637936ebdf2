//! Tree-walking evaluator for the ECMAScript + JSX subset.
//!
//! Evaluation is a set of methods on [`Context`], split by concern:
//!
//! - `expression`: expressions, calls, member access, templates
//! - `statement`: statements and [`Completion`]-based control flow
//! - `function` / `class`: closures, invocation, construction, classes
//! - `binding`: destructuring patterns
//! - `property`: property reads and writes across value kinds
//! - `jsx`: JSX reification into lazily evaluated node thunks
//!
//! ## Design Principles
//!
//! - **Never panic**: adversarial programs surface as [`EvalError`]s
//! - **Stack-safe**: call depth is bounded by `max_call_depth`
//! - **Symmetric stacks**: scope and receiver pushes are undone by a guard on
//!   every exit path
//!
//! ## Example
//!
//! ```ignore
//! use bumpalo::Bump;
//! use jsx_eval_core::{evaluator::Context, parser};
//!
//! let arena = Bump::new();
//! let program = parser::parse(&arena, "let x = 1; x + 1")?;
//! let mut ctx = Context::new(Default::default());
//! let value = ctx.exec_program(program, &Default::default())?;
//! assert_eq!(value.as_number(), Some(2.0));
//! ```

mod binding;
mod class;
mod context;
mod error;
mod expression;
mod function;
mod jsx;
mod key_generator;
mod operators;
mod property;
mod statement;

#[cfg(test)]
mod eval_test;

pub use binding::Binding;
pub use class::ClassDescriptor;
pub use context::{Clock, Context, ContextBuilder, ScopedContext, SystemClock};
pub use error::{ErrorKind, EvalError};
pub use jsx::value_to_node;
pub use key_generator::KeyGenerator;
pub use statement::Completion;

pub(crate) use operators::pow;
