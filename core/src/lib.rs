//! Core of the sandboxed ECMAScript + JSX evaluator.
//!
//! Source text is parsed into an arena-allocated syntax tree ([`ast`]), which the
//! [`evaluator`] walks against a shared [`evaluator::Context`]. JSX is reified into
//! lazily evaluated [`values::NodeThunk`]s that a renderer (see [`render`]) may
//! invoke any number of times.

pub mod api;
pub mod ast;
pub mod evaluator;
pub mod parser;
pub mod render;
pub mod scope_stack;
pub mod stack;
pub mod stdlib;
pub mod values;

pub use evaluator::{Context, ContextBuilder, EvalError};
pub use values::Value;
