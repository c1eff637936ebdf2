mod builder;
pub mod error;
mod nesting;
#[allow(clippy::module_inception)]
pub mod parser;
mod syntax;

// Re-export the parser and rule enum for external use
pub use parser::JsxParser;
pub use parser::Rule;
pub use parser::{parse, parse_with_options};

pub use error::{ParseError, ParseErrorKind};
pub use syntax::{LineIndex, Span};

pub(crate) use builder::{clean_jsx_text, parse_number};

#[cfg(test)]
mod parse_test;

#[cfg(test)]
mod jsx_test;
