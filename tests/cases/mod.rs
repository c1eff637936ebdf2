//! Shared harness for the integration tests.
//!
//! `test_case!` runs one input through the public API and checks any of:
//!
//! - `value`: the inspected completion value of a module-mode run
//! - `exports`: the module's exports, one `name = value` line each, sorted
//! - `html`: the HTML of a JSX-mode render with no bindings
//!
//! Each expectation is `Ok(text)` or `Err(message)`, where `message` is the
//! headline of the [`jsx_eval::Error`].

#![allow(dead_code)]

use bumpalo::Bump;
use jsx_eval::{
    Bindings, Context, EvaluateOptions, ParseOptions, RenderOptions, evaluate_jsx_source,
    evaluate_source, render, to_html, Value,
};

#[macro_export]
macro_rules! test_case {
    (@check value, $input:expr, $expected:expr) => {
        $crate::cases::check($crate::cases::eval_module($input), $expected)
    };
    (@check exports, $input:expr, $expected:expr) => {
        $crate::cases::check($crate::cases::module_exports($input), $expected)
    };
    (@check html, $input:expr, $expected:expr) => {
        $crate::cases::check($crate::cases::render_jsx($input), $expected)
    };
    ($name:ident, input: $input:expr, $($field:ident: $expected:expr),+ $(,)?) => {
        #[test]
        fn $name() {
            let input: &str = $input;
            $( $crate::test_case!(@check $field, input, $expected); )+
        }
    };
}

pub fn check(actual: Result<String, String>, expected: Result<&str, &str>) {
    let actual = actual.as_ref().map(String::as_str).map_err(String::as_str);
    pretty_assertions::assert_eq!(actual, expected);
}

pub fn eval_module(input: &str) -> Result<String, String> {
    eval_module_with(input, EvaluateOptions::default())
}

pub fn eval_module_with(input: &str, options: EvaluateOptions) -> Result<String, String> {
    let arena = Bump::new();
    let source = arena.alloc_str(input);
    let mut ctx = Context::new(options);
    evaluate_source(&arena, &mut ctx, source, &ParseOptions::default())
        .map(|value| value.inspect())
        .map_err(|err| jsx_eval::Error::new(err, input).to_string())
}

pub fn module_exports(input: &str) -> Result<String, String> {
    let arena = Bump::new();
    let source = arena.alloc_str(input);
    let mut ctx = Context::new(EvaluateOptions::default());
    evaluate_source(&arena, &mut ctx, source, &ParseOptions::default())
        .map_err(|err| jsx_eval::Error::new(err, input).to_string())?;
    let mut lines: Vec<String> = ctx
        .exports()
        .iter()
        .map(|(name, value)| format!("{} = {}", name, value.inspect()))
        .collect();
    lines.sort();
    Ok(lines.join("\n"))
}

pub fn render_jsx(input: &str) -> Result<String, String> {
    render_jsx_with(input, &[], EvaluateOptions::default())
}

/// Renders with string-valued override bindings.
pub fn render_jsx_with(
    input: &str,
    bindings: &[(&str, &str)],
    options: EvaluateOptions,
) -> Result<String, String> {
    let arena = Bump::new();
    let source = arena.alloc_str(input);
    let mut ctx = Context::new(options);
    let fail = |err: jsx_eval_core::api::Error| jsx_eval::Error::new(err, input).to_string();
    let thunks = evaluate_jsx_source(&arena, &mut ctx, source, &ParseOptions::default()).map_err(fail)?;
    let bindings: Bindings = bindings
        .iter()
        .map(|&(name, value)| (name, Value::from(value)))
        .collect();
    let nodes = render(&thunks, &bindings, &mut ctx, &RenderOptions::default())
        .map_err(|err| fail(err.into()))?;
    Ok(to_html(&nodes))
}
