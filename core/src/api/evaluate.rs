use bumpalo::Bump;
use tracing::debug;

use crate::api::{Error, ParseOptions};
use crate::ast::{ExprKind, Program, StmtKind};
use crate::evaluator::{Context, EvalError};
use crate::parser;
use crate::values::{Bindings, NodeThunk, Value};

/// Runs `program` in module mode.
///
/// Returns the value of the last top-level expression statement; exports are
/// read back through [`Context::exports`].
pub fn evaluate<'a>(
    ctx: &mut Context<'a>,
    program: &'a Program<'a>,
) -> Result<Value<'a>, EvalError<'a>> {
    ctx.timed("eval", |ctx| ctx.exec_program(program, &Bindings::new()))
}

/// Runs `program` in JSX mode.
///
/// The program must consist of one expression statement whose expression is a
/// fragment (as produced by parsing with `force_expression`); anything else
/// yields no thunks. The key generator is reset so that evaluating the same
/// program again produces the same keys.
pub fn evaluate_jsx<'a>(
    ctx: &mut Context<'a>,
    program: &'a Program<'a>,
) -> Result<Vec<NodeThunk<'a>>, EvalError<'a>> {
    let fragment = match program.body {
        [stmt] => match stmt.kind {
            StmtKind::Expression(expr) => match expr.kind {
                ExprKind::JsxFragment(fragment) => fragment,
                _ => return Ok(Vec::new()),
            },
            _ => return Ok(Vec::new()),
        },
        _ => return Ok(Vec::new()),
    };
    ctx.timed("eval", |ctx| {
        ctx.key_generator().reset();
        let thunks = ctx.child_thunks(fragment.children);
        debug!(thunks = thunks.len(), "evaluated jsx");
        Ok(thunks)
    })
}

/// Parses `source` and runs it in module mode.
pub fn evaluate_source<'a>(
    arena: &'a Bump,
    ctx: &mut Context<'a>,
    source: &'a str,
    options: &ParseOptions,
) -> Result<Value<'a>, Error> {
    let program = ctx.timed("parse", |_| parser::parse_with_options(arena, source, options))?;
    Ok(evaluate(ctx, program)?)
}

/// Parses `source` as markup (wrapped in a fragment) and runs it in JSX mode.
pub fn evaluate_jsx_source<'a>(
    arena: &'a Bump,
    ctx: &mut Context<'a>,
    source: &'a str,
    options: &ParseOptions,
) -> Result<Vec<NodeThunk<'a>>, Error> {
    let options = ParseOptions {
        force_expression: true,
        ..options.clone()
    };
    let program = ctx.timed("parse", |_| parser::parse_with_options(arena, source, &options))?;
    Ok(evaluate_jsx(ctx, program)?)
}
