use bumpalo::Bump;
use lazy_static::lazy_static;
use pest::Parser;
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;
use tracing::debug;

use crate::api::ParseOptions;
use crate::ast::Program;
use crate::parser::builder::Builder;
use crate::parser::error::{ParseError, ParseErrorKind, convert_pest_error};
use crate::parser::nesting::{Nesting, nesting};
use crate::parser::syntax::Span;
use crate::stack::with_parse_stack;

lazy_static! {
    // Note: precedence is defined lowest to highest.
    pub(crate) static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        // (lowest precedence)
        .op(Op::infix(Rule::nullish, Assoc::Left) | Op::infix(Rule::or, Assoc::Left)) // `??`, `||`
        .op(Op::infix(Rule::and, Assoc::Left))                                         // `&&`
        .op(Op::infix(Rule::bit_or, Assoc::Left))                                      // `|`
        .op(Op::infix(Rule::bit_xor, Assoc::Left))                                     // `^`
        .op(Op::infix(Rule::bit_and, Assoc::Left))                                     // `&`
        .op(
            Op::infix(Rule::eq, Assoc::Left)
                | Op::infix(Rule::ne, Assoc::Left)
                | Op::infix(Rule::strict_eq, Assoc::Left)
                | Op::infix(Rule::strict_ne, Assoc::Left)
        )                                                                              // `==`, `!=`, `===`, `!==`
        .op(
            Op::infix(Rule::lt, Assoc::Left)
                | Op::infix(Rule::le, Assoc::Left)
                | Op::infix(Rule::gt, Assoc::Left)
                | Op::infix(Rule::ge, Assoc::Left)
                | Op::infix(Rule::instanceof, Assoc::Left)
                | Op::infix(Rule::in_op, Assoc::Left)
        )                                                                              // relational
        .op(
            Op::infix(Rule::shl, Assoc::Left)
                | Op::infix(Rule::shr, Assoc::Left)
                | Op::infix(Rule::ushr, Assoc::Left)
        )                                                                              // shifts
        .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))     // `+`, `-`
        .op(
            Op::infix(Rule::mul, Assoc::Left)
                | Op::infix(Rule::div, Assoc::Left)
                | Op::infix(Rule::rem, Assoc::Left)
        )                                                                              // `*`, `/`, `%`
        .op(Op::infix(Rule::pow, Assoc::Right))                                        // `**` (right-assoc)
        // (highest precedence)
        ;
}

#[derive(Parser)]
#[grammar = "parser/grammar.pest"]
pub struct JsxParser;

/// Parse a program with default options.
pub fn parse<'a>(arena: &'a Bump, source: &'a str) -> Result<&'a Program<'a>, ParseError> {
    parse_with_options(arena, source, &ParseOptions::default())
}

/// Parse a program.
///
/// With `force_expression` set the source is wrapped in `<>…</>` first, so JSX
/// markup can be written without an enclosing element.
pub fn parse_with_options<'a>(
    arena: &'a Bump,
    source: &'a str,
    options: &ParseOptions,
) -> Result<&'a Program<'a>, ParseError> {
    let source: &'a str = if options.force_expression {
        arena.alloc_str(&format!("<>{}</>", source))
    } else {
        source
    };

    let Nesting { depth, offset } = nesting(source);
    debug!(
        len = source.len(),
        depth,
        force_expression = options.force_expression,
        "parsing"
    );
    if depth > options.max_depth {
        return Err(ParseError::new(
            ParseErrorKind::MaxDepthExceeded {
                depth,
                max_depth: options.max_depth,
            },
            source.to_string(),
            Span(offset..offset + 1),
        ));
    }

    let mut pairs = with_parse_stack(depth, || JsxParser::parse(Rule::program, source))
        .map_err(|e| convert_pest_error(e, source))?;
    let program = pairs.next().ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::Other {
                message: "empty parse result".to_string(),
            },
            source.to_string(),
            Span(0..0),
        )
    })?;

    let builder = Builder::new(arena, source, options.max_depth);
    let body = builder.program(program)?;
    Ok(arena.alloc(Program { source, body }))
}
