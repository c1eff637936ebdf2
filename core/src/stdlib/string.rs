//! String methods.
//!
//! Indices count Unicode scalar values, matching how property access indexes
//! into strings (`"héllo"[1]`).
//!
//! Patterns are always plain strings: regular expression literals are not part
//! of the supported language.

use std::rc::Rc;

use crate::evaluator::{Context, EvalError};
use crate::stdlib::{MAX_LENGTH, NativeResult, arg, intrinsic, relative_index, throw};
use crate::values::{Value, coerce::to_integer};

pub(crate) fn methods<'a>() -> Vec<(&'static str, Value<'a>)> {
    vec![
        intrinsic("charAt", string_char_at),
        intrinsic("charCodeAt", string_char_code_at),
        intrinsic("indexOf", string_index_of),
        intrinsic("includes", string_includes),
        intrinsic("startsWith", string_starts_with),
        intrinsic("endsWith", string_ends_with),
        intrinsic("slice", string_slice),
        intrinsic("substring", string_substring),
        intrinsic("toUpperCase", |ctx, this, _| map_string(ctx, this, |s| s.to_uppercase())),
        intrinsic("toLowerCase", |ctx, this, _| map_string(ctx, this, |s| s.to_lowercase())),
        intrinsic("trim", |ctx, this, _| map_string(ctx, this, |s| s.trim().to_string())),
        intrinsic("trimStart", |ctx, this, _| {
            map_string(ctx, this, |s| s.trim_start().to_string())
        }),
        intrinsic("trimEnd", |ctx, this, _| map_string(ctx, this, |s| s.trim_end().to_string())),
        intrinsic("split", string_split),
        intrinsic("replace", |ctx, this, args| string_replace(ctx, this, args, false)),
        intrinsic("replaceAll", |ctx, this, args| string_replace(ctx, this, args, true)),
        intrinsic("repeat", string_repeat),
        intrinsic("padStart", |ctx, this, args| string_pad(ctx, this, args, true)),
        intrinsic("padEnd", |ctx, this, args| string_pad(ctx, this, args, false)),
        intrinsic("concat", string_concat),
        intrinsic("at", string_at),
        intrinsic("toString", |ctx, this, _| map_string(ctx, this, |s| s.to_string())),
        intrinsic("valueOf", |ctx, this, _| map_string(ctx, this, |s| s.to_string())),
    ]
}

fn this_string<'a>(ctx: &mut Context<'a>, this: &Value<'a>) -> Result<Rc<str>, EvalError<'a>> {
    match this {
        Value::String(s) => Ok(s.clone()),
        Value::Undefined | Value::Null => Err(EvalError::type_error(
            "String.prototype method called on null or undefined",
        )),
        other => ctx.to_string_value(other),
    }
}

/// Argument `index` converted with `String(...)`.
fn string_arg<'a>(
    ctx: &mut Context<'a>,
    args: &[Value<'a>],
    index: usize,
) -> Result<Rc<str>, EvalError<'a>> {
    ctx.to_string_value(&arg(args, index))
}

fn map_string<'a>(
    ctx: &mut Context<'a>,
    this: &Value<'a>,
    f: impl FnOnce(&str) -> String,
) -> NativeResult<'a> {
    let s = this_string(ctx, this)?;
    Ok(Value::from(f(&s)))
}

/// Byte offset of the `index`-th char, or the string length past the end.
fn byte_offset(s: &str, index: usize) -> usize {
    s.char_indices().nth(index).map(|(i, _)| i).unwrap_or(s.len())
}

fn char_index(s: &str, byte: usize) -> usize {
    s[..byte].chars().count()
}

fn char_slice(s: &str, start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }
    &s[byte_offset(s, start)..byte_offset(s, end)]
}

// ============================================================================
// Inspection
// ============================================================================

fn string_char_at<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let s = this_string(ctx, this)?;
    let index = to_integer(&arg(args, 0));
    if index < 0.0 {
        return Ok(Value::from(""));
    }
    Ok(Value::from(
        s.chars()
            .nth(index as usize)
            .map(|c| c.to_string())
            .unwrap_or_default(),
    ))
}

fn string_char_code_at<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let s = this_string(ctx, this)?;
    let index = to_integer(&arg(args, 0));
    if index < 0.0 {
        return Ok(Value::Number(f64::NAN));
    }
    Ok(Value::Number(
        s.chars()
            .nth(index as usize)
            .map(|c| c as u32 as f64)
            .unwrap_or(f64::NAN),
    ))
}

fn string_index_of<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let s = this_string(ctx, this)?;
    let needle = string_arg(ctx, args, 0)?;
    let from = relative_index(&arg(args, 1), s.chars().count(), 0);
    let offset = byte_offset(&s, from);
    let found = s[offset..]
        .find(&*needle)
        .map(|i| char_index(&s, offset + i) as f64)
        .unwrap_or(-1.0);
    Ok(Value::Number(found))
}

fn string_includes<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let s = this_string(ctx, this)?;
    let needle = string_arg(ctx, args, 0)?;
    let from = relative_index(&arg(args, 1), s.chars().count(), 0);
    Ok(Value::Bool(s[byte_offset(&s, from)..].contains(&*needle)))
}

fn string_starts_with<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let s = this_string(ctx, this)?;
    let needle = string_arg(ctx, args, 0)?;
    let from = relative_index(&arg(args, 1), s.chars().count(), 0);
    Ok(Value::Bool(s[byte_offset(&s, from)..].starts_with(&*needle)))
}

fn string_ends_with<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let s = this_string(ctx, this)?;
    let needle = string_arg(ctx, args, 0)?;
    let len = s.chars().count();
    let end = relative_index(&arg(args, 1), len, len);
    Ok(Value::Bool(s[..byte_offset(&s, end)].ends_with(&*needle)))
}

fn string_at<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let s = this_string(ctx, this)?;
    let n = to_integer(&arg(args, 0));
    let index = if n < 0.0 { s.chars().count() as f64 + n } else { n };
    if index < 0.0 {
        return Ok(Value::Undefined);
    }
    Ok(s.chars()
        .nth(index as usize)
        .map(|c| Value::from(c.to_string()))
        .unwrap_or_default())
}

// ============================================================================
// Extraction
// ============================================================================

fn string_slice<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let s = this_string(ctx, this)?;
    let len = s.chars().count();
    let start = relative_index(&arg(args, 0), len, 0);
    let end = relative_index(&arg(args, 1), len, len);
    Ok(Value::from(char_slice(&s, start, end)))
}

/// Like `slice`, but negative arguments clamp to zero and swapped bounds are
/// reordered.
fn string_substring<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let s = this_string(ctx, this)?;
    let len = s.chars().count();
    let clamp = |value: &Value<'a>, default: usize| {
        if value.is_undefined() {
            default
        } else {
            to_integer(value).clamp(0.0, len as f64) as usize
        }
    };
    let start = clamp(&arg(args, 0), 0);
    let end = clamp(&arg(args, 1), len);
    Ok(Value::from(char_slice(&s, start.min(end), start.max(end))))
}

fn string_split<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let s = this_string(ctx, this)?;
    let limit = match args.get(1) {
        None | Some(Value::Undefined) => usize::MAX,
        Some(limit) => crate::values::coerce::to_uint32(crate::values::coerce::to_number(limit)) as usize,
    };
    let parts: Vec<Value<'a>> = match args.first() {
        None | Some(Value::Undefined) => vec![Value::from(s.clone())],
        Some(separator) => {
            let separator = ctx.to_string_value(separator)?;
            if separator.is_empty() {
                s.chars().map(|c| Value::from(c.to_string())).take(limit).collect()
            } else {
                s.split(&*separator).map(Value::from).take(limit).collect()
            }
        }
    };
    Ok(Value::array(parts))
}

// ============================================================================
// Building
// ============================================================================

/// `replace` / `replaceAll` with a string pattern. A function replacement is
/// called with `(match, offset, string)`; a string replacement expands `$&`
/// and `$$`.
fn string_replace<'a>(
    ctx: &mut Context<'a>,
    this: &Value<'a>,
    args: &[Value<'a>],
    all: bool,
) -> NativeResult<'a> {
    let s = this_string(ctx, this)?;
    let pattern = string_arg(ctx, args, 0)?;
    let replacement = arg(args, 1);

    let mut matches = Vec::new();
    if pattern.is_empty() {
        if all {
            matches.extend(s.char_indices().map(|(i, _)| i));
            matches.push(s.len());
        } else {
            matches.push(0);
        }
    } else if all {
        matches.extend(s.match_indices(&*pattern).map(|(i, _)| i));
    } else {
        matches.extend(s.find(&*pattern));
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for start in matches {
        out.push_str(&s[last..start]);
        let replaced = if replacement.is_callable() {
            let result = ctx.call_value(
                &replacement,
                Value::Undefined,
                &[
                    Value::from(pattern.clone()),
                    Value::from(char_index(&s, start)),
                    Value::from(s.clone()),
                ],
            )?;
            ctx.to_string_value(&result)?.to_string()
        } else {
            let template = ctx.to_string_value(&replacement)?;
            template.replace("$$", "\u{0}").replace("$&", &pattern).replace('\u{0}', "$")
        };
        out.push_str(&replaced);
        last = start + pattern.len();
        if out.len() > MAX_LENGTH {
            return throw(ctx, "RangeError", "Invalid string length");
        }
    }
    out.push_str(&s[last..]);
    Ok(Value::from(out))
}

fn string_repeat<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let s = this_string(ctx, this)?;
    let count = to_integer(&arg(args, 0));
    if count < 0.0 || count.is_infinite() {
        return throw(ctx, "RangeError", &format!("Invalid count value: {}", count));
    }
    if s.len() as f64 * count > MAX_LENGTH as f64 {
        return throw(ctx, "RangeError", "Invalid string length");
    }
    Ok(Value::from(s.repeat(count as usize)))
}

fn string_pad<'a>(
    ctx: &mut Context<'a>,
    this: &Value<'a>,
    args: &[Value<'a>],
    at_start: bool,
) -> NativeResult<'a> {
    let s = this_string(ctx, this)?;
    let target = to_integer(&arg(args, 0));
    let len = s.chars().count();
    if target <= len as f64 {
        return Ok(Value::from(s));
    }
    if target > MAX_LENGTH as f64 {
        return throw(ctx, "RangeError", "Invalid string length");
    }
    let filler: Rc<str> = match args.get(1) {
        None | Some(Value::Undefined) => Rc::from(" "),
        Some(filler) => ctx.to_string_value(filler)?,
    };
    if filler.is_empty() {
        return Ok(Value::from(s));
    }
    let padding: String = filler.chars().cycle().take(target as usize - len).collect();
    let padded = if at_start {
        format!("{}{}", padding, s)
    } else {
        format!("{}{}", s, padding)
    };
    Ok(Value::from(padded))
}

fn string_concat<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let mut out = this_string(ctx, this)?.to_string();
    for value in args {
        out.push_str(&ctx.to_string_value(value)?);
    }
    Ok(Value::from(out))
}

/// The `String(...)` conversion function.
pub(crate) fn constructor<'a>() -> Value<'a> {
    intrinsic("String", |ctx, _this, args| match args.first() {
        None => Ok(Value::from("")),
        Some(value) => Ok(Value::from(ctx.to_string_value(value)?)),
    })
    .1
}
