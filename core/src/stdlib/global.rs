//! Global functions and objects: conversions, parsing, error constructors,
//! `JSON` and `console`.

use std::rc::Rc;

use tracing::{debug, error, info, warn};

use crate::evaluator::{Context, EvalError};
use crate::stdlib::{NativeResult, arg, array, intrinsic, number, object, string};
use crate::values::{
    Value,
    coerce::{number_to_string, to_number},
};

/// Error constructors available as globals.
const ERROR_CONSTRUCTORS: &[&str] = &[
    "Error",
    "TypeError",
    "RangeError",
    "ReferenceError",
    "SyntaxError",
];

pub(crate) fn globals<'a>() -> Vec<(&'static str, Value<'a>)> {
    let mut globals = vec![
        ("undefined", Value::Undefined),
        ("NaN", Value::Number(f64::NAN)),
        ("Infinity", Value::Number(f64::INFINITY)),
        ("Object", object::constructor()),
        ("Array", array::constructor()),
        ("String", string::constructor()),
        ("Number", number::constructor()),
        ("Boolean", object::boolean_constructor()),
        ("JSON", json()),
        ("console", console()),
        intrinsic("parseInt", global_parse_int),
        intrinsic("parseFloat", global_parse_float),
        intrinsic("isNaN", |ctx, _this, args| {
            let value = ctx.to_primitive(&arg(args, 0))?;
            Ok(Value::Bool(to_number(&value).is_nan()))
        }),
        intrinsic("isFinite", |ctx, _this, args| {
            let value = ctx.to_primitive(&arg(args, 0))?;
            Ok(Value::Bool(to_number(&value).is_finite()))
        }),
    ];
    for &name in ERROR_CONSTRUCTORS {
        globals.push(intrinsic(name, move |ctx, _this, args| {
            let message = match args.first() {
                None | Some(Value::Undefined) => Rc::from(""),
                Some(message) => ctx.to_string_value(message)?,
            };
            Ok(ctx.make_error(name, &message))
        }));
    }
    globals
}

// ============================================================================
// Parsing
// ============================================================================

fn global_parse_int<'a>(ctx: &mut Context<'a>, _this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let input = ctx.to_string_value(&arg(args, 0))?;
    let radix = match args.get(1) {
        None | Some(Value::Undefined) => 0,
        Some(radix) => crate::values::coerce::to_int32(to_number(radix)),
    };
    Ok(Value::Number(parse_int(&input, radix)))
}

/// `parseInt`: skips leading whitespace, honours a sign and a `0x` prefix,
/// and reads digits until the first one invalid in `radix`.
pub(crate) fn parse_int(input: &str, radix: i32) -> f64 {
    let mut s = input.trim_start();
    let mut sign = 1.0;
    if let Some(rest) = s.strip_prefix('-') {
        sign = -1.0;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }

    let mut radix = radix;
    if radix != 0 && !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    if radix == 0 || radix == 16 {
        if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            s = rest;
            radix = 16;
        }
    }
    if radix == 0 {
        radix = 10;
    }

    let mut result: f64 = 0.0;
    let mut any = false;
    for c in s.chars() {
        let Some(digit) = c.to_digit(radix as u32) else {
            break;
        };
        result = result * radix as f64 + digit as f64;
        any = true;
    }
    if any { sign * result } else { f64::NAN }
}

fn global_parse_float<'a>(ctx: &mut Context<'a>, _this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let input = ctx.to_string_value(&arg(args, 0))?;
    Ok(Value::Number(parse_float(&input)))
}

/// `parseFloat`: the longest prefix that is a decimal literal.
pub(crate) fn parse_float(input: &str) -> f64 {
    let s = input.trim_start();
    let (sign, body) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, &s[1..]),
        Some(b'+') => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    if body.starts_with("Infinity") {
        return sign * f64::INFINITY;
    }

    let bytes = body.as_bytes();
    let mut end = 0;
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return f64::NAN;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    let literal = body[..end].trim_end_matches('.');
    let literal = if literal.is_empty() { "0" } else { literal };
    sign * literal.parse::<f64>().unwrap_or(f64::NAN)
}

// ============================================================================
// JSON
// ============================================================================

fn json<'a>() -> Value<'a> {
    Value::from_entries([intrinsic("stringify", json_stringify)])
}

fn json_stringify<'a>(ctx: &mut Context<'a>, _this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let indent = match arg(args, 2) {
        Value::Number(n) => " ".repeat(n.clamp(0.0, 10.0) as usize),
        Value::String(s) => s.chars().take(10).collect(),
        _ => String::new(),
    };
    let mut writer = JsonWriter {
        indent,
        out: String::new(),
        stack: Vec::new(),
    };
    let written = writer.write(ctx, &arg(args, 0), 0)?;
    Ok(if written {
        Value::from(writer.out)
    } else {
        Value::Undefined
    })
}

struct JsonWriter {
    indent: String,
    out: String,
    /// Identity of the containers being serialised, for cycle detection.
    stack: Vec<*const ()>,
}

impl JsonWriter {
    /// Appends `value`; returns false for values JSON omits (`undefined`,
    /// functions).
    fn write<'a>(
        &mut self,
        ctx: &mut Context<'a>,
        value: &Value<'a>,
        depth: usize,
    ) -> Result<bool, EvalError<'a>> {
        match value {
            Value::Undefined | Value::Function(_) => return Ok(false),
            Value::Null => self.out.push_str("null"),
            Value::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) if n.is_finite() => self.out.push_str(&number_to_string(*n)),
            Value::Number(_) => self.out.push_str("null"),
            Value::String(s) => self.write_string(s),
            Value::Array(elements) => {
                self.enter(Rc::as_ptr(elements) as *const ())?;
                let elements = elements.borrow().clone();
                self.out.push('[');
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.newline(depth + 1);
                    if !self.write(ctx, element, depth + 1)? {
                        self.out.push_str("null");
                    }
                }
                if !elements.is_empty() {
                    self.newline(depth);
                }
                self.out.push(']');
                self.stack.pop();
            }
            Value::Object(object) => {
                self.enter(Rc::as_ptr(object) as *const ())?;
                let keys = ctx.own_enumerable_keys(value);
                self.out.push('{');
                let mut first = true;
                for key in keys {
                    let property = ctx.get_property(value, &key)?;
                    if matches!(property, Value::Undefined | Value::Function(_)) {
                        continue;
                    }
                    if !first {
                        self.out.push(',');
                    }
                    first = false;
                    self.newline(depth + 1);
                    self.write_string(&key);
                    self.out.push(':');
                    if !self.indent.is_empty() {
                        self.out.push(' ');
                    }
                    self.write(ctx, &property, depth + 1)?;
                }
                if !first {
                    self.newline(depth);
                }
                self.out.push('}');
                self.stack.pop();
            }
            Value::Node(_) => self.out.push_str("{}"),
        }
        Ok(true)
    }

    fn enter<'a>(&mut self, ptr: *const ()) -> Result<(), EvalError<'a>> {
        if self.stack.contains(&ptr) {
            return Err(EvalError::type_error("Converting circular structure to JSON"));
        }
        self.stack.push(ptr);
        Ok(())
    }

    fn newline(&mut self, depth: usize) {
        if self.indent.is_empty() {
            return;
        }
        self.out.push('\n');
        for _ in 0..depth {
            self.out.push_str(&self.indent);
        }
    }

    fn write_string(&mut self, s: &str) {
        self.out.push('"');
        for c in s.chars() {
            match c {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                '\u{8}' => self.out.push_str("\\b"),
                '\u{c}' => self.out.push_str("\\f"),
                c if (c as u32) < 0x20 => self.out.push_str(&format!("\\u{:04x}", c as u32)),
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }
}

// ============================================================================
// console
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

fn console<'a>() -> Value<'a> {
    Value::from_entries([
        intrinsic("log", |_ctx, _this, args| log(Level::Info, args)),
        intrinsic("info", |_ctx, _this, args| log(Level::Info, args)),
        intrinsic("debug", |_ctx, _this, args| log(Level::Debug, args)),
        intrinsic("warn", |_ctx, _this, args| log(Level::Warn, args)),
        intrinsic("error", |_ctx, _this, args| log(Level::Error, args)),
    ])
}

fn log<'a>(level: Level, args: &[Value<'a>]) -> NativeResult<'a> {
    let message = args
        .iter()
        .map(Value::inspect)
        .collect::<Vec<_>>()
        .join(" ");
    match level {
        Level::Debug => debug!(target: "console", "{}", message),
        Level::Info => info!(target: "console", "{}", message),
        Level::Warn => warn!(target: "console", "{}", message),
        Level::Error => error!(target: "console", "{}", message),
    }
    Ok(Value::Undefined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("  42px", 0), 42.0);
        assert_eq!(parse_int("-0x1f", 0), -31.0);
        assert_eq!(parse_int("101", 2), 5.0);
        assert!(parse_int("px", 0).is_nan());
        assert!(parse_int("1", 40).is_nan());
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("3.14abc"), 3.14);
        assert_eq!(parse_float("  -.5"), -0.5);
        assert_eq!(parse_float("1e3x"), 1000.0);
        assert_eq!(parse_float("2e"), 2.0);
        assert_eq!(parse_float("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_float("abc").is_nan());
    }
}
