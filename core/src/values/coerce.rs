//! ECMAScript type coercions that need no access to user code.
//!
//! Conversions that may call user-defined `toString` live on the evaluator
//! context instead.

use std::rc::Rc;

use crate::values::{FunctionKind, Value};

/// `Number.prototype.toString()` with radix 10.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        // Covers -0.
        return "0".to_string();
    }
    let abs = n.abs();
    if abs >= 1e21 || abs < 1e-6 {
        // Rust renders `1e21` and `1.5e-7`; JS wants an explicit sign.
        let s = format!("{:e}", n);
        return match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => s,
        };
    }
    format!("{}", n)
}

pub fn to_boolean(value: &Value<'_>) -> bool {
    match value {
        Value::Undefined | Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => !(n.is_nan() || *n == 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Node(_) => true,
    }
}

pub fn to_number(value: &Value<'_>) -> f64 {
    match value {
        Value::Undefined => f64::NAN,
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => *n,
        Value::String(s) => string_to_number(s),
        Value::Array(elements) => {
            let elements = elements.borrow();
            match elements.as_slice() {
                [] => 0.0,
                [single] => to_number(&Value::String(to_string(single))),
                _ => f64::NAN,
            }
        }
        Value::Object(_) | Value::Function(_) | Value::Node(_) => f64::NAN,
    }
}

/// `StringToNumber`: whitespace-trimmed decimal, `0x`/`0o`/`0b` integers and
/// `Infinity`; anything else is `NaN`.
pub fn string_to_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    let radix_prefixed = |prefix: [&str; 2], radix: u32| {
        prefix
            .iter()
            .find_map(|p| s.strip_prefix(p))
            .map(|digits| {
                u64::from_str_radix(digits, radix)
                    .map(|n| n as f64)
                    .unwrap_or(f64::NAN)
            })
    };
    if let Some(n) = radix_prefixed(["0x", "0X"], 16) {
        return n;
    }
    if let Some(n) = radix_prefixed(["0o", "0O"], 8) {
        return n;
    }
    if let Some(n) = radix_prefixed(["0b", "0B"], 2) {
        return n;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Rust accepts "inf", "nan" and friends; JS does not.
    if s.chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')))
    {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// `String(value)` for values whose conversion needs no user code.
pub fn to_string(value: &Value<'_>) -> Rc<str> {
    match value {
        Value::Undefined => Rc::from("undefined"),
        Value::Null => Rc::from("null"),
        Value::Bool(b) => Rc::from(if *b { "true" } else { "false" }),
        Value::Number(n) => Rc::from(number_to_string(*n)),
        Value::String(s) => s.clone(),
        Value::Array(elements) => {
            let joined = elements
                .borrow()
                .iter()
                .map(|e| {
                    if e.is_nullish() {
                        String::new()
                    } else {
                        to_string(e).to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(",");
            Rc::from(joined)
        }
        Value::Object(_) | Value::Node(_) => Rc::from("[object Object]"),
        Value::Function(f) => match f.kind {
            FunctionKind::Class(_) => Rc::from(format!("class {} {{ }}", f.name)),
            _ => Rc::from(format!("function {}() {{ [native code] }}", f.name)),
        },
    }
}

/// `ToIntegerOrInfinity`.
pub fn to_integer(value: &Value<'_>) -> f64 {
    let n = to_number(value);
    if n.is_nan() { 0.0 } else { n.trunc() }
}

/// `ToInt32`: modulo 2^32, then reinterpreted as signed.
pub fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

/// `ToUint32`.
pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    const TWO_32: f64 = 4_294_967_296.0;
    let int = n.trunc().rem_euclid(TWO_32);
    int as u32
}

/// Loose equality (`==`) for values whose conversion needs no user code.
pub fn loose_equals<'a>(a: &Value<'a>, b: &Value<'a>) -> bool {
    match (a, b) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
        (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
        (Value::Number(x), Value::String(s)) | (Value::String(s), Value::Number(x)) => {
            *x == string_to_number(s)
        }
        (Value::Bool(_), _) => loose_equals(&Value::Number(to_number(a)), b),
        (_, Value::Bool(_)) => loose_equals(a, &Value::Number(to_number(b))),
        (
            Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Node(_),
            Value::Number(_) | Value::String(_),
        ) => loose_equals(&Value::String(to_string(a)), b),
        (
            Value::Number(_) | Value::String(_),
            Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Node(_),
        ) => loose_equals(a, &Value::String(to_string(b))),
        _ => a.strict_equals(b),
    }
}

/// Compares strings by UTF-16 code units, as relational operators do.
pub fn compare_strings(a: &str, b: &str) -> core::cmp::Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

/// Converts a property key to an array index, if it is one.
pub fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<usize>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_number_to_string() {
        assert_eq!(number_to_string(1.0), "1");
        assert_eq!(number_to_string(-2.5), "-2.5");
        assert_eq!(number_to_string(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(1.5e-7), "1.5e-7");
        assert_eq!(number_to_string(123456789.0), "123456789");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_string_to_number() {
        assert_eq!(string_to_number("  42 "), 42.0);
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("0x1F"), 31.0);
        assert_eq!(string_to_number("1e3"), 1000.0);
        assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
        assert!(string_to_number("12px").is_nan());
        assert!(string_to_number("inf").is_nan());
        assert!(string_to_number("nan").is_nan());
    }

    #[test]
    fn test_to_boolean() {
        assert!(!to_boolean(&Value::from("")));
        assert!(to_boolean(&Value::from("0")));
        assert!(!to_boolean(&Value::Number(f64::NAN)));
        assert!(!to_boolean(&Value::Number(-0.0)));
        assert!(to_boolean(&Value::array(vec![])));
    }

    #[test]
    fn test_to_string_arrays() {
        let arr = Value::array(vec![Value::from(1), Value::Null, Value::from("x")]);
        assert_eq!(&*to_string(&arr), "1,,x");
        assert_eq!(to_number(&Value::array(vec![Value::from("7")])), 7.0);
    }

    #[test]
    fn test_int32_conversions() {
        assert_eq!(to_int32(4294967295.0), -1);
        assert_eq!(to_int32(2147483648.0), -2147483648);
        assert_eq!(to_uint32(-1.0), 4294967295);
        assert_eq!(to_int32(f64::NAN), 0);
        assert_eq!(to_int32(-5.7), -5);
    }

    #[test]
    fn test_loose_equals() {
        assert!(loose_equals(&Value::Null, &Value::Undefined));
        assert!(loose_equals(&Value::from(1), &Value::from("1")));
        assert!(loose_equals(&Value::Bool(true), &Value::from(1)));
        assert!(loose_equals(&Value::Bool(false), &Value::from("")));
        assert!(!loose_equals(&Value::Null, &Value::from(0)));
        assert!(loose_equals(&Value::array(vec![Value::from(2)]), &Value::from(2)));
        assert!(!loose_equals(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
    }

    #[test]
    fn test_array_index() {
        assert_eq!(array_index("0"), Some(0));
        assert_eq!(array_index("12"), Some(12));
        assert_eq!(array_index("01"), None);
        assert_eq!(array_index("-1"), None);
        assert_eq!(array_index("length"), None);
    }
}
