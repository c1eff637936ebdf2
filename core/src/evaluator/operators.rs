//! Binary and unary operator implementations on already-converted primitives.
//!
//! Operators that may run user code (`+` on objects, `in`, `instanceof`) are
//! resolved on the context first and only reach here with primitives.

use core::cmp::Ordering;

use crate::ast::{BinaryOp, UnaryOp};
use crate::values::{
    Value,
    coerce::{compare_strings, loose_equals, to_boolean, to_int32, to_number, to_string, to_uint32},
};

/// `+` on primitives: concatenation if either side is a string.
pub(super) fn add<'a>(left: &Value<'a>, right: &Value<'a>) -> Value<'a> {
    match (left, right) {
        (Value::String(_), _) | (_, Value::String(_)) => {
            let mut s = String::from(&*to_string(left));
            s.push_str(&to_string(right));
            Value::from(s)
        }
        _ => Value::Number(to_number(left) + to_number(right)),
    }
}

/// Evaluate a binary operation on two numbers.
///
/// Follows IEEE 754 semantics (produces Infinity/NaN rather than failing).
pub(super) fn eval_binary_number(op: BinaryOp, left: f64, right: f64) -> f64 {
    match op {
        BinaryOp::Add => left + right,
        BinaryOp::Sub => left - right,
        BinaryOp::Mul => left * right,
        BinaryOp::Div => left / right,
        BinaryOp::Rem => left % right,
        BinaryOp::Pow => pow(left, right),
        BinaryOp::Shl => to_int32(left).wrapping_shl(to_uint32(right) & 31) as f64,
        BinaryOp::Shr => (to_int32(left) >> (to_uint32(right) & 31)) as f64,
        BinaryOp::UShr => (to_uint32(left) >> (to_uint32(right) & 31)) as f64,
        BinaryOp::BitAnd => (to_int32(left) & to_int32(right)) as f64,
        BinaryOp::BitOr => (to_int32(left) | to_int32(right)) as f64,
        BinaryOp::BitXor => (to_int32(left) ^ to_int32(right)) as f64,
        _ => f64::NAN,
    }
}

/// `**`. Unlike `powf`, `1 ** NaN` and `(±1) ** ±Infinity` are NaN.
pub(crate) fn pow(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

/// Relational comparison; `None` when either side is NaN.
pub(super) fn compare<'a>(left: &Value<'a>, right: &Value<'a>) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(compare_strings(a, b)),
        _ => to_number(left).partial_cmp(&to_number(right)),
    }
}

/// Every binary operator except `+`, `in` and `instanceof`.
pub(super) fn eval_binary<'a>(op: BinaryOp, left: &Value<'a>, right: &Value<'a>) -> Value<'a> {
    match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Eq => Value::Bool(loose_equals(left, right)),
        BinaryOp::NotEq => Value::Bool(!loose_equals(left, right)),
        BinaryOp::StrictEq => Value::Bool(left.strict_equals(right)),
        BinaryOp::StrictNotEq => Value::Bool(!left.strict_equals(right)),
        BinaryOp::Lt => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinaryOp::Gt => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinaryOp::LtEq => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::GtEq => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::In | BinaryOp::InstanceOf => Value::Bool(false),
        _ => Value::Number(eval_binary_number(op, to_number(left), to_number(right))),
    }
}

/// Every unary operator except `delete`, which needs a reference.
pub(super) fn eval_unary<'a>(op: UnaryOp, value: &Value<'a>) -> Value<'a> {
    match op {
        UnaryOp::Minus => Value::Number(-to_number(value)),
        UnaryOp::Plus => Value::Number(to_number(value)),
        UnaryOp::Not => Value::Bool(!to_boolean(value)),
        UnaryOp::BitNot => Value::Number(!to_int32(to_number(value)) as f64),
        UnaryOp::TypeOf => Value::from(value.type_of()),
        UnaryOp::Void | UnaryOp::Delete => Value::Undefined,
    }
}
