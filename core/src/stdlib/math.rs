//! Math Package
//!
//! Constants: PI, E
//! Functions: abs, floor, ceil, round, trunc, sign, max, min, pow, sqrt

use crate::evaluator::Context;
use crate::stdlib::{NativeResult, arg, intrinsic};
use crate::values::{Value, coerce::to_number};

/// Builds the `Math` object.
pub(crate) fn package<'a>() -> Value<'a> {
    let mut entries = vec![
        ("PI", Value::Number(core::f64::consts::PI)),
        ("E", Value::Number(core::f64::consts::E)),
    ];
    entries.extend([
        intrinsic("abs", |ctx, _this, args| unary(ctx, args, f64::abs)),
        intrinsic("floor", |ctx, _this, args| unary(ctx, args, f64::floor)),
        intrinsic("ceil", |ctx, _this, args| unary(ctx, args, f64::ceil)),
        intrinsic("round", |ctx, _this, args| unary(ctx, args, js_round)),
        intrinsic("trunc", |ctx, _this, args| unary(ctx, args, f64::trunc)),
        intrinsic("sign", |ctx, _this, args| unary(ctx, args, js_sign)),
        intrinsic("sqrt", |ctx, _this, args| unary(ctx, args, f64::sqrt)),
        intrinsic("pow", math_pow),
        intrinsic("max", |ctx, _this, args| extremum(ctx, args, f64::NEG_INFINITY, f64::max)),
        intrinsic("min", |ctx, _this, args| extremum(ctx, args, f64::INFINITY, f64::min)),
    ]);
    Value::from_entries(entries)
}

// ============================================================================
// Basic Operations
// ============================================================================

fn number_arg<'a>(ctx: &mut Context<'a>, args: &[Value<'a>], index: usize) -> Result<f64, crate::evaluator::EvalError<'a>> {
    let value = ctx.to_primitive(&arg(args, index))?;
    Ok(to_number(&value))
}

fn unary<'a>(ctx: &mut Context<'a>, args: &[Value<'a>], op: fn(f64) -> f64) -> NativeResult<'a> {
    let x = number_arg(ctx, args, 0)?;
    Ok(Value::Number(op(x)))
}

/// Rounds half-way cases towards positive infinity: `round(-2.5) == -2`.
fn js_round(x: f64) -> f64 {
    if !x.is_finite() || x.fract() == 0.0 {
        return x;
    }
    let floor = x.floor();
    if x - floor >= 0.5 { floor + 1.0 } else { floor }
}

/// Preserves the sign of zero and propagates NaN.
fn js_sign(x: f64) -> f64 {
    if x.is_nan() || x == 0.0 {
        x
    } else {
        x.signum()
    }
}

// ============================================================================
// Exponentiation
// ============================================================================

fn math_pow<'a>(ctx: &mut Context<'a>, _this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let base = number_arg(ctx, args, 0)?;
    let exponent = number_arg(ctx, args, 1)?;
    Ok(Value::Number(crate::evaluator::pow(base, exponent)))
}

// ============================================================================
// Comparison
// ============================================================================

/// `max`/`min`: any NaN argument makes the result NaN.
fn extremum<'a>(
    ctx: &mut Context<'a>,
    args: &[Value<'a>],
    initial: f64,
    pick: fn(f64, f64) -> f64,
) -> NativeResult<'a> {
    let mut result = initial;
    for index in 0..args.len() {
        let x = number_arg(ctx, args, index)?;
        if x.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        result = pick(result, x);
    }
    Ok(Value::Number(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_round() {
        assert_eq!(js_round(2.5), 3.0);
        assert_eq!(js_round(-2.5), -2.0);
        assert_eq!(js_round(-2.6), -3.0);
        assert_eq!(js_round(1.0), 1.0);
        assert!(js_round(f64::NAN).is_nan());
    }

    #[test]
    fn test_js_sign() {
        assert_eq!(js_sign(-3.0), -1.0);
        assert_eq!(js_sign(4.0), 1.0);
        assert!(js_sign(-0.0).is_sign_negative());
        assert!(js_sign(f64::NAN).is_nan());
    }
}
