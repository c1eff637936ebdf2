//! Number methods and the `Number(...)` conversion function.

use crate::evaluator::{Context, EvalError};
use crate::stdlib::{NativeResult, arg, intrinsic, object::add_statics, throw};
use crate::values::{
    Value,
    coerce::{number_to_string, to_integer, to_number},
};

pub(crate) fn methods<'a>() -> Vec<(&'static str, Value<'a>)> {
    vec![
        intrinsic("toFixed", number_to_fixed),
        intrinsic("toString", number_to_string_method),
        intrinsic("valueOf", |_ctx, this, _| Ok(Value::Number(this_number(this)?))),
    ]
}

fn this_number<'a>(this: &Value<'a>) -> Result<f64, EvalError<'a>> {
    match this {
        Value::Number(n) => Ok(*n),
        _ => Err(EvalError::type_error("Number.prototype method called on non-number")),
    }
}

fn number_to_fixed<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let n = this_number(this)?;
    let digits = to_integer(&arg(args, 0));
    if !(0.0..=100.0).contains(&digits) {
        return throw(ctx, "RangeError", "toFixed() digits argument must be between 0 and 100");
    }
    if !n.is_finite() || n.abs() >= 1e21 {
        return Ok(Value::from(number_to_string(n)));
    }
    Ok(Value::from(format!("{:.*}", digits as usize, n)))
}

fn number_to_string_method<'a>(
    ctx: &mut Context<'a>,
    this: &Value<'a>,
    args: &[Value<'a>],
) -> NativeResult<'a> {
    let n = this_number(this)?;
    let radix = match args.first() {
        None | Some(Value::Undefined) => 10.0,
        Some(radix) => to_integer(radix),
    };
    if !(2.0..=36.0).contains(&radix) {
        return throw(ctx, "RangeError", "toString() radix must be between 2 and 36");
    }
    if radix == 10.0 || !n.is_finite() {
        return Ok(Value::from(number_to_string(n)));
    }
    Ok(Value::from(to_radix(n, radix as u32)))
}

/// Formats `n` in `radix`, with up to 20 fractional digits.
fn to_radix(n: f64, radix: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let negative = n < 0.0;
    let n = n.abs();
    let mut int = n.trunc();
    let mut frac = n - int;

    let mut digits = Vec::new();
    if int == 0.0 {
        digits.push(b'0');
    }
    while int >= 1.0 {
        let digit = (int % radix as f64) as usize;
        digits.push(DIGITS[digit]);
        int = (int / radix as f64).trunc();
    }
    digits.reverse();

    if frac > 0.0 {
        digits.push(b'.');
        for _ in 0..20 {
            frac *= radix as f64;
            let digit = frac.trunc() as usize;
            digits.push(DIGITS[digit.min(35)]);
            frac -= frac.trunc();
            if frac == 0.0 {
                break;
            }
        }
    }

    let mut out = String::from_utf8_lossy(&digits).into_owned();
    if negative {
        out.insert(0, '-');
    }
    out
}

/// `Number(...)` with `Number.isInteger`, `Number.isFinite`, `Number.isNaN`
/// and the numeric constants.
pub(crate) fn constructor<'a>() -> Value<'a> {
    let (_, number) = intrinsic("Number", |ctx, _this, args| match args.first() {
        None => Ok(Value::Number(0.0)),
        Some(value) => {
            let primitive = ctx.to_primitive(value)?;
            Ok(Value::Number(to_number(&primitive)))
        }
    });
    add_statics(
        &number,
        vec![
            intrinsic("isInteger", |_ctx, _this, args| {
                Ok(Value::Bool(matches!(
                    arg(args, 0),
                    Value::Number(n) if n.is_finite() && n.trunc() == n
                )))
            }),
            intrinsic("isFinite", |_ctx, _this, args| {
                Ok(Value::Bool(matches!(arg(args, 0), Value::Number(n) if n.is_finite())))
            }),
            intrinsic("isNaN", |_ctx, _this, args| {
                Ok(Value::Bool(matches!(arg(args, 0), Value::Number(n) if n.is_nan())))
            }),
            ("MAX_SAFE_INTEGER", Value::Number(9_007_199_254_740_991.0)),
            ("MIN_SAFE_INTEGER", Value::Number(-9_007_199_254_740_991.0)),
            ("EPSILON", Value::Number(f64::EPSILON)),
        ],
    );
    number
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_radix() {
        assert_eq!(to_radix(255.0, 16), "ff");
        assert_eq!(to_radix(-5.0, 2), "-101");
        assert_eq!(to_radix(0.5, 2), "0.1");
        assert_eq!(to_radix(0.0, 8), "0");
    }
}
