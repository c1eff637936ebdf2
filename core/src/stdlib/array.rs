//! Array methods.
//!
//! Callback methods iterate over a snapshot of the elements taken when the
//! method is called, so callbacks that mutate the array cannot invalidate the
//! iteration.

use core::cell::RefCell;
use core::cmp::Ordering;
use std::rc::Rc;

use crate::evaluator::{Context, EvalError};
use crate::stdlib::{MAX_LENGTH, NativeResult, arg, intrinsic, relative_index};
use crate::values::{
    Value,
    coerce::{compare_strings, to_boolean, to_integer, to_number},
};

type Elements<'a> = Rc<RefCell<Vec<Value<'a>>>>;

pub(crate) fn methods<'a>() -> Vec<(&'static str, Value<'a>)> {
    vec![
        intrinsic("push", array_push),
        intrinsic("pop", array_pop),
        intrinsic("shift", array_shift),
        intrinsic("unshift", array_unshift),
        intrinsic("slice", array_slice),
        intrinsic("splice", array_splice),
        intrinsic("concat", array_concat),
        intrinsic("join", array_join),
        intrinsic("toString", array_to_string),
        intrinsic("indexOf", array_index_of),
        intrinsic("includes", array_includes),
        intrinsic("map", array_map),
        intrinsic("filter", array_filter),
        intrinsic("forEach", array_for_each),
        intrinsic("reduce", array_reduce),
        intrinsic("find", array_find),
        intrinsic("findIndex", array_find_index),
        intrinsic("some", array_some),
        intrinsic("every", array_every),
        intrinsic("reverse", array_reverse),
        intrinsic("sort", array_sort),
        intrinsic("flat", array_flat),
        intrinsic("at", array_at),
    ]
}

fn this_array<'a>(this: &Value<'a>, method: &str) -> Result<Elements<'a>, EvalError<'a>> {
    match this {
        Value::Array(elements) => Ok(elements.clone()),
        _ => Err(EvalError::type_error(format!(
            "Array.prototype.{} called on non-array",
            method
        ))),
    }
}

fn snapshot<'a>(elements: &Elements<'a>) -> Vec<Value<'a>> {
    elements.borrow().clone()
}

// ============================================================================
// Mutators
// ============================================================================

fn array_push<'a>(_ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let elements = this_array(this, "push")?;
    let mut elements = elements.borrow_mut();
    elements.extend(args.iter().cloned());
    Ok(Value::from(elements.len()))
}

fn array_pop<'a>(_ctx: &mut Context<'a>, this: &Value<'a>, _args: &[Value<'a>]) -> NativeResult<'a> {
    let elements = this_array(this, "pop")?;
    let popped = elements.borrow_mut().pop();
    Ok(popped.unwrap_or_default())
}

fn array_shift<'a>(_ctx: &mut Context<'a>, this: &Value<'a>, _args: &[Value<'a>]) -> NativeResult<'a> {
    let elements = this_array(this, "shift")?;
    let mut elements = elements.borrow_mut();
    if elements.is_empty() {
        return Ok(Value::Undefined);
    }
    Ok(elements.remove(0))
}

fn array_unshift<'a>(_ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let elements = this_array(this, "unshift")?;
    let mut elements = elements.borrow_mut();
    elements.splice(0..0, args.iter().cloned());
    Ok(Value::from(elements.len()))
}

fn array_splice<'a>(_ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let elements = this_array(this, "splice")?;
    let mut elements = elements.borrow_mut();
    let len = elements.len();
    if args.is_empty() {
        return Ok(Value::array(Vec::new()));
    }
    let start = relative_index(&args[0], len, 0);
    let delete_count = match args.get(1) {
        None => len - start,
        Some(count) => (to_integer(count).max(0.0) as usize).min(len - start),
    };
    let inserted = args.iter().skip(2).cloned();
    let removed: Vec<_> = elements.splice(start..start + delete_count, inserted).collect();
    Ok(Value::array(removed))
}

fn array_reverse<'a>(_ctx: &mut Context<'a>, this: &Value<'a>, _args: &[Value<'a>]) -> NativeResult<'a> {
    let elements = this_array(this, "reverse")?;
    elements.borrow_mut().reverse();
    Ok(this.clone())
}

/// Sorts in place. `undefined` elements always sort last; without a
/// comparator the rest compare by their string forms.
fn array_sort<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let elements = this_array(this, "sort")?;
    let comparator = arg(args, 0);
    if !comparator.is_undefined() && !comparator.is_callable() {
        return Err(EvalError::type_error(
            "The comparison function must be either a function or undefined",
        ));
    }

    let (defined, undefined): (Vec<_>, Vec<_>) =
        snapshot(&elements).into_iter().partition(|v| !v.is_undefined());

    let mut sorted = if comparator.is_undefined() {
        let mut keyed = Vec::with_capacity(defined.len());
        for value in defined {
            keyed.push((ctx.to_string_value(&value)?, value));
        }
        keyed.sort_by(|(a, _), (b, _)| compare_strings(a, b));
        keyed.into_iter().map(|(_, v)| v).collect()
    } else {
        merge_sort(defined, &mut |a, b| {
            let result = ctx.call_value(&comparator, Value::Undefined, &[a.clone(), b.clone()])?;
            let n = to_number(&result);
            Ok(if n < 0.0 {
                Ordering::Less
            } else if n > 0.0 {
                Ordering::Greater
            } else {
                Ordering::Equal
            })
        })?
    };
    sorted.extend(undefined);
    *elements.borrow_mut() = sorted;
    Ok(this.clone())
}

/// Stable merge sort with a comparator that may fail.
fn merge_sort<'a, F>(mut items: Vec<Value<'a>>, compare: &mut F) -> Result<Vec<Value<'a>>, EvalError<'a>>
where
    F: FnMut(&Value<'a>, &Value<'a>) -> Result<Ordering, EvalError<'a>>,
{
    if items.len() <= 1 {
        return Ok(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, compare)?;
    let right = merge_sort(right, compare)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(l, r)? == Ordering::Greater,
            _ => break,
        };
        if take_right {
            merged.extend(right.next());
        } else {
            merged.extend(left.next());
        }
    }
    merged.extend(left);
    merged.extend(right);
    Ok(merged)
}

// ============================================================================
// Accessors
// ============================================================================

fn array_slice<'a>(_ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let elements = this_array(this, "slice")?;
    let elements = elements.borrow();
    let len = elements.len();
    let start = relative_index(&arg(args, 0), len, 0);
    let end = relative_index(&arg(args, 1), len, len);
    let slice = if start < end {
        elements[start..end].to_vec()
    } else {
        Vec::new()
    };
    Ok(Value::array(slice))
}

fn array_concat<'a>(_ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let mut result = snapshot(&this_array(this, "concat")?);
    for value in args {
        match value {
            Value::Array(other) => result.extend(other.borrow().iter().cloned()),
            other => result.push(other.clone()),
        }
    }
    Ok(Value::array(result))
}

fn array_join<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let elements = snapshot(&this_array(this, "join")?);
    let separator = match args.first() {
        None | Some(Value::Undefined) => Rc::from(","),
        Some(sep) => ctx.to_string_value(sep)?,
    };
    let mut out = String::new();
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            out.push_str(&separator);
        }
        if !element.is_nullish() {
            out.push_str(&ctx.to_string_value(element)?);
        }
    }
    Ok(Value::from(out))
}

fn array_to_string<'a>(ctx: &mut Context<'a>, this: &Value<'a>, _args: &[Value<'a>]) -> NativeResult<'a> {
    array_join(ctx, this, &[])
}

fn array_index_of<'a>(_ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let elements = this_array(this, "indexOf")?;
    let elements = elements.borrow();
    let needle = arg(args, 0);
    let from = relative_index(&arg(args, 1), elements.len(), 0);
    let found = elements
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, v)| v.strict_equals(&needle))
        .map(|(i, _)| i as f64)
        .unwrap_or(-1.0);
    Ok(Value::Number(found))
}

fn array_includes<'a>(_ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let elements = this_array(this, "includes")?;
    let elements = elements.borrow();
    let needle = arg(args, 0);
    let from = relative_index(&arg(args, 1), elements.len(), 0);
    Ok(Value::Bool(
        elements.iter().skip(from).any(|v| v.same_value_zero(&needle)),
    ))
}

fn array_flat<'a>(_ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let elements = snapshot(&this_array(this, "flat")?);
    let depth = match args.first() {
        None | Some(Value::Undefined) => 1.0,
        Some(depth) => to_integer(depth),
    };
    let mut out = Vec::new();
    flatten_into(&elements, depth, &mut out);
    Ok(Value::array(out))
}

fn flatten_into<'a>(elements: &[Value<'a>], depth: f64, out: &mut Vec<Value<'a>>) {
    for element in elements {
        match element {
            Value::Array(inner) if depth >= 1.0 => {
                let inner = inner.borrow().clone();
                flatten_into(&inner, depth - 1.0, out);
            }
            other => out.push(other.clone()),
        }
    }
}

fn array_at<'a>(_ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let elements = this_array(this, "at")?;
    let elements = elements.borrow();
    let n = to_integer(&arg(args, 0));
    let index = if n < 0.0 { elements.len() as f64 + n } else { n };
    if index < 0.0 {
        return Ok(Value::Undefined);
    }
    Ok(elements.get(index as usize).cloned().unwrap_or_default())
}

// ============================================================================
// Iteration
// ============================================================================

/// Calls `callback(element, index, array)` for each snapshotted element until
/// `visit` returns `Some`.
fn each<'a, T>(
    ctx: &mut Context<'a>,
    this: &Value<'a>,
    args: &[Value<'a>],
    method: &str,
    mut visit: impl FnMut(usize, &Value<'a>, Value<'a>) -> Option<T>,
) -> Result<Option<T>, EvalError<'a>> {
    let elements = snapshot(&this_array(this, method)?);
    let callback = arg(args, 0);
    if !callback.is_callable() {
        return Err(EvalError::type_error(format!(
            "{} is not a function",
            crate::values::coerce::to_string(&callback)
        )));
    }
    let this_arg = arg(args, 1);
    for (index, element) in elements.iter().enumerate() {
        let result = ctx.call_value(
            &callback,
            this_arg.clone(),
            &[element.clone(), Value::from(index), this.clone()],
        )?;
        if let Some(done) = visit(index, element, result) {
            return Ok(Some(done));
        }
    }
    Ok(None)
}

fn array_map<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let mut out = Vec::new();
    each(ctx, this, args, "map", |_, _, result| {
        out.push(result);
        None::<()>
    })?;
    Ok(Value::array(out))
}

fn array_filter<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let mut out = Vec::new();
    each(ctx, this, args, "filter", |_, element, result| {
        if to_boolean(&result) {
            out.push(element.clone());
        }
        None::<()>
    })?;
    Ok(Value::array(out))
}

fn array_for_each<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    each(ctx, this, args, "forEach", |_, _, _| None::<()>)?;
    Ok(Value::Undefined)
}

fn array_find<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let found = each(ctx, this, args, "find", |_, element, result| {
        to_boolean(&result).then(|| element.clone())
    })?;
    Ok(found.unwrap_or_default())
}

fn array_find_index<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let found = each(ctx, this, args, "findIndex", |index, _, result| {
        to_boolean(&result).then_some(index as f64)
    })?;
    Ok(Value::Number(found.unwrap_or(-1.0)))
}

fn array_some<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let found = each(ctx, this, args, "some", |_, _, result| to_boolean(&result).then_some(()))?;
    Ok(Value::Bool(found.is_some()))
}

fn array_every<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let failed = each(ctx, this, args, "every", |_, _, result| (!to_boolean(&result)).then_some(()))?;
    Ok(Value::Bool(failed.is_none()))
}

fn array_reduce<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let elements = snapshot(&this_array(this, "reduce")?);
    let callback = arg(args, 0);
    if !callback.is_callable() {
        return Err(EvalError::type_error(format!(
            "{} is not a function",
            crate::values::coerce::to_string(&callback)
        )));
    }
    let mut items = elements.into_iter().enumerate();
    let mut accumulator = match args.get(1) {
        Some(initial) => initial.clone(),
        None => match items.next() {
            Some((_, first)) => first,
            None => {
                return Err(EvalError::type_error(
                    "Reduce of empty array with no initial value",
                ));
            }
        },
    };
    for (index, element) in items {
        accumulator = ctx.call_value(
            &callback,
            Value::Undefined,
            &[accumulator, element, Value::from(index), this.clone()],
        )?;
    }
    Ok(accumulator)
}

/// `Array(...)` and `Array.isArray`.
pub(crate) fn constructor<'a>() -> Value<'a> {
    let (_, array) = intrinsic("Array", |ctx: &mut Context<'a>, _this: &Value<'a>, args: &[Value<'a>]| {
        match args {
            [Value::Number(n)] => {
                if n.fract() != 0.0 || *n < 0.0 || *n > MAX_LENGTH as f64 {
                    return crate::stdlib::throw(ctx, "RangeError", "Invalid array length");
                }
                Ok(Value::array(vec![Value::Undefined; *n as usize]))
            }
            _ => Ok(Value::array(args.to_vec())),
        }
    });
    crate::stdlib::object::add_statics(
        &array,
        vec![
            intrinsic("isArray", |_ctx, _this, args| {
                Ok(Value::Bool(matches!(arg(args, 0), Value::Array(_))))
            }),
            intrinsic("from", array_from),
            intrinsic("of", |_ctx, _this, args| Ok(Value::array(args.to_vec()))),
        ],
    );
    array
}

fn array_from<'a>(ctx: &mut Context<'a>, _this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let source = arg(args, 0);
    let items = match &source {
        Value::Undefined | Value::Null => {
            return Err(EvalError::type_error(format!("{} is not iterable", source)));
        }
        Value::Array(_) | Value::String(_) => ctx.iterate(&source)?,
        _ => {
            let length = ctx.get_property(&source, "length")?;
            let length = to_integer(&length).max(0.0);
            if length > MAX_LENGTH as f64 {
                return crate::stdlib::throw(ctx, "RangeError", "Invalid array length");
            }
            let length = length as usize;
            let mut items = Vec::with_capacity(length);
            for index in 0..length {
                items.push(ctx.get_property(&source, &index.to_string())?);
            }
            items
        }
    };
    let mapper = arg(args, 1);
    if mapper.is_undefined() {
        return Ok(Value::array(items));
    }
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        out.push(ctx.call_value(&mapper, Value::Undefined, &[item, Value::from(index)])?);
    }
    Ok(Value::array(out))
}
