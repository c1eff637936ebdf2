//! Built-in library.
//!
//! Two kinds of built-ins live here:
//! - method tables consulted by property lookup when a value has no own
//!   property of that name (`[1, 2].map`, `"a".padStart`, `f.bind`),
//! - global bindings installed into every fresh [`Context`]
//!   (`Math`, `Object`, `JSON`, `console`, error constructors, ...).
//!
//! Every built-in is an intrinsic [`Function`] and is therefore callable even
//! when a whitelist is active. Callbacks passed to intrinsics (`map`, `sort`,
//! `replace`) are invoked directly and bypass the whitelist check that plain
//! call expressions perform.

use hashbrown::HashMap;

use crate::evaluator::{Context, EvalError};
use crate::values::{Function, Value};

pub mod array;
pub mod global;
pub mod math;
pub mod number;
pub mod object;
pub mod string;

#[cfg(test)]
mod array_test;
#[cfg(test)]
mod string_test;

pub(crate) type NativeResult<'a> = Result<Value<'a>, EvalError<'a>>;

type Table<'a> = HashMap<&'static str, Value<'a>>;

/// Upper bound on lengths of arrays and strings built by intrinsics.
pub(crate) const MAX_LENGTH: usize = 1 << 24;

/// Method tables for the built-in value types.
pub struct Intrinsics<'a> {
    array: Table<'a>,
    string: Table<'a>,
    number: Table<'a>,
    function: Table<'a>,
    object: Table<'a>,
}

impl<'a> Intrinsics<'a> {
    pub fn new() -> Self {
        Self {
            array: array::methods().into_iter().collect(),
            string: string::methods().into_iter().collect(),
            number: number::methods().into_iter().collect(),
            function: object::function_methods().into_iter().collect(),
            object: object::methods().into_iter().collect(),
        }
    }

    pub fn array(&self, key: &str) -> Option<Value<'a>> {
        self.array.get(key).cloned()
    }

    pub fn string(&self, key: &str) -> Option<Value<'a>> {
        self.string.get(key).cloned()
    }

    pub fn number(&self, key: &str) -> Option<Value<'a>> {
        self.number.get(key).cloned()
    }

    pub fn function(&self, key: &str) -> Option<Value<'a>> {
        self.function.get(key).cloned()
    }

    pub fn object(&self, key: &str) -> Option<Value<'a>> {
        self.object.get(key).cloned()
    }
}

impl<'a> Default for Intrinsics<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Installs the global built-ins into `ctx`.
pub fn install_globals(ctx: &mut Context<'_>) {
    for (name, value) in global::globals() {
        ctx.define_global(name, value);
    }
    ctx.define_global("Math", math::package());
}

/// Wraps a native function as a named intrinsic entry.
pub(crate) fn intrinsic<'a, F>(name: &'static str, func: F) -> (&'static str, Value<'a>)
where
    F: Fn(&mut Context<'a>, &Value<'a>, &[Value<'a>]) -> NativeResult<'a> + 'a,
{
    (name, Value::function(Function::intrinsic(name, func)))
}

/// Argument `index`, or `undefined` when absent.
pub(crate) fn arg<'a>(args: &[Value<'a>], index: usize) -> Value<'a> {
    args.get(index).cloned().unwrap_or_default()
}

/// Resolves a relative index (negative counts from the end) clamped to
/// `0..=len`, as `slice` and friends do.
pub(crate) fn relative_index(value: &Value<'_>, len: usize, default: usize) -> usize {
    if value.is_undefined() {
        return default;
    }
    let n = crate::values::coerce::to_integer(value);
    let len_f = len as f64;
    if n < 0.0 {
        (len_f + n).max(0.0) as usize
    } else {
        n.min(len_f) as usize
    }
}

/// Throws `new <name>(message)`.
pub(crate) fn throw<'a, T>(ctx: &Context<'a>, name: &str, message: &str) -> Result<T, EvalError<'a>> {
    Err(EvalError::thrown(ctx.make_error(name, message)))
}
