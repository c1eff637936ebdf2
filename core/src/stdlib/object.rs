//! Methods shared by every object, function methods, and the `Object` global.

use crate::evaluator::{Context, EvalError};
use crate::stdlib::{NativeResult, arg, intrinsic};
use crate::values::{
    Function, Property, PropertyMap, Value,
    coerce::{array_index, to_boolean},
};

pub(crate) fn methods<'a>() -> Vec<(&'static str, Value<'a>)> {
    vec![
        intrinsic("hasOwnProperty", object_has_own_property),
        intrinsic("toString", object_to_string),
    ]
}

pub(crate) fn function_methods<'a>() -> Vec<(&'static str, Value<'a>)> {
    vec![
        intrinsic("call", function_call),
        intrinsic("apply", function_apply),
        intrinsic("bind", function_bind),
    ]
}

/// Installs `entries` as non-enumerable own properties of `function`.
pub(crate) fn add_statics<'a>(function: &Value<'a>, entries: Vec<(&'static str, Value<'a>)>) {
    if let Value::Function(function) = function {
        let mut properties = function.properties.borrow_mut();
        for (name, value) in entries {
            properties.insert(name, Property::hidden(value));
        }
    }
}

// ============================================================================
// Instance methods
// ============================================================================

fn object_has_own_property<'a>(
    ctx: &mut Context<'a>,
    this: &Value<'a>,
    args: &[Value<'a>],
) -> NativeResult<'a> {
    let key = ctx.to_property_key(&arg(args, 0))?;
    let own = match this {
        Value::Object(object) => object.borrow().properties.contains_key(&key),
        Value::Function(function) => function.properties.borrow().contains_key(&key),
        Value::Array(elements) => {
            &*key == "length" || array_index(&key).is_some_and(|i| i < elements.borrow().len())
        }
        Value::String(s) => {
            &*key == "length" || array_index(&key).is_some_and(|i| i < s.chars().count())
        }
        Value::Undefined | Value::Null => {
            return Err(EvalError::type_error(
                "Cannot convert undefined or null to object",
            ));
        }
        _ => false,
    };
    Ok(Value::Bool(own))
}

fn object_to_string<'a>(_ctx: &mut Context<'a>, this: &Value<'a>, _args: &[Value<'a>]) -> NativeResult<'a> {
    let tag = match this {
        Value::Undefined => "Undefined",
        Value::Null => "Null",
        Value::Array(_) => "Array",
        Value::Function(_) => "Function",
        Value::String(_) => "String",
        Value::Number(_) => "Number",
        Value::Bool(_) => "Boolean",
        Value::Object(object) => {
            let object = object.borrow();
            match &object.constructor {
                Some(constructor) if constructor.is_intrinsic() && constructor.name.ends_with("Error") => {
                    "Error"
                }
                _ => "Object",
            }
        }
        Value::Node(_) => "Object",
    };
    Ok(Value::from(format!("[object {}]", tag)))
}

// ============================================================================
// Function methods
// ============================================================================

fn this_function<'a>(
    this: &Value<'a>,
    method: &str,
) -> Result<std::rc::Rc<Function<'a>>, EvalError<'a>> {
    match this {
        Value::Function(function) => Ok(function.clone()),
        _ => Err(EvalError::type_error(format!(
            "Function.prototype.{} called on non-function",
            method
        ))),
    }
}

fn function_call<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let function = this_function(this, "call")?;
    let receiver = arg(args, 0);
    let rest = args.get(1..).unwrap_or_default();
    ctx.call_function(&function, receiver, rest)
}

fn function_apply<'a>(ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let function = this_function(this, "apply")?;
    let receiver = arg(args, 0);
    let arguments = match arg(args, 1) {
        Value::Undefined | Value::Null => Vec::new(),
        Value::Array(elements) => elements.borrow().clone(),
        _ => {
            return Err(EvalError::type_error(
                "CreateListFromArrayLike called on non-object",
            ));
        }
    };
    ctx.call_function(&function, receiver, &arguments)
}

fn function_bind<'a>(_ctx: &mut Context<'a>, this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let function = this_function(this, "bind")?;
    let receiver = arg(args, 0);
    let bound = args.get(1..).unwrap_or_default().to_vec();
    Ok(Value::function(Function::bound(function, receiver, bound)))
}

// ============================================================================
// Object global
// ============================================================================

/// `Object(...)` with `keys`, `values`, `entries` and `assign`.
pub(crate) fn constructor<'a>() -> Value<'a> {
    let (_, object) = intrinsic("Object", |_ctx, _this, args| match arg(args, 0) {
        Value::Undefined | Value::Null => Ok(Value::object(PropertyMap::new())),
        // Primitives are not boxed.
        other => Ok(other),
    });
    add_statics(
        &object,
        vec![
            intrinsic("keys", object_keys),
            intrinsic("values", object_values),
            intrinsic("entries", object_entries),
            intrinsic("assign", object_assign),
        ],
    );
    object
}

fn require_object<'a>(value: &Value<'a>) -> Result<(), EvalError<'a>> {
    if value.is_nullish() {
        return Err(EvalError::type_error(
            "Cannot convert undefined or null to object",
        ));
    }
    Ok(())
}

fn object_keys<'a>(ctx: &mut Context<'a>, _this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let target = arg(args, 0);
    require_object(&target)?;
    let keys = ctx
        .own_enumerable_keys(&target)
        .into_iter()
        .map(Value::from)
        .collect();
    Ok(Value::array(keys))
}

fn object_values<'a>(ctx: &mut Context<'a>, _this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let target = arg(args, 0);
    require_object(&target)?;
    let mut values = Vec::new();
    for key in ctx.own_enumerable_keys(&target) {
        values.push(ctx.get_property(&target, &key)?);
    }
    Ok(Value::array(values))
}

fn object_entries<'a>(ctx: &mut Context<'a>, _this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let target = arg(args, 0);
    require_object(&target)?;
    let mut entries = Vec::new();
    for key in ctx.own_enumerable_keys(&target) {
        let value = ctx.get_property(&target, &key)?;
        entries.push(Value::array(vec![Value::from(key), value]));
    }
    Ok(Value::array(entries))
}

/// Copies own enumerable properties of each source onto the target through
/// its setters, left to right.
fn object_assign<'a>(ctx: &mut Context<'a>, _this: &Value<'a>, args: &[Value<'a>]) -> NativeResult<'a> {
    let target = arg(args, 0);
    require_object(&target)?;
    for source in args.iter().skip(1) {
        let mut copied = PropertyMap::new();
        ctx.copy_own_properties(source, &mut copied)?;
        for (key, property) in copied.iter() {
            if let Some(value) = property.data_value() {
                ctx.set_property(&target, key, value.clone())?;
            }
        }
    }
    Ok(target)
}

/// `Boolean(...)`.
pub(crate) fn boolean_constructor<'a>() -> Value<'a> {
    intrinsic("Boolean", |_ctx, _this, args| {
        Ok(Value::Bool(to_boolean(&arg(args, 0))))
    })
    .1
}
