//! Callable values.
//!
//! A [`Function`] is one of:
//! - a closure over a parsed function or arrow body and its defining scope chain,
//! - a native Rust function (intrinsics and host-supplied globals),
//! - a class, referencing its descriptor in the context's class arena,
//! - a bound function produced by `Function.prototype.bind`.

use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::Rc;

use crate::ast::FunctionDef;
use crate::evaluator::{Context, EvalError};
use crate::scope_stack::Frame;
use crate::values::{Bindings, PropertyMap, Value};

/// Signature for native functions callable from evaluated code.
///
/// Receives the context, the receiver (`this`) and the evaluated arguments.
///
/// # Example
///
/// ```ignore
/// let twice = Function::native("twice", |_ctx, _this, args| {
///     let n = args.first().map(coerce::to_number).unwrap_or(f64::NAN);
///     Ok(Value::Number(n * 2.0))
/// });
/// ```
pub type NativeFn<'a> =
    dyn Fn(&mut Context<'a>, &Value<'a>, &[Value<'a>]) -> Result<Value<'a>, EvalError<'a>> + 'a;

/// Index of a class descriptor in the context's class arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(pub(crate) usize);

pub struct Function<'a> {
    pub kind: FunctionKind<'a>,
    pub name: Rc<str>,
    /// Own properties; statics for classes.
    pub properties: RefCell<PropertyMap<'a>>,
    /// Created by a program while user-defined functions were allowed.
    admitted: Cell<bool>,
}

pub enum FunctionKind<'a> {
    Closure(Closure<'a>),
    Native(NativeFunction<'a>),
    Class(ClassId),
    Bound(BoundFunction<'a>),
}

pub struct Closure<'a> {
    pub def: &'a FunctionDef<'a>,
    /// Scope chain the function was created in.
    pub scope: Rc<Frame<'a>>,
    /// Override bindings in effect when the function was created.
    pub bindings: Bindings<'a>,
    /// Lexical `this` (arrows only).
    pub this: Option<Value<'a>>,
    /// Class the function was defined in, for `super` lookups.
    pub home: Option<ClassId>,
}

pub struct NativeFunction<'a> {
    pub func: Rc<NativeFn<'a>>,
    /// Intrinsics bypass the call whitelist.
    pub intrinsic: bool,
}

pub struct BoundFunction<'a> {
    pub target: Rc<Function<'a>>,
    pub this: Value<'a>,
    pub args: Vec<Value<'a>>,
}

impl<'a> Function<'a> {
    fn with_kind(name: impl Into<Rc<str>>, kind: FunctionKind<'a>) -> Self {
        Self {
            kind,
            name: name.into(),
            properties: RefCell::new(PropertyMap::new()),
            admitted: Cell::new(false),
        }
    }

    /// Exempts this function from the whitelist.
    pub(crate) fn admit(&self) {
        self.admitted.set(true);
    }

    pub fn is_admitted(&self) -> bool {
        self.admitted.get()
    }

    /// A host-supplied native function. Subject to the whitelist.
    pub fn native<F>(name: impl Into<Rc<str>>, func: F) -> Self
    where
        F: Fn(&mut Context<'a>, &Value<'a>, &[Value<'a>]) -> Result<Value<'a>, EvalError<'a>> + 'a,
    {
        Self::with_kind(
            name,
            FunctionKind::Native(NativeFunction {
                func: Rc::new(func),
                intrinsic: false,
            }),
        )
    }

    /// A built-in native function, always callable.
    pub fn intrinsic<F>(name: impl Into<Rc<str>>, func: F) -> Self
    where
        F: Fn(&mut Context<'a>, &Value<'a>, &[Value<'a>]) -> Result<Value<'a>, EvalError<'a>> + 'a,
    {
        Self::with_kind(
            name,
            FunctionKind::Native(NativeFunction {
                func: Rc::new(func),
                intrinsic: true,
            }),
        )
    }

    pub fn closure(closure: Closure<'a>) -> Self {
        let name = closure.def.id.unwrap_or("");
        Self::with_kind(name, FunctionKind::Closure(closure))
    }

    pub fn class(name: impl Into<Rc<str>>, id: ClassId) -> Self {
        Self::with_kind(name, FunctionKind::Class(id))
    }

    pub fn bound(target: Rc<Function<'a>>, this: Value<'a>, args: Vec<Value<'a>>) -> Self {
        let name = format!("bound {}", target.name);
        Self::with_kind(name, FunctionKind::Bound(BoundFunction { target, this, args }))
    }

    pub fn is_intrinsic(&self) -> bool {
        matches!(&self.kind, FunctionKind::Native(n) if n.intrinsic)
    }

    pub fn is_arrow(&self) -> bool {
        matches!(&self.kind, FunctionKind::Closure(c) if c.def.is_arrow)
    }

    pub fn class_id(&self) -> Option<ClassId> {
        match self.kind {
            FunctionKind::Class(id) => Some(id),
            _ => None,
        }
    }

    /// Declared parameter count, as reported by `length`.
    pub fn arity(&self) -> usize {
        match &self.kind {
            FunctionKind::Closure(c) => c.def.params.len(),
            FunctionKind::Bound(b) => b.target.arity().saturating_sub(b.args.len()),
            _ => 0,
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "(anonymous)"
        } else {
            &self.name
        }
    }
}

impl<'a> fmt::Debug for Function<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            FunctionKind::Closure(c) if c.def.is_arrow => "arrow",
            FunctionKind::Closure(_) => "function",
            FunctionKind::Native(_) => "native",
            FunctionKind::Class(_) => "class",
            FunctionKind::Bound(_) => "bound",
        };
        write!(f, "Function({} {})", kind, self.display_name())
    }
}
