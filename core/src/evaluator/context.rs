//! Evaluation state shared by every node of a program run.

use core::ops::{Deref, DerefMut};
use std::rc::Rc;
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use tracing::debug;

use crate::api::EvaluateOptions;
use crate::ast::DeclarationKind;
use crate::evaluator::{ClassDescriptor, EvalError, ErrorKind, KeyGenerator};
use crate::scope_stack::{Frame, ScopeError, Variable};
use crate::stdlib::{self, Intrinsics};
use crate::values::{ClassId, Function, FunctionKind, Object, Property, PropertyMap, Value};

/// Time source for debug timings.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Scope chain, receiver stack, export table and configuration for one
/// evaluation. A renderer keeps the context alive to invoke thunks later.
pub struct Context<'a> {
    options: EvaluateOptions,
    /// Innermost frame.
    scope: Rc<Frame<'a>>,
    /// Frame holding intrinsics and host globals.
    global: Rc<Frame<'a>>,
    receivers: Vec<Value<'a>>,
    exports: HashMap<Rc<str>, Value<'a>>,
    keys: KeyGenerator,
    /// Label of the labeled statement about to run, consumed by the next loop.
    pub(crate) label: Option<&'a str>,
    allowed: Option<Vec<Rc<Function<'a>>>>,
    classes: Vec<ClassDescriptor<'a>>,
    intrinsics: Rc<Intrinsics<'a>>,
    call_depth: usize,
    clock: Rc<dyn Clock>,
}

impl<'a> Context<'a> {
    pub fn new(options: EvaluateOptions) -> Self {
        ContextBuilder::new().options(options).build()
    }

    pub fn builder() -> ContextBuilder<'a> {
        ContextBuilder::new()
    }

    pub fn options(&self) -> &EvaluateOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut EvaluateOptions {
        &mut self.options
    }

    // ------------------------------------------------------------------
    // Scope and receiver stacks
    // ------------------------------------------------------------------

    /// Pushes a fresh frame and `receiver`. Both are popped when the returned
    /// guard drops, on every exit path.
    pub fn push_stack(&mut self, receiver: Value<'a>) -> ScopedContext<'_, 'a> {
        let saved = self.scope.clone();
        self.scope = Frame::child(&saved);
        let receivers = self.receivers.len();
        self.receivers.push(receiver);
        ScopedContext {
            ctx: self,
            saved_scope: Some(saved),
            receivers,
        }
    }

    /// Pushes a fresh frame without changing the receiver.
    pub fn push_scope(&mut self) -> ScopedContext<'_, 'a> {
        let saved = self.scope.clone();
        self.scope = Frame::child(&saved);
        let receivers = self.receivers.len();
        ScopedContext {
            ctx: self,
            saved_scope: Some(saved),
            receivers,
        }
    }

    /// Re-enters a captured scope chain (closure call, thunk invocation) with a
    /// fresh frame on top.
    pub fn enter_scope(
        &mut self,
        captured: &Rc<Frame<'a>>,
        receiver: Value<'a>,
        home: Option<ClassId>,
    ) -> ScopedContext<'_, 'a> {
        let saved = core::mem::replace(&mut self.scope, Frame::child_with_home(captured, home));
        let receivers = self.receivers.len();
        self.receivers.push(receiver);
        ScopedContext {
            ctx: self,
            saved_scope: Some(saved),
            receivers,
        }
    }

    /// Pushes only a receiver, as member reads do around the property access.
    pub fn push_receiver(&mut self, receiver: Value<'a>) -> ScopedContext<'_, 'a> {
        let receivers = self.receivers.len();
        self.receivers.push(receiver);
        ScopedContext {
            ctx: self,
            saved_scope: None,
            receivers,
        }
    }

    fn pop_stack(&mut self, saved_scope: Option<Rc<Frame<'a>>>, receivers: usize) {
        if let Some(scope) = saved_scope {
            self.scope = scope;
        }
        self.receivers.truncate(receivers);
    }

    /// Innermost receiver; `undefined` at top level.
    pub fn resolve_this(&self) -> Value<'a> {
        self.receivers.last().cloned().unwrap_or(Value::Undefined)
    }

    pub fn resolve_identifier(&self, name: &str) -> Option<Variable<'a>> {
        self.scope.lookup(name)
    }

    pub fn scope(&self) -> &Rc<Frame<'a>> {
        &self.scope
    }

    pub fn receiver_depth(&self) -> usize {
        self.receivers.len()
    }

    /// Declares `name` in the innermost frame.
    pub fn declare(
        &mut self,
        name: &str,
        value: Value<'a>,
        kind: DeclarationKind,
    ) -> Result<(), EvalError<'a>> {
        self.scope
            .declare(name, value, kind)
            .map_err(scope_error)
    }

    /// Assigns to the nearest existing binding of `name`.
    pub fn assign(&mut self, name: &str, value: Value<'a>) -> Result<(), EvalError<'a>> {
        self.scope.assign(name, value).map_err(scope_error)
    }

    /// Defines (or replaces) a global binding visible to all frames.
    pub fn define_global(&mut self, name: &str, value: Value<'a>) {
        // Globals are `var` bindings, so redefinition cannot fail.
        let _ = self.global.declare(name, value, DeclarationKind::Var);
    }

    // ------------------------------------------------------------------
    // Exports
    // ------------------------------------------------------------------

    pub fn exports(&self) -> &HashMap<Rc<str>, Value<'a>> {
        &self.exports
    }

    pub fn export(&self, name: &str) -> Option<&Value<'a>> {
        self.exports.get(name)
    }

    pub(crate) fn set_export(&mut self, name: &str, value: Value<'a>) {
        debug!(name, "export");
        self.exports.insert(Rc::from(name), value);
    }

    // ------------------------------------------------------------------
    // Keys, classes, whitelist
    // ------------------------------------------------------------------

    pub fn key_generator(&mut self) -> &mut KeyGenerator {
        &mut self.keys
    }

    pub fn class(&self, id: ClassId) -> &ClassDescriptor<'a> {
        &self.classes[id.0]
    }

    pub(crate) fn class_mut(&mut self, id: ClassId) -> &mut ClassDescriptor<'a> {
        &mut self.classes[id.0]
    }

    pub(crate) fn add_class(&mut self, descriptor: ClassDescriptor<'a>) -> ClassId {
        self.classes.push(descriptor);
        ClassId(self.classes.len() - 1)
    }

    /// Whether `class` is `ancestor` or derives from it.
    pub fn class_derives_from(&self, class: ClassId, ancestor: ClassId) -> bool {
        let mut current = Some(class);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.class(id).parent;
        }
        false
    }

    pub fn has_allowed_functions(&self) -> bool {
        self.allowed.is_some()
    }

    /// Whether a call expression may invoke `function`.
    pub fn is_allowed(&self, function: &Rc<Function<'a>>) -> bool {
        let Some(allowed) = &self.allowed else {
            return true;
        };
        match &function.kind {
            FunctionKind::Native(native) if native.intrinsic => true,
            FunctionKind::Bound(bound) => self.is_allowed(&bound.target),
            _ => function.is_admitted() || allowed.iter().any(|f| Rc::ptr_eq(f, function)),
        }
    }

    /// Number of host functions on the whitelist, if one is active.
    pub fn allowed_count(&self) -> Option<usize> {
        self.allowed.as_ref().map(Vec::len)
    }

    /// Admits a function created by the program when user-defined functions
    /// are allowed and a whitelist is active. The mark lives on the function,
    /// so the whitelist itself never grows.
    pub(crate) fn admit(&self, function: &Function<'a>) {
        if self.options.allow_user_defined_function && self.allowed.is_some() {
            function.admit();
        }
    }

    pub(crate) fn intrinsics(&self) -> Rc<Intrinsics<'a>> {
        self.intrinsics.clone()
    }

    // ------------------------------------------------------------------
    // Call depth
    // ------------------------------------------------------------------

    pub(crate) fn enter_call(&mut self) -> Result<(), EvalError<'a>> {
        if self.call_depth >= self.options.max_call_depth {
            return Err(EvalError::new(ErrorKind::StackOverflow {
                depth: self.call_depth + 1,
                max_depth: self.options.max_call_depth,
            }));
        }
        self.call_depth += 1;
        Ok(())
    }

    pub(crate) fn leave_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    // ------------------------------------------------------------------
    // Errors as values
    // ------------------------------------------------------------------

    /// Builds an error object as `new <name>(message)` would.
    pub fn make_error(&self, name: &str, message: &str) -> Value<'a> {
        let mut properties = PropertyMap::new();
        properties.insert("name", Property::hidden(Value::from(name)));
        properties.insert("message", Property::hidden(Value::from(message)));
        let constructor = self
            .global
            .lookup(name)
            .and_then(|var| var.value.as_function().cloned());
        let object = Object {
            properties,
            class: None,
            constructor,
        };
        Value::Object(Rc::new(core::cell::RefCell::new(object)))
    }

    /// The value a `catch` clause binds for a catchable error.
    pub fn error_value(&self, error: EvalError<'a>) -> Value<'a> {
        match error.kind {
            ErrorKind::Thrown(value) => value,
            ref kind => self.make_error(kind.category(), &kind.to_string()),
        }
    }

    // ------------------------------------------------------------------
    // Timing
    // ------------------------------------------------------------------

    /// Runs `f`, logging its duration at debug level when `debug` is set.
    pub fn timed<T>(&mut self, label: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        if !self.options.debug {
            return f(self);
        }
        let clock = self.clock.clone();
        let start = clock.now();
        let result = f(self);
        let elapsed: Duration = clock.now().saturating_duration_since(start);
        debug!(label, elapsed_us = elapsed.as_micros() as u64, "timing");
        result
    }

    pub fn clock(&self) -> &dyn Clock {
        &*self.clock
    }
}

fn scope_error<'a>(err: ScopeError) -> EvalError<'a> {
    match err {
        ScopeError::AlreadyDeclared(_) => EvalError::structural(err.to_string()),
        ScopeError::ConstAssignment(_) => EvalError::type_error(err.to_string()),
        ScopeError::NotDefined(name) => EvalError::reference(name),
    }
}

/// Restores the scope and receiver stacks of a [`Context`] when dropped.
///
/// Dereferences to the context, so evaluation continues through the guard:
///
/// ```ignore
/// let mut scope = ctx.push_stack(this);
/// scope.declare("x", value, DeclarationKind::Let)?;
/// scope.exec_block(body, bindings)
/// ```
pub struct ScopedContext<'c, 'a> {
    ctx: &'c mut Context<'a>,
    saved_scope: Option<Rc<Frame<'a>>>,
    receivers: usize,
}

impl<'c, 'a> Deref for ScopedContext<'c, 'a> {
    type Target = Context<'a>;

    fn deref(&self) -> &Context<'a> {
        self.ctx
    }
}

impl<'c, 'a> DerefMut for ScopedContext<'c, 'a> {
    fn deref_mut(&mut self) -> &mut Context<'a> {
        self.ctx
    }
}

impl<'c, 'a> Drop for ScopedContext<'c, 'a> {
    fn drop(&mut self) {
        let saved = self.saved_scope.take();
        self.ctx.pop_stack(saved, self.receivers);
    }
}

/// Builds a [`Context`] with host-supplied globals and an optional whitelist.
///
/// # Example
///
/// ```ignore
/// let greet = Value::function(Function::native("greet", |_, _, _| Ok("hi".into())));
/// let ctx = Context::builder()
///     .global("greet", greet.clone())
///     .allowed_functions([greet])
///     .build();
/// ```
pub struct ContextBuilder<'a> {
    options: EvaluateOptions,
    globals: Vec<(Rc<str>, Value<'a>)>,
    allowed: Option<Vec<Rc<Function<'a>>>>,
    clock: Option<Rc<dyn Clock>>,
}

impl<'a> Default for ContextBuilder<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ContextBuilder<'a> {
    pub fn new() -> Self {
        Self {
            options: EvaluateOptions::default(),
            globals: Vec::new(),
            allowed: None,
            clock: None,
        }
    }

    pub fn options(mut self, options: EvaluateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn global(mut self, name: impl Into<Rc<str>>, value: Value<'a>) -> Self {
        self.globals.push((name.into(), value));
        self
    }

    pub fn globals<K, I>(mut self, globals: I) -> Self
    where
        K: Into<Rc<str>>,
        I: IntoIterator<Item = (K, Value<'a>)>,
    {
        self.globals
            .extend(globals.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Activates the whitelist. Non-function values are ignored.
    pub fn allowed_functions<I>(mut self, functions: I) -> Self
    where
        I: IntoIterator<Item = Value<'a>>,
    {
        let allowed = self.allowed.get_or_insert_with(Vec::new);
        allowed.extend(
            functions
                .into_iter()
                .filter_map(|v| v.as_function().cloned()),
        );
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Rc::new(clock));
        self
    }

    pub fn build(self) -> Context<'a> {
        let global = Frame::root();
        let mut ctx = Context {
            options: self.options,
            scope: Frame::child(&global),
            global,
            receivers: Vec::new(),
            exports: HashMap::new(),
            keys: KeyGenerator::new(),
            label: None,
            allowed: self.allowed,
            classes: Vec::new(),
            intrinsics: Rc::new(Intrinsics::new()),
            call_depth: 0,
            clock: self.clock.unwrap_or_else(|| Rc::new(SystemClock)),
        };
        stdlib::install_globals(&mut ctx);
        for (name, value) in self.globals {
            ctx.define_global(&name, value);
        }
        ctx
    }
}
