//! Function values: creation, invocation and construction.

use std::rc::Rc;

use tracing::trace;

use crate::ast::{DeclarationKind, FunctionBody, FunctionDef};
use crate::evaluator::{Completion, Context, EvalError, binding::describe_for_error};
use crate::stack::ensure_sufficient_stack;
use crate::values::{
    Bindings, ClassId, Closure, Function, FunctionKind, Object, Property, Value,
};

impl<'a> Context<'a> {
    /// Creates a closure over the current scope chain.
    ///
    /// Arrows capture the current `this`. Async and generator functions are
    /// rejected here, when they are created.
    pub(crate) fn make_closure(
        &mut self,
        def: &'a FunctionDef<'a>,
        bindings: &Bindings<'a>,
        home: Option<ClassId>,
    ) -> Result<Value<'a>, EvalError<'a>> {
        if def.is_async {
            return Err(EvalError::unsupported("async function"));
        }
        if def.is_generator {
            return Err(EvalError::unsupported("generator function"));
        }
        let this = def.is_arrow.then(|| self.resolve_this());
        let function = Rc::new(Function::closure(Closure {
            def,
            scope: self.scope().clone(),
            bindings: bindings.clone(),
            this,
            home,
        }));
        self.admit(&function);
        Ok(Value::Function(function))
    }

    /// Calls a value as a function. Used by intrinsics and accessors, which
    /// bypass the whitelist.
    pub fn call_value(
        &mut self,
        callee: &Value<'a>,
        this: Value<'a>,
        args: &[Value<'a>],
    ) -> Result<Value<'a>, EvalError<'a>> {
        match callee {
            Value::Function(function) => self.call_function(function, this, args),
            other => Err(EvalError::not_callable(describe_for_error(other))),
        }
    }

    /// Invokes `function`, bounded by `max_call_depth`.
    pub fn call_function(
        &mut self,
        function: &Rc<Function<'a>>,
        this: Value<'a>,
        args: &[Value<'a>],
    ) -> Result<Value<'a>, EvalError<'a>> {
        self.enter_call()?;
        let result = ensure_sufficient_stack(|| self.call_function_inner(function, this, args));
        self.leave_call();
        result
    }

    fn call_function_inner(
        &mut self,
        function: &Rc<Function<'a>>,
        this: Value<'a>,
        args: &[Value<'a>],
    ) -> Result<Value<'a>, EvalError<'a>> {
        trace!(name = %function.display_name(), depth = self.call_depth(), "call");
        match &function.kind {
            FunctionKind::Closure(closure) => self.invoke_closure(closure, this, args),
            FunctionKind::Native(native) => {
                let func = native.func.clone();
                func(self, &this, args)
            }
            FunctionKind::Class(_) => Err(EvalError::type_error(format!(
                "Class constructor {} cannot be invoked without 'new'",
                function.display_name()
            ))),
            FunctionKind::Bound(bound) => {
                let mut all = bound.args.clone();
                all.extend_from_slice(args);
                self.call_function_inner(&bound.target, bound.this.clone(), &all)
            }
        }
    }

    fn invoke_closure(
        &mut self,
        closure: &Closure<'a>,
        this: Value<'a>,
        args: &[Value<'a>],
    ) -> Result<Value<'a>, EvalError<'a>> {
        let receiver = closure.this.clone().unwrap_or(this);
        let def = closure.def;
        let bindings = &closure.bindings;

        let mut scope = self.enter_scope(&closure.scope, receiver, closure.home);
        if !def.is_arrow {
            scope.declare("arguments", Value::array(args.to_vec()), DeclarationKind::Var)?;
        }
        scope.bind_parameters(def, args, bindings)?;

        match def.body {
            FunctionBody::Expression(expr) => scope.eval_expr(expr, bindings),
            FunctionBody::Block(body) => match scope.exec_statements(body, bindings)? {
                Completion::Return(value) => Ok(value),
                _ => Ok(Value::Undefined),
            },
        }
    }

    fn bind_parameters(
        &mut self,
        def: &'a FunctionDef<'a>,
        args: &[Value<'a>],
        bindings: &Bindings<'a>,
    ) -> Result<(), EvalError<'a>> {
        for (i, param) in def.params.iter().enumerate() {
            let binding = self.resolve_pattern(param, bindings)?;
            let value = args.get(i).cloned().unwrap_or_default();
            self.set_binding(&binding, value, Some(DeclarationKind::Var), bindings)?;
        }
        if let Some(rest) = def.rest {
            let binding = self.resolve_pattern(rest, bindings)?;
            let remaining = args.get(def.params.len()..).unwrap_or_default().to_vec();
            self.set_binding(&binding, Value::array(remaining), Some(DeclarationKind::Var), bindings)?;
        }
        Ok(())
    }

    /// `new callee(...args)`.
    pub fn construct(
        &mut self,
        callee: &Value<'a>,
        args: &[Value<'a>],
        name: &str,
    ) -> Result<Value<'a>, EvalError<'a>> {
        let Value::Function(function) = callee else {
            return Err(EvalError::type_error(format!("{} is not a constructor", name)));
        };
        self.enter_call()?;
        let result = self.construct_inner(function, args, name);
        self.leave_call();
        result
    }

    fn construct_inner(
        &mut self,
        function: &Rc<Function<'a>>,
        args: &[Value<'a>],
        name: &str,
    ) -> Result<Value<'a>, EvalError<'a>> {
        match &function.kind {
            FunctionKind::Class(id) => {
                let instance = Value::Object(Rc::new(core::cell::RefCell::new(
                    Object::instance_of(*id),
                )));
                match self.run_constructor(*id, &instance, args)? {
                    Some(returned) => Ok(returned),
                    None => Ok(instance),
                }
            }
            FunctionKind::Closure(closure) if !closure.def.is_arrow => {
                let mut object = Object::default();
                object.constructor = Some(function.clone());
                let instance = Value::Object(Rc::new(core::cell::RefCell::new(object)));
                let returned = self.call_function_inner(function, instance.clone(), args)?;
                Ok(if is_object_like(&returned) {
                    returned
                } else {
                    instance
                })
            }
            FunctionKind::Native(_) => {
                let returned = self.call_function_inner(function, Value::Undefined, args)?;
                if let Value::Object(object) = &returned {
                    let mut object = object.borrow_mut();
                    if object.constructor.is_none() && object.class.is_none() {
                        object.constructor = Some(function.clone());
                    }
                }
                Ok(returned)
            }
            FunctionKind::Bound(bound) => {
                let mut all = bound.args.clone();
                all.extend_from_slice(args);
                self.construct_inner(&bound.target, &all, name)
            }
            FunctionKind::Closure(_) => {
                Err(EvalError::type_error(format!("{} is not a constructor", name)))
            }
        }
    }

    /// Runs the constructor chain of `class` against an allocated instance.
    /// Returns the object an explicit constructor returned, if any.
    pub(crate) fn run_constructor(
        &mut self,
        class: ClassId,
        this: &Value<'a>,
        args: &[Value<'a>],
    ) -> Result<Option<Value<'a>>, EvalError<'a>> {
        let descriptor = self.class(class);
        let constructor = descriptor.constructor.clone();
        let parent = descriptor.parent;
        let super_value = descriptor.super_value.clone();

        if let Some(constructor) = constructor {
            let mut scope = self.push_stack(this.clone());
            let returned = scope.call_function_inner(&constructor, this.clone(), args)?;
            return Ok(is_object_like(&returned).then_some(returned));
        }
        if let Some(parent) = parent {
            return self.run_constructor(parent, this, args);
        }
        if let Some(Value::Function(parent)) = super_value {
            self.call_function_inner(&parent, this.clone(), args)?;
        }
        Ok(None)
    }

    /// `super(...args)` inside a constructor.
    pub(crate) fn super_call(&mut self, args: &[Value<'a>]) -> Result<Value<'a>, EvalError<'a>> {
        let Some(home) = self.scope().home() else {
            return Err(EvalError::structural("'super' keyword unexpected here"));
        };
        let this = self.resolve_this();
        let descriptor = self.class(home);
        let parent = descriptor.parent;
        let super_value = descriptor.super_value.clone();
        match (parent, super_value) {
            (Some(parent), _) => {
                self.run_constructor(parent, &this, args)?;
            }
            (None, Some(Value::Function(parent))) => {
                self.call_function(&parent, this, args)?;
            }
            _ => {
                return Err(EvalError::type_error("Super constructor is not a constructor"));
            }
        }
        Ok(Value::Undefined)
    }

    /// `super.key`: the parent's prototype member for instances, the parent's
    /// static member when `this` is the class itself.
    pub(crate) fn super_member(&mut self, key: &str) -> Result<Value<'a>, EvalError<'a>> {
        let Some(home) = self.scope().home() else {
            return Err(EvalError::structural("'super' keyword unexpected here"));
        };
        let this = self.resolve_this();
        let descriptor = self.class(home);
        let parent = descriptor.parent;
        let Some(super_value) = descriptor.super_value.clone() else {
            return Ok(Value::Undefined);
        };

        let is_static = this
            .as_function()
            .and_then(|f| f.class_id())
            .is_some_and(|id| id == home);
        if is_static {
            return self.get_property(&super_value, key);
        }
        match parent.and_then(|id| self.find_in_class(id, key)) {
            Some(Property::Data { value, .. }) => Ok(value),
            Some(Property::Accessor { get: Some(getter), .. }) => {
                self.call_value(&getter, this, &[])
            }
            Some(Property::Accessor { get: None, .. }) => Ok(Value::Undefined),
            None => Ok(self.intrinsics().object(key).unwrap_or_default()),
        }
    }
}

fn is_object_like(value: &Value<'_>) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_) | Value::Function(_))
}
