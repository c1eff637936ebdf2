//! Expression evaluation.

use std::rc::Rc;

use tracing::trace;

use crate::ast::{
    Argument, ArrayElement, AssignOp, BinaryOp, DeclarationKind, Expr, ExprKind, Literal, LogicalOp, MemberProperty,
    ObjectMember, Pattern, Position, PropertyKey, PropertyKind, TemplateElement, TemplateLiteral,
    UnaryOp, UpdateOp,
};
use crate::evaluator::{Binding, Context, EvalError, operators};
use crate::stack::ensure_sufficient_stack;
use crate::stdlib::{MAX_LENGTH, throw};
use crate::values::{
    Bindings, Function, Property, PropertyMap, Value,
    coerce::{to_boolean, to_number},
};

impl<'a> Context<'a> {
    /// Evaluates an expression node against the override `bindings`.
    ///
    /// Errors are annotated with the node's location and kind on the way out.
    /// Member and call nodes are annotated by [`Self::eval_chain`] instead.
    pub fn eval_expr(
        &mut self,
        expr: &'a Expr<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Value<'a>, EvalError<'a>> {
        let result = ensure_sufficient_stack(|| self.eval_expr_inner(expr, bindings));
        if is_chain_link(&expr.kind) {
            return result;
        }
        result.map_err(|e| e.at(&expr.loc, expr_kind_name(&expr.kind)))
    }

    fn eval_expr_inner(
        &mut self,
        expr: &'a Expr<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Value<'a>, EvalError<'a>> {
        match expr.kind {
            ExprKind::Literal(literal) => Ok(match literal {
                Literal::Null => Value::Null,
                Literal::Bool(b) => Value::Bool(b),
                Literal::Number(n) => Value::Number(n),
                Literal::String(s) => Value::from(s),
            }),
            ExprKind::Identifier(name) => self.eval_identifier(name, bindings),
            ExprKind::This => Ok(self.resolve_this()),
            ExprKind::Super => Err(EvalError::structural("'super' keyword unexpected here")),
            ExprKind::Array(elements) => self.eval_array(elements, bindings),
            ExprKind::Object(members) => self.eval_object(members, bindings),
            ExprKind::Function(def) => match def.id {
                // A named function expression sees its own name.
                Some(name) => {
                    let mut scope = self.push_scope();
                    let function = scope.make_closure(def, bindings, None)?;
                    scope.declare(name, function.clone(), DeclarationKind::Var)?;
                    Ok(function)
                }
                None => self.make_closure(def, bindings, None),
            },
            ExprKind::ArrowFunction(def) => self.make_closure(def, bindings, None),
            ExprKind::Class(def) => self.build_class(def, bindings),
            ExprKind::TemplateLiteral(template) => self.eval_template(template, bindings),
            ExprKind::TaggedTemplate { tag, quasi } => self.eval_tagged_template(tag, quasi, bindings),
            ExprKind::Unary { op, argument } => self.eval_unary(op, argument, bindings),
            ExprKind::Update {
                op,
                prefix,
                argument,
            } => self.eval_update(op, prefix, argument, bindings),
            ExprKind::Binary { op, left, right } => {
                let left = self.eval_expr(left, bindings)?;
                let right = self.eval_expr(right, bindings)?;
                self.binary(op, &left, &right)
            }
            ExprKind::Logical { op, left, right } => {
                let left = self.eval_expr(left, bindings)?;
                if short_circuits(op, &left) {
                    return Ok(left);
                }
                self.eval_expr(right, bindings)
            }
            ExprKind::Assignment { op, target, value } => {
                self.eval_assignment(op, target, value, bindings)
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if to_boolean(&self.eval_expr(test, bindings)?) {
                    self.eval_expr(consequent, bindings)
                } else {
                    self.eval_expr(alternate, bindings)
                }
            }
            ExprKind::Call { .. } | ExprKind::Member { .. } => {
                Ok(self.eval_chain(expr, bindings)?.unwrap_or_default())
            }
            ExprKind::Chain(inner) => Ok(self.eval_chain(inner, bindings)?.unwrap_or_default()),
            ExprKind::New { callee, arguments } => {
                if self.options().disable_call || self.options().disable_new {
                    return Ok(Value::Undefined);
                }
                let constructor = self.eval_expr(callee, bindings)?;
                let args = self.eval_arguments(arguments, bindings)?;
                self.construct(&constructor, &args, &callee_name(callee))
            }
            ExprKind::Sequence(expressions) => {
                let mut last = Value::Undefined;
                for expr in expressions {
                    last = self.eval_expr(expr, bindings)?;
                }
                Ok(last)
            }
            ExprKind::Await(_) => Err(EvalError::unsupported("await")),
            ExprKind::Yield(_) => Err(EvalError::unsupported("yield")),
            ExprKind::Import(_) => Err(EvalError::unsupported("import")),
            ExprKind::MetaProperty { .. } => Err(EvalError::unsupported("meta property")),
            ExprKind::JsxElement(element) => {
                let node = self.eval_jsx_element(element, bindings)?;
                Ok(Value::Node(Rc::new(node)))
            }
            ExprKind::JsxFragment(fragment) => {
                let node = self.eval_jsx_fragment(fragment, bindings)?;
                Ok(Value::Node(Rc::new(node)))
            }
        }
    }

    /// Override bindings first, then the scope chain.
    fn eval_identifier(&self, name: &str, bindings: &Bindings<'a>) -> Result<Value<'a>, EvalError<'a>> {
        if let Some(value) = self.lookup(name, bindings) {
            return Ok(value);
        }
        if self.options().raise_reference_error {
            return Err(EvalError::reference(name));
        }
        Ok(Value::Undefined)
    }

    pub(crate) fn lookup(&self, name: &str, bindings: &Bindings<'a>) -> Option<Value<'a>> {
        if let Some(value) = bindings.get(name) {
            return Some(value.clone());
        }
        self.resolve_identifier(name).map(|var| var.value)
    }

    pub(crate) fn eval_property_key(
        &mut self,
        key: &PropertyKey<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Rc<str>, EvalError<'a>> {
        match *key {
            PropertyKey::Static(name) => Ok(Rc::from(name)),
            PropertyKey::Private(name) => Ok(Rc::from(format!("#{}", name))),
            PropertyKey::Computed(expr) => {
                let key = self.eval_expr(expr, bindings)?;
                self.to_property_key(&key)
            }
        }
    }

    fn eval_array(
        &mut self,
        elements: &'a [ArrayElement<'a>],
        bindings: &Bindings<'a>,
    ) -> Result<Value<'a>, EvalError<'a>> {
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            match *element {
                ArrayElement::Expr(expr) => values.push(self.eval_expr(expr, bindings)?),
                ArrayElement::Spread(expr) => {
                    let value = self.eval_expr(expr, bindings)?;
                    values.extend(self.iterate(&value)?);
                }
                ArrayElement::Hole => values.push(Value::Undefined),
            }
        }
        Ok(Value::array(values))
    }

    fn eval_object(
        &mut self,
        members: &'a [ObjectMember<'a>],
        bindings: &Bindings<'a>,
    ) -> Result<Value<'a>, EvalError<'a>> {
        let mut properties = PropertyMap::new();
        for member in members {
            match member {
                ObjectMember::Property(property) => {
                    let key = self.eval_property_key(&property.key, bindings)?;
                    let value = match property.value.kind {
                        ExprKind::Function(def) if property.method || property.kind != PropertyKind::Init => {
                            self.make_closure(def, bindings, None)?
                        }
                        _ => self.eval_expr(property.value, bindings)?,
                    };
                    match property.kind {
                        PropertyKind::Init => properties.insert(key, Property::data(value)),
                        PropertyKind::Get | PropertyKind::Set => {
                            let (mut get, mut set) = match properties.get(&key) {
                                Some(Property::Accessor { get, set, .. }) => (get.clone(), set.clone()),
                                _ => (None, None),
                            };
                            if property.kind == PropertyKind::Get {
                                get = Some(value);
                            } else {
                                set = Some(value);
                            }
                            properties.insert(
                                key,
                                Property::Accessor {
                                    get,
                                    set,
                                    enumerable: true,
                                    configurable: true,
                                },
                            );
                        }
                    }
                }
                ObjectMember::Spread(expr) => {
                    let source = self.eval_expr(expr, bindings)?;
                    self.copy_own_properties(&source, &mut properties)?;
                }
                ObjectMember::CoverInitialized { .. } => {
                    return Err(EvalError::structural("Invalid shorthand property initializer"));
                }
            }
        }
        Ok(Value::object(properties))
    }

    /// Concatenates quasis and interpolations in source-position order.
    fn eval_template(
        &mut self,
        template: &'a TemplateLiteral<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Value<'a>, EvalError<'a>> {
        let mut out = String::new();
        for part in template_parts(template) {
            match part {
                TemplatePart::Quasi(quasi) => out.push_str(quasi.cooked),
                TemplatePart::Expr(expr) => {
                    let value = self.eval_expr(expr, bindings)?;
                    out.push_str(&self.to_string_value(&value)?);
                }
            }
        }
        Ok(Value::from(out))
    }

    fn eval_tagged_template(
        &mut self,
        tag: &'a Expr<'a>,
        quasi: &'a TemplateLiteral<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Value<'a>, EvalError<'a>> {
        if self.options().disable_call {
            return Ok(Value::Undefined);
        }
        let (this, function) = match self.eval_callee(tag, bindings)? {
            Some(callee) => callee,
            None => return Ok(Value::Undefined),
        };
        let function = self.check_callable(&function, tag)?;
        let mut args = Vec::with_capacity(quasi.expressions.len() + 1);
        args.push(Value::array(
            quasi.quasis.iter().map(|q| Value::from(q.cooked)).collect(),
        ));
        for expr in quasi.expressions {
            args.push(self.eval_expr(expr, bindings)?);
        }
        let mut scope = self.push_receiver(this.clone());
        scope.call_function(&function, this, &args)
    }

    fn eval_unary(
        &mut self,
        op: UnaryOp,
        argument: &'a Expr<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Value<'a>, EvalError<'a>> {
        match (op, &argument.kind) {
            (UnaryOp::TypeOf, ExprKind::Identifier(name)) => {
                let value = self.lookup(name, bindings).unwrap_or_default();
                Ok(Value::from(value.type_of()))
            }
            (UnaryOp::Delete, ExprKind::Member { object, property, .. }) => {
                let object = self.eval_expr(*object, bindings)?;
                let key = self.eval_member_key(property, bindings)?;
                Ok(Value::Bool(self.delete_property(&object, &key)?))
            }
            (UnaryOp::Delete, ExprKind::Chain(inner)) => self.eval_unary(op, *inner, bindings),
            (UnaryOp::Delete, ExprKind::Identifier(_)) => Ok(Value::Bool(false)),
            (UnaryOp::Delete, _) => {
                self.eval_expr(argument, bindings)?;
                Ok(Value::Bool(true))
            }
            (UnaryOp::Minus | UnaryOp::Plus | UnaryOp::BitNot, _) => {
                let value = self.eval_expr(argument, bindings)?;
                let value = self.to_primitive(&value)?;
                Ok(operators::eval_unary(op, &value))
            }
            _ => {
                let value = self.eval_expr(argument, bindings)?;
                Ok(operators::eval_unary(op, &value))
            }
        }
    }

    fn eval_update(
        &mut self,
        op: UpdateOp,
        prefix: bool,
        argument: &'a Expr<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Value<'a>, EvalError<'a>> {
        let target = self.resolve_simple_target(argument, bindings)?;
        let current = self.read_target(&target, bindings)?;
        let old = to_number(&self.to_primitive(&current)?);
        let new = match op {
            UpdateOp::Increment => old + 1.0,
            UpdateOp::Decrement => old - 1.0,
        };
        self.write_target(&target, Value::Number(new))?;
        Ok(Value::Number(if prefix { new } else { old }))
    }

    fn eval_assignment(
        &mut self,
        op: AssignOp,
        target: &'a Pattern<'a>,
        value: &'a Expr<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Value<'a>, EvalError<'a>> {
        let binding = self.resolve_pattern(target, bindings)?;
        match op {
            AssignOp::Assign => {
                let value = self.eval_expr(value, bindings)?;
                self.set_binding(&binding, value.clone(), None, bindings)?;
                Ok(value)
            }
            AssignOp::Compound(op) => {
                ensure_simple(&binding)?;
                let current = self.read_target(&binding, bindings)?;
                let right = self.eval_expr(value, bindings)?;
                let result = self.binary(op, &current, &right)?;
                self.write_target(&binding, result.clone())?;
                Ok(result)
            }
            AssignOp::Logical(op) => {
                ensure_simple(&binding)?;
                let current = self.read_target(&binding, bindings)?;
                if short_circuits(op, &current) {
                    return Ok(current);
                }
                let value = self.eval_expr(value, bindings)?;
                self.write_target(&binding, value.clone())?;
                Ok(value)
            }
        }
    }

    fn resolve_simple_target(
        &mut self,
        expr: &'a Expr<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Binding<'a>, EvalError<'a>> {
        match expr.kind {
            ExprKind::Identifier(name) => Ok(Binding::Identifier(name)),
            ExprKind::Member {
                object, property, ..
            } => {
                let object = match object.kind {
                    ExprKind::Super => self.resolve_this(),
                    _ => self.eval_expr(object, bindings)?,
                };
                let key = self.eval_member_key(&property, bindings)?;
                Ok(Binding::Member { object, key })
            }
            _ => Err(EvalError::structural(
                "Invalid left-hand side expression in update operation",
            )),
        }
    }

    fn read_target(&mut self, target: &Binding<'a>, bindings: &Bindings<'a>) -> Result<Value<'a>, EvalError<'a>> {
        match target {
            Binding::Identifier(name) => self
                .lookup(name, bindings)
                .ok_or_else(|| EvalError::reference(*name)),
            Binding::Member { object, key } => self.get_property(object, key),
            _ => Err(EvalError::structural("Invalid assignment target")),
        }
    }

    fn write_target(&mut self, target: &Binding<'a>, value: Value<'a>) -> Result<(), EvalError<'a>> {
        match target {
            Binding::Identifier(name) => self.assign(name, value),
            Binding::Member { object, key } => self.set_property(object, key, value),
            _ => Err(EvalError::structural("Invalid assignment target")),
        }
    }

    /// Binary operators, converting objects to primitives where the operator
    /// needs one.
    pub(crate) fn binary(
        &mut self,
        op: BinaryOp,
        left: &Value<'a>,
        right: &Value<'a>,
    ) -> Result<Value<'a>, EvalError<'a>> {
        match op {
            BinaryOp::In => {
                let key = self.to_property_key(left)?;
                Ok(Value::Bool(self.has_property(right, &key)?))
            }
            BinaryOp::InstanceOf => Ok(Value::Bool(self.instance_of(left, right)?)),
            BinaryOp::StrictEq | BinaryOp::StrictNotEq => {
                Ok(operators::eval_binary(op, left, right))
            }
            BinaryOp::Eq | BinaryOp::NotEq if is_reference(left) == is_reference(right) => {
                Ok(operators::eval_binary(op, left, right))
            }
            _ => {
                let left = self.to_primitive(left)?;
                let right = self.to_primitive(right)?;
                let result = operators::eval_binary(op, &left, &right);
                if result.as_str().is_some_and(|s| s.len() > MAX_LENGTH) {
                    return throw(self, "RangeError", "Invalid string length");
                }
                Ok(result)
            }
        }
    }

    /// Evaluates a member/call chain. `None` means an optional link
    /// short-circuited.
    fn eval_chain(
        &mut self,
        expr: &'a Expr<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Option<Value<'a>>, EvalError<'a>> {
        let result = self.eval_chain_inner(expr, bindings);
        if !is_chain_link(&expr.kind) && !matches!(expr.kind, ExprKind::Chain(_)) {
            // Anything else went through `eval_expr`, which annotated it.
            return result;
        }
        result.map_err(|e| e.at(&expr.loc, expr_kind_name(&expr.kind)))
    }

    fn eval_chain_inner(
        &mut self,
        expr: &'a Expr<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Option<Value<'a>>, EvalError<'a>> {
        match expr.kind {
            ExprKind::Member {
                object,
                property,
                optional,
            } => {
                if let ExprKind::Super = object.kind {
                    let key = self.eval_member_key(&property, bindings)?;
                    return self.super_member(&key).map(Some);
                }
                let Some(object) = self.eval_chain(object, bindings)? else {
                    return Ok(None);
                };
                if optional && object.is_nullish() {
                    return Ok(None);
                }
                let key = self.eval_member_key(&property, bindings)?;
                let mut scope = self.push_receiver(object.clone());
                scope.get_property(&object, &key).map(Some)
            }
            ExprKind::Call {
                callee,
                arguments,
                optional,
            } => {
                if self.options().disable_call {
                    return Ok(Some(Value::Undefined));
                }
                if let ExprKind::Super = callee.kind {
                    let args = self.eval_arguments(arguments, bindings)?;
                    return self.super_call(&args).map(Some);
                }
                let Some((this, function)) = self.eval_callee(callee, bindings)? else {
                    return Ok(None);
                };
                if optional && function.is_nullish() {
                    return Ok(None);
                }
                let function = self.check_callable(&function, callee)?;
                let args = self.eval_arguments(arguments, bindings)?;
                trace!(callee = %function.display_name(), args = args.len(), "call expression");
                let mut scope = self.push_receiver(this.clone());
                scope.call_function(&function, this, &args).map(Some)
            }
            ExprKind::Chain(inner) => Ok(Some(self.eval_chain(inner, bindings)?.unwrap_or_default())),
            _ => self.eval_expr(expr, bindings).map(Some),
        }
    }

    /// Resolves the receiver and the callee value of a call.
    fn eval_callee(
        &mut self,
        callee: &'a Expr<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Option<(Value<'a>, Value<'a>)>, EvalError<'a>> {
        match callee.kind {
            ExprKind::Member {
                object,
                property,
                optional,
            } => {
                if let ExprKind::Super = object.kind {
                    let key = self.eval_member_key(&property, bindings)?;
                    let function = self.super_member(&key)?;
                    return Ok(Some((self.resolve_this(), function)));
                }
                let Some(receiver) = self.eval_chain(object, bindings)? else {
                    return Ok(None);
                };
                if optional && receiver.is_nullish() {
                    return Ok(None);
                }
                let key = self.eval_member_key(&property, bindings)?;
                let function = {
                    let mut scope = self.push_receiver(receiver.clone());
                    scope.get_property(&receiver, &key)
                }
                .map_err(|e| e.at(&callee.loc, expr_kind_name(&callee.kind)))?;
                Ok(Some((receiver, function)))
            }
            _ => {
                let this = self.resolve_this();
                Ok(self.eval_chain(callee, bindings)?.map(|f| (this, f)))
            }
        }
    }

    /// Rejects non-callables and, when a whitelist is active, callees not on it.
    fn check_callable(
        &self,
        function: &Value<'a>,
        callee: &'a Expr<'a>,
    ) -> Result<Rc<Function<'a>>, EvalError<'a>> {
        let Value::Function(function) = function else {
            return Err(EvalError::not_callable(callee_name(callee)));
        };
        if !self.is_allowed(function) {
            return Err(EvalError::not_allowed(callee_name(callee)));
        }
        Ok(function.clone())
    }

    pub(crate) fn eval_arguments(
        &mut self,
        arguments: &'a [Argument<'a>],
        bindings: &Bindings<'a>,
    ) -> Result<Vec<Value<'a>>, EvalError<'a>> {
        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            match *argument {
                Argument::Expr(expr) => args.push(self.eval_expr(expr, bindings)?),
                Argument::Spread(expr) => {
                    let value = self.eval_expr(expr, bindings)?;
                    args.extend(self.iterate(&value)?);
                }
            }
        }
        Ok(args)
    }
}

fn short_circuits(op: LogicalOp, left: &Value<'_>) -> bool {
    match op {
        LogicalOp::And => !to_boolean(left),
        LogicalOp::Or => to_boolean(left),
        LogicalOp::Nullish => !left.is_nullish(),
    }
}

fn is_reference(value: &Value<'_>) -> bool {
    matches!(
        value,
        Value::Object(_) | Value::Array(_) | Value::Function(_) | Value::Node(_)
    )
}

fn ensure_simple<'a>(binding: &Binding<'a>) -> Result<(), EvalError<'a>> {
    match binding {
        Binding::Identifier(_) | Binding::Member { .. } => Ok(()),
        _ => Err(EvalError::structural("Invalid left-hand side in assignment")),
    }
}

/// Name used in "is not a function" and "is not allowed function" messages.
fn callee_name(callee: &Expr<'_>) -> String {
    match &callee.kind {
        ExprKind::Identifier(name) => (*name).to_string(),
        ExprKind::Member { property, .. } => match property {
            MemberProperty::Identifier(name) | MemberProperty::Private(name) => {
                (*name).to_string()
            }
            MemberProperty::Computed(expr) => match expr.kind {
                ExprKind::Identifier(name) => name.to_string(),
                _ => "f".to_string(),
            },
        },
        ExprKind::Chain(inner) => callee_name(inner),
        _ => "f".to_string(),
    }
}

enum TemplatePart<'a> {
    Quasi(&'a TemplateElement<'a>),
    Expr(&'a Expr<'a>),
}

/// Quasis and expressions interleaved by source position. Ties and missing
/// positions keep the grammar order `quasi0, expr0, quasi1, ...`.
fn template_parts<'a>(template: &'a TemplateLiteral<'a>) -> Vec<TemplatePart<'a>> {
    let mut parts: Vec<(Option<Position>, TemplatePart<'a>)> = Vec::new();
    let mut expressions = template.expressions.iter();
    for quasi in template.quasis {
        parts.push((quasi.loc.as_ref().map(|l| l.start), TemplatePart::Quasi(quasi)));
        if let Some(expr) = expressions.next() {
            parts.push((expr.loc.as_ref().map(|l| l.start), TemplatePart::Expr(*expr)));
        }
    }
    for expr in expressions {
        parts.push((expr.loc.as_ref().map(|l| l.start), TemplatePart::Expr(expr)));
    }
    if parts.iter().all(|(pos, _)| pos.is_some()) {
        parts.sort_by_key(|(pos, _)| *pos);
    }
    parts.into_iter().map(|(_, part)| part).collect()
}

/// Node kind recorded in error context trails.
/// Member accesses and calls, whose errors [`Context::eval_chain`] annotates.
fn is_chain_link(kind: &ExprKind<'_>) -> bool {
    matches!(kind, ExprKind::Member { .. } | ExprKind::Call { .. })
}

pub(crate) fn expr_kind_name(kind: &ExprKind<'_>) -> &'static str {
    match kind {
        ExprKind::Literal(_) => "Literal",
        ExprKind::Identifier(_) => "Identifier",
        ExprKind::This => "ThisExpression",
        ExprKind::Super => "Super",
        ExprKind::Array(_) => "ArrayExpression",
        ExprKind::Object(_) => "ObjectExpression",
        ExprKind::Function(_) => "FunctionExpression",
        ExprKind::ArrowFunction(_) => "ArrowFunctionExpression",
        ExprKind::Class(_) => "ClassExpression",
        ExprKind::TemplateLiteral(_) => "TemplateLiteral",
        ExprKind::TaggedTemplate { .. } => "TaggedTemplateExpression",
        ExprKind::Unary { .. } => "UnaryExpression",
        ExprKind::Update { .. } => "UpdateExpression",
        ExprKind::Binary { .. } => "BinaryExpression",
        ExprKind::Logical { .. } => "LogicalExpression",
        ExprKind::Assignment { .. } => "AssignmentExpression",
        ExprKind::Conditional { .. } => "ConditionalExpression",
        ExprKind::Call { .. } => "CallExpression",
        ExprKind::New { .. } => "NewExpression",
        ExprKind::Member { .. } => "MemberExpression",
        ExprKind::Chain(_) => "ChainExpression",
        ExprKind::Sequence(_) => "SequenceExpression",
        ExprKind::Await(_) => "AwaitExpression",
        ExprKind::Yield(_) => "YieldExpression",
        ExprKind::Import(_) => "ImportExpression",
        ExprKind::MetaProperty { .. } => "MetaProperty",
        ExprKind::JsxElement(_) => "JSXElement",
        ExprKind::JsxFragment(_) => "JSXFragment",
    }
}
