//! Class definitions.
//!
//! A class is a [`Function`] of kind [`FunctionKind::Class`] whose
//! [`ClassDescriptor`] lives in the context's class arena. Methods,
//! accessors and instance fields are stored in the descriptor's prototype
//! table; statics are own properties of the class function.

use std::rc::Rc;

use tracing::debug;

use crate::ast::{ClassDef, ClassMemberKind, DeclarationKind, ExprKind};
use crate::evaluator::{Context, EvalError, binding::describe_for_error};
use crate::values::{Bindings, ClassId, Function, FunctionKind, Property, PropertyMap, Value};

/// Class metadata shared by the class function and its instances.
#[derive(Debug, Clone)]
pub struct ClassDescriptor<'a> {
    pub name: Rc<str>,
    /// Explicit `constructor` method, if declared.
    pub constructor: Option<Rc<Function<'a>>>,
    pub prototype: PropertyMap<'a>,
    /// Parent class when the superclass is itself a class.
    pub parent: Option<ClassId>,
    /// Value of the `extends` clause; `None` for base classes and `extends null`.
    pub super_value: Option<Value<'a>>,
}

impl<'a> ClassDescriptor<'a> {
    pub fn new(name: Rc<str>) -> Self {
        Self {
            name,
            constructor: None,
            prototype: PropertyMap::new(),
            parent: None,
            super_value: None,
        }
    }
}

/// Where a member definition is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Prototype,
    Static,
}

impl<'a> Context<'a> {
    /// Evaluates a class definition to its class function.
    pub(crate) fn build_class(
        &mut self,
        def: &'a ClassDef<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Value<'a>, EvalError<'a>> {
        let name: Rc<str> = Rc::from(def.id.unwrap_or(""));
        let mut descriptor = ClassDescriptor::new(name.clone());

        if let Some(super_class) = def.super_class {
            match self.eval_expr(super_class, bindings)? {
                Value::Null => {}
                Value::Function(parent) => {
                    descriptor.parent = parent.class_id();
                    descriptor.super_value = Some(Value::Function(parent));
                }
                other => {
                    return Err(EvalError::type_error(format!(
                        "Class extends value {} is not a constructor or null",
                        describe_for_error(&other)
                    ))
                    .at(&super_class.loc, "ClassHeritage"));
                }
            }
        }

        let super_value = descriptor.super_value.clone();
        let id = self.add_class(descriptor);
        let class = Rc::new(Function::class(name, id));
        let class_value = Value::Function(class.clone());
        if let Some(parent) = super_value {
            class
                .properties
                .borrow_mut()
                .insert("super", Property::hidden(parent));
        }
        self.class_mut(id)
            .prototype
            .insert("constructor", Property::hidden(class_value.clone()));

        let captured = self.scope().clone();
        let mut scope = scope_for_class(self, &captured, class_value.clone(), id);
        if let Some(class_name) = def.id {
            scope.declare(class_name, class_value.clone(), DeclarationKind::Const)?;
        }

        for member in def.body {
            let key = scope.eval_property_key(&member.key, bindings)?;
            let target = if member.is_static {
                Target::Static
            } else {
                Target::Prototype
            };
            let result = match member.kind {
                ClassMemberKind::Constructor => {
                    let function = scope.member_function(member.value, bindings, id)?;
                    if let Value::Function(constructor) = function {
                        scope.class_mut(id).constructor = Some(constructor);
                    }
                    Ok(())
                }
                ClassMemberKind::Method => {
                    let function = scope.member_function(member.value, bindings, id)?;
                    scope.install(&class, id, target, key, Property::hidden(function));
                    Ok(())
                }
                ClassMemberKind::Get | ClassMemberKind::Set => {
                    let function = scope.member_function(member.value, bindings, id)?;
                    let is_getter = member.kind == ClassMemberKind::Get;
                    scope.install_accessor(&class, id, target, key, function, is_getter);
                    Ok(())
                }
                ClassMemberKind::Property => {
                    let value = match member.value {
                        Some(init) => scope.eval_expr(init, bindings)?,
                        None => Value::Undefined,
                    };
                    scope.install(&class, id, target, key, Property::data(value));
                    Ok(())
                }
            };
            result.map_err(|e: EvalError<'a>| e.at(&member.loc, "ClassMember"))?;
        }
        drop(scope);

        debug!(name = %class.display_name(), id = id.0, "class defined");
        self.admit(&class);
        Ok(class_value)
    }

    fn member_function(
        &mut self,
        value: Option<&'a crate::ast::Expr<'a>>,
        bindings: &Bindings<'a>,
        home: ClassId,
    ) -> Result<Value<'a>, EvalError<'a>> {
        match value.map(|v| &v.kind) {
            Some(ExprKind::Function(def)) => self.make_closure(def, bindings, Some(home)),
            _ => Err(EvalError::structural("Class method without a body")),
        }
    }

    fn install(
        &mut self,
        class: &Rc<Function<'a>>,
        id: ClassId,
        target: Target,
        key: Rc<str>,
        property: Property<'a>,
    ) {
        match target {
            Target::Prototype => self.class_mut(id).prototype.insert(key, property),
            Target::Static => class.properties.borrow_mut().insert(key, property),
        }
    }

    /// Adds a getter or setter, merging with an accessor already defined for
    /// the same key.
    fn install_accessor(
        &mut self,
        class: &Rc<Function<'a>>,
        id: ClassId,
        target: Target,
        key: Rc<str>,
        function: Value<'a>,
        is_getter: bool,
    ) {
        let merge = |map: &mut PropertyMap<'a>| {
            let (mut get, mut set) = match map.get(&key) {
                Some(Property::Accessor { get, set, .. }) => (get.clone(), set.clone()),
                _ => (None, None),
            };
            if is_getter {
                get = Some(function.clone());
            } else {
                set = Some(function.clone());
            }
            map.insert(
                key.clone(),
                Property::Accessor {
                    get,
                    set,
                    enumerable: true,
                    configurable: true,
                },
            );
        };
        match target {
            Target::Prototype => merge(&mut self.class_mut(id).prototype),
            Target::Static => merge(&mut class.properties.borrow_mut()),
        }
    }

    /// `value instanceof constructor`.
    pub(crate) fn instance_of(
        &self,
        value: &Value<'a>,
        constructor: &Value<'a>,
    ) -> Result<bool, EvalError<'a>> {
        let Value::Function(constructor) = constructor else {
            return Err(EvalError::type_error(
                "Right-hand side of 'instanceof' is not callable",
            ));
        };

        if let Some(target) = constructor.class_id() {
            return Ok(match value {
                Value::Object(object) => object
                    .borrow()
                    .class
                    .is_some_and(|class| self.class_derives_from(class, target)),
                Value::Function(function) => function
                    .class_id()
                    .is_some_and(|class| class != target && self.class_derives_from(class, target)),
                _ => false,
            });
        }

        if constructor.is_intrinsic() {
            if let Some(matched) = intrinsic_instance_of(value, &constructor.name) {
                return Ok(matched);
            }
        }

        let Value::Object(object) = value else {
            return Ok(false);
        };
        let object = object.borrow();
        if let Some(own) = &object.constructor {
            if Rc::ptr_eq(own, constructor) {
                return Ok(true);
            }
        }
        // Classes extending a plain function.
        let mut current = object.class;
        while let Some(id) = current {
            let descriptor = self.class(id);
            if let Some(Value::Function(base)) = &descriptor.super_value {
                if Rc::ptr_eq(base, constructor) {
                    return Ok(true);
                }
            }
            current = descriptor.parent;
        }
        Ok(false)
    }
}

/// Opens the scope class members are evaluated in: `this` is the class and
/// `super` resolves against `id`.
fn scope_for_class<'c, 'a>(
    ctx: &'c mut Context<'a>,
    captured: &Rc<crate::scope_stack::Frame<'a>>,
    class: Value<'a>,
    id: ClassId,
) -> crate::evaluator::ScopedContext<'c, 'a> {
    ctx.enter_scope(captured, class, Some(id))
}

/// `instanceof` against the built-in constructors.
fn intrinsic_instance_of(value: &Value<'_>, name: &str) -> Option<bool> {
    Some(match name {
        "Array" => matches!(value, Value::Array(_)),
        "Function" => matches!(value, Value::Function(_)),
        "Object" => matches!(
            value,
            Value::Object(_) | Value::Array(_) | Value::Function(_)
        ),
        "Error" => match value {
            Value::Object(object) => object
                .borrow()
                .constructor
                .as_ref()
                .is_some_and(|c| c.is_intrinsic() && c.name.ends_with("Error")),
            _ => false,
        },
        _ => return None,
    })
}
