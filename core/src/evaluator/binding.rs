//! Destructuring: pattern resolution and binding.

use std::rc::Rc;

use crate::ast::{DeclarationKind, Expr, ExprKind, MemberProperty, Pattern};
use crate::evaluator::{Context, EvalError};
use crate::values::{Bindings, PropertyMap, Value};

/// A resolved assignment target. Computed keys and member objects have
/// already been evaluated.
#[derive(Debug, Clone)]
pub enum Binding<'a> {
    Identifier(&'a str),
    Object {
        properties: Vec<(Rc<str>, Binding<'a>)>,
        rest: Option<Box<Binding<'a>>>,
    },
    Array {
        elements: Vec<Option<Binding<'a>>>,
        rest: Option<Box<Binding<'a>>>,
    },
    Rest(Box<Binding<'a>>),
    Default {
        target: Box<Binding<'a>>,
        default: &'a Expr<'a>,
    },
    Member {
        object: Value<'a>,
        key: Rc<str>,
    },
}

impl<'a> Context<'a> {
    pub fn resolve_pattern(
        &mut self,
        pattern: &'a Pattern<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Binding<'a>, EvalError<'a>> {
        Ok(match pattern {
            Pattern::Identifier(name) => Binding::Identifier(*name),
            Pattern::Object { properties, rest } => {
                let mut resolved = Vec::with_capacity(properties.len());
                for property in properties.iter() {
                    let key = self.eval_property_key(&property.key, bindings)?;
                    resolved.push((key, self.resolve_pattern(property.value, bindings)?));
                }
                Binding::Object {
                    properties: resolved,
                    rest: self.resolve_rest(*rest, bindings)?,
                }
            }
            Pattern::Array { elements, rest } => {
                let mut resolved = Vec::with_capacity(elements.len());
                for element in elements.iter() {
                    resolved.push(match element {
                        Some(p) => Some(self.resolve_pattern(p, bindings)?),
                        None => None,
                    });
                }
                Binding::Array {
                    elements: resolved,
                    rest: self.resolve_rest(*rest, bindings)?,
                }
            }
            Pattern::Assignment { target, default } => Binding::Default {
                target: Box::new(self.resolve_pattern(target, bindings)?),
                default: *default,
            },
            Pattern::Member(expr) => self.resolve_member_target(expr, bindings)?,
        })
    }

    fn resolve_rest(
        &mut self,
        rest: Option<&'a Pattern<'a>>,
        bindings: &Bindings<'a>,
    ) -> Result<Option<Box<Binding<'a>>>, EvalError<'a>> {
        match rest {
            Some(p) => Ok(Some(Box::new(Binding::Rest(Box::new(
                self.resolve_pattern(p, bindings)?,
            ))))),
            None => Ok(None),
        }
    }

    fn resolve_member_target(
        &mut self,
        expr: &'a Expr<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Binding<'a>, EvalError<'a>> {
        let ExprKind::Member {
            object, property, ..
        } = &expr.kind
        else {
            return Err(EvalError::structural("Invalid assignment target").at(&expr.loc, "Pattern"));
        };
        let object = match object.kind {
            ExprKind::Super => self.resolve_this(),
            _ => self.eval_expr(object, bindings)?,
        };
        let key = self.eval_member_key(property, bindings)?;
        Ok(Binding::Member { object, key })
    }

    pub(crate) fn eval_member_key(
        &mut self,
        property: &MemberProperty<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Rc<str>, EvalError<'a>> {
        match property {
            MemberProperty::Identifier(name) => Ok(Rc::from(*name)),
            MemberProperty::Private(name) => Ok(Rc::from(format!("#{}", name))),
            MemberProperty::Computed(expr) => {
                let key = self.eval_expr(expr, bindings)?;
                self.to_property_key(&key)
            }
        }
    }

    /// Destructures `value` into `binding`.
    ///
    /// With a declaration kind every identifier is declared in the innermost
    /// frame; without one, the nearest existing binding is assigned.
    pub fn set_binding(
        &mut self,
        binding: &Binding<'a>,
        value: Value<'a>,
        kind: Option<DeclarationKind>,
        bindings: &Bindings<'a>,
    ) -> Result<(), EvalError<'a>> {
        match binding {
            Binding::Identifier(name) => match kind {
                Some(kind) => self.declare(name, value, kind),
                None => self.assign(name, value),
            },
            Binding::Default { target, default } => {
                let value = if value.is_undefined() {
                    self.eval_expr(*default, bindings)?
                } else {
                    value
                };
                self.set_binding(target, value, kind, bindings)
            }
            Binding::Rest(target) => self.set_binding(target, value, kind, bindings),
            Binding::Member { object, key } => self.set_property(object, key, value),
            Binding::Array { elements, rest } => {
                let items = self.iterate(&value)?;
                for (i, element) in elements.iter().enumerate() {
                    if let Some(element) = element {
                        let item = items.get(i).cloned().unwrap_or_default();
                        self.set_binding(element, item, kind, bindings)?;
                    }
                }
                if let Some(rest) = rest {
                    let remaining = items.get(elements.len()..).unwrap_or_default().to_vec();
                    self.set_binding(rest, Value::array(remaining), kind, bindings)?;
                }
                Ok(())
            }
            Binding::Object { properties, rest } => {
                if value.is_nullish() {
                    return Err(EvalError::type_error(format!(
                        "Cannot destructure '{}' as it is {}.",
                        value, value
                    )));
                }
                for (key, target) in properties {
                    let item = self.get_property(&value, key)?;
                    self.set_binding(target, item, kind, bindings)?;
                }
                if let Some(rest) = rest {
                    let mut remaining = PropertyMap::new();
                    for key in self.own_enumerable_keys(&value) {
                        if properties.iter().any(|(k, _)| *k == key) {
                            continue;
                        }
                        let item = self.get_property(&value, &key)?;
                        remaining.set_data(key, item);
                    }
                    self.set_binding(rest, Value::object(remaining), kind, bindings)?;
                }
                Ok(())
            }
        }
    }

    /// Elements of an iterable value: array elements or string characters.
    pub fn iterate(&self, value: &Value<'a>) -> Result<Vec<Value<'a>>, EvalError<'a>> {
        match value {
            Value::Array(elements) => Ok(elements.borrow().clone()),
            Value::String(s) => Ok(s.chars().map(|c| Value::from(c.to_string())).collect()),
            other => Err(EvalError::type_error(format!(
                "{} is not iterable",
                describe_for_error(other)
            ))),
        }
    }
}

/// Short description of a value for error messages.
pub(crate) fn describe_for_error(value: &Value<'_>) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) | Value::Node(_) => "object".to_string(),
        Value::Function(f) => format!("function {}", f.display_name()),
        other => other.to_string(),
    }
}
