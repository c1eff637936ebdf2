//! Property access on runtime values.
//!
//! Lookups fall through own properties, then the class chain (prototype
//! tables in the class arena), then the intrinsic methods for the value's
//! type.

use std::rc::Rc;

use crate::evaluator::{Context, EvalError, binding::describe_for_error};
use crate::stdlib::{MAX_LENGTH, throw};
use crate::values::{
    ClassId, Component, FunctionKind, JsxNode, Property, PropertyMap, Value,
    coerce::{array_index, number_to_string, to_string},
};

impl<'a> Context<'a> {
    /// Converts a computed key to its property-name string.
    pub fn to_property_key(&mut self, key: &Value<'a>) -> Result<Rc<str>, EvalError<'a>> {
        match key {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(Rc::from(number_to_string(*n))),
            other => self.to_string_value(other),
        }
    }

    /// Finds `key` in the prototype table of `class` or its ancestors.
    pub(crate) fn find_in_class(&self, class: ClassId, key: &str) -> Option<Property<'a>> {
        let mut current = Some(class);
        while let Some(id) = current {
            let descriptor = self.class(id);
            if let Some(property) = descriptor.prototype.get(key) {
                return Some(property.clone());
            }
            current = descriptor.parent;
        }
        None
    }

    /// Reads a property slot, invoking getters with `this` bound to `receiver`.
    fn read_slot(
        &mut self,
        property: Property<'a>,
        receiver: &Value<'a>,
    ) -> Result<Value<'a>, EvalError<'a>> {
        match property {
            Property::Data { value, .. } => Ok(value),
            Property::Accessor { get: Some(getter), .. } => {
                self.call_value(&getter, receiver.clone(), &[])
            }
            Property::Accessor { get: None, .. } => Ok(Value::Undefined),
        }
    }

    pub fn get_property(&mut self, target: &Value<'a>, key: &str) -> Result<Value<'a>, EvalError<'a>> {
        match target {
            Value::Undefined | Value::Null => Err(EvalError::type_error(format!(
                "Cannot read properties of {} (reading '{}')",
                target, key
            ))),
            Value::Bool(_) => Ok(self.intrinsics().object(key).unwrap_or_default()),
            Value::Number(_) => Ok(self
                .intrinsics()
                .number(key)
                .or_else(|| self.intrinsics().object(key))
                .unwrap_or_default()),
            Value::String(s) => {
                if key == "length" {
                    return Ok(Value::from(s.chars().count()));
                }
                if let Some(index) = array_index(key) {
                    return Ok(s
                        .chars()
                        .nth(index)
                        .map(|c| Value::from(c.to_string()))
                        .unwrap_or_default());
                }
                Ok(self.intrinsics().string(key).unwrap_or_default())
            }
            Value::Array(elements) => {
                if key == "length" {
                    return Ok(Value::from(elements.borrow().len()));
                }
                if let Some(index) = array_index(key) {
                    return Ok(elements.borrow().get(index).cloned().unwrap_or_default());
                }
                Ok(self
                    .intrinsics()
                    .array(key)
                    .or_else(|| self.intrinsics().object(key))
                    .unwrap_or_default())
            }
            Value::Object(object) => {
                let (own, class) = {
                    let object = object.borrow();
                    (object.properties.get(key).cloned(), object.class)
                };
                if let Some(property) = own {
                    return self.read_slot(property, target);
                }
                if let Some(property) = class.and_then(|id| self.find_in_class(id, key)) {
                    return self.read_slot(property, target);
                }
                Ok(self.intrinsics().object(key).unwrap_or_default())
            }
            Value::Function(function) => {
                let own = function.properties.borrow().get(key).cloned();
                if let Some(property) = own {
                    return self.read_slot(property, target);
                }
                match key {
                    "name" => return Ok(Value::from(function.name.clone())),
                    "length" => return Ok(Value::from(function.arity())),
                    _ => {}
                }
                if let FunctionKind::Class(id) = function.kind {
                    // Statics fall through to the superclass value.
                    if let Some(parent) = self.class(id).super_value.clone() {
                        let value = self.get_property(&parent, key)?;
                        if !value.is_undefined() {
                            return Ok(value);
                        }
                    }
                }
                Ok(self
                    .intrinsics()
                    .function(key)
                    .or_else(|| self.intrinsics().object(key))
                    .unwrap_or_default())
            }
            Value::Node(node) => Ok(node_property(node, key)),
        }
    }

    pub fn set_property(
        &mut self,
        target: &Value<'a>,
        key: &str,
        value: Value<'a>,
    ) -> Result<(), EvalError<'a>> {
        match target {
            Value::Undefined | Value::Null => Err(EvalError::type_error(format!(
                "Cannot set properties of {} (setting '{}')",
                target, key
            ))),
            Value::Array(elements) => {
                if key == "length" {
                    let len = value
                        .as_number()
                        .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= MAX_LENGTH as f64);
                    let Some(len) = len else {
                        return throw(self, "RangeError", "Invalid array length");
                    };
                    elements.borrow_mut().resize(len as usize, Value::Undefined);
                } else if let Some(index) = array_index(key) {
                    if index >= MAX_LENGTH {
                        return throw(self, "RangeError", "Invalid array length");
                    }
                    let mut elements = elements.borrow_mut();
                    if index >= elements.len() {
                        elements.resize(index + 1, Value::Undefined);
                    }
                    elements[index] = value;
                }
                Ok(())
            }
            Value::Object(object) => {
                let (own, class) = {
                    let object = object.borrow();
                    (object.properties.get(key).cloned(), object.class)
                };
                let slot = own.or_else(|| {
                    class
                        .and_then(|id| self.find_in_class(id, key))
                        .filter(|p| matches!(p, Property::Accessor { .. }))
                });
                match slot {
                    Some(Property::Accessor { set: Some(setter), .. }) => {
                        self.call_value(&setter, target.clone(), &[value])?;
                        Ok(())
                    }
                    Some(Property::Accessor { set: None, .. }) => Err(EvalError::type_error(format!(
                        "Cannot set property {} of {} which has only a getter",
                        key,
                        describe_for_error(target)
                    ))),
                    Some(Property::Data { writable: false, .. }) => Err(EvalError::type_error(format!(
                        "Cannot assign to read only property '{}' of {}",
                        key,
                        describe_for_error(target)
                    ))),
                    _ => {
                        object.borrow_mut().properties.set_data(key, value);
                        Ok(())
                    }
                }
            }
            Value::Function(function) => {
                let own = function.properties.borrow().get(key).cloned();
                match own {
                    Some(Property::Accessor { set: Some(setter), .. }) => {
                        self.call_value(&setter, target.clone(), &[value])?;
                    }
                    _ => function.properties.borrow_mut().set_data(key, value),
                }
                Ok(())
            }
            // Assignments to primitive and node properties are dropped.
            _ => Ok(()),
        }
    }

    /// `delete target[key]`; `false` when the property cannot be removed.
    pub fn delete_property(&mut self, target: &Value<'a>, key: &str) -> Result<bool, EvalError<'a>> {
        match target {
            Value::Undefined | Value::Null => Err(EvalError::type_error(format!(
                "Cannot convert undefined or null to object (deleting '{}')",
                key
            ))),
            Value::Object(object) => {
                let mut object = object.borrow_mut();
                let locked = matches!(
                    object.properties.get(key),
                    Some(Property::Data { configurable: false, .. })
                        | Some(Property::Accessor { configurable: false, .. })
                );
                if locked {
                    return Ok(false);
                }
                object.properties.remove(key);
                Ok(true)
            }
            Value::Array(elements) => {
                if let Some(index) = array_index(key) {
                    if let Some(slot) = elements.borrow_mut().get_mut(index) {
                        *slot = Value::Undefined;
                    }
                    return Ok(true);
                }
                Ok(key != "length")
            }
            Value::Function(function) => {
                function.properties.borrow_mut().remove(key);
                Ok(true)
            }
            _ => Ok(true),
        }
    }

    /// The `in` operator.
    pub fn has_property(&mut self, target: &Value<'a>, key: &str) -> Result<bool, EvalError<'a>> {
        match target {
            Value::Object(object) => {
                let (own, class) = {
                    let object = object.borrow();
                    (object.properties.contains_key(key), object.class)
                };
                Ok(own
                    || class.is_some_and(|id| self.find_in_class(id, key).is_some())
                    || self.intrinsics().object(key).is_some())
            }
            Value::Array(elements) => Ok(key == "length"
                || array_index(key).is_some_and(|i| i < elements.borrow().len())
                || self.intrinsics().array(key).is_some()),
            Value::Function(function) => Ok(function.properties.borrow().contains_key(key)
                || matches!(key, "name" | "length")),
            other => Err(EvalError::type_error(format!(
                "Cannot use 'in' operator to search for '{}' in {}",
                key, other
            ))),
        }
    }

    /// Own enumerable keys, as `Object.keys` and object rest/spread see them.
    pub fn own_enumerable_keys(&self, target: &Value<'a>) -> Vec<Rc<str>> {
        match target {
            Value::Object(object) => object.borrow().properties.enumerable_keys().cloned().collect(),
            Value::Array(elements) => (0..elements.borrow().len())
                .map(|i| Rc::from(i.to_string()))
                .collect(),
            Value::String(s) => (0..s.chars().count())
                .map(|i| Rc::from(i.to_string()))
                .collect(),
            Value::Function(function) => function
                .properties
                .borrow()
                .enumerable_keys()
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Keys visited by `for-in`: own enumerable keys followed by enumerable
    /// members declared on the object's class chain.
    pub fn enumerate_keys(&self, target: &Value<'a>) -> Vec<Rc<str>> {
        let mut keys = self.own_enumerable_keys(target);
        if let Value::Object(object) = target {
            let mut current = object.borrow().class;
            while let Some(id) = current {
                let descriptor = self.class(id);
                for key in descriptor.prototype.enumerable_keys() {
                    if !keys.contains(key) {
                        keys.push(key.clone());
                    }
                }
                current = descriptor.parent;
            }
        }
        keys
    }

    /// Own enumerable properties read through getters, as object spread does.
    pub fn copy_own_properties(
        &mut self,
        source: &Value<'a>,
        into: &mut PropertyMap<'a>,
    ) -> Result<(), EvalError<'a>> {
        if source.is_nullish() {
            return Ok(());
        }
        for key in self.own_enumerable_keys(source) {
            let value = self.get_property(source, &key)?;
            into.set_data(key, value);
        }
        Ok(())
    }

    /// `String(value)`, calling a user-defined `toString` on objects.
    pub fn to_string_value(&mut self, value: &Value<'a>) -> Result<Rc<str>, EvalError<'a>> {
        let primitive = self.to_primitive(value)?;
        Ok(to_string(&primitive))
    }

    /// Reduces any value to a primitive. Objects call their `toString`, if
    /// one is reachable; arrays, functions and nodes become their string form.
    pub fn to_primitive(&mut self, value: &Value<'a>) -> Result<Value<'a>, EvalError<'a>> {
        let object = match value {
            Value::Object(object) => object,
            Value::Array(_) | Value::Function(_) | Value::Node(_) => {
                return Ok(Value::String(to_string(value)));
            }
            _ => return Ok(value.clone()),
        };
        let (own, class) = {
            let object = object.borrow();
            (object.properties.get("toString").cloned(), object.class)
        };
        let method = own.or_else(|| class.and_then(|id| self.find_in_class(id, "toString")));
        match method {
            Some(property) => {
                let method = self.read_slot(property, value)?;
                if method.is_callable() {
                    let result = self.call_value(&method, value.clone(), &[])?;
                    if !matches!(result, Value::Object(_) | Value::Array(_)) {
                        return Ok(result);
                    }
                }
                Ok(Value::from("[object Object]"))
            }
            None => Ok(Value::from("[object Object]")),
        }
    }
}

fn node_property<'a>(node: &JsxNode<'a>, key: &str) -> Value<'a> {
    let (props, component) = match node {
        JsxNode::Element(el) => (&el.props, Some(&el.component)),
        JsxNode::Fragment(fragment) => (&fragment.props, None),
        _ => return Value::Undefined,
    };
    match key {
        "type" => match component {
            Some(Component::Host(name)) => Value::from(name.clone()),
            Some(Component::Value(value)) => value.clone(),
            None => Value::from("fragment"),
        },
        "props" => Value::object(props.clone()),
        "key" => props
            .get("key")
            .and_then(|p| p.data_value())
            .cloned()
            .unwrap_or(Value::Null),
        _ => Value::Undefined,
    }
}
