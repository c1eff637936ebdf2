//! JSX reification.
//!
//! Elements and fragments evaluate their tag and attributes immediately but
//! never their children: each child becomes a [`NodeThunk`] that re-enters the
//! scope chain it was created in whenever it is invoked.

use std::rc::Rc;

use tracing::trace;

use crate::ast::{
    JsxAttribute, JsxAttributeValue, JsxChild, JsxElement, JsxFragment, JsxTagName,
};
use crate::evaluator::{Context, EvalError};
use crate::values::{
    Bindings, Component, ElementNode, FragmentNode, JsxNode, NodeThunk, PropertyMap, Text,
    ThunkKind, Value,
};

impl<'a> Context<'a> {
    pub(crate) fn eval_jsx_element(
        &mut self,
        element: &'a JsxElement<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<JsxNode<'a>, EvalError<'a>> {
        let component = self.resolve_component(&element.name, bindings)?;
        let mut props = self.eval_jsx_attributes(element.attributes, bindings)?;
        self.assign_key(&mut props);

        self.key_generator().opening_element();
        if element.self_closing {
            self.key_generator().closing_element();
        }
        let children = self.child_thunks(element.children);
        if !element.self_closing {
            self.key_generator().closing_element();
        }

        Ok(JsxNode::Element(ElementNode {
            component,
            props,
            children,
            position: element.loc.as_ref().map(|l| l.start),
        }))
    }

    pub(crate) fn eval_jsx_fragment(
        &mut self,
        fragment: &'a JsxFragment<'a>,
        _bindings: &Bindings<'a>,
    ) -> Result<JsxNode<'a>, EvalError<'a>> {
        let mut props = PropertyMap::new();
        self.assign_key(&mut props);
        self.key_generator().opening_element();
        let children = self.child_thunks(fragment.children);
        self.key_generator().closing_element();
        Ok(JsxNode::Fragment(FragmentNode {
            props,
            children,
            position: fragment.loc.as_ref().map(|l| l.start),
        }))
    }

    /// Generates a `key` prop unless one is present or generation is disabled.
    fn assign_key(&mut self, props: &mut PropertyMap<'a>) {
        if self.options().disable_key_generation {
            return;
        }
        let has_key = props
            .get("key")
            .and_then(|p| p.data_value())
            .is_some_and(|v| !v.is_undefined());
        if !has_key {
            let key = self.key_generator().generate();
            props.set_data("key", Value::from(key));
        }
    }

    /// Wraps each child in a thunk over the current scope chain and receiver.
    pub fn child_thunks(&self, children: &'a [JsxChild<'a>]) -> Vec<NodeThunk<'a>> {
        children
            .iter()
            .map(|child| {
                let kind = match child {
                    JsxChild::Text(_) => ThunkKind::Literal,
                    _ => ThunkKind::Node,
                };
                let scope = self.scope().clone();
                let this = self.resolve_this();
                NodeThunk::new(kind, move |bindings, ctx| {
                    trace!(?kind, "invoking thunk");
                    let mut ctx = ctx.enter_scope(&scope, this.clone(), None);
                    ctx.eval_jsx_child(child, bindings)
                })
            })
            .collect()
    }

    /// Evaluates one child to a node.
    pub fn eval_jsx_child(
        &mut self,
        child: &'a JsxChild<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<JsxNode<'a>, EvalError<'a>> {
        match *child {
            JsxChild::Text(text) => Ok(JsxNode::text(text)),
            JsxChild::Expression(None) => Ok(JsxNode::Undefined),
            JsxChild::Expression(Some(expr)) => {
                let value = self.eval_expr(expr, bindings)?;
                value_to_node(&value).map_err(|e| e.at(&expr.loc, "JSXExpressionContainer"))
            }
            JsxChild::Spread(expr) => {
                let value = self.eval_expr(expr, bindings)?;
                let items = self
                    .iterate(&value)
                    .map_err(|e| e.at(&expr.loc, "JSXSpreadChild"))?;
                let mut props = PropertyMap::new();
                self.assign_key(&mut props);
                self.key_generator().opening_element();
                self.key_generator().closing_element();
                let children = items
                    .iter()
                    .map(|item| value_to_node(item).map(NodeThunk::constant))
                    .collect::<Result<_, _>>()?;
                Ok(JsxNode::Fragment(FragmentNode {
                    props,
                    children,
                    position: expr.loc.as_ref().map(|l| l.start),
                }))
            }
            JsxChild::Element(element) => self.eval_jsx_element(element, bindings),
            JsxChild::Fragment(fragment) => self.eval_jsx_fragment(fragment, bindings),
        }
    }

    fn eval_jsx_attributes(
        &mut self,
        attributes: &'a [JsxAttribute<'a>],
        bindings: &Bindings<'a>,
    ) -> Result<PropertyMap<'a>, EvalError<'a>> {
        let mut props = PropertyMap::new();
        for attribute in attributes {
            match attribute {
                JsxAttribute::Attribute { name, value } => {
                    let value = match value {
                        None => Value::Bool(true),
                        Some(JsxAttributeValue::String(s)) => Value::from(*s),
                        Some(JsxAttributeValue::Expression(None)) => Value::Undefined,
                        Some(JsxAttributeValue::Expression(Some(expr))) => {
                            self.eval_expr(expr, bindings)?
                        }
                        Some(JsxAttributeValue::Element(element)) => {
                            Value::Node(Rc::new(self.eval_jsx_element(element, bindings)?))
                        }
                        Some(JsxAttributeValue::Fragment(fragment)) => {
                            Value::Node(Rc::new(self.eval_jsx_fragment(fragment, bindings)?))
                        }
                    };
                    props.set_data(name.to_name(), value);
                }
                JsxAttribute::Spread(expr) => {
                    let source = self.eval_expr(expr, bindings)?;
                    self.copy_own_properties(&source, &mut props)?;
                }
            }
        }
        Ok(props)
    }

    /// A tag names a host element unless its first segment resolves to a
    /// defined value; namespaced tags are always host elements.
    pub fn resolve_component(
        &mut self,
        name: &JsxTagName<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Component<'a>, EvalError<'a>> {
        let segments: &[&'a str] = match name {
            JsxTagName::Namespaced { .. } => return Ok(Component::Host(Rc::from(name.to_name()))),
            JsxTagName::Identifier(ident) => core::slice::from_ref(ident),
            JsxTagName::Member(segments) => segments,
        };
        let Some((first, rest)) = segments.split_first() else {
            return Ok(Component::Host(Rc::from(name.to_name())));
        };
        let value = match self.lookup(first, bindings) {
            Some(value) if !value.is_undefined() => value,
            _ => return Ok(Component::Host(Rc::from(name.to_name()))),
        };
        let mut value = value;
        for segment in rest {
            value = self.get_property(&value, segment)?;
        }
        Ok(Component::Value(value))
    }
}

/// Converts an expression value to a node.
pub fn value_to_node<'a>(value: &Value<'a>) -> Result<JsxNode<'a>, EvalError<'a>> {
    Ok(match value {
        Value::Node(node) => (**node).clone(),
        Value::String(s) => JsxNode::Text(Text::String(s.clone())),
        Value::Number(n) => JsxNode::Text(Text::Number(*n)),
        Value::Bool(b) => JsxNode::Boolean(*b),
        Value::Null => JsxNode::Null,
        Value::Undefined => JsxNode::Undefined,
        Value::Array(items) => {
            let children = items
                .borrow()
                .iter()
                .map(|item| value_to_node(item).map(NodeThunk::constant))
                .collect::<Result<_, _>>()?;
            JsxNode::Fragment(FragmentNode {
                props: PropertyMap::new(),
                children,
                position: None,
            })
        }
        Value::Object(_) | Value::Function(_) => {
            return Err(EvalError::type_error("Objects are not valid as a JSX child"));
        }
    })
}
