//! Reified JSX.

use core::fmt;
use std::rc::Rc;

use crate::ast::Position;
use crate::evaluator::{Context, EvalError};
use crate::values::{Bindings, PropertyMap, Value, coerce::number_to_string};

/// What an element renders as: a host tag or a resolved component value.
#[derive(Clone)]
pub enum Component<'a> {
    Host(Rc<str>),
    Value(Value<'a>),
}

impl<'a> Component<'a> {
    pub fn host_name(&self) -> Option<&str> {
        match self {
            Component::Host(name) => Some(name),
            Component::Value(Value::String(name)) => Some(name),
            Component::Value(_) => None,
        }
    }
}

impl<'a> fmt::Debug for Component<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Host(name) => write!(f, "{}", name),
            Component::Value(value) => write!(f, "{{{:?}}}", value),
        }
    }
}

#[derive(Clone)]
pub struct ElementNode<'a> {
    pub component: Component<'a>,
    pub props: PropertyMap<'a>,
    pub children: Vec<NodeThunk<'a>>,
    pub position: Option<Position>,
}

impl<'a> ElementNode<'a> {
    pub fn prop(&self, name: &str) -> Option<&Value<'a>> {
        self.props.get(name).and_then(|p| p.data_value())
    }

    pub fn key(&self) -> Option<&Value<'a>> {
        self.prop("key")
    }
}

#[derive(Clone)]
pub struct FragmentNode<'a> {
    pub props: PropertyMap<'a>,
    pub children: Vec<NodeThunk<'a>>,
    pub position: Option<Position>,
}

impl<'a> FragmentNode<'a> {
    pub fn key(&self) -> Option<&Value<'a>> {
        self.props.get("key").and_then(|p| p.data_value())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Text {
    String(Rc<str>),
    Number(f64),
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Text::String(s) => f.write_str(s),
            Text::Number(n) => f.write_str(&number_to_string(*n)),
        }
    }
}

#[derive(Clone)]
pub enum JsxNode<'a> {
    Element(ElementNode<'a>),
    Fragment(FragmentNode<'a>),
    Text(Text),
    Boolean(bool),
    Null,
    Undefined,
}

impl<'a> JsxNode<'a> {
    pub fn text(s: impl Into<Rc<str>>) -> Self {
        JsxNode::Text(Text::String(s.into()))
    }

    pub fn as_element(&self) -> Option<&ElementNode<'a>> {
        match self {
            JsxNode::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_fragment(&self) -> Option<&FragmentNode<'a>> {
        match self {
            JsxNode::Fragment(fragment) => Some(fragment),
            _ => None,
        }
    }

    pub fn children(&self) -> &[NodeThunk<'a>] {
        match self {
            JsxNode::Element(el) => &el.children,
            JsxNode::Fragment(fragment) => &fragment.children,
            _ => &[],
        }
    }
}

impl<'a> fmt::Debug for JsxNode<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsxNode::Element(el) => write!(f, "<{:?} />", el.component),
            JsxNode::Fragment(_) => write!(f, "<></>"),
            JsxNode::Text(text) => write!(f, "{:?}", text.to_string()),
            JsxNode::Boolean(b) => write!(f, "{}", b),
            JsxNode::Null => write!(f, "null"),
            JsxNode::Undefined => write!(f, "undefined"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThunkKind {
    /// Only ever produces Text, Boolean, Null or Undefined.
    Literal,
    Node,
}

type Producer<'a> =
    dyn Fn(&Bindings<'a>, &mut Context<'a>) -> Result<JsxNode<'a>, EvalError<'a>> + 'a;

/// Deferred producer of a [`JsxNode`].
///
/// Building a thunk never evaluates anything; each [`invoke`](NodeThunk::invoke)
/// re-evaluates the underlying child against the given override bindings.
#[derive(Clone)]
pub struct NodeThunk<'a> {
    kind: ThunkKind,
    producer: Rc<Producer<'a>>,
}

impl<'a> NodeThunk<'a> {
    pub fn new<F>(kind: ThunkKind, producer: F) -> Self
    where
        F: Fn(&Bindings<'a>, &mut Context<'a>) -> Result<JsxNode<'a>, EvalError<'a>> + 'a,
    {
        Self {
            kind,
            producer: Rc::new(producer),
        }
    }

    /// A thunk that always yields a clone of `node`.
    pub fn constant(node: JsxNode<'a>) -> Self {
        let kind = match node {
            JsxNode::Element(_) | JsxNode::Fragment(_) => ThunkKind::Node,
            _ => ThunkKind::Literal,
        };
        Self::new(kind, move |_, _| Ok(node.clone()))
    }

    pub fn kind(&self) -> ThunkKind {
        self.kind
    }

    pub fn invoke(
        &self,
        bindings: &Bindings<'a>,
        ctx: &mut Context<'a>,
    ) -> Result<JsxNode<'a>, EvalError<'a>> {
        (self.producer)(bindings, ctx)
    }
}

impl<'a> fmt::Debug for NodeThunk<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeThunk({:?})", self.kind)
    }
}
