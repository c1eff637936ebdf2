//! Static reference renderer.
//!
//! Performs one full render pass over the thunks produced by JSX-mode
//! evaluation and yields a plain tree of [`RenderedNode`]s. Component values
//! are called with their props; fragments are flattened; `null`, `undefined`
//! and booleans render as nothing.
//!
//! The pass drives the key generator the same way evaluation does: it is reset
//! first and advanced around every element's children, so keys generated for
//! nested markup match a fresh evaluation.

use std::rc::Rc;

use tracing::{debug, trace};

use crate::evaluator::{Context, EvalError, value_to_node};
use crate::stack::ensure_sufficient_stack;
use crate::values::{
    Bindings, Component, ElementNode, FragmentNode, JsxNode, NodeThunk, PropertyMap, Text, Value,
    coerce::to_string,
};

mod html;

#[cfg(test)]
mod render_test;

pub use html::is_known_html_element;

/// Rewrites or drops an element before it renders.
pub type ElementFilter<'a> = Box<dyn Fn(ElementNode<'a>) -> Option<ElementNode<'a>> + 'a>;
/// Rewrites or drops a fragment before its children render.
pub type FragmentFilter<'a> = Box<dyn Fn(FragmentNode<'a>) -> Option<FragmentNode<'a>> + 'a>;
/// Rewrites or drops a text node.
pub type TextFilter = Box<dyn Fn(Text) -> Option<Text>>;

/// Options for a render pass.
///
/// Filters run in order; the first one returning `None` drops the node.
pub struct RenderOptions<'a> {
    pub element_filters: Vec<ElementFilter<'a>>,
    pub fragment_filters: Vec<FragmentFilter<'a>>,
    pub text_filters: Vec<TextFilter>,

    /// Drop host elements whose tag is not a known HTML or SVG element.
    ///
    /// Default: false
    pub disable_unknown_html_element: bool,

    /// File name recorded in each element's source position.
    ///
    /// Default: "jsx"
    pub source_file_name: String,
}

impl<'a> Default for RenderOptions<'a> {
    fn default() -> Self {
        Self {
            element_filters: Vec::new(),
            fragment_filters: Vec::new(),
            text_filters: Vec::new(),
            disable_unknown_html_element: false,
            source_file_name: "jsx".to_string(),
        }
    }
}

/// Where an element was written, as attached to rendered elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePosition {
    pub file_name: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

/// A fully rendered node.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedNode {
    Element {
        tag: String,
        key: Option<String>,
        /// Attribute name and serialised value; `None` for boolean attributes.
        attributes: Vec<(String, Option<String>)>,
        children: Vec<RenderedNode>,
        source: SourcePosition,
    },
    Text(String),
}

impl RenderedNode {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        html::write_node(self, &mut out);
        out
    }
}

/// Serialises a rendered sequence.
pub fn to_html(nodes: &[RenderedNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        html::write_node(node, &mut out);
    }
    out
}

/// Renders `thunks` with `bindings` against `ctx`.
pub fn render<'a>(
    thunks: &[NodeThunk<'a>],
    bindings: &Bindings<'a>,
    ctx: &mut Context<'a>,
    options: &RenderOptions<'a>,
) -> Result<Vec<RenderedNode>, EvalError<'a>> {
    ctx.timed("render", |ctx| {
        ctx.key_generator().reset();
        let mut renderer = Renderer {
            ctx,
            bindings,
            options,
        };
        let mut out = Vec::new();
        renderer.thunks(thunks, &mut out)?;
        debug!(nodes = out.len(), "render pass complete");
        Ok(out)
    })
}

/// Renders an already evaluated node, e.g. a component value called by the
/// host.
pub fn render_node<'a>(
    node: JsxNode<'a>,
    bindings: &Bindings<'a>,
    ctx: &mut Context<'a>,
    options: &RenderOptions<'a>,
) -> Result<Vec<RenderedNode>, EvalError<'a>> {
    let mut renderer = Renderer {
        ctx,
        bindings,
        options,
    };
    let mut out = Vec::new();
    renderer.node(node, &mut out)?;
    Ok(out)
}

struct Renderer<'r, 'a> {
    ctx: &'r mut Context<'a>,
    bindings: &'r Bindings<'a>,
    options: &'r RenderOptions<'a>,
}

impl<'r, 'a> Renderer<'r, 'a> {
    fn thunks(
        &mut self,
        thunks: &[NodeThunk<'a>],
        out: &mut Vec<RenderedNode>,
    ) -> Result<(), EvalError<'a>> {
        for thunk in thunks {
            trace!(kind = ?thunk.kind(), "rendering thunk");
            let node = thunk.invoke(self.bindings, self.ctx)?;
            self.node(node, out)?;
        }
        Ok(())
    }

    /// Renders children one level deeper in the key generator.
    fn children(
        &mut self,
        thunks: &[NodeThunk<'a>],
        out: &mut Vec<RenderedNode>,
    ) -> Result<(), EvalError<'a>> {
        self.ctx.key_generator().opening_element();
        let result = self.thunks(thunks, out);
        self.ctx.key_generator().closing_element();
        result
    }

    fn node(&mut self, node: JsxNode<'a>, out: &mut Vec<RenderedNode>) -> Result<(), EvalError<'a>> {
        match node {
            JsxNode::Element(element) => ensure_sufficient_stack(|| self.element(element, out)),
            JsxNode::Fragment(fragment) => ensure_sufficient_stack(|| self.fragment(fragment, out)),
            JsxNode::Text(text) => {
                let filtered = self
                    .options
                    .text_filters
                    .iter()
                    .try_fold(text, |text, filter| filter(text));
                if let Some(text) = filtered {
                    out.push(RenderedNode::Text(text.to_string()));
                }
                Ok(())
            }
            JsxNode::Boolean(_) | JsxNode::Null | JsxNode::Undefined => Ok(()),
        }
    }

    fn fragment(
        &mut self,
        fragment: FragmentNode<'a>,
        out: &mut Vec<RenderedNode>,
    ) -> Result<(), EvalError<'a>> {
        let filtered = self
            .options
            .fragment_filters
            .iter()
            .try_fold(fragment, |fragment, filter| filter(fragment));
        match filtered {
            Some(fragment) => self.children(&fragment.children, out),
            None => Ok(()),
        }
    }

    fn element(
        &mut self,
        element: ElementNode<'a>,
        out: &mut Vec<RenderedNode>,
    ) -> Result<(), EvalError<'a>> {
        let filtered = self
            .options
            .element_filters
            .iter()
            .try_fold(element, |element, filter| filter(element));
        let Some(element) = filtered else {
            return Ok(());
        };

        match &element.component {
            Component::Host(_) | Component::Value(Value::String(_)) => {
                let tag = element.component.host_name().unwrap_or_default().to_string();
                if self.options.disable_unknown_html_element && !is_known_html_element(&tag) {
                    trace!(%tag, "dropping unknown element");
                    return Ok(());
                }
                let mut children = Vec::new();
                self.children(&element.children, &mut children)?;
                out.push(RenderedNode::Element {
                    key: element.key().map(|k| to_string(k).to_string()),
                    attributes: attributes(&element.props),
                    children,
                    source: self.source_position(&element),
                    tag,
                });
                Ok(())
            }
            Component::Value(component) => {
                let component = component.clone();
                let rendered = self.call_component(&component, element)?;
                self.node(rendered, out)
            }
        }
    }

    /// Calls a function or class component with its props. Children are
    /// passed as a fragment in `props.children`.
    fn call_component(
        &mut self,
        component: &Value<'a>,
        element: ElementNode<'a>,
    ) -> Result<JsxNode<'a>, EvalError<'a>> {
        let Value::Function(function) = component else {
            return Err(EvalError::type_error(format!(
                "Element type is invalid: expected a string or a function but got: {}",
                component.type_of()
            )));
        };
        debug!(component = %function.display_name(), "calling component");

        let mut props = PropertyMap::new();
        for (key, property) in element.props.iter() {
            if let Some(value) = property.data_value() {
                props.set_data(key.clone(), value.clone());
            }
        }
        props.set_data(
            "children",
            Value::Node(Rc::new(JsxNode::Fragment(FragmentNode {
                props: PropertyMap::new(),
                children: element.children,
                position: element.position,
            }))),
        );
        let props = Value::object(props);

        self.ctx.key_generator().opening_element();
        let result = if function.class_id().is_some() {
            self.ctx
                .construct(component, &[props], function.display_name())
                .and_then(|instance| {
                    let render = self.ctx.get_property(&instance, "render")?;
                    self.ctx.call_value(&render, instance, &[])
                })
        } else {
            self.ctx.call_function(function, Value::Undefined, &[props])
        };
        self.ctx.key_generator().closing_element();
        value_to_node(&result?)
    }

    fn source_position(&self, element: &ElementNode<'a>) -> SourcePosition {
        SourcePosition {
            file_name: self.options.source_file_name.clone(),
            line: element.position.map(|p| p.line),
            column: element.position.map(|p| p.column),
        }
    }
}

/// Serialises props to attributes. `key` and `children` are not attributes;
/// functions, nodes, `false`, `null` and `undefined` are omitted.
fn attributes(props: &PropertyMap<'_>) -> Vec<(String, Option<String>)> {
    let mut attributes = Vec::new();
    for (key, property) in props.iter() {
        if matches!(&**key, "key" | "children") {
            continue;
        }
        let Some(value) = property.data_value() else {
            continue;
        };
        let name = match &**key {
            "className" => "class",
            "htmlFor" => "for",
            other => other,
        }
        .to_string();
        match value {
            Value::Undefined | Value::Null | Value::Bool(false) | Value::Function(_) | Value::Node(_) => {}
            Value::Bool(true) => attributes.push((name, None)),
            Value::Object(object) if name == "style" => {
                let object = object.borrow();
                let declarations = object
                    .properties
                    .iter()
                    .filter_map(|(prop, slot)| {
                        let value = slot.data_value()?;
                        (!value.is_nullish()).then(|| format!("{}:{}", css_property(prop), to_string(value)))
                    })
                    .collect::<Vec<_>>()
                    .join(";");
                attributes.push((name, Some(declarations)));
            }
            other => attributes.push((name, Some(to_string(other).to_string()))),
        }
    }
    attributes
}

/// `backgroundColor` → `background-color`.
fn css_property(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
