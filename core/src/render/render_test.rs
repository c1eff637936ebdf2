//! Tests for the static renderer.

use std::rc::Rc;

use bumpalo::Bump;
use pretty_assertions::assert_eq;

use crate::api::{EvaluateOptions, ParseOptions, evaluate_jsx_source};
use crate::evaluator::{Context, value_to_node};
use crate::parser;
use crate::render::{RenderOptions, RenderedNode, SourcePosition, render, render_node, to_html};
use crate::values::{Bindings, ElementNode, FragmentNode, Text, Value};

/// Runs `source` in module mode and renders the resulting node.
fn render_module(source: &'static str) -> Result<String, String> {
    let arena = Bump::new();
    let program = parser::parse(&arena, source).map_err(|e| e.to_string())?;
    let mut ctx = Context::new(EvaluateOptions::default());
    let value = ctx
        .exec_program(program, &Bindings::new())
        .map_err(|e| e.to_string())?;
    let node = value_to_node(&value).map_err(|e| e.to_string())?;
    let nodes = render_node(node, &Bindings::new(), &mut ctx, &RenderOptions::default())
        .map_err(|e| e.to_string())?;
    Ok(to_html(&nodes))
}

#[test]
fn test_attributes() {
    let html = render_module(
        "<div className=\"a\" htmlFor=\"b\" hidden={false} checked data-x={1} onClick={() => 1} style={{ backgroundColor: 'red', fontSize: 12, margin: null }}>hi</div>",
    )
    .unwrap();
    assert_eq!(
        html,
        "<div class=\"a\" for=\"b\" checked data-x=\"1\" style=\"background-color:red;font-size:12\">hi</div>"
    );
}

#[test]
fn test_function_component_with_children() {
    let html = render_module(
        "
        function Box({ title, children }) {
            return <section><h1>{title}</h1>{children}</section>;
        }
        <Box title=\"T\"><p>body</p></Box>
        ",
    )
    .unwrap();
    assert_eq!(html, "<section><h1>T</h1><p>body</p></section>");
}

#[test]
fn test_class_component() {
    let html = render_module(
        "
        class Hello {
            constructor(props) { this.props = props; }
            render() { return <b>Hello, {this.props.name}!</b>; }
        }
        <Hello name=\"world\" />
        ",
    )
    .unwrap();
    assert_eq!(html, "<b>Hello, world!</b>");
}

#[test]
fn test_nested_components() {
    let html = render_module(
        "
        const Item = ({ label }) => <li>{label}</li>;
        const List = ({ items }) => <ul>{items.map(label => <Item label={label} />)}</ul>;
        <List items={['a', 'b']} />
        ",
    )
    .unwrap();
    assert_eq!(html, "<ul><li>a</li><li>b</li></ul>");
}

#[test]
fn test_empty_values_render_nothing() {
    assert_eq!(
        render_module("<p>{true}{false}{null}{undefined}{0}{'s'}</p>").unwrap(),
        "<p>0s</p>"
    );
}

#[test]
fn test_escaping() {
    assert_eq!(
        render_module("<p title={'\"q\" & co'}>{'<b>'}</p>").unwrap(),
        "<p title=\"&quot;q&quot; &amp; co\">&lt;b&gt;</p>"
    );
}

#[test]
fn test_invalid_component() {
    let err = render_module("const C = 5; <C />").unwrap_err();
    assert_eq!(
        err,
        "Element type is invalid: expected a string or a function but got: number"
    );
}

#[test]
fn test_component_errors_propagate() {
    let err = render_module("function Broken() { throw new Error('nope'); } <Broken />").unwrap_err();
    assert_eq!(err, "Uncaught Error: nope");
}

#[test]
fn test_jsx_mode_keys_are_stable() {
    let arena = Bump::new();
    let mut ctx = Context::new(EvaluateOptions::default());
    let thunks = evaluate_jsx_source(&arena, &mut ctx, "<div><span /></div><p />", &ParseOptions::default())
        .unwrap();

    let keys = |nodes: &[RenderedNode]| -> Vec<Option<String>> {
        fn walk(nodes: &[RenderedNode], out: &mut Vec<Option<String>>) {
            for node in nodes {
                if let RenderedNode::Element { key, children, .. } = node {
                    out.push(key.clone());
                    walk(children, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(nodes, &mut out);
        out
    };

    let first = render(&thunks, &Bindings::new(), &mut ctx, &RenderOptions::default()).unwrap();
    let second = render(&thunks, &Bindings::new(), &mut ctx, &RenderOptions::default()).unwrap();
    let expected = vec![Some("1".to_string()), Some("1-1".to_string()), Some("2".to_string())];
    assert_eq!(keys(&first), expected);
    assert_eq!(keys(&second), expected);
    assert_eq!(to_html(&first), "<div><span></span></div><p></p>");
}

#[test]
fn test_rerender_with_new_bindings() {
    let arena = Bump::new();
    let mut ctx = Context::new(EvaluateOptions::default());
    let thunks =
        evaluate_jsx_source(&arena, &mut ctx, "<h1>Hi {name}</h1>", &ParseOptions::default()).unwrap();

    let mut outputs = Vec::new();
    for name in ["Ada", "Grace"] {
        let bindings = Bindings::new().with("name", Value::from(name));
        let nodes = render(&thunks, &bindings, &mut ctx, &RenderOptions::default()).unwrap();
        outputs.push(to_html(&nodes));
    }
    assert_eq!(outputs, vec!["<h1>Hi Ada</h1>", "<h1>Hi Grace</h1>"]);
}

#[test]
fn test_unknown_elements_can_be_dropped() {
    let arena = Bump::new();
    let mut ctx = Context::new(EvaluateOptions::default());
    let thunks = evaluate_jsx_source(
        &arena,
        &mut ctx,
        "<div><blink>x</blink><my-widget /><svg /></div>",
        &ParseOptions::default(),
    )
    .unwrap();
    let options = RenderOptions {
        disable_unknown_html_element: true,
        ..Default::default()
    };
    let nodes = render(&thunks, &Bindings::new(), &mut ctx, &options).unwrap();
    assert_eq!(to_html(&nodes), "<div><my-widget></my-widget><svg></svg></div>");
}

fn drop_spans<'a>(element: ElementNode<'a>) -> Option<ElementNode<'a>> {
    (element.component.host_name() != Some("span")).then_some(element)
}

fn shout(text: Text) -> Option<Text> {
    match text {
        Text::String(s) => Some(Text::String(Rc::from(s.to_uppercase()))),
        other => Some(other),
    }
}

fn drop_fragment<'a>(_: FragmentNode<'a>) -> Option<FragmentNode<'a>> {
    None
}

#[test]
fn test_filters() {
    let arena = Bump::new();
    let mut ctx = Context::new(EvaluateOptions::default());
    let thunks = evaluate_jsx_source(
        &arena,
        &mut ctx,
        "<p>keep <span>drop</span></p><>inner</>",
        &ParseOptions::default(),
    )
    .unwrap();
    let options = RenderOptions {
        element_filters: vec![Box::new(drop_spans)],
        text_filters: vec![Box::new(shout)],
        fragment_filters: vec![Box::new(drop_fragment)],
        ..Default::default()
    };
    let nodes = render(&thunks, &Bindings::new(), &mut ctx, &options).unwrap();
    assert_eq!(to_html(&nodes), "<p>KEEP </p>");
}

#[test]
fn test_source_position() {
    let arena = Bump::new();
    let program = parser::parse(&arena, "const x = 1;\n  <div />").unwrap();
    let mut ctx = Context::new(EvaluateOptions::default());
    let value = ctx.exec_program(program, &Bindings::new()).unwrap();
    let options = RenderOptions {
        source_file_name: "page.jsx".to_string(),
        ..Default::default()
    };
    let nodes = render_node(value_to_node(&value).unwrap(), &Bindings::new(), &mut ctx, &options).unwrap();
    let RenderedNode::Element { source, .. } = &nodes[0] else {
        panic!("expected an element");
    };
    assert_eq!(
        source,
        &SourcePosition {
            file_name: "page.jsx".to_string(),
            line: Some(2),
            column: Some(2),
        }
    );
}
