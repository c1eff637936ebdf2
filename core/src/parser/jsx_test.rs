use bumpalo::Bump;
use indoc::indoc;
use pretty_assertions::assert_eq;

use super::parser::{parse, parse_with_options};
use crate::api::ParseOptions;
use crate::ast::*;
use crate::parser::{ParseErrorKind, clean_jsx_text};

fn element<'a>(arena: &'a Bump, source: &'a str) -> &'a JsxElement<'a> {
    let program = parse(arena, source)
        .unwrap_or_else(|e| panic!("Parsing failed: {}\n{}", source, e));
    match program.body {
        [Stmt {
            kind: StmtKind::Expression(Expr {
                kind: ExprKind::JsxElement(el),
                ..
            }),
            ..
        }] => el,
        other => panic!("Expected a JSX element statement, got {:?}", other),
    }
}

fn child_summary(children: &[JsxChild]) -> Vec<String> {
    children
        .iter()
        .map(|c| match c {
            JsxChild::Text(t) => format!("text:{:?}", t),
            JsxChild::Expression(None) => "empty".to_string(),
            JsxChild::Expression(Some(_)) => "expr".to_string(),
            JsxChild::Spread(_) => "spread".to_string(),
            JsxChild::Element(el) => format!("<{}>", el.name.to_name()),
            JsxChild::Fragment(_) => "<>".to_string(),
        })
        .collect()
}

#[test]
fn test_simple_element() {
    let arena = Bump::new();
    let el = element(&arena, r#"<div className="a" hidden data-x={1}>hi</div>"#);
    assert_eq!(el.name.to_name(), "div");
    assert!(!el.self_closing);

    let names: Vec<String> = el
        .attributes
        .iter()
        .map(|a| match a {
            JsxAttribute::Attribute { name, .. } => name.to_name(),
            JsxAttribute::Spread(_) => "...".to_string(),
        })
        .collect();
    assert_eq!(names, vec!["className", "hidden", "data-x"]);

    assert!(matches!(
        el.attributes[1],
        JsxAttribute::Attribute { value: None, .. }
    ));
    assert!(matches!(
        el.attributes[0],
        JsxAttribute::Attribute {
            value: Some(JsxAttributeValue::String("a")),
            ..
        }
    ));
    assert_eq!(child_summary(el.children), vec![r#"text:"hi""#]);
}

#[test]
fn test_self_closing_and_names() {
    let arena = Bump::new();
    let el = element(&arena, "<Foo.Bar />");
    assert!(el.self_closing);
    assert!(matches!(el.name, JsxTagName::Member(["Foo", "Bar"])));

    let el = element(&arena, "<svg:rect/>");
    assert_eq!(el.name.to_name(), "svg:rect");
}

#[test]
fn test_children_kinds() {
    let arena = Bump::new();
    let el = element(
        &arena,
        indoc! {r#"
            <ul>
              <li>one</li>
              {items}
              {/* comment */}
              {...rest}
              <>frag</>
            </ul>
        "#},
    );
    assert_eq!(
        child_summary(el.children),
        vec!["<li>", "expr", "empty", "spread", "<>"]
    );
}

#[test]
fn test_text_whitespace_cleaning() {
    assert_eq!(clean_jsx_text("  hello  "), "  hello  ");
    assert_eq!(clean_jsx_text("\n   hello\n   world\n  "), "hello world");
    assert_eq!(clean_jsx_text("\n    \n  "), "");
    assert_eq!(clean_jsx_text("a\n  "), "a");
    assert_eq!(clean_jsx_text("\n  b"), "b");
    assert_eq!(clean_jsx_text("a\tb"), "a b");
}

#[test]
fn test_entities_are_decoded() {
    let arena = Bump::new();
    let el = element(&arena, r#"<p title="&quot;x&quot;">a &amp; b &lt;3</p>"#);
    assert_eq!(child_summary(el.children), vec![r#"text:"a & b <3""#]);
    assert!(matches!(
        el.attributes[0],
        JsxAttribute::Attribute {
            value: Some(JsxAttributeValue::String("\"x\"")),
            ..
        }
    ));
}

#[test]
fn test_attribute_element_value() {
    let arena = Bump::new();
    let el = element(&arena, "<A icon=<B /> />");
    assert!(matches!(
        el.attributes[0],
        JsxAttribute::Attribute {
            value: Some(JsxAttributeValue::Element(_)),
            ..
        }
    ));
}

#[test]
fn test_mismatched_closing_tag() {
    let arena = Bump::new();
    let err = parse(&arena, "<a><b></a></b>").unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::MismatchedClosingTag {
            expected: "b".to_string(),
            found: "a".to_string(),
        }
    );
}

#[test]
fn test_jsx_inside_expressions() {
    let arena = Bump::new();
    let program = parse(&arena, "const x = cond ? <a /> : [<b key=\"1\" />, <c>{y}</c>];").unwrap();
    assert_eq!(program.body.len(), 1);

    // `<` after an operand is still a comparison.
    let program = parse(&arena, "a < b").unwrap();
    let StmtKind::Expression(e) = &program.body[0].kind else {
        panic!("Expected expression");
    };
    assert!(matches!(e.kind, ExprKind::Binary { op: BinaryOp::Lt, .. }));
}

#[test]
fn test_force_expression_wraps_in_fragment() {
    let arena = Bump::new();
    let options = ParseOptions {
        force_expression: true,
        ..Default::default()
    };
    let program = parse_with_options(&arena, "<a/>text<b/>", &options).unwrap();
    let StmtKind::Expression(Expr {
        kind: ExprKind::JsxFragment(fragment),
        ..
    }) = &program.body[0].kind
    else {
        panic!("Expected fragment, got {:?}", program.body);
    };
    assert_eq!(
        child_summary(fragment.children),
        vec!["<a>", r#"text:"text""#, "<b>"]
    );
}

#[test]
fn test_element_positions() {
    let arena = Bump::new();
    let el = element(&arena, "<div>\n  <span />\n</div>");
    let JsxChild::Element(span) = el.children[0] else {
        panic!("Expected element child");
    };
    let start = span.loc.as_ref().map(|l| l.start).unwrap();
    assert_eq!(start, Position { line: 2, column: 2 });
}
