mod cases;

use cases::render_jsx_with;
use indoc::indoc;
use jsx_eval::EvaluateOptions;
use pretty_assertions::assert_eq;

test_case!(
    single_element,
    input: "<p>Hello</p>",
    html: Ok("<p>Hello</p>"),
);

test_case!(
    top_level_text_and_elements,
    input: "Hello <b>world</b>!",
    html: Ok("Hello <b>world</b>!"),
);

test_case!(
    multiline_text_is_collapsed,
    input: indoc! {"
        <p>
            one
            two
        </p>
    "},
    html: Ok("<p>one two</p>"),
);

test_case!(
    mapped_children,
    input: indoc! {"
        <ul>
            {['a', 'b'].map(item => <li>{item}</li>)}
        </ul>
    "},
    html: Ok("<ul><li>a</li><li>b</li></ul>"),
);

test_case!(
    attribute_names_are_mapped,
    input: r#"<label htmlFor="x" className={'a' + 'b'}>L</label>"#,
    html: Ok(r#"<label for="x" class="ab">L</label>"#),
);

test_case!(
    spread_attributes,
    input: "<a {...{ href: '/x', title: 't' }}>go</a>",
    html: Ok(r#"<a href="/x" title="t">go</a>"#),
);

test_case!(
    void_elements,
    input: r#"<img src="a.png" alt="" />"#,
    html: Ok(r#"<img src="a.png" alt="">"#),
);

test_case!(
    conditional_rendering,
    input: "{1 > 2 ? <b>yes</b> : <i>no</i>}{false && <b>hidden</b>}<br/>",
    html: Ok("<i>no</i><br>"),
);

test_case!(
    numbers_render_as_text,
    input: "<p>{1 + 1}</p>",
    html: Ok("<p>2</p>"),
);

test_case!(
    text_is_escaped,
    input: "<p>{'<script>'}</p>",
    html: Ok("<p>&lt;script&gt;</p>"),
);

test_case!(
    components_defined_inline,
    input: "{(() => { const Item = ({ n }) => <b>{n}</b>; return <Item n={1} />; })()}",
    html: Ok("<b>1</b>"),
);

test_case!(
    fragments_flatten,
    input: "<div><><i>a</i><i>b</i></></div>",
    html: Ok("<div><i>a</i><i>b</i></div>"),
);

test_case!(
    missing_identifiers_are_undefined,
    input: "<p>{missing}</p>",
    html: Ok("<p></p>"),
);

test_case!(
    member_access_on_undefined_fails,
    input: "<p>{missing.x}</p>",
    html: Err("TypeError: Cannot read properties of undefined (reading 'x')"),
);

test_case!(
    objects_are_not_children,
    input: "<p>{{ a: 1 }}</p>",
    html: Err("TypeError: Objects are not valid as a JSX child"),
);

#[test]
fn unclosed_element_is_a_parse_error() {
    let err = cases::render_jsx("<p>oops").unwrap_err();
    assert!(!err.is_empty());
}

#[test]
fn bindings_override_identifiers() {
    let html = render_jsx_with(
        "<p>Hi {name}</p>",
        &[("name", "Ada")],
        EvaluateOptions::default(),
    );
    assert_eq!(html.as_deref(), Ok("<p>Hi Ada</p>"));
}

#[test]
fn reference_errors_when_requested() {
    let html = render_jsx_with(
        "<p>{nobody}</p>",
        &[],
        EvaluateOptions {
            raise_reference_error: true,
            ..Default::default()
        },
    );
    assert_eq!(html.unwrap_err(), "ReferenceError: nobody is not defined");
}

#[test]
fn disabled_calls_render_nothing() {
    let html = render_jsx_with(
        "<p>{[1, 2].join('-')}</p>",
        &[],
        EvaluateOptions {
            disable_call: true,
            ..Default::default()
        },
    );
    assert_eq!(html.as_deref(), Ok("<p></p>"));
}
